//! Rewrite synthesis.
//!
//! Turns a classified call site into a `RewritePlan`: either a direct
//! `collection.map(...)` replacement or a runtime-guarded ternary
//!
//! ```text
//! Array.isArray(C) ? C.map(F, ...) : _.map(C, F, ...)
//! ```
//!
//! Sub-expressions that the ternary would evaluate twice (the collection) or
//! that read better named (inline callbacks) are hoisted into fresh `const`
//! declarations placed before the enclosing statement.

use crate::anchor::{
    HoistBlocker, find_statement_anchor, hoist_blocker, references_statement_binding,
};
use crate::classify::Classification;
use crate::config::RuleConfig;
use crate::guard::GuardDecision;
use crate::matcher::CallSite;
use crate::names::NameAllocator;
use crate::resolver::ScopeResolver;
use crate::text::SourceText;
use serde::Serialize;
use unlodash_common::Span;
use unlodash_parser::{NodeArena, NodeData, NodeFlags, NodeIndex, NodeKind};
use unlodash_scanner::SyntaxKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Disposition {
    Skip,
    DirectReplace,
    GuardedTernary,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Skip => "skip",
            Disposition::DirectReplace => "directReplace",
            Disposition::GuardedTernary => "guardedTernary",
        }
    }
}

/// A hoisted declaration, inserted at `pos` (the start of statement
/// `before`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Insertion {
    pub before: NodeIndex,
    pub pos: u32,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub range: Span,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewritePlan {
    pub disposition: Disposition,
    /// Applied in order; all share the same anchor.
    pub insertions: Vec<Insertion>,
    pub replacement: Replacement,
}

/// Why a finding is reported without a fix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoFixReason {
    /// Hoisting is needed but the call is not inside a statement list.
    NoAnchor,
    UnsafeHoist(HoistBlocker),
    /// A local `Array` binding would capture `Array.isArray`.
    ArrayShadowed,
    NamesExhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Synthesis {
    Skip,
    Plan(RewritePlan),
    NoFix {
        disposition: Disposition,
        reason: NoFixReason,
    },
}

/// Combine the classification with the guard decision.
///
/// | classification   | guard          | disposition    |
/// |------------------|----------------|----------------|
/// | ProvenObjectLike | any            | Skip           |
/// | ProvenArray      | any            | DirectReplace  |
/// | Unknown          | DirectReplace  | DirectReplace  |
/// | Unknown          | Skip           | Skip           |
/// | Unknown          | none           | GuardedTernary |
pub fn decide(classification: Classification, guard: Option<GuardDecision>) -> Disposition {
    match (classification, guard) {
        (Classification::ProvenObjectLike, _) => Disposition::Skip,
        (Classification::ProvenArray, _) => Disposition::DirectReplace,
        (Classification::Unknown, Some(GuardDecision::DirectReplace)) => {
            Disposition::DirectReplace
        }
        (Classification::Unknown, Some(GuardDecision::Skip)) => Disposition::Skip,
        (Classification::Unknown, None) => Disposition::GuardedTernary,
    }
}

pub struct Synthesizer<'a> {
    arena: &'a NodeArena,
    text: SourceText<'a>,
    resolver: &'a dyn ScopeResolver,
    config: &'a RuleConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        arena: &'a NodeArena,
        resolver: &'a dyn ScopeResolver,
        config: &'a RuleConfig,
    ) -> Self {
        Self {
            arena,
            text: SourceText::new(arena),
            resolver,
            config,
        }
    }

    pub fn synthesize(
        &self,
        site: &CallSite,
        disposition: Disposition,
        names: &mut NameAllocator,
    ) -> Synthesis {
        match disposition {
            Disposition::Skip => Synthesis::Skip,
            Disposition::DirectReplace => Synthesis::Plan(self.direct_replace(site)),
            Disposition::GuardedTernary => match self.guarded_ternary(site, names) {
                Ok(plan) => Synthesis::Plan(plan),
                Err(reason) => Synthesis::NoFix {
                    disposition,
                    reason,
                },
            },
        }
    }

    /// `<collection>.<native>(<callback>, ...)`
    fn direct_replace(&self, site: &CallSite) -> RewritePlan {
        let receiver = self.receiver_text(site.collection, self.text.of(site.collection));
        let arguments = self.text.join(site.trailing_arguments());
        let text = format!("{receiver}.{}({arguments})", self.config.native_method_name);
        RewritePlan {
            disposition: Disposition::DirectReplace,
            insertions: Vec::new(),
            replacement: Replacement {
                range: site.range,
                text: self.guard_statement_start(site.call, text),
            },
        }
    }

    fn guarded_ternary(
        &self,
        site: &CallSite,
        names: &mut NameAllocator,
    ) -> Result<RewritePlan, NoFixReason> {
        if !self.resolver.is_global(site.call, "Array") {
            return Err(NoFixReason::ArrayShadowed);
        }

        let collection = self.arena.skip_parentheses(site.collection);
        let hoist_collection = needs_hoisting(self.arena, collection);
        let hoist_callback = is_function_literal(self.arena, site.callback);

        let mut insertions = Vec::new();
        let mut subject = self.text.of(collection).to_string();
        let mut callback = self.text.of(site.callback).to_string();

        if hoist_collection || hoist_callback {
            let anchor =
                find_statement_anchor(self.arena, site.call).ok_or(NoFixReason::NoAnchor)?;
            if let Some(blocker) = hoist_blocker(self.arena, site.call, anchor) {
                return Err(NoFixReason::UnsafeHoist(blocker));
            }
            let hoisted = [
                (hoist_collection, site.collection),
                (hoist_callback, site.callback),
            ];
            if hoisted.iter().any(|&(hoist, expr)| {
                hoist && references_statement_binding(self.arena, self.resolver, expr, anchor)
            }) {
                return Err(NoFixReason::UnsafeHoist(HoistBlocker::StatementBinding));
            }
            let pos = self.arena.get(anchor).ok_or(NoFixReason::NoAnchor)?.pos;
            let indent = self.text.indentation_at(pos);
            let scopes = [
                self.resolver.scope_of(anchor),
                self.resolver.scope_of(site.call),
            ];
            let mut hoist = |base: &str, text: &str| -> Result<String, NoFixReason> {
                let name = names
                    .allocate(base, &scopes, self.resolver)
                    .ok_or(NoFixReason::NamesExhausted)?;
                insertions.push(Insertion {
                    before: anchor,
                    pos,
                    text: format!("const {name} = {text};\n{indent}"),
                });
                Ok(name)
            };
            if hoist_collection {
                subject = hoist("collection", self.text.of(site.collection))?;
            }
            if hoist_callback {
                callback = hoist("callback", self.text.of(site.callback))?;
            }
        }

        let receiver = if hoist_collection {
            subject.clone()
        } else {
            self.receiver_text(collection, &subject)
        };
        let mut arguments = callback;
        for arg in site.arguments_after_callback() {
            arguments.push_str(", ");
            arguments.push_str(self.text.of(arg));
        }
        let ternary = format!(
            "Array.isArray({subject}) ? {receiver}.{native}({arguments}) : {alias}.{method}({subject}, {arguments})",
            native = self.config.native_method_name,
            alias = self.text.of(site.alias),
            method = self.config.map_method_name,
        );
        let mut text = if occupies_assignment_position(self.arena, site.call) {
            ternary
        } else {
            format!("({ternary})")
        };
        // Hoisted declarations already end with `;` right before the call.
        if insertions.is_empty() {
            text = self.guard_statement_start(site.call, text);
        }

        Ok(RewritePlan {
            disposition: Disposition::GuardedTernary,
            insertions,
            replacement: Replacement {
                range: site.range,
                text,
            },
        })
    }

    /// Prefix `;` when `text` would otherwise continue the previous,
    /// unterminated statement (`foo()\n[1].map(f)` reads as `foo()[1]`).
    fn guard_statement_start(&self, call: NodeIndex, text: String) -> String {
        if text.starts_with(['(', '[', '`', '/', '+', '-'])
            && starts_unterminated_continuation(self.arena, call)
        {
            format!(";{text}")
        } else {
            text
        }
    }

    /// `text` of `node`, parenthesized unless `.member` can follow it.
    fn receiver_text(&self, node: NodeIndex, text: &str) -> String {
        if is_member_access_safe(self.arena, node) {
            text.to_string()
        } else {
            format!("({text})")
        }
    }
}

/// True when `call` begins an expression statement whose previous sibling
/// statement is not terminated by `;` or a closing block.
fn starts_unterminated_continuation(arena: &NodeArena, call: NodeIndex) -> bool {
    let Some(pos) = arena.get(call).map(|n| n.pos) else {
        return false;
    };
    let statement = std::iter::once(call)
        .chain(arena.ancestors(call))
        .take_while(|&idx| arena.get(idx).is_some_and(|n| n.pos == pos))
        .find(|&idx| arena.kind(idx) == Some(NodeKind::ExpressionStatement));
    let Some(statement) = statement else {
        return false;
    };
    let Some(statements) = arena.get_statements(arena.parent(statement)) else {
        return false;
    };
    let previous = statements
        .iter()
        .take_while(|&idx| idx != statement)
        .last();
    previous.is_some_and(|prev| !is_terminated(arena, prev))
}

/// True when nothing can continue `statement` on the next line.
fn is_terminated(arena: &NodeArena, statement: NodeIndex) -> bool {
    if arena.node_text(statement).ends_with(';') {
        return true;
    }
    let Some(node) = arena.get(statement) else {
        return true;
    };
    match (node.kind, &node.data) {
        (
            NodeKind::Block
            | NodeKind::FunctionDeclaration
            | NodeKind::ClassDeclaration
            | NodeKind::SwitchStatement
            | NodeKind::TryStatement,
            _,
        ) => true,
        (
            _,
            NodeData::If {
                then_statement,
                else_statement,
                ..
            },
        ) => is_terminated(
            arena,
            if else_statement.is_some() {
                *else_statement
            } else {
                *then_statement
            },
        ),
        (NodeKind::DoStatement, _) => false,
        (
            _,
            NodeData::Loop { statement, .. }
            | NodeData::ForInOf { statement, .. }
            | NodeData::Labeled { statement, .. }
            | NodeData::With { statement, .. },
        ) => is_terminated(arena, *statement),
        (_, NodeData::ExportDeclaration { declaration, .. }) if declaration.is_some() => {
            is_terminated(arena, *declaration)
        }
        _ => false,
    }
}

/// Anything but a bare identifier, `this` or a literal may have side effects
/// or be costly, and must be evaluated once.
fn needs_hoisting(arena: &NodeArena, collection: NodeIndex) -> bool {
    match arena.kind(collection) {
        Some(NodeKind::Identifier | NodeKind::ThisKeyword) => false,
        Some(kind) => !kind.is_literal(),
        None => false,
    }
}

#[inline]
fn is_function_literal(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.kind(arena.skip_parentheses(node)),
        Some(NodeKind::FunctionExpression | NodeKind::ArrowFunction)
    )
}

/// True when `node`'s text can be followed by `.member` without changing
/// how it parses.
pub fn is_member_access_safe(arena: &NodeArena, node: NodeIndex) -> bool {
    let Some(n) = arena.get(node) else {
        return false;
    };
    match n.kind {
        NodeKind::Identifier
        | NodeKind::ThisKeyword
        | NodeKind::SuperKeyword
        | NodeKind::ArrayLiteralExpression
        | NodeKind::ObjectLiteralExpression
        | NodeKind::ParenthesizedExpression
        | NodeKind::StringLiteral
        | NodeKind::NoSubstitutionTemplateLiteral
        | NodeKind::TemplateExpression
        | NodeKind::RegularExpressionLiteral
        | NodeKind::TaggedTemplateExpression
        | NodeKind::MetaProperty
        | NodeKind::TrueKeyword
        | NodeKind::FalseKeyword
        | NodeKind::NullKeyword => true,
        // `a?.b.map` would skip the native call when `a` is nullish.
        NodeKind::PropertyAccessExpression
        | NodeKind::ElementAccessExpression
        | NodeKind::CallExpression => !n.flags.contains(NodeFlags::OPTIONAL_CHAIN),
        // `new X.map()` would construct `X.map`.
        NodeKind::NewExpression => matches!(
            n.data,
            NodeData::Call {
                has_arguments: true,
                ..
            }
        ),
        _ => false,
    }
}

/// True when a conditional expression can replace `node` without
/// parentheses: its parent takes an AssignmentExpression in that slot.
pub fn occupies_assignment_position(arena: &NodeArena, node: NodeIndex) -> bool {
    let Some(parent) = arena.get(arena.parent(node)) else {
        return false;
    };
    match &parent.data {
        NodeData::VariableDeclaration { initializer, .. }
        | NodeData::PropertyAssignment { initializer, .. }
        | NodeData::PropertyDeclaration { initializer, .. }
        | NodeData::Binding { initializer, .. } => *initializer == node,
        NodeData::ShorthandPropertyAssignment {
            default_initializer,
            ..
        } => *default_initializer == node,
        NodeData::Call { expression, .. } => *expression != node,
        NodeData::LiteralExpression { .. } => parent.kind == NodeKind::ArrayLiteralExpression,
        NodeData::ExpressionStatement { .. }
        | NodeData::Return { .. }
        | NodeData::ComputedPropertyName { .. }
        | NodeData::TemplateSpan { .. }
        | NodeData::Switch { .. }
        | NodeData::With { .. } => true,
        NodeData::CaseClause { expression, .. } => *expression == node,
        NodeData::Wrapped { .. } => matches!(
            parent.kind,
            NodeKind::ParenthesizedExpression
                | NodeKind::SpreadElement
                | NodeKind::SpreadAssignment
                | NodeKind::YieldExpression
        ),
        NodeData::Binary {
            operator, right, ..
        } => {
            *operator == SyntaxKind::CommaToken
                || (operator.is_assignment_operator() && *right == node)
        }
        NodeData::Function { body, .. } => *body == node,
        NodeData::Conditional { condition, .. } => *condition != node,
        NodeData::Access {
            name_or_argument, ..
        } => parent.kind == NodeKind::ElementAccessExpression && *name_or_argument == node,
        NodeData::If { expression, .. } => *expression == node,
        NodeData::Loop { statement, .. } => *statement != node,
        NodeData::ForInOf { expression, .. } => *expression == node,
        _ => false,
    }
}
