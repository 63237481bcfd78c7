//! Flow guards: `Array.isArray` checks that already decide a call's branch.
//!
//! A call inside `if (Array.isArray(xs)) { ... }` or
//! `Array.isArray(xs) ? ... : ...` needs no new runtime check. Only the
//! nearest enclosing conditional is considered, and the walk stops at
//! function boundaries because a callback may run after the guarded value
//! has changed.

use crate::resolver::ScopeResolver;
use unlodash_parser::{NodeArena, NodeData, NodeFlags, NodeIndex, NodeKind};
use unlodash_scanner::SyntaxKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Branch {
    Consequent,
    Alternate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// `Array.isArray(S)`
    Positive,
    /// `!Array.isArray(S)`
    Negative,
}

/// The conditional guarding a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardContext {
    /// The `if` statement or `?:` expression.
    pub conditional: NodeIndex,
    pub branch: Branch,
    pub polarity: Polarity,
    /// The guard's subject has the same text as the call's collection.
    pub subject_matches: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// The branch only runs for arrays.
    DirectReplace,
    /// The branch only runs for non-arrays.
    Skip,
}

impl GuardContext {
    /// What the guard proves about the collection, or `None` when it checks
    /// some other value.
    pub fn decision(&self) -> Option<GuardDecision> {
        if !self.subject_matches {
            return None;
        }
        Some(match (self.polarity, self.branch) {
            (Polarity::Positive, Branch::Consequent) | (Polarity::Negative, Branch::Alternate) => {
                GuardDecision::DirectReplace
            }
            (Polarity::Positive, Branch::Alternate) | (Polarity::Negative, Branch::Consequent) => {
                GuardDecision::Skip
            }
        })
    }
}

/// Nearest `if` or `?:` with `node` in one of its branches. A conditional
/// holding `node` only in its test is passed over.
pub fn find_enclosing_conditional(
    arena: &NodeArena,
    node: NodeIndex,
) -> Option<(NodeIndex, Branch)> {
    let mut child = node;
    for parent in arena.ancestors(node) {
        let parent_node = arena.get(parent)?;
        if is_function_boundary(parent_node.kind) {
            return None;
        }
        let branch = match parent_node.data {
            NodeData::If {
                then_statement,
                else_statement,
                ..
            } => branch_of(child, then_statement, else_statement),
            NodeData::Conditional {
                when_true,
                when_false,
                ..
            } => branch_of(child, when_true, when_false),
            _ => None,
        };
        if let Some(branch) = branch {
            return Some((parent, branch));
        }
        child = parent;
    }
    None
}

/// Guard context of `call`, if its nearest enclosing conditional tests
/// `Array.isArray(S)` or `!Array.isArray(S)`.
pub fn resolve_guard(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    call: NodeIndex,
    collection: NodeIndex,
) -> Option<GuardContext> {
    let (conditional, branch) = find_enclosing_conditional(arena, call)?;
    let test = match arena.get(conditional)?.data {
        NodeData::If { expression, .. } => expression,
        NodeData::Conditional { condition, .. } => condition,
        _ => return None,
    };
    let (polarity, subject) = parse_array_check(arena, resolver, test)?;
    let subject_text = arena.node_text(arena.skip_parentheses(subject));
    let collection_text = arena.node_text(arena.skip_parentheses(collection));
    Some(GuardContext {
        conditional,
        branch,
        polarity,
        subject_matches: subject_text == collection_text,
    })
}

/// `Array.isArray(S)` or `!Array.isArray(S)`, parentheses ignored, with
/// `Array` not declared anywhere in the file's visible scopes.
pub fn parse_array_check(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    test: NodeIndex,
) -> Option<(Polarity, NodeIndex)> {
    let test = arena.skip_parentheses(test);
    let node = arena.get(test)?;
    if let NodeData::Unary {
        operator: SyntaxKind::ExclamationToken,
        operand,
    } = node.data
        && node.kind == NodeKind::PrefixUnaryExpression
    {
        let subject = is_array_call(arena, resolver, arena.skip_parentheses(operand))?;
        return Some((Polarity::Negative, subject));
    }
    let subject = is_array_call(arena, resolver, test)?;
    Some((Polarity::Positive, subject))
}

/// Subject of a plain `Array.isArray(S)` call.
fn is_array_call(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    call: NodeIndex,
) -> Option<NodeIndex> {
    let node = arena.get(call)?;
    if node.kind != NodeKind::CallExpression || node.flags.contains(NodeFlags::OPTIONAL_CHAIN) {
        return None;
    }
    let NodeData::Call {
        expression,
        ref arguments,
        ..
    } = node.data
    else {
        return None;
    };
    if arguments.len() != 1 {
        return None;
    }
    let subject = arguments.get(0)?;
    if arena.kind(subject) == Some(NodeKind::SpreadElement) {
        return None;
    }
    if !is_static_member(arena, expression, "Array", "isArray") {
        return None;
    }
    resolver.is_global(call, "Array").then_some(subject)
}

/// `object.property` with both parts plain identifiers and no `?.`.
pub(crate) fn is_static_member(
    arena: &NodeArena,
    access: NodeIndex,
    object: &str,
    property: &str,
) -> bool {
    let Some(node) = arena.get(access) else {
        return false;
    };
    if node.kind != NodeKind::PropertyAccessExpression
        || node.flags.contains(NodeFlags::OPTIONAL_CHAIN)
    {
        return false;
    }
    let NodeData::Access {
        expression,
        name_or_argument,
    } = node.data
    else {
        return false;
    };
    arena.kind(expression) == Some(NodeKind::Identifier)
        && arena.get_identifier_text(expression) == Some(object)
        && arena.get_identifier_text(name_or_argument) == Some(property)
}

#[inline]
fn branch_of(child: NodeIndex, consequent: NodeIndex, alternate: NodeIndex) -> Option<Branch> {
    if child == consequent {
        Some(Branch::Consequent)
    } else if child == alternate {
        Some(Branch::Alternate)
    } else {
        None
    }
}

/// Nodes whose contents may run at a different time than their position.
#[inline]
pub(crate) fn is_function_boundary(kind: NodeKind) -> bool {
    kind.is_function_like()
        || matches!(
            kind,
            NodeKind::PropertyDeclaration | NodeKind::ClassStaticBlockDeclaration
        )
}
