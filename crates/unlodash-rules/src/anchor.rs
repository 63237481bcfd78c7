//! Statement anchors and hoist safety.
//!
//! Hoisted declarations are inserted immediately before the statement that
//! contains a call. Moving a sub-expression there is only sound when the
//! call is evaluated exactly once, unconditionally, each time that statement
//! runs.

use crate::guard::is_function_boundary;
use crate::resolver::ScopeResolver;
use unlodash_parser::{NodeArena, NodeData, NodeFlags, NodeIndex, NodeKind};
use unlodash_scanner::SyntaxKind;

/// Nearest strict ancestor of `node` whose parent is the source file, a
/// block, or a case/default clause.
pub fn find_statement_anchor(arena: &NodeArena, node: NodeIndex) -> Option<NodeIndex> {
    arena.ancestors(node).find(|&ancestor| {
        arena
            .kind(arena.parent(ancestor))
            .is_some_and(|kind| kind.is_statement_container())
    })
}

/// Why a sub-expression of the call cannot be moved before its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoistBlocker {
    /// A function, class field initializer or static block lies in between.
    FunctionBoundary,
    /// The call is in a branch of `?:` or `if`, or a `case` test.
    ConditionalBranch,
    /// The call is the right operand of `&&`, `||`, `??` or a logical
    /// assignment.
    ShortCircuit,
    /// The call is in a loop body, test or update.
    LoopBody,
    /// The call follows `?.` in an optional chain.
    OptionalChain,
    /// The call is inside a `with` body.
    WithBody,
    /// The hoisted expression names a binding that the anchor statement
    /// itself declares, e.g. an earlier declarator or a `for` head.
    StatementBinding,
}

/// Check every step from `call` up to `anchor` for a construct that would
/// evaluate the call conditionally, repeatedly, or later than the anchor.
pub fn hoist_blocker(
    arena: &NodeArena,
    call: NodeIndex,
    anchor: NodeIndex,
) -> Option<HoistBlocker> {
    let mut child = call;
    for parent in arena.ancestors(call) {
        if child == anchor {
            return None;
        }
        if let Some(blocker) = step_blocker(arena, parent, child) {
            return Some(blocker);
        }
        child = parent;
    }
    None
}

#[inline]
pub fn hoist_is_safe(arena: &NodeArena, call: NodeIndex, anchor: NodeIndex) -> bool {
    hoist_blocker(arena, call, anchor).is_none()
}

/// True when an identifier in `expr` resolves to a binding declared inside
/// `anchor` but outside `expr`. Hoisted above the anchor, such a name would
/// hit the binding's temporal dead zone or resolve to an outer binding.
pub fn references_statement_binding(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    expr: NodeIndex,
    anchor: NodeIndex,
) -> bool {
    let mut stack = vec![expr];
    while let Some(idx) = stack.pop() {
        let Some(node) = arena.get(idx) else {
            continue;
        };
        if node.kind == NodeKind::Identifier {
            if is_property_name(arena, idx) {
                continue;
            }
            let Some(name) = arena.get_identifier_text(idx) else {
                continue;
            };
            let declared_here = resolver
                .resolve(resolver.scope_of(idx), name)
                .is_some_and(|binding| {
                    binding
                        .declarations
                        .iter()
                        .any(|&decl| arena.is_within(decl, anchor) && !arena.is_within(decl, expr))
                });
            if declared_here {
                return true;
            }
            continue;
        }
        node.data.for_each_child(|child| stack.push(child));
    }
    false
}

/// `b` in `a.b`, `{ b: 1 }` or `class { b() {} }`: a name, not a reference.
fn is_property_name(arena: &NodeArena, ident: NodeIndex) -> bool {
    let parent = arena.parent(ident);
    match arena.get(parent).map(|n| (n.kind, &n.data)) {
        Some((NodeKind::PropertyAccessExpression, NodeData::Access { name_or_argument, .. })) => {
            *name_or_argument == ident
        }
        Some((
            _,
            NodeData::PropertyAssignment { name, .. } | NodeData::PropertyDeclaration { name, .. },
        )) => *name == ident,
        Some((
            NodeKind::MethodDeclaration | NodeKind::GetAccessor | NodeKind::SetAccessor,
            NodeData::Function { name, .. },
        )) => *name == ident,
        _ => false,
    }
}

fn step_blocker(arena: &NodeArena, parent: NodeIndex, child: NodeIndex) -> Option<HoistBlocker> {
    let node = arena.get(parent)?;
    if is_function_boundary(node.kind) && !is_computed_name_of(arena, parent, child) {
        return Some(HoistBlocker::FunctionBoundary);
    }
    match &node.data {
        NodeData::Conditional { condition, .. } if *condition != child => {
            Some(HoistBlocker::ConditionalBranch)
        }
        NodeData::If { expression, .. } if *expression != child => {
            Some(HoistBlocker::ConditionalBranch)
        }
        NodeData::CaseClause { expression, .. } if *expression == child => {
            Some(HoistBlocker::ConditionalBranch)
        }
        NodeData::Binary {
            operator, right, ..
        } if *right == child && is_short_circuit(*operator) => {
            Some(HoistBlocker::ShortCircuit)
        }
        NodeData::Loop { initializer, .. } if *initializer != child => {
            Some(HoistBlocker::LoopBody)
        }
        NodeData::ForInOf { statement, .. } if *statement == child => {
            Some(HoistBlocker::LoopBody)
        }
        NodeData::With { statement, .. } if *statement == child => Some(HoistBlocker::WithBody),
        NodeData::Access { expression, .. } | NodeData::Call { expression, .. }
            if node.flags.contains(NodeFlags::OPTIONAL_CHAIN) && *expression != child =>
        {
            Some(HoistBlocker::OptionalChain)
        }
        _ => None,
    }
}

/// True when `child` is the computed key of the class member `member`; keys
/// are evaluated with the class definition, not per instance.
fn is_computed_name_of(arena: &NodeArena, member: NodeIndex, child: NodeIndex) -> bool {
    match arena.get(member).map(|n| &n.data) {
        Some(NodeData::PropertyDeclaration { name, .. }) => *name == child,
        _ => false,
    }
}

#[inline]
fn is_short_circuit(operator: SyntaxKind) -> bool {
    matches!(
        operator,
        SyntaxKind::AmpersandAmpersandToken
            | SyntaxKind::BarBarToken
            | SyntaxKind::QuestionQuestionToken
            | SyntaxKind::AmpersandAmpersandEqualsToken
            | SyntaxKind::BarBarEqualsToken
            | SyntaxKind::QuestionQuestionEqualsToken
    )
}
