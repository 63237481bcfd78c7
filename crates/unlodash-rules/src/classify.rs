//! Static classification of a call's collection argument.

use crate::guard::is_static_member;
use crate::resolver::ScopeResolver;
use unlodash_parser::{NodeArena, NodeData, NodeFlags, NodeIndex, NodeKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Always an array at runtime.
    ProvenArray,
    /// Always a plain object; lodash iterates its values, native `map`
    /// does not exist.
    ProvenObjectLike,
    Unknown,
}

/// Syntactic shape of an argument, parentheses removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgumentShape {
    ArrayLiteral,
    ObjectLiteral,
    Identifier,
    Call,
    FunctionLiteral,
    /// Strings, numbers, booleans, `null`, regexes and templates without
    /// substitutions.
    Literal,
    Other,
}

impl ArgumentShape {
    pub fn of(arena: &NodeArena, node: NodeIndex) -> ArgumentShape {
        let Some(kind) = arena.kind(arena.skip_parentheses(node)) else {
            return ArgumentShape::Other;
        };
        match kind {
            NodeKind::ArrayLiteralExpression => ArgumentShape::ArrayLiteral,
            NodeKind::ObjectLiteralExpression => ArgumentShape::ObjectLiteral,
            NodeKind::Identifier => ArgumentShape::Identifier,
            NodeKind::CallExpression => ArgumentShape::Call,
            NodeKind::FunctionExpression | NodeKind::ArrowFunction => {
                ArgumentShape::FunctionLiteral
            }
            kind if kind.is_literal() => ArgumentShape::Literal,
            _ => ArgumentShape::Other,
        }
    }
}

/// Receivers and methods that always return a new array.
const ARRAY_PRODUCERS: &[(&str, &str)] = &[
    ("Array", "from"),
    ("Array", "of"),
    ("Object", "keys"),
    ("Object", "values"),
    ("Object", "entries"),
];

/// Classify `node` (a call's first argument) using the bindings visible at
/// its position.
pub fn classify(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    node: NodeIndex,
) -> Classification {
    let inner = arena.skip_parentheses(node);
    match ArgumentShape::of(arena, inner) {
        ArgumentShape::ArrayLiteral => Classification::ProvenArray,
        ArgumentShape::ObjectLiteral => Classification::ProvenObjectLike,
        ArgumentShape::Identifier => classify_identifier(arena, resolver, inner),
        ArgumentShape::Call => classify_call(arena, resolver, inner),
        ArgumentShape::FunctionLiteral | ArgumentShape::Literal | ArgumentShape::Other => {
            Classification::Unknown
        }
    }
}

/// Immutable bindings take the classification of their literal initializer.
fn classify_identifier(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    node: NodeIndex,
) -> Classification {
    let Some(name) = arena.get_identifier_text(node) else {
        return Classification::Unknown;
    };
    let Some(binding) = resolver.resolve(resolver.scope_of(node), name) else {
        return Classification::Unknown;
    };
    if binding.is_mutable() || binding.initializer.is_none() {
        return Classification::Unknown;
    }
    match ArgumentShape::of(arena, binding.initializer) {
        ArgumentShape::ArrayLiteral => Classification::ProvenArray,
        ArgumentShape::ObjectLiteral => Classification::ProvenObjectLike,
        _ => Classification::Unknown,
    }
}

/// `Array.from(..)`, `Object.keys(..)` and friends, when the receiver is the
/// global.
fn classify_call(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    node: NodeIndex,
) -> Classification {
    let Some(call) = arena.get(node) else {
        return Classification::Unknown;
    };
    if call.flags.contains(NodeFlags::OPTIONAL_CHAIN) {
        return Classification::Unknown;
    }
    let NodeData::Call { expression, .. } = call.data else {
        return Classification::Unknown;
    };
    let producer = ARRAY_PRODUCERS
        .iter()
        .find(|(receiver, method)| is_static_member(arena, expression, receiver, method));
    match producer {
        Some((receiver, _)) if resolver.is_global(node, receiver) => Classification::ProvenArray,
        _ => Classification::Unknown,
    }
}
