//! Alias integrity: was the alias reassigned before the call?

use crate::resolver::ScopeResolver;
use unlodash_parser::{NodeArena, NodeIndex};

/// True when `alias` resolves, at `call`, to a binding written by a
/// non-initializer reference that starts before the call.
///
/// Writes after the call are not considered.
pub fn alias_is_compromised(
    arena: &NodeArena,
    resolver: &dyn ScopeResolver,
    call: NodeIndex,
    alias: &str,
) -> bool {
    let Some(call_start) = arena.get(call).map(|n| n.pos) else {
        return false;
    };
    let Some(binding) = resolver.resolve(resolver.scope_of(call), alias) else {
        return false;
    };
    binding
        .references
        .iter()
        .any(|r| r.access.is_write() && !r.is_initializer && r.pos < call_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::mock::MockResolver;
    use std::sync::Arc;
    use unlodash_binder::{AccessKind, DeclarationKind, Reference, Symbol};
    use unlodash_parser::{NodeData, NodeFlags, NodeKind};

    fn alias_with(references: &[(u32, AccessKind, bool)]) -> MockResolver {
        let mut symbol = Symbol::new("_".into(), DeclarationKind::Var);
        symbol.references.extend(references.iter().map(|&(pos, access, is_initializer)| {
            Reference {
                node: NodeIndex::NONE,
                pos,
                access,
                is_initializer,
            }
        }));
        MockResolver::default().with(symbol)
    }

    /// An arena holding a single call node spanning 10..20.
    fn call_arena() -> (NodeArena, NodeIndex) {
        let mut arena = NodeArena::new();
        arena.set_source_text(Arc::from(" ".repeat(30)));
        let call = arena.add(
            NodeKind::CallExpression,
            NodeFlags::empty(),
            10,
            20,
            NodeData::Token,
        );
        (arena, call)
    }

    #[test]
    fn initializer_write_is_not_a_reassignment() {
        let (arena, call) = call_arena();
        let resolver = alias_with(&[(0, AccessKind::Write, true), (10, AccessKind::Read, false)]);
        assert!(!alias_is_compromised(&arena, &resolver, call, "_"));
    }

    #[test]
    fn earlier_write_compromises_the_alias() {
        let (arena, call) = call_arena();
        for access in [AccessKind::Write, AccessKind::ReadWrite] {
            let resolver = alias_with(&[(2, access, false)]);
            assert!(alias_is_compromised(&arena, &resolver, call, "_"));
        }
    }

    #[test]
    fn later_writes_and_reads_are_ignored() {
        let (arena, call) = call_arena();
        let resolver = alias_with(&[(5, AccessKind::Read, false), (25, AccessKind::Write, false)]);
        assert!(!alias_is_compromised(&arena, &resolver, call, "_"));
    }

    #[test]
    fn unresolved_alias_is_not_compromised() {
        let (arena, call) = call_arena();
        let resolver = MockResolver::default();
        assert!(!alias_is_compromised(&arena, &resolver, call, "_"));
    }
}
