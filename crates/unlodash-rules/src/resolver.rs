//! Scope resolution seen by the rule.
//!
//! The rule never walks scopes itself; it asks a `ScopeResolver`. The
//! binder-backed implementation is `BinderResolver`; tests substitute mocks.

use unlodash_binder::{BinderState, DeclarationKind, Reference, ScopeId};
use unlodash_parser::{NodeArena, NodeIndex};

/// Read-only view of a binding.
#[derive(Clone, Copy, Debug)]
pub struct Binding<'a> {
    pub name: &'a str,
    pub kind: DeclarationKind,
    /// Initializer of a simple `name = init` declarator, or `NONE`.
    pub initializer: NodeIndex,
    /// Declaring name nodes. Empty for implicit globals.
    pub declarations: &'a [NodeIndex],
    pub references: &'a [Reference],
}

impl Binding<'_> {
    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.kind.is_mutable()
    }

    #[inline]
    pub fn is_implicit_global(&self) -> bool {
        self.kind == DeclarationKind::ImplicitGlobal
    }
}

pub trait ScopeResolver {
    /// Innermost scope containing `node`.
    fn scope_of(&self, node: NodeIndex) -> ScopeId;

    /// Binding visible as `name` from `scope`.
    fn resolve(&self, scope: ScopeId, name: &str) -> Option<Binding<'_>>;

    /// True when `name` at `node` refers to the global object's property,
    /// i.e. no declaration in the file shadows it.
    fn is_global(&self, node: NodeIndex, name: &str) -> bool {
        self.resolve(self.scope_of(node), name)
            .is_none_or(|binding| binding.is_implicit_global())
    }
}

/// `ScopeResolver` over a bound file.
pub struct BinderResolver<'a> {
    arena: &'a NodeArena,
    binder: &'a BinderState,
}

impl<'a> BinderResolver<'a> {
    pub fn new(arena: &'a NodeArena, binder: &'a BinderState) -> Self {
        Self { arena, binder }
    }
}

impl ScopeResolver for BinderResolver<'_> {
    fn scope_of(&self, node: NodeIndex) -> ScopeId {
        self.binder.find_enclosing_scope(self.arena, node)
    }

    fn resolve(&self, scope: ScopeId, name: &str) -> Option<Binding<'_>> {
        let sym_id = self.binder.resolve_name(scope, name)?;
        let symbol = self.binder.get_symbol(sym_id)?;
        Some(Binding {
            name: &symbol.name,
            kind: symbol.kind,
            initializer: symbol.initializer,
            declarations: &symbol.declarations,
            references: &symbol.references,
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! A single-scope resolver for unit tests.

    use super::*;
    use rustc_hash::FxHashMap;
    use unlodash_binder::Symbol;

    #[derive(Default)]
    pub(crate) struct MockResolver {
        pub(crate) symbols: FxHashMap<String, Symbol>,
    }

    impl MockResolver {
        pub(crate) fn with(mut self, symbol: Symbol) -> Self {
            self.symbols.insert(symbol.name.clone(), symbol);
            self
        }
    }

    impl ScopeResolver for MockResolver {
        fn scope_of(&self, _node: NodeIndex) -> ScopeId {
            ScopeId(0)
        }

        fn resolve(&self, _scope: ScopeId, name: &str) -> Option<Binding<'_>> {
            self.symbols.get(name).map(|symbol| Binding {
                name: &symbol.name,
                kind: symbol.kind,
                initializer: symbol.initializer,
                declarations: &symbol.declarations,
                references: &symbol.references,
            })
        }
    }
}
