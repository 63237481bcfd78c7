//! Binder state: persistent scopes, symbols and name resolution.
//!
//! `BinderState::bind_source_file` walks a parsed file twice. The first walk
//! (`state_binding.rs`) creates scopes and declares every name, so hoisted
//! `var` and function declarations are visible before their position. The
//! second walk records references against the declared symbols and creates
//! implicit globals for names declared nowhere.
//!
//! After binding, scopes are queried by node (`find_enclosing_scope`) and by
//! name (`resolve_name`) without re-walking the tree.

use crate::scopes::{ContainerKind, Scope, ScopeId};
use crate::symbols::{DeclarationKind, Symbol, SymbolId};
use rustc_hash::FxHashMap;
use tracing::{Level, debug, span, trace};
use unlodash_common::limits::{MAX_SCOPE_WALK_ITERATIONS, MAX_TREE_WALK_DEPTH};
use unlodash_parser::{NodeArena, NodeIndex};

pub struct BinderState {
    /// Persistent scopes; `ScopeId(0)` is the source file scope.
    pub scopes: Vec<Scope>,
    /// Map from scope-introducing node to its scope.
    pub node_scope_ids: FxHashMap<u32, ScopeId>,
    pub symbols: Vec<Symbol>,
    /// Map from identifier node (declaration or reference) to its symbol.
    pub node_symbols: FxHashMap<u32, SymbolId>,
    /// Set when part of the tree was deeper than `MAX_TREE_WALK_DEPTH` and
    /// was not bound.
    pub truncated: bool,
    pub(crate) current_scope_id: ScopeId,
    pub(crate) depth: u32,
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderState {
    pub fn new() -> BinderState {
        BinderState {
            scopes: Vec::new(),
            node_scope_ids: FxHashMap::default(),
            symbols: Vec::new(),
            node_symbols: FxHashMap::default(),
            truncated: false,
            current_scope_id: ScopeId::NONE,
            depth: 0,
        }
    }

    /// Reset to an empty state so the allocation can be reused.
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.node_scope_ids.clear();
        self.symbols.clear();
        self.node_symbols.clear();
        self.truncated = false;
        self.current_scope_id = ScopeId::NONE;
        self.depth = 0;
    }

    /// Bind a parsed source file rooted at `root`.
    pub fn bind_source_file(&mut self, arena: &NodeArena, root: NodeIndex) {
        self.reset();
        self.declare_pass(arena, root);
        self.current_scope_id = ScopeId::NONE;
        self.reference_pass(arena, root);
        self.current_scope_id = ScopeId::NONE;
        debug!(
            scopes = self.scopes.len(),
            symbols = self.symbols.len(),
            truncated = self.truncated,
            "[BIND] source file bound"
        );
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn get_scope(&self, id: ScopeId) -> Option<&Scope> {
        if id.is_none() {
            None
        } else {
            self.scopes.get(id.0 as usize)
        }
    }

    #[inline]
    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Symbol recorded for an identifier node during binding.
    #[inline]
    pub fn get_node_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&node.0).copied()
    }

    /// Scope of the nearest scope-introducing node at or above `node`.
    ///
    /// Falls back to the source file scope when the walk finds none.
    pub fn find_enclosing_scope(&self, arena: &NodeArena, node: NodeIndex) -> ScopeId {
        if let Some(&id) = self.node_scope_ids.get(&node.0) {
            return id;
        }
        for ancestor in arena.ancestors(node) {
            if let Some(&id) = self.node_scope_ids.get(&ancestor.0) {
                return id;
            }
        }
        ScopeId(0)
    }

    /// Resolve `name` starting at `scope` and walking outwards.
    pub fn resolve_name(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let _span = span!(Level::DEBUG, "resolve_name", name).entered();
        let mut scope_id = scope;
        let mut iterations = 0;
        while let Some(current) = self.get_scope(scope_id) {
            iterations += 1;
            if iterations > MAX_SCOPE_WALK_ITERATIONS {
                debug!("[RESOLVE] '{}' scope walk limit reached", name);
                return None;
            }
            if let Some(sym_id) = current.get(name) {
                trace!(
                    "[RESOLVE] '{}' -> {:?} in {:?} scope {}",
                    name, sym_id, current.kind, scope_id.0
                );
                return Some(sym_id);
            }
            scope_id = current.parent;
        }
        trace!("[RESOLVE] '{}' not found", name);
        None
    }

    /// Resolve an identifier node, using the symbol recorded during binding
    /// when there is one.
    pub fn resolve_identifier(&self, arena: &NodeArena, node: NodeIndex) -> Option<SymbolId> {
        if let Some(sym_id) = self.get_node_symbol(node) {
            return Some(sym_id);
        }
        let name = arena.get_identifier_text(node)?;
        self.resolve_name(self.find_enclosing_scope(arena, node), name)
    }

    /// Nearest scope at or above `scope` that receives `var` declarations.
    pub(crate) fn var_scope(&self, scope: ScopeId) -> ScopeId {
        let mut scope_id = scope;
        let mut iterations = 0;
        while let Some(current) = self.get_scope(scope_id) {
            iterations += 1;
            if current.kind.is_var_container() || iterations > MAX_SCOPE_WALK_ITERATIONS {
                return scope_id;
            }
            scope_id = current.parent;
        }
        ScopeId(0)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Create a scope for `node` nested in the current one and make it current.
    pub(crate) fn enter_persistent_scope(&mut self, kind: ContainerKind, node: NodeIndex) {
        let new_scope_id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(self.current_scope_id, kind, node));
        if node.is_some() {
            self.node_scope_ids.insert(node.0, new_scope_id);
        }
        self.current_scope_id = new_scope_id;
    }

    /// Re-enter the scope created for `node` during the declaration pass.
    /// Returns false if the node has no scope.
    pub(crate) fn reenter_scope(&mut self, node: NodeIndex) -> bool {
        match self.node_scope_ids.get(&node.0) {
            Some(&id) => {
                self.current_scope_id = id;
                true
            }
            None => false,
        }
    }

    /// Descend one tree level. Returns false (and marks the state truncated)
    /// at the depth limit; callers must then skip the subtree.
    pub(crate) fn enter_depth(&mut self) -> bool {
        if self.depth >= MAX_TREE_WALK_DEPTH {
            if !self.truncated {
                debug!("[BIND] tree depth limit reached, skipping subtree");
            }
            self.truncated = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub(crate) fn exit_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn exit_persistent_scope(&mut self) {
        if let Some(scope) = self.get_scope(self.current_scope_id) {
            self.current_scope_id = scope.parent;
        }
    }

    /// Declare `name` in `scope`, merging with an existing symbol of the same
    /// name in that scope.
    pub(crate) fn declare_symbol(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: DeclarationKind,
        declaration: NodeIndex,
    ) -> SymbolId {
        let existing = self.get_scope(scope).and_then(|s| s.get(name));
        let sym_id = match existing {
            Some(id) => id,
            None => {
                let id = SymbolId(self.symbols.len() as u32);
                self.symbols.push(Symbol::new(name.to_string(), kind));
                if let Some(s) = self.scopes.get_mut(scope.0 as usize) {
                    s.table.insert(name.to_string(), id);
                }
                trace!("[BIND] declare '{}' as {:?} in scope {}", name, kind, scope.0);
                id
            }
        };
        if declaration.is_some() {
            if let Some(symbol) = self.symbols.get_mut(sym_id.0 as usize) {
                symbol.declarations.push(declaration);
            }
            self.node_symbols.insert(declaration.0, sym_id);
        }
        sym_id
    }
}
