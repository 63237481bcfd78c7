//! Persistent lexical scopes.

use crate::symbols::SymbolId;
use indexmap::IndexMap;
use unlodash_parser::NodeIndex;

/// Index of a scope in `BinderState::scopes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: ScopeId = ScopeId(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// What kind of node introduced a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// The source file.
    SourceFile,
    /// Functions, arrows, methods, accessors and constructors.
    Function,
    /// Class body; holds the name of a named class expression.
    Class,
    /// `static { ... }` blocks. `var` declarations stop here.
    StaticBlock,
    /// Blocks, `for` heads and `switch` bodies.
    Block,
    /// A `catch` clause and its block.
    Catch,
}

impl ContainerKind {
    /// Scopes that receive hoisted `var` declarations.
    #[inline]
    pub fn is_var_container(self) -> bool {
        matches!(
            self,
            ContainerKind::SourceFile | ContainerKind::Function | ContainerKind::StaticBlock
        )
    }
}

/// A lexical scope and its declarations in declaration order.
#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: ScopeId,
    pub kind: ContainerKind,
    /// Node that introduced the scope.
    pub node: NodeIndex,
    pub table: IndexMap<String, SymbolId>,
}

impl Scope {
    pub fn new(parent: ScopeId, kind: ContainerKind, node: NodeIndex) -> Scope {
        Scope {
            parent,
            kind,
            node,
            table: IndexMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.table.get(name).copied()
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }
}
