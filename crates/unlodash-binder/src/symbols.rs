//! Symbols (bindings) and the references recorded against them.

use smallvec::SmallVec;
use unlodash_parser::NodeIndex;

/// Index of a symbol in `BinderState::symbols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// How a name was introduced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Parameter,
    Import,
    CatchParameter,
    /// A name used without any declaration in the file.
    ImplicitGlobal,
}

impl DeclarationKind {
    /// `const` and import bindings can never be reassigned.
    #[inline]
    pub fn is_mutable(self) -> bool {
        !matches!(self, DeclarationKind::Const | DeclarationKind::Import)
    }
}

/// Whether a reference reads, writes, or both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
    /// Compound assignment or `++`/`--`.
    ReadWrite,
}

impl AccessKind {
    #[inline]
    pub fn is_write(self) -> bool {
        matches!(self, AccessKind::Write | AccessKind::ReadWrite)
    }
}

/// One occurrence of a name in expression or binding position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reference {
    /// The identifier node.
    pub node: NodeIndex,
    /// Start offset of the identifier.
    pub pos: u32,
    pub access: AccessKind,
    /// The write performed by the declaration's own initializer.
    pub is_initializer: bool,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: DeclarationKind,
    /// Declaring name nodes; `var` and function redeclarations add more.
    pub declarations: SmallVec<[NodeIndex; 1]>,
    /// Initializer of a simple `name = init` declarator.
    pub initializer: NodeIndex,
    pub references: SmallVec<[Reference; 4]>,
}

impl Symbol {
    pub fn new(name: String, kind: DeclarationKind) -> Symbol {
        Symbol {
            name,
            kind,
            declarations: SmallVec::new(),
            initializer: NodeIndex::NONE,
            references: SmallVec::new(),
        }
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.kind.is_mutable()
    }

    /// Writes other than the declaration's own initializer.
    pub fn reassignments(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.references
            .iter()
            .filter(|r| r.access.is_write() && !r.is_initializer)
    }
}
