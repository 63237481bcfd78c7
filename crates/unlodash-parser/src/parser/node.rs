//! Node types.
//!
//! Every node is stored in a `NodeArena` as a `Node`: a kind, flags, the
//! byte range of its source text (leading trivia excluded), a parent link and
//! a `NodeData` payload holding child indices. `NodeKind` is the closed set
//! of syntactic kinds; several kinds share one payload shape (all function
//! forms use `NodeData::Function`, all loops use `NodeData::Loop`, ...).

use super::base::{NodeIndex, NodeList};
use bitflags::bitflags;
use std::sync::Arc;
use unlodash_common::Span;
use unlodash_scanner::SyntaxKind;

/// Syntactic kind of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,

    // Statements
    Block,
    EmptyStatement,
    VariableStatement,
    VariableDeclarationList,
    VariableDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    ExpressionStatement,
    IfStatement,
    DoStatement,
    WhileStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    ContinueStatement,
    BreakStatement,
    ReturnStatement,
    WithStatement,
    SwitchStatement,
    CaseClause,
    DefaultClause,
    LabeledStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    DebuggerStatement,
    ImportDeclaration,
    ImportSpecifier,
    ExportDeclaration,
    ExportSpecifier,
    ExportAssignment,

    // Class members
    MethodDeclaration,
    GetAccessor,
    SetAccessor,
    Constructor,
    PropertyDeclaration,
    ClassStaticBlockDeclaration,

    // Bindings
    Parameter,
    ObjectBindingPattern,
    ArrayBindingPattern,
    BindingElement,

    // Names
    Identifier,
    PrivateIdentifier,
    ComputedPropertyName,

    // Literals
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    NoSubstitutionTemplateLiteral,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
    ThisKeyword,
    SuperKeyword,
    ImportKeyword,

    // Expressions
    ArrayLiteralExpression,
    ObjectLiteralExpression,
    PropertyAssignment,
    ShorthandPropertyAssignment,
    SpreadAssignment,
    SpreadElement,
    PropertyAccessExpression,
    ElementAccessExpression,
    CallExpression,
    NewExpression,
    TaggedTemplateExpression,
    TemplateExpression,
    TemplateSpan,
    ParenthesizedExpression,
    FunctionExpression,
    ArrowFunction,
    ClassExpression,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    AwaitExpression,
    YieldExpression,
    BinaryExpression,
    ConditionalExpression,
    OmittedExpression,
    MetaProperty,
}

impl NodeKind {
    /// Kinds whose body introduces a new function boundary.
    #[inline]
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunction
                | NodeKind::MethodDeclaration
                | NodeKind::GetAccessor
                | NodeKind::SetAccessor
                | NodeKind::Constructor
        )
    }

    #[inline]
    pub fn is_class_like(self) -> bool {
        matches!(self, NodeKind::ClassDeclaration | NodeKind::ClassExpression)
    }

    #[inline]
    pub fn is_loop(self) -> bool {
        matches!(
            self,
            NodeKind::DoStatement
                | NodeKind::WhileStatement
                | NodeKind::ForStatement
                | NodeKind::ForInStatement
                | NodeKind::ForOfStatement
        )
    }

    /// Literal tokens without side effects: strings, numbers, regexes,
    /// booleans, `null` and templates without substitutions.
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            NodeKind::NumericLiteral
                | NodeKind::BigIntLiteral
                | NodeKind::StringLiteral
                | NodeKind::RegularExpressionLiteral
                | NodeKind::NoSubstitutionTemplateLiteral
                | NodeKind::TrueKeyword
                | NodeKind::FalseKeyword
                | NodeKind::NullKeyword
        )
    }

    /// Containers whose direct children are statements.
    #[inline]
    pub fn is_statement_container(self) -> bool {
        matches!(
            self,
            NodeKind::SourceFile | NodeKind::Block | NodeKind::CaseClause | NodeKind::DefaultClause
        )
    }
}

bitflags! {
    /// Per-node flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u16 {
        /// `let` declaration list
        const LET = 1 << 0;
        /// `const` declaration list
        const CONST = 1 << 1;
        /// `?.` link in an optional chain (property access, element access or call)
        const OPTIONAL_CHAIN = 1 << 2;
        /// `async` function or method
        const ASYNC = 1 << 3;
        /// `function*` or `*method`
        const GENERATOR = 1 << 4;
        /// `static` class member
        const STATIC = 1 << 5;
        /// `...rest` parameter or binding element
        const REST = 1 << 6;
        /// `yield*`
        const DELEGATE = 1 << 7;
        /// `for await (...)`
        const AWAIT = 1 << 8;
        /// `export default ...`
        const DEFAULT_EXPORT = 1 << 9;
        /// Import/export specifier is `* as name`
        const NAMESPACE = 1 << 10;
        /// Arrow function with an expression body
        const EXPRESSION_BODY = 1 << 11;
    }
}

/// Node payload: child indices and the few scalar fields the rules read.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    /// Leaf tokens and literals; the source range is their text.
    Token,
    SourceFile {
        statements: NodeList,
    },
    Identifier {
        escaped_text: String,
    },
    Block {
        statements: NodeList,
    },
    VariableStatement {
        declaration_list: NodeIndex,
    },
    VariableDeclarationList {
        declarations: NodeList,
    },
    VariableDeclaration {
        name: NodeIndex,
        initializer: NodeIndex,
    },
    /// Function declarations and expressions, arrows, methods, accessors,
    /// constructors.
    Function {
        name: NodeIndex,
        parameters: NodeList,
        body: NodeIndex,
    },
    Class {
        name: NodeIndex,
        heritage: NodeIndex,
        members: NodeList,
    },
    PropertyDeclaration {
        name: NodeIndex,
        initializer: NodeIndex,
    },
    ClassStaticBlock {
        body: NodeIndex,
    },
    /// Parameters and binding elements.
    Binding {
        property_name: NodeIndex,
        name: NodeIndex,
        initializer: NodeIndex,
    },
    BindingPattern {
        elements: NodeList,
    },
    ExpressionStatement {
        expression: NodeIndex,
    },
    If {
        expression: NodeIndex,
        then_statement: NodeIndex,
        else_statement: NodeIndex,
    },
    /// `for (initializer; condition; incrementor) statement`, `while`, `do`.
    Loop {
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        statement: NodeIndex,
    },
    ForInOf {
        initializer: NodeIndex,
        expression: NodeIndex,
        statement: NodeIndex,
    },
    /// `return`, `throw`, `export default <expr>`.
    Return {
        expression: NodeIndex,
    },
    /// `break`, `continue`.
    Jump {
        label: NodeIndex,
    },
    Switch {
        expression: NodeIndex,
        clauses: NodeList,
    },
    CaseClause {
        expression: NodeIndex,
        statements: NodeList,
    },
    Labeled {
        label: NodeIndex,
        statement: NodeIndex,
    },
    With {
        expression: NodeIndex,
        statement: NodeIndex,
    },
    Try {
        try_block: NodeIndex,
        catch_clause: NodeIndex,
        finally_block: NodeIndex,
    },
    CatchClause {
        variable: NodeIndex,
        block: NodeIndex,
    },
    ImportDeclaration {
        specifiers: NodeList,
        module_specifier: NodeIndex,
    },
    ExportDeclaration {
        declaration: NodeIndex,
        specifiers: NodeList,
        module_specifier: NodeIndex,
    },
    /// Import and export specifiers: `property_name as name`.
    Specifier {
        property_name: NodeIndex,
        name: NodeIndex,
    },
    ComputedPropertyName {
        expression: NodeIndex,
    },
    /// Array and object literals.
    LiteralExpression {
        elements: NodeList,
    },
    PropertyAssignment {
        name: NodeIndex,
        initializer: NodeIndex,
    },
    ShorthandPropertyAssignment {
        name: NodeIndex,
        default_initializer: NodeIndex,
    },
    /// Spread elements/assignments, parenthesized, await, yield expressions.
    Wrapped {
        expression: NodeIndex,
    },
    /// Property and element access.
    Access {
        expression: NodeIndex,
        name_or_argument: NodeIndex,
    },
    /// Call and `new` expressions. `new X` without parentheses has
    /// `has_arguments == false`.
    Call {
        expression: NodeIndex,
        arguments: NodeList,
        has_arguments: bool,
    },
    TaggedTemplate {
        tag: NodeIndex,
        template: NodeIndex,
    },
    Template {
        head: NodeIndex,
        spans: NodeList,
    },
    TemplateSpan {
        expression: NodeIndex,
        literal: NodeIndex,
    },
    Unary {
        operator: SyntaxKind,
        operand: NodeIndex,
    },
    Binary {
        left: NodeIndex,
        operator: SyntaxKind,
        right: NodeIndex,
    },
    Conditional {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
}

/// A node stored in the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub flags: NodeFlags,
    /// Start of the node's first token (trivia excluded)
    pub pos: u32,
    /// End of the node's last token
    pub end: u32,
    pub parent: NodeIndex,
    pub data: NodeData,
}

impl Node {
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.pos, self.end)
    }
}

/// Arena-based storage for AST nodes.
/// Nodes are stored contiguously and referenced by index. Children are
/// always allocated before their parents.
#[derive(Debug)]
pub struct NodeArena {
    pub(crate) nodes: Vec<Node>,
    pub(crate) text: Arc<str>,
}

impl Default for NodeArena {
    fn default() -> Self {
        NodeArena {
            nodes: Vec::new(),
            text: Arc::from(""),
        }
    }
}
