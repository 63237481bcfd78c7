//! NodeArena access methods and child iteration.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use unlodash_common::limits::MAX_PARENT_WALK;

impl NodeData {
    /// Visit every present child index in source order.
    pub fn for_each_child(&self, mut f: impl FnMut(NodeIndex)) {
        let mut one = |idx: NodeIndex| {
            if idx.is_some() {
                f(idx);
            }
        };
        match self {
            NodeData::Token | NodeData::Identifier { .. } => {}
            NodeData::SourceFile { statements } | NodeData::Block { statements } => {
                list(statements, &mut one)
            }
            NodeData::VariableStatement { declaration_list } => one(*declaration_list),
            NodeData::VariableDeclarationList { declarations } => list(declarations, &mut one),
            NodeData::VariableDeclaration { name, initializer }
            | NodeData::PropertyDeclaration { name, initializer }
            | NodeData::PropertyAssignment { name, initializer } => {
                one(*name);
                one(*initializer);
            }
            NodeData::Function {
                name,
                parameters,
                body,
            } => {
                one(*name);
                list(parameters, &mut one);
                one(*body);
            }
            NodeData::Class {
                name,
                heritage,
                members,
            } => {
                one(*name);
                one(*heritage);
                list(members, &mut one);
            }
            NodeData::ClassStaticBlock { body } => one(*body),
            NodeData::Binding {
                property_name,
                name,
                initializer,
            } => {
                one(*property_name);
                one(*name);
                one(*initializer);
            }
            NodeData::BindingPattern { elements } | NodeData::LiteralExpression { elements } => {
                list(elements, &mut one)
            }
            NodeData::ExpressionStatement { expression }
            | NodeData::Return { expression }
            | NodeData::ComputedPropertyName { expression }
            | NodeData::Wrapped { expression } => one(*expression),
            NodeData::If {
                expression,
                then_statement,
                else_statement,
            } => {
                one(*expression);
                one(*then_statement);
                one(*else_statement);
            }
            NodeData::Loop {
                initializer,
                condition,
                incrementor,
                statement,
            } => {
                // `do` bodies precede their condition; index order is source order.
                let mut parts = [*initializer, *condition, *incrementor, *statement];
                parts.sort_unstable();
                for idx in parts {
                    one(idx);
                }
            }
            NodeData::ForInOf {
                initializer,
                expression,
                statement,
            } => {
                one(*initializer);
                one(*expression);
                one(*statement);
            }
            NodeData::Jump { label } => one(*label),
            NodeData::Switch {
                expression,
                clauses,
            } => {
                one(*expression);
                list(clauses, &mut one);
            }
            NodeData::CaseClause {
                expression,
                statements,
            } => {
                one(*expression);
                list(statements, &mut one);
            }
            NodeData::Labeled { label, statement } => {
                one(*label);
                one(*statement);
            }
            NodeData::With {
                expression,
                statement,
            } => {
                one(*expression);
                one(*statement);
            }
            NodeData::Try {
                try_block,
                catch_clause,
                finally_block,
            } => {
                one(*try_block);
                one(*catch_clause);
                one(*finally_block);
            }
            NodeData::CatchClause { variable, block } => {
                one(*variable);
                one(*block);
            }
            NodeData::ImportDeclaration {
                specifiers,
                module_specifier,
            } => {
                list(specifiers, &mut one);
                one(*module_specifier);
            }
            NodeData::ExportDeclaration {
                declaration,
                specifiers,
                module_specifier,
            } => {
                one(*declaration);
                list(specifiers, &mut one);
                one(*module_specifier);
            }
            NodeData::Specifier {
                property_name,
                name,
            } => {
                one(*property_name);
                one(*name);
            }
            NodeData::ShorthandPropertyAssignment {
                name,
                default_initializer,
            } => {
                one(*name);
                one(*default_initializer);
            }
            NodeData::Access {
                expression,
                name_or_argument,
            } => {
                one(*expression);
                one(*name_or_argument);
            }
            NodeData::Call {
                expression,
                arguments,
                ..
            } => {
                one(*expression);
                list(arguments, &mut one);
            }
            NodeData::TaggedTemplate { tag, template } => {
                one(*tag);
                one(*template);
            }
            NodeData::Template { head, spans } => {
                one(*head);
                list(spans, &mut one);
            }
            NodeData::TemplateSpan {
                expression,
                literal,
            } => {
                one(*expression);
                one(*literal);
            }
            NodeData::Unary { operand, .. } => one(*operand),
            NodeData::Binary { left, right, .. } => {
                one(*left);
                one(*right);
            }
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                one(*condition);
                one(*when_true);
                one(*when_false);
            }
        }
    }
}

#[inline]
fn list(nodes: &NodeList, f: &mut impl FnMut(NodeIndex)) {
    for idx in nodes.iter() {
        f(idx);
    }
}

impl NodeArena {
    /// Get a node by index.
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<NodeKind> {
        self.get(index).map(|n| n.kind)
    }

    #[inline]
    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.parent)
    }

    /// Children in source order.
    pub fn get_children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        if let Some(node) = self.get(index) {
            node.data.for_each_child(|c| out.push(c));
        }
        out
    }

    /// Source text covered by the node.
    pub fn node_text(&self, index: NodeIndex) -> &str {
        self.get(index)
            .and_then(|n| self.text.get(n.pos as usize..n.end as usize))
            .unwrap_or("")
    }

    /// Identifier name, or `None` if the node is not an identifier.
    pub fn get_identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match &self.get(index)?.data {
            NodeData::Identifier { escaped_text } => Some(escaped_text),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn skip_parentheses(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(node) = self.get(index)
            && node.kind == NodeKind::ParenthesizedExpression
            && let NodeData::Wrapped { expression } = node.data
        {
            index = expression;
        }
        index
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            current: self.parent(index),
            steps: 0,
        }
    }

    /// True if `node` is `ancestor` or lies inside it.
    pub fn is_within(&self, node: NodeIndex, ancestor: NodeIndex) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Call/new arguments, or `None` for other kinds.
    pub fn get_call_arguments(&self, index: NodeIndex) -> Option<&NodeList> {
        match &self.get(index)?.data {
            NodeData::Call { arguments, .. } => Some(arguments),
            _ => None,
        }
    }

    /// Declarations of a variable statement or declaration list.
    pub fn get_declarations(&self, index: NodeIndex) -> Option<&NodeList> {
        match &self.get(index)?.data {
            NodeData::VariableStatement { declaration_list } => {
                self.get_declarations(*declaration_list)
            }
            NodeData::VariableDeclarationList { declarations } => Some(declarations),
            _ => None,
        }
    }

    /// Statements of a source file, block or case clause.
    pub fn get_statements(&self, index: NodeIndex) -> Option<&NodeList> {
        match &self.get(index)?.data {
            NodeData::SourceFile { statements } | NodeData::Block { statements } => {
                Some(statements)
            }
            NodeData::CaseClause { statements, .. } => Some(statements),
            _ => None,
        }
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'a> {
    arena: &'a NodeArena,
    current: NodeIndex,
    steps: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        if self.current.is_none() || self.steps >= MAX_PARENT_WALK {
            return None;
        }
        let out = self.current;
        self.current = self.arena.parent(out);
        self.steps += 1;
        Some(out)
    }
}
