//! The two binding walks: declarations first, then references.

use crate::scopes::{ContainerKind, ScopeId};
use crate::state::BinderState;
use crate::symbols::{AccessKind, DeclarationKind, Reference, SymbolId};
use tracing::trace;
use unlodash_parser::{Node, NodeArena, NodeData, NodeFlags, NodeIndex, NodeKind};
use unlodash_scanner::SyntaxKind;

impl BinderState {
    // =========================================================================
    // Declaration pass
    // =========================================================================

    pub(crate) fn declare_pass(&mut self, arena: &NodeArena, root: NodeIndex) {
        self.enter_persistent_scope(ContainerKind::SourceFile, root);
        if let Some(root_node) = arena.get(root) {
            root_node
                .data
                .for_each_child(|child| self.declare_node(arena, child));
        }
        self.exit_persistent_scope();
    }

    fn declare_node(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        if !self.enter_depth() {
            return;
        }
        match node.kind {
            kind if kind.is_function_like() => self.declare_function(arena, idx, node),
            NodeKind::ClassDeclaration | NodeKind::ClassExpression => {
                self.declare_class(arena, idx, node)
            }
            NodeKind::ClassStaticBlockDeclaration => {
                self.enter_persistent_scope(ContainerKind::StaticBlock, idx);
                if let NodeData::ClassStaticBlock { body } = node.data {
                    self.declare_statements_of(arena, body);
                }
                self.exit_persistent_scope();
            }
            NodeKind::Block
            | NodeKind::ForStatement
            | NodeKind::ForInStatement
            | NodeKind::ForOfStatement
            | NodeKind::SwitchStatement => {
                self.enter_persistent_scope(ContainerKind::Block, idx);
                node.data
                    .for_each_child(|child| self.declare_node(arena, child));
                self.exit_persistent_scope();
            }
            NodeKind::CatchClause => {
                self.enter_persistent_scope(ContainerKind::Catch, idx);
                if let NodeData::CatchClause { variable, block } = node.data {
                    let scope = self.current_scope_id;
                    self.declare_binding_names(
                        arena,
                        variable,
                        DeclarationKind::CatchParameter,
                        scope,
                    );
                    self.declare_node(arena, variable);
                    self.declare_statements_of(arena, block);
                }
                self.exit_persistent_scope();
            }
            NodeKind::VariableDeclarationList => self.declare_variable_list(arena, node),
            NodeKind::ImportDeclaration => {
                if let NodeData::ImportDeclaration { specifiers, .. } = &node.data {
                    let scope = self.current_scope_id;
                    for specifier in specifiers.iter() {
                        if let Some(NodeData::Specifier { name, .. }) =
                            arena.get(specifier).map(|n| &n.data)
                        {
                            self.declare_binding_names(
                                arena,
                                *name,
                                DeclarationKind::Import,
                                scope,
                            );
                        }
                    }
                }
            }
            _ => node
                .data
                .for_each_child(|child| self.declare_node(arena, child)),
        }
        self.exit_depth();
    }

    fn declare_function(&mut self, arena: &NodeArena, idx: NodeIndex, node: &Node) {
        let NodeData::Function {
            name,
            ref parameters,
            body,
        } = node.data
        else {
            return;
        };
        match node.kind {
            NodeKind::FunctionDeclaration => {
                let scope = self.current_scope_id;
                self.declare_binding_names(arena, name, DeclarationKind::Function, scope);
            }
            // Computed member names are evaluated in the enclosing scope.
            NodeKind::FunctionExpression | NodeKind::ArrowFunction => {}
            _ => self.declare_node(arena, name),
        }

        self.enter_persistent_scope(ContainerKind::Function, idx);
        if node.kind == NodeKind::FunctionExpression {
            let scope = self.current_scope_id;
            self.declare_binding_names(arena, name, DeclarationKind::Function, scope);
        }
        let scope = self.current_scope_id;
        for param in parameters.iter() {
            if let Some(NodeData::Binding { name, .. }) = arena.get(param).map(|n| &n.data) {
                self.declare_binding_names(arena, *name, DeclarationKind::Parameter, scope);
            }
            self.declare_node(arena, param);
        }
        self.declare_statements_of(arena, body);
        self.exit_persistent_scope();
    }

    fn declare_class(&mut self, arena: &NodeArena, idx: NodeIndex, node: &Node) {
        let NodeData::Class {
            name,
            heritage,
            ref members,
        } = node.data
        else {
            return;
        };
        if node.kind == NodeKind::ClassDeclaration {
            let scope = self.current_scope_id;
            self.declare_binding_names(arena, name, DeclarationKind::Class, scope);
        }
        self.enter_persistent_scope(ContainerKind::Class, idx);
        if node.kind == NodeKind::ClassExpression {
            let scope = self.current_scope_id;
            self.declare_binding_names(arena, name, DeclarationKind::Class, scope);
        }
        self.declare_node(arena, heritage);
        for member in members.iter() {
            self.declare_node(arena, member);
        }
        self.exit_persistent_scope();
    }

    fn declare_variable_list(&mut self, arena: &NodeArena, node: &Node) {
        let NodeData::VariableDeclarationList { declarations } = &node.data else {
            return;
        };
        let kind = declaration_kind(node.flags);
        let scope = if kind == DeclarationKind::Var {
            self.var_scope(self.current_scope_id)
        } else {
            self.current_scope_id
        };
        for decl in declarations.iter() {
            let Some(NodeData::VariableDeclaration { name, initializer }) =
                arena.get(decl).map(|n| &n.data)
            else {
                continue;
            };
            let (name, initializer) = (*name, *initializer);
            if let Some(sym_id) = self.declare_binding_names(arena, name, kind, scope)
                && initializer.is_some()
                && let Some(symbol) = self.symbols.get_mut(sym_id.0 as usize)
                && symbol.initializer.is_none()
            {
                symbol.initializer = initializer;
            }
            self.declare_node(arena, name);
            self.declare_node(arena, initializer);
        }
    }

    /// Body of a function, static block or catch clause. A block body shares
    /// the scope of its owner.
    fn declare_statements_of(&mut self, arena: &NodeArena, body: NodeIndex) {
        match arena.get_statements(body) {
            Some(statements) => {
                for statement in statements.iter() {
                    self.declare_node(arena, statement);
                }
            }
            None => self.declare_node(arena, body),
        }
    }

    /// Declare every identifier bound by `name` (an identifier or a binding
    /// pattern). Returns the symbol when `name` is a plain identifier.
    fn declare_binding_names(
        &mut self,
        arena: &NodeArena,
        name: NodeIndex,
        kind: DeclarationKind,
        scope: ScopeId,
    ) -> Option<SymbolId> {
        let node = arena.get(name)?;
        match &node.data {
            NodeData::Identifier { escaped_text } => {
                Some(self.declare_symbol(scope, escaped_text, kind, name))
            }
            NodeData::BindingPattern { elements } => {
                for element in elements.iter() {
                    if let Some(NodeData::Binding { name, .. }) =
                        arena.get(element).map(|n| &n.data)
                    {
                        self.declare_binding_names(arena, *name, kind, scope);
                    }
                }
                None
            }
            _ => None,
        }
    }

    // =========================================================================
    // Reference pass
    // =========================================================================

    pub(crate) fn reference_pass(&mut self, arena: &NodeArena, root: NodeIndex) {
        self.reenter_scope(root);
        if let Some(root_node) = arena.get(root) {
            root_node
                .data
                .for_each_child(|child| self.bind_references(arena, child));
        }
        self.exit_persistent_scope();
    }

    fn bind_references(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        if !self.enter_depth() {
            return;
        }
        match &node.data {
            NodeData::Identifier { .. } => {
                if node.kind == NodeKind::Identifier {
                    self.record_reference(arena, idx, AccessKind::Read, false);
                }
            }
            NodeData::Function {
                name,
                parameters,
                body,
            } => {
                if !matches!(
                    node.kind,
                    NodeKind::FunctionDeclaration
                        | NodeKind::FunctionExpression
                        | NodeKind::ArrowFunction
                ) {
                    self.bind_property_name(arena, *name);
                }
                let entered = self.reenter_scope(idx);
                for param in parameters.iter() {
                    self.bind_binding_element(arena, param, None);
                }
                self.bind_statements_of(arena, *body);
                if entered {
                    self.exit_persistent_scope();
                }
            }
            NodeData::Class {
                heritage, members, ..
            } => {
                let entered = self.reenter_scope(idx);
                self.bind_references(arena, *heritage);
                for member in members.iter() {
                    self.bind_references(arena, member);
                }
                if entered {
                    self.exit_persistent_scope();
                }
            }
            NodeData::ClassStaticBlock { body } => {
                let entered = self.reenter_scope(idx);
                self.bind_statements_of(arena, *body);
                if entered {
                    self.exit_persistent_scope();
                }
            }
            NodeData::CatchClause { variable, block } => {
                let entered = self.reenter_scope(idx);
                self.bind_binding_target(arena, *variable, None);
                self.bind_statements_of(arena, *block);
                if entered {
                    self.exit_persistent_scope();
                }
            }
            NodeData::VariableDeclarationList { declarations } => {
                for decl in declarations.iter() {
                    if let Some(NodeData::VariableDeclaration { name, initializer }) =
                        arena.get(decl).map(|n| &n.data)
                    {
                        let access = initializer.is_some().then_some((AccessKind::Write, true));
                        self.bind_binding_target(arena, *name, access);
                        self.bind_references(arena, *initializer);
                    }
                }
            }
            NodeData::ForInOf {
                initializer,
                expression,
                statement,
            } => {
                let entered = self.reenter_scope(idx);
                match arena.get(*initializer) {
                    Some(Node {
                        data: NodeData::VariableDeclarationList { declarations },
                        ..
                    }) => {
                        // Each iteration assigns the loop variable.
                        for decl in declarations.iter() {
                            if let Some(NodeData::VariableDeclaration { name, initializer }) =
                                arena.get(decl).map(|n| &n.data)
                            {
                                self.bind_binding_target(
                                    arena,
                                    *name,
                                    Some((AccessKind::Write, false)),
                                );
                                self.bind_references(arena, *initializer);
                            }
                        }
                    }
                    _ => self.bind_assignment_target(arena, *initializer, AccessKind::Write),
                }
                self.bind_references(arena, *expression);
                self.bind_references(arena, *statement);
                if entered {
                    self.exit_persistent_scope();
                }
            }
            NodeData::Access {
                expression,
                name_or_argument,
            } => {
                self.bind_references(arena, *expression);
                if node.kind == NodeKind::ElementAccessExpression {
                    self.bind_references(arena, *name_or_argument);
                }
            }
            NodeData::PropertyAssignment { name, initializer }
            | NodeData::PropertyDeclaration { name, initializer } => {
                self.bind_property_name(arena, *name);
                self.bind_references(arena, *initializer);
            }
            NodeData::Binary {
                left,
                operator,
                right,
            } if operator.is_assignment_operator() => {
                let access = if *operator == SyntaxKind::EqualsToken {
                    AccessKind::Write
                } else {
                    AccessKind::ReadWrite
                };
                self.bind_assignment_target(arena, *left, access);
                self.bind_references(arena, *right);
            }
            NodeData::Unary { operator, operand }
                if matches!(
                    operator,
                    SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
                ) =>
            {
                self.bind_assignment_target(arena, *operand, AccessKind::ReadWrite);
            }
            NodeData::Labeled { statement, .. } => self.bind_references(arena, *statement),
            NodeData::Jump { .. } | NodeData::ImportDeclaration { .. } => {}
            NodeData::ExportDeclaration {
                declaration,
                specifiers,
                module_specifier,
            } => {
                self.bind_references(arena, *declaration);
                if module_specifier.is_none() {
                    for specifier in specifiers.iter() {
                        if let Some(NodeData::Specifier {
                            property_name,
                            name,
                        }) = arena.get(specifier).map(|n| &n.data)
                        {
                            let local = if property_name.is_some() {
                                *property_name
                            } else {
                                *name
                            };
                            if arena.kind(local) == Some(NodeKind::Identifier) {
                                self.record_reference(arena, local, AccessKind::Read, false);
                            }
                        }
                    }
                }
            }
            _ => {
                let entered = self.reenter_scope(idx);
                node.data
                    .for_each_child(|child| self.bind_references(arena, child));
                if entered {
                    self.exit_persistent_scope();
                }
            }
        }
        self.exit_depth();
    }

    fn bind_statements_of(&mut self, arena: &NodeArena, body: NodeIndex) {
        match arena.get_statements(body) {
            Some(statements) => {
                for statement in statements.iter() {
                    self.bind_references(arena, statement);
                }
            }
            None => self.bind_references(arena, body),
        }
    }

    /// Only computed property names contain references.
    fn bind_property_name(&mut self, arena: &NodeArena, name: NodeIndex) {
        if arena.kind(name) == Some(NodeKind::ComputedPropertyName) {
            self.bind_references(arena, name);
        }
    }

    /// A parameter or binding element: the bound names, computed keys and
    /// default values.
    fn bind_binding_element(
        &mut self,
        arena: &NodeArena,
        element: NodeIndex,
        access: Option<(AccessKind, bool)>,
    ) {
        if let Some(NodeData::Binding {
            property_name,
            name,
            initializer,
        }) = arena.get(element).map(|n| &n.data)
        {
            self.bind_property_name(arena, *property_name);
            self.bind_binding_target(arena, *name, access);
            self.bind_references(arena, *initializer);
        }
    }

    /// Names bound by a declaration. `access` is recorded on each bound
    /// identifier; `None` records nothing.
    fn bind_binding_target(
        &mut self,
        arena: &NodeArena,
        name: NodeIndex,
        access: Option<(AccessKind, bool)>,
    ) {
        let Some(node) = arena.get(name) else {
            return;
        };
        match &node.data {
            NodeData::Identifier { .. } => {
                if let Some((access, is_initializer)) = access
                    && let Some(sym_id) = self.get_node_symbol(name)
                {
                    self.push_reference(sym_id, name, node.pos, access, is_initializer);
                }
            }
            NodeData::BindingPattern { elements } => {
                for element in elements.iter() {
                    self.bind_binding_element(arena, element, access);
                }
            }
            _ => {}
        }
    }

    /// The left side of an assignment, the operand of `++`/`--`, or the head
    /// of a `for-in`/`for-of` without a declaration. Array and object
    /// literals are destructuring targets.
    fn bind_assignment_target(&mut self, arena: &NodeArena, target: NodeIndex, access: AccessKind) {
        let Some(node) = arena.get(target) else {
            return;
        };
        match (&node.kind, &node.data) {
            (NodeKind::Identifier, _) => self.record_reference(arena, target, access, false),
            (NodeKind::ParenthesizedExpression, NodeData::Wrapped { expression }) => {
                self.bind_assignment_target(arena, *expression, access)
            }
            (NodeKind::ArrayLiteralExpression, NodeData::LiteralExpression { elements }) => {
                for element in elements.iter() {
                    self.bind_destructuring_element(arena, element);
                }
            }
            (NodeKind::ObjectLiteralExpression, NodeData::LiteralExpression { elements }) => {
                for member in elements.iter() {
                    let Some(member_node) = arena.get(member) else {
                        continue;
                    };
                    match &member_node.data {
                        NodeData::PropertyAssignment { name, initializer } => {
                            self.bind_property_name(arena, *name);
                            self.bind_destructuring_element(arena, *initializer);
                        }
                        NodeData::ShorthandPropertyAssignment {
                            name,
                            default_initializer,
                        } => {
                            self.record_reference(arena, *name, AccessKind::Write, false);
                            self.bind_references(arena, *default_initializer);
                        }
                        _ => self.bind_destructuring_element(arena, member),
                    }
                }
            }
            _ => self.bind_references(arena, target),
        }
    }

    /// One element of a destructuring assignment: `a`, `a = 1`, `...a`, or
    /// a nested pattern.
    fn bind_destructuring_element(&mut self, arena: &NodeArena, element: NodeIndex) {
        let Some(node) = arena.get(element) else {
            return;
        };
        match &node.data {
            NodeData::Wrapped { expression }
                if matches!(
                    node.kind,
                    NodeKind::SpreadElement | NodeKind::SpreadAssignment
                ) =>
            {
                self.bind_assignment_target(arena, *expression, AccessKind::Write)
            }
            NodeData::Binary {
                left,
                operator: SyntaxKind::EqualsToken,
                right,
            } => {
                self.bind_assignment_target(arena, *left, AccessKind::Write);
                self.bind_references(arena, *right);
            }
            NodeData::Token if node.kind == NodeKind::OmittedExpression => {}
            _ => self.bind_assignment_target(arena, element, AccessKind::Write),
        }
    }

    /// Resolve an identifier in the current scope and record the reference,
    /// creating an implicit global when no declaration is visible.
    fn record_reference(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        access: AccessKind,
        is_initializer: bool,
    ) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        let NodeData::Identifier { escaped_text } = &node.data else {
            return;
        };
        if node.kind != NodeKind::Identifier {
            return;
        }
        let sym_id = match self.resolve_name(self.current_scope_id, escaped_text) {
            Some(sym_id) => sym_id,
            None => {
                trace!("[BIND] implicit global '{}'", escaped_text);
                self.declare_symbol(
                    ScopeId(0),
                    escaped_text,
                    DeclarationKind::ImplicitGlobal,
                    NodeIndex::NONE,
                )
            }
        };
        self.node_symbols.insert(idx.0, sym_id);
        self.push_reference(sym_id, idx, node.pos, access, is_initializer);
    }

    fn push_reference(
        &mut self,
        sym_id: SymbolId,
        node: NodeIndex,
        pos: u32,
        access: AccessKind,
        is_initializer: bool,
    ) {
        if let Some(symbol) = self.symbols.get_mut(sym_id.0 as usize) {
            symbol.references.push(Reference {
                node,
                pos,
                access,
                is_initializer,
            });
        }
    }
}

fn declaration_kind(flags: NodeFlags) -> DeclarationKind {
    if flags.contains(NodeFlags::CONST) {
        DeclarationKind::Const
    } else if flags.contains(NodeFlags::LET) {
        DeclarationKind::Let
    } else {
        DeclarationKind::Var
    }
}
