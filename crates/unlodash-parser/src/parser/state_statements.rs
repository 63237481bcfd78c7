//! Parser state - source file, statement and declaration parsing.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::state::{
    CONTEXT_FLAG_ASYNC, CONTEXT_FLAG_DISALLOW_IN, CONTEXT_FLAG_GENERATOR,
    CONTEXT_FLAG_IN_FUNCTION, ParserState,
};
use tracing::debug;
use unlodash_common::diagnostics::diagnostic_codes;
use unlodash_scanner::SyntaxKind;

impl ParserState {
    // =========================================================================
    // Source File
    // =========================================================================

    /// Parse the whole unit and return the `SourceFile` node.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        self.scanner.scan_shebang_trivia();
        self.next_token();

        let statements = self.parse_statement_list(|p| p.is_token(SyntaxKind::EndOfFileToken));
        let end = self.scanner.source_text().len() as u32;

        debug!(
            file = %self.file_name,
            nodes = self.arena.len(),
            errors = self.parse_diagnostics.len(),
            "parsed source file"
        );

        self.arena.add(
            NodeKind::SourceFile,
            NodeFlags::empty(),
            0,
            end,
            NodeData::SourceFile { statements },
        )
    }

    /// Parse statements until `is_end` holds or input runs out. Tokens that
    /// cannot start a statement are skipped with a diagnostic.
    pub(crate) fn parse_statement_list(&mut self, is_end: impl Fn(&Self) -> bool) -> NodeList {
        let mut statements = Vec::new();
        while !is_end(self) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let start = self.token_pos();
            let stmt = self.parse_statement();
            if stmt.is_some() {
                statements.push(stmt);
            }
            // Each iteration must consume input.
            if self.token_pos() == start && !is_end(self) {
                self.parse_error_at_current_token(
                    "Declaration or statement expected.",
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.next_token();
            }
        }
        NodeList::from_vec(statements)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return NodeIndex::NONE;
        }
        let result = self.parse_statement_worker();
        self.exit_recursion();
        result
    }

    fn parse_statement_worker(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                let pos = self.token_pos();
                self.next_token();
                self.arena
                    .add_token(NodeKind::EmptyStatement, pos, self.prev_token_end)
            }
            SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword => self.parse_variable_statement(),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(false),
            SyntaxKind::ClassKeyword => self.parse_class(NodeKind::ClassDeclaration, false),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ContinueKeyword => self.parse_jump(NodeKind::ContinueStatement),
            SyntaxKind::BreakKeyword => self.parse_jump(NodeKind::BreakStatement),
            SyntaxKind::ReturnKeyword => self.parse_return_or_throw(NodeKind::ReturnStatement),
            SyntaxKind::ThrowKeyword => self.parse_return_or_throw(NodeKind::ThrowStatement),
            SyntaxKind::WithKeyword => self.parse_with_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::DebuggerKeyword => {
                let pos = self.token_pos();
                self.next_token();
                self.parse_semicolon();
                self.arena
                    .add_token(NodeKind::DebuggerStatement, pos, self.prev_token_end)
            }
            SyntaxKind::ImportKeyword if self.is_import_declaration_start() => {
                self.parse_import_declaration()
            }
            SyntaxKind::ExportKeyword => self.parse_export_declaration(),
            SyntaxKind::Identifier => {
                if self.is_let_declaration_start() {
                    return self.parse_variable_statement();
                }
                if self.is_async_function_start() {
                    return self.parse_function_declaration(false);
                }
                if self.peek_token().0 == SyntaxKind::ColonToken {
                    return self.parse_labeled_statement();
                }
                self.parse_expression_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `let` starts a declaration when followed by a binding name or pattern.
    pub(crate) fn is_let_declaration_start(&mut self) -> bool {
        self.is_contextual("let")
            && matches!(
                self.peek_token().0,
                SyntaxKind::Identifier | SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
            )
    }

    /// `async function` with no line break between the two words.
    pub(crate) fn is_async_function_start(&mut self) -> bool {
        self.is_contextual("async") && {
            let (next, line_break) = self.peek_token();
            next == SyntaxKind::FunctionKeyword && !line_break
        }
    }

    fn is_import_declaration_start(&mut self) -> bool {
        !matches!(
            self.peek_token().0,
            SyntaxKind::OpenParenToken | SyntaxKind::DotToken
        )
    }

    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let statements =
            self.parse_statement_list(|p| p.is_token(SyntaxKind::CloseBraceToken));
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            NodeKind::Block,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Block { statements },
        )
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = self.parse_expression();
        if expression.is_none() {
            self.error_expression_expected();
            return NodeIndex::NONE;
        }
        self.parse_semicolon();
        self.arena.add(
            NodeKind::ExpressionStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::ExpressionStatement { expression },
        )
    }

    fn parse_labeled_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let label = self.parse_identifier();
        self.parse_expected(SyntaxKind::ColonToken);
        let statement = self.parse_statement();
        self.arena.add(
            NodeKind::LabeledStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Labeled { label, statement },
        )
    }

    fn parse_if_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            NodeKind::IfStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::If {
                expression,
                then_statement,
                else_statement,
            },
        )
    }

    fn parse_do_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let statement = self.parse_statement();
        self.parse_expected(SyntaxKind::WhileKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        // `do ... while (x)` may be followed by a statement on the same line.
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.arena.add(
            NodeKind::DoStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Loop {
                initializer: NodeIndex::NONE,
                condition,
                incrementor: NodeIndex::NONE,
                statement,
            },
        )
    }

    fn parse_while_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        self.arena.add(
            NodeKind::WhileStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Loop {
                initializer: NodeIndex::NONE,
                condition,
                incrementor: NodeIndex::NONE,
                statement,
            },
        )
    }

    /// `for (;;)`, `for (x in o)`, `for (x of o)`, `for await (x of o)`.
    fn parse_for_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut flags = NodeFlags::empty();
        if self.is_contextual("await") {
            flags |= NodeFlags::AWAIT;
            self.next_token();
        }
        self.parse_expected(SyntaxKind::OpenParenToken);

        let initializer = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.with_context(CONTEXT_FLAG_DISALLOW_IN, 0, |p| {
                if p.is_token(SyntaxKind::VarKeyword)
                    || p.is_token(SyntaxKind::ConstKeyword)
                    || p.is_let_declaration_start()
                {
                    p.parse_variable_declaration_list()
                } else {
                    p.parse_expression()
                }
            })
        };

        let in_of = if self.is_token(SyntaxKind::InKeyword) {
            Some(NodeKind::ForInStatement)
        } else if self.is_contextual("of") {
            Some(NodeKind::ForOfStatement)
        } else {
            None
        };

        if let Some(kind) = in_of {
            self.next_token();
            let expression = if kind == NodeKind::ForOfStatement {
                self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
                    p.parse_assignment_expression()
                })
            } else {
                self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression())
            };
            self.parse_expected(SyntaxKind::CloseParenToken);
            let statement = self.parse_statement();
            return self.arena.add(
                kind,
                flags,
                pos,
                self.prev_token_end,
                NodeData::ForInOf {
                    initializer,
                    expression,
                    statement,
                },
            );
        }

        self.parse_expected(SyntaxKind::SemicolonToken);
        let condition = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression())
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        let incrementor = if self.is_token(SyntaxKind::CloseParenToken) {
            NodeIndex::NONE
        } else {
            self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression())
        };
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        self.arena.add(
            NodeKind::ForStatement,
            flags,
            pos,
            self.prev_token_end,
            NodeData::Loop {
                initializer,
                condition,
                incrementor,
                statement,
            },
        )
    }

    fn parse_jump(&mut self, kind: NodeKind) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let label = if self.is_token(SyntaxKind::Identifier) && !self.has_preceding_line_break() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        self.arena.add(
            kind,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Jump { label },
        )
    }

    fn parse_return_or_throw(&mut self, kind: NodeKind) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = if self.can_insert_semicolon() || self.is_token(SyntaxKind::SemicolonToken)
        {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_semicolon();
        self.arena.add(
            kind,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Return { expression },
        )
    }

    fn parse_with_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        self.arena.add(
            NodeKind::WithStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::With {
                expression,
                statement,
            },
        )
    }

    fn parse_switch_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.parse_expected(SyntaxKind::OpenBraceToken);

        let mut clauses = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let clause_pos = self.token_pos();
            let (kind, test) = if self.parse_optional(SyntaxKind::CaseKeyword) {
                (NodeKind::CaseClause, self.parse_expression())
            } else if self.parse_optional(SyntaxKind::DefaultKeyword) {
                (NodeKind::DefaultClause, NodeIndex::NONE)
            } else {
                self.parse_error_at_current_token(
                    "'case' or 'default' expected.",
                    diagnostic_codes::TOKEN_EXPECTED,
                );
                self.next_token();
                continue;
            };
            self.parse_expected(SyntaxKind::ColonToken);
            let statements = self.parse_statement_list(|p| {
                matches!(
                    p.token(),
                    SyntaxKind::CaseKeyword
                        | SyntaxKind::DefaultKeyword
                        | SyntaxKind::CloseBraceToken
                )
            });
            clauses.push(self.arena.add(
                kind,
                NodeFlags::empty(),
                clause_pos,
                self.prev_token_end,
                NodeData::CaseClause {
                    expression: test,
                    statements,
                },
            ));
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            NodeKind::SwitchStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Switch {
                expression,
                clauses: NodeList::from_vec(clauses),
            },
        )
    }

    fn parse_try_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let try_block = self.parse_block();

        let catch_clause = if self.is_token(SyntaxKind::CatchKeyword) {
            let catch_pos = self.token_pos();
            self.next_token();
            let variable = if self.parse_optional(SyntaxKind::OpenParenToken) {
                let name = self.parse_binding_name();
                self.parse_expected(SyntaxKind::CloseParenToken);
                name
            } else {
                NodeIndex::NONE
            };
            let block = self.parse_block();
            self.arena.add(
                NodeKind::CatchClause,
                NodeFlags::empty(),
                catch_pos,
                self.prev_token_end,
                NodeData::CatchClause { variable, block },
            )
        } else {
            NodeIndex::NONE
        };

        let finally_block = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()
        } else {
            NodeIndex::NONE
        };

        if catch_clause.is_none() && finally_block.is_none() {
            self.parse_error_at_current_token(
                "'catch' or 'finally' expected.",
                diagnostic_codes::TOKEN_EXPECTED,
            );
        }

        self.arena.add(
            NodeKind::TryStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Try {
                try_block,
                catch_clause,
                finally_block,
            },
        )
    }

    // =========================================================================
    // Variable Declarations
    // =========================================================================

    fn parse_variable_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let declaration_list = self.parse_variable_declaration_list();
        self.parse_semicolon();
        self.arena.add(
            NodeKind::VariableStatement,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::VariableStatement { declaration_list },
        )
    }

    /// `var|let|const a = 1, b` (no trailing semicolon).
    pub(crate) fn parse_variable_declaration_list(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let flags = if self.is_token(SyntaxKind::ConstKeyword) {
            NodeFlags::CONST
        } else if self.is_contextual("let") {
            NodeFlags::LET
        } else {
            NodeFlags::empty()
        };
        self.next_token();

        let mut declarations = Vec::new();
        loop {
            let decl_pos = self.token_pos();
            let name = self.parse_binding_name();
            if name.is_none() {
                break;
            }
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression()
            } else {
                NodeIndex::NONE
            };
            declarations.push(self.arena.add(
                NodeKind::VariableDeclaration,
                NodeFlags::empty(),
                decl_pos,
                self.prev_token_end,
                NodeData::VariableDeclaration { name, initializer },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        self.arena.add(
            NodeKind::VariableDeclarationList,
            flags,
            pos,
            self.prev_token_end,
            NodeData::VariableDeclarationList {
                declarations: NodeList::from_vec(declarations),
            },
        )
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Identifier, object pattern or array pattern.
    pub(crate) fn parse_binding_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_object_binding_pattern(),
            SyntaxKind::OpenBracketToken => self.parse_array_binding_pattern(),
            _ => self.parse_identifier(),
        }
    }

    fn parse_object_binding_pattern(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let elem_pos = self.token_pos();
            let element = if self.parse_optional(SyntaxKind::DotDotDotToken) {
                let name = self.parse_identifier();
                self.arena.add(
                    NodeKind::BindingElement,
                    NodeFlags::REST,
                    elem_pos,
                    self.prev_token_end,
                    NodeData::Binding {
                        property_name: NodeIndex::NONE,
                        name,
                        initializer: NodeIndex::NONE,
                    },
                )
            } else {
                let key = self.parse_property_name();
                if key.is_none() {
                    break;
                }
                let (property_name, name) = if self.parse_optional(SyntaxKind::ColonToken) {
                    (key, self.parse_binding_name())
                } else {
                    (NodeIndex::NONE, key)
                };
                let initializer = self.parse_optional_initializer();
                self.arena.add(
                    NodeKind::BindingElement,
                    NodeFlags::empty(),
                    elem_pos,
                    self.prev_token_end,
                    NodeData::Binding {
                        property_name,
                        name,
                        initializer,
                    },
                )
            };
            elements.push(element);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            NodeKind::ObjectBindingPattern,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::BindingPattern {
                elements: NodeList::from_vec(elements),
            },
        )
    }

    fn parse_array_binding_pattern(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.is_token(SyntaxKind::CommaToken) {
                let hole = self.token_pos();
                elements.push(self.arena.add_token(NodeKind::OmittedExpression, hole, hole));
                self.next_token();
                continue;
            }
            let elem_pos = self.token_pos();
            let flags = if self.parse_optional(SyntaxKind::DotDotDotToken) {
                NodeFlags::REST
            } else {
                NodeFlags::empty()
            };
            let name = self.parse_binding_name();
            if name.is_none() {
                break;
            }
            let initializer = self.parse_optional_initializer();
            elements.push(self.arena.add(
                NodeKind::BindingElement,
                flags,
                elem_pos,
                self.prev_token_end,
                NodeData::Binding {
                    property_name: NodeIndex::NONE,
                    name,
                    initializer,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena.add(
            NodeKind::ArrayBindingPattern,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::BindingPattern {
                elements: NodeList::from_vec(elements),
            },
        )
    }

    fn parse_optional_initializer(&mut self) -> NodeIndex {
        if self.parse_optional(SyntaxKind::EqualsToken) {
            self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
                p.parse_assignment_expression()
            })
        } else {
            NodeIndex::NONE
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// `function name(params) { body }`, optionally `async` and/or `*`.
    /// With `name_optional`, the name may be absent (`export default function`).
    pub(crate) fn parse_function_declaration(&mut self, name_optional: bool) -> NodeIndex {
        let pos = self.token_pos();
        let mut flags = NodeFlags::empty();
        if self.is_contextual("async") {
            flags |= NodeFlags::ASYNC;
            self.next_token();
        }
        self.parse_expected(SyntaxKind::FunctionKeyword);
        if self.parse_optional(SyntaxKind::AsteriskToken) {
            flags |= NodeFlags::GENERATOR;
        }
        let name = if name_optional && self.is_token(SyntaxKind::OpenParenToken) {
            NodeIndex::NONE
        } else {
            self.parse_identifier()
        };
        let (parameters, body) = self.parse_function_signature_and_body(flags);
        self.arena.add(
            NodeKind::FunctionDeclaration,
            flags,
            pos,
            self.prev_token_end,
            NodeData::Function {
                name,
                parameters,
                body,
            },
        )
    }

    /// `(params) { body }` with the context of a function carrying `flags`.
    pub(crate) fn parse_function_signature_and_body(
        &mut self,
        flags: NodeFlags,
    ) -> (NodeList, NodeIndex) {
        let set = function_context(flags);
        let clear = (CONTEXT_FLAG_ASYNC | CONTEXT_FLAG_GENERATOR | CONTEXT_FLAG_DISALLOW_IN) & !set;
        self.with_context(set, clear, |p| {
            let parameters = p.parse_parameter_list();
            let body = p.parse_block();
            (parameters, body)
        })
    }

    /// `( a, b = 1, {c}, ...rest )`
    pub(crate) fn parse_parameter_list(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return NodeList::new();
        }
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos = self.token_pos();
            let flags = if self.parse_optional(SyntaxKind::DotDotDotToken) {
                NodeFlags::REST
            } else {
                NodeFlags::empty()
            };
            let name = self.parse_binding_name();
            if name.is_none() {
                break;
            }
            let initializer = self.parse_optional_initializer();
            parameters.push(self.arena.add(
                NodeKind::Parameter,
                flags,
                pos,
                self.prev_token_end,
                NodeData::Binding {
                    property_name: NodeIndex::NONE,
                    name,
                    initializer,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList::from_vec(parameters)
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Class declaration or expression. With `name_optional`, a missing
    /// name is not an error.
    pub(crate) fn parse_class(&mut self, kind: NodeKind, name_optional: bool) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::ClassKeyword);
        let name = if self.is_token(SyntaxKind::Identifier) {
            self.parse_identifier()
        } else {
            if !name_optional {
                self.error_identifier_expected();
            }
            NodeIndex::NONE
        };
        let heritage = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            self.parse_left_hand_side_expression()
        } else {
            NodeIndex::NONE
        };

        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let start = self.token_pos();
            let member = self.parse_class_member();
            if member.is_some() {
                members.push(member);
            }
            if self.token_pos() == start {
                self.parse_error_at_current_token(
                    "Declaration or statement expected.",
                    diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
                );
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            kind,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Class {
                name,
                heritage,
                members: NodeList::from_vec(members),
            },
        )
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut flags = NodeFlags::empty();

        if self.is_contextual("static") && !self.next_ends_member_name() {
            if self.peek_token().0 == SyntaxKind::OpenBraceToken {
                self.next_token();
                let body =
                    self.with_context(CONTEXT_FLAG_IN_FUNCTION, CONTEXT_FLAG_ASYNC, |p| {
                        p.parse_block()
                    });
                return self.arena.add(
                    NodeKind::ClassStaticBlockDeclaration,
                    NodeFlags::STATIC,
                    pos,
                    self.prev_token_end,
                    NodeData::ClassStaticBlock { body },
                );
            }
            flags |= NodeFlags::STATIC;
            self.next_token();
        }

        let kind = self.parse_method_modifiers(&mut flags);
        let name = self.parse_property_name();
        if name.is_none() {
            return NodeIndex::NONE;
        }

        if self.is_token(SyntaxKind::OpenParenToken) {
            let kind = match kind {
                NodeKind::MethodDeclaration
                    if self.arena.node_text(name) == "constructor"
                        && !flags.contains(NodeFlags::STATIC) =>
                {
                    NodeKind::Constructor
                }
                other => other,
            };
            return self.parse_method_rest(pos, kind, flags, name);
        }

        // Field: `name = value;`
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.with_context(
                CONTEXT_FLAG_IN_FUNCTION,
                CONTEXT_FLAG_ASYNC | CONTEXT_FLAG_GENERATOR,
                |p| p.parse_assignment_expression(),
            )
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        self.arena.add(
            NodeKind::PropertyDeclaration,
            flags,
            pos,
            self.prev_token_end,
            NodeData::PropertyDeclaration { name, initializer },
        )
    }

    /// True if the token after the current one ends a member name, so the
    /// current word (`static`, `get`, `async`, ...) is the name itself.
    pub(crate) fn next_ends_member_name(&mut self) -> bool {
        matches!(
            self.peek_token().0,
            SyntaxKind::OpenParenToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::CommaToken
                | SyntaxKind::ColonToken
                | SyntaxKind::EndOfFileToken
        )
    }

    /// Consume `async`, `*`, `get` and `set` prefixes of a method. Returns the
    /// member kind they select.
    pub(crate) fn parse_method_modifiers(&mut self, flags: &mut NodeFlags) -> NodeKind {
        if self.is_contextual("async") && !self.next_ends_member_name() {
            let (_, line_break) = self.peek_token();
            if !line_break {
                *flags |= NodeFlags::ASYNC;
                self.next_token();
            }
        }
        if self.parse_optional(SyntaxKind::AsteriskToken) {
            *flags |= NodeFlags::GENERATOR;
            return NodeKind::MethodDeclaration;
        }
        if (self.is_contextual("get") || self.is_contextual("set")) && !self.next_ends_member_name()
        {
            let kind = if self.is_contextual("get") {
                NodeKind::GetAccessor
            } else {
                NodeKind::SetAccessor
            };
            self.next_token();
            return kind;
        }
        NodeKind::MethodDeclaration
    }

    /// Parameters and body of a method, accessor or constructor whose name
    /// has been parsed.
    pub(crate) fn parse_method_rest(
        &mut self,
        pos: u32,
        kind: NodeKind,
        flags: NodeFlags,
        name: NodeIndex,
    ) -> NodeIndex {
        let (parameters, body) = self.parse_function_signature_and_body(flags);
        self.arena.add(
            kind,
            flags,
            pos,
            self.prev_token_end,
            NodeData::Function {
                name,
                parameters,
                body,
            },
        )
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_import_declaration(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut specifiers = Vec::new();

        if !self.is_token(SyntaxKind::StringLiteral) {
            // Default import
            let is_default_import = self.is_token(SyntaxKind::Identifier)
                && !(self.is_contextual("from")
                    && self.peek_token().0 == SyntaxKind::StringLiteral);
            if is_default_import {
                let spec_pos = self.token_pos();
                let name = self.parse_identifier();
                specifiers.push(self.arena.add(
                    NodeKind::ImportSpecifier,
                    NodeFlags::DEFAULT_EXPORT,
                    spec_pos,
                    self.prev_token_end,
                    NodeData::Specifier {
                        property_name: NodeIndex::NONE,
                        name,
                    },
                ));
                self.parse_optional(SyntaxKind::CommaToken);
            }
            if self.is_token(SyntaxKind::AsteriskToken) {
                let spec_pos = self.token_pos();
                self.next_token();
                self.parse_expected_contextual("as");
                let name = self.parse_identifier();
                specifiers.push(self.arena.add(
                    NodeKind::ImportSpecifier,
                    NodeFlags::NAMESPACE,
                    spec_pos,
                    self.prev_token_end,
                    NodeData::Specifier {
                        property_name: NodeIndex::NONE,
                        name,
                    },
                ));
            } else if self.is_token(SyntaxKind::OpenBraceToken) {
                specifiers.extend(self.parse_named_specifiers(NodeKind::ImportSpecifier));
            }
            self.parse_expected_contextual("from");
        }

        let module_specifier = self.parse_module_specifier();
        self.parse_import_attributes();
        self.parse_semicolon();
        self.arena.add(
            NodeKind::ImportDeclaration,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::ImportDeclaration {
                specifiers: NodeList::from_vec(specifiers),
                module_specifier,
            },
        )
    }

    fn parse_export_declaration(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        if self.parse_optional(SyntaxKind::DefaultKeyword) {
            let expression = match self.token() {
                SyntaxKind::FunctionKeyword => self.parse_function_declaration(true),
                SyntaxKind::ClassKeyword => self.parse_class(NodeKind::ClassDeclaration, true),
                SyntaxKind::Identifier if self.is_async_function_start() => {
                    self.parse_function_declaration(true)
                }
                _ => {
                    let expr = self.parse_assignment_expression();
                    self.parse_semicolon();
                    expr
                }
            };
            return self.arena.add(
                NodeKind::ExportAssignment,
                NodeFlags::DEFAULT_EXPORT,
                pos,
                self.prev_token_end,
                NodeData::Return { expression },
            );
        }

        let mut declaration = NodeIndex::NONE;
        let mut specifiers = Vec::new();
        let mut module_specifier = NodeIndex::NONE;

        match self.token() {
            SyntaxKind::AsteriskToken => {
                let spec_pos = self.token_pos();
                self.next_token();
                if self.is_contextual("as") {
                    self.next_token();
                    let name = self.parse_module_export_name();
                    specifiers.push(self.arena.add(
                        NodeKind::ExportSpecifier,
                        NodeFlags::NAMESPACE,
                        spec_pos,
                        self.prev_token_end,
                        NodeData::Specifier {
                            property_name: NodeIndex::NONE,
                            name,
                        },
                    ));
                }
                self.parse_expected_contextual("from");
                module_specifier = self.parse_module_specifier();
                self.parse_import_attributes();
                self.parse_semicolon();
            }
            SyntaxKind::OpenBraceToken => {
                specifiers = self.parse_named_specifiers(NodeKind::ExportSpecifier);
                if self.is_contextual("from") {
                    self.next_token();
                    module_specifier = self.parse_module_specifier();
                    self.parse_import_attributes();
                }
                self.parse_semicolon();
            }
            _ => {
                declaration = self.parse_statement();
            }
        }

        self.arena.add(
            NodeKind::ExportDeclaration,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::ExportDeclaration {
                declaration,
                specifiers: NodeList::from_vec(specifiers),
                module_specifier,
            },
        )
    }

    /// `{ a, b as c, "d" as e }`
    fn parse_named_specifiers(&mut self, kind: NodeKind) -> Vec<NodeIndex> {
        let mut specifiers = Vec::new();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos = self.token_pos();
            let first = self.parse_module_export_name();
            if first.is_none() {
                break;
            }
            let (property_name, name) = if self.is_contextual("as") {
                self.next_token();
                (first, self.parse_module_export_name())
            } else {
                (NodeIndex::NONE, first)
            };
            specifiers.push(self.arena.add(
                kind,
                NodeFlags::empty(),
                pos,
                self.prev_token_end,
                NodeData::Specifier {
                    property_name,
                    name,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        specifiers
    }

    /// Identifier, reserved word or string used as a module export name.
    fn parse_module_export_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            return self.parse_literal(NodeKind::StringLiteral);
        }
        self.parse_identifier_name()
    }

    fn parse_module_specifier(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            self.parse_literal(NodeKind::StringLiteral)
        } else {
            self.parse_error_at_current_token(
                "String literal expected.",
                diagnostic_codes::TOKEN_EXPECTED,
            );
            NodeIndex::NONE
        }
    }

    /// `with { type: "json" }` after a module specifier. Parsed for
    /// validation only; the attributes are not kept in the tree.
    fn parse_import_attributes(&mut self) {
        if (self.is_token(SyntaxKind::WithKeyword) || self.is_contextual("assert"))
            && !self.has_preceding_line_break()
        {
            self.next_token();
            self.parse_object_literal();
        }
    }

    fn parse_expected_contextual(&mut self, text: &str) -> bool {
        if self.is_contextual(text) {
            self.next_token();
            return true;
        }
        let message = format!("'{text}' expected.");
        self.parse_error_at_current_token(&message, diagnostic_codes::TOKEN_EXPECTED);
        false
    }
}

/// Context flags for the body of a function carrying `flags`.
pub(crate) fn function_context(flags: NodeFlags) -> u32 {
    let mut set = CONTEXT_FLAG_IN_FUNCTION;
    if flags.contains(NodeFlags::ASYNC) {
        set |= CONTEXT_FLAG_ASYNC;
    }
    if flags.contains(NodeFlags::GENERATOR) {
        set |= CONTEXT_FLAG_GENERATOR;
    }
    set
}
