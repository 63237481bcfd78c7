//! Parser state - expression parsing methods

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::state::{
    CONTEXT_FLAG_ASYNC, CONTEXT_FLAG_DISALLOW_IN, CONTEXT_FLAG_GENERATOR,
    CONTEXT_FLAG_IN_FUNCTION, ParserState,
};
use super::state_statements::function_context;
use unlodash_common::diagnostics::diagnostic_codes;
use unlodash_scanner::SyntaxKind;

impl ParserState {
    // =========================================================================
    // Parse Methods - Expressions
    // =========================================================================

    /// Parse an expression (including comma operator)
    pub fn parse_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut left = self.parse_assignment_expression();

        while left.is_some() && self.is_token(SyntaxKind::CommaToken) {
            self.next_token();
            let right = self.parse_assignment_expression();
            if right.is_none() {
                self.error_expression_expected();
                break;
            }
            left = self.arena.add(
                NodeKind::BinaryExpression,
                NodeFlags::empty(),
                start_pos,
                self.prev_token_end,
                NodeData::Binary {
                    left,
                    operator: SyntaxKind::CommaToken,
                    right,
                },
            );
        }

        left
    }

    /// Parse assignment expression: arrow functions, `yield`, conditionals
    /// and assignments.
    pub(crate) fn parse_assignment_expression(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return NodeIndex::NONE;
        }
        let result = self.parse_assignment_expression_worker();
        self.exit_recursion();
        result
    }

    fn parse_assignment_expression_worker(&mut self) -> NodeIndex {
        if self.is_contextual("yield") && self.in_context(CONTEXT_FLAG_GENERATOR) {
            return self.parse_yield_expression();
        }
        if let Some(is_async) = self.is_start_of_arrow_function() {
            return self.parse_arrow_function(is_async);
        }

        let start_pos = self.token_pos();
        let expr = self.parse_binary_expression(0);
        if expr.is_none() {
            return expr;
        }

        if self.token().is_assignment_operator() {
            let operator = self.token();
            self.next_token();
            let right = self.parse_assignment_expression();
            if right.is_none() {
                self.error_expression_expected();
            }
            return self.arena.add(
                NodeKind::BinaryExpression,
                NodeFlags::empty(),
                start_pos,
                self.prev_token_end,
                NodeData::Binary {
                    left: expr,
                    operator,
                    right,
                },
            );
        }

        if self.parse_optional(SyntaxKind::QuestionToken) {
            let when_true = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
                p.parse_assignment_expression()
            });
            self.parse_expected(SyntaxKind::ColonToken);
            let when_false = self.parse_assignment_expression();
            return self.arena.add(
                NodeKind::ConditionalExpression,
                NodeFlags::empty(),
                start_pos,
                self.prev_token_end,
                NodeData::Conditional {
                    condition: expr,
                    when_true,
                    when_false,
                },
            );
        }

        expr
    }

    fn parse_yield_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut flags = NodeFlags::empty();
        if !self.has_preceding_line_break() && self.parse_optional(SyntaxKind::AsteriskToken) {
            flags |= NodeFlags::DELEGATE;
        }
        let expression = if flags.contains(NodeFlags::DELEGATE) || self.is_start_of_operand() {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            NodeKind::YieldExpression,
            flags,
            pos,
            self.prev_token_end,
            NodeData::Wrapped { expression },
        )
    }

    /// True if the current token, on the same line, can begin an operand.
    fn is_start_of_operand(&self) -> bool {
        !self.has_preceding_line_break()
            && !matches!(
                self.token(),
                SyntaxKind::CloseParenToken
                    | SyntaxKind::CloseBracketToken
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::SemicolonToken
                    | SyntaxKind::ColonToken
                    | SyntaxKind::QuestionToken
                    | SyntaxKind::EqualsGreaterThanToken
                    | SyntaxKind::EndOfFileToken
            )
            && !self.token().is_assignment_operator()
            && (self.token().binary_precedence() == 0
                || matches!(self.token(), SyntaxKind::PlusToken | SyntaxKind::MinusToken))
    }

    // =========================================================================
    // Arrow Functions
    // =========================================================================

    /// `Some(is_async)` if an arrow function starts at the current token.
    fn is_start_of_arrow_function(&mut self) -> Option<bool> {
        match self.token() {
            SyntaxKind::OpenParenToken => self.look_ahead_is_arrow_function().then_some(false),
            SyntaxKind::Identifier => {
                if self.look_ahead_is_simple_arrow_function() {
                    return Some(false);
                }
                if self.is_contextual("async") && self.look_ahead_is_arrow_function_after_async() {
                    return Some(true);
                }
                None
            }
            _ => None,
        }
    }

    /// `x =>` with no line break before the arrow.
    fn look_ahead_is_simple_arrow_function(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_token(SyntaxKind::EqualsGreaterThanToken) && !p.has_preceding_line_break()
        })
    }

    /// `(...) =>` with no line break before the arrow.
    fn look_ahead_is_arrow_function(&mut self) -> bool {
        self.look_ahead(|p| {
            p.skip_balanced_parentheses()
                && p.is_token(SyntaxKind::EqualsGreaterThanToken)
                && !p.has_preceding_line_break()
        })
    }

    /// `async x =>` or `async (...) =>`, all on one line up to the arrow.
    fn look_ahead_is_arrow_function_after_async(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.has_preceding_line_break() {
                return false;
            }
            match p.token() {
                SyntaxKind::Identifier => {
                    p.next_token();
                    p.is_token(SyntaxKind::EqualsGreaterThanToken)
                        && !p.has_preceding_line_break()
                }
                SyntaxKind::OpenParenToken => {
                    p.skip_balanced_parentheses()
                        && p.is_token(SyntaxKind::EqualsGreaterThanToken)
                        && !p.has_preceding_line_break()
                }
                _ => false,
            }
        })
    }

    /// Skip from `(` past its matching `)`. Template literals are rescanned
    /// so braces inside substitutions stay balanced.
    fn skip_balanced_parentheses(&mut self) -> bool {
        let mut stack: Vec<SyntaxKind> = Vec::new();
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken => return false,
                SyntaxKind::OpenParenToken => stack.push(SyntaxKind::CloseParenToken),
                SyntaxKind::OpenBracketToken => stack.push(SyntaxKind::CloseBracketToken),
                SyntaxKind::OpenBraceToken => stack.push(SyntaxKind::CloseBraceToken),
                SyntaxKind::TemplateHead => stack.push(SyntaxKind::TemplateHead),
                SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken => {
                    if stack.pop() != Some(self.token()) {
                        return false;
                    }
                }
                SyntaxKind::CloseBraceToken => match stack.last() {
                    Some(SyntaxKind::CloseBraceToken) => {
                        stack.pop();
                    }
                    Some(SyntaxKind::TemplateHead) => {
                        self.current_token = self.scanner.re_scan_template_token();
                        if self.is_token(SyntaxKind::TemplateTail) {
                            stack.pop();
                        }
                    }
                    _ => return false,
                },
                _ => {}
            }
            self.next_token();
            if stack.is_empty() {
                return true;
            }
        }
    }

    fn parse_arrow_function(&mut self, is_async: bool) -> NodeIndex {
        let pos = self.token_pos();
        let mut flags = NodeFlags::empty();
        if is_async {
            flags |= NodeFlags::ASYNC;
            self.next_token();
        }

        let set = function_context(flags);
        let clear = (CONTEXT_FLAG_ASYNC | CONTEXT_FLAG_GENERATOR) & !set;
        let parameters = self.with_context(set, clear | CONTEXT_FLAG_DISALLOW_IN, |p| {
            if p.is_token(SyntaxKind::OpenParenToken) {
                p.parse_parameter_list()
            } else {
                let param_pos = p.token_pos();
                let name = p.parse_identifier();
                let param = p.arena.add(
                    NodeKind::Parameter,
                    NodeFlags::empty(),
                    param_pos,
                    p.prev_token_end,
                    NodeData::Binding {
                        property_name: NodeIndex::NONE,
                        name,
                        initializer: NodeIndex::NONE,
                    },
                );
                NodeList::from_vec(vec![param])
            }
        });
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);

        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.with_context(set, clear | CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_block())
        } else {
            flags |= NodeFlags::EXPRESSION_BODY;
            self.with_context(set, clear, |p| p.parse_assignment_expression())
        };

        self.arena.add(
            NodeKind::ArrowFunction,
            flags,
            pos,
            self.prev_token_end,
            NodeData::Function {
                name: NodeIndex::NONE,
                parameters,
                body,
            },
        )
    }

    // =========================================================================
    // Binary and Unary
    // =========================================================================

    /// Precedence climbing over `SyntaxKind::binary_precedence`. `**` is
    /// right-associative; everything else associates left.
    pub(crate) fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut left = self.parse_unary_expression();
        if left.is_none() {
            return left;
        }

        loop {
            let operator = self.token();
            let precedence = operator.binary_precedence();
            if precedence == 0 || precedence <= min_precedence {
                break;
            }
            if operator == SyntaxKind::InKeyword && self.in_context(CONTEXT_FLAG_DISALLOW_IN) {
                break;
            }
            self.next_token();
            let right = if operator == SyntaxKind::AsteriskAsteriskToken {
                self.parse_binary_expression(precedence - 1)
            } else {
                self.parse_binary_expression(precedence)
            };
            if right.is_none() {
                self.error_expression_expected();
            }
            left = self.arena.add(
                NodeKind::BinaryExpression,
                NodeFlags::empty(),
                start_pos,
                self.prev_token_end,
                NodeData::Binary {
                    left,
                    operator,
                    right,
                },
            );
        }

        left
    }

    pub(crate) fn parse_unary_expression(&mut self) -> NodeIndex {
        let operator = self.token();
        match operator {
            SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::DeleteKeyword => {
                let pos = self.token_pos();
                self.next_token();
                if !self.enter_recursion() {
                    return NodeIndex::NONE;
                }
                let operand = self.parse_unary_expression();
                self.exit_recursion();
                if operand.is_none() {
                    self.error_expression_expected();
                }
                self.arena.add(
                    NodeKind::PrefixUnaryExpression,
                    NodeFlags::empty(),
                    pos,
                    self.prev_token_end,
                    NodeData::Unary { operator, operand },
                )
            }
            SyntaxKind::Identifier if self.is_await_expression_start() => {
                let pos = self.token_pos();
                self.next_token();
                if !self.enter_recursion() {
                    return NodeIndex::NONE;
                }
                let expression = self.parse_unary_expression();
                self.exit_recursion();
                self.arena.add(
                    NodeKind::AwaitExpression,
                    NodeFlags::empty(),
                    pos,
                    self.prev_token_end,
                    NodeData::Wrapped { expression },
                )
            }
            _ => self.parse_postfix_expression(),
        }
    }

    /// `await` is an operator inside async functions, and at the top level
    /// when an operand follows it.
    fn is_await_expression_start(&mut self) -> bool {
        if !self.is_contextual("await") {
            return false;
        }
        if self.in_context(CONTEXT_FLAG_ASYNC) {
            return true;
        }
        if self.in_context(CONTEXT_FLAG_IN_FUNCTION) {
            return false;
        }
        self.look_ahead(|p| {
            p.next_token();
            p.is_start_of_operand()
        })
    }

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let operand = self.parse_left_hand_side_expression();
        if operand.is_some()
            && matches!(
                self.token(),
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
            )
            && !self.has_preceding_line_break()
        {
            let operator = self.token();
            self.next_token();
            return self.arena.add(
                NodeKind::PostfixUnaryExpression,
                NodeFlags::empty(),
                pos,
                self.prev_token_end,
                NodeData::Unary { operator, operand },
            );
        }
        operand
    }

    // =========================================================================
    // Member and Call Chains
    // =========================================================================

    pub(crate) fn parse_left_hand_side_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        if expression.is_none() {
            return expression;
        }
        self.parse_member_chain(pos, expression, true)
    }

    /// Property access, element access, calls and tagged templates following
    /// `expression`. Every link after a `?.` carries `OPTIONAL_CHAIN`.
    fn parse_member_chain(
        &mut self,
        pos: u32,
        mut expression: NodeIndex,
        allow_calls: bool,
    ) -> NodeIndex {
        let mut flags = NodeFlags::empty();
        loop {
            match self.token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_member_name();
                    expression = self.add_access(
                        NodeKind::PropertyAccessExpression,
                        flags,
                        pos,
                        expression,
                        name,
                    );
                }
                SyntaxKind::QuestionDotToken if allow_calls => {
                    self.next_token();
                    flags |= NodeFlags::OPTIONAL_CHAIN;
                    expression = match self.token() {
                        SyntaxKind::OpenParenToken => self.parse_call_rest(pos, flags, expression),
                        SyntaxKind::OpenBracketToken => {
                            self.parse_element_access_rest(pos, flags, expression)
                        }
                        _ => {
                            let name = self.parse_member_name();
                            self.add_access(
                                NodeKind::PropertyAccessExpression,
                                flags,
                                pos,
                                expression,
                                name,
                            )
                        }
                    };
                }
                SyntaxKind::OpenBracketToken => {
                    expression = self.parse_element_access_rest(pos, flags, expression);
                }
                SyntaxKind::OpenParenToken if allow_calls => {
                    expression = self.parse_call_rest(pos, flags, expression);
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                    if flags.contains(NodeFlags::OPTIONAL_CHAIN) {
                        self.parse_error_at_current_token(
                            "Tagged template expressions are not permitted in an optional chain.",
                            diagnostic_codes::TOKEN_EXPECTED,
                        );
                    }
                    let template = self.parse_template_literal();
                    expression = self.arena.add(
                        NodeKind::TaggedTemplateExpression,
                        flags,
                        pos,
                        self.prev_token_end,
                        NodeData::TaggedTemplate {
                            tag: expression,
                            template,
                        },
                    );
                }
                _ => break,
            }
        }
        expression
    }

    /// Name after `.` or `?.`: any identifier or reserved word, or `#private`.
    fn parse_member_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::PrivateIdentifier) {
            return self.parse_private_identifier();
        }
        self.parse_identifier_name()
    }

    fn add_access(
        &mut self,
        kind: NodeKind,
        flags: NodeFlags,
        pos: u32,
        expression: NodeIndex,
        name_or_argument: NodeIndex,
    ) -> NodeIndex {
        self.arena.add(
            kind,
            flags,
            pos,
            self.prev_token_end,
            NodeData::Access {
                expression,
                name_or_argument,
            },
        )
    }

    fn parse_element_access_rest(
        &mut self,
        pos: u32,
        flags: NodeFlags,
        expression: NodeIndex,
    ) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let argument = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression());
        if argument.is_none() {
            self.error_expression_expected();
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.add_access(
            NodeKind::ElementAccessExpression,
            flags,
            pos,
            expression,
            argument,
        )
    }

    fn parse_call_rest(&mut self, pos: u32, flags: NodeFlags, expression: NodeIndex) -> NodeIndex {
        let arguments = self.parse_argument_list();
        self.arena.add(
            NodeKind::CallExpression,
            flags,
            pos,
            self.prev_token_end,
            NodeData::Call {
                expression,
                arguments,
                has_arguments: true,
            },
        )
    }

    /// `( a, ...b, c )`
    pub(crate) fn parse_argument_list(&mut self) -> NodeList {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            while !p.is_token(SyntaxKind::CloseParenToken)
                && !p.is_token(SyntaxKind::EndOfFileToken)
            {
                let argument = p.parse_spread_or_assignment(NodeKind::SpreadElement);
                if argument.is_none() {
                    p.error_expression_expected();
                    break;
                }
                arguments.push(argument);
                if !p.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        });
        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList::from_vec(arguments)
    }

    /// `...expr` (as `spread_kind`) or an assignment expression.
    fn parse_spread_or_assignment(&mut self, spread_kind: NodeKind) -> NodeIndex {
        if self.is_token(SyntaxKind::DotDotDotToken) {
            let pos = self.token_pos();
            self.next_token();
            let expression = self.parse_assignment_expression();
            return self.arena.add(
                spread_kind,
                NodeFlags::empty(),
                pos,
                self.prev_token_end,
                NodeData::Wrapped { expression },
            );
        }
        self.parse_assignment_expression()
    }

    /// `new X(args)`, `new X`, `new.target`.
    fn parse_new_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        if self.parse_optional(SyntaxKind::DotToken) {
            self.parse_identifier_name();
            return self
                .arena
                .add_token(NodeKind::MetaProperty, pos, self.prev_token_end);
        }

        let callee_pos = self.token_pos();
        let callee = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        if callee.is_none() {
            return NodeIndex::NONE;
        }
        let expression = self.parse_member_chain(callee_pos, callee, false);

        let (arguments, has_arguments) = if self.is_token(SyntaxKind::OpenParenToken) {
            (self.parse_argument_list(), true)
        } else {
            (NodeList::new(), false)
        };
        self.arena.add(
            NodeKind::NewExpression,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Call {
                expression,
                arguments,
                has_arguments,
            },
        )
    }

    // =========================================================================
    // Primary Expressions
    // =========================================================================

    pub(crate) fn parse_primary_expression(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::Identifier => {
                if self.is_async_function_start() {
                    return self.parse_function_expression();
                }
                self.parse_identifier()
            }
            SyntaxKind::NumericLiteral => self.parse_literal(NodeKind::NumericLiteral),
            SyntaxKind::BigIntLiteral => self.parse_literal(NodeKind::BigIntLiteral),
            SyntaxKind::StringLiteral => self.parse_literal(NodeKind::StringLiteral),
            SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                self.parse_template_literal()
            }
            SyntaxKind::TrueKeyword => self.parse_literal(NodeKind::TrueKeyword),
            SyntaxKind::FalseKeyword => self.parse_literal(NodeKind::FalseKeyword),
            SyntaxKind::NullKeyword => self.parse_literal(NodeKind::NullKeyword),
            SyntaxKind::ThisKeyword => self.parse_literal(NodeKind::ThisKeyword),
            SyntaxKind::SuperKeyword => self.parse_literal(NodeKind::SuperKeyword),
            SyntaxKind::ImportKeyword => {
                let pos = self.token_pos();
                self.next_token();
                if self.parse_optional(SyntaxKind::DotToken) {
                    self.parse_identifier_name();
                    return self
                        .arena
                        .add_token(NodeKind::MetaProperty, pos, self.prev_token_end);
                }
                self.arena
                    .add_token(NodeKind::ImportKeyword, pos, self.prev_token_end)
            }
            SyntaxKind::OpenParenToken => self.parse_parenthesized_expression(),
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::FunctionKeyword => self.parse_function_expression(),
            SyntaxKind::ClassKeyword => self.parse_class(NodeKind::ClassExpression, true),
            SyntaxKind::NewKeyword => self.parse_new_expression(),
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.current_token = self.scanner.re_scan_slash_token();
                self.parse_literal(NodeKind::RegularExpressionLiteral)
            }
            SyntaxKind::PrivateIdentifier => self.parse_private_identifier(),
            _ => {
                self.error_expression_expected();
                NodeIndex::NONE
            }
        }
    }

    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if !self.is_token(SyntaxKind::Identifier) {
            self.error_identifier_expected();
            return NodeIndex::NONE;
        }
        self.add_identifier_from_token(NodeKind::Identifier)
    }

    /// Identifier or reserved word (property names, export names).
    pub(crate) fn parse_identifier_name(&mut self) -> NodeIndex {
        if !self.token().is_identifier_or_keyword() {
            self.error_identifier_expected();
            return NodeIndex::NONE;
        }
        self.add_identifier_from_token(NodeKind::Identifier)
    }

    fn parse_private_identifier(&mut self) -> NodeIndex {
        self.add_identifier_from_token(NodeKind::PrivateIdentifier)
    }

    fn add_identifier_from_token(&mut self, kind: NodeKind) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.token_end();
        let escaped_text = self.scanner.get_token_text().to_string();
        self.next_token();
        self.arena.add(
            kind,
            NodeFlags::empty(),
            pos,
            end,
            NodeData::Identifier { escaped_text },
        )
    }

    /// Single-token literal or keyword expression of `kind`.
    pub(crate) fn parse_literal(&mut self, kind: NodeKind) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.token_end();
        self.next_token();
        self.arena.add_token(kind, pos, end)
    }

    fn parse_parenthesized_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let expression = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression());
        if expression.is_none() {
            return NodeIndex::NONE;
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.arena.add(
            NodeKind::ParenthesizedExpression,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Wrapped { expression },
        )
    }

    fn parse_function_expression(&mut self) -> NodeIndex {
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
        let name = if self.is_token(SyntaxKind::Identifier) {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let (parameters, body) = self.parse_function_signature_and_body(flags);
        self.arena.add(
            NodeKind::FunctionExpression,
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
    // Templates
    // =========================================================================

    /// `` `text` `` or `` `a${b}c${d}e` ``.
    fn parse_template_literal(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::NoSubstitutionTemplateLiteral) {
            return self.parse_literal(NodeKind::NoSubstitutionTemplateLiteral);
        }

        let pos = self.token_pos();
        let head = self.parse_literal(NodeKind::TemplateHead);
        let mut spans = Vec::new();
        loop {
            let span_pos = self.token_pos();
            let expression =
                self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| p.parse_expression());
            if expression.is_none() {
                self.error_expression_expected();
            }
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_error_at_current_token(
                    "'}' expected.",
                    diagnostic_codes::TOKEN_EXPECTED,
                );
                break;
            }
            self.current_token = self.scanner.re_scan_template_token();
            let literal_kind = if self.is_token(SyntaxKind::TemplateTail) {
                NodeKind::TemplateTail
            } else {
                NodeKind::TemplateMiddle
            };
            let literal = self.parse_literal(literal_kind);
            spans.push(self.arena.add(
                NodeKind::TemplateSpan,
                NodeFlags::empty(),
                span_pos,
                self.prev_token_end,
                NodeData::TemplateSpan {
                    expression,
                    literal,
                },
            ));
            if literal_kind == NodeKind::TemplateTail {
                break;
            }
        }

        self.arena.add(
            NodeKind::TemplateExpression,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::Template {
                head,
                spans: NodeList::from_vec(spans),
            },
        )
    }

    // =========================================================================
    // Array and Object Literals
    // =========================================================================

    fn parse_array_literal(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            while !p.is_token(SyntaxKind::CloseBracketToken)
                && !p.is_token(SyntaxKind::EndOfFileToken)
            {
                if p.is_token(SyntaxKind::CommaToken) {
                    let hole = p.token_pos();
                    elements.push(p.arena.add_token(NodeKind::OmittedExpression, hole, hole));
                    p.next_token();
                    continue;
                }
                let element = p.parse_spread_or_assignment(NodeKind::SpreadElement);
                if element.is_none() {
                    break;
                }
                elements.push(element);
                if !p.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        });
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena.add(
            NodeKind::ArrayLiteralExpression,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::LiteralExpression {
                elements: NodeList::from_vec(elements),
            },
        )
    }

    pub(crate) fn parse_object_literal(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut elements = Vec::new();
        self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
            while !p.is_token(SyntaxKind::CloseBraceToken)
                && !p.is_token(SyntaxKind::EndOfFileToken)
            {
                let member = p.parse_object_literal_member();
                if member.is_none() {
                    break;
                }
                elements.push(member);
                if !p.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        });
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            NodeKind::ObjectLiteralExpression,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::LiteralExpression {
                elements: NodeList::from_vec(elements),
            },
        )
    }

    fn parse_object_literal_member(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        if self.is_token(SyntaxKind::DotDotDotToken) {
            return self.parse_spread_or_assignment(NodeKind::SpreadAssignment);
        }

        let mut flags = NodeFlags::empty();
        let kind = self.parse_method_modifiers(&mut flags);
        let name = self.parse_property_name();
        if name.is_none() {
            return NodeIndex::NONE;
        }

        if self.is_token(SyntaxKind::OpenParenToken) {
            return self.parse_method_rest(pos, kind, flags, name);
        }

        if self.parse_optional(SyntaxKind::ColonToken) {
            let initializer = self.parse_assignment_expression();
            if initializer.is_none() {
                self.error_expression_expected();
            }
            return self.arena.add(
                NodeKind::PropertyAssignment,
                NodeFlags::empty(),
                pos,
                self.prev_token_end,
                NodeData::PropertyAssignment { name, initializer },
            );
        }

        if self.arena.kind(name) != Some(NodeKind::Identifier) {
            self.parse_expected(SyntaxKind::ColonToken);
        }
        // `{ a = 1 }` is only valid as a destructuring target.
        let default_initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            NodeKind::ShorthandPropertyAssignment,
            NodeFlags::empty(),
            pos,
            self.prev_token_end,
            NodeData::ShorthandPropertyAssignment {
                name,
                default_initializer,
            },
        )
    }

    /// Property name in object literals, classes and binding patterns.
    pub(crate) fn parse_property_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::StringLiteral => self.parse_literal(NodeKind::StringLiteral),
            SyntaxKind::NumericLiteral => self.parse_literal(NodeKind::NumericLiteral),
            SyntaxKind::BigIntLiteral => self.parse_literal(NodeKind::BigIntLiteral),
            SyntaxKind::PrivateIdentifier => self.parse_private_identifier(),
            SyntaxKind::OpenBracketToken => {
                let pos = self.token_pos();
                self.next_token();
                let expression = self.with_context(0, CONTEXT_FLAG_DISALLOW_IN, |p| {
                    p.parse_assignment_expression()
                });
                self.parse_expected(SyntaxKind::CloseBracketToken);
                self.arena.add(
                    NodeKind::ComputedPropertyName,
                    NodeFlags::empty(),
                    pos,
                    self.prev_token_end,
                    NodeData::ComputedPropertyName { expression },
                )
            }
            _ => self.parse_identifier_name(),
        }
    }
}
