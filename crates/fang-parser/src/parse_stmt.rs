//! Statement parsing.

use crate::parser::Parser;
use fang_lexer::token::TokenKind;
use fang_types::ast::*;

impl<'src> Parser<'src> {
    /// `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Node> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let before = self.position();
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.synchronize();
                    if self.position() == before && !self.check(&TokenKind::RBrace) {
                        self.advance();
                    }
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Node::new(NodeKind::Block(stmts), span))
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Node> {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Var | TokenKind::Const => self.parse_var_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_jump(NodeKind::Break),
            TokenKind::Continue => self.parse_jump(NodeKind::Continue),
            TokenKind::Function if matches!(self.look_ahead(1), TokenKind::Identifier(_)) => {
                self.parse_function_decl()
            }
            TokenKind::Semicolon => {
                let span = self.advance().span;
                Some(Node::empty(span))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::Semicolon)?;
                Some(expr)
            }
        }
    }

    /// `var name [type] = expr;` or `const name [type] = expr;`
    pub(crate) fn parse_var_decl(&mut self) -> Option<Node> {
        let start = self.current_span();
        let is_const = self.advance().kind == TokenKind::Const;
        let name = self.expect_identifier()?;
        let type_name = self.eat_type_name();
        self.expect(&TokenKind::Eq)?;
        let initializer = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Node::new(
            NodeKind::VariableDecl {
                name,
                is_const,
                type_name,
                initializer: Box::new(initializer),
            },
            span,
        ))
    }

    /// `if (c) s { else if (c) s } [ else s ]`
    fn parse_if(&mut self) -> Option<Node> {
        let start = self.current_span();
        self.advance(); // eat `if`
        let mut branches = vec![self.parse_if_branch()?];
        let mut else_body = None;
        while self.eat(&TokenKind::Else) {
            if self.eat(&TokenKind::If) {
                branches.push(self.parse_if_branch()?);
            } else {
                else_body = Some(Box::new(self.parse_statement()?));
                break;
            }
        }
        let span = start.merge(self.previous_span());
        Some(Node::new(NodeKind::If { branches, else_body }, span))
    }

    fn parse_if_branch(&mut self) -> Option<IfBranch> {
        let condition = self.parse_paren_condition()?;
        let body = self.parse_statement()?;
        Some(IfBranch { condition, body })
    }

    fn parse_paren_condition(&mut self) -> Option<Node> {
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        Some(condition)
    }

    /// `for (init; cond; step) body`, any header part may be empty.
    fn parse_for(&mut self) -> Option<Node> {
        let start = self.current_span();
        self.advance(); // eat `for`
        self.expect(&TokenKind::LParen)?;

        let init = match self.peek_kind() {
            TokenKind::Var | TokenKind::Const => self.parse_var_decl()?,
            TokenKind::Semicolon => Node::empty(self.advance().span),
            _ => {
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::Semicolon)?;
                expr
            }
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            Node::empty(self.current_span())
        } else {
            self.parse_expression()?
        };
        self.expect(&TokenKind::Semicolon)?;

        let step = if self.check(&TokenKind::RParen) {
            Node::empty(self.current_span())
        } else {
            self.parse_expression()?
        };
        self.expect(&TokenKind::RParen)?;

        let body = self.parse_statement()?;
        let span = start.merge(self.previous_span());
        Some(Node::new(
            NodeKind::For {
                init: Box::new(init),
                condition: Box::new(condition),
                step: Box::new(step),
                body: Box::new(body),
            },
            span,
        ))
    }

    /// `while (cond) body`
    fn parse_while(&mut self) -> Option<Node> {
        let start = self.current_span();
        self.advance(); // eat `while`
        let condition = self.parse_paren_condition()?;
        let body = self.parse_statement()?;
        let span = start.merge(self.previous_span());
        Some(Node::new(
            NodeKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            span,
        ))
    }

    /// `return [expr];`
    fn parse_return(&mut self) -> Option<Node> {
        let start = self.advance().span; // eat `return`
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Node::new(NodeKind::Return(value), span))
    }

    /// `break;` / `continue;`
    fn parse_jump(&mut self, kind: NodeKind) -> Option<Node> {
        let start = self.advance().span;
        self.expect(&TokenKind::Semicolon)?;
        Some(Node::new(kind, start.merge(self.previous_span())))
    }
}
