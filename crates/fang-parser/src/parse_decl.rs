//! Function declarations and function expressions.

use std::rc::Rc;

use fang_lexer::token::TokenKind;
use fang_types::ast::*;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// `function name(params) [type] { body }` in statement position.
    pub(crate) fn parse_function_decl(&mut self) -> Option<Node> {
        let start = self.advance().span; // eat `function`
        let name = self.expect_identifier()?;
        self.parse_function_rest(start, Some(name))
    }

    /// `function(params) [type] { body }` in expression position.
    pub(crate) fn parse_function_expr(&mut self) -> Option<Node> {
        let start = self.advance().span; // eat `function`
        // A name is tolerated here too; it is bound when the expression runs.
        let name = self.eat_type_name();
        self.parse_function_rest(start, name)
    }

    fn parse_function_rest(&mut self, start: fang_types::Span, name: Option<Ident>) -> Option<Node> {
        let params = self.parse_params()?;
        let return_type = self.eat_type_name();
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        let decl = FunctionDecl {
            name,
            params,
            return_type,
            body,
            span,
        };
        Some(Node::new(NodeKind::FunctionDeclaration(Rc::new(decl)), span))
    }

    /// `( [param { , param }] )`
    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Some(params);
        }
        loop {
            params.push(self.parse_param()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    /// `[const] name [type]`
    fn parse_param(&mut self) -> Option<Param> {
        let is_const = self.eat(&TokenKind::Const);
        let name = self.expect_identifier()?;
        let type_name = self.eat_type_name();
        Some(Param {
            name,
            is_const,
            type_name,
        })
    }
}
