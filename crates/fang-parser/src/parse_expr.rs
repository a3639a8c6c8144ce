//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 8. `=`, `+=`, `-=`, `*=`, `/=` (right associative)
//! 7. `||`
//! 6. `&&`
//! 5. `==`, `!=`
//! 4. `<`, `<=`, `>`, `>=`
//! 3. `+`, `-`
//! 2. `*`, `/`
//! 1. unary `+`, `-`
//! 0. `.` (member access), `()` (call)

use fang_lexer::token::TokenKind;
use fang_types::ast::*;
use fang_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Node> {
        self.parse_assignment()
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Assignment = LogicOr [ AssignOp Assignment ]`
    fn parse_assignment(&mut self) -> Option<Node> {
        let left = self.parse_or()?;
        let op = match self.peek_kind() {
            TokenKind::Eq => Operator::Assign,
            TokenKind::PlusEq => Operator::AddAssign,
            TokenKind::MinusEq => Operator::SubAssign,
            TokenKind::StarEq => Operator::MulAssign,
            TokenKind::SlashEq => Operator::DivAssign,
            _ => return Some(left),
        };
        let op_span = self.advance().span;
        if !is_assignable(&left) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                format!("Cannot assign with '{op}' to this expression"),
                left.span.merge(op_span),
            );
        }
        let right = self.parse_assignment()?;
        Some(binary(op, left, right))
    }

    /// `LogicOr = LogicAnd { "||" LogicAnd }`
    fn parse_or(&mut self) -> Option<Node> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_and()?;
            left = binary(Operator::Or, left, right);
        }
        Some(left)
    }

    /// `LogicAnd = Equality { "&&" Equality }`
    fn parse_and(&mut self) -> Option<Node> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            left = binary(Operator::And, left, right);
        }
        Some(left)
    }

    /// `Equality = Relational { ("==" | "!=") Relational }`
    fn parse_equality(&mut self) -> Option<Node> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => Operator::Eq,
                TokenKind::BangEq => Operator::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
        Some(left)
    }

    /// `Relational = Additive { ("<" | "<=" | ">" | ">=") Additive }`
    fn parse_relational(&mut self) -> Option<Node> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => Operator::Less,
                TokenKind::LessEq => Operator::LessEq,
                TokenKind::Greater => Operator::Greater,
                TokenKind::GreaterEq => Operator::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Some(left)
    }

    /// `Additive = Multiplicative { ("+" | "-") Multiplicative }`
    fn parse_additive(&mut self) -> Option<Node> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Some(left)
    }

    /// `Multiplicative = Unary { ("*" | "/") Unary }`
    fn parse_multiplicative(&mut self) -> Option<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => Operator::Mul,
                TokenKind::Slash => Operator::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Some(left)
    }

    /// `Unary = ("+" | "-") Unary | Postfix`
    fn parse_unary(&mut self) -> Option<Node> {
        let op = match self.peek_kind() {
            TokenKind::Plus => Operator::Add,
            TokenKind::Minus => Operator::Sub,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let operand = self.parse_unary()?;
        let span = start.merge(operand.span);
        Some(Node::new(
            NodeKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Postfix
    // ══════════════════════════════════════════════════════════════════════════

    /// `Postfix = Primary { "." IDENT | "(" args ")" }`
    fn parse_postfix(&mut self) -> Option<Node> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let member = self.expect_identifier()?;
                let span = expr.span.merge(member.span);
                expr = Node::new(
                    NodeKind::MemberAccessor {
                        object: Box::new(expr),
                        member,
                    },
                    span,
                );
            } else if self.eat(&TokenKind::LParen) {
                let args = self.parse_call_args()?;
                let span = expr.span.merge(self.previous_span());
                expr = Node::new(
                    NodeKind::FunctionCall {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else {
                return Some(expr);
            }
        }
    }

    /// Arguments after the opening `(`, through the closing `)`.
    fn parse_call_args(&mut self) -> Option<Vec<Node>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Some(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Node> {
        let span = self.current_span();
        let literal = match self.peek_kind() {
            TokenKind::IntLit(n) => Literal::Int(*n),
            TokenKind::FloatLit(n) => Literal::Float(*n),
            TokenKind::StringLit(s) => Literal::Str(s.clone()),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                return Some(Node::new(NodeKind::Identifier(name), span));
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                return Some(inner);
            }
            TokenKind::Function => return self.parse_function_expr(),
            TokenKind::Eof => {
                self.error_at_current(ErrorCode::UNEXPECTED_EOF, "Unexpected end of file");
                return None;
            }
            other => {
                let message = format!("Unexpected token '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        self.advance();
        Some(Node::new(NodeKind::Constant(literal), span))
    }
}

/// Names, members and call results can hold a writable handle.
fn is_assignable(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Identifier(_)
            | NodeKind::MemberAccessor { .. }
            | NodeKind::FunctionCall { .. }
            | NodeKind::BinaryOp {
                op: Operator::Assign
                    | Operator::AddAssign
                    | Operator::SubAssign
                    | Operator::MulAssign
                    | Operator::DivAssign,
                ..
            }
    )
}

fn binary(op: Operator, left: Node, right: Node) -> Node {
    let span = left.span.merge(right.span);
    Node::new(
        NodeKind::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}
