//! Parser tests: statements, expression precedence, functions, and error
//! recovery.

use fang_lexer::Lexer;
use fang_parser::{ParseResult, Parser};
use fang_types::ast::*;
use fang_types::{ErrorCode, SourceFile};
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.fang", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "unexpected lex errors");
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse source and return the top-level statements, panicking on errors.
fn parse_ok(source: &str) -> Vec<Node> {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    match result.program.expect("no program returned").kind {
        NodeKind::Block(stmts) => stmts,
        other => panic!("root is not a block: {other:?}"),
    }
}

fn single(source: &str) -> NodeKind {
    let mut stmts = parse_ok(source);
    assert_eq!(stmts.len(), 1, "expected one statement");
    stmts.remove(0).kind
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.errors.iter().map(|e| e.code).collect()
}

/// Render an expression back to a fully parenthesized string.
fn shape(node: &Node) -> String {
    match &node.kind {
        NodeKind::Constant(Literal::Int(n)) => n.to_string(),
        NodeKind::Constant(Literal::Float(n)) => format!("{n:?}"),
        NodeKind::Constant(Literal::Str(s)) => format!("{s:?}"),
        NodeKind::Constant(Literal::Bool(b)) => b.to_string(),
        NodeKind::Identifier(name) => name.clone(),
        NodeKind::UnaryOp { op, operand } => format!("({op}{})", shape(operand)),
        NodeKind::BinaryOp { op, left, right } => {
            format!("({} {op} {})", shape(left), shape(right))
        }
        NodeKind::MemberAccessor { object, member } => {
            format!("{}.{}", shape(object), member.name)
        }
        NodeKind::FunctionCall { callee, args } => {
            let args: Vec<_> = args.iter().map(shape).collect();
            format!("{}({})", shape(callee), args.join(", "))
        }
        other => format!("{other:?}"),
    }
}

fn expr(source: &str) -> String {
    let stmts = parse_ok(&format!("{source};"));
    shape(&stmts[0])
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(expr("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(expr("(1 + 2) * 3"), "((1 + 2) * 3)");
    assert_eq!(expr("8 / 4 / 2"), "((8 / 4) / 2)");
    assert_eq!(expr("a - b + c"), "((a - b) + c)");
}

#[test]
fn test_comparison_and_logic_precedence() {
    assert_eq!(
        expr("a < 1 || b == 2 && c >= 3"),
        "((a < 1) || ((b == 2) && (c >= 3)))"
    );
    assert_eq!(expr("a != b == c"), "((a != b) == c)");
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(expr("a = b = 3"), "(a = (b = 3))");
    assert_eq!(expr("i += 1 + 2"), "(i += (1 + 2))");
    assert_eq!(expr("x /= 2"), "(x /= 2)");
}

#[test]
fn test_unary_operators() {
    assert_eq!(expr("-x * 2"), "((-x) * 2)");
    assert_eq!(expr("- -3"), "(-(-3))");
    assert_eq!(expr("+y"), "(+y)");
}

#[test]
fn test_postfix_chain() {
    assert_eq!(expr("p.x"), "p.x");
    assert_eq!(expr("s.length + 1"), "(s.length + 1)");
    assert_eq!(expr("obj.move(1, 2).y"), "obj.move(1, 2).y");
    assert_eq!(expr("make()()"), "make()()");
    assert_eq!(expr("print(\"hi\", 1.5, true)"), "print(\"hi\", 1.5, true)");
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_var_and_const_decls() {
    let stmts = parse_ok("var x = 3; const y float = 2.5;");
    match &stmts[0].kind {
        NodeKind::VariableDecl {
            name,
            is_const,
            type_name,
            initializer,
        } => {
            assert_eq!(name.name, "x");
            assert!(!is_const);
            assert!(type_name.is_none());
            assert_eq!(shape(initializer), "3");
        }
        other => panic!("expected VariableDecl, got {other:?}"),
    }
    match &stmts[1].kind {
        NodeKind::VariableDecl {
            is_const,
            type_name,
            ..
        } => {
            assert!(is_const);
            assert_eq!(type_name.as_ref().map(|t| t.name.as_str()), Some("float"));
        }
        other => panic!("expected VariableDecl, got {other:?}"),
    }
}

#[test]
fn test_if_else_if_chain() {
    match single("if (a) { x; } else if (b) y; else if (c) {} else { z; }") {
        NodeKind::If {
            branches,
            else_body,
        } => {
            assert_eq!(branches.len(), 3);
            assert_eq!(shape(&branches[1].condition), "b");
            assert_eq!(shape(&branches[1].body), "y");
            assert!(matches!(
                else_body.map(|b| b.kind),
                Some(NodeKind::Block(ref s)) if s.len() == 1
            ));
        }
        other => panic!("expected If, got {other:?}"),
    }
}

#[test]
fn test_for_loop_header() {
    match single("for (var i = 0; i < 3; i += 1) { if (i == 1) { break; } }") {
        NodeKind::For {
            init,
            condition,
            step,
            body,
        } => {
            assert!(matches!(init.kind, NodeKind::VariableDecl { .. }));
            assert_eq!(shape(&condition), "(i < 3)");
            assert_eq!(shape(&step), "(i += 1)");
            assert!(matches!(body.kind, NodeKind::Block(_)));
        }
        other => panic!("expected For, got {other:?}"),
    }
}

#[test]
fn test_for_loop_with_empty_header() {
    match single("for (;;) break;") {
        NodeKind::For {
            init,
            condition,
            step,
            body,
        } => {
            assert!(init.is_empty());
            assert!(condition.is_empty());
            assert!(step.is_empty());
            assert_eq!(body.kind, NodeKind::Break);
        }
        other => panic!("expected For, got {other:?}"),
    }
}

#[test]
fn test_while_return_continue() {
    let stmts = parse_ok("while (x < 10) { x += 1; continue; } return; return x;");
    assert!(matches!(stmts[0].kind, NodeKind::While { .. }));
    assert_eq!(stmts[1].kind, NodeKind::Return(None));
    assert!(matches!(stmts[2].kind, NodeKind::Return(Some(_))));
}

#[test]
fn test_empty_statements_and_blocks() {
    let stmts = parse_ok(";; { } { ; }");
    assert_eq!(stmts.len(), 4);
    assert!(stmts[0].is_empty());
    assert_eq!(stmts[2].kind, NodeKind::Block(vec![]));
}

// ─────────────────────────────────────────────────────────────────────
// Functions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_named_function_declaration() {
    match single("function add(a int, const b int) int { return a + b; }") {
        NodeKind::FunctionDeclaration(decl) => {
            assert_eq!(decl.name.as_ref().map(|n| n.name.as_str()), Some("add"));
            assert_eq!(decl.params.len(), 2);
            assert!(!decl.params[0].is_const);
            assert!(decl.params[1].is_const);
            assert_eq!(
                decl.params[1].type_name.as_ref().map(|t| t.name.as_str()),
                Some("int")
            );
            assert_eq!(
                decl.return_type.as_ref().map(|t| t.name.as_str()),
                Some("int")
            );
            assert!(matches!(decl.body.kind, NodeKind::Block(ref b) if b.len() == 1));
        }
        other => panic!("expected FunctionDeclaration, got {other:?}"),
    }
}

#[test]
fn test_untyped_parameters() {
    match single("function id(x) { return x; }") {
        NodeKind::FunctionDeclaration(decl) => {
            assert!(decl.params[0].type_name.is_none());
            assert!(decl.return_type.is_none());
        }
        other => panic!("expected FunctionDeclaration, got {other:?}"),
    }
}

#[test]
fn test_anonymous_function_expression() {
    match single("var twice = function(x) { return x * 2; };") {
        NodeKind::VariableDecl { initializer, .. } => match initializer.kind {
            NodeKind::FunctionDeclaration(decl) => {
                assert!(decl.name.is_none());
                assert_eq!(decl.params[0].name.name, "x");
            }
            other => panic!("expected FunctionDeclaration, got {other:?}"),
        },
        other => panic!("expected VariableDecl, got {other:?}"),
    }
}

#[test]
fn test_immediately_called_function_expression() {
    let stmts = parse_ok("function() { return 1; }();");
    assert!(matches!(
        stmts[0].kind,
        NodeKind::FunctionCall { ref callee, .. }
            if matches!(callee.kind, NodeKind::FunctionDeclaration(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_binary_span_covers_operands() {
    let stmts = parse_ok("\n  abc + 12;");
    let span = stmts[0].span;
    assert_eq!((span.start_line, span.start_col), (2, 3));
    assert_eq!((span.end_line, span.end_col), (2, 10));
}

// ─────────────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_semicolon() {
    assert_eq!(error_codes("var x = 1"), vec![ErrorCode::UNEXPECTED_EOF]);
    assert_eq!(
        error_codes("var x = 1 var y = 2;"),
        vec![ErrorCode::EXPECTED_SEMICOLON]
    );
}

#[test]
fn test_missing_closing_paren() {
    assert_eq!(
        error_codes("f(1, 2;"),
        vec![ErrorCode::EXPECTED_CLOSING_PAREN]
    );
}

#[test]
fn test_unexpected_token() {
    let result = parse("var = 3;");
    assert_eq!(result.errors.errors[0].code, ErrorCode::EXPECTED_IDENTIFIER);
    let result = parse("x = ) ;");
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(result.errors.errors[0].message, "Unexpected token ')'");
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(
        error_codes("1 = 2;"),
        vec![ErrorCode::INVALID_ASSIGNMENT_TARGET]
    );
    assert_eq!(
        error_codes("a + b += 1;"),
        vec![ErrorCode::INVALID_ASSIGNMENT_TARGET]
    );
    assert!(error_codes("p.x = 1; f() = 2; (a = b) = 3;").is_empty());
}

#[test]
fn test_recovery_reports_each_bad_statement() {
    let result = parse("var a = ; var b = 2; c = ); var d = 4;");
    assert_eq!(result.errors.total_errors, 2);
    let stmts = match result.program.map(|p| p.kind) {
        Some(NodeKind::Block(stmts)) => stmts,
        other => panic!("expected block, got {other:?}"),
    };
    assert_eq!(stmts.len(), 2);
}

#[test]
fn test_stray_closing_brace() {
    let result = parse("} var a = 1;");
    assert_eq!(result.errors.total_errors, 1);
    assert!(result.program.is_some());
}

#[test]
fn test_unclosed_block() {
    assert_eq!(
        error_codes("{ var a = 1;"),
        vec![ErrorCode::UNEXPECTED_EOF]
    );
}
