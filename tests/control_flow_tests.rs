use minic2py::ast::{BinaryOp, Expr, Stmt};
use minic2py::{compile_with, parse_program, Options};

fn assert_codegen(src: &str, expected: &str) {
    let options = Options {
        emit_header: false,
        ..Options::default()
    };
    let got = compile_with(src, &options).unwrap();
    assert_eq!(got, expected);
}

#[test]
fn if_else_with_block_branches_needs_no_separator() {
    assert_codegen(
        "void f() { if (x > 0) { y = 1; } else { y = 2; } }",
        "def f():\n    if (x > 0):\n        y = 1\n    else:\n        y = 2\n",
    );
}

#[test]
fn if_without_else_emits_no_else() {
    assert_codegen(
        "void f() { if (x == 1) { y = 1; } z = 2; }",
        "def f():\n    if (x == 1):\n        y = 1\n    z = 2\n",
    );
}

#[test]
fn if_else_single_statement_branches() {
    assert_codegen(
        "void f() { if (x != 0) y = 1; else y = 2; }",
        "def f():\n    if (x != 0):\n        y = 1\n    else:\n        y = 2\n",
    );
}

#[test]
fn if_else_if_chain() {
    assert_codegen(
        "void f() { if (x < 0) { s = -1; } else if (x > 0) { s = 1; } else { s = 0; } }",
        "def f():\n    if (x < 0):\n        s = -1\n    else:\n        if (x > 0):\n            s = 1\n        else:\n            s = 0\n",
    );
}

#[test]
fn empty_branches_get_pass() {
    assert_codegen(
        "void f() { if (x >= 1) { } else ; }",
        "def f():\n    if (x >= 1):\n        pass\n    else:\n        pass\n",
    );
}

#[test]
fn while_comparison_updates_var() {
    assert_codegen(
        "void f() { int x; x = 3; while (x > 0) { x = x - 1; } }",
        "def f():\n    x = None\n    x = 3\n    while (x > 0):\n        x = (x - 1)\n",
    );
}

#[test]
fn while_body_can_be_single_stmt() {
    assert_codegen(
        "void f() { while (x <= 10) x = x + 1; }",
        "def f():\n    while (x <= 10):\n        x = (x + 1)\n",
    );
}

#[test]
fn nested_while_in_if_indents_twice() {
    assert_codegen(
        "void f() { if (a > b) { while (a > b) { a = a - 1; printf(\"%d\", a); } } }",
        "def f():\n    if (a > b):\n        while (a > b):\n            a = (a - 1)\n            print(\"%d\" % (a,), end=\"\")\n",
    );
}

#[test]
fn nested_compound_is_flattened() {
    assert_codegen(
        "void f() { { x = 1; { y = 2; } } }",
        "def f():\n    x = 1\n    y = 2\n",
    );
}

#[test]
fn empty_nested_compound_in_loop_body_gets_pass() {
    assert_codegen(
        "void f() { while (x < 1) { { } } }",
        "def f():\n    while (x < 1):\n        pass\n",
    );
}

#[test]
fn condition_is_single_comparison() {
    let f = parse_program("void f() { while (a + 1 >= b * 2) { } }").unwrap();
    let Stmt::While(w) = &f.body.stmts[0] else {
        panic!("expected while");
    };
    let Expr::Binary(cmp) = &w.cond else {
        panic!("expected comparison");
    };
    assert_eq!(cmp.op, BinaryOp::GtEq);
    assert!(cmp.op.is_comparison());
    assert!(matches!(&*cmp.left, Expr::Binary(b) if b.op == BinaryOp::Add));
    assert!(matches!(&*cmp.right, Expr::Binary(b) if b.op == BinaryOp::Mul));
}

#[test]
fn error_condition_needs_comparison() {
    let err = parse_program("void f() { if (x) { } }").unwrap_err();
    assert!(err.is_syntax());
    assert!(
        err.to_string().contains("expected comparison operator, found ')'"),
        "{err}"
    );
}

#[test]
fn error_boolean_composition_not_supported() {
    let err = parse_program("void f() { if (x > 0 && y > 0) { } }").unwrap_err();
    assert!(err.to_string().contains("found '&&'"), "{err}");
}

#[test]
fn error_missing_rparen_in_while() {
    let err = parse_program("void f() { while (x > 0 { } }").unwrap_err();
    assert!(err.is_syntax());
    assert!(err.to_string().contains("expected ')', found '{'"), "{err}");
}

#[test]
fn single_statement_body_may_omit_semicolon_before_brace() {
    assert_codegen(
        "void f() { if (x > 0) y = 1 }",
        "def f():\n    if (x > 0):\n        y = 1\n",
    );
    assert_codegen(
        "void f() { while (x > 0) x = x - 1 }",
        "def f():\n    while (x > 0):\n        x = (x - 1)\n",
    );
}

#[test]
fn error_single_statement_body_needs_separator_before_else() {
    let err = parse_program("void f() { if (x > 0) y = 1 else y = 2; }").unwrap_err();
    assert!(err.to_string().contains("expected ';', found 'else'"), "{err}");
}

#[test]
fn error_unsupported_statement_in_body() {
    let err = parse_program("int f() { if (x > 0) return 1; }").unwrap_err();
    assert!(err.to_string().contains("expected statement, found 'return'"), "{err}");
}

#[test]
fn deeply_nested_if_bodies_are_rejected_without_overflow() {
    let src = format!("void f() {{ {} x = 1; }}", "if (x > 0) ".repeat(100_000));
    let err = parse_program(&src).unwrap_err();
    assert!(err.is_syntax());
    assert!(err.to_string().contains("levels of nesting"), "{err}");
}

#[test]
fn error_dangling_else() {
    let err = parse_program("void f() { else { } }").unwrap_err();
    assert!(err.to_string().contains("expected statement, found 'else'"), "{err}");
}
