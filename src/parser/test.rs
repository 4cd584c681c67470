use super::*;
use crate::ast::{AssignOp, BinOp, UnOp};
use pretty_assertions::assert_eq;

// Parse a fragment that is expected to be valid.
fn parse_str(input: &str) -> Block {
    match parse(input, 0) {
        Ok(block) => block,
        Err(errors) => panic!("unexpected syntax errors in {input:?}: {errors:#?}"),
    }
}

fn parse_single(input: &str) -> Spanned<Expr> {
    let mut block = parse_str(input);
    assert_eq!(block.len(), 1, "expected one statement in {input:?}");
    block.remove(0)
}

fn parse_err(input: &str) -> Vec<SyntaxError> {
    parse_err_at(input, 0)
}

fn parse_err_at(input: &str, offset: usize) -> Vec<SyntaxError> {
    match parse(input, offset) {
        Ok(block) => panic!("expected {input:?} to fail, got {block:#?}"),
        Err(errors) => errors,
    }
}

#[test]
fn test_parse_basic_expressions() {
    let ast = parse_str("5; true; 2.5; \"hello\"; null");
    let exprs: Vec<Expr> = ast.into_iter().map(|(expr, _)| expr).collect();
    assert_eq!(
        exprs,
        vec![
            Expr::Int(5),
            Expr::Bool(true),
            Expr::Float(2.5),
            Expr::String("hello".to_string()),
            Expr::Null,
        ]
    );
}

#[test]
fn test_statements_without_semicolons() {
    let ast = parse_str("a b\nc");
    assert_eq!(ast.len(), 3);
}

#[test]
fn test_empty_fragment() {
    assert!(parse_str("").is_empty());
    assert!(parse_str(" ;; ").is_empty());
}

#[test]
fn test_parse_array() {
    let (expr, span) = parse_single("[1, 2, 3]");
    assert_eq!(span, 0..9);
    let Expr::Array { elements } = expr else {
        panic!("expected an array, got {expr:?}");
    };
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[2].0, Expr::Int(3));
}

#[test]
fn test_parse_object() {
    let (expr, _) = parse_single("{name: 'Ada', \"born\": 1815}");
    let Expr::Object { entries } = expr else {
        panic!("expected an object, got {expr:?}");
    };
    assert_eq!(entries[0].0, "name");
    assert_eq!(entries[1].0, "born");
    assert_eq!(entries[1].1.0, Expr::Int(1815));
}

#[test]
fn test_parse_index_field_and_call() {
    let (expr, _) = parse_single("context.items[0](1, 2)");
    let Expr::Call { function, args } = expr else {
        panic!("expected a call, got {expr:?}");
    };
    assert_eq!(args.len(), 2);

    let Expr::Index { array, index } = function.0 else {
        panic!("expected an index");
    };
    assert_eq!(index.0, Expr::Int(0));
    assert_eq!(
        array.0,
        Expr::Field {
            object: Box::new((Expr::Variable("context".to_string()), 0..7)),
            field_name: "items".to_string(),
        }
    );
}

#[test]
fn test_operator_precedence() {
    let (expr, _) = parse_single("1 + 2 * 3");
    let Expr::BinOp {
        operator,
        l_value,
        r_value,
    } = expr
    else {
        panic!("expected a binary operation");
    };
    assert_eq!(operator, BinOp::Add);
    assert_eq!(l_value.0, Expr::Int(1));
    assert!(matches!(
        r_value.0,
        Expr::BinOp {
            operator: BinOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_power_is_right_associative() {
    let (expr, _) = parse_single("2 ** 3 ** 2");
    let Expr::BinOp { l_value, r_value, .. } = expr else {
        panic!("expected a binary operation");
    };
    assert_eq!(l_value.0, Expr::Int(2));
    assert!(matches!(
        r_value.0,
        Expr::BinOp {
            operator: BinOp::Power,
            ..
        }
    ));
}

#[test]
fn test_subtraction_is_left_associative() {
    let (expr, _) = parse_single("10 - 4 - 3");
    let Expr::BinOp { l_value, r_value, .. } = expr else {
        panic!("expected a binary operation");
    };
    assert!(matches!(
        l_value.0,
        Expr::BinOp {
            operator: BinOp::Sub,
            ..
        }
    ));
    assert_eq!(r_value.0, Expr::Int(3));
}

#[test]
fn test_logical_operators_bind_loosest() {
    let (expr, _) = parse_single("a == 1 or not b and c");
    let Expr::BinOp {
        operator: BinOp::Or,
        r_value,
        ..
    } = expr
    else {
        panic!("expected `or` at the root, got {expr:?}");
    };
    let Expr::BinOp {
        operator: BinOp::And,
        l_value,
        ..
    } = r_value.0
    else {
        panic!("expected `and` on the right");
    };
    assert!(matches!(
        l_value.0,
        Expr::UnOp {
            unop: UnOp::Not,
            ..
        }
    ));
}

#[test]
fn test_parse_let() {
    let (expr, span) = parse_single("let n = 2");
    assert_eq!(span, 0..9);
    assert_eq!(
        expr,
        Expr::Let {
            var: "n".to_string(),
            value: Box::new((Expr::Int(2), 8..9)),
        }
    );
}

#[test]
fn test_parse_compound_assignment() {
    let (expr, _) = parse_single("totals.sum += 4");
    let Expr::Assign {
        l_value, assign_op, ..
    } = expr
    else {
        panic!("expected an assignment");
    };
    assert_eq!(assign_op, AssignOp::AddAssign);
    assert!(matches!(l_value.0, Expr::Field { .. }));
}

#[test]
fn test_assignment_is_right_associative() {
    let (expr, _) = parse_single("a = b = 1");
    let Expr::Assign { r_value, .. } = expr else {
        panic!("expected an assignment");
    };
    assert!(matches!(r_value.0, Expr::Assign { .. }));
}

#[test]
fn test_invalid_assignment_target() {
    let errors = parse_err("1 + 2 = 3");
    assert_eq!(errors[0].message, "invalid assignment target");
    assert_eq!(errors[0].span, 0..7);
}

#[test]
fn test_parse_if_else() {
    let (expr, _) = parse_single("if x > 1 then 'big' else 'small'");
    let Expr::IfElse {
        condition,
        if_branch,
        else_branch,
    } = expr
    else {
        panic!("expected an if expression");
    };
    assert!(matches!(condition.0, Expr::BinOp { .. }));
    assert_eq!(if_branch.0, Expr::String("big".to_string()));
    assert_eq!(
        else_branch.map(|branch| branch.0),
        Some(Expr::String("small".to_string()))
    );
}

#[test]
fn test_if_without_then_has_note() {
    let errors = parse_err("if x 1");
    assert!(errors[0].message.contains("`then`"));
    assert!(errors[0].note.is_some());
}

#[test]
fn test_parse_do_block() {
    let (expr, span) = parse_single("do let a = 1; a + 1 end");
    assert_eq!(span, 0..23);
    let Expr::Do { expressions } = expr else {
        panic!("expected a block");
    };
    assert_eq!(expressions.len(), 2);
}

#[test]
fn test_unclosed_block() {
    let errors = parse_err("do 1; 2");
    assert_eq!(errors[0].span, 0..2);
    assert!(errors[0].message.contains("end of fragment"));
}

#[test]
fn test_parse_loops() {
    let (expr, _) = parse_single("while i < 3 do i += 1 end");
    assert!(matches!(expr, Expr::While { .. }));

    let (expr, _) = parse_single("for item in items do print(item) end");
    let Expr::For { var, iterable, .. } = expr else {
        panic!("expected a for loop");
    };
    assert_eq!(var, "item");
    assert_eq!(iterable.0, Expr::Variable("items".to_string()));
}

#[test]
fn test_for_without_in() {
    let errors = parse_err("for x items do end");
    assert!(errors[0].message.contains("`in`"));
    assert!(errors[0].note.is_some());
}

#[test]
fn test_parse_lambda() {
    let (expr, _) = parse_single("fn(a, b) -> a + b");
    let Expr::Lambda { args, expression } = expr else {
        panic!("expected a lambda");
    };
    assert_eq!(args, vec!["a".to_string(), "b".to_string()]);
    assert!(matches!(expression.0, Expr::BinOp { .. }));

    let (expr, _) = parse_single("fn() -> 1");
    assert!(matches!(expr, Expr::Lambda { ref args, .. } if args.is_empty()));
}

#[test]
fn test_lambda_rejects_duplicate_parameters() {
    let errors = parse_err("fn(a, a) -> a");
    assert_eq!(errors[0].message, "duplicate parameter `a`");
}

#[test]
fn test_let_is_not_an_expression() {
    let errors = parse_err("1 + let a = 2");
    assert!(errors[0].message.contains("`let` is a statement"));
}

#[test]
fn test_spans_are_offset_into_the_document() {
    let block = match parse("n * 3", 12) {
        Ok(block) => block,
        Err(errors) => panic!("{errors:#?}"),
    };
    assert_eq!(block[0].1, 12..17);

    let errors = match parse("n * ", 12) {
        Ok(block) => panic!("expected an error, got {block:?}"),
        Err(errors) => errors,
    };
    assert_eq!(errors[0].span, 16..16);
}

#[test]
fn test_every_invalid_token_is_reported() {
    let errors = parse_err("a # b @ c");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].span, 2..3);
    assert_eq!(errors[1].span, 6..7);
}

#[test]
fn test_unterminated_string() {
    let errors = parse_err("'never closed");
    assert!(errors[0].message.starts_with("invalid token"));
}

#[test]
fn test_unexpected_end_of_fragment() {
    let errors = parse_err("foo(1,");
    assert!(errors[0].message.contains("unexpected end of fragment"));
}

#[test]
fn test_nesting_within_the_limit() {
    let parens = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(parse_single(&parens).0, Expr::Int(1));

    let chain = vec!["1"; 60].join(" + ");
    assert!(matches!(parse_single(&chain).0, Expr::BinOp { operator: BinOp::Add, .. }));
}

#[test]
fn test_deep_nesting_is_a_syntax_error() {
    let deep = [
        format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000)),
        format!("{}1", "-".repeat(50_000)),
        vec!["1"; 50_000].join(" + "),
        vec!["2"; 50_000].join(" ** "),
        format!("a{}", ".b".repeat(50_000)),
        format!("f{}", "()".repeat(50_000)),
        format!("{}1{}", "[".repeat(50_000), "]".repeat(50_000)),
        format!("{}1{}", "do ".repeat(50_000), " end".repeat(50_000)),
    ];

    for source in &deep {
        let errors = parse_err(source);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expression nests too deeply");
    }
}

#[test]
fn test_offset_past_the_address_space() {
    let errors = parse_err_at("1 + 1", usize::MAX);
    assert_eq!(errors[0].message, "fragment offset is out of range");

    // nothing to shift, so nothing can overflow
    assert_eq!(parse("", usize::MAX), Ok(vec![]));
}
