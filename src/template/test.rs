use super::*;
use pretty_assertions::assert_eq;

fn text(content: &str) -> Token {
    Token::Text(content.to_string())
}

fn script(expression: &str, writes_output: bool) -> Token {
    Token::Script {
        expression: expression.to_string(),
        writes_output,
    }
}

fn kinds(source: &str) -> Vec<Token> {
    tokenize(source).into_iter().map(|(token, _)| token).collect()
}

#[test]
fn test_plain_text() {
    assert_eq!(kinds("hello world\n"), vec![text("hello world\n")]);
}

#[test]
fn test_whitespace_only_document() {
    assert!(tokenize("  \n\t\n").is_empty());
    assert!(tokenize("").is_empty());
}

#[test]
fn test_value_and_statement_markers() {
    let tokens = kinds("x=[=`1+1`]y[`let a = 2;`]");
    assert_eq!(
        tokens,
        vec![
            text("x="),
            script("1+1", true),
            text("y"),
            script("let a = 2;", false),
        ]
    );
}

#[test]
fn test_spans() {
    let source = "ab [=`name`] cd";
    let tokens = tokenize(source);

    assert_eq!(tokens[0].1, 0..3);
    assert_eq!(&source[tokens[1].1.clone()], "name");
    assert_eq!(tokens[2].1, 12..15);
}

#[test]
fn test_escaped_marker_stays_text() {
    // the escaping backslash is consumed, the span still covers it
    let tokens = tokenize("a \\[`x`] b");
    assert_eq!(tokens, vec![(text("a [`x`] b"), 0..10)]);
}

#[test]
fn test_escape_only_affects_its_own_marker() {
    let tokens = kinds("\\[`x`] [=`y`]");
    assert_eq!(tokens, vec![text("[`x`] "), script("y", true)]);
}

#[test]
fn test_escapes_in_one_text_run() {
    assert_eq!(
        kinds("\\[`a`] and \\[=`b`][=`c`]"),
        vec![text("[`a`] and [=`b`]"), script("c", true)]
    );
}

#[test]
fn test_backslash_without_marker_is_kept() {
    assert_eq!(kinds("C:\\dir \\[x]"), vec![text("C:\\dir \\[x]")]);
}

#[test]
fn test_byte_order_mark_counts_as_whitespace() {
    let tokens = kinds("\u{feff}[=`a`]\u{feff}\n[=`b`]");
    assert_eq!(tokens, vec![script("a", true), script("b", true)]);
}

#[test]
fn test_multiline_body() {
    let tokens = kinds("[`let a = 1;\nlet b = 2;`]");
    assert_eq!(tokens, vec![script("let a = 1;\nlet b = 2;", false)]);
}

#[test]
fn test_body_is_lazy() {
    // the first closing "`]" ends the fragment
    let tokens = kinds("[=`a`] and [=`b`]");
    assert_eq!(
        tokens,
        vec![script("a", true), text(" and "), script("b", true)]
    );

    // a backtick that is not followed by ']' belongs to the body
    assert_eq!(kinds("[=`a`b`]"), vec![script("a`b", true)]);
}

#[test]
fn test_adjacent_markers() {
    assert_eq!(
        kinds("[`a`][=`b`]"),
        vec![script("a", false), script("b", true)]
    );
}

#[test]
fn test_unterminated_marker_is_text() {
    assert_eq!(kinds("before [`oops"), vec![text("before [`oops")]);
    assert_eq!(kinds("[= `x`]"), vec![text("[= `x`]")]);
}

#[test]
fn test_whitespace_around_markers_collapses() {
    let tokens = kinds("\n\n[`let a = 1;`]\n\n[=`a`]\n");
    assert_eq!(tokens, vec![script("let a = 1;", false), script("a", true)]);
}

#[test]
fn test_body_is_not_trimmed() {
    assert_eq!(kinds("[=` 1 `]"), vec![script(" 1 ", true)]);
}

#[test]
fn test_tokenize_is_repeatable() {
    let source = "Hello [=`context.name`]!\n[`let x = 1;`]\\[`no`]";
    assert_eq!(tokenize(source), tokenize(source));
}
