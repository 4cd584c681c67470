use brittle::template::tokenize;
use brittle::{Cause, Context, Engine, EvalErrorKind, Program, Value, compile, run_template, run_template_with};
use pretty_assertions::assert_eq;

#[test]
fn literal_text_round_trips() {
    let source = "No markers here.\n  Indented line,\ttabs and [brackets] and `ticks`.\n";
    assert_eq!(run_template(source).unwrap(), source);
}

#[test]
fn whitespace_only_document_renders_empty() {
    assert_eq!(run_template(" \n\t\n  ").unwrap(), "");
    assert_eq!(run_template("").unwrap(), "");
}

#[test]
fn escaped_marker_stays_literal() {
    assert_eq!(run_template("a \\[`x`] b").unwrap(), "a [`x`] b");
    assert_eq!(run_template("\\[=`1 + 1`]").unwrap(), "[=`1 + 1`]");
}

#[test]
fn escape_only_covers_its_own_marker() {
    assert_eq!(run_template("\\[`x`] [=`1 + 1`]").unwrap(), "[`x`] 2");
}

#[test]
fn byte_order_mark_alone_is_blank() {
    assert_eq!(run_template("\u{feff}\n[=`1`]\u{feff}").unwrap(), "1");
}

#[test]
fn value_fragments_are_spliced() {
    assert_eq!(run_template("x=[=`1+1`]y").unwrap(), "x=2y");
    assert_eq!(run_template("[=`'a' + 'b'`][=`null`][=`3.0`]").unwrap(), "ab3");
}

#[test]
fn bindings_persist_across_fragments() {
    assert_eq!(run_template("[`let n=2;`][=`n*3`]").unwrap(), "6");
}

#[test]
fn value_fragment_bindings_do_not_leak() {
    let error = run_template("[=`do let tmp = 1; tmp end`][=`tmp`]").unwrap_err();
    assert_eq!(error.instruction, 1);
}

#[test]
fn whitespace_around_markers_collapses() {
    let source = "\n\n[`let greeting = 'hi';`]\n\n[=`greeting`]\n\n";
    assert_eq!(run_template(source).unwrap(), "hi");
}

#[test]
fn non_blank_text_keeps_its_whitespace() {
    let source = "[`let n = 1;`]\n  total: [=`n`]\n";
    // the trailing newline is whitespace-only text and is dropped
    assert_eq!(run_template(source).unwrap(), "\n  total: 1");
}

#[test]
fn context_is_visible_to_fragments() {
    let context = Context::new().with("name", "Ada");
    assert_eq!(
        run_template_with("[=`context.name`]", context).unwrap(),
        "Ada"
    );
}

#[test]
fn missing_context_is_an_empty_object() {
    assert_eq!(run_template("[=`context.name`]|[=`len(context)`]").unwrap(), "|0");
}

#[test]
fn nested_context_values() {
    let user = Value::object([
        ("name", Value::from("Ada")),
        ("langs", Value::from(vec!["en", "fr"])),
    ]);
    let context = Context::new().with("user", user);
    let output = run_template_with(
        "[=`context.user.name`] speaks [=`join(context.user.langs, ' and ')`]",
        context,
    )
    .unwrap();
    assert_eq!(output, "Ada speaks en and fr");
}

#[test]
fn undefined_name_fails_the_whole_call() {
    let error = run_template("before [=`missing_name`] after").unwrap_err();
    assert!(error.to_string().starts_with("template execution failed"));
    assert!(!error.is_syntax());

    let Cause::Eval(cause) = &error.cause else {
        panic!("expected a runtime failure, got {error:?}");
    };
    assert_eq!(cause.kind, EvalErrorKind::UndefinedVariable);
}

#[test]
fn syntax_errors_are_template_failures_too() {
    let error = run_template("ok [=`1 +* 2`]").unwrap_err();
    assert!(error.is_syntax());
    assert!(error.to_string().starts_with("template execution failed"));
}

// Deliberate deviation: failures name the fragment that caused them.
#[test]
fn failures_are_attributed_to_their_fragment() {
    let source = "[`let a = 1;`] fine [=`a`] broken [=`a.b.c`]";
    let error = run_template(source).unwrap_err();

    assert_eq!(error.instruction, 4);
    assert_eq!(&source[error.span.clone()], "a.b.c");
}

#[test]
fn runaway_templates_fail_instead_of_crashing() {
    let error = run_template("[`let f = fn(n) -> f(n + 1);`][=`f(0)`]").unwrap_err();
    assert!(error.to_string().starts_with("template execution failed"));
    let Cause::Eval(cause) = &error.cause else {
        panic!("expected a runtime failure, got {error:?}");
    };
    assert_eq!(cause.kind, EvalErrorKind::RecursionLimit);

    let nested = format!("[=`{}1{}`]", "(".repeat(200_000), ")".repeat(200_000));
    assert!(run_template(&nested).unwrap_err().is_syntax());

    let error = run_template("[=`repeat('ab', 9223372036854775807)`]").unwrap_err();
    let Cause::Eval(cause) = &error.cause else {
        panic!("expected a runtime failure, got {error:?}");
    };
    assert_eq!(cause.kind, EvalErrorKind::Overflow);
}

#[test]
fn error_report_points_into_the_document() {
    let source = "line one\n[=`nope`]\n";
    let error = run_template(source).unwrap_err();
    let report = error.report("doc.tmpl");

    let mut rendered = Vec::new();
    report
        .write(
            ("doc.tmpl".to_string(), ariadne::Source::from(source)),
            &mut rendered,
        )
        .unwrap();
    let rendered = String::from_utf8_lossy(&rendered);
    assert!(rendered.contains("doc.tmpl"));
    assert!(rendered.contains("is not defined"));
}

#[test]
fn tokenizing_is_repeatable() {
    let source = "a [=`x`] b [`let y = 1;`] \\[`z`] [=`\nmulti\nline\n`]";
    assert_eq!(tokenize(source), tokenize(source));
}

#[test]
fn multiline_fragments() {
    let source = "[`\nlet total = 0;\nfor n in range(4) do\n  total += n\nend\n`]sum=[=`total`]";
    assert_eq!(run_template(source).unwrap(), "sum=6");
}

#[test]
fn unterminated_markers_are_text() {
    assert_eq!(run_template("[=`1 + 1").unwrap(), "[=`1 + 1");
    assert_eq!(run_template("[= `1`]").unwrap(), "[= `1`]");
}

#[test]
fn loops_build_output_through_bindings() {
    let source = "[`let out = [];\nfor item in context.items do out = append(out, '- ' + item) end`][=`join(out, '\\n')`]";
    let context = Context::new().with("items", vec!["milk", "eggs"]);
    assert_eq!(run_template_with(source, context).unwrap(), "- milk\n- eggs");
}

#[test]
fn engine_functions_and_globals() {
    let mut engine = Engine::new();
    engine
        .define("site", "brittle.dev")
        .register_fn("shout", |args| match args {
            [Value::String(s)] => Ok(Value::String(s.to_uppercase() + "!")),
            _ => Err(brittle::EvalError::type_error("shout expects one string")),
        });

    assert_eq!(
        engine.render("[=`shout(site)`]").unwrap(),
        "BRITTLE.DEV!"
    );
}

#[test]
fn programs_survive_their_textual_form() {
    let program = compile("Hi [=`context.name`]\\[`x`] [`let s = \"a`b\\\\\";`]");
    let text = program.to_string();
    let parsed: Program = text.parse().unwrap();
    assert_eq!(parsed, program);
}

#[test]
fn malformed_program_text_is_rejected() {
    assert!("jump 0..1 `x`".parse::<Program>().is_err());
    assert!("text 0..1 `unterminated".parse::<Program>().is_err());
}
