use brittle::{Cause, Context, Engine, EvalError, EvalErrorKind, Value, run_template_async};
use pretty_assertions::assert_eq;

use std::sync::{Arc, Mutex};
use std::time::Duration;

fn engine_with_lookup(log: Arc<Mutex<Vec<String>>>) -> Engine {
    let mut engine = Engine::new();
    engine.register_async_fn("lookup", move |args| {
        let log = log.clone();
        async move {
            let key = args.first().map(Value::to_text).unwrap_or_default();
            log.lock().unwrap().push(format!("start {key}"));
            tokio::time::sleep(Duration::from_millis(5)).await;
            log.lock().unwrap().push(format!("end {key}"));
            Ok(Value::String(key.to_uppercase()))
        }
    });
    engine
}

#[tokio::test]
async fn plain_templates_render_the_same_asynchronously() {
    let output = run_template_async("[`let n=2;`]x=[=`n*3`]", Context::new())
        .await
        .unwrap();
    assert_eq!(output, "x=6");
}

#[tokio::test]
async fn deferred_values_are_awaited_in_program_order() {
    let log = Arc::new(Mutex::new(vec![]));
    let engine = engine_with_lookup(log.clone());

    let output = engine
        .render_async("[=`lookup('a')`]-[=`lookup('b')`]", Context::new())
        .await
        .unwrap();

    assert_eq!(output, "A-B");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["start a", "end a", "start b", "end b"]
    );
}

#[tokio::test]
async fn async_functions_receive_context_arguments() {
    let log = Arc::new(Mutex::new(vec![]));
    let engine = engine_with_lookup(log);

    let output = engine
        .render_async("[=`lookup(context.key)`]", Context::new().with("key", "id"))
        .await
        .unwrap();
    assert_eq!(output, "ID");
}

#[tokio::test]
async fn statement_fragments_are_not_awaited() {
    let log = Arc::new(Mutex::new(vec![]));
    let engine = engine_with_lookup(log.clone());

    let output = engine
        .render_async("[`lookup('ignored');`]done", Context::new())
        .await
        .unwrap();

    assert_eq!(output, "done");
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn nested_deferred_values_are_resolved() {
    let mut engine = Engine::new();
    engine.register_async_fn("inner", |_args| async { Ok(Value::from("deep")) });
    engine.register_async_fn("outer", |_args| async {
        let inner = brittle::interpreter::Deferred::new(async { Ok(Value::from("deep")) });
        Ok(Value::Deferred(inner))
    });

    let output = engine
        .render_async("[=`outer()`]/[=`inner()`]", Context::new())
        .await
        .unwrap();
    assert_eq!(output, "deep/deep");
}

#[tokio::test]
async fn async_failures_abort_the_call() {
    let mut engine = Engine::new();
    engine.register_async_fn("fail", |_args| async {
        Err(EvalError::host_error("upstream timed out"))
    });

    let error = engine
        .render_async("a[=`fail()`]b[=`1`]", Context::new())
        .await
        .unwrap_err();

    assert_eq!(error.instruction, 1);
    let Cause::Eval(cause) = &error.cause else {
        panic!("expected a runtime failure, got {error:?}");
    };
    assert_eq!(cause.kind, EvalErrorKind::HostError);
}

#[test]
fn sync_render_rejects_deferred_values() {
    let mut engine = Engine::new();
    engine.register_async_fn("later", |_args| async { Ok(Value::Null) });

    let error = engine.render("[=`later()`]").unwrap_err();
    let Cause::Eval(cause) = &error.cause else {
        panic!("expected a runtime failure, got {error:?}");
    };
    assert_eq!(cause.kind, EvalErrorKind::Pending);
}
