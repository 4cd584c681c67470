use crate::error::EvalError;
use crate::interpreter::Value;
use crate::stdlib::{arity, expect_string, insert_fn};

use std::collections::HashMap;
use std::path::Path;

pub fn add_io_functions(globals: &mut HashMap<String, Value>) {
    // env(name: string) -> string?
    insert_fn(globals, "env", |args| {
        arity("env", args, 1)?;
        let name = expect_string("env", &args[0])?;
        Ok(std::env::var(name).ok().into())
    });

    // print(values: ...T) -> null
    // Writes to stderr so it never interleaves with rendered output.
    insert_fn(globals, "print", |args| {
        let line: Vec<String> = args.iter().map(Value::to_text).collect();
        eprintln!("{}", line.join(" "));
        Ok(Value::Null)
    });

    // read_file(path: string) -> string
    insert_fn(globals, "read_file", |args| {
        arity("read_file", args, 1)?;
        let path = expect_string("read_file", &args[0])?;
        std::fs::read_to_string(path)
            .map(Value::String)
            .map_err(|e| EvalError::host_error(format!("cannot read {path}: {e}")))
    });

    // write_file(path: string, content: string) -> bool
    insert_fn(globals, "write_file", |args| {
        arity("write_file", args, 2)?;
        let path = expect_string("write_file", &args[0])?;
        let content = expect_string("write_file", &args[1])?;
        Ok(Value::Bool(std::fs::write(path, content).is_ok()))
    });

    // file_exists(path: string) -> bool
    insert_fn(globals, "file_exists", |args| {
        arity("file_exists", args, 1)?;
        Ok(Value::Bool(Path::new(expect_string("file_exists", &args[0])?).exists()))
    });
}
