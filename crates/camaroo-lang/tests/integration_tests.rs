use camaroo_core::keywords::{default_keyword_table, load_keywords};
use camaroo_core::lexer::token::TypeKeyword;
use camaroo_core::parser::Parser;
use camaroo_core::value::Value;
use camaroo_lang::interpreter::environment::Environment;
use camaroo_lang::interpreter::{Interpreter, RuntimeErrorKind};
use std::collections::HashMap;
use std::io::Write;

struct Run {
    output: String,
    env: Environment,
    error: Option<String>,
}

// Mimic what the camaroo binary does with one script
fn eval(source: &str) -> Run {
    eval_in(Environment::new(), source)
}

fn eval_in(env: Environment, source: &str) -> Run {
    let program = Parser::new(source, &default_keyword_table()).parse_program();
    let mut interpreter = Interpreter::new(env);
    let mut out = Vec::new();

    let error = if program.is_ok() {
        interpreter
            .evaluate_program(&program, &mut out)
            .err()
            .map(|e| e.to_string())
    } else {
        Some(program.diagnostics().join("\n"))
    };

    Run {
        output: String::from_utf8(out).unwrap(),
        env: interpreter.into_environment(),
        error,
    }
}

fn value(run: &Run, name: &str) -> Value {
    match run.env.value(name) {
        Some(v) => v.clone(),
        None => panic!("`{}` is not bound; error: {:?}", name, run.error),
    }
}

#[test]
fn declare_and_use() {
    let run = eval("num x = 5; num y = x + 3;");
    assert_eq!(run.error, None);
    assert_eq!(value(&run, "x"), Value::Int(5));
    assert_eq!(value(&run, "y"), Value::Int(8));
}

#[test]
fn missing_assign_is_a_parse_error() {
    let run = eval("num x 5;");
    assert_eq!(
        run.error.as_deref(),
        Some("expected next token to be `=` or `;` but found `5`")
    );
    assert!(run.env.is_empty());
}

#[test]
fn division_by_zero_is_reported_and_nothing_is_bound() {
    let run = eval("num x = 5 / 0;");
    assert_eq!(run.error.as_deref(), Some("division by zero"));
    assert!(run.env.get("x").is_none());
}

#[test]
fn print_and_println() {
    assert_eq!(eval("print(\"Hello world\");").output, "Hello world");
    assert_eq!(eval("println(\"Hello world\");").output, "Hello world\n");
}

#[test]
fn whole_program() {
    let source = r#"
        // running total
        num total = 0;
        num8 step = 3;
        total = total + step * 2;
        total = total - 1;
        # block
          comment #
        fnum ratio = total / 2.0;
        text name = "cam" + "aroo";
        letter first = 'c';
        toggle done = total == 5 and not false;
        println name;
        println total;
        println ratio;
        println done;
        print first;
    "#;
    let run = eval(source);
    assert_eq!(run.error, None);
    assert_eq!(run.output, "camaroo\n5\n2.5\ntrue\nc");
    assert_eq!(value(&run, "done"), Value::Bool(true));
    assert_eq!(
        run.env.get("step").map(|b| b.declared_type),
        Some(TypeKeyword::Num8)
    );
}

#[test]
fn defaults_for_declarations_without_value() {
    let run = eval("num a; fnum32 b; text c; letter d; toggle e;");
    assert_eq!(run.error, None);
    assert_eq!(value(&run, "a"), Value::Int(0));
    assert_eq!(value(&run, "b"), Value::Float(0.0));
    assert_eq!(value(&run, "c"), Value::Text(String::new()));
    assert_eq!(value(&run, "d"), Value::Text(String::new()));
    assert_eq!(value(&run, "e"), Value::Bool(false));
}

#[test]
fn width_limits() {
    assert_eq!(eval("num8 a = -128; num8 b = 127;").error, None);
    assert_eq!(
        eval("num8 a = 200;").error.as_deref(),
        Some("literal `200` is out of range for `num8`")
    );
    assert_eq!(
        eval("num8 a = 100; a = a * 2;").error.as_deref(),
        Some("value 200 is out of range for `num8`")
    );
    assert_eq!(eval("num16 a = 32767;").error, None);
    assert!(eval("num16 a = 32768;").error.is_some());
    assert_eq!(eval("num32 a = 2147483647;").error, None);
    assert!(eval("num32 a = 2147483648;").error.is_some());
    assert!(eval("num64 a = 9223372036854775808;").error.is_some());
    assert!(eval("fnum32 a = 1000000000000000000000.0 * 1000000000000000000000.0;")
        .error
        .is_some());
    assert_eq!(eval("fnum64 a = 1000000000000000000000.0 * 1000000000000000000000.0;").error, None);
}

#[test]
fn literal_too_wide_stops_the_whole_program() {
    let run = eval("println \"start\"; num8 a = 200;");
    assert_eq!(
        run.error.as_deref(),
        Some("literal `200` is out of range for `num8`")
    );
    assert!(run.output.is_empty());
    assert!(run.env.is_empty());
}

#[test]
fn runtime_error_stops_but_keeps_earlier_effects() {
    let run = eval("num a = 1; println a; a = a / 0; num b = 2;");
    assert_eq!(run.output, "1\n");
    assert_eq!(value(&run, "a"), Value::Int(1));
    assert!(run.env.get("b").is_none());
}

#[test]
fn session_keeps_environment_between_chunks() {
    let first = eval("num x = 41;");
    let second = eval_in(first.env, "x = x + 1; println x;");
    assert_eq!(second.error, None);
    assert_eq!(second.output, "42\n");

    let third = eval_in(second.env, "println y;");
    assert_eq!(third.error.as_deref(), Some("undefined variable `y`"));
}

#[test]
fn parse_errors_are_all_reported() {
    let run = eval("num x 5;\nnum y = ;\nprintln 1;");
    let error = run.error.unwrap();
    assert_eq!(error.lines().count(), 2);
    assert!(run.output.is_empty());
}

#[test]
fn custom_keywords() {
    let mut file = std::env::temp_dir();
    file.push(format!("camaroo-integration-{}.json", std::process::id()));
    std::fs::File::create(&file)
        .unwrap()
        .write_all(br#"{"int": "angka", "print": "tulis"}"#)
        .unwrap();

    let keywords: HashMap<_, _> = load_keywords(file.to_str()).unwrap();
    std::fs::remove_file(&file).unwrap();

    let program = Parser::new("angka x = 2; tulis x * 21;", &keywords).parse_program();
    assert!(program.is_ok(), "{:?}", program.errors);

    let mut interpreter = Interpreter::new(Environment::new());
    let mut out = Vec::new();
    interpreter.evaluate_program(&program, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "42");
}

#[test]
fn invalid_program_is_refused() {
    let program = Parser::new("num x = ;", &default_keyword_table()).parse_program();
    let mut interpreter = Interpreter::new(Environment::new());
    let error = interpreter
        .evaluate_program(&program, &mut Vec::<u8>::new())
        .unwrap_err();
    assert_eq!(error.kind, RuntimeErrorKind::InvalidProgram(1));
}
