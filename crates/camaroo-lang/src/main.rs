use anyhow::{bail, Context, Result};
use camaroo_core::keywords::load_keywords;
use camaroo_core::lexer::token::TokenType;
use camaroo_core::lexer::Lexer;
use camaroo_core::parser::Parser;
use camaroo_lang::diagnostics;
use camaroo_lang::interpreter::environment::Environment;
use camaroo_lang::interpreter::Interpreter;
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use tracing::{debug, info, Level};

#[derive(ClapParser)]
#[command(name = "camaroo")]
#[command(about = "The camaroo scripting language")]
struct Cli {
    /// Script file to run (omit for REPL)
    script: Option<String>,

    /// Path to keywords JSON file
    #[arg(short, long)]
    keywords: Option<String>,

    /// Print the token stream before running
    #[arg(long)]
    tokens: bool,

    /// Print the parsed program before running
    #[arg(long)]
    ast: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy)]
struct Dump {
    tokens: bool,
    ast: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let keywords = load_keywords(cli.keywords.as_deref())?;
    let dump = Dump {
        tokens: cli.tokens,
        ast: cli.ast,
    };
    let mut interpreter = Interpreter::new(Environment::new());

    match cli.script {
        None => run_prompt(&keywords, &mut interpreter, dump)?,
        Some(path) => run_file(&path, &keywords, &mut interpreter, dump)?,
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_prompt(
    keywords: &HashMap<String, TokenType>,
    interpreter: &mut Interpreter,
    dump: Dump,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut buffer = String::new();

    let history_path = dirs::home_dir().map(|p| p.join(".camaroo_history"));
    if let Some(ref path) = history_path {
        if rl.load_history(path).is_err() {
            debug!(path = %path.display(), "no history loaded");
        }
    }

    loop {
        let prompt = if buffer.is_empty() { "> " } else { "| " };

        match rl.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() {
                    match line.trim() {
                        ":quit" => break,
                        ":vars" => {
                            print_vars(interpreter);
                            continue;
                        }
                        _ => {}
                    }
                }

                // a blank line flushes whatever is buffered
                let flush = line.trim().is_empty();
                buffer.push_str(&line);
                buffer.push('\n');

                if flush || is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        let _ = rl.add_history_entry(buffer.trim());
                        if let Err(e) = run(&buffer, keywords, interpreter, dump) {
                            eprintln!("Execution error: {}", e);
                        }
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Err(e) = rl.save_history(path) {
            info!(path = %path.display(), error = %e, "could not save history");
        }
    }

    Ok(())
}

fn print_vars(interpreter: &Interpreter) {
    let env = interpreter.environment();
    if env.is_empty() {
        println!("(no variables)");
        return;
    }
    for (name, binding) in env.iter() {
        println!("{} {} = {}", binding.declared_type, name, binding.value);
    }
}

/// A buffer is complete once it ends in `;` outside any text, letter,
/// comment or open parenthesis.
fn is_complete(code: &str) -> bool {
    let mut depth = 0i32;
    let mut in_text = false;
    let mut escaped = false;
    let mut last_significant = None;
    let mut iter = code.chars().peekable();

    while let Some(c) = iter.next() {
        if in_text {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_text = false;
                last_significant = Some(c);
            }
            continue;
        }

        match c {
            '"' => in_text = true,
            '\'' => {
                if iter.next() == Some('\\') {
                    iter.next();
                }
                iter.next_if_eq(&'\'');
                last_significant = Some('\'');
                continue;
            }
            '/' if iter.peek() == Some(&'/') => {
                while iter.next_if(|&next| next != '\n').is_some() {}
                continue;
            }
            '#' => {
                // an unclosed block comment swallows the rest
                if !iter.by_ref().any(|next| next == '#') {
                    return false;
                }
                continue;
            }
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }

        if !c.is_whitespace() {
            last_significant = Some(c);
        }
    }

    !in_text && depth <= 0 && last_significant == Some(';')
}

fn run_file(
    path: &str,
    keywords: &HashMap<String, TokenType>,
    interpreter: &mut Interpreter,
    dump: Dump,
) -> Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read script {}", path))?;
    if !run(&contents, keywords, interpreter, dump)? {
        bail!("{} did not run to completion", path);
    }
    Ok(())
}

/// Runs one chunk of source against the shared interpreter. Returns whether
/// it parsed and evaluated without error; diagnostics go to stderr.
fn run(
    source: &str,
    keywords: &HashMap<String, TokenType>,
    interpreter: &mut Interpreter,
    dump: Dump,
) -> Result<bool> {
    if dump.tokens {
        for token in Lexer::new(source, keywords) {
            println!(
                "{:>4}:{:<4} {:<24} {}",
                token.span.line,
                token.span.col,
                format!("{:?}", token.token_type),
                token.lexeme
            );
        }
    }

    let program = Parser::new(source, keywords).parse_program();
    if !program.is_ok() {
        for e in &program.errors {
            eprint!("{}", diagnostics::render_parse_error(source, e));
        }
        return Ok(false);
    }

    if dump.ast {
        print!("{}", program);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = interpreter.evaluate_program(&program, &mut out);
    out.flush()?;

    match result {
        Ok(()) => Ok(true),
        Err(e) => {
            eprint!("{}", diagnostics::render_runtime_error(source, &e));
            Ok(false)
        }
    }
}
