use crate::ast::{Expr, Stmt};
use crate::evaluator::Evaluator;
use crate::runner::{self, parse_source};
use std::io::{self, Write};

pub fn start() {
    start_with(Evaluator::new());
}

/// Runs the REPL on `evaluator`, so anything it already defines stays in
/// scope. One evaluator serves the whole session.
pub fn start_with(mut evaluator: Evaluator) {
    println!("Lox Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, &mut evaluator);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command(source: &str, evaluator: &mut Evaluator) {
    // A lone expression is echoed; `1 + 2` works without the trailing ';'.
    let echo_source = if source.ends_with(';') || source.ends_with('}') {
        source.to_string()
    } else {
        format!("{};", source)
    };

    let (program, diagnostics) = parse_source(&echo_source);
    if !diagnostics.had_error() && program.statements.len() == 1 {
        if let Stmt::Expression { expr } = &program.statements[0] {
            if !matches!(expr, Expr::Assign { .. } | Expr::Set { .. }) {
                match evaluator.evaluate(expr) {
                    Ok(value) => println!("{}", value),
                    Err(error) => error.report(&echo_source, None),
                }
                return;
            }
        }
    }

    runner::run_with(evaluator, &echo_source, None);
}
