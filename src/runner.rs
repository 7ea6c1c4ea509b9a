use crate::ast::Program;
use crate::error::Diagnostics;
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use std::fs;
use std::io;
use std::path::Path;

/// How a run ended; the binary maps this onto its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Lexical or syntax errors were reported; nothing was executed.
    StaticError,
    RuntimeError,
}

/// Scans and parses `source`, collecting every diagnostic instead of
/// stopping at the first one.
pub fn parse_source(source: &str) -> (Program, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = Lexer::new(source).scan_tokens(&mut diagnostics);
    let program = Parser::new(tokens, &mut diagnostics).parse();
    (program, diagnostics)
}

pub fn run(source: &str, filename: Option<&str>) -> RunOutcome {
    let mut evaluator = Evaluator::new();
    run_with(&mut evaluator, source, filename)
}

/// Reads and runs the script at `path` on `evaluator`. Only a failed read is
/// an `Err`; diagnostics are reported and folded into the outcome.
pub fn run_file(evaluator: &mut Evaluator, path: &Path) -> io::Result<RunOutcome> {
    let source = fs::read_to_string(path)?;
    let filename = path.display().to_string();
    log::debug!("loaded {} ({} bytes)", filename, source.len());
    Ok(run_with(evaluator, &source, Some(&filename)))
}

/// Runs `source` on an existing evaluator so state carries over between calls.
pub fn run_with(evaluator: &mut Evaluator, source: &str, filename: Option<&str>) -> RunOutcome {
    let (program, diagnostics) = parse_source(source);
    if diagnostics.had_error() {
        diagnostics.report_all(source, filename);
        return RunOutcome::StaticError;
    }

    log::debug!("executing {} top-level statements", program.statements.len());
    match evaluator.interpret(&program) {
        Ok(()) => RunOutcome::Success,
        Err(error) => {
            error.report(source, filename);
            RunOutcome::RuntimeError
        }
    }
}
