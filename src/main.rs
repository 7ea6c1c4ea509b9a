use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use lox::evaluator::Evaluator;
use lox::runner::{self, RunOutcome};
use std::fs;
use std::path::Path;
use std::process;

// sysexits(3), as other Lox implementations use them
const EXIT_DATA_ERROR: i32 = 65;
const EXIT_NO_INPUT: i32 = 66;
const EXIT_SOFTWARE: i32 = 70;

fn main() {
    let matches = Command::new("lox")
        .about("A tree-walking interpreter for the Lox language")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start the REPL, after running FILE if one is given")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log scanner, parser and runtime activity")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dump-ast")
                .long("dump-ast")
                .help("Print the parsed syntax tree instead of running it")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut logger = env_logger::Builder::from_default_env();
    if matches.get_flag("verbose") {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let interactive = matches.get_flag("interactive");
    match matches.get_one::<String>("file") {
        Some(file_path) if matches.get_flag("dump-ast") => dump_ast(Path::new(file_path)),
        Some(file_path) => run_file(Path::new(file_path), interactive),
        None => lox::start_repl(),
    }
}

/// Runs the script, then either exits with its status or, with
/// `--interactive`, hands its globals over to the REPL.
fn run_file(path: &Path, interactive: bool) {
    let mut evaluator = Evaluator::new();

    let outcome = match runner::run_file(&mut evaluator, path) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(EXIT_NO_INPUT);
        }
    };

    if interactive {
        lox::start_repl_with(evaluator);
        return;
    }

    match outcome {
        RunOutcome::Success => {}
        RunOutcome::StaticError => process::exit(EXIT_DATA_ERROR),
        RunOutcome::RuntimeError => process::exit(EXIT_SOFTWARE),
    }
}

fn dump_ast(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(EXIT_NO_INPUT);
        }
    };
    let filename = path.display().to_string();

    let (program, diagnostics) = runner::parse_source(&source);
    diagnostics.report_all(&source, Some(&filename));
    println!("{:#?}", program);
    if diagnostics.had_error() {
        process::exit(EXIT_DATA_ERROR);
    }
}
