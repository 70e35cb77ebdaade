// ABOUTME: Minimal demonstration binary wiring an Engine to a script file or inline expression

use clap::Parser;
use mini_lisp_engine::Engine;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "run")]
#[command(about = "Runs a Mini-Lisp script through an embedded Engine")]
struct CliArgs {
    /// Script file to execute.
    #[arg(value_name = "FILE", conflicts_with = "expression")]
    script: Option<PathBuf>,

    /// Evaluate a single inline expression instead of a file.
    #[arg(short = 'e', long = "eval", value_name = "EXPR")]
    expression: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();
    let source = match (&args.script, &args.expression) {
        (Some(path), None) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!(";; failed to read {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        (None, Some(expr)) => expr.clone(),
        _ => {
            eprintln!("usage: run <FILE> | -e <EXPR>");
            return ExitCode::FAILURE;
        }
    };

    let engine = Engine::new();
    engine
        .eval(&source, true, &mut |line| println!("{line}"))
        .expect("run's Engine never receives a quit signal");

    ExitCode::SUCCESS
}
