use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::fs::read_to_string;
use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use tamarin::environment::Environment;
use tamarin::evaluator;
use tamarin::lexer::Lexer;
use tamarin::repl;

#[derive(Debug, Parser)]
#[clap(name = "tamarin", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: Option<TamarinCommand>,
}

#[derive(Debug, Subcommand)]
pub enum TamarinCommand {
    /// Print the token stream of a source file.
    Tokenize { path: PathBuf },
    /// Print the parsed program back as canonical source.
    Parse { path: PathBuf },
    /// Evaluate a source file and print the resulting value.
    Run { path: PathBuf },
    /// Start an interactive session (the default).
    Repl,
}

fn main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    let args = CLArgs::parse();
    match args.routine.unwrap_or(TamarinCommand::Repl) {
        TamarinCommand::Tokenize { path } => {
            let source = read_to_string(path)?;
            tokenize(&source);
        }
        TamarinCommand::Parse { path } => {
            let source = read_to_string(path)?;
            if !parse(&source) {
                return Ok(ExitCode::from(65));
            }
        }
        TamarinCommand::Run { path } => {
            let source = read_to_string(path)?;
            return Ok(run(&source));
        }
        TamarinCommand::Repl => {
            repl::run(stdin().lock(), stdout())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn tokenize(source: &str) {
    for token in Lexer::new(source) {
        println!("{} -> {}", token.kind, token.literal);
    }
}

fn parse(source: &str) -> bool {
    let (program, errors) = tamarin::parser::parse(source);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return false;
    }
    println!("{program}");
    true
}

fn run(source: &str) -> ExitCode {
    let (program, errors) = tamarin::parser::parse(source);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return ExitCode::from(65);
    }

    let environment = Environment::new();
    match evaluator::eval_program(&program, &environment) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("ERROR: {error}");
            ExitCode::from(70)
        }
    }
}
