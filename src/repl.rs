use std::io::{self, BufRead, Write};

use crate::environment::Environment;
use crate::evaluator;
use crate::parser;

const PROMPT: &str = "/> ";

/// Reads a line, parses it, and either prints the parse errors or evaluates
/// against a session-wide environment and prints the result's display form.
/// Bindings and captured closures survive across prompts; the loop ends on
/// end of input.
pub fn run(mut input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    let environment = Environment::new();

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        let (program, errors) = parser::parse(&line);
        if !errors.is_empty() {
            for error in &errors {
                writeln!(output, "{error}")?;
            }
            continue;
        }

        match evaluator::eval_program(&program, &environment) {
            Ok(value) => writeln!(output, "{value}")?,
            Err(error) => writeln!(output, "ERROR: {error}")?,
        }
    }
}
