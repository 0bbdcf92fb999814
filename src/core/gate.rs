//! Confirmation gate for pseudonym auto-generation
//!
//! Generating a pseudonym for an unmapped NHS number changes the persisted
//! table, so the user has to agree to it once per run. The gate is asked
//! at startup when no table entries were loaded, and again at the first
//! unmapped number if that first answer was no.

use crate::domain::NhsNumber;
use std::io::{self, BufRead, Write};

/// Decides whether new pseudonyms may be generated
pub trait GenerationGate {
    /// Ask for permission
    ///
    /// `first_unmapped` is `None` for the startup question and carries the
    /// number that triggered the question otherwise.
    fn permit(&mut self, first_unmapped: Option<NhsNumber>) -> bool;
}

impl<F> GenerationGate for F
where
    F: FnMut(Option<NhsNumber>) -> bool,
{
    fn permit(&mut self, first_unmapped: Option<NhsNumber>) -> bool {
        self(first_unmapped)
    }
}

/// Gate that always agrees (`--yes` or `auto_generate = true`)
#[derive(Debug, Default, Clone, Copy)]
pub struct PreApprovedGate;

impl GenerationGate for PreApprovedGate {
    fn permit(&mut self, _first_unmapped: Option<NhsNumber>) -> bool {
        true
    }
}

/// Gate that asks a y/n question on a terminal
pub struct ConsoleGate<R, W> {
    input: R,
    output: W,
}

impl ConsoleGate<io::StdinLock<'static>, io::Stdout> {
    /// Gate reading from stdin and writing to stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleGate<R, W> {
    /// Create a gate over arbitrary streams
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> io::Result<bool> {
        writeln!(self.output, "{question}")?;
        write!(self.output, "Type y or n: ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    /// Consume the gate, returning the output stream
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> GenerationGate for ConsoleGate<R, W> {
    fn permit(&mut self, first_unmapped: Option<NhsNumber>) -> bool {
        let question = match first_unmapped {
            None => "No pseudonyms were loaded. Should a pseudonym be generated for every NHS number found?".to_string(),
            Some(number) => format!(
                "Found a new NHS number ({number}) with no pseudonym.\nShould pseudonyms be generated for any new NHS numbers from now on?"
            ),
        };

        match self.ask(&question) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation, treating as 'no'");
                false
            }
        }
    }
}
