use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper, Result};
use strum::IntoEnumIterator;

use super::commands::CommandName;

pub struct CliHelper {}

// The accompanying helper for FormCli.
// Completes backslash command names; every line is a complete command.
impl CliHelper {
    fn command_candidates(&self, prefix: &str) -> Vec<Pair> {
        CommandName::iter()
            .map(|name| format!("\\{}", name.as_ref()))
            .filter(|command| command.starts_with(prefix))
            .map(|command| Pair {
                display: command.clone(),
                replacement: command,
            })
            .collect()
    }
}

impl Highlighter for CliHelper {}

impl Hinter for CliHelper {
    type Hint = String;
}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        if !prefix.starts_with('\\') || prefix.contains(char::is_whitespace) {
            return Ok((pos, vec![]));
        }

        Ok((0, self.command_candidates(prefix)))
    }
}

impl Validator for CliHelper {}

impl Helper for CliHelper {}
