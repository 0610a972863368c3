use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CommandName {
    Set,
    Pick,
    Check,
    Show,
    Submit,
    Related,
    Cancel,
    #[strum(serialize = "help", serialize = "?")]
    Help,
    #[strum(serialize = "q", serialize = "quit")]
    Quit,
}

impl CommandName {
    pub fn usage(&self) -> (&'static str, &'static str) {
        match self {
            CommandName::Set => ("\\set <column> <value>", "Type a value into a field"),
            CommandName::Pick => ("\\pick <column> <n>", "Choose option n of a reference field"),
            CommandName::Check => ("\\check <column> on|off", "Tick or untick a checkbox"),
            CommandName::Show => ("\\show", "Print the form"),
            CommandName::Submit => ("\\submit", "Create the record"),
            CommandName::Related => (
                "\\related <column>",
                "Create a record for a reference field in a dialog",
            ),
            CommandName::Cancel => ("\\cancel", "Close the open dialog (or the form)"),
            CommandName::Help => ("\\?", "Show this help"),
            CommandName::Quit => ("\\q", "Quit"),
        }
    }
}

/// Commands available inside the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { column: String, value: String },
    Pick { column: String, index: usize },
    Check { column: String, checked: bool },
    Show,
    Submit,
    Related { column: String },
    Cancel,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("'\\{0}' is not a valid command, try \\?")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or_default();
        let name = CommandName::from_str(name).map_err(|_| CommandError::Unknown(s.to_string()))?;
        let usage = CommandError::Usage(name.usage().0);

        let column = words.next().map(str::to_string);
        let rest = words.collect::<Vec<_>>().join(" ");

        Ok(match (name, column) {
            (CommandName::Set, Some(column)) => Command::Set {
                column,
                value: rest,
            },
            (CommandName::Pick, Some(column)) => Command::Pick {
                column,
                index: rest.parse().map_err(|_| usage)?,
            },
            (CommandName::Check, Some(column)) => Command::Check {
                column,
                checked: match rest.as_str() {
                    "on" | "yes" | "1" => true,
                    "off" | "no" | "0" => false,
                    _ => return Err(usage),
                },
            },
            (CommandName::Related, Some(column)) => Command::Related { column },
            (CommandName::Show, None) => Command::Show,
            (CommandName::Submit, None) => Command::Submit,
            (CommandName::Cancel, None) => Command::Cancel,
            (CommandName::Help, None) => Command::Help,
            (CommandName::Quit, None) => Command::Quit,
            _ => return Err(usage),
        })
    }
}

pub fn all_commands_info() -> String {
    CommandName::iter()
        .map(|name| {
            let (usage, description) = name.usage();
            format!("{usage:<28}{description}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
