//! Line-oriented interaction scripts replayed against a grid.

use std::time::Duration;

use shared::domain::{FilterPredicate, ItemId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Filter(FilterPredicate),
    Button(usize),
    Search(String),
    Wait(Duration),
    Toggle(ItemId),
    Resize,
    More,
    Show,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: `{command}` expects {expected}")]
    BadArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Command>, ScriptError> {
    let trimmed = line.trim_start();
    if trimmed.trim_end().is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (trimmed.trim_end(), ""),
    };

    let command = match word {
        "filter" => Command::Filter(FilterPredicate::from_filter_attr(rest)),
        "button" => Command::Button(rest.trim().parse().map_err(|_| ScriptError::BadArgument {
            line: line_no,
            command: "button",
            expected: "a button index",
        })?),
        // Keep inner spacing: the search box sees exactly what was typed.
        "search" => Command::Search(rest.trim_end_matches(['\r', '\n']).to_string()),
        "wait" => {
            let millis = rest.trim().parse().map_err(|_| ScriptError::BadArgument {
                line: line_no,
                command: "wait",
                expected: "milliseconds",
            })?;
            Command::Wait(Duration::from_millis(millis))
        }
        "toggle" => Command::Toggle(ItemId(rest.trim().parse().map_err(|_| {
            ScriptError::BadArgument {
                line: line_no,
                command: "toggle",
                expected: "an item id",
            }
        })?)),
        "resize" => Command::Resize,
        "more" => Command::More,
        "show" => Command::Show,
        other => {
            return Err(ScriptError::UnknownCommand {
                line: line_no,
                command: other.to_string(),
            })
        }
    };
    Ok(Some(command))
}

pub fn parse_script(source: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if let Some(command) = parse_line(index + 1, line)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
