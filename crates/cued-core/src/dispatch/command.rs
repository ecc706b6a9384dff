//! Bot command parsing.

use cued_types::flow::FlowKind;

use crate::flow::definition::definition_for_command;

/// A recognized `/command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    StartFlow(FlowKind),
    Cancel,
    Status,
    /// Any other `/word`; carries the word without the slash.
    Unknown(String),
}

/// Parse `text` as a command.
///
/// Returns `None` for ordinary text. A `@botname` suffix and any arguments
/// after the command word are ignored: `/apply@cued_bot now` is `/apply`.
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.trim_start().strip_prefix('/')?.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    if name.is_empty() {
        return None;
    }

    let command = match name.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "cancel" => Command::Cancel,
        "status" => Command::Status,
        other => match definition_for_command(other) {
            Some(def) => Command::StartFlow(def.kind),
            None => Command::Unknown(other.to_string()),
        },
    };
    Some(command)
}
