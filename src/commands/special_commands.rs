//! Special commands parser for interactive chat
//!
//! Lines starting with `/` are handled by the REPL instead of being sent to
//! the model. Commands are case-insensitive.

use thiserror::Error;

use crate::export::ExportFormat;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Commands handled by the chat loop itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Leave the chat
    Exit,
    /// Show available commands
    Help,
    /// Produce a new answer for the last reply
    Regenerate,
    /// Show documents attached to the session
    Documents,
    /// Export the session, optionally into a directory
    Export {
        format: ExportFormat,
        dir: Option<String>,
    },
    /// Bookmark the last reply
    Bookmark,
    /// Start a fresh session
    New,
    /// Not a special command; send to the model
    None,
}

/// Parses a line of chat input
///
/// # Examples
///
/// ```
/// use teachmate::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/EXIT").unwrap(), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    match command.as_str() {
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/regen" | "/regenerate" => Ok(SpecialCommand::Regenerate),
        "/docs" => Ok(SpecialCommand::Documents),
        "/bookmark" => Ok(SpecialCommand::Bookmark),
        "/new" => Ok(SpecialCommand::New),
        "/export" => {
            let format = match args.first() {
                None => ExportFormat::Markdown,
                Some(arg) => arg.parse().map_err(|_| CommandError::UnsupportedArgument {
                    command: "/export".to_string(),
                    arg: arg.to_string(),
                })?,
            };
            Ok(SpecialCommand::Export {
                format,
                dir: args.get(1).map(|d| d.to_string()),
            })
        }
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

const HELP_ENTRIES: &[(&str, &str)] = &[
    ("/exit", "Leave the chat"),
    ("/regen", "Regenerate the last answer"),
    ("/docs", "Show attached reference documents"),
    (
        "/export [FMT] [DIR]",
        "Export this conversation (markdown, word, pdf)",
    ),
    ("/bookmark", "Bookmark the last answer"),
    ("/new", "Start a new conversation"),
    ("/help", "Show this help"),
];

/// Prints the chat command reference
pub fn print_help() {
    use colored::Colorize;

    println!("\n{}", "Chat commands".bold());
    for (command, description) in HELP_ENTRIES {
        println!("  {} {}", format!("{:<20}", command).cyan(), description);
    }
    println!();
}
