//! Command-line interface definition for Teachmate
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportFormat;

/// Teachmate - teaching assistant for Vietnamese teachers
///
/// Chat with a hosted language model about lesson plans, tests and class
/// management, keep conversations organised, attach reference documents and
/// export answers.
#[derive(Parser, Debug, Clone)]
#[command(name = "teachmate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Location of the chat store (overrides config and TEACHMATE_STORE)
    #[arg(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Teachmate
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Continue an existing session (id or unique prefix)
        #[arg(short, long)]
        session: Option<String>,

        /// Preferred model for this and later requests
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        prompt: String,

        /// Ask inside an existing session (id or unique prefix)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Manage the API key
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Manage the model preference
    Models {
        #[command(subcommand)]
        command: ModelCommand,
    },

    /// Manage saved conversations
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Manage conversation folders
    Folders {
        #[command(subcommand)]
        command: FolderCommand,
    },

    /// Manage bookmarked messages
    Bookmarks {
        #[command(subcommand)]
        command: BookmarkCommand,
    },

    /// Manage reference documents
    Docs {
        #[command(subcommand)]
        command: DocsCommand,
    },

    /// Export a conversation to a file
    Export {
        /// Session id or unique prefix
        session: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: ExportFormat,

        /// Directory to write into (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change preferences
    Settings {
        /// Reply language code (vi, en, ja, ko, zh, fr)
        #[arg(long)]
        language: Option<String>,

        /// Dark terminal palette
        #[arg(long)]
        dark_mode: Option<bool>,

        /// Teacher name
        #[arg(long)]
        profile_name: Option<String>,

        /// Subject taught
        #[arg(long)]
        profile_subject: Option<String>,

        /// School level
        #[arg(long)]
        profile_level: Option<String>,

        /// School name
        #[arg(long)]
        profile_school: Option<String>,
    },

    /// Show usage statistics
    Stats,
}

/// API key subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Store the API key (prompts when --key is omitted)
    Set {
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Remove the stored API key
    Clear,
    /// Show whether a key is configured
    Status,
}

/// Model preference subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommand {
    /// List configured models in fallback order
    List,
    /// Show the preferred model
    Current,
    /// Set the preferred model
    Set {
        /// Model identifier
        model: String,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List conversations, pinned first
    List {
        /// Only titles containing this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only conversations in this folder
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Print a conversation
    Show {
        /// Session id or unique prefix
        id: String,
    },
    /// Delete a conversation
    Delete {
        /// Session id or unique prefix
        id: String,
    },
    /// Rename a conversation
    Rename {
        /// Session id or unique prefix
        id: String,
        /// New title
        title: String,
    },
    /// Pin or unpin a conversation
    Pin {
        /// Session id or unique prefix
        id: String,
    },
    /// Move a conversation to a folder; omit the name to unfile it
    Folder {
        /// Session id or unique prefix
        id: String,
        /// Folder name
        name: Option<String>,
    },
    /// Replace a conversation's tags
    Tags {
        /// Session id or unique prefix
        id: String,
        /// Tags to set
        tags: Vec<String>,
    },
}

/// Folder subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FolderCommand {
    /// List folders
    List,
    /// Add a folder
    Add { name: String },
    /// Delete a folder and unfile its conversations
    Delete { name: String },
}

/// Bookmark subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum BookmarkCommand {
    /// List bookmarks, newest first
    List,
    /// Bookmark a message
    Add {
        /// Session id or unique prefix
        session: String,
        /// Message id or unique prefix
        message: String,
    },
    /// Remove a bookmark
    Remove {
        /// Message id or unique prefix
        message: String,
    },
}

/// Reference document subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DocsCommand {
    /// Extract and store documents (PDF, DOCX, TXT, MD)
    Add {
        /// Files to add
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Tag to attach (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Folder to file the documents under
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// List stored documents
    List,
    /// Print a document's stored text
    Show {
        /// Document id or unique prefix
        id: String,
    },
    /// Delete a document
    Remove {
        /// Document id or unique prefix
        id: String,
    },
    /// Choose the documents used as context in a conversation
    Select {
        /// Session id or unique prefix
        session: String,
        /// Document ids or prefixes; none clears the selection
        ids: Vec<String>,
    },
    /// Replace a document's tags
    Tag {
        /// Document id or unique prefix
        id: String,
        /// Tags to set
        tags: Vec<String>,
    },
    /// Move a document to another folder
    Move {
        /// Document id or unique prefix
        id: String,
        /// Folder name
        folder: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: Commands::Stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.storage_path.is_none());
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["teachmate", "chat"]).unwrap();
        if let Commands::Chat { session, model } = cli.command {
            assert!(session.is_none());
            assert!(model.is_none());
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_chat_with_session_and_model() {
        let cli = Cli::try_parse_from([
            "teachmate",
            "chat",
            "--session",
            "abcd1234",
            "-m",
            "gemini-2.5-flash",
        ])
        .unwrap();
        if let Commands::Chat { session, model } = cli.command {
            assert_eq!(session.as_deref(), Some("abcd1234"));
            assert_eq!(model.as_deref(), Some("gemini-2.5-flash"));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::try_parse_from(["teachmate", "ask", "Soạn giáo án"]).unwrap();
        if let Commands::Ask { prompt, session } = cli.command {
            assert_eq!(prompt, "Soạn giáo án");
            assert!(session.is_none());
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_auth_set_with_key() {
        let cli = Cli::try_parse_from(["teachmate", "auth", "set", "--key", "AIza"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Auth {
                command: AuthCommand::Set { key: Some(ref k) }
            } if k == "AIza"
        ));
    }

    #[test]
    fn test_cli_parse_models_set() {
        let cli =
            Cli::try_parse_from(["teachmate", "models", "set", "gemini-3-pro-preview"]).unwrap();
        if let Commands::Models {
            command: ModelCommand::Set { model },
        } = cli.command
        {
            assert_eq!(model, "gemini-3-pro-preview");
        } else {
            panic!("Expected Models Set command");
        }
    }

    #[test]
    fn test_cli_parse_history_list_filters() {
        let cli = Cli::try_parse_from([
            "teachmate", "history", "list", "--search", "toán", "--folder", "Lớp 6",
        ])
        .unwrap();
        if let Commands::History {
            command: HistoryCommand::List { search, folder },
        } = cli.command
        {
            assert_eq!(search.as_deref(), Some("toán"));
            assert_eq!(folder.as_deref(), Some("Lớp 6"));
        } else {
            panic!("Expected History List command");
        }
    }

    #[test]
    fn test_cli_parse_history_folder_without_name() {
        let cli = Cli::try_parse_from(["teachmate", "history", "folder", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History {
                command: HistoryCommand::Folder { name: None, .. }
            }
        ));
    }

    #[test]
    fn test_cli_parse_docs_add_requires_files() {
        assert!(Cli::try_parse_from(["teachmate", "docs", "add"]).is_err());

        let cli = Cli::try_parse_from([
            "teachmate", "docs", "add", "a.pdf", "b.docx", "-t", "Toán", "-t", "Lớp 6",
        ])
        .unwrap();
        if let Commands::Docs {
            command: DocsCommand::Add { files, tag, folder },
        } = cli.command
        {
            assert_eq!(files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.docx")]);
            assert_eq!(tag, vec!["Toán", "Lớp 6"]);
            assert!(folder.is_none());
        } else {
            panic!("Expected Docs Add command");
        }
    }

    #[test]
    fn test_cli_parse_export_format() {
        let cli = Cli::try_parse_from(["teachmate", "export", "abc", "--format", "word"]).unwrap();
        if let Commands::Export {
            session,
            format,
            output,
        } = cli.command
        {
            assert_eq!(session, "abc");
            assert_eq!(format, ExportFormat::Word);
            assert!(output.is_none());
        } else {
            panic!("Expected Export command");
        }

        assert!(Cli::try_parse_from(["teachmate", "export", "abc", "--format", "odt"]).is_err());
    }

    #[test]
    fn test_cli_parse_settings() {
        let cli = Cli::try_parse_from([
            "teachmate",
            "settings",
            "--language",
            "en",
            "--dark-mode",
            "true",
        ])
        .unwrap();
        if let Commands::Settings {
            language,
            dark_mode,
            profile_name,
            ..
        } = cli.command
        {
            assert_eq!(language.as_deref(), Some("en"));
            assert_eq!(dark_mode, Some(true));
            assert!(profile_name.is_none());
        } else {
            panic!("Expected Settings command");
        }
    }

    #[test]
    fn test_cli_parse_storage_path_after_subcommand() {
        let cli =
            Cli::try_parse_from(["teachmate", "stats", "--storage-path", "/tmp/store"]).unwrap();
        assert_eq!(cli.storage_path, Some(PathBuf::from("/tmp/store")));
    }

    #[test]
    fn test_cli_parse_missing_command() {
        assert!(Cli::try_parse_from(["teachmate"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_verbose() {
        let cli = Cli::try_parse_from(["teachmate", "-v", "stats"]).unwrap();
        assert!(cli.verbose);
    }
}
