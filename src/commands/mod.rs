/*!
Command handlers for the CLI

Each submodule handles one top-level command. Handlers share an
[`AppContext`] holding the configuration, the chat store and the credential
store.
*/

use std::sync::Arc;

use colored::Colorize;

use crate::assistant::Assistant;
use crate::config::Config;
use crate::credentials::{CredentialStore, KeyringCredentialStore};
use crate::error::{Result, TeachmateError};
use crate::providers::create_provider;
use crate::storage::{ChatMessage, ChatStore, Role};

pub mod auth;
pub mod bookmarks;
pub mod chat;
pub mod docs;
pub mod export;
pub mod folders;
pub mod history;
pub mod models;
pub mod settings;
pub mod special_commands;
pub mod stats;

/// Shared state for command handlers
pub struct AppContext {
    pub config: Config,
    pub store: Arc<ChatStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppContext {
    /// Opens the configured store and the keyring credential store
    pub fn open(config: Config) -> Result<Self> {
        let store = Arc::new(ChatStore::open_configured(&config.storage)?);
        Ok(Self {
            config,
            store,
            credentials: Arc::new(KeyringCredentialStore::new()),
        })
    }

    /// Context over explicit parts
    pub fn with_parts(
        config: Config,
        store: Arc<ChatStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            store,
            credentials,
        }
    }

    /// Assistant backed by the configured provider
    pub fn assistant(&self) -> Assistant {
        Assistant::new(
            self.config.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.credentials),
            create_provider(&self.config.provider),
        )
    }
}

/// First eight characters of an id
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Shortens a title for table display
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let head: String = title.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", head)
}

/// Finds a message by id or unique id prefix
pub fn resolve_message<'a>(messages: &'a [ChatMessage], prefix: &str) -> Result<&'a ChatMessage> {
    if let Some(exact) = messages.iter().find(|m| m.id == prefix) {
        return Ok(exact);
    }
    let matches: Vec<&ChatMessage> = messages
        .iter()
        .filter(|m| m.id.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only),
        [] => Err(TeachmateError::NotFound(format!("message {}", prefix)).into()),
        _ => Err(TeachmateError::Storage(format!(
            "Message prefix {} is ambiguous ({} matches)",
            prefix,
            matches.len()
        ))
        .into()),
    }
}

/// Prints one message with its speaker heading
pub fn print_message(message: &ChatMessage) {
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%d/%m %H:%M");
    let heading = match message.role {
        Role::User => format!("👤 Bạn ({})", time).cyan().bold(),
        Role::Model => format!("🤖 Trợ lý GV ({})", time).green().bold(),
    };
    let versions = if message.versions.is_empty() {
        String::new()
    } else {
        format!(" [{} earlier versions]", message.versions.len())
    };
    println!(
        "{} {}{}",
        heading,
        short_id(&message.id).dimmed(),
        versions.dimmed()
    );
    println!("{}\n", message.text);
}
