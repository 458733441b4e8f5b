//! Teachmate - teaching assistant library
//!
//! This library provides the core functionality for Teachmate, a command-line
//! assistant for Vietnamese teachers built on a hosted generation API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `dispatcher`: Sequential model fallback over a preferred model and a fixed model list
//! - `providers`: Generation API abstraction and the Gemini-style HTTP client
//! - `credentials`: API key persistence in the OS keyring
//! - `assistant`: Question answering over stored sessions, titles and topic tags
//! - `prompts`: System prompt, reference document context and recommended tools
//! - `storage`: Sessions, messages, bookmarks, folders, documents and preferences
//! - `ingest`: Text extraction from PDF, DOCX, TXT and Markdown files
//! - `export`: Markdown, Word and printable HTML renderers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use teachmate::{ChatStore, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = ChatStore::open_configured(&config.storage)?;
//!     for session in store.sessions()? {
//!         println!("{}", session.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod ingest;
pub mod prompts;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use assistant::Assistant;
pub use config::Config;
pub use dispatcher::{DispatchSettings, Dispatcher};
pub use error::{Result, TeachmateError};
pub use storage::ChatStore;

#[cfg(test)]
pub mod test_utils;
