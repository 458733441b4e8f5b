//! Test utilities for Teachmate
//!
//! Shared fixtures for unit tests: temporary files, an in-memory command
//! context, and error assertions.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::commands::AppContext;
use crate::config::Config;
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::error::Result;
use crate::storage::{ChatMessage, ChatSession, ChatStore};

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Command context over a temporary store and an empty credential store
pub fn test_context() -> AppContext {
    AppContext::with_parts(
        Config::default(),
        Arc::new(ChatStore::temporary().expect("Failed to open temporary store")),
        Arc::new(MemoryCredentialStore::new()),
    )
}

/// Credential store whose backend is unreachable
pub struct UnavailableCredentialStore;

impl UnavailableCredentialStore {
    fn failure() -> keyring::Error {
        keyring::Error::PlatformFailure("no secret service provider found".into())
    }
}

impl CredentialStore for UnavailableCredentialStore {
    fn api_key(&self) -> Result<Option<String>> {
        Err(Self::failure().into())
    }

    fn set_api_key(&self, _key: &str) -> Result<()> {
        Err(Self::failure().into())
    }

    fn clear_api_key(&self) -> Result<()> {
        Err(Self::failure().into())
    }
}

/// Creates a session holding `messages`
pub fn seeded_session(store: &ChatStore, messages: &[ChatMessage]) -> ChatSession {
    let session = store.create_session().expect("Failed to create session");
    store
        .save_messages(&session.id, messages)
        .expect("Failed to save messages");
    session
}

/// A configuration YAML string exercising every section
pub fn test_config_yaml() -> String {
    r#"
provider:
  api_base: http://localhost:9999
  models:
    - gemini-3-flash-preview
    - gemini-2.5-flash
  max_output_tokens: 2048
  timeout_seconds: 30

documents:
  chunk_size: 4000
  per_document_chars: 2000
  max_stored_chars: 50000

assistant:
  default_language: en
  profile:
    name: Thầy Minh
    subject: Vật lý
    school_level: THPT
    school_name: THPT Lê Quý Đôn
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TeachmateError;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: anyhow::Result<()> =
            Err(TeachmateError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_seeded_session() {
        let ctx = test_context();
        let session = seeded_session(&ctx.store, &[ChatMessage::user("a")]);
        assert_eq!(ctx.store.messages(&session.id).unwrap().len(), 1);
    }
}
