//! Base provider trait and common types for Teachmate
//!
//! This module defines the Provider trait that generation backends implement,
//! along with the conversation turn types sent over the API boundary.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who produced a turn
///
/// The hosted API only distinguishes the human side from the model side;
/// system instructions travel as a leading user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person chatting
    User,
    /// The generation model
    Model,
}

impl Speaker {
    /// Wire name of the speaker
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who said it
    pub speaker: Speaker,
    /// What was said
    pub text: String,
}

impl Turn {
    /// Creates a user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use teachmate::providers::{Speaker, Turn};
    ///
    /// let turn = Turn::user("Xin chào");
    /// assert_eq!(turn.speaker, Speaker::User);
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    /// Creates a model turn
    ///
    /// # Examples
    ///
    /// ```
    /// use teachmate::providers::{Speaker, Turn};
    ///
    /// let turn = Turn::model("Chào thầy cô!");
    /// assert_eq!(turn.speaker, Speaker::Model);
    /// ```
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Model,
            text: text.into(),
        }
    }
}

/// Provider trait for hosted generation backends
///
/// A provider performs exactly one request per call. Choosing which model to
/// try next is the dispatcher's job, not the provider's.
///
/// # Examples
///
/// ```no_run
/// use teachmate::providers::{Provider, Turn};
/// use teachmate::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn generate(
///         &self,
///         _api_key: &str,
///         _model: &str,
///         _history: &[Turn],
///         message: &str,
///         _max_output_tokens: u32,
///     ) -> Result<String> {
///         Ok(message.to_string())
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Sends `history` plus `message` to `model` and returns the reply text
    ///
    /// # Arguments
    ///
    /// * `api_key` - Credential for the hosted API
    /// * `model` - Model identifier to address
    /// * `history` - Prior turns, oldest first
    /// * `message` - The new user message
    /// * `max_output_tokens` - Output length cap
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    /// An empty reply is returned as `Ok("")`; callers decide what that means.
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        history: &[Turn],
        message: &str,
        max_output_tokens: u32,
    ) -> Result<String>;

    /// Drops any client state derived from a previous credential
    ///
    /// The default implementation does nothing.
    fn invalidate(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_wire_names() {
        assert_eq!(Speaker::User.as_str(), "user");
        assert_eq!(Speaker::Model.to_string(), "model");
    }

    #[test]
    fn test_turn_serializes_lowercase_speaker() {
        let json = serde_json::to_value(Turn::model("ok")).unwrap();
        assert_eq!(json["speaker"], "model");
        assert_eq!(json["text"], "ok");
    }

    #[test]
    fn test_turn_constructors() {
        assert_eq!(Turn::user("a").speaker, Speaker::User);
        assert_eq!(Turn::model("b").text, "b");
    }
}
