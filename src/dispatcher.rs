//! Generation request dispatcher
//!
//! Walks an ordered chain of model candidates, one request at a time, until a
//! model returns non-empty text. The chain is the preferred model followed by
//! the rest of the configured universe in its fixed order.
//!
//! Attempts are strictly sequential: an earlier candidate that is slow but
//! eventually succeeds always wins over a later one.

use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::{Result, TeachmateError};
use crate::providers::{Provider, Turn};

/// Everything a dispatch needs that is not conversation content
///
/// Built fresh for each call so that credential or preference changes are
/// picked up without any cached global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Credential for the hosted API; `None` fails before any request
    pub api_key: Option<String>,
    /// Model tried first
    pub preferred_model: String,
    /// Known models in fallback order
    pub models: Vec<String>,
    /// Output length cap for every request
    pub max_output_tokens: u32,
}

impl DispatchSettings {
    /// Builds settings from provider configuration
    ///
    /// Falls back to the first configured model when no preference is given.
    ///
    /// # Examples
    ///
    /// ```
    /// use teachmate::config::ProviderConfig;
    /// use teachmate::dispatcher::DispatchSettings;
    ///
    /// let settings = DispatchSettings::from_config(&ProviderConfig::default(), None, None);
    /// assert_eq!(settings.preferred_model, "gemini-3-flash-preview");
    /// assert!(settings.api_key.is_none());
    /// ```
    pub fn from_config(
        config: &ProviderConfig,
        api_key: Option<String>,
        preferred_model: Option<String>,
    ) -> Self {
        Self {
            api_key,
            preferred_model: preferred_model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| config.default_model().to_string()),
            models: config.models.clone(),
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Ordered candidate list for these settings
    pub fn candidates(&self) -> Vec<String> {
        candidate_models(&self.preferred_model, &self.models)
    }
}

/// Builds the fallback chain: `preferred` first, then the universe in order
///
/// Duplicates are dropped. A preferred model that is not part of the universe
/// is still tried first. An empty preference yields the universe as is.
///
/// # Examples
///
/// ```
/// use teachmate::dispatcher::candidate_models;
///
/// let universe = vec!["A".to_string(), "B".to_string(), "C".to_string()];
/// assert_eq!(candidate_models("B", &universe), vec!["B", "A", "C"]);
/// assert_eq!(candidate_models("Z", &universe[..2]), vec!["Z", "A", "B"]);
/// ```
pub fn candidate_models(preferred: &str, universe: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(universe.len() + 1);
    if !preferred.is_empty() {
        candidates.push(preferred.to_string());
    }
    for model in universe {
        if !candidates.iter().any(|c| c == model) {
            candidates.push(model.clone());
        }
    }
    candidates
}

/// Successful dispatch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Generated text (never empty)
    pub text: String,
    /// Candidate that produced it
    pub model: String,
    /// Number of requests made, including the successful one
    pub attempts: usize,
}

/// Sequential fallback dispatcher over a [`Provider`]
pub struct Dispatcher {
    provider: Arc<dyn Provider>,
}

impl Dispatcher {
    /// Creates a dispatcher around `provider`
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Drops provider state derived from an old credential
    ///
    /// Call after the API key changes.
    pub fn invalidate(&self) {
        self.provider.invalidate();
    }

    /// Obtains a reply for `message` given `history`
    ///
    /// # Errors
    ///
    /// * [`TeachmateError::CredentialMissing`] when `settings.api_key` is
    ///   unset or blank; no request is made.
    /// * [`TeachmateError::AllCandidatesExhausted`] when every candidate
    ///   failed or returned empty text; carries the last failure message.
    pub async fn dispatch(
        &self,
        settings: &DispatchSettings,
        history: &[Turn],
        message: &str,
    ) -> Result<Reply> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(TeachmateError::CredentialMissing)?;

        let candidates = settings.candidates();
        let mut last_failure = String::from("no model candidates configured");

        for (index, model) in candidates.iter().enumerate() {
            let attempt = index + 1;
            tracing::info!(model = %model, attempt, "Trying model");

            match self
                .provider
                .generate(
                    api_key,
                    model,
                    history,
                    message,
                    settings.max_output_tokens,
                )
                .await
            {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!(model = %model, attempt, "Model succeeded");
                    return Ok(Reply {
                        text,
                        model: model.clone(),
                        attempts: attempt,
                    });
                }
                Ok(_) => {
                    tracing::warn!(model = %model, "Model returned an empty response");
                    last_failure = format!("model {} returned an empty response", model);
                }
                Err(e) => {
                    tracing::warn!(model = %model, error = %e, "Model failed");
                    last_failure = e.to_string();
                }
            }
        }

        Err(TeachmateError::AllCandidatesExhausted(last_failure).into())
    }
}
