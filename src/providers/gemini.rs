//! Gemini provider implementation for Teachmate
//!
//! This module implements the Provider trait against the Gemini
//! `generateContent` REST endpoint. The HTTP client carries the API key as a
//! default header, so it is cached per credential and rebuilt on
//! [`Provider::invalidate`] or when a different key shows up.

use crate::config::ProviderConfig;
use crate::error::{Result, TeachmateError};
use crate::providers::{Provider, Turn};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST API provider
///
/// # Examples
///
/// ```no_run
/// use teachmate::config::ProviderConfig;
/// use teachmate::providers::{GeminiProvider, Provider, Turn};
///
/// # async fn example() -> teachmate::error::Result<()> {
/// let provider = GeminiProvider::new(ProviderConfig::default());
/// let reply = provider
///     .generate("my-key", "gemini-2.5-flash", &[Turn::user("Hi")], "Hello!", 4096)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    api_base: String,
    timeout: Duration,
    client: RwLock<Option<CachedClient>>,
}

struct CachedClient {
    api_key: String,
    client: Client,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Error envelope returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// No HTTP client is built until the first request.
    ///
    /// # Examples
    ///
    /// ```
    /// use teachmate::config::ProviderConfig;
    /// use teachmate::providers::GeminiProvider;
    ///
    /// let provider = GeminiProvider::new(ProviderConfig::default());
    /// assert_eq!(provider.api_base(), "https://generativelanguage.googleapis.com");
    /// ```
    pub fn new(config: ProviderConfig) -> Self {
        tracing::info!("Initialized Gemini provider: api_base={}", config.api_base);
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
            client: RwLock::new(None),
        }
    }

    /// Base URL requests are sent to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    /// Returns a client bound to `api_key`, building one if needed
    fn client_for(&self, api_key: &str) -> Result<Client> {
        if let Ok(guard) = self.client.read() {
            if let Some(cached) = guard.as_ref() {
                if cached.api_key == api_key {
                    return Ok(cached.client.clone());
                }
            }
        }

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(api_key)
            .map_err(|_| TeachmateError::Provider("API key contains invalid characters".into()))?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("teachmate/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| TeachmateError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Built new Gemini HTTP client");
        if let Ok(mut guard) = self.client.write() {
            *guard = Some(CachedClient {
                api_key: api_key.to_string(),
                client: client.clone(),
            });
        }
        Ok(client)
    }

    fn build_request<'a>(
        history: &'a [Turn],
        message: &'a str,
        max_output_tokens: u32,
    ) -> GenerateContentRequest<'a> {
        let mut contents: Vec<GeminiContent<'a>> = history
            .iter()
            .map(|turn| GeminiContent {
                role: turn.speaker.as_str(),
                parts: vec![GeminiPart { text: &turn.text }],
            })
            .collect();
        contents.push(GeminiContent {
            role: "user",
            parts: vec![GeminiPart { text: message }],
        });

        GenerateContentRequest {
            contents,
            generation_config: GenerationConfig { max_output_tokens },
        }
    }

    fn extract_text(response: GenerateContentResponse) -> String {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        history: &[Turn],
        message: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        let client = self.client_for(api_key)?;
        let body = Self::build_request(history, message, max_output_tokens);
        let url = self.endpoint(model);

        tracing::debug!(
            model,
            turns = history.len(),
            "Sending generateContent request"
        );

        let response = client.post(&url).json(&body).send().await.map_err(|e| {
            tracing::warn!("Gemini request to {} failed: {}", model, e);
            TeachmateError::Provider(format!("Failed to reach generation API: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .map(|env| env.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(error_text);
            tracing::error!("Gemini returned error {}: {}", status, detail);
            return Err(TeachmateError::Provider(format!(
                "Generation API returned {}: {}",
                status, detail
            ))
            .into());
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            TeachmateError::Provider(format!("Failed to parse generation response: {}", e))
        })?;

        Ok(Self::extract_text(parsed))
    }

    fn invalidate(&self) {
        if let Ok(mut guard) = self.client.write() {
            if guard.take().is_some() {
                tracing::debug!("Dropped cached Gemini HTTP client");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(ProviderConfig {
            api_base: "http://localhost:9999/".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        assert_eq!(provider().api_base(), "http://localhost:9999");
    }

    #[test]
    fn test_endpoint_includes_model() {
        assert_eq!(
            provider().endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_appends_message_after_history() {
        let history = vec![Turn::user("system"), Turn::model("ok")];
        let request = GeminiProvider::build_request(&history, "question", 256);
        let json = serde_json::to_value(&request).unwrap();

        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "question");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Xin " }, { "text": "chào" }] }
            }]
        }))
        .unwrap();
        assert_eq!(GeminiProvider::extract_text(response), "Xin chào");
    }

    #[test]
    fn test_extract_text_without_candidates_is_empty() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "promptFeedback": {} })).unwrap();
        assert_eq!(GeminiProvider::extract_text(response), "");
    }

    #[test]
    fn test_client_cache_rebuilds_after_invalidate() {
        let provider = provider();
        provider.client_for("key-1").unwrap();
        assert!(provider.client.read().unwrap().is_some());

        provider.invalidate();
        assert!(provider.client.read().unwrap().is_none());
    }

    #[test]
    fn test_client_cache_follows_key_change() {
        let provider = provider();
        provider.client_for("key-1").unwrap();
        provider.client_for("key-2").unwrap();
        let guard = provider.client.read().unwrap();
        assert_eq!(guard.as_ref().unwrap().api_key, "key-2");
    }

    #[test]
    fn test_invalid_key_characters_rejected() {
        let result = provider().client_for("bad\nkey");
        assert!(result.is_err());
    }
}
