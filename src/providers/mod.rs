//! Provider module for Teachmate
//!
//! This module contains the generation provider abstraction and the
//! Gemini REST implementation.

pub mod base;
pub mod gemini;

pub use base::{Provider, Speaker, Turn};
pub use gemini::GeminiProvider;

#[cfg(test)]
pub use base::MockProvider;

use crate::config::ProviderConfig;
use std::sync::Arc;

/// Create the provider described by the configuration
///
/// # Examples
///
/// ```
/// use teachmate::config::ProviderConfig;
/// use teachmate::providers::create_provider;
///
/// let provider = create_provider(&ProviderConfig::default());
/// provider.invalidate();
/// ```
pub fn create_provider(config: &ProviderConfig) -> Arc<dyn Provider> {
    Arc::new(GeminiProvider::new(config.clone()))
}
