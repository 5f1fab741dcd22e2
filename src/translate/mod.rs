//! Translation port.
//!
//! The router only knows this trait; the concrete Gemini client lives
//! in [`gemini`]. Every failure maps to a short user-presentable
//! message, so a broken upstream becomes a normal reply instead of a
//! processing error.

use async_trait::async_trait;
use thiserror::Error;

/// Gemini-backed implementation of [`Translator`]
pub mod gemini;

/// Classified translation failure
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Provider credential is absent
    #[error("translation provider is not configured")]
    MissingConfig,
    /// Provider rejected the request for quota reasons
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Provider returned a non-success status
    #[error("API error: {0}")]
    ApiError(String),
    /// The HTTP call itself failed or timed out
    #[error("network error: {0}")]
    NetworkError(String),
    /// Response arrived but did not contain a translation
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl TranslateError {
    /// Short apology suitable for sending to the user verbatim.
    ///
    /// Details stay in the logs; none of these strings leak upstream
    /// payloads or credentials.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingConfig => "Translation service is not configured.",
            Self::QuotaExceeded(_) => {
                "The translation service is over its quota right now. Please try again later."
            }
            Self::ApiError(_) | Self::NetworkError(_) => {
                "Translation failed due to a service error. Please try again."
            }
            Self::MalformedResponse(_) => "Translation failed: could not parse the response.",
        }
    }
}

/// Abstract capability of translating text between languages.
///
/// `source` and `target` are human-readable language names; a `None`
/// source asks the provider to detect the language itself.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslateError`] classifying the failure; callers
    /// turn it into a user-facing reply via
    /// [`TranslateError::user_message`].
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<String, TranslateError>;
}
