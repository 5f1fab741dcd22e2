//! Gemini `generateContent` client for the translation port.

use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

use super::{TranslateError, Translator};
use crate::config::{get_translate_http_timeout_secs, GEMINI_MODEL};
use crate::utils::truncate_str;
use async_trait::async_trait;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Translator backed by the Gemini API.
///
/// Constructed once at startup; holds no mutable state, so it is shared
/// freely across concurrent handlers.
pub struct GeminiTranslator {
    api_key: Option<String>,
    model: String,
    client: HttpClient,
}

impl GeminiTranslator {
    /// Build a client with the configured request timeout.
    ///
    /// A missing API key is allowed here; each call then degrades to
    /// [`TranslateError::MissingConfig`].
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        let timeout = Duration::from_secs(get_translate_http_timeout_secs());
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| HttpClient::new());
        Self {
            api_key,
            model: GEMINI_MODEL.to_string(),
            client,
        }
    }

    fn build_prompt(text: &str, source: Option<&str>, target: &str) -> String {
        match source {
            Some(source) => format!(
                "Translate the following text from {source} into {target}. \
                 Provide only the translated text, without any additional \
                 explanations or context. Text to translate: {text}"
            ),
            None => format!(
                "Translate the following text into {target}. Provide only \
                 the translated text, without any additional explanations \
                 or context. Text to translate: {text}"
            ),
        }
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<String, TranslateError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("GEMINI_API_KEY is not set; refusing translation request");
            return Err(TranslateError::MissingConfig);
        };

        let url = format!(
            "{API_BASE}/{model}:generateContent?key={api_key}",
            model = self.model
        );
        let prompt = Self::build_prompt(text, source, target);
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = truncate_str(response.text().await.unwrap_or_default(), 500);
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(TranslateError::QuotaExceeded(detail));
            }
            return Err(TranslateError::ApiError(format!("{status} - {detail}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;

        let translated = extract_candidate_text(&payload)?;
        debug!(
            "translated {:?} -> {:?}",
            truncate_str(text, 80),
            truncate_str(&translated, 80)
        );
        Ok(translated)
    }
}

/// Pull the translated text out of a `generateContent` response.
///
/// Path: `candidates[0].content.parts[0].text`, trimmed.
fn extract_candidate_text(payload: &Value) -> Result<String, TranslateError> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| {
            TranslateError::MalformedResponse(format!(
                "missing candidate text in {}",
                truncate_str(payload.to_string(), 200)
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_languages() {
        let prompt = GeminiTranslator::build_prompt("hello", None, "Amharic");
        assert!(prompt.contains("into Amharic"));
        assert!(prompt.ends_with("hello"));

        let prompt = GeminiTranslator::build_prompt("hello", Some("English"), "French");
        assert!(prompt.contains("from English into French"));
    }

    #[test]
    fn test_extract_candidate_text() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  Bonjour  " }] }
            }]
        });
        let text = extract_candidate_text(&payload).expect("valid payload");
        assert_eq!(text, "Bonjour");
    }

    #[test]
    fn test_extract_rejects_empty_payload() {
        let payload = json!({ "candidates": [] });
        assert!(matches!(
            extract_candidate_text(&payload),
            Err(TranslateError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_degrades() {
        let translator = GeminiTranslator::new(None);
        let result = translator.translate("hi", None, "French").await;
        assert!(matches!(result, Err(TranslateError::MissingConfig)));
    }
}
