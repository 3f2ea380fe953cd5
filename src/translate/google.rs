//! Google Cloud Translation (v2 REST API).

use crate::error::FetchError;
use crate::translate::http::join_query;
use crate::translate::{ServiceTranslation, TranslationService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Cloud Translation API endpoint.
const API_URL: &str = "https://translation.googleapis.com/language/translate/v2";

/// Public page shown to users as the source of the translation.
const PAGE_URL: &str = "https://translate.google.com/";

/// Translation service backed by the Cloud Translation API.
pub struct GoogleTranslate {
    client: Client,
    api_key: String,
    api_url: String,
}

impl GoogleTranslate {
    /// Create a new client with the given API key.
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            api_url: API_URL.to_string(),
        }
    }

    /// Point the client at a different API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn page_url(text: &str, src_code: &str, dst_code: &str) -> String {
        format!(
            "{}?sl={}&tl={}&text={}&op=translate",
            PAGE_URL,
            src_code,
            dst_code,
            join_query(text, "%20")
        )
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize, Debug)]
struct TranslateResponse {
    data: Option<TranslateData>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[async_trait]
impl TranslationService for GoogleTranslate {
    fn service_name(&self) -> &'static str {
        "google.com"
    }

    async fn translate(
        &self,
        text: &str,
        src_code: &str,
        dst_code: &str,
    ) -> Result<Option<ServiceTranslation>, FetchError> {
        let request = TranslateRequest {
            q: text,
            source: src_code,
            target: dst_code,
            format: "text",
        };

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: TranslateResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::Decode(format!("Cloud Translation response: {}", e)))?;

        if let Some(error) = parsed.error {
            warn!("Cloud Translation error ({}): {}", status, error.message);
            return Err(FetchError::Api(error.message));
        }

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let translated = parsed
            .data
            .and_then(|d| d.translations.into_iter().next())
            .map(|t| t.translated_text)
            .filter(|t| !t.trim().is_empty());

        Ok(translated.map(|t| ServiceTranslation::new(t, Self::page_url(text, src_code, dst_code))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        assert_eq!(
            GoogleTranslate::page_url("iyi akşamlar", "tr", "en"),
            "https://translate.google.com/?sl=tr&tl=en&text=iyi%20ak%C5%9Famlar&op=translate"
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"data":{"translations":[{"translatedText":"good evening"}]}}"#;
        let parsed: TranslateResponse = serde_json::from_str(body).unwrap();
        let text = parsed.data.unwrap().translations.remove(0).translated_text;
        assert_eq!(text, "good evening");
    }

    #[test]
    fn test_parse_error_response() {
        let body = r#"{"error":{"code":400,"message":"API key not valid."}}"#;
        let parsed: TranslateResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.error.unwrap().message, "API key not valid.");
    }

    #[test]
    fn test_with_api_url() {
        let service =
            GoogleTranslate::new(Client::new(), "key".to_string()).with_api_url("http://localhost");
        assert_eq!(service.api_url, "http://localhost");
        assert_eq!(service.service_name(), "google.com");
    }
}
