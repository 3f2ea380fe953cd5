//! glosbe.com, a multilingual dictionary keyed by ISO codes.

use crate::error::FetchError;
use crate::translate::http::{element_text, fetch_page, join_query, parse_selector};
use crate::translate::{ServiceTranslation, TranslationService};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

const BASE_URL: &str = "https://glosbe.com";

pub struct GlosbeCom {
    client: Client,
    base_url: String,
}

impl GlosbeCom {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, text: &str, src_code: &str, dst_code: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            src_code,
            dst_code,
            join_query(text, "%20")
        )
    }
}

/// The first bold phrase of the summary paragraph.
fn extract_translation(html: &str) -> Result<Option<String>, FetchError> {
    let document = Html::parse_document(html);
    let selector = parse_selector("p#content-summary strong")?;
    Ok(document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty()))
}

#[async_trait]
impl TranslationService for GlosbeCom {
    fn service_name(&self) -> &'static str {
        "glosbe.com"
    }

    async fn translate(
        &self,
        text: &str,
        src_code: &str,
        dst_code: &str,
    ) -> Result<Option<ServiceTranslation>, FetchError> {
        let url = self.url(text, src_code, dst_code);
        let html = fetch_page(&self.client, &url).await?;
        Ok(extract_translation(&html)?.map(|t| ServiceTranslation::new(t, url)))
    }
}
