//! demek.ru, a Turkish-Russian dictionary.

use crate::error::FetchError;
use crate::language::Language;
use crate::translate::http::{element_text, fetch_page, join_query, parse_selector};
use crate::translate::{ServiceTranslation, TranslationService};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

const BASE_URL: &str = "https://demek.ru";

pub struct DemekRu {
    client: Client,
    base_url: String,
}

impl DemekRu {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, text: &str) -> String {
        format!("{}/soz/?q={}", self.base_url, join_query(text, "+"))
    }
}

fn extract_translation(html: &str) -> Result<Option<String>, FetchError> {
    let document = Html::parse_document(html);
    let selector = parse_selector("div.item_bsc")?;
    Ok(document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty()))
}

#[async_trait]
impl TranslationService for DemekRu {
    fn service_name(&self) -> &'static str {
        "demek.ru"
    }

    fn supported_languages(&self) -> Vec<(Language, Language)> {
        vec![
            (Language::Russian, Language::Turkish),
            (Language::Turkish, Language::Russian),
        ]
    }

    async fn translate(
        &self,
        text: &str,
        _src_code: &str,
        _dst_code: &str,
    ) -> Result<Option<ServiceTranslation>, FetchError> {
        let url = self.url(text);
        let html = fetch_page(&self.client, &url).await?;
        Ok(extract_translation(&html)?.map(|t| ServiceTranslation::new(t, url)))
    }
}
