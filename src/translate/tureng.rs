//! tureng.com, a Turkish-English dictionary.

use crate::error::FetchError;
use crate::language::Language;
use crate::translate::http::{element_text, fetch_page, join_query, parse_selector};
use crate::translate::{ServiceTranslation, TranslationService};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

const BASE_URL: &str = "https://tureng.com";

/// Result cells kept after the matching heading.
const MAX_CELLS: usize = 5;

pub struct TurengCom {
    client: Client,
    base_url: String,
}

impl TurengCom {
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
        format!(
            "{}/en/turkish-english/{}",
            self.base_url,
            join_query(text, "%20")
        )
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Finds the `h2` naming the direction ("English Turkish Dictionary" for
/// Turkish to English) and collects the target-language cells after it.
fn extract_translation(
    html: &str,
    src_code: &str,
    dst_code: &str,
) -> Result<Option<String>, FetchError> {
    let dst_iso = dst_code
        .parse::<Language>()
        .map(Language::iso_code)
        .map_err(FetchError::Decode)?;
    let heading = title_case(&format!("{} {} dictionary", dst_code, src_code));

    let document = Html::parse_document(html);
    let selector = parse_selector(&format!("h2, td[lang=\"{}\"]", dst_iso))?;

    let mut heading_found = false;
    let mut cells = Vec::new();
    for element in document.select(&selector) {
        let is_heading = element.value().name() == "h2";
        if !heading_found {
            heading_found = is_heading && element_text(element).contains(&heading);
            continue;
        }
        if !is_heading {
            cells.push(element_text(element));
            if cells.len() == MAX_CELLS {
                break;
            }
        }
    }

    if cells.is_empty() {
        return Ok(None);
    }
    Ok(Some(cells.join("; ")))
}

#[async_trait]
impl TranslationService for TurengCom {
    fn service_name(&self) -> &'static str {
        "tureng.com"
    }

    fn supported_languages(&self) -> Vec<(Language, Language)> {
        vec![
            (Language::English, Language::Turkish),
            (Language::Turkish, Language::English),
        ]
    }

    fn language_encoding(&self, language: Language) -> Option<&'static str> {
        match language {
            Language::English => Some("english"),
            Language::Turkish => Some("turkish"),
            Language::Russian => None,
        }
    }

    async fn translate(
        &self,
        text: &str,
        src_code: &str,
        dst_code: &str,
    ) -> Result<Option<ServiceTranslation>, FetchError> {
        let url = self.url(text);
        let html = fetch_page(&self.client, &url).await?;
        Ok(extract_translation(&html, src_code, dst_code)?
            .map(|t| ServiceTranslation::new(t, url)))
    }
}
