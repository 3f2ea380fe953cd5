//! turkcesozluk.net, which renders one table per language direction.

use crate::error::FetchError;
use crate::translate::http::{element_text, fetch_page, join_query, parse_selector};
use crate::translate::{ServiceTranslation, TranslationService};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

const BASE_URL: &str = "https://www.turkcesozluk.net";

/// Meanings kept from a bulleted cell.
const MAX_MEANINGS: usize = 5;

pub struct TurkcesozlukNet {
    client: Client,
    base_url: String,
}

impl TurkcesozlukNet {
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
        format!("{}/index.php?word={}", self.base_url, join_query(text, "+"))
    }
}

/// The table is named after the direction, e.g. `trru`. Its second row
/// nests another table whose first row holds the meanings in the second cell.
fn extract_translation(
    html: &str,
    src_code: &str,
    dst_code: &str,
) -> Result<Option<String>, FetchError> {
    let document = Html::parse_document(html);
    let table_selector = parse_selector(&format!("table[name=\"{}{}\"]", src_code, dst_code))?;
    let row_selector = parse_selector("tr")?;
    let cell_selector = parse_selector("td")?;
    let list_selector = parse_selector("ul.ulc")?;
    let item_selector = parse_selector("li")?;

    let Some(table) = document.select(&table_selector).next() else {
        return Ok(None);
    };
    let Some(content) = table.select(&row_selector).nth(1) else {
        return Ok(None);
    };
    let Some(first_row) = content.select(&row_selector).next() else {
        return Ok(None);
    };
    let Some(cell) = first_row.select(&cell_selector).nth(1) else {
        return Ok(None);
    };

    let text = match cell.select(&list_selector).next() {
        Some(list) => list
            .select(&item_selector)
            .take(MAX_MEANINGS)
            .map(element_text)
            .collect::<Vec<_>>()
            .join(" "),
        None => element_text(cell),
    };

    Ok(Some(text).filter(|t| !t.is_empty()))
}

#[async_trait]
impl TranslationService for TurkcesozlukNet {
    fn service_name(&self) -> &'static str {
        "turkcesozluk.net"
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
