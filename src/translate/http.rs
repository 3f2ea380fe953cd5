//! Plumbing shared by the scraping services.

use crate::error::{FetchError, Result};
use rand::seq::IndexedRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::Selector;
use std::time::Duration;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Client shared by all services. Timeouts and TLS failures surface as
/// errors of the single request they belong to.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// GET `url` with a randomized browser User-Agent and return the body.
pub async fn fetch_page(client: &Client, url: &str) -> std::result::Result<String, FetchError> {
    let response = client
        .get(url)
        .header(USER_AGENT, random_user_agent())
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    Ok(response.text().await?)
}

/// Percent-encodes every word of `text` and joins them with `separator`.
pub fn join_query(text: &str, separator: &str) -> String {
    text.split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn parse_selector(css: &str) -> std::result::Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Decode(format!("bad selector {}: {}", css, e)))
}

/// Collected text of an element with surrounding whitespace removed.
pub fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
