//! Turkish word of the day, scraped from turkishclass101.com.

use crate::error::{PracticeError, Result};
use crate::language::Language;
use crate::translate::http::{element_text, parse_selector, random_user_agent};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

const URL: &str = "https://www.turkishclass101.com/turkish-phrases/";

/// Example sentences kept from the widget.
const MAX_EXAMPLES: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub turkish: String,
    pub english: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOfTheDay {
    pub turkish_word: String,
    pub part_of_speech: String,
    pub english_translation: String,
    pub examples: Vec<Example>,
}

fn widget_selector(suffix: &str) -> Result<Selector> {
    parse_selector(&format!("div.r101-wotd-widget{}", suffix))
        .map_err(|e| PracticeError::Scrape(e.to_string()))
}

fn field(parent: ElementRef<'_>, suffix: &str) -> Result<String> {
    let selector = widget_selector(suffix)?;
    parent
        .select(&selector)
        .next()
        .map(element_text)
        .ok_or_else(|| PracticeError::Scrape(format!("no wotd-widget{} element", suffix)))
}

/// Extracts the word, its translation and usage examples from the page.
pub fn parse_page(html: &str) -> Result<WordOfTheDay> {
    let document = Html::parse_document(html);
    let root_selector = parse_selector("div.wotd-widget")
        .map_err(|e| PracticeError::Scrape(e.to_string()))?;
    let widget = document
        .select(&root_selector)
        .next()
        .ok_or_else(|| PracticeError::Scrape("no wotd-widget on the page".to_string()))?;

    let section_selector = widget_selector("__section")?;
    let examples = widget
        .select(&section_selector)
        .take(MAX_EXAMPLES)
        .map(|section| {
            Ok(Example {
                turkish: field(section, "__word")?,
                english: field(section, "__english")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WordOfTheDay {
        turkish_word: field(widget, "__word")?,
        part_of_speech: field(widget, "__class")?,
        english_translation: field(widget, "__english")?,
        examples,
    })
}

/// Message body sent to subscribers.
pub fn format_word(word: &WordOfTheDay) -> String {
    let tk = Language::Turkish.flag();
    let gb = Language::English.flag();

    let mut message = String::from("<u>Turkish word of today</u>:\n");
    message.push_str(&format!("{tk}<b>{}</b>{tk}\n", word.turkish_word));
    message.push_str(&format!(
        "{gb}<b>{}</b>{gb} ({})\n\n",
        word.english_translation, word.part_of_speech
    ));

    message.push_str("<u>Examples of usage</u>:\n");
    for (i, example) in word.examples.iter().enumerate() {
        message.push_str(&format!("<code>{}. </code>{tk}{} \n", i + 1, example.turkish));
        message.push_str(&format!("<code>   </code>{gb}{} \n", example.english));
    }
    message
}

/// Fetches today's word and renders it.
pub struct WordOfTheDaySource {
    client: Client,
    url: String,
}

impl WordOfTheDaySource {
    pub fn new(client: Client) -> Self {
        Self::with_url(client, URL)
    }

    pub fn with_url(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub async fn fetch(&self) -> Result<WordOfTheDay> {
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;
        let word = parse_page(&html)?;
        info!("Word of the day: {}", word.turkish_word);
        Ok(word)
    }

    pub async fn message(&self) -> Result<String> {
        Ok(format_word(&self.fetch().await?))
    }
}
