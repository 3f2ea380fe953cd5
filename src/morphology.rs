//! Turkish morphology: rendering analyzer parses as aligned columns and
//! deciding whether a word is worth analyzing.

use crate::error::{PracticeError, Result};
use crate::language::{detect_language, Language};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
    /// Surface form as it appears inside the word.
    pub value: String,
    /// Grammatical tag, e.g. `Noun` or `ThirdPersonSingular`.
    pub name: String,
}

/// One parse of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnalysis {
    pub word: String,
    pub pos: String,
    pub lemma: String,
    pub morphemes: Vec<Morpheme>,
}

/// The morphological analyzer itself; treated as a black box.
#[async_trait]
pub trait MorphAnalyzer: Send + Sync {
    async fn parse(&self, word: &str) -> Result<Vec<WordAnalysis>>;
}

/// Analyzer reached over HTTP: POSTs `{"word": ...}` and expects a JSON
/// array of parses.
pub struct RemoteAnalyzer {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    word: &'a str,
}

#[derive(Deserialize)]
struct ParseResponse {
    lemma: String,
    pos: String,
    #[serde(default)]
    morphemes: Vec<Morpheme>,
}

impl RemoteAnalyzer {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl MorphAnalyzer for RemoteAnalyzer {
    async fn parse(&self, word: &str) -> Result<Vec<WordAnalysis>> {
        let response = self
            .client
            .post(&self.url)
            .json(&ParseRequest { word })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PracticeError::Api(format!(
                "Morphology analyzer error ({}): {}",
                status, body
            )));
        }

        let parses: Vec<ParseResponse> = serde_json::from_str(&body)?;
        debug!("{} parse(s) for {:?}", parses.len(), word);
        Ok(parses
            .into_iter()
            .map(|p| WordAnalysis {
                word: word.to_string(),
                pos: p.pos,
                lemma: p.lemma,
                morphemes: p.morphemes,
            })
            .collect())
    }
}

/// Shortens long tag names so lines fit on a phone screen.
pub fn compress_tag(name: &str) -> String {
    const COMPRESSIONS: [(&str, &str); 4] = [
        ("First", "1st"),
        ("Second", "2nd"),
        ("Third", "3rd"),
        ("Person", "Prsn"),
    ];
    COMPRESSIONS
        .iter()
        .fold(name.to_string(), |acc, (from, to)| acc.replace(from, to))
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

/// Renders one parse. Each morpheme is shifted right by the length of the
/// morphemes before it, so the column reads as the word being built up.
pub fn format_analysis(analysis: &WordAnalysis) -> String {
    let len = |s: &str| s.chars().count();
    let max_len = analysis
        .morphemes
        .iter()
        .map(|m| len(&m.value))
        .chain([len(&analysis.word), len(&analysis.lemma)])
        .max()
        .unwrap_or(0);

    let mut result = format!("<b>{}</b>\n", analysis.lemma);
    let mut indent = 0;
    for (i, morpheme) in analysis.morphemes.iter().enumerate() {
        let symbol = if i == 0 { '>' } else { '+' };
        let value_len = len(&morpheme.value);
        let shifted = pad_right(&pad_left(&morpheme.value, indent + value_len), max_len);
        result.push_str(&format!(
            "<code>{}{}|</code>{}\n",
            symbol,
            shifted,
            compress_tag(&morpheme.name)
        ));
        indent += value_len;
    }
    result.push_str(&format!(
        "<code>={}|</code><b>{}</b>\n",
        pad_left(&analysis.word, max_len),
        analysis.pos
    ));
    result
}

/// Morphology front-end over an analyzer.
#[derive(Clone)]
pub struct Morphology {
    analyzer: Arc<dyn MorphAnalyzer>,
}

impl Morphology {
    pub fn new(analyzer: Arc<dyn MorphAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Every parse rendered and separated by a blank line.
    pub async fn analyze(&self, word: &str) -> Result<String> {
        let analyses = self.analyzer.parse(word).await?;
        let rendered = analyses
            .iter()
            .map(format_analysis)
            .collect::<Vec<_>>()
            .join("\n");
        Ok(rendered.trim().to_string())
    }

    pub async fn lemmas(&self, word: &str) -> Result<BTreeSet<String>> {
        let analyses = self.analyzer.parse(word).await?;
        Ok(analyses.into_iter().map(|a| a.lemma).collect())
    }

    /// A word is interesting when it has a parse and is not one of its own
    /// lemmas, i.e. it is inflected.
    pub async fn check_if_interesting(&self, word: &str) -> Result<bool> {
        let lemmas = self.lemmas(word).await?;
        Ok(!lemmas.is_empty() && !lemmas.contains(word))
    }

    /// Cheap check done before asking the analyzer: a single Turkish word
    /// without punctuation.
    pub fn is_candidate(text: &str) -> bool {
        detect_language(text) == Some(Language::Turkish)
            && !text.contains(['.', ','])
            && text.split_whitespace().count() == 1
    }
}
