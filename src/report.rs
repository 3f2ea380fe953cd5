//! Renders aggregated translations as a chat message.

use crate::language::Language;
use crate::translate::{AggregateTranslation, Translator};
use serde::{Deserialize, Serialize};

/// Shown when the language of a message cannot be detected.
pub const UNDETECTED_LANGUAGE: &str = "Не смог распознать язык \u{1F613}.";

/// Reply to a translation request: the original text, the rendered
/// message and the detected language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub translation: String,
    pub language: Option<Language>,
}

/// Minimal escaping for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Header naming the source language, then one section per target listing
/// every service result in registration order. Pure and deterministic.
pub fn format_translation(text: &str, aggregate: &AggregateTranslation) -> String {
    let src = aggregate.source_language;
    let src_flag = src.flag();
    let mut message = format!(
        "Перевод для \"<b>{}</b>\" с {}<b>{}</b>{} языка.\n\n",
        escape_html(text),
        src_flag,
        src.genitive(),
        src_flag
    );

    for target in aggregate.targets() {
        message.push_str(&format!(
            "{} ➔ {}:\n",
            src_flag,
            target.target_language.flag()
        ));
        for unit in &target.units {
            message.push_str(&format!(
                "<a href=\"{}\"><b>{}</b></a>: {}.\n",
                escape_html(&unit.url),
                escape_html(&unit.service_name),
                escape_html(&unit.text)
            ));
        }
        message.push('\n');
    }

    message
}

/// Runs the translator and packs the outcome into a [`Translation`].
pub async fn get_translation(translator: &Translator, text: &str) -> Translation {
    match translator.translate(text).await {
        Some(aggregate) => Translation {
            text: text.to_string(),
            translation: format_translation(text, &aggregate),
            language: Some(aggregate.source_language),
        },
        None => Translation {
            text: text.to_string(),
            translation: UNDETECTED_LANGUAGE.to_string(),
            language: None,
        },
    }
}
