//! The closed set of supported languages and containment-based detection.

use serde::{Deserialize, Serialize};

const PUNCTUATION: &str = " ,.";
const ENGLISH_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
const TURKISH_EXTRA: &str = "âçğıöşü";
const TURKISH_EXCLUDED: &str = "qwx";
const RUSSIAN_LETTERS: &str = "абвгдеёжзийклмнопрстуфхцчшщъыьэюя";

/// Languages in their fixed enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Russian,
    Turkish,
    English,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Russian, Language::Turkish, Language::English];

    /// ISO-639-1 code.
    pub fn iso_code(self) -> &'static str {
        match self {
            Language::Russian => "ru",
            Language::Turkish => "tr",
            Language::English => "en",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Language::Russian => "\u{1F1F7}\u{1F1FA}",
            Language::Turkish => "\u{1F1F9}\u{1F1F7}",
            Language::English => "\u{1F1EC}\u{1F1E7}",
        }
    }

    /// Russian genitive adjective, as in "с турецкого языка".
    pub fn genitive(self) -> &'static str {
        match self {
            Language::Russian => "русского",
            Language::Turkish => "турецкого",
            Language::English => "английского",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Russian => "russian",
            Language::Turkish => "turkish",
            Language::English => "english",
        }
    }

    /// The two other languages, in enumeration order.
    pub fn targets(self) -> (Language, Language) {
        match self {
            Language::Russian => (Language::Turkish, Language::English),
            Language::Turkish => (Language::Russian, Language::English),
            Language::English => (Language::Russian, Language::Turkish),
        }
    }

    /// Every ordered pair of distinct languages.
    pub fn all_pairs() -> Vec<(Language, Language)> {
        Language::ALL
            .into_iter()
            .flat_map(|src| {
                Language::ALL
                    .into_iter()
                    .filter(move |dst| *dst != src)
                    .map(move |dst| (src, dst))
            })
            .collect()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "russian" | "ru" => Ok(Language::Russian),
            "turkish" | "tr" => Ok(Language::Turkish),
            "english" | "en" => Ok(Language::English),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

fn in_english(c: char) -> bool {
    ENGLISH_LETTERS.contains(c) || PUNCTUATION.contains(c)
}

fn in_turkish(c: char) -> bool {
    (in_english(c) || TURKISH_EXTRA.contains(c)) && !TURKISH_EXCLUDED.contains(c)
}

fn in_russian(c: char) -> bool {
    RUSSIAN_LETTERS.contains(c) || PUNCTUATION.contains(c)
}

/// Lowering used before detection. `İ` is folded by hand because the
/// default mapping produces a combining dot that no alphabet contains.
fn fold_for_detection(text: &str) -> String {
    text.replace('İ', "i").to_lowercase()
}

/// Detects the language of `text` by checking which reference alphabet
/// contains all of its characters. Alphabets are tested in the order
/// Turkish, Russian, English and the first match wins, so plain ASCII
/// without q/w/x is reported as Turkish.
pub fn detect_language(text: &str) -> Option<Language> {
    let folded = fold_for_detection(text);
    if folded.chars().all(in_turkish) {
        return Some(Language::Turkish);
    }
    if folded.chars().all(in_russian) {
        return Some(Language::Russian);
    }
    if folded.chars().all(in_english) {
        return Some(Language::English);
    }
    None
}

/// Lower-cases `text` following the rules of `language`: in Turkish
/// `I` lowers to dotless `ı` and `İ` to `i`.
pub fn lowercase(text: &str, language: Option<Language>) -> String {
    match language {
        Some(Language::Turkish) => text
            .chars()
            .map(|c| match c {
                'I' => 'ı',
                'İ' => 'i',
                other => other,
            })
            .collect::<String>()
            .to_lowercase(),
        _ => text.to_lowercase(),
    }
}
