//! Tokenization and stop word filtering shared by the extractors

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

/// A filter for removing stop words from token streams
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    /// Lowercase stop words
    stopwords: HashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new("en")
    }
}

impl StopwordFilter {
    /// Create a filter for the given language code, falling back to English
    pub fn new(language: &str) -> Self {
        let lang = match language.to_lowercase().as_str() {
            "de" | "german" => LANGUAGE::German,
            "fr" | "french" => LANGUAGE::French,
            "es" | "spanish" => LANGUAGE::Spanish,
            "it" | "italian" => LANGUAGE::Italian,
            "pt" | "portuguese" => LANGUAGE::Portuguese,
            "nl" | "dutch" => LANGUAGE::Dutch,
            _ => LANGUAGE::English,
        };
        let stopwords = get(lang).iter().map(|s| s.to_string().to_lowercase()).collect();
        Self { stopwords }
    }

    /// Create a filter from a custom list
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// A filter that removes nothing
    pub fn empty() -> Self {
        Self {
            stopwords: HashSet::new(),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}

/// Split text into sentences on Unicode sentence boundaries
pub fn sentences(text: &str) -> Vec<&str> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a sentence into word tokens and single punctuation tokens.
///
/// Word parts may be joined by `-`, `'` or any character in `joiners`, so
/// `R&D` stays one token when `&` is a joiner. A joiner standing alone is
/// also emitted as its own token.
pub fn tokenize(sentence: &str, joiners: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = sentence.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if is_word_char(c) {
            current.push(c);
            continue;
        }
        let joins_words = (c == '-' || c == '\'' || joiners.contains(c))
            && !current.is_empty()
            && chars.get(i + 1).is_some_and(|next| is_word_char(*next));
        if joins_words {
            current.push(c);
            continue;
        }
        if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Lowercased word tokens of two or more word characters
pub fn word_tokens(text: &str) -> Vec<String> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"\b\w\w+\b").unwrap());
    word.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// True when every character is ASCII punctuation not listed in `kept`
pub fn is_punctuation(token: &str, kept: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_punctuation() && !kept.contains(c))
}

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
