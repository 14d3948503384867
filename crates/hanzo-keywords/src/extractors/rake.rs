//! Rapid Automatic Keyword Extraction

use super::{rank_descending, KeywordExtractor};
use crate::config::RakeConfig;
use crate::error::Result;
use crate::text::{is_punctuation, sentences, tokenize, StopwordFilter};
use crate::types::{Corpus, Method, RankedMethodOutput};
use std::collections::HashMap;

/// RAKE over the combined corpus text.
///
/// Returns every phrase occurrence, repeats included, ranked by the sum of
/// its words' degree/frequency scores. Callers dedupe and slice the list.
pub struct RakeExtractor {
    stopwords: StopwordFilter,
    kept_punctuation: String,
}

impl Default for RakeExtractor {
    fn default() -> Self {
        Self::new(&RakeConfig::default())
    }
}

impl RakeExtractor {
    pub fn new(config: &RakeConfig) -> Self {
        Self {
            stopwords: StopwordFilter::new(&config.language),
            kept_punctuation: config.kept_punctuation.clone(),
        }
    }

    /// Replace the stop word list
    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Candidate phrases in order of appearance, as lowercase word lists
    fn candidate_phrases(&self, text: &str) -> Vec<Vec<String>> {
        let mut phrases = Vec::new();
        for sentence in sentences(text) {
            let mut current: Vec<String> = Vec::new();
            for token in tokenize(sentence, &self.kept_punctuation) {
                let delimiter = self.stopwords.is_stopword(&token)
                    || is_punctuation(&token, &self.kept_punctuation);
                if delimiter {
                    if !current.is_empty() {
                        phrases.push(std::mem::take(&mut current));
                    }
                } else {
                    current.push(token.to_lowercase());
                }
            }
            if !current.is_empty() {
                phrases.push(current);
            }
        }
        phrases
    }

    /// Ranked `(phrase, score)` pairs for the text
    pub fn rank(&self, text: &str) -> Vec<(String, f64)> {
        let phrases = self.candidate_phrases(text);

        let mut frequency: HashMap<&str, f64> = HashMap::new();
        let mut degree: HashMap<&str, f64> = HashMap::new();
        for phrase in &phrases {
            let len = phrase.len() as f64;
            for word in phrase {
                *frequency.entry(word.as_str()).or_default() += 1.0;
                *degree.entry(word.as_str()).or_default() += len;
            }
        }

        let mut ranked: Vec<(String, f64)> = phrases
            .iter()
            .map(|phrase| {
                let score = phrase
                    .iter()
                    .map(|w| degree[w.as_str()] / frequency[w.as_str()])
                    .sum();
                (phrase.join(" "), score)
            })
            .collect();
        rank_descending(&mut ranked);
        ranked
    }
}

#[async_trait::async_trait]
impl KeywordExtractor for RakeExtractor {
    fn method(&self) -> Method {
        Method::Rake
    }

    fn is_available(&self, corpus: &Corpus) -> bool {
        !corpus.is_empty()
    }

    async fn extract(&self, corpus: &Corpus) -> Result<RankedMethodOutput> {
        Ok(RankedMethodOutput::from_pairs(
            Method::Rake,
            self.rank(&corpus.combined()),
        ))
    }
}
