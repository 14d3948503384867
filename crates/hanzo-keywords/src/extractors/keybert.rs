//! Embedding-similarity keyword extraction in the style of KeyBERT

use super::{cosine_similarity, Embedder, HashingEmbedder, KeywordExtractor};
use crate::config::KeyBertConfig;
use crate::error::Result;
use crate::text::{word_tokens, StopwordFilter};
use crate::types::{Corpus, Method, RankedMethodOutput};
use std::collections::HashSet;
use std::sync::Arc;

/// Ranks n-gram candidates by cosine similarity to the whole document
pub struct KeyBertExtractor {
    embedder: Arc<dyn Embedder>,
    stopwords: StopwordFilter,
    ngram_range: (usize, usize),
    top_n: usize,
    enabled: bool,
}

impl Default for KeyBertExtractor {
    fn default() -> Self {
        Self::new(&KeyBertConfig::default(), Arc::new(HashingEmbedder::default()))
    }
}

impl KeyBertExtractor {
    pub fn new(config: &KeyBertConfig, embedder: Arc<dyn Embedder>) -> Self {
        let ngram_min = config.ngram_min.max(1);
        Self {
            embedder,
            stopwords: StopwordFilter::new(&config.language),
            ngram_range: (ngram_min, config.ngram_max.max(ngram_min)),
            top_n: config.top_n,
            enabled: config.enabled,
        }
    }

    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Unique n-grams over the stop-word-filtered token stream, first occurrence order
    pub fn candidates(&self, text: &str) -> Vec<String> {
        let tokens: Vec<String> = word_tokens(text)
            .into_iter()
            .filter(|t| !self.stopwords.is_stopword(t))
            .collect();

        let (min, max) = self.ngram_range;
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for n in min..=max {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if seen.insert(gram.clone()) {
                    candidates.push(gram);
                }
            }
        }
        candidates
    }
}

/// Order-insensitive identity of a phrase: its words sorted
fn word_bag(phrase: &str) -> String {
    let mut words: Vec<&str> = phrase.split(' ').collect();
    words.sort_unstable();
    words.join(" ")
}

fn round4(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

#[async_trait::async_trait]
impl KeywordExtractor for KeyBertExtractor {
    fn method(&self) -> Method {
        Method::KeyBert
    }

    fn is_available(&self, corpus: &Corpus) -> bool {
        self.enabled && !corpus.is_empty()
    }

    async fn extract(&self, corpus: &Corpus) -> Result<RankedMethodOutput> {
        let document = corpus.combined();
        let candidates = self.candidates(&document);
        if candidates.is_empty() {
            return Ok(RankedMethodOutput::empty(Method::KeyBert));
        }

        let mut inputs = Vec::with_capacity(candidates.len() + 1);
        inputs.push(document);
        inputs.extend(candidates.iter().cloned());
        let embeddings = self.embedder.embed(&inputs).await?;
        let (doc_embedding, candidate_embeddings) = embeddings
            .split_first()
            .ok_or_else(|| crate::KeywordError::Embedding("no embeddings returned".to_string()))?;

        let mut scored: Vec<(String, f64)> = candidates
            .into_iter()
            .zip(candidate_embeddings)
            .map(|(phrase, embedding)| (phrase, round4(cosine_similarity(doc_embedding, embedding))))
            .collect();
        super::rank_descending(&mut scored);
        // Permutations of the same words keep only their best-ranked form
        let mut bags = HashSet::new();
        scored.retain(|(phrase, _)| bags.insert(word_bag(phrase)));
        scored.truncate(self.top_n);

        Ok(RankedMethodOutput::from_pairs(Method::KeyBert, scored))
    }
}
