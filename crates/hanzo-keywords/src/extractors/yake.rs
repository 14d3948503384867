//! YAKE-style statistical keyword extraction (feature `yake`)

use super::KeywordExtractor;
use crate::config::YakeConfig;
use crate::error::Result;
#[cfg(not(feature = "yake"))]
use crate::error::KeywordError;
use crate::text::StopwordFilter;
use crate::types::{Corpus, Method, RankedMethodOutput};

/// Unsupervised single-document keyword extraction.
///
/// Lower scores are better; the output is ordered ascending by score so the
/// first candidate is the most relevant.
pub struct YakeExtractor {
    config: YakeConfig,
    #[cfg_attr(not(feature = "yake"), allow(dead_code))]
    stopwords: StopwordFilter,
}

impl Default for YakeExtractor {
    fn default() -> Self {
        Self::new(YakeConfig::default())
    }
}

impl YakeExtractor {
    pub fn new(config: YakeConfig) -> Self {
        let stopwords = StopwordFilter::new(&config.language);
        Self { config, stopwords }
    }

    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// True when the algorithm is compiled into this build
    pub const fn compiled() -> bool {
        cfg!(feature = "yake")
    }
}

#[async_trait::async_trait]
impl KeywordExtractor for YakeExtractor {
    fn method(&self) -> Method {
        Method::Yake
    }

    fn is_available(&self, corpus: &Corpus) -> bool {
        Self::compiled() && self.config.enabled && !corpus.is_empty()
    }

    #[cfg(feature = "yake")]
    async fn extract(&self, corpus: &Corpus) -> Result<RankedMethodOutput> {
        let ranked = scoring::rank(&corpus.combined(), &self.stopwords, &self.config);
        Ok(RankedMethodOutput::from_pairs(Method::Yake, ranked))
    }

    #[cfg(not(feature = "yake"))]
    async fn extract(&self, _corpus: &Corpus) -> Result<RankedMethodOutput> {
        Err(KeywordError::Unavailable(Method::Yake.to_string()))
    }
}

#[cfg(feature = "yake")]
mod scoring {
    use crate::config::YakeConfig;
    use crate::text::{is_punctuation, sentences, tokenize, StopwordFilter};
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct TermStats {
        tf: f64,
        tf_upper: f64,
        tf_acronym: f64,
        sentence_ids: Vec<usize>,
        left: HashMap<String, f64>,
        right: HashMap<String, f64>,
    }

    /// A token with its position inside the document
    struct Token {
        text: String,
        key: String,
        sentence: usize,
        /// Index of the run of word tokens this token belongs to
        chunk: usize,
        stop: bool,
    }

    fn tokens(text: &str, stopwords: &StopwordFilter) -> Vec<Token> {
        let mut out = Vec::new();
        let mut chunk = 0;
        for (sentence_id, sentence) in sentences(text).into_iter().enumerate() {
            chunk += 1;
            for raw in tokenize(sentence, "") {
                if is_punctuation(&raw, "") {
                    chunk += 1;
                    continue;
                }
                let key = raw.to_lowercase();
                let stop = stopwords.is_stopword(&key)
                    || (key.chars().count() < 3 && !raw.chars().all(|c| c.is_numeric()));
                out.push(Token {
                    text: raw,
                    key,
                    sentence: sentence_id,
                    chunk,
                    stop,
                });
            }
        }
        out
    }

    fn mean_std(values: &[f64]) -> (f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    fn median(values: &[usize]) -> f64 {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.is_empty() {
            0.0
        } else if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        } else {
            sorted[mid] as f64
        }
    }

    fn term_scores(tokens: &[Token], window: usize, sentence_count: usize) -> HashMap<String, f64> {
        let mut stats: HashMap<String, TermStats> = HashMap::new();
        for (i, token) in tokens.iter().enumerate() {
            let entry = stats.entry(token.key.clone()).or_default();
            entry.tf += 1.0;
            let is_acronym = token.text.chars().count() > 1 && token.text.chars().all(|c| c.is_uppercase());
            if is_acronym {
                entry.tf_acronym += 1.0;
            } else if token.text.chars().next().is_some_and(char::is_uppercase) && i > 0 && tokens[i - 1].sentence == token.sentence {
                entry.tf_upper += 1.0;
            }
            if entry.sentence_ids.last() != Some(&token.sentence) {
                entry.sentence_ids.push(token.sentence);
            }
        }

        for (i, token) in tokens.iter().enumerate() {
            if token.stop {
                continue;
            }
            for offset in 1..=window {
                if let Some(left) = i.checked_sub(offset).map(|j| &tokens[j]) {
                    if left.chunk == token.chunk && !left.stop {
                        if let Some(s) = stats.get_mut(&token.key) {
                            *s.left.entry(left.key.clone()).or_default() += 1.0;
                        }
                    }
                }
                if let Some(right) = tokens.get(i + offset) {
                    if right.chunk == token.chunk && !right.stop {
                        if let Some(s) = stats.get_mut(&token.key) {
                            *s.right.entry(right.key.clone()).or_default() += 1.0;
                        }
                    }
                }
            }
        }

        let content_tfs: Vec<f64> = tokens
            .iter()
            .filter(|t| !t.stop)
            .map(|t| t.key.as_str())
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|k| stats.get(k).map(|s| s.tf))
            .collect();
        let (mean_tf, std_tf) = mean_std(&content_tfs);
        let max_tf = stats.values().map(|s| s.tf).fold(1.0, f64::max);
        let sentence_count = sentence_count.max(1) as f64;

        stats
            .into_iter()
            .map(|(key, s)| {
                let casing = s.tf_upper.max(s.tf_acronym) / (1.0 + s.tf.ln());
                let position = (3.0 + median(&s.sentence_ids)).ln().ln();
                let frequency = s.tf / (mean_tf + std_tf).max(f64::EPSILON);
                let spread = |m: &HashMap<String, f64>| {
                    let total: f64 = m.values().sum();
                    if total == 0.0 {
                        0.0
                    } else {
                        m.len() as f64 / total
                    }
                };
                let relatedness = 1.0 + (spread(&s.left) + spread(&s.right)) * (s.tf / max_tf);
                let different = s.sentence_ids.len() as f64 / sentence_count;
                let score = (relatedness * position)
                    / (casing + frequency / relatedness + different / relatedness);
                (key, score)
            })
            .collect()
    }

    /// Ranked `(phrase, score)` pairs, best (lowest) first, truncated to `top_n`
    pub fn rank(text: &str, stopwords: &StopwordFilter, config: &YakeConfig) -> Vec<(String, f64)> {
        let tokens = tokens(text, stopwords);
        let sentence_count = tokens.last().map(|t| t.sentence + 1).unwrap_or(0);
        let scores = term_scores(&tokens, config.window.max(1), sentence_count);

        let mut candidate_tf: HashMap<String, f64> = HashMap::new();
        let mut first_form: HashMap<String, String> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for start in 0..tokens.len() {
            for n in 1..=config.max_ngram.max(1) {
                let Some(window) = tokens.get(start..start + n) else {
                    break;
                };
                if window.iter().any(|t| t.chunk != window[0].chunk) {
                    break;
                }
                if window[0].stop || window[n - 1].stop {
                    continue;
                }
                let key = window.iter().map(|t| t.key.as_str()).collect::<Vec<_>>().join(" ");
                *candidate_tf.entry(key.clone()).or_default() += 1.0;
                if !first_form.contains_key(&key) {
                    let form = window.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
                    first_form.insert(key.clone(), form);
                    order.push(key);
                }
            }
        }

        let mut ranked: Vec<(String, f64)> = order
            .into_iter()
            .map(|key| {
                let mut product = 1.0;
                let mut sum = 0.0;
                for word in key.split(' ') {
                    let score = scores.get(word).copied().unwrap_or(1.0);
                    if !stopwords.is_stopword(word) {
                        product *= score;
                        sum += score;
                    }
                }
                let tf = candidate_tf[&key];
                let score = product / (tf * (1.0 + sum));
                (first_form.remove(&key).unwrap_or(key), score)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(config.top_n);
        ranked
    }
}
