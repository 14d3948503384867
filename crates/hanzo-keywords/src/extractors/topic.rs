//! Topic-model keyword extraction in the style of BERTopic (feature `topics`)
//!
//! Documents are embedded, grouped into clusters, and each cluster's terms
//! are ranked with class-based TF-IDF. Keywords come from the largest
//! cluster (topic 0). A model is only fitted when the corpus holds at least
//! `min_documents` documents, never fewer than [`MIN_TOPIC_DOCUMENTS`];
//! smaller corpora report the extractor as unavailable.

use super::{Embedder, HashingEmbedder, KeywordExtractor};
use crate::config::TopicConfig;
use crate::error::Result;
#[cfg(not(feature = "topics"))]
use crate::error::KeywordError;
use crate::text::StopwordFilter;
use crate::types::{Corpus, Method, RankedMethodOutput};
use std::sync::Arc;

/// Floor on corpus size for fitting a topic model; configuration can only raise it
pub const MIN_TOPIC_DOCUMENTS: usize = 10;

pub struct TopicExtractor {
    config: TopicConfig,
    #[cfg_attr(not(feature = "topics"), allow(dead_code))]
    embedder: Arc<dyn Embedder>,
    #[cfg_attr(not(feature = "topics"), allow(dead_code))]
    stopwords: StopwordFilter,
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::new(TopicConfig::default(), Arc::new(HashingEmbedder::default()))
    }
}

impl TopicExtractor {
    pub fn new(config: TopicConfig, embedder: Arc<dyn Embedder>) -> Self {
        let stopwords = StopwordFilter::new(&config.language);
        Self {
            config,
            embedder,
            stopwords,
        }
    }

    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub const fn compiled() -> bool {
        cfg!(feature = "topics")
    }

    /// Effective document threshold
    pub fn min_documents(&self) -> usize {
        self.config.min_documents.max(MIN_TOPIC_DOCUMENTS)
    }
}

#[async_trait::async_trait]
impl KeywordExtractor for TopicExtractor {
    fn method(&self) -> Method {
        Method::BerTopic
    }

    fn is_available(&self, corpus: &Corpus) -> bool {
        Self::compiled() && self.config.enabled && corpus.len() >= self.min_documents()
    }

    #[cfg(feature = "topics")]
    async fn extract(&self, corpus: &Corpus) -> Result<RankedMethodOutput> {
        let documents = corpus.documents();
        let embeddings = self.embedder.embed(documents).await?;
        let clusters = model::cluster(&embeddings, self.config.similarity_threshold);
        let Some(topic) = clusters.first() else {
            return Ok(RankedMethodOutput::empty(Method::BerTopic));
        };

        let terms = model::class_tfidf(documents, &clusters, &self.stopwords);
        let mut keywords = terms.into_iter().next().unwrap_or_default();
        keywords.truncate(self.config.top_n);
        tracing::debug!(
            clusters = clusters.len(),
            topic_size = topic.len(),
            "fitted topic model"
        );
        Ok(RankedMethodOutput::from_pairs(Method::BerTopic, keywords))
    }

    #[cfg(not(feature = "topics"))]
    async fn extract(&self, _corpus: &Corpus) -> Result<RankedMethodOutput> {
        Err(KeywordError::Unavailable(Method::BerTopic.to_string()))
    }
}

#[cfg(feature = "topics")]
mod model {
    use super::super::cosine_similarity;
    use crate::text::{word_tokens, StopwordFilter};
    use std::collections::HashMap;

    /// Greedy single-pass clustering against running centroids.
    ///
    /// Returns clusters of document indices ordered by size (largest first,
    /// earliest-formed first on ties).
    pub fn cluster(embeddings: &[Vec<f32>], threshold: f32) -> Vec<Vec<usize>> {
        let mut centroids: Vec<Vec<f32>> = Vec::new();
        let mut clusters: Vec<Vec<usize>> = Vec::new();

        for (i, embedding) in embeddings.iter().enumerate() {
            let best = centroids
                .iter()
                .enumerate()
                .map(|(c, centroid)| (c, cosine_similarity(centroid, embedding)))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            match best {
                Some((c, similarity)) if similarity >= threshold => {
                    clusters[c].push(i);
                    let n = clusters[c].len() as f32;
                    for (value, x) in centroids[c].iter_mut().zip(embedding) {
                        *value += (x - *value) / n;
                    }
                }
                _ => {
                    centroids.push(embedding.clone());
                    clusters.push(vec![i]);
                }
            }
        }

        clusters.sort_by(|a, b| b.len().cmp(&a.len()));
        clusters
    }

    /// Class-based TF-IDF term ranking, one ranked list per cluster
    pub fn class_tfidf(
        documents: &[String],
        clusters: &[Vec<usize>],
        stopwords: &StopwordFilter,
    ) -> Vec<Vec<(String, f64)>> {
        let class_counts: Vec<(Vec<String>, HashMap<String, f64>)> = clusters
            .iter()
            .map(|members| {
                let mut order = Vec::new();
                let mut counts: HashMap<String, f64> = HashMap::new();
                for &doc in members {
                    for word in word_tokens(&documents[doc]) {
                        if stopwords.is_stopword(&word) {
                            continue;
                        }
                        let count = counts.entry(word.clone()).or_default();
                        if *count == 0.0 {
                            order.push(word);
                        }
                        *count += 1.0;
                    }
                }
                (order, counts)
            })
            .collect();

        let mut term_totals: HashMap<&str, f64> = HashMap::new();
        let mut total_words = 0.0;
        for (_, counts) in &class_counts {
            for (term, count) in counts {
                *term_totals.entry(term.as_str()).or_default() += count;
                total_words += count;
            }
        }
        let avg_words = total_words / class_counts.len().max(1) as f64;

        class_counts
            .iter()
            .map(|(order, counts)| {
                let class_total: f64 = counts.values().sum::<f64>().max(1.0);
                let mut ranked: Vec<(String, f64)> = order
                    .iter()
                    .map(|term| {
                        let tf = counts[term] / class_total;
                        let idf = (1.0 + avg_words / term_totals[term.as_str()]).ln();
                        (term.clone(), tf * idf)
                    })
                    .collect();
                super::super::rank_descending(&mut ranked);
                ranked
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(n: usize) -> Corpus {
        let mut docs = Vec::new();
        for i in 0..n {
            if i % 4 == 3 {
                docs.push(format!("Stock markets rallied as investors bought shares {}", i));
            } else {
                docs.push(format!("Solar panels and wind turbines generate renewable energy {}", i));
            }
        }
        Corpus::new(docs)
    }

    #[test]
    fn test_unavailable_below_document_threshold() {
        let extractor = TopicExtractor::default();
        assert!(!extractor.is_available(&corpus(9)));
        assert_eq!(extractor.min_documents(), 10);
    }

    #[test]
    fn test_configured_threshold_cannot_go_below_floor() {
        let extractor = TopicExtractor::new(
            TopicConfig {
                min_documents: 3,
                ..Default::default()
            },
            Arc::new(HashingEmbedder::default()),
        );
        assert_eq!(extractor.min_documents(), MIN_TOPIC_DOCUMENTS);
        assert!(!extractor.is_available(&corpus(3)));
        assert!(!extractor.is_available(&corpus(9)));
    }

    #[cfg(feature = "topics")]
    #[test]
    fn test_configured_threshold_can_be_raised() {
        let extractor = TopicExtractor::new(
            TopicConfig {
                min_documents: 15,
                ..Default::default()
            },
            Arc::new(HashingEmbedder::default()),
        );
        assert!(!extractor.is_available(&corpus(12)));
        assert!(extractor.is_available(&corpus(15)));
    }

    #[cfg(feature = "topics")]
    #[test]
    fn test_available_at_threshold() {
        assert!(TopicExtractor::default().is_available(&corpus(10)));
    }

    #[cfg(feature = "topics")]
    #[tokio::test]
    async fn test_extract_uses_largest_topic() {
        let extractor = TopicExtractor::new(
            TopicConfig {
                similarity_threshold: 0.5,
                ..Default::default()
            },
            Arc::new(HashingEmbedder::default()),
        )
        .with_stopwords(StopwordFilter::from_list(&["and", "as"]));
        let output = extractor.extract(&corpus(12)).await.unwrap();

        assert_eq!(output.method, Method::BerTopic);
        assert_eq!(output.len(), 5);
        let phrases = output.phrases();
        assert!(phrases.iter().any(|p| ["solar", "panels", "wind", "turbines", "renewable", "energy", "generate"].contains(p)));
        assert!(!phrases.contains(&"stock"));
    }

    #[cfg(feature = "topics")]
    #[test]
    fn test_cluster_orders_by_size() {
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![0.1, 0.9],
        ];
        let clusters = model::cluster(&embeddings, 0.8);
        assert_eq!(clusters, vec![vec![1, 2, 3], vec![0]]);
    }

    #[cfg(not(feature = "topics"))]
    #[test]
    fn test_compiled_out_never_available() {
        assert!(!TopicExtractor::default().is_available(&corpus(20)));
    }
}
