//! Keyword extraction adapters
//!
//! Every extraction method sits behind [`KeywordExtractor`]. Optional methods
//! (YAKE, the topic model) are always constructible; when their feature is
//! compiled out or their preconditions are not met they simply report
//! `is_available() == false` and the pipeline skips them.

pub mod embed;
pub mod keybert;
pub mod rake;
pub mod topic;
pub mod yake;

pub use embed::{build_embedder, cosine_similarity, Embedder, HashingEmbedder};
#[cfg(feature = "remote-embeddings")]
pub use embed::RemoteEmbedder;
pub use keybert::KeyBertExtractor;
pub use rake::RakeExtractor;
pub use topic::{TopicExtractor, MIN_TOPIC_DOCUMENTS};
pub use yake::YakeExtractor;

use crate::error::Result;
use crate::types::{Corpus, Method, RankedMethodOutput};

/// Common trait for all keyword extraction methods
#[async_trait::async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// Provenance tag for every candidate this extractor yields
    fn method(&self) -> Method;

    /// Whether this extractor can run on the given corpus
    fn is_available(&self, corpus: &Corpus) -> bool;

    /// Rank candidate phrases, most relevant first
    async fn extract(&self, corpus: &Corpus) -> Result<RankedMethodOutput>;
}

/// Sort `(phrase, score)` pairs by descending score, keeping input order on ties
pub(crate) fn rank_descending(pairs: &mut [(String, f64)]) {
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}
