//! Text embedding backends used by the semantic extractors

use crate::config::EmbedderConfig;
use crate::error::Result;
#[cfg(not(feature = "remote-embeddings"))]
use crate::error::KeywordError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Turns texts into fixed-size vectors
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every text; the output has one vector per input, in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Build the embedder selected in configuration
pub fn build_embedder(config: &EmbedderConfig) -> Result<Arc<dyn Embedder>> {
    match config {
        EmbedderConfig::Hashing { dimensions } => Ok(Arc::new(HashingEmbedder::new(*dimensions))),
        #[cfg(feature = "remote-embeddings")]
        EmbedderConfig::Remote {
            url,
            model,
            api_key_env,
            timeout_secs,
        } => {
            let api_key = api_key_env.as_ref().and_then(|var| std::env::var(var).ok());
            Ok(Arc::new(RemoteEmbedder::new(url, model, api_key, *timeout_secs)?))
        }
        #[cfg(not(feature = "remote-embeddings"))]
        EmbedderConfig::Remote { .. } => Err(KeywordError::Embedding(
            "remote embeddings require the `remote-embeddings` feature".to_string(),
        )),
    }
}

/// Cosine similarity, zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Deterministic local embedder.
///
/// Words and character trigrams of each word are hashed into buckets and the
/// resulting count vector is L2-normalised. Phrases sharing words or word
/// fragments with a document land close to it.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(512)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a single text synchronously
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in crate::text::word_tokens(text) {
            vector[self.bucket(&word)] += 1.0;
            let padded: Vec<char> = format!("<{}>", word).chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                vector[self.bucket(&gram)] += 0.5;
            }
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }

    fn bucket(&self, feature: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() % self.dimensions as u64) as usize
    }
}

#[async_trait::async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(feature = "remote-embeddings")]
pub use remote::RemoteEmbedder;

#[cfg(feature = "remote-embeddings")]
mod remote {
    use super::Embedder;
    use crate::error::{KeywordError, Result};
    use reqwest::header::CONTENT_TYPE;
    use reqwest::Client;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Serialize)]
    struct EmbeddingRequest<'a> {
        model: &'a str,
        input: &'a [String],
    }

    #[derive(Deserialize)]
    struct EmbeddingResponse {
        data: Vec<EmbeddingData>,
    }

    #[derive(Deserialize)]
    struct EmbeddingData {
        index: usize,
        embedding: Vec<f32>,
    }

    /// Embedder backed by an OpenAI-compatible `/embeddings` endpoint
    pub struct RemoteEmbedder {
        client: Client,
        url: String,
        model: String,
        api_key: Option<String>,
    }

    impl RemoteEmbedder {
        pub fn new(url: &str, model: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
            url::Url::parse(url)?;
            let client = Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| KeywordError::Embedding(e.to_string()))?;
            Ok(Self {
                client,
                url: url.to_string(),
                model: model.to_string(),
                api_key,
            })
        }
    }

    #[async_trait::async_trait]
    impl Embedder for RemoteEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let payload = serde_json::to_vec(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .map_err(|e| KeywordError::Embedding(e.to_string()))?;

            let mut request = self
                .client
                .post(&self.url)
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| KeywordError::Embedding(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(KeywordError::Embedding(format!(
                    "embedding endpoint returned {}",
                    status
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| KeywordError::Embedding(e.to_string()))?;
            let mut body: EmbeddingResponse = serde_json::from_slice(&bytes)
                .map_err(|e| KeywordError::Embedding(format!("invalid embedding response: {}", e)))?;
            if body.data.len() != texts.len() {
                return Err(KeywordError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    body.data.len()
                )));
            }
            body.data.sort_by_key(|d| d.index);
            Ok(body.data.into_iter().map(|d| d.embedding).collect())
        }
    }
}
