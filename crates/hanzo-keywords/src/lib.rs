//! # Hanzo Keywords
//!
//! Multi-method keyword extraction with operator-guided search result harvesting.
//!
//! Several independent extractors (RAKE, KeyBERT-style embedding similarity,
//! YAKE-style statistics, a BERTopic-style topic model) rank candidate phrases
//! from free text. Their outputs are merged into one deduplicated keyword set
//! with stable provenance, and an interactive session then pairs each keyword
//! with an operator-supplied results page and harvests its organic results.
//!
//! ## Features
//!
//! - **`yake`**: YAKE-style extractor (default)
//! - **`topics`**: topic-model extractor, needs at least 10 input documents (default)
//! - **`remote-embeddings`**: OpenAI-compatible embedding endpoint for the semantic extractors
//!
//! ## Example
//!
//! ```rust,ignore
//! use hanzo_keywords::{Corpus, KeywordPipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = KeywordPipeline::new(PipelineConfig::default())?;
//!     let corpus = Corpus::new(["Cats and dogs are great pets."]);
//!     for keyword in &pipeline.unique_keywords(&corpus).await {
//!         println!("{} ({}, {})", keyword.phrase(), keyword.method, keyword.score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐     ┌──────────────┐     ┌────────────┐     ┌──────────────────┐
//! │  Corpus  │ ──► │  Extractors  │ ──► │ Aggregator │ ──► │ UniqueKeywordSet │
//! └──────────┘     └──────────────┘     └────────────┘     └──────────────────┘
//!                                                                   │
//!                  ┌──────────────┐     ┌─────────────────────┐     ▼
//!                  │ PageHarvester│ ◄── │ InteractiveSession  │ ◄── keyword
//!                  └──────────────┘     └─────────────────────┘
//!                          │                       │
//!                          ▼                       ▼
//!                  BrowsingSession           ReportWriter
//! ```

pub mod aggregate;
pub mod browser;
pub mod config;
pub mod error;
pub mod extractors;
pub mod harvest;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod text;
pub mod types;

#[cfg(test)]
mod testing;

pub use aggregate::Aggregator;
pub use browser::{Browser, BrowsingSession, HttpBrowser, RenderedPage};
pub use config::PipelineConfig;
pub use error::{KeywordError, Result};
pub use extractors::KeywordExtractor;
pub use harvest::{Harvest, PageHarvester};
pub use pipeline::{KeywordPipeline, RunSummary};
pub use report::ReportWriter;
pub use session::{ConsoleOperator, InteractiveSession, OperatorPort, ScriptedOperator, SessionState};
pub use types::{
    Corpus, KeywordCandidate, KeywordReport, Method, Outcome, RankedMethodOutput, RunLogRow,
    SerpRecord, UniqueKeywordSet,
};
