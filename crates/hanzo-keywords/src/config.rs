//! Pipeline configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration for a keyword pipeline invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub rake: RakeConfig,
    pub keybert: KeyBertConfig,
    pub yake: YakeConfig,
    pub topics: TopicConfig,
    pub embedder: EmbedderConfig,
    pub browser: BrowserConfig,
    pub harvest: HarvestConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load a config from a TOML file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write the config as pretty TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Override the directory all reports are written to
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.directory = dir.into();
        self
    }

    /// Override the per-page result limit
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.harvest.max_results = max_results;
        self
    }

    /// Override the post-render pause
    pub fn with_page_wait(mut self, secs: u64) -> Self {
        self.harvest.page_wait_secs = secs;
        self
    }
}

/// RAKE extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RakeConfig {
    /// Punctuation characters kept inside phrases instead of splitting them
    pub kept_punctuation: String,
    /// Stop word language
    pub language: String,
    /// Size of the primary slice (tagged RAKE)
    pub primary_count: usize,
    /// Size of the alternate slice (tagged RAKE_ALT)
    pub alternate_count: usize,
}

impl Default for RakeConfig {
    fn default() -> Self {
        Self {
            kept_punctuation: "&".to_string(),
            language: "en".to_string(),
            primary_count: 5,
            alternate_count: 5,
        }
    }
}

/// KeyBERT-style extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBertConfig {
    pub enabled: bool,
    pub top_n: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub language: String,
}

impl Default for KeyBertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_n: 5,
            ngram_min: 1,
            ngram_max: 4,
            language: "en".to_string(),
        }
    }
}

/// YAKE-style extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YakeConfig {
    pub enabled: bool,
    pub max_ngram: usize,
    pub top_n: usize,
    /// Co-occurrence window for the relatedness feature
    pub window: usize,
    pub language: String,
}

impl Default for YakeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_ngram: 3,
            top_n: 5,
            window: 1,
            language: "en".to_string(),
        }
    }
}

/// Topic-model extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub enabled: bool,
    /// Minimum number of input documents before a topic model is fitted;
    /// values below 10 are raised to 10
    pub min_documents: usize,
    pub top_n: usize,
    /// Cosine similarity needed to join an existing cluster
    pub similarity_threshold: f32,
    pub language: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_documents: 10,
            top_n: 5,
            similarity_threshold: 0.2,
            language: "en".to_string(),
        }
    }
}

/// Which embedding backend KeyBERT and the topic model use
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum EmbedderConfig {
    /// Deterministic hashed bag-of-words, no network
    Hashing { dimensions: usize },
    /// OpenAI-compatible `/embeddings` endpoint
    Remote {
        url: String,
        model: String,
        /// Environment variable holding the bearer token
        api_key_env: Option<String>,
        timeout_secs: u64,
    },
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        EmbedderConfig::Hashing { dimensions: 512 }
    }
}

/// Page rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Page load ceiling in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: format!(
                "Mozilla/5.0 (compatible; HanzoKeywords/{}; +https://hanzo.ai)",
                env!("CARGO_PKG_VERSION")
            ),
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

/// Result-page harvesting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub max_results: usize,
    /// Organic result container
    pub container_selector: String,
    pub title_selector: String,
    /// First anchor matching this selector is the result link
    pub link_selector: String,
    /// Tried in order; empty snippet when none match
    pub snippet_selectors: Vec<String>,
    /// Rendered markup of the last harvested page is written here
    pub debug_path: PathBuf,
    /// Best-effort pause after rendering, before extraction
    pub page_wait_secs: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            container_selector: "div.tF2Cxc".to_string(),
            title_selector: "h3".to_string(),
            link_selector: ".yuRUbf > a".to_string(),
            snippet_selectors: vec!["div.VwiC3b".to_string(), "div.IsZvec".to_string()],
            debug_path: PathBuf::from("last_serp.html"),
            page_wait_secs: 0,
        }
    }
}

/// Report file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub keyword_log: String,
    pub alternatives_report: String,
    pub serp_report: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            keyword_log: "keyword_log.csv".to_string(),
            alternatives_report: "keyword_alternatives_multi.txt".to_string(),
            serp_report: "keyword_serp_multi.txt".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn keyword_log_path(&self) -> PathBuf {
        self.directory.join(&self.keyword_log)
    }

    pub fn alternatives_path(&self) -> PathBuf {
        self.directory.join(&self.alternatives_report)
    }

    pub fn serp_path(&self) -> PathBuf {
        self.directory.join(&self.serp_report)
    }
}
