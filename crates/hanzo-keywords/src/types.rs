//! Keyword, report and log types shared across the pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Extraction method that produced a keyword.
///
/// Variant order is merge precedence: the aggregator walks outputs from
/// `Rake` to `BerTopic`, so the derived `Ord` doubles as the precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "RAKE")]
    Rake,
    #[serde(rename = "RAKE_ALT")]
    RakeAlt,
    #[serde(rename = "KeyBERT")]
    KeyBert,
    #[serde(rename = "YAKE")]
    Yake,
    #[serde(rename = "BERTopic")]
    BerTopic,
}

impl Method {
    /// All methods in merge precedence order
    pub const ALL: [Method; 5] = [
        Method::Rake,
        Method::RakeAlt,
        Method::KeyBert,
        Method::Yake,
        Method::BerTopic,
    ];

    /// Name used in logs, CSV rows and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Rake => "RAKE",
            Method::RakeAlt => "RAKE_ALT",
            Method::KeyBert => "KeyBERT",
            Method::Yake => "YAKE",
            Method::BerTopic => "BERTopic",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the equality key for a phrase: trimmed and lowercased
pub fn normalize_key(phrase: &str) -> String {
    phrase.trim().to_lowercase()
}

/// A single ranked phrase produced by one extraction method.
///
/// The phrase and its normalized key are fixed at construction; a
/// deserialized candidate recomputes the key from the phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CandidateRecord")]
pub struct KeywordCandidate {
    /// Trimmed phrase, case preserved for display
    phrase: String,

    /// Lowercased, trimmed phrase used for duplicate detection
    normalized_key: String,

    /// Method-specific relevance score
    pub score: f64,

    /// Provenance
    pub method: Method,
}

impl KeywordCandidate {
    /// Create a candidate; the normalized key is always derived from the phrase
    pub fn new(phrase: impl AsRef<str>, score: f64, method: Method) -> Self {
        let phrase = phrase.as_ref().trim().to_string();
        let normalized_key = normalize_key(&phrase);
        Self {
            phrase,
            normalized_key,
            score,
            method,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn normalized_key(&self) -> &str {
        &self.normalized_key
    }

    /// Same phrase and score, different provenance
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Two candidates are duplicates when their normalized keys match
    pub fn is_duplicate_of(&self, other: &KeywordCandidate) -> bool {
        self.normalized_key() == other.normalized_key()
    }
}

#[derive(Deserialize)]
struct CandidateRecord {
    phrase: String,
    score: f64,
    method: Method,
}

impl From<CandidateRecord> for KeywordCandidate {
    fn from(record: CandidateRecord) -> Self {
        KeywordCandidate::new(record.phrase, record.score, record.method)
    }
}

/// Ordered output of one adapter, most relevant first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMethodOutput {
    pub method: Method,
    pub candidates: Vec<KeywordCandidate>,
}

impl RankedMethodOutput {
    /// Create an output with no candidates
    pub fn empty(method: Method) -> Self {
        Self {
            method,
            candidates: Vec::new(),
        }
    }

    /// Build an output from `(phrase, score)` pairs already in rank order
    pub fn from_pairs<I, S>(method: Method, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let candidates = pairs
            .into_iter()
            .map(|(phrase, score)| KeywordCandidate::new(phrase, score, method))
            .filter(|candidate| !candidate.phrase().is_empty())
            .collect();
        Self { method, candidates }
    }

    /// Keep only the first `n` candidates
    pub fn truncated(mut self, n: usize) -> Self {
        self.candidates.truncate(n);
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Phrases in rank order
    pub fn phrases(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.phrase()).collect()
    }
}

/// Deduplicated keyword set in first-seen merge order.
///
/// Every instance holds distinct normalized keys. Building one from a plain
/// list (including deserializing) keeps the first candidate for each key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<KeywordCandidate>", into = "Vec<KeywordCandidate>")]
pub struct UniqueKeywordSet {
    candidates: Vec<KeywordCandidate>,
}

impl UniqueKeywordSet {
    pub(crate) fn from_unique(candidates: Vec<KeywordCandidate>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[KeywordCandidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeywordCandidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Look up a candidate by phrase using normalized-key equality
    pub fn get(&self, phrase: &str) -> Option<&KeywordCandidate> {
        let key = normalize_key(phrase);
        self.candidates.iter().find(|c| c.normalized_key() == key)
    }

    /// Methods that contributed at least one keyword, in precedence order
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for candidate in &self.candidates {
            if !methods.contains(&candidate.method) {
                methods.push(candidate.method);
            }
        }
        methods
    }

    /// One log row per keyword for the given run
    pub fn log_rows(&self, run: usize) -> Vec<RunLogRow> {
        self.candidates
            .iter()
            .map(|c| RunLogRow {
                run,
                method: c.method,
                keyword: c.phrase().to_string(),
                score: c.score,
            })
            .collect()
    }
}

impl From<Vec<KeywordCandidate>> for UniqueKeywordSet {
    fn from(candidates: Vec<KeywordCandidate>) -> Self {
        let mut seen = HashSet::new();
        let candidates = candidates
            .into_iter()
            .filter(|c| seen.insert(c.normalized_key.clone()))
            .collect();
        Self { candidates }
    }
}

impl From<UniqueKeywordSet> for Vec<KeywordCandidate> {
    fn from(set: UniqueKeywordSet) -> Self {
        set.candidates
    }
}

impl<'a> IntoIterator for &'a UniqueKeywordSet {
    type Item = &'a KeywordCandidate;
    type IntoIter = std::slice::Iter<'a, KeywordCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// One organic result harvested from a search results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpRecord {
    pub title: String,
    /// Absolute URL, or empty when the link could not be resolved
    pub link: String,
    /// Possibly empty
    pub snippet: String,
}

/// Terminal outcome for one keyword in an interactive pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Operator supplied no reference
    Skipped,
    /// Harvest failed with the given description
    Error(String),
    /// Harvest succeeded; may be empty
    Results(Vec<SerpRecord>),
}

impl Outcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Harvested records, empty for skips and errors
    pub fn records(&self) -> &[SerpRecord] {
        match self {
            Outcome::Results(records) => records,
            _ => &[],
        }
    }
}

/// Per-keyword result of an interactive pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub keyword: KeywordCandidate,
    /// Page reference the operator supplied, if any
    pub reference: Option<String>,
    pub outcome: Outcome,
}

impl KeywordReport {
    pub fn skipped(keyword: KeywordCandidate) -> Self {
        Self {
            keyword,
            reference: None,
            outcome: Outcome::Skipped,
        }
    }

    pub fn error(keyword: KeywordCandidate, reference: String, message: impl Into<String>) -> Self {
        Self {
            keyword,
            reference: Some(reference),
            outcome: Outcome::Error(message.into()),
        }
    }

    pub fn results(keyword: KeywordCandidate, reference: String, records: Vec<SerpRecord>) -> Self {
        Self {
            keyword,
            reference: Some(reference),
            outcome: Outcome::Results(records),
        }
    }
}

/// Row of the persisted keyword log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogRow {
    pub run: usize,
    pub method: Method,
    pub keyword: String,
    pub score: f64,
}

/// Operator-supplied input documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    documents: Vec<String>,
}

impl Corpus {
    /// Build a corpus, trimming documents and dropping empty ones
    pub fn new<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = documents
            .into_iter()
            .map(|d| d.as_ref().trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        Self { documents }
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Number of input documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents joined with single spaces, in input order
    pub fn combined(&self) -> String {
        self.documents.join(" ")
    }
}
