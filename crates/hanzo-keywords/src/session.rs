//! Operator-driven harvesting, one keyword at a time
//!
//! ```text
//! AwaitingReference ──(empty)──────────────► Skipped
//!        │
//!        └──(reference)──► Harvesting ──ok──► Harvested
//!                               │
//!                               └──err─────► ErrorState
//! ```
//!
//! The machine is re-entered for every keyword, strictly in order. Every
//! keyword ends in exactly one terminal state and yields exactly one report.

use crate::error::Result;
use crate::harvest::Harvest;
use crate::types::{KeywordCandidate, KeywordReport, UniqueKeywordSet};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// States of a single keyword pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingReference,
    Skipped,
    Harvesting,
    Harvested,
    ErrorState,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Skipped | SessionState::Harvested | SessionState::ErrorState
        )
    }
}

/// Input/output port to the human operator
pub trait OperatorPort: Send {
    /// Ask for a result-page reference for `keyword`; `None` or blank means skip
    fn request_reference(&mut self, keyword: &KeywordCandidate) -> Result<Option<String>>;

    /// Show a progress or status message
    fn notify(&mut self, message: &str);
}

/// Interactive terminal operator
pub struct ConsoleOperator {
    theme: ColorfulTheme,
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl OperatorPort for ConsoleOperator {
    fn request_reference(&mut self, keyword: &KeywordCandidate) -> Result<Option<String>> {
        println!();
        println!(
            "{} {}",
            style("[!] Search for this keyword:").bold(),
            style(format!("'{}'", keyword.phrase())).cyan()
        );
        println!("    1. Open your browser and search this keyword.");
        println!("    2. Copy the URL of the results page (or save the page to disk).");
        let reference: String = Input::with_theme(&self.theme)
            .with_prompt("    3. Paste the URL or file path here (Enter to skip)")
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(reference))
    }

    fn notify(&mut self, message: &str) {
        println!("    {}", style(message).dim());
    }
}

/// Operator that replays canned answers, one per keyword.
///
/// Once the queue runs dry every further keyword is skipped.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<Option<String>>,
    /// Keywords asked about, in order
    pub asked: Vec<String>,
    /// Messages shown, in order
    pub messages: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            asked: Vec::new(),
            messages: Vec::new(),
        }
    }
}

impl OperatorPort for ScriptedOperator {
    fn request_reference(&mut self, keyword: &KeywordCandidate) -> Result<Option<String>> {
        self.asked.push(keyword.phrase().to_string());
        Ok(self.answers.pop_front().flatten())
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Drives one harvest pass per keyword through an operator port
pub struct InteractiveSession<'a, H: Harvest + ?Sized, O: OperatorPort + ?Sized> {
    harvester: &'a H,
    operator: &'a mut O,
    state: SessionState,
}

impl<'a, H: Harvest + ?Sized, O: OperatorPort + ?Sized> InteractiveSession<'a, H, O> {
    pub fn new(harvester: &'a H, operator: &'a mut O) -> Self {
        Self {
            harvester,
            operator,
            state: SessionState::AwaitingReference,
        }
    }

    /// State reached by the most recent step
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState, keyword: &KeywordCandidate) {
        debug!(keyword = %keyword.phrase(), from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }

    /// Process a single keyword to a terminal state
    pub async fn step(&mut self, keyword: &KeywordCandidate) -> KeywordReport {
        self.state = SessionState::AwaitingReference;

        let reference = match self.operator.request_reference(keyword) {
            Ok(reference) => reference
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            Err(e) => {
                warn!(keyword = %keyword.phrase(), error = %e, "operator input failed, skipping keyword");
                None
            }
        };

        let Some(reference) = reference else {
            self.transition(SessionState::Skipped, keyword);
            self.operator.notify("[Skipped!]");
            return KeywordReport::skipped(keyword.clone());
        };

        self.transition(SessionState::Harvesting, keyword);
        self.operator.notify("Loading the results page...");

        match self.harvester.harvest(&reference).await {
            Ok(records) => {
                self.transition(SessionState::Harvested, keyword);
                self.operator
                    .notify(&format!("Done! {} result(s) saved.", records.len()));
                KeywordReport::results(keyword.clone(), reference, records)
            }
            Err(e) => {
                self.transition(SessionState::ErrorState, keyword);
                warn!(keyword = %keyword.phrase(), reference = %reference, error = %e, "harvest failed");
                self.operator.notify(&format!("Error scraping results: {}", e));
                KeywordReport::error(keyword.clone(), reference, e.to_string())
            }
        }
    }

    /// Process every keyword in order; one report per keyword
    pub async fn run(&mut self, keywords: &UniqueKeywordSet) -> Vec<KeywordReport> {
        let mut reports = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            reports.push(self.step(keyword).await);
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::error::KeywordError;
    use crate::types::{Method, Outcome, RankedMethodOutput, SerpRecord};

    struct FakeHarvester;

    #[async_trait::async_trait]
    impl Harvest for FakeHarvester {
        async fn harvest(&self, reference: &str) -> Result<Vec<SerpRecord>> {
            match reference {
                "boom" => Err(KeywordError::Network("connection reset".to_string())),
                "empty" => Ok(vec![]),
                other => Ok(vec![SerpRecord {
                    title: format!("Result for {}", other),
                    link: other.to_string(),
                    snippet: String::new(),
                }]),
            }
        }
    }

    fn keywords(phrases: &[&str]) -> UniqueKeywordSet {
        let output = RankedMethodOutput::from_pairs(
            Method::Rake,
            phrases.iter().map(|p| (*p, 1.0)),
        );
        Aggregator::new().aggregate(&[output])
    }

    #[tokio::test]
    async fn test_empty_reference_is_skipped() {
        let mut operator = ScriptedOperator::new([Some("   ")]);
        let mut session = InteractiveSession::new(&FakeHarvester, &mut operator);
        let report = session.step(&KeywordCandidate::new("cats", 1.0, Method::Rake)).await;

        assert_eq!(report.outcome, Outcome::Skipped);
        assert!(report.outcome.records().is_empty());
        assert_eq!(session.state(), SessionState::Skipped);
    }

    #[tokio::test]
    async fn test_harvest_error_is_recorded() {
        let mut operator = ScriptedOperator::new([Some("boom")]);
        let mut session = InteractiveSession::new(&FakeHarvester, &mut operator);
        let report = session.step(&KeywordCandidate::new("cats", 1.0, Method::Rake)).await;

        assert!(matches!(&report.outcome, Outcome::Error(msg) if msg.contains("connection reset")));
        assert_eq!(report.reference.as_deref(), Some("boom"));
        assert_eq!(session.state(), SessionState::ErrorState);
    }

    #[tokio::test]
    async fn test_empty_results_differ_from_skip() {
        let mut operator = ScriptedOperator::new([Some("empty")]);
        let mut session = InteractiveSession::new(&FakeHarvester, &mut operator);
        let report = session.step(&KeywordCandidate::new("cats", 1.0, Method::Rake)).await;

        assert_eq!(report.outcome, Outcome::Results(vec![]));
        assert_eq!(session.state(), SessionState::Harvested);
    }

    #[tokio::test]
    async fn test_run_reports_every_keyword_in_order() {
        let set = keywords(&["alpha", "beta", "gamma", "delta"]);
        let mut operator = ScriptedOperator::new([
            Some("https://a.example"),
            None,
            Some("boom"),
        ]);
        let reports = InteractiveSession::new(&FakeHarvester, &mut operator)
            .run(&set)
            .await;

        assert_eq!(reports.len(), set.len());
        let phrases: Vec<&str> = reports.iter().map(|r| r.keyword.phrase()).collect();
        assert_eq!(phrases, vec!["alpha", "beta", "gamma", "delta"]);
        assert_eq!(reports[0].outcome.records().len(), 1);
        assert!(reports[1].outcome.is_skipped());
        assert!(reports[2].outcome.is_error());
        // script exhausted
        assert!(reports[3].outcome.is_skipped());
        assert_eq!(operator.asked, vec!["alpha", "beta", "gamma", "delta"]);
    }

    struct BrokenOperator;

    impl OperatorPort for BrokenOperator {
        fn request_reference(&mut self, _keyword: &KeywordCandidate) -> Result<Option<String>> {
            Err(KeywordError::Operator("stdin closed".to_string()))
        }

        fn notify(&mut self, _message: &str) {}
    }

    #[tokio::test]
    async fn test_operator_failure_skips_keyword() {
        let mut operator = BrokenOperator;
        let mut session = InteractiveSession::new(&FakeHarvester, &mut operator);
        let report = session.step(&KeywordCandidate::new("cats", 1.0, Method::Rake)).await;
        assert!(report.outcome.is_skipped());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::AwaitingReference.is_terminal());
        assert!(!SessionState::Harvesting.is_terminal());
        assert!(SessionState::Skipped.is_terminal());
        assert!(SessionState::ErrorState.is_terminal());
    }
}
