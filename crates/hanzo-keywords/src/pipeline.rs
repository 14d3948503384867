//! End-to-end keyword pipeline: extract, merge, log, harvest

use crate::aggregate::Aggregator;
use crate::browser::Browser;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extractors::{
    build_embedder, KeyBertExtractor, KeywordExtractor, RakeExtractor, TopicExtractor,
    YakeExtractor,
};
use crate::harvest::PageHarvester;
use crate::report::ReportWriter;
use crate::session::{InteractiveSession, OperatorPort};
use crate::types::{Corpus, KeywordReport, Method, RankedMethodOutput, UniqueKeywordSet};
use std::io::Write;
use tracing::{info, warn};

/// What one run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run: usize,
    pub keywords: UniqueKeywordSet,
    pub reports: Vec<KeywordReport>,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    pub fn errors(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_error()).count()
    }

    pub fn records(&self) -> usize {
        self.reports.iter().map(|r| r.outcome.records().len()).sum()
    }
}

/// Keyword extraction and harvesting pipeline
pub struct KeywordPipeline {
    config: PipelineConfig,
    extractors: Vec<Box<dyn KeywordExtractor>>,
    aggregator: Aggregator,
}

impl KeywordPipeline {
    /// Build the pipeline with every extractor the configuration describes
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let embedder = build_embedder(&config.embedder)?;
        let extractors: Vec<Box<dyn KeywordExtractor>> = vec![
            Box::new(RakeExtractor::new(&config.rake)),
            Box::new(KeyBertExtractor::new(&config.keybert, embedder.clone())),
            Box::new(YakeExtractor::new(config.yake.clone())),
            Box::new(TopicExtractor::new(config.topics.clone(), embedder)),
        ];
        Ok(Self::with_extractors(config, extractors))
    }

    /// Build the pipeline around a custom set of extractors
    pub fn with_extractors(config: PipelineConfig, extractors: Vec<Box<dyn KeywordExtractor>>) -> Self {
        Self {
            config,
            extractors,
            aggregator: Aggregator::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every available extractor in turn.
    ///
    /// Unavailable extractors are skipped and failing ones contribute an
    /// empty output. RAKE output is split into primary and alternate slices.
    pub async fn extract(&self, corpus: &Corpus) -> Vec<RankedMethodOutput> {
        let mut outputs = Vec::new();
        for extractor in &self.extractors {
            let method = extractor.method();
            if !extractor.is_available(corpus) {
                info!(%method, documents = corpus.len(), "extractor unavailable, skipping");
                continue;
            }

            let output = match extractor.extract(corpus).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(%method, error = %e, "extractor failed, continuing without it");
                    RankedMethodOutput::empty(method)
                }
            };

            if method == Method::Rake {
                let (primary, alternate) = self.aggregator.split_rake(
                    output,
                    self.config.rake.primary_count,
                    self.config.rake.alternate_count,
                );
                info!(keywords = ?primary.phrases(), "RAKE primary keywords");
                outputs.push(primary);
                outputs.push(alternate);
            } else {
                info!(%method, keywords = ?output.phrases(), "extracted keywords");
                outputs.push(output);
            }
        }
        outputs
    }

    /// Extract and merge into the run's unique keyword set
    pub async fn unique_keywords(&self, corpus: &Corpus) -> UniqueKeywordSet {
        let outputs = self.extract(corpus).await;
        self.aggregator.aggregate(&outputs)
    }

    /// Run the full pipeline `runs` times.
    ///
    /// The browsing session is opened once per run and closed on every exit
    /// path. Failing to open it is the only error that aborts a run.
    pub async fn run<B, O, W>(
        &self,
        corpus: &Corpus,
        runs: usize,
        browser: &B,
        operator: &mut O,
        writer: &mut ReportWriter<W>,
    ) -> Result<Vec<RunSummary>>
    where
        B: Browser + ?Sized,
        O: OperatorPort + ?Sized,
        W: Write,
    {
        let mut summaries = Vec::with_capacity(runs);
        for run in 1..=runs {
            info!(run, runs, "starting run");
            let keywords = self.unique_keywords(corpus).await;
            writer.write_keyword_log(run, &keywords)?;
            writer.write_alternatives(run, &keywords)?;

            let session = browser.open().await?;
            let reports = match PageHarvester::new(session.as_ref(), &self.config.harvest) {
                Ok(harvester) => Ok(InteractiveSession::new(&harvester, &mut *operator)
                    .run(&keywords)
                    .await),
                Err(e) => Err(e),
            };
            if let Err(e) = session.close().await {
                warn!(run, error = %e, "failed to close browsing session");
            }
            let reports = reports?;

            writer.write_serp(run, &reports)?;
            writer.flush()?;

            let summary = RunSummary {
                run,
                keywords,
                reports,
            };
            info!(
                run,
                keywords = summary.keywords.len(),
                skipped = summary.skipped(),
                errors = summary.errors(),
                records = summary.records(),
                "run complete"
            );
            summaries.push(summary);
        }
        Ok(summaries)
    }
}
