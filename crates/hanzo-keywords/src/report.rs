//! Persisted keyword log and human-readable reports

use crate::config::OutputConfig;
use crate::error::Result;
use crate::types::{KeywordReport, Outcome, UniqueKeywordSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Writes the keyword CSV log, the alternatives report and the SERP report.
///
/// All three files are truncated when the writer is created and appended to
/// run by run.
pub struct ReportWriter<W: Write = BufWriter<File>> {
    log: csv::Writer<W>,
    alternatives: W,
    serp: W,
}

impl ReportWriter<BufWriter<File>> {
    /// Create (truncate) the report files named in `config`
    pub fn create(config: &OutputConfig) -> Result<Self> {
        fs::create_dir_all(&config.directory)?;
        let open = |path: std::path::PathBuf| -> Result<BufWriter<File>> {
            Ok(BufWriter::new(File::create(path)?))
        };
        Self::from_writers(
            open(config.keyword_log_path())?,
            open(config.alternatives_path())?,
            open(config.serp_path())?,
        )
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wrap arbitrary sinks; the CSV header is written immediately
    pub fn from_writers(log: W, alternatives: W, serp: W) -> Result<Self> {
        let mut log = csv::Writer::from_writer(log);
        log.write_record(["run", "method", "keyword", "score"])?;
        Ok(Self {
            log,
            alternatives,
            serp,
        })
    }

    /// Append one CSV row per keyword of the run
    pub fn write_keyword_log(&mut self, run: usize, keywords: &UniqueKeywordSet) -> Result<()> {
        for row in keywords.log_rows(run) {
            self.log.write_record([
                row.run.to_string(),
                row.method.to_string(),
                row.keyword,
                row.score.to_string(),
            ])?;
        }
        Ok(())
    }

    /// Append the run's keywords grouped under their originating method
    pub fn write_alternatives(&mut self, run: usize, keywords: &UniqueKeywordSet) -> Result<()> {
        writeln!(self.alternatives, "=== Run {} ===", run)?;
        for (i, method) in keywords.methods().into_iter().enumerate() {
            if i > 0 {
                writeln!(self.alternatives)?;
            }
            writeln!(self.alternatives, "{} keywords (phrase + score):", method)?;
            for candidate in keywords.iter().filter(|c| c.method == method) {
                writeln!(
                    self.alternatives,
                    "- {} (score: {})",
                    candidate.phrase(), candidate.score
                )?;
            }
        }
        if keywords.is_empty() {
            writeln!(self.alternatives, "No keywords extracted.")?;
        }
        writeln!(self.alternatives, "\n{}", rule())?;
        Ok(())
    }

    /// Append the run's per-keyword harvest outcomes
    pub fn write_serp(&mut self, run: usize, reports: &[KeywordReport]) -> Result<()> {
        writeln!(self.serp, "=== Run {} ===", run)?;
        for report in reports {
            let reference = report.reference.as_deref().unwrap_or_default();
            writeln!(self.serp, "Keyword: {}", report.keyword.phrase())?;
            match &report.outcome {
                Outcome::Skipped => {
                    writeln!(self.serp, "    [Skipped]")?;
                }
                Outcome::Error(message) => {
                    writeln!(self.serp, "  Error scraping SERP for {}: {}", reference, message)?;
                }
                Outcome::Results(records) => {
                    if records.is_empty() {
                        writeln!(self.serp, "  No SERP results found for {}.", reference)?;
                    }
                    for record in records {
                        writeln!(
                            self.serp,
                            "- {}\n  {}\n  {}",
                            record.title, record.snippet, record.link
                        )?;
                    }
                }
            }
            writeln!(self.serp, "{}", rule())?;
        }
        Ok(())
    }

    /// Flush every sink; called at the end of each run
    pub fn flush(&mut self) -> Result<()> {
        self.log.flush()?;
        self.alternatives.flush()?;
        self.serp.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying sinks
    pub fn into_inner(mut self) -> Result<(W, W, W)> {
        self.flush()?;
        let log = self
            .log
            .into_inner()
            .map_err(|e| crate::KeywordError::Io(e.into_error()))?;
        Ok((log, self.alternatives, self.serp))
    }
}
