//! Extract keywords from free text and harvest search results for each one
//!
//! Usage:
//!   keyword-serp --text "Cats and dogs are great pets." --runs 2
//!   keyword-serp --input notes.txt --output-dir ./out --max-results 10

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Input};
use hanzo_keywords::{
    ConsoleOperator, Corpus, HttpBrowser, KeywordPipeline, PipelineConfig, ReportWriter,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "keyword-serp")]
#[command(about = "Multi-method keyword extraction with operator-guided SERP harvesting")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of extraction and harvest runs
    #[arg(short, long)]
    runs: Option<usize>,

    /// Input text; repeat for several documents
    #[arg(short, long = "text")]
    texts: Vec<String>,

    /// File with one document per non-empty line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for the keyword log and reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum result records per keyword
    #[arg(short, long)]
    max_results: Option<usize>,
}

fn prompt_texts(theme: &ColorfulTheme) -> Result<Vec<String>> {
    let count: usize = Input::with_theme(theme)
        .with_prompt("How many texts do you want to analyze?")
        .validate_with(|n: &usize| if *n > 0 { Ok(()) } else { Err("enter a positive number") })
        .interact_text()?;

    let mut texts = Vec::with_capacity(count);
    for i in 1..=count {
        let text: String = Input::with_theme(theme)
            .with_prompt(format!("Text {}", i))
            .validate_with(|t: &String| {
                if t.trim().is_empty() {
                    Err("text cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        texts.push(text);
    }
    Ok(texts)
}

fn prompt_runs(theme: &ColorfulTheme) -> Result<usize> {
    let answer: String = Input::with_theme(theme)
        .with_prompt("How many times should the pipeline run?")
        .default("1".to_string())
        .interact_text()?;
    Ok(answer.trim().parse().ok().filter(|n| *n > 0).unwrap_or(1))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let theme = ColorfulTheme::default();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(max_results) = args.max_results {
        config = config.with_max_results(max_results);
    }

    let mut texts = args.texts;
    if let Some(path) = &args.input {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        texts.extend(content.lines().map(str::to_string));
    }
    let corpus = if texts.iter().any(|t| !t.trim().is_empty()) {
        Corpus::new(texts)
    } else {
        Corpus::new(prompt_texts(&theme)?)
    };

    let runs = match args.runs {
        Some(runs) => runs.max(1),
        None => prompt_runs(&theme)?,
    };

    info!(documents = corpus.len(), runs, "starting keyword pipeline");

    let pipeline = KeywordPipeline::new(config.clone()).context("failed to build pipeline")?;
    let mut writer = ReportWriter::create(&config.output).with_context(|| {
        format!("failed to create reports in {}", config.output.directory.display())
    })?;
    let browser = HttpBrowser::new(config.browser.clone());
    let mut operator = ConsoleOperator::new();

    let summaries = pipeline
        .run(&corpus, runs, &browser, &mut operator, &mut writer)
        .await
        .context("pipeline run failed")?;

    for summary in &summaries {
        println!(
            "Run {}: {} keywords, {} skipped, {} errors, {} results",
            summary.run,
            summary.keywords.len(),
            summary.skipped(),
            summary.errors(),
            summary.records()
        );
    }
    println!("\nKeyword log: {}", config.output.keyword_log_path().display());
    println!("Alternatives: {}", config.output.alternatives_path().display());
    println!("SERP report: {}", config.output.serp_path().display());
    Ok(())
}
