//! Operator CLI for the climatech analysis engine.
//!
//! ```text
//! climatech analyze https://diario.com/nota
//! climatech --corpus newsletters.json batch urls.txt
//! climatech --offline chat
//! ```

mod backend;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use climatech::{
    Analyzer, ClassificationMode, EngineConfig, HttpReferenceStore, MemoryFeedbackStore,
    MemoryReferenceStore, ReferenceStore, Summarizer,
};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backend::Backend;

#[derive(Parser)]
#[command(name = "climatech")]
#[command(about = "Analyze news articles and match them against the newsletter corpus")]
struct Cli {
    /// Classify with the local keyword list and make no model calls
    #[arg(long, global = true)]
    offline: bool,

    /// Reference corpus as a JSON array of newsletters
    #[arg(long, global = true, value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Backend serving /api/Newsletter (overrides CLIMATECH_BACKEND_URL)
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,

    /// Negative examples and rejection reasons as JSON
    #[arg(long, global = true, value_name = "FILE")]
    feedback: Option<PathBuf>,

    /// Embedding cache file (overrides CLIMATECH_CACHE_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one article
    Analyze { url: String },

    /// Extract and summarize an article without classification or matching
    Summarize { url: String },

    /// Match a text against the corpus
    Match {
        /// Text to match
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// File holding the text to match
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Analyze every URL in a file, one per line
    Batch { file: PathBuf },

    /// Interactive loop: paste a link or a text, `exit` to quit
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,climatech=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = EngineConfig::from_env().context("Failed to load configuration")?;
    if let Some(path) = &cli.cache {
        config = config.with_cache_path(path);
    }
    if let Some(url) = &cli.backend_url {
        config.backend_url = Some(url.clone());
    }

    let backend = Backend::connect(&config, cli.offline)
        .context("Failed to configure the generative backend (set OPENAI_API_KEY or pass --offline)")?;
    let corpus = corpus(&cli, &config)?;

    let mut analyzer = Analyzer::new(Arc::new(backend), config.clone(), corpus.clone())
        .context("Failed to create analyzer")?;
    if cli.offline {
        analyzer = analyzer.with_classification(ClassificationMode::Keywords);
    }
    if let Some(path) = &cli.feedback {
        let feedback = MemoryFeedbackStore::from_json_file(path)
            .with_context(|| format!("Failed to read feedback from {}", path.display()))?;
        analyzer = analyzer.with_feedback(Arc::new(feedback));
    }

    let result = run(&cli, &analyzer, corpus.as_ref(), &config).await;

    if let Err(e) = analyzer.flush().await {
        tracing::warn!(error = %e, "Failed to persist embedding cache");
    }
    result
}

async fn run(
    cli: &Cli,
    analyzer: &Analyzer<Backend>,
    corpus: &dyn ReferenceStore,
    config: &EngineConfig,
) -> Result<()> {
    match &cli.command {
        Commands::Analyze { url } => {
            let analysis = analyzer.analyze_article(url).await?;
            if cli.json {
                render::json(&analysis)?;
            } else {
                render::analysis(&analysis);
            }
        }
        Commands::Summarize { url } => {
            let result = analyzer.extract_and_summarize(url).await?;
            if cli.json {
                render::json(&result)?;
            } else {
                render::summary(&result);
            }
        }
        Commands::Match { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => read_text(path)?,
                (None, None) => bail!("pass --text or --file"),
            };
            let summary = Summarizer::new(config.summarizer.clone()).summarize(&text);
            let documents = corpus
                .reference_documents()
                .await
                .context("Failed to load reference documents")?;
            let outcome = analyzer
                .match_against_corpus(&summary.text(), &documents)
                .await;
            if cli.json {
                render::json(&outcome)?;
            } else {
                render::outcome(&outcome);
            }
        }
        Commands::Batch { file } => {
            let urls = read_urls(file)?;
            let report = analyzer.analyze_batch(&urls).await;
            if cli.json {
                render::json(&report)?;
            } else {
                render::batch(&report);
            }
        }
        Commands::Chat => chat(analyzer, cli.json).await?,
    }
    Ok(())
}

/// Corpus file, then backend URL, then an empty corpus.
fn corpus(cli: &Cli, config: &EngineConfig) -> Result<Arc<dyn ReferenceStore>> {
    if let Some(path) = &cli.corpus {
        let store = MemoryReferenceStore::from_json_file(path)
            .with_context(|| format!("Failed to read corpus from {}", path.display()))?;
        tracing::info!(documents = store.len(), "Loaded reference corpus");
        return Ok(Arc::new(store));
    }
    if let Some(url) = &config.backend_url {
        let store = HttpReferenceStore::new(url.clone()).context("Failed to create backend client")?;
        return Ok(Arc::new(store));
    }
    tracing::warn!("No corpus configured, matching will find nothing");
    Ok(Arc::new(MemoryReferenceStore::new(Vec::new())))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Non-empty lines that are not `#` comments.
fn parse_urls(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn read_urls(path: &Path) -> Result<Vec<String>> {
    Ok(parse_urls(&read_text(path)?))
}

fn is_link(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

async fn chat(analyzer: &Analyzer<Backend>, json: bool) -> Result<()> {
    render::banner();
    println!("Paste a news link or a text to analyze. Type {} to quit.", "exit".bold());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("salir") {
            break;
        }
        if input.is_empty() {
            println!("{}", "Enter a news link or some text to analyze.".dimmed());
            continue;
        }

        let result = if is_link(input) {
            analyzer.analyze_article(input).await
        } else {
            analyzer.analyze_text(None, input).await
        };

        match result {
            Ok(analysis) if json => render::json(&analysis)?,
            Ok(analysis) => render::analysis(&analysis),
            Err(e) => {
                println!("{} {}", "✗".bright_red(), e);
                println!("{}", "Try another link, or type exit to quit.".dimmed());
            }
        }
    }

    println!("{}", "Bye!".bright_blue());
    Ok(())
}
