//! Verity CLI
//!
//! The `verity` command classifies news text as REAL, FAKE, or UNCERTAIN.
//!
//! ## Commands
//!
//! - `analyze`: Run every analyzer on a subject and print the fused verdict
//! - `evidence`: Print only the corroboration snapshot for a query
//! - `health`: Report classifier and generative-service readiness

mod ingest;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, Level};

use verity_core::{
    gather_evidence, AnalysisSubject, EvidenceSnapshot, FusionVerdict, SignalStatus, SourceKind,
    VerityConfig, METRICS,
};

#[derive(Parser)]
#[command(name = "verity")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-signal news credibility analysis", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding tfidf_vectorizer.json and classifier.json
    #[arg(long, global = true, env = "VERITY_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a subject (from --text, --file, --url, or stdin)
    Analyze {
        /// Subject text
        #[arg(short, long, conflicts_with_all = ["file", "url"])]
        text: Option<String>,

        /// Read subject text from a file
        #[arg(short, long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Fetch the subject from a web page
        #[arg(short, long)]
        url: Option<String>,

        /// Headline or title
        #[arg(long)]
        title: Option<String>,

        /// Tag the subject as OCR-extracted image text
        #[arg(long, conflicts_with = "url")]
        image: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Show the corroboration snapshot for a search query
    Evidence {
        /// Search query
        query: String,
    },

    /// Report whether classifier artifacts and a generative credential are available
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    verity_core::init_tracing(cli.json, level);

    let mut config = VerityConfig::from_env().context("Invalid Verity configuration")?;
    if let Some(dir) = cli.model_dir {
        config = config.with_model_dir(dir);
    }

    match cli.command {
        Commands::Analyze {
            text,
            file,
            url,
            title,
            image,
            output,
        } => {
            let request = AnalyzeRequest {
                text,
                file,
                url,
                title,
                image,
            };
            cmd_analyze(&config, request, output).await
        }
        Commands::Evidence { query } => cmd_evidence(&query).await,
        Commands::Health => cmd_health(&config),
    }
}

struct AnalyzeRequest {
    text: Option<String>,
    file: Option<PathBuf>,
    url: Option<String>,
    title: Option<String>,
    image: bool,
}

/// Build the subject, rejecting it before any analysis if it is out of bounds.
async fn build_subject(config: &VerityConfig, request: AnalyzeRequest) -> Result<AnalysisSubject> {
    if let Some(url) = request.url {
        let page = ingest::fetch_page(&url).await?;
        let title = request.title.or(page.title);
        let subject = AnalysisSubject::with_limits(page.text, title, &config.limits)
            .with_context(|| format!("Subject rejected for {}", url))?;
        return Ok(subject.with_url(url));
    }

    let body = ingest::read_body(request.text, request.file.as_deref())?;
    let subject = AnalysisSubject::with_limits(body, request.title, &config.limits)
        .context("Subject rejected")?;
    Ok(if request.image {
        subject.with_source(SourceKind::Image)
    } else {
        subject
    })
}

async fn cmd_analyze(
    config: &VerityConfig,
    request: AnalyzeRequest,
    output: OutputFormat,
) -> Result<()> {
    let subject = build_subject(config, request).await?;
    let engine = config.build_engine()?;
    debug!(
        judge_configured = engine.judge().is_configured(),
        classifier_loaded = engine.classifier().is_loaded(),
        "engine ready"
    );

    let verdict = engine.fuse(&subject).await;
    METRICS.flush();

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verdict)?),
        OutputFormat::Text => print!("{}", render_text(&verdict)),
    }
    Ok(())
}

async fn cmd_evidence(query: &str) -> Result<()> {
    let snapshot = gather_evidence(query, None).await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    models_loaded: bool,
    generative_configured: bool,
}

fn cmd_health(config: &VerityConfig) -> Result<()> {
    let engine = config.build_engine()?;
    let health = Health {
        status: "healthy",
        version: verity_core::VERSION,
        models_loaded: engine.classifier().is_loaded(),
        generative_configured: engine.judge().is_configured(),
    };
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

fn status_label(status: &SignalStatus) -> String {
    match status {
        SignalStatus::Ok => "ok".to_string(),
        SignalStatus::Degraded { cause, .. } => format!("degraded ({})", cause),
    }
}

/// Human-readable summary of a verdict.
fn render_text(v: &FusionVerdict) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Verdict:    {} (confidence {:.2})", v.verdict, v.confidence);
    let _ = writeln!(out, "Request:    {}", v.request_id);

    let _ = writeln!(out, "\nFactors:");
    for factor in &v.factors {
        let _ = writeln!(out, "  - {}", factor);
    }
    let _ = writeln!(out, "\nRecommendations:");
    for rec in &v.recommendations {
        let _ = writeln!(out, "  - {}", rec);
    }

    if let Some(b) = v.breakdown() {
        let _ = writeln!(out, "\nSignals:");
        let _ = writeln!(
            out,
            "  generative   {:<9} {:.2}  {}",
            b.generative.verdict,
            b.generative.confidence,
            status_label(&b.generative.status)
        );
        let _ = writeln!(
            out,
            "  statistical  {:<9} {:.2}  {}",
            b.statistical.verdict,
            b.statistical.confidence,
            status_label(&b.statistical.status)
        );
        let _ = writeln!(
            out,
            "  lexical      compound {:+.3}, emotional {}, clickbait {}  {}",
            b.lexical.report.sentiment.compound,
            b.lexical.report.emotional_language,
            b.lexical.report.clickbait_score,
            status_label(&b.lexical.status)
        );
        let _ = writeln!(
            out,
            "\nSubject:    {} chars, {} words, source {}",
            b.subject.text_length, b.subject.word_count, b.subject.source_type
        );
    }

    match &v.evidence {
        Some(EvidenceSnapshot::Available(data)) => {
            let _ = writeln!(
                out,
                "Evidence:   {} mentions, {} discussions, diversity {}{}",
                data.social_mentions.count,
                data.discussions.count,
                data.news_sources.source_diversity,
                if data.synthetic { " (synthetic)" } else { "" }
            );
        }
        Some(EvidenceSnapshot::Unavailable { reason }) => {
            let _ = writeln!(out, "Evidence:   unavailable ({})", reason);
        }
        None => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use verity_core::{FusionEngine, GenerativeJudge, StatisticalClassifier};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn text_and_url_conflict() {
        let parsed = Cli::try_parse_from([
            "verity", "analyze", "--text", "abc", "--url", "https://x.example",
        ]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn short_text_is_rejected_before_analysis() {
        let request = AnalyzeRequest {
            text: Some("too short".to_string()),
            file: None,
            url: None,
            title: None,
            image: false,
        };
        let err = build_subject(&VerityConfig::default(), request)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("minimum is 10"));
    }

    #[tokio::test]
    async fn image_flag_tags_subject() {
        let request = AnalyzeRequest {
            text: Some("Text read from a screenshot of a post.".to_string()),
            file: None,
            url: None,
            title: None,
            image: true,
        };
        let subject = build_subject(&VerityConfig::default(), request).await.unwrap();
        assert_eq!(subject.source(), SourceKind::Image);
    }

    #[tokio::test]
    async fn text_rendering_lists_signals() {
        let engine = FusionEngine::new(
            GenerativeJudge::unconfigured(),
            StatisticalClassifier::unavailable("not trained"),
        );
        let subject = AnalysisSubject::new("The committee published its findings today.", None)
            .unwrap();
        let rendered = render_text(&engine.fuse(&subject).await);

        assert!(rendered.starts_with("Verdict:    UNCERTAIN (confidence 0.50)"));
        assert!(rendered.contains("degraded (service_unavailable)"));
        assert!(rendered.contains("degraded (model_not_loaded)"));
        assert!(rendered.contains("(synthetic)"));
    }
}
