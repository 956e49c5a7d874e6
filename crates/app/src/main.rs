//! spiralcal - Spiral tracing calibration scorer
//!
//! Replays recorded drawings through a calibration session and scores them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use calibration::{
    CalibrationResult, CalibrationSession, ClassifierConfidence, Questionnaire, ResultLog,
    SpiralParams, Stroke, deviation_report,
};
use clap::{Parser, Subcommand};
use spiralcal::{Analysis, Analyzer, SubmitError};
use spiralcal_classifier::{ClassifierBackend, RemoteClassifier, StaticClassifier};
use spiralcal_config::CalibrationConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// spiralcal - Spiral tracing calibration scorer
#[derive(Parser, Debug)]
#[command(name = "spiralcal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a JSON calibration config (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print sampled template points (centre-relative) as JSON
    Template {
        /// Angular step in radians
        #[arg(long)]
        step: Option<f64>,
    },

    /// Print the radial deviation report for a drawing
    Deviation {
        /// Drawing file: JSON array of strokes, each an array of {x, y}
        #[arg(short, long)]
        drawing: PathBuf,
    },

    /// Score a drawing and print the resulting record
    Score {
        /// Drawing file: JSON array of strokes, each an array of {x, y}
        #[arg(short, long)]
        drawing: PathBuf,

        /// Use this classifier confidence instead of the remote classifier
        #[arg(long)]
        confidence: Option<f64>,

        /// Questionnaire answers to attach (JSON)
        #[arg(short, long)]
        questionnaire: Option<PathBuf>,

        /// Also write the record JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match &cli.config {
        Some(path) => CalibrationConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => CalibrationConfig::default(),
    };

    match cli.command {
        Commands::Template { step } => print_template(&config, step),
        Commands::Deviation { drawing } => print_deviation(&config, &drawing),
        Commands::Score {
            drawing,
            confidence,
            questionnaire,
            output,
        } => {
            score(
                &config,
                &drawing,
                confidence,
                questionnaire.as_deref(),
                output.as_deref(),
            )
            .await
        }
    }
}

fn print_template(config: &CalibrationConfig, step: Option<f64>) -> Result<()> {
    let params = SpiralParams::from_config(config).context("invalid template geometry")?;
    let step = step.unwrap_or(config.template.sample_step);
    if !(step > 0.0) {
        bail!("--step must be positive, got {}", step);
    }

    let points: Vec<_> = params.samples(step).collect();
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

fn print_deviation(config: &CalibrationConfig, drawing: &Path) -> Result<()> {
    let session = replay_drawing(config, drawing)?;
    let report = deviation_report(&session.scored_strokes(), session.params());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn score(
    config: &CalibrationConfig,
    drawing: &Path,
    confidence: Option<f64>,
    questionnaire: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let questionnaire = questionnaire.map(load_questionnaire).transpose()?;
    let session = replay_drawing(config, drawing)?;

    let analysis = match confidence {
        Some(value) => {
            let value = ClassifierConfidence::new(value).context("invalid --confidence")?;
            analyze(StaticClassifier::confident(value.value()), config, &session).await?
        }
        None => analyze(RemoteClassifier::from_config(&config.classifier), config, &session).await?,
    };

    if let Analysis::Unavailable { reason, .. } = &analysis {
        bail!("scoring unavailable: {}", reason);
    }

    let log = ResultLog::new();
    match analysis.submit(&log, questionnaire).await {
        Ok((key, result)) => {
            tracing::debug!("Result recorded as {}", key);
            print_result(&result, output)
        }
        Err(SubmitError::Store { result, source }) => {
            print_result(&result, output)?;
            Err(anyhow::Error::new(source).context("result was scored but could not be stored"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the record JSON and its feedback, optionally writing it to `output`
fn print_result(result: &CalibrationResult, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    eprintln!("{}", result.feedback().message());

    if let Some(path) = output {
        std::fs::write(path, &json)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

async fn analyze<B: ClassifierBackend>(
    classifier: B,
    config: &CalibrationConfig,
    session: &CalibrationSession,
) -> Result<Analysis> {
    let analyzer = Analyzer::new(classifier, &config.classifier);
    Ok(analyzer.analyze(session).await?)
}

/// Replay every stroke of a drawing file through a fresh session
fn replay_drawing(config: &CalibrationConfig, path: &Path) -> Result<CalibrationSession> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read drawing {}", path.display()))?;
    let strokes: Vec<Stroke> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse drawing {}", path.display()))?;

    let mut session = CalibrationSession::new(config).context("invalid template geometry")?;
    let committed = strokes
        .iter()
        .filter(|stroke| session.replay(stroke))
        .count();
    tracing::info!(
        "Replayed {} of {} strokes from {}",
        committed,
        strokes.len(),
        path.display()
    );
    Ok(session)
}

fn load_questionnaire(path: &Path) -> Result<Questionnaire> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read questionnaire {}", path.display()))?;
    let answers: Questionnaire = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse questionnaire {}", path.display()))?;
    answers
        .validate()
        .with_context(|| format!("invalid questionnaire {}", path.display()))?;
    Ok(answers)
}
