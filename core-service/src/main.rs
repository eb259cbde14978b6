//! phish-check - classify a URL from the command line
//!
//! Exit codes: 0 legitimate, 2 phishing, 1 error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use phishscope_core::constants::{APP_NAME, APP_VERSION};
use phishscope_core::logic::features::{Extraction, FeatureExtractor};
use phishscope_core::{InferenceAdapter, LookupConfig, ModelConfig, PhishingDetector, Verdict};

#[derive(Parser)]
#[command(name = "phish-check", version, about = "Phishing URL detection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract features and classify a URL
    Check {
        url: String,

        /// Pipeline manifest (defaults to PHISH_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Attach per-feature contributions
        #[arg(long)]
        explain: bool,

        /// Decision threshold in [0, 1]
        #[arg(long)]
        threshold: Option<f32>,

        #[arg(long)]
        json: bool,
    },

    /// Print the extracted feature record only
    Features {
        url: String,

        #[arg(long)]
        json: bool,
    },

    /// Load the pipeline and print its status
    Model {
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::debug!("{} v{}", APP_NAME, APP_VERSION);

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Check { url, model, explain, threshold, json } => {
            let mut model_config = ModelConfig::from_env();
            if let Some(path) = model {
                model_config.manifest_path = path;
            }
            if threshold.is_some() {
                model_config.threshold = threshold;
            }

            let detector = PhishingDetector::from_config(&LookupConfig::from_env(), &model_config)
                .with_context(|| format!("loading pipeline {}", model_config.manifest_path.display()))?;
            let verdict = detector.check(&url, explain).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                print_verdict(&verdict);
            }

            Ok(if verdict.is_phishing() { ExitCode::from(2) } else { ExitCode::SUCCESS })
        }

        Command::Features { url, json } => {
            let extractor = FeatureExtractor::from_config(&LookupConfig::from_env())?;
            let extraction = extractor.extract_with_report(&url).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&extraction)?);
            } else {
                print_features(&extraction);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Model { model } => {
            let mut model_config = ModelConfig::from_env();
            if let Some(path) = model {
                model_config.manifest_path = path;
            }
            let adapter = InferenceAdapter::load(&model_config)
                .with_context(|| format!("loading pipeline {}", model_config.manifest_path.display()))?;
            println!("{}", serde_json::to_string_pretty(&adapter.status())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_features(extraction: &Extraction) {
    println!("URL: {}", extraction.url);
    for (name, value) in extraction.record.layout_values() {
        match value {
            Some(v) => println!("  {:<22} {}", name, v),
            None => println!("  {:<22} -", name),
        }
    }
    for (signal, outcome) in &extraction.report.signals {
        if !outcome.is_ok() {
            println!("  ! {} lookup degraded: {:?}", signal, outcome);
        }
    }
}

fn print_verdict(verdict: &Verdict) {
    let prediction = &verdict.prediction;
    println!("URL:        {}", verdict.url);
    println!("Verdict:    {} (label={})", prediction.label, prediction.class);
    match prediction.probability {
        Some(p) => println!("Probability: {:.4} (threshold {})", p, prediction.threshold),
        None => println!("Probability: n/a (label-only classifier)"),
    }

    for signal in verdict.signals.degraded() {
        println!("  ! {} lookup degraded, fallback used", signal);
    }

    if let Some(explanation) = &verdict.explanation {
        println!("Base value:  {:.4}", explanation.base_value);
        for c in explanation.top(5) {
            println!(
                "  {:<22} {:>+.4}  (value {})  {}",
                c.name,
                c.contribution,
                c.value,
                c.description.as_deref().unwrap_or("")
            );
        }
    } else if let Some(reason) = &verdict.explanation_unavailable {
        println!("{}", reason);
    }
}
