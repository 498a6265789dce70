//! claimcheck command line: check a claim, replay an invocation event, or
//! serve the pipeline over HTTP.

mod serve;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use claimcheck_core::Claim;
use claimcheck_runtime::{CheckOutcome, FactChecker, ProviderRegistry, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(name = "claimcheck", author, version, about = "Evidence-backed fact checking", long_about = None)]
struct Cli {
    /// YAML config file. Environment variables override its values.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a single claim and print the verdict
    Check {
        /// Claim text, in any language
        text: String,

        /// Print the outcome as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Run an invocation event from a file (or `-` for stdin) and print the response
    Event {
        #[arg(default_value = "-")]
        path: String,
    },

    /// Serve the pipeline over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RuntimeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.log_level);

    let checker = FactChecker::from_config(&config, &ProviderRegistry::with_defaults())
        .context("Failed to build the fact-check pipeline")?;

    match cli.command {
        Command::Check { text, json } => {
            let claim = Claim::new(&text)?;
            let outcome = checker.check(&claim).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
            } else {
                print_outcome(&outcome);
            }
        }
        Command::Event { path } => {
            let raw = read_input(&path)?;
            let event: serde_json::Value =
                serde_json::from_str(&raw).with_context(|| format!("Event in {} is not valid JSON", path))?;
            let envelope = checker.handle_event(&event).await;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Command::Serve { addr } => serve::run(checker, &addr).await?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read event from stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}

fn print_outcome(outcome: &CheckOutcome) {
    let summary = outcome.verdict.summary();

    println!("{}", outcome.body);
    println!();
    println!(
        "classification: {}",
        summary.classification.map(|c| c.label()).unwrap_or("unknown")
    );
    println!("confidence:     {}%", summary.confidence);
    println!("trust:          {}", summary.trust);
    println!("language:       {}", outcome.source_language);
    println!("search terms:   {}", outcome.search_terms);
    if outcome.translation_degraded {
        println!("note:           translation failed, processed as English");
    }
}

fn outcome_json(outcome: &CheckOutcome) -> serde_json::Value {
    let summary = outcome.verdict.summary();
    serde_json::json!({
        "body": outcome.body,
        "classification": summary.classification.map(|c| c.label()),
        "confidence": summary.confidence,
        "trust": summary.trust,
        "source_language": outcome.source_language,
        "search_terms": outcome.search_terms,
        "evidence": outcome.evidence_origin,
        "verdict_origin": outcome.verdict.origin,
        "translation_degraded": outcome.translation_degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["claimcheck", "check", "The moon is cheese", "--json"]).unwrap();
        match cli.command {
            Command::Check { text, json } => {
                assert_eq!(text, "The moon is cheese");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["claimcheck", "serve", "--config", "claimcheck.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("claimcheck.yaml")));
        match cli.command {
            Command::Serve { addr } => assert_eq!(addr, "127.0.0.1:8080"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_event_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["claimcheck", "event"]).unwrap();
        assert!(matches!(cli.command, Command::Event { path } if path == "-"));
    }
}
