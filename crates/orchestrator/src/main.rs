//! Quorum research pipeline binary.
//!
//! Usage:
//!   quorum --query "AI trends in enterprise automation 2024"
//!   quorum --query "..." --config config.toml
//!   quorum --query "Demo malformed output" --inject-fault
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY` - Anthropic API key (when provider = "anthropic")
//! - `OPENAI_API_KEY` - OpenAI-compatible API key (when provider = "openai")

use quorum_executor::build_executor;
use quorum_orchestrator::{FaultInjection, PipelineConfig, ResearchPipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quorum_orchestrator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments (simple for now)
    let args: Vec<String> = std::env::args().collect();
    let mut query: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut inject_fault = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--query" | "-q" => {
                if i + 1 < args.len() {
                    query = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--inject-fault" => {
                inject_fault = true;
            }
            "--help" | "-h" => {
                println!("Quorum research pipeline");
                println!();
                println!("Usage: quorum [OPTIONS] --query <QUERY>");
                println!();
                println!("Options:");
                println!("  -q, --query <QUERY>   Research query to run the pipeline on");
                println!("  -c, --config <FILE>   Path to config.toml file");
                println!(
                    "      --inject-fault    Corrupt researcher output for queries mentioning \"malformed\""
                );
                println!("  -h, --help            Show this help message");
                println!();
                println!("Environment variables:");
                println!("  ANTHROPIC_API_KEY     Anthropic API key (provider = \"anthropic\")");
                println!("  OPENAI_API_KEY        OpenAI-compatible API key (provider = \"openai\")");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let Some(query) = query else {
        anyhow::bail!("missing required --query argument (see --help)");
    };

    // Load pipeline configuration
    let config = if let Some(path) = config_path {
        tracing::info!(path = %path, "Loading configuration");
        PipelineConfig::from_file(&path)?
    } else {
        tracing::info!("Using default configuration");
        PipelineConfig::default()
    };

    let executor = build_executor(&config.executor)?;
    let mut pipeline = ResearchPipeline::new(executor, config);

    if inject_fault {
        tracing::warn!("Fault injection enabled for researcher stages");
        pipeline = pipeline.with_fault_injection(FaultInjection::new(
            |query: &str| query.to_lowercase().contains("malformed"),
            |_original| r#"{ "research": "incomplete json without closing"#.to_string(),
        ));
    }

    let run = pipeline.run(&query).await;
    println!("{}", serde_json::to_string_pretty(&run)?);

    Ok(())
}
