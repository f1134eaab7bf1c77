use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gh_client::octocrab::Octocrab;
use gh_client::OctocrabClient;
use oscar_commands::{default_registry, handle_event, EventOutcome, EventPayload};
use oscar_config::BotConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Slash-command bot for GitHub issues and pull requests
#[derive(Parser)]
#[command(name = "oscar", version, propagate_version = true)]
struct Cli {
    /// Config file (default: ./.oscar.toml, then ~/.oscar.toml)
    #[arg(long, global = true, env = "OSCAR_CONFIG")]
    config: Option<PathBuf>,

    /// GitHub token (falls back to GH_TOKEN)
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL for GitHub Enterprise
    #[arg(long, global = true, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Log filter, e.g. `debug` or `oscar_commands=debug`
    #[arg(long, global = true, env = "OSCAR_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one webhook delivery
    Handle {
        /// Event name, e.g. `issue_comment`
        #[arg(long, env = "GITHUB_EVENT_NAME")]
        event: String,

        /// Path to the JSON payload
        #[arg(long, env = "GITHUB_EVENT_PATH")]
        payload: PathBuf,
    },

    /// Validate the config and list labels and commands
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let Cli {
        config,
        token,
        api_url,
        log_level,
        command,
    } = Cli::parse();

    init_logger(log_level.as_deref());
    match dotenv {
        Ok(path) => log::debug!("Loaded .env file from: {:?}", path),
        Err(_) => log::debug!(".env file not found, relying on environment variables"),
    }

    let config = BotConfig::load(config.as_deref()).context("Failed to load configuration")?;

    match command {
        Command::CheckConfig => {
            check_config(&config);
            Ok(())
        }
        Command::Handle { event, payload } => {
            let client = build_client(token, api_url)?;
            handle(&client, &config, &event, &payload).await
        }
    }
}

fn init_logger(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.init();
}

fn build_client(token: Option<String>, api_url: Option<String>) -> Result<OctocrabClient> {
    let token = token
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .filter(|t| !t.trim().is_empty())
        .context("No GitHub token, set GITHUB_TOKEN or pass --token")?;

    let mut builder = Octocrab::builder().personal_token(token);
    if let Some(url) = api_url {
        log::info!("Using GitHub API at {}", url);
        builder = builder
            .base_uri(url.as_str())
            .context("Failed to set base URI")?;
    }

    let octocrab = builder.build().context("Failed to build Octocrab client")?;
    Ok(OctocrabClient::new(Arc::new(octocrab)))
}

async fn handle(
    client: &OctocrabClient,
    config: &BotConfig,
    event: &str,
    payload_path: &Path,
) -> Result<()> {
    let raw = std::fs::read_to_string(payload_path)
        .with_context(|| format!("Failed to read payload {}", payload_path.display()))?;
    let payload: EventPayload =
        serde_json::from_str(&raw).context("Failed to parse event payload")?;

    let registry = default_registry();
    let outcome = handle_event(event, &payload, client, config, &registry)
        .await
        .with_context(|| format!("Failed to handle {} event", event))?;

    match outcome {
        EventOutcome::Ignored(reason) => log::info!("Nothing to do: {}", reason),
        EventOutcome::Commands(report) => log::info!(
            "Processed {} commands ({} failed, {} unhandled)",
            report.outcomes.len(),
            report.failed(),
            report.unhandled()
        ),
        EventOutcome::Triaged(labels) => log::info!("Applied labels: {}", labels.join(", ")),
        EventOutcome::CiFailureReported { issue, created } => log::info!(
            "Workflow failure {} #{}",
            if created { "reported in new issue" } else { "added to" },
            issue
        ),
    }
    Ok(())
}

fn check_config(config: &BotConfig) {
    println!("Admins:        {}", config.access.admins.join(", "));
    println!("Collaborators: {}", config.access.collaborators.join(", "));

    println!("\nLabels:");
    for label in config.labels.iter() {
        println!("  {:<20} #{}  {}", label.name, label.color, label.description);
        for path in &label.paths {
            println!("  {:<20} on changes under {}", "", path.display());
        }
    }

    let registry = default_registry();
    println!("\nCommands:");
    for prefix in registry.prefixes() {
        println!("  {}", prefix);
    }
    for (short, long) in registry.overlapping_prefixes() {
        println!("  note: {} also prefixes {} (longest match wins)", short, long);
    }
}
