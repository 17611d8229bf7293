// shout: feedback publishing from the command line
//
// Drafts feedback events for an external signer and publishes signed events
// to relays, reporting what each relay said.

mod config;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use shout_core::event::unix_now;
use shout_core::{build_feedback_event, publish_to_relays, Event};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(name = "shout")]
#[command(about = "Shout: publish feedback to relays", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an unsigned feedback event for an external signer
    Draft {
        content: String,
        #[arg(short, long)]
        metadata: Option<String>,
    },
    /// Publish a signed event (JSON file, or `-` for stdin)
    Publish {
        event: String,
        /// Relay to publish to (repeatable; defaults to configured relays)
        #[arg(short, long = "relay")]
        relays: Vec<String>,
        /// Per-relay deadline in seconds (0 disables it)
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage relays
    Relay {
        #[command(subcommand)]
        action: RelayAction,
    },
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum RelayAction {
    Add { url: String },
    Remove { url: String },
    List,
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
    Path,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;
    debug!("Loaded config from {:?}", config.path());

    match cli.command {
        Commands::Draft { content, metadata } => cmd_draft(&config, content, metadata),
        Commands::Publish {
            event,
            relays,
            timeout,
            json,
        } => cmd_publish(&config, event, relays, timeout, json).await,
        Commands::Relay { action } => cmd_relay(config, action),
        Commands::Config { action } => cmd_config(config, action),
    }
}

fn cmd_draft(config: &config::Config, content: String, metadata: Option<String>) -> Result<()> {
    if content.trim().is_empty() {
        anyhow::bail!("Feedback content is empty");
    }
    if config.developer.is_empty() || config.namespace.is_empty() {
        eprintln!(
            "{} developer/namespace not configured; set them with {}",
            "!".yellow(),
            "shout config set <key> <value>".bright_green()
        );
    }

    let draft = build_feedback_event(
        &content,
        &config.feedback_options(),
        metadata.as_deref(),
        unix_now(),
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&draft).context("Failed to serialize draft")?
    );
    Ok(())
}

async fn cmd_publish(
    config: &config::Config,
    source: String,
    relays: Vec<String>,
    timeout: Option<u64>,
    json: bool,
) -> Result<()> {
    let event = read_event(&source)?;
    event
        .verify_id()
        .context("Event id does not match its contents")?;

    let relays = if relays.is_empty() {
        config.relays.clone()
    } else {
        relays
    };
    if relays.is_empty() {
        anyhow::bail!(
            "No relays given; add one with `shout relay add <url>` or pass --relay"
        );
    }

    let publish_config = match timeout {
        Some(0) => shout_core::PublishConfig::unbounded(),
        Some(secs) => shout_core::PublishConfig::with_timeout(Duration::from_secs(secs)),
        None => config.publish_config(),
    };

    if !json {
        println!(
            "Publishing {} to {} relays...",
            event.id.bright_cyan(),
            relays.len()
        );
        println!("  Created: {}", report::format_timestamp(event.created_at));
        if let Some(expiration) = event.expiration() {
            println!("  Expires: {}", report::format_timestamp(expiration));
        }
        println!();
    }
    let report = publish_to_relays(&relays, &event, &publish_config).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report::to_json(&report))?);
    } else {
        report::print(&report);
    }

    if !report.any_fulfilled() {
        anyhow::bail!("No relay acknowledged the event");
    }
    Ok(())
}

fn read_event(source: &str) -> Result<Event> {
    let contents = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };
    Event::from_json(&contents).context("Failed to parse event")
}

fn cmd_relay(mut config: config::Config, action: RelayAction) -> Result<()> {
    match action {
        RelayAction::Add { url } => {
            if config.add_relay(url.clone())? {
                println!("{} Added relay: {}", "✓".green(), url);
            } else {
                println!("{} Relay already configured: {}", "•".dimmed(), url);
            }
        }

        RelayAction::Remove { url } => {
            if config.remove_relay(&url)? {
                println!("{} Removed relay", "✓".green());
            } else {
                anyhow::bail!("Relay not configured: {}", url);
            }
        }

        RelayAction::List => {
            println!("{}", "Relays".bold());
            if config.relays.is_empty() {
                println!("  {}", "(none configured)".dimmed());
            } else {
                for (i, relay) in config.relays.iter().enumerate() {
                    println!("  {}. {}", i + 1, relay);
                }
            }
        }
    }

    Ok(())
}

fn cmd_config(mut config: config::Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{} Set {} = {}", "✓".green(), key.bright_cyan(), value);
        }

        ConfigAction::Get { key } => {
            if let Some(value) = config.get(&key) {
                println!("{} = {}", key.bright_cyan(), value);
            } else {
                anyhow::bail!("Unknown config key: {}", key);
            }
        }

        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            println!();

            for (key, value) in config.list() {
                println!("  {:<20} {}", key.bright_cyan(), value);
            }
        }

        ConfigAction::Path => {
            if let Some(path) = config.path() {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
