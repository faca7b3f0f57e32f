//! `rotalog` - CLI for injection site rotation and the shared timeline
//!
//! This binary reads a personal injection history for status and statistics,
//! and serves or reads the bounded shared timeline.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use rotalog::api::http;
use rotalog::cli::{
    Cli, Command, ConfigCommand, FeedCommand, OutputFormat, ServeCommand, ShareCommand,
    StatsCommand, StatusCommand,
};
use rotalog::rotation::{recommended_sites, status_of_with_threshold};
use rotalog::statistics::{most_and_least_used, summarize};
use rotalog::{
    init_logging, share_best_effort, timeline, Config, EventHistory, FeedState, PainLevel,
    ShareOutcome, ShareRequest, SharedEvent, TimelineClient, TimelineService,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(cmd) => handle_serve(&config, cmd).await,
        Command::Status(cmd) => handle_status(&config, &cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Feed(cmd) => handle_feed(&config, &cmd).await,
        Command::Share(cmd) => handle_share(&config, cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_serve(config: &Config, cmd: ServeCommand) -> Result<()> {
    let addr = match cmd.bind {
        Some(bind) => bind,
        None => config.bind_address()?.to_string(),
    };

    let store = tokio::task::spawn_blocking({
        let config = config.clone();
        move || timeline::open_from_config(&config)
    })
    .await
    .context("opening timeline")??;
    info!(
        "Timeline ready: {} of {} entries live",
        store.len()?,
        store.capacity()
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown requested");
    };
    http::serve(listener, TimelineService::new(store), shutdown).await?;
    Ok(())
}

fn load_history(path: &Path) -> Result<EventHistory> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    EventHistory::from_json_reader(BufReader::new(file))
        .with_context(|| format!("reading history from {}", path.display()))
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> Result<()> {
    let history = load_history(&cmd.history)?;
    let statuses =
        status_of_with_threshold(history.events(), Utc::now(), config.rotation.threshold_hours);

    if cmd.json {
        let list: Vec<_> = statuses.values().collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("Site rotation ({} events)", history.len());
    println!("---------------------------");
    for status in statuses.values() {
        let last = match (status.last_used_at, status.hours_since_last_use) {
            (Some(at), Some(hours)) => format!(
                "{} ({hours:.1}h ago)",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            _ => "never".to_string(),
        };
        let marker = if status.recommended { "*" } else { " " };
        println!("{marker} {:<14} {last}", status.site_key.to_string());
    }

    let due = recommended_sites(&statuses);
    println!();
    if due.is_empty() {
        println!("No site is due yet.");
    } else {
        let names: Vec<String> = due.iter().map(ToString::to_string).collect();
        println!("Recommended: {}", names.join(", "));
    }
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> Result<()> {
    let history = load_history(&cmd.history)?;
    let days = cmd.days.unwrap_or(config.statistics.window_days);
    anyhow::ensure!(days >= 1, "--days must be at least 1");
    let statistics = summarize(history.events(), days, Utc::now());

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&statistics)?);
        return Ok(());
    }

    println!("Site usage, last {days} days");
    println!("---------------------------");
    if statistics.is_empty() {
        println!("No data.");
        return Ok(());
    }
    for stat in &statistics {
        println!(
            "{:<14} {:>4}  {:>5.1}%",
            stat.site_key.to_string(),
            stat.count,
            stat.percentage_of_window
        );
    }
    if let (Some(most), Some(least)) = most_and_least_used(&statistics) {
        println!();
        println!("Most used:  {}", most.site_key);
        println!("Least used: {}", least.site_key);
    }
    Ok(())
}

async fn handle_feed(config: &Config, cmd: &FeedCommand) -> Result<()> {
    let server = cmd.server.clone().unwrap_or_else(|| config.server.url.clone());
    let client = TimelineClient::new(server)?;
    let format = cmd.format;

    if !cmd.watch {
        let events = client.list().await?;
        print_feed(&events, format)?;
        return Ok(());
    }

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    client
        .poll(config.poll_interval(), shutdown, |state| match state {
            FeedState::Available(events) => {
                if let Err(err) = print_feed(&events, format) {
                    eprintln!("Failed to print feed: {err}");
                }
            }
            FeedState::Unavailable => eprintln!("Feed temporarily unavailable"),
        })
        .await;
    Ok(())
}

fn print_feed(events: &[SharedEvent], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(events)?),
        OutputFormat::Plain => {
            if events.is_empty() {
                println!("No shared injections yet.");
            }
            for event in events {
                println!(
                    "{}  {:<14} {}",
                    event.created_at.with_timezone(&Local).format("%m-%d %H:%M"),
                    event.site_key.to_string(),
                    event.nickname
                );
            }
        }
    }
    Ok(())
}

async fn handle_share(config: &Config, cmd: ShareCommand) -> Result<()> {
    let server = cmd.server.clone().unwrap_or_else(|| config.server.url.clone());
    let client = TimelineClient::new(server)?;
    let site_key = cmd.site_key();

    let Some(path) = cmd.history.as_deref() else {
        let nickname = cmd
            .nickname
            .as_deref()
            .unwrap_or(rotalog::share::DEFAULT_NICKNAME);
        client.add(nickname, site_key).await?;
        println!("Shared {site_key}.");
        return Ok(());
    };

    let mut history = if path.exists() {
        load_history(path)?
    } else {
        EventHistory::new()
    };
    let pain_level = cmd.pain.map(PainLevel::new).transpose()?;
    let (event, outcome) = share_best_effort(
        &mut history,
        &client,
        ShareRequest {
            site_key,
            occurred_at: Utc::now(),
            pain_level,
            notes: cmd.notes,
            nickname: cmd.nickname.as_deref(),
        },
        |history| history.save(path),
    )
    .await
    .with_context(|| format!("recording to {}", path.display()))?;

    println!("Recorded {} in {}.", event.site_key, path.display());

    match outcome {
        ShareOutcome::Shared => println!("Shared {site_key}."),
        ShareOutcome::Failed(err) => println!("Not shared: {err}"),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Backend:            {:?}", config.storage.backend);
                println!();
                println!("[Timeline]");
                println!("  Capacity:           {}", config.timeline.capacity);
                println!("  Poll interval (s):  {}", config.timeline.poll_interval_secs);
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address);
                println!("  URL:                {}", config.server.url);
                println!();
                println!("[Rotation]");
                println!("  Threshold (hours):  {}", config.rotation.threshold_hours);
                println!();
                println!("[Statistics]");
                println!("  Window (days):      {}", config.statistics.window_days);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
