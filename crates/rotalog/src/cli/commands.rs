//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::site::{Area, Side, SiteKey};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind_address`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// JSON file holding the injection history
    #[arg(long, value_name = "FILE")]
    pub history: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// JSON file holding the injection history
    #[arg(long, value_name = "FILE")]
    pub history: PathBuf,

    /// Trailing window in days (overrides `statistics.window_days`)
    #[arg(short, long)]
    pub days: Option<i64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Feed command arguments.
#[derive(Debug, Args)]
pub struct FeedCommand {
    /// Timeline service URL (overrides `server.url`)
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,

    /// Keep polling and reprint on every interval
    #[arg(short, long)]
    pub watch: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Share command arguments.
#[derive(Debug, Args)]
pub struct ShareCommand {
    /// Name shown in the feed
    #[arg(short, long)]
    pub nickname: Option<String>,

    /// Body side
    #[arg(long, value_enum)]
    pub side: SideArg,

    /// Body area
    #[arg(long, value_enum)]
    pub area: AreaArg,

    /// Pain from 1 to 5 (kept in the local history only)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub pain: Option<u8>,

    /// Notes (kept in the local history only)
    #[arg(long)]
    pub notes: Option<String>,

    /// Also record the injection in this history file before sharing
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Timeline service URL (overrides `server.url`)
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,
}

impl ShareCommand {
    /// The site named by `--side` and `--area`.
    #[must_use]
    pub fn site_key(&self) -> SiteKey {
        SiteKey::new(self.side.into(), self.area.into())
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Side argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    /// Left side
    Left,
    /// Right side
    Right,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Left => Self::Left,
            SideArg::Right => Self::Right,
        }
    }
}

/// Area argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AreaArg {
    /// Upper arm
    Arm,
    /// Abdomen
    Abdomen,
    /// Thigh
    Thigh,
}

impl From<AreaArg> for Area {
    fn from(arg: AreaArg) -> Self {
        match arg {
            AreaArg::Arm => Self::Arm,
            AreaArg::Abdomen => Self::Abdomen,
            AreaArg::Thigh => Self::Thigh,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
