//! Command-line interface for rotalog.
//!
//! This module provides the CLI structure for the `rotalog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AreaArg, ConfigCommand, FeedCommand, OutputFormat, ServeCommand, ShareCommand, SideArg,
    StatsCommand, StatusCommand,
};

/// rotalog - Rotate injection sites and share them with a small community feed
///
/// Tracks which of six body sites are due for use, summarizes usage, and
/// serves or reads a bounded shared timeline of recent injections.
#[derive(Debug, Parser)]
#[command(name = "rotalog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the shared timeline service
    Serve(ServeCommand),

    /// Show which sites are due for use
    Status(StatusCommand),

    /// Summarize site usage over a trailing window
    Stats(StatsCommand),

    /// Print the shared timeline
    Feed(FeedCommand),

    /// Share an injection to the timeline
    Share(ShareCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
