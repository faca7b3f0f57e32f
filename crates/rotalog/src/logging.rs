//! Logging for the CLI and the timeline server.
//!
//! Everything goes to stderr so `--json` output on stdout stays parseable.
//! `RUST_LOG` replaces the verbosity-derived directives entirely.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Timeline adds, server start/stop, migrations.
    #[default]
    Normal,
    /// Per-request detail, evictions, rejected input.
    Verbose,
    /// Everything, including HTTP and database internals.
    Trace,
}

impl Verbosity {
    /// Level applied to this crate's own events.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Map the CLI's `-q` / `-v` counts onto a verbosity.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Filter directives used when `RUST_LOG` is unset.
    ///
    /// Dependencies (hyper, reqwest, rusqlite) stay at `warn` until
    /// [`Verbosity::Trace`], which opens them up to `debug`.
    #[must_use]
    pub fn directives(&self) -> String {
        let own = self.to_level_filter().as_str().to_ascii_lowercase();
        match self {
            Self::Quiet => format!("error,rotalog={own}"),
            Self::Normal | Self::Verbose => format!("warn,rotalog={own}"),
            Self::Trace => format!("debug,rotalog={own}"),
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed, in which case the
/// existing one is left alone.
///
/// # Examples
///
/// ```no_run
/// use rotalog::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let stderr_is_tty = std::io::stderr().is_terminal();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(stderr_is_tty)
                .with_target(verbosity != Verbosity::Normal),
        )
        .try_init()
        .is_ok()
}

/// Initialize logging for tests: warnings and up, captured per test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::INFO);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Trace);
    }

    #[test]
    fn test_directives() {
        assert_eq!(Verbosity::Quiet.directives(), "error,rotalog=error");
        assert_eq!(Verbosity::Normal.directives(), "warn,rotalog=info");
        assert_eq!(Verbosity::Verbose.directives(), "warn,rotalog=debug");
        assert_eq!(Verbosity::Trace.directives(), "debug,rotalog=trace");
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ] {
            assert!(EnvFilter::try_new(verbosity.directives()).is_ok());
        }
    }

    #[test]
    fn test_second_init_is_refused() {
        init_test_logging();
        assert!(!init_logging(Verbosity::Verbose));
    }
}
