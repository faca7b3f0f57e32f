//! `rotalog` - Injection site rotation with a bounded community timeline
//!
//! This library provides the rotation engine and usage statistics over a
//! personal injection history, plus the shared timeline: a feed that never
//! holds more than a fixed number of recent entries, served over HTTP.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod rotation;
pub mod service;
pub mod share;
pub mod site;
pub mod statistics;
pub mod timeline;

pub use client::{FeedState, TimelineClient};
pub use config::Config;
pub use error::{Error, Result};
pub use history::EventHistory;
pub use logging::init_logging;
pub use rotation::{status_of, SiteStatus};
pub use service::TimelineService;
pub use share::{share_best_effort, ShareOutcome, ShareRequest};
pub use site::{Area, InjectionEvent, PainLevel, Side, SiteKey};
pub use statistics::{summarize, UsageStatistic};
pub use timeline::{
    MemoryTimeline, Nickname, SharedEvent, SqliteTimeline, TimelineStore, TIMELINE_CAPACITY,
};
