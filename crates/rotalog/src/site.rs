//! Core event types for rotalog.
//!
//! This module defines the injection sites and the personal injection
//! events that the rotation and statistics engines consume.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which side of the body a site is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left side.
    Left,
    /// Right side.
    Right,
}

/// Which body area a site is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    /// Upper arm.
    Arm,
    /// Abdomen.
    Abdomen,
    /// Thigh.
    Thigh,
}

impl Side {
    /// Both sides, in enumeration order.
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// The wire name of this side.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl Area {
    /// All areas, in enumeration order.
    pub const ALL: [Area; 3] = [Area::Arm, Area::Abdomen, Area::Thigh];

    /// The wire name of this area.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Abdomen => "abdomen",
            Self::Thigh => "thigh",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(Error::validation(
                "side",
                format!("unknown side '{other}', expected left or right"),
            )),
        }
    }
}

impl FromStr for Area {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "arm" => Ok(Self::Arm),
            "abdomen" => Ok(Self::Abdomen),
            "thigh" => Ok(Self::Thigh),
            other => Err(Error::validation(
                "area",
                format!("unknown area '{other}', expected arm, abdomen or thigh"),
            )),
        }
    }
}

/// One of the six fixed injection sites.
///
/// Ordering follows [`SiteKey::ALL`]: side first, then area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteKey {
    /// Body side.
    pub side: Side,
    /// Body area.
    pub area: Area,
}

impl SiteKey {
    /// Every site, in enumeration order.
    pub const ALL: [SiteKey; 6] = [
        SiteKey::new(Side::Left, Area::Arm),
        SiteKey::new(Side::Left, Area::Abdomen),
        SiteKey::new(Side::Left, Area::Thigh),
        SiteKey::new(Side::Right, Area::Arm),
        SiteKey::new(Side::Right, Area::Abdomen),
        SiteKey::new(Side::Right, Area::Thigh),
    ];

    /// Create a site key.
    #[must_use]
    pub const fn new(side: Side, area: Area) -> Self {
        Self { side, area }
    }

    /// Build a site key from separate side and area strings.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either part is not recognized.
    pub fn parse_parts(side: &str, area: &str) -> Result<Self> {
        Ok(Self::new(side.parse()?, area.parse()?))
    }

    /// Position of this site within [`SiteKey::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        let side = match self.side {
            Side::Left => 0,
            Side::Right => 1,
        };
        let area = match self.area {
            Area::Arm => 0,
            Area::Abdomen => 1,
            Area::Thigh => 2,
        };
        side * Area::ALL.len() + area
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.side, self.area)
    }
}

impl FromStr for SiteKey {
    type Err = Error;

    /// Parses the `"<side>-<area>"` form, e.g. `"left-thigh"`.
    fn from_str(s: &str) -> Result<Self> {
        let (side, area) = s.split_once('-').ok_or_else(|| {
            Error::validation("site", format!("'{s}' is not of the form <side>-<area>"))
        })?;
        Self::parse_parts(side, area)
    }
}

/// Self-reported pain on a 1 to 5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PainLevel(u8);

impl PainLevel {
    /// Lowest accepted level.
    pub const MIN: u8 = 1;
    /// Highest accepted level.
    pub const MAX: u8 = 5;

    /// Create a pain level.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `level` is outside 1..=5.
    pub fn new(level: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(Error::validation(
                "pain_level",
                format!("{level} is outside {}..={}", Self::MIN, Self::MAX),
            ))
        }
    }

    /// The numeric level.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PainLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PainLevel> for u8 {
    fn from(level: PainLevel) -> Self {
        level.0
    }
}

/// A single recorded injection.
///
/// Immutable once recorded; the only lifecycle change is deletion from the
/// owning [`EventHistory`](crate::history::EventHistory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionEvent {
    /// Local identifier (assigned by the history collection).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Where the injection was given.
    pub site_key: SiteKey,

    /// When the injection was given.
    pub occurred_at: DateTime<Utc>,

    /// Optional pain rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<PainLevel>,

    /// Optional free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InjectionEvent {
    /// Create an unnumbered event at the given site and instant.
    #[must_use]
    pub fn new(site_key: SiteKey, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            site_key,
            occurred_at,
            pain_level: None,
            notes: None,
        }
    }

    /// Attach a pain rating.
    #[must_use]
    pub fn with_pain(mut self, pain_level: PainLevel) -> Self {
        self.pain_level = Some(pain_level);
        self
    }

    /// Attach notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
