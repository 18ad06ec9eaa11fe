use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(GameId);

/// Card rank, 1 (ace) through 13 (king).
pub type Rank = u8;

/// Chat display name; the key every session is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(pub String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guess {
    #[serde(rename = "h")]
    Higher,
    #[serde(rename = "l")]
    Lower,
}

impl Guess {
    pub fn as_choice(self) -> &'static str {
        match self {
            Guess::Higher => "h",
            Guess::Lower => "l",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown value '{0}'")]
pub struct UnknownValue(pub String);

impl FromStr for Guess {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h" => Ok(Guess::Higher),
            "l" => Ok(Guess::Lower),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Won,
    Lost,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::Won => "won",
            Verdict::Lost => "lost",
        }
    }

    pub fn ends_game(self) -> bool {
        !matches!(self, Verdict::Correct)
    }
}

impl FromStr for Verdict {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(Verdict::Correct),
            "won" => Ok(Verdict::Won),
            "lost" => Ok(Verdict::Lost),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// Per-player counters that survive across games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub games_played: u32,
    pub games_won: u32,
    pub high_score: u32,
}
