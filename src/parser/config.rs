use std::{fmt, str::FromStr};

use log::warn;
use serde::{Deserialize, Serialize};

use super::error::{ParseError, UnknownStrategy};

/// Which table drives a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Ll1,
    Slr,
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ll1" | "ll" => Ok(Strategy::Ll1),
            "slr" | "slr1" | "lr" => Ok(Strategy::Slr),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Ll1 => "ll1",
            Strategy::Slr => "slr",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Upper bound on automaton steps for one parse; `None` is unbounded.
    pub max_steps: Option<usize>,
}

impl ParserConfig {
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
        }
    }
}

/// Counts automaton steps against [`ParserConfig::max_steps`].
#[derive(Debug)]
pub(crate) struct StepBudget {
    limit: Option<usize>,
    used: usize,
}

impl StepBudget {
    pub(crate) fn new(config: &ParserConfig) -> Self {
        Self {
            limit: config.max_steps,
            used: 0,
        }
    }

    pub(crate) fn tick(&mut self) -> Result<(), ParseError> {
        self.used += 1;
        match self.limit {
            Some(limit) if self.used > limit => {
                warn!("parse aborted: step limit of {} reached", limit);
                Err(ParseError::StepLimitExceeded(limit))
            }
            _ => Ok(()),
        }
    }
}
