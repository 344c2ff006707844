use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::grammar::StateId;

/// Rejection of one input. The table that produced it stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error(
    "syntax error at position {position}: found {}, expected {}",
    .found.as_deref().unwrap_or("end of input"),
    .expected.iter().join(" or ")
)]
pub struct SyntaxError {
    /// Index of the offending token; the input length when input ran out.
    pub position: usize,
    /// `None` at end of input.
    pub found: Option<String>,
    pub expected: Vec<String>,
    /// Set by the shift-reduce parser only.
    pub state: Option<StateId>,
}

/// A table or automaton state that a correctly built table cannot produce.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalInvariantError {
    #[error("parse stack is empty")]
    EmptyStack,

    #[error("stack underflow while reducing `{production}`")]
    StackUnderflow { production: String },

    #[error("no goto from state {state} on {non_terminal}")]
    MissingGoto { state: StateId, non_terminal: String },

    #[error("shift on end of input in state {state}")]
    ShiftAtEnd { state: StateId },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown parsing strategy `{0}`, expected `ll1` or `slr`")]
pub struct UnknownStrategy(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("internal invariant violated: {0}")]
    Internal(#[from] InternalInvariantError),

    #[error("parse aborted after {0} steps")]
    StepLimitExceeded(usize),
}

impl ParseError {
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax(e) => Some(e),
            _ => None,
        }
    }
}
