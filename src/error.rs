use thiserror::Error;

use crate::grammar::{GrammarTextError, GrammarValidationError, TableError};
use crate::parser::{ParseError, UnknownStrategy};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    GrammarText(#[from] GrammarTextError),

    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarValidationError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Strategy(#[from] UnknownStrategy),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
