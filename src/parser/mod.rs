//! Table-driven recognizers. Each parser borrows a frozen table, owns its
//! stacks and input cursor, and is consumed by a single call to `parse`.

pub mod config;
pub mod error;
pub mod predictive;
pub mod shift_reduce;

pub use config::{ParserConfig, Strategy};
pub use error::{InternalInvariantError, ParseError, SyntaxError, UnknownStrategy};
pub use predictive::PredictiveParser;
pub use shift_reduce::ShiftReduceParser;

use crate::grammar::{Grammar, Lookahead};

/// Read-only token slice and the index of the next unread token.
/// The end marker is the virtual position `tokens.len()`.
#[derive(Debug)]
pub(crate) struct TokenCursor<'i, S> {
    tokens: &'i [S],
    position: usize,
}

impl<'i, S: AsRef<str>> TokenCursor<'i, S> {
    pub(crate) fn new(tokens: &'i [S]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn advance(&mut self) {
        self.position += 1;
    }

    /// `None` when the current token is not a terminal of `g`.
    pub(crate) fn lookahead(&self, g: &Grammar) -> Option<Lookahead> {
        match self.tokens.get(self.position) {
            Some(token) => g.terminal_id(token.as_ref()).map(Lookahead::Terminal),
            None => Some(Lookahead::End),
        }
    }

    pub(crate) fn found(&self) -> Option<String> {
        self.tokens
            .get(self.position)
            .map(|token| token.as_ref().to_string())
    }

    pub(crate) fn syntax_error(
        &self,
        expected: impl IntoIterator<Item = String>,
        state: Option<usize>,
    ) -> SyntaxError {
        SyntaxError {
            position: self.position,
            found: self.found(),
            expected: expected.into_iter().collect(),
            state,
        }
    }
}
