use thiserror::Error;

/// Reasons a grammar is rejected before any analysis runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarValidationError {
    #[error("start symbol is not set")]
    StartSymbolUnset,

    #[error("start symbol {0} is not a declared nonterminal")]
    UndeclaredStartSymbol(String),

    #[error("production left side {0} is not a declared nonterminal")]
    UndeclaredLeftSide(String),

    #[error("production {lhs} -> ... references undeclared symbol {symbol}")]
    UndeclaredSymbol { lhs: String, symbol: String },

    #[error("nonterminal {0} has no productions")]
    NoProductions(String),

    #[error("{0} is declared both as a terminal and as a nonterminal")]
    ConflictingDeclaration(String),
}

/// Errors raised while reading the line-oriented grammar text format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarTextError {
    #[error("line {0}: too many \"->\"")]
    TooManyArrows(usize),

    #[error("line {0}: left side contains whitespace")]
    LeftSideWhitespace(usize),

    #[error("line {0}: empty left side")]
    EmptyLeftSide(usize),

    #[error("line {0}: cannot find left side")]
    MissingLeftSide(usize),

    #[error("grammar contains no productions")]
    Empty,
}

/// A parse table cell that would need two different entries.
///
/// Symbols and productions are carried as display strings so the error
/// outlives the grammar it was built from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("grammar is not LL(1): on {lookahead}, {non_terminal} predicts both `{first}` and `{second}`")]
    AmbiguousGrammar {
        non_terminal: String,
        lookahead: String,
        first: String,
        second: String,
    },

    #[error("shift/reduce conflict in state {state} on {lookahead}: shift to {shift} or reduce `{reduce}`")]
    ShiftReduceConflict {
        state: usize,
        lookahead: String,
        shift: usize,
        reduce: String,
    },

    #[error("reduce/reduce conflict in state {state} on {lookahead}: reduce `{first}` or reduce `{second}`")]
    ReduceReduceConflict {
        state: usize,
        lookahead: String,
        first: String,
        second: String,
    },
}
