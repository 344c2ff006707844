pub mod conflict;
pub mod definition;
pub mod error;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod lr_dfa;
pub mod nullable_first_follow;
pub mod parse;
pub mod pretty_print;
pub mod slr_parsing_table;

pub use definition::GrammarDefinition;
pub use error::{GrammarTextError, GrammarValidationError, TableError};
pub use grammar::{
    Grammar, GrammarBuilder, Lookahead, NonTerminalId, Production, ProductionId, Symbol,
    TerminalId,
};
pub use ll1_parsing_table::LL1Table;
pub use lr_dfa::{Item, LR0Automaton, StateId};
pub use nullable_first_follow::{FirstFollow, FirstSet};
pub use slr_parsing_table::{Action, SlrTable};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
