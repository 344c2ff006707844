use log::{debug, trace};

use super::{
    config::{ParserConfig, StepBudget},
    error::{InternalInvariantError, ParseError},
    TokenCursor,
};
use crate::grammar::{LL1Table, Lookahead, ProductionId, Symbol, END_MARK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackEntry {
    End,
    Symbol(Symbol),
}

/// LL(1) recognizer producing the leftmost derivation of its input.
#[derive(Debug)]
pub struct PredictiveParser<'t, 'g> {
    table: &'t LL1Table<'g>,
    config: ParserConfig,
    stack: Vec<StackEntry>,
    derivation: Vec<ProductionId>,
}

impl<'t, 'g> PredictiveParser<'t, 'g> {
    pub fn new(table: &'t LL1Table<'g>) -> Self {
        Self::with_config(table, ParserConfig::default())
    }

    pub fn with_config(table: &'t LL1Table<'g>, config: ParserConfig) -> Self {
        let start = table.grammar().start();
        Self {
            table,
            config,
            stack: vec![StackEntry::End, StackEntry::Symbol(Symbol::NonTerminal(start))],
            derivation: Vec::new(),
        }
    }

    /// Returns the productions applied, in leftmost-derivation order.
    pub fn parse<S: AsRef<str>>(mut self, tokens: &[S]) -> Result<Vec<ProductionId>, ParseError> {
        let g = self.table.grammar();
        let mut input = TokenCursor::new(tokens);
        let mut budget = StepBudget::new(&self.config);

        loop {
            budget.tick()?;
            let top = self.stack.pop().ok_or(InternalInvariantError::EmptyStack)?;
            let lookahead = input.lookahead(g);
            trace!(
                "ll1: top={:?} position={} lookahead={:?}",
                top,
                input.position(),
                lookahead
            );

            match top {
                StackEntry::End => {
                    if lookahead == Some(Lookahead::End) {
                        debug!(
                            "ll1: accepted {} tokens with {} productions",
                            input.position(),
                            self.derivation.len()
                        );
                        return Ok(self.derivation);
                    }
                    return Err(input.syntax_error([END_MARK.to_string()], None).into());
                }
                StackEntry::Symbol(Symbol::Terminal(t)) => {
                    if lookahead != Some(Lookahead::Terminal(t)) {
                        let expected = g.terminal_name(t).to_string();
                        return Err(input.syntax_error([expected], None).into());
                    }
                    input.advance();
                }
                StackEntry::Symbol(Symbol::NonTerminal(nt)) => {
                    let Some(p) = lookahead.and_then(|l| self.table.get(nt, l)) else {
                        let expected = self
                            .table
                            .viable(nt)
                            .map(|l| g.lookahead_name(l).to_string());
                        return Err(input.syntax_error(expected, None).into());
                    };
                    self.derivation.push(p);
                    self.stack.extend(
                        g.production(p)
                            .rhs()
                            .iter()
                            .rev()
                            .map(|s| StackEntry::Symbol(*s)),
                    );
                }
            }
        }
    }
}

impl<'g> LL1Table<'g> {
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<ProductionId>, ParseError> {
        PredictiveParser::new(self).parse(tokens)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::fixtures;
    use crate::parser::SyntaxError;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn leftmost_derivation() {
        init();
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        let derivation = table.parse(&["id", "+", "id", "*", "id"]).unwrap();
        let derivation: Vec<String> = derivation
            .into_iter()
            .map(|p| g.production_to_string(p))
            .collect();
        assert_eq!(
            derivation,
            vec![
                "E -> T E'",
                "T -> F T'",
                "F -> id",
                "T' -> ε",
                "E' -> + T E'",
                "T -> F T'",
                "F -> id",
                "T' -> * F T'",
                "F -> id",
                "T' -> ε",
                "E' -> ε",
            ]
        );
    }

    #[test]
    fn doubled_operator() {
        init();
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        let err = table.parse(&["id", "+", "+", "id"]).unwrap_err();
        let Some(err) = err.syntax() else {
            panic!("expected a syntax error, got {err}");
        };
        assert_eq!(err.position, 2);
        assert_eq!(err.found.as_deref(), Some("+"));
        let mut expected = err.expected.clone();
        expected.sort();
        assert_eq!(expected, vec!["(", "id"]);
    }

    #[test]
    fn terminal_mismatch_names_the_terminal() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        let err = table.parse(&["(", "id"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::Syntax(SyntaxError {
                position: 2,
                found: None,
                expected: vec![")".to_string()],
                state: None,
            })
        );
    }

    #[test]
    fn trailing_input() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        let err = table.parse(&["id", ")"]).unwrap_err();
        let err = err.syntax().unwrap();
        assert_eq!(err.position, 1);
        assert_eq!(err.found.as_deref(), Some(")"));
    }

    #[test]
    fn unknown_token() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        let err = table.parse(&["id", "-", "id"]).unwrap_err();
        let err = err.syntax().unwrap();
        assert_eq!(err.position, 1);
        assert_eq!(err.found.as_deref(), Some("-"));
    }

    #[test]
    fn empty_input() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        let err = table.parse::<&str>(&[]).unwrap_err();
        let err = err.syntax().unwrap();
        assert_eq!(err.position, 0);
        assert_eq!(err.found, None);
    }

    #[test]
    fn step_limit() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        let parser = PredictiveParser::with_config(&table, ParserConfig::with_max_steps(3));
        assert_eq!(
            parser.parse(&["id", "+", "id"]),
            Err(ParseError::StepLimitExceeded(3))
        );
    }

    #[test]
    fn table_survives_failed_parse() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        assert!(table.parse(&["+"]).is_err());
        assert!(table.parse(&["(", "id", ")"]).is_ok());
    }
}
