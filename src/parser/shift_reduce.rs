use log::{debug, trace};

use super::{
    config::{ParserConfig, StepBudget},
    error::{InternalInvariantError, ParseError},
    TokenCursor,
};
use crate::grammar::{Action, Lookahead, ProductionId, SlrTable, StateId, Symbol};

/// SLR(1) recognizer. The returned trace lists every shift and reduce in
/// order and ends with `Action::Accept`; its reductions form a rightmost
/// derivation in reverse.
#[derive(Debug)]
pub struct ShiftReduceParser<'t, 'g> {
    table: &'t SlrTable<'g>,
    config: ParserConfig,
    states: Vec<StateId>,
    symbols: Vec<Symbol>,
    trace: Vec<Action>,
}

impl<'t, 'g> ShiftReduceParser<'t, 'g> {
    pub fn new(table: &'t SlrTable<'g>) -> Self {
        Self::with_config(table, ParserConfig::default())
    }

    pub fn with_config(table: &'t SlrTable<'g>, config: ParserConfig) -> Self {
        Self {
            table,
            config,
            states: vec![0],
            symbols: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn parse<S: AsRef<str>>(mut self, tokens: &[S]) -> Result<Vec<Action>, ParseError> {
        let g = self.table.grammar();
        let mut input = TokenCursor::new(tokens);
        let mut budget = StepBudget::new(&self.config);

        loop {
            budget.tick()?;
            let state = *self.states.last().ok_or(InternalInvariantError::EmptyStack)?;
            let lookahead = input.lookahead(g);
            let action = match lookahead {
                Some(l) => self.table.action(state, l),
                None => Action::Error,
            };
            trace!(
                "slr: state={} position={} lookahead={:?} action={:?}",
                state,
                input.position(),
                lookahead,
                action
            );

            match action {
                Action::Shift(next) => {
                    let Some(Lookahead::Terminal(t)) = lookahead else {
                        return Err(InternalInvariantError::ShiftAtEnd { state }.into());
                    };
                    self.symbols.push(Symbol::Terminal(t));
                    self.states.push(next);
                    input.advance();
                }
                Action::Reduce(p) => self.reduce(p)?,
                Action::Accept => {
                    self.trace.push(Action::Accept);
                    debug!(
                        "slr: accepted {} tokens in {} actions",
                        input.position(),
                        self.trace.len()
                    );
                    return Ok(self.trace);
                }
                Action::Error => {
                    let expected = self
                        .table
                        .expected(state)
                        .map(|l| g.lookahead_name(l).to_string());
                    return Err(input.syntax_error(expected, Some(state)).into());
                }
            }
            self.trace.push(action);
        }
    }

    fn reduce(&mut self, p: ProductionId) -> Result<(), InternalInvariantError> {
        let g = self.table.grammar();
        let production = g.production(p);
        let n = production.rhs().len();
        if self.symbols.len() < n || self.states.len() <= n {
            return Err(InternalInvariantError::StackUnderflow {
                production: g.production_to_string(p),
            });
        }
        self.symbols.truncate(self.symbols.len() - n);
        self.states.truncate(self.states.len() - n);

        let exposed = *self.states.last().ok_or(InternalInvariantError::EmptyStack)?;
        let lhs = production.lhs();
        let next = self
            .table
            .goto(exposed, lhs)
            .ok_or_else(|| InternalInvariantError::MissingGoto {
                state: exposed,
                non_terminal: g.non_terminal_name(lhs).to_string(),
            })?;
        self.symbols.push(Symbol::NonTerminal(lhs));
        self.states.push(next);
        Ok(())
    }
}

impl<'g> SlrTable<'g> {
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<Action>, ParseError> {
        ShiftReduceParser::new(self).parse(tokens)
    }
}

/// The reduce steps of a shift-reduce trace.
pub fn reductions(trace: &[Action]) -> Vec<ProductionId> {
    trace
        .iter()
        .filter_map(|action| match action {
            Action::Reduce(p) => Some(*p),
            _ => None,
        })
        .collect()
}
