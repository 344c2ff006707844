use std::collections::BTreeMap;

use log::debug;

use super::{
    conflict::claim_cell,
    error::TableError,
    grammar::{Grammar, Lookahead, NonTerminalId, ProductionId, Symbol},
    lr_dfa::{LR0Automaton, Rule, StateId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
    Error,
}

/// SLR(1) action and goto tables over the canonical LR(0) collection.
#[derive(Debug, Clone)]
pub struct SlrTable<'g> {
    automaton: LR0Automaton<'g>,
    action: Vec<BTreeMap<Lookahead, Action>>,
    goto: Vec<BTreeMap<NonTerminalId, StateId>>,
}

impl<'g> SlrTable<'g> {
    /// Shift and goto entries come from the automaton's transitions, reduce
    /// entries from FOLLOW of the reduced nonterminal. The first cell that
    /// would hold two different actions aborts construction.
    pub fn build(grammar: &'g Grammar) -> Result<Self, TableError> {
        let automaton = LR0Automaton::build(grammar);
        let ff = grammar.first_follow();
        let state_count = automaton.states().len();
        let mut action: Vec<BTreeMap<Lookahead, Action>> = vec![BTreeMap::new(); state_count];
        let mut goto: Vec<BTreeMap<NonTerminalId, StateId>> = vec![BTreeMap::new(); state_count];

        for (id, state) in automaton.states().iter().enumerate() {
            for (symbol, &target) in &state.edges {
                match symbol {
                    Symbol::Terminal(t) => {
                        set_action(grammar, &mut action[id], id, (*t).into(), Action::Shift(target))?
                    }
                    Symbol::NonTerminal(nt) => {
                        goto[id].insert(*nt, target);
                    }
                }
            }

            for item in state.items.iter().filter(|i| automaton.is_reduce_item(**i)) {
                match item.rule {
                    Rule::Augmented => {
                        set_action(grammar, &mut action[id], id, Lookahead::End, Action::Accept)?
                    }
                    Rule::Production(p) => {
                        for lookahead in ff.follow(grammar.production(p).lhs()) {
                            set_action(grammar, &mut action[id], id, *lookahead, Action::Reduce(p))?;
                        }
                    }
                }
            }
        }

        debug!(
            "SLR(1) table built: {} states, {} actions, {} gotos",
            state_count,
            action.iter().map(|row| row.len()).sum::<usize>(),
            goto.iter().map(|row| row.len()).sum::<usize>()
        );
        Ok(Self {
            automaton,
            action,
            goto,
        })
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.automaton.grammar()
    }

    pub fn automaton(&self) -> &LR0Automaton<'g> {
        &self.automaton
    }

    pub fn state_count(&self) -> usize {
        self.action.len()
    }

    /// `Action::Error` for an empty cell.
    pub fn action(&self, state: StateId, lookahead: Lookahead) -> Action {
        self.action[state]
            .get(&lookahead)
            .copied()
            .unwrap_or(Action::Error)
    }

    pub fn goto(&self, state: StateId, nt: NonTerminalId) -> Option<StateId> {
        self.goto[state].get(&nt).copied()
    }

    pub fn action_row(&self, state: StateId) -> &BTreeMap<Lookahead, Action> {
        &self.action[state]
    }

    pub fn goto_row(&self, state: StateId) -> &BTreeMap<NonTerminalId, StateId> {
        &self.goto[state]
    }

    /// Lookaheads with a non-error action in `state`.
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = Lookahead> + '_ {
        self.action[state].keys().copied()
    }

    pub fn action_entries(&self) -> impl Iterator<Item = (StateId, Lookahead, Action)> + '_ {
        self.action.iter().enumerate().flat_map(|(state, row)| {
            row.iter()
                .map(move |(lookahead, action)| (state, *lookahead, *action))
        })
    }

    pub fn goto_entries(&self) -> impl Iterator<Item = (StateId, NonTerminalId, StateId)> + '_ {
        self.goto.iter().enumerate().flat_map(|(state, row)| {
            row.iter().map(move |(nt, target)| (state, *nt, *target))
        })
    }

    /// Display form of a reduce or accept action.
    pub fn reduction_to_string(&self, action: Action) -> String {
        reduction_to_string(self.grammar(), action)
    }
}

impl Grammar {
    pub fn generate_slr_parsing_table(&self) -> Result<SlrTable<'_>, TableError> {
        SlrTable::build(self)
    }
}

fn set_action(
    grammar: &Grammar,
    row: &mut BTreeMap<Lookahead, Action>,
    state: StateId,
    lookahead: Lookahead,
    action: Action,
) -> Result<(), TableError> {
    claim_cell(row, lookahead, action)
        .map_err(|existing| conflict(grammar, state, lookahead, existing, action))
}

fn conflict(
    grammar: &Grammar,
    state: StateId,
    lookahead: Lookahead,
    existing: Action,
    new: Action,
) -> TableError {
    let lookahead = grammar.lookahead_name(lookahead).to_string();
    match (existing, new) {
        (Action::Shift(shift), reduce) | (reduce, Action::Shift(shift)) => {
            TableError::ShiftReduceConflict {
                state,
                lookahead,
                shift,
                reduce: reduction_to_string(grammar, reduce),
            }
        }
        (first, second) => TableError::ReduceReduceConflict {
            state,
            lookahead,
            first: reduction_to_string(grammar, first),
            second: reduction_to_string(grammar, second),
        },
    }
}

fn reduction_to_string(grammar: &Grammar, action: Action) -> String {
    match action {
        Action::Reduce(p) => grammar.production_to_string(p),
        Action::Accept => format!(
            "{} -> {}",
            grammar.augmented_start_name(),
            grammar.non_terminal_name(grammar.start())
        ),
        Action::Shift(s) => format!("shift {}", s),
        Action::Error => "error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::{fixtures, GrammarBuilder};

    fn lookahead(g: &Grammar, name: &str) -> Lookahead {
        g.terminal_id(name).map(Lookahead::from).unwrap_or(Lookahead::End)
    }

    #[test]
    fn left_recursive_arithmetic_builds() {
        let g = fixtures::arithmetic_lr();
        let table = g.generate_slr_parsing_table().unwrap();
        assert_eq!(table.state_count(), 12);

        let e = g.non_terminal_id("E").unwrap();
        let after_e = table.goto(0, e).unwrap();
        assert_eq!(table.action(after_e, Lookahead::End), Action::Accept);
        assert!(matches!(
            table.action(after_e, lookahead(&g, "+")),
            Action::Shift(_)
        ));

        let Action::Shift(after_id) = table.action(0, lookahead(&g, "id")) else {
            panic!("expected a shift on id");
        };
        let f_id = g.productions_of(g.non_terminal_id("F").unwrap())[1];
        for t in ["+", "*", ")", "$"] {
            assert_eq!(table.action(after_id, lookahead(&g, t)), Action::Reduce(f_id));
        }
        assert_eq!(table.action(after_id, lookahead(&g, "id")), Action::Error);
        assert_eq!(table.expected(after_id).count(), 4);
    }

    #[test]
    fn dangling_else_is_shift_reduce() {
        let g = fixtures::dangling_else();
        assert_eq!(
            g.generate_slr_parsing_table().unwrap_err(),
            TableError::ShiftReduceConflict {
                state: 7,
                lookahead: "else".to_string(),
                shift: 8,
                reduce: "S -> if E then S".to_string(),
            }
        );
    }

    #[test]
    fn reduce_reduce() {
        let mut b = GrammarBuilder::new();
        b.add_terminal("x");
        for nt in ["S", "A", "B"] {
            b.add_non_terminal(nt);
        }
        b.add_production("S", &["A"]);
        b.add_production("S", &["B"]);
        b.add_production("A", &["x"]);
        b.add_production("B", &["x"]);
        b.set_start("S");
        let g = b.validate().unwrap();
        assert_eq!(
            g.generate_slr_parsing_table().unwrap_err(),
            TableError::ReduceReduceConflict {
                state: 1,
                lookahead: "$".to_string(),
                first: "A -> x".to_string(),
                second: "B -> x".to_string(),
            }
        );
    }

    #[test]
    fn epsilon_grammar_builds() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_slr_parsing_table().unwrap();
        let e_prime = g.non_terminal_id("E'").unwrap();
        let epsilon = g.productions_of(e_prime)[1];
        assert!(table
            .action_entries()
            .any(|(_, l, a)| l == Lookahead::End && a == Action::Reduce(epsilon)));
    }

    #[test]
    fn construction_is_deterministic() {
        let g = fixtures::arithmetic_lr();
        let copy = g.clone();
        let a = SlrTable::build(&g).unwrap();
        let b = SlrTable::build(&copy).unwrap();
        assert_eq!(a.action_entries().collect::<Vec<_>>(), b.action_entries().collect::<Vec<_>>());
        assert_eq!(a.goto_entries().collect::<Vec<_>>(), b.goto_entries().collect::<Vec<_>>());
        assert_eq!(a.automaton().states(), b.automaton().states());
    }
}
