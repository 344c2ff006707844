use std::collections::BTreeMap;

use log::debug;

use super::{
    conflict::claim_cell,
    error::TableError,
    grammar::{Grammar, Lookahead, NonTerminalId, ProductionId},
};

/// Predictive parsing table: at most one production per
/// (nonterminal, lookahead) cell.
#[derive(Debug, Clone)]
pub struct LL1Table<'g> {
    grammar: &'g Grammar,
    rows: Vec<BTreeMap<Lookahead, ProductionId>>,
}

impl<'g> LL1Table<'g> {
    /// Fails on the first cell that would receive a second, different
    /// production. Productions are visited in declaration order.
    pub fn build(grammar: &'g Grammar) -> Result<Self, TableError> {
        let ff = grammar.first_follow();
        let mut rows: Vec<BTreeMap<Lookahead, ProductionId>> =
            vec![BTreeMap::new(); grammar.non_terminal_count()];

        for (id, production) in grammar.production_iter() {
            let lhs = production.lhs();
            let first = ff.first_of_sequence(grammar, production.rhs());
            let follow = if first.epsilon {
                Some(ff.follow(lhs))
            } else {
                None
            };

            let lookaheads = first
                .terminals
                .iter()
                .map(|t| Lookahead::Terminal(*t))
                .chain(follow.into_iter().flatten().copied());

            for lookahead in lookaheads {
                claim_cell(&mut rows[lhs.0], lookahead, id).map_err(|existing| {
                    TableError::AmbiguousGrammar {
                        non_terminal: grammar.non_terminal_name(lhs).to_string(),
                        lookahead: grammar.lookahead_name(lookahead).to_string(),
                        first: grammar.production_to_string(existing),
                        second: grammar.production_to_string(id),
                    }
                })?;
            }
        }

        let table = Self { grammar, rows };
        debug!("LL(1) table built with {} entries", table.len());
        Ok(table)
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn get(&self, nt: NonTerminalId, lookahead: Lookahead) -> Option<ProductionId> {
        self.rows[nt.0].get(&lookahead).copied()
    }

    pub fn row(&self, nt: NonTerminalId) -> &BTreeMap<Lookahead, ProductionId> {
        &self.rows[nt.0]
    }

    /// Lookaheads with an entry in the row of `nt`.
    pub fn viable(&self, nt: NonTerminalId) -> impl Iterator<Item = Lookahead> + '_ {
        self.rows[nt.0].keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (NonTerminalId, Lookahead, ProductionId)> + '_ {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .map(move |(lookahead, p)| (NonTerminalId(i), *lookahead, *p))
        })
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(&self) -> Result<LL1Table<'_>, TableError> {
        LL1Table::build(self)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::{fixtures, GrammarBuilder};

    fn cell(table: &LL1Table, nt: &str, lookahead: &str) -> Option<String> {
        let g = table.grammar();
        let nt = g.non_terminal_id(nt).unwrap();
        let lookahead = match g.terminal_id(lookahead) {
            Some(t) => Lookahead::Terminal(t),
            None => Lookahead::End,
        };
        table.get(nt, lookahead).map(|p| g.production_to_string(p))
    }

    #[test]
    fn arithmetic_cells() {
        let g = fixtures::arithmetic_ll1();
        let table = g.generate_ll1_parsing_table().unwrap();
        assert_eq!(cell(&table, "E", "id").as_deref(), Some("E -> T E'"));
        assert_eq!(cell(&table, "E", "(").as_deref(), Some("E -> T E'"));
        assert_eq!(cell(&table, "E'", "+").as_deref(), Some("E' -> + T E'"));
        assert_eq!(cell(&table, "E'", ")").as_deref(), Some("E' -> ε"));
        assert_eq!(cell(&table, "E'", "$").as_deref(), Some("E' -> ε"));
        assert_eq!(cell(&table, "T'", "+").as_deref(), Some("T' -> ε"));
        assert_eq!(cell(&table, "T'", "*").as_deref(), Some("T' -> * F T'"));
        assert_eq!(cell(&table, "F", "id").as_deref(), Some("F -> id"));
        assert_eq!(cell(&table, "E", "+"), None);
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn first_first_overlap() {
        let mut b = GrammarBuilder::new();
        b.add_terminal("a").add_terminal("b").add_terminal("c");
        b.add_non_terminal("S");
        b.add_production("S", &["a", "b"]);
        b.add_production("S", &["a", "c"]);
        b.set_start("S");
        let g = b.validate().unwrap();
        assert_eq!(
            g.generate_ll1_parsing_table().unwrap_err(),
            TableError::AmbiguousGrammar {
                non_terminal: "S".to_string(),
                lookahead: "a".to_string(),
                first: "S -> a b".to_string(),
                second: "S -> a c".to_string(),
            }
        );
    }

    #[test]
    fn first_follow_overlap() {
        let mut b = GrammarBuilder::new();
        b.add_terminal("a");
        b.add_non_terminal("S").add_non_terminal("A");
        b.add_production("S", &["A", "a"]);
        b.add_production("A", &["a"]);
        b.add_production("A", &[]);
        b.set_start("S");
        let g = b.validate().unwrap();
        assert_eq!(
            g.generate_ll1_parsing_table().unwrap_err(),
            TableError::AmbiguousGrammar {
                non_terminal: "A".to_string(),
                lookahead: "a".to_string(),
                first: "A -> a".to_string(),
                second: "A -> ε".to_string(),
            }
        );
    }

    #[test]
    fn left_recursion_is_rejected() {
        let g = fixtures::arithmetic_lr();
        assert!(matches!(
            g.generate_ll1_parsing_table(),
            Err(TableError::AmbiguousGrammar { .. })
        ));
    }

    #[test]
    fn construction_is_deterministic() {
        let g = fixtures::arithmetic_ll1();
        let copy = g.clone();
        let a: Vec<_> = LL1Table::build(&g).unwrap().entries().collect();
        let b: Vec<_> = LL1Table::build(&copy).unwrap().entries().collect();
        assert_eq!(a, b);
    }
}
