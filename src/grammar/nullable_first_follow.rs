use std::collections::BTreeSet;

use log::debug;

use super::grammar::{Grammar, Lookahead, NonTerminalId, Symbol, TerminalId};

/// FIRST of a symbol or a symbol sequence. `epsilon` stands for ε ∈ FIRST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: BTreeSet<TerminalId>,
    pub epsilon: bool,
}

/// FIRST and FOLLOW sets of every nonterminal of a grammar.
///
/// Both are computed by iterating over all productions until no set grows,
/// so left-recursive and mutually recursive grammars terminate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    first: Vec<BTreeSet<TerminalId>>,
    follow: Vec<BTreeSet<Lookahead>>,
}

impl FirstFollow {
    pub fn compute(g: &Grammar) -> Self {
        let first = compute_first(g);
        let follow = compute_follow(g, &first);
        Self { first, follow }
    }

    /// FIRST(nt) without ε; see [`Grammar::is_nullable`] for the ε part.
    pub fn first(&self, nt: NonTerminalId) -> &BTreeSet<TerminalId> {
        &self.first[nt.0]
    }

    pub fn follow(&self, nt: NonTerminalId) -> &BTreeSet<Lookahead> {
        &self.follow[nt.0]
    }

    pub fn first_of_symbol(&self, g: &Grammar, symbol: Symbol) -> FirstSet {
        self.first_of_sequence(g, std::slice::from_ref(&symbol))
    }

    pub fn first_of_sequence(&self, g: &Grammar, symbols: &[Symbol]) -> FirstSet {
        first_of_sequence(g, &self.first, symbols)
    }
}

fn first_of_sequence(g: &Grammar, first: &[BTreeSet<TerminalId>], symbols: &[Symbol]) -> FirstSet {
    let mut result = FirstSet::default();
    for symbol in symbols {
        match symbol {
            Symbol::Terminal(t) => {
                result.terminals.insert(*t);
                return result;
            }
            Symbol::NonTerminal(nt) => {
                result.terminals.extend(first[nt.0].iter().copied());
                if !g.is_nullable(*nt) {
                    return result;
                }
            }
        }
    }
    result.epsilon = true;
    result
}

fn compute_first(g: &Grammar) -> Vec<BTreeSet<TerminalId>> {
    let mut first: Vec<BTreeSet<TerminalId>> = vec![BTreeSet::new(); g.non_terminal_count()];
    let mut rounds = 0;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for (_, production) in g.production_iter() {
            let found = first_of_sequence(g, &first, production.rhs()).terminals;
            let set = &mut first[production.lhs().0];
            let before = set.len();
            set.extend(found);
            changed |= set.len() != before;
        }
    }
    debug!("FIRST sets converged after {} rounds", rounds);
    first
}

fn compute_follow(g: &Grammar, first: &[BTreeSet<TerminalId>]) -> Vec<BTreeSet<Lookahead>> {
    let mut follow: Vec<BTreeSet<Lookahead>> = vec![BTreeSet::new(); g.non_terminal_count()];
    follow[g.start().0].insert(Lookahead::End);

    let mut rounds = 0;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for (_, production) in g.production_iter() {
            let rhs = production.rhs();
            for (i, symbol) in rhs.iter().enumerate() {
                let Symbol::NonTerminal(a) = symbol else {
                    continue;
                };
                let rest = first_of_sequence(g, first, &rhs[i + 1..]);
                let mut found: BTreeSet<Lookahead> =
                    rest.terminals.into_iter().map(Lookahead::Terminal).collect();
                if rest.epsilon {
                    found.extend(follow[production.lhs().0].iter().copied());
                }

                let set = &mut follow[a.0];
                let before = set.len();
                set.extend(found);
                changed |= set.len() != before;
            }
        }
    }
    debug!("FOLLOW sets converged after {} rounds", rounds);
    follow
}
