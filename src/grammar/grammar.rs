use std::sync::OnceLock;

use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;
use serde::Serialize;

use super::{
    error::GrammarValidationError, nullable_first_follow::FirstFollow, END_MARK, EPSILON,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TerminalId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NonTerminalId(pub usize);

/// Index of a production in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProductionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(TerminalId),
    NonTerminal(NonTerminalId),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn terminal(&self) -> Option<TerminalId> {
        match self {
            Symbol::Terminal(t) => Some(*t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn non_terminal(&self) -> Option<NonTerminalId> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::NonTerminal(nt) => Some(*nt),
        }
    }
}

/// A terminal or the end-of-input marker.
///
/// The end marker lives outside the terminal alphabet, so a grammar may
/// declare a terminal literally named `$` without clashing with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookahead {
    Terminal(TerminalId),
    End,
}

impl From<TerminalId> for Lookahead {
    fn from(t: TerminalId) -> Self {
        Lookahead::Terminal(t)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    lhs: NonTerminalId,
    rhs: Vec<Symbol>,
}

impl Production {
    pub fn lhs(&self) -> NonTerminalId {
        self.lhs
    }

    /// Empty for an ε production.
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// Collects declarations by name. Nothing is checked until [`GrammarBuilder::validate`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    terminals: IndexSet<String>,
    non_terminals: IndexSet<String>,
    productions: Vec<(String, Vec<String>)>,
    start: Option<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_terminal(&mut self, name: impl Into<String>) -> &mut Self {
        self.terminals.insert(name.into());
        self
    }

    pub fn add_non_terminal(&mut self, name: impl Into<String>) -> &mut Self {
        self.non_terminals.insert(name.into());
        self
    }

    pub fn add_production(&mut self, lhs: &str, rhs: &[&str]) -> &mut Self {
        self.productions.push((
            lhs.to_string(),
            rhs.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn set_start(&mut self, name: impl Into<String>) -> &mut Self {
        self.start = Some(name.into());
        self
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.contains(name)
    }

    /// Checks every declaration and freezes the grammar.
    pub fn validate(self) -> Result<Grammar, GrammarValidationError> {
        let start_name = self
            .start
            .as_deref()
            .ok_or(GrammarValidationError::StartSymbolUnset)?;

        if let Some(name) = self
            .terminals
            .iter()
            .find(|t| self.non_terminals.contains(t.as_str()))
        {
            return Err(GrammarValidationError::ConflictingDeclaration(name.clone()));
        }

        let start = self
            .non_terminals
            .get_index_of(start_name)
            .map(NonTerminalId)
            .ok_or_else(|| GrammarValidationError::UndeclaredStartSymbol(start_name.to_string()))?;

        let mut productions = Vec::with_capacity(self.productions.len());
        let mut by_lhs: Vec<Vec<ProductionId>> = vec![Vec::new(); self.non_terminals.len()];

        for (lhs_name, rhs_names) in &self.productions {
            let lhs = self
                .non_terminals
                .get_index_of(lhs_name.as_str())
                .map(NonTerminalId)
                .ok_or_else(|| GrammarValidationError::UndeclaredLeftSide(lhs_name.clone()))?;

            let rhs = rhs_names
                .iter()
                .map(|name| {
                    if let Some(idx) = self.terminals.get_index_of(name.as_str()) {
                        Ok(Symbol::Terminal(TerminalId(idx)))
                    } else if let Some(idx) = self.non_terminals.get_index_of(name.as_str()) {
                        Ok(Symbol::NonTerminal(NonTerminalId(idx)))
                    } else {
                        Err(GrammarValidationError::UndeclaredSymbol {
                            lhs: lhs_name.clone(),
                            symbol: name.clone(),
                        })
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            by_lhs[lhs.0].push(ProductionId(productions.len()));
            productions.push(Production { lhs, rhs });
        }

        if let Some(idx) = by_lhs.iter().position(|ps| ps.is_empty()) {
            return Err(GrammarValidationError::NoProductions(
                self.non_terminals[idx].clone(),
            ));
        }

        let nullable = compute_nullable(self.non_terminals.len(), &productions);

        Ok(Grammar {
            terminals: self.terminals,
            non_terminals: self.non_terminals,
            productions,
            by_lhs,
            start,
            nullable,
            first_follow: OnceLock::new(),
        })
    }
}

/// A validated, immutable grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: IndexSet<String>,
    non_terminals: IndexSet<String>,
    productions: Vec<Production>,
    by_lhs: Vec<Vec<ProductionId>>,
    start: NonTerminalId,
    nullable: Vec<bool>,
    first_follow: OnceLock<FirstFollow>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    pub fn start(&self) -> NonTerminalId {
        self.start
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn non_terminal_count(&self) -> usize {
        self.non_terminals.len()
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = (TerminalId, &str)> {
        self.terminals
            .iter()
            .enumerate()
            .map(|(i, name)| (TerminalId(i), name.as_str()))
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = (NonTerminalId, &str)> {
        self.non_terminals
            .iter()
            .enumerate()
            .map(|(i, name)| (NonTerminalId(i), name.as_str()))
    }

    pub fn terminal_id(&self, name: &str) -> Option<TerminalId> {
        self.terminals.get_index_of(name).map(TerminalId)
    }

    pub fn non_terminal_id(&self, name: &str) -> Option<NonTerminalId> {
        self.non_terminals.get_index_of(name).map(NonTerminalId)
    }

    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.terminal_id(name)
            .map(Symbol::Terminal)
            .or_else(|| self.non_terminal_id(name).map(Symbol::NonTerminal))
    }

    pub fn terminal_name(&self, t: TerminalId) -> &str {
        self.terminals[t.0].as_str()
    }

    pub fn non_terminal_name(&self, nt: NonTerminalId) -> &str {
        self.non_terminals[nt.0].as_str()
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(t) => self.terminal_name(t),
            Symbol::NonTerminal(nt) => self.non_terminal_name(nt),
        }
    }

    pub fn lookahead_name(&self, lookahead: Lookahead) -> &str {
        match lookahead {
            Lookahead::Terminal(t) => self.terminal_name(t),
            Lookahead::End => END_MARK,
        }
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.0]
    }

    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    pub fn production_iter(&self) -> impl Iterator<Item = (ProductionId, &Production)> {
        self.productions
            .iter()
            .enumerate()
            .map(|(i, p)| (ProductionId(i), p))
    }

    /// Productions of `nt` in declaration order.
    pub fn productions_of(&self, nt: NonTerminalId) -> &[ProductionId] {
        &self.by_lhs[nt.0]
    }

    pub fn is_nullable(&self, nt: NonTerminalId) -> bool {
        self.nullable[nt.0]
    }

    pub fn is_symbol_nullable(&self, symbol: Symbol) -> bool {
        match symbol {
            Symbol::Terminal(_) => false,
            Symbol::NonTerminal(nt) => self.is_nullable(nt),
        }
    }

    /// The empty sequence is nullable.
    pub fn is_sequence_nullable(&self, symbols: &[Symbol]) -> bool {
        symbols.iter().all(|s| self.is_symbol_nullable(*s))
    }

    pub fn nullable_iter(&self) -> impl Iterator<Item = NonTerminalId> + '_ {
        self.nullable
            .iter()
            .enumerate()
            .filter(|(_, n)| **n)
            .map(|(i, _)| NonTerminalId(i))
    }

    pub fn rhs_names(&self, id: ProductionId) -> Vec<&str> {
        self.production(id)
            .rhs()
            .iter()
            .map(|s| self.symbol_name(*s))
            .collect()
    }

    /// `A -> x y`, or `A -> ε` for an empty right side.
    pub fn production_to_string(&self, id: ProductionId) -> String {
        let production = self.production(id);
        let right = if production.is_epsilon() {
            EPSILON.to_string()
        } else {
            self.rhs_names(id).iter().join(" ")
        };
        format!("{} -> {}", self.non_terminal_name(production.lhs()), right)
    }

    /// A name for the augmented start symbol that no declared symbol uses.
    pub fn augmented_start_name(&self) -> String {
        let mut name = self.non_terminal_name(self.start).to_string();
        while self.symbol(&name).is_some() {
            name.push('\'');
        }
        name
    }

    /// FIRST and FOLLOW sets, computed on first use and shared afterwards.
    pub fn first_follow(&self) -> &FirstFollow {
        self.first_follow.get_or_init(|| FirstFollow::compute(self))
    }
}

fn compute_nullable(non_terminal_count: usize, productions: &[Production]) -> Vec<bool> {
    let mut nullable = vec![false; non_terminal_count];
    let mut rounds = 0;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for production in productions {
            if nullable[production.lhs.0] {
                continue;
            }
            let all_nullable = production.rhs.iter().all(|s| match s {
                Symbol::Terminal(_) => false,
                Symbol::NonTerminal(nt) => nullable[nt.0],
            });
            if all_nullable {
                nullable[production.lhs.0] = true;
                changed = true;
            }
        }
    }
    debug!(
        "nullable set converged after {} rounds ({} of {} nonterminals)",
        rounds,
        nullable.iter().filter(|n| **n).count(),
        non_terminal_count
    );
    nullable
}
