use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use log::debug;

use super::grammar::{Grammar, ProductionId, Symbol};

pub type StateId = usize;

/// The production an item walks through. `Augmented` is `S' -> S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    Augmented,
    Production(ProductionId),
}

/// An LR(0) item: a rule with a dot position in `0..=rhs.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub rule: Rule,
    pub dot: usize,
}

impl Item {
    pub fn new(rule: Rule) -> Self {
        Self { rule, dot: 0 }
    }

    pub fn advance(self) -> Self {
        Self {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LRState {
    pub kernel: BTreeSet<Item>,
    /// The closure of `kernel`.
    pub items: BTreeSet<Item>,
    pub edges: BTreeMap<Symbol, StateId>,
}

/// Canonical collection of LR(0) item sets over the augmented grammar.
///
/// States are numbered breadth-first from the closure of `[S' -> .S]`, and
/// outgoing transitions are explored in symbol order, so numbering depends
/// only on the grammar.
#[derive(Debug, Clone)]
pub struct LR0Automaton<'g> {
    grammar: &'g Grammar,
    augmented: [Symbol; 1],
    states: Vec<LRState>,
}

impl<'g> LR0Automaton<'g> {
    pub fn build(grammar: &'g Grammar) -> Self {
        let mut automaton = Self {
            grammar,
            augmented: [Symbol::NonTerminal(grammar.start())],
            states: Vec::new(),
        };

        let kernel = BTreeSet::from([Item::new(Rule::Augmented)]);
        let items = automaton.closure(&kernel);
        let mut seen: HashMap<BTreeSet<Item>, StateId> = HashMap::new();
        seen.insert(items.clone(), 0);
        automaton.states.push(LRState {
            kernel,
            items,
            edges: BTreeMap::new(),
        });

        let mut q: VecDeque<StateId> = VecDeque::from([0]);
        while let Some(u) = q.pop_front() {
            let symbols: BTreeSet<Symbol> = automaton.states[u]
                .items
                .iter()
                .filter_map(|item| automaton.next_symbol(*item))
                .collect();

            for symbol in symbols {
                let kernel = automaton.goto_kernel(&automaton.states[u].items, symbol);
                let items = automaton.closure(&kernel);
                let v = match seen.get(&items) {
                    Some(&v) => v,
                    None => {
                        let v = automaton.states.len();
                        seen.insert(items.clone(), v);
                        automaton.states.push(LRState {
                            kernel,
                            items,
                            edges: BTreeMap::new(),
                        });
                        q.push_back(v);
                        v
                    }
                };
                automaton.states[u].edges.insert(symbol, v);
            }
        }

        debug!(
            "LR(0) canonical collection has {} states",
            automaton.states.len()
        );
        automaton
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn states(&self) -> &[LRState] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &LRState {
        &self.states[id]
    }

    pub fn transition(&self, from: StateId, symbol: Symbol) -> Option<StateId> {
        self.states[from].edges.get(&symbol).copied()
    }

    pub fn rhs(&self, rule: Rule) -> &[Symbol] {
        match rule {
            Rule::Augmented => &self.augmented,
            Rule::Production(p) => self.grammar.production(p).rhs(),
        }
    }

    /// The symbol right after the dot, `None` for a reduce item.
    pub fn next_symbol(&self, item: Item) -> Option<Symbol> {
        self.rhs(item.rule).get(item.dot).copied()
    }

    pub fn is_reduce_item(&self, item: Item) -> bool {
        item.dot == self.rhs(item.rule).len()
    }

    /// Adds `[C -> .δ]` for every item with the dot before a nonterminal `C`
    /// until nothing new appears.
    pub fn closure(&self, kernel: &BTreeSet<Item>) -> BTreeSet<Item> {
        let mut items = kernel.clone();
        let mut pending: Vec<Item> = kernel.iter().copied().collect();
        while let Some(item) = pending.pop() {
            if let Some(Symbol::NonTerminal(c)) = self.next_symbol(item) {
                for &p in self.grammar.productions_of(c) {
                    let new_item = Item::new(Rule::Production(p));
                    if items.insert(new_item) {
                        pending.push(new_item);
                    }
                }
            }
        }
        items
    }

    pub fn goto(&self, items: &BTreeSet<Item>, symbol: Symbol) -> BTreeSet<Item> {
        self.closure(&self.goto_kernel(items, symbol))
    }

    fn goto_kernel(&self, items: &BTreeSet<Item>, symbol: Symbol) -> BTreeSet<Item> {
        items
            .iter()
            .filter(|item| self.next_symbol(**item) == Some(symbol))
            .map(|item| item.advance())
            .collect()
    }

    pub fn rule_lhs_name(&self, rule: Rule) -> String {
        match rule {
            Rule::Augmented => self.grammar.augmented_start_name(),
            Rule::Production(p) => self
                .grammar
                .non_terminal_name(self.grammar.production(p).lhs())
                .to_string(),
        }
    }

    pub fn rule_rhs_names(&self, rule: Rule) -> Vec<&str> {
        self.rhs(rule)
            .iter()
            .map(|s| self.grammar.symbol_name(*s))
            .collect()
    }
}
