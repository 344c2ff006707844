use indexmap::IndexSet;

use super::{error::GrammarTextError, Grammar, GrammarBuilder, EPSILON};

/// Spellings of the empty right side accepted in grammar text.
const EPSILON_ALIASES: [&str; 3] = [EPSILON, "epsilon", "ϵ"];

impl GrammarBuilder {
    /// Reads the line format
    ///
    /// ```text
    /// E  -> T E'
    /// E' -> + T E' | ε
    ///     | - T E'
    /// ```
    ///
    /// Every left side is a nonterminal, every other name is a terminal, and
    /// the first left side is the start symbol.
    pub fn parse(grammar: &str) -> Result<Self, GrammarTextError> {
        let mut raw_productions: Vec<(&str, &str)> = Vec::new();
        let mut non_terminals: IndexSet<&str> = IndexSet::new();

        let mut previous_left: Option<&str> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarTextError::TooManyArrows(i + 1));
            }
            let (left, rights) = if parts.len() == 2 {
                let left = parts[0].trim();
                if left.is_empty() {
                    return Err(GrammarTextError::EmptyLeftSide(i + 1));
                } else if left.split_whitespace().count() != 1 {
                    return Err(GrammarTextError::LeftSideWhitespace(i + 1));
                }
                (left, parts[1].trim())
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(left), Some(rights)) => (left, rights.trim()),
                    _ => return Err(GrammarTextError::MissingLeftSide(i + 1)),
                }
            };

            previous_left = Some(left);
            non_terminals.insert(left);
            raw_productions.push((left, rights));
        }

        let start = *non_terminals.first().ok_or(GrammarTextError::Empty)?;

        let mut g = Self::new();
        for nt in &non_terminals {
            g.add_non_terminal(*nt);
        }
        for (left, rights) in raw_productions {
            for right in rights.split('|') {
                let symbols: Vec<&str> = right
                    .split_whitespace()
                    .filter(|s| !EPSILON_ALIASES.contains(s))
                    .collect();
                for s in &symbols {
                    if !non_terminals.contains(s) {
                        g.add_terminal(*s);
                    }
                }
                g.add_production(left, &symbols);
            }
        }
        g.set_start(start);

        Ok(g)
    }
}

impl Grammar {
    /// Reads grammar text and validates it in one step.
    pub fn parse(grammar: &str) -> crate::Result<Self> {
        Ok(GrammarBuilder::parse(grammar)?.validate()?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::{NonTerminalId, ProductionId};

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("S -> a").unwrap();
        let s = g.non_terminal_id("S").unwrap();
        let a = g.symbol("a").unwrap();
        assert_eq!(g.start(), s);
        assert_eq!(g.production(g.productions_of(s)[0]).rhs(), &[a]);
    }

    #[test]
    fn simple_parse_with_space_and_newline() {
        let g = Grammar::parse("  S -> a \n | b c").unwrap();
        let s = g.non_terminal_id("S").unwrap();
        assert_eq!(g.productions_of(s).len(), 2);
        assert_eq!(g.rhs_names(ProductionId(1)), vec!["b", "c"]);
    }

    #[test]
    fn epsilon_alternatives() {
        let g = Grammar::parse("A -> a A | ε\nB -> A b |\nC -> epsilon").unwrap();
        assert!(g.production(ProductionId(1)).is_epsilon());
        assert!(g.production(ProductionId(3)).is_epsilon());
        assert!(g.production(ProductionId(4)).is_epsilon());
        assert_eq!(g.nullable_iter().collect::<Vec<_>>(), vec![
            NonTerminalId(0),
            NonTerminalId(1),
            NonTerminalId(2),
        ]);
    }

    #[test]
    fn left_sides_are_non_terminals() {
        let g = Grammar::parse("S -> A b\nA -> a").unwrap();
        assert!(g.non_terminal_id("A").is_some());
        assert!(g.terminal_id("A").is_none());
        assert_eq!(g.terminal_iter().map(|(_, t)| t).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn empty_parse() {
        assert_eq!(
            GrammarBuilder::parse("  \n  ").unwrap_err(),
            GrammarTextError::Empty
        );
    }

    #[test]
    fn two_rightarrows_parse() {
        assert_eq!(
            GrammarBuilder::parse("S -> a -> b").unwrap_err(),
            GrammarTextError::TooManyArrows(1)
        );
    }

    #[test]
    fn no_left_parse() {
        assert_eq!(
            GrammarBuilder::parse("-> a").unwrap_err(),
            GrammarTextError::EmptyLeftSide(1)
        );
    }

    #[test]
    fn no_previous_left_parse() {
        assert_eq!(
            GrammarBuilder::parse("| a b\n S -> a").unwrap_err(),
            GrammarTextError::MissingLeftSide(1)
        );
    }

    #[test]
    fn left_contain_space() {
        assert_eq!(
            GrammarBuilder::parse("S a S -> x").unwrap_err(),
            GrammarTextError::LeftSideWhitespace(1)
        );
    }
}
