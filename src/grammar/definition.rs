use serde::{Deserialize, Serialize};

use super::{Grammar, GrammarBuilder};

/// Explicit grammar declaration, read from JSON.
///
/// ```json
/// {
///   "terminals": ["a"],
///   "non_terminals": ["S"],
///   "start": "S",
///   "productions": [{ "lhs": "S", "rhs": ["a", "S"] }, { "lhs": "S" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDefinition {
    pub terminals: Vec<String>,
    pub non_terminals: Vec<String>,
    pub start: String,
    pub productions: Vec<ProductionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDefinition {
    pub lhs: String,
    /// Omitted or empty for an ε production.
    #[serde(default)]
    pub rhs: Vec<String>,
}

impl GrammarDefinition {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Grammar {
    /// Reads a JSON `GrammarDefinition` and validates it.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(GrammarBuilder::from(GrammarDefinition::from_json(json)?).validate()?)
    }
}

impl From<GrammarDefinition> for GrammarBuilder {
    fn from(def: GrammarDefinition) -> Self {
        let mut g = GrammarBuilder::new();
        for t in def.terminals {
            g.add_terminal(t);
        }
        for nt in def.non_terminals {
            g.add_non_terminal(nt);
        }
        for p in &def.productions {
            let rhs: Vec<&str> = p.rhs.iter().map(|s| s.as_str()).collect();
            g.add_production(&p.lhs, &rhs);
        }
        g.set_start(def.start);
        g
    }
}
