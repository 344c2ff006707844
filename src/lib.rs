extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

mod error;
pub mod grammar;
pub mod parser;

pub use error::{Error, Result};
pub use grammar::{Grammar, GrammarBuilder, LL1Table, SlrTable};
pub use parser::{ParserConfig, Strategy};

use grammar::pretty_print::ParseStepsOutput;
use parser::{PredictiveParser, ShiftReduceParser};

/// Builds the table `strategy` asks for and runs a single parse of `tokens`.
pub fn parse_tokens<S: AsRef<str>>(
    g: &Grammar,
    strategy: Strategy,
    tokens: &[S],
    config: ParserConfig,
) -> Result<ParseStepsOutput> {
    match strategy {
        Strategy::Ll1 => {
            let table = g.generate_ll1_parsing_table()?;
            let derivation = PredictiveParser::with_config(&table, config).parse(tokens)?;
            Ok(ParseStepsOutput::from_derivation(g, &derivation))
        }
        Strategy::Slr => {
            let table = g.generate_slr_parsing_table()?;
            let trace = ShiftReduceParser::with_config(&table, config).parse(tokens)?;
            Ok(ParseStepsOutput::from_trace(&table, &trace))
        }
    }
}

fn error_to_json(e: Error) -> String {
    let mut json = serde_json::json!({ "error": e.to_string() });
    if let Error::Parse(p) = &e {
        if let Some(syntax) = p.syntax() {
            json["syntax"] = serde_json::json!(syntax);
        }
    }
    json.to_string()
}

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    Grammar::parse(grammar)
        .and_then(|g| Ok(g.to_non_terminal_output_vec().to_json()?))
        .unwrap_or_else(error_to_json)
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    Grammar::parse(grammar)
        .and_then(|g| {
            let table = g.generate_ll1_parsing_table()?;
            Ok(serde_json::to_string(&table.to_output())?)
        })
        .unwrap_or_else(error_to_json)
}

#[wasm_bindgen]
pub fn slr_table_to_json(grammar: &str) -> String {
    Grammar::parse(grammar)
        .and_then(|g| {
            let table = g.generate_slr_parsing_table()?;
            Ok(serde_json::to_string(&table.to_output())?)
        })
        .unwrap_or_else(error_to_json)
}

/// `tokens` is whitespace separated; `strategy` is `ll1` or `slr`.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, tokens: &str, strategy: &str) -> String {
    (|| -> Result<String> {
        let strategy: Strategy = strategy.parse()?;
        let g = Grammar::parse(grammar)?;
        let tokens: Vec<&str> = tokens.split_whitespace().collect();
        let steps = parse_tokens(&g, strategy, &tokens, ParserConfig::default())?;
        Ok(serde_json::to_string(&steps)?)
    })()
    .unwrap_or_else(error_to_json)
}
