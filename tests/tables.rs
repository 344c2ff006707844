use std::thread;

use grammar_tables::grammar::{Action, Grammar, GrammarDefinition, LL1Table, SlrTable, TableError};
use grammar_tables::parser::{ParseError, PredictiveParser};
use grammar_tables::{parse_tokens, Error, ParserConfig, Strategy};
use pretty_assertions::assert_eq;

const ARITHMETIC: &str = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id";
const ARITHMETIC_LL1: &str =
    "E -> T E'\nE' -> + T E' | ε\nT -> F T'\nT' -> * F T' | ε\nF -> ( E ) | id";
const DANGLING_ELSE: &str = "S -> if E then S | if E then S else S | other\nE -> cond";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn tables_are_shareable() {
    assert_send_sync::<Grammar>();
    assert_send_sync::<LL1Table<'static>>();
    assert_send_sync::<SlrTable<'static>>();
}

#[test]
fn concurrent_parses_share_one_table() {
    init();
    let g = Grammar::parse(ARITHMETIC_LL1).unwrap();
    let ll1 = g.generate_ll1_parsing_table().unwrap();
    let slr = g.generate_slr_parsing_table().unwrap();
    let inputs: Vec<Vec<&str>> = vec![
        vec!["id"],
        vec!["id", "+", "id"],
        vec!["(", "id", "*", "id", ")"],
        vec!["id", "+", "+"],
        vec!["(", "id"],
    ];

    thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|tokens| {
                let (ll1, slr) = (&ll1, &slr);
                s.spawn(move || (ll1.parse(tokens).is_ok(), slr.parse(tokens).is_ok()))
            })
            .collect();
        let results: Vec<(bool, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(
            results,
            vec![
                (true, true),
                (true, true),
                (true, true),
                (false, false),
                (false, false),
            ]
        );
    });
}

#[test]
fn rebuilding_gives_identical_tables() {
    let g = Grammar::parse(ARITHMETIC).unwrap();
    let first = g.generate_slr_parsing_table().unwrap();
    let second = g.generate_slr_parsing_table().unwrap();
    assert_eq!(
        first.action_entries().collect::<Vec<_>>(),
        second.action_entries().collect::<Vec<_>>()
    );
    assert_eq!(
        first.to_output().to_plaintext(),
        second.to_output().to_plaintext()
    );

    let g = Grammar::parse(ARITHMETIC_LL1).unwrap();
    let first = g.generate_ll1_parsing_table().unwrap();
    let second = g.generate_ll1_parsing_table().unwrap();
    assert_eq!(
        first.entries().collect::<Vec<_>>(),
        second.entries().collect::<Vec<_>>()
    );
}

#[test]
fn dangling_else_is_rejected_by_both_builders() {
    let g = Grammar::parse(DANGLING_ELSE).unwrap();
    assert!(matches!(
        g.generate_slr_parsing_table(),
        Err(TableError::ShiftReduceConflict { ref lookahead, .. }) if lookahead == "else"
    ));
    assert!(matches!(
        g.generate_ll1_parsing_table(),
        Err(TableError::AmbiguousGrammar { ref lookahead, .. }) if lookahead == "if"
    ));
}

#[test]
fn left_recursion_only_fits_slr() {
    let g = Grammar::parse(ARITHMETIC).unwrap();
    assert!(g.generate_ll1_parsing_table().is_err());
    let table = g.generate_slr_parsing_table().unwrap();
    assert_eq!(table.automaton().states().len(), 12);
    assert!(table
        .action_entries()
        .any(|(_, _, action)| action == Action::Accept));
}

#[test]
fn json_and_text_grammars_agree() {
    let json = r#"{
        "terminals": ["+", "*", "(", ")", "id"],
        "non_terminals": ["E", "T", "F"],
        "start": "E",
        "productions": [
            { "lhs": "E", "rhs": ["E", "+", "T"] },
            { "lhs": "E", "rhs": ["T"] },
            { "lhs": "T", "rhs": ["T", "*", "F"] },
            { "lhs": "T", "rhs": ["F"] },
            { "lhs": "F", "rhs": ["(", "E", ")"] },
            { "lhs": "F", "rhs": ["id"] }
        ]
    }"#;
    let from_json = Grammar::from_json(json).unwrap();
    let from_text = Grammar::parse(ARITHMETIC).unwrap();
    assert_eq!(
        from_json.to_production_output_vec().to_plaintext(),
        from_text.to_production_output_vec().to_plaintext()
    );
    assert_eq!(
        from_json.to_non_terminal_output_vec().to_plaintext(),
        from_text.to_non_terminal_output_vec().to_plaintext()
    );

    let def = GrammarDefinition::from_json(json).unwrap();
    assert_eq!(def.productions.len(), 6);
}

#[test]
fn parse_tokens_respects_config() {
    let g = Grammar::parse(ARITHMETIC_LL1).unwrap();
    let tokens = ["id", "+", "id", "*", "id"];

    let steps = parse_tokens(&g, Strategy::Ll1, &tokens, ParserConfig::default()).unwrap();
    assert_eq!(steps.steps.len(), 11);

    let err = parse_tokens(&g, Strategy::Slr, &tokens, ParserConfig::with_max_steps(5)).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::StepLimitExceeded(5))));

    let table = g.generate_ll1_parsing_table().unwrap();
    let parser = PredictiveParser::with_config(&table, ParserConfig::with_max_steps(1000));
    assert!(parser.parse(&tokens).is_ok());
}

#[test]
fn syntax_error_message() {
    let g = Grammar::parse(ARITHMETIC).unwrap();
    let err = parse_tokens(&g, Strategy::Slr, &["id", "+"], ParserConfig::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "syntax error at position 2: found end of input, expected ( or id"
    );
}
