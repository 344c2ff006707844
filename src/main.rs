use std::{fs, io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use grammar_tables::{parse_tokens, Grammar, ParserConfig, Result, Strategy};

#[derive(Parser)]
#[command(name = "grammar-tables")]
#[command(about = "FIRST/FOLLOW sets, LL(1) and SLR(1) tables, and table-driven parsing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GrammarArgs {
    /// Grammar file (default: stdin)
    #[arg(short, long)]
    grammar: Option<PathBuf>,

    /// Read the grammar as a JSON definition; implied by a `.json` extension
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print analyses of a grammar
    Analyze {
        #[command(flatten)]
        grammar: GrammarArgs,

        /// What to print, in order
        #[arg(value_enum, required = true)]
        outputs: Vec<Output>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Plain)]
        format: Format,
    },
    /// Parse a whitespace separated token sequence
    Parse {
        #[command(flatten)]
        grammar: GrammarArgs,

        /// Table that drives the parse: ll1 or slr
        #[arg(short, long, default_value_t = Strategy::Ll1)]
        strategy: Strategy,

        /// Abort after this many automaton steps
        #[arg(long)]
        max_steps: Option<usize>,

        /// Print the steps as JSON
        #[arg(short, long)]
        output_json: bool,

        tokens: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// Nullable, first and follow
    Nff,
    /// LL(1) parsing table
    Ll1,
    /// LR(0) automaton
    Lr0,
    /// SLR(1) parsing table
    Slr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Plain,
    Latex,
    Json,
}

impl GrammarArgs {
    fn load(&self) -> Result<Grammar> {
        let input = match &self.grammar {
            Some(path) => fs::read_to_string(path)?,
            None => io::read_to_string(io::stdin())?,
        };
        let json = self.json
            || self
                .grammar
                .as_ref()
                .and_then(|p| p.extension())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let g = if json {
            Grammar::from_json(&input)?
        } else {
            Grammar::parse(&input)?
        };
        info!(
            "loaded grammar: {} terminals, {} nonterminals, {} productions",
            g.terminal_count(),
            g.non_terminal_count(),
            g.production_count()
        );
        Ok(g)
    }
}

fn analyze(g: &Grammar, outputs: &[Output], format: Format) -> Result<()> {
    for output in outputs {
        let text = match output {
            Output::Prod => {
                let t = g.to_production_output_vec();
                match format {
                    Format::Plain => t.to_plaintext(),
                    Format::Latex => t.to_latex(),
                    Format::Json => serde_json::to_string(&t)?,
                }
            }
            Output::Nff => {
                let t = g.to_non_terminal_output_vec();
                match format {
                    Format::Plain => t.to_plaintext(),
                    Format::Latex => t.to_latex(),
                    Format::Json => t.to_json()?,
                }
            }
            Output::Ll1 => {
                let t = g.generate_ll1_parsing_table()?.to_output();
                match format {
                    Format::Plain => t.to_plaintext(),
                    Format::Latex => t.to_latex(),
                    Format::Json => serde_json::to_string(&t)?,
                }
            }
            Output::Lr0 => {
                let t = grammar_tables::grammar::LR0Automaton::build(g);
                match format {
                    Format::Plain => t.to_plaintext(),
                    Format::Latex => t.to_latex(),
                    Format::Json => serde_json::to_string(&t.to_output())?,
                }
            }
            Output::Slr => {
                let t = g.generate_slr_parsing_table()?.to_output();
                match format {
                    Format::Plain => t.to_plaintext(),
                    Format::Latex => t.to_latex(),
                    Format::Json => serde_json::to_string(&t)?,
                }
            }
        };
        println!("{}", text);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            grammar,
            outputs,
            format,
        } => analyze(&grammar.load()?, &outputs, format),
        Commands::Parse {
            grammar,
            strategy,
            max_steps,
            output_json,
            tokens,
        } => {
            let g = grammar.load()?;
            let tokens: Vec<&str> = tokens.iter().flat_map(|t| t.split_whitespace()).collect();
            let config = ParserConfig { max_steps };
            let steps = parse_tokens(&g, strategy, &tokens, config)?;
            if output_json {
                println!("{}", serde_json::to_string(&steps)?);
            } else {
                println!("{}", steps.to_plaintext());
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
