use std::collections::HashSet;

use crowbook_text_processing::escape;
use itertools::Itertools;
use serde::Serialize;

use super::{
    grammar::{Grammar, Lookahead, ProductionId},
    ll1_parsing_table::LL1Table,
    lr_dfa::{Item, LR0Automaton, StateId},
    slr_parsing_table::{Action, SlrTable},
    EPSILON,
};

fn latex_symbol(s: &str, terminals: &HashSet<&str>) -> String {
    if terminals.contains(s) {
        format!("\\text{{{}}}", escape::tex(s))
    } else {
        escape::tex(s).to_string()
    }
}

/// Right-aligns every column and separates cells with ` | `.
fn align_columns(output: &[Vec<String>]) -> String {
    let columns = output.first().map(|row| row.len()).unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .map(|row| row[j].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .join(" | ")
        })
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    /// An empty right side is ε.
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| {
                if right.is_empty() {
                    EPSILON.to_string()
                } else {
                    right.join(" ")
                }
            })
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminals: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                if right.is_empty() {
                    "\\epsilon".to_string()
                } else {
                    right.iter().map(|s| latex_symbol(s, terminals)).join(" \\ ")
                }
            })
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, &self.terminals)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .join("\\\\\n")
    }
}

impl Grammar {
    fn terminal_name_set(&self) -> HashSet<&str> {
        self.terminal_iter().map(|(_, t)| t).collect()
    }

    pub fn production_output(&self, id: ProductionId) -> ProductionOutput<'_> {
        ProductionOutput {
            left: self.non_terminal_name(self.production(id).lhs()),
            rights: vec![self.rhs_names(id)],
        }
    }

    pub fn to_production_output_vec(&self) -> ProductionOutputVec<'_> {
        let productions = self
            .non_terminal_iter()
            .map(|(nt, name)| ProductionOutput {
                left: name,
                rights: self
                    .productions_of(nt)
                    .iter()
                    .map(|p| self.rhs_names(*p))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminal_name_set(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data.iter().map(|s| s.to_plaintext()).join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self.data.iter().map(|e| e.to_latex()).join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec<'_> {
        let ff = self.first_follow();
        let data = self
            .non_terminal_iter()
            .map(|(nt, name)| {
                let mut first: Vec<&str> =
                    ff.first(nt).iter().map(|t| self.terminal_name(*t)).collect();
                if self.is_nullable(nt) {
                    first.push(EPSILON);
                }
                NonTerminalOutput {
                    name,
                    nullable: self.is_nullable(nt),
                    first,
                    follow: ff
                        .follow(nt)
                        .iter()
                        .map(|l| self.lookahead_name(*l))
                        .collect(),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }

    /// Terminals in declaration order followed by the end marker.
    pub(crate) fn lookahead_columns(&self) -> Vec<Lookahead> {
        self.terminal_iter()
            .map(|(t, _)| Lookahead::Terminal(t))
            .chain(std::iter::once(Lookahead::End))
            .collect()
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTable<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<Option<ProductionOutput<'a>>>)>,
    #[serde(skip)]
    terminal_set: HashSet<&'a str>,
}

impl LL1ParsingTable<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|production| {
                production
                    .as_ref()
                    .map(|p| p.to_plaintext(left.chars().count(), false))
                    .unwrap_or_default()
            }));
            output.push(line);
        }
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let output = self
            .rows
            .iter()
            .map(|(left, row)| {
                std::iter::once(escape::tex(*left).to_string())
                    .chain(row.iter().map(|production| {
                        production
                            .as_ref()
                            .map(|p| p.to_latex(false, &self.terminal_set))
                            .unwrap_or_default()
                    }))
                    .join(" & ")
            })
            .join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl<'g> LL1Table<'g> {
    pub fn to_output(&self) -> LL1ParsingTable<'g> {
        let g = self.grammar();
        let columns = g.lookahead_columns();
        let rows = g
            .non_terminal_iter()
            .map(|(nt, name)| {
                let row = columns
                    .iter()
                    .map(|l| self.get(nt, *l).map(|p| g.production_output(p)))
                    .collect();
                (name, row)
            })
            .collect();
        LL1ParsingTable {
            terminals: columns.iter().map(|l| g.lookahead_name(*l)).collect(),
            rows,
            terminal_set: g.terminal_name_set(),
        }
    }
}

#[derive(Serialize)]
pub struct LRStateOutput {
    kernel: Vec<String>,
    extend: Vec<String>,
    edges: Vec<(String, StateId)>,
}

#[derive(Serialize)]
pub struct LRAutomatonOutput {
    states: Vec<LRStateOutput>,
    start: StateId,
}

impl LR0Automaton<'_> {
    /// `E -> E .+ T`, with the dot glued to the symbol after it.
    pub fn item_to_plaintext(&self, item: Item) -> String {
        let production = self.rule_rhs_names(item.rule);
        let mut output = String::new();
        output.push_str(&self.rule_lhs_name(item.rule));
        output.push_str(" -> ");
        for (i, s) in production.iter().enumerate() {
            if i != 0 {
                output.push(' ');
            }
            if i == item.dot {
                output.push('.');
            }
            output.push_str(s);
        }
        if item.dot == production.len() {
            output.push('.');
        }
        output
    }

    pub fn item_to_latex(&self, item: Item) -> String {
        let mut right: Vec<String> = Vec::new();
        for (i, s) in self.rule_rhs_names(item.rule).iter().enumerate() {
            if i == item.dot {
                right.push(".".to_string());
            }
            right.push(escape::tex(*s).to_string());
        }
        if item.dot == right.len() {
            right.push(".".to_string());
        }
        format!(
            "${} \\rightarrow {}$",
            escape::tex(self.rule_lhs_name(item.rule)),
            right.join(" ")
        )
    }

    fn extend_items(&self, id: StateId) -> impl Iterator<Item = Item> + '_ {
        let state = self.state(id);
        state.items.difference(&state.kernel).copied()
    }

    pub fn to_output(&self) -> LRAutomatonOutput {
        let g = self.grammar();
        let states = self
            .states()
            .iter()
            .enumerate()
            .map(|(id, state)| LRStateOutput {
                kernel: state
                    .kernel
                    .iter()
                    .map(|i| self.item_to_plaintext(*i))
                    .collect(),
                extend: self
                    .extend_items(id)
                    .map(|i| self.item_to_plaintext(i))
                    .collect(),
                edges: state
                    .edges
                    .iter()
                    .map(|(s, v)| (g.symbol_name(*s).to_string(), *v))
                    .collect(),
            })
            .collect();
        LRAutomatonOutput { states, start: 0 }
    }

    pub fn to_plaintext(&self) -> String {
        let states = self
            .to_output()
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let kernel = s.kernel.join("\n");
                let extend = if s.extend.is_empty() {
                    String::new()
                } else {
                    format!("\n---\n{}", s.extend.join("\n"))
                };
                let edges = if s.edges.is_empty() {
                    String::new()
                } else {
                    format!(
                        "\n===\n{}",
                        s.edges
                            .iter()
                            .map(|(k, v)| format!("- {} -> {}", k, v))
                            .join("\n")
                    )
                };
                format!("I{}\n{}{}{}", i, kernel, extend, edges)
            })
            .join("\n\n");

        format!("{}\n\nstart: 0", states)
    }

    fn node_to_latex(&self, id: StateId) -> String {
        let state = self.state(id);
        let content = state
            .kernel
            .iter()
            .copied()
            .chain(self.extend_items(id))
            .map(|item| self.item_to_latex(item))
            .join(" \\\\ \n");
        format!(
            "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
            id,
            if id > 0 {
                if id % 2 == 0 {
                    format!(" [below of = I_{}] ", id - 2)
                } else {
                    format!(" [right of = I_{}] ", id - 1)
                }
            } else {
                String::new()
            },
            id,
            content
        )
    }

    fn edge_to_latex(&self, id: StateId) -> String {
        let g = self.grammar();
        self.state(id)
            .edges
            .iter()
            .map(|(e, v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == *v { "[loop left]" } else { "[right]" },
                    escape::tex(g.symbol_name(*e)),
                    v
                )
            })
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let ids = 0..self.states().len();
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            ids.clone()
                .map(|i| self.node_to_latex(i))
                .chain(ids.map(|i| self.edge_to_latex(i)))
                .join("\n")
        )
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LRParsingTableAction<'a> {
    Shift { state: StateId },
    Reduce { production: ProductionOutput<'a> },
    Accept,
}

impl LRParsingTableAction<'_> {
    pub fn to_plaintext(&self) -> String {
        match self {
            LRParsingTableAction::Reduce { production } => {
                format!("r({})", production.to_plaintext(0, false))
            }
            LRParsingTableAction::Shift { state } => format!("s{}", state),
            LRParsingTableAction::Accept => "acc".to_string(),
        }
    }

    pub fn to_latex(&self, terminal_set: &HashSet<&str>) -> String {
        match self {
            LRParsingTableAction::Reduce { production } => {
                format!("reduce ${}$", production.to_latex(false, terminal_set))
            }
            LRParsingTableAction::Shift { state } => format!("shift {}", state),
            LRParsingTableAction::Accept => "accept".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct LRParsingTable<'a> {
    terminals: Vec<&'a str>,
    non_terminals: Vec<&'a str>,
    action: Vec<Vec<Option<LRParsingTableAction<'a>>>>,
    goto: Vec<Vec<Option<StateId>>>,
    #[serde(skip)]
    terminal_set: HashSet<&'a str>,
}

impl LRParsingTable<'_> {
    fn rows(&self, render: impl Fn(&LRParsingTableAction) -> String) -> Vec<Vec<String>> {
        self.action
            .iter()
            .zip(self.goto.iter())
            .enumerate()
            .map(|(i, (r1, r2))| {
                std::iter::once(i.to_string())
                    .chain(r1.iter().map(|a| a.as_ref().map(&render).unwrap_or_default()))
                    .chain(
                        r2.iter()
                            .map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()),
                    )
                    .collect()
            })
            .collect()
    }

    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = vec![std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| s.to_string()),
            )
            .collect()];
        output.extend(self.rows(|a| a.to_plaintext()));
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let first_row = std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| escape::tex(*s).to_string()),
            )
            .join(" & ");

        let content = self
            .rows(|a| a.to_latex(&self.terminal_set))
            .iter()
            .map(|row| row.join(" & "))
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

impl<'g> SlrTable<'g> {
    pub fn to_output(&self) -> LRParsingTable<'g> {
        let g = self.grammar();
        let columns = g.lookahead_columns();
        let non_terminals: Vec<_> = g.non_terminal_iter().collect();

        let action = (0..self.state_count())
            .map(|state| {
                columns
                    .iter()
                    .map(|l| match self.action(state, *l) {
                        Action::Shift(s) => Some(LRParsingTableAction::Shift { state: s }),
                        Action::Reduce(p) => Some(LRParsingTableAction::Reduce {
                            production: g.production_output(p),
                        }),
                        Action::Accept => Some(LRParsingTableAction::Accept),
                        Action::Error => None,
                    })
                    .collect()
            })
            .collect();
        let goto = (0..self.state_count())
            .map(|state| {
                non_terminals
                    .iter()
                    .map(|(nt, _)| self.goto(state, *nt))
                    .collect()
            })
            .collect();

        LRParsingTable {
            terminals: columns.iter().map(|l| g.lookahead_name(*l)).collect(),
            non_terminals: non_terminals.iter().map(|(_, name)| *name).collect(),
            action,
            goto,
            terminal_set: g.terminal_name_set(),
        }
    }
}

/// One line per step of a successful parse.
#[derive(Debug, Serialize)]
pub struct ParseStepsOutput {
    pub steps: Vec<String>,
}

impl ParseStepsOutput {
    /// A leftmost derivation as produced by the predictive parser.
    pub fn from_derivation(g: &Grammar, derivation: &[ProductionId]) -> Self {
        Self {
            steps: derivation
                .iter()
                .map(|p| g.production_to_string(*p))
                .collect(),
        }
    }

    /// A shift/reduce trace as produced by the shift-reduce parser.
    pub fn from_trace(table: &SlrTable, trace: &[Action]) -> Self {
        Self {
            steps: trace
                .iter()
                .map(|action| match action {
                    Action::Shift(s) => format!("shift {}", s),
                    Action::Reduce(_) => format!("reduce {}", table.reduction_to_string(*action)),
                    Action::Accept => "accept".to_string(),
                    Action::Error => "error".to_string(),
                })
                .collect(),
        }
    }

    pub fn to_plaintext(&self) -> String {
        self.steps.join("\n")
    }
}
