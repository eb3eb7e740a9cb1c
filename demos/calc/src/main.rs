// Copyright 2021 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! A worked example: a grammar written as text, built into a table at
//! startup rather than generated ahead of time, driven over a `lexan` token
//! stream. Each positional argument is parsed and evaluated as one
//! statement; `name = expr` assigns, a bare `expr` prints its value.

#[macro_use]
extern crate lazy_static;

use std::collections::HashMap;
use std::fmt;
use std::process::exit;
use std::str::FromStr;

use clap::crate_authors;
use structopt::StructOpt;

use lalr1::{build, Algorithm, BuildOptions, Grammar, Parser, Table};
use lalr1_meta::{build_grammar, parse_grammar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tok {
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    LParen,
    RParen,
    Number,
    Ident,
    End,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tok::Plus => write!(f, "+"),
            Tok::Minus => write!(f, "-"),
            Tok::Star => write!(f, "*"),
            Tok::Slash => write!(f, "/"),
            Tok::Assign => write!(f, "="),
            Tok::LParen => write!(f, "("),
            Tok::RParen => write!(f, ")"),
            Tok::Number => write!(f, "number"),
            Tok::Ident => write!(f, "identifier"),
            Tok::End => write!(f, "end of input"),
        }
    }
}

fn resolve_terminal(name: &str) -> Option<Tok> {
    match name {
        "plus" => Some(Tok::Plus),
        "minus" => Some(Tok::Minus),
        "star" => Some(Tok::Star),
        "slash" => Some(Tok::Slash),
        "assign" => Some(Tok::Assign),
        "lparen" => Some(Tok::LParen),
        "rparen" => Some(Tok::RParen),
        "number" => Some(Tok::Number),
        "ident" => Some(Tok::Ident),
        _ => None,
    }
}

/// `Stmt -> ident assign Expr | Expr` is deliberately unambiguous under one
/// token of lookahead: after shifting `ident`, the only production that
/// reaches `assign` next is the assignment rule, while `Expr -> ident .`'s
/// lookahead (propagated from `Stmt -> . Expr`) is just the end marker — so
/// LALR(1) picks the right action with no precedence help at all. Unary
/// `minus` gets its own `300 right` override so `-2 * 3` parses as
/// `(-2) * 3`, independent of binary minus's `100 left`.
const GRAMMAR_TEXT: &str = "
Stmt -> ident assign Expr ;
Stmt -> Expr ;
Expr -> Expr plus Expr // 100 left ;
Expr -> Expr minus Expr // 100 left ;
Expr -> Expr star Expr // 200 left ;
Expr -> Expr slash Expr // 200 left ;
Expr -> minus Expr // 300 right ;
Expr -> lparen Expr rparen ;
Expr -> number ;
Expr -> ident ;
";

lazy_static! {
    static ref LEXICON: lexan::LexicalAnalyzer<Tok> = lexan::LexicalAnalyzer::new(
        &[
            (Tok::Plus, "+"),
            (Tok::Minus, "-"),
            (Tok::Star, "*"),
            (Tok::Slash, "/"),
            (Tok::Assign, "="),
            (Tok::LParen, "("),
            (Tok::RParen, ")"),
        ],
        &[
            (Tok::Number, r"([0-9]+(\.[0-9]+)?)"),
            (Tok::Ident, r"([a-zA-Z]+[a-zA-Z0-9_]*)"),
        ],
        &[r"(\s+)"],
        Tok::End,
    );
}

#[derive(Debug, Clone, Default)]
enum Attribute {
    #[default]
    None,
    Number(f64),
    Ident(String),
}

impl From<lexan::Token<Tok>> for Attribute {
    fn from(token: lexan::Token<Tok>) -> Self {
        match token.tag() {
            Tok::Number => Attribute::Number(f64::from_str(token.lexeme()).unwrap()),
            Tok::Ident => Attribute::Ident(token.lexeme().to_string()),
            _ => Attribute::None,
        }
    }
}

impl Attribute {
    fn number(&self) -> f64 {
        match self {
            Attribute::Number(n) => *n,
            _ => panic!("attribute is not a number"),
        }
    }

    fn ident(&self) -> &str {
        match self {
            Attribute::Ident(s) => s,
            _ => panic!("attribute is not an identifier"),
        }
    }
}

struct Calc {
    grammar: Grammar<Tok>,
    table: Table<Tok>,
    variables: HashMap<String, f64>,
}

impl Calc {
    fn new(options: BuildOptions) -> Self {
        let parsed = parse_grammar(GRAMMAR_TEXT).expect("the built-in grammar text is well-formed");
        let grammar = build_grammar(&parsed, resolve_terminal, Tok::End).expect("the built-in grammar is valid");
        let table = build(&grammar, options).expect("the built-in grammar has no unresolved conflicts");
        Self {
            grammar,
            table,
            variables: HashMap::new(),
        }
    }

    fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }
}

impl Parser<Tok, Attribute> for Calc {
    fn lexical_analyzer(&self) -> &lexan::LexicalAnalyzer<Tok> {
        &LEXICON
    }

    fn grammar(&self) -> &Grammar<Tok> {
        &self.grammar
    }

    fn table(&self) -> &Table<Tok> {
        &self.table
    }

    fn do_semantic_action<F: FnMut(String, String)>(&mut self, rule: usize, mut rhs: Vec<Attribute>, _inject: F) -> Attribute {
        match rule {
            0 => {
                // Stmt -> ident assign Expr
                let value = rhs.pop().unwrap().number();
                let _assign = rhs.pop().unwrap();
                let name = rhs.pop().unwrap().ident().to_string();
                self.variables.insert(name, value);
                Attribute::None
            }
            1 => {
                // Stmt -> Expr
                let value = rhs.pop().unwrap().number();
                println!("{value}");
                Attribute::Number(value)
            }
            2 => Attribute::Number(rhs[0].number() + rhs[2].number()),
            3 => Attribute::Number(rhs[0].number() - rhs[2].number()),
            4 => Attribute::Number(rhs[0].number() * rhs[2].number()),
            5 => Attribute::Number(rhs[0].number() / rhs[2].number()),
            6 => Attribute::Number(-rhs[1].number()),
            7 => Attribute::Number(rhs[1].number()),
            8 => rhs.pop().unwrap(),
            9 => {
                // Expr -> ident
                let name = rhs.pop().unwrap().ident().to_string();
                match self.variables.get(&name) {
                    Some(value) => Attribute::Number(*value),
                    None => {
                        eprintln!("undefined variable: {name}");
                        Attribute::Number(0.0)
                    }
                }
            }
            _ => unreachable!("rule {rule} has no semantic action"),
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "calc", about = "A worked example for the lalr1 table builder and driver.", author = crate_authors!())]
struct CLOptions {
    /// Number of shift/reduce and/or reduce/reduce conflicts the grammar is expected
    /// to have (the build fails if the actual count exceeds this).
    #[structopt(short, long, default_value = "0")]
    expect: usize,
    /// The LR construction algorithm to use.
    #[structopt(long, default_value = "lalr1", possible_values = &["slr", "lr1", "lalr1"])]
    algorithm: String,
    /// Statements to evaluate, e.g. "a = 1 + 2 * 3" or "a + 1".
    statements: Vec<String>,
}

fn main() {
    let cl_options = CLOptions::from_args();
    let algorithm = match cl_options.algorithm.as_str() {
        "slr" => Algorithm::Slr,
        "lr1" => Algorithm::Lr1,
        _ => Algorithm::Lalr1,
    };
    let mut calc = Calc::new(BuildOptions {
        algorithm,
        resolve_silently: true,
        expect: cl_options.expect,
    });

    if calc.table.conflicts_exceeded {
        eprintln!(
            "grammar has {} conflicts, more than the {} expected",
            calc.table.log.len(),
            cl_options.expect
        );
        exit(1);
    }

    let mut had_error = false;
    for statement in &cl_options.statements {
        if let Err(err) = calc.parse_text(statement.clone(), statement.clone()) {
            eprintln!("{err}");
            had_error = true;
        }
    }
    if had_error {
        exit(1);
    }
}
