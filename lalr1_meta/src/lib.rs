// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Meta-grammar textual frontend: parses a grammar written as plain text
//! into a name-based [`ParsedGrammar`], then resolves terminal names
//! against a caller-supplied table to build a [`lalr1::Grammar`].
//!
//! Grounded in `original_source/parser.py`'s `Yappy_grammar.gsrules`: the
//! same `rulesym`/`rhssep`/`opsym`/`rulesep`/`ruleend` shape (`->`,
//! whitespace, `//`, `|`, `;`), minus the embedded semantic-rule
//! (`{{ ... }}`) clauses, since this crate's driver dispatches semantic
//! actions by rule index rather than by a source-embedded callable.
//! A symbol is a nonterminal if it appears as some rule's left-hand side
//! and a terminal otherwise, exactly as `gsrules`/`CFGrammar` infer it from
//! the rule set with no separate `%token` declarations.
//!
//! Example input:
//! ```text
//! E -> E + E // 100 left ;
//! E -> E * E // 200 left ;
//! E -> ( E ) ;
//! E -> id ;
//! ```

use std::collections::HashSet;
use std::fmt::{self, Debug, Display};

use lazy_static::lazy_static;
use regex::Regex;

use lalr1::{Associativity, Grammar, GrammarBuilder, GrammarError, GrammarSymbol, Precedence};

lazy_static! {
    static ref RULE_ARROW: Regex = Regex::new(r"->").unwrap();
    static ref OPERATOR_CLAUSE: Regex = Regex::new(r"//\s*(\d+)\s+(left|right|nonassoc)\s*$").unwrap();
}

/// One `lhs -> rhs... [// level assoc]` alternative, names not yet resolved
/// to a caller's terminal type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProduction {
    pub lhs: String,
    pub rhs: Vec<String>,
    pub precedence: Option<(u32, Associativity)>,
}

/// The whole text grammar: every alternative found, in the order they were
/// written. The start symbol is the lhs of the first production, matching
/// [`GrammarBuilder::non_terminal`]'s first-call-is-start convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGrammar {
    pub productions: Vec<ParsedProduction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaError {
    /// A `->`-bearing clause didn't parse (lhs empty, rhs empty, or a
    /// malformed `// level assoc` clause).
    Malformed(String),
    /// An rhs symbol isn't a known nonterminal and the caller's resolver
    /// didn't recognize it as a terminal either.
    UnknownSymbol(String),
    Grammar(GrammarError),
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetaError::Malformed(clause) => write!(f, "malformed grammar clause: \"{clause}\""),
            MetaError::UnknownSymbol(name) => write!(f, "symbol \"{name}\" is neither a declared nonterminal nor a recognized terminal"),
            MetaError::Grammar(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MetaError {}

impl From<GrammarError> for MetaError {
    fn from(e: GrammarError) -> Self {
        MetaError::Grammar(e)
    }
}

fn parse_associativity(text: &str) -> Associativity {
    match text {
        "left" => Associativity::Left,
        "right" => Associativity::Right,
        _ => Associativity::NonAssoc,
    }
}

/// Parses `text` into a [`ParsedGrammar`]. `;` separates alternatives (the
/// `ruleend`); each alternative must contain exactly one `->` (`rulesym`);
/// rhs symbols are whitespace-separated (`rhssep`); an optional trailing
/// `// <level> <left|right|nonassoc>` attaches a precedence override to
/// that alternative (`opsym`). `rulesep` (`|`) is not supported — repeat
/// the lhs on each alternative instead, as `gsrules` itself does once the
/// sugar is expanded.
pub fn parse_grammar(text: &str) -> Result<ParsedGrammar, MetaError> {
    let mut productions = Vec::new();
    for clause in text.split(';') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        let arrow = RULE_ARROW
            .find(clause)
            .ok_or_else(|| MetaError::Malformed(clause.to_string()))?;
        let lhs = clause[..arrow.start()].trim();
        if lhs.is_empty() {
            return Err(MetaError::Malformed(clause.to_string()));
        }
        let rest = clause[arrow.end()..].trim();
        if rest.is_empty() {
            return Err(MetaError::Malformed(clause.to_string()));
        }
        let (rhs_text, precedence) = if let Some(caps) = OPERATOR_CLAUSE.captures(rest) {
            let level: u32 = caps[1].parse().map_err(|_| MetaError::Malformed(clause.to_string()))?;
            let associativity = parse_associativity(&caps[2]);
            let rhs_text = rest[..rest.len() - caps[0].len()].trim();
            (rhs_text, Some((level, associativity)))
        } else {
            (rest, None)
        };
        let rhs: Vec<String> = if rhs_text == "[]" {
            vec![]
        } else {
            rhs_text.split_whitespace().map(str::to_string).collect()
        };
        productions.push(ParsedProduction {
            lhs: lhs.to_string(),
            rhs,
            precedence,
        });
    }
    if productions.is_empty() {
        return Err(MetaError::Malformed(text.to_string()));
    }
    Ok(ParsedGrammar { productions })
}

/// Resolves `parsed` against `resolve` (rhs symbol name -> terminal tag,
/// `None` if the name isn't a recognized terminal) and builds a
/// [`Grammar`]. A name is treated as a nonterminal whenever it appears as
/// some production's lhs, regardless of whether `resolve` would also
/// recognize it.
///
/// A `// level assoc` clause is always a per-production precedence
/// override (matching `gsrules`, where the clause attaches to one
/// alternative's tuple directly rather than populating a separate
/// terminal-level table) — it is not also registered as that terminal's
/// default precedence, so a rule like `Expr -> minus Expr // 300 right`
/// can give unary `minus` a different precedence than the binary
/// `Expr -> Expr minus Expr` rule uses. A grammar that wants every
/// occurrence of an operator to share one precedence should give every
/// one of its productions the same override, or call
/// [`GrammarBuilder::set_operator`] itself before invoking this function's
/// caller-supplied `resolve`.
pub fn build_grammar<T, F>(parsed: &ParsedGrammar, mut resolve: F, end_marker: T) -> Result<Grammar<T>, MetaError>
where
    T: Copy + Eq + Ord + Debug + Display,
    F: FnMut(&str) -> Option<T>,
{
    let nonterminal_names: HashSet<&str> = parsed.productions.iter().map(|p| p.lhs.as_str()).collect();

    let mut builder: GrammarBuilder<T> = GrammarBuilder::new();
    // Intern every nonterminal up front, in first-appearance order, so the
    // start symbol is fixed before any rhs-side forward reference is seen.
    for production in &parsed.productions {
        builder.non_terminal(&production.lhs);
    }

    for production in &parsed.productions {
        let lhs = builder.non_terminal(&production.lhs);
        let mut rhs = Vec::with_capacity(production.rhs.len());
        for symbol_name in &production.rhs {
            if nonterminal_names.contains(symbol_name.as_str()) {
                rhs.push(GrammarSymbol::NonTerminal(builder.non_terminal(symbol_name)));
            } else if let Some(terminal) = resolve(symbol_name) {
                rhs.push(GrammarSymbol::Terminal(terminal));
            } else {
                return Err(MetaError::UnknownSymbol(symbol_name.clone()));
            }
        }
        let precedence = production.precedence.map(|(level, associativity)| Precedence { level, associativity });
        builder.add_production(lhs, rhs, precedence);
    }

    Ok(builder.build(end_marker)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Tok {
        Id,
        Plus,
        Star,
        LParen,
        RParen,
        End,
    }

    impl fmt::Display for Tok {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn resolve(name: &str) -> Option<Tok> {
        match name {
            "id" => Some(Tok::Id),
            "+" => Some(Tok::Plus),
            "*" => Some(Tok::Star),
            "(" => Some(Tok::LParen),
            ")" => Some(Tok::RParen),
            _ => None,
        }
    }

    #[test]
    fn parses_rules_separated_by_semicolons() {
        let parsed = parse_grammar(
            "E -> E + E // 100 left ;
             E -> E * E // 200 left ;
             E -> ( E ) ;
             E -> id ;",
        )
        .unwrap();
        assert_eq!(parsed.productions.len(), 4);
        assert_eq!(parsed.productions[0].lhs, "E");
        assert_eq!(parsed.productions[0].precedence, Some((100, Associativity::Left)));
        assert_eq!(parsed.productions[3].rhs, vec!["id".to_string()]);
    }

    #[test]
    fn rejects_a_clause_with_no_arrow() {
        assert!(parse_grammar("E + E ;").is_err());
    }

    #[test]
    fn builds_a_working_grammar_from_text() {
        let parsed = parse_grammar(
            "E -> E + E // 100 left ;
             E -> E * E // 200 left ;
             E -> ( E ) ;
             E -> id ;",
        )
        .unwrap();
        let grammar = build_grammar(&parsed, resolve, Tok::End).unwrap();
        assert_eq!(grammar.rule_count(), 5); // 4 alternatives + augmented start
        assert_eq!(grammar.non_terminal_count(), 1);
    }

    #[test]
    fn rejects_an_unresolvable_terminal() {
        let parsed = parse_grammar("E -> nope ;").unwrap();
        let err = build_grammar(&parsed, resolve, Tok::End).unwrap_err();
        assert!(matches!(err, MetaError::UnknownSymbol(_)));
    }

    #[test]
    fn per_production_overrides_are_independent() {
        // `+` carries 100/left from the first rule; the second rule's own
        // `200 left` override is a distinct, independent declaration (not
        // a conflicting redeclaration of `+`'s precedence), since `//`
        // clauses attach to one production, not a shared terminal table.
        let parsed = parse_grammar(
            "E -> E + E // 100 left ;
             E -> E * E // 200 left ;
             E -> id ;",
        )
        .unwrap();
        let grammar = build_grammar(&parsed, resolve, Tok::End).unwrap();
        assert_eq!(grammar.production(0).precedence.unwrap().level, 100);
        assert_eq!(grammar.production(1).precedence.unwrap().level, 200);
    }
}
