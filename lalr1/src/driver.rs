// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Shift/reduce driver. Grounded in `src/lib.rs`'s `ParseStack`, `Symbol`,
//! and `Parser::parse_text`, stripped of the error-recovery machinery
//! (`recover_from_error`, `viable_error_recovery_states`, `error_goto_state`,
//! `push_error`, `distance_to_viable_state`, `is_last_error_state`): on a
//! syntax or lexical error this driver reports the failing `(state, token)`
//! and stops, rather than trying to resynchronize and keep parsing.

use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display};

use crate::grammar::Grammar;
use crate::symbol::{GrammarSymbol, NonTerminalId};
use crate::table::{Action, Table};

/// Everything that can stop [`Parser::parse_text`] before it accepts.
#[derive(Debug, Clone)]
pub enum ParserError<T: Copy + Debug + Display + Ord> {
    Lexical(lexan::Error<T>, BTreeSet<T>),
    Syntax(lexan::Token<T>, BTreeSet<T>),
}

fn format_set<T: Display + Ord>(set: &BTreeSet<T>) -> String {
    if set.is_empty() {
        return "nothing".to_string();
    }
    let last = set.len() - 1;
    let mut string = String::new();
    for (index, item) in set.iter().enumerate() {
        if index == 0 {
            string += &item.to_string();
        } else {
            string += if index == last { " or " } else { ", " };
            string += &item.to_string();
        }
    }
    string
}

impl<T: Copy + Debug + Display + Ord> Display for ParserError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParserError::Lexical(err, expected) => {
                write!(f, "lexical error: {err}: expected {}.", format_set(expected))
            }
            ParserError::Syntax(found, expected) => write!(
                f,
                "syntax error: expected {} found {} at {}.",
                format_set(expected),
                found.tag(),
                found.location()
            ),
        }
    }
}

impl<T: Copy + Debug + Display + Ord> std::error::Error for ParserError<T> {}

/// The shift/reduce/attribute stack. A slot is either a shifted terminal or
/// a reduced nonterminal; `states` tracks the automaton state reached after
/// each slot so `current_state` is always its top.
#[derive(Debug)]
pub struct ParseStack<T, A> {
    symbols: Vec<GrammarSymbol<T>>,
    states: Vec<usize>,
    attributes: Vec<A>,
}

impl<T: Copy, A> ParseStack<T, A> {
    fn new() -> Self {
        Self {
            symbols: vec![],
            states: vec![0],
            attributes: vec![],
        }
    }

    pub fn current_state(&self) -> usize {
        *self.states.last().unwrap()
    }

    /// The attribute `n` slots from the top (1-based), for use inside a
    /// semantic action while its rhs is still on the stack.
    pub fn at_len_minus_n(&self, n: usize) -> &A {
        let len = self.attributes.len();
        &self.attributes[len - n]
    }

    fn pop_n(&mut self, n: usize) -> Vec<A> {
        self.symbols.truncate(self.symbols.len() - n);
        self.states.truncate(self.states.len() - n);
        let split_at = self.attributes.len() - n;
        self.attributes.split_off(split_at)
    }

    fn push_terminal(&mut self, terminal: T, new_state: usize, attribute: A) {
        self.symbols.push(GrammarSymbol::Terminal(terminal));
        self.states.push(new_state);
        self.attributes.push(attribute);
    }

    fn push_non_terminal(&mut self, non_terminal: NonTerminalId, new_state: usize, attribute: A) {
        self.symbols.push(GrammarSymbol::NonTerminal(non_terminal));
        self.states.push(new_state);
        self.attributes.push(attribute);
    }
}

/// A built grammar, table, and lexer, driven one token at a time.
/// Implementors supply the lexicon, the attribute type, and the semantic
/// actions; the shift/reduce/accept loop itself is fixed.
pub trait Parser<T, A>
where
    T: Copy + Eq + Ord + Debug + Display,
    A: Default + From<lexan::Token<T>>,
{
    fn lexical_analyzer(&self) -> &lexan::LexicalAnalyzer<T>;
    fn grammar(&self) -> &Grammar<T>;
    fn table(&self) -> &Table<T>;

    /// Invoked on every reduce with the rule index and the popped rhs
    /// attributes (in left-to-right order); returns the attribute for the
    /// reduced nonterminal. `inject` lets an action push extra text back
    /// onto the token stream (macro-expansion-like use cases).
    fn do_semantic_action<F: FnMut(String, String)>(
        &mut self,
        rule: usize,
        rhs: Vec<A>,
        inject: F,
    ) -> A;

    fn parse_text(&mut self, text: String, label: String) -> Result<A, ParserError<T>> {
        let mut tokens = self.lexical_analyzer().token_stream(text, label);
        let mut stack = ParseStack::<T, A>::new();

        loop {
            let token = tokens
                .front()
                .map_err(|err| ParserError::Lexical(err, self.table().expected_terminals(stack.current_state())))?;
            match self.table().action(stack.current_state(), *token.tag()) {
                Some(Action::Accept) => {
                    return Ok(stack.attributes.pop().unwrap_or_default());
                }
                Some(Action::Shift(next_state)) => {
                    let tag = *token.tag();
                    stack.push_terminal(tag, next_state, A::from(token));
                    tokens.advance();
                }
                Some(Action::Reduce(rule)) => {
                    let production = self.grammar().production(rule);
                    let lhs = production.lhs;
                    let rhs_len = production.rhs.len();
                    let rhs = stack.pop_n(rhs_len);
                    let attribute = self.do_semantic_action(rule, rhs, |s, l| tokens.inject(s, l));
                    let next_state = self
                        .table()
                        .goto(stack.current_state(), lhs)
                        .expect("goto must be defined for every (state, lhs) a valid reduce can reach");
                    stack.push_non_terminal(lhs, next_state, attribute);
                }
                None => {
                    let expected = self.table().expected_terminals(stack.current_state());
                    return Err(ParserError::Syntax(token, expected));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::symbol::GrammarSymbol::{NonTerminal as Nt, Terminal as Te};
    use crate::table::{self, Algorithm, BuildOptions};
    use lazy_static::lazy_static;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Tok {
        Num,
        Plus,
        End,
    }

    impl Display for Tok {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    lazy_static! {
        static ref LEXER: lexan::LexicalAnalyzer<Tok> =
            lexan::LexicalAnalyzer::new(&[(Tok::Plus, "+")], &[(Tok::Num, r"[0-9]+")], &[r"(\s+)"], Tok::End);
    }

    #[derive(Debug, Clone, Default)]
    enum Attribute {
        #[default]
        None,
        Value(i64),
    }

    impl From<lexan::Token<Tok>> for Attribute {
        fn from(token: lexan::Token<Tok>) -> Self {
            match token.tag() {
                Tok::Num => Attribute::Value(token.lexeme().parse().unwrap()),
                _ => Attribute::None,
            }
        }
    }

    struct SumParser {
        grammar: Grammar<Tok>,
        table: Table<Tok>,
    }

    impl SumParser {
        fn new() -> Self {
            // E -> E Plus Num | Num
            let mut builder: GrammarBuilder<Tok> = GrammarBuilder::new();
            let e = builder.non_terminal("E");
            builder.add_production(e, vec![Nt(e), Te(Tok::Plus), Te(Tok::Num)], None);
            builder.add_production(e, vec![Te(Tok::Num)], None);
            let grammar = builder.build(Tok::End).unwrap();
            let table = table::build(
                &grammar,
                BuildOptions {
                    algorithm: Algorithm::Lalr1,
                    resolve_silently: true,
                    expect: 0,
                },
            )
            .unwrap();
            Self { grammar, table }
        }
    }

    impl Parser<Tok, Attribute> for SumParser {
        fn lexical_analyzer(&self) -> &lexan::LexicalAnalyzer<Tok> {
            &LEXER
        }

        fn grammar(&self) -> &Grammar<Tok> {
            &self.grammar
        }

        fn table(&self) -> &Table<Tok> {
            &self.table
        }

        fn do_semantic_action<F: FnMut(String, String)>(
            &mut self,
            rule: usize,
            mut rhs: Vec<Attribute>,
            _inject: F,
        ) -> Attribute {
            match rhs.len() {
                1 => rhs.pop().unwrap(),
                3 => {
                    let rhs_val = match rhs.pop().unwrap() {
                        Attribute::Value(v) => v,
                        Attribute::None => 0,
                    };
                    let _plus = rhs.pop().unwrap();
                    let lhs_val = match rhs.pop().unwrap() {
                        Attribute::Value(v) => v,
                        Attribute::None => 0,
                    };
                    Attribute::Value(lhs_val + rhs_val)
                }
                _ => unreachable!("rule {rule} has unexpected arity"),
            }
        }
    }

    #[test]
    fn sums_a_chain_of_additions() {
        let mut parser = SumParser::new();
        let result = parser.parse_text("1 + 2 + 3".to_string(), "test".to_string()).unwrap();
        match result {
            Attribute::Value(v) => assert_eq!(v, 6),
            Attribute::None => panic!("expected a value"),
        }
    }

    #[test]
    fn reports_a_syntax_error_instead_of_recovering() {
        let mut parser = SumParser::new();
        let err = parser.parse_text("1 +".to_string(), "test".to_string()).unwrap_err();
        assert!(matches!(err, ParserError::Syntax(_, _)));
    }
}
