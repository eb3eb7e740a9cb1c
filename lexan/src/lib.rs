// Copyright 2021 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! A small regex/literal-backed lexical analyzer satisfying the external
//! lexer contract: callers hand it literal and regex lexeme tables plus a
//! list of skippable patterns, and pull a token stream out of arbitrary
//! source text. Tokenization is independent of any particular grammar —
//! it never sees productions, only `(tag, pattern)` tables.

mod error;
mod lexicon;
mod matcher;
mod token;

pub use error::LexanError;
pub use lexicon::Lexicon;
pub use token::{Error, Location, Token};

use std::fmt::{Debug, Display};
use std::sync::Arc;

/// Public entry point: build once (typically behind a `lazy_static!`, since
/// the table is fixed for the lifetime of the program) and hand out
/// [`TokenStream`]s over arbitrary text.
#[derive(Debug)]
pub struct LexicalAnalyzer<T: Copy + Ord + Debug> {
    lexicon: Arc<Lexicon<T>>,
}

impl<T: Copy + Ord + Debug> LexicalAnalyzer<T> {
    /// Panics if the supplied tables are malformed (duplicate handle,
    /// duplicate/empty/invalid pattern) — this mirrors a `lazy_static!`
    /// table being effectively a compile-time constant: a bad table is a
    /// programmer error, not a runtime condition to recover from.
    pub fn new<'a>(
        literal_lexemes: &[(T, &'a str)],
        regex_lexemes: &[(T, &'a str)],
        skippable: &[&'a str],
        end_marker: T,
    ) -> Self {
        let lexicon = Lexicon::new(literal_lexemes, regex_lexemes, skippable, end_marker)
            .expect("invalid lexical analyzer specification");
        Self {
            lexicon: Arc::new(lexicon),
        }
    }

    /// Fallible counterpart of [`LexicalAnalyzer::new`], for callers that
    /// build their table from user-supplied (e.g. meta-grammar) data rather
    /// than a fixed literal.
    pub fn try_new<'a>(
        literal_lexemes: &[(T, &'a str)],
        regex_lexemes: &[(T, &'a str)],
        skippable: &[&'a str],
        end_marker: T,
    ) -> Result<Self, LexanError<'a, T>> {
        let lexicon = Lexicon::new(literal_lexemes, regex_lexemes, skippable, end_marker)?;
        Ok(Self {
            lexicon: Arc::new(lexicon),
        })
    }

    pub fn end_marker(&self) -> T {
        self.lexicon.end_marker()
    }

    pub fn token_stream(&self, text: String, label: String) -> TokenStream<T>
    where
        T: Display + Eq,
    {
        TokenStream::new(&self.lexicon, text, label)
    }
}

struct BasicTokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    lexicon: Arc<Lexicon<T>>,
    text: String,
    index: usize,
    location: Location,
    front: Option<Result<Token<T>, Error<T>>>,
}

impl<T> BasicTokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    fn new(lexicon: &Arc<Lexicon<T>>, text: String, label: String) -> Self {
        let location = Location::new(label);
        let mut stream = Self {
            lexicon: Arc::clone(lexicon),
            text,
            location,
            index: 0,
            front: None,
        };
        stream.advance();
        stream
    }

    fn front(&self) -> Option<Result<Token<T>, Error<T>>> {
        self.front.clone()
    }

    fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    fn advance(&mut self) {
        self.front = self.next();
    }

    fn location(&self) -> Location {
        self.location.clone()
    }

    fn advance_index_and_location(&mut self, length: usize) {
        self.location.advance_past(&self.text[self.index..], length);
        self.index += length;
    }

    fn next(&mut self) -> Option<Result<Token<T>, Error<T>>> {
        self.advance_index_and_location(self.lexicon.skippable_count(&self.text[self.index..]));
        if self.index >= self.text.len() {
            return None;
        }

        let current_location = self.location();
        let start = self.index;
        let remaining = &self.text[self.index..];
        let literal_match = self.lexicon.longest_literal_match(remaining);
        let (regex_matches, regex_length) = self.lexicon.longest_regex_matches(remaining);

        let result = if let Some((literal_tag, literal_length)) = literal_match {
            if regex_matches.len() > 1 && regex_length > literal_length {
                self.advance_index_and_location(regex_length);
                Err(Error::AmbiguousMatches(
                    regex_matches,
                    self.text[start..self.index].to_string(),
                    current_location,
                ))
            } else if regex_matches.len() == 1 && regex_length > literal_length {
                self.advance_index_and_location(regex_length);
                Ok(Token::new(
                    regex_matches[0],
                    self.text[start..self.index].to_string(),
                    current_location,
                ))
            } else {
                self.advance_index_and_location(literal_length);
                Ok(Token::new(
                    literal_tag,
                    self.text[start..self.index].to_string(),
                    current_location,
                ))
            }
        } else if regex_matches.len() == 1 {
            self.advance_index_and_location(regex_length);
            Ok(Token::new(
                regex_matches[0],
                self.text[start..self.index].to_string(),
                current_location,
            ))
        } else if regex_matches.len() > 1 {
            self.advance_index_and_location(regex_length);
            Err(Error::AmbiguousMatches(
                regex_matches,
                self.text[start..self.index].to_string(),
                current_location,
            ))
        } else {
            let distance = self.lexicon.distance_to_next_valid_byte(remaining);
            self.advance_index_and_location(distance);
            Err(Error::UnexpectedText(
                self.text[start..self.index].to_string(),
                current_location,
            ))
        };
        Some(result)
    }
}

/// A stream of tokens over one or more pieces of source text. Streams can be
/// nested via [`TokenStream::inject`] — useful for macro-expansion-like
/// composition — without losing the outer stream's position.
pub struct TokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    lexicon: Arc<Lexicon<T>>,
    stack: Vec<BasicTokenStream<T>>,
    front: Result<Token<T>, Error<T>>,
}

impl<T> TokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    fn new(lexicon: &Arc<Lexicon<T>>, text: String, label: String) -> Self {
        let mut stream = Self {
            lexicon: Arc::clone(lexicon),
            stack: vec![],
            front: Err(Error::AdvancedWhenEmpty(Location::default())),
        };
        stream.inject(text, label);
        stream
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn front(&self) -> Result<Token<T>, Error<T>> {
        self.front.clone()
    }

    /// Pushes a new piece of text onto the stream; tokens are drawn from it
    /// until exhausted, at which point the outer stream resumes.
    pub fn inject(&mut self, text: String, label: String) {
        let inner = BasicTokenStream::new(&self.lexicon, text, label);
        if !inner.is_empty() {
            self.front = inner.front().unwrap();
            self.stack.push(inner);
        }
    }

    pub fn advance(&mut self) {
        let mut depth = self.stack.len();
        if depth > 0 {
            self.stack[depth - 1].advance();
            let mut exhausted = None;
            while depth > 0 && self.stack[depth - 1].is_empty() {
                exhausted = self.stack.pop();
                depth -= 1;
            }
            self.front = if depth > 0 {
                self.stack[depth - 1].front().unwrap()
            } else {
                let end_location = exhausted.unwrap().location();
                Ok(Token::new(
                    self.lexicon.end_marker(),
                    String::new(),
                    end_location,
                ))
            };
        } else {
            let location = self.front.clone().map_or_else(|e| e.location().clone(), |t| t.location().clone());
            self.front = Err(Error::AdvancedWhenEmpty(location));
        }
    }

    pub fn front_advance(&mut self) -> Result<Token<T>, Error<T>> {
        let front = self.front.clone();
        self.advance();
        front
    }

    pub fn advance_front(&mut self) -> Result<Token<T>, Error<T>> {
        self.advance();
        self.front.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(PartialEq, Eq, Clone, Copy, Hash, Debug, PartialOrd, Ord)]
    enum Handle {
        If,
        When,
        Ident,
        End,
    }

    impl std::fmt::Display for Handle {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            use Handle::*;
            match self {
                If => write!(f, "\"if\""),
                When => write!(f, "\"when\""),
                Ident => write!(f, "Ident"),
                End => write!(f, "End"),
            }
        }
    }

    fn calc_like_analyzer() -> LexicalAnalyzer<Handle> {
        use Handle::*;
        LexicalAnalyzer::new(
            &[(If, "if"), (When, "when")],
            &[(Ident, r"[a-zA-Z]+[\w_]*")],
            &[r"(/\*(.|[\n\r])*?\*/)", r"(//[^\n\r]*)", r"(\s+)"],
            End,
        )
    }

    #[test]
    fn format_location() {
        let location = Location::new("whatever".to_string());
        assert_eq!(format!("{}", location), "whatever:1:1");
        let location = Location::new("".to_string());
        assert_eq!(format!("{}", location), "1:1");
    }

    #[test]
    fn advance_past_tracks_lines() {
        let mut location = Location::new("whatever".to_string());
        location.advance_past("String\nwith a new line in it", 11);
        assert_eq!(location.line_number(), 2);
        assert_eq!(location.offset(), 5);
    }

    #[test]
    fn token_stream_basics() {
        use Handle::*;
        let lexicon = calc_like_analyzer();
        let mut token_stream = lexicon.token_stream("      ".to_string(), "label".to_string());
        assert!(token_stream.is_empty());
        assert!(token_stream.front().is_err());

        token_stream.inject(" if nothing happens 9 ".to_string(), "another".to_string());
        assert!(!token_stream.is_empty());
        assert_eq!(*token_stream.front().unwrap().tag(), If);
        token_stream.advance();
        assert_eq!(*token_stream.front().unwrap().tag(), Ident);
        assert_eq!(token_stream.front().unwrap().lexeme(), "nothing");

        token_stream.inject("just".to_string(), "more".to_string());
        assert_eq!(token_stream.front().unwrap().lexeme(), "just");
        token_stream.advance();
        assert_eq!(token_stream.front().unwrap().lexeme(), "nothing");
        token_stream.advance();
        assert!(token_stream.front().is_ok()); // "happens"
        token_stream.advance();
        assert!(token_stream.front().is_err()); // "9" is not Ident (starts with a digit)
        token_stream.advance();
        assert_eq!(*token_stream.front().unwrap().tag(), End);
        assert!(token_stream.advance_front().is_err());
    }

    #[test]
    fn ambiguous_regex_matches_are_reported() {
        #[derive(PartialEq, Eq, Clone, Copy, Hash, Debug, PartialOrd, Ord)]
        enum T {
            Word,
            AlsoWord,
            End,
        }
        impl std::fmt::Display for T {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        let lexicon = LexicalAnalyzer::new(
            &[],
            &[(T::Word, r"[a-z]+"), (T::AlsoWord, r"[a-z][a-z]*")],
            &[r"\s+"],
            T::End,
        );
        let stream = lexicon.token_stream("abc".to_string(), "t".to_string());
        assert!(stream.front().unwrap_err().is_ambiguous_match());
    }
}
