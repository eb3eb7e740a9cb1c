// Copyright 2021 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::convert::From;
use std::fmt;

/// Errors raised while *constructing* a [`crate::LexicalAnalyzer`] from its
/// literal/regex/skip tables — malformed specifications, never runtime
/// tokenization failures (see [`crate::Error`] for those).
#[derive(Debug, PartialEq)]
pub enum LexanError<'a, T> {
    DuplicateHandle(T),
    DuplicatePattern(&'a str),
    EmptyPattern(T),
    RegexError(regex::Error),
}

impl<'a, T> From<regex::Error> for LexanError<'a, T> {
    fn from(error: regex::Error) -> Self {
        LexanError::RegexError(error)
    }
}

impl<'a, T: fmt::Debug> fmt::Display for LexanError<'a, T> {
    fn fmt(&self, dest: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexanError::DuplicateHandle(handle) => {
                write!(dest, "duplicate lexeme handle: {:?}", handle)
            }
            LexanError::DuplicatePattern(pattern) => {
                write!(dest, "duplicate lexeme pattern: \"{}\"", pattern)
            }
            LexanError::EmptyPattern(handle) => {
                write!(dest, "empty pattern for handle: {:?}", handle)
            }
            LexanError::RegexError(error) => write!(dest, "invalid regex: {}", error),
        }
    }
}

impl<'a, T: fmt::Debug> std::error::Error for LexanError<'a, T> {}
