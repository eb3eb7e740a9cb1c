// Copyright 2021 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fmt::{self, Debug, Display};

/// A human-friendly position within a labelled piece of source text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    line_number: usize,
    offset: usize,
    label: String,
}

impl Location {
    pub fn new(label: String) -> Self {
        Self {
            line_number: 1,
            offset: 1,
            label,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Location {
    fn fmt(&self, dest: &mut fmt::Formatter) -> fmt::Result {
        if !self.label.is_empty() {
            if self.label.contains(' ') || self.label.contains('\t') {
                write!(
                    dest,
                    "\"{}\":{}:{}",
                    self.label, self.line_number, self.offset
                )
            } else {
                write!(dest, "{}:{}:{}", self.label, self.line_number, self.offset)
            }
        } else {
            write!(dest, "{}:{}", self.line_number, self.offset)
        }
    }
}

impl Location {
    pub(crate) fn advance_past(&mut self, text: &str, length: usize) {
        let slice = &text[..length];
        let mut i = 0;
        while i < length {
            if let Some(eol_i) = slice[i..].find("\r\n") {
                self.line_number += 1;
                self.offset = 1;
                i += eol_i + 2;
            } else if let Some(eol_i) = slice[i..].find('\n') {
                self.line_number += 1;
                self.offset = 1;
                i += eol_i + 1;
            } else {
                self.offset += length - i;
                i = length;
            }
        }
    }
}

/// A runtime tokenization failure: everything the matcher tables
/// themselves can go wrong with once they are already built.
#[derive(Clone, Debug)]
pub enum Error<T: Display + Copy> {
    UnexpectedText(String, Location),
    AmbiguousMatches(Vec<T>, String, Location),
    AdvancedWhenEmpty(Location),
}

impl<T: Display + Copy> Error<T> {
    pub fn is_unexpected_text(&self) -> bool {
        matches!(self, Error::UnexpectedText(_, _))
    }

    pub fn is_ambiguous_match(&self) -> bool {
        matches!(self, Error::AmbiguousMatches(_, _, _))
    }

    pub fn is_advance_when_empty(&self) -> bool {
        matches!(self, Error::AdvancedWhenEmpty(_))
    }

    pub fn location(&self) -> &Location {
        match self {
            Error::UnexpectedText(_, location) => location,
            Error::AmbiguousMatches(_, _, location) => location,
            Error::AdvancedWhenEmpty(location) => location,
        }
    }
}

impl<T: Debug + Display + Copy> fmt::Display for Error<T> {
    fn fmt(&self, dest: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnexpectedText(text, location) => {
                write!(dest, "unexpected text \"{}\" at: {}.", text, location)
            }
            Error::AmbiguousMatches(tags, text, location) => write!(
                dest,
                "ambiguous matches {:?} for \"{}\" at: {}.",
                tags, text, location
            ),
            Error::AdvancedWhenEmpty(location) => {
                write!(dest, "advanced past end of text at: {}.", location)
            }
        }
    }
}

impl<T: Debug + Display + Copy> std::error::Error for Error<T> {}

/// One lexeme: its terminal tag, the matched text, and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T: Display + Copy + Eq> {
    tag: T,
    lexeme: String,
    location: Location,
}

impl<T: Display + Copy + Eq> Token<T> {
    pub(crate) fn new(tag: T, lexeme: String, location: Location) -> Self {
        Self {
            tag,
            lexeme,
            location,
        }
    }

    pub fn tag(&self) -> &T {
        &self.tag
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}
