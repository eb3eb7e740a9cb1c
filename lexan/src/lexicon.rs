// Copyright 2021 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fmt::Debug;

use crate::error::LexanError;
use crate::matcher::{LiteralMatcher, RegexMatcher, SkipMatcher};

/// The compiled table backing a [`crate::LexicalAnalyzer`]: a literal-string
/// table, a regex table, a set of skippable patterns, and the handle
/// returned once the input is exhausted.
#[derive(Debug)]
pub struct Lexicon<H: Copy + Ord + Debug> {
    literal_matcher: LiteralMatcher<H>,
    regex_matcher: RegexMatcher<H>,
    skip_matcher: SkipMatcher,
    end_marker: H,
}

impl<H: Copy + Ord + Debug> Lexicon<H> {
    pub fn new<'a>(
        literal_lexemes: &[(H, &'a str)],
        regex_lexemes: &[(H, &'a str)],
        skippable: &[&'a str],
        end_marker: H,
    ) -> Result<Self, LexanError<'a, H>> {
        let literal_matcher = LiteralMatcher::new(literal_lexemes)?;
        let regex_matcher = RegexMatcher::new(regex_lexemes)?;
        let skip_matcher = SkipMatcher::new(skippable)?;
        Ok(Self {
            literal_matcher,
            regex_matcher,
            skip_matcher,
            end_marker,
        })
    }

    pub fn end_marker(&self) -> H {
        self.end_marker
    }

    pub fn skippable_count(&self, text: &str) -> usize {
        self.skip_matcher.skippable_count(text)
    }

    pub fn longest_literal_match(&self, text: &str) -> Option<(H, usize)> {
        self.literal_matcher.longest_match(text)
    }

    pub fn longest_regex_matches(&self, text: &str) -> (Vec<H>, usize) {
        self.regex_matcher.longest_matches(text)
    }

    /// Number of bytes to skip forward from an unrecognized position before
    /// trying to match again: the next UTF-8 character boundary, so a single
    /// bad byte never aborts the whole lex.
    pub fn distance_to_next_valid_byte(&self, text: &str) -> usize {
        let mut index = 1;
        while index < text.len() && !text.is_char_boundary(index) {
            index += 1;
        }
        index.max(1).min(text.len().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_duplicate_handles() {
        let result = Lexicon::new(&[(1u32, "a"), (1u32, "b")], &[], &[], 0u32);
        assert_eq!(result.unwrap_err(), LexanError::DuplicateHandle(1));
    }

    #[test]
    fn distance_to_next_valid_byte_skips_one_ascii_byte() {
        let lexicon: Lexicon<u32> = Lexicon::new(&[], &[], &[], 0u32).unwrap();
        assert_eq!(lexicon.distance_to_next_valid_byte("@@@"), 1);
    }
}
