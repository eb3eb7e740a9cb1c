// Copyright 2021 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fmt::Debug;

use regex::Regex;

use crate::error::LexanError;

/// Longest-prefix matcher over a fixed table of literal strings.
#[derive(Debug, Default)]
pub struct LiteralMatcher<H: Copy + Debug> {
    lexemes: Vec<(H, String)>,
}

impl<H: Copy + Ord + Debug> LiteralMatcher<H> {
    pub fn new<'a>(lexeme_patterns: &[(H, &'a str)]) -> Result<Self, LexanError<'a, H>> {
        let mut handles = vec![];
        let mut lexemes = vec![];
        for (handle, pattern) in lexeme_patterns.iter() {
            if pattern.is_empty() {
                return Err(LexanError::EmptyPattern(*handle));
            }
            match handles.binary_search(handle) {
                Ok(_) => return Err(LexanError::DuplicateHandle(*handle)),
                Err(index) => handles.insert(index, *handle),
            }
            lexemes.push((*handle, (*pattern).to_string()));
        }
        Ok(Self { lexemes })
    }

    /// Returns the handle and length of the longest literal matching the
    /// start of `text`, preferring the earliest-declared literal on a tie.
    pub fn longest_match(&self, text: &str) -> Option<(H, usize)> {
        let mut best: Option<(H, usize)> = None;
        for (handle, pattern) in self.lexemes.iter() {
            if text.starts_with(pattern.as_str()) {
                let length = pattern.len();
                if best.map_or(true, |(_, best_length)| length > best_length) {
                    best = Some((*handle, length));
                }
            }
        }
        best
    }
}

/// Matcher over a fixed table of anchored regular expressions.
#[derive(Debug, Default)]
pub struct RegexMatcher<H: Copy + Debug> {
    lexemes: Vec<(H, Regex)>,
}

impl<H: Copy + Ord + Debug> RegexMatcher<H> {
    pub fn new<'a>(lexeme_patterns: &[(H, &'a str)]) -> Result<RegexMatcher<H>, LexanError<'a, H>> {
        let mut handles = vec![];
        let mut patterns = vec![];
        let mut lexemes = vec![];
        for (handle, pattern) in lexeme_patterns.iter() {
            if pattern.is_empty() {
                return Err(LexanError::EmptyPattern(*handle));
            };
            let anchored = anchor(pattern);
            match handles.binary_search(handle) {
                Ok(_) => return Err(LexanError::DuplicateHandle(*handle)),
                Err(index) => handles.insert(index, *handle),
            }
            match patterns.binary_search(pattern) {
                Ok(_) => return Err(LexanError::DuplicatePattern(pattern)),
                Err(index) => patterns.insert(index, *pattern),
            }
            lexemes.push((*handle, Regex::new(&anchored)?));
        }
        Ok(Self { lexemes })
    }

    /// Returns the handles tied for the longest regular expression match at
    /// the start of `text`, and that match's length. Two or more handles tied
    /// for longest is reported to the caller as an ambiguity — see
    /// [`crate::Error::AmbiguousMatches`] — rather than resolved arbitrarily
    /// by declaration order.
    pub fn longest_matches(&self, text: &str) -> (Vec<H>, usize) {
        let mut matches = vec![];
        let mut largest_end = 0;
        for (handle, regex) in self.lexemes.iter() {
            if let Some(m) = regex.find(text) {
                if m.end() == largest_end {
                    matches.push(*handle);
                } else if m.end() > largest_end {
                    largest_end = m.end();
                    matches = vec![*handle];
                }
            }
        }
        (matches, largest_end)
    }
}

/// Matcher over whitespace/comment-style patterns skipped between tokens.
#[derive(Debug, Default)]
pub struct SkipMatcher {
    regexes: Vec<Regex>,
}

impl SkipMatcher {
    pub fn new<'a, H>(regex_strs: &[&'a str]) -> Result<Self, LexanError<'a, H>> {
        let mut regexes = vec![];
        for regex_str in regex_strs.iter() {
            let anchored = anchor(regex_str);
            regexes.push(Regex::new(&anchored)?);
        }
        Ok(Self { regexes })
    }

    /// Returns the number of skippable bytes at the start of `text`.
    pub fn skippable_count(&self, text: &str) -> usize {
        let mut index = 0;
        'outer: while index < text.len() {
            for regex in self.regexes.iter() {
                if let Some(m) = regex.find(&text[index..]) {
                    if m.start() == 0 && m.end() > 0 {
                        index += m.end();
                        continue 'outer;
                    }
                }
            }
            break;
        }
        index
    }
}

/// Anchors a pattern at the start of the haystack if the caller did not
/// already write `\A`, so every table is implicitly "match here, not
/// anywhere downstream".
fn anchor(pattern: &str) -> String {
    if pattern.starts_with("\\A") {
        pattern.to_string()
    } else {
        format!("\\A(?:{})", pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_longest_match_wins() {
        let matcher = LiteralMatcher::new(&[(1u32, "="), (2u32, "==")]).unwrap();
        assert_eq!(matcher.longest_match("=="), Some((2, 2)));
        assert_eq!(matcher.longest_match("=x"), Some((1, 1)));
        assert_eq!(matcher.longest_match("x"), None);
    }

    #[test]
    fn regex_ambiguous_matches_reported() {
        let matcher =
            RegexMatcher::new(&[(1u32, r"[a-z]+"), (2u32, r"[a-z][a-z0-9]*")]).unwrap();
        let (handles, length) = matcher.longest_matches("abc123");
        assert_eq!(length, 6);
        assert_eq!(handles, vec![2]);
    }

    #[test]
    fn skip_matcher_skips_runs() {
        let skip = SkipMatcher::new::<u32>(&[r"[ \t]+"]).unwrap();
        assert_eq!(skip.skippable_count("   abc"), 3);
        assert_eq!(skip.skippable_count("abc"), 0);
    }
}
