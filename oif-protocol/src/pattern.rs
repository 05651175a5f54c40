//! Literal-and-capture patterns for record shapes.
//!
//! A pattern is a static sequence of literal tokens and named captures and
//! always has to match the whole input. Captures are resolved by
//! backtracking: each capture proposes candidate end positions (shortest
//! first for [`Class::Lazy`], longest first for everything else) and the
//! first combination that lets the remaining segments match wins.

use std::str::FromStr;

/// What a capture may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Any text, shortest candidate first.
    Lazy,
    /// Any text, longest candidate first. Used for quoted free text so that
    /// a stray quote inside a name does not end the field early.
    Greedy,
    /// ASCII decimal digits, between `min` and `max` of them.
    Digits { min: usize, max: usize },
    /// Exactly `len` ASCII hexadecimal digits.
    Hex { len: usize },
}

/// One element of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    Capture(&'static str, Class),
}

/// A compiled-in record pattern.
#[derive(Debug)]
pub struct Pattern {
    segments: &'static [Segment],
}

impl Pattern {
    pub const fn new(segments: &'static [Segment]) -> Self {
        Self { segments }
    }

    /// Returns the leading literal, if the pattern starts with one.
    pub fn prefix(&self) -> Option<&'static str> {
        match self.segments.first() {
            Some(Segment::Literal(lit)) => Some(lit),
            _ => None,
        }
    }

    /// Matches the whole of `text`, returning the captured spans.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        let mut spans = Vec::with_capacity(self.segments.len());
        if self.match_from(0, 0, text, &mut spans) {
            Some(Captures { text, spans })
        } else {
            None
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.captures(text).is_some()
    }

    fn match_from(
        &self,
        idx: usize,
        pos: usize,
        text: &str,
        spans: &mut Vec<(&'static str, usize, usize)>,
    ) -> bool {
        let Some(segment) = self.segments.get(idx) else {
            return pos == text.len();
        };

        match *segment {
            Segment::Literal(lit) => {
                text[pos..].starts_with(lit)
                    && self.match_from(idx + 1, pos + lit.len(), text, spans)
            }
            Segment::Capture(name, class) => {
                let next = self.segments.get(idx + 1).copied();
                for end in candidate_ends(class, text, pos, next) {
                    spans.push((name, pos, end));
                    if self.match_from(idx + 1, end, text, spans) {
                        return true;
                    }
                    spans.pop();
                }
                false
            }
        }
    }
}

/// Candidate end offsets for a capture starting at `pos`, in the order they
/// should be tried.
fn candidate_ends(class: Class, text: &str, pos: usize, next: Option<Segment>) -> Vec<usize> {
    let rest = &text[pos..];
    match class {
        Class::Digits { min, max } => {
            let available = rest
                .bytes()
                .take(max)
                .take_while(|b| b.is_ascii_digit())
                .count();
            if available < min {
                return Vec::new();
            }
            (min..=available).rev().map(|n| pos + n).collect()
        }
        Class::Hex { len } => {
            let ok = rest.len() >= len && rest.bytes().take(len).all(|b| b.is_ascii_hexdigit());
            if ok {
                vec![pos + len]
            } else {
                Vec::new()
            }
        }
        Class::Lazy | Class::Greedy => {
            let mut ends: Vec<usize> = match next {
                None => vec![text.len()],
                Some(Segment::Literal(lit)) => rest
                    .char_indices()
                    .map(|(i, _)| i)
                    .chain(std::iter::once(rest.len()))
                    .filter(|&i| rest[i..].starts_with(lit))
                    .map(|i| pos + i)
                    .collect(),
                Some(Segment::Capture(..)) => rest
                    .char_indices()
                    .map(|(i, _)| pos + i)
                    .chain(std::iter::once(text.len()))
                    .collect(),
            };
            if class == Class::Greedy {
                ends.reverse();
            }
            ends
        }
    }
}

/// Spans captured by a successful match.
#[derive(Debug)]
pub struct Captures<'t> {
    text: &'t str,
    spans: Vec<(&'static str, usize, usize)>,
}

impl<'t> Captures<'t> {
    /// Returns the text captured under `name`.
    pub fn get(&self, name: &str) -> Option<&'t str> {
        self.spans
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(_, start, end)| &self.text[start..end])
    }

    /// Parses the text captured under `name`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name)?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static QUOTED: Pattern = Pattern::new(&[
        Segment::Literal("ID "),
        Segment::Capture("id", Class::Lazy),
        Segment::Literal(" NAME \""),
        Segment::Capture("name", Class::Greedy),
        Segment::Literal("\""),
    ]);

    static PAIR: Pattern = Pattern::new(&[
        Segment::Capture("a", Class::Digits { min: 1, max: 3 }),
        Segment::Literal(","),
        Segment::Capture("b", Class::Digits { min: 1, max: 5 }),
    ]);

    static TWO_WORDS: Pattern = Pattern::new(&[
        Segment::Literal("STATE "),
        Segment::Capture("first", Class::Lazy),
        Segment::Literal(" "),
        Segment::Capture("second", Class::Greedy),
    ]);

    #[test]
    fn test_literal_and_captures() {
        let caps = QUOTED.captures("ID 12 NAME \"Gate\"").unwrap();
        assert_eq!(caps.get("id"), Some("12"));
        assert_eq!(caps.get("name"), Some("Gate"));
        assert_eq!(caps.parse::<u32>("id"), Some(12));
        assert_eq!(caps.get("missing"), None);
    }

    #[test]
    fn test_whole_input_must_match() {
        assert!(!QUOTED.is_match("ID 12 NAME \"Gate\" trailing"));
        assert!(!QUOTED.is_match("xID 12 NAME \"Gate\""));
    }

    #[test]
    fn test_greedy_keeps_embedded_quotes() {
        let caps = QUOTED.captures("ID 1 NAME \"The \"Big\" Gate\"").unwrap();
        assert_eq!(caps.get("name"), Some("The \"Big\" Gate"));
    }

    #[test]
    fn test_lazy_takes_first_separator() {
        let caps = TWO_WORDS.captures("STATE ONLINE_NORMAL CLOSED").unwrap();
        assert_eq!(caps.get("first"), Some("ONLINE_NORMAL"));
        assert_eq!(caps.get("second"), Some("CLOSED"));

        let caps = TWO_WORDS.captures("STATE A B C").unwrap();
        assert_eq!(caps.get("first"), Some("A"));
        assert_eq!(caps.get("second"), Some("B C"));
    }

    #[test]
    fn test_digit_widths() {
        assert!(PAIR.is_match("1,2"));
        assert!(PAIR.is_match("123,12345"));
        assert!(!PAIR.is_match("1234,1"));
        assert!(!PAIR.is_match("1,123456"));
        assert!(!PAIR.is_match(",1"));
        assert!(!PAIR.is_match("a,1"));
    }

    #[test]
    fn test_hex() {
        static HEX: Pattern = Pattern::new(&[Segment::Capture("key", Class::Hex { len: 4 })]);
        assert!(HEX.is_match("00fF"));
        assert!(!HEX.is_match("00fG"));
        assert!(!HEX.is_match("00f"));
        assert!(!HEX.is_match("00ff0"));
    }

    #[test]
    fn test_non_ascii_text() {
        let caps = QUOTED.captures("ID 7 NAME \"Зона, №1\"").unwrap();
        assert_eq!(caps.get("name"), Some("Зона, №1"));
    }

    #[test]
    fn test_prefix() {
        assert_eq!(QUOTED.prefix(), Some("ID "));
        assert_eq!(PAIR.prefix(), None);
    }
}
