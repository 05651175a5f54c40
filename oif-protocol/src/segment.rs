//! Splitting multi-record reply lines into record-sized pieces.
//!
//! Records in a list reply are joined by `, `, but names and positions may
//! contain `, ` themselves. Object lists are therefore only split where the
//! separator is directly followed by a record-start literal. This is a
//! heuristic: a free-text field that contains e.g. `, EMP ` is cut in two.

use crate::model::OBJECT_PREFIXES;

/// List item separator.
pub const ITEM_SEPARATOR: &str = ", ";

/// Where a list may be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Every separator.
    Separator,
    /// Separators followed by one of the given record-start literals.
    BeforeRecord(&'static [&'static str]),
}

/// Iterator over the items of one list reply.
pub struct Segmenter<'t> {
    rest: Option<&'t str>,
    boundary: Boundary,
}

impl<'t> Segmenter<'t> {
    pub fn new(text: &'t str, boundary: Boundary) -> Self {
        Self {
            rest: (!text.is_empty()).then_some(text),
            boundary,
        }
    }

    /// Segmenter for `OBJECTINFO` lists.
    pub fn objects(text: &'t str) -> Self {
        Self::new(text, Boundary::BeforeRecord(OBJECT_PREFIXES))
    }

    /// Segmenter for `ZONEINFO` lists.
    pub fn zones(text: &'t str) -> Self {
        Self::new(text, Boundary::Separator)
    }

    fn next_split(&self, text: &str) -> Option<usize> {
        text.match_indices(ITEM_SEPARATOR)
            .map(|(pos, _)| pos)
            .find(|&pos| match self.boundary {
                Boundary::Separator => true,
                Boundary::BeforeRecord(prefixes) => {
                    let after = &text[pos + ITEM_SEPARATOR.len()..];
                    prefixes.iter().any(|prefix| after.starts_with(prefix))
                }
            })
    }
}

impl<'t> Iterator for Segmenter<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        let text = self.rest.take()?;
        match self.next_split(text) {
            Some(pos) => {
                self.rest = Some(&text[pos + ITEM_SEPARATOR.len()..]);
                Some(&text[..pos])
            }
            None => Some(text),
        }
    }
}

/// Splits `text` into items at the given boundaries.
pub fn segment(text: &str, boundary: Boundary) -> Vec<&str> {
    Segmenter::new(text, boundary).collect()
}
