//! Access-card key values.
//!
//! Keys are read from text in their short form (`12,345` for Wiegand-26,
//! `00A1B2C3` for Wiegand-34) and embedded into commands in their wire form
//! (`W26 012 00345`, `W34 00A1B2C3`).

use crate::error::{ModelMismatch, ProtocolError};
use crate::model::Record;
use crate::pattern::{Captures, Class, Pattern, Segment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest value of the first Wiegand-26 part (three decimal digits).
pub const W26_MAX_A: u16 = 999;

/// Largest value of the second Wiegand-26 part (five decimal digits).
pub const W26_MAX_B: u32 = 99_999;

static W26_PATTERN: Pattern = Pattern::new(&[
    Segment::Capture("key_a", Class::Digits { min: 1, max: 3 }),
    Segment::Literal(","),
    Segment::Capture("key_b", Class::Digits { min: 1, max: 5 }),
]);

static W34_PATTERN: Pattern = Pattern::new(&[Segment::Capture("key", Class::Hex { len: 8 })]);

/// Wiegand-26 key: facility part and card part.
///
/// Both parts stay within their wire widths; deserializing checks the same
/// bounds as [`W26Key::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawW26Key")]
pub struct W26Key {
    key_a: u16,
    key_b: u32,
}

#[derive(Deserialize)]
struct RawW26Key {
    key_a: u16,
    key_b: u32,
}

impl TryFrom<RawW26Key> for W26Key {
    type Error = ProtocolError;

    fn try_from(raw: RawW26Key) -> Result<Self, Self::Error> {
        W26Key::new(raw.key_a, raw.key_b)
    }
}

impl W26Key {
    pub fn new(key_a: u16, key_b: u32) -> Result<Self, ProtocolError> {
        if key_a > W26_MAX_A || key_b > W26_MAX_B {
            return Err(ProtocolError::InvalidCommand(format!(
                "Wiegand-26 key out of range: {},{}",
                key_a, key_b
            )));
        }
        Ok(Self { key_a, key_b })
    }

    pub fn key_a(&self) -> u16 {
        self.key_a
    }

    pub fn key_b(&self) -> u32 {
        self.key_b
    }

    /// Form used inside commands: both parts zero-padded, space-separated.
    pub fn to_wire(&self) -> String {
        format!("W26 {:03} {:05}", self.key_a, self.key_b)
    }
}

impl Record for W26Key {
    const SHAPE: &'static str = "W26KEY";

    fn pattern() -> &'static Pattern {
        &W26_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            key_a: caps.parse("key_a")?,
            key_b: caps.parse("key_b")?,
        })
    }
}

impl fmt::Display for W26Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03},{:05}", self.key_a, self.key_b)
    }
}

impl FromStr for W26Key {
    type Err = ModelMismatch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Wiegand-34 key: eight hexadecimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct W34Key {
    pub key: u32,
}

impl W34Key {
    pub fn new(key: u32) -> Self {
        Self { key }
    }

    /// Form used inside commands.
    pub fn to_wire(&self) -> String {
        format!("W34 {}", self)
    }
}

impl Record for W34Key {
    const SHAPE: &'static str = "W34KEY";

    fn pattern() -> &'static Pattern {
        &W34_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let key = u32::from_str_radix(caps.get("key")?, 16).ok()?;
        Some(Self { key })
    }
}

impl fmt::Display for W34Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.key)
    }
}

impl FromStr for W34Key {
    type Err = ModelMismatch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Either key encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W26(W26Key),
    W34(W34Key),
}

impl Key {
    pub fn to_wire(&self) -> String {
        match self {
            Key::W26(key) => key.to_wire(),
            Key::W34(key) => key.to_wire(),
        }
    }
}

impl From<W26Key> for Key {
    fn from(key: W26Key) -> Self {
        Key::W26(key)
    }
}

impl From<W34Key> for Key {
    fn from(key: W34Key) -> Self {
        Key::W34(key)
    }
}

impl FromStr for Key {
    type Err = ModelMismatch;

    /// Accepts the short text form of either encoding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        W26Key::parse(s)
            .map(Key::W26)
            .or_else(|_| W34Key::parse(s).map(Key::W34))
            .map_err(|_| ModelMismatch::new("KEY", s))
    }
}
