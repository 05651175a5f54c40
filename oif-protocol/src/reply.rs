//! Reply classification.

use crate::error::ServerError;
use crate::model::{ErrorEnvelope, Record};

/// Leading token of the error envelope.
pub const ERROR_KEYWORD: &str = "ERROR";

/// Splits the error envelope off from payload lines.
///
/// Payload lines pass through unchanged. An `ERROR` line becomes a
/// [`ServerError`]; a code outside the documented table maps to
/// [`ErrorCode::Unrecognized`](crate::ErrorCode::Unrecognized).
pub fn classify(line: &str) -> Result<&str, ServerError> {
    match strip_keyword(line, ERROR_KEYWORD) {
        None => Ok(line),
        Some(rest) => Err(match ErrorEnvelope::parse(line) {
            Ok(envelope) => ServerError::new(envelope.id, envelope.text),
            // `ERROR <code>` with no text, or a bare `ERROR`.
            Err(_) => ServerError::new(rest.trim(), ""),
        }),
    }
}

/// Returns what follows `keyword` when `line` starts with it as a whole
/// token: `Some("")` for the bare keyword, `None` for any other line.
pub fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}
