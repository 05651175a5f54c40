//! # oif-protocol
//!
//! Wire protocol implementation for the Sigur OIF integration interface.
//!
//! This crate provides:
//! - CRLF line framing over arbitrarily split reads
//! - Command types and their exact wire text
//! - Reply classification and server error codes
//! - Typed record shapes and the list segmenter

pub mod codec;
pub mod command;
pub mod error;
pub mod key;
pub mod model;
pub mod pattern;
pub mod reply;
pub mod segment;

pub use codec::{Encoder, LineDecoder};
pub use command::{AccessPolicyRequest, Command, Direction, ObjectSelector, Password, Subject};
pub use error::{ErrorCode, ModelMismatch, ProtocolError, ServerError};
pub use key::{Key, W26Key, W34Key};
pub use model::{
    AccessDecision, AccessPoint, Ack, AdminState, AnonymousDecision, Car, DecisionResult,
    Employee, EmployeeDecision, ErrorEnvelope, Guest, ObjectInfo, ParsedList, PhysicalState,
    Record, Zone,
};
pub use reply::{classify, strip_keyword};
pub use segment::{segment, Boundary, Segmenter};

/// Interface version sent in `LOGIN`.
pub const PROTOCOL_VERSION: &str = "1.8";

/// Default controller port.
pub const DEFAULT_PORT: u16 = 3312;

/// Line terminator for commands and replies.
pub const EOL: &[u8] = b"\r\n";

/// Default upper bound on a single socket read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Absolute cap on one reply line (16 MiB).
pub const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Timestamp format used by `ACCESSPOLICY_REQUEST`.
pub const ACCESS_POLICY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
