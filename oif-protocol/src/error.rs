//! Protocol error types and server error codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Protocol-level errors that can occur while framing, classifying or
/// parsing reply lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid UTF-8 in reply line")]
    InvalidUtf8,

    #[error("line too long: {size} bytes buffered without terminator (max {max})")]
    LineTooLong { size: usize, max: usize },

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    ModelMismatch(#[from] ModelMismatch),

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// An `ERROR <code> <text>` envelope returned by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server error {raw_code} ({code}): {message}")]
pub struct ServerError {
    /// Mapped error kind.
    pub code: ErrorCode,
    /// Code exactly as it appeared on the wire.
    pub raw_code: String,
    /// Free-text description sent by the controller.
    pub message: String,
}

impl ServerError {
    pub fn new(raw_code: impl Into<String>, message: impl Into<String>) -> Self {
        let raw_code = raw_code.into();
        Self {
            code: ErrorCode::from_wire(&raw_code),
            raw_code,
            message: message.into(),
        }
    }
}

/// A reply line (or list item) that did not fit the record shape it was
/// matched against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reply does not match {shape} shape: {text:?}")]
pub struct ModelMismatch {
    /// Name of the shape that was attempted.
    pub shape: &'static str,
    /// Offending text.
    pub text: String,
}

impl ModelMismatch {
    pub fn new(shape: &'static str, text: impl Into<String>) -> Self {
        Self {
            shape,
            text: text.into(),
        }
    }
}

/// Error codes defined by the OIF controller.
///
/// The numeric values are part of the vendor protocol. Anything the
/// controller sends outside of this table maps to [`ErrorCode::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnableToConnectToDb,
    UnknownCommand,
    UnsupportedInterfaceVersion,
    NotLoggedIn,
    GenericSqlError,
    SyntaxError,
    UnknownObject,
    InternalError,
    ConcurrentTransactionInProgress,
    UnknownAccessPoint,
    AuthenticationFailed,
    DelegationDisabled,
    DelegationNotActive,
    NotSubscribed,
    AlreadySubscribed,
    KeyAlreadyInUse,
    RuleDoesNotExist,
    KeyDoesNotExist,
    UnknownVideoChannel,
    UnknownAlarmLine,
    OifAccessDisabled,
    VideoNotAvailable,
    StreamNotOpened,
    FaceRecognitionOff,
    AccessPolicyError,
    TimedOut,
    SocketBindFailed,
    UnknownError,
    ExtmemError,

    /// Code outside the documented table, or not a number at all.
    Unrecognized,
}

impl ErrorCode {
    /// Maps a numeric wire code to its error kind.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ErrorCode::UnableToConnectToDb,
            2 => ErrorCode::UnknownCommand,
            3 => ErrorCode::UnsupportedInterfaceVersion,
            4 => ErrorCode::NotLoggedIn,
            5 => ErrorCode::GenericSqlError,
            6 => ErrorCode::SyntaxError,
            7 => ErrorCode::UnknownObject,
            8 => ErrorCode::InternalError,
            9 => ErrorCode::ConcurrentTransactionInProgress,
            10 => ErrorCode::UnknownAccessPoint,
            11 => ErrorCode::AuthenticationFailed,
            12 => ErrorCode::DelegationDisabled,
            13 => ErrorCode::DelegationNotActive,
            14 => ErrorCode::NotSubscribed,
            15 => ErrorCode::AlreadySubscribed,
            16 => ErrorCode::KeyAlreadyInUse,
            17 => ErrorCode::RuleDoesNotExist,
            18 => ErrorCode::KeyDoesNotExist,
            19 => ErrorCode::UnknownVideoChannel,
            20 => ErrorCode::UnknownAlarmLine,
            21 => ErrorCode::OifAccessDisabled,
            22 => ErrorCode::VideoNotAvailable,
            23 => ErrorCode::StreamNotOpened,
            24 => ErrorCode::FaceRecognitionOff,
            25 => ErrorCode::AccessPolicyError,
            26 => ErrorCode::TimedOut,
            27 => ErrorCode::SocketBindFailed,
            28 => ErrorCode::UnknownError,
            29 => ErrorCode::ExtmemError,
            _ => ErrorCode::Unrecognized,
        }
    }

    /// Maps the code token of an error envelope.
    pub fn from_wire(token: &str) -> Self {
        token
            .parse::<u32>()
            .map(Self::from_code)
            .unwrap_or(ErrorCode::Unrecognized)
    }

    /// Returns the numeric wire code, if this kind has one.
    pub fn code(&self) -> Option<u32> {
        let code = match self {
            ErrorCode::UnableToConnectToDb => 1,
            ErrorCode::UnknownCommand => 2,
            ErrorCode::UnsupportedInterfaceVersion => 3,
            ErrorCode::NotLoggedIn => 4,
            ErrorCode::GenericSqlError => 5,
            ErrorCode::SyntaxError => 6,
            ErrorCode::UnknownObject => 7,
            ErrorCode::InternalError => 8,
            ErrorCode::ConcurrentTransactionInProgress => 9,
            ErrorCode::UnknownAccessPoint => 10,
            ErrorCode::AuthenticationFailed => 11,
            ErrorCode::DelegationDisabled => 12,
            ErrorCode::DelegationNotActive => 13,
            ErrorCode::NotSubscribed => 14,
            ErrorCode::AlreadySubscribed => 15,
            ErrorCode::KeyAlreadyInUse => 16,
            ErrorCode::RuleDoesNotExist => 17,
            ErrorCode::KeyDoesNotExist => 18,
            ErrorCode::UnknownVideoChannel => 19,
            ErrorCode::UnknownAlarmLine => 20,
            ErrorCode::OifAccessDisabled => 21,
            ErrorCode::VideoNotAvailable => 22,
            ErrorCode::StreamNotOpened => 23,
            ErrorCode::FaceRecognitionOff => 24,
            ErrorCode::AccessPolicyError => 25,
            ErrorCode::TimedOut => 26,
            ErrorCode::SocketBindFailed => 27,
            ErrorCode::UnknownError => 28,
            ErrorCode::ExtmemError => 29,
            ErrorCode::Unrecognized => return None,
        };
        Some(code)
    }

    /// Returns whether repeating the command later might succeed.
    ///
    /// This is a hint for callers; nothing in this workspace retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::UnableToConnectToDb
                | ErrorCode::ConcurrentTransactionInProgress
                | ErrorCode::TimedOut
        )
    }

    /// Short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnableToConnectToDb => "unable to connect to database",
            ErrorCode::UnknownCommand => "unknown command",
            ErrorCode::UnsupportedInterfaceVersion => "unsupported interface version",
            ErrorCode::NotLoggedIn => "not logged in",
            ErrorCode::GenericSqlError => "generic SQL error",
            ErrorCode::SyntaxError => "syntax error",
            ErrorCode::UnknownObject => "unknown object",
            ErrorCode::InternalError => "internal error",
            ErrorCode::ConcurrentTransactionInProgress => "concurrent transaction is in progress",
            ErrorCode::UnknownAccessPoint => "unknown access point",
            ErrorCode::AuthenticationFailed => "authentication failed",
            ErrorCode::DelegationDisabled => "delegation is disabled",
            ErrorCode::DelegationNotActive => "delegation is not active",
            ErrorCode::NotSubscribed => "not subscribed",
            ErrorCode::AlreadySubscribed => "already subscribed",
            ErrorCode::KeyAlreadyInUse => "specified key is already in use",
            ErrorCode::RuleDoesNotExist => "specified rule does not exist",
            ErrorCode::KeyDoesNotExist => "specified key does not exist",
            ErrorCode::UnknownVideoChannel => "unknown video channel",
            ErrorCode::UnknownAlarmLine => "unknown alarm line",
            ErrorCode::OifAccessDisabled => "OIF access is disabled for this user",
            ErrorCode::VideoNotAvailable => "video is not available",
            ErrorCode::StreamNotOpened => "stream is not opened",
            ErrorCode::FaceRecognitionOff => "face recognition is off",
            ErrorCode::AccessPolicyError => "access policy error",
            ErrorCode::TimedOut => "timed out",
            ErrorCode::SocketBindFailed => "socket bind failed",
            ErrorCode::UnknownError => "unknown error",
            ErrorCode::ExtmemError => "extmem error",
            ErrorCode::Unrecognized => "unrecognized error code",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
