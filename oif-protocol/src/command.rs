//! OIF commands and their wire text.

use crate::key::Key;
use crate::ACCESS_POLICY_TIME_FORMAT;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login password. Shown in full on the wire, never in `Debug` output.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"***\"")
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(password)
    }
}

/// Target of `GETOBJECTINFO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectSelector {
    Id(u32),
    All,
}

/// Commands understood by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        version: String,
        user: String,
        password: Password,
    },
    Quit,
    GetObjectInfo(ObjectSelector),
    GetZoneInfo,
    GetApInfo(u32),
    GetApList,
    AccessPolicyRequest(AccessPolicyRequest),
}

impl Command {
    pub fn login(
        version: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<Password>,
    ) -> Self {
        Command::Login {
            version: version.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Leading keyword, safe to log.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Login { .. } => "LOGIN",
            Command::Quit => "QUIT",
            Command::GetObjectInfo(_) => "GETOBJECTINFO",
            Command::GetZoneInfo => "GETZONEINFO",
            Command::GetApInfo(_) => "GETAPINFO",
            Command::GetApList => "GETAPLIST",
            Command::AccessPolicyRequest(_) => "ACCESSPOLICY_REQUEST",
        }
    }

    /// Keyword the reply is expected to start with. `None` for commands
    /// answered by a bare acknowledgement or not answered at all.
    pub fn reply_keyword(&self) -> Option<&'static str> {
        match self {
            Command::Login { .. } | Command::Quit => None,
            Command::GetObjectInfo(_) => Some("OBJECTINFO"),
            Command::GetZoneInfo => Some("ZONEINFO"),
            Command::GetApInfo(_) => Some("APINFO"),
            Command::GetApList => Some("APLIST"),
            Command::AccessPolicyRequest(_) => Some("ACCESSPOLICY_REPLY"),
        }
    }
}

impl fmt::Display for Command {
    /// Writes the wire form, without the line terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login {
                version,
                user,
                password,
            } => write!(f, "LOGIN {} {} {}", version, user, password.expose()),
            Command::Quit => f.write_str("QUIT"),
            Command::GetObjectInfo(ObjectSelector::Id(id)) => {
                write!(f, "GETOBJECTINFO OBJECTID {}", id)
            }
            Command::GetObjectInfo(ObjectSelector::All) => f.write_str("GETOBJECTINFO ALL"),
            Command::GetZoneInfo => f.write_str("GETZONEINFO"),
            Command::GetApInfo(id) => write!(f, "GETAPINFO {}", id),
            Command::GetApList => f.write_str("GETAPLIST"),
            Command::AccessPolicyRequest(request) => request.fmt(f),
        }
    }
}

/// Passage direction through an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
    /// Sent as `X`.
    #[default]
    Unknown,
}

impl Direction {
    /// Anything other than `IN` or `OUT` is treated as unknown.
    pub fn from_token(token: &str) -> Self {
        match token {
            "IN" => Direction::In,
            "OUT" => Direction::Out,
            _ => Direction::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
            Direction::Unknown => "X",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is asking to pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Employee(u32),
    Key(Key),
    PlateNumber(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Employee(id) => write!(f, "EMPID {}", id),
            Subject::Key(key) => write!(f, "KEY {}", key.to_wire()),
            Subject::PlateNumber(number) => write!(f, "LPNUMBER {}", number),
        }
    }
}

/// `ACCESSPOLICY_REQUEST` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicyRequest {
    pub ap_id: u32,
    pub subject: Subject,
    pub time: NaiveDateTime,
    pub direction: Direction,
    /// Extra arguments appended verbatim.
    pub extra: Option<String>,
}

impl AccessPolicyRequest {
    /// Request for passing now, direction unknown.
    pub fn new(ap_id: u32, subject: Subject) -> Self {
        Self {
            ap_id,
            subject,
            time: Local::now().naive_local(),
            direction: Direction::Unknown,
            extra: None,
        }
    }

    pub fn for_employee(ap_id: u32, emp_id: u32) -> Self {
        Self::new(ap_id, Subject::Employee(emp_id))
    }

    pub fn for_key(ap_id: u32, key: impl Into<Key>) -> Self {
        Self::new(ap_id, Subject::Key(key.into()))
    }

    pub fn for_plate_number(ap_id: u32, number: impl Into<String>) -> Self {
        Self::new(ap_id, Subject::PlateNumber(number.into()))
    }

    pub fn with_time(mut self, time: NaiveDateTime) -> Self {
        self.time = time;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

impl fmt::Display for AccessPolicyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ACCESSPOLICY_REQUEST TYPE NORMAL TIME \"{}\" {} DIRECTION {} APID {}",
            self.time.format(ACCESS_POLICY_TIME_FORMAT),
            self.subject,
            self.direction,
            self.ap_id
        )?;
        if let Some(extra) = self.extra.as_deref().filter(|e| !e.is_empty()) {
            write!(f, " {}", extra)?;
        }
        Ok(())
    }
}

impl From<AccessPolicyRequest> for Command {
    fn from(request: AccessPolicyRequest) -> Self {
        Command::AccessPolicyRequest(request)
    }
}
