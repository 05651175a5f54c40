//! Typed records parsed from OIF reply text.
//!
//! Every record type is a fixed shape: a static [`Pattern`] plus the typed
//! fields pulled out of its captures. Shapes that share a wire format are
//! told apart by their leading literal, through the static dispatch tables
//! [`OBJECT_SHAPES`] and [`DECISION_SHAPES`].

use crate::error::ModelMismatch;
use crate::pattern::{Captures, Class, Pattern, Segment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed record shape.
pub trait Record: Sized {
    /// Shape name reported in [`ModelMismatch`].
    const SHAPE: &'static str;

    fn pattern() -> &'static Pattern;

    /// Builds the record from a successful match. `None` means a captured
    /// field did not coerce to its type.
    fn from_captures(caps: &Captures<'_>) -> Option<Self>;

    /// Matches `text` against this shape.
    fn parse(text: &str) -> Result<Self, ModelMismatch> {
        Self::pattern()
            .captures(text)
            .and_then(|caps| Self::from_captures(&caps))
            .ok_or_else(|| ModelMismatch::new(Self::SHAPE, text))
    }
}

// ============================================================================
// Envelopes
// ============================================================================

static ERROR_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("ERROR "),
    Segment::Capture("id", Class::Lazy),
    Segment::Literal(" "),
    Segment::Capture("text", Class::Greedy),
]);

/// `ERROR <id> <text>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub id: String,
    pub text: String,
}

impl Record for ErrorEnvelope {
    const SHAPE: &'static str = "ERROR";

    fn pattern() -> &'static Pattern {
        &ERROR_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            id: caps.get("id")?.to_string(),
            text: caps.get("text")?.to_string(),
        })
    }
}

static ACK_PATTERN: Pattern = Pattern::new(&[Segment::Literal("OK")]);

/// `OK`, confirming a login or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

impl Record for Ack {
    const SHAPE: &'static str = "OK";

    fn pattern() -> &'static Pattern {
        &ACK_PATTERN
    }

    fn from_captures(_: &Captures<'_>) -> Option<Self> {
        Some(Ack)
    }
}

// ============================================================================
// Objects
// ============================================================================

static EMPLOYEE_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("EMP ID "),
    Segment::Capture("id", Class::Lazy),
    Segment::Literal(" NAME \""),
    Segment::Capture("name", Class::Greedy),
    Segment::Literal("\" POSITION \""),
    Segment::Capture("position", Class::Greedy),
    Segment::Literal("\" TABNUMBER \""),
    Segment::Capture("tabnumber", Class::Lazy),
    Segment::Literal("\""),
]);

// The controller sends GUESTBADGE where the protocol document says GUEST.
static GUEST_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("GUESTBADGE ID "),
    Segment::Capture("id", Class::Lazy),
    Segment::Literal(" NAME \""),
    Segment::Capture("name", Class::Greedy),
    Segment::Literal("\" TABNUMBER \""),
    Segment::Capture("tabnumber", Class::Lazy),
    Segment::Literal("\""),
]);

// Two spaces before MODEL, as sent by the controller.
static CAR_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("CAR ID "),
    Segment::Capture("id", Class::Lazy),
    Segment::Literal(" NUMBER \""),
    Segment::Capture("car_number", Class::Greedy),
    Segment::Literal("\"  MODEL \""),
    Segment::Capture("car_model", Class::Lazy),
    Segment::Literal("\" TABNUMBER \""),
    Segment::Capture("tabnumber", Class::Lazy),
    Segment::Literal("\""),
]);

/// Person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub tabnumber: String,
}

impl Record for Employee {
    const SHAPE: &'static str = "EMP";

    fn pattern() -> &'static Pattern {
        &EMPLOYEE_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            id: caps.parse("id")?,
            name: caps.get("name")?.to_string(),
            position: caps.get("position")?.to_string(),
            tabnumber: caps.get("tabnumber")?.to_string(),
        })
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "employee #{} {} ({}), tab number {}",
            self.id, self.name, self.position, self.tabnumber
        )
    }
}

/// Guest badge record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: u32,
    pub name: String,
    pub tabnumber: String,
}

impl Record for Guest {
    const SHAPE: &'static str = "GUESTBADGE";

    fn pattern() -> &'static Pattern {
        &GUEST_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            id: caps.parse("id")?,
            name: caps.get("name")?.to_string(),
            tabnumber: caps.get("tabnumber")?.to_string(),
        })
    }
}

impl fmt::Display for Guest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "guest #{} {}, tab number {}",
            self.id, self.name, self.tabnumber
        )
    }
}

/// Vehicle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: u32,
    pub car_number: String,
    pub car_model: String,
    pub tabnumber: String,
}

impl Record for Car {
    const SHAPE: &'static str = "CAR";

    fn pattern() -> &'static Pattern {
        &CAR_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            id: caps.parse("id")?,
            car_number: caps.get("car_number")?.to_string(),
            car_model: caps.get("car_model")?.to_string(),
            tabnumber: caps.get("tabnumber")?.to_string(),
        })
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "car #{} {} ({}), tab number {}",
            self.id, self.car_number, self.car_model, self.tabnumber
        )
    }
}

/// One `OBJECTINFO` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectInfo {
    Employee(Employee),
    Guest(Guest),
    Car(Car),
}

type ObjectParser = fn(&str) -> Result<ObjectInfo, ModelMismatch>;

/// Object shapes keyed by the literal each record starts with.
pub const OBJECT_SHAPES: &[(&str, ObjectParser)] = &[
    ("EMP ", |text| Employee::parse(text).map(ObjectInfo::Employee)),
    ("GUESTBADGE ", |text| Guest::parse(text).map(ObjectInfo::Guest)),
    ("CAR ", |text| Car::parse(text).map(ObjectInfo::Car)),
];

/// Record-start literals of the object shapes, for list segmenting.
pub const OBJECT_PREFIXES: &[&str] = &["EMP ", "GUESTBADGE ", "CAR "];

impl ObjectInfo {
    pub const SHAPE: &'static str = "OBJECTINFO";

    /// Picks the object shape by prefix and matches `text` against it.
    pub fn parse(text: &str) -> Result<Self, ModelMismatch> {
        OBJECT_SHAPES
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix))
            .map(|(_, parse)| parse(text))
            .unwrap_or_else(|| Err(ModelMismatch::new(Self::SHAPE, text)))
    }

    pub fn id(&self) -> u32 {
        match self {
            ObjectInfo::Employee(emp) => emp.id,
            ObjectInfo::Guest(guest) => guest.id,
            ObjectInfo::Car(car) => car.id,
        }
    }

    pub fn tabnumber(&self) -> &str {
        match self {
            ObjectInfo::Employee(emp) => &emp.tabnumber,
            ObjectInfo::Guest(guest) => &guest.tabnumber,
            ObjectInfo::Car(car) => &car.tabnumber,
        }
    }
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectInfo::Employee(emp) => emp.fmt(f),
            ObjectInfo::Guest(guest) => guest.fmt(f),
            ObjectInfo::Car(car) => car.fmt(f),
        }
    }
}

// ============================================================================
// Zones and access points
// ============================================================================

static ZONE_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("ID "),
    Segment::Capture("id", Class::Lazy),
    Segment::Literal(" NAME \""),
    Segment::Capture("name", Class::Greedy),
    Segment::Literal("\""),
]);

/// One `ZONEINFO` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u32,
    pub name: String,
}

impl Record for Zone {
    const SHAPE: &'static str = "ZONEINFO";

    fn pattern() -> &'static Pattern {
        &ZONE_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            id: caps.parse("id")?,
            name: caps.get("name")?.to_string(),
        })
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone #{} {}", self.id, self.name)
    }
}

/// Administrative state of an access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminState {
    Offline,
    Normal,
    Unlocked,
    Locked,
    /// Token outside the known vocabulary, kept verbatim.
    Unknown(String),
}

impl AdminState {
    pub fn from_token(token: &str) -> Self {
        match token {
            "OFFLINE" => AdminState::Offline,
            "ONLINE_NORMAL" | "NORMAL" => AdminState::Normal,
            "ONLINE_UNLOCKED" | "UNLOCKED" => AdminState::Unlocked,
            "ONLINE_LOCKED" | "LOCKED" => AdminState::Locked,
            other => AdminState::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminState::Offline => f.write_str("offline"),
            AdminState::Normal => f.write_str("normal"),
            AdminState::Unlocked => f.write_str("unlocked"),
            AdminState::Locked => f.write_str("locked"),
            AdminState::Unknown(token) => write!(f, "unknown ({})", token),
        }
    }
}

/// Physical state of an access point controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicalState {
    Online,
    Offline,
    Open,
    Closed,
    /// Token outside the known vocabulary, kept verbatim.
    Unknown(String),
}

impl PhysicalState {
    pub fn from_token(token: &str) -> Self {
        match token {
            "ONLINE" => PhysicalState::Online,
            "OFFLINE" => PhysicalState::Offline,
            "OPENED" | "OPEN" => PhysicalState::Open,
            "CLOSED" => PhysicalState::Closed,
            other => PhysicalState::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for PhysicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalState::Online => f.write_str("online"),
            PhysicalState::Offline => f.write_str("offline"),
            PhysicalState::Open => f.write_str("open"),
            PhysicalState::Closed => f.write_str("closed"),
            PhysicalState::Unknown(token) => write!(f, "unknown ({})", token),
        }
    }
}

static ACCESS_POINT_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("APINFO ID "),
    Segment::Capture("id", Class::Lazy),
    Segment::Literal(" NAME \""),
    Segment::Capture("name", Class::Greedy),
    Segment::Literal("\" ZONEA "),
    Segment::Capture("zonea", Class::Lazy),
    Segment::Literal(" ZONEB "),
    Segment::Capture("zoneb", Class::Lazy),
    Segment::Literal(" STATE "),
    Segment::Capture("state_adm", Class::Lazy),
    Segment::Literal(" "),
    Segment::Capture("state_phys", Class::Greedy),
]);

/// `APINFO` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub id: u32,
    pub name: String,
    /// Exit zone.
    pub zonea: u32,
    /// Entry zone.
    pub zoneb: u32,
    pub state_adm: AdminState,
    pub state_phys: PhysicalState,
}

impl Record for AccessPoint {
    const SHAPE: &'static str = "APINFO";

    fn pattern() -> &'static Pattern {
        &ACCESS_POINT_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            id: caps.parse("id")?,
            name: caps.get("name")?.to_string(),
            zonea: caps.parse("zonea")?,
            zoneb: caps.parse("zoneb")?,
            state_adm: AdminState::from_token(caps.get("state_adm")?),
            state_phys: PhysicalState::from_token(caps.get("state_phys")?),
        })
    }
}

impl fmt::Display for AccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "access point #{} {}: zone {} -> zone {}, {}, controller {}",
            self.id, self.name, self.zonea, self.zoneb, self.state_adm, self.state_phys
        )
    }
}

// ============================================================================
// Access policy decisions
// ============================================================================

/// Outcome of an access-policy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionResult {
    IdentifierExpired,
    Undecided,
    UnknownIdentifier,
    DeniedByMode,
    DeniedByModeAccessPoint,
    DeniedByModeTime,
    Antipassback,
    Granted,
    /// Code outside the documented set.
    Unrecognized(u16),
}

impl DecisionResult {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => DecisionResult::IdentifierExpired,
            2 => DecisionResult::Undecided,
            3 => DecisionResult::UnknownIdentifier,
            4 => DecisionResult::DeniedByMode,
            5 => DecisionResult::DeniedByModeAccessPoint,
            6 => DecisionResult::DeniedByModeTime,
            7 => DecisionResult::Antipassback,
            255 => DecisionResult::Granted,
            other => DecisionResult::Unrecognized(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            DecisionResult::IdentifierExpired => 1,
            DecisionResult::Undecided => 2,
            DecisionResult::UnknownIdentifier => 3,
            DecisionResult::DeniedByMode => 4,
            DecisionResult::DeniedByModeAccessPoint => 5,
            DecisionResult::DeniedByModeTime => 6,
            DecisionResult::Antipassback => 7,
            DecisionResult::Granted => 255,
            DecisionResult::Unrecognized(code) => *code,
        }
    }

    pub fn is_granted(&self) -> bool {
        *self == DecisionResult::Granted
    }
}

impl fmt::Display for DecisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionResult::IdentifierExpired => f.write_str("identifier has expired"),
            DecisionResult::Undecided => f.write_str("system cannot decide right now"),
            DecisionResult::UnknownIdentifier => f.write_str("identifier is unknown"),
            DecisionResult::DeniedByMode => f.write_str("denied by active mode"),
            DecisionResult::DeniedByModeAccessPoint => {
                f.write_str("denied by active mode (access point)")
            }
            DecisionResult::DeniedByModeTime => f.write_str("denied by active mode (time)"),
            DecisionResult::Antipassback => f.write_str("antipassback violation"),
            DecisionResult::Granted => f.write_str("access granted"),
            DecisionResult::Unrecognized(code) => write!(f, "unrecognized decision {}", code),
        }
    }
}

static DECISION_EMP_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("ACCESSPOLICY_REPLY RESULT "),
    Segment::Capture("result_id", Class::Digits { min: 1, max: 3 }),
    Segment::Literal(" EMPID "),
    Segment::Capture("emp_id", Class::Digits { min: 1, max: 5 }),
    Segment::Literal(" MASKVERPOLICY_OFF"),
]);

static DECISION_NO_EMP_PATTERN: Pattern = Pattern::new(&[
    Segment::Literal("ACCESSPOLICY_REPLY RESULT "),
    Segment::Capture("result_id", Class::Digits { min: 1, max: 3 }),
    Segment::Literal(" MASKVERPOLICY_OFF"),
]);

/// Decision tied to a known employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDecision {
    pub result_id: u16,
    pub emp_id: u32,
}

impl Record for EmployeeDecision {
    const SHAPE: &'static str = "ACCESSPOLICY_REPLY EMPID";

    fn pattern() -> &'static Pattern {
        &DECISION_EMP_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            result_id: caps.parse("result_id")?,
            emp_id: caps.parse("emp_id")?,
        })
    }
}

/// Decision for an identifier the controller could not tie to an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousDecision {
    pub result_id: u16,
}

impl Record for AnonymousDecision {
    const SHAPE: &'static str = "ACCESSPOLICY_REPLY";

    fn pattern() -> &'static Pattern {
        &DECISION_NO_EMP_PATTERN
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            result_id: caps.parse("result_id")?,
        })
    }
}

/// `ACCESSPOLICY_REPLY`, with or without an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDecision {
    WithEmployee(EmployeeDecision),
    WithoutEmployee(AnonymousDecision),
}

type DecisionParser = fn(&str) -> Result<AccessDecision, ModelMismatch>;

/// Decision shapes in the order they must be attempted: the richer shape
/// first.
pub const DECISION_SHAPES: &[DecisionParser] = &[
    |text| EmployeeDecision::parse(text).map(AccessDecision::WithEmployee),
    |text| AnonymousDecision::parse(text).map(AccessDecision::WithoutEmployee),
];

impl AccessDecision {
    pub const SHAPE: &'static str = "ACCESSPOLICY_REPLY";

    pub fn parse(text: &str) -> Result<Self, ModelMismatch> {
        DECISION_SHAPES
            .iter()
            .find_map(|parse| parse(text).ok())
            .ok_or_else(|| ModelMismatch::new(Self::SHAPE, text))
    }

    pub fn result_id(&self) -> u16 {
        match self {
            AccessDecision::WithEmployee(d) => d.result_id,
            AccessDecision::WithoutEmployee(d) => d.result_id,
        }
    }

    pub fn result(&self) -> DecisionResult {
        DecisionResult::from_code(self.result_id())
    }

    pub fn emp_id(&self) -> Option<u32> {
        match self {
            AccessDecision::WithEmployee(d) => Some(d.emp_id),
            AccessDecision::WithoutEmployee(_) => None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.result().is_granted()
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.emp_id() {
            Some(emp_id) => write!(f, "employee {}: {}", emp_id, self.result()),
            None => write!(f, "{}", self.result()),
        }
    }
}

// ============================================================================
// Partial lists
// ============================================================================

/// Records parsed from a multi-record reply, next to the items that did not
/// match. One bad item never hides the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedList<T> {
    pub records: Vec<T>,
    pub mismatches: Vec<ModelMismatch>,
}

impl<T> ParsedList<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            mismatches: Vec::new(),
        }
    }

    /// Parses every item, keeping successes and failures apart.
    pub fn from_items<'a, I, F>(items: I, parse: F) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        F: Fn(&str) -> Result<T, ModelMismatch>,
    {
        let mut list = Self::new();
        for item in items {
            list.push(parse(item));
        }
        list
    }

    pub fn push(&mut self, item: Result<T, ModelMismatch>) {
        match item {
            Ok(record) => self.records.push(record),
            Err(mismatch) => self.mismatches.push(mismatch),
        }
    }

    /// Returns true if every item parsed.
    pub fn is_complete(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.mismatches.is_empty()
    }

    /// Treats any mismatch as fatal.
    pub fn into_result(self) -> Result<Vec<T>, ModelMismatch> {
        match self.mismatches.into_iter().next() {
            Some(mismatch) => Err(mismatch),
            None => Ok(self.records),
        }
    }
}

impl<T> Default for ParsedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMP_LINE: &str =
        "EMP ID 17 NAME \"Ivanov, Ivan\" POSITION \"Engineer\" TABNUMBER \"0042\"";

    #[test]
    fn test_error_envelope() {
        let env = ErrorEnvelope::parse("ERROR 11 Authentication failed").unwrap();
        assert_eq!(env.id, "11");
        assert_eq!(env.text, "Authentication failed");
    }

    #[test]
    fn test_ack() {
        assert!(Ack::parse("OK").is_ok());
        assert!(Ack::parse("OK?").is_err());
        assert!(Ack::parse("ERROR 4 x").is_err());
    }

    #[test]
    fn test_employee() {
        let emp = Employee::parse(EMP_LINE).unwrap();
        assert_eq!(emp.id, 17);
        assert_eq!(emp.name, "Ivanov, Ivan");
        assert_eq!(emp.position, "Engineer");
        assert_eq!(emp.tabnumber, "0042");
    }

    #[test]
    fn test_employee_empty_fields() {
        let emp = Employee::parse("EMP ID 1 NAME \"\" POSITION \"\" TABNUMBER \"\"").unwrap();
        assert_eq!(emp.name, "");
        assert_eq!(emp.position, "");
        assert_eq!(emp.tabnumber, "");
    }

    #[test]
    fn test_non_numeric_id_is_mismatch() {
        let err = Employee::parse(
            "EMP ID x1 NAME \"A\" POSITION \"B\" TABNUMBER \"1\"",
        )
        .unwrap_err();
        assert_eq!(err.shape, "EMP");
        assert!(err.text.starts_with("EMP ID x1"));
    }

    #[test]
    fn test_guest_uses_guestbadge_prefix() {
        let guest = Guest::parse("GUESTBADGE ID 5 NAME \"Visitor\" TABNUMBER \"G-5\"").unwrap();
        assert_eq!(guest.id, 5);
        assert_eq!(guest.name, "Visitor");
        assert_eq!(guest.tabnumber, "G-5");

        assert!(Guest::parse("GUEST ID 5 NAME \"Visitor\" TABNUMBER \"G-5\"").is_err());
    }

    #[test]
    fn test_car_needs_two_spaces_before_model() {
        let car = Car::parse(
            "CAR ID 9 NUMBER \"A123BC 77\"  MODEL \"Lada\" TABNUMBER \"C-9\"",
        )
        .unwrap();
        assert_eq!(car.id, 9);
        assert_eq!(car.car_number, "A123BC 77");
        assert_eq!(car.car_model, "Lada");
        assert_eq!(car.tabnumber, "C-9");

        assert!(
            Car::parse("CAR ID 9 NUMBER \"A123BC 77\" MODEL \"Lada\" TABNUMBER \"C-9\"").is_err()
        );
    }

    #[test]
    fn test_object_info_dispatch() {
        match ObjectInfo::parse(EMP_LINE).unwrap() {
            ObjectInfo::Employee(emp) => assert_eq!(emp.id, 17),
            other => panic!("expected employee, got {:?}", other),
        }
        assert!(matches!(
            ObjectInfo::parse("GUESTBADGE ID 5 NAME \"V\" TABNUMBER \"1\"").unwrap(),
            ObjectInfo::Guest(_)
        ));
        assert!(matches!(
            ObjectInfo::parse("CAR ID 9 NUMBER \"N\"  MODEL \"M\" TABNUMBER \"1\"").unwrap(),
            ObjectInfo::Car(_)
        ));
    }

    #[test]
    fn test_object_info_unknown_prefix() {
        let err = ObjectInfo::parse("TRUCK ID 1").unwrap_err();
        assert_eq!(err.shape, "OBJECTINFO");
    }

    #[test]
    fn test_object_info_known_prefix_bad_body() {
        let err = ObjectInfo::parse("EMP ID 1 NAME \"A\"").unwrap_err();
        assert_eq!(err.shape, "EMP");
    }

    #[test]
    fn test_prefix_tables_agree() {
        let from_shapes: Vec<&str> = OBJECT_SHAPES.iter().map(|(p, _)| *p).collect();
        assert_eq!(from_shapes, OBJECT_PREFIXES);
    }

    #[test]
    fn test_zone() {
        let zone = Zone::parse("ID 3 NAME \"Parking\"").unwrap();
        assert_eq!(zone, Zone { id: 3, name: "Parking".to_string() });
    }

    #[test]
    fn test_access_point() {
        let ap = AccessPoint::parse(
            "APINFO ID 4 NAME \"Main gate\" ZONEA 0 ZONEB 1 STATE ONLINE_NORMAL CLOSED",
        )
        .unwrap();
        assert_eq!(ap.id, 4);
        assert_eq!(ap.name, "Main gate");
        assert_eq!(ap.zonea, 0);
        assert_eq!(ap.zoneb, 1);
        assert_eq!(ap.state_adm, AdminState::Normal);
        assert_eq!(ap.state_phys, PhysicalState::Closed);
    }

    #[test]
    fn test_access_point_unknown_states() {
        let ap = AccessPoint::parse(
            "APINFO ID 4 NAME \"Gate\" ZONEA 0 ZONEB 1 STATE WEIRD SIDEWAYS",
        )
        .unwrap();
        assert_eq!(ap.state_adm, AdminState::Unknown("WEIRD".to_string()));
        assert_eq!(ap.state_phys, PhysicalState::Unknown("SIDEWAYS".to_string()));
    }

    #[test]
    fn test_access_point_offline() {
        let ap = AccessPoint::parse(
            "APINFO ID 2 NAME \"Back door\" ZONEA 1 ZONEB 2 STATE OFFLINE OFFLINE",
        )
        .unwrap();
        assert_eq!(ap.state_adm, AdminState::Offline);
        assert_eq!(ap.state_phys, PhysicalState::Offline);
    }

    #[test]
    fn test_decision_with_employee() {
        let decision =
            AccessDecision::parse("ACCESSPOLICY_REPLY RESULT 255 EMPID 42 MASKVERPOLICY_OFF")
                .unwrap();
        assert_eq!(
            decision,
            AccessDecision::WithEmployee(EmployeeDecision {
                result_id: 255,
                emp_id: 42
            })
        );
        assert!(decision.is_granted());
        assert_eq!(decision.emp_id(), Some(42));
    }

    #[test]
    fn test_decision_without_employee() {
        let line = "ACCESSPOLICY_REPLY RESULT 3 MASKVERPOLICY_OFF";
        assert!(EmployeeDecision::parse(line).is_err());

        let decision = AccessDecision::parse(line).unwrap();
        assert_eq!(
            decision,
            AccessDecision::WithoutEmployee(AnonymousDecision { result_id: 3 })
        );
        assert_eq!(decision.result(), DecisionResult::UnknownIdentifier);
        assert_eq!(decision.emp_id(), None);
    }

    #[test]
    fn test_decision_garbage() {
        let err = AccessDecision::parse("ACCESSPOLICY_REPLY RESULT x").unwrap_err();
        assert_eq!(err.shape, "ACCESSPOLICY_REPLY");
    }

    #[test]
    fn test_decision_result_codes() {
        for code in [1, 2, 3, 4, 5, 6, 7, 255] {
            let result = DecisionResult::from_code(code);
            assert!(!matches!(result, DecisionResult::Unrecognized(_)));
            assert_eq!(result.code(), code);
        }
        assert_eq!(DecisionResult::from_code(8), DecisionResult::Unrecognized(8));
        assert_eq!(DecisionResult::Unrecognized(8).code(), 8);
        assert!(DecisionResult::from_code(8).to_string().contains('8'));
    }

    #[test]
    fn test_parsed_list() {
        let list = ParsedList::from_items(["ID 1 NAME \"A\"", "junk", "ID 2 NAME \"B\""], Zone::parse);
        assert_eq!(list.records.len(), 2);
        assert_eq!(list.mismatches.len(), 1);
        assert!(!list.is_complete());
        assert_eq!(list.mismatches[0].text, "junk");

        let err = list.into_result().unwrap_err();
        assert_eq!(err.shape, "ZONEINFO");
    }

    #[test]
    fn test_record_serialization() {
        let zone = Zone { id: 3, name: "Parking".to_string() };
        let json = serde_json::to_value(&zone).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Parking");
    }
}
