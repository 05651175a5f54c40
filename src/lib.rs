//! # sigur-oif
//!
//! Async client for the Sigur OIF access-control protocol.
//!
//! ```no_run
//! use sigur_oif::{Client, ConnectionConfig};
//!
//! # async fn run() -> sigur_oif::client::Result<()> {
//! let config = ConnectionConfig::new("10.0.0.5").with_credentials("sys", "secret");
//! let mut client = Client::connect(config).await?;
//!
//! for ap in client.access_points().await?.records {
//!     println!("{}", ap);
//! }
//!
//! let decision = client.access_policy_for_employee(1, 42).await?;
//! println!("{}", decision);
//!
//! client.quit().await?;
//! # Ok(())
//! # }
//! ```

pub use oif_client as client;
pub use oif_protocol as protocol;

pub use oif_client::{Client, ClientError, ConnectionConfig, Session, SessionState};
pub use oif_protocol::{
    AccessDecision, AccessPoint, AccessPolicyRequest, AdminState, DecisionResult, Direction,
    ErrorCode, Key, ObjectInfo, ParsedList, PhysicalState, W26Key, W34Key, Zone,
};
