//! High-level client API.

use crate::config::ConnectionConfig;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionState};
use oif_protocol::{
    strip_keyword, AccessDecision, AccessPoint, AccessPolicyRequest, Command, Key, ModelMismatch,
    ObjectInfo, ObjectSelector, ParsedList, Record, Segmenter, Zone,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// High-level client for a Sigur controller.
pub struct Client<S = TcpStream> {
    session: Session<S>,
}

impl Client<TcpStream> {
    /// Connects to the controller and logs in with the configured
    /// credentials.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let mut session = Session::new(config);
        session.connect().await?;
        let mut client = Self { session };
        client.login().await?;
        Ok(client)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S> {
    /// Logs in over an already established stream.
    pub async fn with_stream(stream: S, config: ConnectionConfig) -> Result<Self> {
        let mut session = Session::new(config);
        session.attach(stream)?;
        let mut client = Self { session };
        client.login().await?;
        Ok(client)
    }

    /// Wraps a session as is, whatever its state.
    pub fn from_session(session: Session<S>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<S> {
        &mut self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Logs in again with the configured credentials.
    pub async fn login(&mut self) -> Result<()> {
        self.session.login().await
    }

    /// Sends `QUIT` and closes the connection.
    pub async fn quit(&mut self) -> Result<()> {
        self.session.quit().await
    }

    /// Closes the connection without saying goodbye.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.session.disconnect().await
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    /// Sends `command` and returns the reply with its keyword stripped.
    async fn request(&mut self, command: &Command) -> Result<String> {
        let reply = self.session.query(command).await?;
        let body = expect_keyword(command, &reply)?;
        Ok(body.to_string())
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Looks up one employee, guest badge or car. `None` if the controller
    /// does not know the id.
    pub async fn object_info(&mut self, id: u32) -> Result<Option<ObjectInfo>> {
        let body = self.request(&Command::GetObjectInfo(ObjectSelector::Id(id))).await?;
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(ObjectInfo::parse(&body)?))
    }

    /// Lists every object. Items that fail to parse are returned in
    /// [`ParsedList::mismatches`].
    pub async fn object_info_all(&mut self) -> Result<ParsedList<ObjectInfo>> {
        let command = Command::GetObjectInfo(ObjectSelector::All);
        let body = self.request(&command).await?;
        let list = ParsedList::from_items(Segmenter::objects(&body), ObjectInfo::parse);
        log_mismatches(command.keyword(), &list);
        Ok(list)
    }

    // =========================================================================
    // Zones
    // =========================================================================

    /// Lists all zones.
    pub async fn zones(&mut self) -> Result<ParsedList<Zone>> {
        let command = Command::GetZoneInfo;
        let body = self.request(&command).await?;
        let list = ParsedList::from_items(Segmenter::zones(&body), Zone::parse);
        log_mismatches(command.keyword(), &list);
        Ok(list)
    }

    // =========================================================================
    // Access points
    // =========================================================================

    /// Looks up one access point. `None` if the controller does not know it.
    pub async fn access_point(&mut self, id: u32) -> Result<Option<AccessPoint>> {
        let command = Command::GetApInfo(id);
        let reply = self.session.query(&command).await?;
        if expect_keyword(&command, &reply)?.is_empty() {
            return Ok(None);
        }
        Ok(Some(AccessPoint::parse(&reply)?))
    }

    /// Ids of all access points.
    pub async fn access_point_ids(&mut self) -> Result<Vec<u32>> {
        let body = self.request(&Command::GetApList).await?;
        if body.is_empty() || body == "EMPTY" {
            return Ok(Vec::new());
        }
        body.split_whitespace()
            .map(|id| {
                id.parse::<u32>()
                    .map_err(|_| ClientError::from(ModelMismatch::new("APLIST", body.as_str())))
            })
            .collect()
    }

    /// Fetches every access point: `GETAPLIST`, then one `GETAPINFO` per id.
    ///
    /// Ids the controller no longer knows, or whose reply does not parse,
    /// end up in [`ParsedList::mismatches`].
    pub async fn access_points(&mut self) -> Result<ParsedList<AccessPoint>> {
        let ids = self.access_point_ids().await?;
        let mut list = ParsedList::new();

        for id in ids {
            let item = match self.access_point(id).await {
                Ok(Some(ap)) => Ok(ap),
                Ok(None) => Err(ModelMismatch::new(AccessPoint::SHAPE, format!("AP#{}", id))),
                Err(ClientError::ModelMismatch(mismatch)) => Err(mismatch),
                Err(err) => return Err(err),
            };
            list.push(item);
        }

        log_mismatches("GETAPINFO", &list);
        Ok(list)
    }

    // =========================================================================
    // Access policy
    // =========================================================================

    /// Asks the controller whether the subject may pass.
    pub async fn access_policy(&mut self, request: AccessPolicyRequest) -> Result<AccessDecision> {
        let command = Command::from(request);
        let reply = self.session.query(&command).await?;
        expect_keyword(&command, &reply)?;
        Ok(AccessDecision::parse(&reply)?)
    }

    /// Access decision for an employee, now, direction unknown.
    pub async fn access_policy_for_employee(
        &mut self,
        ap_id: u32,
        emp_id: u32,
    ) -> Result<AccessDecision> {
        self.access_policy(AccessPolicyRequest::for_employee(ap_id, emp_id)).await
    }

    /// Access decision for a card key, now, direction unknown.
    pub async fn access_policy_for_key(
        &mut self,
        ap_id: u32,
        key: impl Into<Key>,
    ) -> Result<AccessDecision> {
        self.access_policy(AccessPolicyRequest::for_key(ap_id, key)).await
    }
}

/// Checks the reply keyword and returns what follows it.
fn expect_keyword<'a>(command: &Command, reply: &'a str) -> Result<&'a str> {
    let Some(keyword) = command.reply_keyword() else {
        return Ok(reply);
    };
    strip_keyword(reply, keyword).ok_or_else(|| {
        tracing::warn!("Unexpected reply to {}: {:?}", command.keyword(), reply);
        ClientError::UnexpectedReply {
            command: command.keyword(),
            reply: reply.to_string(),
        }
    })
}

fn log_mismatches<T>(command: &str, list: &ParsedList<T>) {
    for mismatch in &list.mismatches {
        tracing::warn!("Skipping item in {} reply: {}", command, mismatch);
    }
}
