//! Session lifecycle and the request/reply cycle.

use crate::config::ConnectionConfig;
use crate::error::{ClientError, Result};
use crate::transport::Transport;
use oif_protocol::{classify, Ack, Command, Password, Record};
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Authenticated,
    /// Terminal.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Disconnected => write!(f, "disconnected"),
            SessionState::Connected => write!(f, "connected"),
            SessionState::Authenticated => write!(f, "authenticated"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// One authenticated conversation with the controller.
///
/// Replies carry no correlation id, so only one command may be in flight;
/// every operation takes `&mut self`. Share a session between tasks only
/// behind a `tokio::sync::Mutex`.
pub struct Session<S = TcpStream> {
    transport: Option<Transport<S>>,
    state: SessionState,
    config: ConnectionConfig,
}

impl Session<TcpStream> {
    /// Opens the TCP connection: Disconnected -> Connected.
    pub async fn connect(&mut self) -> Result<()> {
        self.check_can_attach()?;
        let transport = Transport::connect(&self.config).await?;
        self.install(transport);
        Ok(())
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            transport: None,
            state: SessionState::Disconnected,
            config,
        }
    }

    /// Adopts an already established stream: Disconnected -> Connected.
    pub fn attach(&mut self, stream: S) -> Result<()> {
        self.check_can_attach()?;
        let transport = Transport::new(stream, self.config.chunk_size())
            .with_max_line_length(self.config.max_line_length);
        self.install(transport);
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    fn check_can_attach(&self) -> Result<()> {
        match self.state {
            SessionState::Disconnected => Ok(()),
            SessionState::Closed => Err(ClientError::SessionClosed),
            SessionState::Connected | SessionState::Authenticated => {
                Err(ClientError::AlreadyConnected)
            }
        }
    }

    fn install(&mut self, transport: Transport<S>) {
        self.transport = Some(transport);
        self.transition(SessionState::Connected);
    }

    fn transition(&mut self, to: SessionState) {
        tracing::debug!("Session {} -> {}", self.state, to);
        self.state = to;
    }

    /// Sends `LOGIN` with the configured credentials.
    pub async fn login(&mut self) -> Result<()> {
        let username = self.config.username.clone();
        let password = self.config.password.clone();
        self.login_as(&username, &password).await
    }

    /// Sends `LOGIN` and moves to Authenticated only on an `OK` reply.
    ///
    /// Any other outcome leaves the session Connected, including a failed
    /// login on an already authenticated session. A lost connection closes
    /// it instead.
    pub async fn login_as(&mut self, username: &str, password: &Password) -> Result<()> {
        match self.state {
            SessionState::Connected | SessionState::Authenticated => {}
            SessionState::Disconnected => return Err(ClientError::NotConnected),
            SessionState::Closed => return Err(ClientError::SessionClosed),
        }

        let command = Command::login(self.config.version.clone(), username, password.clone());
        let outcome = match self.round_trip(&command).await {
            Ok(reply) => Ack::parse(&reply).map(drop).map_err(ClientError::from),
            Err(err) => Err(err),
        };

        if let Err(err) = outcome {
            // A rejected re-login drops the earlier authentication.
            if self.state == SessionState::Authenticated {
                self.transition(SessionState::Connected);
            }
            return Err(err);
        }

        tracing::debug!("Logged in as {}", username);
        self.transition(SessionState::Authenticated);
        Ok(())
    }

    /// Sends one command and returns the reply line.
    ///
    /// `ERROR` replies become [`ClientError::Server`]. Requires an
    /// authenticated session; otherwise nothing is sent.
    pub async fn query(&mut self, command: &Command) -> Result<String> {
        match self.state {
            SessionState::Authenticated => {}
            SessionState::Connected => return Err(ClientError::NotAuthenticated),
            SessionState::Disconnected => return Err(ClientError::NotConnected),
            SessionState::Closed => return Err(ClientError::SessionClosed),
        }
        self.round_trip(command).await
    }

    async fn round_trip(&mut self, command: &Command) -> Result<String> {
        let read_timeout = self.read_timeout();
        let transport = self.transport.as_mut().ok_or(ClientError::NotConnected)?;

        tracing::debug!("Sending {}", command.keyword());
        let result = async {
            transport.send(command).await?;
            transport.read_line(read_timeout).await
        }
        .await;

        let line = match result {
            Ok(line) => line,
            Err(err) if err.is_connection_lost() => {
                // Nothing more can be said on this stream.
                tracing::debug!("Dropping connection: {}", err);
                self.transport = None;
                self.transition(SessionState::Closed);
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        tracing::debug!("Reply to {} ({} bytes)", command.keyword(), line.len());
        classify(&line)?;
        Ok(line)
    }

    fn read_timeout(&self) -> Duration {
        self.config.read_timeout()
    }

    /// Sends `QUIT` and closes without waiting for a reply.
    pub async fn quit(&mut self) -> Result<()> {
        let sent = match self.transport.as_mut() {
            Some(transport) => {
                tracing::debug!("Sending QUIT");
                transport.send(&Command::Quit).await
            }
            None => Ok(()),
        };
        let closed = self.disconnect().await;
        sent.and(closed)
    }

    /// Closes the connection from any state. Calling it again is a no-op.
    pub async fn disconnect(&mut self) -> Result<()> {
        let result = match self.transport.take() {
            Some(mut transport) => transport.close().await,
            None => Ok(()),
        };
        if self.state != SessionState::Closed {
            self.transition(SessionState::Closed);
        }
        result
    }
}
