//! Byte transport and line reading.

use crate::config::ConnectionConfig;
use crate::error::{ClientError, Result};
use oif_protocol::{Command, Encoder, LineDecoder};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Owns one stream to the controller.
///
/// Generic over the stream so tests can substitute in-memory pipes.
pub struct Transport<S = TcpStream> {
    stream: Option<S>,
    decoder: LineDecoder,
    chunk: Vec<u8>,
}

impl Transport<TcpStream> {
    /// Opens a TCP connection to the configured controller.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let addr = config.address();
        tracing::debug!("Connecting to {}...", addr);

        let stream =
            connect_within(&addr, config.connect_timeout(), TcpStream::connect(&addr)).await?;

        // Commands are single short lines; don't let Nagle hold them back.
        stream.set_nodelay(true).ok();

        tracing::debug!("TCP connected to {}", addr);
        Ok(Self::new(stream, config.chunk_size()).with_max_line_length(config.max_line_length))
    }
}

/// Bounds a connect attempt by `timeout`.
///
/// Running out of time is a connect failure (`Io` with `TimedOut`), kept
/// apart from [`ClientError::Timeout`], which only reads produce.
async fn connect_within<T>(
    addr: &str,
    timeout: Duration,
    connect: impl Future<Output = io::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => {
            tracing::debug!("Connection to {} failed: {}", addr, e);
            Err(ClientError::Io(e))
        }
        Err(_) => {
            tracing::debug!("Connection to {} timed out", addr);
            Err(ClientError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connect to {} timed out after {:?}", addr, timeout),
            )))
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Transport<S> {
    /// Wraps an established stream. `chunk_size` bounds each socket read.
    pub fn new(stream: S, chunk_size: usize) -> Self {
        Self {
            stream: Some(stream),
            decoder: LineDecoder::new(),
            chunk: vec![0u8; chunk_size.max(1)],
        }
    }

    /// Replaces the line length cap (default `MAX_LINE_LENGTH`).
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.decoder = LineDecoder::with_max_line_length(max_line_length);
        self
    }

    /// Returns whether the stream has not been closed yet.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Sends raw bytes.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Encodes and sends one command line.
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        let encoded = Encoder::encode_command(command)?;
        self.write(&encoded).await
    }

    /// Reads one CRLF-terminated line, terminator stripped.
    ///
    /// The whole call is bounded by `timeout`. Lines longer than one read
    /// chunk are accumulated over several reads.
    pub async fn read_line(&mut self, timeout: Duration) -> Result<String> {
        if let Some(line) = self.decoder.decode_line()? {
            return Ok(line);
        }

        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
        tokio::time::timeout(
            timeout,
            read_until_line(stream, &mut self.decoder, &mut self.chunk),
        )
        .await
        .map_err(|_| {
            tracing::debug!("Read timed out after {:?}", timeout);
            ClientError::Timeout(timeout)
        })?
    }

    /// Shuts the stream down. Calling it again is a no-op.
    ///
    /// The stream is released even if the shutdown itself fails.
    pub async fn close(&mut self) -> Result<()> {
        self.decoder.clear();
        match self.stream.take() {
            Some(mut stream) => {
                tracing::debug!("Closing transport");
                stream.shutdown().await?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Reads bounded chunks into `decoder` until it yields a line.
async fn read_until_line<R: AsyncRead + Unpin>(
    stream: &mut R,
    decoder: &mut LineDecoder,
    chunk: &mut [u8],
) -> Result<String> {
    loop {
        let n = stream.read(chunk).await?;
        if n == 0 {
            tracing::debug!("Connection closed by peer");
            return Err(ClientError::ConnectionClosed);
        }

        decoder.extend(&chunk[..n]);
        if let Some(line) = decoder.decode_line()? {
            return Ok(line);
        }

        if n == chunk.len() {
            tracing::trace!(
                "Read chunk full without terminator, {} bytes buffered",
                decoder.buffered()
            );
        }
    }
}
