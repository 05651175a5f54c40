//! Encoder and decoder for CRLF-terminated OIF lines.
//!
//! The decoder only frames: it accumulates whatever bytes the transport
//! delivers and hands out complete lines. How many bytes are read per call
//! is the transport's business, so a line longer than one read chunk is just
//! more calls to [`LineDecoder::extend`].

use crate::command::Command;
use crate::error::ProtocolError;
use crate::{EOL, MAX_LINE_LENGTH};
use bytes::{BufMut, BytesMut};

/// Encodes commands into wire lines.
pub struct Encoder;

impl Encoder {
    /// Encodes a command, terminator included.
    pub fn encode_command(command: &Command) -> Result<BytesMut, ProtocolError> {
        Self::encode_line(&command.to_string())
    }

    /// Encodes a raw command line, terminator included.
    ///
    /// Fails if the text already contains a CR or LF, since the controller
    /// would read it as two commands.
    pub fn encode_line(line: &str) -> Result<BytesMut, ProtocolError> {
        if line.contains(['\r', '\n']) {
            return Err(ProtocolError::InvalidCommand(format!(
                "line break inside command: {:?}",
                line
            )));
        }
        let mut buf = BytesMut::with_capacity(line.len() + EOL.len());
        buf.put_slice(line.as_bytes());
        buf.put_slice(EOL);
        Ok(buf)
    }
}

/// Accumulates bytes and yields complete CRLF-terminated lines.
pub struct LineDecoder {
    buffer: BytesMut,
    /// Bytes already searched for a terminator.
    scanned: usize,
    max_line_length: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            scanned: 0,
            max_line_length,
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next line from the buffer.
    ///
    /// Returns `Ok(None)` when no terminator has arrived yet. The terminator
    /// is stripped before the bytes are decoded as UTF-8.
    pub fn decode_line(&mut self) -> Result<Option<String>, ProtocolError> {
        // A CR at the end of the previous scan may pair with an LF that just arrived.
        let start = self.scanned.saturating_sub(EOL.len() - 1);
        let found = self.buffer[start..]
            .windows(EOL.len())
            .position(|w| w == EOL)
            .map(|pos| start + pos);

        match found {
            Some(pos) => {
                let mut line = self.buffer.split_to(pos + EOL.len());
                line.truncate(pos);
                self.scanned = 0;
                // Checked after consuming so the buffer stays at a line boundary.
                if pos > self.max_line_length {
                    return Err(ProtocolError::LineTooLong {
                        size: pos,
                        max: self.max_line_length,
                    });
                }
                let text =
                    String::from_utf8(line.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)?;
                Ok(Some(text))
            }
            None => {
                self.scanned = self.buffer.len();
                if self.buffer.len() > self.max_line_length {
                    return Err(ProtocolError::LineTooLong {
                        size: self.buffer.len(),
                        max: self.max_line_length,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_line_appends_terminator() {
        let encoded = Encoder::encode_line("GETAPLIST").unwrap();
        assert_eq!(&encoded[..], b"GETAPLIST\r\n");
    }

    #[test]
    fn test_encode_line_rejects_embedded_breaks() {
        assert!(Encoder::encode_line("GETAPLIST\r\nQUIT").is_err());
        assert!(Encoder::encode_line("GETAPLIST\n").is_err());
    }

    #[test]
    fn test_encode_command() {
        let encoded = Encoder::encode_command(&Command::GetZoneInfo).unwrap();
        assert_eq!(&encoded[..], b"GETZONEINFO\r\n");
    }

    #[test]
    fn test_single_line() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"OK\r\n");
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("OK"));
        assert_eq!(decoder.buffered(), 0);
        assert!(decoder.decode_line().unwrap().is_none());
    }

    #[test]
    fn test_terminator_split_across_reads() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"APLIST 1 2\r");
        assert!(decoder.decode_line().unwrap().is_none());

        decoder.extend(b"\n");
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("APLIST 1 2"));
    }

    #[test]
    fn test_bare_lf_is_payload() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"A\nB\r\n");
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("A\nB"));
    }

    #[test]
    fn test_multiple_lines_in_one_read() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"OK\r\nAPLIST EMPTY\r\nPART");

        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("OK"));
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("APLIST EMPTY"));
        assert!(decoder.decode_line().unwrap().is_none());
        assert_eq!(decoder.buffered(), 4);
    }

    #[test]
    fn test_long_line_in_small_pieces() {
        let payload = "x".repeat(10_000);
        let wire = format!("{}\r\n", payload);

        let mut decoder = LineDecoder::new();
        let mut decoded = None;
        for chunk in wire.as_bytes().chunks(64) {
            decoder.extend(chunk);
            if let Some(line) = decoder.decode_line().unwrap() {
                decoded = Some(line);
            }
        }
        assert_eq!(decoded.as_deref(), Some(payload.as_str()));
    }

    #[test]
    fn test_utf8_multibyte_split() {
        let wire = "ZONEINFO ID 1 NAME \"Проходная\"\r\n".as_bytes();
        let mut decoder = LineDecoder::new();
        // Split in the middle of a two-byte character.
        decoder.extend(&wire[..21]);
        assert!(decoder.decode_line().unwrap().is_none());
        decoder.extend(&wire[21..]);
        assert_eq!(
            decoder.decode_line().unwrap().as_deref(),
            Some("ZONEINFO ID 1 NAME \"Проходная\"")
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let mut decoder = LineDecoder::new();
        decoder.extend(&[0xff, 0xfe, b'\r', b'\n']);
        assert!(matches!(decoder.decode_line(), Err(ProtocolError::InvalidUtf8)));
        // The bad line is consumed, not left to poison the next read.
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_line_too_long() {
        let mut decoder = LineDecoder::with_max_line_length(16);
        decoder.extend(&[b'a'; 17]);
        assert!(matches!(
            decoder.decode_line(),
            Err(ProtocolError::LineTooLong { size: 17, max: 16 })
        ));
    }

    #[test]
    fn test_terminated_line_over_cap() {
        let mut decoder = LineDecoder::with_max_line_length(4);
        decoder.extend(b"APLIST 1 2\r\nOK\r\n");
        assert!(matches!(
            decoder.decode_line(),
            Err(ProtocolError::LineTooLong { size: 10, max: 4 })
        ));
        assert_eq!(decoder.decode_line().unwrap(), Some("OK".to_string()));
    }

    #[test]
    fn test_clear() {
        let mut decoder = LineDecoder::default();
        decoder.extend(b"some data");
        assert_eq!(decoder.buffered(), 9);
        decoder.clear();
        assert_eq!(decoder.buffered(), 0);
    }
}
