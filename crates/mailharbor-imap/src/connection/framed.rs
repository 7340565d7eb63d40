//! Framed I/O: CRLF-terminated lines with embedded literals.
//!
//! A response is one line plus, when the line ends in `{n}`, the next
//! `n` bytes and the continuation of the line after them. The framing
//! layer also enforces size caps so a misbehaving server cannot exhaust
//! memory.

#![allow(clippy::missing_errors_doc)]

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::{Error, Result};

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Cap on one response line. Anything longer is a protocol violation.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Cap on one literal block.
const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024;

/// Buffered framed stream over any byte-duplex transport.
pub struct FramedStream<S> {
    reader: BufReader<S>,
    write_buffer: BytesMut,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a transport stream.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Reads one complete response, literals included.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();

        loop {
            let line = self.read_line().await?;
            response.extend_from_slice(&line);

            if let Some(literal_len) = parse_literal_length(&line) {
                if literal_len > MAX_LITERAL_SIZE {
                    return Err(Error::Protocol(format!(
                        "literal of {literal_len} bytes exceeds the {MAX_LITERAL_SIZE} byte cap"
                    )));
                }
                let mut literal = vec![0u8; literal_len];
                self.reader.read_exact(&mut literal).await?;
                response.extend_from_slice(&literal);
                // The response continues after the literal.
            } else {
                break;
            }
        }

        Ok(response)
    }

    /// Reads one complete response with a deadline.
    ///
    /// Exceeding a read timeout is terminal for the session.
    pub async fn read_response_timeout(&mut self, deadline: Duration) -> Result<Vec<u8>> {
        timeout(deadline, self.read_response())
            .await
            .map_err(|_| Error::Timeout(deadline))?
    }

    async fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }

            if let Some(pos) = find_crlf(buf) {
                line.extend_from_slice(&buf[..pos + 2]);
                self.reader.consume(pos + 2);
                break;
            }

            let len = buf.len();
            line.extend_from_slice(buf);
            self.reader.consume(len);

            if line.len() > MAX_LINE_LENGTH {
                return Err(Error::Protocol("response line too long".to_string()));
            }
        }

        Ok(line)
    }

    /// Writes a command line and flushes.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(data);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buffer).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Writes raw bytes (literal payloads) and flushes.
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Returns a reference to the transport.
    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    /// Returns a mutable reference to the transport.
    pub fn get_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }

    /// Unwraps the transport. Buffered data is dropped.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Parses `{n}` or `{n+}` at the end of a CRLF-terminated line.
fn parse_literal_length(line: &[u8]) -> Option<usize> {
    if !line.ends_with(b"\r\n") {
        return None;
    }
    let line = &line[..line.len() - 2];

    let open = line.iter().rposition(|&b| b == b'{')?;
    if !line.ends_with(b"}") {
        return None;
    }

    let num_start = open + 1;
    let num_end = if line.ends_with(b"+}") {
        line.len() - 2
    } else {
        line.len() - 1
    };

    let digits = std::str::from_utf8(&line[num_start..num_end]).ok()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Accumulates responses until the tagged completion for one command.
pub struct ResponseAccumulator {
    tag: String,
    responses: Vec<Vec<u8>>,
}

impl ResponseAccumulator {
    /// Creates an accumulator for the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            responses: Vec::new(),
        }
    }

    /// Reads responses until the tagged completion arrives, returning
    /// everything in arrival order (the tagged line last).
    pub async fn read_until_tagged<S>(
        &mut self,
        framed: &mut FramedStream<S>,
    ) -> Result<Vec<Vec<u8>>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let response = framed.read_response().await?;

            let is_tagged = response
                .get(..self.tag.len())
                .is_some_and(|prefix| prefix == self.tag.as_bytes())
                && response.get(self.tag.len()).is_some_and(|&b| b == b' ');

            self.responses.push(response);

            if is_tagged {
                break;
            }
        }

        Ok(std::mem::take(&mut self.responses))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[test]
    fn crlf_detection() {
        assert_eq!(find_crlf(b"hello\r\n"), Some(5));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"no newline"), None);
        assert_eq!(find_crlf(b"cr only\r"), None);
    }

    #[test]
    fn literal_length_parsing() {
        assert_eq!(parse_literal_length(b"BODY {123}\r\n"), Some(123));
        assert_eq!(parse_literal_length(b"BODY {123+}\r\n"), Some(123));
        assert_eq!(parse_literal_length(b"{0}\r\n"), Some(0));
        assert_eq!(parse_literal_length(b"no literal\r\n"), None);
        assert_eq!(parse_literal_length(b"incomplete {12"), None);
        assert_eq!(parse_literal_length(b"bogus {12a}\r\n"), None);
    }

    #[tokio::test]
    async fn read_simple_line() {
        let mock = Builder::new().read(b"* OK ready\r\n").build();
        let mut framed = FramedStream::new(mock);

        let response = framed.read_response().await.unwrap();
        assert_eq!(response, b"* OK ready\r\n");
    }

    #[tokio::test]
    async fn read_response_with_literal() {
        let mock = Builder::new()
            .read(b"* 1 FETCH (BODY[] {5}\r\n")
            .read(b"hello)\r\n")
            .build();
        let mut framed = FramedStream::new(mock);

        let response = framed.read_response().await.unwrap();
        assert_eq!(response, b"* 1 FETCH (BODY[] {5}\r\nhello)\r\n");
    }

    #[tokio::test]
    async fn read_response_with_two_literals() {
        let mock = Builder::new()
            .read(b"* 1 FETCH (BODY[1] {2}\r\n")
            .read(b"ab BODY[2] {3}\r\n")
            .read(b"cde)\r\n")
            .build();
        let mut framed = FramedStream::new(mock);

        let response = framed.read_response().await.unwrap();
        assert_eq!(response, b"* 1 FETCH (BODY[1] {2}\r\nab BODY[2] {3}\r\ncde)\r\n");
    }

    #[tokio::test]
    async fn write_command() {
        let mock = Builder::new().write(b"A0001 LOGIN user pass\r\n").build();
        let mut framed = FramedStream::new(mock);

        framed
            .write_command(b"A0001 LOGIN user pass\r\n")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn accumulator_stops_at_tagged() {
        let mock = Builder::new()
            .read(b"* CAPABILITY IMAP4rev1\r\n")
            .read(b"* 3 EXISTS\r\n")
            .read(b"A0001 OK done\r\n")
            .build();

        let mut framed = FramedStream::new(mock);
        let mut accumulator = ResponseAccumulator::new("A0001");

        let responses = accumulator.read_until_tagged(&mut framed).await.unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[2], b"A0001 OK done\r\n");
    }

    #[tokio::test]
    async fn accumulator_does_not_stop_at_prefix_match() {
        // A tag that happens to prefix another must not match.
        let mock = Builder::new()
            .read(b"A00010 OK other\r\n")
            .read(b"A0001 OK mine\r\n")
            .build();

        let mut framed = FramedStream::new(mock);
        let mut accumulator = ResponseAccumulator::new("A0001");

        let responses = accumulator.read_until_tagged(&mut framed).await.unwrap();
        assert_eq!(responses.len(), 2);
    }

    #[tokio::test]
    async fn oversized_literal_is_rejected() {
        let header = format!("* 1 FETCH (BODY[] {{{}}}\r\n", MAX_LITERAL_SIZE + 1);
        let mock = Builder::new().read(header.as_bytes()).build();
        let mut framed = FramedStream::new(mock);

        let err = framed.read_response().await.unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[tokio::test]
    async fn oversized_line_is_rejected() {
        let long_line = "A".repeat(MAX_LINE_LENGTH + 10);
        let mock = Builder::new().read(long_line.as_bytes()).build();
        let mut framed = FramedStream::new(mock);

        let err = framed.read_response().await.unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[tokio::test]
    async fn eof_is_an_error() {
        let mock = Builder::new().build();
        let mut framed = FramedStream::new(mock);
        assert!(framed.read_response().await.is_err());
    }
}
