use std::{fmt::Debug, io, str};

use memchr::memchr;

use crate::{
    buffer::{ReadBuffer, BUF_SIZE},
    headers::{HeaderMap, CONTENT_LENGTH},
    Error, StatusCode,
};

/// A blocking HTTP/1.x response read incrementally off a socket.
///
/// Construction via [`Response::receive`] blocks until the status line and
/// the whole header block have been consumed from the socket. Body bytes are
/// then pulled on demand with [`Response::stream_to`], one bounded step per
/// call.
///
/// The socket is borrowed for the lifetime of the response and only ever
/// read, never written to or closed. Bodies are framed by `Content-Length`
/// exclusively; a response without that header is treated as having an empty
/// body. Chunked transfer-encoding is not supported.
pub struct Response<'s, S> {
    socket: &'s mut S,
    path: String,
    status: StatusCode,
    headers: HeaderMap,
    content_length: u64,
    buffer: ReadBuffer,
    bytes_read: u64,
}

/// Reading phase of the response prelude. Transitions are strictly forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    StatusLine,
    Headers,
    Body,
}

/// Accumulated result of parsing the status line and header block, fed one
/// complete line at a time.
struct Prelude {
    phase: Phase,
    status: StatusCode,
    headers: HeaderMap,
    content_length: u64,
}

impl Prelude {
    fn new() -> Self {
        Self {
            phase: Phase::StatusLine,
            status: StatusCode::new(0),
            headers: HeaderMap::new(),
            content_length: 0,
        }
    }

    /// Consume one terminated line and advance the phase accordingly.
    fn feed_line(&mut self, line: &[u8]) -> crate::Result<()> {
        let content = trim_terminator(line);
        match self.phase {
            Phase::StatusLine => {
                self.status = parse_status_line(content)?;
                self.phase = Phase::Headers;
            }
            Phase::Headers if content.is_empty() => {
                self.phase = Phase::Body;
            }
            Phase::Headers => self.feed_header_line(content)?,
            // The read loops stop feeding the moment Body is reached.
            Phase::Body => debug_assert!(false, "line fed after header block ended"),
        }
        Ok(())
    }

    fn feed_header_line(&mut self, content: &[u8]) -> crate::Result<()> {
        let text = str::from_utf8(content)
            .map_err(|_| Error::MalformedHeader(String::from_utf8_lossy(content).into_owned()))?;
        let Some((name, value)) = text.split_once(':') else {
            return Err(Error::MalformedHeader(text.to_owned()));
        };
        self.headers.insert(name, value);
        if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
            let value = value.trim();
            self.content_length = value
                .parse()
                .map_err(|_| Error::InvalidContentLength(value.to_owned()))?;
        }
        Ok(())
    }
}

/// Strip the line feed and an optional preceding carriage return.
fn trim_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Extract the numeric status from `HTTP/<version> <status> ...`. The
/// version is ignored.
fn parse_status_line(content: &[u8]) -> crate::Result<StatusCode> {
    let text = str::from_utf8(content).map_err(|_| Error::MalformedStatusLine)?;
    let mut parts = text.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(proto), Some(code)) if proto.starts_with("HTTP/") => code
            .parse()
            .map(StatusCode::new)
            .map_err(|_| Error::MalformedStatusLine),
        _ => Err(Error::MalformedStatusLine),
    }
}

impl<'s, S: io::Read> Response<'s, S> {
    /// Read the status line and header block off `socket`, blocking until
    /// the header block terminates.
    ///
    /// `path` is an opaque label identifying the request this response
    /// answers; it is stored verbatim and never reparsed.
    ///
    /// Body bytes that arrive in the same raw read as the tail of the header
    /// block are retained and will be delivered by [`Response::stream_to`].
    ///
    /// # Errors
    ///
    /// Fails without yielding a partially-usable response if the peer closes
    /// the connection mid-header-block ([`Error::IncompleteResponse`]), the
    /// status line or a header line is malformed, a line overflows the
    /// [`BUF_SIZE`](crate::BUF_SIZE) read buffer, the `Content-Length` value
    /// is non-numeric, or the transport reports an I/O error.
    pub fn receive(socket: &'s mut S, path: impl Into<String>) -> crate::Result<Self> {
        let mut buffer = ReadBuffer::new();
        // Staging area for a line spanning multiple raw reads.
        let mut pending: Vec<u8> = Vec::new();
        let mut prelude = Prelude::new();

        // Outer loop: one raw socket read per iteration. Inner loop: extract
        // every terminated line held in the buffer without further reads.
        // Both stop the instant the header block ends, never at end of
        // buffer or end of socket data.
        'read: while prelude.phase != Phase::Body {
            buffer.clear();
            let n_bytes = buffer.fill_from(&mut *socket)?;
            if n_bytes == 0 {
                return Err(Error::IncompleteResponse);
            }
            log::trace!("read {n_bytes} bytes while parsing the prelude");

            let mut pos = 0;
            while prelude.phase != Phase::Body {
                let Some(offset) = memchr(b'\n', &buffer.filled()[pos..]) else {
                    // No terminator in the rest of this chunk: it all belongs
                    // to the current line. Stage it and read again.
                    pending.extend_from_slice(&buffer.filled()[pos..]);
                    if pending.len() > BUF_SIZE {
                        return Err(Error::LineTooLong);
                    }
                    continue 'read;
                };
                let end = pos + offset + 1;
                pending.extend_from_slice(&buffer.filled()[pos..end]);
                if pending.len() > BUF_SIZE {
                    return Err(Error::LineTooLong);
                }
                prelude.feed_line(&pending)?;
                pending.clear();
                pos = end;
            }

            // Whatever follows the header block in this chunk is body data;
            // keep it at the front of the buffer for streaming.
            buffer.carry_to_front(pos);
        }

        log::debug!(
            "prelude complete: status {}, {} headers, content length {}, {} body bytes buffered",
            prelude.status,
            prelude.headers.len(),
            prelude.content_length,
            buffer.len(),
        );
        Ok(Self {
            socket,
            path: path.into(),
            status: prelude.status,
            headers: prelude.headers,
            content_length: prelude.content_length,
            buffer,
            bytes_read: 0,
        })
    }

    /// Get the `StatusCode` of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the request path label this response corresponds to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the value of the specified header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Get all parsed response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the `content-length` of this response, or 0 if the header was
    /// absent.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Stream the next slice of the body into `sink`.
    ///
    /// Performs at most one raw socket read, then writes every buffered body
    /// byte (clamped to the declared `Content-Length`) to the sink. Returns
    /// `Ok(Some(n))` with the number of bytes written, or `Ok(None)` once
    /// the body is exhausted. A single call is not guaranteed to deliver the
    /// full remaining body; call repeatedly until `None`.
    ///
    /// # Errors
    ///
    /// [`Error::IncompleteResponse`] if the peer closes the connection with
    /// body bytes still owed, or [`Error::Io`] for transport and sink
    /// failures.
    pub fn stream_to<W: io::Write>(&mut self, sink: &mut W) -> crate::Result<Option<usize>> {
        if self.bytes_read >= self.content_length {
            return Ok(None);
        }
        if self.bytes_read + (self.buffer.len() as u64) < self.content_length {
            let n_bytes = self.buffer.fill_from(&mut *self.socket)?;
            log::trace!("read {n_bytes} body bytes");
            if n_bytes == 0 && self.buffer.is_empty() {
                return Err(Error::IncompleteResponse);
            }
        }
        let remaining = self.content_length - self.bytes_read;
        let streamed = (self.buffer.len() as u64).min(remaining) as usize;
        sink.write_all(&self.buffer.filled()[..streamed])?;
        self.bytes_read += streamed as u64;
        // Bytes a peer sends past the declared length are dropped here.
        self.buffer.clear();
        Ok(Some(streamed))
    }

    /// Block until the rest of the body has been read, returning it as
    /// bytes.
    pub fn bytes(&mut self) -> crate::Result<Vec<u8>> {
        let mut body = Vec::new();
        while self.stream_to(&mut body)?.is_some() {}
        Ok(body)
    }

    /// Block until the rest of the body has been read, returning it as
    /// text. Invalid UTF-8 sequences are replaced.
    pub fn text(&mut self) -> crate::Result<String> {
        let body = self.bytes()?;
        Ok(String::from_utf8(body)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned()))
    }
}

impl<S> Debug for Response<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("path", &self.path)
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .field("bytes_read", &self.bytes_read)
            .finish()
    }
}
