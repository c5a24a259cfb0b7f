//! An incremental, blocking HTTP/1.x response reader.
//!
//! ## Overview
//!
//! Sippet consumes bytes directly from a connected socket and exposes a
//! three-phase view of an HTTP response: status line, headers, and a
//! `Content-Length`-delimited body drained in chunks. It handles the awkward
//! part of reading responses off a raw stream: a line may span several socket
//! reads, a single read may carry several lines plus the start of the body,
//! and body bytes that arrive alongside the header block must be preserved.
//!
//! Everything else about the connection belongs to the caller: establishing
//! it, sending the request, DNS, TLS, timeouts and retries. The reader only
//! ever reads the socket and never closes it. Chunked transfer-encoding and
//! HTTP/2 are out of scope; a response without `Content-Length` is treated as
//! having an empty body.
//!
//! ## Usage
//!
//! ```no_run
//! use std::io::Write;
//! use std::net::TcpStream;
//!
//! # fn main() -> sippet::Result<()> {
//! let mut socket = TcpStream::connect("example.com:80")?;
//! socket.write_all(
//!     b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n",
//! )?;
//!
//! let mut response = sippet::Response::receive(&mut socket, "/index.html")?;
//! println!("{} -> {}", response.path(), response.status());
//! if let Some(content_type) = response.header("Content-Type") {
//!     println!("content type: {content_type}");
//! }
//!
//! let mut body = Vec::new();
//! while response.stream_to(&mut body)?.is_some() {}
//! assert_eq!(body.len() as u64, response.content_length());
//! # Ok(())
//! # }
//! ```
//!
//! Every call to [`Response::stream_to`] performs at most one socket read,
//! so the work per call is bounded; loop until it returns `None`.
//!
//! ## Blocking behavior
//!
//! All socket interaction is blocking and single-threaded. There are no
//! internal timeouts; a stalled peer blocks the calling thread until the
//! socket layer gives up. Set read timeouts on the socket itself if you need
//! them.

#![deny(missing_docs)]

mod buffer;
mod error;
mod headers;
mod response;
mod status;

pub use buffer::BUF_SIZE;
pub use error::{Error, Result};
pub use headers::{HeaderMap, CONTENT_LENGTH};
pub use response::Response;
pub use status::StatusCode;
