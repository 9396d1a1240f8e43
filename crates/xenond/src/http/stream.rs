//! Run output written straight to the client connection.
//!
//! `tiny_http` collects chunked bodies into large blocks before sending
//! them, which would hold back a running program's output. Streamed replies
//! therefore take the raw connection: the response head is written by hand
//! and every chunk is framed and flushed as soon as the program produces it.

use std::io::{self, Write};
use std::sync::mpsc::Receiver;

use tiny_http::HTTPVersion;

/// How the end of a streamed body is signalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    /// `Transfer-Encoding: chunked`, ended by a zero-length chunk.
    Chunked,
    /// Raw bytes ended by closing the connection, for HTTP/1.0 clients.
    UntilClose,
}

impl Framing {
    pub(crate) fn for_version(version: &HTTPVersion) -> Self {
        if *version >= (1, 1) {
            Self::Chunked
        } else {
            Self::UntilClose
        }
    }
}

/// Writes a `200` head followed by every chunk from `receiver`.
///
/// Returns the number of body bytes sent once every sender has hung up.
pub(crate) fn write_stream<W>(
    writer: &mut W,
    receiver: &Receiver<Vec<u8>>,
    framing: Framing,
    content_type: &str,
) -> io::Result<usize>
where
    W: Write + ?Sized,
{
    match framing {
        Framing::Chunked => write!(
            writer,
            "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\n\
             Transfer-Encoding: chunked\r\nConnection: close\r\n\r\n"
        )?,
        Framing::UntilClose => write!(
            writer,
            "HTTP/1.0 200 OK\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n"
        )?,
    }
    writer.flush()?;

    let mut sent = 0;
    for chunk in receiver {
        // A zero-length chunk would end the body early.
        if chunk.is_empty() {
            continue;
        }
        if framing == Framing::Chunked {
            write!(writer, "{:x}\r\n", chunk.len())?;
            writer.write_all(&chunk)?;
            writer.write_all(b"\r\n")?;
        } else {
            writer.write_all(&chunk)?;
        }
        writer.flush()?;
        sent += chunk.len();
    }

    if framing == Framing::Chunked {
        writer.write_all(b"0\r\n\r\n")?;
        writer.flush()?;
    }
    Ok(sent)
}
