//! Destinations for streamed program output.

use std::io;
use std::sync::mpsc::Sender;

/// Receives output chunks in the order the child wrote them.
///
/// A sink that fails stops receiving output; the sandbox keeps draining
/// the pipe so the child never blocks on a full buffer.
pub trait OutputSink {
    /// Accepts one chunk of output.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination has gone away.
    fn accept(&mut self, chunk: &[u8]) -> io::Result<()>;
}

impl OutputSink for Vec<u8> {
    fn accept(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

impl OutputSink for Sender<Vec<u8>> {
    fn accept(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.send(chunk.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "output receiver dropped"))
    }
}

impl<F> OutputSink for F
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    fn accept(&mut self, chunk: &[u8]) -> io::Result<()> {
        self(chunk)
    }
}
