//! Writer that never reports success for a partial transfer

use seqcat_types::{Error, Result};
use std::io::{self, Write};
use tracing::trace;

/// Wraps an output and transfers whole byte ranges
///
/// A single `write` may accept fewer bytes than requested or be interrupted
/// by a signal; [`ReliableWriter::write_all`] keeps going until every byte is
/// accepted or a real error occurs.
#[derive(Debug)]
pub struct ReliableWriter<W> {
    inner: W,
    bytes_written: u64,
    interrupted_retries: u64,
}

impl<W: Write> ReliableWriter<W> {
    /// Wrap an output
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
            interrupted_retries: 0,
        }
    }

    /// Write every byte of `data`, returning `data.len()`
    ///
    /// Interrupted writes are retried over the same range. Any other failure,
    /// including an output that accepts zero bytes, aborts with
    /// [`Error::Write`].
    pub fn write_all(&mut self, data: &[u8]) -> Result<usize> {
        let mut remaining = data;

        while !remaining.is_empty() {
            match self.inner.write(remaining) {
                Ok(0) => {
                    return Err(Error::Write {
                        source: io::Error::new(
                            io::ErrorKind::WriteZero,
                            format!("output accepted 0 of {} remaining bytes", remaining.len()),
                        ),
                    });
                }
                Ok(written) => {
                    if written < remaining.len() {
                        trace!("Short write: {} of {} bytes", written, remaining.len());
                    }
                    remaining = &remaining[written..];
                    self.bytes_written += written as u64;
                }
                Err(source) => {
                    let error = Error::Write { source };
                    if !error.is_recoverable() {
                        return Err(error);
                    }
                    self.interrupted_retries += 1;
                    trace!("Write interrupted, retrying {} bytes", remaining.len());
                }
            }
        }

        Ok(data.len())
    }

    /// Flush the underlying output
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|source| Error::Write { source })
    }

    /// Get the number of bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Number of interrupted writes that were retried
    pub fn interrupted_retries(&self) -> u64 {
        self.interrupted_retries
    }

    /// Borrow the wrapped output
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the output
    pub fn into_inner(self) -> W {
        self.inner
    }
}
