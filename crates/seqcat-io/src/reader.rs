//! Chunked input reader

use seqcat_types::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// Reads an input one buffer-full at a time
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: R,
    retry_interrupted: bool,
    bytes_read: u64,
    chunks: u64,
    interrupted_retries: u64,
}

impl ChunkReader<File> {
    /// Open a file read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Opened file for reading: {}", path.display());

        Ok(Self::new(file))
    }
}

impl<R: Read> ChunkReader<R> {
    /// Wrap an input; interrupted reads are retried by default
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            retry_interrupted: true,
            bytes_read: 0,
            chunks: 0,
            interrupted_retries: 0,
        }
    }

    /// Choose whether an interrupted read is retried or reported
    pub fn retry_interrupted(mut self, retry: bool) -> Self {
        self.retry_interrupted = retry;
        self
    }

    /// Read up to `buf.len()` bytes; `Ok(0)` means end of input
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => {
                    if n > 0 {
                        self.chunks += 1;
                        self.bytes_read += n as u64;
                    }
                    return Ok(n);
                }
                Err(source) => {
                    let error = Error::Read { source };
                    if !(self.retry_interrupted && error.is_recoverable()) {
                        return Err(error);
                    }
                    self.interrupted_retries += 1;
                    trace!("Read interrupted, retrying");
                }
            }
        }
    }

    /// Get the number of bytes read so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of reads that returned data
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// Number of interrupted reads that were retried
    pub fn interrupted_retries(&self) -> u64 {
        self.interrupted_retries
    }

    /// Borrow the wrapped input
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap the input
    pub fn into_inner(self) -> R {
        self.inner
    }
}
