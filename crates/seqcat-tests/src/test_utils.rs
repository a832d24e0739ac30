use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test data generation patterns
#[derive(Debug, Clone, Copy)]
pub enum TestDataPattern {
    /// All zeros
    Zeros,
    /// Deterministic pseudo-random bytes
    Random,
    /// Repeating structured bytes
    Realistic,
}

/// Generate test data with specified pattern
///
/// Random data comes from a fixed-seed xorshift generator so failures
/// reproduce.
pub fn generate_test_data(size: usize, pattern: TestDataPattern) -> Vec<u8> {
    match pattern {
        TestDataPattern::Zeros => vec![0u8; size],
        TestDataPattern::Random => {
            let mut state = 0x2545_F491_4F6C_DD1Du64;
            (0..size)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    (state >> 24) as u8
                })
                .collect()
        }
        TestDataPattern::Realistic => (0..size).map(|i| ((i * 7 + 13) % 256) as u8).collect(),
    }
}

/// Create a temporary file with test data
pub fn create_test_file(
    temp_dir: &TempDir,
    name: &str,
    size: usize,
    pattern: TestDataPattern,
) -> PathBuf {
    let file_path = temp_dir.path().join(name);
    let data = generate_test_data(size, pattern);
    fs::write(&file_path, data).expect("Failed to write test file");
    file_path
}

/// Buffer sizes every byte-exactness check runs against
pub struct CommonBufferSizes;

impl CommonBufferSizes {
    /// One byte per read
    pub const BYTE: usize = 1;
    /// Odd size that never lines up with anything
    pub const ODD: usize = 7;
    /// One common page
    pub const PAGE: usize = 4096;
    /// The fixed policy's size
    pub const OPTIMAL: usize = 128 * 1024;

    /// All sizes, labelled
    pub fn all() -> Vec<(&'static str, usize)> {
        vec![
            ("1B", Self::BYTE),
            ("7B", Self::ODD),
            ("4KB", Self::PAGE),
            ("128KB", Self::OPTIMAL),
        ]
    }
}

/// Output that records every write call and accepts at most `limit` bytes
/// per call
#[derive(Debug)]
pub struct RecordingOutput {
    /// Bytes accepted so far
    pub data: Vec<u8>,
    /// Length of the slice offered to each write call
    pub offered: Vec<usize>,
    /// Upper bound on bytes accepted per call
    pub limit: usize,
}

impl RecordingOutput {
    /// Accepts whole writes
    pub fn unlimited() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Accepts at most `limit` bytes per call
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            offered: Vec::new(),
            limit,
        }
    }
}

impl Write for RecordingOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.offered.push(buf.len());
        let n = buf.len().min(self.limit);
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Output whose every other write is interrupted by a signal
#[derive(Debug, Default)]
pub struct FlakyOutput {
    /// Bytes accepted so far
    pub data: Vec<u8>,
    /// Interruptions delivered
    pub interruptions: u64,
    calls: u64,
}

impl Write for FlakyOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.calls % 2 == 1 {
            self.interruptions += 1;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
