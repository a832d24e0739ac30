//! Core data types for seqcat

use crate::BufferPolicy;
use std::time::Duration;

/// Transfer rate in bytes per second
pub type TransferRate = f64;

/// Statistics for a single copy run
#[derive(Debug, Clone, Default)]
pub struct CopyStats {
    /// Total bytes copied to the output
    pub bytes_copied: u64,
    /// Number of reads that returned data
    pub chunks: u64,
    /// Size of the transfer buffer in bytes
    pub buffer_size: usize,
    /// Alignment of the transfer buffer in bytes
    pub buffer_alignment: usize,
    /// Policy that chose the buffer size
    pub policy: BufferPolicy,
    /// Whether the kernel accepted the sequential read-ahead hint
    pub readahead_applied: bool,
    /// Interrupted reads and writes that were retried
    pub interrupted_retries: u64,
    /// Total duration of the operation
    pub duration: Duration,
}

impl CopyStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the overall transfer rate
    pub fn transfer_rate(&self) -> TransferRate {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_copied as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Average number of bytes per data-bearing read
    pub fn avg_chunk_size(&self) -> f64 {
        if self.chunks > 0 {
            self.bytes_copied as f64 / self.chunks as f64
        } else {
            0.0
        }
    }
}
