//! Core type system and error handling for seqcat
//!
//! This crate provides the types shared by the seqcat crates:
//!
//! - **Error handling**: one error enum naming the failing operation, with the
//!   system error kept as its source
//! - **Configuration**: the buffer sizing policy selector, validated sizes and
//!   the named sizing constants
//! - **Statistics**: what a copy run reports back
//!
//! # Examples
//!
//! ```rust
//! use seqcat_types::{BufferPolicy, BufferSize, CopyStats, Result};
//!
//! fn example_operation() -> Result<CopyStats> {
//!     let mut stats = CopyStats::new();
//!     stats.policy = BufferPolicy::Fixed;
//!     stats.buffer_size = BufferSize::default().get();
//!     stats.bytes_copied = 1024 * 1024; // 1MB
//!     Ok(stats)
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::{
    BufferPolicy, BufferSize, DEFAULT_BLOCK_SIZE, FALLBACK_PAGE_SIZE, MAX_BLOCK_SIZE,
    MAX_BUFFER_SIZE, MIN_BLOCK_SIZE, OPTIMAL_BUFFER_SIZE,
};
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use types::*;
