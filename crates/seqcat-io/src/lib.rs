//! Buffered sequential read/write engine for seqcat
//!
//! This crate copies one file to an output stream through a single transfer
//! buffer:
//!
//! - **Aligned buffers**: page-aligned allocation without a native aligned
//!   allocator, released exactly once
//! - **Sizing policies**: page size, LCM of page and filesystem block size,
//!   or a fixed 128KB
//! - **Reliable writes**: short writes and `EINTR` never lose bytes
//! - **Read-ahead**: an optional sequential-access hint to the kernel
//!
//! # Examples
//!
//! ```rust,no_run
//! use seqcat_io::{CopyOptions, SequentialCopyEngine};
//! use seqcat_types::BufferPolicy;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = CopyOptions::new().with_policy(BufferPolicy::BlockLcm);
//! let engine = SequentialCopyEngine::with_options(options);
//! let stats = engine.run("source.txt")?;
//! eprintln!("Copied {} bytes in {} chunks", stats.bytes_copied, stats.chunks);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod copy;
pub mod policy;
pub mod reader;
pub mod sys;
pub mod writer;

#[cfg(test)]
mod property_tests;

pub use buffer::AlignedBuffer;
pub use copy::{CopyOptions, SequentialCopyEngine};
pub use policy::{BufferPlan, BufferSizing};
pub use reader::ChunkReader;
pub use writer::ReliableWriter;
