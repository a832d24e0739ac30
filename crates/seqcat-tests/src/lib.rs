//! seqcat integration testing support
//!
//! Shared helpers for the cross-crate tests in `tests/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Deterministic test data, temporary input files and output doubles that
/// misbehave the way real descriptors do.
pub mod test_utils;
