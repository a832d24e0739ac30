//! Result type alias for seqcat operations

use crate::Error;

/// Result type alias for seqcat operations
pub type Result<T> = std::result::Result<T, Error>;
