//! Configuration types for seqcat
//!
//! Named sizing constants, the buffer sizing policy selector and a validated
//! buffer size override.

use std::fmt;

/// Page size assumed when the platform cannot be queried
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// Block size substituted for implausible `st_blksize` values
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Smallest filesystem block size accepted as plausible
pub const MIN_BLOCK_SIZE: usize = 512;

/// Largest filesystem block size accepted as plausible (1MB)
pub const MAX_BLOCK_SIZE: usize = 1024 * 1024;

/// Upper bound for a computed buffer size (128KB)
pub const MAX_BUFFER_SIZE: usize = 128 * 1024;

/// Fixed buffer size past which larger buffers stop paying off for
/// sequential transfers (128KB)
pub const OPTIMAL_BUFFER_SIZE: usize = 128 * 1024;

/// Strategy used to choose the transfer buffer size and its alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferPolicy {
    /// One page, plain heap buffer
    PageSize,
    /// One page, page-aligned buffer
    AlignedPageSize,
    /// LCM of page size and sanitized filesystem block size, capped at
    /// [`MAX_BUFFER_SIZE`], page-aligned buffer
    BlockLcm,
    /// Constant [`OPTIMAL_BUFFER_SIZE`], page-aligned buffer
    #[default]
    Fixed,
}

impl BufferPolicy {
    /// All policies, in the order they were introduced
    pub const ALL: [BufferPolicy; 4] = [
        BufferPolicy::PageSize,
        BufferPolicy::AlignedPageSize,
        BufferPolicy::BlockLcm,
        BufferPolicy::Fixed,
    ];

    /// Whether the buffer must start on a page boundary
    pub fn is_page_aligned(self) -> bool {
        !matches!(self, Self::PageSize)
    }

    /// Whether the policy needs the input file's metadata
    pub fn needs_block_size(self) -> bool {
        matches!(self, Self::BlockLcm)
    }

    /// Stable lowercase name, as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::PageSize => "page-size",
            Self::AlignedPageSize => "aligned-page-size",
            Self::BlockLcm => "block-lcm",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for BufferPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Buffer size override with validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSize(usize);

impl BufferSize {
    /// Minimum buffer size (1 byte)
    pub const MIN: usize = 1;
    /// Maximum buffer size (64MB)
    pub const MAX: usize = 64 * 1024 * 1024;
    /// Default buffer size
    pub const DEFAULT: usize = OPTIMAL_BUFFER_SIZE;

    /// Create a new buffer size with validation
    pub fn new(size: usize) -> Result<Self, String> {
        if size < Self::MIN {
            Err(format!("Buffer size {} is below minimum {}", size, Self::MIN))
        } else if size > Self::MAX {
            Err(format!("Buffer size {} exceeds maximum {}", size, Self::MAX))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the buffer size value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_policy_is_fixed() {
        assert_eq!(BufferPolicy::default(), BufferPolicy::Fixed);
    }

    #[rstest]
    #[case(BufferPolicy::PageSize, false, false)]
    #[case(BufferPolicy::AlignedPageSize, true, false)]
    #[case(BufferPolicy::BlockLcm, true, true)]
    #[case(BufferPolicy::Fixed, true, false)]
    fn test_policy_requirements(
        #[case] policy: BufferPolicy,
        #[case] aligned: bool,
        #[case] needs_metadata: bool,
    ) {
        assert_eq!(policy.is_page_aligned(), aligned);
        assert_eq!(policy.needs_block_size(), needs_metadata);
    }

    #[test]
    fn test_policy_names_are_unique() {
        let mut names: Vec<_> = BufferPolicy::ALL.iter().map(|p| p.to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), BufferPolicy::ALL.len());
    }

    #[rstest]
    #[case(1, true)]
    #[case(7, true)]
    #[case(4096, true)]
    #[case(BufferSize::MAX, true)]
    #[case(0, false)]
    #[case(BufferSize::MAX + 1, false)]
    fn test_buffer_size_validation(#[case] size: usize, #[case] valid: bool) {
        assert_eq!(BufferSize::new(size).is_ok(), valid);
    }

    #[test]
    fn test_sizing_constants_are_consistent() {
        assert!(MIN_BLOCK_SIZE <= DEFAULT_BLOCK_SIZE && DEFAULT_BLOCK_SIZE <= MAX_BLOCK_SIZE);
        assert!(FALLBACK_PAGE_SIZE.is_power_of_two());
        assert_eq!(BufferSize::default().get(), OPTIMAL_BUFFER_SIZE);
    }
}
