//! Buffer sizing policies
//!
//! Maps the platform page size and the file's preferred block size to a
//! transfer buffer size and alignment. Everything here is pure except
//! [`system_page_size`], which asks the platform once.

use crate::sys;
use seqcat_types::{
    BufferPolicy, BufferSize, DEFAULT_BLOCK_SIZE, FALLBACK_PAGE_SIZE, MAX_BLOCK_SIZE,
    MAX_BUFFER_SIZE, MIN_BLOCK_SIZE, OPTIMAL_BUFFER_SIZE,
};
use tracing::debug;

/// Size and alignment chosen for a transfer buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPlan {
    /// Buffer size in bytes, always > 0
    pub size: usize,
    /// Required start-address alignment in bytes, always a power of two
    pub alignment: usize,
}

/// Strategy seam for choosing a transfer buffer
pub trait BufferSizing {
    /// Buffer size in bytes for the given page size and raw block size
    fn buffer_size(&self, page_size: usize, block_size: Option<u64>) -> usize;

    /// Alignment the buffer must be allocated with
    fn alignment(&self, page_size: usize) -> usize;
}

impl BufferSizing for BufferPolicy {
    fn buffer_size(&self, page_size: usize, block_size: Option<u64>) -> usize {
        match self {
            Self::PageSize | Self::AlignedPageSize => page_size,
            Self::BlockLcm => {
                let block_size = block_size.map_or(DEFAULT_BLOCK_SIZE, sanitize_block_size);
                lcm(page_size, block_size).min(MAX_BUFFER_SIZE)
            }
            Self::Fixed => OPTIMAL_BUFFER_SIZE,
        }
    }

    fn alignment(&self, page_size: usize) -> usize {
        if self.is_page_aligned() {
            page_size
        } else {
            1
        }
    }
}

/// Page size to size and align buffers with, falling back to
/// [`FALLBACK_PAGE_SIZE`] when the platform cannot tell us
pub fn system_page_size() -> usize {
    sys::page_size()
        .filter(|size| size.is_power_of_two())
        .unwrap_or_else(|| {
            debug!(
                "Page size unavailable, using fallback of {} bytes",
                FALLBACK_PAGE_SIZE
            );
            FALLBACK_PAGE_SIZE
        })
}

/// Replace implausible filesystem block sizes with [`DEFAULT_BLOCK_SIZE`]
///
/// Filesystems may report anything in `st_blksize`; only values in
/// [`MIN_BLOCK_SIZE`, `MAX_BLOCK_SIZE`] are trusted.
pub fn sanitize_block_size(raw: u64) -> usize {
    match usize::try_from(raw) {
        Ok(size) if (MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&size) => size,
        _ => {
            debug!(
                "Ignoring implausible block size {}, using {}",
                raw, DEFAULT_BLOCK_SIZE
            );
            DEFAULT_BLOCK_SIZE
        }
    }
}

/// Greatest common divisor
pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple, dividing before multiplying
///
/// Returns 0 if either input is 0 and saturates instead of overflowing.
pub fn lcm(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b)).saturating_mul(b)
}

/// Decide the buffer for one run
///
/// An explicit `size_override` wins over the policy's size; the alignment
/// always comes from the policy.
pub fn plan_buffer(
    policy: &impl BufferSizing,
    page_size: usize,
    block_size: Option<u64>,
    size_override: Option<BufferSize>,
) -> BufferPlan {
    let size = size_override.map_or_else(
        || policy.buffer_size(page_size, block_size),
        BufferSize::get,
    );
    BufferPlan {
        size,
        alignment: policy.alignment(page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4096, 4096, 4096)]
    #[case(4096, 512, 512)]
    #[case(12, 18, 6)]
    #[case(17, 5, 1)]
    #[case(0, 9, 9)]
    fn test_gcd(#[case] a: usize, #[case] b: usize, #[case] expected: usize) {
        assert_eq!(gcd(a, b), expected);
        assert_eq!(gcd(b, a), expected);
    }

    #[rstest]
    #[case(4096, 512, 4096)]
    #[case(4096, 65536, 65536)]
    #[case(4096, 6144, 12288)]
    #[case(0, 4096, 0)]
    #[case(usize::MAX, usize::MAX - 1, usize::MAX)]
    fn test_lcm(#[case] a: usize, #[case] b: usize, #[case] expected: usize) {
        assert_eq!(lcm(a, b), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(100)]
    #[case(511)]
    #[case(2_000_000)]
    #[case(u64::MAX)]
    fn test_implausible_block_sizes_use_default(#[case] raw: u64) {
        assert_eq!(sanitize_block_size(raw), DEFAULT_BLOCK_SIZE);
    }

    #[rstest]
    #[case(512)]
    #[case(4096)]
    #[case(65536)]
    #[case(1_048_576)]
    fn test_plausible_block_sizes_are_kept(#[case] raw: u64) {
        assert_eq!(sanitize_block_size(raw), raw as usize);
    }

    #[rstest]
    #[case(BufferPolicy::PageSize, Some(65536), 4096, 1)]
    #[case(BufferPolicy::AlignedPageSize, Some(65536), 4096, 4096)]
    #[case(BufferPolicy::BlockLcm, Some(65536), 65536, 4096)]
    #[case(BufferPolicy::BlockLcm, Some(1_048_576), MAX_BUFFER_SIZE, 4096)]
    #[case(BufferPolicy::BlockLcm, Some(6144), 12288, 4096)]
    #[case(BufferPolicy::BlockLcm, Some(100), 4096, 4096)]
    #[case(BufferPolicy::BlockLcm, None, 4096, 4096)]
    #[case(BufferPolicy::Fixed, Some(512), OPTIMAL_BUFFER_SIZE, 4096)]
    fn test_policy_plans(
        #[case] policy: BufferPolicy,
        #[case] block_size: Option<u64>,
        #[case] size: usize,
        #[case] alignment: usize,
    ) {
        let plan = plan_buffer(&policy, 4096, block_size, None);
        assert_eq!(plan, BufferPlan { size, alignment });
    }

    #[test]
    fn test_size_override_keeps_policy_alignment() {
        let size = BufferSize::new(7).unwrap();

        let plan = plan_buffer(&BufferPolicy::Fixed, 4096, None, Some(size));
        assert_eq!(plan, BufferPlan { size: 7, alignment: 4096 });

        let plan = plan_buffer(&BufferPolicy::PageSize, 4096, None, Some(size));
        assert_eq!(plan, BufferPlan { size: 7, alignment: 1 });
    }

    #[test]
    fn test_system_page_size_is_usable() {
        let page_size = system_page_size();
        assert!(page_size > 0);
        assert!(page_size.is_power_of_two());
    }
}
