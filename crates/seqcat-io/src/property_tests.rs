//! Property-based tests for seqcat-io components

use crate::buffer::AlignedBuffer;
use crate::copy::{CopyOptions, SequentialCopyEngine};
use crate::policy::{self, BufferSizing};
use crate::writer::ReliableWriter;
use proptest::prelude::*;
use seqcat_types::{BufferPolicy, BufferSize, MAX_BUFFER_SIZE};
use std::io::{self, Cursor, Write};

/// Accepts a pseudo-random, never-zero number of bytes per call
struct ChoppyWriter {
    data: Vec<u8>,
    steps: Vec<usize>,
    call: usize,
}

impl Write for ChoppyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let step = self.steps[self.call % self.steps.len()];
        self.call += 1;
        let n = buf.len().min(step);
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Power-of-two alignments from 1 byte to 64KB
fn alignment_strategy() -> impl Strategy<Value = usize> {
    (0u32..=16).prop_map(|shift| 1usize << shift)
}

/// Block sizes a filesystem may plausibly report
fn block_size_strategy() -> impl Strategy<Value = u64> {
    512u64..=1_048_576
}

proptest! {
    /// The usable region is aligned and at least as large as requested
    #[test]
    fn test_aligned_allocation_properties(
        size in 1usize..=1024 * 1024,
        alignment in alignment_strategy()
    ) {
        let buffer = AlignedBuffer::allocate(size, alignment).unwrap();

        prop_assert_eq!(buffer.as_ptr() as usize % alignment, 0);
        prop_assert!(buffer.as_slice().len() >= size);
    }

    /// The LCM policy yields a capped common multiple of page and block size
    #[test]
    fn test_lcm_policy_bound(block_size in block_size_strategy()) {
        let page_size = 4096;
        let size = BufferPolicy::BlockLcm.buffer_size(page_size, Some(block_size));
        let sanitized = policy::sanitize_block_size(block_size);
        let uncapped = policy::lcm(page_size, sanitized);

        prop_assert!(size > 0);
        prop_assert!(size <= MAX_BUFFER_SIZE);
        prop_assert_eq!(uncapped % page_size, 0);
        prop_assert_eq!(uncapped % sanitized, 0);
        if uncapped <= MAX_BUFFER_SIZE {
            prop_assert_eq!(size, uncapped);
        } else {
            prop_assert_eq!(size, MAX_BUFFER_SIZE);
        }
    }

    /// Out-of-range block sizes always fall back to the default
    #[test]
    fn test_sanitize_rejects_out_of_range(
        raw in prop_oneof![0u64..512, 1_048_577u64..=u64::MAX]
    ) {
        prop_assert_eq!(policy::sanitize_block_size(raw), 4096);
    }

    /// write_all transfers everything however the output chops the writes
    #[test]
    fn test_write_all_survives_short_writes(
        data in prop::collection::vec(any::<u8>(), 0..=8192),
        steps in prop::collection::vec(1usize..=97, 1..=8)
    ) {
        let mut writer = ReliableWriter::new(ChoppyWriter { data: Vec::new(), steps, call: 0 });

        prop_assert_eq!(writer.write_all(&data).unwrap(), data.len());
        prop_assert_eq!(writer.into_inner().data, data);
    }

    /// Output equals input for any buffer size and policy
    #[test]
    fn test_copy_round_trip(
        data in prop::collection::vec(any::<u8>(), 0..=20_000),
        buffer_size in 1usize..=9000,
        policy in prop::sample::select(BufferPolicy::ALL.to_vec())
    ) {
        let options = CopyOptions::new()
            .with_policy(policy)
            .with_buffer_size(BufferSize::new(buffer_size).unwrap());
        let engine = SequentialCopyEngine::with_options(options);

        let mut output = Vec::new();
        let stats = engine.copy_stream(Cursor::new(&data), &mut output).unwrap();

        prop_assert_eq!(&output, &data);
        prop_assert_eq!(stats.bytes_copied, data.len() as u64);
        prop_assert_eq!(stats.chunks, data.len().div_ceil(buffer_size) as u64);
    }
}
