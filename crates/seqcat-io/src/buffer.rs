//! Aligned transfer buffers
//!
//! The buffer over-allocates from the global allocator by `alignment - 1`
//! bytes and exposes the first aligned address inside that block. The raw
//! allocation and the offset of the aligned view live side by side in the
//! struct, so releasing always frees exactly the block that was allocated.

use seqcat_types::{Error, Result};
use tracing::trace;

/// Heap buffer whose usable region starts on an `alignment` boundary
#[derive(Debug)]
pub struct AlignedBuffer {
    storage: Vec<u8>,
    offset: usize,
    len: usize,
    alignment: usize,
}

impl AlignedBuffer {
    /// Allocate a zeroed buffer of `size` usable bytes aligned to `alignment`
    ///
    /// `alignment` must be a non-zero power of two and `size` must be
    /// non-zero. Allocation failure is reported instead of aborting.
    pub fn allocate(size: usize, alignment: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::allocation(size, alignment, "size must be non-zero"));
        }
        if !alignment.is_power_of_two() {
            return Err(Error::allocation(
                size,
                alignment,
                "alignment must be a power of two",
            ));
        }

        let total = size
            .checked_add(alignment - 1)
            .ok_or_else(|| Error::allocation(size, alignment, "size overflows usize"))?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(total)
            .map_err(|e| Error::allocation(size, alignment, e.to_string()))?;
        // Capacity is already reserved, so this never moves the block.
        storage.resize(total, 0);

        let base = storage.as_ptr() as usize;
        let offset = (alignment - base % alignment) % alignment;

        trace!(
            "Allocated {} bytes aligned to {} (raw {} bytes, offset {})",
            size,
            alignment,
            total,
            offset
        );

        Ok(Self {
            storage,
            offset,
            len: size,
            alignment,
        })
    }

    /// Usable length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a zero-sized buffer cannot be allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment boundary of the usable region
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Start of the usable region
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    /// The usable region
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.len]
    }

    /// The usable region, mutably
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.offset..self.offset + self.len]
    }

    /// Free the buffer
    ///
    /// Dropping does the same; this exists so the release point is explicit
    /// in the engine.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        trace!(
            "Released {} byte buffer aligned to {}",
            self.len,
            self.alignment
        );
    }
}
