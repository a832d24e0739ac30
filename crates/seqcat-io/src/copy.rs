//! Sequential file-to-stream copy engine
//!
//! One run walks `Init -> Opened -> {Reading, Writing}* -> Closed`. Any
//! failure ends the run with an [`Error`]. The input handle and the buffer
//! are owned values, so every early return closes and frees them; only the
//! success path closes explicitly, to observe the result of close(2).

use crate::policy::{self, BufferPlan};
use crate::{sys, AlignedBuffer, ChunkReader, ReliableWriter};
use seqcat_types::{BufferPolicy, BufferSize, CopyStats, Error, Result};
use std::fs::{File, Metadata};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Copy options for customizing copy behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    /// Policy that sizes and aligns the transfer buffer
    pub policy: BufferPolicy,
    /// Explicit buffer size; overrides the policy's size, not its alignment
    pub buffer_size: Option<BufferSize>,
    /// Issue a sequential read-ahead hint after opening the input
    pub read_ahead: bool,
    /// Retry reads interrupted by a signal instead of failing
    pub retry_interrupted_reads: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            policy: BufferPolicy::Fixed,
            buffer_size: None,
            read_ahead: true,
            retry_interrupted_reads: true,
        }
    }
}

impl CopyOptions {
    /// Create the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer sizing policy
    pub fn with_policy(mut self, policy: BufferPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the buffer size
    pub fn with_buffer_size(mut self, size: BufferSize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Enable or disable the read-ahead hint
    pub fn read_ahead(mut self, enabled: bool) -> Self {
        self.read_ahead = enabled;
        self
    }

    /// Enable or disable retrying interrupted reads
    pub fn retry_interrupted_reads(mut self, enabled: bool) -> Self {
        self.retry_interrupted_reads = enabled;
        self
    }
}

/// Copies one input file to an output stream through a single buffer
#[derive(Debug, Clone)]
pub struct SequentialCopyEngine {
    options: CopyOptions,
    page_size: usize,
}

impl SequentialCopyEngine {
    /// Create an engine with default options
    pub fn new() -> Self {
        Self::with_options(CopyOptions::default())
    }

    /// Create an engine with custom options
    pub fn with_options(options: CopyOptions) -> Self {
        Self {
            options,
            page_size: policy::system_page_size(),
        }
    }

    /// Options this engine runs with
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Page size used for sizing and alignment
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Copy the file at `path` to the process's standard output
    pub fn run<P: AsRef<Path>>(&self, path: P) -> Result<CopyStats> {
        self.run_to(path, sys::stdout())
    }

    /// Copy the file at `path` to `output`
    pub fn run_to<P: AsRef<Path>, W: Write>(&self, path: P, output: W) -> Result<CopyStats> {
        self.run_with(path.as_ref(), output, File::metadata, sys::close)
    }

    /// `run_to` with the metadata query and the final close supplied by the caller
    pub(crate) fn run_with<W, S, C>(
        &self,
        path: &Path,
        output: W,
        stat: S,
        close: C,
    ) -> Result<CopyStats>
    where
        W: Write,
        S: FnOnce(&File) -> io::Result<Metadata>,
        C: FnOnce(File) -> io::Result<()>,
    {
        let start_time = Instant::now();

        info!("Starting copy: {} -> output", path.display());

        let reader = ChunkReader::open(path)?;

        let readahead_applied = self.options.read_ahead && Self::advise(path, reader.get_ref());

        let plan = self.plan_for_file(path, reader.get_ref(), stat)?;
        let mut buffer = AlignedBuffer::allocate(plan.size, plan.alignment)?;
        debug!(
            "Allocated {} byte buffer aligned to {} ({} policy)",
            plan.size, plan.alignment, self.options.policy
        );

        let mut reader = reader.retry_interrupted(self.options.retry_interrupted_reads);
        let mut writer = ReliableWriter::new(output);
        Self::transfer(&mut reader, &mut writer, &mut buffer)?;
        writer.flush()?;

        let mut stats = Self::collect_stats(&reader, &writer, plan, self.options.policy);
        stats.readahead_applied = readahead_applied;

        buffer.release();
        close(reader.into_inner()).map_err(|source| Error::Close { source })?;

        stats.duration = start_time.elapsed();
        info!(
            "Copy completed: {} bytes in {} chunks in {:?}",
            stats.bytes_copied, stats.chunks, stats.duration
        );
        Ok(stats)
    }

    /// Copy everything from `input` to `output`
    ///
    /// Streams have no filesystem metadata, so the block-size policy sizes
    /// the buffer from the default block size.
    pub fn copy_stream<R: Read, W: Write>(&self, input: R, output: W) -> Result<CopyStats> {
        let start_time = Instant::now();

        let plan = policy::plan_buffer(
            &self.options.policy,
            self.page_size,
            None,
            self.options.buffer_size,
        );
        let mut buffer = AlignedBuffer::allocate(plan.size, plan.alignment)?;

        let mut reader =
            ChunkReader::new(input).retry_interrupted(self.options.retry_interrupted_reads);
        let mut writer = ReliableWriter::new(output);
        Self::transfer(&mut reader, &mut writer, &mut buffer)?;
        writer.flush()?;

        let mut stats = Self::collect_stats(&reader, &writer, plan, self.options.policy);
        stats.duration = start_time.elapsed();
        Ok(stats)
    }

    /// Read-ahead is an optimization; failing to apply it only warns
    fn advise(path: &Path, file: &File) -> bool {
        match sys::advise_sequential(file) {
            Ok(()) => {
                debug!("Sequential read-ahead advised for {}", path.display());
                true
            }
            Err(e) => {
                warn!(
                    "posix_fadvise failed for {}: {}; continuing without read-ahead hint",
                    path.display(),
                    e
                );
                false
            }
        }
    }

    fn plan_for_file<S>(&self, path: &Path, file: &File, stat: S) -> Result<BufferPlan>
    where
        S: FnOnce(&File) -> io::Result<Metadata>,
    {
        let policy = self.options.policy;

        let block_size = if policy.needs_block_size() && self.options.buffer_size.is_none() {
            let metadata = stat(file).map_err(|source| Error::Metadata {
                path: path.to_path_buf(),
                source,
            })?;
            let block_size = sys::preferred_block_size(&metadata);
            debug!("Filesystem block size for {}: {:?}", path.display(), block_size);
            block_size
        } else {
            None
        };

        Ok(policy::plan_buffer(
            &policy,
            self.page_size,
            block_size,
            self.options.buffer_size,
        ))
    }

    fn transfer<R: Read, W: Write>(
        reader: &mut ChunkReader<R>,
        writer: &mut ReliableWriter<W>,
        buffer: &mut AlignedBuffer,
    ) -> Result<()> {
        loop {
            let bytes_read = reader.read_chunk(buffer.as_mut_slice())?;
            if bytes_read == 0 {
                break; // EOF
            }

            writer.write_all(&buffer.as_slice()[..bytes_read])?;
            trace!(
                "Copied chunk {} ({} bytes, {} total)",
                reader.chunks(),
                bytes_read,
                writer.bytes_written()
            );
        }
        Ok(())
    }

    fn collect_stats<R: Read, W: Write>(
        reader: &ChunkReader<R>,
        writer: &ReliableWriter<W>,
        plan: BufferPlan,
        policy: BufferPolicy,
    ) -> CopyStats {
        CopyStats {
            bytes_copied: writer.bytes_written(),
            chunks: reader.chunks(),
            buffer_size: plan.size,
            buffer_alignment: plan.alignment,
            policy,
            readahead_applied: false,
            interrupted_retries: reader.interrupted_retries() + writer.interrupted_retries(),
            duration: std::time::Duration::ZERO,
        }
    }
}

impl Default for SequentialCopyEngine {
    fn default() -> Self {
        Self::new()
    }
}
