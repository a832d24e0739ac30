//! Platform shims for the copy engine
//!
//! Thin wrappers over the few system calls std does not expose: the page
//! size, the sequential read-ahead advisory, an unbuffered standard output
//! and a close that reports its result.

use std::fs::{File, Metadata};
use std::io;

/// Memory page size reported by the platform, if it can be queried
#[cfg(unix)]
pub fn page_size() -> Option<usize> {
    // SAFETY: sysconf has no memory-safety preconditions.
    let value = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(value).ok().filter(|&size| size > 0)
}

/// Memory page size reported by the platform, if it can be queried
#[cfg(not(unix))]
pub fn page_size() -> Option<usize> {
    None
}

/// The filesystem's preferred I/O block size (`st_blksize`) for a file
#[cfg(unix)]
pub fn preferred_block_size(metadata: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.blksize())
}

/// The filesystem's preferred I/O block size (`st_blksize`) for a file
#[cfg(not(unix))]
pub fn preferred_block_size(_metadata: &Metadata) -> Option<u64> {
    None
}

/// Tell the kernel the whole file will be read sequentially
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
pub fn advise_sequential(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let rc = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_SEQUENTIAL) };
    // posix_fadvise returns the error number instead of setting errno.
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(rc))
    }
}

/// Tell the kernel the whole file will be read sequentially
#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
pub fn advise_sequential(_file: &File) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "posix_fadvise is not available on this platform",
    ))
}

/// Close a file and report the result of close(2)
#[cfg(unix)]
pub fn close(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `into_raw_fd` handed us sole ownership, so this is the only close.
    if unsafe { libc::close(fd) } == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Close a file and report the result of close(2)
#[cfg(not(unix))]
pub fn close(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// Standard output without std's line buffering
///
/// Each `write` is exactly one write(2) on descriptor 1, so short writes and
/// `EINTR` surface to the caller unchanged.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawStdout;

#[cfg(unix)]
impl io::Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for reads of `buf.len()` bytes for the whole call.
        let written = unsafe { libc::write(libc::STDOUT_FILENO, buf.as_ptr().cast(), buf.len()) };
        if written < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(written as usize)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Handle used for the process's standard output
#[cfg(unix)]
pub fn stdout() -> RawStdout {
    RawStdout
}

/// Handle used for the process's standard output
#[cfg(not(unix))]
pub fn stdout() -> io::Stdout {
    io::stdout()
}
