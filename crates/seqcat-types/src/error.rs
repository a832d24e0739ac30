//! Error types and handling for seqcat
//!
//! Every variant names the operation that failed. I/O variants keep the
//! underlying [`std::io::Error`] as their source so callers can render the
//! full chain (`open '/tmp/x': No such file or directory`).

use std::io;
use std::path::PathBuf;

/// Main error type for seqcat operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Querying the input file's metadata failed
    #[error("stat '{}'", path.display())]
    Metadata {
        /// Path whose metadata was requested
        path: PathBuf,
        /// Underlying system error
        #[source]
        source: io::Error,
    },

    /// The transfer buffer could not be allocated
    #[error("align_alloc: cannot allocate {size} bytes aligned to {alignment}: {message}")]
    Allocation {
        /// Requested usable size in bytes
        size: usize,
        /// Requested alignment in bytes
        alignment: usize,
        /// Reason reported by the allocator or the argument check
        message: String,
    },

    /// Opening the input file failed
    #[error("open '{}'", path.display())]
    Open {
        /// Path that could not be opened
        path: PathBuf,
        /// Underlying system error
        #[source]
        source: io::Error,
    },

    /// Reading from the input failed
    #[error("read")]
    Read {
        /// Underlying system error
        #[source]
        source: io::Error,
    },

    /// Writing to the output failed
    #[error("write_all")]
    Write {
        /// Underlying system error
        #[source]
        source: io::Error,
    },

    /// Closing the input handle failed after the transfer
    #[error("close")]
    Close {
        /// Underlying system error
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Metadata query errors
    Metadata,
    /// Buffer allocation errors
    Allocation,
    /// Open errors
    Open,
    /// Read errors
    Read,
    /// Write errors
    Write,
    /// Close errors
    Close,
    /// Configuration errors
    Config,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Metadata { .. } => ErrorKind::Metadata,
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::Open { .. } => ErrorKind::Open,
            Self::Read { .. } => ErrorKind::Read,
            Self::Write { .. } => ErrorKind::Write,
            Self::Close { .. } => ErrorKind::Close,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// The system error behind this failure, if there is one
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Metadata { source, .. }
            | Self::Open { source, .. }
            | Self::Read { source }
            | Self::Write { source }
            | Self::Close { source } => Some(source),
            Self::Allocation { .. } | Self::Config { .. } => None,
        }
    }

    /// Check if the failed operation could succeed if issued again
    ///
    /// Only a call interrupted by a signal qualifies.
    pub fn is_recoverable(&self) -> bool {
        self.io_error().is_some_and(|e| e.kind() == io::ErrorKind::Interrupted)
    }

    /// Create a new allocation error
    pub fn allocation<S: Into<String>>(size: usize, alignment: usize, message: S) -> Self {
        Self::Allocation {
            size,
            alignment,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::error::Error as _;

    fn os_error(kind: io::ErrorKind) -> io::Error {
        io::Error::new(kind, "simulated")
    }

    fn not_found() -> io::Error {
        os_error(io::ErrorKind::NotFound)
    }

    #[rstest]
    #[case(Error::Metadata { path: "/a".into(), source: not_found() }, ErrorKind::Metadata)]
    #[case(Error::allocation(16, 4096, "out of memory"), ErrorKind::Allocation)]
    #[case(Error::Open { path: "/a".into(), source: not_found() }, ErrorKind::Open)]
    #[case(Error::Read { source: os_error(io::ErrorKind::Other) }, ErrorKind::Read)]
    #[case(Error::Write { source: os_error(io::ErrorKind::BrokenPipe) }, ErrorKind::Write)]
    #[case(Error::Close { source: os_error(io::ErrorKind::Other) }, ErrorKind::Close)]
    #[case(Error::config("bad buffer size"), ErrorKind::Config)]
    fn test_error_kind_mapping(#[case] error: Error, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn test_open_error_names_path_and_keeps_source() {
        let error = Error::Open {
            path: PathBuf::from("/nonexistent/file.txt"),
            source: os_error(io::ErrorKind::NotFound),
        };

        assert_eq!(error.to_string(), "open '/nonexistent/file.txt'");
        let source = error.source().expect("open error carries a source");
        assert_eq!(source.to_string(), "simulated");
        assert_eq!(error.io_error().map(io::Error::kind), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn test_allocation_error_has_no_io_source() {
        let error = Error::allocation(131072, 3, "alignment must be a power of two");

        assert!(error.io_error().is_none());
        assert!(error.source().is_none());
        assert!(error.to_string().contains("131072"));
        assert!(error.to_string().contains("power of two"));
    }

    #[rstest]
    #[case(io::ErrorKind::Interrupted, true)]
    #[case(io::ErrorKind::BrokenPipe, false)]
    #[case(io::ErrorKind::WriteZero, false)]
    fn test_only_interruptions_are_recoverable(
        #[case] kind: io::ErrorKind,
        #[case] expected: bool,
    ) {
        assert_eq!(Error::Read { source: os_error(kind) }.is_recoverable(), expected);
        assert!(!Error::config("bad").is_recoverable());
    }

    proptest! {
        #[test]
        fn test_config_error_preserves_message(message in ".*") {
            let error = Error::config(message.clone());
            prop_assert_eq!(error.kind(), ErrorKind::Config);
            prop_assert_eq!(error.to_string(), format!("Configuration error: {}", message));
        }
    }
}
