//! Error types that can be emitted from this library

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Generic result type with ZipError as its error variant
pub type ZipResult<T> = Result<T, ZipError>;

/// Error type for Zip
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ZipError {
    /// The archive path for a member is ill-formed
    #[error("invalid archive path {path:?}: {reason}")]
    Path {
        /// The offending path, as handed to `add`
        path: String,
        /// What the validator objected to
        reason: &'static str,
    },

    /// An archive or entry comment is too long for its 16-bit length field
    #[error("comment of {0} bytes exceeds the 65534 byte limit")]
    Comment(usize),

    /// A compression method outside {0 = store, 8 = deflate}
    #[error("unknown compression method {0}")]
    UnknownMethod(u16),

    /// The deflate encoder failed to initialize, compress, or finish
    #[error("deflate failed")]
    Deflate(#[source] io::Error),

    /// A local file could not be opened, read, or stat'ed
    #[error("failed to read {path:?}")]
    File {
        /// The filesystem path of the source
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// A caller-supplied byte source failed mid-stream
    #[error("failed to read entry source")]
    Read(#[source] io::Error),

    /// The byte sink rejected a write or failed to close
    #[error("sink failed")]
    Sink(#[source] io::Error),

    /// An operation was invoked while the writer is not in the required state
    #[error("invalid writer state: {0}")]
    InvalidState(&'static str),

    /// A member with the same archive path was already added. Part of the
    /// state-error family: the second member is refused before any bytes are
    /// emitted and the writer stays usable.
    #[error("duplicate archive path {0:?}")]
    DuplicatePath(String),
}
