//! Possible ZIP compression methods.

use crate::result::{ZipError, ZipResult};

/// Compression methods for the contents of a ZIP file.
///
/// Only the two methods every ZIP reader understands are representable;
/// anything else on the numeric side is rejected up front.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompressionMethod {
    /// The file is stored (no compression)
    Stored,
    /// The file is deflated (raw RFC 1951, no zlib wrapper)
    Deflated,
}

impl CompressionMethod {
    /// Converts a wire representation to a method.
    pub fn from_u16(val: u16) -> ZipResult<CompressionMethod> {
        match val {
            0 => Ok(CompressionMethod::Stored),
            8 => Ok(CompressionMethod::Deflated),
            v => Err(ZipError::UnknownMethod(v)),
        }
    }

    /// Converts a method to its wire representation.
    pub fn to_u16(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflated => 8,
        }
    }
}

impl Default for CompressionMethod {
    fn default() -> Self {
        CompressionMethod::Deflated
    }
}
