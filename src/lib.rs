//! A streaming ZIP archive writer.
//!
//! `zipstream` emits a well-formed PKZIP file to a forward-only byte sink:
//! no seeks, no whole-archive buffering, no advance knowledge of member
//! sizes. Every member defers its crc and sizes to a Zip64 data
//! descriptor, and every archive ends with the Zip64 end-of-central-
//! directory record and locator, so members and archives of any size work
//! the same way.
//!
//! Members are compressed with raw DEFLATE by default, or stored verbatim:
//!
//! ```
//! use zipstream::{ArchiveOptions, BufferSink, EntryOptions, ZipWriter};
//!
//! # fn doit() -> zipstream::ZipResult<()> {
//! let sink = BufferSink::new();
//! let bytes = sink.handle();
//!
//! let mut zip = ZipWriter::new(
//!     "greetings.zip",
//!     ArchiveOptions::default().output(sink),
//! )?;
//! zip.add_file("hello.txt", b"hello!", EntryOptions::default())?;
//! zip.add("numbers.txt", |entry| {
//!     for n in 0..10 {
//!         entry.write(format!("{}\n", n).as_bytes())?;
//!     }
//!     Ok(())
//! }, EntryOptions::default())?;
//! zip.close()?;
//!
//! assert!(bytes.lock().unwrap().starts_with(b"PK\x03\x04"));
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

#![warn(missing_docs)]

pub mod compression;
pub mod path;
pub mod result;
pub mod sink;
mod spec;
pub mod types;
pub mod write;

pub use crate::compression::CompressionMethod;
pub use crate::result::{ZipError, ZipResult};
pub use crate::sink::{BufferSink, FileSink, ResponseSink, Sink, StreamSink};
pub use crate::write::{ArchiveOptions, EntryOptions, ZipEntry, ZipWriter};
