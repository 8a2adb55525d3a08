//! Types for creating ZIP archives
//!
//! The writer never seeks: every member's local header goes out with
//! zeroed crc/size fields and bit 3 set, the payload streams through the
//! selected filter, and a Zip64 data descriptor carries the real values.
//! `close()` replays the finalized member records into the central
//! directory and the trailing Zip64 records.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::mem;
use std::path::Path;
use std::time::UNIX_EPOCH;

use byteorder::{LittleEndian, WriteBytesExt};
use crc32fast::Hasher;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use time::OffsetDateTime;
use tracing::debug;

use crate::compression::CompressionMethod;
use crate::path::validate_archive_path;
use crate::result::{ZipError, ZipResult};
use crate::sink::{ResponseSink, Sink};
use crate::spec;
use crate::types::{DateTime, ZipEntryData};

/// Chunk size for draining a byte source in [`ZipWriter::add_stream`].
const STREAM_CHUNK_SIZE: usize = 8192;

/// Archive-wide settings for a [`ZipWriter`].
pub struct ArchiveOptions {
    method: CompressionMethod,
    comment: Vec<u8>,
    time: Option<i64>,
    content_type: String,
    output: Option<Box<dyn Sink>>,
}

impl ArchiveOptions {
    /// Set the default compression method for added members.
    ///
    /// The default is `CompressionMethod::Deflated`.
    #[must_use]
    pub fn method(mut self, method: CompressionMethod) -> ArchiveOptions {
        self.method = method;
        self
    }

    /// Set the archive comment, raw bytes. Must be shorter than 0xFFFF
    /// bytes; longer comments make construction fail.
    #[must_use]
    pub fn comment<C: Into<Vec<u8>>>(mut self, comment: C) -> ArchiveOptions {
        self.comment = comment.into();
        self
    }

    /// Set the default modification timestamp (Unix seconds, UTC) for
    /// added members. Defaults to the wall clock at construction.
    #[must_use]
    pub fn time(mut self, secs: i64) -> ArchiveOptions {
        self.time = Some(secs);
        self
    }

    /// Set the MIME type forwarded to the sink as advisory metadata.
    ///
    /// The default is `application/zip`.
    #[must_use]
    pub fn content_type<S: Into<String>>(mut self, content_type: S) -> ArchiveOptions {
        self.content_type = content_type.into();
        self
    }

    /// Set the sink the archive is written to. The default streams an
    /// HTTP response to standard output.
    #[must_use]
    pub fn output<S: Sink + 'static>(mut self, sink: S) -> ArchiveOptions {
        self.output = Some(Box::new(sink));
        self
    }
}

impl Default for ArchiveOptions {
    fn default() -> ArchiveOptions {
        ArchiveOptions {
            method: CompressionMethod::Deflated,
            comment: Vec::new(),
            time: None,
            content_type: String::from("application/zip"),
            output: None,
        }
    }
}

/// Per-member settings for the `add_*` family.
#[derive(Clone, Debug, Default)]
pub struct EntryOptions {
    method: Option<CompressionMethod>,
    time: Option<i64>,
    comment: Vec<u8>,
}

impl EntryOptions {
    /// Override the archive's default compression method for this member.
    #[must_use]
    pub fn method(mut self, method: CompressionMethod) -> EntryOptions {
        self.method = Some(method);
        self
    }

    /// Override the archive's default timestamp (Unix seconds, UTC).
    #[must_use]
    pub fn time(mut self, secs: i64) -> EntryOptions {
        self.time = Some(secs);
        self
    }

    /// Set the member comment, raw bytes, shorter than 0xFFFF bytes.
    #[must_use]
    pub fn comment<C: Into<Vec<u8>>>(mut self, comment: C) -> EntryOptions {
        self.comment = comment.into();
        self
    }
}

// `close` consumes the writer, so "closed" needs no runtime state; the
// only thing worth remembering is whether a failure poisoned the archive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum WriterState {
    Ready,
    Broken,
}

/// Streaming ZIP archive generator.
///
/// Members are serialized strictly one at a time through [`ZipWriter::add`]
/// and its convenience wrappers; [`ZipWriter::close`] emits the central
/// directory and trailing records. The writer owns its sink and tracks the
/// archive offset itself, so the sink only ever needs to append.
///
/// ```no_run
/// use zipstream::{ArchiveOptions, EntryOptions, FileSink, ZipWriter};
///
/// # fn doit() -> zipstream::ZipResult<()> {
/// let options = ArchiveOptions::default().output(FileSink::new("out.zip"));
/// let mut zip = ZipWriter::new("out.zip", options)?;
/// zip.add_file("hello.txt", b"hello!", EntryOptions::default())?;
/// let total_bytes = zip.close()?;
/// # let _ = total_bytes;
/// # Ok(())
/// # }
/// ```
pub struct ZipWriter {
    sink: Box<dyn Sink>,
    offset: u64,
    files: Vec<ZipEntryData>,
    files_by_name: HashMap<String, usize>,
    default_method: CompressionMethod,
    default_time: i64,
    comment: Vec<u8>,
    state: WriterState,
}

impl ZipWriter {
    /// Initializes the archive: forwards `name` and the content type to
    /// the sink as advisory metadata, then opens the sink.
    pub fn new(name: &str, options: ArchiveOptions) -> ZipResult<ZipWriter> {
        if options.comment.len() >= u16::MAX as usize {
            return Err(ZipError::Comment(options.comment.len()));
        }
        let default_time = options
            .time
            .unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp());

        let mut sink = options
            .output
            .unwrap_or_else(|| Box::new(ResponseSink::stdout()));
        sink.set("name", name);
        sink.set("type", &options.content_type);
        sink.open().map_err(ZipError::Sink)?;
        debug!(name, "archive opened");

        Ok(ZipWriter {
            sink,
            offset: 0,
            files: Vec::new(),
            files_by_name: HashMap::new(),
            default_method: options.method,
            default_time,
            comment: options.comment,
            state: WriterState::Ready,
        })
    }

    /// Constructs an archive, lets `build_fn` fill it, and closes it.
    /// Returns the total archive size in bytes.
    pub fn send<F>(name: &str, build_fn: F, options: ArchiveOptions) -> ZipResult<u64>
    where
        F: FnOnce(&mut ZipWriter) -> ZipResult<()>,
    {
        let mut writer = ZipWriter::new(name, options)?;
        build_fn(&mut writer)?;
        writer.close()
    }

    /// Adds one member, streaming its bytes through `write_fn`.
    ///
    /// This is the serializing primitive everything else builds on. The
    /// [`ZipEntry`] handle is only valid inside `write_fn`; when the
    /// closure returns, the filter is flushed and the data descriptor
    /// goes out. Precondition failures (bad path, duplicate, oversized
    /// comment, wrong state) are reported before any bytes are emitted
    /// and leave the writer usable; failures after that poison it.
    pub fn add<F>(&mut self, path: &str, write_fn: F, options: EntryOptions) -> ZipResult<()>
    where
        F: FnOnce(&mut ZipEntry<'_>) -> ZipResult<()>,
    {
        self.expect_ready()?;
        validate_archive_path(path)?;
        if self.files_by_name.contains_key(path) {
            return Err(ZipError::DuplicatePath(path.to_string()));
        }
        if options.comment.len() >= u16::MAX as usize {
            return Err(ZipError::Comment(options.comment.len()));
        }
        let method = options.method.unwrap_or(self.default_method);
        let timestamp = options.time.unwrap_or(self.default_time);

        match self.write_member(path, method, timestamp, options.comment, write_fn) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = WriterState::Broken;
                Err(e)
            }
        }
    }

    /// Adds one member from an in-memory buffer.
    pub fn add_file(&mut self, path: &str, bytes: &[u8], options: EntryOptions) -> ZipResult<()> {
        self.add(path, |entry| entry.write(bytes), options)
    }

    /// Adds one member by draining `source` in 8 KiB chunks until
    /// end-of-source. The source is consumed and dropped on return.
    pub fn add_stream<R: Read>(
        &mut self,
        path: &str,
        mut source: R,
        options: EntryOptions,
    ) -> ZipResult<()> {
        self.add(
            path,
            |entry| copy_source(entry, &mut source, ZipError::Read),
            options,
        )
    }

    /// Adds one member from a file on disk. Unless overridden in
    /// `options`, the member timestamp is the file's modification time.
    pub fn add_file_from_path(
        &mut self,
        path: &str,
        fs_path: &Path,
        mut options: EntryOptions,
    ) -> ZipResult<()> {
        let file_err = |source: io::Error| ZipError::File {
            path: fs_path.to_path_buf(),
            source,
        };
        let mut file = File::open(fs_path).map_err(file_err)?;
        if options.time.is_none() {
            let modified = file
                .metadata()
                .and_then(|meta| meta.modified())
                .map_err(file_err)?;
            let secs = match modified.duration_since(UNIX_EPOCH) {
                Ok(since) => since.as_secs() as i64,
                Err(before) => -(before.duration().as_secs() as i64),
            };
            options.time = Some(secs);
        }
        self.add(
            path,
            |entry| copy_source(entry, &mut file, file_err),
            options,
        )
    }

    /// Finish the archive: central directory, Zip64 end record, Zip64
    /// locator, end record, then close the sink. Returns the total number
    /// of bytes handed to the sink.
    pub fn close(mut self) -> ZipResult<u64> {
        self.expect_ready()?;
        self.finalize()
    }

    /// Total bytes handed to the sink so far.
    pub fn total_bytes(&self) -> u64 {
        self.offset
    }

    fn expect_ready(&self) -> ZipResult<()> {
        match self.state {
            WriterState::Ready => Ok(()),
            WriterState::Broken => Err(ZipError::InvalidState(
                "archive failed; the emitted prefix is not a valid zip",
            )),
        }
    }

    /// Hands `bytes` to the sink and advances the archive offset.
    fn emit(&mut self, bytes: &[u8]) -> ZipResult<()> {
        self.sink.write_all(bytes).map_err(ZipError::Sink)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    fn write_member<F>(
        &mut self,
        path: &str,
        method: CompressionMethod,
        timestamp: i64,
        comment: Vec<u8>,
        write_fn: F,
    ) -> ZipResult<()>
    where
        F: FnOnce(&mut ZipEntry<'_>) -> ZipResult<()>,
    {
        let last_modified_time = DateTime::from_timestamp(timestamp);
        let header_start = self.offset;
        debug!(path, method = method.to_u16(), header_start, "starting entry");

        let mut header = Vec::with_capacity(30 + path.len() + 4);
        write_local_file_header(&mut header, path, method, last_modified_time)
            .map_err(ZipError::Sink)?;
        self.emit(&header)?;

        let mut entry = ZipEntry::new(self.sink.as_mut(), method);
        write_fn(&mut entry)?;
        let totals = entry.finish()?;
        self.offset += totals.compressed_size;

        let mut descriptor = Vec::with_capacity(24);
        spec::DataDescriptor {
            crc32: totals.crc32,
            compressed_size: totals.compressed_size,
            uncompressed_size: totals.uncompressed_size,
        }
        .write(&mut descriptor)
        .map_err(ZipError::Sink)?;
        self.emit(&descriptor)?;

        debug!(
            path,
            compressed = totals.compressed_size,
            uncompressed = totals.uncompressed_size,
            "entry finished"
        );

        let data = ZipEntryData {
            file_name: path.to_string(),
            file_comment: comment,
            compression_method: method,
            timestamp,
            last_modified_time,
            crc32: totals.crc32,
            compressed_size: totals.compressed_size,
            uncompressed_size: totals.uncompressed_size,
            header_start,
        };
        self.files_by_name
            .insert(data.file_name.clone(), self.files.len());
        self.files.push(data);
        Ok(())
    }

    fn finalize(&mut self) -> ZipResult<u64> {
        let central_start = self.offset;
        let mut central = Vec::new();
        for file in self.files.iter() {
            write_central_directory_header(&mut central, file).map_err(ZipError::Sink)?;
        }
        self.emit(&central)?;
        let central_size = self.offset - central_start;

        let zip64_end_start = self.offset;
        let mut record = Vec::with_capacity(56);
        spec::Zip64CentralDirectoryEnd {
            disk_number: 0,
            disk_with_central_directory: 0,
            number_of_files_on_this_disk: self.files.len() as u64,
            number_of_files: self.files.len() as u64,
            central_directory_size: central_size,
            central_directory_offset: central_start,
        }
        .write(&mut record)
        .map_err(ZipError::Sink)?;
        self.emit(&record)?;

        let mut locator = Vec::with_capacity(20);
        spec::Zip64CentralDirectoryEndLocator {
            disk_with_central_directory: 0,
            end_of_central_directory_offset: zip64_end_start,
            number_of_disks: 1,
        }
        .write(&mut locator)
        .map_err(ZipError::Sink)?;
        self.emit(&locator)?;

        let number_of_files = (self.files.len() as u64).min(spec::ZIP64_ENTRY_THR) as u16;
        let mut footer = Vec::with_capacity(22 + self.comment.len());
        spec::CentralDirectoryEnd {
            disk_number: 0,
            disk_with_central_directory: 0,
            number_of_files_on_this_disk: number_of_files,
            number_of_files,
            central_directory_size: central_size.min(spec::ZIP64_BYTES_THR) as u32,
            central_directory_offset: central_start.min(spec::ZIP64_BYTES_THR) as u32,
            zip_file_comment: mem::take(&mut self.comment),
        }
        .write(&mut footer)
        .map_err(ZipError::Sink)?;
        self.emit(&footer)?;

        self.sink.close().map_err(ZipError::Sink)?;
        debug!(
            entries = self.files.len(),
            total_bytes = self.offset,
            "archive finalized"
        );
        Ok(self.offset)
    }
}

/// Drains `source` into `entry`, mapping read failures with `map_err`.
fn copy_source<R, E>(entry: &mut ZipEntry<'_>, source: &mut R, map_err: E) -> ZipResult<()>
where
    R: Read,
    E: Fn(io::Error) -> ZipError,
{
    let mut chunk = [0u8; STREAM_CHUNK_SIZE];
    loop {
        match source.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => entry.write(&chunk[..n])?,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(map_err(e)),
        }
    }
}

/// Streaming handle for one member's bytes.
///
/// Handed to the closure of [`ZipWriter::add`] and valid only there; the
/// borrow it holds on the archive's sink is what enforces "one member at a
/// time".
pub struct ZipEntry<'a> {
    filter: EntryFilter<'a>,
    hasher: Hasher,
    uncompressed_size: u64,
}

struct EntryTotals {
    crc32: u32,
    compressed_size: u64,
    uncompressed_size: u64,
}

impl<'a> ZipEntry<'a> {
    fn new(sink: &'a mut dyn Sink, method: CompressionMethod) -> ZipEntry<'a> {
        let writer = SinkWriter {
            sink,
            bytes_written: 0,
            deferred: None,
        };
        let filter = match method {
            CompressionMethod::Stored => EntryFilter::Storer(writer),
            CompressionMethod::Deflated => {
                EntryFilter::Deflater(DeflateEncoder::new(writer, Compression::default()))
            }
        };
        ZipEntry {
            filter,
            hasher: Hasher::new(),
            uncompressed_size: 0,
        }
    }

    /// Appends a chunk of the member's uncompressed bytes.
    pub fn write(&mut self, chunk: &[u8]) -> ZipResult<()> {
        self.hasher.update(chunk);
        self.uncompressed_size += chunk.len() as u64;
        let result = match &mut self.filter {
            EntryFilter::Storer(writer) => writer.write_all(chunk),
            EntryFilter::Deflater(encoder) => encoder.write_all(chunk),
            EntryFilter::Closed => return Err(ZipError::InvalidState("entry already closed")),
        };
        result.map_err(|e| self.resolve_error(e))
    }

    /// Finishes the filter (emitting any compressed tail) and returns the
    /// final crc and sizes.
    fn finish(mut self) -> ZipResult<EntryTotals> {
        let writer = match mem::replace(&mut self.filter, EntryFilter::Closed) {
            EntryFilter::Storer(writer) => writer,
            EntryFilter::Deflater(mut encoder) => {
                if let Err(e) = encoder.try_finish() {
                    return Err(match encoder.get_mut().deferred.take() {
                        Some(sink_err) => ZipError::Sink(sink_err),
                        None => ZipError::Deflate(e),
                    });
                }
                encoder.finish().map_err(ZipError::Deflate)?
            }
            EntryFilter::Closed => return Err(ZipError::InvalidState("entry already closed")),
        };
        Ok(EntryTotals {
            crc32: self.hasher.finalize(),
            compressed_size: writer.bytes_written,
            uncompressed_size: self.uncompressed_size,
        })
    }

    /// A failed filter write is a sink failure if the sink recorded one,
    /// otherwise the encoder itself gave up.
    fn resolve_error(&mut self, fallback: io::Error) -> ZipError {
        let deferred = match &mut self.filter {
            EntryFilter::Storer(writer) => writer.deferred.take(),
            EntryFilter::Deflater(encoder) => encoder.get_mut().deferred.take(),
            EntryFilter::Closed => None,
        };
        match deferred {
            Some(sink_err) => ZipError::Sink(sink_err),
            None => ZipError::Deflate(fallback),
        }
    }
}

enum EntryFilter<'a> {
    Storer(SinkWriter<'a>),
    Deflater(DeflateEncoder<SinkWriter<'a>>),
    Closed,
}

/// Adapts the [`Sink`] contract to `io::Write` for the compression filter,
/// counting the compressed bytes that actually reach the sink. The real
/// sink error is parked in `deferred` so the entry can tell sink failures
/// from encoder failures after the `io::Write` round trip.
struct SinkWriter<'a> {
    sink: &'a mut dyn Sink,
    bytes_written: u64,
    deferred: Option<io::Error>,
}

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.sink.write_all(buf) {
            Ok(()) => {
                self.bytes_written += buf.len() as u64;
                Ok(buf.len())
            }
            Err(e) => {
                self.deferred = Some(e);
                Err(io::Error::new(io::ErrorKind::Other, "sink rejected write"))
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn write_local_file_header<W: Write>(
    writer: &mut W,
    file_name: &str,
    method: CompressionMethod,
    last_modified_time: DateTime,
) -> io::Result<()> {
    // local file header signature
    writer.write_u32::<LittleEndian>(spec::LOCAL_FILE_HEADER_SIGNATURE)?;
    // version needed to extract
    writer.write_u16::<LittleEndian>(spec::DEFAULT_VERSION)?;
    // general purpose bit flag
    writer.write_u16::<LittleEndian>(spec::GENERAL_PURPOSE_FLAG)?;
    // compression method
    writer.write_u16::<LittleEndian>(method.to_u16())?;
    // last mod file time and last mod file date
    writer.write_u16::<LittleEndian>(last_modified_time.timepart())?;
    writer.write_u16::<LittleEndian>(last_modified_time.datepart())?;
    // crc-32 and sizes are all deferred to the data descriptor
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)?;
    // file name length
    writer.write_u16::<LittleEndian>(file_name.len() as u16)?;
    // extra field length
    writer.write_u16::<LittleEndian>(4)?;
    // file name
    writer.write_all(file_name.as_bytes())?;
    // empty zip64 extra placeholder, present on every entry
    writer.write_u16::<LittleEndian>(spec::ZIP64_EXTRA_FIELD_TAG)?;
    writer.write_u16::<LittleEndian>(0)?;
    Ok(())
}

/// Builds the central-directory Zip64 extra field: one 8-byte word for
/// each of uncompressed size, compressed size, header offset that
/// overflows its 32-bit slot, in that fixed order, behind a 0x0001 tag.
/// Empty when everything fits.
fn central_zip64_extra_field(file: &ZipEntryData) -> Vec<u8> {
    let mut body = Vec::new();
    if file.uncompressed_size > spec::ZIP64_BYTES_THR {
        body.extend_from_slice(&file.uncompressed_size.to_le_bytes());
    }
    if file.compressed_size > spec::ZIP64_BYTES_THR {
        body.extend_from_slice(&file.compressed_size.to_le_bytes());
    }
    if file.header_start > spec::ZIP64_BYTES_THR {
        body.extend_from_slice(&file.header_start.to_le_bytes());
    }
    if body.is_empty() {
        return body;
    }
    let mut extra = Vec::with_capacity(4 + body.len());
    extra.extend_from_slice(&spec::ZIP64_EXTRA_FIELD_TAG.to_le_bytes());
    extra.extend_from_slice(&(body.len() as u16).to_le_bytes());
    extra.extend_from_slice(&body);
    extra
}

fn write_central_directory_header<W: Write>(writer: &mut W, file: &ZipEntryData) -> io::Result<()> {
    let extra_field = central_zip64_extra_field(file);

    // central file header signature
    writer.write_u32::<LittleEndian>(spec::CENTRAL_DIRECTORY_HEADER_SIGNATURE)?;
    // version made by
    writer.write_u16::<LittleEndian>(spec::DEFAULT_VERSION)?;
    // version needed to extract
    writer.write_u16::<LittleEndian>(spec::DEFAULT_VERSION)?;
    // general purpose bit flag
    writer.write_u16::<LittleEndian>(spec::GENERAL_PURPOSE_FLAG)?;
    // compression method
    writer.write_u16::<LittleEndian>(file.compression_method.to_u16())?;
    // last mod file time and last mod file date
    writer.write_u16::<LittleEndian>(file.last_modified_time.timepart())?;
    writer.write_u16::<LittleEndian>(file.last_modified_time.datepart())?;
    // crc-32
    writer.write_u32::<LittleEndian>(file.crc32)?;
    // compressed size
    writer.write_u32::<LittleEndian>(file.compressed_size.min(spec::ZIP64_BYTES_THR) as u32)?;
    // uncompressed size
    writer.write_u32::<LittleEndian>(file.uncompressed_size.min(spec::ZIP64_BYTES_THR) as u32)?;
    // file name length
    writer.write_u16::<LittleEndian>(file.file_name.len() as u16)?;
    // extra field length
    writer.write_u16::<LittleEndian>(extra_field.len() as u16)?;
    // file comment length
    writer.write_u16::<LittleEndian>(file.file_comment.len() as u16)?;
    // disk number start
    writer.write_u16::<LittleEndian>(0)?;
    // internal file attributes
    writer.write_u16::<LittleEndian>(0)?;
    // external file attributes
    writer.write_u32::<LittleEndian>(0)?;
    // relative offset of local header
    writer.write_u32::<LittleEndian>(file.header_start.min(spec::ZIP64_BYTES_THR) as u32)?;
    // file name
    writer.write_all(file.file_name.as_bytes())?;
    // zip64 extra field
    writer.write_all(&extra_field)?;
    // file comment
    writer.write_all(&file.file_comment)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::ZipEntryData;

    fn entry_data(uncompressed: u64, compressed: u64, offset: u64) -> ZipEntryData {
        ZipEntryData {
            file_name: String::from("member.bin"),
            file_comment: Vec::new(),
            compression_method: CompressionMethod::Stored,
            timestamp: 0,
            last_modified_time: DateTime::default(),
            crc32: 0xDEADBEEF,
            compressed_size: compressed,
            uncompressed_size: uncompressed,
            header_start: offset,
        }
    }

    #[test]
    fn local_header_layout() {
        let mut buf = Vec::new();
        write_local_file_header(
            &mut buf,
            "hello.txt",
            CompressionMethod::Deflated,
            DateTime::default(),
        )
        .unwrap();

        assert_eq!(buf.len(), 30 + 9 + 4);
        assert_eq!(&buf[0..4], b"PK\x03\x04");
        // version needed, flags, method
        assert_eq!(&buf[4..6], &45u16.to_le_bytes());
        assert_eq!(&buf[6..8], &0x0808u16.to_le_bytes());
        assert_eq!(&buf[8..10], &8u16.to_le_bytes());
        // crc and sizes all zero, deferred
        assert_eq!(&buf[14..26], &[0; 12]);
        assert_eq!(&buf[26..28], &9u16.to_le_bytes());
        assert_eq!(&buf[28..30], &4u16.to_le_bytes());
        assert_eq!(&buf[30..39], b"hello.txt");
        // placeholder zip64 extra
        assert_eq!(&buf[39..43], &[0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn central_header_small_sizes_have_no_extra() {
        let mut buf = Vec::new();
        write_central_directory_header(&mut buf, &entry_data(100, 50, 10)).unwrap();

        assert_eq!(buf.len(), 46 + 10);
        assert_eq!(&buf[0..4], b"PK\x01\x02");
        assert_eq!(&buf[16..20], &0xDEADBEEFu32.to_le_bytes());
        assert_eq!(&buf[20..24], &50u32.to_le_bytes());
        assert_eq!(&buf[24..28], &100u32.to_le_bytes());
        // extra field length zero
        assert_eq!(&buf[30..32], &0u16.to_le_bytes());
        assert_eq!(&buf[42..46], &10u32.to_le_bytes());
    }

    #[test]
    fn central_header_oversize_uncompressed_escapes_to_zip64() {
        let big = 0x1_0000_0000u64;
        let mut buf = Vec::new();
        write_central_directory_header(&mut buf, &entry_data(big, 200, 10)).unwrap();

        // uncompressed slot clamped, compressed and offset real
        assert_eq!(&buf[20..24], &200u32.to_le_bytes());
        assert_eq!(&buf[24..28], &u32::MAX.to_le_bytes());
        assert_eq!(&buf[30..32], &12u16.to_le_bytes());
        let extra = &buf[46 + 10..];
        assert_eq!(&extra[0..2], &1u16.to_le_bytes());
        assert_eq!(&extra[2..4], &8u16.to_le_bytes());
        assert_eq!(&extra[4..12], &big.to_le_bytes());
    }

    #[test]
    fn central_header_all_fields_oversize() {
        let mut buf = Vec::new();
        write_central_directory_header(
            &mut buf,
            &entry_data(0x2_0000_0000, 0x1_0000_0001, 0x1_0000_0002),
        )
        .unwrap();

        assert_eq!(&buf[20..24], &u32::MAX.to_le_bytes());
        assert_eq!(&buf[24..28], &u32::MAX.to_le_bytes());
        assert_eq!(&buf[42..46], &u32::MAX.to_le_bytes());
        let extra = &buf[46 + 10..];
        assert_eq!(extra.len(), 4 + 24);
        assert_eq!(&extra[2..4], &24u16.to_le_bytes());
        // fixed word order: uncompressed, compressed, offset
        assert_eq!(&extra[4..12], &0x2_0000_0000u64.to_le_bytes());
        assert_eq!(&extra[12..20], &0x1_0000_0001u64.to_le_bytes());
        assert_eq!(&extra[20..28], &0x1_0000_0002u64.to_le_bytes());
    }

    #[test]
    fn exactly_u32_max_stays_in_the_fixed_header() {
        let mut buf = Vec::new();
        write_central_directory_header(
            &mut buf,
            &entry_data(spec::ZIP64_BYTES_THR, 10, 0),
        )
        .unwrap();
        // boundary value is representable, so no extra field
        assert_eq!(&buf[30..32], &0u16.to_le_bytes());
        assert_eq!(&buf[24..28], &u32::MAX.to_le_bytes());
    }
}
