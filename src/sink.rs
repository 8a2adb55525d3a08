//! Byte sinks the archive engine writes through.
//!
//! A [`Sink`] is a forward-only destination with a tiny lifecycle: advisory
//! metadata, one `open`, any number of all-or-nothing writes, one `close`.
//! The engine owns exactly one sink, never seeks it, and never retries.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Destination for archive bytes.
pub trait Sink {
    /// Advisory metadata ("name", "type"); a sink may use or ignore it.
    /// Only calls before `open` can influence a sink's behavior.
    fn set(&mut self, key: &str, value: &str);

    /// Prepares the sink to accept bytes. Called exactly once.
    fn open(&mut self) -> io::Result<()>;

    /// Appends `buf` in its entirety. Partial progress is the sink's
    /// problem: either every byte is accepted or an error comes back.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flushes and releases. Idempotent once closed; an error when the
    /// sink was never opened.
    fn close(&mut self) -> io::Result<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SinkState {
    Created,
    Open,
    Closed,
}

fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "sink is not open")
}

/// Sink that writes the archive to a filesystem path.
///
/// The path is given at construction; a `set("name", …)` before `open`
/// re-targets it. `open` creates or truncates the file.
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
    state: SinkState,
}

impl FileSink {
    /// Creates a sink that will write to `path` once opened.
    pub fn new<P: Into<PathBuf>>(path: P) -> FileSink {
        FileSink {
            path: path.into(),
            file: None,
            state: SinkState::Created,
        }
    }
}

impl Sink for FileSink {
    fn set(&mut self, key: &str, value: &str) {
        if key == "name" && self.state == SinkState::Created {
            self.path = PathBuf::from(value);
        }
    }

    fn open(&mut self) -> io::Result<()> {
        if self.state != SinkState::Created {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "sink already opened",
            ));
        }
        self.file = Some(File::create(&self.path)?);
        self.state = SinkState::Open;
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(buf),
            None => Err(not_open()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.state {
            SinkState::Open => {
                if let Some(mut file) = self.file.take() {
                    file.flush()?;
                }
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Closed => Ok(()),
            SinkState::Created => Err(not_open()),
        }
    }
}

/// Sink that wraps a caller-provided writable stream.
///
/// Metadata is ignored and `close` only flushes; the inner stream stays
/// open and is returned untouched by [`StreamSink::into_inner`].
pub struct StreamSink<W: Write> {
    inner: W,
    state: SinkState,
}

impl<W: Write> StreamSink<W> {
    /// Wraps `inner` as an archive destination.
    pub fn new(inner: W) -> StreamSink<W> {
        StreamSink {
            inner,
            state: SinkState::Created,
        }
    }

    /// Unwraps this sink, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn set(&mut self, _key: &str, _value: &str) {}

    fn open(&mut self) -> io::Result<()> {
        if self.state != SinkState::Created {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "sink already opened",
            ));
        }
        self.state = SinkState::Open;
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.state != SinkState::Open {
            return Err(not_open());
        }
        self.inner.write_all(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.state {
            SinkState::Open => {
                self.inner.flush()?;
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Closed => Ok(()),
            SinkState::Created => Err(not_open()),
        }
    }
}

/// In-memory sink backed by a shared growable buffer.
///
/// The writer consumes the sink, so callers keep a [`BufferSink::handle`]
/// to read the finished archive back out.
pub struct BufferSink {
    buf: Arc<Mutex<Vec<u8>>>,
    state: SinkState,
}

impl BufferSink {
    /// Creates an empty in-memory sink.
    pub fn new() -> BufferSink {
        BufferSink {
            buf: Arc::new(Mutex::new(Vec::new())),
            state: SinkState::Created,
        }
    }

    /// A shared handle onto the buffer this sink appends to.
    pub fn handle(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.buf)
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        BufferSink::new()
    }
}

impl Sink for BufferSink {
    fn set(&mut self, _key: &str, _value: &str) {}

    fn open(&mut self) -> io::Result<()> {
        if self.state != SinkState::Created {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "sink already opened",
            ));
        }
        self.state = SinkState::Open;
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.state != SinkState::Open {
            return Err(not_open());
        }
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "buffer lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        match self.state {
            SinkState::Open => {
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Closed => Ok(()),
            SinkState::Created => Err(not_open()),
        }
    }
}

/// Sink that streams the archive as a CGI-style HTTP response.
///
/// `open` emits the response headers: content type, an RFC 6266
/// `Content-Disposition` carrying both an ASCII-sanitized `filename` and an
/// RFC 5987 `filename*` form, and the usual cache/transfer headers. The
/// body follows. By default the response goes to standard output.
pub struct ResponseSink {
    out: Box<dyn Write + Send>,
    filename: String,
    content_type: String,
    state: SinkState,
}

impl ResponseSink {
    /// A response sink writing to the process's standard output.
    pub fn stdout() -> ResponseSink {
        ResponseSink::to_writer(io::stdout())
    }

    /// A response sink writing headers and body to `out`.
    pub fn to_writer<W: Write + Send + 'static>(out: W) -> ResponseSink {
        ResponseSink {
            out: Box::new(out),
            filename: String::from("archive.zip"),
            content_type: String::from("application/zip"),
            state: SinkState::Created,
        }
    }

    fn header_block(&self) -> Vec<u8> {
        let mut block = Vec::new();
        let _ = write!(
            block,
            "Pragma: public\r\n\
             Cache-Control: public, must-revalidate\r\n\
             Content-Type: {}\r\n\
             Content-Transfer-Encoding: binary\r\n\
             Content-Disposition: attachment; filename=\"{}\"; filename*=UTF-8''{}\r\n\
             \r\n",
            self.content_type,
            ascii_filename(&self.filename),
            rfc5987_encode(&self.filename),
        );
        block
    }
}

impl Sink for ResponseSink {
    fn set(&mut self, key: &str, value: &str) {
        if self.state != SinkState::Created {
            return;
        }
        match key {
            "name" => self.filename = value.to_string(),
            "type" => self.content_type = value.to_string(),
            _ => {}
        }
    }

    fn open(&mut self) -> io::Result<()> {
        if self.state != SinkState::Created {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "sink already opened",
            ));
        }
        let block = self.header_block();
        self.out.write_all(&block)?;
        self.state = SinkState::Open;
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.state != SinkState::Open {
            return Err(not_open());
        }
        self.out.write_all(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.state {
            SinkState::Open => {
                self.out.flush()?;
                self.state = SinkState::Closed;
                Ok(())
            }
            SinkState::Closed => Ok(()),
            SinkState::Created => Err(not_open()),
        }
    }
}

/// Strips a filename down to the characters the plain `filename=` form of
/// `Content-Disposition` can carry in a quoted string.
fn ascii_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect()
}

/// Percent-encodes a filename for the RFC 5987 `filename*` form. Everything
/// outside attr-char is escaped, UTF-8 byte by byte.
fn rfc5987_encode(name: &str) -> String {
    const ATTR_CHAR: &[u8] = b"!#$&+-.^_`|~";
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || ATTR_CHAR.contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stream_sink_lifecycle() {
        let mut sink = StreamSink::new(Vec::new());
        assert!(sink.write_all(b"early").is_err());
        assert!(sink.close().is_err());

        sink.open().unwrap();
        sink.write_all(b"abc").unwrap();
        assert!(sink.open().is_err());
        sink.close().unwrap();
        sink.close().unwrap();
        assert_eq!(sink.into_inner(), b"abc");
    }

    #[test]
    fn buffer_sink_shares_contents() {
        let mut sink = BufferSink::new();
        let handle = sink.handle();
        sink.open().unwrap();
        sink.write_all(b"zip bytes").unwrap();
        sink.close().unwrap();
        assert_eq!(&*handle.lock().unwrap(), b"zip bytes");
    }

    #[test]
    fn response_sink_emits_headers_then_body() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut sink = ResponseSink::to_writer(SharedWriter(Arc::clone(&buffer)));
        sink.set("name", "report 2024.zip");
        sink.set("type", "application/zip");
        sink.open().unwrap();
        sink.write_all(b"PK").unwrap();
        sink.close().unwrap();

        let bytes = buffer.lock().unwrap().clone();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("Pragma: public\r\n"));
        assert!(text.contains("Content-Type: application/zip\r\n"));
        assert!(text.contains("filename=\"report 2024.zip\""));
        assert!(text.contains("filename*=UTF-8''report%202024.zip"));
        assert!(text.ends_with("\r\n\r\nPK"));
    }

    #[test]
    fn filename_forms() {
        assert_eq!(ascii_filename("naïve \"x\".zip"), "na_ve _x_.zip");
        assert_eq!(rfc5987_encode("a b.zip"), "a%20b.zip");
        assert_eq!(rfc5987_encode("naïve.zip"), "na%C3%AFve.zip");
    }

    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
