//! Validation of member paths before they reach a header.

use crate::result::{ZipError, ZipResult};

/// Checks that `path` is acceptable as an archive member name.
///
/// Accepted paths are written into the local and central headers
/// byte-for-byte unchanged; there is no normalization or case folding.
/// Rejections cover the shapes that break extractors or escape their
/// target directory: empty names, names that no 16-bit length field can
/// hold, absolute paths, doubled or trailing separators, backslashes, and
/// `..` traversal.
pub fn validate_archive_path(path: &str) -> ZipResult<()> {
    let reject = |reason| {
        Err(ZipError::Path {
            path: path.to_string(),
            reason,
        })
    };

    if path.is_empty() {
        return reject("path is empty");
    }
    if path.len() >= u16::MAX as usize {
        return reject("path does not fit a 16-bit length field");
    }
    if path.starts_with('/') {
        return reject("leading '/'");
    }
    if path.contains("//") {
        return reject("doubled '/'");
    }
    if path.as_bytes().contains(&b'\\') {
        return reject("'\\' is not a ZIP path separator");
    }
    if path.starts_with("..") || path.contains("/../") || path.ends_with("/..") {
        return reject("'..' component");
    }
    if path.ends_with('/') {
        return reject("trailing '/'");
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::validate_archive_path;

    #[test]
    fn accepts_ordinary_paths() {
        for path in [
            "hello.txt",
            "foo/bar",
            "foo/bar/baz.tar.gz",
            "dotted..name",
            "foo/..bar",
            ".hidden",
            "test/☃.txt",
        ] {
            assert!(validate_archive_path(path).is_ok(), "rejected {:?}", path);
        }
    }

    #[test]
    fn rejects_the_rejection_set() {
        for path in [
            "",
            "/absolute",
            "foo//bar",
            "back\\slash",
            "../escape",
            "..",
            "foo/../bar",
            "foo/..",
            "trailing/",
            "foo/bar/",
        ] {
            assert!(validate_archive_path(path).is_err(), "accepted {:?}", path);
        }
    }

    #[test]
    fn rejects_paths_beyond_the_length_field() {
        let long = "x".repeat(u16::MAX as usize);
        assert!(validate_archive_path(&long).is_err());
        let fits = "x".repeat(u16::MAX as usize - 1);
        assert!(validate_archive_path(&fits).is_ok());
    }
}
