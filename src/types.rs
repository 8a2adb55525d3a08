//! Types that specify what is contained in a ZIP.

use time::OffsetDateTime;

use crate::compression::CompressionMethod;

/// 2107-12-31 23:59:58 UTC, the last instant MS-DOS date/time can express.
const DOS_MAX_TIMESTAMP: i64 = 4_354_819_198;

/// A date and time stored in MS-DOS representation, as ZIP headers carry it.
///
/// The two-word encoding has a 2 second resolution and spans 1980-01-01
/// through 2107-12-31. Conversion from a Unix timestamp is done in UTC so
/// that identical inputs produce identical archives on every host.
/// Timestamps before the DOS epoch collapse to it; timestamps past the DOS
/// range clamp to its final representable second.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl Default for DateTime {
    /// Constructs an 'default' datetime of 1980-01-01 00:00:00
    fn default() -> DateTime {
        DateTime {
            year: 1980,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl DateTime {
    /// Converts a Unix timestamp (seconds, UTC) to a DOS date and time.
    pub fn from_timestamp(secs: i64) -> DateTime {
        let secs = secs.min(DOS_MAX_TIMESTAMP);
        match OffsetDateTime::from_unix_timestamp(secs) {
            Ok(dt) if dt.year() >= 1980 => DateTime {
                year: dt.year() as u16,
                month: u8::from(dt.month()),
                day: dt.day(),
                hour: dt.hour(),
                minute: dt.minute(),
                second: dt.second(),
            },
            _ => DateTime::default(),
        }
    }

    /// Gets the time portion in MS-DOS format
    pub fn timepart(&self) -> u16 {
        ((self.second as u16 / 2) & 0x1F)
            | ((self.minute as u16 & 0x3F) << 5)
            | ((self.hour as u16 & 0x1F) << 11)
    }

    /// Gets the date portion in MS-DOS format
    pub fn datepart(&self) -> u16 {
        (self.day as u16 & 0x1F)
            | ((self.month as u16 & 0x0F) << 5)
            | (((self.year - 1980) & 0x7F) << 9)
    }
}

/// Structure representing a finalized ZIP member.
///
/// Sizes, CRC, and offset are written once when the entry's data descriptor
/// goes out and are never touched again; `close()` replays these records
/// into the central directory.
#[derive(Debug, Clone)]
pub struct ZipEntryData {
    /// Name of the file inside the archive
    pub file_name: String,
    /// Entry comment, raw bytes
    pub file_comment: Vec<u8>,
    /// Compression method used to store the file
    pub compression_method: CompressionMethod,
    /// Unix timestamp the DOS date/time words were derived from
    pub timestamp: i64,
    /// Last modified time in DOS representation
    pub last_modified_time: DateTime,
    /// CRC32 checksum of the uncompressed bytes
    pub crc32: u32,
    /// Size of the file in the ZIP
    pub compressed_size: u64,
    /// Size of the file when extracted
    pub uncompressed_size: u64,
    /// Offset of the local header from the start of the archive
    pub header_start: u64,
}

#[cfg(test)]
mod test {
    use super::DateTime;

    #[test]
    fn datetime_default() {
        let dt = DateTime::default();
        assert_eq!(dt.datepart(), 0x0021);
        assert_eq!(dt.timepart(), 0);
    }

    #[test]
    fn datetime_from_timestamp() {
        // 2023-06-15 12:34:56 UTC
        let dt = DateTime::from_timestamp(1_686_832_496);
        assert_eq!(dt.datepart(), (43 << 9) | (6 << 5) | 15);
        assert_eq!(dt.timepart(), (12 << 11) | (34 << 5) | 28);
    }

    #[test]
    fn datetime_before_dos_epoch_collapses() {
        assert_eq!(DateTime::from_timestamp(0), DateTime::default());
        assert_eq!(DateTime::from_timestamp(-1), DateTime::default());
        // 1979-12-31 23:59:59 UTC
        assert_eq!(DateTime::from_timestamp(315_532_799), DateTime::default());
    }

    #[test]
    fn datetime_past_dos_range_clamps() {
        // Year 2128, far past what seven year bits hold
        let dt = DateTime::from_timestamp(5_000_000_000);
        assert_eq!(dt.datepart(), (127 << 9) | (12 << 5) | 31);
        assert_eq!(dt.timepart(), (23 << 11) | (59 << 5) | 29);
    }

    #[test]
    fn odd_seconds_round_down() {
        // 2023-06-15 12:34:57 UTC
        let dt = DateTime::from_timestamp(1_686_832_497);
        assert_eq!(dt.timepart() & 0x1F, 28);
    }
}
