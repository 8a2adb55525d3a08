//! Wire constants and the trailing structures of a ZIP archive.
//!
//! See the PKWARE application note, APPNOTE.TXT 6.3.x. Every integer is
//! little-endian. The writer emits the Zip64 end-of-central-directory
//! record and locator unconditionally, so readers never depend on the
//! 16/32-bit fields of the legacy end record.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034b50;
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x08074b50;
pub const CENTRAL_DIRECTORY_HEADER_SIGNATURE: u32 = 0x02014b50;
pub const ZIP64_CENTRAL_DIRECTORY_END_SIGNATURE: u32 = 0x06064b50;
pub const ZIP64_CENTRAL_DIRECTORY_END_LOCATOR_SIGNATURE: u32 = 0x07064b50;
pub const CENTRAL_DIRECTORY_END_SIGNATURE: u32 = 0x06054b50;

/// Version 4.5, the first with Zip64 support. Written as both the
/// version-made-by and version-needed-to-extract of every record.
pub const DEFAULT_VERSION: u16 = 45;

/// Bit 3: crc and sizes live in the data descriptor. Bit 11: the file name
/// is UTF-8.
pub const GENERAL_PURPOSE_FLAG: u16 = (1 << 3) | (1 << 11);

/// Header ID of the Zip64 extended information extra field.
pub const ZIP64_EXTRA_FIELD_TAG: u16 = 0x0001;

/// Largest value a 32-bit size or offset field can hold; anything larger
/// escapes to the Zip64 extra field.
pub const ZIP64_BYTES_THR: u64 = 0xFFFF_FFFF;

/// Largest entry count the legacy end record can hold.
pub const ZIP64_ENTRY_THR: u64 = 0xFFFF;

/// Zip64 data descriptor, emitted right after every member's payload.
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

impl DataDescriptor {
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(DATA_DESCRIPTOR_SIGNATURE)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u64::<LittleEndian>(self.compressed_size)?;
        writer.write_u64::<LittleEndian>(self.uncompressed_size)?;
        Ok(())
    }
}

/// Zip64 end of central directory record, fixed 56 bytes as written here
/// (no extensible data sector).
pub struct Zip64CentralDirectoryEnd {
    pub disk_number: u32,
    pub disk_with_central_directory: u32,
    pub number_of_files_on_this_disk: u64,
    pub number_of_files: u64,
    pub central_directory_size: u64,
    pub central_directory_offset: u64,
}

impl Zip64CentralDirectoryEnd {
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(ZIP64_CENTRAL_DIRECTORY_END_SIGNATURE)?;
        // size of the remaining record, excluding these first 12 bytes
        writer.write_u64::<LittleEndian>(44)?;
        writer.write_u16::<LittleEndian>(DEFAULT_VERSION)?;
        writer.write_u16::<LittleEndian>(DEFAULT_VERSION)?;
        writer.write_u32::<LittleEndian>(self.disk_number)?;
        writer.write_u32::<LittleEndian>(self.disk_with_central_directory)?;
        writer.write_u64::<LittleEndian>(self.number_of_files_on_this_disk)?;
        writer.write_u64::<LittleEndian>(self.number_of_files)?;
        writer.write_u64::<LittleEndian>(self.central_directory_size)?;
        writer.write_u64::<LittleEndian>(self.central_directory_offset)?;
        Ok(())
    }
}

/// Zip64 end of central directory locator, 20 bytes.
pub struct Zip64CentralDirectoryEndLocator {
    pub disk_with_central_directory: u32,
    pub end_of_central_directory_offset: u64,
    pub number_of_disks: u32,
}

impl Zip64CentralDirectoryEndLocator {
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(ZIP64_CENTRAL_DIRECTORY_END_LOCATOR_SIGNATURE)?;
        writer.write_u32::<LittleEndian>(self.disk_with_central_directory)?;
        writer.write_u64::<LittleEndian>(self.end_of_central_directory_offset)?;
        writer.write_u32::<LittleEndian>(self.number_of_disks)?;
        Ok(())
    }
}

/// Legacy end of central directory record, 22 bytes plus the archive
/// comment. Counts and sizes are stored pre-clamped by the engine.
pub struct CentralDirectoryEnd {
    pub disk_number: u16,
    pub disk_with_central_directory: u16,
    pub number_of_files_on_this_disk: u16,
    pub number_of_files: u16,
    pub central_directory_size: u32,
    pub central_directory_offset: u32,
    pub zip_file_comment: Vec<u8>,
}

impl CentralDirectoryEnd {
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(CENTRAL_DIRECTORY_END_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(self.disk_number)?;
        writer.write_u16::<LittleEndian>(self.disk_with_central_directory)?;
        writer.write_u16::<LittleEndian>(self.number_of_files_on_this_disk)?;
        writer.write_u16::<LittleEndian>(self.number_of_files)?;
        writer.write_u32::<LittleEndian>(self.central_directory_size)?;
        writer.write_u32::<LittleEndian>(self.central_directory_offset)?;
        writer.write_u16::<LittleEndian>(self.zip_file_comment.len() as u16)?;
        writer.write_all(&self.zip_file_comment)?;
        Ok(())
    }
}
