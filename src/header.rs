use byteorder::{BigEndian, ReadBytesExt};
use encoding_rs::MACINTOSH;
use std::io::{self, ErrorKind, Read};

use super::error::ArchiveError;

/// The first eight bytes of every Icon Archiver file:
pub const ARCHIVE_MAGIC_LITERAL: &[u8; 8] = b"QBSEPACK";

/// The secondary magic that follows the common header in version 2 files:
pub const EXTENDED_MAGIC_LITERAL: &[u8; 4] = b"IAUB";

/// Where the icon records of a version 1 file start, before the table of
/// per-icon placeholders.
const V1_RECORDS_BASE: u64 = 0x40;

/// Same, for version 2 files.
const V2_RECORDS_BASE: u64 = 0x440;

const COPYRIGHT_FIELD_LENGTH: usize = 63;
const COMMENT_FIELD_LENGTH: usize = 255;

/// The layout generation of an Icon Archiver file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ArchiveVersion {
    /// Written by Icon Archiver 2: PackBits-compressed records with a
    /// fixed table of six icon offsets.
    V1,
    /// Written by Icon Archiver 4: zlib-compressed records with a bitfield
    /// of present icon types.
    V2,
}

impl ArchiveVersion {
    /// Maps the version field of the file header to a known version.
    pub fn from_number(number: u16) -> Option<ArchiveVersion> {
        match number {
            1 => Some(ArchiveVersion::V1),
            2 => Some(ArchiveVersion::V2),
            _ => None,
        }
    }

    /// Returns the value of the version field for this version.
    pub fn number(self) -> u16 {
        match self {
            ArchiveVersion::V1 => 1,
            ArchiveVersion::V2 => 2,
        }
    }
}

/// The header of an Icon Archiver file.  Fields of unknown meaning are
/// kept as read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArchiveHeader {
    /// The file format version.
    pub version: ArchiveVersion,
    /// The number of icon records in the file.
    pub icon_count: u32,
    /// Two bytes between the magic and the version.
    pub reserved: [u8; 2],
    /// 32 bytes following the icon count.
    pub reserved_block: [u8; 32],
    /// Seems to be a timestamp.
    pub timestamp: u64,
    /// 8 bytes following the timestamp.
    pub reserved_tail: [u8; 8],
    /// Fields only present in version 2 files.
    pub extended: Option<ExtendedHeader>,
}

/// The part of the header that only version 2 files have.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtendedHeader {
    /// 57 bytes following the secondary magic.
    pub reserved: Vec<u8>,
    /// Whether the copyright and comment can no longer be edited in Icon
    /// Archiver.
    pub locked: bool,
    /// 2 bytes following the lock flag.
    pub reserved_flags: [u8; 2],
    /// The archive's copyright notice.
    pub copyright: String,
    /// The archive's comment.
    pub comment: String,
}

impl ArchiveHeader {
    /// Reads and validates the header at the start of an Icon Archiver
    /// file.  Leaves the reader just past the header fields; use
    /// [`records_offset`](#method.records_offset) to find the first icon
    /// record.
    pub fn read<R: Read>(mut reader: R)
                         -> Result<ArchiveHeader, ArchiveError> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic).map_err(truncated)?;
        if magic != *ARCHIVE_MAGIC_LITERAL {
            return Err(ArchiveError::UnsupportedFormat("wrong magic literal"));
        }
        let mut reserved = [0u8; 2];
        reader.read_exact(&mut reserved).map_err(truncated)?;
        let number = reader.read_u16::<BigEndian>().map_err(truncated)?;
        let version = ArchiveVersion::from_number(number)
            .ok_or(ArchiveError::UnsupportedVersion(number))?;
        let icon_count = reader.read_u32::<BigEndian>().map_err(truncated)?;
        let mut reserved_block = [0u8; 32];
        reader.read_exact(&mut reserved_block).map_err(truncated)?;
        let timestamp = reader.read_u64::<BigEndian>().map_err(truncated)?;
        let mut reserved_tail = [0u8; 8];
        reader.read_exact(&mut reserved_tail).map_err(truncated)?;
        let extended = match version {
            ArchiveVersion::V1 => None,
            ArchiveVersion::V2 => Some(ExtendedHeader::read(reader)?),
        };
        Ok(ArchiveHeader {
            version,
            icon_count,
            reserved,
            reserved_block,
            timestamp,
            reserved_tail,
            extended,
        })
    }

    /// Returns the file offset of the first icon record.  The records are
    /// preceded by one (always zero) 32-bit placeholder per icon.
    pub fn records_offset(&self) -> u64 {
        let base = match self.version {
            ArchiveVersion::V1 => V1_RECORDS_BASE,
            ArchiveVersion::V2 => V2_RECORDS_BASE,
        };
        base + 4 * u64::from(self.icon_count)
    }
}

impl ExtendedHeader {
    fn read<R: Read>(mut reader: R) -> Result<ExtendedHeader, ArchiveError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(truncated)?;
        if magic != *EXTENDED_MAGIC_LITERAL {
            return Err(ArchiveError::UnsupportedFormat("wrong version 2 \
                                                        magic literal"));
        }
        let mut reserved = vec![0u8; 57];
        reader.read_exact(&mut reserved).map_err(truncated)?;
        let locked = reader.read_u8().map_err(truncated)? != 0;
        let mut reserved_flags = [0u8; 2];
        reader.read_exact(&mut reserved_flags).map_err(truncated)?;
        let copyright = read_padded_pascal_string(reader.by_ref(),
                                                  COPYRIGHT_FIELD_LENGTH)
            .map_err(truncated)?;
        let comment = read_padded_pascal_string(reader.by_ref(),
                                                COMMENT_FIELD_LENGTH)
            .map_err(truncated)?;
        Ok(ExtendedHeader {
            reserved,
            locked,
            reserved_flags,
            copyright,
            comment,
        })
    }
}

/// Reads a Pascal string stored in a fixed-width field of `field_length`
/// bytes after the length byte.
fn read_padded_pascal_string<R: Read>(mut reader: R,
                                      field_length: usize)
                                      -> io::Result<String> {
    let length = reader.read_u8()? as usize;
    let mut field = vec![0u8; field_length];
    reader.read_exact(&mut field)?;
    Ok(decode_mac_roman(&field[..length.min(field_length)]))
}

/// Reads a length-prefixed Pascal string, returning the raw bytes.
pub(crate) fn read_pascal_bytes<R: Read>(mut reader: R)
                                         -> io::Result<Vec<u8>> {
    let length = reader.read_u8()? as usize;
    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Decodes classic Mac OS text.
pub(crate) fn decode_mac_roman(bytes: &[u8]) -> String {
    let (text, _, _) = MACINTOSH.decode(bytes);
    text.into_owned()
}

fn truncated(error: io::Error) -> ArchiveError {
    if error.kind() == ErrorKind::UnexpectedEof {
        ArchiveError::UnsupportedFormat("file is too short for its header")
    } else {
        ArchiveError::Io(error)
    }
}
