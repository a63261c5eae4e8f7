use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use std::io::{self, Cursor, Read};

use super::error::ArchiveError;
use super::header::{decode_mac_roman, read_pascal_bytes, ArchiveVersion};
use super::icontype::{IconType, ICON_TYPES, LEGACY_ICON_TYPES,
                      NUM_ICON_TYPES};
use super::rle::RunLength;

/// Version 1 offsets count from this many bytes (plus the name length)
/// before the start of the uncompressed data.
const LEGACY_OFFSET_BIAS: usize = 17;

/// Most bytes reserved before inflating a version 2 payload.  Every icon
/// type together takes less than this.
const MAX_RESERVED_LENGTH: usize = 1 << 16;

/// How a record describes which icon types it contains.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordLayout {
    /// Version 1: offsets of the six pre-System 8.5 icon types (in
    /// `LEGACY_ICON_TYPES` order).  Offsets below the name-dependent base,
    /// such as 0, mark a missing type.
    Legacy {
        /// The offsets as stored in the record.
        offsets: [u16; 6],
    },
    /// Version 2: one bit per icon type; the present types are stored back
    /// to back in registry order.
    Extended {
        /// The presence bitfield.
        presence: u16,
        /// The 16-bit field following the bitfield.
        reserved: u16,
    },
}

/// The header of one icon record within an Icon Archiver file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconRecord {
    /// Length of the whole record, including this header.
    pub record_size: u32,
    /// Four 16-bit fields of unknown meaning (a selection flag and values
    /// related to the record size, it seems).
    pub reserved: [u16; 4],
    /// The length of the data once decompressed.
    pub uncompressed_size: u32,
    /// The raw (Mac Roman) bytes of the icon's name.
    pub name: Vec<u8>,
    /// Which icon types are present, and where.
    pub layout: RecordLayout,
}

impl IconRecord {
    /// Parses the header of a record.  `record` must span the whole record,
    /// starting at its size field; the compressed payload following the
    /// header is returned alongside it.
    pub fn read(record: &[u8],
                version: ArchiveVersion)
                -> io::Result<(IconRecord, &[u8])> {
        let mut reader = Cursor::new(record);
        let record_size = reader.read_u32::<BigEndian>()?;
        let mut reserved = [0u16; 4];
        reader.read_u16_into::<BigEndian>(&mut reserved)?;
        let (uncompressed_size, layout, name) = match version {
            ArchiveVersion::V1 => {
                let uncompressed_size = reader.read_u16::<BigEndian>()?;
                let mut offsets = [0u16; 6];
                reader.read_u16_into::<BigEndian>(&mut offsets)?;
                let name = read_pascal_bytes(&mut reader)?;
                (u32::from(uncompressed_size),
                 RecordLayout::Legacy { offsets },
                 name)
            }
            ArchiveVersion::V2 => {
                let uncompressed_size = reader.read_u32::<BigEndian>()?;
                let presence = reader.read_u16::<BigEndian>()?;
                let reserved = reader.read_u16::<BigEndian>()?;
                let name = read_pascal_bytes(&mut reader)?;
                // The name is also NUL-terminated.
                reader.read_u8()?;
                (uncompressed_size,
                 RecordLayout::Extended { presence, reserved },
                 name)
            }
        };
        let payload_start = reader.position() as usize;
        let header = IconRecord {
            record_size,
            reserved,
            uncompressed_size,
            name,
            layout,
        };
        Ok((header, &record[payload_start..]))
    }

    /// Returns the icon's name, decoded from Mac Roman.
    pub fn name(&self) -> String {
        decode_mac_roman(&self.name)
    }

    /// Decompresses the record's payload and locates each icon type within
    /// it.
    pub fn decode(&self,
                  index: u32,
                  payload: &[u8])
                  -> Result<DecodedIconFamily, ArchiveError> {
        let expected = self.uncompressed_size as usize;
        let mut offsets = [None; NUM_ICON_TYPES];
        let data = match self.layout {
            RecordLayout::Legacy { offsets: ref stored } => {
                let (data, _) = RunLength::PackBits.decode(payload, expected)
                    .map_err(ArchiveError::corrupt)?;
                let base = self.name.len() + LEGACY_OFFSET_BIAS;
                for (&icon_type, &offset) in
                    LEGACY_ICON_TYPES.iter().zip(stored.iter()) {
                    offsets[icon_type as usize] =
                        (offset as usize).checked_sub(base);
                }
                data
            }
            RecordLayout::Extended { presence, .. } => {
                let data = inflate(payload, expected)?;
                let mut next_offset = 0;
                for &icon_type in ICON_TYPES.iter() {
                    if presence & icon_type.presence_mask() != 0 {
                        offsets[icon_type as usize] = Some(next_offset);
                        next_offset += icon_type.archive_data_length();
                    }
                }
                if next_offset == 0 {
                    return Err(ArchiveError::EmptyIcon);
                }
                data
            }
        };
        DecodedIconFamily::new(index, self.name(), data, offsets)
    }
}

fn inflate(payload: &[u8],
           expected: usize)
           -> Result<Vec<u8>, ArchiveError> {
    // The declared size comes straight from the file; only reserve what a
    // real icon family could need and let the buffer grow past that.
    let mut data = Vec::with_capacity(expected.min(MAX_RESERVED_LENGTH));
    ZlibDecoder::new(payload)
        .take(expected as u64 + 1)
        .read_to_end(&mut data)
        .map_err(ArchiveError::corrupt)?;
    if data.len() > expected {
        let msg = format!("zlib data exceeds the declared {} bytes", expected);
        return Err(ArchiveError::DecompressionFailed(msg));
    }
    if data.len() != expected {
        return Err(ArchiveError::SizeMismatch {
            expected,
            actual: data.len(),
        });
    }
    Ok(data)
}

/// The decompressed data of one icon record, with the location of each
/// icon type it contains.
#[derive(Clone, Debug)]
pub struct DecodedIconFamily {
    index: u32,
    name: String,
    data: Vec<u8>,
    offsets: [Option<usize>; NUM_ICON_TYPES],
}

impl DecodedIconFamily {
    /// Creates a decoded family from decompressed data and the offset of
    /// each present icon type (indexed by `IconType as usize`).  Returns an
    /// error if any present type's data would extend past the end of
    /// `data`.
    pub fn new(index: u32,
               name: String,
               data: Vec<u8>,
               offsets: [Option<usize>; NUM_ICON_TYPES])
               -> Result<DecodedIconFamily, ArchiveError> {
        for &icon_type in ICON_TYPES.iter() {
            if let Some(offset) = offsets[icon_type as usize] {
                let end = offset.checked_add(icon_type.archive_data_length());
                if end.map_or(true, |end| end > data.len()) {
                    let msg = format!("{} data at offset {} overruns the \
                                       {}-byte icon data",
                                      icon_type,
                                      offset,
                                      data.len());
                    return Err(ArchiveError::DecompressionFailed(msg));
                }
            }
        }
        Ok(DecodedIconFamily {
            index,
            name,
            data,
            offsets,
        })
    }

    /// Returns the position of the record within its archive.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the icon's name (possibly empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the whole decompressed data of the record.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the offset of the given icon type within the decompressed
    /// data, or `None` if the record doesn't contain it.
    pub fn offset(&self, icon_type: IconType) -> Option<usize> {
        self.offsets[icon_type as usize]
    }

    /// Determines whether the record contains the given icon type.
    pub fn has_icon(&self, icon_type: IconType) -> bool {
        self.offset(icon_type).is_some()
    }

    /// Returns the archive representation of the given icon type's data.
    pub fn icon_data(&self, icon_type: IconType) -> Option<&[u8]> {
        self.offset(icon_type).map(|offset| {
            &self.data[offset..offset + icon_type.archive_data_length()]
        })
    }

    /// Returns all icon types present in the record, in registry order.
    pub fn icon_types(&self) -> Vec<IconType> {
        ICON_TYPES.iter().cloned().filter(|&t| self.has_icon(t)).collect()
    }
}
