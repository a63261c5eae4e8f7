use byteorder::{BigEndian, ByteOrder};
use log::debug;
use std::io::Cursor;

use super::error::ArchiveError;
use super::header::{ArchiveHeader, ArchiveVersion};
use super::record::{DecodedIconFamily, IconRecord};

const RECORD_SIZE_FIELD_LENGTH: usize = 4;

/// An Icon Archiver file held in memory.
pub struct IconArchive<'a> {
    data: &'a [u8],
    header: ArchiveHeader,
}

impl<'a> IconArchive<'a> {
    /// Parses the header of an Icon Archiver file.  Fails with
    /// `UnsupportedFormat` or `UnsupportedVersion` if the file can't be
    /// read at all.
    pub fn parse(data: &'a [u8]) -> Result<IconArchive<'a>, ArchiveError> {
        let header = ArchiveHeader::read(Cursor::new(data))?;
        Ok(IconArchive { data, header })
    }

    /// Returns the archive's header.
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Returns an iterator decoding each icon record in turn.
    pub fn records(&self) -> Records<'a> {
        // An offset that doesn't fit in memory is past the end of the data
        // anyway.
        let position = usize::try_from(self.header.records_offset())
            .unwrap_or(usize::MAX);
        Records {
            data: self.data,
            version: self.header.version,
            position,
            index: 0,
            count: self.header.icon_count,
        }
    }
}

/// Iterator over the icon records of an archive, yielding each record's
/// index along with either its decoded family or the reason it was
/// skipped.
///
/// A record that fails to decode does not affect the following ones: the
/// iterator always moves on to the end of the record as given by its size
/// field.  Only when that field is missing, or too small to move past
/// itself, does iteration stop early.
pub struct Records<'a> {
    data: &'a [u8],
    version: ArchiveVersion,
    position: usize,
    index: u32,
    count: u32,
}

impl<'a> Records<'a> {
    #[cfg(test)]
    fn position(&self) -> usize {
        self.position
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = (u32, Result<DecodedIconFamily, ArchiveError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let index = self.index;
        self.index += 1;
        let start = self.position;
        let size_field = start.checked_add(RECORD_SIZE_FIELD_LENGTH)
            .and_then(|end| self.data.get(start..end));
        let record_size = match size_field {
            Some(bytes) => BigEndian::read_u32(bytes) as usize,
            None => {
                self.index = self.count;
                let msg = format!("record {} starts past the end of the \
                                   archive",
                                  index);
                let error = ArchiveError::DecompressionFailed(msg);
                return Some((index, Err(error)));
            }
        };
        if record_size < RECORD_SIZE_FIELD_LENGTH {
            // The next record would start inside this one's size field.
            self.index = self.count;
            let msg = format!("record {} has an impossible size of {} bytes",
                              index,
                              record_size);
            let error = ArchiveError::DecompressionFailed(msg);
            return Some((index, Err(error)));
        }
        self.position = start.saturating_add(record_size);
        debug!("icon {}: {} byte record at 0x{:x}", index, record_size, start);
        let result = self.data
            .get(start..self.position)
            .ok_or_else(|| {
                let msg = format!("{}-byte record extends past the end of \
                                   the archive",
                                  record_size);
                ArchiveError::DecompressionFailed(msg)
            })
            .and_then(|record| decode_record(record, self.version, index));
        Some((index, result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some((self.count - self.index) as usize))
    }
}

fn decode_record(record: &[u8],
                 version: ArchiveVersion,
                 index: u32)
                 -> Result<DecodedIconFamily, ArchiveError> {
    let (header, payload) = IconRecord::read(record, version)
        .map_err(ArchiveError::corrupt)?;
    header.decode(index, payload)
}
