#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use icon_dearchiver::{IconType, RunLength};
use std::io::Write;

/// Builds Icon Archiver files in memory.
pub struct ArchiveBuilder {
    version: u16,
    copyright: Vec<u8>,
    comment: Vec<u8>,
    records: Vec<Vec<u8>>,
}

impl ArchiveBuilder {
    pub fn new(version: u16) -> ArchiveBuilder {
        ArchiveBuilder {
            version,
            copyright: Vec::new(),
            comment: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn copyright(mut self, text: &[u8]) -> ArchiveBuilder {
        self.copyright = text.to_vec();
        self
    }

    pub fn comment(mut self, text: &[u8]) -> ArchiveBuilder {
        self.comment = text.to_vec();
        self
    }

    pub fn record(mut self, record: Vec<u8>) -> ArchiveBuilder {
        self.records.push(record);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = b"QBSEPACK".to_vec();
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&self.version.to_be_bytes());
        data.extend_from_slice(&(self.records.len() as u32).to_be_bytes());
        data.extend_from_slice(&[0u8; 48]);
        let base = if self.version == 2 {
            data.extend_from_slice(b"IAUB");
            data.extend_from_slice(&[0u8; 57]);
            data.push(0);
            data.extend_from_slice(&[0, 0]);
            push_padded_pascal(&mut data, &self.copyright, 63);
            push_padded_pascal(&mut data, &self.comment, 255);
            0x440
        } else {
            0x40
        };
        data.resize(base + 4 * self.records.len(), 0);
        for record in &self.records {
            data.extend_from_slice(record);
        }
        data
    }
}

fn push_padded_pascal(data: &mut Vec<u8>, text: &[u8], field_length: usize) {
    data.push(text.len() as u8);
    let start = data.len();
    data.extend_from_slice(text);
    data.resize(start + field_length, 0);
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Returns the data a version 2 record would hold for the given types:
/// each type's bytes filled with a distinct pattern, in registry order.
pub fn icon_data(types: &[IconType]) -> Vec<u8> {
    let mut data = Vec::new();
    for icon_type in icon_dearchiver::ICON_TYPES.iter() {
        if types.contains(icon_type) {
            let seed = icon_type.descriptor().presence_bit as usize;
            for index in 0..icon_type.archive_data_length() {
                data.push(((index / 5 + seed) % 251) as u8);
            }
        }
    }
    data
}

pub fn presence(types: &[IconType]) -> u16 {
    types.iter().fold(0, |bits, icon_type| bits | icon_type.presence_mask())
}

/// A version 2 record carrying `payload` as its compressed data.
pub fn version_2_record(presence: u16,
                        declared_size: u32,
                        name: &[u8],
                        payload: &[u8])
                        -> Vec<u8> {
    let size = 20 + 1 + name.len() + 1 + payload.len();
    let mut record = (size as u32).to_be_bytes().to_vec();
    record.extend_from_slice(&[0u8; 8]);
    record.extend_from_slice(&declared_size.to_be_bytes());
    record.extend_from_slice(&presence.to_be_bytes());
    record.extend_from_slice(&[0, 0]);
    record.push(name.len() as u8);
    record.extend_from_slice(name);
    record.push(0);
    record.extend_from_slice(payload);
    record
}

/// A well-formed version 2 record containing the given types.
pub fn valid_version_2_record(types: &[IconType], name: &[u8]) -> Vec<u8> {
    let data = icon_data(types);
    version_2_record(presence(types), data.len() as u32, name, &zlib(&data))
}

/// A version 1 record whose six legacy offsets point into `data`.
/// `relative_offsets` are relative to the decompressed data; `None` marks a
/// missing type.
pub fn version_1_record(relative_offsets: [Option<u16>; 6],
                        name: &[u8],
                        data: &[u8])
                        -> Vec<u8> {
    let payload = RunLength::PackBits.encode(data);
    let size = 26 + 1 + name.len() + payload.len();
    let base = name.len() as u16 + 17;
    let mut record = (size as u32).to_be_bytes().to_vec();
    record.extend_from_slice(&[0u8; 8]);
    record.extend_from_slice(&(data.len() as u16).to_be_bytes());
    for offset in &relative_offsets {
        let stored = offset.map_or(0, |offset| offset + base);
        record.extend_from_slice(&stored.to_be_bytes());
    }
    record.push(name.len() as u8);
    record.extend_from_slice(name);
    record.extend_from_slice(&payload);
    record
}
