//! Library for converting classic Mac OS Icon Archiver files into Apple Icon
//! Image (.icns) files.
//!
//! Icon Archiver files come in two versions.  Version 1 (Icon Archiver 2)
//! stores the six icon types that existed before System 8.5, compressed
//! with PackBits; version 2 (Icon Archiver 4) adds 24-bit icons, 8-bit
//! masks and 48x48 icons, compressed with zlib.
//!
//! ```no_run
//! use icon_dearchiver::{IconArchive, IconFamily};
//!
//! let data = std::fs::read("Icons.iarc").unwrap();
//! let archive = IconArchive::parse(&data).unwrap();
//! for (index, result) in archive.records() {
//!     if let Ok(decoded) = result {
//!         let family = IconFamily::from_decoded(&decoded);
//!         let path = format!("{}.icns", index);
//!         let file = std::fs::File::create(path).unwrap();
//!         family.write(file).unwrap();
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod archive;
mod element;
mod error;
mod extract;
mod family;
mod header;
mod icontype;
mod record;
mod rle;

pub use self::archive::{IconArchive, Records};
pub use self::element::IconElement;
pub use self::error::ArchiveError;
pub use self::extract::{default_output_dir, extract_archive, output_file_name,
                        sanitize_name, ExtractSummary};
pub use self::family::IconFamily;
pub use self::header::{ArchiveHeader, ArchiveVersion, ExtendedHeader,
                       ARCHIVE_MAGIC_LITERAL, EXTENDED_MAGIC_LITERAL};
pub use self::icontype::{Encoding, IconType, IconTypeDescriptor, OSType,
                         ICNS_ORDER, ICON_TYPES, LEGACY_ICON_TYPES,
                         NUM_ICON_TYPES};
pub use self::record::{DecodedIconFamily, IconRecord, RecordLayout};
pub use self::rle::RunLength;
