use std::fmt;

/// Types of icon elements that an Icon Archiver file can store.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IconType {
    /// 32x32 1-bit icon with 1-bit mask.
    Mono_32x32,
    /// 32x32 4-bit indexed icon.
    Indexed4_32x32,
    /// 32x32 8-bit indexed icon.
    Indexed8_32x32,
    /// 32x32 24-bit icon (without alpha).
    RGB24_32x32,
    /// 32x32 8-bit alpha mask.
    Mask8_32x32,
    /// 16x16 1-bit icon with 1-bit mask.
    Mono_16x16,
    /// 16x16 4-bit indexed icon.
    Indexed4_16x16,
    /// 16x16 8-bit indexed icon.
    Indexed8_16x16,
    /// 16x16 24-bit icon (without alpha).
    RGB24_16x16,
    /// 16x16 8-bit alpha mask.
    Mask8_16x16,
    /// 48x48 1-bit icon with 1-bit mask.
    Mono_48x48,
    /// 48x48 4-bit indexed icon.
    Indexed4_48x48,
    /// 48x48 8-bit indexed icon.
    Indexed8_48x48,
    /// 48x48 24-bit icon (without alpha).
    RGB24_48x48,
    /// 48x48 8-bit alpha mask.
    Mask8_48x48,
}

/// The number of icon types in the registry.
pub const NUM_ICON_TYPES: usize = 15;

/// All icon types, in the order an Icon Archiver version 2 record stores
/// their data.
pub static ICON_TYPES: [IconType; NUM_ICON_TYPES] = [
    IconType::Mono_32x32,
    IconType::Indexed4_32x32,
    IconType::Indexed8_32x32,
    IconType::RGB24_32x32,
    IconType::Mask8_32x32,
    IconType::Mono_16x16,
    IconType::Indexed4_16x16,
    IconType::Indexed8_16x16,
    IconType::RGB24_16x16,
    IconType::Mask8_16x16,
    IconType::Mono_48x48,
    IconType::Indexed4_48x48,
    IconType::Indexed8_48x48,
    IconType::RGB24_48x48,
    IconType::Mask8_48x48,
];

/// The order in which icon elements must appear in an ICNS file.  The
/// 1-bit icons come last, otherwise Finder does not show the color ones.
pub static ICNS_ORDER: [IconType; NUM_ICON_TYPES] = [
    IconType::Indexed4_16x16,
    IconType::Indexed8_16x16,
    IconType::RGB24_16x16,
    IconType::Mask8_16x16,
    IconType::Indexed4_32x32,
    IconType::Indexed8_32x32,
    IconType::RGB24_32x32,
    IconType::Mask8_32x32,
    IconType::Indexed4_48x48,
    IconType::Indexed8_48x48,
    IconType::RGB24_48x48,
    IconType::Mask8_48x48,
    IconType::Mono_16x16,
    IconType::Mono_32x32,
    IconType::Mono_48x48,
];

/// The icon types that existed before System 8.5, in the order of the
/// offset table of an Icon Archiver version 1 record.
pub static LEGACY_ICON_TYPES: [IconType; 6] = [
    IconType::Mono_32x32,
    IconType::Indexed4_32x32,
    IconType::Indexed8_32x32,
    IconType::Mono_16x16,
    IconType::Indexed4_16x16,
    IconType::Indexed8_16x16,
];

/// Static facts about one icon type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IconTypeDescriptor {
    /// The ICNS element type.
    pub ostype: OSType,
    /// Length of the uncompressed pixel data within an ICNS file.
    pub icns_data_length: usize,
    /// Length of the pixel data within an Icon Archiver record.  This only
    /// differs from `icns_data_length` for 24-bit icons, which the archive
    /// stores as ARGB.
    pub archive_data_length: usize,
    /// The bit of a version 2 record's presence bitfield for this type.
    pub presence_bit: u8,
}

// Indexed by `IconType as usize`, so this follows the enum's order.
static DESCRIPTORS: [IconTypeDescriptor; NUM_ICON_TYPES] = [
    descriptor(*b"ICN#", 256, 256, 5),
    descriptor(*b"icl4", 512, 512, 6),
    descriptor(*b"icl8", 1024, 1024, 7),
    descriptor(*b"il32", 3072, 4096, 8),
    descriptor(*b"l8mk", 1024, 1024, 9),
    descriptor(*b"ics#", 64, 64, 0),
    descriptor(*b"ics4", 128, 128, 1),
    descriptor(*b"ics8", 256, 256, 2),
    descriptor(*b"is32", 768, 1024, 3),
    descriptor(*b"s8mk", 256, 256, 4),
    descriptor(*b"ich#", 576, 576, 10),
    descriptor(*b"ich4", 1152, 1152, 11),
    descriptor(*b"ich8", 2304, 2304, 12),
    descriptor(*b"ih32", 6912, 9216, 13),
    descriptor(*b"h8mk", 2304, 2304, 14),
];

const fn descriptor(ostype: [u8; 4],
                    icns_data_length: usize,
                    archive_data_length: usize,
                    presence_bit: u8)
                    -> IconTypeDescriptor {
    IconTypeDescriptor {
        ostype: OSType(ostype),
        icns_data_length,
        archive_data_length,
        presence_bit,
    }
}

impl IconType {
    /// Get the icon type associated with the given OSType, if any.
    pub fn from_ostype(ostype: OSType) -> Option<IconType> {
        ICON_TYPES.iter()
            .cloned()
            .find(|icon_type| icon_type.ostype() == ostype)
    }

    /// Returns the static descriptor of this icon type.
    pub fn descriptor(self) -> &'static IconTypeDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Get the OSType that represents this icon type.
    pub fn ostype(self) -> OSType {
        self.descriptor().ostype
    }

    /// Returns the length of this type's payload within an ICNS file, before
    /// any compression.
    ///
    /// # Examples
    /// ```
    /// use icon_dearchiver::IconType;
    /// assert_eq!(IconType::Mono_16x16.icns_data_length(), 64);
    /// assert_eq!(IconType::RGB24_32x32.icns_data_length(), 3072);
    /// ```
    pub fn icns_data_length(self) -> usize {
        self.descriptor().icns_data_length
    }

    /// Returns the length of this type's data within an Icon Archiver
    /// record.
    ///
    /// # Examples
    /// ```
    /// use icon_dearchiver::IconType;
    /// assert_eq!(IconType::Mono_16x16.archive_data_length(), 64);
    /// assert_eq!(IconType::RGB24_32x32.archive_data_length(), 4096);
    /// ```
    pub fn archive_data_length(self) -> usize {
        self.descriptor().archive_data_length
    }

    /// Returns the bitmask selecting this type in a version 2 presence
    /// bitfield.
    pub fn presence_mask(self) -> u16 {
        1 << self.descriptor().presence_bit
    }

    /// Returns the width (and height) of this icon type, in pixels.
    pub fn pixel_size(self) -> u32 {
        match self {
            IconType::Mono_16x16 |
            IconType::Indexed4_16x16 |
            IconType::Indexed8_16x16 |
            IconType::RGB24_16x16 |
            IconType::Mask8_16x16 => 16,
            IconType::Mono_32x32 |
            IconType::Indexed4_32x32 |
            IconType::Indexed8_32x32 |
            IconType::RGB24_32x32 |
            IconType::Mask8_32x32 => 32,
            IconType::Mono_48x48 |
            IconType::Indexed4_48x48 |
            IconType::Indexed8_48x48 |
            IconType::RGB24_48x48 |
            IconType::Mask8_48x48 => 48,
        }
    }

    /// Returns the encoding used for this icon type.
    pub fn encoding(self) -> Encoding {
        match self {
            IconType::Mono_16x16 |
            IconType::Mono_32x32 |
            IconType::Mono_48x48 => Encoding::MonoWithMask,
            IconType::Indexed4_16x16 |
            IconType::Indexed4_32x32 |
            IconType::Indexed4_48x48 => Encoding::Indexed4,
            IconType::Indexed8_16x16 |
            IconType::Indexed8_32x32 |
            IconType::Indexed8_48x48 => Encoding::Indexed8,
            IconType::RGB24_16x16 |
            IconType::RGB24_32x32 |
            IconType::RGB24_48x48 => Encoding::RLE24,
            IconType::Mask8_16x16 |
            IconType::Mask8_32x32 |
            IconType::Mask8_48x48 => Encoding::Mask8,
        }
    }

    /// Returns the indexed-color types that need this type to be present
    /// in an ICNS file.  Empty for anything but 1-bit icons.
    pub fn dependent_color_types(self) -> &'static [IconType] {
        match self {
            IconType::Mono_16x16 => {
                &[IconType::Indexed4_16x16, IconType::Indexed8_16x16]
            }
            IconType::Mono_32x32 => {
                &[IconType::Indexed4_32x32, IconType::Indexed8_32x32]
            }
            IconType::Mono_48x48 => {
                &[IconType::Indexed4_48x48, IconType::Indexed8_48x48]
            }
            _ => &[],
        }
    }
}

impl fmt::Display for IconType {
    fn fmt(&self, out: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(out, "{}", self.ostype())
    }
}

/// A Macintosh OSType (also known as a ResType), used in ICNS files to
/// identify the type of each icon element.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OSType(pub [u8; 4]);

impl fmt::Display for OSType {
    fn fmt(&self, out: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let &OSType(raw) = self;
        for &byte in &raw {
            let character = std::char::from_u32(u32::from(byte))
                .unwrap_or(std::char::REPLACEMENT_CHARACTER);
            write!(out, "{}", character)?;
        }
        Ok(())
    }
}

/// Method of encoding an image within an icon element.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Encoding {
    /// A 1-bit bitmap followed by a 1-bit mask of the same size.
    MonoWithMask,
    /// Uncompressed 4-bit indices into the system palette.
    Indexed4,
    /// Uncompressed 8-bit indices into the system palette.
    Indexed8,
    /// Stored as ARGB in the archive, written as RLE-compressed RGB
    /// channels to ICNS.
    RLE24,
    /// Uncompressed 8-bit alpha mask.
    Mask8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn icon_type_ostype_round_trip() {
        for icon_type in &ICON_TYPES {
            let ostype = icon_type.ostype();
            let from = IconType::from_ostype(ostype);
            assert_eq!(Some(*icon_type), from);
        }
        assert_eq!(IconType::from_ostype(OSType(*b"it32")), None);
    }

    #[test]
    fn descriptors_follow_enum_order() {
        for (index, icon_type) in ICON_TYPES.iter().enumerate() {
            assert_eq!(*icon_type as usize, index);
        }
    }

    #[test]
    fn presence_bits_are_distinct() {
        let bits: HashSet<u8> = ICON_TYPES.iter()
            .map(|icon_type| icon_type.descriptor().presence_bit)
            .collect();
        assert_eq!(bits.len(), NUM_ICON_TYPES);
        assert!(bits.iter().all(|&bit| bit < 15));
    }

    #[test]
    fn icns_order_is_a_permutation() {
        let ordered: HashSet<IconType> = ICNS_ORDER.iter().cloned().collect();
        assert_eq!(ordered.len(), NUM_ICON_TYPES);
        for icon_type in &ICNS_ORDER[12..] {
            assert_eq!(icon_type.encoding(), Encoding::MonoWithMask);
        }
    }

    #[test]
    fn data_lengths_match_pixel_sizes() {
        for icon_type in &ICON_TYPES {
            let pixels = (icon_type.pixel_size() * icon_type.pixel_size()) as
                         usize;
            let (icns, archive) = match icon_type.encoding() {
                Encoding::MonoWithMask => (pixels / 4, pixels / 4),
                Encoding::Indexed4 => (pixels / 2, pixels / 2),
                Encoding::Indexed8 | Encoding::Mask8 => (pixels, pixels),
                Encoding::RLE24 => (pixels * 3, pixels * 4),
            };
            assert_eq!(icon_type.icns_data_length(), icns, "{}", icon_type);
            assert_eq!(icon_type.archive_data_length(), archive, "{}",
                       icon_type);
        }
    }

    #[test]
    fn ostype_to_string() {
        assert_eq!(OSType(*b"ics#").to_string(), "ics#".to_string());
        assert_eq!(IconType::Mono_16x16.to_string(), "ics#");
        assert_eq!(OSType(*b"a\x8ab\0").to_string(), "a\u{8a}b\0");
    }
}
