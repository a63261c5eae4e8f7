use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Write};

use super::element::IconElement;
use super::icontype::{IconType, ICNS_ORDER};
use super::record::DecodedIconFamily;

/// The first four bytes of an ICNS file:
const ICNS_MAGIC_LITERAL: &[u8; 4] = b"icns";

/// The length of an icon family header, in bytes:
const ICON_FAMILY_HEADER_LENGTH: u32 = 8;

/// A set of icons stored in a single ICNS file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IconFamily {
    /// The icon elements stored in the ICNS file.
    pub elements: Vec<IconElement>,
}

impl IconFamily {
    /// Creates a new, empty icon family.
    pub fn new() -> IconFamily {
        IconFamily { elements: Vec::new() }
    }

    /// Builds the ICNS representation of an icon decoded from an Icon
    /// Archiver file.
    ///
    /// Elements are added in the order Finder expects, with 1-bit icons
    /// last.  A missing 1-bit icon is replaced by a black, fully opaque
    /// square when a 4-bit or 8-bit icon of the same size is present,
    /// since the color icon doesn't display properly without it.
    pub fn from_decoded(decoded: &DecodedIconFamily) -> IconFamily {
        let mut family = IconFamily::new();
        for &icon_type in ICNS_ORDER.iter() {
            if let Some(data) = decoded.icon_data(icon_type) {
                family.elements.push(IconElement::encode(icon_type, data));
            } else if icon_type.dependent_color_types()
                .iter()
                .any(|&color_type| decoded.has_icon(color_type)) {
                family.elements.push(IconElement::placeholder(icon_type));
            }
        }
        family
    }

    /// Returns the element of the given icon type, if present.
    pub fn find_element(&self, icon_type: IconType) -> Option<&IconElement> {
        let ostype = icon_type.ostype();
        self.elements.iter().find(|el| el.ostype == ostype)
    }

    /// Reads an icon family from an ICNS file.
    pub fn read<R: Read>(mut reader: R) -> io::Result<IconFamily> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != *ICNS_MAGIC_LITERAL {
            let msg = "not an icns file (wrong magic literal)";
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let file_length = reader.read_u32::<BigEndian>()?;
        let mut file_position: u32 = ICON_FAMILY_HEADER_LENGTH;
        let mut family = IconFamily::new();
        while file_position < file_length {
            let element = IconElement::read(reader.by_ref())?;
            file_position += element.total_length();
            family.elements.push(element);
        }
        Ok(family)
    }

    /// Writes the icon family to an ICNS file.  The file length in the
    /// header is filled in once all elements have been written.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let mut output = Vec::with_capacity(self.total_length() as usize);
        output.write_all(ICNS_MAGIC_LITERAL)?;
        output.write_u32::<BigEndian>(0)?;
        for element in &self.elements {
            element.write(&mut output)?;
        }
        let file_length = u32::try_from(output.len()).map_err(|_| {
            Error::new(ErrorKind::InvalidInput, "icon family is too large")
        })?;
        BigEndian::write_u32(&mut output[4..8], file_length);
        writer.write_all(&output)
    }

    /// Returns the encoded length of the file, in bytes, including the
    /// length of the header.
    pub fn total_length(&self) -> u32 {
        let mut length = ICON_FAMILY_HEADER_LENGTH;
        for element in &self.elements {
            length += element.total_length();
        }
        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::icontype::{OSType, NUM_ICON_TYPES};
    use std::io::Cursor;

    fn decoded(types: &[IconType]) -> DecodedIconFamily {
        let mut offsets = [None; NUM_ICON_TYPES];
        let mut data = Vec::new();
        for &icon_type in types {
            offsets[icon_type as usize] = Some(data.len());
            let fill = icon_type.descriptor().presence_bit;
            data.resize(data.len() + icon_type.archive_data_length(), fill);
        }
        DecodedIconFamily::new(0, String::new(), data, offsets)
            .expect("offsets out of bounds")
    }

    fn ostypes(family: &IconFamily) -> Vec<OSType> {
        family.elements.iter().map(|el| el.ostype).collect()
    }

    #[test]
    fn write_empty_icon_family() {
        let family = IconFamily::new();
        assert_eq!(0, family.elements.len());
        let mut output: Vec<u8> = vec![];
        family.write(&mut output).expect("write failed");
        assert_eq!(b"icns\0\0\0\x08", &output as &[u8]);
    }

    #[test]
    fn read_icon_family_with_fake_elements() {
        let input: Cursor<&[u8]> =
            Cursor::new(b"icns\0\0\0\x1fquux\0\0\0\x0efoobarbaz!\0\0\0\x09#");
        let family = IconFamily::read(input).expect("read failed");
        assert_eq!(2, family.elements.len());
        assert_eq!(OSType(*b"quux"), family.elements[0].ostype);
        assert_eq!(6, family.elements[0].data.len());
        assert_eq!(OSType(*b"baz!"), family.elements[1].ostype);
        assert_eq!(1, family.elements[1].data.len());
    }

    #[test]
    fn write_icon_family_with_fake_elements() {
        let mut family = IconFamily::new();
        family.elements
            .push(IconElement::new(OSType(*b"quux"), b"foobar".to_vec()));
        family.elements
            .push(IconElement::new(OSType(*b"baz!"), b"#".to_vec()));
        let mut output: Vec<u8> = vec![];
        family.write(&mut output).expect("write failed");
        assert_eq!(b"icns\0\0\0\x1fquux\0\0\0\x0efoobarbaz!\0\0\0\x09#",
                   &output as &[u8]);
    }

    #[test]
    fn elements_follow_icns_order() {
        let family = IconFamily::from_decoded(&decoded(&[
            IconType::Mono_32x32,
            IconType::Indexed8_32x32,
            IconType::Mono_16x16,
            IconType::Indexed4_16x16,
            IconType::Mask8_16x16,
        ]));
        assert_eq!(ostypes(&family),
                   vec![OSType(*b"ics4"),
                        OSType(*b"s8mk"),
                        OSType(*b"icl8"),
                        OSType(*b"ics#"),
                        OSType(*b"ICN#")]);
        let element = family.find_element(IconType::Indexed8_32x32).unwrap();
        assert!(element.data.iter().all(|&byte| byte == 7));
    }

    #[test]
    fn missing_mono_icon_is_synthesized() {
        let decoded = decoded(&[IconType::Indexed8_16x16,
                                IconType::Indexed4_48x48]);
        let family = IconFamily::from_decoded(&decoded);
        assert_eq!(ostypes(&family),
                   vec![OSType(*b"ics8"),
                        OSType(*b"ich4"),
                        OSType(*b"ics#"),
                        OSType(*b"ich#")]);
        for &icon_type in &[IconType::Mono_16x16, IconType::Mono_48x48] {
            let element = family.find_element(icon_type).unwrap();
            let half = icon_type.icns_data_length() / 2;
            assert_eq!(element.data.len(), 2 * half);
            assert!(element.data[..half].iter().all(|&byte| byte == 0x00));
            assert!(element.data[half..].iter().all(|&byte| byte == 0xff));
        }
    }

    #[test]
    fn mask_alone_gets_no_mono_icon() {
        let decoded = decoded(&[IconType::Mask8_32x32]);
        let family = IconFamily::from_decoded(&decoded);
        assert_eq!(ostypes(&family), vec![OSType(*b"l8mk")]);
    }

    #[test]
    fn written_length_matches_header() {
        let decoded = decoded(&[IconType::RGB24_32x32,
                                IconType::Indexed4_32x32]);
        let family = IconFamily::from_decoded(&decoded);
        let mut output: Vec<u8> = vec![];
        family.write(&mut output).expect("write failed");
        assert_eq!(BigEndian::read_u32(&output[4..8]) as usize, output.len());
        assert_eq!(family.total_length() as usize, output.len());
        let read = IconFamily::read(Cursor::new(&output))
            .expect("read failed");
        assert_eq!(read, family);
    }
}
