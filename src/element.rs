use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Write};

use super::icontype::{Encoding, IconType, OSType};
use super::rle::RunLength;

/// The length of an icon element header, in bytes:
const ICON_ELEMENT_HEADER_LENGTH: u32 = 8;

/// One entry in an ICNS file.  Depending on the resource type, this may
/// represent an icon, or part of an icon (such as an alpha mask, or color
/// data without the mask).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconElement {
    /// The OSType for this element (e.g. `icl8` or `s8mk`).
    pub ostype: OSType,
    /// The raw data payload for this element.
    pub data: Vec<u8>,
}

impl IconElement {
    /// Creates an icon element with the given OSType and data payload.
    pub fn new(ostype: OSType, data: Vec<u8>) -> IconElement {
        IconElement { ostype, data }
    }

    /// Encodes icon data as stored in an Icon Archiver record into an
    /// element of the given type.  24-bit icons are converted from ARGB to
    /// RLE-compressed RGB channels; everything else is copied as is.
    ///
    /// Panics if `archive_data` is shorter than the type's archive data
    /// length.
    pub fn encode(icon_type: IconType, archive_data: &[u8]) -> IconElement {
        let data = match icon_type.encoding() {
            Encoding::RLE24 => {
                let argb = &archive_data[..icon_type.archive_data_length()];
                let mut data = Vec::with_capacity(argb.len());
                // Skip the alpha byte of each pixel.
                for channel in 1..4 {
                    RunLength::Icns
                        .encode_strided(argb, channel, 4, &mut data);
                }
                data
            }
            _ => archive_data[..icon_type.icns_data_length()].to_vec(),
        };
        IconElement::new(icon_type.ostype(), data)
    }

    /// Creates a 1-bit icon element with an all-black image and a mask that
    /// covers every pixel.
    pub fn placeholder(icon_type: IconType) -> IconElement {
        let length = icon_type.icns_data_length();
        let mut data = vec![0x00u8; length / 2];
        data.resize(length, 0xff);
        IconElement::new(icon_type.ostype(), data)
    }

    /// Decodes the RLE-compressed channels of a 24-bit element into RGB
    /// pixel data.  Returns an error if this element is not a 24-bit icon
    /// or the data is malformed.
    pub fn decode_rgb(&self) -> io::Result<Vec<u8>> {
        let icon_type = self.icon_type()
            .filter(|icon_type| icon_type.encoding() == Encoding::RLE24)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidInput,
                           format!("not a 24-bit icon element: {}",
                                   self.ostype))
            })?;
        let num_pixels = icon_type.icns_data_length() / 3;
        let mut rgb = vec![0u8; num_pixels * 3];
        let mut input = &self.data[..];
        for channel in 0..3 {
            let (values, consumed) = RunLength::Icns.decode(input,
                                                            num_pixels)?;
            for (pixel, value) in values.into_iter().enumerate() {
                rgb[3 * pixel + channel] = value;
            }
            input = &input[consumed..];
        }
        if !input.is_empty() {
            return Err(Error::new(ErrorKind::InvalidData,
                                  "trailing data after RLE channels"));
        }
        Ok(rgb)
    }

    /// Returns the type of icon encoded by this element, or `None` if this
    /// element does not encode a supported icon type.
    pub fn icon_type(&self) -> Option<IconType> {
        IconType::from_ostype(self.ostype)
    }

    /// Returns the encoded length of the element, in bytes, including the
    /// length of the header.
    pub fn total_length(&self) -> u32 {
        ICON_ELEMENT_HEADER_LENGTH + (self.data.len() as u32)
    }

    /// Reads an icon element from within an ICNS file.
    pub fn read<R: Read>(mut reader: R) -> io::Result<IconElement> {
        let mut raw_ostype = [0u8; 4];
        reader.read_exact(&mut raw_ostype)?;
        let element_length = reader.read_u32::<BigEndian>()?;
        if element_length < ICON_ELEMENT_HEADER_LENGTH {
            return Err(Error::new(ErrorKind::InvalidData,
                                  "invalid element length"));
        }
        let data_length = element_length - ICON_ELEMENT_HEADER_LENGTH;
        let mut data = vec![0u8; data_length as usize];
        reader.read_exact(&mut data)?;
        Ok(IconElement::new(OSType(raw_ostype), data))
    }

    /// Writes the icon element to within an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let OSType(ref raw_ostype) = self.ostype;
        writer.write_all(raw_ostype)?;
        writer.write_u32::<BigEndian>(self.total_length())?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}
