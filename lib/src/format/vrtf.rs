use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};
use strum::{EnumIter, FromRepr};

use crate::{
    format::{
        chunk::{read_bool32, read_count, read_tag, write_bool32, write_count, RcolChunk},
        vertex::ElementKind,
        FourCC,
    },
    Error, Result,
};

// Vertex format
pub const K_CHUNK_VRTF: FourCC = FourCC(*b"VRTF");

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromRepr, EnumIter)]
pub enum ElementUsage {
    Position = 0,
    Normal = 1,
    Uv = 2,
    BlendIndex = 3,
    BlendWeight = 4,
    Tangent = 5,
    Colour = 6,
}

impl ElementUsage {
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Position => ElementKind::Position,
            Self::Normal => ElementKind::Normal,
            Self::Uv => ElementKind::Uv,
            Self::BlendIndex => ElementKind::BlendIndices,
            Self::BlendWeight => ElementKind::Weights,
            Self::Tangent => ElementKind::Tangent,
            Self::Colour => ElementKind::Colour,
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromRepr, EnumIter)]
pub enum ElementFormat {
    Float1 = 0,
    Float2 = 1,
    Float3 = 2,
    Float4 = 3,
    UByte4 = 4,
    ColorUByte4 = 5,
    Short2 = 6,
    Short4 = 7,
    UByte4N = 8,
    Short2N = 9,
    Short4N = 10,
    UShort2N = 11,
    UShort4N = 12,
    Dec3N = 13,
    UDec3N = 14,
    Float16x2 = 15,
    Float16x4 = 16,
    Short4DropShadow = 0xFF,
}

impl ElementFormat {
    pub fn byte_size(self) -> usize {
        match self {
            Self::Float1
            | Self::UByte4
            | Self::ColorUByte4
            | Self::Short2
            | Self::UByte4N
            | Self::Short2N
            | Self::UShort2N
            | Self::Dec3N
            | Self::UDec3N
            | Self::Float16x2 => 4,
            Self::Float2
            | Self::Short4
            | Self::Short4N
            | Self::UShort4N
            | Self::Float16x4
            | Self::Short4DropShadow => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementLayout {
    pub usage: ElementUsage,
    pub usage_index: u8,
    pub format: ElementFormat,
    pub offset: u8,
}

impl ElementLayout {
    pub fn new(usage: ElementUsage, usage_index: u8, format: ElementFormat, offset: u8) -> Self {
        Self { usage, usage_index, format, offset }
    }

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let [usage, usage_index, format, offset]: [u8; 4] = reader.read_le()?;
        let usage = ElementUsage::from_repr(usage).ok_or(Error::InvalidValue {
            chunk: K_CHUNK_VRTF,
            field: "usage",
            value: usage as u64,
        })?;
        let format = ElementFormat::from_repr(format).ok_or(Error::InvalidValue {
            chunk: K_CHUNK_VRTF,
            field: "format",
            value: format as u64,
        })?;
        Ok(Self { usage, usage_index, format, offset })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&[self.usage as u8, self.usage_index, self.format as u8, self.offset])?;
        Ok(())
    }
}

/// Vertex layout for a paired VBUF.
#[derive(Clone, Debug, PartialEq)]
pub struct Vrtf {
    pub version: u32,
    pub stride: u32,
    pub extended_format: bool,
    pub layouts: Vec<ElementLayout>,
}

impl Vrtf {
    /// Layout used by sun shadow meshes.
    pub fn sun_shadow() -> Self {
        Self {
            version: 2,
            stride: 8,
            extended_format: false,
            layouts: vec![ElementLayout::new(ElementUsage::Position, 0, ElementFormat::Short4, 0)],
        }
    }

    /// Layout used by drop shadow meshes.
    pub fn drop_shadow() -> Self {
        Self {
            version: 2,
            stride: 16,
            extended_format: false,
            layouts: vec![
                ElementLayout::new(ElementUsage::Position, 0, ElementFormat::UShort4N, 0),
                ElementLayout::new(ElementUsage::Uv, 0, ElementFormat::Short4DropShadow, 8),
            ],
        }
    }

    pub fn find_layout(&self, usage: ElementUsage) -> Option<&ElementLayout> {
        self.layouts.iter().find(|l| l.usage == usage)
    }

    /// All layouts with the given usage, ordered by usage index.
    pub fn find_layouts(&self, usage: ElementUsage) -> Vec<&ElementLayout> {
        let mut ret: Vec<_> = self.layouts.iter().filter(|l| l.usage == usage).collect();
        ret.sort_by_key(|l| l.usage_index);
        ret
    }

    /// Checks that every element fits inside the stride.
    pub fn validate(&self) -> Result<()> {
        for layout in &self.layouts {
            let end = layout.offset as usize + layout.format.byte_size();
            if end > self.stride as usize {
                return Err(Error::InvalidData {
                    chunk: K_CHUNK_VRTF,
                    message: format!(
                        "{:?}[{}] ends at {end}, past stride {}",
                        layout.usage, layout.usage_index, self.stride
                    ),
                });
            }
        }
        Ok(())
    }
}

impl RcolChunk for Vrtf {
    const TAG: FourCC = K_CHUNK_VRTF;
    const RESOURCE_TYPE: u32 = 0x01D0E723;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_VRTF])?;
        let version = reader.read_le()?;
        let stride = read_count(reader, K_CHUNK_VRTF, "stride")? as u32;
        let layout_count = read_count(reader, K_CHUNK_VRTF, "layout")?;
        let extended_format = read_bool32(reader, K_CHUNK_VRTF, "extended format")?;
        let layouts = (0..layout_count)
            .map(|_| ElementLayout::read(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { version, stride, extended_format, layouts })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&K_CHUNK_VRTF)?;
        writer.write_le(&self.version)?;
        write_count(writer, K_CHUNK_VRTF, "stride", self.stride as usize)?;
        write_count(writer, K_CHUNK_VRTF, "layout", self.layouts.len())?;
        write_bool32(writer, self.extended_format)?;
        for layout in &self.layouts {
            layout.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn read_write_drop_shadow() {
        let data = hex!(
            56525446 02000000 10000000 02000000 00000000
            00000c00 0200ff08
        );
        let vrtf = Vrtf::from_bytes(&data).unwrap();
        assert_eq!(Vrtf::drop_shadow(), vrtf);
        assert_eq!(data.to_vec(), vrtf.to_bytes().unwrap());
    }

    #[test]
    fn sun_shadow_bytes() {
        let data = Vrtf::sun_shadow().to_bytes().unwrap();
        assert_eq!(hex!(56525446 02000000 08000000 01000000 00000000 00000700).to_vec(), data);
        assert!(Vrtf::sun_shadow().validate().is_ok());
    }

    #[test]
    fn find_layouts_sorted() {
        let vrtf = Vrtf {
            version: 3,
            stride: 24,
            extended_format: true,
            layouts: vec![
                ElementLayout::new(ElementUsage::Uv, 1, ElementFormat::Float2, 16),
                ElementLayout::new(ElementUsage::Position, 0, ElementFormat::Float3, 0),
                ElementLayout::new(ElementUsage::Uv, 0, ElementFormat::Short2, 12),
            ],
        };
        let uvs = vrtf.find_layouts(ElementUsage::Uv);
        assert_eq!(vec![0, 1], uvs.iter().map(|l| l.usage_index).collect::<Vec<_>>());
        assert_eq!(Some(0), vrtf.find_layout(ElementUsage::Position).map(|l| l.offset));
        assert_eq!(None, vrtf.find_layout(ElementUsage::Tangent));
        assert!(vrtf.validate().is_ok());

        let bytes = vrtf.to_bytes().unwrap();
        assert_eq!(vrtf, Vrtf::from_bytes(&bytes).unwrap());
    }

    #[test]
    fn validate_overflowing_layout() {
        let vrtf = Vrtf {
            version: 2,
            stride: 12,
            extended_format: false,
            layouts: vec![ElementLayout::new(ElementUsage::Normal, 0, ElementFormat::Float3, 4)],
        };
        assert!(matches!(vrtf.validate(), Err(Error::InvalidData { .. })));
        // Parsing does not validate.
        assert!(Vrtf::from_bytes(&vrtf.to_bytes().unwrap()).is_ok());
    }

    #[test]
    fn unknown_format() {
        let data = hex!(56525446 02000000 08000000 01000000 00000000 00001100);
        let err = Vrtf::from_bytes(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "format", value: 0x11, .. }));
    }

    #[test]
    fn format_sizes() {
        let total: usize = ElementFormat::iter().map(ElementFormat::byte_size).sum();
        assert_eq!(4 * 10 + 8 * 6 + 12 + 16, total);
    }
}
