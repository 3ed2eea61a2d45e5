use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};
use bitflags::bitflags;
use strum::FromRepr;

use crate::{
    format::{
        chunk::{read_tag, RcolChunk},
        FourCC,
    },
    util::read::{read_vec, remaining_len},
    Error, Result,
};

// Index buffer
pub const K_CHUNK_IBUF: FourCC = FourCC(*b"IBUF");
// Shadow index buffer, same layout
pub const K_TYPE_IBUF2: u32 = 0x0229684F;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct IbufFlags: u32 {
        const DIFFERENCED_INDICES = 0x1;
        const USES_32_BIT_INDICES = 0x2;
        const IS_DISPLAY_LIST = 0x4;
    }
}

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromRepr)]
pub enum PrimitiveType {
    PointList = 0,
    LineList = 1,
    LineStrip = 2,
    TriangleList = 3,
    TriangleFan = 4,
    TriangleStrip = 5,
    QuadList = 6,
    DisplayList = 7,
}

impl PrimitiveType {
    /// Number of indices used by `primitive_count` primitives.
    pub fn index_count(self, primitive_count: usize) -> Option<usize> {
        match self {
            Self::PointList => Some(primitive_count),
            Self::LineList => primitive_count.checked_mul(2),
            Self::LineStrip => primitive_count.checked_add(1),
            Self::TriangleList => primitive_count.checked_mul(3),
            Self::TriangleFan | Self::TriangleStrip => primitive_count.checked_add(2),
            Self::QuadList => primitive_count.checked_mul(4),
            Self::DisplayList => None,
        }
    }
}

/// Index buffer. Indices are kept absolute; delta encoding only exists on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct Ibuf {
    pub version: u32,
    pub flags: IbufFlags,
    pub display_list_usage: u32,
    pub indices: Vec<u32>,
}

impl Ibuf {
    fn index_width(&self) -> usize {
        if self.flags.contains(IbufFlags::USES_32_BIT_INDICES) {
            4
        } else {
            2
        }
    }

    pub fn get_indices(
        &self,
        primitive_type: PrimitiveType,
        start_index: usize,
        primitive_count: usize,
    ) -> Result<&[u32]> {
        let count = primitive_type.index_count(primitive_count).ok_or_else(|| {
            Error::InvalidArgument(format!("cannot slice {primitive_type:?} indices"))
        })?;
        start_index
            .checked_add(count)
            .and_then(|end| self.indices.get(start_index..end))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "{count} indices at {start_index} exceed the {} available",
                    self.indices.len()
                ))
            })
    }
}

impl RcolChunk for Ibuf {
    const TAG: FourCC = K_CHUNK_IBUF;
    const RESOURCE_TYPE: u32 = 0x01D0E70F;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_IBUF])?;
        let version = reader.read_le()?;
        let flags = IbufFlags::from_bits_retain(reader.read_le()?);
        let display_list_usage = reader.read_le()?;
        let mut ret = Self { version, flags, display_list_usage, indices: Vec::new() };

        let width = ret.index_width();
        let remaining = remaining_len(reader)? as usize;
        if remaining % width != 0 {
            return Err(Error::InvalidData {
                chunk: K_CHUNK_IBUF,
                message: format!("{remaining} bytes of indices is not a multiple of {width}"),
            });
        }
        let count = remaining / width;
        let differenced = flags.contains(IbufFlags::DIFFERENCED_INDICES);
        ret.indices = if width == 4 {
            let raw = read_vec::<u32, _>(reader, count)?;
            if differenced {
                let mut last = 0u32;
                raw.into_iter()
                    .map(|delta| {
                        last = last.wrapping_add(delta);
                        last
                    })
                    .collect()
            } else {
                raw
            }
        } else {
            // 16-bit deltas wrap modulo 2^16
            let raw = read_vec::<u16, _>(reader, count)?;
            if differenced {
                let mut last = 0u16;
                raw.into_iter()
                    .map(|delta| {
                        last = last.wrapping_add(delta);
                        last as u32
                    })
                    .collect()
            } else {
                raw.into_iter().map(u32::from).collect()
            }
        };
        Ok(ret)
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&K_CHUNK_IBUF)?;
        writer.write_le(&self.version)?;
        writer.write_le(&self.flags.bits())?;
        writer.write_le(&self.display_list_usage)?;

        let differenced = self.flags.contains(IbufFlags::DIFFERENCED_INDICES);
        if self.index_width() == 4 {
            let mut last = 0u32;
            for &index in &self.indices {
                if differenced {
                    writer.write_le(&index.wrapping_sub(last))?;
                    last = index;
                } else {
                    writer.write_le(&index)?;
                }
            }
            return Ok(());
        }

        let mut last = 0u16;
        for (i, &index) in self.indices.iter().enumerate() {
            let index = u16::try_from(index).map_err(|_| Error::InvalidData {
                chunk: K_CHUNK_IBUF,
                message: format!("index {index} at {i} does not fit 16 bits"),
            })?;
            if differenced {
                writer.write_le(&index.wrapping_sub(last))?;
                last = index;
            } else {
                writer.write_le(&index)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;

    fn ibuf(flags: IbufFlags, indices: Vec<u32>) -> Ibuf {
        Ibuf { version: 3, flags, display_list_usage: 0, indices }
    }

    #[test]
    fn read_32_bit() {
        let data = hex!(
            49425546 03000000 02000000 00000000
            00000000 01000000 02000000
        );
        let ibuf = Ibuf::from_bytes(&data).unwrap();
        assert_eq!(vec![0, 1, 2], ibuf.indices);
        assert_eq!(data.to_vec(), ibuf.to_bytes().unwrap());
    }

    #[test]
    fn read_differenced_16_bit() {
        let data = hex!(
            49425546 03000000 01000000 00000000
            0500 0100 feff 0000 0300
        );
        let ibuf = Ibuf::from_bytes(&data).unwrap();
        assert_eq!(vec![5, 6, 4, 4, 7], ibuf.indices);
        assert_eq!(data.to_vec(), ibuf.to_bytes().unwrap());
    }

    #[test]
    fn differenced_round_trip() {
        for flags in [
            IbufFlags::DIFFERENCED_INDICES,
            IbufFlags::DIFFERENCED_INDICES | IbufFlags::USES_32_BIT_INDICES,
        ] {
            let expected = ibuf(flags, vec![10, 10, 10, 3, 2, 1, 0, 30000, 5]);
            let bytes = expected.to_bytes().unwrap();
            assert_eq!(expected, Ibuf::from_bytes(&bytes).unwrap());
        }
    }

    #[test]
    fn differenced_16_bit_wraps() {
        let data = hex!(
            49425546 03000000 01000000 00000000
            0000 409c c163
        );
        let decoded = Ibuf::from_bytes(&data).unwrap();
        assert_eq!(vec![0, 40000, 1], decoded.indices);
        assert_eq!(data.to_vec(), decoded.to_bytes().unwrap());

        let expected = ibuf(IbufFlags::DIFFERENCED_INDICES, vec![0, 40000, 1, 65535, 0]);
        let bytes = expected.to_bytes().unwrap();
        assert_eq!(expected, Ibuf::from_bytes(&bytes).unwrap());
    }

    #[test]
    fn index_too_wide() {
        assert!(ibuf(IbufFlags::empty(), vec![0x10000]).to_bytes().is_err());
        assert!(ibuf(IbufFlags::USES_32_BIT_INDICES, vec![0x10000]).to_bytes().is_ok());
    }

    #[test]
    fn odd_length() {
        let data = hex!(49425546 03000000 00000000 00000000 010002);
        assert!(matches!(Ibuf::from_bytes(&data), Err(Error::InvalidData { .. })));
    }

    #[test]
    fn get_indices() {
        let ibuf = ibuf(IbufFlags::empty(), (0..12).collect());
        assert_eq!(&[3, 4, 5, 6, 7, 8], ibuf.get_indices(PrimitiveType::TriangleList, 3, 2).unwrap());
        assert_eq!(&[0, 1, 2, 3], ibuf.get_indices(PrimitiveType::TriangleStrip, 0, 2).unwrap());
        assert_eq!(&[0, 1, 2, 3], ibuf.get_indices(PrimitiveType::QuadList, 0, 1).unwrap());
        assert_eq!(&[11], ibuf.get_indices(PrimitiveType::PointList, 11, 1).unwrap());
        assert!(ibuf.get_indices(PrimitiveType::LineList, 10, 2).is_err());
        assert!(ibuf.get_indices(PrimitiveType::DisplayList, 0, 1).is_err());
    }
}
