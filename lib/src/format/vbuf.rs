use std::io::{Cursor, Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};
use bitflags::bitflags;

use crate::{
    format::{
        chunk::{read_tag, RcolChunk},
        reference::ChunkReference,
        vertex::{Vertex, VertexElement},
        vrtf::Vrtf,
        FourCC, Vector3,
    },
    util::read::read_remaining,
    Error, Result,
};

// Vertex buffer
pub const K_CHUNK_VBUF: FourCC = FourCC(*b"VBUF");
// Shadow vertex buffer, same layout
pub const K_TYPE_VBUF2: u32 = 0x0229684B;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct VbufFlags: u32 {
        const DYNAMIC = 0x1;
        const DIFFERENCED_VERTICES = 0x2;
        const COLLAPSED = 0x4;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vbuf {
    pub version: u32,
    pub flags: VbufFlags,
    pub swizzle_info: ChunkReference,
    pub buffer: Vec<u8>,
}

impl Vbuf {
    pub fn vertex_count(&self, stride: u32) -> usize {
        if stride == 0 {
            0
        } else {
            self.buffer.len() / stride as usize
        }
    }

    fn slice(&self, vertex: usize, stride: u32, offset: usize, len: usize) -> Result<&[u8]> {
        let start = vertex
            .checked_mul(stride as usize)
            .and_then(|v| v.checked_add(offset))
            .ok_or_else(|| Error::InvalidArgument(format!("vertex {vertex} out of range")))?;
        start.checked_add(len).and_then(|end| self.buffer.get(start..end)).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "read of {len} bytes at {start:#x} is outside the {:#x} byte buffer",
                self.buffer.len()
            ))
        })
    }

    pub fn read_f32(&self, vertex: usize, stride: u32, offset: usize) -> Result<f32> {
        let mut reader = Cursor::new(self.slice(vertex, stride, offset, 4)?);
        Ok(reader.read_le()?)
    }

    pub fn read_vector3(&self, vertex: usize, stride: u32, offset: usize) -> Result<Vector3> {
        let mut reader = Cursor::new(self.slice(vertex, stride, offset, 12)?);
        Ok(reader.read_le()?)
    }

    /// Decodes every vertex using the element layouts of `vrtf`.
    pub fn decode_vertices(&self, vrtf: &Vrtf) -> Result<Vec<Vertex>> {
        let mut vertices = Vec::with_capacity(self.vertex_count(vrtf.stride));
        for i in 0..self.vertex_count(vrtf.stride) {
            let mut elements = Vec::with_capacity(vrtf.layouts.len());
            for layout in &vrtf.layouts {
                let data = self
                    .slice(i, vrtf.stride, layout.offset as usize, layout.format.byte_size())
                    .map_err(|e| Error::InvalidData { chunk: K_CHUNK_VBUF, message: e.to_string() })?;
                elements.push(VertexElement::decode(layout.usage.kind(), data)?);
            }
            vertices.push(Vertex { elements });
        }
        Ok(vertices)
    }

    /// Replaces the buffer with `vertices` encoded using the element layouts of `vrtf`. Each
    /// vertex must hold one element per layout, in layout order.
    pub fn set_vertices(&mut self, vrtf: &Vrtf, vertices: &[Vertex]) -> Result<()> {
        let stride = vrtf.stride as usize;
        let mut buffer = vec![0u8; stride * vertices.len()];
        for (i, vertex) in vertices.iter().enumerate() {
            if vertex.elements.len() != vrtf.layouts.len() {
                return Err(Error::InvalidArgument(format!(
                    "vertex {i} has {} elements, layout has {}",
                    vertex.elements.len(),
                    vrtf.layouts.len()
                )));
            }
            for (element, layout) in vertex.elements.iter().zip(&vrtf.layouts) {
                let size = layout.format.byte_size();
                let start = i * stride + layout.offset as usize;
                if element.byte_size() != size || start + size > buffer.len() {
                    return Err(Error::InvalidArgument(format!(
                        "vertex {i}: {:?} element does not fit {:?} at offset {}",
                        layout.usage, layout.format, layout.offset
                    )));
                }
                let mut writer = Cursor::new(&mut buffer[start..start + size]);
                element.write(&mut writer)?;
            }
        }
        self.buffer = buffer;
        Ok(())
    }
}

impl RcolChunk for Vbuf {
    const TAG: FourCC = K_CHUNK_VBUF;
    const RESOURCE_TYPE: u32 = 0x01D0E6FB;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_VBUF])?;
        let version = reader.read_le()?;
        let flags = VbufFlags::from_bits_retain(reader.read_le()?);
        let swizzle_info = reader.read_le()?;
        let buffer = read_remaining(reader)?;
        Ok(Self { version, flags, swizzle_info, buffer })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&K_CHUNK_VBUF)?;
        writer.write_le(&self.version)?;
        writer.write_le(&self.flags.bits())?;
        writer.write_le(&self.swizzle_info)?;
        writer.write_all(&self.buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::format::{
        reference::ReferenceKind,
        vrtf::{ElementFormat, ElementLayout, ElementUsage},
        Vector2,
    };

    fn position_uv() -> Vrtf {
        Vrtf {
            version: 2,
            stride: 20,
            extended_format: false,
            layouts: vec![
                ElementLayout::new(ElementUsage::Position, 0, ElementFormat::Float3, 0),
                ElementLayout::new(ElementUsage::Uv, 0, ElementFormat::Float2, 12),
            ],
        }
    }

    #[test]
    fn read_write() {
        let data = hex!(
            56425546 05000000 03000000 02000010
            0000803f 00000040 000080bf
        );
        let vbuf = Vbuf::from_bytes(&data).unwrap();
        assert_eq!(5, vbuf.version);
        assert_eq!(VbufFlags::DYNAMIC | VbufFlags::DIFFERENCED_VERTICES, vbuf.flags);
        assert_eq!(ReferenceKind::Private, vbuf.swizzle_info.kind());
        assert_eq!(Some(1), vbuf.swizzle_info.index());
        assert_eq!(1, vbuf.vertex_count(12));
        assert_eq!(Vector3::new(1.0, 2.0, -1.0), vbuf.read_vector3(0, 12, 0).unwrap());
        assert_eq!(-1.0, vbuf.read_f32(0, 12, 8).unwrap());
        assert_eq!(data.to_vec(), vbuf.to_bytes().unwrap());
    }

    #[test]
    fn unknown_flags_kept() {
        let data = hex!(56425546 05000000 00010000 00000000);
        let vbuf = Vbuf::from_bytes(&data).unwrap();
        assert_eq!(0x100, vbuf.flags.bits());
        assert!(vbuf.buffer.is_empty());
        assert_eq!(data.to_vec(), vbuf.to_bytes().unwrap());
    }

    #[test]
    fn out_of_range_reads() {
        let vbuf = Vbuf {
            version: 5,
            flags: VbufFlags::empty(),
            swizzle_info: ChunkReference::NONE,
            buffer: vec![0; 12],
        };
        assert_eq!(0, vbuf.vertex_count(0));
        assert!(vbuf.read_vector3(0, 12, 0).is_ok());
        assert!(vbuf.read_vector3(1, 12, 0).is_err());
        assert!(vbuf.read_f32(0, 12, 10).is_err());
        assert!(vbuf.read_f32(0, 4, usize::MAX).is_err());
        assert!(vbuf.read_vector3(usize::MAX / 12, 12, 0).is_err());
    }

    #[test]
    fn set_then_decode() {
        let vrtf = position_uv();
        let vertices = vec![
            Vertex {
                elements: vec![
                    VertexElement::Position(Vector3::new(1.0, 2.0, 3.0)),
                    VertexElement::Uv(Vector2 { x: 0.5, y: 0.5 }),
                ],
            },
            Vertex {
                elements: vec![
                    VertexElement::Position(Vector3::new(-1.0, 0.0, 0.0)),
                    VertexElement::Uv(Vector2 { x: 1.0, y: 0.0 }),
                ],
            },
        ];
        let mut vbuf = Vbuf {
            version: 5,
            flags: VbufFlags::empty(),
            swizzle_info: ChunkReference::NONE,
            buffer: Vec::new(),
        };
        vbuf.set_vertices(&vrtf, &vertices).unwrap();
        assert_eq!(40, vbuf.buffer.len());
        assert_eq!(0.5, vbuf.read_f32(0, 20, 12).unwrap());
        assert_eq!(vertices, vbuf.decode_vertices(&vrtf).unwrap());
    }

    #[test]
    fn set_vertices_mismatch() {
        let mut vbuf = Vbuf {
            version: 5,
            flags: VbufFlags::empty(),
            swizzle_info: ChunkReference::NONE,
            buffer: Vec::new(),
        };
        let vertices =
            vec![Vertex { elements: vec![VertexElement::Position(Vector3::default())] }];
        assert!(vbuf.set_vertices(&position_uv(), &vertices).is_err());
    }
}
