use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinResult, BinWriterExt};

use crate::{
    format::{Vector2, Vector3},
    util::read::read_bytes,
};

/// What a vertex element means, independent of how a particular chunk encodes it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ElementKind {
    Position,
    Normal,
    Uv,
    BlendIndices,
    Weights,
    Tangent,
    Colour,
    VertexId,
    Other,
}

/// One decoded vertex attribute. The variant is chosen from the element kind and its size;
/// anything else is kept as raw bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexElement {
    Position(Vector3),
    Normal(Vector3),
    Uv(Vector2),
    BlendIndices([u8; 4]),
    Weights([f32; 4]),
    WeightBytes([u8; 4]),
    Tangent(Vector3),
    Colour(u32),
    VertexId(u32),
    Raw(Vec<u8>),
}

impl VertexElement {
    pub fn read<R: Read + Seek>(reader: &mut R, kind: ElementKind, size: usize) -> BinResult<Self> {
        Ok(match (kind, size) {
            (ElementKind::Position, 12) => Self::Position(reader.read_le()?),
            (ElementKind::Normal, 12) => Self::Normal(reader.read_le()?),
            (ElementKind::Tangent, 12) => Self::Tangent(reader.read_le()?),
            (ElementKind::Uv, 8) => Self::Uv(reader.read_le()?),
            (ElementKind::BlendIndices, 4) => Self::BlendIndices(reader.read_le()?),
            (ElementKind::Weights, 16) => Self::Weights(reader.read_le()?),
            (ElementKind::Weights, 4) => Self::WeightBytes(reader.read_le()?),
            (ElementKind::Colour, 4) => Self::Colour(reader.read_le()?),
            (ElementKind::VertexId, 4) => Self::VertexId(reader.read_le()?),
            _ => Self::Raw(read_bytes(reader, size)?),
        })
    }

    pub fn decode(kind: ElementKind, data: &[u8]) -> BinResult<Self> {
        Self::read(&mut std::io::Cursor::new(data), kind, data.len())
    }

    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> BinResult<()> {
        match self {
            Self::Position(v) | Self::Normal(v) | Self::Tangent(v) => writer.write_le(v),
            Self::Uv(v) => writer.write_le(v),
            Self::BlendIndices(v) | Self::WeightBytes(v) => writer.write_le(v),
            Self::Weights(v) => writer.write_le(v),
            Self::Colour(v) | Self::VertexId(v) => writer.write_le(v),
            Self::Raw(data) => writer.write_all(data).map_err(Into::into),
        }
    }

    pub fn byte_size(&self) -> usize {
        match self {
            Self::Position(_) | Self::Normal(_) | Self::Tangent(_) => 12,
            Self::Uv(_) => 8,
            Self::Weights(_) => 16,
            Self::BlendIndices(_) | Self::WeightBytes(_) | Self::Colour(_) | Self::VertexId(_) => 4,
            Self::Raw(data) => data.len(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub elements: Vec<VertexElement>,
}

impl Vertex {
    pub fn position(&self) -> Option<Vector3> {
        self.elements.iter().find_map(|e| match e {
            VertexElement::Position(v) => Some(*v),
            _ => None,
        })
    }

    pub fn uv(&self) -> Option<Vector2> {
        self.elements.iter().find_map(|e| match e {
            VertexElement::Uv(v) => Some(*v),
            _ => None,
        })
    }
}
