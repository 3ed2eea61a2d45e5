use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};
use strum::FromRepr;

use crate::{
    format::{
        chunk::{read_count, read_tag, write_count, RcolChunk},
        mtnf::{ShaderData, ShaderType},
        vertex::{ElementKind, Vertex, VertexElement},
        FourCC, TgiBlock, Vector2,
    },
    util::read::{read_bytes, read_vec},
    Error, Result,
};

// Geometry
pub const K_CHUNK_GEOM: FourCC = FourCC(*b"GEOM");

/// TGI offsets are relative to the end of the offset field.
const TGI_OFFSET_BASE: u64 = 12;

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromRepr)]
pub enum GeomUsage {
    Position = 1,
    Normal = 2,
    Uv = 3,
    BoneAssignment = 4,
    Weights = 5,
    TangentNormal = 6,
    TagValue = 7,
    VertexId = 10,
}

impl GeomUsage {
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Position => ElementKind::Position,
            Self::Normal => ElementKind::Normal,
            Self::Uv => ElementKind::Uv,
            Self::BoneAssignment => ElementKind::BlendIndices,
            Self::Weights => ElementKind::Weights,
            Self::TangentNormal => ElementKind::Tangent,
            Self::TagValue => ElementKind::Colour,
            Self::VertexId => ElementKind::VertexId,
        }
    }
}

#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromRepr)]
pub enum GeomDataType {
    Float = 1,
    UByte = 2,
    Argb = 3,
    UInt32 = 4,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexFormat {
    pub usage: GeomUsage,
    pub data_type: GeomDataType,
    pub size: u8,
}

impl VertexFormat {
    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let usage: u32 = reader.read_le()?;
        let data_type: u32 = reader.read_le()?;
        let size = reader.read_le()?;
        Ok(Self {
            usage: GeomUsage::from_repr(usage).ok_or(Error::InvalidValue {
                chunk: K_CHUNK_GEOM,
                field: "usage",
                value: usage as u64,
            })?,
            data_type: GeomDataType::from_repr(data_type).ok_or(Error::InvalidValue {
                chunk: K_CHUNK_GEOM,
                field: "data type",
                value: data_type as u64,
            })?,
            size,
        })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&(self.usage as u32))?;
        writer.write_le(&(self.data_type as u32))?;
        writer.write_le(&self.size)?;
        Ok(())
    }
}

#[binrw]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnknownThing {
    pub unknown1: u32,
    #[bw(try_calc = points.len().try_into())]
    pub point_count: u32,
    #[br(count = point_count)]
    pub points: Vec<Vector2>,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct UnknownThing2 {
    pub unknown1: u32,
    pub unknown2: u16,
    pub unknown3: u16,
    pub unknown4: u16,
    pub unknown5: [f32; 13],
    pub unknown18: u8,
}

/// Sections whose presence depends on the chunk version.
#[derive(Clone, Debug, PartialEq)]
pub enum GeomVersion {
    V5 { skin_index: i32 },
    V12 { unknown_things: Vec<UnknownThing>, unknown_things2: Vec<UnknownThing2> },
}

impl GeomVersion {
    pub fn number(&self) -> u32 {
        match self {
            Self::V5 { .. } => 5,
            Self::V12 { .. } => 12,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Geom {
    pub shader: ShaderType,
    /// Inline shader parameter block, present exactly when `shader` is set.
    pub mtnf_data: Option<Vec<u8>>,
    pub merge_group: u32,
    pub sort_order: u32,
    pub vertex_formats: Vec<VertexFormat>,
    pub vertices: Vec<Vertex>,
    pub faces: Vec<[u16; 3]>,
    pub version_data: GeomVersion,
    pub bone_hashes: Vec<u32>,
    pub tgi_blocks: Vec<TgiBlock>,
}

impl Geom {
    pub fn version(&self) -> u32 { self.version_data.number() }

    pub fn skin_index(&self) -> Option<i32> {
        match self.version_data {
            GeomVersion::V5 { skin_index } => Some(skin_index),
            GeomVersion::V12 { .. } => None,
        }
    }

    pub fn shader_data(&self) -> Option<ShaderData> {
        self.mtnf_data.as_deref().map(ShaderData::from_bytes)
    }

    fn read_vertex<R: Read + Seek>(&self, reader: &mut R) -> Result<Vertex> {
        let elements = self
            .vertex_formats
            .iter()
            .map(|f| VertexElement::read(reader, f.usage.kind(), f.size as usize))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Vertex { elements })
    }

    fn check_vertex(&self, index: usize, vertex: &Vertex) -> Result<()> {
        let matches = vertex.elements.len() == self.vertex_formats.len()
            && vertex
                .elements
                .iter()
                .zip(&self.vertex_formats)
                .all(|(e, f)| e.byte_size() == f.size as usize);
        if matches {
            Ok(())
        } else {
            Err(Error::InvalidData {
                chunk: K_CHUNK_GEOM,
                message: format!("vertex {index} does not match the vertex formats"),
            })
        }
    }
}

impl RcolChunk for Geom {
    const TAG: FourCC = K_CHUNK_GEOM;
    const RESOURCE_TYPE: u32 = 0x015A1849;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let start = reader.stream_position()?;
        read_tag(reader, &[K_CHUNK_GEOM])?;
        let version: u32 = reader.read_le()?;
        if version != 5 && version != 12 {
            return Err(Error::InvalidVersion { chunk: K_CHUNK_GEOM, version });
        }
        let tgi_offset: u32 = reader.read_le()?;
        let tgi_size: u32 = reader.read_le()?;
        let shader = ShaderType(reader.read_le()?);
        let mtnf_data = if shader != ShaderType::NONE {
            let len: u32 = reader.read_le()?;
            Some(read_bytes(reader, len as usize)?)
        } else {
            None
        };
        let merge_group = reader.read_le()?;
        let sort_order = reader.read_le()?;
        let vertex_count = read_count(reader, K_CHUNK_GEOM, "vertex")?;
        let format_count = read_count(reader, K_CHUNK_GEOM, "vertex format")?;
        let vertex_formats =
            (0..format_count).map(|_| VertexFormat::read(reader)).collect::<Result<Vec<_>>>()?;

        let mut geom = Self {
            shader,
            mtnf_data,
            merge_group,
            sort_order,
            vertex_formats,
            vertices: Vec::new(),
            faces: Vec::new(),
            version_data: GeomVersion::V5 { skin_index: 0 },
            bone_hashes: Vec::new(),
            tgi_blocks: Vec::new(),
        };
        geom.vertices = (0..vertex_count)
            .map(|_| geom.read_vertex(reader))
            .collect::<Result<Vec<_>>>()?;

        let size_count = read_count(reader, K_CHUNK_GEOM, "face point size")?;
        if size_count != 1 {
            return Err(Error::InvalidCount {
                chunk: K_CHUNK_GEOM,
                field: "face point size",
                count: size_count as i64,
            });
        }
        let point_size: u8 = reader.read_le()?;
        if point_size != 2 {
            return Err(Error::InvalidValue {
                chunk: K_CHUNK_GEOM,
                field: "face point size",
                value: point_size as u64,
            });
        }
        let point_count = read_count(reader, K_CHUNK_GEOM, "face point")?;
        if point_count % 3 != 0 {
            return Err(Error::InvalidCount {
                chunk: K_CHUNK_GEOM,
                field: "face point",
                count: point_count as i64,
            });
        }
        geom.faces = read_vec(reader, point_count / 3)?;

        geom.version_data = if version == 5 {
            GeomVersion::V5 { skin_index: reader.read_le()? }
        } else {
            let count = read_count(reader, K_CHUNK_GEOM, "unknown thing")?;
            let unknown_things = read_vec(reader, count)?;
            let count = read_count(reader, K_CHUNK_GEOM, "unknown thing 2")?;
            let unknown_things2 = read_vec(reader, count)?;
            GeomVersion::V12 { unknown_things, unknown_things2 }
        };
        let count = read_count(reader, K_CHUNK_GEOM, "bone hash")?;
        geom.bone_hashes = read_vec(reader, count)?;

        let tgi_pos = reader.stream_position()?;
        if tgi_pos != start + TGI_OFFSET_BASE + tgi_offset as u64 {
            return Err(Error::InvalidData {
                chunk: K_CHUNK_GEOM,
                message: format!(
                    "TGI offset {tgi_offset:#x} does not point at the end of the body ({:#x})",
                    tgi_pos - start - TGI_OFFSET_BASE
                ),
            });
        }
        if tgi_size as usize % TgiBlock::SIZE != 0 {
            return Err(Error::InvalidData {
                chunk: K_CHUNK_GEOM,
                message: format!("TGI size {tgi_size:#x} is not a multiple of 16"),
            });
        }
        geom.tgi_blocks = read_vec(reader, tgi_size as usize / TgiBlock::SIZE)?;
        Ok(geom)
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let start = writer.stream_position()?;
        writer.write_le(&K_CHUNK_GEOM)?;
        writer.write_le(&self.version())?;
        // Patched once the body is written
        writer.write_le(&0u32)?;
        let tgi_size = u32::try_from(self.tgi_blocks.len() * TgiBlock::SIZE).map_err(|_| {
            Error::InvalidCount {
                chunk: K_CHUNK_GEOM,
                field: "TGI block",
                count: self.tgi_blocks.len() as i64,
            }
        })?;
        writer.write_le(&tgi_size)?;
        writer.write_le(&self.shader.0)?;
        match (&self.mtnf_data, self.shader) {
            (None, ShaderType::NONE) => {}
            (Some(data), shader) if shader != ShaderType::NONE => {
                write_count(writer, K_CHUNK_GEOM, "MTNF length", data.len())?;
                writer.write_all(data)?;
            }
            _ => {
                return Err(Error::InvalidData {
                    chunk: K_CHUNK_GEOM,
                    message: "MTNF data must be present exactly when a shader is set".to_string(),
                })
            }
        }
        writer.write_le(&self.merge_group)?;
        writer.write_le(&self.sort_order)?;
        write_count(writer, K_CHUNK_GEOM, "vertex", self.vertices.len())?;
        write_count(writer, K_CHUNK_GEOM, "vertex format", self.vertex_formats.len())?;
        for format in &self.vertex_formats {
            format.write(writer)?;
        }
        for (i, vertex) in self.vertices.iter().enumerate() {
            self.check_vertex(i, vertex)?;
            for element in &vertex.elements {
                element.write(writer)?;
            }
        }
        writer.write_le(&1i32)?;
        writer.write_le(&2u8)?;
        write_count(writer, K_CHUNK_GEOM, "face point", self.faces.len() * 3)?;
        writer.write_le(&self.faces)?;
        match &self.version_data {
            GeomVersion::V5 { skin_index } => writer.write_le(skin_index)?,
            GeomVersion::V12 { unknown_things, unknown_things2 } => {
                write_count(writer, K_CHUNK_GEOM, "unknown thing", unknown_things.len())?;
                writer.write_le(unknown_things)?;
                write_count(writer, K_CHUNK_GEOM, "unknown thing 2", unknown_things2.len())?;
                writer.write_le(unknown_things2)?;
            }
        }
        write_count(writer, K_CHUNK_GEOM, "bone hash", self.bone_hashes.len())?;
        writer.write_le(&self.bone_hashes)?;

        let tgi_pos = writer.stream_position()?;
        writer.seek(SeekFrom::Start(start + 8))?;
        writer.write_le(&((tgi_pos - start - TGI_OFFSET_BASE) as u32))?;
        writer.seek(SeekFrom::Start(tgi_pos))?;
        writer.write_le(&self.tgi_blocks)?;
        Ok(())
    }
}
