use std::{
    fmt::{Debug, Formatter},
    io::{Cursor, Seek, Write},
};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_bool32, read_count, read_tag, write_bool32, write_count},
        reference::ChunkReference,
        FourCC, TgiBlock, Vector2, Vector3, Vector4,
    },
    util::read::read_vec,
    Error, Result,
};

// Shader parameters
pub const K_CHUNK_MTNF: FourCC = FourCC(*b"MTNF");
pub const K_CHUNK_MTRL: FourCC = FourCC(*b"MTRL");

/// Shader name hash. Zero means no shader.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ShaderType(pub u32);

impl ShaderType {
    pub const NONE: Self = Self(0);
    pub const ADDITIVE: Self = Self(0x5AF16731);
    pub const BASIN_WATER: Self = Self(0x6AAD2AD5);
    pub const FOLIAGE: Self = Self(0x4549E22E);
    pub const FULL_BRIGHT: Self = Self(0x14FA335E);
    pub const GLASS_FOR_OBJECTS: Self = Self(0x492ECA7C);
    pub const IMPOSTOR_WATER: Self = Self(0x277CF8EB);
    pub const INSTANCED: Self = Self(0x0CB82EB8);
    pub const PAINTING: Self = Self(0xAA495821);
    pub const PHONG: Self = Self(0xB9105A6D);
    pub const PHONG_ALPHA: Self = Self(0xD9429C93);
    pub const SIM_EYELASHES: Self = Self(0x9D9DA161);
    pub const SIM_EYES: Self = Self(0xCF8A70B4);
    pub const SIM_GLASS: Self = Self(0x5EDA9CDE);
    pub const SIM_HAIR: Self = Self(0x84FD7152);
    pub const SIM_SKIN: Self = Self(0x548394B9);
    pub const SUBTRACTIVE: Self = Self(0x0B272CC5);

    /// FNV-1 32-bit hash of the lowercased shader name.
    pub fn from_name(name: &str) -> Self {
        let hash = name.bytes().fold(0x811C9DC5u32, |hash, b| {
            hash.wrapping_mul(0x01000193) ^ b.to_ascii_lowercase() as u32
        });
        Self(hash)
    }

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::NONE => "None",
            Self::ADDITIVE => "Additive",
            Self::BASIN_WATER => "BasinWater",
            Self::FOLIAGE => "Foliage",
            Self::FULL_BRIGHT => "FullBright",
            Self::GLASS_FOR_OBJECTS => "GlassForObjects",
            Self::IMPOSTOR_WATER => "ImpostorWater",
            Self::INSTANCED => "Instanced",
            Self::PAINTING => "Painting",
            Self::PHONG => "Phong",
            Self::PHONG_ALPHA => "PhongAlpha",
            Self::SIM_EYELASHES => "SimEyelashes",
            Self::SIM_EYES => "SimEyes",
            Self::SIM_GLASS => "SimGlass",
            Self::SIM_HAIR => "SimHair",
            Self::SIM_SKIN => "SimSkin",
            Self::SUBTRACTIVE => "Subtractive",
            _ => return None,
        })
    }
}

impl Debug for ShaderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "ShaderType({:#010X})", self.0),
        }
    }
}

/// Shader parameter name hash.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FieldType(pub u32);

impl Debug for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldType({:#010X})", self.0)
    }
}

const DATA_TYPE_FLOAT: u32 = 1;
const DATA_TYPE_INT: u32 = 2;
const DATA_TYPE_BOOL: u32 = 3;
const DATA_TYPE_TEXTURE: u32 = 4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShaderValue {
    Float(f32),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Int(i32),
    Bool(bool),
    Texture(ChunkReference),
    TextureKey(TgiBlock),
}

impl ShaderValue {
    /// (data type, element count) as stored in the entry header.
    pub fn header(&self) -> (u32, usize) {
        match self {
            Self::Float(_) => (DATA_TYPE_FLOAT, 1),
            Self::Vector2(_) => (DATA_TYPE_FLOAT, 2),
            Self::Vector3(_) => (DATA_TYPE_FLOAT, 3),
            Self::Vector4(_) => (DATA_TYPE_FLOAT, 4),
            Self::Int(_) => (DATA_TYPE_INT, 1),
            Self::Bool(_) => (DATA_TYPE_BOOL, 1),
            Self::Texture(_) => (DATA_TYPE_TEXTURE, 1),
            Self::TextureKey(_) => (DATA_TYPE_TEXTURE, 4),
        }
    }

    /// Every element is four bytes wide.
    pub fn byte_size(&self) -> usize { self.header().1 * 4 }

    fn read(reader: &mut Cursor<&[u8]>, data_type: u32, count: usize) -> Result<Self> {
        Ok(match (data_type, count) {
            (DATA_TYPE_FLOAT, 1) => Self::Float(reader.read_le()?),
            (DATA_TYPE_FLOAT, 2) => Self::Vector2(reader.read_le()?),
            (DATA_TYPE_FLOAT, 3) => Self::Vector3(reader.read_le()?),
            (DATA_TYPE_FLOAT, 4) => Self::Vector4(reader.read_le()?),
            (DATA_TYPE_INT, 1) => Self::Int(reader.read_le()?),
            (DATA_TYPE_BOOL, 1) => Self::Bool(read_bool32(reader, K_CHUNK_MTNF, "bool")?),
            (DATA_TYPE_TEXTURE, 1) => Self::Texture(reader.read_le()?),
            (DATA_TYPE_TEXTURE, 4) => Self::TextureKey(reader.read_le()?),
            _ => {
                return Err(Error::InvalidData {
                    chunk: K_CHUNK_MTNF,
                    message: format!("unsupported data type {data_type} with {count} elements"),
                })
            }
        })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::Float(v) => writer.write_le(v)?,
            Self::Vector2(v) => writer.write_le(v)?,
            Self::Vector3(v) => writer.write_le(v)?,
            Self::Vector4(v) => writer.write_le(v)?,
            Self::Int(v) => writer.write_le(v)?,
            Self::Bool(v) => write_bool32(writer, *v)?,
            Self::Texture(v) => writer.write_le(v)?,
            Self::TextureKey(v) => writer.write_le(v)?,
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShaderDataEntry {
    pub field: FieldType,
    pub value: ShaderValue,
}

/// An MTNF or MTRL shader parameter block.
#[derive(Clone, Debug, PartialEq)]
pub enum ShaderData {
    Table { tag: FourCC, unknown1: u32, entries: Vec<ShaderDataEntry> },
    /// Bytes that did not parse as a table that writes back identically, kept verbatim.
    Opaque(Vec<u8>),
}

const TABLE_HEADER_SIZE: usize = 16;
const ENTRY_HEADER_SIZE: usize = 16;

impl ShaderData {
    /// Parses a complete block. Never fails; blocks that are not a well formed table are kept
    /// as [`ShaderData::Opaque`].
    pub fn from_bytes(data: &[u8]) -> Self {
        let table = Self::read_table(data).and_then(|table| {
            let bytes = table.to_bytes()?;
            if bytes == data {
                Ok(table)
            } else {
                Err(Error::InvalidData {
                    chunk: K_CHUNK_MTNF,
                    message: "table does not re-encode to its input".to_string(),
                })
            }
        });
        match table {
            Ok(table) => table,
            Err(e) => {
                log::warn!("Keeping {} byte shader block as opaque data: {e}", data.len());
                Self::Opaque(data.to_vec())
            }
        }
    }

    fn read_table(data: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(data);
        let tag = read_tag(&mut reader, &[K_CHUNK_MTNF, K_CHUNK_MTRL])?;
        let unknown1 = reader.read_le()?;
        let _data_length: u32 = reader.read_le()?;
        let entry_count = read_count(&mut reader, tag, "entry")?;
        let headers: Vec<[u32; 4]> = read_vec(&mut reader, entry_count)?;
        let mut entries = Vec::with_capacity(headers.len());
        for [field, data_type, count, offset] in headers {
            let count = usize::try_from(count as i32).map_err(|_| Error::InvalidCount {
                chunk: tag,
                field: "element",
                count: count as i32 as i64,
            })?;
            reader.set_position(offset as u64);
            let value = ShaderValue::read(&mut reader, data_type, count)?;
            entries.push(ShaderDataEntry { field: FieldType(field), value });
        }
        Ok(Self::Table { tag, unknown1, entries })
    }

    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::Table { tag, unknown1, entries } => {
                let data_length: usize = entries.iter().map(|e| e.value.byte_size()).sum();
                writer.write_le(tag)?;
                writer.write_le(unknown1)?;
                write_count(writer, *tag, "data length", data_length)?;
                write_count(writer, *tag, "entry", entries.len())?;
                let mut offset = TABLE_HEADER_SIZE + ENTRY_HEADER_SIZE * entries.len();
                for entry in entries {
                    let (data_type, count) = entry.value.header();
                    writer.write_le(&entry.field.0)?;
                    writer.write_le(&data_type)?;
                    writer.write_le(&(count as u32))?;
                    writer.write_le(&(offset as u32))?;
                    offset += entry.value.byte_size();
                }
                for entry in entries {
                    entry.value.write(writer)?;
                }
            }
            Self::Opaque(data) => writer.write_all(data)?,
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Cursor::new(Vec::new());
        self.write(&mut writer)?;
        Ok(writer.into_inner())
    }

    pub fn tag(&self) -> Option<FourCC> {
        match self {
            Self::Table { tag, .. } => Some(*tag),
            Self::Opaque(data) => super::peek_four_cc(data),
        }
    }

    pub fn entries(&self) -> &[ShaderDataEntry] {
        match self {
            Self::Table { entries, .. } => entries,
            Self::Opaque(_) => &[],
        }
    }

    pub fn get(&self, field: FieldType) -> Option<&ShaderValue> {
        self.entries().iter().find(|e| e.field == field).map(|e| &e.value)
    }

    pub fn get_float(&self, field: FieldType) -> Option<f32> {
        match self.get(field) {
            Some(ShaderValue::Float(v)) => Some(*v),
            _ => None,
        }
    }
}
