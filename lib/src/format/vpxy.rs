use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_bool8, read_tag, write_bool8, write_count_u8, RcolChunk},
        BoundingBox, FourCC, TgiBlock,
    },
    util::read::{read_bytes, read_vec},
    Error, Result,
};

// Proxy
pub const K_CHUNK_VPXY: FourCC = FourCC(*b"VPXY");

pub const VPXY_VERSION: u32 = 4;
/// Marker byte between the entries and the bounds.
pub const TC02: u8 = 0x02;

/// TGI offsets are relative to the end of the offset field.
const TGI_OFFSET_BASE: u64 = 12;

#[derive(Clone, Debug, PartialEq)]
pub enum VpxyEntry {
    /// Type byte 0x00
    Indices { entry_id: u8, tgi_indices: Vec<u8> },
    /// Type byte 0x01
    Single { tgi_index: i32 },
}

impl VpxyEntry {
    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        match reader.read_le::<u8>()? {
            0x00 => {
                let entry_id = reader.read_le()?;
                let count: u8 = reader.read_le()?;
                Ok(Self::Indices { entry_id, tgi_indices: read_bytes(reader, count as usize)? })
            }
            0x01 => Ok(Self::Single { tgi_index: reader.read_le()? }),
            value => Err(Error::InvalidValue {
                chunk: K_CHUNK_VPXY,
                field: "entry type",
                value: value as u64,
            }),
        }
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::Indices { entry_id, tgi_indices } => {
                writer.write_le(&0u8)?;
                writer.write_le(entry_id)?;
                write_count_u8(writer, K_CHUNK_VPXY, "TGI index", tgi_indices.len())?;
                writer.write_all(tgi_indices)?;
            }
            Self::Single { tgi_index } => {
                writer.write_le(&1u8)?;
                writer.write_le(tgi_index)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vpxy {
    pub entries: Vec<VpxyEntry>,
    pub bounds: BoundingBox,
    pub unused: [u8; 4],
    /// Present exactly when the proxy is modular.
    pub ftpt_index: Option<i32>,
    pub tgi_blocks: Vec<TgiBlock>,
}

impl Vpxy {
    pub fn version(&self) -> u32 { VPXY_VERSION }

    pub fn is_modular(&self) -> bool { self.ftpt_index.is_some() }
}

impl RcolChunk for Vpxy {
    const TAG: FourCC = K_CHUNK_VPXY;
    const RESOURCE_TYPE: u32 = 0x736884F1;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let start = reader.stream_position()?;
        read_tag(reader, &[K_CHUNK_VPXY])?;
        let version: u32 = reader.read_le()?;
        if version != VPXY_VERSION {
            return Err(Error::InvalidVersion { chunk: K_CHUNK_VPXY, version });
        }
        let tgi_offset: u32 = reader.read_le()?;
        let tgi_size: u32 = reader.read_le()?;
        let entry_count: u8 = reader.read_le()?;
        let entries =
            (0..entry_count).map(|_| VpxyEntry::read(reader)).collect::<Result<Vec<_>>>()?;
        let tc02: u8 = reader.read_le()?;
        if tc02 != TC02 {
            return Err(Error::InvalidValue {
                chunk: K_CHUNK_VPXY,
                field: "TC02",
                value: tc02 as u64,
            });
        }
        let bounds = reader.read_le()?;
        let unused = reader.read_le()?;
        let ftpt_index = if read_bool8(reader, K_CHUNK_VPXY, "modular")? {
            Some(reader.read_le()?)
        } else {
            None
        };

        let tgi_pos = reader.stream_position()?;
        if tgi_pos != start + TGI_OFFSET_BASE + tgi_offset as u64 {
            return Err(Error::InvalidData {
                chunk: K_CHUNK_VPXY,
                message: format!(
                    "TGI offset {tgi_offset:#x} does not point at the end of the body ({:#x})",
                    tgi_pos - start - TGI_OFFSET_BASE
                ),
            });
        }
        if tgi_size as usize % TgiBlock::SIZE != 0 {
            return Err(Error::InvalidData {
                chunk: K_CHUNK_VPXY,
                message: format!("TGI size {tgi_size:#x} is not a multiple of 16"),
            });
        }
        let tgi_blocks = read_vec(reader, tgi_size as usize / TgiBlock::SIZE)?;
        Ok(Self { entries, bounds, unused, ftpt_index, tgi_blocks })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let start = writer.stream_position()?;
        writer.write_le(&K_CHUNK_VPXY)?;
        writer.write_le(&VPXY_VERSION)?;
        writer.write_le(&0u32)?;
        let tgi_size = u32::try_from(self.tgi_blocks.len() * TgiBlock::SIZE).map_err(|_| {
            Error::InvalidCount {
                chunk: K_CHUNK_VPXY,
                field: "TGI block",
                count: self.tgi_blocks.len() as i64,
            }
        })?;
        writer.write_le(&tgi_size)?;
        write_count_u8(writer, K_CHUNK_VPXY, "entry", self.entries.len())?;
        for entry in &self.entries {
            entry.write(writer)?;
        }
        writer.write_le(&TC02)?;
        writer.write_le(&self.bounds)?;
        writer.write_le(&self.unused)?;
        write_bool8(writer, self.is_modular())?;
        if let Some(ftpt_index) = self.ftpt_index {
            writer.write_le(&ftpt_index)?;
        }

        let tgi_pos = writer.stream_position()?;
        writer.seek(SeekFrom::Start(start + 8))?;
        writer.write_le(&((tgi_pos - start - TGI_OFFSET_BASE) as u32))?;
        writer.seek(SeekFrom::Start(tgi_pos))?;
        writer.write_le(&self.tgi_blocks)?;
        Ok(())
    }
}
