use std::io::{Read, Seek, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_count, read_tag, write_count, write_count_u8, RcolChunk},
        FourCC, TgiBlock,
    },
    util::read::read_vec,
    Error, Result,
};

// Footprint
pub const K_CHUNK_FTPT: FourCC = FourCC(*b"FTPT");

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PolygonPoint {
    pub x: f32,
    pub z: f32,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AreaBounds {
    pub min_x: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_z: f32,
}

#[binrw]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Area {
    pub name_hash: u32,
    pub priority: u8,
    pub area_type: u32,
    #[bw(try_calc = points.len().try_into())]
    pub point_count: u8,
    #[br(count = point_count)]
    pub points: Vec<PolygonPoint>,
    #[bw(try_calc = surface_types.len().try_into())]
    pub surface_type_count: u8,
    #[br(count = surface_type_count)]
    pub surface_types: Vec<u32>,
    pub bounds: AreaBounds,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HeightOverride {
    pub name_hash: u32,
    pub height: f32,
}

/// The two layouts a footprint can take, chosen by the type of its key.
#[derive(Clone, Debug, PartialEq)]
pub enum FootprintShape {
    Areas { footprint_areas: Vec<Area>, slot_areas: Vec<Area>, max_height: f32, min_height: f32 },
    HeightOverrides { min: Vec<HeightOverride>, max: Vec<HeightOverride> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ftpt {
    pub version: u32,
    pub key: TgiBlock,
    pub shape: FootprintShape,
}

impl Ftpt {
    pub fn has_height_overrides(&self) -> bool { self.key.resource_type != 0 }

    pub fn footprint_areas(&self) -> &[Area] {
        match &self.shape {
            FootprintShape::Areas { footprint_areas, .. } => footprint_areas,
            FootprintShape::HeightOverrides { .. } => &[],
        }
    }

    pub fn slot_areas(&self) -> &[Area] {
        match &self.shape {
            FootprintShape::Areas { slot_areas, .. } => slot_areas,
            FootprintShape::HeightOverrides { .. } => &[],
        }
    }

    pub fn min_height_overrides(&self) -> &[HeightOverride] {
        match &self.shape {
            FootprintShape::HeightOverrides { min, .. } => min,
            FootprintShape::Areas { .. } => &[],
        }
    }

    pub fn max_height_overrides(&self) -> &[HeightOverride] {
        match &self.shape {
            FootprintShape::HeightOverrides { max, .. } => max,
            FootprintShape::Areas { .. } => &[],
        }
    }
}

fn read_overrides<R: Read + Seek>(reader: &mut R, field: &'static str) -> Result<Vec<HeightOverride>> {
    let count = read_count(reader, K_CHUNK_FTPT, field)?;
    Ok(read_vec(reader, count)?)
}

fn read_areas<R: Read + Seek>(reader: &mut R) -> Result<Vec<Area>> {
    let count: u8 = reader.read_le()?;
    Ok(read_vec(reader, count as usize)?)
}

impl RcolChunk for Ftpt {
    const TAG: FourCC = K_CHUNK_FTPT;
    const RESOURCE_TYPE: u32 = 0xD382BF57;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_FTPT])?;
        let version = reader.read_le()?;
        let key: TgiBlock = reader.read_le()?;
        let shape = if key.resource_type != 0 {
            let min = read_overrides(reader, "minimum height override")?;
            let max = read_overrides(reader, "maximum height override")?;
            FootprintShape::HeightOverrides { min, max }
        } else {
            let footprint_areas = read_areas(reader)?;
            let slot_areas = read_areas(reader)?;
            let max_height = reader.read_le()?;
            let min_height = reader.read_le()?;
            FootprintShape::Areas { footprint_areas, slot_areas, max_height, min_height }
        };
        Ok(Self { version, key, shape })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&K_CHUNK_FTPT)?;
        writer.write_le(&self.version)?;
        writer.write_le(&self.key)?;
        match (&self.shape, self.has_height_overrides()) {
            (FootprintShape::HeightOverrides { min, max }, true) => {
                write_count(writer, K_CHUNK_FTPT, "minimum height override", min.len())?;
                writer.write_le(min)?;
                write_count(writer, K_CHUNK_FTPT, "maximum height override", max.len())?;
                writer.write_le(max)?;
            }
            (
                FootprintShape::Areas { footprint_areas, slot_areas, max_height, min_height },
                false,
            ) => {
                write_count_u8(writer, K_CHUNK_FTPT, "footprint area", footprint_areas.len())?;
                writer.write_le(footprint_areas)?;
                write_count_u8(writer, K_CHUNK_FTPT, "slot area", slot_areas.len())?;
                writer.write_le(slot_areas)?;
                writer.write_le(max_height)?;
                writer.write_le(min_height)?;
            }
            _ => {
                return Err(Error::InvalidData {
                    chunk: K_CHUNK_FTPT,
                    message: format!(
                        "shape does not match key type {:#010x}",
                        self.key.resource_type
                    ),
                })
            }
        }
        Ok(())
    }
}
