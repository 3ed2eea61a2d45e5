use std::io::{Read, Seek, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_bool8, read_count, read_tag, write_bool8, write_count, RcolChunk},
        FourCC, Vector3,
    },
    util::read::read_vec,
    Error, Result,
};

// Slot rig
pub const K_CHUNK_RSLT: FourCC = FourCC(*b"RSLT");

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PartTransform {
    pub row_x: Vector3,
    pub coord_x: f32,
    pub row_y: Vector3,
    pub coord_y: f32,
    pub row_z: Vector3,
    pub coord_z: f32,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SlotOffset {
    pub slot_index: i32,
    pub position: Vector3,
    pub rotation: Vector3,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Part {
    pub slot_name_hash: u32,
    pub bone_name_hash: u32,
    pub transform: PartTransform,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContainerPart {
    pub part: Part,
    pub slot_size: u8,
    pub slot_type_set: u64,
    pub direction_locked: bool,
    pub legacy_hash: u32,
}

/// A row type of a slot category. Categories store their rows column by column; `Extra` holds
/// the columns that sit between the bone hashes and the transforms.
pub trait SlotPart: Sized {
    type Extra;

    fn part(&self) -> &Part;

    fn from_columns(part: Part, extra: Self::Extra) -> Self;

    fn read_extra<R: Read + Seek>(reader: &mut R, count: usize) -> Result<Vec<Self::Extra>>;

    fn write_extra<W: Write + Seek>(writer: &mut W, rows: &[Self]) -> Result<()>;
}

impl SlotPart for Part {
    type Extra = ();

    fn part(&self) -> &Part { self }

    fn from_columns(part: Part, _: ()) -> Self { part }

    fn read_extra<R: Read + Seek>(_: &mut R, count: usize) -> Result<Vec<()>> { Ok(vec![(); count]) }

    fn write_extra<W: Write + Seek>(_: &mut W, _: &[Self]) -> Result<()> { Ok(()) }
}

impl SlotPart for ContainerPart {
    type Extra = (u8, u64, bool, u32);

    fn part(&self) -> &Part { &self.part }

    fn from_columns(part: Part, extra: Self::Extra) -> Self {
        let (slot_size, slot_type_set, direction_locked, legacy_hash) = extra;
        Self { part, slot_size, slot_type_set, direction_locked, legacy_hash }
    }

    fn read_extra<R: Read + Seek>(reader: &mut R, count: usize) -> Result<Vec<Self::Extra>> {
        let sizes: Vec<u8> = read_vec(reader, count)?;
        let type_sets: Vec<u64> = read_vec(reader, count)?;
        let locked = (0..count)
            .map(|_| read_bool8(reader, K_CHUNK_RSLT, "direction locked"))
            .collect::<Result<Vec<_>>>()?;
        let legacy_hashes: Vec<u32> = read_vec(reader, count)?;
        Ok(sizes
            .into_iter()
            .zip(type_sets)
            .zip(locked)
            .zip(legacy_hashes)
            .map(|(((size, type_set), locked), legacy)| (size, type_set, locked, legacy))
            .collect())
    }

    fn write_extra<W: Write + Seek>(writer: &mut W, rows: &[Self]) -> Result<()> {
        for row in rows {
            writer.write_le(&row.slot_size)?;
        }
        for row in rows {
            writer.write_le(&row.slot_type_set)?;
        }
        for row in rows {
            write_bool8(writer, row.direction_locked)?;
        }
        for row in rows {
            writer.write_le(&row.legacy_hash)?;
        }
        Ok(())
    }
}

/// One slot category. An empty category occupies no bytes at all, not even its offset count.
#[derive(Clone, Debug, PartialEq)]
pub struct PartList<P> {
    pub parts: Vec<P>,
    pub offsets: Vec<SlotOffset>,
}

impl<P> Default for PartList<P> {
    fn default() -> Self { Self { parts: Vec::new(), offsets: Vec::new() } }
}

impl<P: SlotPart> PartList<P> {
    pub fn find(&self, slot_name_hash: u32) -> Option<&P> {
        self.parts.iter().find(|p| p.part().slot_name_hash == slot_name_hash)
    }

    fn read<R: Read + Seek>(reader: &mut R, count: usize) -> Result<Self> {
        if count == 0 {
            return Ok(Self::default());
        }
        let slot_hashes: Vec<u32> = read_vec(reader, count)?;
        let bone_hashes: Vec<u32> = read_vec(reader, count)?;
        let extras = P::read_extra(reader, count)?;
        let transforms: Vec<PartTransform> = read_vec(reader, count)?;
        let offset_count = read_count(reader, K_CHUNK_RSLT, "slot offset")?;
        let offsets = read_vec(reader, offset_count)?;
        let parts = slot_hashes
            .into_iter()
            .zip(bone_hashes)
            .zip(transforms)
            .zip(extras)
            .map(|(((slot_name_hash, bone_name_hash), transform), extra)| {
                P::from_columns(Part { slot_name_hash, bone_name_hash, transform }, extra)
            })
            .collect();
        Ok(Self { parts, offsets })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W, category: &str) -> Result<()> {
        if self.parts.is_empty() {
            if !self.offsets.is_empty() {
                return Err(Error::InvalidData {
                    chunk: K_CHUNK_RSLT,
                    message: format!("{category} has slot offsets but no parts"),
                });
            }
            return Ok(());
        }
        for p in &self.parts {
            writer.write_le(&p.part().slot_name_hash)?;
        }
        for p in &self.parts {
            writer.write_le(&p.part().bone_name_hash)?;
        }
        P::write_extra(writer, &self.parts)?;
        for p in &self.parts {
            writer.write_le(&p.part().transform)?;
        }
        write_count(writer, K_CHUNK_RSLT, "slot offset", self.offsets.len())?;
        writer.write_le(&self.offsets)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rslt {
    pub version: u32,
    pub routes: PartList<Part>,
    pub containers: PartList<ContainerPart>,
    pub effects: PartList<Part>,
    pub inverse_kinematic_targets: PartList<Part>,
    pub cones: PartList<Part>,
}

impl RcolChunk for Rslt {
    const TAG: FourCC = K_CHUNK_RSLT;
    const RESOURCE_TYPE: u32 = 0xD3044521;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_RSLT])?;
        let version = reader.read_le()?;
        let route_count = read_count(reader, K_CHUNK_RSLT, "route")?;
        let container_count = read_count(reader, K_CHUNK_RSLT, "container")?;
        let effect_count = read_count(reader, K_CHUNK_RSLT, "effect")?;
        let ik_count = read_count(reader, K_CHUNK_RSLT, "inverse kinematic target")?;
        let cone_count = read_count(reader, K_CHUNK_RSLT, "cone")?;
        Ok(Self {
            version,
            routes: PartList::read(reader, route_count)?,
            containers: PartList::read(reader, container_count)?,
            effects: PartList::read(reader, effect_count)?,
            inverse_kinematic_targets: PartList::read(reader, ik_count)?,
            cones: PartList::read(reader, cone_count)?,
        })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&K_CHUNK_RSLT)?;
        writer.write_le(&self.version)?;
        write_count(writer, K_CHUNK_RSLT, "route", self.routes.parts.len())?;
        write_count(writer, K_CHUNK_RSLT, "container", self.containers.parts.len())?;
        write_count(writer, K_CHUNK_RSLT, "effect", self.effects.parts.len())?;
        write_count(
            writer,
            K_CHUNK_RSLT,
            "inverse kinematic target",
            self.inverse_kinematic_targets.parts.len(),
        )?;
        write_count(writer, K_CHUNK_RSLT, "cone", self.cones.parts.len())?;
        self.routes.write(writer, "routes")?;
        self.containers.write(writer, "containers")?;
        self.effects.write(writer, "effects")?;
        self.inverse_kinematic_targets.write(writer, "inverse kinematic targets")?;
        self.cones.write(writer, "cones")?;
        Ok(())
    }
}
