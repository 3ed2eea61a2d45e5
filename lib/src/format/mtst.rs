use std::{
    fmt::{Debug, Formatter},
    io::{Read, Seek, Write},
};

use binrw::{binrw, BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_count, read_tag, write_count, RcolChunk},
        reference::ChunkReference,
        FourCC,
    },
    Error, Result,
};

// Material set
pub const K_CHUNK_MTST: FourCC = FourCC(*b"MTST");

/// First version storing a variant per entry.
pub const MTST_VARIANT_VERSION: u32 = 0x300;

/// Material state name hash.
#[binrw]
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct MaterialState(pub u32);

impl MaterialState {
    pub const DEFAULT: Self = Self(0x2EA8FB98);
    pub const DIRTY: Self = Self(0xEEAB4327);
    pub const VERY_DIRTY: Self = Self(0x2E5DF9BB);
    pub const BURNT: Self = Self(0xC3867C32);
    pub const CLOGGED: Self = Self(0x257FB026);
    pub const CAR_LIGHTS_OFF: Self = Self(0xE4AF52C1);

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::DEFAULT => "Default",
            Self::DIRTY => "Dirty",
            Self::VERY_DIRTY => "VeryDirty",
            Self::BURNT => "Burnt",
            Self::CLOGGED => "Clogged",
            Self::CAR_LIGHTS_OFF => "CarLightsOff",
            _ => return None,
        })
    }
}

impl Debug for MaterialState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "MaterialState({:#010X})", self.0),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MtstEntry {
    pub matd: ChunkReference,
    pub state: MaterialState,
    /// Only stored from version 0x300.
    pub variant: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mtst {
    pub version: u32,
    pub name_hash: u32,
    pub default_material: ChunkReference,
    pub entries: Vec<MtstEntry>,
}

impl Mtst {
    pub fn has_variants(&self) -> bool { self.version >= MTST_VARIANT_VERSION }

    pub fn find_state(&self, state: MaterialState) -> Option<&MtstEntry> {
        self.entries.iter().find(|e| e.state == state)
    }
}

impl RcolChunk for Mtst {
    const TAG: FourCC = K_CHUNK_MTST;
    const RESOURCE_TYPE: u32 = 0x02019972;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_MTST])?;
        let version: u32 = reader.read_le()?;
        let name_hash = reader.read_le()?;
        let default_material = reader.read_le()?;
        let count = read_count(reader, K_CHUNK_MTST, "entry")?;
        let mut entries = Vec::with_capacity(count.min(0x1000));
        for _ in 0..count {
            let matd = reader.read_le()?;
            let state = reader.read_le()?;
            let variant =
                if version >= MTST_VARIANT_VERSION { Some(reader.read_le()?) } else { None };
            entries.push(MtstEntry { matd, state, variant });
        }
        Ok(Self { version, name_hash, default_material, entries })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&K_CHUNK_MTST)?;
        writer.write_le(&self.version)?;
        writer.write_le(&self.name_hash)?;
        writer.write_le(&self.default_material)?;
        write_count(writer, K_CHUNK_MTST, "entry", self.entries.len())?;
        for (i, entry) in self.entries.iter().enumerate() {
            writer.write_le(&entry.matd)?;
            writer.write_le(&entry.state)?;
            match (entry.variant, self.has_variants()) {
                (Some(variant), true) => writer.write_le(&variant)?,
                (None, false) => {}
                _ => {
                    return Err(Error::InvalidData {
                        chunk: K_CHUNK_MTST,
                        message: format!(
                            "entry {i} variant does not match version {:#x}",
                            self.version
                        ),
                    })
                }
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

    #[test]
    fn read_type300() {
        let data = hex!(
            4d545354 00030000 78563412 01000010 01000000
            01000010 bbf95d2e 64000000
        );
        let mtst = Mtst::from_bytes(&data).unwrap();
        assert_eq!(
            vec![MtstEntry {
                matd: ChunkReference(0x10000001),
                state: MaterialState::VERY_DIRTY,
                variant: Some(100)
            }],
            mtst.entries
        );
        assert!(mtst.find_state(MaterialState::VERY_DIRTY).is_some());
        assert!(mtst.find_state(MaterialState::BURNT).is_none());
        assert_eq!(data.to_vec(), mtst.to_bytes().unwrap());
    }

    #[test]
    fn read_type200() {
        let data = hex!(
            4d545354 00020000 78563412 01000010 01000000
            01000010 bbf95d2e
        );
        let mtst = Mtst::from_bytes(&data).unwrap();
        assert_eq!(None, mtst.entries[0].variant);
        assert_eq!(MaterialState::VERY_DIRTY, mtst.entries[0].state);
        let bytes = mtst.to_bytes().unwrap();
        assert_eq!(data.len(), bytes.len());
        assert_eq!(data.to_vec(), bytes);
    }

    #[test]
    fn variant_mismatch() {
        let mut mtst = Mtst::from_bytes(&hex!(
            4d545354 00020000 00000000 00000000 01000000
            01000010 98fba82e
        ))
        .unwrap();
        mtst.entries[0].variant = Some(1);
        assert!(mtst.to_bytes().is_err());
    }

    #[test]
    fn unnamed_state() {
        assert_eq!("VeryDirty", format!("{:?}", MaterialState::VERY_DIRTY));
        assert_eq!("MaterialState(0x00000001)", format!("{:?}", MaterialState(1)));
    }
}
