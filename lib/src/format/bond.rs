use std::io::{Read, Seek, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_count, write_count, RcolChunk},
        FourCC, Vector3, Vector4,
    },
    util::read::read_vec,
    Result,
};

// Slot adjustments. Never written to the stream.
pub const K_CHUNK_BOND: FourCC = FourCC(*b"BOND");

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SlotAdjustment {
    pub slot_name_hash: u32,
    pub offset: Vector3,
    pub scale: Vector3,
    pub quaternion: Vector4,
}

/// Slot adjustment list. Unlike every other chunk the data starts directly with the version.
#[derive(Clone, Debug, PartialEq)]
pub struct Bond {
    pub version: u32,
    pub adjustments: Vec<SlotAdjustment>,
}

impl Bond {
    pub fn find_adjustment(&self, slot_name_hash: u32) -> Option<&SlotAdjustment> {
        self.adjustments.iter().find(|a| a.slot_name_hash == slot_name_hash)
    }
}

impl RcolChunk for Bond {
    const TAG: FourCC = K_CHUNK_BOND;
    const RESOURCE_TYPE: u32 = 0x0355E0A6;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let version = reader.read_le()?;
        let count = read_count(reader, K_CHUNK_BOND, "adjustment")?;
        let adjustments = read_vec(reader, count)?;
        Ok(Self { version, adjustments })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&self.version)?;
        write_count(writer, K_CHUNK_BOND, "adjustment", self.adjustments.len())?;
        writer.write_le(&self.adjustments)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;

    const BOND: [u8; 52] = hex!(
        04000000 01000000
        78563412
        00000000 00000000 00000000
        0000803f 0000803f 0000803f
        00000000 00000000 00000000 0000803f
    );

    #[test]
    fn read_without_tag() {
        let bond = Bond::from_bytes(&BOND).unwrap();
        assert_eq!(4, bond.version);
        assert_eq!(
            vec![SlotAdjustment {
                slot_name_hash: 0x12345678,
                offset: Vector3::default(),
                scale: Vector3::new(1.0, 1.0, 1.0),
                quaternion: Vector4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
            }],
            bond.adjustments
        );
        let bytes = bond.to_bytes().unwrap();
        assert_eq!(BOND.to_vec(), bytes);
        assert_ne!(b"BOND", &bytes[..4]);
    }

    #[test]
    fn find_adjustment() {
        let bond = Bond::from_bytes(&BOND).unwrap();
        assert!(bond.find_adjustment(0x12345678).is_some());
        assert!(bond.find_adjustment(0).is_none());
    }
}
