use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_count, read_tag, write_count, RcolChunk},
        FourCC, Matrix43,
    },
    util::read::read_vec,
    Error, Result,
};

// Skin controller
pub const K_CHUNK_SKIN: FourCC = FourCC(*b"SKIN");

pub const MAX_BONES: usize = 1000;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bone {
    pub name_hash: u32,
    pub inverse_bind_pose: Matrix43,
}

/// Bones are stored as all name hashes followed by all matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct Skin {
    pub version: u32,
    pub bones: Vec<Bone>,
}

impl Skin {
    pub fn find_bone(&self, name_hash: u32) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name_hash == name_hash)
    }
}

fn check_bone_count(count: usize) -> Result<()> {
    if count > MAX_BONES {
        return Err(Error::InvalidCount { chunk: K_CHUNK_SKIN, field: "bone", count: count as i64 });
    }
    Ok(())
}

impl RcolChunk for Skin {
    const TAG: FourCC = K_CHUNK_SKIN;
    const RESOURCE_TYPE: u32 = 0x01D0E76B;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_SKIN])?;
        let version = reader.read_le()?;
        let count = read_count(reader, K_CHUNK_SKIN, "bone")?;
        check_bone_count(count)?;
        let hashes: Vec<u32> = read_vec(reader, count)?;
        let matrices: Vec<Matrix43> = read_vec(reader, count)?;
        let bones = hashes
            .into_iter()
            .zip(matrices)
            .map(|(name_hash, inverse_bind_pose)| Bone { name_hash, inverse_bind_pose })
            .collect();
        Ok(Self { version, bones })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        check_bone_count(self.bones.len())?;
        writer.write_le(&K_CHUNK_SKIN)?;
        writer.write_le(&self.version)?;
        write_count(writer, K_CHUNK_SKIN, "bone", self.bones.len())?;
        for bone in &self.bones {
            writer.write_le(&bone.name_hash)?;
        }
        for bone in &self.bones {
            writer.write_le(&bone.inverse_bind_pose)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::format::Vector3;

    #[test]
    fn empty_skin() {
        let data = hex!(534b494e 01000000 00000000);
        let skin = Skin::from_bytes(&data).unwrap();
        assert_eq!(Skin { version: 1, bones: Vec::new() }, skin);
        assert_eq!(data.to_vec(), skin.to_bytes().unwrap());
    }

    #[test]
    fn two_bones() {
        let skin = Skin {
            version: 1,
            bones: vec![
                Bone { name_hash: 0x11111111, inverse_bind_pose: Matrix43::IDENTITY },
                Bone {
                    name_hash: 0x22222222,
                    inverse_bind_pose: Matrix43 {
                        translate: Vector3::new(0.0, 1.0, 0.0),
                        ..Matrix43::IDENTITY
                    },
                },
            ],
        };
        let bytes = skin.to_bytes().unwrap();
        assert_eq!(12 + 2 * 4 + 2 * 48, bytes.len());
        // Hashes are contiguous
        assert_eq!(&hex!(11111111 22222222), &bytes[12..20]);
        assert_eq!(skin, Skin::from_bytes(&bytes).unwrap());
        assert_eq!(Some(0x22222222), skin.find_bone(0x22222222).map(|b| b.name_hash));
        assert!(skin.find_bone(0x33333333).is_none());
    }

    #[test]
    fn too_many_bones() {
        let data = hex!(534b494e 01000000 e9030000);
        assert!(matches!(
            Skin::from_bytes(&data),
            Err(Error::InvalidCount { field: "bone", count: 1001, .. })
        ));
        let data = hex!(534b494e 01000000 ffffffff);
        assert!(matches!(Skin::from_bytes(&data), Err(Error::InvalidCount { count: -1, .. })));
    }
}
