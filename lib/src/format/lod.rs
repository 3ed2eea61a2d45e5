use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_count, read_tag, write_count, RcolChunk},
        FourCC,
    },
    util::read::read_remaining,
    Result,
};

// Mesh list
pub const K_CHUNK_MLOD: FourCC = FourCC(*b"MLOD");
// Model LOD list
pub const K_CHUNK_MODL: FourCC = FourCC(*b"MODL");

/// Mesh list. The per-mesh records after the count are kept as read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mlod {
    pub version: u32,
    pub mesh_count: u32,
    pub entry_data: Vec<u8>,
}

/// Level of detail list. The per-entry records after the count are kept as read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Modl {
    pub version: u32,
    pub lod_entry_count: u32,
    pub entry_data: Vec<u8>,
}

fn read_header<R: Read + Seek>(
    reader: &mut R,
    tag: FourCC,
    field: &'static str,
) -> Result<(u32, u32, Vec<u8>)> {
    read_tag(reader, &[tag])?;
    let version = reader.read_le()?;
    let count = read_count(reader, tag, field)? as u32;
    Ok((version, count, read_remaining(reader)?))
}

fn write_header<W: Write + Seek>(
    writer: &mut W,
    tag: FourCC,
    field: &'static str,
    version: u32,
    count: u32,
    entry_data: &[u8],
) -> Result<()> {
    writer.write_le(&tag)?;
    writer.write_le(&version)?;
    write_count(writer, tag, field, count as usize)?;
    writer.write_all(entry_data)?;
    Ok(())
}

impl RcolChunk for Mlod {
    const TAG: FourCC = K_CHUNK_MLOD;
    const RESOURCE_TYPE: u32 = 0x01D10F34;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let (version, mesh_count, entry_data) = read_header(reader, K_CHUNK_MLOD, "mesh")?;
        Ok(Self { version, mesh_count, entry_data })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        write_header(writer, K_CHUNK_MLOD, "mesh", self.version, self.mesh_count, &self.entry_data)
    }
}

impl RcolChunk for Modl {
    const TAG: FourCC = K_CHUNK_MODL;
    const RESOURCE_TYPE: u32 = 0x01661233;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let (version, lod_entry_count, entry_data) = read_header(reader, K_CHUNK_MODL, "LOD entry")?;
        Ok(Self { version, lod_entry_count, entry_data })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        write_header(
            writer,
            K_CHUNK_MODL,
            "LOD entry",
            self.version,
            self.lod_entry_count,
            &self.entry_data,
        )
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Error;

    #[test]
    fn count_only() {
        let data = hex!(4d4c4f44 02020000 00000000);
        let mlod = Mlod::from_bytes(&data).unwrap();
        assert_eq!(Mlod { version: 0x202, mesh_count: 0, entry_data: Vec::new() }, mlod);
        assert_eq!(data.to_vec(), mlod.to_bytes().unwrap());
    }

    #[test]
    fn entry_data_kept() {
        let data = hex!(4d4f444c 00010000 02000000 01020304 05060708);
        let modl = Modl::from_bytes(&data).unwrap();
        assert_eq!(2, modl.lod_entry_count);
        assert_eq!(vec![1, 2, 3, 4, 5, 6, 7, 8], modl.entry_data);
        assert_eq!(data.to_vec(), modl.to_bytes().unwrap());
    }

    #[test]
    fn wrong_tag() {
        let data = hex!(4d4f444c 00010000 00000000);
        assert!(matches!(Mlod::from_bytes(&data), Err(Error::InvalidTag { .. })));
    }
}
