use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_bool32, read_tag, write_bool32, write_count, RcolChunk},
        mtnf::{ShaderData, ShaderType},
        FourCC,
    },
    util::read::read_bytes,
    Error, Result,
};

// Material definition
pub const K_CHUNK_MATD: FourCC = FourCC(*b"MATD");

/// First version carrying the surface flags.
pub const MATD_SURFACE_FLAGS_VERSION: u32 = 0x103;

#[derive(Clone, Debug, PartialEq)]
pub struct Matd {
    pub version: u32,
    pub material_name_hash: u32,
    pub shader: ShaderType,
    pub is_video_surface: bool,
    pub is_painting_surface: bool,
    pub shader_data: ShaderData,
}

impl Matd {
    pub fn has_surface_flags(&self) -> bool { self.version >= MATD_SURFACE_FLAGS_VERSION }
}

impl RcolChunk for Matd {
    const TAG: FourCC = K_CHUNK_MATD;
    const RESOURCE_TYPE: u32 = 0x01D0E75D;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_MATD])?;
        let version: u32 = reader.read_le()?;
        let material_name_hash = reader.read_le()?;
        let shader = ShaderType(reader.read_le()?);
        let mtrl_length: u32 = reader.read_le()?;
        let (is_video_surface, is_painting_surface) = if version >= MATD_SURFACE_FLAGS_VERSION {
            (
                read_bool32(reader, K_CHUNK_MATD, "video surface")?,
                read_bool32(reader, K_CHUNK_MATD, "painting surface")?,
            )
        } else {
            (false, false)
        };
        let data = read_bytes(reader, mtrl_length as usize)?;
        Ok(Self {
            version,
            material_name_hash,
            shader,
            is_video_surface,
            is_painting_surface,
            shader_data: ShaderData::from_bytes(&data),
        })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let data = self.shader_data.to_bytes()?;
        writer.write_le(&K_CHUNK_MATD)?;
        writer.write_le(&self.version)?;
        writer.write_le(&self.material_name_hash)?;
        writer.write_le(&self.shader.0)?;
        write_count(writer, K_CHUNK_MATD, "MTRL length", data.len())?;
        if self.has_surface_flags() {
            write_bool32(writer, self.is_video_surface)?;
            write_bool32(writer, self.is_painting_surface)?;
        } else if self.is_video_surface || self.is_painting_surface {
            return Err(Error::InvalidData {
                chunk: K_CHUNK_MATD,
                message: format!("version {:#x} cannot store surface flags", self.version),
            });
        }
        writer.write_all(&data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::format::mtnf::{FieldType, ShaderValue, K_CHUNK_MTRL};

    #[test]
    fn read_new_format() {
        let data = hex!(
            4d415444 03010000 44332211 88776655 24000000
            01000000 00000000
            4d54524c 00000000 04000000 01000000
            01000000 01000000 01000000 20000000
            0000803f
        );
        let matd = Matd::from_bytes(&data).unwrap();
        assert_eq!(0x103, matd.version);
        assert_eq!(0x11223344, matd.material_name_hash);
        assert_eq!(ShaderType(0x55667788), matd.shader);
        assert!(matd.is_video_surface);
        assert!(!matd.is_painting_surface);
        assert_eq!(Some(K_CHUNK_MTRL), matd.shader_data.tag());
        assert_eq!(Some(1.0), matd.shader_data.get_float(FieldType(1)));
        assert_eq!(Some(&ShaderValue::Float(1.0)), matd.shader_data.get(FieldType(1)));
        assert_eq!(data.to_vec(), matd.to_bytes().unwrap());
    }

    #[test]
    fn read_old_format() {
        let data = hex!(
            4d415444 02010000 44332211 88776655 10000000
            4d544e46 00000000 00000000 00000000
        );
        let matd = Matd::from_bytes(&data).unwrap();
        assert!(!matd.has_surface_flags());
        assert!(matd.shader_data.entries().is_empty());
        assert_eq!(data.to_vec(), matd.to_bytes().unwrap());
    }

    #[test]
    fn opaque_shader_data() {
        let data = hex!(4d415444 03010000 00000000 00000000 06000000 00000000 00000000 010203040506);
        let matd = Matd::from_bytes(&data).unwrap();
        assert_eq!(ShaderData::Opaque(vec![1, 2, 3, 4, 5, 6]), matd.shader_data);
        assert_eq!(data.to_vec(), matd.to_bytes().unwrap());
    }

    #[test]
    fn flags_need_new_version() {
        let mut matd = Matd::from_bytes(&hex!(
            4d415444 02010000 00000000 00000000 10000000
            4d544e46 00000000 00000000 00000000
        ))
        .unwrap();
        matd.is_painting_surface = true;
        assert!(matd.to_bytes().is_err());
        matd.version = 0x103;
        let bytes = matd.to_bytes().unwrap();
        let matd2 = Matd::from_bytes(&bytes).unwrap();
        assert!(matd2.is_painting_surface);
        assert_eq!(matd.shader_data, matd2.shader_data);
    }
}
