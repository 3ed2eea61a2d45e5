use std::io::{Read, Seek, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_tag, write_count_u8, RcolChunk},
        FourCC, Vector3,
    },
    util::read::read_vec,
    Error, Result,
};

// Light sources
pub const K_CHUNK_LITE: FourCC = FourCC(*b"LITE");

pub const LIGHT_DATA_LEN: usize = 24;

#[binrw]
#[repr(u32)]
#[brw(repr(u32))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum LightType {
    #[default]
    Unknown = 0,
    Ambient = 1,
    Directional = 2,
    Point = 3,
    Spot = 4,
    LampShade = 5,
    Tube = 6,
    SquareWindow = 7,
    CircularWindow = 8,
    SquareArea = 9,
    DiscArea = 10,
    World = 11,
}

#[binrw]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightSource {
    pub light_type: LightType,
    pub transform: Vector3,
    pub color: Vector3,
    pub intensity: f32,
    pub light_data: [f32; LIGHT_DATA_LEN],
}

impl LightSource {
    pub fn new(
        light_type: LightType,
        transform: Vector3,
        color: Vector3,
        intensity: f32,
        light_data: &[f32],
    ) -> Result<Self> {
        let light_data = light_data.try_into().map_err(|_| {
            Error::InvalidArgument(format!(
                "light data has {} values, expected {LIGHT_DATA_LEN}",
                light_data.len()
            ))
        })?;
        Ok(Self { light_type, transform, color, intensity, light_data })
    }
}

#[binrw]
#[repr(u32)]
#[brw(repr(u32))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OccluderType {
    #[default]
    Disc = 0,
    Rectangle = 1,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Occluder {
    pub occluder_type: OccluderType,
    pub origin: Vector3,
    pub normal: Vector3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub pair_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lite {
    pub version: u32,
    pub unknown1: u32,
    pub unknown2: u16,
    pub lights: Vec<LightSource>,
    pub occluders: Vec<Occluder>,
}

impl RcolChunk for Lite {
    const TAG: FourCC = K_CHUNK_LITE;
    const RESOURCE_TYPE: u32 = 0x03B4C61D;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        read_tag(reader, &[K_CHUNK_LITE])?;
        let version = reader.read_le()?;
        let unknown1 = reader.read_le()?;
        let light_count: u8 = reader.read_le()?;
        let occluder_count: u8 = reader.read_le()?;
        let unknown2 = reader.read_le()?;
        let lights = read_vec(reader, light_count as usize)?;
        let occluders = read_vec(reader, occluder_count as usize)?;
        Ok(Self { version, unknown1, unknown2, lights, occluders })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&K_CHUNK_LITE)?;
        writer.write_le(&self.version)?;
        writer.write_le(&self.unknown1)?;
        write_count_u8(writer, K_CHUNK_LITE, "light", self.lights.len())?;
        write_count_u8(writer, K_CHUNK_LITE, "occluder", self.occluders.len())?;
        writer.write_le(&self.unknown2)?;
        writer.write_le(&self.lights)?;
        writer.write_le(&self.occluders)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;

    fn spot() -> LightSource {
        let mut data = [0.0; LIGHT_DATA_LEN];
        data[0] = 0.5;
        data[23] = 2.0;
        LightSource::new(
            LightType::Spot,
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            2.0,
            &data,
        )
        .unwrap()
    }

    #[test]
    fn light_data_length() {
        let origin = Vector3::default();
        let err = LightSource::new(LightType::Point, origin, origin, 1.0, &[0.0; 23]);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
        assert!(LightSource::new(LightType::Point, origin, origin, 1.0, &[0.0; 25]).is_err());
    }

    #[test]
    fn empty_lite() {
        let data = hex!(4c495445 04000000 84000000 0000 0000);
        let lite = Lite::from_bytes(&data).unwrap();
        assert_eq!(0x84, lite.unknown1);
        assert!(lite.lights.is_empty());
        assert_eq!(data.to_vec(), lite.to_bytes().unwrap());
    }

    #[test]
    fn record_sizes() {
        let lite = Lite {
            version: 4,
            unknown1: 0x84,
            unknown2: 0,
            lights: vec![spot(), spot()],
            occluders: vec![Occluder {
                occluder_type: OccluderType::Rectangle,
                normal: Vector3::new(0.0, 1.0, 0.0),
                pair_offset: 0.5,
                ..Default::default()
            }],
        };
        let bytes = lite.to_bytes().unwrap();
        assert_eq!(16 + 2 * 128 + 56, bytes.len());
        assert_eq!(&hex!(02 01), &bytes[12..14]);
        // light type of the second record
        assert_eq!(&hex!(04000000), &bytes[16 + 128..16 + 132]);
        assert_eq!(lite, Lite::from_bytes(&bytes).unwrap());
    }

    #[test]
    fn too_many_lights() {
        let lite = Lite {
            version: 4,
            unknown1: 0,
            unknown2: 0,
            lights: vec![spot(); 256],
            occluders: Vec::new(),
        };
        assert!(matches!(
            lite.to_bytes(),
            Err(Error::InvalidCount { field: "light", count: 256, .. })
        ));
    }
}
