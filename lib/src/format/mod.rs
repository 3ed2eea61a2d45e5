pub mod bond;
pub mod chunk;
pub mod ftpt;
pub mod geom;
pub mod ibuf;
pub mod lite;
pub mod lod;
pub mod matd;
pub mod mtnf;
pub mod mtst;
pub mod rcol;
pub mod reference;
pub mod rslt;
pub mod skin;
pub mod vbuf;
pub mod vertex;
pub mod vpxy;
pub mod vrtf;

use std::fmt::{Debug, Display, Formatter, Write};

use binrw::binrw;

use crate::Error;

#[binrw]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// The tag as it appears in a little-endian u32 read.
    #[inline]
    pub fn as_u32(&self) -> u32 { u32::from_le_bytes(self.0) }
}

impl Display for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for c in self.0 {
            f.write_char(c as char)?;
        }
        Ok(())
    }
}

impl Debug for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('"')?;
        Display::fmt(self, f)?;
        f.write_char('"')
    }
}

impl PartialEq<[u8; 4]> for FourCC {
    fn eq(&self, other: &[u8; 4]) -> bool { &self.0 == other }
}

impl TryFrom<&str> for FourCC {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidArgument(format!("'{value}' is not a four character code")))?;
        Ok(Self(bytes))
    }
}

#[inline]
pub fn peek_four_cc(data: &[u8]) -> Option<FourCC> {
    data.get(..4).and_then(|b| b.try_into().ok()).map(FourCC)
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self { Self { x, y, z } }
}

/// Also used for quaternions.
#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Matrix43 {
    pub right: Vector3,
    pub up: Vector3,
    pub back: Vector3,
    pub translate: Vector3,
}

impl Matrix43 {
    pub const IDENTITY: Self = Self {
        right: Vector3::new(1.0, 0.0, 0.0),
        up: Vector3::new(0.0, 1.0, 0.0),
        back: Vector3::new(0.0, 0.0, 1.0),
        translate: Vector3::new(0.0, 0.0, 0.0),
    };
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

/// Resource key, stored instance first.
#[binrw]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct TgiBlock {
    pub instance: u64,
    pub resource_type: u32,
    pub group: u32,
}

impl TgiBlock {
    pub const SIZE: usize = 16;

    pub const fn new(resource_type: u32, group: u32, instance: u64) -> Self {
        Self { instance, resource_type, group }
    }
}

impl Display for TgiBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}:{:08X}:{:016X}", self.resource_type, self.group, self.instance)
    }
}
