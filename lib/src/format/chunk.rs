use std::io::{Cursor, Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{
    format::{
        bond::Bond,
        ftpt::Ftpt,
        geom::Geom,
        ibuf::{Ibuf, K_TYPE_IBUF2},
        lite::Lite,
        lod::{Mlod, Modl},
        matd::Matd,
        mtst::Mtst,
        rslt::Rslt,
        skin::Skin,
        vbuf::{Vbuf, K_TYPE_VBUF2},
        vpxy::Vpxy,
        vrtf::Vrtf,
        FourCC,
    },
    Error, Result,
};

/// A chunk codec. Reading and then writing a chunk reproduces the input bytes.
pub trait RcolChunk: Sized {
    const TAG: FourCC;
    const RESOURCE_TYPE: u32;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self>;

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()>;

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(data);
        let chunk = Self::read(&mut reader)?;
        let end = reader.position() as usize;
        if end < data.len() {
            return Err(Error::InvalidData {
                chunk: Self::TAG,
                message: format!("{} trailing bytes after the chunk", data.len() - end),
            });
        }
        Ok(chunk)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Cursor::new(Vec::new());
        self.write(&mut writer)?;
        Ok(writer.into_inner())
    }
}

/// Reads a tag and checks it against the accepted tags. The first accepted tag names the chunk
/// in errors.
pub(crate) fn read_tag<R: Read + Seek>(reader: &mut R, accepted: &[FourCC]) -> Result<FourCC> {
    let found: FourCC = reader.read_le()?;
    if accepted.contains(&found) {
        Ok(found)
    } else {
        Err(Error::InvalidTag { chunk: accepted[0], found })
    }
}

/// Reads a signed 32-bit count, rejecting negative values.
pub(crate) fn read_count<R: Read + Seek>(
    reader: &mut R,
    chunk: FourCC,
    field: &'static str,
) -> Result<usize> {
    let count: i32 = reader.read_le()?;
    usize::try_from(count).map_err(|_| Error::InvalidCount { chunk, field, count: count as i64 })
}

pub(crate) fn write_count<W: Write + Seek>(
    writer: &mut W,
    chunk: FourCC,
    field: &'static str,
    len: usize,
) -> Result<()> {
    let count = i32::try_from(len)
        .map_err(|_| Error::InvalidCount { chunk, field, count: len as i64 })?;
    writer.write_le(&count)?;
    Ok(())
}

pub(crate) fn write_count_u8<W: Write + Seek>(
    writer: &mut W,
    chunk: FourCC,
    field: &'static str,
    len: usize,
) -> Result<()> {
    let count =
        u8::try_from(len).map_err(|_| Error::InvalidCount { chunk, field, count: len as i64 })?;
    writer.write_le(&count)?;
    Ok(())
}

pub(crate) fn read_bool32<R: Read + Seek>(
    reader: &mut R,
    chunk: FourCC,
    field: &'static str,
) -> Result<bool> {
    match reader.read_le::<u32>()? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(Error::InvalidValue { chunk, field, value: value as u64 }),
    }
}

pub(crate) fn read_bool8<R: Read + Seek>(
    reader: &mut R,
    chunk: FourCC,
    field: &'static str,
) -> Result<bool> {
    match reader.read_le::<u8>()? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(Error::InvalidValue { chunk, field, value: value as u64 }),
    }
}

pub(crate) fn write_bool32<W: Write + Seek>(writer: &mut W, value: bool) -> Result<()> {
    writer.write_le(&(value as u32))?;
    Ok(())
}

pub(crate) fn write_bool8<W: Write + Seek>(writer: &mut W, value: bool) -> Result<()> {
    writer.write_le(&(value as u8))?;
    Ok(())
}

/// Any chunk found in an RCOL container.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkData {
    Geom(Geom),
    Matd(Matd),
    Vrtf(Vrtf),
    Vbuf(Vbuf),
    Vbuf2(Vbuf),
    Ibuf(Ibuf),
    Ibuf2(Ibuf),
    Skin(Skin),
    Mlod(Mlod),
    Modl(Modl),
    Mtst(Mtst),
    Bond(Bond),
    Lite(Lite),
    Vpxy(Vpxy),
    Ftpt(Ftpt),
    Rslt(Rslt),
    /// A chunk with an unregistered type id, or one kept opaque after a parse failure.
    Unknown { resource_type: u32, data: Vec<u8> },
}

const REGISTERED_TYPES: [(u32, FourCC); 16] = [
    (Geom::RESOURCE_TYPE, Geom::TAG),
    (Matd::RESOURCE_TYPE, Matd::TAG),
    (Vrtf::RESOURCE_TYPE, Vrtf::TAG),
    (Vbuf::RESOURCE_TYPE, Vbuf::TAG),
    (K_TYPE_VBUF2, Vbuf::TAG),
    (Ibuf::RESOURCE_TYPE, Ibuf::TAG),
    (K_TYPE_IBUF2, Ibuf::TAG),
    (Skin::RESOURCE_TYPE, Skin::TAG),
    (Mlod::RESOURCE_TYPE, Mlod::TAG),
    (Modl::RESOURCE_TYPE, Modl::TAG),
    (Mtst::RESOURCE_TYPE, Mtst::TAG),
    (Bond::RESOURCE_TYPE, Bond::TAG),
    (Lite::RESOURCE_TYPE, Lite::TAG),
    (Vpxy::RESOURCE_TYPE, Vpxy::TAG),
    (Ftpt::RESOURCE_TYPE, Ftpt::TAG),
    (Rslt::RESOURCE_TYPE, Rslt::TAG),
];

/// Every registered (resource type, tag) pair.
pub fn registered_types() -> &'static [(u32, FourCC)] { &REGISTERED_TYPES }

pub fn is_registered(resource_type: u32) -> bool {
    REGISTERED_TYPES.iter().any(|(id, _)| *id == resource_type)
}

pub fn is_tag_registered(four_cc: &str) -> bool {
    REGISTERED_TYPES.iter().any(|(_, tag)| tag.0 == four_cc.as_bytes())
}

/// Parses `data` with the codec registered for `resource_type`. Returns `Ok(None)` when no codec
/// is registered.
pub fn create_block(resource_type: u32, data: &[u8]) -> Result<Option<ChunkData>> {
    let chunk = match resource_type {
        Geom::RESOURCE_TYPE => ChunkData::Geom(Geom::from_bytes(data)?),
        Matd::RESOURCE_TYPE => ChunkData::Matd(Matd::from_bytes(data)?),
        Vrtf::RESOURCE_TYPE => ChunkData::Vrtf(Vrtf::from_bytes(data)?),
        Vbuf::RESOURCE_TYPE => ChunkData::Vbuf(Vbuf::from_bytes(data)?),
        K_TYPE_VBUF2 => ChunkData::Vbuf2(Vbuf::from_bytes(data)?),
        Ibuf::RESOURCE_TYPE => ChunkData::Ibuf(Ibuf::from_bytes(data)?),
        K_TYPE_IBUF2 => ChunkData::Ibuf2(Ibuf::from_bytes(data)?),
        Skin::RESOURCE_TYPE => ChunkData::Skin(Skin::from_bytes(data)?),
        Mlod::RESOURCE_TYPE => ChunkData::Mlod(Mlod::from_bytes(data)?),
        Modl::RESOURCE_TYPE => ChunkData::Modl(Modl::from_bytes(data)?),
        Mtst::RESOURCE_TYPE => ChunkData::Mtst(Mtst::from_bytes(data)?),
        Bond::RESOURCE_TYPE => ChunkData::Bond(Bond::from_bytes(data)?),
        Lite::RESOURCE_TYPE => ChunkData::Lite(Lite::from_bytes(data)?),
        Vpxy::RESOURCE_TYPE => ChunkData::Vpxy(Vpxy::from_bytes(data)?),
        Ftpt::RESOURCE_TYPE => ChunkData::Ftpt(Ftpt::from_bytes(data)?),
        Rslt::RESOURCE_TYPE => ChunkData::Rslt(Rslt::from_bytes(data)?),
        _ => return Ok(None),
    };
    Ok(Some(chunk))
}

/// Like [`create_block`], but keeps unregistered chunks as [`ChunkData::Unknown`].
pub fn read_chunk(resource_type: u32, data: &[u8]) -> Result<ChunkData> {
    Ok(create_block(resource_type, data)?
        .unwrap_or_else(|| ChunkData::Unknown { resource_type, data: data.to_vec() }))
}

impl ChunkData {
    pub fn resource_type(&self) -> u32 {
        match self {
            Self::Geom(_) => Geom::RESOURCE_TYPE,
            Self::Matd(_) => Matd::RESOURCE_TYPE,
            Self::Vrtf(_) => Vrtf::RESOURCE_TYPE,
            Self::Vbuf(_) => Vbuf::RESOURCE_TYPE,
            Self::Vbuf2(_) => K_TYPE_VBUF2,
            Self::Ibuf(_) => Ibuf::RESOURCE_TYPE,
            Self::Ibuf2(_) => K_TYPE_IBUF2,
            Self::Skin(_) => Skin::RESOURCE_TYPE,
            Self::Mlod(_) => Mlod::RESOURCE_TYPE,
            Self::Modl(_) => Modl::RESOURCE_TYPE,
            Self::Mtst(_) => Mtst::RESOURCE_TYPE,
            Self::Bond(_) => Bond::RESOURCE_TYPE,
            Self::Lite(_) => Lite::RESOURCE_TYPE,
            Self::Vpxy(_) => Vpxy::RESOURCE_TYPE,
            Self::Ftpt(_) => Ftpt::RESOURCE_TYPE,
            Self::Rslt(_) => Rslt::RESOURCE_TYPE,
            Self::Unknown { resource_type, .. } => *resource_type,
        }
    }

    /// The chunk's tag. Unknown chunks report the first four bytes of their data, if any.
    pub fn tag(&self) -> Option<FourCC> {
        match self {
            Self::Geom(_) => Some(Geom::TAG),
            Self::Matd(_) => Some(Matd::TAG),
            Self::Vrtf(_) => Some(Vrtf::TAG),
            Self::Vbuf(_) | Self::Vbuf2(_) => Some(Vbuf::TAG),
            Self::Ibuf(_) | Self::Ibuf2(_) => Some(Ibuf::TAG),
            Self::Skin(_) => Some(Skin::TAG),
            Self::Mlod(_) => Some(Mlod::TAG),
            Self::Modl(_) => Some(Modl::TAG),
            Self::Mtst(_) => Some(Mtst::TAG),
            Self::Bond(_) => Some(Bond::TAG),
            Self::Lite(_) => Some(Lite::TAG),
            Self::Vpxy(_) => Some(Vpxy::TAG),
            Self::Ftpt(_) => Some(Ftpt::TAG),
            Self::Rslt(_) => Some(Rslt::TAG),
            Self::Unknown { data, .. } => super::peek_four_cc(data),
        }
    }

    pub fn is_known_type(&self) -> bool { !matches!(self, Self::Unknown { .. }) }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Geom(c) => c.to_bytes(),
            Self::Matd(c) => c.to_bytes(),
            Self::Vrtf(c) => c.to_bytes(),
            Self::Vbuf(c) | Self::Vbuf2(c) => c.to_bytes(),
            Self::Ibuf(c) | Self::Ibuf2(c) => c.to_bytes(),
            Self::Skin(c) => c.to_bytes(),
            Self::Mlod(c) => c.to_bytes(),
            Self::Modl(c) => c.to_bytes(),
            Self::Mtst(c) => c.to_bytes(),
            Self::Bond(c) => c.to_bytes(),
            Self::Lite(c) => c.to_bytes(),
            Self::Vpxy(c) => c.to_bytes(),
            Self::Ftpt(c) => c.to_bytes(),
            Self::Rslt(c) => c.to_bytes(),
            Self::Unknown { data, .. } => Ok(data.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn registry_lookup() {
        assert!(is_registered(0x015A1849));
        assert!(is_registered(0x0229684B));
        assert!(!is_registered(0x12345678));
        assert!(is_tag_registered("RSLT"));
        assert!(is_tag_registered("BOND"));
        assert!(!is_tag_registered("MTNF"));
        assert_eq!(16, registered_types().len());
    }

    #[test]
    fn unregistered_type() {
        assert!(create_block(0x12345678, b"ABCD").unwrap().is_none());
        let chunk = read_chunk(0x12345678, b"ABCDEF").unwrap();
        assert!(!chunk.is_known_type());
        assert_eq!(Some(FourCC(*b"ABCD")), chunk.tag());
        assert_eq!(0x12345678, chunk.resource_type());
        assert_eq!(b"ABCDEF".to_vec(), chunk.to_bytes().unwrap());
    }

    #[test]
    fn buffer_aliases() {
        let data = hex!(56425546 05000000 00000000 00000000);
        let chunk = read_chunk(K_TYPE_VBUF2, &data).unwrap();
        assert!(matches!(chunk, ChunkData::Vbuf2(_)));
        assert_eq!(K_TYPE_VBUF2, chunk.resource_type());
        assert_eq!(Some(FourCC(*b"VBUF")), chunk.tag());
        assert_eq!(data.to_vec(), chunk.to_bytes().unwrap());
    }

    #[test]
    fn wrong_tag() {
        let data = hex!(58585858 05000000 00000000 00000000);
        let err = create_block(0x01D0E6FB, &data).unwrap_err();
        assert!(matches!(err, Error::InvalidTag { found, .. } if found == FourCC(*b"XXXX")));
    }

    #[test]
    fn trailing_bytes() {
        let mut data = hex!(534b494e 01000000 00000000).to_vec();
        assert!(read_chunk(Skin::RESOURCE_TYPE, &data).is_ok());
        data.extend_from_slice(&[0xAB, 0xCD]);
        let err = read_chunk(Skin::RESOURCE_TYPE, &data).unwrap_err();
        assert!(matches!(err, Error::InvalidData { chunk, .. } if chunk == FourCC(*b"SKIN")));

        let mut data = hex!(
            56525446 02000000 08000000 01000000
            00000000 00000700
        )
        .to_vec();
        assert!(Vrtf::from_bytes(&data).is_ok());
        data.extend_from_slice(&[0u8; 4]);
        assert!(matches!(Vrtf::from_bytes(&data), Err(Error::InvalidData { .. })));
    }

    #[test]
    fn invalid_bool() {
        let mut reader = Cursor::new(hex!(02000000));
        let err = read_bool32(&mut reader, FourCC(*b"TEST"), "flag").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "flag", value: 2, .. }));
    }

    #[test]
    fn negative_count() {
        let mut reader = Cursor::new(hex!(ffffffff));
        let err = read_count(&mut reader, FourCC(*b"TEST"), "entry").unwrap_err();
        assert!(matches!(err, Error::InvalidCount { count: -1, .. }));
    }
}
