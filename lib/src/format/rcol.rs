use std::io::{Cursor, Seek, SeekFrom, Write};

use binrw::{binrw, BinReaderExt, BinWriterExt};

use crate::{
    format::{
        chunk::{read_chunk, read_count, write_count, ChunkData},
        FourCC, TgiBlock,
    },
    util::read::read_vec,
    Error, Result,
};

// Resource collection. Used to name container errors; the tag is not stored.
pub const K_RCOL: FourCC = FourCC(*b"RCOL");

/// What to do with a chunk that fails to parse.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ChunkPolicy {
    /// Fail the whole container.
    #[default]
    Strict,
    /// Keep the chunk's bytes as [`ChunkData::Unknown`].
    Preserve,
}

#[binrw]
#[derive(Copy, Clone, Debug)]
struct ChunkIndexEntry {
    position: u32,
    length: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RcolEntry {
    pub key: TgiBlock,
    pub chunk: ChunkData,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rcol {
    pub version: u32,
    pub public_chunk_count: u32,
    pub unused: u32,
    pub chunks: Vec<RcolEntry>,
    pub external_resources: Vec<TgiBlock>,
}

/// A chunk's key and its bytes inside the container.
#[derive(Copy, Clone, Debug)]
pub struct RawChunk<'a> {
    pub key: TgiBlock,
    pub data: &'a [u8],
}

/// The container header and index, with chunk payloads left unparsed.
#[derive(Clone, Debug)]
pub struct RcolLayout<'a> {
    pub version: u32,
    pub public_chunk_count: u32,
    pub unused: u32,
    pub chunks: Vec<RawChunk<'a>>,
    pub external_resources: Vec<TgiBlock>,
}

impl<'a> RcolLayout<'a> {
    pub fn read(data: &'a [u8]) -> Result<Self> {
        let mut reader = Cursor::new(data);
        let version = reader.read_le()?;
        let public_chunk_count = read_count(&mut reader, K_RCOL, "public chunk")? as u32;
        let unused = reader.read_le()?;
        let external_count = read_count(&mut reader, K_RCOL, "external resource")?;
        let chunk_count = read_count(&mut reader, K_RCOL, "chunk")?;
        let keys: Vec<TgiBlock> = read_vec(&mut reader, chunk_count)?;
        let external_resources = read_vec(&mut reader, external_count)?;
        let index: Vec<ChunkIndexEntry> = read_vec(&mut reader, chunk_count)?;
        let body_start = reader.position() as usize;

        let mut chunks = Vec::with_capacity(keys.len());
        for (i, (key, entry)) in keys.into_iter().zip(index).enumerate() {
            let ChunkIndexEntry { position, length } = entry;
            let payload = if chunk_count == 1 && position == 0 && length == 0 {
                // A lone chunk may leave its index empty and span the rest of the data
                &data[body_start..]
            } else {
                let start = position as usize;
                usize::try_from(length)
                    .ok()
                    .and_then(|len| data.get(start..start.checked_add(len)?))
                    .ok_or_else(|| Error::InvalidData {
                        chunk: K_RCOL,
                        message: format!(
                            "chunk {i} at {position:#x} with length {length:#x} is outside \
                             the {:#x} byte container",
                            data.len()
                        ),
                    })?
            };
            chunks.push(RawChunk { key, data: payload });
        }
        Ok(Self { version, public_chunk_count, unused, chunks, external_resources })
    }
}

impl Rcol {
    pub fn read(data: &[u8], policy: ChunkPolicy) -> Result<Self> {
        let layout = RcolLayout::read(data)?;
        let mut chunks = Vec::with_capacity(layout.chunks.len());
        for (i, RawChunk { key, data }) in layout.chunks.into_iter().enumerate() {
            let chunk = match read_chunk(key.resource_type, data) {
                Ok(chunk) => chunk,
                Err(e) if policy == ChunkPolicy::Preserve => {
                    log::warn!("Keeping chunk {i} ({key}) as raw data: {e}");
                    ChunkData::Unknown { resource_type: key.resource_type, data: data.to_vec() }
                }
                Err(e) => return Err(Error::Chunk { index: i, source: Box::new(e) }),
            };
            chunks.push(RcolEntry { key, chunk });
        }
        Ok(Self {
            version: layout.version,
            public_chunk_count: layout.public_chunk_count,
            unused: layout.unused,
            chunks,
            external_resources: layout.external_resources,
        })
    }

    pub fn write<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        let start = w.stream_position()?;
        w.write_le(&self.version)?;
        write_count(w, K_RCOL, "public chunk", self.public_chunk_count as usize)?;
        w.write_le(&self.unused)?;
        write_count(w, K_RCOL, "external resource", self.external_resources.len())?;
        write_count(w, K_RCOL, "chunk", self.chunks.len())?;
        for entry in &self.chunks {
            w.write_le(&entry.key)?;
        }
        w.write_le(&self.external_resources)?;

        // Skip over the index, it's written once the chunk positions are known
        let index_pos = w.stream_position()?;
        let mut index = Vec::with_capacity(self.chunks.len());
        w.seek(SeekFrom::Current(8 * self.chunks.len() as i64))?;
        for (i, entry) in self.chunks.iter().enumerate() {
            let bytes =
                entry.chunk.to_bytes().map_err(|e| Error::Chunk { index: i, source: Box::new(e) })?;
            let pos = w.stream_position()?;
            let padding = (4 - (pos - start) % 4) % 4;
            w.write_all(&[0u8; 3][..padding as usize])?;
            let position = u32::try_from(pos + padding - start).map_err(|_| Error::InvalidData {
                chunk: K_RCOL,
                message: format!("chunk {i} starts past 4 GiB"),
            })?;
            index.push((position, bytes.len()));
            w.write_all(&bytes)?;
        }
        let end_pos = w.stream_position()?;

        w.seek(SeekFrom::Start(index_pos))?;
        for (position, length) in index {
            w.write_le(&position)?;
            write_count(w, K_RCOL, "chunk length", length)?;
        }
        w.seek(SeekFrom::Start(end_pos))?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Cursor::new(Vec::new());
        self.write(&mut writer)?;
        Ok(writer.into_inner())
    }

    /// First chunk with the given resource type.
    pub fn find_chunk(&self, resource_type: u32) -> Option<&RcolEntry> {
        self.chunks.iter().find(|e| e.key.resource_type == resource_type)
    }
}

#[cfg(test)]
mod tests {
    use hexlit::hex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::format::{
        chunk::RcolChunk,
        skin::{Skin, K_CHUNK_SKIN},
    };

    const SKIN_TYPE: u32 = 0x01D0E76B;

    fn skin_rcol() -> Vec<u8> {
        hex!(
            03000000 01000000 00000000 00000000 01000000
            0100000000000000 6be7d001 00000000
            2c000000 0c000000
            534b494e 01000000 00000000
        )
        .to_vec()
    }

    #[test]
    fn read_single_chunk() {
        let data = skin_rcol();
        let rcol = Rcol::read(&data, ChunkPolicy::Strict).unwrap();
        assert_eq!(3, rcol.version);
        assert_eq!(1, rcol.public_chunk_count);
        assert_eq!(1, rcol.chunks.len());
        assert_eq!(ChunkData::Skin(Skin { version: 1, bones: Vec::new() }), rcol.chunks[0].chunk);
        assert!(rcol.find_chunk(SKIN_TYPE).is_some());
        assert_eq!(data, rcol.to_bytes().unwrap());
    }

    #[test]
    fn empty_index_spans_rest() {
        let mut data = skin_rcol();
        data[0x24..0x2C].fill(0);
        let rcol = Rcol::read(&data, ChunkPolicy::Strict).unwrap();
        assert_eq!(Some(K_CHUNK_SKIN), rcol.chunks[0].chunk.tag());
        // Written back with an explicit index
        assert_eq!(skin_rcol(), rcol.to_bytes().unwrap());
    }

    #[test]
    fn raw_layout() {
        let data = skin_rcol();
        let layout = RcolLayout::read(&data).unwrap();
        assert_eq!(1, layout.chunks.len());
        assert_eq!(SKIN_TYPE, layout.chunks[0].key.resource_type);
        assert_eq!(&data[0x2C..], layout.chunks[0].data);
        assert!(layout.external_resources.is_empty());
    }

    #[test]
    fn chunk_out_of_range() {
        let mut data = skin_rcol();
        data[0x28] = 0x10;
        assert!(matches!(Rcol::read(&data, ChunkPolicy::Strict), Err(Error::InvalidData { .. })));
    }

    #[test]
    fn policy() {
        let mut data = skin_rcol();
        // Bone count 1001
        data[0x34..0x38].copy_from_slice(&hex!(e9030000));
        let err = Rcol::read(&data, ChunkPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::Chunk { index: 0, .. }));
        assert!(matches!(err.root(), Error::InvalidCount { field: "bone", .. }));

        let rcol = Rcol::read(&data, ChunkPolicy::Preserve).unwrap();
        assert!(!rcol.chunks[0].chunk.is_known_type());
        assert_eq!(SKIN_TYPE, rcol.chunks[0].chunk.resource_type());
        assert_eq!(data, rcol.to_bytes().unwrap());
    }

    #[test]
    fn trailing_chunk_bytes() {
        let mut data = skin_rcol();
        data[0x28] = 0x10;
        data.extend_from_slice(&hex!(deadbeef));
        let err = Rcol::read(&data, ChunkPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::Chunk { index: 0, .. }));
        assert!(matches!(err.root(), Error::InvalidData { chunk, .. } if *chunk == K_CHUNK_SKIN));

        let rcol = Rcol::read(&data, ChunkPolicy::Preserve).unwrap();
        assert!(!rcol.chunks[0].chunk.is_known_type());
        assert_eq!(data, rcol.to_bytes().unwrap());
    }

    #[test]
    fn chunks_are_aligned() {
        let odd = ChunkData::Unknown { resource_type: 0x1234, data: vec![1, 2, 3] };
        let skin = Skin { version: 1, bones: Vec::new() };
        let rcol = Rcol {
            version: 3,
            public_chunk_count: 2,
            unused: 0,
            chunks: vec![
                RcolEntry { key: TgiBlock::new(0x1234, 0, 1), chunk: odd },
                RcolEntry { key: TgiBlock::new(SKIN_TYPE, 0, 2), chunk: ChunkData::Skin(skin.clone()) },
            ],
            external_resources: vec![TgiBlock::new(0x00B2D882, 0, 3)],
        };
        let bytes = rcol.to_bytes().unwrap();
        // header, 3 keys, 2 index entries
        let first = 20 + 3 * 16 + 2 * 8;
        assert_eq!(&hex!(010203 00), &bytes[first..first + 4]);
        assert_eq!(skin.to_bytes().unwrap(), bytes[first + 4..].to_vec());
        assert_eq!(rcol, Rcol::read(&bytes, ChunkPolicy::Strict).unwrap());
    }
}
