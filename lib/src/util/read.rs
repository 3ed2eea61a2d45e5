use std::io::{self, Read, Seek, SeekFrom};

use binrw::{BinRead, BinResult, Endian};

/// Reads `count` little-endian values. The initial allocation is capped so that a corrupt
/// count fails on end of data instead of allocating up front.
#[inline]
pub fn read_vec<T, R>(reader: &mut R, count: usize) -> BinResult<Vec<T>>
where
    T: for<'a> BinRead<Args<'a> = ()>,
    R: Read + Seek,
{
    let mut ret = Vec::with_capacity(count.min(0x1000));
    for _ in 0..count {
        ret.push(T::read_options(reader, Endian::Little, ())?);
    }
    Ok(ret)
}

/// Reads exactly `len` bytes.
pub fn read_bytes<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut ret = Vec::with_capacity(len.min(0x10000));
    reader.by_ref().take(len as u64).read_to_end(&mut ret)?;
    if ret.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes, found {}", ret.len()),
        ));
    }
    Ok(ret)
}

/// Reads everything from the current position to the end of the stream.
pub fn read_remaining<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut ret = Vec::new();
    reader.read_to_end(&mut ret)?;
    Ok(ret)
}

/// Number of bytes between the current position and the end of the stream.
pub fn remaining_len<R: Seek>(reader: &mut R) -> io::Result<u64> {
    let pos = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;
    Ok(end.saturating_sub(pos))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use hexlit::hex;

    use super::*;

    #[test]
    fn read_vec_u16() {
        let mut reader = Cursor::new(hex!(01000200 0300));
        let values: Vec<u16> = read_vec(&mut reader, 3).unwrap();
        assert_eq!(vec![1, 2, 3], values);
        assert_eq!(6, reader.position());
    }

    #[test]
    fn read_vec_past_end() {
        let mut reader = Cursor::new(hex!(01000000));
        assert!(read_vec::<u32, _>(&mut reader, 2).is_err());
    }

    #[test]
    fn read_bytes_exact() {
        let mut reader = Cursor::new(hex!(0102030405));
        assert_eq!(vec![1, 2], read_bytes(&mut reader, 2).unwrap());
        assert_eq!(3, remaining_len(&mut reader).unwrap());
        assert!(read_bytes(&mut reader, 4).is_err());
    }

    #[test]
    fn read_remaining_bytes() {
        let mut reader = Cursor::new(hex!(0102030405));
        reader.set_position(3);
        assert_eq!(vec![4, 5], read_remaining(&mut reader).unwrap());
    }
}
