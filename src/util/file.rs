use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use memmap2::{Mmap, MmapOptions};

/// Opens a memory mapped file.
pub fn map_file<P: AsRef<Path>>(path: P) -> Result<Mmap> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open file '{}'", path.as_ref().display()))?;
    let map = unsafe { MmapOptions::new().map(&file) }
        .with_context(|| format!("Failed to mmap file: '{}'", path.as_ref().display()))?;
    Ok(map)
}

/// Index of the first differing byte, or the shorter length if one is a prefix of the other.
pub fn first_mismatch(a: &[u8], b: &[u8]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(pos) => Some(pos),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch() {
        assert_eq!(None, first_mismatch(b"SKIN", b"SKIN"));
        assert_eq!(Some(2), first_mismatch(b"SKIN", b"SKxN"));
        assert_eq!(Some(3), first_mismatch(b"SKI", b"SKIN"));
        assert_eq!(None, first_mismatch(b"", b""));
    }
}
