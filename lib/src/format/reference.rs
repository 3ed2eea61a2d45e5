use std::fmt::{Debug, Formatter};

use binrw::binrw;

use crate::{Error, Result};

/// Which list of the enclosing container a [`ChunkReference`] points into.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ReferenceKind {
    Public,
    Private,
    External,
    Delayed,
    Other(u8),
}

impl ReferenceKind {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0xF {
            0 => Self::Public,
            1 => Self::Private,
            2 => Self::External,
            3 => Self::Delayed,
            n => Self::Other(n),
        }
    }

    pub fn nibble(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Private => 1,
            Self::External => 2,
            Self::Delayed => 3,
            Self::Other(n) => n & 0xF,
        }
    }
}

/// Packed reference to a chunk or external resource: the kind lives in the top nibble and the
/// low 28 bits hold `index + 1`, with zero meaning "none". The raw value is kept as read.
#[binrw]
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ChunkReference(pub u32);

impl ChunkReference {
    pub const NONE: Self = Self(0);
    pub const MAX_INDEX: u32 = 0x0FFF_FFFE;

    const INDEX_MASK: u32 = 0x0FFF_FFFF;

    /// `kind` must be canonical: `Other` only carries nibbles 4..=15, the ones without a name.
    pub fn new(kind: ReferenceKind, index: u32) -> Result<Self> {
        if let ReferenceKind::Other(n) = kind {
            if ReferenceKind::from_nibble(n) != kind {
                return Err(Error::InvalidArgument(format!(
                    "reference kind nibble {n:#x} is not an unnamed kind"
                )));
            }
        }
        if index > Self::MAX_INDEX {
            return Err(Error::InvalidArgument(format!(
                "chunk reference index {index:#x} exceeds {:#x}",
                Self::MAX_INDEX
            )));
        }
        Ok(Self(((kind.nibble() as u32) << 28) | (index + 1)))
    }

    pub fn kind(self) -> ReferenceKind { ReferenceKind::from_nibble((self.0 >> 28) as u8) }

    pub fn index(self) -> Option<u32> {
        match self.0 & Self::INDEX_MASK {
            0 => None,
            n => Some(n - 1),
        }
    }

    pub fn is_none(self) -> bool { self.index().is_none() }
}

impl Debug for ChunkReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.index() {
            Some(index) => write!(f, "{:?}[{index}]", self.kind()),
            None if self.0 == 0 => f.write_str("None"),
            None => write!(f, "None({:#010x})", self.0),
        }
    }
}
