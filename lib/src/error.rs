use thiserror::Error;

use crate::format::FourCC;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{chunk}: invalid tag {found:?}")]
    InvalidTag { chunk: FourCC, found: FourCC },

    #[error("{chunk}: unsupported version {version:#x}")]
    InvalidVersion { chunk: FourCC, version: u32 },

    #[error("{chunk}: invalid {field} count {count}")]
    InvalidCount { chunk: FourCC, field: &'static str, count: i64 },

    #[error("{chunk}: invalid {field} value {value:#x}")]
    InvalidValue { chunk: FourCC, field: &'static str, value: u64 },

    #[error("{chunk}: {message}")]
    InvalidData { chunk: FourCC, message: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("chunk {index}: {source}")]
    Chunk {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("error reading or writing data: {0}")]
    Binrw(#[from] binrw::Error),

    #[error("error reading or writing data: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// The innermost error, skipping container context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Chunk { source, .. } => source.root(),
            e => e,
        }
    }
}
