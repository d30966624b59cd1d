use thiserror::Error;

use crate::info::TypeUuid;
use crate::interfaces::CodecError;
use crate::tree::DataError;

/// Failure to encode or decode an object stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    #[error("stream does not start with the object stream tag")]
    BadMagic,

    #[error("unsupported stream version {0}")]
    UnsupportedVersion(u8),

    #[error("stream ends in the middle of a node")]
    UnexpectedEof,

    #[error("{0} trailing bytes after the root node")]
    TrailingData(usize),

    #[error("nodes are nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("node name is not valid UTF-8")]
    InvalidName,

    #[error("unknown payload encoding {0}")]
    InvalidDataType(u8),

    #[error("`{0}` is not a class id")]
    InvalidTypeId(alloc::string::String),

    #[error("class `{uuid}` is not registered, its payload cannot be converted")]
    UnregisteredType { uuid: TypeUuid },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("the root object declined to be saved")]
    Skipped,

    #[error("the root node was dropped by the version upgrade")]
    Dropped,

    #[error("{count} errors were reported while loading")]
    Reported { count: u32 },
}
