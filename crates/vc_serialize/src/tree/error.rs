use alloc::string::String;

use thiserror::Error;

use crate::info::TypeUuid;
use crate::interfaces::CodecError;

/// Failure of a [`DataElementNode`](crate::tree::DataElementNode) read or
/// write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataError {
    #[error("class `{uuid}` is not registered")]
    UnregisteredType { uuid: TypeUuid },

    #[error("node holds a `{found}`, which cannot be stored as `{expected}`")]
    TypeMismatch { expected: TypeUuid, found: TypeUuid },

    #[error("class `{class}` cannot be created")]
    NoFactory { class: String },

    #[error("sub element not found")]
    MissingElement,

    #[error("node name `{name}` is already used")]
    DuplicateName { name: String },

    #[error("`{class}`: {source}")]
    Codec {
        class: String,
        #[source]
        source: CodecError,
    },

    #[error("{count} errors were reported")]
    Reported { count: u32 },
}
