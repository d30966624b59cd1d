use alloc::string::String;

use thiserror::Error;

use crate::info::TypeUuid;
use crate::tree::DataError;

/// Failure of one step of the version upgrade.
///
/// Upgrade failures are reported to the
/// [`ErrorHandler`](crate::enumerate::ErrorHandler); the faulty field is
/// left as is and the other fields still upgrade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpgradeError {
    #[error("`{class}` data has version {found}, newer than the registered version {registered}")]
    NewerThanClass {
        class: String,
        found: u32,
        registered: u32,
    },

    #[error("field `{field}` holds a `{found}`, its upgrade expects a `{expected}`")]
    FieldType {
        field: String,
        expected: TypeUuid,
        found: TypeUuid,
    },

    #[error("class `{uuid}` of field `{field}` cannot be created")]
    NoFactory { field: String, uuid: TypeUuid },

    #[error("field `{field}` cannot be decoded for its upgrade: {source}")]
    Decode {
        field: String,
        #[source]
        source: DataError,
    },

    #[error("the conversion of field `{field}` rejected its input")]
    Convert { field: String },

    #[error("field `{field}` cannot be encoded after its upgrade: {source}")]
    Encode {
        field: String,
        #[source]
        source: DataError,
    },
}
