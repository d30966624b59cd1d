use alloc::string::String;

use thiserror::Error;

use crate::info::TypeUuid;

// -----------------------------------------------------------------------------
// RegistrationError

/// A rejected registration call. The call that caused it had no effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("class `{name}` {uuid} is already registered as `{existing}`")]
    DuplicateClass {
        uuid: TypeUuid,
        name: String,
        existing: String,
    },

    #[error("class `{class}` already declares an element named `{element}`")]
    DuplicateElement { class: String, element: String },

    #[error("class `{class}` has a serializer and cannot declare element `{element}`")]
    LeafWithElements { class: String, element: String },

    #[error("class `{class}` declares elements and cannot take a serializer")]
    CompositeWithSerializer { class: String },

    #[error("duplicate upgrade of field `{field}` in class `{class}` from version {from} to {to}")]
    DuplicateUpgrade {
        class: String,
        field: String,
        from: u32,
        to: u32,
    },

    #[error("upgrade of field `{field}` in class `{class}` must go forward, found {from} to {to}")]
    BackwardUpgrade {
        class: String,
        field: String,
        from: u32,
        to: u32,
    },

    #[error("class {uuid} is already deprecated")]
    DuplicateDeprecation { uuid: TypeUuid },
}
