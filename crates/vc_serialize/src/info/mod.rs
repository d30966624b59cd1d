//! Type identity for serialized types.
//!
//! ## Menu
//!
//! - [`TypeUuid`]: 128-bit identifier of a serialized type, stable across runs.
//! - [`TypeInfo`]: maps a Rust type to its [`TypeUuid`] and display name.
//! - [`impl_type_info`]: implements [`TypeInfo`] for a non-generic type.
//! - [`name_crc`]: the case-insensitive CRC32 used for element and class names.
//! - [`Attributes`]: free-form key/value data attached to classes and elements.
//!
//! [`impl_type_info`]: crate::impl_type_info

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod name_crc;
mod type_info;
mod type_uuid;

// -----------------------------------------------------------------------------
// Exports

pub use attributes::Attributes;
pub use name_crc::name_crc;
pub use type_info::TypeInfo;
pub use type_uuid::TypeUuid;
