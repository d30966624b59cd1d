//! The type registry and its class model.
//!
//! ## Menu
//!
//! - [`SerializeContext`]: owns every registered [`ClassData`].
//! - [`ClassData`]: one registered type.
//! - [`ClassElement`]: one field or base class of a [`ClassData`].
//! - [`ElementAccess`]: reaches an element inside its owner
//!   ([`ValueAccess`], [`BoxedAccess`], [`DynAccess`]).
//! - [`ClassBuilder`], [`EnumBuilder`]: fluent registration.
//! - [`GenericClassInfo`]: reference counted generic instantiations.

// -----------------------------------------------------------------------------
// Modules

mod access;
mod builder;
mod class_data;
mod class_element;
mod enum_builder;
mod error;
mod generic_info;
mod serialize_context;

// -----------------------------------------------------------------------------
// Exports

pub use access::{BoxedAccess, DynAccess, ElementAccess, ValueAccess};
pub use builder::ClassBuilder;
pub use class_data::{ClassData, DoSaveFn, PersistentIdFn, VersionConverter};
pub use class_element::{ClassElement, ElementFlags};
pub use enum_builder::EnumBuilder;
pub use error::RegistrationError;
pub use generic_info::GenericClassInfo;
pub use serialize_context::SerializeContext;
