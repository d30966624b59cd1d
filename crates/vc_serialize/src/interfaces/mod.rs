//! Dispatch interfaces stored per registered class.
//!
//! The traversal core never knows the concrete Rust types it walks. Every
//! type specific operation goes through one of these trait objects, held by
//! the class's [`ClassData`](crate::ClassData).
//!
//! ## Menu
//!
//! - [`ObjectFactory`]: creates default instances ([`DefaultFactory`]).
//! - [`DataSerializer`]: opaque byte codec of a leaf type, with a text form.
//! - [`EventHandler`]: lifecycle hooks fired around reads, writes and clones.
//! - [`DataContainer`]: uniform access to collections.
//! - [`AssociativeDataContainer`]: key access for sets and maps.

// -----------------------------------------------------------------------------
// Modules

mod container;
mod event_handler;
mod factory;
mod serializer;

// -----------------------------------------------------------------------------
// Exports

pub use container::{AssociativeDataContainer, AssociativeType, DataContainer};
pub use event_handler::EventHandler;
pub use factory::{DefaultFactory, ObjectFactory};
pub use serializer::{CodecError, DataSerializer};
