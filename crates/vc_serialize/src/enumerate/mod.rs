//! Depth first walks over live objects.
//!
//! A walk resolves the class of each visited value, visits base classes
//! before fields (both in declaration order) and delegates to the
//! container of collection classes. Saving, cloning and comparing are all
//! built on the same traversal rules.
//!
//! ## Menu
//!
//! - [`SerializeContext::enumerate_instance_const`],
//!   [`SerializeContext::enumerate_instance`]: visitor walks, driven by
//!   [`InstanceVisitor`] and [`InstanceVisitorMut`] with
//!   [`EnumerateFlags`].
//! - [`SerializeContext::clone_object`],
//!   [`SerializeContext::clone_object_inplace`]: deep copies.
//! - [`SerializeContext::compare_instances`]: structural equality.
//! - [`ErrorHandler`]: error accumulation with the walked path.
//!
//! [`SerializeContext::enumerate_instance_const`]: crate::SerializeContext::enumerate_instance_const
//! [`SerializeContext::enumerate_instance`]: crate::SerializeContext::enumerate_instance
//! [`SerializeContext::clone_object`]: crate::SerializeContext::clone_object
//! [`SerializeContext::clone_object_inplace`]: crate::SerializeContext::clone_object_inplace
//! [`SerializeContext::compare_instances`]: crate::SerializeContext::compare_instances

// -----------------------------------------------------------------------------
// Modules

mod clone;
mod error_handler;
mod instance;

// -----------------------------------------------------------------------------
// Exports

pub use error_handler::{DbgStackEntry, ErrorHandler};
pub use instance::{EnumerateFlags, FnVisitor, InstanceVisitor, InstanceVisitorMut};

pub(crate) use instance::{not_registered, stack_entry};
