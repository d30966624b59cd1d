//! The intermediate, type erased form of serialized objects.
//!
//! Streams decode into a [`DataElementNode`] tree, the version upgrade
//! rewrites it and [`DataElementNode::get_data`] materializes objects from
//! it. [`DataElementNode::set_data`] goes the other way.
//!
//! ## Menu
//!
//! - [`DataElement`]: name, class id, version and payload of one node.
//! - [`DataType`]: payload encoding, text or binary in either byte order.
//! - [`DataElementNode`]: a data element with its sub elements.
//! - [`SetDataOutcome`]: whether a write happened or was declined.
//! - [`DataError`]: read and write failures.

// -----------------------------------------------------------------------------
// Modules

mod data;
mod element;
mod error;
mod node;
mod visit;

// -----------------------------------------------------------------------------
// Exports

pub use data::SetDataOutcome;
pub use element::{DataElement, DataType};
pub use error::DataError;
pub use node::DataElementNode;
