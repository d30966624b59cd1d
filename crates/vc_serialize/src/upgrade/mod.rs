//! Schema evolution of serialized data.
//!
//! Classes declare per field upgrades when their layout changes. Loading
//! data written by an older version rewrites its node tree through the
//! upgrades before any object is materialized.
//!
//! ## Menu
//!
//! - [`FieldUpgrade`]: a rename or a type conversion of one field between
//!   two versions.
//! - [`UpgradeTable`]: the upgrades of one class and the chain selection.
//! - [`SerializeContext::upgrade_node`]: the upgrade pipeline.
//! - [`UpgradeError`]: failures of a single upgrade step.
//!
//! [`SerializeContext::upgrade_node`]: crate::SerializeContext::upgrade_node

// -----------------------------------------------------------------------------
// Modules

mod convert;
mod error;
mod field_upgrade;
mod table;

// -----------------------------------------------------------------------------
// Exports

pub use error::UpgradeError;
pub use field_upgrade::{ConvertFn, FieldUpgrade, UpgradeKind};
pub use table::UpgradeTable;
