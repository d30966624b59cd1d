#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod id_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use id_map::IdMap;

/// A [`IdMap`] keyed by native [`TypeId`](core::any::TypeId).
pub type TypeIdMap<V> = IdMap<core::any::TypeId, V>;
