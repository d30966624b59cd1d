//! Object streams: data trees encoded as bytes.
//!
//! ## Menu
//!
//! - [`ObjectStream`]: saves objects and loads them back, running the
//!   version upgrade in between.
//! - [`StreamFormat`]: compact binary or JSON text.
//! - [`StreamError`]: decoding and loading failures.

// -----------------------------------------------------------------------------
// Modules

mod binary;
mod error;
mod object_stream;
mod text;

// -----------------------------------------------------------------------------
// Exports

pub use error::StreamError;
pub use object_stream::{ObjectStream, StreamFormat};
