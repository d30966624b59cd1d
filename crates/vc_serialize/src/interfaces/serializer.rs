use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use thiserror::Error;

// -----------------------------------------------------------------------------
// CodecError

/// Failure of a [`DataSerializer`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    #[error("value is not a `{expected}`")]
    WrongType { expected: &'static str },

    #[error("expected {expected} bytes of data, found {found}")]
    UnexpectedSize { expected: usize, found: usize },

    #[error("data is not valid UTF-8")]
    InvalidUtf8,

    #[error("data is not a valid `{expected}`")]
    InvalidData { expected: &'static str },

    #[error("`{0}` is not a declared value of the enum")]
    UnknownEnumValue(String),

    #[error("cannot parse `{text}` as `{expected}`")]
    InvalidText { text: String, expected: &'static str },
}

// -----------------------------------------------------------------------------
// DataSerializer

/// Byte codec of a leaf type.
///
/// A class with a serializer is opaque: its value is stored as one blob and
/// it has no reflected elements. Binary data is written in the requested
/// byte order and every codec must round trip through
/// [`data_to_text`](DataSerializer::data_to_text) and
/// [`text_to_data`](DataSerializer::text_to_data).
pub trait DataSerializer: Send + Sync {
    /// Appends the binary form of `value` to `out`.
    fn save(&self, value: &dyn Any, out: &mut Vec<u8>, big_endian: bool) -> Result<(), CodecError>;

    /// Decodes `data` into `value`. `version` is the version recorded with
    /// the data.
    fn load(
        &self,
        value: &mut dyn Any,
        data: &[u8],
        version: u32,
        big_endian: bool,
    ) -> Result<(), CodecError>;

    /// Converts binary data to its text form.
    fn data_to_text(&self, data: &[u8], big_endian: bool) -> Result<String, CodecError>;

    /// Converts text written with `text_version` back to binary data.
    fn text_to_data(
        &self,
        text: &str,
        text_version: u32,
        big_endian: bool,
    ) -> Result<Vec<u8>, CodecError>;

    /// Returns `true` if both values are equal.
    fn compare_value_data(&self, lhs: &dyn Any, rhs: &dyn Any) -> bool;

    /// Fixes up members a clone could not copy.
    #[inline]
    fn post_clone(&self, _value: &mut dyn Any) {}
}
