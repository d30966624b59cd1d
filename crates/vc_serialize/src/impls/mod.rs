//! Built-in serialized types.
//!
//! ## Menu
//!
//! - Leaf types: `bool`, `char`, the fixed width integers, `f32`, `f64`
//!   ([`PrimitiveSerializer`]) and `String` ([`StringSerializer`]).
//! - Enums stored as an integer ([`EnumSerializer`]).
//! - Containers: `Vec<T>`, `Box<T>`, `BTreeMap`, `HashMap`, `BTreeSet`
//!   and `HashSet`, registered on demand when a field of that type is
//!   declared.
//! - Pairs `(A, B)`, the element type of maps.
//! - [`DynamicSerializableField`]: a value of a runtime chosen type.

// -----------------------------------------------------------------------------
// Modules

mod associative;
mod dynamic_field;
mod enum_serializer;
mod pair;
mod sequence;

pub(crate) mod primitives;

// -----------------------------------------------------------------------------
// Exports

pub use associative::{BTreeMapContainer, BTreeSetContainer, HashMapContainer, HashSetContainer};
pub use dynamic_field::DynamicSerializableField;
pub use enum_serializer::EnumSerializer;
pub use primitives::{PrimitiveSerializer, PrimitiveValue, StringSerializer};
pub use sequence::{BoxContainer, VecContainer};

// -----------------------------------------------------------------------------
// Registration

use alloc::string::String;

use crate::SerializeContext;

macro_rules! reflect_primitives {
    ($sc:expr; $($ty:ty),* $(,)?) => {$(
        $sc.class::<$ty>().serializer(PrimitiveSerializer::<$ty>::new());
    )*};
}

/// Registers, or unregisters in removal mode, the built-in types.
pub(crate) fn reflect_builtins(sc: &mut SerializeContext) {
    reflect_primitives!(sc; bool, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
    sc.class::<String>().serializer(StringSerializer);
    dynamic_field::reflect(sc);
}
