#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Lets `impl_type_info!` expand to `vc_serialize::..` inside this crate too.
extern crate self as vc_serialize;

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod context;

pub mod enumerate;
pub mod impls;
pub mod info;
pub mod interfaces;
pub mod stream;
pub mod tree;
pub mod upgrade;

#[cfg(test)]
mod test_types;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use context::{BoxedAccess, DynAccess, ElementAccess, ValueAccess};
pub use context::{ClassBuilder, EnumBuilder};
pub use context::{ClassData, ClassElement, ElementFlags};
pub use context::{DoSaveFn, PersistentIdFn, VersionConverter};
pub use context::{GenericClassInfo, RegistrationError, SerializeContext};
pub use info::{TypeInfo, TypeUuid};

#[doc(hidden)]
pub mod __macro_exports {
    pub use alloc::borrow::Cow;
}
