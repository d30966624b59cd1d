use alloc::borrow::Cow;
use core::any::Any;

use crate::SerializeContext;
use crate::info::TypeUuid;

// -----------------------------------------------------------------------------
// TypeInfo

/// Static identity of a serializable type.
///
/// Non-generic types usually implement it with [`impl_type_info`].
/// Generic types (containers, pairs) compute their id with
/// [`TypeUuid::specialize`] and override [`TypeInfo::reflect_generic`] to
/// register their class on demand when a field of that type is declared.
///
/// [`impl_type_info`]: crate::impl_type_info
pub trait TypeInfo: Any {
    /// The registered id of this type.
    fn type_uuid() -> TypeUuid;

    /// Human readable name, used in diagnostics and the text stream.
    fn type_name() -> Cow<'static, str>;

    /// Registers (or, in removal mode, releases) the class of a generic
    /// instantiation. Called for every field declared with this type.
    #[inline]
    fn reflect_generic(_sc: &mut SerializeContext) {}
}

/// Implements [`TypeInfo`] for a non-generic type.
///
/// # Examples
///
/// ```
/// use vc_serialize::{TypeInfo, impl_type_info};
///
/// #[derive(Default)]
/// struct Foo;
///
/// impl_type_info!(Foo, "Foo", 0x3c5a8f6e_7d21_4b90_9e7f_05c1d2a4b8e3);
///
/// assert_eq!(Foo::type_name(), "Foo");
/// assert_eq!(Foo::type_uuid().as_u128(), 0x3c5a8f6e_7d21_4b90_9e7f_05c1d2a4b8e3);
/// ```
#[macro_export]
macro_rules! impl_type_info {
    ($ty:ty, $name:expr, $uuid:expr) => {
        impl $crate::TypeInfo for $ty {
            #[inline]
            fn type_uuid() -> $crate::TypeUuid {
                const ID: $crate::TypeUuid = $crate::TypeUuid::from_u128($uuid);
                ID
            }

            #[inline]
            fn type_name() -> $crate::__macro_exports::Cow<'static, str> {
                $crate::__macro_exports::Cow::Borrowed($name)
            }
        }
    };
}
