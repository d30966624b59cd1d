use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use uuid::Uuid;

// -----------------------------------------------------------------------------
// TypeUuid

/// Globally unique identifier of a serialized type.
///
/// Ordered and hashed as a 128-bit value. The hash folds both halves into a
/// single `u64`, so it can key a [`vc_utils::IdMap`].
///
/// Generic instantiations get their id from [`TypeUuid::specialize`], which
/// derives a name based (v5) uuid from the template id and the ids of the
/// arguments. The result depends only on its inputs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TypeUuid(Uuid);

impl TypeUuid {
    /// The nil uuid, never used by a registered type.
    pub const NULL: Self = Self(Uuid::nil());

    /// Creates an id from its 128-bit value.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_serialize::TypeUuid;
    ///
    /// const ID: TypeUuid = TypeUuid::from_u128(0x72039442_eb38_4d42_a1ad_cb68f7e0eef6);
    /// assert_eq!(ID.as_u128(), 0x72039442_eb38_4d42_a1ad_cb68f7e0eef6);
    /// ```
    #[inline]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    #[inline]
    pub const fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }

    /// Parses the braced, hyphenated or simple text form.
    ///
    /// Returns `None` if `text` is not a uuid.
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::try_parse(text.trim()).ok().map(Self)
    }

    /// Derives the id of a generic instantiation.
    ///
    /// `self` is the id of the generic template, `args` the ids of its
    /// arguments in declaration order.
    pub fn specialize(self, args: &[TypeUuid]) -> Self {
        let mut name = Vec::with_capacity(args.len() * 16);
        for arg in args {
            name.extend_from_slice(arg.as_bytes());
        }
        Self(Uuid::new_v5(&self.0, &name))
    }
}

impl Hash for TypeUuid {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (hi, lo) = self.0.as_u64_pair();
        state.write_u64(hi ^ lo);
    }
}

impl fmt::Display for TypeUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.braced(), f)
    }
}

impl fmt::Debug for TypeUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeUuid({})", self.0.braced())
    }
}

impl From<Uuid> for TypeUuid {
    #[inline]
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<TypeUuid> for Uuid {
    #[inline]
    fn from(value: TypeUuid) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::TypeUuid;
    use alloc::string::ToString;

    const TEMPLATE: TypeUuid = TypeUuid::from_u128(0xa60e3e61_1ff6_4982_b6b8_9e4350c4c679);
    const ARG: TypeUuid = TypeUuid::from_u128(0x72039442_eb38_4d42_a1ad_cb68f7e0eef6);

    #[test]
    fn text_round_trip() {
        let text = ARG.to_string();
        assert_eq!(text, "{72039442-eb38-4d42-a1ad-cb68f7e0eef6}");
        assert_eq!(TypeUuid::parse(&text), Some(ARG));
        assert_eq!(TypeUuid::parse("72039442-EB38-4D42-A1AD-CB68F7E0EEF6"), Some(ARG));
        assert_eq!(TypeUuid::parse("not a uuid"), None);
    }

    #[test]
    fn specialize_is_stable() {
        let a = TEMPLATE.specialize(&[ARG]);
        let b = TEMPLATE.specialize(&[ARG]);
        assert_eq!(a, b);
        assert_ne!(a, TEMPLATE);
        assert_ne!(a, TEMPLATE.specialize(&[ARG, ARG]));
        assert!(!a.is_null());
    }
}
