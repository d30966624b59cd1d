use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::SerializeContext;

// -----------------------------------------------------------------------------
// DynamicSerializableField

/// A serializable value whose type is only known at runtime.
///
/// The value is saved as a polymorphic pointer element named `data`; its
/// class is resolved from its native type, so it must be a registered type.
#[derive(Default)]
pub struct DynamicSerializableField {
    pub data: Option<Box<dyn Any>>,
}

impl DynamicSerializableField {
    #[inline]
    pub const fn empty() -> Self {
        Self { data: None }
    }

    #[inline]
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            data: Some(Box::new(value)),
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.data.is_some()
    }

    /// The value, if it is a `T`.
    #[inline]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref()
    }

    #[inline]
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_deref_mut()?.downcast_mut()
    }

    #[inline]
    pub fn set<T: Any>(&mut self, value: T) {
        self.data = Some(Box::new(value));
    }

    /// Takes the value out, leaving the field empty.
    #[inline]
    pub fn take(&mut self) -> Option<Box<dyn Any>> {
        self.data.take()
    }

    /// Copies the value through the registry. Returns an empty field if
    /// the value is missing or its type is not registered.
    pub fn clone_with(&self, sc: &SerializeContext) -> Self {
        let data = self
            .data
            .as_deref()
            .and_then(|value| sc.clone_object(value));
        Self { data }
    }
}

impl fmt::Debug for DynamicSerializableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicSerializableField")
            .field("valid", &self.is_valid())
            .finish()
    }
}

crate::impl_type_info!(
    DynamicSerializableField,
    "DynamicSerializableField",
    0x20782a0e_8bb1_4a3b_8f4c_b9c5e2a5f0d1
);

pub(crate) fn reflect(sc: &mut SerializeContext) {
    sc.class::<DynamicSerializableField>()
        .dyn_field("data", |f| &f.data, |f| &mut f.data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access() {
        let mut field = DynamicSerializableField::new(5_i32);
        assert!(field.is_valid());
        assert_eq!(field.get::<i32>(), Some(&5));
        assert!(field.get::<u32>().is_none());

        *field.get_mut::<i32>().unwrap() = 6;
        assert_eq!(field.get::<i32>(), Some(&6));

        assert!(field.take().is_some());
        assert!(!field.is_valid());
    }

    #[test]
    fn clone_through_registry() {
        let sc = SerializeContext::new();
        let field = DynamicSerializableField::new(alloc::string::String::from("abc"));
        let copy = field.clone_with(&sc);
        assert_eq!(copy.get::<alloc::string::String>().map(|s| s.as_str()), Some("abc"));

        struct Unregistered;
        let field = DynamicSerializableField::new(Unregistered);
        assert!(!field.clone_with(&sc).is_valid());
    }
}
