use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::any::Any;

use crate::context::{ClassBuilder, SerializeContext};
use crate::impls::{EnumSerializer, PrimitiveValue};
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// EnumBuilder

/// Declaration of an enum stored as its underlying integer `U`.
///
/// # Examples
///
/// ```
/// use vc_serialize::{SerializeContext, impl_type_info};
///
/// #[derive(Default, Clone, Copy, PartialEq)]
/// enum Shape {
///     #[default]
///     Box = 0,
///     Sphere = 1,
/// }
///
/// impl_type_info!(Shape, "Shape", 0x2f4e1b8a_6b3c_4f0e_a9d1_54c7e2b3f600);
///
/// let mut sc = SerializeContext::new();
/// sc.enumeration::<Shape, u8>(|s| s as u8)
///     .value("Box", Shape::Box)
///     .value("Sphere", Shape::Sphere);
///
/// let shape = sc.find_class_data_by_name("Shape").unwrap();
/// assert!(shape.is_leaf());
/// ```
pub struct EnumBuilder<'a, E, U> {
    inner: ClassBuilder<'a, E>,
    values: Vec<(Cow<'static, str>, E)>,
    to_underlying: fn(E) -> U,
}

impl SerializeContext {
    /// Starts registering the enum `E`, saved as `to_underlying(value)`.
    pub fn enumeration<E, U>(&mut self, to_underlying: fn(E) -> U) -> EnumBuilder<'_, E, U>
    where
        E: TypeInfo + Default + Copy + PartialEq + Send + Sync,
        U: PrimitiveValue,
    {
        if !self.removing && !self.classes.contains(&E::type_uuid()) {
            self.enum_underlying.insert(E::type_uuid(), U::type_uuid());
        }
        let inner = self
            .class::<E>()
            .serializer(EnumSerializer::new(Vec::new(), to_underlying));
        EnumBuilder {
            inner,
            values: Vec::new(),
            to_underlying,
        }
    }
}

impl<'a, E, U> EnumBuilder<'a, E, U>
where
    E: TypeInfo + Copy + PartialEq + Any + Send + Sync,
    U: PrimitiveValue,
{
    /// Declares a named value.
    pub fn value(mut self, name: impl Into<Cow<'static, str>>, value: E) -> Self {
        if !self.inner.is_active() {
            return self;
        }
        self.values.push((name.into(), value));
        let serializer = EnumSerializer::new(self.values.clone(), self.to_underlying);
        self.inner = self.inner.serializer(serializer);
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.inner = self.inner.version(version);
        self
    }

    /// Attaches an attribute to the enum class.
    pub fn attribute<A: Any + Send + Sync>(mut self, id: u32, value: A) -> Self {
        self.inner = self.inner.attribute(id, value);
        self
    }

    /// Values declared so far.
    #[inline]
    pub fn values(&self) -> &[(Cow<'static, str>, E)] {
        &self.values
    }
}
