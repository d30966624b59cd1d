use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use bitflags::bitflags;

use crate::context::ElementAccess;
use crate::info::{Attributes, TypeUuid, name_crc};

bitflags! {
    /// Kind of a [`ClassElement`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// The element is a nullable pointer to its value.
        const POINTER          = 1 << 0;
        /// The element is a base class view, named `BaseClass{n}`.
        const BASE_CLASS       = 1 << 1;
        /// The element is never compared against a default value.
        const NO_DEFAULT_VALUE = 1 << 2;
        /// The pointee type is only known at runtime.
        const DYNAMIC_FIELD    = 1 << 3;
    }
}

// -----------------------------------------------------------------------------
// ClassElement

/// One field or base class slot of a [`ClassData`](crate::ClassData).
///
/// Container element descriptions have no accessor; the container reaches
/// its elements itself.
pub struct ClassElement {
    pub(crate) name: Cow<'static, str>,
    pub(crate) name_crc: u32,
    pub(crate) type_uuid: TypeUuid,
    pub(crate) data_size: usize,
    pub(crate) flags: ElementFlags,
    pub(crate) access: Option<Arc<dyn ElementAccess>>,
    pub(crate) generic: Option<TypeUuid>,
    pub(crate) attributes: Attributes,
}

impl ClassElement {
    /// Creates an element description without accessor.
    pub fn new(name: impl Into<Cow<'static, str>>, type_uuid: TypeUuid, data_size: usize) -> Self {
        let name = name.into();
        Self {
            name_crc: name_crc(&name),
            name,
            type_uuid,
            data_size,
            flags: ElementFlags::empty(),
            access: None,
            generic: None,
            attributes: Attributes::new(),
        }
    }

    #[inline]
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn with_access(mut self, access: Arc<dyn ElementAccess>) -> Self {
        self.access = Some(access);
        self
    }

    /// Marks the element type as a generic instantiation, by the
    /// specialized id of its [`GenericClassInfo`](crate::GenericClassInfo).
    #[inline]
    pub fn with_generic(mut self, specialized: TypeUuid) -> Self {
        self.generic = Some(specialized);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn name_crc(&self) -> u32 {
        self.name_crc
    }

    /// Declared type of the value. For pointers, the pointee's static type.
    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.type_uuid
    }

    /// `size_of` the declared value type.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    #[inline]
    pub fn flags(&self) -> ElementFlags {
        self.flags
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.flags.contains(ElementFlags::POINTER)
    }

    #[inline]
    pub fn is_base_class(&self) -> bool {
        self.flags.contains(ElementFlags::BASE_CLASS)
    }

    #[inline]
    pub fn access(&self) -> Option<&dyn ElementAccess> {
        self.access.as_deref()
    }

    #[inline]
    pub fn generic(&self) -> Option<TypeUuid> {
        self.generic
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

impl fmt::Debug for ClassElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassElement")
            .field("name", &self.name)
            .field("type_uuid", &self.type_uuid)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
