use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::any::Any;
use core::marker::PhantomData;
use core::mem::size_of;

use crate::context::{BoxedAccess, DynAccess, ElementAccess, ValueAccess};
use crate::context::{ClassData, ClassElement, ElementFlags};
use crate::context::{RegistrationError, SerializeContext, VersionConverter};
use crate::info::{TypeInfo, TypeUuid, name_crc};
use crate::interfaces::{DataContainer, DataSerializer, EventHandler};
use crate::upgrade::FieldUpgrade;

// -----------------------------------------------------------------------------
// ClassBuilder

#[derive(Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Active(TypeUuid),
    /// Registration failed or there is nothing to declare.
    Inert,
    /// Removal mode: generic field types are still released.
    Removing,
}

/// Fluent declaration of a class, returned by [`SerializeContext::class`].
///
/// Calls chain by value. After a rejected call the builder becomes inert
/// and ignores every following call; the rejection is recorded in
/// [`SerializeContext::registration_errors`].
///
/// Base classes are views of the class, reached through an accessor.
/// They are always placed before fields, whatever the call order.
///
/// # Examples
///
/// ```
/// use vc_serialize::{SerializeContext, impl_type_info};
///
/// #[derive(Default)]
/// struct Base { x: i32 }
///
/// #[derive(Default)]
/// struct Derived { base: Base, y: i32 }
///
/// impl_type_info!(Base, "Base", 0x0d3c5a5e_8a63_4d3e_9c2f_7b2ed6c2a001);
/// impl_type_info!(Derived, "Derived", 0x0d3c5a5e_8a63_4d3e_9c2f_7b2ed6c2a002);
///
/// let mut sc = SerializeContext::new();
/// sc.class::<Base>()
///     .field("x", |b: &Base| &b.x, |b: &mut Base| &mut b.x);
/// sc.class::<Derived>()
///     .base(|d: &Derived| &d.base, |d: &mut Derived| &mut d.base)
///     .field("y", |d: &Derived| &d.y, |d: &mut Derived| &mut d.y);
///
/// let derived = sc.find_class_data_by_name("Derived").unwrap();
/// assert_eq!(derived.elements()[0].name(), "BaseClass1");
/// assert_eq!(derived.elements()[1].name(), "y");
/// ```
pub struct ClassBuilder<'a, T> {
    sc: &'a mut SerializeContext,
    state: BuilderState,
    last_element: Option<usize>,
    _marker: PhantomData<fn(T)>,
}

impl<'a, T: TypeInfo> ClassBuilder<'a, T> {
    #[inline]
    pub(crate) fn active(sc: &'a mut SerializeContext, uuid: TypeUuid) -> Self {
        Self::with_state(sc, BuilderState::Active(uuid))
    }

    #[inline]
    pub(crate) fn inert(sc: &'a mut SerializeContext) -> Self {
        Self::with_state(sc, BuilderState::Inert)
    }

    #[inline]
    pub(crate) fn removing(sc: &'a mut SerializeContext) -> Self {
        Self::with_state(sc, BuilderState::Removing)
    }

    #[inline]
    fn with_state(sc: &'a mut SerializeContext, state: BuilderState) -> Self {
        Self {
            sc,
            state,
            last_element: None,
            _marker: PhantomData,
        }
    }

    /// Whether calls on this builder still have an effect.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, BuilderState::Active(_))
    }

    fn class_mut(&mut self) -> Option<&mut ClassData> {
        match self.state {
            BuilderState::Active(uuid) => self.sc.classes.get_mut(&uuid),
            _ => None,
        }
    }

    fn fail(mut self, error: RegistrationError) -> Self {
        self.sc.report(error);
        self.state = BuilderState::Inert;
        self
    }

    fn with_class(mut self, f: impl FnOnce(&mut ClassData)) -> Self {
        if let Some(class) = self.class_mut() {
            f(class);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Class settings

    /// Sets the current version. Data saved with an older version goes
    /// through the field upgrades of this class when loaded.
    pub fn version(self, version: u32) -> Self {
        self.with_class(|class| class.version = version)
    }

    /// Sets the current version and a converter that takes over upgrading
    /// older data from the field upgrades.
    pub fn version_with_converter(self, version: u32, converter: VersionConverter) -> Self {
        self.with_class(|class| {
            class.version = version;
            class.converter = Some(converter);
        })
    }

    /// Makes the class a leaf stored through `serializer`.
    ///
    /// Rejected for a class that already declares elements.
    pub fn serializer(mut self, serializer: impl DataSerializer + 'static) -> Self {
        let Some(class) = self.class_mut() else {
            return self;
        };
        if !class.elements.is_empty() {
            let class = class.name.to_string();
            return self.fail(RegistrationError::CompositeWithSerializer { class });
        }
        class.serializer = Some(Arc::new(serializer));
        self
    }

    /// Accepts an empty payload as a valid value of a leaf.
    pub fn serialize_with_no_data(self) -> Self {
        self.with_class(|class| class.serialize_no_data = true)
    }

    pub fn event_handler(self, handler: impl EventHandler + 'static) -> Self {
        self.with_class(|class| class.event_handler = Some(Arc::new(handler)))
    }

    /// Makes the class a collection reached through `container`.
    pub fn data_container(self, container: impl DataContainer + 'static) -> Self {
        self.with_class(|class| class.container = Some(Arc::new(container)))
    }

    /// Declares a stable id for instances.
    pub fn persistent_id(self, f: fn(&T) -> u64) -> Self {
        self.with_class(|class| {
            class.persistent_id = Some(Arc::new(move |instance: &dyn Any| {
                instance.downcast_ref::<T>().map(f)
            }));
        })
    }

    /// Declares a predicate that skips saving some instances.
    pub fn do_save(self, f: fn(&T) -> bool) -> Self {
        self.with_class(|class| {
            class.do_save = Some(Arc::new(move |instance: &dyn Any| {
                instance.downcast_ref::<T>().is_some_and(f)
            }));
        })
    }

    /// Attaches an attribute to the last declared element, or to the class
    /// if no element was declared yet.
    pub fn attribute<A: Any + Send + Sync>(mut self, id: u32, value: A) -> Self {
        let last = self.last_element;
        if let Some(class) = self.class_mut() {
            match last.and_then(|index| class.elements.get_mut(index)) {
                Some(element) => element.attributes.insert(id, value),
                None => class.attributes.insert(id, value),
            };
        }
        self
    }

    /// Registers the types this class needs, such as the element type of a
    /// container. Skipped when the builder is inert.
    pub fn depends_on<D: TypeInfo>(self) -> Self {
        if self.state != BuilderState::Inert {
            D::reflect_generic(self.sc);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Elements

    /// Declares a base class view `B`, named `BaseClass{n}`.
    pub fn base<B: TypeInfo>(self, get: fn(&T) -> &B, get_mut: fn(&mut T) -> &mut B) -> Self {
        if !self.is_active() {
            return self;
        }
        let element = ClassElement::new(Cow::Borrowed(""), B::type_uuid(), size_of::<B>())
            .with_flags(ElementFlags::BASE_CLASS)
            .with_access(Arc::new(ValueAccess::new(get, get_mut)));
        self.push_element(element)
    }

    /// Declares a field stored by value.
    pub fn field<F: TypeInfo>(
        self,
        name: impl Into<Cow<'static, str>>,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        self.field_with_flags(name, ElementFlags::empty(), get, get_mut)
    }

    pub fn field_with_flags<F: TypeInfo>(
        self,
        name: impl Into<Cow<'static, str>>,
        flags: ElementFlags,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        let access = Arc::new(ValueAccess::new(get, get_mut));
        self.typed_element::<F>(name.into(), flags, access)
    }

    /// Declares a nullable owned pointer field, `Option<Box<F>>`.
    pub fn boxed_field<F: TypeInfo>(
        self,
        name: impl Into<Cow<'static, str>>,
        get: fn(&T) -> &Option<Box<F>>,
        get_mut: fn(&mut T) -> &mut Option<Box<F>>,
    ) -> Self {
        let access = Arc::new(BoxedAccess::new(get, get_mut));
        self.typed_element::<F>(name.into(), ElementFlags::POINTER, access)
    }

    /// Declares a polymorphic pointer field, `Option<Box<dyn Any>>`.
    ///
    /// The pointee may be of any registered class; its class is found
    /// from its native type.
    pub fn dyn_field(
        self,
        name: impl Into<Cow<'static, str>>,
        get: fn(&T) -> &Option<Box<dyn Any>>,
        get_mut: fn(&mut T) -> &mut Option<Box<dyn Any>>,
    ) -> Self {
        if !self.is_active() {
            return self;
        }
        let element = ClassElement::new(name, TypeUuid::NULL, size_of::<Option<Box<dyn Any>>>())
            .with_flags(ElementFlags::POINTER | ElementFlags::DYNAMIC_FIELD)
            .with_access(Arc::new(DynAccess::new(get, get_mut)));
        self.push_element(element)
    }

    fn typed_element<F: TypeInfo>(
        mut self,
        name: Cow<'static, str>,
        flags: ElementFlags,
        access: Arc<dyn ElementAccess>,
    ) -> Self {
        if self.state == BuilderState::Inert {
            return self;
        }

        let uuid = F::type_uuid();
        let element = ClassElement::new(name, uuid, size_of::<F>())
            .with_flags(flags)
            .with_access(access);
        // Rejected before the field type is registered, so a rejected call
        // leaves the registry unchanged.
        if let Some(error) = self.class_mut().and_then(|class| Self::rejection(class, &element)) {
            return self.fail(error);
        }

        F::reflect_generic(self.sc);
        if !self.is_active() {
            return self;
        }
        if self.sc.generic_infos.contains(&uuid) {
            return self.push_element(element.with_generic(uuid));
        }
        self.push_element(element)
    }

    fn rejection(class: &ClassData, element: &ClassElement) -> Option<RegistrationError> {
        if class.serializer.is_some() {
            return Some(RegistrationError::LeafWithElements {
                class: class.name.to_string(),
                element: element.name.to_string(),
            });
        }
        if class.element(element.name_crc).is_some() {
            return Some(RegistrationError::DuplicateElement {
                class: class.name.to_string(),
                element: element.name.to_string(),
            });
        }
        None
    }

    fn push_element(mut self, mut element: ClassElement) -> Self {
        let Some(class) = self.class_mut() else {
            return self;
        };

        let index = if element.is_base_class() {
            let index = class.base_elements().count();
            element.name = format!("BaseClass{}", index + 1).into();
            element.name_crc = name_crc(&element.name);
            index
        } else {
            class.elements.len()
        };

        if let Some(error) = Self::rejection(class, &element) {
            return self.fail(error);
        }

        class.elements.insert(index, element);
        self.last_element = Some(index);
        self
    }

    // -------------------------------------------------------------------------
    // Upgrades

    /// Renames field `old_name` to `new_name` for data saved between
    /// versions `from` and `to`.
    pub fn name_change(
        self,
        from: u32,
        to: u32,
        old_name: impl Into<Cow<'static, str>>,
        new_name: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.upgrade(FieldUpgrade::rename(old_name, new_name, from, to))
    }

    /// Converts field `field` from `A` to `B` for data saved between
    /// versions `from` and `to`.
    pub fn type_change<A: TypeInfo, B: TypeInfo>(
        self,
        field: impl Into<Cow<'static, str>>,
        from: u32,
        to: u32,
        convert: fn(A) -> B,
    ) -> Self {
        if self.state == BuilderState::Inert {
            return self;
        }
        A::reflect_generic(self.sc);
        B::reflect_generic(self.sc);
        self.upgrade(FieldUpgrade::retype(field, from, to, convert))
    }

    /// Adds a prepared field upgrade.
    pub fn upgrade(mut self, upgrade: FieldUpgrade) -> Self {
        let Some(class) = self.class_mut() else {
            return self;
        };

        let (from, to) = (upgrade.from, upgrade.to);
        if to <= from {
            let error = RegistrationError::BackwardUpgrade {
                class: class.name.to_string(),
                field: upgrade.field_name.to_string(),
                from,
                to,
            };
            return self.fail(error);
        }

        let field = upgrade.field_name.to_string();
        if !class.upgrades.add(upgrade) {
            let error = RegistrationError::DuplicateUpgrade {
                class: class.name.to_string(),
                field,
                from,
                to,
            };
            return self.fail(error);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;
    use crate::impl_type_info;
    use crate::impls::PrimitiveSerializer;

    #[derive(Default)]
    struct Record {
        a: i32,
        b: String,
        list: Vec<u16>,
    }

    impl_type_info!(Record, "Record", 0x3b0d7f7e_52c4_4f6e_a1f9_6d0e2c8b4a01);

    #[test]
    fn duplicate_element_keeps_first() {
        let mut sc = SerializeContext::new();
        let builder = sc.class::<Record>().field("a", |r| &r.a, |r| &mut r.a);
        let before = builder.sc.len();
        builder
            .field("a", |r| &r.list, |r| &mut r.list)
            .field("b", |r| &r.b, |r| &mut r.b);

        assert_eq!(sc.len(), before);
        assert!(sc.generic_class_info(<Vec<u16>>::type_uuid()).is_none());
        let record = sc.find_class_data(Record::type_uuid(), None, 0).unwrap();
        assert_eq!(record.elements().len(), 1);
        assert_eq!(record.elements()[0].type_uuid(), i32::type_uuid());
        assert!(matches!(
            sc.registration_errors(),
            [RegistrationError::DuplicateElement { .. }]
        ));
    }

    #[test]
    fn rejected_generic_field_on_leaf() {
        let mut sc = SerializeContext::new();
        sc.class::<Record>()
            .serializer(PrimitiveSerializer::<i32>::new())
            .field("list", |r| &r.list, |r| &mut r.list);

        assert!(sc.find_class_data(<Vec<u16>>::type_uuid(), None, 0).is_none());
        assert!(matches!(
            sc.registration_errors(),
            [RegistrationError::LeafWithElements { .. }]
        ));
    }

    #[test]
    fn leaf_and_composite_are_exclusive() {
        let mut sc = SerializeContext::new();
        sc.class::<Record>()
            .field("a", |r| &r.a, |r| &mut r.a)
            .serializer(PrimitiveSerializer::<i32>::new());

        let record = sc.find_class_data(Record::type_uuid(), None, 0).unwrap();
        assert!(record.serializer().is_none());
        assert!(matches!(
            sc.registration_errors(),
            [RegistrationError::CompositeWithSerializer { .. }]
        ));
    }

    #[test]
    fn upgrades_must_go_forward() {
        let mut sc = SerializeContext::new();
        sc.class::<Record>()
            .version(2)
            .field("alpha", |r| &r.a, |r| &mut r.a)
            .name_change(1, 1, "a", "alpha")
            .field("b", |r| &r.b, |r| &mut r.b);

        let record = sc.find_class_data(Record::type_uuid(), None, 0).unwrap();
        assert_eq!(record.version(), 2);
        assert_eq!(record.elements().len(), 1);
        assert!(matches!(
            sc.registration_errors(),
            [RegistrationError::BackwardUpgrade { from: 1, to: 1, .. }]
        ));
    }

    #[test]
    fn removal_mode() {
        let mut sc = SerializeContext::new();
        let reflect = |sc: &mut SerializeContext| {
            sc.class::<Record>()
                .field("a", |r| &r.a, |r| &mut r.a)
                .field("b", |r| &r.b, |r| &mut r.b);
        };

        reflect(&mut sc);
        assert!(sc.find_class_data_by_name("Record").is_some());

        sc.enable_remove_reflection();
        reflect(&mut sc);
        sc.disable_remove_reflection();
        assert!(sc.find_class_data_by_name("Record").is_none());
        assert!(sc.registration_errors().is_empty());
    }
}
