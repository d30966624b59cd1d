use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::mem;

use vc_utils::hash::{HashMap, new_map};
use vc_utils::{IdMap, TypeIdMap};

use crate::context::{ClassBuilder, ClassData, GenericClassInfo, RegistrationError, VersionConverter};
use crate::info::{TypeInfo, TypeUuid, name_crc};
use crate::interfaces::{DefaultFactory, ObjectFactory};

// -----------------------------------------------------------------------------
// SerializeContext

/// Registry of serialized types.
///
/// Owns one [`ClassData`] per registered type, plus secondary indices:
///
/// - name hash to ids; several classes may share a name.
/// - native [`TypeId`] to id, used to find the actual class behind a
///   polymorphic pointer.
/// - generic instantiations, with a reference count per instantiation.
/// - enum id to the id of its underlying integer type.
///
/// The registry is an explicit object: create one, register types through
/// [`class`](Self::class) and pass it by reference to everything that loads
/// or saves data. It does no internal locking.
///
/// # Removal mode
///
/// Reflection functions usually both register and unregister types. While
/// [`enable_remove_reflection`](Self::enable_remove_reflection) is active,
/// [`class`](Self::class) unregisters the type instead and the returned
/// builder ignores every call, so the same function can be run again to
/// undo its registrations.
pub struct SerializeContext {
    pub(crate) classes: IdMap<TypeUuid, ClassData>,
    pub(crate) name_index: HashMap<u32, Vec<TypeUuid>>,
    pub(crate) native_index: TypeIdMap<TypeUuid>,
    pub(crate) generic_infos: IdMap<TypeUuid, GenericClassInfo>,
    pub(crate) enum_underlying: IdMap<TypeUuid, TypeUuid>,
    pub(crate) removing: bool,
    pub(crate) errors: Vec<RegistrationError>,
}

impl Default for SerializeContext {
    /// See [`SerializeContext::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SerializeContext {
    /// Creates a registry without any type.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            classes: IdMap::new(),
            name_index: new_map(),
            native_index: TypeIdMap::new(),
            generic_infos: IdMap::new(),
            enum_underlying: IdMap::new(),
            removing: false,
            errors: Vec::new(),
        }
    }

    /// Creates a registry with the built-in leaf types.
    ///
    /// - `bool` `char` `f32` `f64` `String`
    /// - `i8 - i64` `u8 - u64`
    /// - [`DynamicSerializableField`](crate::impls::DynamicSerializableField)
    pub fn new() -> Self {
        let mut sc = Self::empty();
        crate::impls::reflect_builtins(&mut sc);
        sc
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Starts registering `T`, created with `T::default()`.
    ///
    /// A `T` that is already registered is rejected: the error is recorded
    /// and the returned builder ignores every call.
    #[inline]
    pub fn class<T: TypeInfo + Default>(&mut self) -> ClassBuilder<'_, T> {
        self.begin_class::<T>(Some(Arc::new(DefaultFactory::<T>::new())))
    }

    /// Starts registering `T` without a factory.
    ///
    /// Such a class can be walked and saved but never created by the
    /// registry, like an abstract base.
    #[inline]
    pub fn class_without_factory<T: TypeInfo>(&mut self) -> ClassBuilder<'_, T> {
        self.begin_class::<T>(None)
    }

    /// Starts registering `T` with a custom factory.
    #[inline]
    pub fn class_with_factory<T: TypeInfo>(
        &mut self,
        factory: impl ObjectFactory + 'static,
    ) -> ClassBuilder<'_, T> {
        self.begin_class::<T>(Some(Arc::new(factory)))
    }

    fn begin_class<T: TypeInfo>(&mut self, factory: Option<Arc<dyn ObjectFactory>>) -> ClassBuilder<'_, T> {
        let uuid = T::type_uuid();
        if self.removing {
            self.unregister_type(uuid);
            return ClassBuilder::removing(self);
        }

        if let Some(existing) = self.classes.get(&uuid) {
            let error = RegistrationError::DuplicateClass {
                uuid,
                name: T::type_name().into_owned(),
                existing: existing.name.to_string(),
            };
            self.report(error);
            return ClassBuilder::inert(self);
        }

        let mut class = ClassData::new(T::type_name(), uuid, Some(TypeId::of::<T>()));
        class.factory = factory;
        self.insert_class(class);
        ClassBuilder::active(self, uuid)
    }

    /// Registers a generic instantiation `T` of the template `generic`.
    ///
    /// The first call registers the class and returns an active builder.
    /// Later calls only add a reference and return an inert builder. In
    /// removal mode a reference is released instead, and the builder only
    /// cascades to dependencies once the class is gone.
    pub fn generic_class<T: TypeInfo + Default>(
        &mut self,
        generic: TypeUuid,
        arguments: &[TypeUuid],
    ) -> ClassBuilder<'_, T> {
        let specialized = T::type_uuid();
        if self.removing {
            // Only the release that drops the class cascades to the types
            // it depends on.
            let dropped = self.release_generic_class_info(specialized)
                && !self.generic_infos.contains(&specialized);
            return if dropped {
                ClassBuilder::removing(self)
            } else {
                ClassBuilder::inert(self)
            };
        }

        if let Some(info) = self.generic_infos.get_mut(&specialized) {
            info.ref_count += 1;
            return ClassBuilder::inert(self);
        }

        // A class registered by hand under this id stays a plain class and
        // the duplicate is reported by `class`.
        if !self.classes.contains(&specialized) {
            self.generic_infos.insert(
                specialized,
                GenericClassInfo {
                    generic,
                    specialized,
                    arguments: arguments.to_vec(),
                    ref_count: 1,
                },
            );
        }
        self.class::<T>()
    }

    /// Drops one reference to a generic instantiation, unregistering its
    /// class with the last one.
    ///
    /// Returns `false` if `specialized` is not a registered instantiation.
    pub fn release_generic_class_info(&mut self, specialized: TypeUuid) -> bool {
        let Some(info) = self.generic_infos.get_mut(&specialized) else {
            return false;
        };
        info.ref_count = info.ref_count.saturating_sub(1);
        if info.ref_count == 0 {
            self.unregister_type(specialized);
        }
        true
    }

    /// Registers a class that no longer exists.
    ///
    /// Data of a deprecated class is handed to `converter` during the
    /// version upgrade, or dropped if there is none.
    pub fn deprecate_class(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        uuid: TypeUuid,
        converter: Option<VersionConverter>,
    ) -> bool {
        if self.removing {
            if self.classes.get(&uuid).is_some_and(ClassData::is_deprecated) {
                self.unregister_type(uuid);
            }
            return false;
        }

        if self.classes.contains(&uuid) {
            self.report(RegistrationError::DuplicateDeprecation { uuid });
            return false;
        }

        let mut class = ClassData::new(name.into(), uuid, None);
        class.version = ClassData::VERSION_DEPRECATED;
        class.converter = converter;
        self.insert_class(class);
        true
    }

    /// Removes a registration.
    ///
    /// Returns `false` for unknown ids, without any other effect.
    pub fn unregister_type(&mut self, uuid: TypeUuid) -> bool {
        let Some(class) = self.classes.remove(&uuid) else {
            return false;
        };

        let crc = name_crc(&class.name);
        if let Some(ids) = self.name_index.get_mut(&crc) {
            ids.retain(|id| *id != uuid);
            if ids.is_empty() {
                self.name_index.remove(&crc);
            }
        }
        if let Some(native) = class.native
            && self.native_index.get(&native) == Some(&uuid)
        {
            self.native_index.remove(&native);
        }
        self.enum_underlying.remove(&uuid);
        self.generic_infos.remove(&uuid);
        true
    }

    pub(crate) fn insert_class(&mut self, class: ClassData) {
        let uuid = class.type_uuid;
        self.name_index
            .entry(name_crc(&class.name))
            .or_default()
            .push(uuid);
        if let Some(native) = class.native {
            self.native_index.insert(native, uuid);
        }
        self.classes.insert(uuid, class);
    }

    pub(crate) fn report(&mut self, error: RegistrationError) {
        log::error!("{error}");
        self.errors.push(error);
    }

    /// Switches [`class`](Self::class) to unregistering.
    #[inline]
    pub fn enable_remove_reflection(&mut self) {
        self.removing = true;
    }

    #[inline]
    pub fn disable_remove_reflection(&mut self) {
        self.removing = false;
    }

    #[inline]
    pub fn is_removing_reflection(&self) -> bool {
        self.removing
    }

    /// Registration errors recorded so far.
    #[inline]
    pub fn registration_errors(&self) -> &[RegistrationError] {
        &self.errors
    }

    #[inline]
    pub fn take_registration_errors(&mut self) -> Vec<RegistrationError> {
        mem::take(&mut self.errors)
    }

    // -------------------------------------------------------------------------
    // Lookup

    /// Number of registered classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Finds the class of `uuid`.
    ///
    /// `parent` and `name_crc` describe where the data was found. When
    /// `uuid` is not registered directly, an element of a generic container
    /// is resolved through the container's element description, then an
    /// enum through its underlying type. A miss returns `None` and is not an
    /// error.
    pub fn find_class_data(
        &self,
        uuid: TypeUuid,
        parent: Option<&ClassData>,
        name_crc: u32,
    ) -> Option<&ClassData> {
        if let Some(class) = self.classes.get(&uuid) {
            return Some(class);
        }

        if let Some(element) = parent
            .and_then(ClassData::container)
            .and_then(|container| container.element(name_crc))
        {
            let specialized = element.generic.unwrap_or(element.type_uuid);
            if self
                .generic_infos
                .get(&specialized)
                .is_some_and(|info| info.can_store(uuid))
            {
                return self.classes.get(&specialized);
            }
        }

        self.enum_underlying
            .get(&uuid)
            .and_then(|underlying| self.classes.get(underlying))
    }

    /// Finds the class registered from the native type `id`.
    #[inline]
    pub fn find_class_data_by_native(&self, id: TypeId) -> Option<&ClassData> {
        self.native_index.get(&id).and_then(|uuid| self.classes.get(uuid))
    }

    /// The id registered for the native type `id`.
    #[inline]
    pub fn type_uuid_of_native(&self, id: TypeId) -> Option<TypeUuid> {
        self.native_index.get(&id).copied()
    }

    /// Ids of every class named with `name_crc`.
    #[inline]
    pub fn find_class_id(&self, name_crc: u32) -> &[TypeUuid] {
        self.name_index.get(&name_crc).map_or(&[][..], Vec::as_slice)
    }

    /// The first class registered under `name`.
    pub fn find_class_data_by_name(&self, name: &str) -> Option<&ClassData> {
        self.find_class_id(name_crc(name))
            .iter()
            .find_map(|uuid| self.classes.get(uuid))
    }

    /// The instantiation record of a generic class.
    #[inline]
    pub fn generic_class_info(&self, specialized: TypeUuid) -> Option<&GenericClassInfo> {
        self.generic_infos.get(&specialized)
    }

    /// Finds the instantiation of `generic` with `arguments`.
    pub fn find_generic_class_info(
        &self,
        generic: TypeUuid,
        arguments: &[TypeUuid],
    ) -> Option<&GenericClassInfo> {
        self.generic_infos
            .values()
            .find(|info| info.generic == generic && info.arguments == arguments)
    }

    /// The underlying integer type of a registered enum.
    #[inline]
    pub fn underlying_type_id(&self, enum_uuid: TypeUuid) -> Option<TypeUuid> {
        self.enum_underlying.get(&enum_uuid).copied()
    }

    /// Creates a default instance of `uuid` through its factory.
    pub fn create_any(&self, uuid: TypeUuid) -> Option<Box<dyn Any>> {
        self.classes.get(&uuid)?.factory.as_ref()?.create()
    }

    /// Visits every registered class until `cb` returns `false`.
    pub fn enumerate_all(&self, mut cb: impl FnMut(&ClassData) -> bool) {
        for class in self.classes.values() {
            if !cb(class) {
                return;
            }
        }
    }

    /// Visits the base classes of `uuid`, depth first in declaration order,
    /// until `cb` returns `false`.
    pub fn enumerate_base(&self, uuid: TypeUuid, mut cb: impl FnMut(&ClassData) -> bool) {
        self.enumerate_base_inner(uuid, &mut cb);
    }

    fn enumerate_base_inner(&self, uuid: TypeUuid, cb: &mut dyn FnMut(&ClassData) -> bool) -> bool {
        let Some(class) = self.classes.get(&uuid) else {
            return true;
        };
        for base in class.base_elements() {
            let Some(base_class) = self.classes.get(&base.type_uuid) else {
                continue;
            };
            if !cb(base_class) || !self.enumerate_base_inner(base.type_uuid, cb) {
                return false;
            }
        }
        true
    }

    /// Visits every class deriving from `uuid`, directly or not, until `cb`
    /// returns `false`. Siblings are visited in id order.
    pub fn enumerate_derived(&self, uuid: TypeUuid, mut cb: impl FnMut(&ClassData) -> bool) {
        self.enumerate_derived_inner(uuid, &mut cb);
    }

    fn enumerate_derived_inner(
        &self,
        uuid: TypeUuid,
        cb: &mut dyn FnMut(&ClassData) -> bool,
    ) -> bool {
        let mut derived: Vec<&ClassData> = self
            .classes
            .values()
            .filter(|class| class.base_elements().any(|base| base.type_uuid == uuid))
            .collect();
        derived.sort_by_key(|class| class.type_uuid);

        for class in derived {
            if !cb(class) || !self.enumerate_derived_inner(class.type_uuid, cb) {
                return false;
            }
        }
        true
    }

    /// Whether `from` is `to` or derives from it.
    pub fn can_downcast(&self, from: TypeUuid, to: TypeUuid) -> bool {
        if from == to {
            return true;
        }
        let mut found = false;
        self.enumerate_base(from, |base| {
            found = base.type_uuid == to;
            !found
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::test_types::{Base, Derived, Shape, reflect_all};

    fn context() -> SerializeContext {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);
        sc
    }

    #[test]
    fn lookup_miss_is_not_an_error() {
        let sc = context();
        assert!(sc.find_class_data(TypeUuid::from_u128(1), None, 0).is_none());
        assert!(sc.registration_errors().is_empty());
        assert!(sc.create_any(TypeUuid::from_u128(1)).is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut sc = context();
        let before = sc.len();
        let builder = sc.class::<Base>();
        assert!(!builder.is_active());
        builder.field("z", |b| &b.x, |b| &mut b.x);

        assert_eq!(sc.len(), before);
        let base = sc.find_class_data(Base::type_uuid(), None, 0).unwrap();
        assert_eq!(base.elements().len(), 1);
        assert!(matches!(
            sc.take_registration_errors()[..],
            [RegistrationError::DuplicateClass { .. }]
        ));
    }

    #[test]
    fn indices() {
        let sc = context();
        let derived = sc.find_class_data_by_native(TypeId::of::<Derived>()).unwrap();
        assert_eq!(derived.type_uuid(), Derived::type_uuid());
        assert_eq!(sc.find_class_id(name_crc("Derived")), &[Derived::type_uuid()]);
        assert_eq!(sc.underlying_type_id(Shape::type_uuid()), Some(u8::type_uuid()));
        assert!(sc.find_class_id(name_crc("Missing")).is_empty());

        let created = sc.create_any(Derived::type_uuid()).unwrap();
        assert!(created.downcast_ref::<Derived>().is_some());
    }

    #[test]
    fn hierarchy() {
        let sc = context();
        let mut bases = Vec::new();
        sc.enumerate_base(Derived::type_uuid(), |class| {
            bases.push(class.type_uuid());
            true
        });
        assert_eq!(bases, [Base::type_uuid()]);

        let mut derived = Vec::new();
        sc.enumerate_derived(Base::type_uuid(), |class| {
            derived.push(class.type_uuid());
            true
        });
        assert_eq!(derived, [Derived::type_uuid()]);

        assert!(sc.can_downcast(Derived::type_uuid(), Base::type_uuid()));
        assert!(!sc.can_downcast(Base::type_uuid(), Derived::type_uuid()));
    }

    #[test]
    fn unregister_and_deprecate() {
        let mut sc = context();
        assert!(sc.unregister_type(Base::type_uuid()));
        assert!(!sc.unregister_type(Base::type_uuid()));
        assert!(sc.find_class_data_by_name("Base").is_none());
        assert!(sc.find_class_data_by_native(TypeId::of::<Base>()).is_none());

        let old = TypeUuid::from_u128(0x77);
        assert!(sc.deprecate_class("Old", old, None));
        assert!(!sc.deprecate_class("Old", old, None));
        assert!(sc.find_class_data(old, None, 0).unwrap().is_deprecated());
        assert!(matches!(
            sc.registration_errors(),
            [RegistrationError::DuplicateDeprecation { .. }]
        ));
    }

    #[test]
    fn generic_references() {
        let mut sc = context();
        let uuid = <Vec<i32>>::type_uuid();
        assert_eq!(sc.generic_class_info(uuid).map(GenericClassInfo::ref_count), Some(1));

        <Vec<i32>>::reflect_generic(&mut sc);
        assert_eq!(sc.generic_class_info(uuid).map(GenericClassInfo::ref_count), Some(2));

        assert!(sc.release_generic_class_info(uuid));
        assert!(sc.find_class_data(uuid, None, 0).is_some());
        assert!(sc.release_generic_class_info(uuid));
        assert!(sc.find_class_data(uuid, None, 0).is_none());
        assert!(!sc.release_generic_class_info(uuid));
    }
}
