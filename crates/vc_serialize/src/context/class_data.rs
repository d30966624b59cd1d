use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::context::{ClassElement, SerializeContext};
use crate::info::{Attributes, TypeUuid};
use crate::interfaces::{DataContainer, DataSerializer, EventHandler, ObjectFactory};
use crate::tree::DataElementNode;
use crate::upgrade::UpgradeTable;

// -----------------------------------------------------------------------------
// Callbacks

/// Whole-class version converter.
///
/// Runs on a node whose version is older than the class. Returning `false`
/// drops the node.
pub type VersionConverter = fn(&SerializeContext, &mut DataElementNode) -> bool;

/// Returns a stable id of an instance, used to match container elements.
pub type PersistentIdFn = Arc<dyn Fn(&dyn Any) -> Option<u64> + Send + Sync>;

/// Returns `false` if an instance must not be saved.
pub type DoSaveFn = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

// -----------------------------------------------------------------------------
// ClassData

/// Everything the registry knows about one serialized type.
///
/// A class is either a leaf with a [`DataSerializer`] or a composite made
/// of [`ClassElement`]s, never both. Base class elements precede fields.
pub struct ClassData {
    pub(crate) name: Cow<'static, str>,
    pub(crate) type_uuid: TypeUuid,
    pub(crate) native: Option<TypeId>,
    pub(crate) version: u32,
    pub(crate) converter: Option<VersionConverter>,
    pub(crate) factory: Option<Arc<dyn ObjectFactory>>,
    pub(crate) serializer: Option<Arc<dyn DataSerializer>>,
    pub(crate) container: Option<Arc<dyn DataContainer>>,
    pub(crate) event_handler: Option<Arc<dyn EventHandler>>,
    pub(crate) persistent_id: Option<PersistentIdFn>,
    pub(crate) do_save: Option<DoSaveFn>,
    pub(crate) elements: Vec<ClassElement>,
    pub(crate) attributes: Attributes,
    pub(crate) upgrades: UpgradeTable,
    pub(crate) serialize_no_data: bool,
}

impl ClassData {
    /// Version given to deprecated classes.
    pub const VERSION_DEPRECATED: u32 = u32::MAX;

    pub(crate) fn new(name: Cow<'static, str>, type_uuid: TypeUuid, native: Option<TypeId>) -> Self {
        Self {
            name,
            type_uuid,
            native,
            version: 0,
            converter: None,
            factory: None,
            serializer: None,
            container: None,
            event_handler: None,
            persistent_id: None,
            do_save: None,
            elements: Vec::new(),
            attributes: Attributes::new(),
            upgrades: UpgradeTable::new(),
            serialize_no_data: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.type_uuid
    }

    /// The native type this class was registered from, if any.
    #[inline]
    pub fn native_type(&self) -> Option<TypeId> {
        self.native
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn converter(&self) -> Option<VersionConverter> {
        self.converter
    }

    #[inline]
    pub fn factory(&self) -> Option<&dyn ObjectFactory> {
        self.factory.as_deref()
    }

    #[inline]
    pub fn serializer(&self) -> Option<&dyn DataSerializer> {
        self.serializer.as_deref()
    }

    #[inline]
    pub fn container(&self) -> Option<&dyn DataContainer> {
        self.container.as_deref()
    }

    #[inline]
    pub fn event_handler(&self) -> Option<&dyn EventHandler> {
        self.event_handler.as_deref()
    }

    #[inline]
    pub fn elements(&self) -> &[ClassElement] {
        &self.elements
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn upgrades(&self) -> &UpgradeTable {
        &self.upgrades
    }

    /// Whether an empty leaf payload is a valid value.
    #[inline]
    pub fn serializes_no_data(&self) -> bool {
        self.serialize_no_data
    }

    #[inline]
    pub fn is_deprecated(&self) -> bool {
        self.version == Self::VERSION_DEPRECATED
    }

    /// A leaf is a class stored as one opaque blob.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.serializer.is_some()
    }

    /// Finds an element by name hash.
    pub fn element(&self, name_crc: u32) -> Option<&ClassElement> {
        self.elements.iter().find(|e| e.name_crc == name_crc)
    }

    /// Base class elements, in declaration order.
    pub fn base_elements(&self) -> impl Iterator<Item = &ClassElement> {
        self.elements.iter().filter(|e| e.is_base_class())
    }

    /// Returns `false` if `instance` opted out of being saved.
    #[inline]
    pub fn should_save(&self, instance: &dyn Any) -> bool {
        self.do_save.as_ref().is_none_or(|f| f(instance))
    }

    /// The persistent id of `instance`, searching base classes when this
    /// class declares none.
    pub fn persistent_id(&self, sc: &SerializeContext, instance: &dyn Any) -> Option<u64> {
        if let Some(f) = &self.persistent_id {
            return f(instance);
        }
        self.base_elements().find_map(|base| {
            let base_class = sc.find_class_data(base.type_uuid, None, 0)?;
            let view = base.access()?.get(instance)?;
            base_class.persistent_id(sc, view)
        })
    }
}

impl fmt::Debug for ClassData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassData")
            .field("name", &self.name)
            .field("type_uuid", &self.type_uuid)
            .field("version", &self.version)
            .field("leaf", &self.is_leaf())
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}
