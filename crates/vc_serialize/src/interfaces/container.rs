use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::ClassElement;
use crate::info::TypeUuid;

// -----------------------------------------------------------------------------
// DataContainer

/// Uniform access to a collection type.
///
/// Elements are described by a [`ClassElement`] owned by the container.
/// Insertion is two-phase: [`reserve_element`] hands out a detached default
/// element, the caller fills it, and [`store_element`] commits it. A
/// partially loaded element is never visible in the collection.
///
/// Methods taking `instance` expect the collection itself; a mismatched
/// `instance` is treated as an empty collection.
///
/// [`reserve_element`]: DataContainer::reserve_element
/// [`store_element`]: DataContainer::store_element
pub trait DataContainer: Send + Sync {
    /// Name given to the serialized elements.
    #[inline]
    fn element_name(&self) -> &str {
        "element"
    }

    /// The element description matching `name_crc`.
    fn element(&self, name_crc: u32) -> Option<&ClassElement>;

    /// Visits every element type this container can hold.
    fn enum_types(&self, cb: &mut dyn FnMut(TypeUuid, &ClassElement) -> bool);

    /// Visits the elements in container order until `cb` returns `false`.
    fn enum_elements(&self, instance: &dyn Any, cb: &mut dyn FnMut(&dyn Any, &ClassElement) -> bool);

    /// Mutable variant of [`enum_elements`](DataContainer::enum_elements).
    fn enum_elements_mut(
        &self,
        instance: &mut dyn Any,
        cb: &mut dyn FnMut(&mut dyn Any, &ClassElement) -> bool,
    );

    /// Number of elements.
    fn size(&self, instance: &dyn Any) -> usize;

    /// Number of elements the container can hold without growing.
    #[inline]
    fn capacity(&self, instance: &dyn Any) -> usize {
        self.size(instance)
    }

    /// Whether element addresses survive insertion and removal.
    fn is_stable_elements(&self) -> bool;

    #[inline]
    fn is_fixed_size(&self) -> bool {
        false
    }

    #[inline]
    fn is_fixed_capacity(&self) -> bool {
        false
    }

    #[inline]
    fn is_smart_pointer(&self) -> bool {
        false
    }

    #[inline]
    fn is_sequence_container(&self) -> bool {
        false
    }

    #[inline]
    fn can_access_elements_by_index(&self) -> bool {
        false
    }

    /// Key access, for sets and maps.
    #[inline]
    fn associative(&self) -> Option<&dyn AssociativeDataContainer> {
        None
    }

    #[inline]
    fn element_by_index<'a>(&self, _instance: &'a dyn Any, _index: usize) -> Option<&'a dyn Any> {
        None
    }

    #[inline]
    fn element_by_index_mut<'a>(
        &self,
        _instance: &'a mut dyn Any,
        _index: usize,
    ) -> Option<&'a mut dyn Any> {
        None
    }

    #[inline]
    fn swap_elements(&self, _instance: &mut dyn Any, _a: usize, _b: usize) -> bool {
        false
    }

    /// Allocates a detached default element for `element`.
    ///
    /// Returns `None` if the container is full.
    fn reserve_element(&self, instance: &mut dyn Any, element: &ClassElement) -> Option<Box<dyn Any>>;

    /// Commits a reserved element. Gives it back on failure.
    fn store_element(&self, instance: &mut dyn Any, element: Box<dyn Any>) -> Result<(), Box<dyn Any>>;

    /// Drops a reserved element that will not be stored.
    #[inline]
    fn free_reserved_element(&self, _instance: &mut dyn Any, element: Box<dyn Any>) {
        drop(element);
    }

    /// Removes the element at `index` in container order.
    fn remove_element(&self, instance: &mut dyn Any, index: usize) -> bool;

    /// Removes several elements, returning how many were removed.
    fn remove_elements(&self, instance: &mut dyn Any, indices: &[usize]) -> usize {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        sorted
            .into_iter()
            .filter(|index| self.remove_element(instance, *index))
            .count()
    }

    fn clear_elements(&self, instance: &mut dyn Any);

    /// Called after elements were loaded or stored in bulk.
    #[inline]
    fn elements_updated(&self, _instance: &mut dyn Any) {}
}

// -----------------------------------------------------------------------------
// AssociativeDataContainer

/// Structural kind of an associative container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociativeType {
    Unknown,
    Set,
    Map,
    UnorderedSet,
    UnorderedMap,
}

impl AssociativeType {
    /// Whether element order carries no meaning.
    #[inline]
    pub const fn is_unordered(self) -> bool {
        matches!(self, Self::UnorderedSet | Self::UnorderedMap)
    }
}

/// Key access for set and map containers.
pub trait AssociativeDataContainer: Send + Sync {
    fn associative_type(&self) -> AssociativeType;

    /// Type of the keys.
    fn key_type(&self) -> TypeUuid;

    /// Allocates a default key, to be filled and passed to the lookups.
    fn allocate_key(&self) -> Box<dyn Any>;

    fn contains_key(&self, instance: &dyn Any, key: &dyn Any) -> bool;

    /// The value stored under `key`. For sets, the element itself.
    fn value_by_key<'a>(&self, instance: &'a dyn Any, key: &dyn Any) -> Option<&'a dyn Any>;

    fn value_by_key_mut<'a>(&self, instance: &'a mut dyn Any, key: &dyn Any) -> Option<&'a mut dyn Any>;

    /// Writes `key` into a reserved element.
    fn set_element_key(&self, element: &mut dyn Any, key: &dyn Any) -> bool;
}
