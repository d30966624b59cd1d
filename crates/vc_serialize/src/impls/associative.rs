use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::vec::Vec;
use core::any::Any;
use core::hash::Hash;
use core::marker::PhantomData;
use core::mem::{self, size_of};

use vc_utils::hash::{HashMap, HashSet};

use crate::info::{TypeInfo, TypeUuid};
use crate::interfaces::{AssociativeDataContainer, AssociativeType, DataContainer};
use crate::{ClassElement, SerializeContext};

const BTREE_MAP_TEMPLATE: TypeUuid = TypeUuid::from_u128(0x4c2bd9a6_0f7e_4b38_b1a5_6e93d27c4f10);
const HASH_MAP_TEMPLATE: TypeUuid = TypeUuid::from_u128(0x9e1f5c37_a2d4_4c86_8b0e_31f7a6d5c922);
const BTREE_SET_TEMPLATE: TypeUuid = TypeUuid::from_u128(0x1d8a7e42_c5b9_4f03_a6e1_82c4b0f9d733);
const HASH_SET_TEMPLATE: TypeUuid = TypeUuid::from_u128(0x6b3e0f95_d17a_4e2c_9f48_c0a5e8b1f644);

// -----------------------------------------------------------------------------
// Maps
//
// Map elements are `(K, V)` pairs, which a map does not store as such.
// Reading clones each entry into a pair; writing drains the map into pairs
// and rebuilds it, since a visitor may change keys.

macro_rules! impl_map_container {
    (
        $container:ident, $map:ident, $template:ident, $name:literal, $kind:expr,
        [$($key_bound:tt)*]
    ) => {
        #[doc = concat!("Container of `", stringify!($map), "<K, V>`.")]
        pub struct $container<K, V> {
            element: ClassElement,
            _marker: PhantomData<fn() -> (K, V)>,
        }

        impl<K, V> $container<K, V>
        where
            K: TypeInfo + Default + Clone + $($key_bound)*,
            V: TypeInfo + Default + Clone,
        {
            pub fn new() -> Self {
                Self {
                    element: ClassElement::new(
                        "element",
                        <(K, V)>::type_uuid(),
                        size_of::<(K, V)>(),
                    ),
                    _marker: PhantomData,
                }
            }
        }

        impl<K, V> Default for $container<K, V>
        where
            K: TypeInfo + Default + Clone + $($key_bound)*,
            V: TypeInfo + Default + Clone,
        {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl<K, V> DataContainer for $container<K, V>
        where
            K: TypeInfo + Default + Clone + Send + Sync + $($key_bound)*,
            V: TypeInfo + Default + Clone + Send + Sync,
        {
            fn element(&self, name_crc: u32) -> Option<&ClassElement> {
                (name_crc == self.element.name_crc()).then_some(&self.element)
            }

            fn enum_types(&self, cb: &mut dyn FnMut(TypeUuid, &ClassElement) -> bool) {
                cb(self.element.type_uuid(), &self.element);
            }

            fn enum_elements(
                &self,
                instance: &dyn Any,
                cb: &mut dyn FnMut(&dyn Any, &ClassElement) -> bool,
            ) {
                let Some(map) = instance.downcast_ref::<$map<K, V>>() else {
                    return;
                };
                for (key, value) in map {
                    let pair = (key.clone(), value.clone());
                    if !cb(&pair, &self.element) {
                        break;
                    }
                }
            }

            fn enum_elements_mut(
                &self,
                instance: &mut dyn Any,
                cb: &mut dyn FnMut(&mut dyn Any, &ClassElement) -> bool,
            ) {
                let Some(map) = instance.downcast_mut::<$map<K, V>>() else {
                    return;
                };
                let mut pairs: Vec<(K, V)> = mem::take(map).into_iter().collect();
                for pair in &mut pairs {
                    if !cb(pair, &self.element) {
                        break;
                    }
                }
                map.extend(pairs);
            }

            fn size(&self, instance: &dyn Any) -> usize {
                instance.downcast_ref::<$map<K, V>>().map_or(0, |map| map.len())
            }

            #[inline]
            fn is_stable_elements(&self) -> bool {
                false
            }

            #[inline]
            fn associative(&self) -> Option<&dyn AssociativeDataContainer> {
                Some(self)
            }

            fn reserve_element(
                &self,
                _instance: &mut dyn Any,
                _element: &ClassElement,
            ) -> Option<Box<dyn Any>> {
                Some(Box::new(<(K, V)>::default()))
            }

            fn store_element(
                &self,
                instance: &mut dyn Any,
                element: Box<dyn Any>,
            ) -> Result<(), Box<dyn Any>> {
                let Some(map) = instance.downcast_mut::<$map<K, V>>() else {
                    return Err(element);
                };
                let (key, value) = *element.downcast::<(K, V)>()?;
                map.insert(key, value);
                Ok(())
            }

            fn remove_element(&self, instance: &mut dyn Any, index: usize) -> bool {
                let Some(map) = instance.downcast_mut::<$map<K, V>>() else {
                    return false;
                };
                let Some(key) = map.keys().nth(index).cloned() else {
                    return false;
                };
                map.remove(&key).is_some()
            }

            fn clear_elements(&self, instance: &mut dyn Any) {
                if let Some(map) = instance.downcast_mut::<$map<K, V>>() {
                    map.clear();
                }
            }
        }

        impl<K, V> AssociativeDataContainer for $container<K, V>
        where
            K: TypeInfo + Default + Clone + Send + Sync + $($key_bound)*,
            V: TypeInfo + Default + Clone + Send + Sync,
        {
            #[inline]
            fn associative_type(&self) -> AssociativeType {
                $kind
            }

            #[inline]
            fn key_type(&self) -> TypeUuid {
                K::type_uuid()
            }

            fn allocate_key(&self) -> Box<dyn Any> {
                Box::new(K::default())
            }

            fn contains_key(&self, instance: &dyn Any, key: &dyn Any) -> bool {
                match (instance.downcast_ref::<$map<K, V>>(), key.downcast_ref::<K>()) {
                    (Some(map), Some(key)) => map.contains_key(key),
                    _ => false,
                }
            }

            fn value_by_key<'a>(&self, instance: &'a dyn Any, key: &dyn Any) -> Option<&'a dyn Any> {
                let map = instance.downcast_ref::<$map<K, V>>()?;
                let value = map.get(key.downcast_ref::<K>()?)?;
                Some(value as &dyn Any)
            }

            fn value_by_key_mut<'a>(
                &self,
                instance: &'a mut dyn Any,
                key: &dyn Any,
            ) -> Option<&'a mut dyn Any> {
                let map = instance.downcast_mut::<$map<K, V>>()?;
                let value = map.get_mut(key.downcast_ref::<K>()?)?;
                Some(value as &mut dyn Any)
            }

            fn set_element_key(&self, element: &mut dyn Any, key: &dyn Any) -> bool {
                match (element.downcast_mut::<(K, V)>(), key.downcast_ref::<K>()) {
                    (Some(pair), Some(key)) => {
                        pair.0 = key.clone();
                        true
                    }
                    _ => false,
                }
            }
        }

        impl<K, V> TypeInfo for $map<K, V>
        where
            K: TypeInfo + Default + Clone + Send + Sync + $($key_bound)*,
            V: TypeInfo + Default + Clone + Send + Sync,
        {
            fn type_uuid() -> TypeUuid {
                $template.specialize(&[K::type_uuid(), V::type_uuid()])
            }

            fn type_name() -> Cow<'static, str> {
                Cow::Owned(format!(concat!($name, "<{}, {}>"), K::type_name(), V::type_name()))
            }

            fn reflect_generic(sc: &mut SerializeContext) {
                sc.generic_class::<Self>($template, &[K::type_uuid(), V::type_uuid()])
                    .depends_on::<(K, V)>()
                    .data_container($container::<K, V>::new());
            }
        }
    };
}

impl_map_container!(
    BTreeMapContainer, BTreeMap, BTREE_MAP_TEMPLATE, "BTreeMap", AssociativeType::Map,
    [Ord]
);

impl_map_container!(
    HashMapContainer, HashMap, HASH_MAP_TEMPLATE, "HashMap", AssociativeType::UnorderedMap,
    [Eq + Hash]
);

// -----------------------------------------------------------------------------
// Sets

macro_rules! impl_set_container {
    (
        $container:ident, $set:ident, $template:ident, $name:literal, $kind:expr,
        [$($key_bound:tt)*]
    ) => {
        #[doc = concat!("Container of `", stringify!($set), "<K>`.")]
        pub struct $container<K> {
            element: ClassElement,
            _marker: PhantomData<fn() -> K>,
        }

        impl<K: TypeInfo> $container<K> {
            pub fn new() -> Self {
                Self {
                    element: ClassElement::new("element", K::type_uuid(), size_of::<K>()),
                    _marker: PhantomData,
                }
            }
        }

        impl<K: TypeInfo> Default for $container<K> {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl<K> DataContainer for $container<K>
        where
            K: TypeInfo + Default + Clone + Send + Sync + $($key_bound)*,
        {
            fn element(&self, name_crc: u32) -> Option<&ClassElement> {
                (name_crc == self.element.name_crc()).then_some(&self.element)
            }

            fn enum_types(&self, cb: &mut dyn FnMut(TypeUuid, &ClassElement) -> bool) {
                cb(self.element.type_uuid(), &self.element);
            }

            fn enum_elements(
                &self,
                instance: &dyn Any,
                cb: &mut dyn FnMut(&dyn Any, &ClassElement) -> bool,
            ) {
                let Some(set) = instance.downcast_ref::<$set<K>>() else {
                    return;
                };
                for key in set {
                    if !cb(key, &self.element) {
                        break;
                    }
                }
            }

            fn enum_elements_mut(
                &self,
                instance: &mut dyn Any,
                cb: &mut dyn FnMut(&mut dyn Any, &ClassElement) -> bool,
            ) {
                let Some(set) = instance.downcast_mut::<$set<K>>() else {
                    return;
                };
                let mut keys: Vec<K> = mem::take(set).into_iter().collect();
                for key in &mut keys {
                    if !cb(key, &self.element) {
                        break;
                    }
                }
                set.extend(keys);
            }

            fn size(&self, instance: &dyn Any) -> usize {
                instance.downcast_ref::<$set<K>>().map_or(0, |set| set.len())
            }

            #[inline]
            fn is_stable_elements(&self) -> bool {
                false
            }

            #[inline]
            fn associative(&self) -> Option<&dyn AssociativeDataContainer> {
                Some(self)
            }

            fn reserve_element(
                &self,
                _instance: &mut dyn Any,
                _element: &ClassElement,
            ) -> Option<Box<dyn Any>> {
                Some(Box::new(K::default()))
            }

            fn store_element(
                &self,
                instance: &mut dyn Any,
                element: Box<dyn Any>,
            ) -> Result<(), Box<dyn Any>> {
                let Some(set) = instance.downcast_mut::<$set<K>>() else {
                    return Err(element);
                };
                set.insert(*element.downcast::<K>()?);
                Ok(())
            }

            fn remove_element(&self, instance: &mut dyn Any, index: usize) -> bool {
                let Some(set) = instance.downcast_mut::<$set<K>>() else {
                    return false;
                };
                let Some(key) = set.iter().nth(index).cloned() else {
                    return false;
                };
                set.remove(&key)
            }

            fn clear_elements(&self, instance: &mut dyn Any) {
                if let Some(set) = instance.downcast_mut::<$set<K>>() {
                    set.clear();
                }
            }
        }

        impl<K> AssociativeDataContainer for $container<K>
        where
            K: TypeInfo + Default + Clone + Send + Sync + $($key_bound)*,
        {
            #[inline]
            fn associative_type(&self) -> AssociativeType {
                $kind
            }

            #[inline]
            fn key_type(&self) -> TypeUuid {
                K::type_uuid()
            }

            fn allocate_key(&self) -> Box<dyn Any> {
                Box::new(K::default())
            }

            fn contains_key(&self, instance: &dyn Any, key: &dyn Any) -> bool {
                match (instance.downcast_ref::<$set<K>>(), key.downcast_ref::<K>()) {
                    (Some(set), Some(key)) => set.contains(key),
                    _ => false,
                }
            }

            fn value_by_key<'a>(&self, instance: &'a dyn Any, key: &dyn Any) -> Option<&'a dyn Any> {
                let set = instance.downcast_ref::<$set<K>>()?;
                let stored = set.get(key.downcast_ref::<K>()?)?;
                Some(stored as &dyn Any)
            }

            /// Set elements are their own keys and cannot be changed in place.
            #[inline]
            fn value_by_key_mut<'a>(
                &self,
                _instance: &'a mut dyn Any,
                _key: &dyn Any,
            ) -> Option<&'a mut dyn Any> {
                None
            }

            fn set_element_key(&self, element: &mut dyn Any, key: &dyn Any) -> bool {
                match (element.downcast_mut::<K>(), key.downcast_ref::<K>()) {
                    (Some(element), Some(key)) => {
                        *element = key.clone();
                        true
                    }
                    _ => false,
                }
            }
        }

        impl<K> TypeInfo for $set<K>
        where
            K: TypeInfo + Default + Clone + Send + Sync + $($key_bound)*,
        {
            fn type_uuid() -> TypeUuid {
                $template.specialize(&[K::type_uuid()])
            }

            fn type_name() -> Cow<'static, str> {
                Cow::Owned(format!(concat!($name, "<{}>"), K::type_name()))
            }

            fn reflect_generic(sc: &mut SerializeContext) {
                sc.generic_class::<Self>($template, &[K::type_uuid()])
                    .depends_on::<K>()
                    .data_container($container::<K>::new());
            }
        }
    };
}

impl_set_container!(
    BTreeSetContainer, BTreeSet, BTREE_SET_TEMPLATE, "BTreeSet", AssociativeType::Set,
    [Ord]
);

impl_set_container!(
    HashSetContainer, HashSet, HASH_SET_TEMPLATE, "HashSet", AssociativeType::UnorderedSet,
    [Eq + Hash]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_elements_are_pairs() {
        let container = BTreeMapContainer::<u32, i32>::new();
        let mut map = BTreeMap::from([(1_u32, 10_i32), (2, 20)]);

        let mut seen = Vec::new();
        container.enum_elements(&map, &mut |pair, _| {
            seen.push(*pair.downcast_ref::<(u32, i32)>().unwrap());
            true
        });
        assert_eq!(seen, [(1, 10), (2, 20)]);

        container.enum_elements_mut(&mut map, &mut |pair, _| {
            pair.downcast_mut::<(u32, i32)>().unwrap().1 += 1;
            true
        });
        assert_eq!(map, BTreeMap::from([(1, 11), (2, 21)]));
    }

    #[test]
    fn map_reserve_and_store() {
        let container = HashMapContainer::<u32, i32>::new();
        let mut map: HashMap<u32, i32> = HashMap::default();
        let element = container.element(crate::info::name_crc("element")).unwrap();

        let mut reserved = container.reserve_element(&mut map, element).unwrap();
        let key: Box<dyn Any> = Box::new(7_u32);
        assert!(container.set_element_key(reserved.as_mut(), key.as_ref()));
        reserved.downcast_mut::<(u32, i32)>().unwrap().1 = 70;
        container.store_element(&mut map, reserved).unwrap();

        let assoc = container.associative().unwrap();
        assert_eq!(assoc.associative_type(), AssociativeType::UnorderedMap);
        assert!(assoc.contains_key(&map, &7_u32));
        let value = assoc.value_by_key(&map, &7_u32).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&70));

        assert!(container.remove_element(&mut map, 0));
        assert_eq!(container.size(&map), 0);
    }

    #[test]
    fn sets() {
        let container = BTreeSetContainer::<i32>::new();
        let mut set = BTreeSet::from([3, 1, 2]);
        assert!(container.remove_element(&mut set, 0));
        assert_eq!(set, BTreeSet::from([2, 3]));

        let rejected = container.store_element(&mut set, Box::new(1_u8));
        assert!(rejected.is_err());
        container.store_element(&mut set, Box::new(9_i32)).unwrap();
        assert_eq!(container.size(&set), 3);
    }
}
