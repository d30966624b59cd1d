use core::any::TypeId;
use core::fmt::Debug;
use core::hash::Hash;

use crate::hash::NoOpHashState;
use crate::hash::hashbrown::HashMap;
use crate::hash::hashbrown::hash_map::Entry;

// -----------------------------------------------------------------------------
// IdMap

/// A map keyed by an identifier that already is a good hash.
///
/// Keys are hashed with [`NoOpHashState`], so `K`'s `Hash` impl must feed a
/// single well mixed integer to the hasher. [`TypeId`] and the 128-bit type
/// uuids used by the serializer both qualify.
///
/// The interface hides the backing [`HashMap`].
pub struct IdMap<K, V>(HashMap<K, V, NoOpHashState>);

impl<K, V> IdMap<K, V> {
    /// Creates an empty `IdMap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_utils::TypeIdMap;
    /// let map = TypeIdMap::<i32>::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self(HashMap::with_hasher(NoOpHashState))
    }

    /// Creates an empty `IdMap` with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(HashMap::with_capacity_and_hasher(capacity, NoOpHashState))
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes every entry, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterates all entries in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> {
        self.0.iter()
    }

    /// Iterates all values in arbitrary order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.0.values()
    }

    /// Iterates all values mutably in arbitrary order.
    #[inline]
    pub fn values_mut(&mut self) -> impl ExactSizeIterator<Item = &mut V> {
        self.0.values_mut()
    }

    /// Iterates all keys in arbitrary order.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.0.keys()
    }
}

impl<K: Hash + Eq, V> IdMap<K, V> {
    /// Inserts `f()` under `id` if the key is vacant.
    ///
    /// Returns `false` and leaves the map unchanged when `id` exists.
    /// `f` is only called on insertion.
    #[inline]
    pub fn try_insert(&mut self, id: K, f: impl FnOnce() -> V) -> bool {
        match self.0.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(f());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Returns the value under `id`, inserting `f()` first if vacant.
    #[inline]
    pub fn get_or_insert(&mut self, id: K, f: impl FnOnce() -> V) -> &mut V {
        match self.0.entry(id) {
            Entry::Vacant(entry) => entry.insert(f()),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    #[inline]
    pub fn get(&self, id: &K) -> Option<&V> {
        self.0.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &K) -> Option<&mut V> {
        self.0.get_mut(id)
    }

    /// Inserts a value, returning the previous one.
    #[inline]
    pub fn insert(&mut self, id: K, v: V) -> Option<V> {
        self.0.insert(id, v)
    }

    #[inline]
    pub fn remove(&mut self, id: &K) -> Option<V> {
        self.0.remove(id)
    }

    #[inline]
    pub fn contains(&self, id: &K) -> bool {
        self.0.contains_key(id)
    }

    /// Keeps only the entries for which `f` returns `true`.
    #[inline]
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool) {
        self.0.retain(f);
    }
}

impl<V> IdMap<TypeId, V> {
    /// Returns the value stored for the native type `T`.
    #[inline(always)]
    pub fn get_type<T: ?Sized + 'static>(&self) -> Option<&V> {
        self.get(&TypeId::of::<T>())
    }

    /// Inserts a value for the native type `T`.
    #[inline(always)]
    pub fn insert_type<T: ?Sized + 'static>(&mut self, v: V) -> Option<V> {
        self.insert(TypeId::of::<T>(), v)
    }

    /// Removes the value stored for the native type `T`.
    #[inline(always)]
    pub fn remove_type<T: ?Sized + 'static>(&mut self) -> Option<V> {
        self.remove(&TypeId::of::<T>())
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<K, V> Default for IdMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for IdMap<K, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<K: Debug, V: Debug> Debug for IdMap<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}
