//! Provide hash containers, re-exports *hashbrown* and *foldhash*.
//!
//! The aliases default to [`FixedHashState`], so iteration order only
//! depends on the inserted data. Serialized output built by walking these
//! maps is therefore reproducible between runs.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

/// Create an empty [`HashMap`] with the fixed hash state.
#[inline]
pub const fn new_map<K, V>() -> HashMap<K, V> {
    hashbrown::HashMap::with_hasher(FixedHashState)
}

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::BuildHasher;

    #[test]
    fn fixed_state_is_stable() {
        let a = FixedHashState.hash_one(0x1234_u64);
        let b = FixedHashState.hash_one(0x1234_u64);
        assert_eq!(a, b);
        assert_ne!(a, FixedHashState.hash_one(0x1235_u64));
    }

    #[test]
    fn noop_state_passes_u64() {
        assert_eq!(NoOpHashState.hash_one(77_u64), 77);
    }

    #[test]
    fn map_alias() {
        let mut map: HashMap<u32, &str> = new_map();
        map.insert(1, "one");
        assert_eq!(map.get(&1), Some(&"one"));
        assert!(map.get(&2).is_none());
    }
}
