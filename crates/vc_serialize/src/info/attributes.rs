use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::info::name_crc;

// -----------------------------------------------------------------------------
// Attributes

/// Free-form attributes attached to a class or an element.
///
/// Keys are name hashes (see [`name_crc`]), values any `Send + Sync` type.
/// Declaration order is kept; a later value with the same key replaces the
/// earlier one.
///
/// # Examples
///
/// ```
/// use vc_serialize::info::{Attributes, name_crc};
///
/// let mut attrs = Attributes::new();
/// attrs.insert(name_crc("Min"), 0_i32);
///
/// assert_eq!(attrs.get::<i32>(name_crc("Min")), Some(&0));
/// assert_eq!(attrs.get_by_name::<i32>("min"), Some(&0));
/// assert!(attrs.get::<u8>(name_crc("Min")).is_none());
/// ```
#[derive(Default)]
pub struct Attributes {
    entries: Vec<(u32, Box<dyn Any + Send + Sync>)>,
}

impl Attributes {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts a value, returning `true` if it replaced an existing one.
    pub fn insert<T: Any + Send + Sync>(&mut self, id: u32, value: T) -> bool {
        self.insert_boxed(id, Box::new(value))
    }

    pub fn insert_boxed(&mut self, id: u32, value: Box<dyn Any + Send + Sync>) -> bool {
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some(slot) => {
                slot.1 = value;
                true
            }
            None => {
                self.entries.push((id, value));
                false
            }
        }
    }

    /// Returns the value under `id` if it exists and is a `T`.
    #[inline]
    pub fn get<T: Any>(&self, id: u32) -> Option<&T> {
        self.get_any(id).and_then(|value| value.downcast_ref::<T>())
    }

    #[inline]
    pub fn get_by_name<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(name_crc(name))
    }

    pub fn get_any(&self, id: u32) -> Option<&(dyn Any + Send + Sync)> {
        self.entries
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, value)| &**value)
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.entries.iter().any(|(key, _)| *key == id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| *key != id);
        before != self.entries.len()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u32, &(dyn Any + Send + Sync))> {
        self.entries.iter().map(|(key, value)| (*key, &**value))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.iter().map(|(key, _)| key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Attributes;
    use alloc::string::String;

    #[test]
    fn replace_keeps_position() {
        let mut attrs = Attributes::new();
        assert!(!attrs.insert(1, 10_u32));
        assert!(!attrs.insert(2, String::from("two")));
        assert!(attrs.insert(1, 11_u32));

        let keys: alloc::vec::Vec<u32> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, [1, 2]);
        assert_eq!(attrs.get::<u32>(1), Some(&11));
        assert_eq!(attrs.get::<String>(2).map(String::as_str), Some("two"));
    }

    #[test]
    fn remove() {
        let mut attrs = Attributes::new();
        attrs.insert(5, ());
        assert!(attrs.remove(5));
        assert!(!attrs.remove(5));
        assert!(attrs.is_empty());
    }
}
