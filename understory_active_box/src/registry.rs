// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed registry of live element handles.

use core::hash::Hash;

use hashbrown::HashMap;

/// Maps item keys to the element handles the view layer rendered for them.
///
/// Each list item registers itself when it mounts and unregisters when it
/// unmounts. Registering a key that is already present replaces its handle
/// (last write wins). Iteration order is unspecified.
#[derive(Clone, Debug)]
pub struct ElementRegistry<K, H> {
    elements: HashMap<K, H>,
}

impl<K, H> Default for ElementRegistry<K, H> {
    fn default() -> Self {
        Self {
            elements: HashMap::default(),
        }
    }
}

impl<K: Hash + Eq, H> ElementRegistry<K, H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `handle` with `key`, returning the handle it replaced.
    pub fn register(&mut self, key: K, handle: H) -> Option<H> {
        self.elements.insert(key, handle)
    }

    /// Removes the handle for `key`.
    ///
    /// The element stops being measured; any cached position for it is left alone.
    pub fn unregister(&mut self, key: &K) -> Option<H> {
        self.elements.remove(key)
    }

    /// Ref-callback form: `Some` registers, `None` unregisters.
    pub fn set(&mut self, key: K, handle: Option<H>) {
        match handle {
            Some(handle) => {
                self.elements.insert(key, handle);
            }
            None => {
                self.elements.remove(&key);
            }
        }
    }

    /// Returns the handle registered for `key`.
    pub fn get(&self, key: &K) -> Option<&H> {
        self.elements.get(key)
    }

    /// Returns `true` if `key` currently has a handle.
    pub fn contains(&self, key: &K) -> bool {
        self.elements.contains_key(key)
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates `(key, handle)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &H)> + '_ {
        self.elements.iter()
    }

    /// Iterates registered keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.elements.keys()
    }

    /// Unregisters every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_registration_wins() {
        let mut registry = ElementRegistry::new();
        assert_eq!(registry.register("a", 1_u32), None);
        assert_eq!(registry.register("a", 2), Some(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&"a"), Some(&2));
    }

    #[test]
    fn ref_callback_form_registers_and_clears() {
        let mut registry = ElementRegistry::new();
        registry.set("a", Some(1_u32));
        registry.set("b", Some(2));
        assert!(registry.contains(&"a"));

        registry.set("a", None);
        assert!(!registry.contains(&"a"));
        assert_eq!(registry.keys().copied().collect::<alloc::vec::Vec<_>>(), ["b"]);

        // Clearing an absent key is harmless.
        registry.set("zzz", None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_returns_handle() {
        let mut registry = ElementRegistry::new();
        registry.register(7_u32, "seven");
        assert_eq!(registry.unregister(&7), Some("seven"));
        assert_eq!(registry.unregister(&7), None);
        assert!(registry.is_empty());
    }
}
