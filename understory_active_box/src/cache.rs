// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-key cache of measured box positions.

use alloc::rc::Rc;
use core::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use core::hash::Hash;

use hashbrown::HashMap;

use crate::position::BoxPosition;
use crate::registry::ElementRegistry;

/// Last measured [`BoxPosition`] of every key seen by a recalculation pass.
///
/// Entries are overwritten by each pass. Keys that are unregistered keep their
/// last entry until [`PositionCache::prune`] (or [`PositionCache::remove`]) drops it.
#[derive(Clone, Debug)]
pub struct PositionCache<K> {
    positions: HashMap<K, BoxPosition>,
}

impl<K> Default for PositionCache<K> {
    fn default() -> Self {
        Self {
            positions: HashMap::default(),
        }
    }
}

impl<K: Hash + Eq> PositionCache<K> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached position for `key`.
    pub fn get(&self, key: &K) -> Option<BoxPosition> {
        self.positions.get(key).copied()
    }

    /// Stores `position` under `key`, returning the previous entry.
    pub fn insert(&mut self, key: K, position: BoxPosition) -> Option<BoxPosition> {
        self.positions.insert(key, position)
    }

    /// Drops the entry for `key`.
    pub fn remove(&mut self, key: &K) -> Option<BoxPosition> {
        self.positions.remove(key)
    }

    /// Returns `true` if `key` has an entry.
    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates `(key, position)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, BoxPosition)> + '_ {
        self.positions.iter().map(|(k, p)| (k, *p))
    }

    /// Drops entries whose keys are not in `registry`, returning how many were removed.
    pub fn prune<H>(&mut self, registry: &ElementRegistry<K, H>) -> usize {
        let before = self.positions.len();
        self.positions.retain(|key, _| registry.contains(key));
        before - self.positions.len()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

/// A [`PositionCache`] shared by several resolvers.
///
/// Resolvers built with [`ActiveBox::with_shared_cache`](crate::ActiveBox::with_shared_cache)
/// on clones of the same handle read and write one set of entries, so a key measured by
/// one instance is visible to the others. Overlapping keys clobber each other; only
/// share a cache between resolvers that agree on what each key means.
#[derive(Debug)]
pub struct SharedPositionCache<K> {
    inner: Rc<RefCell<PositionCache<K>>>,
}

impl<K> Clone for SharedPositionCache<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K> Default for SharedPositionCache<K> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PositionCache::default())),
        }
    }
}

impl<K: Hash + Eq> SharedPositionCache<K> {
    /// Creates a new, empty shared cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the cache for reading.
    ///
    /// # Panics
    ///
    /// Panics if the cache is currently borrowed for writing.
    pub fn borrow(&self) -> Ref<'_, PositionCache<K>> {
        self.inner.borrow()
    }

    /// Borrows the cache for writing.
    ///
    /// # Panics
    ///
    /// Panics if the cache is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, PositionCache<K>> {
        self.inner.borrow_mut()
    }

    /// Borrows the cache for reading, failing if it is borrowed for writing.
    pub fn try_borrow(&self) -> Result<Ref<'_, PositionCache<K>>, BorrowError> {
        self.inner.try_borrow()
    }

    /// Borrows the cache for writing, failing if it is borrowed at all.
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, PositionCache<K>>, BorrowMutError> {
        self.inner.try_borrow_mut()
    }

    /// Number of handles (resolvers included) sharing this cache.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

/// Where a resolver keeps its [`PositionCache`].
#[derive(Debug)]
pub(crate) enum CacheScope<K> {
    /// One cache per resolver.
    Owned(PositionCache<K>),
    /// A cache shared with other resolvers.
    Shared(SharedPositionCache<K>),
}

impl<K: Hash + Eq> CacheScope<K> {
    /// Reads through the cache. `None` means a shared cache is borrowed for writing elsewhere.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&PositionCache<K>) -> R) -> Option<R> {
        match self {
            Self::Owned(cache) => Some(f(cache)),
            Self::Shared(shared) => {
                let Ok(cache) = shared.try_borrow() else {
                    abwarn!("shared position cache is busy; read skipped");
                    return None;
                };
                Some(f(&*cache))
            }
        }
    }

    /// Writes through the cache. `None` means a shared cache is borrowed elsewhere.
    pub(crate) fn with_mut<R>(&mut self, f: impl FnOnce(&mut PositionCache<K>) -> R) -> Option<R> {
        match self {
            Self::Owned(cache) => Some(f(cache)),
            Self::Shared(shared) => {
                let Ok(mut cache) = shared.try_borrow_mut() else {
                    abwarn!("shared position cache is busy; write skipped");
                    return None;
                };
                Some(f(&mut *cache))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Px;

    fn pos(x: u32) -> BoxPosition {
        BoxPosition {
            x: Px(x),
            ..BoxPosition::ZERO
        }
    }

    #[test]
    fn prune_drops_only_unregistered_keys() {
        let mut registry = ElementRegistry::new();
        registry.register("a", ());
        let mut cache = PositionCache::new();
        cache.insert("a", pos(1));
        cache.insert("b", pos(2));

        assert_eq!(cache.prune(&registry), 1);
        assert_eq!(cache.get(&"a"), Some(pos(1)));
        assert!(!cache.contains(&"b"));
    }

    #[test]
    fn shared_handles_see_the_same_entries() {
        let first = SharedPositionCache::new();
        let second = first.clone();
        assert_eq!(first.handle_count(), 2);

        first.borrow_mut().insert("tab", pos(9));
        assert_eq!(second.borrow().get(&"tab"), Some(pos(9)));
    }

    #[test]
    fn scope_reads_through_to_shared_cache() {
        let shared = SharedPositionCache::new();
        let mut scope = CacheScope::Shared(shared.clone());
        scope.with_mut(|cache| cache.insert(1_u32, pos(3)));
        assert_eq!(scope.with(|cache| cache.get(&1)), Some(Some(pos(3))));
        assert_eq!(shared.borrow().len(), 1);
        assert_eq!(scope.with(PositionCache::len), Some(1));
    }

    #[test]
    fn busy_shared_cache_skips_instead_of_panicking() {
        let shared = SharedPositionCache::new();
        let mut scope = CacheScope::Shared(shared.clone());

        let read = shared.borrow();
        assert_eq!(scope.with_mut(|cache| cache.insert("a", pos(1))), None);
        assert_eq!(scope.with(PositionCache::len), Some(0));
        drop(read);

        let write = shared.borrow_mut();
        assert_eq!(scope.with(PositionCache::len), None);
        drop(write);

        assert_eq!(scope.with_mut(|cache| cache.insert("a", pos(1))), Some(None));
        assert_eq!(shared.borrow().get(&"a"), Some(pos(1)));
    }
}
