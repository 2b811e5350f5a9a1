// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The active-box resolver: measurement passes, resolution, and triggers.

use core::hash::Hash;

use kurbo::Size;

use crate::cache::{CacheScope, PositionCache, SharedPositionCache};
use crate::deps::Dependencies;
use crate::measure::Measure;
use crate::position::BoxPosition;
use crate::registry::ElementRegistry;
use crate::viewport::ResizeListener;

/// An event that may move the active box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger<K> {
    /// The active item changed. Geometry is assumed fresh; only resolution runs.
    ActiveChanged(Option<K>),
    /// The host decided layout inputs changed. Measures everything, then resolves.
    Recalculate,
    /// The viewport was resized. Measures everything, then resolves.
    Resize,
}

/// Tracks list item elements by key and publishes the box of the active one.
///
/// The host registers one handle per rendered item, then drives the resolver
/// with the three [`Trigger`]s. Every step is synchronous: when a trigger
/// method returns, [`ActiveBox::output`] already reflects it.
///
/// The output is either [`BoxPosition::ZERO`] or exactly the cached position of
/// the active key as of the last pass. [`ActiveBox::revision`] increases only
/// when the output changes by value, so hosts can skip redundant re-renders.
///
/// ## Example
///
/// ```rust
/// use understory_active_box::{ActiveBox, OffsetBox};
///
/// let mut tabs = ActiveBox::new();
/// tabs.register("home", OffsetBox::new(0.0, 0.0, 72.3, 32.0));
/// tabs.register("docs", OffsetBox::new(72.3, 0.0, 60.5, 32.0));
/// tabs.recalculate();
///
/// tabs.set_active(Some("docs"));
/// assert_eq!(tabs.output().x.get(), 72);
/// assert_eq!(tabs.output().width.get(), 61);
///
/// tabs.set_active(None);
/// assert_eq!(tabs.output(), understory_active_box::BoxPosition::ZERO);
/// ```
#[derive(Debug)]
pub struct ActiveBox<K, H> {
    registry: ElementRegistry<K, H>,
    cache: CacheScope<K>,
    active: Option<K>,
    output: BoxPosition,
    revision: u64,
}

impl<K: Hash + Eq, H> Default for ActiveBox<K, H> {
    fn default() -> Self {
        Self::with_scope(CacheScope::Owned(PositionCache::new()))
    }
}

impl<K: Hash + Eq, H> ActiveBox<K, H> {
    /// Creates a resolver with its own position cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that reads and writes a cache shared with other resolvers.
    ///
    /// Keys measured by any sharing resolver become resolvable by all of them.
    #[must_use]
    pub fn with_shared_cache(cache: SharedPositionCache<K>) -> Self {
        Self::with_scope(CacheScope::Shared(cache))
    }

    fn with_scope(cache: CacheScope<K>) -> Self {
        Self {
            registry: ElementRegistry::new(),
            cache,
            active: None,
            output: BoxPosition::ZERO,
            revision: 0,
        }
    }

    /// The element registry.
    pub fn registry(&self) -> &ElementRegistry<K, H> {
        &self.registry
    }

    /// The element registry, for hosts that manage it directly.
    pub fn registry_mut(&mut self) -> &mut ElementRegistry<K, H> {
        &mut self.registry
    }

    /// Registers `handle` under `key`, replacing and returning any previous handle.
    ///
    /// The element is measured by the next recalculation pass, not immediately.
    pub fn register(&mut self, key: K, handle: H) -> Option<H> {
        self.registry.register(key, handle)
    }

    /// Unregisters `key`.
    ///
    /// The cached position for `key` stays until it is pruned; see [`ActiveBox::prune_stale`].
    pub fn unregister(&mut self, key: &K) -> Option<H> {
        self.registry.unregister(key)
    }

    /// The currently active key.
    pub fn active(&self) -> Option<&K> {
        self.active.as_ref()
    }

    /// The published box of the active item.
    pub fn output(&self) -> BoxPosition {
        self.output
    }

    /// Number of times the output has changed value.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The cached position for `key`, if any pass has measured it.
    ///
    /// Also `None` while a shared cache is borrowed for writing elsewhere.
    pub fn cached(&self, key: &K) -> Option<BoxPosition> {
        self.cache.with(|cache| cache.get(key)).flatten()
    }

    /// Runs `f` with read access to the position cache.
    ///
    /// Returns `None` without calling `f` if a shared cache is borrowed for writing elsewhere.
    pub fn with_cache<R>(&self, f: impl FnOnce(&PositionCache<K>) -> R) -> Option<R> {
        self.cache.with(f)
    }

    /// Drops cached positions for keys that are no longer registered.
    ///
    /// Returns how many entries were removed. With a shared cache this also
    /// drops entries that only other resolvers registered.
    pub fn prune_stale(&mut self) -> usize {
        let Self {
            registry, cache, ..
        } = self;
        let pruned = cache
            .with_mut(|cache| cache.prune(registry))
            .unwrap_or(0);
        abdebug!(pruned, "prune_stale");
        pruned
    }

    /// Resolves the output from the cache without measuring.
    ///
    /// A missing active key, or one that has never been measured, resets the
    /// output to [`BoxPosition::ZERO`]. If a shared cache is borrowed for writing
    /// elsewhere the output is left as it is. Returns `true` if the output changed.
    pub fn resolve_active(&mut self) -> bool {
        let next = match &self.active {
            None => BoxPosition::ZERO,
            Some(key) => match self.cache.with(|cache| cache.get(key)) {
                Some(found) => found.unwrap_or(BoxPosition::ZERO),
                None => return false,
            },
        };
        self.publish(next)
    }

    fn publish(&mut self, next: BoxPosition) -> bool {
        if next == self.output {
            return false;
        }
        self.output = next;
        self.revision = self.revision.wrapping_add(1);
        abtrace!(revision = self.revision, "active box changed");
        true
    }
}

impl<K: Hash + Eq + Clone, H: Measure> ActiveBox<K, H> {
    /// Measures every registered element and overwrites its cache entry.
    ///
    /// Detached or unlaid-out elements are stored as [`BoxPosition::ZERO`].
    /// Returns the number of elements measured. This does not touch the output;
    /// see [`ActiveBox::recalculate`].
    ///
    /// If a shared cache is borrowed elsewhere the pass is skipped, the cache is
    /// left untouched, and `0` is returned.
    pub fn recalculate_all(&mut self) -> usize {
        self.measure_all().unwrap_or(0)
    }

    fn measure_all(&mut self) -> Option<usize> {
        let Self {
            registry, cache, ..
        } = self;
        let measured = cache.with_mut(|cache| {
            for (key, handle) in registry.iter() {
                let position = handle
                    .measure()
                    .map_or(BoxPosition::ZERO, BoxPosition::from_offsets);
                cache.insert(key.clone(), position);
            }
            registry.len()
        })?;
        abdebug!(measured, "recalculate_all");
        Some(measured)
    }

    /// Changes the active key and resolves the output.
    ///
    /// Setting the key that is already active does nothing. Returns `true` if
    /// the output changed.
    ///
    /// `None` is the only "no active item" value: every `Some` key, including an
    /// empty string, is looked up in the cache like any other.
    pub fn set_active(&mut self, active: Option<K>) -> bool {
        if self.active == active {
            return false;
        }
        self.active = active;
        self.resolve_active()
    }

    /// Measures every element, then resolves. Returns `true` if the output changed.
    ///
    /// A pass skipped because a shared cache is busy leaves the output unchanged.
    pub fn recalculate(&mut self) -> bool {
        if self.measure_all().is_none() {
            return false;
        }
        self.resolve_active()
    }

    /// Handles a viewport resize: measures every element, then resolves.
    pub fn on_resize(&mut self) -> bool {
        abtrace!("resize");
        self.recalculate()
    }

    /// Recalculates if `values` differ from what `deps` last saw.
    ///
    /// Returns `true` if a recalculation pass ran.
    pub fn sync_dependencies<D, I>(&mut self, deps: &mut Dependencies<D>, values: I) -> bool
    where
        D: PartialEq,
        I: IntoIterator<Item = D>,
    {
        if !deps.update(values) {
            return false;
        }
        self.recalculate();
        true
    }

    /// Applies one trigger. Returns `true` if the output changed.
    pub fn handle(&mut self, trigger: Trigger<K>) -> bool {
        match trigger {
            Trigger::ActiveChanged(active) => self.set_active(active),
            Trigger::Recalculate => self.recalculate(),
            Trigger::Resize => self.on_resize(),
        }
    }
}

impl<K: Hash + Eq + Clone, H: Measure> ResizeListener for ActiveBox<K, H> {
    fn resized(&mut self, _size: Size) {
        self.on_resize();
    }
}
