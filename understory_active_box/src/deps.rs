// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change detection for caller-supplied recalculation dependencies.

use smallvec::SmallVec;

/// Remembers the last list of recalculation dependencies and reports when it changes.
///
/// The values are whatever the host believes affects list layout: item count,
/// a data revision, a font scale, and so on. Comparison is element-wise by
/// [`PartialEq`]; a length change always counts as a change.
#[derive(Clone, Debug)]
pub struct Dependencies<D> {
    last: Option<SmallVec<[D; 4]>>,
}

impl<D> Default for Dependencies<D> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<D: PartialEq> Dependencies<D> {
    /// Creates a tracker that has not seen any values yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `values` and returns `true` if they differ from the previous list.
    ///
    /// The first call always returns `true`, so the initial measurement pass
    /// runs when the list first mounts.
    pub fn update<I: IntoIterator<Item = D>>(&mut self, values: I) -> bool {
        let next: SmallVec<[D; 4]> = values.into_iter().collect();
        let changed = self
            .last
            .as_ref()
            .is_none_or(|prev| prev.as_slice() != next.as_slice());
        self.last = Some(next);
        changed
    }

    /// Returns the most recently stored values.
    pub fn current(&self) -> Option<&[D]> {
        self.last.as_deref()
    }

    /// Forgets the stored values so the next [`update`](Self::update) reports a change.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
