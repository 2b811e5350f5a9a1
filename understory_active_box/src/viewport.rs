// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport resize notifications with scoped subscriptions.
//!
//! A [`Viewport`] stands in for the host window. Listeners subscribe through a
//! shared `Rc<RefCell<_>>` and get back a [`ResizeSubscription`]; dropping the
//! subscription (typically when the owning view is torn down) detaches the
//! listener, so repeated mount/unmount cycles never accumulate listeners.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::Size;

/// Receives viewport resize notifications.
pub trait ResizeListener {
    /// Called once per resize with the new viewport size.
    fn resized(&mut self, size: Size);
}

struct Slot {
    id: u64,
    listener: Weak<RefCell<dyn ResizeListener>>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    slots: Vec<Slot>,
    size: Size,
}

/// Single-threaded source of resize notifications.
///
/// Listeners are held weakly: a listener that has been dropped is skipped and
/// forgotten on the next notification even if its subscription is still alive.
/// Clones share the same listener list.
#[derive(Clone, Default)]
pub struct Viewport {
    inner: Rc<RefCell<Listeners>>,
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Viewport")
            .field("size", &inner.size)
            .field("listeners", &inner.slots.len())
            .finish_non_exhaustive()
    }
}

impl Viewport {
    /// Creates a viewport of the given size with no listeners.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Listeners {
                size,
                ..Listeners::default()
            })),
        }
    }

    /// The current viewport size.
    pub fn size(&self) -> Size {
        self.inner.borrow().size
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.listener.strong_count() > 0)
            .count()
    }

    /// Subscribes `listener` to resize notifications until the returned guard is dropped.
    pub fn subscribe<L: ResizeListener + 'static>(
        &self,
        listener: &Rc<RefCell<L>>,
    ) -> ResizeSubscription {
        let weak: Weak<RefCell<L>> = Rc::downgrade(listener);
        let listener: Weak<RefCell<dyn ResizeListener>> = weak;
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push(Slot { id, listener });
        abtrace!(id, "resize listener attached");
        ResizeSubscription {
            id,
            listeners: Rc::downgrade(&self.inner),
        }
    }

    /// Records a new size and notifies listeners if it differs from the current one.
    ///
    /// Returns the number of listeners notified.
    pub fn set_size(&self, size: Size) -> usize {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.size == size {
                return 0;
            }
            inner.size = size;
        }
        self.notify_resize()
    }

    /// Notifies every live listener of the current size.
    ///
    /// Listeners may subscribe or unsubscribe from inside their callback; such
    /// changes take effect from the next notification. A listener that is
    /// already mutably borrowed is skipped. Returns the number of listeners notified.
    pub fn notify_resize(&self) -> usize {
        let (size, targets) = {
            let mut inner = self.inner.borrow_mut();
            inner.slots.retain(|slot| slot.listener.strong_count() > 0);
            let targets: Vec<_> = inner
                .slots
                .iter()
                .map(|slot| slot.listener.clone())
                .collect();
            (inner.size, targets)
        };

        let mut notified = 0;
        for weak in targets {
            let Some(listener) = weak.upgrade() else {
                continue;
            };
            let Ok(mut guard) = listener.try_borrow_mut() else {
                abwarn!("resize listener is busy; skipped");
                continue;
            };
            guard.resized(size);
            notified += 1;
        }
        abdebug!(notified, "resize");
        notified
    }
}

/// Keeps a listener attached to a [`Viewport`]; detaches it when dropped.
#[must_use = "dropping the subscription detaches the listener immediately"]
#[derive(Debug)]
pub struct ResizeSubscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl ResizeSubscription {
    /// Returns `true` while the viewport still holds this subscription.
    pub fn is_attached(&self) -> bool {
        let Some(listeners) = self.listeners.upgrade() else {
            return false;
        };
        listeners
            .borrow()
            .slots
            .iter()
            .any(|slot| slot.id == self.id)
    }

    /// Detaches the listener now. Same as dropping the subscription.
    pub fn detach(self) {}
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        // Notification never holds this borrow while calling listeners.
        if let Ok(mut listeners) = listeners.try_borrow_mut() {
            listeners.slots.retain(|slot| slot.id != self.id);
            abtrace!(id = self.id, "resize listener detached");
        } else {
            abwarn!(id = self.id, "viewport is busy; resize listener left attached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SharedPositionCache;
    use crate::measure::OffsetBox;
    use crate::resolver::ActiveBox;
    use core::cell::Cell;

    #[derive(Default)]
    struct Counter {
        calls: usize,
        last: Size,
    }

    impl ResizeListener for Counter {
        fn resized(&mut self, size: Size) {
            self.calls += 1;
            self.last = size;
        }
    }

    #[test]
    fn subscription_scopes_the_listener() {
        let viewport = Viewport::new(Size::new(800.0, 600.0));
        let counter = Rc::new(RefCell::new(Counter::default()));

        let subscription = viewport.subscribe(&counter);
        assert!(subscription.is_attached());
        assert_eq!(viewport.set_size(Size::new(640.0, 480.0)), 1);
        assert_eq!(counter.borrow().calls, 1);
        assert_eq!(counter.borrow().last, Size::new(640.0, 480.0));

        drop(subscription);
        assert_eq!(viewport.listener_count(), 0);
        assert_eq!(viewport.notify_resize(), 0);
        assert_eq!(counter.borrow().calls, 1);
    }

    #[test]
    fn same_size_does_not_notify() {
        let viewport = Viewport::new(Size::new(100.0, 100.0));
        let counter = Rc::new(RefCell::new(Counter::default()));
        let _subscription = viewport.subscribe(&counter);
        assert_eq!(viewport.set_size(Size::new(100.0, 100.0)), 0);
        assert_eq!(viewport.notify_resize(), 1);
    }

    #[test]
    fn repeated_mounts_do_not_leak_listeners() {
        let viewport = Viewport::default();
        for _ in 0..10 {
            let counter = Rc::new(RefCell::new(Counter::default()));
            let subscription = viewport.subscribe(&counter);
            subscription.detach();
        }
        assert_eq!(viewport.listener_count(), 0);
        assert_eq!(viewport.inner.borrow().slots.len(), 0);
    }

    #[test]
    fn dropped_listener_is_skipped_and_forgotten() {
        let viewport = Viewport::default();
        let counter = Rc::new(RefCell::new(Counter::default()));
        let _subscription = viewport.subscribe(&counter);
        drop(counter);
        assert_eq!(viewport.notify_resize(), 0);
        assert_eq!(viewport.inner.borrow().slots.len(), 0);
    }

    #[test]
    fn busy_listener_is_skipped() {
        let viewport = Viewport::default();
        let counter = Rc::new(RefCell::new(Counter::default()));
        let _subscription = viewport.subscribe(&counter);
        let guard = counter.borrow_mut();
        assert_eq!(viewport.notify_resize(), 0);
        drop(guard);
        assert_eq!(viewport.notify_resize(), 1);
    }

    #[test]
    fn subscription_outliving_viewport_is_harmless() {
        let viewport = Viewport::default();
        let counter = Rc::new(RefCell::new(Counter::default()));
        let subscription = viewport.subscribe(&counter);
        drop(viewport);
        assert!(!subscription.is_attached());
        drop(subscription);
    }

    #[test]
    fn resize_refreshes_every_registered_key() {
        let a = Rc::new(Cell::new(OffsetBox::new(0.0, 0.0, 10.0, 10.0)));
        let b = Rc::new(Cell::new(OffsetBox::new(10.0, 0.0, 10.0, 10.0)));

        let mut active_box = ActiveBox::new();
        active_box.register("a", Rc::downgrade(&a));
        active_box.register("b", Rc::downgrade(&b));
        active_box.set_active(Some("b"));
        active_box.recalculate();

        let active_box = Rc::new(RefCell::new(active_box));
        let viewport = Viewport::new(Size::new(300.0, 200.0));
        let _subscription = viewport.subscribe(&active_box);

        a.set(OffsetBox::new(0.0, 0.0, 20.0, 12.0));
        b.set(OffsetBox::new(20.0, 0.0, 25.0, 12.0));
        assert_eq!(viewport.set_size(Size::new(200.0, 200.0)), 1);

        let resolved = active_box.borrow();
        assert_eq!(resolved.cached(&"a").map(|p| p.width.get()), Some(20));
        assert_eq!(resolved.cached(&"b").map(|p| p.x.get()), Some(20));
        assert_eq!(resolved.output(), resolved.cached(&"b").unwrap());
        assert_eq!(resolved.revision(), 2);
    }

    #[test]
    fn resize_with_borrowed_shared_cache_does_not_panic() {
        let tab = Rc::new(Cell::new(OffsetBox::new(2.0, 0.0, 10.0, 4.0)));
        let shared = SharedPositionCache::new();
        let mut active_box = ActiveBox::with_shared_cache(shared.clone());
        active_box.register("tab", Rc::downgrade(&tab));
        active_box.set_active(Some("tab"));
        active_box.recalculate();

        let active_box = Rc::new(RefCell::new(active_box));
        let viewport = Viewport::new(Size::new(300.0, 200.0));
        let _subscription = viewport.subscribe(&active_box);

        tab.set(OffsetBox::new(7.0, 0.0, 10.0, 4.0));
        {
            let _read = shared.borrow();
            assert_eq!(viewport.set_size(Size::new(200.0, 200.0)), 1);
        }
        assert_eq!(active_box.borrow().output().x.get(), 2);

        assert_eq!(viewport.notify_resize(), 1);
        assert_eq!(active_box.borrow().output().x.get(), 7);
    }

    #[test]
    fn drop_while_viewport_busy_keeps_listener() {
        let viewport = Viewport::default();
        let counter = Rc::new(RefCell::new(Counter::default()));
        let subscription = viewport.subscribe(&counter);
        {
            let _busy = viewport.inner.borrow();
            drop(subscription);
        }
        assert_eq!(viewport.listener_count(), 1);
    }
}
