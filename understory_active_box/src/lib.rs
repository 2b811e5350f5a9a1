// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_active_box --heading-base-level=0

//! Understory Active Box: follow the geometry of the active item in a list.
//!
//! This crate computes the position and size of the currently active item among
//! a set of rendered elements, for a sliding highlight or tab indicator that moves
//! under whichever item is selected. It is headless: it never animates and never
//! touches a renderer. The host binds the published [`BoxPosition`] to four
//! custom properties (`--x`, `--y`, `--width`, `--height`) and lets a transition
//! do the moving.
//!
//! The core concepts are:
//!
//! - [`Measure`]: an element handle that can report its raw [`OffsetBox`]
//!   (offset-left/top, width, height). `None` means detached and is treated as zero.
//! - [`ElementRegistry`]: item key → element handle, filled in by the view layer
//!   as items mount and unmount. Last registration wins.
//! - [`PositionCache`]: item key → measured [`BoxPosition`], rebuilt by each
//!   recalculation pass. [`SharedPositionCache`] lets several resolvers share one.
//! - [`ActiveBox`]: owns a registry and a cache, and publishes the active item's box.
//! - [`Viewport`] / [`ResizeSubscription`]: resize notifications scoped to the
//!   lifetime of a subscription guard.
//! - [`Dependencies`]: change detection for the host's "recalculate when these
//!   values change" list.
//!
//! ## Triggers
//!
//! Three events move the box, and each is handled synchronously:
//!
//! 1. The active key changes ([`ActiveBox::set_active`]): resolve from the cache only.
//! 2. The host's dependencies change ([`ActiveBox::recalculate`] or
//!    [`ActiveBox::sync_dependencies`]): measure every element, then resolve.
//! 3. The viewport resizes ([`ActiveBox::on_resize`], or automatically through a
//!    [`Viewport`] subscription): measure every element, then resolve.
//!
//! A missing active key, or a key that has not been measured yet, publishes
//! [`BoxPosition::ZERO`]. Nothing in the resolver fails.
//!
//! ## Minimal example
//!
//! ```rust
//! use core::cell::{Cell, RefCell};
//! use std::rc::Rc;
//!
//! use kurbo::Size;
//! use understory_active_box::{ActiveBox, OffsetBox, Viewport};
//!
//! // Elements are owned by the view layer; the resolver only holds weak handles.
//! let home = Rc::new(Cell::new(OffsetBox::new(0.0, 0.0, 80.4, 32.0)));
//! let docs = Rc::new(Cell::new(OffsetBox::new(80.4, 0.0, 64.6, 32.0)));
//!
//! let mut tabs = ActiveBox::new();
//! tabs.register("home", Rc::downgrade(&home));
//! tabs.register("docs", Rc::downgrade(&docs));
//! tabs.recalculate();
//! tabs.set_active(Some("docs"));
//! assert_eq!(
//!     tabs.output().to_string(),
//!     "--x: 80px; --y: 0px; --width: 65px; --height: 32px"
//! );
//!
//! // Re-measure on resize for as long as the subscription lives.
//! let tabs = Rc::new(RefCell::new(tabs));
//! let viewport = Viewport::new(Size::new(1024.0, 768.0));
//! let subscription = viewport.subscribe(&tabs);
//!
//! docs.set(OffsetBox::new(100.0, 0.0, 64.6, 32.0));
//! viewport.set_size(Size::new(640.0, 768.0));
//! assert_eq!(tabs.borrow().output().x.get(), 100);
//!
//! // Teardown detaches the listener.
//! drop(subscription);
//! assert_eq!(viewport.listener_count(), 0);
//! ```
//!
//! ## Cache scope
//!
//! By default each [`ActiveBox`] owns its cache, so two lists that happen to use
//! the same keys never see each other's geometry. Resolvers created with
//! [`ActiveBox::with_shared_cache`] instead share a [`SharedPositionCache`] by key.
//!
//! Unregistering an item does not drop its cached position. The entry stays until
//! a pass re-measures that key or [`ActiveBox::prune_stale`] is called.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//! - `serde`: `Serialize`/`Deserialize` for [`Px`] (as `"<n>px"`) and
//!   [`BoxPosition`] (as the four custom properties).
//! - `tracing`: emits `tracing` events under the `understory_active_box` target.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[macro_use]
mod macros;

mod cache;
mod deps;
mod measure;
mod position;
mod registry;
mod resolver;
mod viewport;

pub use cache::{PositionCache, SharedPositionCache};
pub use deps::Dependencies;
pub use measure::{Measure, OffsetBox};
pub use position::{BoxPosition, ParsePxError, Px};
pub use registry::ElementRegistry;
pub use resolver::{ActiveBox, Trigger};
pub use viewport::{ResizeListener, ResizeSubscription, Viewport};
