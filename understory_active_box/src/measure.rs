// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reading raw layout geometry from element handles.

use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use kurbo::{Point, Rect, Size};

/// Raw offset geometry of a rendered element.
///
/// `origin` is the offset from the left/top edges of the offset parent and `size` is
/// the rendered width/height, both in unrounded layout units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OffsetBox {
    /// Offset-left (`x`) and offset-top (`y`).
    pub origin: Point,
    /// Offset-width and offset-height.
    pub size: Size,
}

impl OffsetBox {
    /// An element that has not been laid out.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Creates an offset box from its four raw fields.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(left, top),
            size: Size::new(width, height),
        }
    }

    /// Takes the origin and size of a layout rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            origin: rect.origin(),
            size: rect.size(),
        }
    }
}

/// A handle to one rendered item whose layout can be read synchronously.
///
/// Returning `None` means the element is detached or otherwise has no layout;
/// callers treat that exactly like an element measured at [`OffsetBox::ZERO`].
///
/// Handles are normally non-owning: the view layer keeps the element alive and
/// registers a [`Weak`] (or a borrow) so a torn-down element simply stops measuring.
pub trait Measure {
    /// Reads the element's current offset geometry.
    fn measure(&self) -> Option<OffsetBox>;
}

impl Measure for OffsetBox {
    fn measure(&self) -> Option<OffsetBox> {
        Some(*self)
    }
}

impl Measure for Rect {
    fn measure(&self) -> Option<OffsetBox> {
        Some(OffsetBox::from_rect(*self))
    }
}

impl Measure for Cell<OffsetBox> {
    fn measure(&self) -> Option<OffsetBox> {
        Some(self.get())
    }
}

impl<T: Measure + ?Sized> Measure for RefCell<T> {
    fn measure(&self) -> Option<OffsetBox> {
        // An element being mutated mid-layout has no readable geometry yet.
        self.try_borrow().ok()?.measure()
    }
}

impl<T: Measure> Measure for Option<T> {
    fn measure(&self) -> Option<OffsetBox> {
        self.as_ref()?.measure()
    }
}

impl<T: Measure + ?Sized> Measure for &T {
    fn measure(&self) -> Option<OffsetBox> {
        (**self).measure()
    }
}

impl<T: Measure + ?Sized> Measure for Rc<T> {
    fn measure(&self) -> Option<OffsetBox> {
        (**self).measure()
    }
}

impl<T: Measure + ?Sized> Measure for Weak<T> {
    fn measure(&self) -> Option<OffsetBox> {
        self.upgrade()?.measure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_measures_origin_and_size() {
        let rect = Rect::new(10.0, 20.0, 110.0, 45.0);
        assert_eq!(rect.measure(), Some(OffsetBox::new(10.0, 20.0, 100.0, 25.0)));
    }

    #[test]
    fn weak_handle_is_detached_after_drop() {
        let element = Rc::new(Cell::new(OffsetBox::new(1.0, 2.0, 3.0, 4.0)));
        let handle = Rc::downgrade(&element);
        assert_eq!(handle.measure(), Some(OffsetBox::new(1.0, 2.0, 3.0, 4.0)));

        element.set(OffsetBox::new(5.0, 2.0, 3.0, 4.0));
        assert_eq!(handle.measure().map(|b| b.origin.x), Some(5.0));

        drop(element);
        assert_eq!(handle.measure(), None);
    }

    #[test]
    fn busy_refcell_is_detached() {
        let element = RefCell::new(OffsetBox::new(1.0, 1.0, 1.0, 1.0));
        let guard = element.borrow_mut();
        assert_eq!(element.measure(), None);
        drop(guard);
        assert!(element.measure().is_some());
    }

    #[test]
    fn empty_option_is_detached() {
        let none: Option<OffsetBox> = None;
        assert_eq!(none.measure(), None);
    }
}
