// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel values and the four-field box published for the active item.

use core::fmt;
use core::str::FromStr;

use kurbo::Rect;

use crate::measure::OffsetBox;

/// A non-negative, whole number of pixels.
///
/// Formats as `"<n>px"` and parses from the same form.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Px(pub u32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// Rounds a raw layout value to the nearest whole pixel.
    ///
    /// Halves round up, so `10.5` becomes `11px`. Negative values, NaN, and
    /// zero map to `0px`; values past `u32::MAX` saturate.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            return Self::ZERO;
        }
        if value >= f64::from(u32::MAX) {
            return Self(u32::MAX);
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "Value is positive and below u32::MAX, so the cast only drops the fraction."
        )]
        let whole = value as u32;
        // Comparing the fraction avoids the `x + 0.5` error just below one half.
        if value - f64::from(whole) >= 0.5 {
            Self(whole + 1)
        } else {
            Self(whole)
        }
    }

    /// Returns the pixel count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Error returned when text is not a valid [`Px`] value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParsePxError {
    /// The text does not end in `px`.
    MissingUnit,
    /// The part before `px` is not an optionally signed run of decimal digits.
    InvalidNumber,
    /// The value is below zero.
    Negative,
    /// The value does not fit in a `u32`.
    OutOfRange,
}

impl fmt::Display for ParsePxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingUnit => "pixel value must end in `px`",
            Self::InvalidNumber => "pixel value must be a whole decimal number",
            Self::Negative => "pixel value must not be negative",
            Self::OutOfRange => "pixel value is too large",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for ParsePxError {}

impl FromStr for Px {
    type Err = ParsePxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.strip_suffix("px").ok_or(ParsePxError::MissingUnit)?;
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParsePxError::InvalidNumber);
        }
        if negative {
            // `-0px` is still zero; anything else is below the box's range.
            return if digits.bytes().all(|b| b == b'0') {
                Ok(Self::ZERO)
            } else {
                Err(ParsePxError::Negative)
            };
        }
        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ParsePxError::OutOfRange)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Px {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Px {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PxVisitor;

        impl serde::de::Visitor<'_> for PxVisitor {
            type Value = Px;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a pixel string such as \"12px\"")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Px, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PxVisitor)
    }
}

/// Position and size of one item, in whole pixels.
///
/// This is what gets bound to the `--x`, `--y`, `--width`, and `--height`
/// custom properties of the moving indicator. With `feature = "serde"` it
/// serializes as exactly those four properties with `"<n>px"` values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxPosition {
    /// Offset from the left edge of the offset parent.
    #[cfg_attr(feature = "serde", serde(rename = "--x"))]
    pub x: Px,
    /// Offset from the top edge of the offset parent.
    #[cfg_attr(feature = "serde", serde(rename = "--y"))]
    pub y: Px,
    /// Rendered width.
    #[cfg_attr(feature = "serde", serde(rename = "--width"))]
    pub width: Px,
    /// Rendered height.
    #[cfg_attr(feature = "serde", serde(rename = "--height"))]
    pub height: Px,
}

impl BoxPosition {
    /// The box published when there is no active item to follow.
    pub const ZERO: Self = Self {
        x: Px::ZERO,
        y: Px::ZERO,
        width: Px::ZERO,
        height: Px::ZERO,
    };

    /// Custom property names, in the order returned by [`BoxPosition::css_properties`].
    pub const PROPERTY_NAMES: [&'static str; 4] = ["--x", "--y", "--width", "--height"];

    /// Rounds raw element offsets to whole pixels.
    #[must_use]
    pub fn from_offsets(offsets: OffsetBox) -> Self {
        Self {
            x: Px::from_f64(offsets.origin.x),
            y: Px::from_f64(offsets.origin.y),
            width: Px::from_f64(offsets.size.width),
            height: Px::from_f64(offsets.size.height),
        }
    }

    /// Returns `(name, value)` pairs for the four custom properties.
    #[must_use]
    pub const fn css_properties(&self) -> [(&'static str, Px); 4] {
        let [x, y, width, height] = Self::PROPERTY_NAMES;
        [
            (x, self.x),
            (y, self.y),
            (width, self.width),
            (height, self.height),
        ]
    }

    /// Returns the box as a [`Rect`] in the offset parent's space.
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        let x0 = f64::from(self.x.0);
        let y0 = f64::from(self.y.0);
        Rect::new(
            x0,
            y0,
            x0 + f64::from(self.width.0),
            y0 + f64::from(self.height.0),
        )
    }
}

/// Formats the box as inline style text, e.g. `--x: 10px; --y: 6px; --width: 100px; --height: 21px`.
impl fmt::Display for BoxPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.css_properties().iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}
