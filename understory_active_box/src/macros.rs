// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logging shims that compile away without the `tracing` feature.

#[cfg(feature = "tracing")]
macro_rules! abtrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "understory_active_box", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! abtrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! abdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "understory_active_box", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! abdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! abwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "understory_active_box", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! abwarn {
    ($($tt:tt)*) => {};
}
