// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference implementation of the two blur kernels.
//!
//! Both kernels reflect at the top and bottom edge: the row above row 0 is row 1 and the row
//! below the last row is the second-to-last row. A single-row plane uses its only row for
//! both neighbours.
//!
//! The vertical kernel is `(above + 2 * center + below + round) >> 2`, where `round` comes from
//! the [`BitDepthProfile`](crate::BitDepthProfile). For some profiles `round` is large enough
//! to push a sum past the storage type, so results saturate at the storage maximum.
//!
//! The 3x3 kernel weighs corners 1, edges 2 and the centre 4, and rounds with `+ 8` before
//! `>> 4`. It has no horizontal reflection: the first and last column are copied from the
//! source unchanged.

use crate::Sample;

/// The rows used as the upper and lower neighbour of row `y`.
#[inline]
pub(crate) fn neighbours(y: usize, height: usize) -> (usize, usize) {
    let last = height - 1;
    let above = if y == 0 { 1.min(last) } else { y - 1 };
    let below = if y == last { last.saturating_sub(1) } else { y + 1 };
    (above, below)
}

/// Apply the vertical kernel to one row.
///
/// All inputs must be at least `out.len()` samples long.
pub(crate) fn vertical_row<T: Sample>(
    above: &[T],
    center: &[T],
    below: &[T],
    round: u32,
    out: &mut [T],
) {
    for (((o, a), c), b) in out.iter_mut().zip(above).zip(center).zip(below) {
        let sum = a.to_u32() + 2 * c.to_u32() + b.to_u32() + round;
        *o = T::from_u32_saturating(sum >> 2);
    }
}

/// Apply the 3x3 kernel to one row, copying the outer columns.
pub(crate) fn full_row<T: Sample>(above: &[T], center: &[T], below: &[T], out: &mut [T]) {
    let width = out.len();
    out[0] = center[0];
    out[width - 1] = center[width - 1];
    if width > 2 {
        full_interior(above, center, below, out, 1, width - 1);
    }
}

/// Apply the 3x3 kernel to the columns `start..end` of one row.
///
/// Needs `1 <= start` and `end < width`, since every column reads both horizontal neighbours.
/// Accelerated paths use this for the columns left over after their last full vector.
pub(crate) fn full_interior<T: Sample>(
    above: &[T],
    center: &[T],
    below: &[T],
    out: &mut [T],
    start: usize,
    end: usize,
) {
    for x in start..end {
        let corners = above[x - 1].to_u32()
            + above[x + 1].to_u32()
            + below[x - 1].to_u32()
            + below[x + 1].to_u32();
        let edges =
            above[x].to_u32() + center[x - 1].to_u32() + center[x + 1].to_u32() + below[x].to_u32();
        let sum = corners + 2 * edges + 4 * center[x].to_u32() + 8;
        out[x] = T::from_u32_saturating(sum >> 4);
    }
}
