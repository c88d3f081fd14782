// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference implementation of the bias-encoded difference map.

use crate::Sample;

/// Store `clamp(a - b + bias, 0, limit)` for every column of one row.
///
/// `limit` is the profile peak, capped at the storage maximum.
pub(crate) fn diff_row<T: Sample>(a: &[T], b: &[T], bias: u32, limit: u32, out: &mut [T]) {
    let bias = bias as i32;
    let limit = limit as i32;
    for ((o, a), b) in out.iter_mut().zip(a).zip(b) {
        let d = a.to_u32() as i32 - b.to_u32() as i32 + bias;
        *o = T::from_i32_clamped(d.clamp(0, limit));
    }
}
