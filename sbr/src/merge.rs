// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference implementation of the correction merge.
//!
//! For every sample, with `d` the difference map and `bd` its blur:
//!
//! ```text
//! t  = d - bd
//! t2 = d - bias
//! t * t2 < 0   =>  source              (the correction changes sign: keep the original)
//! |t| < |t2|   =>  source - t          (partial correction)
//! otherwise    =>  source - d + bias   (full correction)
//! ```
//!
//! The result is clamped to `0..=limit`.

use crate::Sample;

/// Merge one sample.
#[inline(always)]
pub(crate) fn merge_sample(source: i32, diff: i32, diff_blur: i32, bias: i32, limit: i32) -> i32 {
    let t = diff - diff_blur;
    let t2 = diff - bias;
    // 16 bit differences overflow an `i32` product.
    let merged = if i64::from(t) * i64::from(t2) < 0 {
        source
    } else if t.abs() < t2.abs() {
        source - t
    } else {
        source - diff + bias
    };
    merged.clamp(0, limit)
}

/// Merge one row.
pub(crate) fn merge_row<T: Sample>(
    source: &[T],
    diff: &[T],
    diff_blur: &[T],
    bias: u32,
    limit: u32,
    out: &mut [T],
) {
    let bias = bias as i32;
    let limit = limit as i32;
    for (((o, s), d), bd) in out.iter_mut().zip(source).zip(diff).zip(diff_blur) {
        let merged = merge_sample(
            s.to_u32() as i32,
            d.to_u32() as i32,
            bd.to_u32() as i32,
            bias,
            limit,
        );
        *o = T::from_i32_clamped(merged);
    }
}
