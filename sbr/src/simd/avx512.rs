// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! AVX-512F row kernels, sixteen 32 bit lanes at a time.
//!
//! Comparisons produce `__mmask16` values instead of vector masks.

use core::arch::x86_64::*;

use crate::sample::{Sample, SampleWidth};
use crate::{blur, diff, merge};

const LANES: usize = 16;

#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn load<T: Sample>(ptr: *const T) -> __m512i {
    match T::WIDTH {
        SampleWidth::Byte => _mm512_cvtepu8_epi32(_mm_loadu_si128(ptr.cast::<__m128i>())),
        SampleWidth::Word => _mm512_cvtepu16_epi32(_mm256_loadu_si256(ptr.cast::<__m256i>())),
    }
}

/// Truncate sixteen lanes holding values in `0..=T::MAX` and store them.
#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn store<T: Sample>(ptr: *mut T, v: __m512i) {
    match T::WIDTH {
        SampleWidth::Byte => _mm_storeu_si128(ptr.cast::<__m128i>(), _mm512_cvtepi32_epi8(v)),
        SampleWidth::Word => {
            _mm256_storeu_si256(ptr.cast::<__m256i>(), _mm512_cvtepi32_epi16(v));
        }
    }
}

#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn clamp(v: __m512i, limit: __m512i) -> __m512i {
    _mm512_min_epi32(_mm512_max_epi32(v, _mm512_setzero_si512()), limit)
}

/// See [`blur::vertical_row`].
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn vertical_row<T: Sample>(
    above: &[T],
    center: &[T],
    below: &[T],
    round: u32,
    out: &mut [T],
) {
    let width = out.len();
    assert!(above.len() >= width && center.len() >= width && below.len() >= width);
    let round_v = _mm512_set1_epi32(round as i32);
    let max_v = _mm512_set1_epi32(T::MAX as i32);

    let mut x = 0;
    while x + LANES <= width {
        let a = load(above.as_ptr().add(x));
        let c = load(center.as_ptr().add(x));
        let b = load(below.as_ptr().add(x));
        let sum = _mm512_add_epi32(_mm512_add_epi32(a, _mm512_slli_epi32(c, 1)), b);
        let avg = _mm512_srli_epi32(_mm512_add_epi32(sum, round_v), 2);
        store(out.as_mut_ptr().add(x), _mm512_min_epi32(avg, max_v));
        x += LANES;
    }
    blur::vertical_row(
        &above[x..width],
        &center[x..width],
        &below[x..width],
        round,
        &mut out[x..],
    );
}

/// See [`blur::full_row`].
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn full_row<T: Sample>(above: &[T], center: &[T], below: &[T], out: &mut [T]) {
    let width = out.len();
    assert!(above.len() >= width && center.len() >= width && below.len() >= width);
    out[0] = center[0];
    out[width - 1] = center[width - 1];
    if width < 3 {
        return;
    }
    let eight = _mm512_set1_epi32(8);

    let mut x = 1;
    while x + LANES < width {
        let a0 = load(above.as_ptr().add(x - 1));
        let a1 = load(above.as_ptr().add(x));
        let a2 = load(above.as_ptr().add(x + 1));
        let c0 = load(center.as_ptr().add(x - 1));
        let c1 = load(center.as_ptr().add(x));
        let c2 = load(center.as_ptr().add(x + 1));
        let b0 = load(below.as_ptr().add(x - 1));
        let b1 = load(below.as_ptr().add(x));
        let b2 = load(below.as_ptr().add(x + 1));

        let corners = _mm512_add_epi32(_mm512_add_epi32(a0, a2), _mm512_add_epi32(b0, b2));
        let edges = _mm512_add_epi32(_mm512_add_epi32(a1, c0), _mm512_add_epi32(c2, b1));
        let sum = _mm512_add_epi32(
            _mm512_add_epi32(corners, _mm512_slli_epi32(edges, 1)),
            _mm512_add_epi32(_mm512_slli_epi32(c1, 2), eight),
        );
        store(out.as_mut_ptr().add(x), _mm512_srli_epi32(sum, 4));
        x += LANES;
    }
    blur::full_interior(above, center, below, out, x, width - 1);
}

/// See [`diff::diff_row`].
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn diff_row<T: Sample>(a: &[T], b: &[T], bias: u32, limit: u32, out: &mut [T]) {
    let width = out.len();
    assert!(a.len() >= width && b.len() >= width);
    let bias_v = _mm512_set1_epi32(bias as i32);
    let limit_v = _mm512_set1_epi32(limit as i32);

    let mut x = 0;
    while x + LANES <= width {
        let va = load(a.as_ptr().add(x));
        let vb = load(b.as_ptr().add(x));
        let d = _mm512_add_epi32(_mm512_sub_epi32(va, vb), bias_v);
        store(out.as_mut_ptr().add(x), clamp(d, limit_v));
        x += LANES;
    }
    diff::diff_row(&a[x..width], &b[x..width], bias, limit, &mut out[x..]);
}

/// See [`merge::merge_row`].
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn merge_row<T: Sample>(
    source: &[T],
    diff: &[T],
    diff_blur: &[T],
    bias: u32,
    limit: u32,
    out: &mut [T],
) {
    let width = out.len();
    assert!(source.len() >= width && diff.len() >= width && diff_blur.len() >= width);
    let bias_v = _mm512_set1_epi32(bias as i32);
    let limit_v = _mm512_set1_epi32(limit as i32);
    let zero = _mm512_setzero_si512();

    let mut x = 0;
    while x + LANES <= width {
        let s = load(source.as_ptr().add(x));
        let d = load(diff.as_ptr().add(x));
        let bd = load(diff_blur.as_ptr().add(x));

        let t = _mm512_sub_epi32(d, bd);
        let t2 = _mm512_sub_epi32(d, bias_v);
        let mismatch = (_mm512_cmplt_epi32_mask(t, zero) & _mm512_cmpgt_epi32_mask(t2, zero))
            | (_mm512_cmpgt_epi32_mask(t, zero) & _mm512_cmplt_epi32_mask(t2, zero));
        let partial = _mm512_cmplt_epi32_mask(_mm512_abs_epi32(t), _mm512_abs_epi32(t2));
        let desired = _mm512_sub_epi32(s, t);
        let otherwise = _mm512_add_epi32(_mm512_sub_epi32(s, d), bias_v);
        // `mask_blend` takes its second operand where the mask is set.
        let corrected = _mm512_mask_blend_epi32(partial, otherwise, desired);
        let merged = _mm512_mask_blend_epi32(mismatch, corrected, s);
        store(out.as_mut_ptr().add(x), clamp(merged, limit_v));
        x += LANES;
    }
    merge::merge_row(
        &source[x..width],
        &diff[x..width],
        &diff_blur[x..width],
        bias,
        limit,
        &mut out[x..],
    );
}
