// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! AVX2 row kernels, eight 32 bit lanes at a time.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::sample::{Sample, SampleWidth};
use crate::{blur, diff, merge};

const LANES: usize = 8;

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn load<T: Sample>(ptr: *const T) -> __m256i {
    match T::WIDTH {
        SampleWidth::Byte => _mm256_cvtepu8_epi32(_mm_loadl_epi64(ptr.cast::<__m128i>())),
        SampleWidth::Word => _mm256_cvtepu16_epi32(_mm_loadu_si128(ptr.cast::<__m128i>())),
    }
}

/// Narrow eight lanes holding values in `0..=T::MAX` and store them.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn store<T: Sample>(ptr: *mut T, v: __m256i) {
    // The pack works per 128 bit half; gather the two useful quarters into the low half.
    let packed = _mm256_permute4x64_epi64(_mm256_packus_epi32(v, v), 0b1000);
    let words = _mm256_castsi256_si128(packed);
    match T::WIDTH {
        SampleWidth::Byte => {
            _mm_storel_epi64(ptr.cast::<__m128i>(), _mm_packus_epi16(words, words));
        }
        SampleWidth::Word => _mm_storeu_si128(ptr.cast::<__m128i>(), words),
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn select(mask: __m256i, a: __m256i, b: __m256i) -> __m256i {
    _mm256_blendv_epi8(b, a, mask)
}

/// See [`blur::vertical_row`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn vertical_row<T: Sample>(
    above: &[T],
    center: &[T],
    below: &[T],
    round: u32,
    out: &mut [T],
) {
    let width = out.len();
    assert!(above.len() >= width && center.len() >= width && below.len() >= width);
    let round_v = _mm256_set1_epi32(round as i32);
    let max_v = _mm256_set1_epi32(T::MAX as i32);

    let mut x = 0;
    while x + LANES <= width {
        let a = load(above.as_ptr().add(x));
        let c = load(center.as_ptr().add(x));
        let b = load(below.as_ptr().add(x));
        let sum = _mm256_add_epi32(_mm256_add_epi32(a, _mm256_slli_epi32(c, 1)), b);
        let avg = _mm256_srli_epi32(_mm256_add_epi32(sum, round_v), 2);
        store(out.as_mut_ptr().add(x), _mm256_min_epi32(avg, max_v));
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
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn full_row<T: Sample>(above: &[T], center: &[T], below: &[T], out: &mut [T]) {
    let width = out.len();
    assert!(above.len() >= width && center.len() >= width && below.len() >= width);
    out[0] = center[0];
    out[width - 1] = center[width - 1];
    if width < 3 {
        return;
    }
    let eight = _mm256_set1_epi32(8);

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

        let corners = _mm256_add_epi32(_mm256_add_epi32(a0, a2), _mm256_add_epi32(b0, b2));
        let edges = _mm256_add_epi32(_mm256_add_epi32(a1, c0), _mm256_add_epi32(c2, b1));
        let sum = _mm256_add_epi32(
            _mm256_add_epi32(corners, _mm256_slli_epi32(edges, 1)),
            _mm256_add_epi32(_mm256_slli_epi32(c1, 2), eight),
        );
        store(out.as_mut_ptr().add(x), _mm256_srli_epi32(sum, 4));
        x += LANES;
    }
    blur::full_interior(above, center, below, out, x, width - 1);
}

/// See [`diff::diff_row`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn diff_row<T: Sample>(a: &[T], b: &[T], bias: u32, limit: u32, out: &mut [T]) {
    let width = out.len();
    assert!(a.len() >= width && b.len() >= width);
    let bias_v = _mm256_set1_epi32(bias as i32);
    let limit_v = _mm256_set1_epi32(limit as i32);
    let zero = _mm256_setzero_si256();

    let mut x = 0;
    while x + LANES <= width {
        let va = load(a.as_ptr().add(x));
        let vb = load(b.as_ptr().add(x));
        let d = _mm256_add_epi32(_mm256_sub_epi32(va, vb), bias_v);
        store(
            out.as_mut_ptr().add(x),
            _mm256_min_epi32(_mm256_max_epi32(d, zero), limit_v),
        );
        x += LANES;
    }
    diff::diff_row(&a[x..width], &b[x..width], bias, limit, &mut out[x..]);
}

/// See [`merge::merge_row`].
#[target_feature(enable = "avx2")]
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
    let bias_v = _mm256_set1_epi32(bias as i32);
    let limit_v = _mm256_set1_epi32(limit as i32);
    let zero = _mm256_setzero_si256();

    let mut x = 0;
    while x + LANES <= width {
        let s = load(source.as_ptr().add(x));
        let d = load(diff.as_ptr().add(x));
        let bd = load(diff_blur.as_ptr().add(x));

        let t = _mm256_sub_epi32(d, bd);
        let t2 = _mm256_sub_epi32(d, bias_v);
        let t_neg = _mm256_cmpgt_epi32(zero, t);
        let t_pos = _mm256_cmpgt_epi32(t, zero);
        let t2_neg = _mm256_cmpgt_epi32(zero, t2);
        let t2_pos = _mm256_cmpgt_epi32(t2, zero);
        let mismatch = _mm256_or_si256(
            _mm256_and_si256(t_neg, t2_pos),
            _mm256_and_si256(t_pos, t2_neg),
        );
        let partial = _mm256_cmpgt_epi32(_mm256_abs_epi32(t2), _mm256_abs_epi32(t));
        let desired = _mm256_sub_epi32(s, t);
        let otherwise = _mm256_add_epi32(_mm256_sub_epi32(s, d), bias_v);
        let merged = select(mismatch, s, select(partial, desired, otherwise));
        store(
            out.as_mut_ptr().add(x),
            _mm256_min_epi32(_mm256_max_epi32(merged, zero), limit_v),
        );
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
