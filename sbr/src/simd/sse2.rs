// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SSE2 row kernels, four 32 bit lanes at a time.
//!
//! SSE2 has no 32 bit min, max, abs or unsigned pack, so those are built from compares,
//! masks and a sign flip.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::sample::{Sample, SampleWidth};
use crate::{blur, diff, merge};

const LANES: usize = 4;

/// Load four samples and widen them to `i32` lanes.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn load<T: Sample>(ptr: *const T) -> __m128i {
    let zero = _mm_setzero_si128();
    match T::WIDTH {
        SampleWidth::Byte => {
            let bytes = _mm_cvtsi32_si128(core::ptr::read_unaligned(ptr.cast::<i32>()));
            _mm_unpacklo_epi16(_mm_unpacklo_epi8(bytes, zero), zero)
        }
        SampleWidth::Word => _mm_unpacklo_epi16(_mm_loadl_epi64(ptr.cast::<__m128i>()), zero),
    }
}

/// Narrow four lanes holding values in `0..=T::MAX` and store them.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn store<T: Sample>(ptr: *mut T, v: __m128i) {
    match T::WIDTH {
        SampleWidth::Byte => {
            let words = _mm_packs_epi32(v, v);
            let bytes = _mm_packus_epi16(words, words);
            core::ptr::write_unaligned(ptr.cast::<i32>(), _mm_cvtsi128_si32(bytes));
        }
        SampleWidth::Word => {
            // Shift into the signed range so the signed pack is exact, then flip back.
            let shifted = _mm_sub_epi32(v, _mm_set1_epi32(0x8000));
            let words = _mm_packs_epi32(shifted, shifted);
            let words = _mm_xor_si128(words, _mm_set1_epi16(i16::MIN));
            _mm_storel_epi64(ptr.cast::<__m128i>(), words);
        }
    }
}

/// `mask ? a : b`, lane by lane.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn select(mask: __m128i, a: __m128i, b: __m128i) -> __m128i {
    _mm_or_si128(_mm_and_si128(mask, a), _mm_andnot_si128(mask, b))
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn min(a: __m128i, b: __m128i) -> __m128i {
    select(_mm_cmplt_epi32(a, b), a, b)
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn max(a: __m128i, b: __m128i) -> __m128i {
    select(_mm_cmpgt_epi32(a, b), a, b)
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn abs(a: __m128i) -> __m128i {
    let sign = _mm_srai_epi32(a, 31);
    _mm_sub_epi32(_mm_xor_si128(a, sign), sign)
}

/// See [`blur::vertical_row`].
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn vertical_row<T: Sample>(
    above: &[T],
    center: &[T],
    below: &[T],
    round: u32,
    out: &mut [T],
) {
    let width = out.len();
    assert!(above.len() >= width && center.len() >= width && below.len() >= width);
    let round_v = _mm_set1_epi32(round as i32);
    let max_v = _mm_set1_epi32(T::MAX as i32);

    let mut x = 0;
    while x + LANES <= width {
        let a = load(above.as_ptr().add(x));
        let c = load(center.as_ptr().add(x));
        let b = load(below.as_ptr().add(x));
        let sum = _mm_add_epi32(_mm_add_epi32(a, _mm_slli_epi32(c, 1)), b);
        let avg = _mm_srli_epi32(_mm_add_epi32(sum, round_v), 2);
        store(out.as_mut_ptr().add(x), min(avg, max_v));
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
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn full_row<T: Sample>(above: &[T], center: &[T], below: &[T], out: &mut [T]) {
    let width = out.len();
    assert!(above.len() >= width && center.len() >= width && below.len() >= width);
    out[0] = center[0];
    out[width - 1] = center[width - 1];
    if width < 3 {
        return;
    }
    let eight = _mm_set1_epi32(8);

    let mut x = 1;
    // The rightmost lane reads column `x + LANES`, which must not pass `width - 1`.
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

        let corners = _mm_add_epi32(_mm_add_epi32(a0, a2), _mm_add_epi32(b0, b2));
        let edges = _mm_add_epi32(_mm_add_epi32(a1, c0), _mm_add_epi32(c2, b1));
        let sum = _mm_add_epi32(
            _mm_add_epi32(corners, _mm_slli_epi32(edges, 1)),
            _mm_add_epi32(_mm_slli_epi32(c1, 2), eight),
        );
        store(out.as_mut_ptr().add(x), _mm_srli_epi32(sum, 4));
        x += LANES;
    }
    blur::full_interior(above, center, below, out, x, width - 1);
}

/// See [`diff::diff_row`].
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn diff_row<T: Sample>(a: &[T], b: &[T], bias: u32, limit: u32, out: &mut [T]) {
    let width = out.len();
    assert!(a.len() >= width && b.len() >= width);
    let bias_v = _mm_set1_epi32(bias as i32);
    let limit_v = _mm_set1_epi32(limit as i32);
    let zero = _mm_setzero_si128();

    let mut x = 0;
    while x + LANES <= width {
        let va = load(a.as_ptr().add(x));
        let vb = load(b.as_ptr().add(x));
        let d = _mm_add_epi32(_mm_sub_epi32(va, vb), bias_v);
        store(out.as_mut_ptr().add(x), min(max(d, zero), limit_v));
        x += LANES;
    }
    diff::diff_row(&a[x..width], &b[x..width], bias, limit, &mut out[x..]);
}

/// See [`merge::merge_row`].
#[target_feature(enable = "sse2")]
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
    let bias_v = _mm_set1_epi32(bias as i32);
    let limit_v = _mm_set1_epi32(limit as i32);
    let zero = _mm_setzero_si128();

    let mut x = 0;
    while x + LANES <= width {
        let s = load(source.as_ptr().add(x));
        let d = load(diff.as_ptr().add(x));
        let bd = load(diff_blur.as_ptr().add(x));

        let t = _mm_sub_epi32(d, bd);
        let t2 = _mm_sub_epi32(d, bias_v);
        // `t * t2 < 0` without the product, which overflows for 16 bit input.
        let mismatch = _mm_or_si128(
            _mm_and_si128(_mm_cmplt_epi32(t, zero), _mm_cmpgt_epi32(t2, zero)),
            _mm_and_si128(_mm_cmpgt_epi32(t, zero), _mm_cmplt_epi32(t2, zero)),
        );
        let partial = _mm_cmplt_epi32(abs(t), abs(t2));
        let desired = _mm_sub_epi32(s, t);
        let otherwise = _mm_add_epi32(_mm_sub_epi32(s, d), bias_v);
        let merged = select(mismatch, s, select(partial, desired, otherwise));
        store(out.as_mut_ptr().add(x), min(max(merged, zero), limit_v));
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
