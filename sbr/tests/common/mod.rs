// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the integration tests.

#![allow(dead_code, reason = "Not every test binary uses every helper.")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sbr::{Frame, PlaneBuf, Sample, VideoInfo};

pub const SEED: u64 = 0x5b_12_2025;

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// A plane of random samples in `0..=max`, including the row padding.
pub fn random_plane<T: Sample>(
    rng: &mut StdRng,
    width: usize,
    height: usize,
    stride: usize,
    max: u32,
) -> PlaneBuf<T> {
    let data = (0..stride * height)
        .map(|_| T::from_u32_saturating(rng.gen_range(0..=max)))
        .collect();
    PlaneBuf::from_vec(data, width, height, stride).unwrap()
}

/// A plane that only holds `0` and `max`, which drives every clamp in the pipeline.
pub fn extreme_plane<T: Sample>(
    rng: &mut StdRng,
    width: usize,
    height: usize,
    max: u32,
) -> PlaneBuf<T> {
    let data = (0..width * height)
        .map(|_| T::from_u32_saturating(if rng.gen_bool(0.5) { max } else { 0 }))
        .collect();
    PlaneBuf::from_vec(data, width, height, width).unwrap()
}

/// A plane built from literal rows.
pub fn plane_from_rows<T: Sample>(rows: &[&[T]]) -> PlaneBuf<T> {
    let width = rows[0].len();
    let data = rows.iter().flat_map(|row| row.iter().copied()).collect();
    PlaneBuf::from_vec(data, width, rows.len(), width).unwrap()
}

/// The rows of a plane, without padding, for comparing against literals.
pub fn rows_of<T: Sample>(plane: &PlaneBuf<T>) -> Vec<Vec<T>> {
    plane.as_plane().rows().map(<[T]>::to_vec).collect()
}

/// A frame of random samples in the valid range of `info`.
pub fn random_frame<T: Sample>(rng: &mut StdRng, info: &VideoInfo) -> Frame<T> {
    let max = ((1_u32 << info.bits_per_sample) - 1).min(T::MAX);
    Frame::try_from_planes((0..info.num_planes).map(|index| {
        let (width, height) = info.plane_dimensions(index);
        random_plane(rng, width, height, width, max)
    }))
    .unwrap()
}
