// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "multithreading")]

mod common;

use common::{random_frame, rng};
use sbr::{KernelVariant, ParallelSbr, PlaneMode, Sbr, SbrConfig, VideoInfo};

#[test]
fn parallel_output_matches_sequential_in_order() {
    let mut rng = rng();
    let info = VideoInfo::yuv(45, 19, 10, 1, 1);
    let frames: Vec<_> = (0..12)
        .map(|_| random_frame::<u16>(&mut rng, &info))
        .collect();
    let config = SbrConfig {
        kernel: KernelVariant::VerticalOnly,
        ..SbrConfig::sbr()
    }
    .with_planes(PlaneMode::Filter, PlaneMode::Filter, PlaneMode::PassThrough);

    let mut sequential = Sbr::new(&info, config).unwrap();
    let expected: Vec<_> = frames.iter().map(|f| sequential.process(f)).collect();

    let mut parallel = ParallelSbr::new(&info, config, 4).unwrap();
    assert_eq!(parallel.process_frames(&frames), expected);
    // Workers keep their instances between batches.
    assert_eq!(parallel.process_frames(&frames[3..5]), expected[3..5]);
}

#[test]
fn invalid_formats_fail_before_the_pool_is_built() {
    let info = VideoInfo::gray(8, 8, 10);
    assert!(ParallelSbr::<u8>::new(&info, SbrConfig::sbr(), 2).is_err());
}
