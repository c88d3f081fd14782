// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behaviour of the filter on the reference path.

mod common;

use common::{plane_from_rows, random_frame, random_plane, rng, rows_of};
use sbr::{
    BitDepthProfile, Error, ExecutionPath, Frame, Kernels, KernelVariant, PathHint, PlaneBuf,
    PlaneMode, Sample, Sbr, SbrConfig, ScratchBuffer, VideoInfo, filter_plane,
};

const KERNELS: [KernelVariant; 2] = [KernelVariant::Full3x3, KernelVariant::VerticalOnly];

fn reference(kernel: KernelVariant) -> SbrConfig {
    SbrConfig {
        kernel,
        ..SbrConfig::sbr()
    }
    .with_path(PathHint::Reference)
}

fn filter_one<T: Sample>(variant: KernelVariant, bits: u8, src: &PlaneBuf<T>) -> PlaneBuf<T> {
    let profile = BitDepthProfile::for_bits(bits);
    let mut dst = PlaneBuf::new(src.width(), src.height());
    let mut scratch = ScratchBuffer::new(src.width(), src.height(), 16).unwrap();
    filter_plane(
        &Kernels::reference(),
        variant,
        &profile,
        &src.as_plane(),
        &mut dst.as_plane_mut(),
        &mut scratch,
    );
    dst
}

#[test]
fn end_to_end_single_bright_sample() {
    let src = plane_from_rows::<u8>(&[&[50, 50, 50, 50], &[50, 200, 50, 50], &[50, 50, 50, 50]]);
    let out = filter_one(KernelVariant::Full3x3, 8, &src);
    // blur1 puts 88 and 69 in columns 1 and 2, the difference map holds 240 at the bright
    // sample, and its blur is 142 there: |240 - 142| < |240 - 128|, so 200 - 98 = 102.
    assert_eq!(
        rows_of(&out),
        [[50, 88, 69, 50], [50, 102, 69, 50], [50, 88, 69, 50]]
    );
    for (x, y) in [(0, 0), (3, 0), (0, 2), (3, 2)] {
        assert_eq!(out.get(x, y), 50, "corner ({x}, {y})");
    }
}

#[test]
fn end_to_end_single_bright_sample_vertical() {
    let src = plane_from_rows::<u8>(&[&[50, 50, 50, 50], &[50, 200, 50, 50], &[50, 50, 50, 50]]);
    let out = filter_one(KernelVariant::VerticalOnly, 8, &src);
    // Every row of the blurred difference map is flat at the bias, which selects the full
    // correction and leaves the vertical blur of the source.
    assert_eq!(
        rows_of(&out),
        [[50, 125, 50, 50], [50, 125, 50, 50], [50, 125, 50, 50]]
    );
}

#[test]
fn pass_through_copies_every_byte() {
    let mut rng = rng();
    let info = VideoInfo::yuv(37, 11, 10, 1, 0);
    let frame = random_frame::<u16>(&mut rng, &info);
    for kernel in KERNELS {
        let config = reference(kernel).with_planes(
            PlaneMode::PassThrough,
            PlaneMode::PassThrough,
            PlaneMode::PassThrough,
        );
        let mut filter = Sbr::new(&info, config).unwrap();
        let out = filter.process(&frame);
        for (input, output) in frame.planes().iter().zip(out.planes()) {
            assert_eq!(input.as_bytes(), output.as_bytes());
        }
    }
}

#[test]
fn default_config_only_filters_luma() {
    let mut rng = rng();
    let info = VideoInfo::yuv(16, 8, 8, 1, 1);
    let frame = random_frame::<u8>(&mut rng, &info);
    let mut filter = Sbr::new(&info, reference(KernelVariant::Full3x3)).unwrap();
    let out = filter.process(&frame);
    assert_eq!(out.plane(1), frame.plane(1));
    assert_eq!(out.plane(2), frame.plane(2));
    assert_eq!(
        out.plane(0),
        &filter_one(KernelVariant::Full3x3, 8, frame.plane(0))
    );
}

fn assert_flat_is_kept<T: Sample>(variant: KernelVariant, bits: u8, value: u32) {
    let profile = BitDepthProfile::for_bits(bits);
    let src = PlaneBuf::<T>::filled(9, 5, T::from_u32_saturating(value));
    let kernels = Kernels::reference();

    let mut blurred = PlaneBuf::new(9, 5);
    kernels.blur(variant, &profile, &src.as_plane(), &mut blurred.as_plane_mut());
    assert_eq!(blurred, src, "{variant} blur at {bits} bits");

    let mut diff = PlaneBuf::new(9, 5);
    kernels.make_diff(
        &profile,
        &src.as_plane(),
        &blurred.as_plane(),
        &mut diff.as_plane_mut(),
    );
    let bias = T::from_u32_saturating(profile.bias());
    assert_eq!(diff, PlaneBuf::filled(9, 5, bias), "difference at {bits} bits");

    assert_eq!(filter_one(variant, bits, &src), src, "{variant} at {bits} bits");
}

#[test]
fn flat_planes_are_unchanged() {
    for value in [0, 17, 128, 255] {
        assert_flat_is_kept::<u8>(KernelVariant::Full3x3, 8, value);
        assert_flat_is_kept::<u8>(KernelVariant::VerticalOnly, 8, value);
    }
    for value in [0, 300, 1023] {
        assert_flat_is_kept::<u16>(KernelVariant::Full3x3, 10, value);
        assert_flat_is_kept::<u16>(KernelVariant::VerticalOnly, 10, value);
    }
    for (bits, value) in [(12, 4095), (14, 9000), (16, 65535), (16, 1)] {
        assert_flat_is_kept::<u16>(KernelVariant::Full3x3, bits, value);
    }
}

#[test]
fn vertical_rounding_drifts_on_deep_flat_planes() {
    // The 12 and 16 bit rounding constants are at least 4, so `(4 * v + round) >> 2 > v`.
    let src = PlaneBuf::<u16>::filled(5, 3, 1000);
    let out = filter_one(KernelVariant::VerticalOnly, 12, &src);
    assert_eq!(out, PlaneBuf::filled(5, 3, 1001));

    let src = PlaneBuf::<u16>::filled(5, 3, 30000);
    let out = filter_one(KernelVariant::VerticalOnly, 16, &src);
    assert_eq!(out, PlaneBuf::filled(5, 3, 30016));

    // Saturates at the storage maximum instead of wrapping.
    let src = PlaneBuf::<u16>::filled(5, 3, 65535);
    let out = filter_one(KernelVariant::VerticalOnly, 16, &src);
    assert_eq!(out, src);
}

#[test]
fn full_kernel_keeps_outer_columns() {
    let mut rng = rng();
    for width in [1, 2, 3, 17] {
        let src = random_plane::<u8>(&mut rng, width, 6, width, 255);
        let profile = BitDepthProfile::for_bits(8);
        let mut blurred = PlaneBuf::new(width, 6);
        Kernels::reference().blur(
            KernelVariant::Full3x3,
            &profile,
            &src.as_plane(),
            &mut blurred.as_plane_mut(),
        );
        for y in 0..6 {
            assert_eq!(blurred.get(0, y), src.get(0, y));
            assert_eq!(blurred.get(width - 1, y), src.get(width - 1, y));
        }

        // The merge reproduces the source wherever the blur did.
        let out = filter_one(KernelVariant::Full3x3, 8, &src);
        for y in 0..6 {
            assert_eq!(out.get(0, y), src.get(0, y));
            assert_eq!(out.get(width - 1, y), src.get(width - 1, y));
        }
    }
}

#[test]
fn vertical_blur_reflects_two_row_planes() {
    let src = plane_from_rows::<u8>(&[&[10, 20, 30], &[40, 50, 60]]);
    let mut out = PlaneBuf::new(3, 2);
    Kernels::reference().blur(
        KernelVariant::VerticalOnly,
        &BitDepthProfile::for_bits(8),
        &src.as_plane(),
        &mut out.as_plane_mut(),
    );
    // Row 0: (40 + 2 * 10 + 40 + 2) >> 2. Row 1: (10 + 2 * 40 + 10 + 2) >> 2.
    assert_eq!(rows_of(&out), [[25, 35, 45], [25, 35, 45]]);
}

#[test]
fn single_row_planes_use_themselves_as_neighbours() {
    let src = plane_from_rows::<u8>(&[&[0, 40, 80, 120]]);
    let out = filter_one(KernelVariant::VerticalOnly, 8, &src);
    assert_eq!(out, src);
    let out = filter_one(KernelVariant::Full3x3, 8, &src);
    assert_eq!(out.get(0, 0), 0);
    assert_eq!(out.get(3, 0), 120);
}

#[test]
fn difference_map_is_bias_encoded() {
    let a = plane_from_rows::<u8>(&[&[200, 0, 255]]);
    let b = plane_from_rows::<u8>(&[&[100, 255, 0]]);
    let mut out = PlaneBuf::new(3, 1);
    Kernels::reference().make_diff(
        &BitDepthProfile::for_bits(8),
        &a.as_plane(),
        &b.as_plane(),
        &mut out.as_plane_mut(),
    );
    assert_eq!(rows_of(&out), [[228, 0, 255]]);
}

#[test]
fn merge_takes_each_branch() {
    let source = plane_from_rows::<u8>(&[&[90, 90, 90]]);
    let diff = plane_from_rows::<u8>(&[&[140, 140, 140]]);
    let diff_blur = plane_from_rows::<u8>(&[&[150, 135, 120]]);
    let mut out = PlaneBuf::new(3, 1);
    Kernels::reference().merge(
        &BitDepthProfile::for_bits(8),
        &source.as_plane(),
        &diff.as_plane(),
        &diff_blur.as_plane(),
        &mut out.as_plane_mut(),
    );
    // Sign mismatch keeps the source, then the partial and the full correction.
    assert_eq!(rows_of(&out), [[90, 85, 78]]);
}

#[test]
fn strides_are_honoured() {
    let mut rng = rng();
    let info = VideoInfo::gray(13, 7, 8);
    let padded = random_plane::<u8>(&mut rng, 13, 7, 20, 255);
    let unpadded = PlaneBuf::from_vec(
        padded.as_plane().rows().flatten().copied().collect(),
        13,
        7,
        13,
    )
    .unwrap();

    for kernel in KERNELS {
        let mut filter = Sbr::new(&info, reference(kernel)).unwrap();
        let mut out = PlaneBuf::with_stride(13, 7, 16);
        filter.process_plane(0, &padded.as_plane(), &mut out.as_plane_mut());
        let expected = filter_one(kernel, 8, &unpadded);
        assert_eq!(rows_of(&out), rows_of(&expected), "{kernel}");
        // Padding is never written.
        assert!(out.data()[13..16].iter().all(|&s| s == 0));
    }
}

#[test]
fn planes_past_the_third_are_copied() {
    let mut rng = rng();
    let info = VideoInfo {
        num_planes: 4,
        ..VideoInfo::yuv(10, 6, 8, 1, 1)
    };
    let frame = random_frame::<u8>(&mut rng, &info);
    let config = reference(KernelVariant::Full3x3).with_planes(
        PlaneMode::Filter,
        PlaneMode::Filter,
        PlaneMode::Filter,
    );
    let mut filter = Sbr::new(&info, config).unwrap();
    let out = filter.process(&frame);
    assert_eq!(out.num_planes(), 4);
    assert_eq!(out.plane(3), frame.plane(3));
    assert_eq!(out.plane(1).width(), 5);
    assert_eq!(out.plane(1).height(), 3);
}

#[test]
fn scratch_grows_for_larger_frames() {
    let mut rng = rng();
    let small = VideoInfo::gray(8, 4, 8);
    let large = VideoInfo::gray(40, 12, 8);
    let frame = random_frame::<u8>(&mut rng, &large);

    let mut grown = Sbr::new(&small, reference(KernelVariant::Full3x3)).unwrap();
    let mut sized = Sbr::new(&large, reference(KernelVariant::Full3x3)).unwrap();
    assert_eq!(grown.process(&frame), sized.process(&frame));
    assert_eq!(grown.scratch().width(), 40);
    assert_eq!(grown.scratch().height(), 12);

    // Smaller frames afterwards keep the larger buffer.
    let small_frame = random_frame::<u8>(&mut rng, &small);
    grown.process(&small_frame);
    assert_eq!(grown.scratch().width(), 40);
}

#[test]
fn repeated_frames_give_identical_output() {
    let mut rng = rng();
    let info = VideoInfo::yuv(21, 9, 12, 1, 1);
    let frame = random_frame::<u16>(&mut rng, &info);
    let mut filter = Sbr::new(&info, reference(KernelVariant::VerticalOnly)).unwrap();
    let first = filter.process(&frame);
    let second = filter.process(&frame);
    assert_eq!(first, second);
}

#[test]
fn gray_frames_only_use_the_first_mode() {
    let mut rng = rng();
    let info = VideoInfo::gray(12, 12, 16);
    let frame: Frame<u16> = random_frame(&mut rng, &info);
    let mut filter = Sbr::new(&info, reference(KernelVariant::Full3x3)).unwrap();
    let out = filter.process(&frame);
    assert_eq!(out.num_planes(), 1);
    assert_eq!(
        out.plane(0),
        &filter_one(KernelVariant::Full3x3, 16, frame.plane(0))
    );
}

#[test]
fn unsupported_paths_are_rejected() {
    let info = VideoInfo::gray(8, 8, 8);
    for (hint, path) in [
        (PathHint::Sse2, ExecutionPath::Sse2),
        (PathHint::Avx2, ExecutionPath::Avx2),
        (PathHint::Avx512, ExecutionPath::Avx512),
    ] {
        let result = Sbr::<u8>::new(&info, SbrConfig::sbr().with_path(hint));
        if path.is_supported() {
            assert_eq!(result.unwrap().execution_path(), path);
        } else {
            assert!(matches!(result, Err(Error::UnsupportedPath(p)) if p == path));
        }
    }
}

#[test]
fn degenerate_formats_are_rejected() {
    let config = SbrConfig::default();
    assert!(matches!(
        Sbr::<u8>::new(&VideoInfo::gray(0, 8, 8), config),
        Err(Error::InvalidPlaneGeometry { .. })
    ));
    let no_planes = VideoInfo {
        num_planes: 0,
        ..VideoInfo::gray(8, 8, 8)
    };
    assert!(matches!(
        Sbr::<u8>::new(&no_planes, config),
        Err(Error::EmptyFrame)
    ));
    assert!(matches!(
        Sbr::<u16>::new(&VideoInfo::gray(8, 8, 7), config),
        Err(Error::UnsupportedBitDepth(7))
    ));
    assert!(matches!(
        SbrConfig::from_legacy(KernelVariant::Full3x3, 0, 2, 2, -1),
        Err(Error::InvalidPlaneMode(0))
    ));
}
