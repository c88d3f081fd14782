// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame plane processor.

use crate::config::{KernelVariant, PlaneMode, SbrConfig};
use crate::frame::{ColorFamily, Frame, Layout, SampleType, VideoInfo};
use crate::path::{ExecutionPath, Kernels};
use crate::plane::{Plane, PlaneMut};
use crate::scratch::ScratchBuffer;
use crate::{BitDepthProfile, Error, Result, Sample};

/// Run the four step pipeline on one plane.
///
/// `src` is blurred into the first scratch plane, the difference between `src` and that blur
/// goes into the second scratch plane, the difference is blurred into the first scratch plane
/// again, and finally `src` is merged with both into `dst`.
///
/// An empty plane has nothing to filter and is copied.
///
/// # Panics
///
/// Panics if `src` and `dst` differ in size.
pub fn filter_plane<T: Sample>(
    kernels: &Kernels,
    variant: KernelVariant,
    profile: &BitDepthProfile,
    src: &Plane<'_, T>,
    dst: &mut PlaneMut<'_, T>,
    scratch: &mut ScratchBuffer<T>,
) {
    let (width, height) = (src.width(), src.height());
    if width == 0 || height == 0 {
        dst.copy_from(src);
        return;
    }
    scratch.ensure(width, height);
    let (mut blurred, mut diff) = scratch.planes(width, height);

    kernels.blur(variant, profile, src, &mut blurred);
    kernels.make_diff(profile, src, &blurred.as_plane(), &mut diff);
    kernels.blur(variant, profile, &diff.as_plane(), &mut blurred);
    kernels.merge(profile, src, &diff.as_plane(), &blurred.as_plane(), dst);
}

/// A selective blur recovery filter instance.
///
/// An instance is built once per clip from a [`VideoInfo`] and an [`SbrConfig`], and then fed
/// frames one at a time. It owns its scratch storage, so processing takes `&mut self`; to
/// process frames in parallel, clone the instance once per thread (see
/// `ParallelSbr` with the `multithreading` feature).
///
/// ```
/// use sbr::{Sbr, SbrConfig, VideoInfo};
///
/// let info = VideoInfo::yuv(64, 48, 8, 1, 1);
/// let mut filter = Sbr::<u8>::new(&info, SbrConfig::sbr())?;
/// let frame = info.new_frame::<u8>();
/// let output = filter.process(&frame);
/// assert_eq!(output.num_planes(), 3);
/// # Ok::<(), sbr::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Sbr<T: Sample> {
    config: SbrConfig,
    info: VideoInfo,
    profile: BitDepthProfile,
    kernels: Kernels,
    scratch: ScratchBuffer<T>,
}

impl<T: Sample> Sbr<T> {
    /// Validate the format and configuration and allocate scratch storage.
    ///
    /// The format must be planar YUV or grey with unsigned integer samples of 8 to 16 bits,
    /// stored in `T`. The requested execution path must be supported by this CPU.
    pub fn new(info: &VideoInfo, config: SbrConfig) -> Result<Self> {
        validate(info, T::BYTES)?;
        let path = ExecutionPath::select(config.path)?;
        let kernels = Kernels::new(path).ok_or(Error::UnsupportedPath(path))?;
        let profile = BitDepthProfile::for_bits(info.bits_per_sample);

        // Only planes that are filtered need scratch space.
        let (width, height) = (0..info.num_planes)
            .filter(|&index| config.plane_mode(index) == PlaneMode::Filter)
            .map(|index| info.plane_dimensions(index))
            .fold((0, 0), |(w, h), (pw, ph)| (w.max(pw), h.max(ph)));
        let scratch = ScratchBuffer::new(width, height, path.row_padding())?;

        log::debug!(
            "{} on the {path} path: {}x{} at {} bits, planes {:?}",
            config.kernel,
            info.width,
            info.height,
            info.bits_per_sample,
            config.planes,
        );

        Ok(Self {
            config,
            info: *info,
            profile,
            kernels,
            scratch,
        })
    }

    /// Filter one frame into a freshly allocated frame of the same geometry.
    ///
    /// Planes are handled in order. Each of the first three planes is filtered or copied as
    /// configured; any further plane is copied.
    pub fn process(&mut self, src: &Frame<T>) -> Frame<T> {
        let mut dst = src.new_like();
        for (index, (input, output)) in src.planes().iter().zip(dst.planes_mut()).enumerate() {
            self.process_plane(index, &input.as_plane(), &mut output.as_plane_mut());
        }
        dst
    }

    /// Filter or copy a single plane, as configured for plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `src` and `dst` differ in size.
    pub fn process_plane(&mut self, index: usize, src: &Plane<'_, T>, dst: &mut PlaneMut<'_, T>) {
        match self.config.plane_mode(index) {
            PlaneMode::PassThrough => dst.copy_from(src),
            PlaneMode::Filter => filter_plane(
                &self.kernels,
                self.config.kernel,
                &self.profile,
                src,
                dst,
                &mut self.scratch,
            ),
        }
    }

    /// The execution path this instance runs on.
    pub fn execution_path(&self) -> ExecutionPath {
        self.kernels.path()
    }

    /// The constants for this instance's bit depth.
    pub fn profile(&self) -> &BitDepthProfile {
        &self.profile
    }

    /// The configuration this instance was built with.
    pub fn config(&self) -> &SbrConfig {
        &self.config
    }

    /// The format this instance was built for.
    pub fn video_info(&self) -> &VideoInfo {
        &self.info
    }

    /// The scratch storage, for inspecting its size.
    pub fn scratch(&self) -> &ScratchBuffer<T> {
        &self.scratch
    }
}

fn validate(info: &VideoInfo, sample_bytes: usize) -> Result<()> {
    if info.color_family == ColorFamily::Rgb {
        return Err(Error::UnsupportedColorFamily(info.color_family));
    }
    if info.layout != Layout::Planar {
        return Err(Error::UnsupportedLayout);
    }
    if info.sample_type != SampleType::Integer {
        return Err(Error::UnsupportedSampleType);
    }
    if !(8..=16).contains(&info.bits_per_sample) {
        return Err(Error::UnsupportedBitDepth(info.bits_per_sample));
    }
    if info.bytes_per_sample() != sample_bytes {
        return Err(Error::SampleWidthMismatch {
            bits: info.bits_per_sample,
            expected: info.bytes_per_sample(),
            actual: sample_bytes,
        });
    }
    if info.subsampling_w > 2 || info.subsampling_h > 2 {
        return Err(Error::UnsupportedSubsampling {
            horizontal: info.subsampling_w,
            vertical: info.subsampling_h,
        });
    }
    if info.num_planes == 0 {
        return Err(Error::EmptyFrame);
    }
    if info.width == 0 || info.height == 0 {
        return Err(Error::InvalidPlaneGeometry {
            width: info.width,
            height: info.height,
            stride: info.width,
            len: 0,
        });
    }
    Ok(())
}
