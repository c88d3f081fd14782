// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frames and the video format description they are validated against.

use smallvec::SmallVec;

use crate::plane::PlaneBuf;
use crate::{Error, Result, Sample};

/// The colour family of a clip.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorFamily {
    /// Luma only.
    Gray,
    /// Luma plus two chroma planes.
    Yuv,
    /// Red, green and blue.
    Rgb,
}

/// How the components of a frame are laid out in memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Layout {
    /// One plane per component.
    Planar,
    /// Components interleaved per pixel.
    Packed,
}

/// The numeric type of the samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SampleType {
    /// Unsigned integer samples.
    Integer,
    /// Floating point samples.
    Float,
}

/// A description of the frames a filter instance will be fed.
///
/// Hosts fill this in once per clip. A filter instance validates it at construction and
/// sizes its scratch storage from the largest plane it filters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    /// Width of the luma plane in samples.
    pub width: usize,
    /// Height of the luma plane in rows.
    pub height: usize,
    /// The colour family.
    pub color_family: ColorFamily,
    /// Planar or packed.
    pub layout: Layout,
    /// Integer or float samples.
    pub sample_type: SampleType,
    /// Significant bits per sample.
    pub bits_per_sample: u8,
    /// Number of planes, including any alpha plane.
    pub num_planes: usize,
    /// Horizontal chroma subsampling, as a shift.
    pub subsampling_w: u8,
    /// Vertical chroma subsampling, as a shift.
    pub subsampling_h: u8,
}

impl VideoInfo {
    /// Planar YUV with the given subsampling shifts and no alpha.
    pub fn yuv(
        width: usize,
        height: usize,
        bits_per_sample: u8,
        subsampling_w: u8,
        subsampling_h: u8,
    ) -> Self {
        Self {
            width,
            height,
            color_family: ColorFamily::Yuv,
            layout: Layout::Planar,
            sample_type: SampleType::Integer,
            bits_per_sample,
            num_planes: 3,
            subsampling_w,
            subsampling_h,
        }
    }

    /// A single luma plane.
    pub fn gray(width: usize, height: usize, bits_per_sample: u8) -> Self {
        Self {
            color_family: ColorFamily::Gray,
            num_planes: 1,
            ..Self::yuv(width, height, bits_per_sample, 0, 0)
        }
    }

    /// Bytes needed to store one sample of this format.
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample).div_ceil(8)
    }

    /// The dimensions of plane `index`.
    ///
    /// Planes 1 and 2 of a YUV clip are chroma and are subsampled; every other plane,
    /// including alpha, has the luma dimensions. Chroma dimensions round up, so odd luma sizes
    /// never produce an empty chroma plane.
    pub fn plane_dimensions(&self, index: usize) -> (usize, usize) {
        let is_chroma = self.color_family == ColorFamily::Yuv && matches!(index, 1 | 2);
        if is_chroma {
            (
                subsampled(self.width, self.subsampling_w),
                subsampled(self.height, self.subsampling_h),
            )
        } else {
            (self.width, self.height)
        }
    }

    /// The number of samples one frame of this format occupies without row padding.
    pub fn frame_len(&self) -> usize {
        (0..self.num_planes)
            .map(|i| {
                let (w, h) = self.plane_dimensions(i);
                w * h
            })
            .sum()
    }

    /// Allocate a zeroed frame of this format, with unpadded rows.
    pub fn new_frame<T: Sample>(&self) -> Frame<T> {
        Frame::from_planes(
            (0..self.num_planes)
                .map(|i| {
                    let (w, h) = self.plane_dimensions(i);
                    PlaneBuf::new(w, h)
                })
                .collect(),
        )
    }
}

fn subsampled(len: usize, shift: u8) -> usize {
    match 1_usize.checked_shl(u32::from(shift)) {
        Some(step) => len.div_ceil(step),
        None => usize::from(len > 0),
    }
}

/// An owned frame: up to a handful of planes sharing one sample type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<T> {
    planes: SmallVec<[PlaneBuf<T>; 4]>,
}

impl<T: Sample> Frame<T> {
    /// Build a frame from its planes, in component order.
    pub fn from_planes(planes: SmallVec<[PlaneBuf<T>; 4]>) -> Self {
        Self { planes }
    }

    /// Build a frame from its planes, failing if there are none.
    pub fn try_from_planes(planes: impl IntoIterator<Item = PlaneBuf<T>>) -> Result<Self> {
        let planes: SmallVec<[PlaneBuf<T>; 4]> = planes.into_iter().collect();
        if planes.is_empty() {
            return Err(Error::EmptyFrame);
        }
        Ok(Self { planes })
    }

    /// The number of planes.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Plane `index`.
    pub fn plane(&self, index: usize) -> &PlaneBuf<T> {
        &self.planes[index]
    }

    /// Plane `index`, for writing.
    pub fn plane_mut(&mut self, index: usize) -> &mut PlaneBuf<T> {
        &mut self.planes[index]
    }

    /// All planes, in component order.
    pub fn planes(&self) -> &[PlaneBuf<T>] {
        &self.planes
    }

    /// All planes, for writing.
    pub fn planes_mut(&mut self) -> &mut [PlaneBuf<T>] {
        &mut self.planes
    }

    /// Allocate a zeroed frame with the same plane sizes and strides as this one.
    pub fn new_like(&self) -> Self {
        Self {
            planes: self
                .planes
                .iter()
                .map(|p| PlaneBuf::with_stride(p.width(), p.height(), p.stride()))
                .collect(),
        }
    }
}
