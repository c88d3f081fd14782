// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reading and writing frames.

use std::path::Path;

use anyhow::{Context, bail};
use image::{DynamicImage, ImageBuffer, Luma};
use sbr::{Frame, PlaneBuf, Sample, VideoInfo};

/// Split raw bytes into frames of the given format.
///
/// Samples wider than one byte are little-endian. Reading stops after `limit` frames, if
/// given. A trailing partial frame is an error.
pub(crate) fn decode_raw<T: Sample>(
    bytes: &[u8],
    info: &VideoInfo,
    limit: Option<usize>,
) -> anyhow::Result<Vec<Frame<T>>> {
    let frame_bytes = info.frame_len() * T::BYTES;
    if frame_bytes == 0 {
        bail!("frames of {}x{} are empty", info.width, info.height);
    }
    if bytes.len() % frame_bytes != 0 {
        bail!(
            "input is {} bytes, which is not a whole number of {frame_bytes} byte frames",
            bytes.len()
        );
    }
    let count = (bytes.len() / frame_bytes).min(limit.unwrap_or(usize::MAX));

    bytes
        .chunks_exact(frame_bytes)
        .take(count)
        .map(|mut frame| -> anyhow::Result<Frame<T>> {
            let planes = (0..info.num_planes).map(|index| {
                let (width, height) = info.plane_dimensions(index);
                let (plane, rest) = frame.split_at(width * height * T::BYTES);
                frame = rest;
                PlaneBuf::from_vec(samples_from_le(plane), width, height, width)
            });
            Ok(Frame::try_from_planes(
                planes.collect::<sbr::Result<Vec<_>>>()?,
            )?)
        })
        .collect()
}

/// Append the frame to `out` as raw little-endian planes, without row padding.
pub(crate) fn encode_raw<T: Sample>(frame: &Frame<T>, out: &mut Vec<u8>) {
    for plane in frame.planes() {
        for row in plane.as_plane().rows() {
            if cfg!(target_endian = "little") {
                out.extend_from_slice(bytemuck::cast_slice(row));
            } else {
                for sample in row {
                    out.extend_from_slice(&sample.to_u32().to_le_bytes()[..T::BYTES]);
                }
            }
        }
    }
}

fn samples_from_le<T: Sample>(bytes: &[u8]) -> Vec<T> {
    if cfg!(target_endian = "little") {
        bytemuck::pod_collect_to_vec(bytes)
    } else {
        bytes
            .chunks_exact(T::BYTES)
            .map(|b| {
                let value = b
                    .iter()
                    .rev()
                    .fold(0_u32, |acc, &byte| (acc << 8) | u32::from(byte));
                T::from_u32_saturating(value)
            })
            .collect()
    }
}

/// A grey PNG image as a one-plane frame.
pub(crate) enum GrayImage {
    Eight(Frame<u8>),
    Sixteen(Frame<u16>),
}

/// Decode a grey PNG. Colour images are rejected rather than converted.
pub(crate) fn read_png(path: &Path) -> anyhow::Result<GrayImage> {
    let image =
        image::open(path).with_context(|| format!("couldn't read '{}'", path.display()))?;
    let (width, height) = (image.width() as usize, image.height() as usize);
    let frame = match image {
        DynamicImage::ImageLuma8(buffer) => {
            GrayImage::Eight(single_plane(buffer.into_raw(), width, height)?)
        }
        DynamicImage::ImageLuma16(buffer) => {
            GrayImage::Sixteen(single_plane(buffer.into_raw(), width, height)?)
        }
        other => bail!(
            "only grey PNG images are supported, '{}' is {:?}",
            path.display(),
            other.color()
        ),
    };
    Ok(frame)
}

fn single_plane<T: Sample>(data: Vec<T>, width: usize, height: usize) -> anyhow::Result<Frame<T>> {
    let plane = PlaneBuf::from_vec(data, width, height, width)?;
    Ok(Frame::try_from_planes([plane])?)
}

/// Encode the first plane of `image` as a grey PNG.
pub(crate) fn write_png(path: &Path, image: &GrayImage) -> anyhow::Result<()> {
    fn luma<T: Sample>(frame: &Frame<T>) -> anyhow::Result<(u32, u32, Vec<T>)> {
        let plane = frame.plane(0);
        let width = u32::try_from(plane.width())?;
        let height = u32::try_from(plane.height())?;
        Ok((width, height, plane.as_plane().rows().flatten().copied().collect()))
    }

    let result = match image {
        GrayImage::Eight(frame) => {
            let (width, height, data) = luma(frame)?;
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data)
                .context("plane does not match its dimensions")?
                .save(path)
        }
        GrayImage::Sixteen(frame) => {
            let (width, height, data) = luma(frame)?;
            ImageBuffer::<Luma<u16>, _>::from_raw(width, height, data)
                .context("plane does not match its dimensions")?
                .save(path)
        }
    };
    result.with_context(|| format!("couldn't write '{}'", path.display()))
}
