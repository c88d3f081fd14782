// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command line arguments.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sbr::{KernelVariant, PathHint, PlaneMode, SbrConfig, VideoInfo};

/// Selective blur recovery for raw planar YUV and grey PNG images.
///
/// Raw input is a sequence of frames, each stored as its planes one after another with no
/// padding; samples wider than 8 bits take two bytes, little-endian. PNG input is read as a
/// single grey frame and written back as PNG.
#[derive(Parser, Debug)]
#[command(version)]
pub(crate) struct Args {
    /// The input file.
    pub input: PathBuf,
    /// The output file, in the same format as the input.
    pub output: PathBuf,
    /// Luma width of raw input, in samples.
    #[arg(long)]
    pub width: Option<usize>,
    /// Luma height of raw input, in rows.
    #[arg(long)]
    pub height: Option<usize>,
    /// Plane layout of raw input.
    #[arg(long, value_enum, default_value_t = Format::Yuv420)]
    pub format: Format,
    /// Bits per sample of raw input.
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u8).range(8..=16))]
    pub bits: u8,
    /// The blur kernel: `sbr` for 3x3, `sbrv` for vertical only.
    #[arg(long, default_value = "sbr")]
    pub kernel: KernelVariant,
    /// Luma plane mode: `filter` or `copy`, or the codes 3 and 2.
    #[arg(long, default_value = "filter")]
    pub y: PlaneMode,
    /// First chroma plane mode.
    #[arg(long, default_value = "copy")]
    pub u: PlaneMode,
    /// Second chroma plane mode.
    #[arg(long, default_value = "copy")]
    pub v: PlaneMode,
    /// Execution path: `auto`, `c`, `sse2`, `avx2`, `avx512`, or the codes -1 to 3.
    #[arg(long, default_value = "auto", allow_negative_numbers = true)]
    pub opt: PathHint,
    /// Worker threads for filtering frames in parallel.
    #[arg(long, default_value_t = 1)]
    pub threads: usize,
    /// Stop after this many frames.
    #[arg(long)]
    pub frames: Option<usize>,
}

/// Plane layouts for raw input.
#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Format {
    /// Luma only.
    Gray,
    /// Chroma halved in both directions.
    Yuv420,
    /// Chroma halved horizontally.
    Yuv422,
    /// Full resolution chroma.
    Yuv444,
}

impl Args {
    /// The filter configuration the arguments describe.
    pub(crate) fn config(&self) -> SbrConfig {
        SbrConfig {
            planes: [self.y, self.u, self.v],
            kernel: self.kernel,
            path: self.opt,
        }
    }

    /// Whether the input is read as a PNG image rather than raw frames.
    pub(crate) fn is_png(&self) -> bool {
        self.input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    }

    /// The format of raw input.
    pub(crate) fn raw_info(&self) -> anyhow::Result<VideoInfo> {
        let width = self.width.context("raw input needs --width")?;
        let height = self.height.context("raw input needs --height")?;
        Ok(self.format.video_info(width, height, self.bits))
    }
}

impl Format {
    fn video_info(self, width: usize, height: usize, bits: u8) -> VideoInfo {
        match self {
            Self::Gray => VideoInfo::gray(width, height, bits),
            Self::Yuv420 => VideoInfo::yuv(width, height, bits, 1, 1),
            Self::Yuv422 => VideoInfo::yuv(width, height, bits, 1, 0),
            Self::Yuv444 => VideoInfo::yuv(width, height, bits, 0, 0),
        }
    }
}
