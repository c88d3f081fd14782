// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command line host for the `sbr` filter.

mod args;
mod io;

use std::fs;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use sbr::{Frame, ParallelSbr, Sample, Sbr, SbrConfig, VideoInfo};

use crate::args::Args;
use crate::io::GrayImage;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.is_png() {
        run_png(&args)
    } else if args.bits > 8 {
        run_raw::<u16>(&args)
    } else {
        run_raw::<u8>(&args)
    }
}

fn run_raw<T: Sample>(args: &Args) -> anyhow::Result<()> {
    let info = args.raw_info()?;
    let bytes = fs::read(&args.input)
        .with_context(|| format!("couldn't read '{}'", args.input.display()))?;
    let frames = io::decode_raw::<T>(&bytes, &info, args.frames)?;
    let filtered = filter_frames(&info, args.config(), args.threads, &frames)?;

    let mut out = Vec::with_capacity(bytes.len());
    for frame in &filtered {
        io::encode_raw(frame, &mut out);
    }
    fs::write(&args.output, out)
        .with_context(|| format!("couldn't write '{}'", args.output.display()))?;
    Ok(())
}

fn run_png(args: &Args) -> anyhow::Result<()> {
    let filtered = match io::read_png(&args.input)? {
        GrayImage::Eight(frame) => {
            let info = gray_info(&frame, 8);
            let mut filtered = filter_frames(&info, args.config(), 1, &[frame])?;
            GrayImage::Eight(filtered.remove(0))
        }
        GrayImage::Sixteen(frame) => {
            let info = gray_info(&frame, 16);
            let mut filtered = filter_frames(&info, args.config(), 1, &[frame])?;
            GrayImage::Sixteen(filtered.remove(0))
        }
    };
    io::write_png(&args.output, &filtered)
}

fn gray_info<T: Sample>(frame: &Frame<T>, bits: u8) -> VideoInfo {
    let plane = frame.plane(0);
    VideoInfo::gray(plane.width(), plane.height(), bits)
}

/// Filter `frames` on one thread, or on a pool when `threads > 1`.
fn filter_frames<T: Sample>(
    info: &VideoInfo,
    config: SbrConfig,
    threads: usize,
    frames: &[Frame<T>],
) -> anyhow::Result<Vec<Frame<T>>> {
    let start = Instant::now();
    let filtered = if threads > 1 {
        let mut filter = ParallelSbr::new(info, config, threads)
            .context("couldn't create the filter")?;
        filter.process_frames(frames)
    } else {
        let mut filter = Sbr::new(info, config).context("couldn't create the filter")?;
        log::info!("filtering on the {} path", filter.execution_path());
        frames.iter().map(|frame| filter.process(frame)).collect()
    };
    log::info!(
        "filtered {} frame(s) of {}x{} in {:.2?}",
        frames.len(),
        info.width,
        info.height,
        start.elapsed()
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use sbr::{Frame, PathHint, PlaneBuf, Sbr, SbrConfig, VideoInfo};

    use super::{filter_frames, gray_info};
    use crate::io::{decode_raw, encode_raw};

    #[test]
    fn threaded_and_sequential_runs_agree() {
        let info = VideoInfo::yuv(24, 10, 8, 1, 1);
        let frame_len = info.frame_len();
        let bytes: Vec<u8> = (0..frame_len * 5).map(|i| (i * 7 % 251) as u8).collect();
        let frames = decode_raw::<u8>(&bytes, &info, None).unwrap();
        let config = SbrConfig::sbr().with_path(PathHint::Reference);

        let sequential = filter_frames(&info, config, 1, &frames).unwrap();
        let threaded = filter_frames(&info, config, 3, &frames).unwrap();
        assert_eq!(sequential, threaded);

        let mut out = Vec::new();
        for frame in &sequential {
            encode_raw(frame, &mut out);
        }
        assert_eq!(out.len(), bytes.len());
        // Chroma is copied by default.
        let chroma = info.width * info.height..frame_len;
        assert_eq!(out[chroma.clone()], bytes[chroma]);
    }

    #[test]
    fn png_depth_selects_the_profile() {
        let config = SbrConfig::sbr().with_path(PathHint::Reference);

        let eight = Frame::try_from_planes([PlaneBuf::<u8>::new(6, 4)]).unwrap();
        let info = gray_info(&eight, 8);
        assert_eq!((info.width, info.height, info.num_planes), (6, 4, 1));
        let filter = Sbr::<u8>::new(&info, config).unwrap();
        assert_eq!(filter.profile().peak(), 255);

        let sixteen = Frame::try_from_planes([PlaneBuf::<u16>::new(6, 4)]).unwrap();
        let filter = Sbr::<u16>::new(&gray_info(&sixteen, 16), config).unwrap();
        assert_eq!(filter.profile().peak(), 65535);
        assert_eq!(filter.profile().bias(), 32768);
    }
}
