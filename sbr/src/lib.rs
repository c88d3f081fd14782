// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selective blur recovery for planar video.
//!
//! Sharpening and resizing filters tend to leave ringing and overshoot next to edges, and a
//! plain blur removes those together with the detail. This crate blurs a plane, encodes the
//! difference to the blur, blurs that difference, and then only takes back the part of the
//! correction that the blurred difference agrees with. Genuine edges survive; halos do not.
//!
//! ## Pipeline
//!
//! For every filtered plane:
//!
//! 1. `blur1 = blur(source)`
//! 2. `diff = clamp(source - blur1 + bias, 0, peak)`
//! 3. `blur2 = blur(diff)`
//! 4. `output = merge(source, diff, blur2)`
//!
//! Two blur kernels are available: a 3x3 `[1 2 1; 2 4 2; 1 2 1] / 16` kernel
//! ([`SbrConfig::sbr`]) and a vertical `[1 2 1] / 4` kernel ([`SbrConfig::sbr_v`]).
//! Both reflect at the top and bottom edge. The 3x3 kernel copies the first and last column.
//!
//! ## Execution paths
//!
//! The pipeline has a scalar reference implementation and SSE2, AVX2 and AVX-512F
//! implementations on x86. All paths produce bit-identical output; [`ExecutionPath`] selects
//! one at construction, either automatically or as requested.
//!
//! ## Usage
//!
//! ```
//! use sbr::{Sbr, SbrConfig, VideoInfo};
//!
//! let info = VideoInfo::gray(4, 3, 8);
//! let mut filter = Sbr::<u8>::new(&info, SbrConfig::sbr())?;
//!
//! let mut frame = info.new_frame::<u8>();
//! frame.plane_mut(0).row_mut(1).copy_from_slice(&[50, 200, 50, 50]);
//! let output = filter.process(&frame);
//!
//! // The outer columns of the 3x3 kernel are never touched.
//! assert_eq!(output.plane(0).get(0, 1), 50);
//! # Ok::<(), sbr::Error>(())
//! ```
//!
//! ## Features
//!
//! - `multithreading`: Enables [`ParallelSbr`], which filters batches of frames on a
//!   [`rayon`](https://docs.rs/rayon) thread pool.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

mod blur;
mod config;
mod diff;
mod frame;
mod merge;
#[cfg(feature = "multithreading")]
mod parallel;
mod path;
mod plane;
mod processor;
mod profile;
mod sample;
mod scratch;
mod simd;

use thiserror::Error;

pub use config::{KernelVariant, PathHint, PlaneMode, SbrConfig};
pub use frame::{ColorFamily, Frame, Layout, SampleType, VideoInfo};
#[cfg(feature = "multithreading")]
pub use parallel::ParallelSbr;
pub use path::{ExecutionPath, Kernels};
pub use plane::{Plane, PlaneBuf, PlaneMut};
pub use processor::{Sbr, filter_plane};
pub use profile::BitDepthProfile;
pub use sample::{Sample, SampleWidth};
pub use scratch::ScratchBuffer;

/// Errors that can occur when building a filter instance.
///
/// Processing a frame never fails; everything is checked up front.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Only YUV and grey clips can be filtered.
    #[error("unsupported colour family {0:?}, only YUV and grey are supported")]
    UnsupportedColorFamily(ColorFamily),
    /// Packed formats are not supported.
    #[error("only planar formats are supported")]
    UnsupportedLayout,
    /// Float samples are not supported.
    #[error("only integer samples are supported")]
    UnsupportedSampleType,
    /// The bit depth is outside `8..=16`.
    #[error("unsupported bit depth {0}, must be between 8 and 16")]
    UnsupportedBitDepth(u8),
    /// The clip's samples do not fit the sample type the instance was built for.
    #[error("{bits} bit samples take {expected} bytes, but the sample type has {actual}")]
    SampleWidthMismatch {
        /// Bits per sample of the clip.
        bits: u8,
        /// Bytes per sample the clip needs.
        expected: usize,
        /// Bytes per sample of the sample type.
        actual: usize,
    },
    /// Chroma subsampling shifts above 2.
    #[error("unsupported chroma subsampling {horizontal}x{vertical}, shifts must be at most 2")]
    UnsupportedSubsampling {
        /// Horizontal shift.
        horizontal: u8,
        /// Vertical shift.
        vertical: u8,
    },
    /// A legacy plane code other than 1, 2 or 3.
    #[error("plane mode {0} is invalid, must be between 1 and 3")]
    InvalidPlaneMode(i32),
    /// A legacy `opt` code outside `-1..=3`.
    #[error("opt {0} is invalid, must be between -1 and 3")]
    InvalidPathHint(i32),
    /// The requested execution path is not supported by this CPU.
    #[error("the {0} execution path is not supported by this CPU")]
    UnsupportedPath(ExecutionPath),
    /// A plane's dimensions do not fit its storage.
    #[error("a {width}x{height} plane with stride {stride} does not fit in {len} samples")]
    InvalidPlaneGeometry {
        /// Width in samples.
        width: usize,
        /// Height in rows.
        height: usize,
        /// Row stride in samples.
        stride: usize,
        /// Length of the storage in samples.
        len: usize,
    },
    /// A frame or format without planes.
    #[error("frames must have at least one plane")]
    EmptyFrame,
    /// The scratch buffer could not be allocated.
    #[error("couldn't allocate the scratch buffer")]
    ScratchAllocation(#[from] std::collections::TryReserveError),
    /// The worker thread pool could not be created.
    #[cfg(feature = "multithreading")]
    #[error("couldn't build the worker thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// A name that does not match any known option.
    #[error("unknown {kind} `{value}`")]
    UnknownName {
        /// What was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// A specialized `Result` type for filter construction.
pub type Result<T, E = Error> = std::result::Result<T, E>;

static_assertions::assert_impl_all!(Error: Send, Sync);
static_assertions::assert_impl_all!(Sbr<u8>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Sbr<u16>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Kernels: Send, Sync, Copy);
