// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time options.

use core::fmt;
use core::str::FromStr;

use crate::{Error, Result};

/// What to do with one plane.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaneMode {
    /// Run the filter pipeline.
    Filter,
    /// Copy the plane unchanged.
    PassThrough,
}

impl TryFrom<i32> for PlaneMode {
    type Error = Error;

    /// Parse the legacy plane codes: `3` filters, `2` copies.
    ///
    /// `1` is accepted and filters as well, since only `2` ever selected a copy.
    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 | 3 => Ok(Self::Filter),
            2 => Ok(Self::PassThrough),
            _ => Err(Error::InvalidPlaneMode(code)),
        }
    }
}

impl FromStr for PlaneMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "filter" | "process" => Ok(Self::Filter),
            "copy" | "passthrough" => Ok(Self::PassThrough),
            _ => match s.parse::<i32>() {
                Ok(code) => Self::try_from(code),
                Err(_) => Err(Error::UnknownName {
                    kind: "plane mode",
                    value: s.to_string(),
                }),
            },
        }
    }
}

/// The blur used by both blur steps of the pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KernelVariant {
    /// The 3x3 `[1 2 1; 2 4 2; 1 2 1] / 16` kernel. Outer columns are copied.
    Full3x3,
    /// The vertical `[1 2 1] / 4` kernel.
    VerticalOnly,
}

impl FromStr for KernelVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sbr" | "full" | "3x3" => Ok(Self::Full3x3),
            "sbrv" | "sbrV" | "vertical" => Ok(Self::VerticalOnly),
            _ => Err(Error::UnknownName {
                kind: "kernel",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Full3x3 => "sbr",
            Self::VerticalOnly => "sbrV",
        })
    }
}

/// Which execution path the caller asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PathHint {
    /// The fastest path the CPU supports.
    #[default]
    Auto,
    /// The scalar reference path.
    Reference,
    /// SSE2, 4 lanes.
    Sse2,
    /// AVX2, 8 lanes.
    Avx2,
    /// AVX-512F, 16 lanes.
    Avx512,
}

impl TryFrom<i32> for PathHint {
    type Error = Error;

    /// Parse the legacy `opt` codes, `-1` to `3`.
    fn try_from(code: i32) -> Result<Self> {
        match code {
            -1 => Ok(Self::Auto),
            0 => Ok(Self::Reference),
            1 => Ok(Self::Sse2),
            2 => Ok(Self::Avx2),
            3 => Ok(Self::Avx512),
            _ => Err(Error::InvalidPathHint(code)),
        }
    }
}

impl FromStr for PathHint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "c" | "reference" | "scalar" => Ok(Self::Reference),
            "sse2" => Ok(Self::Sse2),
            "avx2" => Ok(Self::Avx2),
            "avx512" | "avx512f" => Ok(Self::Avx512),
            _ => match s.parse::<i32>() {
                Ok(code) => Self::try_from(code),
                Err(_) => Err(Error::UnknownName {
                    kind: "execution path",
                    value: s.to_string(),
                }),
            },
        }
    }
}

/// Options for building a filter instance.
///
/// These are fixed for the lifetime of the instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SbrConfig {
    /// Modes for the first three planes. Further planes are always copied.
    pub planes: [PlaneMode; 3],
    /// The blur kernel.
    pub kernel: KernelVariant,
    /// The requested execution path.
    pub path: PathHint,
}

impl SbrConfig {
    /// The `sbr` filter: 3x3 blur, luma filtered, chroma copied.
    pub fn sbr() -> Self {
        Self {
            planes: [
                PlaneMode::Filter,
                PlaneMode::PassThrough,
                PlaneMode::PassThrough,
            ],
            kernel: KernelVariant::Full3x3,
            path: PathHint::Auto,
        }
    }

    /// The `sbrV` filter: vertical blur, luma filtered, chroma copied.
    pub fn sbr_v() -> Self {
        Self {
            kernel: KernelVariant::VerticalOnly,
            ..Self::sbr()
        }
    }

    /// Replace the plane modes.
    pub fn with_planes(mut self, y: PlaneMode, u: PlaneMode, v: PlaneMode) -> Self {
        self.planes = [y, u, v];
        self
    }

    /// Replace the execution path hint.
    pub fn with_path(mut self, path: PathHint) -> Self {
        self.path = path;
        self
    }

    /// Build a configuration from the legacy integer arguments `y`, `u`, `v` and `opt`.
    pub fn from_legacy(kernel: KernelVariant, y: i32, u: i32, v: i32, opt: i32) -> Result<Self> {
        Ok(Self {
            planes: [y.try_into()?, u.try_into()?, v.try_into()?],
            kernel,
            path: opt.try_into()?,
        })
    }

    /// The mode for plane `index`; planes past the third are passed through.
    pub fn plane_mode(&self, index: usize) -> PlaneMode {
        self.planes
            .get(index)
            .copied()
            .unwrap_or(PlaneMode::PassThrough)
    }
}

impl Default for SbrConfig {
    fn default() -> Self {
        Self::sbr()
    }
}
