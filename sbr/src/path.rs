// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution path detection and dispatch.
//!
//! Every path computes the same integer expressions as the reference path and produces
//! bit-identical output; they differ only in how many samples they process per instruction.

use core::fmt;

use crate::config::{KernelVariant, PathHint};
use crate::plane::{Plane, PlaneMut};
use crate::{BitDepthProfile, Error, Result, Sample, blur};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::simd;

/// One of the interchangeable implementations of the filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExecutionPath {
    /// Scalar code, available everywhere.
    Reference,
    /// SSE2, four 32 bit lanes.
    Sse2,
    /// AVX2, eight 32 bit lanes.
    Avx2,
    /// AVX-512F, sixteen 32 bit lanes. Only on `x86_64`.
    Avx512,
}

impl ExecutionPath {
    /// All paths, slowest first.
    pub const ALL: [Self; 4] = [Self::Reference, Self::Sse2, Self::Avx2, Self::Avx512];

    /// Whether this CPU can run the path.
    pub fn is_supported(self) -> bool {
        has_feature(self)
    }

    /// The fastest supported path.
    pub fn detect() -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|path| path.is_supported())
            .unwrap_or(Self::Reference)
    }

    /// Every path this CPU supports, slowest first.
    pub fn available() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(|path| path.is_supported())
    }

    /// Resolve a caller hint to a path.
    ///
    /// [`PathHint::Auto`] picks the fastest supported path. Asking for a specific path this CPU
    /// lacks is an error rather than a silent fallback.
    pub fn select(hint: PathHint) -> Result<Self> {
        let path = match hint {
            PathHint::Auto => return Ok(Self::detect()),
            PathHint::Reference => Self::Reference,
            PathHint::Sse2 => Self::Sse2,
            PathHint::Avx2 => Self::Avx2,
            PathHint::Avx512 => Self::Avx512,
        };
        if path.is_supported() {
            Ok(path)
        } else {
            Err(Error::UnsupportedPath(path))
        }
    }

    /// Samples processed per vector step.
    pub fn lanes(self) -> usize {
        match self {
            Self::Reference => 1,
            Self::Sse2 => 4,
            Self::Avx2 => 8,
            Self::Avx512 => 16,
        }
    }

    /// The multiple, in samples, that scratch rows are padded to.
    pub fn row_padding(self) -> usize {
        match self {
            Self::Reference | Self::Sse2 => 16,
            Self::Avx2 => 32,
            Self::Avx512 => 64,
        }
    }
}

impl fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::Sse2 => "sse2",
            Self::Avx2 => "avx2",
            Self::Avx512 => "avx512",
        })
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_feature(path: ExecutionPath) -> bool {
    match path {
        ExecutionPath::Reference => true,
        ExecutionPath::Sse2 => std::arch::is_x86_feature_detected!("sse2"),
        ExecutionPath::Avx2 => std::arch::is_x86_feature_detected!("avx2"),
        #[cfg(target_arch = "x86_64")]
        ExecutionPath::Avx512 => std::arch::is_x86_feature_detected!("avx512f"),
        #[cfg(not(target_arch = "x86_64"))]
        ExecutionPath::Avx512 => false,
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn has_feature(path: ExecutionPath) -> bool {
    path == ExecutionPath::Reference
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Backend {
    Reference,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Sse2,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Avx2,
    #[cfg(target_arch = "x86_64")]
    Avx512,
}

/// Run the row function `$func` from the reference module `$module` or from the
/// accelerated module matching `$backend`.
macro_rules! dispatch {
    ($backend:expr, $module:ident::$func:ident($($arg:expr),* $(,)?)) => {
        match $backend {
            Backend::Reference => crate::$module::$func($($arg),*),
            // SAFETY: `Kernels` only holds this backend after SSE2 was detected.
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Sse2 => unsafe { simd::sse2::$func($($arg),*) },
            // SAFETY: `Kernels` only holds this backend after AVX2 was detected.
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Avx2 => unsafe { simd::avx2::$func($($arg),*) },
            // SAFETY: `Kernels` only holds this backend after AVX-512F was detected.
            #[cfg(target_arch = "x86_64")]
            Backend::Avx512 => unsafe { simd::avx512::$func($($arg),*) },
        }
    };
}

/// The plane-level operations of one execution path.
///
/// A `Kernels` value can only be created for a path the CPU supports, which is what makes it
/// sound to call the accelerated row functions from safe code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Kernels {
    backend: Backend,
}

impl Kernels {
    /// The kernels for `path`, or `None` if this CPU cannot run it.
    pub fn new(path: ExecutionPath) -> Option<Self> {
        if !path.is_supported() {
            return None;
        }
        #[allow(
            unreachable_patterns,
            reason = "The fallback arm is only reachable on targets without some backends."
        )]
        let backend = match path {
            ExecutionPath::Reference => Backend::Reference,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            ExecutionPath::Sse2 => Backend::Sse2,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            ExecutionPath::Avx2 => Backend::Avx2,
            #[cfg(target_arch = "x86_64")]
            ExecutionPath::Avx512 => Backend::Avx512,
            _ => return None,
        };
        Some(Self { backend })
    }

    /// The scalar kernels, which every CPU supports.
    pub fn reference() -> Self {
        Self {
            backend: Backend::Reference,
        }
    }

    /// The path these kernels run on.
    pub fn path(&self) -> ExecutionPath {
        match self.backend {
            Backend::Reference => ExecutionPath::Reference,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Sse2 => ExecutionPath::Sse2,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Avx2 => ExecutionPath::Avx2,
            #[cfg(target_arch = "x86_64")]
            Backend::Avx512 => ExecutionPath::Avx512,
        }
    }

    /// Blur `src` into `dst` with the given kernel.
    ///
    /// # Panics
    ///
    /// Panics if the planes differ in size.
    pub fn blur<T: Sample>(
        &self,
        variant: KernelVariant,
        profile: &BitDepthProfile,
        src: &Plane<'_, T>,
        dst: &mut PlaneMut<'_, T>,
    ) {
        assert_same_size(src, dst);
        let height = src.height();
        let round = profile.vertical_round();
        for y in 0..height {
            let (above, below) = blur::neighbours(y, height);
            let (above, center, below) = (src.row(above), src.row(y), src.row(below));
            let out = dst.row_mut(y);
            match variant {
                KernelVariant::VerticalOnly => {
                    dispatch!(self.backend, blur::vertical_row(above, center, below, round, out));
                }
                KernelVariant::Full3x3 => {
                    dispatch!(self.backend, blur::full_row(above, center, below, out));
                }
            }
        }
    }

    /// Write the bias-encoded difference `a - b` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the planes differ in size.
    pub fn make_diff<T: Sample>(
        &self,
        profile: &BitDepthProfile,
        a: &Plane<'_, T>,
        b: &Plane<'_, T>,
        dst: &mut PlaneMut<'_, T>,
    ) {
        assert_same_size(a, dst);
        assert_same_size(b, dst);
        let bias = profile.bias();
        let limit = sample_limit::<T>(profile);
        for y in 0..a.height() {
            let (a, b, out) = (a.row(y), b.row(y), dst.row_mut(y));
            dispatch!(self.backend, diff::diff_row(a, b, bias, limit, out));
        }
    }

    /// Merge `source` with a difference map and its blur into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the planes differ in size.
    pub fn merge<T: Sample>(
        &self,
        profile: &BitDepthProfile,
        source: &Plane<'_, T>,
        diff: &Plane<'_, T>,
        diff_blur: &Plane<'_, T>,
        dst: &mut PlaneMut<'_, T>,
    ) {
        assert_same_size(source, dst);
        assert_same_size(diff, dst);
        assert_same_size(diff_blur, dst);
        let bias = profile.bias();
        let limit = sample_limit::<T>(profile);
        for y in 0..source.height() {
            let (source, diff, diff_blur) = (source.row(y), diff.row(y), diff_blur.row(y));
            let out = dst.row_mut(y);
            dispatch!(
                self.backend,
                merge::merge_row(source, diff, diff_blur, bias, limit, out)
            );
        }
    }
}

/// The clamp ceiling for differences and merged samples: the peak, capped by the storage type.
fn sample_limit<T: Sample>(profile: &BitDepthProfile) -> u32 {
    profile.peak().min(T::MAX)
}

fn assert_same_size<T: Sample>(src: &Plane<'_, T>, dst: &PlaneMut<'_, T>) {
    assert_eq!(
        (src.width(), src.height()),
        (dst.width(), dst.height()),
        "planes must have the same size"
    );
}

#[cfg(test)]
mod tests {
    use super::{ExecutionPath, Kernels};
    use crate::config::PathHint;

    #[test]
    fn reference_is_always_available() {
        assert!(ExecutionPath::Reference.is_supported());
        assert_eq!(
            ExecutionPath::select(PathHint::Reference).unwrap(),
            ExecutionPath::Reference
        );
        assert_eq!(Kernels::reference().path(), ExecutionPath::Reference);
        assert_eq!(ExecutionPath::available().next(), Some(ExecutionPath::Reference));
    }

    #[test]
    fn auto_picks_the_fastest_available_path() {
        let best = ExecutionPath::available().last().unwrap();
        assert_eq!(ExecutionPath::detect(), best);
        assert_eq!(ExecutionPath::select(PathHint::Auto).unwrap(), best);
    }

    #[test]
    fn kernels_only_exist_for_supported_paths() {
        for path in ExecutionPath::ALL {
            match Kernels::new(path) {
                Some(kernels) => {
                    assert!(path.is_supported());
                    assert_eq!(kernels.path(), path);
                }
                None => {
                    assert!(!path.is_supported());
                    assert!(ExecutionPath::select(match path {
                        ExecutionPath::Reference => PathHint::Reference,
                        ExecutionPath::Sse2 => PathHint::Sse2,
                        ExecutionPath::Avx2 => PathHint::Avx2,
                        ExecutionPath::Avx512 => PathHint::Avx512,
                    })
                    .is_err());
                }
            }
        }
    }

    #[test]
    fn padding_covers_a_vector() {
        for path in ExecutionPath::ALL {
            assert!(path.row_padding() >= path.lanes());
            assert_eq!(path.row_padding() % path.lanes(), 0);
        }
    }
}
