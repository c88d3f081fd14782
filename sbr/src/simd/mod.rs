// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accelerated row kernels.
//!
//! Every module here mirrors the row functions of the reference path one to one: samples are
//! widened to 32 bit lanes, the same integer expression is evaluated, and the result is
//! narrowed back with the same saturation. Columns left over after the last full vector are
//! handed to the reference row functions, so any width is supported and no load ever reads
//! past the end of a row.
//!
//! The functions are `unsafe` because they require their CPU feature. Callers go through
//! [`Kernels`](crate::Kernels), which only selects a module after detecting its feature.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) mod avx2;
#[cfg(target_arch = "x86_64")]
pub(crate) mod avx512;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) mod sse2;
