// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample storage types.

use core::fmt::Debug;

mod private {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// The storage width of a [`Sample`] type.
///
/// Accelerated paths branch on this to pick their widening loads and narrowing stores;
/// the branch is resolved at monomorphisation time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SampleWidth {
    /// One byte per sample, used for 8 bit content.
    Byte,
    /// Two bytes per sample, used for 9 to 16 bit content.
    Word,
}

/// An unsigned integer sample, stored in one or two bytes.
///
/// This trait is sealed; it is implemented for [`u8`] and [`u16`] only.
pub trait Sample:
    private::Sealed + bytemuck::Pod + Default + Eq + Ord + Debug + Send + Sync + 'static
{
    /// Size of one sample in bytes.
    const BYTES: usize;
    /// The largest value representable by the storage type.
    const MAX: u32;
    /// The storage width, for accelerated paths.
    const WIDTH: SampleWidth;

    /// Widen to `u32` without loss.
    fn to_u32(self) -> u32;

    /// Narrow from `u32`, saturating at [`Self::MAX`].
    fn from_u32_saturating(value: u32) -> Self;

    /// Narrow from a value already clamped to `0..=Self::MAX`.
    fn from_i32_clamped(value: i32) -> Self {
        debug_assert!(value >= 0 && value as u32 <= Self::MAX);
        Self::from_u32_saturating(value as u32)
    }
}

impl Sample for u8 {
    const BYTES: usize = 1;
    const MAX: u32 = u8::MAX as u32;
    const WIDTH: SampleWidth = SampleWidth::Byte;

    #[inline(always)]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }

    #[inline(always)]
    fn from_u32_saturating(value: u32) -> Self {
        value.min(<Self as Sample>::MAX) as Self
    }
}

impl Sample for u16 {
    const BYTES: usize = 2;
    const MAX: u32 = u16::MAX as u32;
    const WIDTH: SampleWidth = SampleWidth::Word;

    #[inline(always)]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }

    #[inline(always)]
    fn from_u32_saturating(value: u32) -> Self {
        value.min(<Self as Sample>::MAX) as Self
    }
}
