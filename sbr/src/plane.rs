// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strided sample planes.
//!
//! A plane is a 2D grid of samples stored in row-major order. Consecutive rows start `stride`
//! samples apart, which lets hosts hand over buffers with padded rows without copying them.

use crate::{Error, Result, Sample};

/// Check that `len` samples can hold a `width` x `height` plane with the given `stride`.
fn check_geometry(len: usize, width: usize, height: usize, stride: usize) -> Result<()> {
    let fits = width >= 1
        && height >= 1
        && stride >= width
        && stride
            .checked_mul(height - 1)
            .and_then(|n| n.checked_add(width))
            .is_some_and(|needed| len >= needed);
    if fits {
        Ok(())
    } else {
        Err(Error::InvalidPlaneGeometry {
            width,
            height,
            stride,
            len,
        })
    }
}

/// A read-only view of a plane.
#[derive(Debug, Copy, Clone)]
pub struct Plane<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T: Sample> Plane<'a, T> {
    /// Wrap `data` as a plane.
    ///
    /// Fails if the plane is empty, if `stride < width`, or if `data` is too short to hold
    /// `height` rows. The last row only needs `width` samples, not a whole `stride`.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> Result<Self> {
        check_geometry(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance between the start of two consecutive rows, in samples.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row `y`, without its padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row {y} out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Iterate over the rows, without padding.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).map(|y| self.row(y))
    }

    /// The sample at (`x`, `y`).
    pub fn get(&self, x: usize, y: usize) -> T {
        self.row(y)[x]
    }
}

/// A mutable view of a plane.
#[derive(Debug)]
pub struct PlaneMut<'a, T> {
    data: &'a mut [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T: Sample> PlaneMut<'a, T> {
    /// Wrap `data` as a writable plane, with the same rules as [`Plane::new`].
    pub fn new(data: &'a mut [T], width: usize, height: usize, stride: usize) -> Result<Self> {
        check_geometry(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Wrap storage whose geometry the caller has already checked.
    pub(crate) fn from_parts(data: &'a mut [T], width: usize, height: usize, stride: usize) -> Self {
        debug_assert!(check_geometry(data.len(), width, height, stride).is_ok());
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    /// Width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance between the start of two consecutive rows, in samples.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row `y`, without its padding.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row {y} out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Row `y` for writing, without its padding.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row {y} out of bounds");
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Reborrow as a read-only plane.
    pub fn as_plane(&self) -> Plane<'_, T> {
        Plane {
            data: &*self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    /// Reborrow mutably, for handing to a function that consumes a `PlaneMut`.
    pub fn reborrow(&mut self) -> PlaneMut<'_, T> {
        PlaneMut {
            data: &mut *self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    /// Copy `src` into this plane row by row.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, src: &Plane<'_, T>) {
        assert_eq!(
            (self.width, self.height),
            (src.width(), src.height()),
            "copying between planes of different sizes"
        );
        for y in 0..self.height {
            self.row_mut(y).copy_from_slice(src.row(y));
        }
    }
}

/// An owned plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneBuf<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    stride: usize,
}

impl<T: Sample> PlaneBuf<T> {
    /// A zeroed plane with unpadded rows.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_stride(width, height, width)
    }

    /// A zeroed plane whose rows are `stride` samples apart.
    ///
    /// # Panics
    ///
    /// Panics if `stride < width`.
    pub fn with_stride(width: usize, height: usize, stride: usize) -> Self {
        assert!(stride >= width, "stride must be at least the width");
        Self {
            data: vec![T::default(); stride * height],
            width,
            height,
            stride,
        }
    }

    /// Take ownership of `data` as a plane, with the same rules as [`Plane::new`].
    pub fn from_vec(data: Vec<T>, width: usize, height: usize, stride: usize) -> Result<Self> {
        check_geometry(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// A plane where every sample is `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
            stride: width,
        }
    }

    /// Width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance between the start of two consecutive rows, in samples.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Borrow as a read-only plane.
    pub fn as_plane(&self) -> Plane<'_, T> {
        Plane {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    /// Borrow as a writable plane.
    pub fn as_plane_mut(&mut self) -> PlaneMut<'_, T> {
        PlaneMut {
            data: &mut self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    /// Row `y`, without its padding.
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Row `y` for writing, without its padding.
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// The sample at (`x`, `y`).
    pub fn get(&self, x: usize, y: usize) -> T {
        self.row(y)[x]
    }

    /// Overwrite the sample at (`x`, `y`).
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.row_mut(y)[x] = value;
    }

    /// The backing storage, including row padding.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The backing storage as bytes, in native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Consume the plane, returning its backing storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::{Plane, PlaneBuf, PlaneMut};
    use crate::Error;

    #[test]
    fn last_row_does_not_need_padding() {
        let data = [0_u8; 10];
        // Two rows of 4 with a stride of 6 need 6 + 4 samples.
        assert!(Plane::new(&data, 4, 2, 6).is_ok());
        assert!(matches!(
            Plane::new(&data[..9], 4, 2, 6),
            Err(Error::InvalidPlaneGeometry { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_narrow_stride() {
        let data = [0_u16; 16];
        assert!(Plane::new(&data, 0, 2, 4).is_err());
        assert!(Plane::new(&data, 4, 0, 4).is_err());
        assert!(Plane::new(&data, 4, 2, 3).is_err());
    }

    #[test]
    fn rows_skip_padding() {
        let data = [1_u8, 2, 9, 3, 4, 9];
        let plane = Plane::new(&data, 2, 2, 3).unwrap();
        assert_eq!(plane.row(0), &[1, 2]);
        assert_eq!(plane.row(1), &[3, 4]);
        assert_eq!(plane.rows().count(), 2);
    }

    #[test]
    fn copy_respects_both_strides() {
        let src = [1_u16, 2, 0, 0, 3, 4, 0, 0];
        let src = Plane::new(&src, 2, 2, 4).unwrap();
        let mut dst = [7_u16; 6];
        let mut plane = PlaneMut::new(&mut dst, 2, 2, 3).unwrap();
        plane.copy_from(&src);
        assert_eq!(dst, [1, 2, 7, 3, 4, 7]);
    }

    #[test]
    fn set_and_reborrow_write_through() {
        fn fill_row(mut plane: PlaneMut<'_, u8>, y: usize, value: u8) {
            plane.row_mut(y).fill(value);
        }

        let mut buf = PlaneBuf::<u8>::with_stride(2, 2, 3);
        buf.set(1, 0, 5);
        let mut plane = buf.as_plane_mut();
        fill_row(plane.reborrow(), 1, 8);
        // The original view is still usable after the reborrow ends.
        plane.row_mut(0)[0] = 4;
        assert_eq!(buf.get(1, 0), 5);
        assert_eq!(buf.into_vec(), [4, 5, 0, 8, 8, 0]);
    }

    #[test]
    fn as_bytes_covers_padding() {
        let plane = PlaneBuf::<u16>::with_stride(3, 2, 4);
        assert_eq!(plane.as_bytes().len(), 16);
    }
}
