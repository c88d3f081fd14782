// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Working storage for the filter pipeline.

use crate::plane::PlaneMut;
use crate::{Result, Sample};

/// Two planes of working storage, reused across planes and frames.
///
/// The buffer holds `height * pitch * 2` samples, where `pitch` is the width rounded up to the
/// row padding of the execution path. The first half receives the blurs and the second half
/// the difference map, so the difference map survives while its own blur is computed.
///
/// The buffer grows when it is asked for a plane larger than it has room for, and never
/// shrinks.
#[derive(Debug, Clone)]
pub struct ScratchBuffer<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    pitch: usize,
    row_padding: usize,
}

impl<T: Sample> ScratchBuffer<T> {
    /// Allocate room for a `width` x `height` plane, with rows padded to `row_padding` samples.
    ///
    /// A zero width or height gives an empty buffer that allocates on first use.
    pub fn new(width: usize, height: usize, row_padding: usize) -> Result<Self> {
        let pitch = padded(width, row_padding);
        let len = height.saturating_mul(pitch).saturating_mul(2);
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, T::default());
        Ok(Self {
            data,
            width,
            height,
            pitch,
            row_padding,
        })
    }

    /// The widest plane the buffer currently fits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The tallest plane the buffer currently fits.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance between scratch rows, in samples.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Total size in samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer has no storage yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Make room for a `width` x `height` plane, reallocating if needed.
    pub fn ensure(&mut self, width: usize, height: usize) {
        if width <= self.width && height <= self.height {
            return;
        }
        let width = width.max(self.width);
        let height = height.max(self.height);
        log::debug!(
            "growing scratch from {}x{} to {width}x{height}",
            self.width,
            self.height
        );
        let pitch = padded(width, self.row_padding);
        // The contents are dead between planes, so there is nothing to carry over.
        self.data = vec![T::default(); height * pitch * 2];
        self.width = width;
        self.height = height;
        self.pitch = pitch;
    }

    /// Split the buffer into two `width` x `height` planes.
    ///
    /// # Panics
    ///
    /// Panics if the buffer does not fit the plane; call [`Self::ensure`] first.
    pub fn planes(&mut self, width: usize, height: usize) -> (PlaneMut<'_, T>, PlaneMut<'_, T>) {
        assert!(
            width >= 1 && height >= 1 && width <= self.width && height <= self.height,
            "scratch buffer of {}x{} cannot hold a {width}x{height} plane",
            self.width,
            self.height
        );
        let half = self.height * self.pitch;
        let (first, second) = self.data.split_at_mut(half);
        (
            PlaneMut::from_parts(first, width, height, self.pitch),
            PlaneMut::from_parts(second, width, height, self.pitch),
        )
    }
}

fn padded(width: usize, row_padding: usize) -> usize {
    width.div_ceil(row_padding).saturating_mul(row_padding)
}
