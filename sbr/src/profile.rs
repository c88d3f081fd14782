// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per bit depth constants.

/// The constants the filter uses for one bit depth.
///
/// | bits  | peak  | bias  | vertical rounding |
/// |-------|-------|-------|-------------------|
/// | 8     | 255   | 128   | 2                 |
/// | 10    | 1023  | 512   | 3                 |
/// | 12    | 4095  | 2048  | 4                 |
/// | 14    | 16383 | 8192  | 16                |
/// | other | 65535 | 32768 | 64                |
///
/// The vertical rounding constants are not all `2`, so the vertical kernel drifts upwards on
/// flat 12, 14 and 16 bit content. Output compatibility with existing encodes depends on these
/// exact values, so they must not be "fixed".
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BitDepthProfile {
    bits: u8,
    peak: u32,
    bias: u32,
    vertical_round: u32,
}

impl BitDepthProfile {
    /// Look up the profile for `bits` per sample.
    ///
    /// Any depth other than 8, 10, 12 or 14 uses the 16 bit row. This does not validate
    /// `bits`; that happens when a filter instance is built.
    pub const fn for_bits(bits: u8) -> Self {
        let (peak, bias, vertical_round) = match bits {
            8 => (255, 128, 2),
            10 => (1023, 512, 3),
            12 => (4095, 2048, 4),
            14 => (16383, 8192, 16),
            _ => (65535, 32768, 64),
        };
        Self {
            bits,
            peak,
            bias,
            vertical_round,
        }
    }

    /// The bit depth this profile was looked up for.
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// The largest valid sample, `p`.
    pub const fn peak(&self) -> u32 {
        self.peak
    }

    /// The midpoint used to store signed differences, `h`.
    pub const fn bias(&self) -> u32 {
        self.bias
    }

    /// The constant added before the `>> 2` of the vertical kernel.
    pub const fn vertical_round(&self) -> u32 {
        self.vertical_round
    }
}
