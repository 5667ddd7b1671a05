/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use pixl_core::pixel::Component;

/// Grayscale weighting at each precision
///
/// Uses the classic 299/587/114 weights. Integer precisions stay in
/// integer arithmetic, widened enough that the weighted sum cannot
/// overflow; float works directly in its nominal range.
pub trait GrayWeights: Component {
    fn gray(r: Self, g: Self, b: Self) -> Self;
}

impl GrayWeights for u8 {
    fn gray(r: u8, g: u8, b: u8) -> u8 {
        let sum = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        (sum / 1000) as u8
    }
}

impl GrayWeights for u16 {
    fn gray(r: u16, g: u16, b: u16) -> u16 {
        let sum = 299 * u64::from(r) + 587 * u64::from(g) + 114 * u64::from(b);
        (sum / 1000) as u16
    }
}

impl GrayWeights for f32 {
    fn gray(r: f32, g: f32, b: f32) -> f32 {
        r.mul_add(0.299, g.mul_add(0.587, b * 0.114))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_weights_sum_to_identity() {
        assert_eq!(<u8 as GrayWeights>::gray(255, 255, 255), 255);
        assert_eq!(<u8 as GrayWeights>::gray(0, 0, 0), 0);
        assert_eq!(<u16 as GrayWeights>::gray(65535, 65535, 65535), 65535);

        let g = <f32 as GrayWeights>::gray(1.0, 1.0, 1.0);
        assert!((g - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gray_reference_values() {
        assert_eq!(<u8 as GrayWeights>::gray(255, 0, 0), 76);
        assert_eq!(<u8 as GrayWeights>::gray(0, 255, 0), 149);
        assert_eq!(<u8 as GrayWeights>::gray(0, 0, 255), 29);
    }
}
