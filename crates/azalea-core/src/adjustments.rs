//! Image adjustment algorithms
//!
//! Applies the 10 adjustment sliders to RGBA pixel data. Alpha is never
//! touched.
//!
//! ## Adjustment Order
//! 1. Exposure
//! 2. Contrast
//! 3. Temperature
//! 4. Tint
//! 5. Highlight / Shadow (exactly one, chosen by brightness)
//! 6. Black point
//! 7. White point
//! 8. Saturation
//! 9. Sharpen
//! 10. Clamp and round
//!
//! The steps are not commutative. Values may leave 0-255 between steps and
//! are only clamped where a step says so, and at the end.

use tracing::{debug, trace};

use crate::buffer::PixelBuffer;
use crate::parallel::for_each_pixel;
use crate::AdjustmentParams;

/// Mid-gray pivot used by contrast and the highlight/shadow split.
const MIDPOINT: f64 = 128.0;

/// Apply all adjustments to a copy of `source`.
///
/// The source buffer is never modified; the result has the same dimensions.
pub fn apply_adjustments(source: &PixelBuffer, params: &AdjustmentParams) -> PixelBuffer {
    trace!(
        width = source.width(),
        height = source.height(),
        "apply_adjustments"
    );

    let mut output = source.clone();
    let row_stride = output.row_stride();
    apply_adjustments_in_place(output.data_mut(), row_stride, params);
    output
}

/// Apply all adjustments to raw RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `row_stride` - Bytes per row, used to split work across threads
/// * `params` - The adjustment values to apply
pub fn apply_adjustments_in_place(pixels: &mut [u8], row_stride: usize, params: &AdjustmentParams) {
    // All-zero params are an exact no-op
    if params.is_default() {
        debug!("adjustments at defaults, skipping");
        return;
    }

    for_each_pixel(pixels, row_stride, |px| {
        let [r, g, b] = adjust_rgb(px[0], px[1], px[2], params);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    });
}

/// Run one pixel through the full pipeline.
pub fn adjust_rgb(r: u8, g: u8, b: u8, params: &AdjustmentParams) -> [u8; 3] {
    let mut r = r as f64;
    let mut g = g as f64;
    let mut b = b as f64;

    (r, g, b) = apply_exposure(r, g, b, params.exposure);
    (r, g, b) = apply_contrast(r, g, b, params.contrast);
    (r, g, b) = apply_temperature(r, g, b, params.temperature);
    (r, g, b) = apply_tint(r, g, b, params.tint);
    (r, g, b) = apply_highlight_shadow(r, g, b, params.highlight, params.shadow);
    (r, g, b) = apply_black_point(r, g, b, params.black);
    (r, g, b) = apply_white_point(r, g, b, params.white);
    (r, g, b) = apply_saturation(r, g, b, params.saturation);
    (r, g, b) = apply_sharpen(r, g, b, params.sharpen);

    [to_u8(r), to_u8(g), to_u8(b)]
}

/// Final clamp to 0-255, rounding halves to even like a `Uint8ClampedArray` store.
#[inline]
fn to_u8(c: f64) -> u8 {
    c.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Exposure: `c * (1 + exposure)`, capped at 255.
#[inline]
fn apply_exposure(r: f64, g: f64, b: f64, exposure: f64) -> (f64, f64, f64) {
    let factor = 1.0 + exposure;
    (
        (r * factor).min(255.0),
        (g * factor).min(255.0),
        (b * factor).min(255.0),
    )
}

/// Contrast around mid-gray. Not clamped.
///
/// Formula: `output = (input - 128) * (1 + contrast) + 128`
#[inline]
fn apply_contrast(r: f64, g: f64, b: f64, contrast: f64) -> (f64, f64, f64) {
    let factor = 1.0 + contrast;
    (
        (r - MIDPOINT) * factor + MIDPOINT,
        (g - MIDPOINT) * factor + MIDPOINT,
        (b - MIDPOINT) * factor + MIDPOINT,
    )
}

/// Temperature: positive warms (red up, blue down), negative cools.
///
/// Red is capped at 255 and blue floored at 0 even at zero strength.
#[inline]
fn apply_temperature(r: f64, g: f64, b: f64, temperature: f64) -> (f64, f64, f64) {
    let shift = temperature * 0.3;
    ((r * (1.0 + shift)).min(255.0), g, (b * (1.0 - shift)).max(0.0))
}

/// Tint: scales green only, capped at 255.
#[inline]
fn apply_tint(r: f64, g: f64, b: f64, tint: f64) -> (f64, f64, f64) {
    (r, (g * (1.0 + tint * 0.2)).min(255.0), b)
}

/// Highlight and shadow, mutually exclusive on the 128 midpoint.
///
/// Brightness is the plain channel mean of the current (unclamped) values.
/// A pixel at exactly 128 gets neither.
#[inline]
fn apply_highlight_shadow(
    r: f64,
    g: f64,
    b: f64,
    highlight: f64,
    shadow: f64,
) -> (f64, f64, f64) {
    let brightness = (r + g + b) / 3.0;

    if brightness > MIDPOINT {
        let factor = 1.0 + highlight * 0.3;
        ((r * factor).min(255.0), (g * factor).min(255.0), (b * factor).min(255.0))
    } else if brightness < MIDPOINT {
        let factor = 1.0 + shadow * 0.3;
        ((r * factor).max(0.0), (g * factor).max(0.0), (b * factor).max(0.0))
    } else {
        (r, g, b)
    }
}

/// Black point: pull every channel down by a share of the darkest one.
///
/// Uses `|black|`, so negative values behave like positive ones.
#[inline]
fn apply_black_point(r: f64, g: f64, b: f64, black: f64) -> (f64, f64, f64) {
    let min_val = r.min(g).min(b);
    if min_val <= 0.0 {
        return (r, g, b);
    }
    let amount = min_val * black.abs() * 0.5;
    ((r - amount).max(0.0), (g - amount).max(0.0), (b - amount).max(0.0))
}

/// White point: push every channel up by a share of the headroom left
/// above the brightest one. Only positive values apply.
#[inline]
fn apply_white_point(r: f64, g: f64, b: f64, white: f64) -> (f64, f64, f64) {
    let max_val = r.max(g).max(b);
    if max_val >= 255.0 || white <= 0.0 {
        return (r, g, b);
    }
    let amount = (255.0 - max_val) * white * 0.5;
    ((r + amount).min(255.0), (g + amount).min(255.0), (b + amount).min(255.0))
}

/// Saturation around the midrange `(max + min) / 2`.
///
/// The factor is `1 + saturation` for both directions; results are rounded.
#[inline]
fn apply_saturation(r: f64, g: f64, b: f64, saturation: f64) -> (f64, f64, f64) {
    if saturation == 0.0 {
        return (r, g, b);
    }
    let avg = (r.max(g).max(b) + r.min(g).min(b)) / 2.0;
    let factor = 1.0 + saturation;
    (
        ((r - avg) * factor + avg).round(),
        ((g - avg) * factor + avg).round(),
        ((b - avg) * factor + avg).round(),
    )
}

/// Sharpen approximation: a brightness boost, capped at 255.
#[inline]
fn apply_sharpen(r: f64, g: f64, b: f64, sharpen: f64) -> (f64, f64, f64) {
    if sharpen <= 0.0 {
        return (r, g, b);
    }
    let factor = 1.0 + sharpen * 0.2;
    ((r * factor).min(255.0), (g * factor).min(255.0), (b * factor).min(255.0))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for slider values in the normalized -1..1 range.
    fn slider() -> impl Strategy<Value = f64> {
        -1.0f64..=1.0
    }

    fn params_strategy() -> impl Strategy<Value = AdjustmentParams> {
        (
            (slider(), slider(), slider(), slider(), slider()),
            (slider(), slider(), slider(), slider(), slider()),
        )
            .prop_map(
                |(
                    (exposure, contrast, saturation, tint, temperature),
                    (sharpen, highlight, shadow, black, white),
                )| AdjustmentParams {
                    exposure,
                    contrast,
                    saturation,
                    tint,
                    temperature,
                    sharpen,
                    highlight,
                    shadow,
                    black,
                    white,
                },
            )
    }

    fn buffer_strategy() -> impl Strategy<Value = PixelBuffer> {
        (1u32..=8, 1u32..=8).prop_flat_map(|(w, h)| {
            proptest::collection::vec(any::<u8>(), (w * h * 4) as usize)
                .prop_map(move |data| PixelBuffer::new(w, h, data).unwrap())
        })
    }

    proptest! {
        /// Property: Dimensions and alpha are preserved for any params.
        #[test]
        fn prop_shape_and_alpha_preserved(
            src in buffer_strategy(),
            params in params_strategy(),
        ) {
            let out = apply_adjustments(&src, &params);
            prop_assert_eq!(out.width(), src.width());
            prop_assert_eq!(out.height(), src.height());
            for (a, b) in out.data().chunks_exact(4).zip(src.data().chunks_exact(4)) {
                prop_assert_eq!(a[3], b[3]);
            }
        }

        /// Property: Default params never change any pixel.
        #[test]
        fn prop_default_params_identity(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            prop_assert_eq!(adjust_rgb(r, g, b, &AdjustmentParams::default()), [r, g, b]);
        }

        /// Property: The buffer path matches the single-pixel function, with
        /// or without the `parallel` feature.
        #[test]
        fn prop_buffer_matches_per_pixel(src in buffer_strategy(), params in params_strategy()) {
            let out = apply_adjustments(&src, &params);
            for (a, b) in out.data().chunks_exact(4).zip(src.data().chunks_exact(4)) {
                prop_assert_eq!([a[0], a[1], a[2]], adjust_rgb(b[0], b[1], b[2], &params));
            }
        }

        /// Property: Output is a pure function of source and params.
        #[test]
        fn prop_deterministic(src in buffer_strategy(), params in params_strategy()) {
            prop_assert_eq!(apply_adjustments(&src, &params), apply_adjustments(&src, &params));
        }
    }
}
