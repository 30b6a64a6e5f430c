//! Tone curve interpolation and LUT generation using Catmull-Rom splines.
//!
//! Each channel curve is baked into a 256-entry lookup table. The master
//! ("all") table is applied first and its output indexes the per-channel
//! table, so the two are composed into one table per color channel before
//! touching any pixels.

use std::ops::Index;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::buffer::PixelBuffer;
use crate::parallel::for_each_pixel;
use crate::{Channel, ControlPoint, Curve};

// ============================================================================
// LUT Type
// ============================================================================

/// Pre-computed 256-entry lookup table: `lut[input] = output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lut {
    values: [u8; 256],
}

impl Lut {
    /// Generate LUT from a tone curve.
    pub fn from_curve(curve: &Curve) -> Self {
        build_lut(curve)
    }

    /// Create identity LUT (no change).
    pub fn identity() -> Self {
        let mut values = [0u8; 256];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self { values }
    }

    /// Check if this LUT is identity.
    pub fn is_identity(&self) -> bool {
        self.values.iter().enumerate().all(|(i, &v)| v == i as u8)
    }

    #[inline]
    pub fn get(&self, input: u8) -> u8 {
        self.values[input as usize]
    }

    pub fn as_array(&self) -> &[u8; 256] {
        &self.values
    }

    /// Compose two tables: the result maps `i` to `next[self[i]]`.
    pub fn then(&self, next: &Lut) -> Lut {
        let mut values = [0u8; 256];
        for (out, &mid) in values.iter_mut().zip(self.values.iter()) {
            *out = next.get(mid);
        }
        Lut { values }
    }
}

impl Default for Lut {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<u8> for Lut {
    type Output = u8;

    #[inline]
    fn index(&self, input: u8) -> &u8 {
        &self.values[input as usize]
    }
}

// ============================================================================
// LUT Construction
// ============================================================================

/// Bake a curve into a 256-entry table.
///
/// Inputs at or before the first point take its y, inputs at or after the
/// last point take its y. In between, the first segment `[p1, p2]` with
/// `p1.x <= i <= p2.x` is interpolated with a Catmull-Rom cubic whose outer
/// neighbours fall back to `p1` / `p2` at the ends of the curve.
///
/// The two-point identity curve produces the identity table.
pub fn build_lut(curve: &Curve) -> Lut {
    // Fast path for linear curve
    if curve.is_identity() {
        return Lut::identity();
    }

    let points = curve.to_points();
    let first = curve.first();
    let last = curve.last();
    let mut values = [0u8; 256];

    for (i, v) in values.iter_mut().enumerate() {
        let x = i as u8;
        *v = if x <= first.x {
            first.y
        } else if x >= last.x {
            last.y
        } else {
            let y = evaluate_segment(&points, x);
            y.clamp(0.0, 255.0).round() as u8
        };
    }

    Lut { values }
}

/// Evaluate the spline at an input strictly inside the curve's x range.
fn evaluate_segment(points: &[ControlPoint], x: u8) -> f64 {
    let seg = find_segment(points, x);

    let p1 = points[seg];
    let p2 = points[seg + 1];
    let p0 = if seg > 0 { points[seg - 1] } else { p1 };
    let p3 = if seg + 2 < points.len() {
        points[seg + 2]
    } else {
        p2
    };

    // x values are strictly increasing, so the span is never zero
    let t = (x - p1.x) as f64 / (p2.x - p1.x) as f64;

    catmull_rom(p0.y as f64, p1.y as f64, p2.y as f64, p3.y as f64, t)
}

/// Index of the first segment whose closed x range contains `x`.
fn find_segment(points: &[ControlPoint], x: u8) -> usize {
    // Number of segment end points strictly left of x
    let seg = points[1..].partition_point(|p| p.x < x);
    seg.min(points.len() - 2)
}

/// Catmull-Rom cubic between `p1` (t = 0) and `p2` (t = 1).
#[inline]
fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a0 = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let a1 = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let a2 = -0.5 * p0 + 0.5 * p2;
    let a3 = p1;

    a0 * t3 + a1 * t2 + a2 * t + a3
}

// ============================================================================
// Curve Set
// ============================================================================

/// The four editable curves: master plus one per color channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSet {
    pub all: Curve,
    pub red: Curve,
    pub green: Curve,
    pub blue: Curve,
}

impl CurveSet {
    /// Four identity curves.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: Channel) -> &Curve {
        match channel {
            Channel::All => &self.all,
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut Curve {
        match channel {
            Channel::All => &mut self.all,
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        }
    }

    /// Replace one channel's curve.
    pub fn set(&mut self, channel: Channel, curve: Curve) {
        *self.get_mut(channel) = curve;
    }

    /// Put one channel back to the two-point identity curve.
    pub fn reset(&mut self, channel: Channel) {
        self.set(channel, Curve::identity());
    }

    pub fn is_identity(&self) -> bool {
        Channel::ALL.iter().all(|&c| self.get(c).is_identity())
    }

    /// Bake all four curves.
    pub fn luts(&self) -> CurveLuts {
        CurveLuts {
            all: build_lut(&self.all),
            red: build_lut(&self.red),
            green: build_lut(&self.green),
            blue: build_lut(&self.blue),
        }
    }
}

/// Baked tables for a [`CurveSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurveLuts {
    pub all: Lut,
    pub red: Lut,
    pub green: Lut,
    pub blue: Lut,
}

impl CurveLuts {
    pub fn get(&self, channel: Channel) -> &Lut {
        match channel {
            Channel::All => &self.all,
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    /// Per-channel tables with the master table folded in, as `[r, g, b]`.
    pub fn composed(&self) -> [Lut; 3] {
        [
            self.all.then(&self.red),
            self.all.then(&self.green),
            self.all.then(&self.blue),
        ]
    }

    pub fn is_identity(&self) -> bool {
        Channel::ALL.iter().all(|&c| self.get(c).is_identity())
    }
}

// ============================================================================
// Curve Application
// ============================================================================

/// Apply all four curves to a copy of `source`.
///
/// For every pixel: `r' = red[all[r]]`, `g' = green[all[g]]`,
/// `b' = blue[all[b]]`. Alpha is untouched.
pub fn apply_curves(source: &PixelBuffer, curves: &CurveSet) -> PixelBuffer {
    trace!(
        width = source.width(),
        height = source.height(),
        "apply_curves"
    );

    let mut output = source.clone();
    let row_stride = output.row_stride();
    apply_curve_luts(output.data_mut(), row_stride, &curves.luts());
    output
}

/// Apply pre-baked curve tables to raw RGBA pixel data in place.
pub fn apply_curve_luts(pixels: &mut [u8], row_stride: usize, luts: &CurveLuts) {
    // Early exit for identity
    if luts.is_identity() {
        debug!("curves are identity, skipping");
        return;
    }

    let [red, green, blue] = luts.composed();
    for_each_pixel(pixels, row_stride, |px| {
        px[0] = red[px[0]];
        px[1] = green[px[1]];
        px[2] = blue[px[2]];
    });
}

// ============================================================================
// Tests
// ============================================================================


// ============================================================================
// Property-Based Tests
// ============================================================================
