//! Azalea Core - Pixel adjustment and tone curve library
//!
//! This crate provides the color-processing core of the Azalea editor:
//! the ten-slider adjustment pipeline, the Catmull-Rom tone curve engine,
//! the interactive curve edit session, and the persisted preset formats.
//!
//! All processing operates on [`PixelBuffer`]s (RGBA, 8 bits per channel,
//! row-major) and never mutates the caller's source buffer.

pub mod adjustments;
pub mod buffer;
pub mod curve;
pub mod editor;
pub mod parallel;
pub mod preset;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use adjustments::apply_adjustments;
pub use buffer::{BufferError, PixelBuffer};
pub use curve::{apply_curves, build_lut, CurveLuts, CurveSet, Lut};
pub use editor::{CurveEditor, EditState, PlotGeometry};
pub use preset::{AdjustmentConfig, CurvePreset, PresetError, SliderValues};

/// The ten adjustment sliders, normalized.
///
/// Each value is the slider integer (-100 to 100) divided by 100, so the
/// recommended range is -1.0 to 1.0. Zero is a no-op for every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdjustmentParams {
    /// Brightness multiplier offset (`1 + exposure`)
    pub exposure: f64,
    /// Contrast around mid-gray 128
    pub contrast: f64,
    /// Saturation around the channel midrange
    pub saturation: f64,
    /// Green shift
    pub tint: f64,
    /// Positive = warmer (more red, less blue)
    pub temperature: f64,
    /// Brightness boost approximating sharpening (only positive values apply)
    pub sharpen: f64,
    /// Scales pixels brighter than mid-gray
    pub highlight: f64,
    /// Scales pixels darker than mid-gray
    pub shadow: f64,
    /// Black point pull-down (sign is ignored)
    pub black: f64,
    /// White point lift (only positive values apply)
    pub white: f64,
}

impl AdjustmentParams {
    /// Create params with every slider at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Tone curve control point in 8-bit intensity space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ControlPoint {
    /// Input intensity
    pub x: u8,
    /// Output intensity
    pub y: u8,
}

impl ControlPoint {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Stable identity of a point inside a [`Curve`].
///
/// Indices change whenever the curve is re-sorted during a drag; ids do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u32);

/// Reasons a point sequence cannot form a [`Curve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    /// Fewer than the two boundary points.
    #[error("Curve needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    /// The first point is not at x = 0.
    #[error("Curve must start at x=0, first point is at x={x}")]
    MissingStart { x: u8 },

    /// The last point is not at x = 255.
    #[error("Curve must end at x=255, last point is at x={x}")]
    MissingEnd { x: u8 },

    /// Point x values are unsorted or repeated.
    #[error("Curve x values must be strictly increasing (violated at index {index})")]
    NotIncreasing { index: usize },
}

#[derive(Debug, Clone, Copy)]
struct Knot {
    id: PointId,
    point: ControlPoint,
}

/// Tone curve: control points strictly increasing by x, from x=0 to x=255.
///
/// A `Curve` can only be built from a valid point sequence and every
/// mutation keeps it valid, so the LUT builder never sees a malformed curve.
/// Serialized as a plain `[{x, y}, ...]` array; point ids are not persisted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(into = "Vec<ControlPoint>", try_from = "Vec<ControlPoint>")]
pub struct Curve {
    knots: Vec<Knot>,
    next_id: u32,
}

impl Default for Curve {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        self.points().eq(other.points())
    }
}

impl Eq for Curve {}

impl Curve {
    /// The two-point identity curve `[(0,0), (255,255)]`.
    pub fn identity() -> Self {
        Self::from_sorted(vec![ControlPoint::new(0, 0), ControlPoint::new(255, 255)])
    }

    /// Build a curve from points, rejecting sequences that break the invariants.
    pub fn try_from_points(points: Vec<ControlPoint>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints(points.len()));
        }
        let first = points[0];
        if first.x != 0 {
            return Err(CurveError::MissingStart { x: first.x });
        }
        let last = points[points.len() - 1];
        if last.x != 255 {
            return Err(CurveError::MissingEnd { x: last.x });
        }
        if let Some(i) = points.windows(2).position(|w| w[0].x >= w[1].x) {
            return Err(CurveError::NotIncreasing { index: i + 1 });
        }
        Ok(Self::from_sorted(points))
    }

    /// Build a curve from arbitrary points, fixing what can be fixed.
    ///
    /// Points are sorted by x, a repeated x keeps the point that came last,
    /// and missing boundary points are added at `(0, 0)` / `(255, 255)`.
    pub fn repaired(mut points: Vec<ControlPoint>) -> Self {
        points.sort_by_key(|p| p.x);

        let mut unique: Vec<ControlPoint> = Vec::with_capacity(points.len() + 2);
        for p in points {
            match unique.last_mut() {
                Some(prev) if prev.x == p.x => *prev = p,
                _ => unique.push(p),
            }
        }

        if unique.first().map_or(true, |p| p.x != 0) {
            unique.insert(0, ControlPoint::new(0, 0));
        }
        if unique.last().map_or(true, |p| p.x != 255) {
            unique.push(ControlPoint::new(255, 255));
        }

        Self::from_sorted(unique)
    }

    fn from_sorted(points: Vec<ControlPoint>) -> Self {
        let knots: Vec<Knot> = points
            .into_iter()
            .enumerate()
            .map(|(i, point)| Knot {
                id: PointId(i as u32),
                point,
            })
            .collect();
        let next_id = knots.len() as u32;
        Self { knots, next_id }
    }

    /// Number of control points (always at least 2).
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Control points in x order.
    pub fn points(&self) -> impl Iterator<Item = ControlPoint> + '_ {
        self.knots.iter().map(|k| k.point)
    }

    /// Copy the control points out, in x order.
    pub fn to_points(&self) -> Vec<ControlPoint> {
        self.points().collect()
    }

    pub fn point(&self, index: usize) -> Option<ControlPoint> {
        self.knots.get(index).map(|k| k.point)
    }

    pub fn first(&self) -> ControlPoint {
        self.knots[0].point
    }

    pub fn last(&self) -> ControlPoint {
        self.knots[self.knots.len() - 1].point
    }

    /// Id of the point currently at `index`.
    pub fn id_at(&self, index: usize) -> Option<PointId> {
        self.knots.get(index).map(|k| k.id)
    }

    /// Current index of the point with the given id.
    pub fn index_of(&self, id: PointId) -> Option<usize> {
        self.knots.iter().position(|k| k.id == id)
    }

    /// Check if this is the two-point identity curve `[(0,0), (255,255)]`.
    ///
    /// Extra points on the diagonal still bend the spline, so they do not count.
    pub fn is_identity(&self) -> bool {
        self.knots.len() == 2 && self.points().all(|p| p.x == p.y)
    }

    /// Insert a control point, keeping the curve sorted.
    ///
    /// If a point already sits at `x`, it takes the new `y` instead of a
    /// second point being added, and its id is returned.
    pub fn insert_point(&mut self, x: u8, y: u8) -> PointId {
        match self.knots.binary_search_by_key(&x, |k| k.point.x) {
            Ok(index) => {
                self.knots[index].point.y = y;
                self.knots[index].id
            }
            Err(index) => {
                let id = PointId(self.next_id);
                self.next_id += 1;
                self.knots.insert(
                    index,
                    Knot {
                        id,
                        point: ControlPoint::new(x, y),
                    },
                );
                id
            }
        }
    }

    /// Move a control point and re-sort, returning its new index.
    ///
    /// The first and last points keep x pinned at 0 and 255. If another
    /// point already occupies the target x, only y changes.
    pub fn move_point(&mut self, id: PointId, x: u8, y: u8) -> Option<usize> {
        let index = self.index_of(id)?;
        let last = self.knots.len() - 1;

        let target_x = if index == 0 {
            0
        } else if index == last {
            255
        } else {
            x
        };
        let occupied = self
            .knots
            .iter()
            .enumerate()
            .any(|(i, k)| i != index && k.point.x == target_x);

        let knot = &mut self.knots[index];
        if !occupied {
            knot.point.x = target_x;
        }
        knot.point.y = y;

        self.knots.sort_by_key(|k| k.point.x);
        self.index_of(id)
    }
}

impl TryFrom<Vec<ControlPoint>> for Curve {
    type Error = CurveError;

    fn try_from(points: Vec<ControlPoint>) -> Result<Self, Self::Error> {
        Self::try_from_points(points)
    }
}

impl From<Curve> for Vec<ControlPoint> {
    fn from(curve: Curve) -> Self {
        curve.to_points()
    }
}

/// Curve channel: the master curve or one of the color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Master curve, applied to every color channel first
    #[default]
    All,
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::All, Channel::Red, Channel::Green, Channel::Blue];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::All => "all",
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown channel name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown curve channel: {0:?}")]
pub struct ParseChannelError(pub String);

impl FromStr for Channel {
    type Err = ParseChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Channel::All),
            "red" => Ok(Channel::Red),
            "green" => Ok(Channel::Green),
            "blue" => Ok(Channel::Blue),
            other => Err(ParseChannelError(other.to_string())),
        }
    }
}
