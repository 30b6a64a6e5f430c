//! Interactive tone curve editing.
//!
//! [`CurveEditor`] turns pointer events on a curve plot into curve edits.
//! It owns the [`CurveSet`], the active channel tab and the drag state; the
//! curves themselves only expose pure insert and move operations.
//!
//! ## Plot Geometry
//!
//! The plot is a `width` x `height` screen area with `padding` on every
//! side. Curve space (0-255 on both axes, y pointing up) is mapped onto the
//! inner graph area (y pointing down).

use tracing::debug;

use crate::curve::CurveSet;
use crate::{Channel, ControlPoint, PointId};

/// Padding around the graph area, in screen pixels.
pub const DEFAULT_PADDING: f32 = 40.0;

/// Pointer distance (screen pixels) that grabs an existing point.
pub const HIT_RADIUS: f32 = 8.0;

/// Screen layout of the curve plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotGeometry {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl Default for PlotGeometry {
    fn default() -> Self {
        Self::new(335.0, 335.0)
    }
}

impl PlotGeometry {
    /// Plot of the given size with the default padding.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            padding: DEFAULT_PADDING,
        }
    }

    #[inline]
    fn graph_width(&self) -> f32 {
        self.width - self.padding * 2.0
    }

    #[inline]
    fn graph_height(&self) -> f32 {
        self.height - self.padding * 2.0
    }

    /// True when the padding leaves no graph area to map onto.
    pub fn is_degenerate(&self) -> bool {
        !(self.graph_width() > 0.0 && self.graph_height() > 0.0)
    }

    /// Map a screen position to unclamped curve space.
    pub fn to_curve(&self, sx: f32, sy: f32) -> (f32, f32) {
        let x = (sx - self.padding) / self.graph_width() * 255.0;
        let y = 255.0 - (sy - self.padding) / self.graph_height() * 255.0;
        (x, y)
    }

    /// Map a control point to its screen position.
    pub fn to_screen(&self, point: ControlPoint) -> (f32, f32) {
        let sx = self.padding + point.x as f32 / 255.0 * self.graph_width();
        let sy = self.padding + (255.0 - point.y as f32) / 255.0 * self.graph_height();
        (sx, sy)
    }
}

/// Drag state of the active curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    /// A point is held; tracked by id so re-sorting cannot lose it.
    Dragging(PointId),
}

/// Curve edit session: four curves, one active channel, one drag state.
#[derive(Debug, Clone, Default)]
pub struct CurveEditor {
    curves: CurveSet,
    channel: Channel,
    state: EditState,
    geometry: PlotGeometry,
}

impl CurveEditor {
    pub fn new(geometry: PlotGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    pub fn curves(&self) -> &CurveSet {
        &self.curves
    }

    /// Replace all four curves (preset load). Any drag is dropped.
    pub fn set_curves(&mut self, curves: CurveSet) {
        self.curves = curves;
        self.state = EditState::Idle;
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Switch the active channel tab. Any drag is dropped.
    pub fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
        self.state = EditState::Idle;
    }

    pub fn geometry(&self) -> PlotGeometry {
        self.geometry
    }

    /// Update the plot size, e.g. after the canvas is resized.
    pub fn set_geometry(&mut self, geometry: PlotGeometry) {
        self.geometry = geometry;
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Current index of the dragged point in the active curve.
    pub fn dragging_index(&self) -> Option<usize> {
        match self.state {
            EditState::Dragging(id) => self.curves.get(self.channel).index_of(id),
            EditState::Idle => None,
        }
    }

    /// Reset the active channel to the identity curve.
    pub fn reset_channel(&mut self) {
        self.curves.reset(self.channel);
        self.state = EditState::Idle;
    }

    /// Index of the first point of the active curve within the hit radius.
    pub fn hit_test(&self, sx: f32, sy: f32) -> Option<usize> {
        self.curves.get(self.channel).points().position(|p| {
            let (px, py) = self.geometry.to_screen(p);
            ((sx - px).powi(2) + (sy - py).powi(2)).sqrt() < HIT_RADIUS
        })
    }

    /// Pointer pressed on the plot.
    ///
    /// Grabs the point under the pointer, or inserts a new point when the
    /// pointer is inside the graph (strictly between the endpoints on x).
    /// Returns true when the curve changed.
    pub fn pointer_down(&mut self, sx: f32, sy: f32) -> bool {
        if self.geometry.is_degenerate() {
            return false;
        }

        if let Some(index) = self.hit_test(sx, sy) {
            if let Some(id) = self.curves.get(self.channel).id_at(index) {
                debug!(channel = %self.channel, index, "grab curve point");
                self.state = EditState::Dragging(id);
            }
            return false;
        }

        let (cx, cy) = self.geometry.to_curve(sx, sy);
        if cx > 0.0 && cx < 255.0 && (0.0..=255.0).contains(&cy) {
            let (x, y) = (cx.round() as u8, cy.round() as u8);
            let id = self.curves.get_mut(self.channel).insert_point(x, y);
            debug!(channel = %self.channel, x, y, "insert curve point");
            self.state = EditState::Dragging(id);
            return true;
        }

        false
    }

    /// Pointer moved over the plot. Returns true when the curve changed.
    pub fn pointer_move(&mut self, sx: f32, sy: f32) -> bool {
        let EditState::Dragging(id) = self.state else {
            return false;
        };
        if self.geometry.is_degenerate() {
            return false;
        }

        let (cx, cy) = self.geometry.to_curve(sx, sy);
        let x = cx.clamp(0.0, 255.0).round() as u8;
        let y = cy.clamp(0.0, 255.0).round() as u8;

        let curve = self.curves.get_mut(self.channel);
        match curve.move_point(id, x, y) {
            Some(_) => true,
            None => {
                self.state = EditState::Idle;
                false
            }
        }
    }

    /// Pointer released or left the plot.
    pub fn pointer_up(&mut self) {
        if self.state != EditState::Idle {
            debug!(channel = %self.channel, "release curve point");
        }
        self.state = EditState::Idle;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Pointer {
        Down(f32, f32),
        Move(f32, f32),
        Up,
    }

    fn pointer_strategy() -> impl Strategy<Value = Pointer> {
        prop_oneof![
            (-50.0f32..400.0, -50.0f32..400.0).prop_map(|(x, y)| Pointer::Down(x, y)),
            (-50.0f32..400.0, -50.0f32..400.0).prop_map(|(x, y)| Pointer::Move(x, y)),
            Just(Pointer::Up),
        ]
    }

    proptest! {
        /// Property: Any pointer sequence leaves the curve strictly sorted
        /// with its endpoints at x=0 and x=255.
        #[test]
        fn prop_curve_invariants_survive_editing(
            events in proptest::collection::vec(pointer_strategy(), 1..60),
        ) {
            let mut ed = CurveEditor::new(PlotGeometry::new(335.0, 335.0));
            for event in events {
                match event {
                    Pointer::Down(x, y) => { ed.pointer_down(x, y); }
                    Pointer::Move(x, y) => { ed.pointer_move(x, y); }
                    Pointer::Up => ed.pointer_up(),
                }

                let curve = ed.curves().get(ed.channel());
                prop_assert_eq!(curve.first().x, 0);
                prop_assert_eq!(curve.last().x, 255);
                let pts = curve.to_points();
                prop_assert!(pts.windows(2).all(|w| w[0].x < w[1].x));
                if let Some(i) = ed.dragging_index() {
                    prop_assert!(i < pts.len());
                }
            }
        }
    }
}
