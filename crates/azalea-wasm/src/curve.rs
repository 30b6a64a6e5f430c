//! Tone curve WASM bindings.
//!
//! This module exposes the interactive curve editor (pointer events, channel
//! tabs, presets) and LUT generation for drawing and application.

use crate::types::{to_js_error, JsPixelBuffer};
use azalea_core::editor::PlotGeometry;
use azalea_core::{Channel, ControlPoint, Curve, CurvePreset, CurveSet, Lut, PixelBuffer};
use wasm_bindgen::prelude::*;

/// JavaScript-accessible tone curve LUT.
///
/// A pre-computed 256-entry lookup table, mainly for drawing the curve line.
///
/// # Example (TypeScript)
/// ```typescript
/// const lut = new JsLut([{ x: 0, y: 0 }, { x: 64, y: 40 }, { x: 255, y: 255 }]);
/// const values = lut.get_lut(); // Uint8Array(256)
/// lut.free();
/// ```
#[wasm_bindgen]
pub struct JsLut {
    inner: Lut,
}

#[wasm_bindgen]
impl JsLut {
    /// Create a LUT from curve control points.
    ///
    /// # Arguments
    /// * `points` - Array of {x, y} integer objects (0-255), strictly increasing
    ///   by x, from x=0 to x=255
    ///
    /// # Errors
    /// Returns error if points cannot be deserialized or do not form a valid curve
    #[wasm_bindgen(constructor)]
    pub fn new(points: JsValue) -> Result<JsLut, JsValue> {
        let points: Vec<ControlPoint> = serde_wasm_bindgen::from_value(points)
            .map_err(|e| JsValue::from_str(&format!("Invalid curve points: {}", e)))?;
        let curve = Curve::try_from_points(points).map_err(to_js_error)?;
        Ok(Self::from_lut(Lut::from_curve(&curve)))
    }

    /// Create an identity (no-op) LUT.
    pub fn identity() -> JsLut {
        Self::from_lut(Lut::identity())
    }

    /// Check if this LUT produces no change.
    pub fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }

    /// Get raw LUT data (256 bytes) where `lut[i]` is the output for input `i`.
    pub fn get_lut(&self) -> Vec<u8> {
        self.inner.as_array().to_vec()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsLut {
    fn from_lut(inner: Lut) -> Self {
        Self { inner }
    }
}

/// Apply four curves to an image.
///
/// # Arguments
/// * `image` - Source image (RGBA pixels)
/// * `curves` - `{ all, red, green, blue }`, each an array of {x, y} points
///
/// # Errors
/// Returns error if any curve is malformed
#[wasm_bindgen]
pub fn apply_curves(image: &JsPixelBuffer, curves: JsValue) -> Result<JsPixelBuffer, JsValue> {
    let curves: CurveSet = serde_wasm_bindgen::from_value(curves).map_err(to_js_error)?;
    Ok(JsPixelBuffer::from_buffer(azalea_core::apply_curves(
        image.buffer(),
        &curves,
    )))
}

/// Interactive curve editing session.
///
/// Receives pointer events in canvas pixel coordinates, owns the four curves
/// and the original image, and renders the curves onto it.
///
/// # Example (TypeScript)
/// ```typescript
/// const editor = new CurveEditor(canvas.width, canvas.height);
/// editor.set_source(image);
/// canvas.onmousedown = (e) => editor.pointer_down(e.offsetX, e.offsetY) && redraw();
/// canvas.onmousemove = (e) => editor.pointer_move(e.offsetX, e.offsetY) && redraw();
/// canvas.onmouseup = () => editor.pointer_up();
/// ```
#[wasm_bindgen(js_name = CurveEditor)]
pub struct JsCurveEditor {
    inner: azalea_core::CurveEditor,
    source: Option<PixelBuffer>,
}

#[wasm_bindgen(js_class = CurveEditor)]
impl JsCurveEditor {
    /// Create an editor for a plot canvas of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            inner: azalea_core::CurveEditor::new(PlotGeometry::new(width, height)),
            source: None,
        }
    }

    /// Update the plot size after the canvas is resized.
    pub fn resize(&mut self, width: f32, height: f32) {
        let padding = self.inner.geometry().padding;
        self.inner.set_geometry(PlotGeometry {
            width,
            height,
            padding,
        });
    }

    /// Set the original image (copied into WASM memory).
    pub fn set_source(&mut self, image: &JsPixelBuffer) {
        self.source = Some(image.buffer().clone());
    }

    pub fn clear_source(&mut self) {
        self.source = None;
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Active channel name: "all", "red", "green" or "blue".
    #[wasm_bindgen(getter)]
    pub fn channel(&self) -> String {
        self.inner.channel().to_string()
    }

    /// Switch the active channel tab.
    ///
    /// # Errors
    /// Returns error for an unknown channel name
    pub fn set_channel(&mut self, name: &str) -> Result<(), JsValue> {
        let channel: Channel = name.parse().map_err(to_js_error)?;
        self.inner.set_channel(channel);
        Ok(())
    }

    /// Pointer pressed. Returns true when the curve changed.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.inner.pointer_down(x, y)
    }

    /// Pointer moved. Returns true when the curve changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.inner.pointer_move(x, y)
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    /// Pointer left the canvas; ends any drag.
    pub fn pointer_leave(&mut self) {
        self.inner.pointer_up();
    }

    /// Index of the dragged point in the active curve, if any.
    pub fn dragging_index(&self) -> Option<u32> {
        self.inner.dragging_index().map(|i| i as u32)
    }

    /// Reset the active channel to the identity curve.
    pub fn reset_channel(&mut self) {
        self.inner.reset_channel();
    }

    /// Reset all four curves.
    pub fn reset_all(&mut self) {
        self.inner.set_curves(CurveSet::new());
    }

    /// Active curve points as a flat `[x0, y0, x1, y1, ...]` array.
    pub fn points(&self) -> Vec<u8> {
        self.active_curve()
            .points()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Active curve points in canvas coordinates, flat `[sx0, sy0, ...]`.
    pub fn screen_points(&self) -> Vec<f32> {
        let geometry = self.inner.geometry();
        self.active_curve()
            .points()
            .flat_map(|p| {
                let (sx, sy) = geometry.to_screen(p);
                [sx, sy]
            })
            .collect()
    }

    /// 256-entry table of the active curve, for drawing the line.
    pub fn active_lut(&self) -> Vec<u8> {
        Lut::from_curve(self.active_curve()).as_array().to_vec()
    }

    /// 256-entry table of one channel's curve.
    ///
    /// # Errors
    /// Returns error for an unknown channel name
    pub fn lut(&self, name: &str) -> Result<Vec<u8>, JsValue> {
        let channel: Channel = name.parse().map_err(to_js_error)?;
        Ok(Lut::from_curve(self.inner.curves().get(channel))
            .as_array()
            .to_vec())
    }

    /// Whether all four curves are identity.
    pub fn is_identity(&self) -> bool {
        self.inner.curves().is_identity()
    }

    /// Render the original image with the current curves.
    ///
    /// Returns `undefined` when no image is loaded.
    pub fn render(&self) -> Option<JsPixelBuffer> {
        let source = self.source.as_ref()?;
        Some(JsPixelBuffer::from_buffer(azalea_core::apply_curves(
            source,
            self.inner.curves(),
        )))
    }

    /// Serialize all four curves as a named preset (JSON string).
    pub fn save_preset(&self, name: &str, timestamp: &str) -> Result<String, JsValue> {
        CurvePreset::new(name, self.inner.curves(), timestamp)
            .to_json()
            .map_err(to_js_error)
    }

    /// Load a stored preset (JSON string), rejecting invalid curves.
    /// Returns the preset name.
    pub fn load_preset(&mut self, json: &str) -> Result<String, JsValue> {
        let preset = CurvePreset::from_json(json).map_err(to_js_error)?;
        let curves = preset.to_curve_set().map_err(to_js_error)?;
        self.inner.set_curves(curves);
        Ok(preset.name)
    }

    /// Load a stored preset (JSON string), repairing invalid curves.
    /// Returns the preset name.
    pub fn load_preset_repaired(&mut self, json: &str) -> Result<String, JsValue> {
        let preset = CurvePreset::from_json(json).map_err(to_js_error)?;
        self.inner.set_curves(preset.to_curve_set_repaired());
        Ok(preset.name)
    }
}

impl JsCurveEditor {
    fn active_curve(&self) -> &Curve {
        self.inner.curves().get(self.inner.channel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 335x335 canvas: graph area is 255x255 at (40, 40).
    fn editor() -> JsCurveEditor {
        JsCurveEditor::new(335.0, 335.0)
    }

    fn screen(x: f32, y: f32) -> (f32, f32) {
        (40.0 + x, 295.0 - y)
    }

    #[test]
    fn test_identity_lut() {
        let lut = JsLut::identity();
        assert!(lut.is_identity());
        let data = lut.get_lut();
        assert_eq!(data.len(), 256);
        for (i, &val) in data.iter().enumerate() {
            assert_eq!(val, i as u8);
        }
    }

    #[test]
    fn test_editor_starts_identity() {
        let ed = editor();
        assert_eq!(ed.channel(), "all");
        assert_eq!(ed.points(), vec![0, 0, 255, 255]);
        assert!(ed.is_identity());
        assert_eq!(ed.active_lut()[77], 77);
        assert!(ed.render().is_none());
    }

    #[test]
    fn test_editor_insert_and_drag() {
        let mut ed = editor();
        let (sx, sy) = screen(64.0, 40.0);
        assert!(ed.pointer_down(sx, sy));
        assert_eq!(ed.dragging_index(), Some(1));

        let (mx, my) = screen(64.0, 30.0);
        assert!(ed.pointer_move(mx, my));
        ed.pointer_leave();
        assert_eq!(ed.dragging_index(), None);

        assert_eq!(ed.points(), vec![0, 0, 64, 30, 255, 255]);
        assert!(!ed.is_identity());
    }

    #[test]
    fn test_screen_points() {
        let ed = editor();
        let pts = ed.screen_points();
        assert_eq!(pts.len(), 4);
        assert!((pts[0] - 40.0).abs() < 1e-3);
        assert!((pts[1] - 295.0).abs() < 1e-3);
        assert!((pts[2] - 295.0).abs() < 1e-3);
        assert!((pts[3] - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_editor_channel_tabs() {
        let mut ed = editor();
        ed.set_channel("red").unwrap();
        assert_eq!(ed.channel(), "red");

        // Lift the red black point
        let (sx, sy) = screen(0.0, 0.0);
        ed.pointer_down(sx, sy);
        let (mx, my) = screen(0.0, 55.0);
        ed.pointer_move(mx, my);
        ed.pointer_up();

        assert_eq!(ed.lut("red").unwrap()[0], 55);
        assert_eq!(ed.lut("all").unwrap()[0], 0);

        ed.reset_channel();
        assert!(ed.is_identity());
    }

    #[test]
    fn test_editor_render_applies_master_then_channel() {
        let mut ed = editor();
        ed.set_source(&JsPixelBuffer::new(1, 1, vec![255, 255, 100, 9]).unwrap());

        // all: white point down to 200
        let (sx, sy) = screen(255.0, 255.0);
        ed.pointer_down(sx, sy);
        let (mx, my) = screen(255.0, 200.0);
        ed.pointer_move(mx, my);
        ed.pointer_up();

        // red: black point up to 55
        ed.set_channel("red").unwrap();
        let (sx, sy) = screen(0.0, 0.0);
        ed.pointer_down(sx, sy);
        let (mx, my) = screen(0.0, 55.0);
        ed.pointer_move(mx, my);
        ed.pointer_up();

        let out = ed.render().unwrap();
        assert_eq!(out.pixels(), vec![221, 200, 73, 9]);
    }

    #[test]
    fn test_editor_preset_roundtrip() {
        let mut ed = editor();
        ed.set_channel("green").unwrap();
        let (sx, sy) = screen(128.0, 160.0);
        ed.pointer_down(sx, sy);
        ed.pointer_up();
        let json = ed.save_preset("Green lift", "19/10/2026").unwrap();

        let mut other = editor();
        assert_eq!(other.load_preset(&json).unwrap(), "Green lift");
        other.set_channel("green").unwrap();
        assert_eq!(other.points(), vec![0, 0, 128, 160, 255, 255]);

        other.reset_all();
        assert!(other.is_identity());
    }

    #[test]
    fn test_editor_repaired_preset() {
        let json = r#"{
            "name": "Old",
            "all": "[{\"x\":128,\"y\":100}]",
            "red": "[{\"x\":0,\"y\":0},{\"x\":255,\"y\":255}]",
            "green": "[{\"x\":0,\"y\":0},{\"x\":255,\"y\":255}]",
            "blue": "[{\"x\":0,\"y\":0},{\"x\":255,\"y\":255}]",
            "timestamp": ""
        }"#;
        let mut ed = editor();
        assert_eq!(ed.load_preset_repaired(json).unwrap(), "Old");
        assert_eq!(ed.points(), vec![0, 0, 128, 100, 255, 255]);
    }

    #[test]
    fn test_resize_keeps_padding() {
        let mut ed = editor();
        ed.resize(590.0, 590.0);
        // Graph is now 510px wide, so curve x=0 still sits at the padding
        assert!((ed.screen_points()[0] - 40.0).abs() < 1e-3);
        assert!((ed.screen_points()[2] - 550.0).abs() < 1e-3);
    }
}
