//! Adjustment slider WASM bindings.
//!
//! This module provides JavaScript bindings for the AdjustmentParams type and
//! a small editor that keeps the original image and re-renders it whenever a
//! slider moves.

use crate::types::{to_js_error, JsPixelBuffer};
use azalea_core::{AdjustmentConfig, PixelBuffer, SliderValues};
use wasm_bindgen::prelude::*;

/// Adjustment params wrapper for JavaScript.
///
/// Values are normalized (slider integer / 100).
#[wasm_bindgen]
pub struct AdjustmentParams {
    inner: azalea_core::AdjustmentParams,
}

#[wasm_bindgen]
impl AdjustmentParams {
    /// Create new params with every slider at zero
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: azalea_core::AdjustmentParams::new(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn exposure(&self) -> f64 {
        self.inner.exposure
    }

    #[wasm_bindgen(setter)]
    pub fn set_exposure(&mut self, value: f64) {
        self.inner.exposure = value;
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f64 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f64) {
        self.inner.contrast = value;
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f64 {
        self.inner.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f64) {
        self.inner.saturation = value;
    }

    #[wasm_bindgen(getter)]
    pub fn tint(&self) -> f64 {
        self.inner.tint
    }

    #[wasm_bindgen(setter)]
    pub fn set_tint(&mut self, value: f64) {
        self.inner.tint = value;
    }

    #[wasm_bindgen(getter)]
    pub fn temperature(&self) -> f64 {
        self.inner.temperature
    }

    #[wasm_bindgen(setter)]
    pub fn set_temperature(&mut self, value: f64) {
        self.inner.temperature = value;
    }

    #[wasm_bindgen(getter)]
    pub fn sharpen(&self) -> f64 {
        self.inner.sharpen
    }

    #[wasm_bindgen(setter)]
    pub fn set_sharpen(&mut self, value: f64) {
        self.inner.sharpen = value;
    }

    #[wasm_bindgen(getter)]
    pub fn highlight(&self) -> f64 {
        self.inner.highlight
    }

    #[wasm_bindgen(setter)]
    pub fn set_highlight(&mut self, value: f64) {
        self.inner.highlight = value;
    }

    #[wasm_bindgen(getter)]
    pub fn shadow(&self) -> f64 {
        self.inner.shadow
    }

    #[wasm_bindgen(setter)]
    pub fn set_shadow(&mut self, value: f64) {
        self.inner.shadow = value;
    }

    #[wasm_bindgen(getter)]
    pub fn black(&self) -> f64 {
        self.inner.black
    }

    #[wasm_bindgen(setter)]
    pub fn set_black(&mut self, value: f64) {
        self.inner.black = value;
    }

    #[wasm_bindgen(getter)]
    pub fn white(&self) -> f64 {
        self.inner.white
    }

    #[wasm_bindgen(setter)]
    pub fn set_white(&mut self, value: f64) {
        self.inner.white = value;
    }

    /// Check if all adjustments are at default values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to a JS object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }

    /// Deserialize from a JS object
    pub fn from_json(value: JsValue) -> Result<AdjustmentParams, JsValue> {
        let inner: azalea_core::AdjustmentParams =
            serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Build from raw slider integers (`{exposure: 50, ...}`), clamped to [-100, 100]
    pub fn from_slider_values(value: JsValue) -> Result<AdjustmentParams, JsValue> {
        let values: SliderValues = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self {
            inner: values.to_params(),
        })
    }

    /// Nearest raw slider integers
    pub fn to_slider_values(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.to_slider_values()).map_err(to_js_error)
    }
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self::new()
    }
}

impl AdjustmentParams {
    pub(crate) fn inner(&self) -> &azalea_core::AdjustmentParams {
        &self.inner
    }
}

/// Apply all adjustments to an image.
///
/// The source pixels are copied; the source image is never modified.
///
/// # Example (TypeScript)
/// ```typescript
/// const params = new AdjustmentParams();
/// params.exposure = 0.5;
///
/// const adjusted = apply_adjustments(sourceImage, params);
/// ctx.putImageData(new ImageData(adjusted.image_data(), adjusted.width), 0, 0);
/// ```
#[wasm_bindgen]
pub fn apply_adjustments(image: &JsPixelBuffer, params: &AdjustmentParams) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(azalea_core::apply_adjustments(image.buffer(), params.inner()))
}

/// Slider editing session.
///
/// Holds the original image and the raw slider positions. Every render
/// starts from the original, so results depend only on the current sliders.
#[wasm_bindgen]
#[derive(Default)]
pub struct AdjustmentEditor {
    source: Option<PixelBuffer>,
    values: SliderValues,
}

#[wasm_bindgen]
impl AdjustmentEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
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

    /// Set one slider by name. Values outside [-100, 100] are clamped.
    ///
    /// # Errors
    /// Returns error for an unknown slider name
    pub fn set_slider(&mut self, name: &str, value: i32) -> Result<(), JsValue> {
        let slot = slider_mut(&mut self.values, name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown slider: {name}")))?;
        *slot = value;
        self.values = self.values.clamped();
        Ok(())
    }

    /// Current position of one slider, or `undefined` for an unknown name.
    pub fn slider(&self, name: &str) -> Option<i32> {
        let mut values = self.values;
        slider_mut(&mut values, name).map(|v| *v)
    }

    /// Put every slider back to zero.
    pub fn reset(&mut self) {
        self.values = SliderValues::default();
    }

    /// Normalized params for the current sliders.
    pub fn params(&self) -> AdjustmentParams {
        AdjustmentParams {
            inner: self.values.to_params(),
        }
    }

    /// Render the original image with the current sliders.
    ///
    /// Returns `undefined` when no image is loaded.
    pub fn render(&self) -> Option<JsPixelBuffer> {
        let source = self.source.as_ref()?;
        let params = self.values.to_params();
        Some(JsPixelBuffer::from_buffer(azalea_core::apply_adjustments(
            source, &params,
        )))
    }

    /// Serialize the sliders as a named config (JSON string).
    pub fn save_config(&self, name: &str, timestamp: &str) -> Result<String, JsValue> {
        AdjustmentConfig::new(name, self.values, timestamp)
            .to_json()
            .map_err(to_js_error)
    }

    /// Load sliders from a stored config (JSON string). Returns the config name.
    pub fn load_config(&mut self, json: &str) -> Result<String, JsValue> {
        let config = AdjustmentConfig::from_json(json).map_err(to_js_error)?;
        self.values = config.values.clamped();
        Ok(config.name)
    }
}

fn slider_mut<'a>(values: &'a mut SliderValues, name: &str) -> Option<&'a mut i32> {
    let slot = match name {
        "exposure" => &mut values.exposure,
        "contrast" => &mut values.contrast,
        "saturation" => &mut values.saturation,
        "tint" => &mut values.tint,
        "temperature" => &mut values.temperature,
        "sharpen" => &mut values.sharpen,
        "highlight" => &mut values.highlight,
        "shadow" => &mut values.shadow,
        "black" => &mut values.black,
        "white" => &mut values.white,
        _ => return None,
    };
    Some(slot)
}
