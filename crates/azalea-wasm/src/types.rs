//! WASM-compatible wrapper types for pixel data.
//!
//! This module provides JavaScript-friendly types that wrap the core Azalea types,
//! handling the conversion between Rust and JavaScript data representations.

use std::fmt::Display;

use azalea_core::PixelBuffer;
use wasm_bindgen::prelude::*;

/// An RGBA pixel buffer wrapper for JavaScript.
///
/// Pixel data is interleaved R, G, B, A bytes in row-major order, the same
/// layout as canvas `ImageData`.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. `pixels()` and `image_data()`
/// copy it into JavaScript memory. The `free()` method releases the WASM
/// side early; wasm-bindgen's finalizer does it otherwise.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    inner: PixelBuffer,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    /// Create a buffer from dimensions and RGBA data.
    ///
    /// # Errors
    /// Returns error if `pixels.length != width * height * 4`
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsPixelBuffer, JsValue> {
        PixelBuffer::new(width, height, pixels)
            .map(Self::from_buffer)
            .map_err(to_js_error)
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.data().len()
    }

    /// Returns RGBA pixel data as Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.data().to_vec()
    }

    /// Returns RGBA pixel data as Uint8ClampedArray, ready for `new ImageData(...)`.
    pub fn image_data(&self) -> js_sys::Uint8ClampedArray {
        js_sys::Uint8ClampedArray::from(self.inner.data())
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPixelBuffer {
    pub(crate) fn from_buffer(inner: PixelBuffer) -> Self {
        Self { inner }
    }

    pub(crate) fn buffer(&self) -> &PixelBuffer {
        &self.inner
    }
}

/// Map a core error to a JavaScript error string.
pub(crate) fn to_js_error<E: Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
