//! Azalea WASM - WebAssembly bindings for Azalea
//!
//! This crate provides WASM bindings to expose the azalea-core adjustment
//! pipeline and tone curve editor to the browser.
//!
//! # Module Structure
//!
//! - `adjustments` - Slider params, `apply_adjustments` and the adjustment editor
//! - `curve` - Curve editor, LUT export and `apply_curves`
//! - `types` - WASM-compatible wrapper types for pixel data
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsPixelBuffer, AdjustmentEditor } from '@azalea/wasm';
//!
//! await init();
//!
//! const { data, width, height } = ctx.getImageData(0, 0, w, h);
//! const editor = new AdjustmentEditor();
//! editor.set_source(new JsPixelBuffer(width, height, new Uint8Array(data.buffer)));
//! editor.set_slider('exposure', 25);
//! const out = editor.render();
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod curve;
mod types;

// Re-export public types
pub use adjustments::{apply_adjustments, AdjustmentEditor, AdjustmentParams};
pub use curve::{apply_curves, JsCurveEditor, JsLut};
pub use types::JsPixelBuffer;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
