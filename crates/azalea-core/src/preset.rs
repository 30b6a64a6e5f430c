//! Saved adjustment configs and curve presets.
//!
//! Both are plain JSON documents owned by the host's storage. Timestamps are
//! opaque strings supplied by the host; this crate never reads a clock.
//!
//! Curve presets store each channel as a JSON-encoded *string* of points
//! (`"[{\"x\":0,\"y\":0},...]"`). The reader also accepts inline arrays.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::curve::CurveSet;
use crate::{AdjustmentParams, Channel, ControlPoint, Curve, CurveError};

/// Slider limit in both directions.
pub const SLIDER_MAX: i32 = 100;

/// Error types for preset loading.
#[derive(Debug, Error)]
pub enum PresetError {
    /// Malformed JSON or wrong field types.
    #[error("Invalid preset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A channel's points do not form a valid curve.
    #[error("Invalid {channel} curve: {source}")]
    InvalidCurve {
        channel: Channel,
        #[source]
        source: CurveError,
    },
}

// ============================================================================
// Adjustment Configs
// ============================================================================

/// Raw slider positions, integers from -100 to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderValues {
    pub exposure: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub tint: i32,
    pub temperature: i32,
    pub sharpen: i32,
    pub highlight: i32,
    pub shadow: i32,
    pub black: i32,
    pub white: i32,
}

impl SliderValues {
    fn fields(&self) -> [(&'static str, i32); 10] {
        [
            ("exposure", self.exposure),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("tint", self.tint),
            ("temperature", self.temperature),
            ("sharpen", self.sharpen),
            ("highlight", self.highlight),
            ("shadow", self.shadow),
            ("black", self.black),
            ("white", self.white),
        ]
    }

    /// Clamp every slider into [-100, 100], logging each out-of-range value.
    pub fn clamped(&self) -> Self {
        for (name, value) in self.fields() {
            if !(-SLIDER_MAX..=SLIDER_MAX).contains(&value) {
                warn!(slider = name, value, "slider value out of range, clamping");
            }
        }
        let c = |v: i32| v.clamp(-SLIDER_MAX, SLIDER_MAX);
        Self {
            exposure: c(self.exposure),
            contrast: c(self.contrast),
            saturation: c(self.saturation),
            tint: c(self.tint),
            temperature: c(self.temperature),
            sharpen: c(self.sharpen),
            highlight: c(self.highlight),
            shadow: c(self.shadow),
            black: c(self.black),
            white: c(self.white),
        }
    }

    /// Normalize to pipeline params (`value / 100`), clamping first.
    pub fn to_params(&self) -> AdjustmentParams {
        let v = self.clamped();
        let n = |x: i32| x as f64 / SLIDER_MAX as f64;
        AdjustmentParams {
            exposure: n(v.exposure),
            contrast: n(v.contrast),
            saturation: n(v.saturation),
            tint: n(v.tint),
            temperature: n(v.temperature),
            sharpen: n(v.sharpen),
            highlight: n(v.highlight),
            shadow: n(v.shadow),
            black: n(v.black),
            white: n(v.white),
        }
    }

    /// Nearest slider positions for the given params.
    pub fn from_params(params: &AdjustmentParams) -> Self {
        let s = |x: f64| {
            let v = (x * SLIDER_MAX as f64).round();
            if v.is_nan() {
                0
            } else {
                (v as i32).clamp(-SLIDER_MAX, SLIDER_MAX)
            }
        };
        Self {
            exposure: s(params.exposure),
            contrast: s(params.contrast),
            saturation: s(params.saturation),
            tint: s(params.tint),
            temperature: s(params.temperature),
            sharpen: s(params.sharpen),
            highlight: s(params.highlight),
            shadow: s(params.shadow),
            black: s(params.black),
            white: s(params.white),
        }
    }
}

impl AdjustmentParams {
    /// Params from raw slider positions.
    pub fn from_slider_values(values: &SliderValues) -> Self {
        values.to_params()
    }

    /// Nearest raw slider positions.
    pub fn to_slider_values(&self) -> SliderValues {
        SliderValues::from_params(self)
    }
}

/// A named, saved set of slider positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentConfig {
    pub name: String,
    #[serde(default)]
    pub values: SliderValues,
    #[serde(default)]
    pub timestamp: String,
}

impl AdjustmentConfig {
    pub fn new(name: impl Into<String>, values: SliderValues, timestamp: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values,
            timestamp: timestamp.into(),
        }
    }

    /// Pipeline params for this config.
    pub fn params(&self) -> AdjustmentParams {
        self.values.to_params()
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Curve Presets
// ============================================================================

/// Point list stored either as an inline array or a JSON-encoded string.
mod encoded_points {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::ControlPoint;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Text(String),
        Points(Vec<ControlPoint>),
    }

    pub fn serialize<S: Serializer>(points: &[ControlPoint], s: S) -> Result<S::Ok, S::Error> {
        let text = serde_json::to_string(points).map_err(S::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ControlPoint>, D::Error> {
        match Encoded::deserialize(d)? {
            Encoded::Text(text) => serde_json::from_str(&text).map_err(D::Error::custom),
            Encoded::Points(points) => Ok(points),
        }
    }
}

/// A named, saved set of four curves.
///
/// Points are kept unvalidated so that a damaged preset can still be
/// inspected or repaired; validation happens in [`CurvePreset::to_curve_set`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePreset {
    pub name: String,
    #[serde(with = "encoded_points")]
    pub all: Vec<ControlPoint>,
    #[serde(with = "encoded_points")]
    pub red: Vec<ControlPoint>,
    #[serde(with = "encoded_points")]
    pub green: Vec<ControlPoint>,
    #[serde(with = "encoded_points")]
    pub blue: Vec<ControlPoint>,
    #[serde(default)]
    pub timestamp: String,
}

impl CurvePreset {
    /// Snapshot the current curves.
    pub fn new(name: impl Into<String>, curves: &CurveSet, timestamp: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            all: curves.all.to_points(),
            red: curves.red.to_points(),
            green: curves.green.to_points(),
            blue: curves.blue.to_points(),
            timestamp: timestamp.into(),
        }
    }

    /// Stored points for one channel.
    pub fn points(&self, channel: Channel) -> &[ControlPoint] {
        match channel {
            Channel::All => &self.all,
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    /// Build the curves, rejecting any channel that is not a valid curve.
    pub fn to_curve_set(&self) -> Result<CurveSet, PresetError> {
        let mut curves = CurveSet::new();
        for channel in Channel::ALL {
            let curve = Curve::try_from_points(self.points(channel).to_vec())
                .map_err(|source| PresetError::InvalidCurve { channel, source })?;
            curves.set(channel, curve);
        }
        Ok(curves)
    }

    /// Build the curves, repairing invalid channels.
    ///
    /// Repair sorts by x, keeps the last of any duplicate x and re-adds
    /// missing endpoints at (0, 0) and (255, 255).
    pub fn to_curve_set_repaired(&self) -> CurveSet {
        let mut curves = CurveSet::new();
        for channel in Channel::ALL {
            let points = self.points(channel).to_vec();
            let curve = match Curve::try_from_points(points.clone()) {
                Ok(curve) => curve,
                Err(error) => {
                    warn!(preset = %self.name, %channel, %error, "repairing invalid curve");
                    Curve::repaired(points)
                }
            };
            curves.set(channel, curve);
        }
        curves
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(u8, u8)]) -> Vec<ControlPoint> {
        raw.iter().map(|&(x, y)| ControlPoint::new(x, y)).collect()
    }

    #[test]
    fn test_slider_values_normalize() {
        let values = SliderValues {
            exposure: 50,
            black: -30,
            ..Default::default()
        };
        let params = values.to_params();
        assert!((params.exposure - 0.5).abs() < 1e-6);
        assert!((params.black + 0.3).abs() < 1e-6);
        assert_eq!(params.contrast, 0.0);
    }

    #[test]
    fn test_slider_values_clamp_out_of_range() {
        let values = SliderValues {
            contrast: 150,
            shadow: -400,
            ..Default::default()
        };
        let params = values.to_params();
        assert_eq!(params.contrast, 1.0);
        assert_eq!(params.shadow, -1.0);
    }

    #[test]
    fn test_params_to_slider_values() {
        let params = AdjustmentParams {
            exposure: 0.256,
            tint: -0.5,
            white: 3.0,
            ..Default::default()
        };
        let values = params.to_slider_values();
        assert_eq!(values.exposure, 26);
        assert_eq!(values.tint, -50);
        assert_eq!(values.white, 100);
        assert_eq!(AdjustmentParams::from_slider_values(&values).tint, -0.5);
    }

    #[test]
    fn test_adjustment_config_from_stored_json() {
        let json = r#"{
            "name": "Warm",
            "values": {"exposure": 10, "temperature": 40, "black": 0},
            "timestamp": "19/10/2026, 10.15.00"
        }"#;
        let config = AdjustmentConfig::from_json(json).unwrap();
        assert_eq!(config.name, "Warm");
        assert_eq!(config.values.temperature, 40);
        assert_eq!(config.values.saturation, 0);
        assert!((config.params().temperature - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_adjustment_config_roundtrip() {
        let config = AdjustmentConfig::new(
            "Punchy",
            SliderValues {
                contrast: 25,
                saturation: 15,
                ..Default::default()
            },
            "now",
        );
        let json = config.to_json().unwrap();
        assert_eq!(AdjustmentConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_adjustment_config_rejects_bad_json() {
        let err = AdjustmentConfig::from_json(r#"{"values": {}}"#).unwrap_err();
        assert!(matches!(err, PresetError::Json(_)));
    }

    #[test]
    fn test_curve_preset_reads_string_encoding() {
        let json = r#"{
            "name": "Fade",
            "all": "[{\"x\":0,\"y\":30},{\"x\":255,\"y\":255}]",
            "red": "[{\"x\":0,\"y\":0},{\"x\":255,\"y\":255}]",
            "green": "[{\"x\":0,\"y\":0},{\"x\":128,\"y\":140},{\"x\":255,\"y\":255}]",
            "blue": "[{\"x\":0,\"y\":0},{\"x\":255,\"y\":255}]",
            "timestamp": "19/10/2026"
        }"#;
        let preset = CurvePreset::from_json(json).unwrap();
        assert_eq!(preset.all, pts(&[(0, 30), (255, 255)]));
        assert_eq!(preset.green.len(), 3);

        let curves = preset.to_curve_set().unwrap();
        assert_eq!(curves.all.first(), ControlPoint::new(0, 30));
        assert_eq!(curves.green.point(1), Some(ControlPoint::new(128, 140)));
    }

    #[test]
    fn test_curve_preset_reads_inline_arrays() {
        let json = r#"{
            "name": "Inline",
            "all": [{"x":0,"y":0},{"x":255,"y":200}],
            "red": [{"x":0,"y":0},{"x":255,"y":255}],
            "green": [{"x":0,"y":0},{"x":255,"y":255}],
            "blue": [{"x":0,"y":0},{"x":255,"y":255}]
        }"#;
        let preset = CurvePreset::from_json(json).unwrap();
        assert_eq!(preset.timestamp, "");
        assert_eq!(preset.all, pts(&[(0, 0), (255, 200)]));
    }

    #[test]
    fn test_curve_preset_writes_string_encoding() {
        let mut curves = CurveSet::new();
        curves.red.insert_point(64, 80);
        let preset = CurvePreset::new("Red lift", &curves, "t");

        let value: serde_json::Value = serde_json::from_str(&preset.to_json().unwrap()).unwrap();
        assert_eq!(
            value["red"],
            serde_json::json!(r#"[{"x":0,"y":0},{"x":64,"y":80},{"x":255,"y":255}]"#)
        );

        let back = CurvePreset::from_json(&preset.to_json().unwrap()).unwrap();
        assert_eq!(back.to_curve_set().unwrap(), curves);
    }

    #[test]
    fn test_strict_load_rejects_invalid_curve() {
        let mut preset = CurvePreset::new("Broken", &CurveSet::new(), "");
        preset.blue = pts(&[(0, 0), (200, 100), (100, 50), (255, 255)]);

        let err = preset.to_curve_set().unwrap_err();
        match err {
            PresetError::InvalidCurve { channel, source } => {
                assert_eq!(channel, Channel::Blue);
                assert_eq!(source, CurveError::NotIncreasing { index: 2 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repaired_load_fixes_invalid_curve() {
        let mut preset = CurvePreset::new("Broken", &CurveSet::new(), "");
        preset.blue = pts(&[(200, 100), (100, 50), (100, 60)]);

        let curves = preset.to_curve_set_repaired();
        assert_eq!(
            curves.blue.to_points(),
            pts(&[(0, 0), (100, 60), (200, 100), (255, 255)])
        );
        assert!(curves.all.is_identity());
    }

    #[test]
    fn test_malformed_string_curve_is_json_error() {
        let json = r#"{"name":"x","all":"[{\"x\":0","red":"[]","green":"[]","blue":"[]"}"#;
        assert!(matches!(
            CurvePreset::from_json(json).unwrap_err(),
            PresetError::Json(_)
        ));
    }
}
