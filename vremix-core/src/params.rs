//! Dimension table and the strongly typed parameter set.
//!
//! Every axis of random variation is a [`Dimension`] with a fixed
//! [`TransformationSpec`] (bounds, neutral value, rounding precision). A
//! [`ParameterSet`] maps dimensions to values and is immutable once built;
//! unknown dimension names are rejected when a set is deserialized.

use crate::error::{CoreError, CoreResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Semantics of a dimension's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Multiplicative factor, neutral at 1.0
    Factor,
    /// Additive offset, neutral at 0.0
    Offset,
    /// Rotation in degrees, neutral at 0.0
    Degrees,
    /// Effect intensity, neutral at 0.0
    Intensity,
    /// Encoder quantizer value
    Quantizer,
}

/// One bounded axis of randomization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformationSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    /// Value at which the transformation has no effect. May lie outside
    /// `[min, max]` (zoom is never neutral once sampled).
    pub neutral: f64,
    pub unit: Unit,
    /// Number of decimal places sampled values are rounded to.
    pub precision: u32,
}

impl TransformationSpec {
    /// True when `value` is finite and inside `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Rounds `value` to this dimension's precision and clamps it into bounds.
    #[must_use]
    pub fn quantize(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.precision as i32);
        ((value * scale).round() / scale).clamp(self.min, self.max)
    }

    /// True only when `value` equals the neutral value exactly. Any other
    /// in-range value, however close, is applied.
    #[must_use]
    pub fn is_neutral(&self, value: f64) -> bool {
        value == self.neutral
    }

    /// Returns `value` unchanged if it is in bounds, otherwise an error.
    pub fn check(&self, value: f64) -> CoreResult<f64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(CoreError::ParameterOutOfRange {
                name: self.name.to_string(),
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// The fixed set of visual and audio dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ZoomFactor,
    PlaybackSpeed,
    Saturation,
    Brightness,
    Contrast,
    Volume,
    HueShift,
    Noise,
    Sharpness,
}

const fn entry(
    name: &'static str,
    min: f64,
    max: f64,
    neutral: f64,
    unit: Unit,
    precision: u32,
) -> TransformationSpec {
    TransformationSpec {
        name,
        min,
        max,
        neutral,
        unit,
        precision,
    }
}

/// Authoritative bounds, indexed in `Dimension` declaration order.
pub const DIMENSION_TABLE: [TransformationSpec; 9] = [
    entry("zoom_factor", 1.02, 1.08, 1.0, Unit::Factor, 2),
    entry("playback_speed", 0.92, 1.08, 1.0, Unit::Factor, 2),
    entry("saturation", 0.92, 1.08, 1.0, Unit::Factor, 2),
    entry("brightness", -0.08, 0.08, 0.0, Unit::Offset, 2),
    entry("contrast", 0.92, 1.08, 1.0, Unit::Factor, 2),
    entry("volume", 0.92, 1.08, 1.0, Unit::Factor, 2),
    entry("hue_shift", -5.0, 5.0, 0.0, Unit::Degrees, 1),
    entry("noise", 0.0, 0.02, 0.0, Unit::Intensity, 2),
    entry("sharpness", 0.95, 1.05, 1.0, Unit::Factor, 2),
];

impl Dimension {
    pub const ALL: [Dimension; 9] = [
        Dimension::ZoomFactor,
        Dimension::PlaybackSpeed,
        Dimension::Saturation,
        Dimension::Brightness,
        Dimension::Contrast,
        Dimension::Volume,
        Dimension::HueShift,
        Dimension::Noise,
        Dimension::Sharpness,
    ];

    #[must_use]
    pub fn spec(self) -> &'static TransformationSpec {
        &DIMENSION_TABLE[self as usize]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| CoreError::OperationFailed(format!("Unknown dimension '{s}'")))
    }
}

// ---- Encoding variation ----

pub const BITRATE_FACTOR_SPEC: TransformationSpec = TransformationSpec {
    name: "bitrate_factor",
    min: 0.95,
    max: 1.05,
    neutral: 1.0,
    unit: Unit::Factor,
    precision: 2,
};

pub const FRAME_BLEND_SPEC: TransformationSpec = TransformationSpec {
    name: "frame_blend",
    min: 0.0,
    max: 0.25,
    neutral: 0.0,
    unit: Unit::Intensity,
    precision: 2,
};

pub const CRF_SPEC: TransformationSpec = TransformationSpec {
    name: "crf",
    min: 20.0,
    max: 24.0,
    neutral: 22.0,
    unit: Unit::Quantizer,
    precision: 0,
};

/// Optional encoder-level jitter layered after the filter stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodingVariation {
    /// Multiplier applied to the base video bitrate cap
    pub bitrate_factor: f64,
    /// Weight of the previous frame when blending, 0 disables blending
    pub frame_blend: f64,
    pub crf: u8,
}

impl EncodingVariation {
    pub fn validate(&self) -> CoreResult<()> {
        BITRATE_FACTOR_SPEC.check(self.bitrate_factor)?;
        FRAME_BLEND_SPEC.check(self.frame_blend)?;
        CRF_SPEC.check(f64::from(self.crf))?;
        Ok(())
    }
}

// ---- Parameter set ----

/// The output of one sampling round.
///
/// Values are keyed by [`Dimension`], so a set can never hold an unknown
/// dimension. A set may be partial (for instance when loaded from a
/// hand-edited record); the compiler reports the first missing dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    dimensions: BTreeMap<Dimension, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encoding: Option<EncodingVariation>,
}

impl ParameterSet {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Dimension, f64)>,
    {
        Self {
            dimensions: values.into_iter().collect(),
            encoding: None,
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Option<EncodingVariation>) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        self.dimensions.get(&dimension).copied()
    }

    /// Looks up a dimension, failing with `MissingDimension` when absent.
    pub fn require(&self, dimension: Dimension) -> CoreResult<f64> {
        self.get(dimension)
            .ok_or(CoreError::MissingDimension(dimension))
    }

    #[must_use]
    pub fn encoding(&self) -> Option<&EncodingVariation> {
        self.encoding.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        self.dimensions.iter().map(|(d, v)| (*d, *v))
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.dimensions.contains_key(d))
    }

    /// Checks completeness and bounds of every value, including the
    /// encoding variation when present.
    pub fn validate(&self) -> CoreResult<()> {
        for dimension in Dimension::ALL {
            dimension.spec().check(self.require(dimension)?)?;
        }
        if let Some(encoding) = &self.encoding {
            encoding.validate()?;
        }
        Ok(())
    }

    /// Dimensions whose value differs from their neutral value.
    #[must_use]
    pub fn active(&self) -> Vec<(Dimension, f64)> {
        self.iter()
            .filter(|(d, v)| !d.spec().is_neutral(*v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_dimensions() {
        for dimension in Dimension::ALL {
            let spec = dimension.spec();
            assert_eq!(spec.name, dimension.name());
            assert!(spec.min <= spec.max, "{} has inverted bounds", spec.name);
        }
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("hue_shift".parse::<Dimension>().unwrap(), Dimension::HueShift);
        assert!("gamma".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_quantize_rounds_and_clamps() {
        let zoom = Dimension::ZoomFactor.spec();
        assert_eq!(zoom.quantize(1.0449), 1.04);
        assert_eq!(zoom.quantize(1.0851), 1.08);
        assert_eq!(zoom.quantize(1.0), 1.02);

        let hue = Dimension::HueShift.spec();
        assert_eq!(hue.quantize(-4.96), -5.0);
        assert_eq!(hue.quantize(2.34), 2.3);
    }

    #[test]
    fn test_check_rejects_out_of_range_and_nan() {
        let speed = Dimension::PlaybackSpeed.spec();
        assert!(speed.check(1.0).is_ok());
        assert!(matches!(
            speed.check(1.2),
            Err(CoreError::ParameterOutOfRange { .. })
        ));
        assert!(speed.check(f64::NAN).is_err());
    }

    #[test]
    fn test_missing_dimension_reported() {
        let set = ParameterSet::from_values([(Dimension::ZoomFactor, 1.05)]);
        assert!(!set.is_complete());
        assert!(matches!(
            set.require(Dimension::Volume),
            Err(CoreError::MissingDimension(Dimension::Volume))
        ));
    }

    #[test]
    fn test_unknown_dimension_rejected_on_deserialize() {
        let json = r#"{"dimensions": {"zoom_factor": 1.05, "gamma": 1.0}}"#;
        assert!(serde_json::from_str::<ParameterSet>(json).is_err());
    }

    #[test]
    fn test_serialized_keys_use_dimension_names() {
        let set = ParameterSet::from_values([
            (Dimension::ZoomFactor, 1.05),
            (Dimension::HueShift, -2.5),
        ]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"dimensions":{"zoom_factor":1.05,"hue_shift":-2.5}}"#);
    }

    #[test]
    fn test_encoding_variation_bounds() {
        let ok = EncodingVariation { bitrate_factor: 1.02, frame_blend: 0.1, crf: 21 };
        assert!(ok.validate().is_ok());
        let bad_crf = EncodingVariation { crf: 30, ..ok };
        assert!(bad_crf.validate().is_err());
    }
}
