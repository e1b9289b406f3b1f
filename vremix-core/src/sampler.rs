//! Parameter sampling.
//!
//! The sampler is a pure function of its random source: it never reads the
//! clock or the filesystem, so seeding the source replays a ParameterSet
//! exactly.

use crate::error::{CoreError, CoreResult};
use crate::params::{
    BITRATE_FACTOR_SPEC, CRF_SPEC, Dimension, EncodingVariation, FRAME_BLEND_SPEC, ParameterSet,
    TransformationSpec,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Options controlling which optional parts of a ParameterSet are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerOptions {
    /// Draw an [`EncodingVariation`] alongside the filter dimensions
    pub encoding_variation: bool,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            encoding_variation: true,
        }
    }
}

/// Draws ParameterSets from an injected random source.
#[derive(Debug, Clone)]
pub struct ParameterSampler<R> {
    rng: R,
    options: SamplerOptions,
}

impl ParameterSampler<StdRng> {
    /// Deterministic sampler; the same seed always yields the same sets.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Sampler seeded from the operating system's entropy.
    pub fn from_entropy() -> CoreResult<Self> {
        StdRng::from_rng(rand::thread_rng())
            .map(Self::new)
            .map_err(|e| CoreError::Sampling(e.to_string()))
    }
}

impl<R: Rng> ParameterSampler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            options: SamplerOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SamplerOptions) -> Self {
        self.options = options;
        self
    }

    /// Draws one value per dimension, in table order.
    pub fn sample(&mut self) -> ParameterSet {
        let values: Vec<(Dimension, f64)> = Dimension::ALL
            .into_iter()
            .map(|dimension| (dimension, draw(&mut self.rng, dimension.spec())))
            .collect();

        let encoding = self.options.encoding_variation.then(|| EncodingVariation {
            bitrate_factor: draw(&mut self.rng, &BITRATE_FACTOR_SPEC),
            frame_blend: draw(&mut self.rng, &FRAME_BLEND_SPEC),
            crf: self.rng.gen_range(CRF_SPEC.min as u8..=CRF_SPEC.max as u8),
        });

        ParameterSet::from_values(values).with_encoding(encoding)
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, spec: &TransformationSpec) -> f64 {
    spec.quantize(rng.gen_range(spec.min..=spec.max))
}
