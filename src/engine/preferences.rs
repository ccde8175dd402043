//! Customer preference generation
//!
//! Every model produces vectors of K non-negative amounts summing to the
//! preference total. Draws come from an explicit random source; the generator
//! keeps its own seeded source for callers that don't pass one.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg32;

use super::pizza::{PreferencePair, PreferenceVector};
use crate::config::{EngineConfig, NormalParams, PreferenceModel};
use crate::consts::*;
use crate::error::EngineError;

/// Bias range for the truncated-normal model (inclusive)
const OFFSET_RANGE: std::ops::RangeInclusive<i32> = -6..=6;
/// Clip margin from 0 and from the total in the truncated-normal model
const CLIP_MARGIN: f64 = 0.1;
/// Resample budget for degenerate draws before falling back to uniform
const MAX_RESAMPLES: usize = 64;

/// Preference sampler with a fixed model and category count
#[derive(Debug, Clone)]
pub struct PreferenceSampler {
    model: PreferenceModel,
    categories: usize,
    truncated_std_dev: f64,
    clipped_normal: NormalParams,
    uniform_probability: f64,
}

impl PreferenceSampler {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            model: config.preference_model,
            categories: config.categories,
            truncated_std_dev: config.truncated_std_dev,
            clipped_normal: config.clipped_normal,
            uniform_probability: config.uniform_probability,
        })
    }

    #[inline]
    pub fn categories(&self) -> usize {
        self.categories
    }

    /// Draw `count` customer pairs
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<PreferencePair>, EngineError> {
        (0..count).map(|_| self.sample_pair(rng)).collect()
    }

    /// Draw one customer pair, applying the uniform override
    pub fn sample_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PreferencePair, EngineError> {
        let pair = match self.model {
            PreferenceModel::TruncatedNormal => {
                let offset = rng.random_range(OFFSET_RANGE);
                [
                    self.truncated_normal(offset, rng)?,
                    self.truncated_normal(offset, rng)?,
                ]
            }
            PreferenceModel::StickBreaking => [self.stick_breaking(rng), self.stick_breaking(rng)],
            PreferenceModel::ClippedNormal => {
                let prefs = self.clipped_normal(rng)?;
                [prefs.clone(), prefs]
            }
        };

        // Always consume the override draw so streams line up across settings
        let roll: f64 = rng.random();
        if roll < self.uniform_probability {
            let uniform = PreferenceVector::uniform(self.categories);
            return Ok([uniform.clone(), uniform]);
        }
        Ok(pair)
    }

    /// Per-category normal around `total/(2K) - offset`, clipped, NaN resampled, rescaled
    fn truncated_normal<R: Rng + ?Sized>(&self, offset: i32, rng: &mut R) -> Result<PreferenceVector, EngineError> {
        let mean = PREFERENCE_TOTAL / (2.0 * self.categories as f64) - offset as f64;
        let normal = Normal::new(mean, self.truncated_std_dev)
            .map_err(|e| EngineError::invalid(format!("truncated normal: {e}")))?;

        let weights = (0..self.categories)
            .map(|_| {
                let mut item = f64::NAN;
                for _ in 0..MAX_RESAMPLES {
                    item = normal.sample(rng);
                    if !item.is_nan() {
                        break;
                    }
                }
                if item.is_nan() {
                    item = mean;
                }
                item.clamp(CLIP_MARGIN, PREFERENCE_TOTAL - CLIP_MARGIN)
            })
            .collect();

        // Clipped weights are strictly positive, so normalizing can't fail
        Ok(PreferenceVector::from_weights(weights).unwrap_or_else(|| PreferenceVector::uniform(self.categories)))
    }

    /// Break off a uniform fraction of what remains for each category but the last
    fn stick_breaking<R: Rng + ?Sized>(&self, rng: &mut R) -> PreferenceVector {
        let mut amounts = Vec::with_capacity(self.categories);
        let mut remaining = PREFERENCE_TOTAL;
        for _ in 1..self.categories {
            let p: f64 = rng.random();
            amounts.push(remaining * p);
            remaining *= 1.0 - p;
        }
        amounts.push(remaining);
        amounts.shuffle(rng);
        PreferenceVector::new(amounts)
    }

    /// All categories from one normal, negatives clipped, normalized; all-zero draws resampled
    fn clipped_normal<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PreferenceVector, EngineError> {
        let normal = Normal::new(self.clipped_normal.mean, self.clipped_normal.std_dev)
            .map_err(|e| EngineError::invalid(format!("clipped normal: {e}")))?;

        for _ in 0..MAX_RESAMPLES {
            let weights: Vec<f64> = (0..self.categories)
                .map(|_| normal.sample(rng))
                .map(|w: f64| if w.is_nan() { 0.0 } else { w.max(0.0) })
                .collect();
            if let Some(prefs) = PreferenceVector::from_weights(weights) {
                return Ok(prefs);
            }
        }

        log::warn!(
            "Clipped normal drew {} degenerate vectors in a row, using uniform preferences",
            MAX_RESAMPLES
        );
        Ok(PreferenceVector::uniform(self.categories))
    }
}

/// Stateful generator: a sampler plus its own default random source
#[derive(Debug, Clone)]
pub struct PreferenceGenerator {
    sampler: PreferenceSampler,
    rng: Pcg32,
}

impl PreferenceGenerator {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            sampler: PreferenceSampler::new(config)?,
            rng: Pcg32::seed_from_u64(config.seed),
        })
    }

    /// Generate `count` pairs from `rng`, or from the held source (advancing it)
    pub fn generate(&mut self, count: usize, rng: Option<&mut dyn RngCore>) -> Result<Vec<PreferencePair>, EngineError> {
        let prefs = match rng {
            Some(rng) => self.sampler.sample(count, rng)?,
            None => self.sampler.sample(count, &mut self.rng)?,
        };
        log::debug!(
            "Generated {} preference pairs ({:?}, {} categories)",
            prefs.len(),
            self.sampler.model,
            self.sampler.categories()
        );
        Ok(prefs)
    }
}

/// Generate `count` pairs for `categories` toppings with the default model
pub fn generate_preferences<R: Rng + ?Sized>(
    count: usize,
    categories: usize,
    rng: &mut R,
) -> Result<Vec<PreferencePair>, EngineError> {
    PreferenceSampler::new(&EngineConfig::for_categories(categories))?.sample(count, rng)
}

/// Per category, how many vectors want more than an even share of it.
/// Exactly uniform vectors carry no signal and are skipped.
pub fn dominance_tally(preferences: &[PreferencePair], categories: usize) -> Vec<usize> {
    let mut tally = vec![0; categories];
    if categories == 0 {
        return tally;
    }
    let even_share = PREFERENCE_TOTAL / categories as f64;
    for prefs in preferences.iter().flatten() {
        if prefs.is_uniform() {
            continue;
        }
        for (count, &amount) in tally.iter_mut().zip(prefs.amounts()) {
            if amount > even_share {
                *count += 1;
            }
        }
    }
    tally
}
