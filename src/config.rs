//! Strategy configuration
//!
//! Selects the preference model, layout style and cut strategy a player uses.
//! Loaded from JSON by the orchestrator; every field has a tournament default.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Statistical model for customer preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PreferenceModel {
    /// Per-category normal draws around a per-customer biased mean, clipped and rescaled
    #[default]
    TruncatedNormal,
    /// Recursive stick breaking over the remaining budget, shuffled
    StickBreaking,
    /// One normal for all categories, negatives clipped, then normalized
    ClippedNormal,
}

impl PreferenceModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceModel::TruncatedNormal => "TruncatedNormal",
            PreferenceModel::StickBreaking => "StickBreaking",
            PreferenceModel::ClippedNormal => "ClippedNormal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "truncatednormal" | "truncated" => Some(PreferenceModel::TruncatedNormal),
            "stickbreaking" | "stick" => Some(PreferenceModel::StickBreaking),
            "clippednormal" | "clipped" => Some(PreferenceModel::ClippedNormal),
            _ => None,
        }
    }
}

/// Topping placement pattern for 2-4 categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayoutStyle {
    /// All 24 items on one ring, categories in equal angular sectors
    SingleRing,
    /// Tangent inner rings plus an outer arc per category group
    #[default]
    MultiRing,
}

impl LayoutStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutStyle::SingleRing => "SingleRing",
            LayoutStyle::MultiRing => "MultiRing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "singlering" | "single" => Some(LayoutStyle::SingleRing),
            "multiring" | "multi" => Some(LayoutStyle::MultiRing),
            _ => None,
        }
    }
}

/// Cut strategy for 3 and 4 categories (2 is always closed form)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CutStrategy {
    /// Fixed angle/offset per dominant category
    SectorTable,
    /// Two-stage grid search: angle, then radius
    #[default]
    GridSearch,
}

impl CutStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CutStrategy::SectorTable => "SectorTable",
            CutStrategy::GridSearch => "GridSearch",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sectortable" | "table" => Some(CutStrategy::SectorTable),
            "gridsearch" | "grid" => Some(CutStrategy::GridSearch),
            _ => None,
        }
    }
}

/// Which remaining pizza a cut is made on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PizzaSelection {
    /// Always the first remaining id
    #[default]
    First,
    /// Run the strategy on every remaining pizza and keep the lowest error
    BestScore,
}

/// Grid search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Samples per 1-D sweep
    pub samples: usize,
    /// Cut center distance held fixed while sweeping the angle
    pub search_radius: f64,
    /// Margin kept from the tangent radius and from the disc edge when sweeping radius
    pub radius_buffer: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            search_radius: 5.0,
            radius_buffer: 0.4,
        }
    }
}

/// Normal distribution parameters for the clipped-normal model
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

/// Full player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of topping categories (K)
    pub categories: usize,
    /// Seed for the player's default random source
    pub seed: u64,

    // === Preferences ===
    pub preference_model: PreferenceModel,
    /// Std dev of the truncated-normal per-category draw
    pub truncated_std_dev: f64,
    /// Clipped-normal distribution
    pub clipped_normal: NormalParams,
    /// Probability a customer is replaced by the perfectly uniform vector
    pub uniform_probability: f64,

    // === Layout ===
    pub layout: LayoutStyle,
    /// Relabel categories with a different permutation per pizza
    pub permute_categories: bool,

    // === Cutting ===
    pub cut_strategy: CutStrategy,
    pub pizza_selection: PizzaSelection,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            categories: 2,
            seed: 0,

            preference_model: PreferenceModel::TruncatedNormal,
            truncated_std_dev: 1.0,
            clipped_normal: NormalParams {
                mean: 0.8,
                std_dev: 2.0,
            },
            uniform_probability: 0.0,

            layout: LayoutStyle::MultiRing,
            permute_categories: false,

            cut_strategy: CutStrategy::GridSearch,
            pizza_selection: PizzaSelection::First,
            search: SearchConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default config for `categories` toppings
    pub fn for_categories(categories: usize) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded config: {} categories, {} preferences, {} layout, {} cuts",
            config.categories,
            config.preference_model.as_str(),
            config.layout.as_str(),
            config.cut_strategy.as_str()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject parameters no strategy can work with
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.categories == 0 {
            return Err(EngineError::invalid("at least one topping category is required"));
        }
        if !(0.0..=1.0).contains(&self.uniform_probability) {
            return Err(EngineError::invalid(format!(
                "uniform_probability {} is outside [0, 1]",
                self.uniform_probability
            )));
        }
        if !(self.truncated_std_dev.is_finite() && self.truncated_std_dev > 0.0) {
            return Err(EngineError::invalid("truncated_std_dev must be positive"));
        }
        if !(self.clipped_normal.std_dev.is_finite() && self.clipped_normal.std_dev > 0.0) {
            return Err(EngineError::invalid("clipped_normal.std_dev must be positive"));
        }
        if self.search.samples == 0 {
            return Err(EngineError::invalid("search.samples must be at least 1"));
        }
        if !(self.search.search_radius.is_finite() && self.search.search_radius >= 0.0) {
            return Err(EngineError::invalid("search.search_radius must be non-negative"));
        }
        if !(self.search.radius_buffer.is_finite() && self.search.radius_buffer >= 0.0) {
            return Err(EngineError::invalid("search.radius_buffer must be non-negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::default().search.samples, 100);
    }

    #[test]
    fn test_zero_categories_rejected() {
        let config = EngineConfig::for_categories(0);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_json_round_trip_with_partial_fields() {
        let config = EngineConfig::from_json(
            r#"{"categories": 4, "cut_strategy": "SectorTable", "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(config.categories, 4);
        assert_eq!(config.cut_strategy, CutStrategy::SectorTable);
        assert_eq!(config.layout, LayoutStyle::MultiRing);

        let json = config.to_json().unwrap();
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(back.seed, 7);
    }

    #[test]
    fn test_bad_probability_rejected() {
        let err = EngineConfig::from_json(r#"{"uniform_probability": 1.5}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(PreferenceModel::from_str("stick"), Some(PreferenceModel::StickBreaking));
        assert_eq!(LayoutStyle::from_str("SINGLE"), Some(LayoutStyle::SingleRing));
        assert_eq!(CutStrategy::from_str("grid"), Some(CutStrategy::GridSearch));
        assert_eq!(CutStrategy::from_str("nope"), None);
        assert_eq!(PreferenceModel::ClippedNormal.as_str(), "ClippedNormal");
    }
}
