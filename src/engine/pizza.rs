//! Pizza data model
//!
//! Toppings, pizzas, preference vectors and cut specifications. Positions are
//! in disc units relative to the pizza center (radius 6).

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

use crate::cartesian_to_polar;
use crate::consts::*;
use crate::error::EngineError;

/// Supported category counts, each with its own layout and cut strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryCount {
    Two,
    Three,
    Four,
    /// Any other positive count, handled by the random/fallback strategies
    Other(usize),
}

impl CategoryCount {
    pub fn new(categories: usize) -> Result<Self, EngineError> {
        match categories {
            0 => Err(EngineError::invalid("category count must be positive")),
            2 => Ok(CategoryCount::Two),
            3 => Ok(CategoryCount::Three),
            4 => Ok(CategoryCount::Four),
            k => Ok(CategoryCount::Other(k)),
        }
    }

    #[inline]
    pub fn get(&self) -> usize {
        match self {
            CategoryCount::Two => 2,
            CategoryCount::Three => 3,
            CategoryCount::Four => 4,
            CategoryCount::Other(k) => *k,
        }
    }
}

/// A single topping: center position and 1-based category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToppingItem {
    pub pos: DVec2,
    pub category: usize,
}

impl ToppingItem {
    pub fn new(x: f64, y: f64, category: usize) -> Self {
        Self {
            pos: DVec2::new(x, y),
            category,
        }
    }

    /// Outermost distance of the footprint from the pizza center
    #[inline]
    pub fn extent(&self) -> f64 {
        self.pos.length() + ITEM_RADIUS
    }
}

/// True when a topping at `pos` would overlap any of `placed`
pub fn clash_exists(pos: DVec2, placed: &[ToppingItem]) -> bool {
    placed
        .iter()
        .any(|item| item.pos.distance(pos) < MIN_CLASH_DISTANCE)
}

/// Exactly 24 non-overlapping toppings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pizza {
    items: Vec<ToppingItem>,
}

impl Pizza {
    /// Validate and wrap a topping list
    pub fn new(items: Vec<ToppingItem>, categories: usize) -> Result<Self, EngineError> {
        if items.len() != TOPPINGS_PER_PIZZA {
            return Err(EngineError::Layout {
                placed: items.len(),
                required: TOPPINGS_PER_PIZZA,
                attempts: 0,
            });
        }
        for (i, item) in items.iter().enumerate() {
            if item.category == 0 || item.category > categories {
                return Err(EngineError::invalid(format!(
                    "topping {} has category {} outside [1, {}]",
                    i, item.category, categories
                )));
            }
            if !item.pos.is_finite() || item.extent() > DISC_RADIUS {
                return Err(EngineError::invalid(format!(
                    "topping {} at ({:.3}, {:.3}) is not on the pizza",
                    i, item.pos.x, item.pos.y
                )));
            }
            if clash_exists(item.pos, &items[..i]) {
                return Err(EngineError::Layout {
                    placed: i,
                    required: TOPPINGS_PER_PIZZA,
                    attempts: 0,
                });
            }
        }
        Ok(Self { items })
    }

    #[inline]
    pub fn items(&self) -> &[ToppingItem] {
        &self.items
    }

    /// Largest center distance of any topping edge
    pub fn extent(&self) -> f64 {
        self.items.iter().map(ToppingItem::extent).fold(0.0, f64::max)
    }

    /// Largest topping edge distance among the given 1-based categories
    pub fn extent_of(&self, categories: &[usize]) -> f64 {
        self.items
            .iter()
            .filter(|item| categories.contains(&item.category))
            .map(ToppingItem::extent)
            .fold(0.0, f64::max)
    }

    /// Mean center distance of each category's toppings (index 0 = category 1)
    pub fn mean_radius_by_category(&self, categories: usize) -> Vec<f64> {
        let mut sums = vec![0.0; categories];
        let mut counts = vec![0usize; categories];
        for item in &self.items {
            if let Some(idx) = item.category.checked_sub(1).filter(|&i| i < categories) {
                sums[idx] += item.pos.length();
                counts[idx] += 1;
            }
        }
        sums.iter()
            .zip(&counts)
            .map(|(&s, &n)| if n == 0 { f64::INFINITY } else { s / n as f64 })
            .collect()
    }

    /// Polar angle of a category's centroid; 0 when it has no toppings
    /// or they balance around the center
    pub fn centroid_angle(&self, category: usize) -> f64 {
        let sum: DVec2 = self
            .items
            .iter()
            .filter(|item| item.category == category)
            .map(|item| item.pos)
            .sum();
        cartesian_to_polar(sum).1
    }
}

/// One customer's desired amounts per category, summing to 12
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceVector(Vec<f64>);

impl PreferenceVector {
    /// Wrap raw amounts without renormalizing
    pub fn new(amounts: Vec<f64>) -> Self {
        Self(amounts)
    }

    /// Perfectly even split of the total
    pub fn uniform(categories: usize) -> Self {
        Self(vec![PREFERENCE_TOTAL / categories as f64; categories])
    }

    /// Rescale non-negative weights so they sum to the preference total.
    /// Returns None when the weights are malformed (NaN, negative, or all zero).
    pub fn from_weights(weights: Vec<f64>) -> Option<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return None;
        }
        Some(Self(weights.iter().map(|w| PREFERENCE_TOTAL * w / sum).collect()))
    }

    #[inline]
    pub fn amounts(&self) -> &[f64] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Index of the largest amount; ties go to the lowest index
    pub fn dominant(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in self.0.iter().enumerate() {
            if best.is_none_or(|(_, b)| v > b) {
                best = Some((i, v));
            }
        }
        best.map(|(i, _)| i)
    }

    /// All amounts equal
    pub fn is_uniform(&self) -> bool {
        self.0.windows(2).all(|w| w[0] == w[1])
    }
}

/// Preferences for the two recipients sharing one pizza
pub type PreferencePair = [PreferenceVector; 2];

/// Cut lines through a common center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSpec {
    pub center: DVec2,
    /// Primary line angle; slice 0 starts on this ray
    pub angle: f64,
    /// Further line angles through the same center
    pub extra_angles: Vec<f64>,
}

impl CutSpec {
    /// A single straight line
    pub fn new(center: DVec2, angle: f64) -> Self {
        Self {
            center,
            angle,
            extra_angles: Vec::new(),
        }
    }

    /// The tournament cut: four lines 45° apart, eight slices
    pub fn pizza_cut(center: DVec2, angle: f64) -> Self {
        Self {
            center,
            angle,
            extra_angles: (1..4).map(|k| angle + k as f64 * FRAC_PI_4).collect(),
        }
    }

    pub fn with_extra_angles(mut self, angles: Vec<f64>) -> Self {
        self.extra_angles = angles;
        self
    }

    /// Primary angle followed by the extra angles
    pub fn line_angles(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.angle).chain(self.extra_angles.iter().copied())
    }
}
