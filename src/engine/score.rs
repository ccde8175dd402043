//! Cut scoring against a customer pair
//!
//! Per category, C = |achieved - desired| and B = |desired - uniform|. The
//! aggregate error is ΣC; the improvement over handing out an even split is ΣB - ΣC.

use serde::{Deserialize, Serialize};

use super::geometry::compute_slice_areas;
use super::pizza::{CutSpec, Pizza, PreferencePair, PreferenceVector};
use crate::error::EngineError;

/// Error breakdown of one cut
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Amounts each half actually received
    pub achieved: [Vec<f64>; 2],
    /// C: per half and category, |achieved - desired|
    pub errors: [Vec<f64>; 2],
    /// ΣC
    pub total_error: f64,
    /// B: per half and category, |desired - uniform|
    pub baseline_errors: [Vec<f64>; 2],
    /// ΣB
    pub baseline: f64,
    /// ΣB - ΣC; positive when the cut beats an even split
    pub improvement: f64,
}

/// Both halves must have one amount per category
pub fn check_target(target: &PreferencePair, categories: usize) -> Result<(), EngineError> {
    for (half, prefs) in target.iter().enumerate() {
        if prefs.len() != categories {
            return Err(EngineError::invalid(format!(
                "preference for half {} has {} amounts, expected {}",
                half,
                prefs.len(),
                categories
            )));
        }
    }
    Ok(())
}

/// L1 distance over the given 1-based categories, both halves
pub fn l1_error(amounts: &[Vec<f64>; 2], target: &PreferencePair, relevant: &[usize]) -> f64 {
    amounts
        .iter()
        .zip(target)
        .map(|(got, want)| {
            relevant
                .iter()
                .map(|&c| (got[c - 1] - want.amounts()[c - 1]).abs())
                .sum::<f64>()
        })
        .sum()
}

fn abs_diff(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).collect()
}

/// Apply `cut` to `pizza` and compare with `target`
pub fn score(
    pizza: &Pizza,
    cut: &CutSpec,
    target: &PreferencePair,
    categories: usize,
) -> Result<ScoreReport, EngineError> {
    if categories == 0 {
        return Err(EngineError::invalid("category count must be positive"));
    }
    check_target(target, categories)?;
    if let Some(item) = pizza.items().iter().find(|item| item.category > categories) {
        return Err(EngineError::invalid(format!(
            "pizza has a category {} topping, scored with {} categories",
            item.category, categories
        )));
    }

    let outcome = compute_slice_areas(pizza, cut, categories);
    let uniform = PreferenceVector::uniform(categories);

    let errors = [0, 1].map(|h| abs_diff(&outcome.amounts[h], target[h].amounts()));
    let baseline_errors = [0, 1].map(|h| abs_diff(target[h].amounts(), uniform.amounts()));
    let total_error: f64 = errors.iter().flatten().sum();
    let baseline: f64 = baseline_errors.iter().flatten().sum();

    Ok(ScoreReport {
        achieved: outcome.amounts,
        errors,
        total_error,
        baseline_errors,
        baseline,
        improvement: baseline - total_error,
    })
}
