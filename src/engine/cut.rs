//! Cut selection
//!
//! Picks a pizza from the remaining inventory and a cut (center plus angle)
//! for a customer pair. Two categories have a closed-form cut; three and four
//! use either a sector table keyed by the dominant category or a two-stage grid
//! search; anything else gets a neutral random cut. Every strategy reads the
//! category directions off the pizza, so permuted layouts cut the same way.
//!
//! Every cut is the tournament pizza cut: four lines 45° apart through the
//! center. With the center at distance R along the primary angle, the primary
//! line passes through the pizza center and the two neighbouring lines sit at
//! R/√2 from it. Once R/√2 clears the toppings, every topping lies in the two
//! slices either side of the primary line, and the first recipient receives
//! exactly the toppings to the right of it.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2, TAU};

use super::geometry::{compute_slice_areas, sanitize_cut};
use super::pizza::{CategoryCount, CutSpec, Pizza, PreferencePair};
use super::score::{check_target, l1_error};
use super::search::grid_minimize;
use crate::config::{CutStrategy, EngineConfig, PizzaSelection, SearchConfig};
use crate::consts::*;
use crate::error::EngineError;
use crate::polar_to_cartesian;

/// The pizza to cut and how to cut it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutChoice {
    pub pizza_id: usize,
    pub cut: CutSpec,
}

/// Smallest cut center distance whose side lines clear everything within `extent`
#[inline]
pub fn tangent_radius(extent: f64) -> f64 {
    SQRT_2 * (extent + PLACEMENT_BUFFER)
}

/// Pizza cut with its center `radius` out along `angle`
fn cut_at(angle: f64, radius: f64) -> CutSpec {
    let radius = radius.min(DISC_RADIUS - CUT_EDGE_BUFFER);
    CutSpec::pizza_cut(polar_to_cartesian(radius, angle), angle)
}

/// Primary angle per category that hands the first recipient the half-plane
/// centred on that category's toppings
pub fn sector_angles(pizza: &Pizza, categories: usize) -> Vec<f64> {
    (1..=categories)
        .map(|c| pizza.centroid_angle(c) + FRAC_PI_2)
        .collect()
}

/// Categories ordered from the innermost toppings outward (stable on ties),
/// split into the angle-stage pair and the radius-stage rest.
fn relevant_groups(pizza: &Pizza, categories: usize) -> (Vec<usize>, Vec<usize>) {
    let means = pizza.mean_radius_by_category(categories);
    let mut order: Vec<usize> = (1..=categories).collect();
    order.sort_by(|a, b| {
        means[a - 1]
            .partial_cmp(&means[b - 1])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let split = order.len().min(2);
    let inner = order[..split].to_vec();
    let outer = if order.len() > split {
        order[split..].to_vec()
    } else {
        order.clone()
    };
    (inner, outer)
}

/// Cut strategy and pizza selection, fixed for one category count
#[derive(Debug, Clone)]
pub struct CutSelector {
    count: CategoryCount,
    strategy: CutStrategy,
    selection: PizzaSelection,
    search: SearchConfig,
}

impl CutSelector {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            count: CategoryCount::new(config.categories)?,
            strategy: config.cut_strategy,
            selection: config.pizza_selection,
            search: config.search.clone(),
        })
    }

    #[inline]
    fn categories(&self) -> usize {
        self.count.get()
    }

    /// Choose a remaining pizza and a cut for `target`
    pub fn choose_cut<R: Rng + ?Sized>(
        &self,
        pizzas: &[Pizza],
        remaining_ids: &[usize],
        target: &PreferencePair,
        rng: &mut R,
    ) -> Result<CutChoice, EngineError> {
        check_target(target, self.categories())?;
        let first = *remaining_ids.first().ok_or(EngineError::NoRemainingPizza)?;
        if let Some(&bad) = remaining_ids.iter().find(|&&id| id >= pizzas.len()) {
            return Err(EngineError::UnknownPizza(bad));
        }

        if let CategoryCount::Other(k) = self.count {
            let angle = rng.random::<f64>() * PI;
            log::warn!("No cut strategy for {} categories, random angle {:.3}", k, angle);
            return Ok(CutChoice {
                pizza_id: first,
                cut: sanitize_cut(&CutSpec::pizza_cut(DVec2::ZERO, angle)),
            });
        }

        let choice = match self.selection {
            PizzaSelection::First => CutChoice {
                pizza_id: first,
                cut: self.cut_for(&pizzas[first], target),
            },
            PizzaSelection::BestScore => {
                let all: Vec<usize> = (1..=self.categories()).collect();
                let mut best: Option<(f64, CutChoice)> = None;
                for &id in remaining_ids {
                    let cut = self.cut_for(&pizzas[id], target);
                    let outcome = compute_slice_areas(&pizzas[id], &cut, self.categories());
                    let error = l1_error(&outcome.amounts, target, &all);
                    if best.as_ref().is_none_or(|(e, _)| error < *e) {
                        best = Some((error, CutChoice { pizza_id: id, cut }));
                    }
                }
                best.map(|(_, choice)| choice).ok_or(EngineError::NoRemainingPizza)?
            }
        };

        log::debug!(
            "Cut pizza {} at ({:.3}, {:.3}), angle {:.4}",
            choice.pizza_id,
            choice.cut.center.x,
            choice.cut.center.y,
            choice.cut.angle
        );
        Ok(choice)
    }

    /// Cut for one pizza, by category count and strategy
    fn cut_for(&self, pizza: &Pizza, target: &PreferencePair) -> CutSpec {
        let cut = match (self.count, self.strategy) {
            (CategoryCount::Two, _) => self.closed_form_cut(pizza, target),
            (_, CutStrategy::SectorTable) => self.sector_table_cut(pizza, target),
            (_, CutStrategy::GridSearch) => self.grid_search_cut(pizza, target),
        };
        sanitize_cut(&cut)
    }

    /// Two categories: category 1 fills the half turn starting a quarter turn
    /// before its centroid. Turning the primary line `desired / total · π` into
    /// that half hands the first recipient that share of category 1 and the
    /// matching share of category 2.
    fn closed_form_cut(&self, pizza: &Pizza, target: &PreferencePair) -> CutSpec {
        let start = pizza.centroid_angle(1) - FRAC_PI_2;
        let angle = start + target[0].amounts()[0] / PREFERENCE_TOTAL * PI;
        cut_at(angle, tangent_radius(pizza.extent()))
    }

    /// Three or four categories: the sector angle of the first recipient's dominant category
    fn sector_table_cut(&self, pizza: &Pizza, target: &PreferencePair) -> CutSpec {
        let dominant = target[0].dominant().unwrap_or(0);
        let angle = sector_angles(pizza, self.categories())
            .get(dominant)
            .copied()
            .unwrap_or(FRAC_PI_2);
        cut_at(angle, tangent_radius(pizza.extent()))
    }

    /// Sweep the angle at a fixed radius for the inner categories, then sweep
    /// the radius at that angle for the outer ones.
    fn two_stage_search(&self, pizza: &Pizza, target: &PreferencePair) -> CutSpec {
        let categories = self.categories();
        let (inner, outer) = relevant_groups(pizza, categories);
        let samples = self.search.samples;

        let error_at = |angle: f64, radius: f64, relevant: &[usize]| {
            let outcome = compute_slice_areas(pizza, &cut_at(angle, radius), categories);
            l1_error(&outcome.amounts, target, relevant)
        };

        let by_angle = grid_minimize(0.0, TAU, samples, |a| error_at(a, self.search.search_radius, &inner));

        let hi = DISC_RADIUS - self.search.radius_buffer;
        let lo = (tangent_radius(pizza.extent_of(&inner)) + self.search.radius_buffer).min(hi);
        let by_radius = grid_minimize(lo, hi, samples, |r| error_at(by_angle.x, r, &outer));

        log::debug!(
            "Grid search: angle {:.4} (error {:.4} on {:?}), radius {:.4} (error {:.4} on {:?})",
            by_angle.x,
            by_angle.value,
            inner,
            by_radius.x,
            by_radius.value,
            outer
        );
        cut_at(by_angle.x, by_radius.x)
    }

    /// Two-stage search result, or the even split (eight equal slices about
    /// the pizza center) when that scores better on all categories
    fn grid_search_cut(&self, pizza: &Pizza, target: &PreferencePair) -> CutSpec {
        let categories = self.categories();
        let all: Vec<usize> = (1..=categories).collect();
        let full_error = |cut: &CutSpec| l1_error(&compute_slice_areas(pizza, cut, categories).amounts, target, &all);

        let searched = self.two_stage_search(pizza, target);
        let even = cut_at(0.0, 0.0);
        if full_error(&even) < full_error(&searched) {
            log::debug!("Grid search lost to the even split");
            return even;
        }
        searched
    }
}

/// Choose a cut with the default strategy for `categories` toppings
pub fn choose_cut<R: Rng + ?Sized>(
    pizzas: &[Pizza],
    remaining_ids: &[usize],
    target: &PreferencePair,
    categories: usize,
    rng: &mut R,
) -> Result<CutChoice, EngineError> {
    CutSelector::new(&EngineConfig::for_categories(categories))?.choose_cut(pizzas, remaining_ids, target, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutStyle;
    use crate::engine::layout::PizzaLayout;
    use crate::engine::pizza::PreferenceVector;
    use crate::engine::preferences::generate_preferences;
    use crate::engine::score::score;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pair(a: &[f64], b: &[f64]) -> PreferencePair {
        [PreferenceVector::new(a.to_vec()), PreferenceVector::new(b.to_vec())]
    }

    fn inventory(config: &EngineConfig) -> Vec<Pizza> {
        let mut rng = Pcg32::seed_from_u64(11);
        PizzaLayout::new(config)
            .layout(config.categories, PIZZAS_PER_ROUND, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_two_categories_even_split_is_vertical() {
        let config = EngineConfig::for_categories(2);
        let pizzas = inventory(&config);
        let mut rng = Pcg32::seed_from_u64(0);
        let choice = CutSelector::new(&config)
            .unwrap()
            .choose_cut(&pizzas, &[3, 4], &pair(&[6.0, 6.0], &[6.0, 6.0]), &mut rng)
            .unwrap();
        assert_eq!(choice.pizza_id, 3);
        assert!((choice.cut.angle - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(choice.cut.extra_angles.len(), 3);
    }

    #[test]
    fn test_two_categories_nine_three_favours_category_one() {
        for layout in [LayoutStyle::MultiRing, LayoutStyle::SingleRing] {
            for permute in [false, true] {
                let config = EngineConfig {
                    layout,
                    permute_categories: permute,
                    ..EngineConfig::for_categories(2)
                };
                let pizzas = inventory(&config);
                let target = pair(&[9.0, 3.0], &[3.0, 9.0]);
                let selector = CutSelector::new(&config).unwrap();
                let mut rng = Pcg32::seed_from_u64(0);
                // Pizza 1 has the categories swapped when permuting
                for id in [0, 1] {
                    let choice = selector.choose_cut(&pizzas, &[id], &target, &mut rng).unwrap();
                    let outcome = compute_slice_areas(&pizzas[id], &choice.cut, 2);
                    let achieved = outcome.amount(0, 1);
                    assert!(
                        (achieved - 9.0).abs() < (achieved - 3.0).abs(),
                        "{layout:?} permute {permute} pizza {id}: {achieved}"
                    );
                    assert!(choice.cut.center.length() <= DISC_RADIUS - CUT_EDGE_BUFFER + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_closed_form_matches_target_on_multi_ring() {
        let config = EngineConfig::for_categories(2);
        let pizzas = inventory(&config);
        let target = pair(&[9.0, 3.0], &[3.0, 9.0]);
        let mut rng = Pcg32::seed_from_u64(0);
        let choice = CutSelector::new(&config)
            .unwrap()
            .choose_cut(&pizzas, &[0], &target, &mut rng)
            .unwrap();
        let report = score(&pizzas[0], &choice.cut, &target, 2).unwrap();
        assert!(report.total_error < 0.05, "error {}", report.total_error);
        assert!(report.improvement > 0.0);
    }

    #[test]
    fn test_sector_table_favours_dominant_category() {
        for layout in [LayoutStyle::MultiRing, LayoutStyle::SingleRing] {
            for permute in [false, true] {
                for categories in [3, 4] {
                    let config = EngineConfig {
                        cut_strategy: CutStrategy::SectorTable,
                        layout,
                        permute_categories: permute,
                        ..EngineConfig::for_categories(categories)
                    };
                    let pizzas = inventory(&config);
                    let selector = CutSelector::new(&config).unwrap();
                    let mut rng = Pcg32::seed_from_u64(0);
                    let even_share = PREFERENCE_TOTAL / categories as f64;
                    for dominant in 0..categories {
                        let mut amounts = vec![1.0; categories];
                        amounts[dominant] = PREFERENCE_TOTAL - (categories - 1) as f64;
                        let target = [PreferenceVector::new(amounts), PreferenceVector::uniform(categories)];
                        for id in 0..categories {
                            let choice = selector.choose_cut(&pizzas, &[id], &target, &mut rng).unwrap();
                            let outcome = compute_slice_areas(&pizzas[id], &choice.cut, categories);
                            assert!(
                                outcome.amounts[0][dominant] > even_share,
                                "{layout:?} permute {permute} K={categories} pizza {id} dominant {dominant}: {:?}",
                                outcome.amounts[0]
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_sector_table_ties_go_to_first_category() {
        let config = EngineConfig {
            cut_strategy: CutStrategy::SectorTable,
            ..EngineConfig::for_categories(4)
        };
        let pizzas = inventory(&config);
        let mut rng = Pcg32::seed_from_u64(0);
        let tied = pair(&[5.0, 5.0, 1.0, 1.0], &[3.0, 3.0, 3.0, 3.0]);
        let choice = CutSelector::new(&config)
            .unwrap()
            .choose_cut(&pizzas, &[0], &tied, &mut rng)
            .unwrap();
        // Category 1 fills the upper rings, so its sector angle points left
        assert!((choice.cut.angle - sector_angles(&pizzas[0], 4)[0]).abs() < 1e-9);
        assert!((choice.cut.angle - PI).abs() < 1e-9);
    }

    #[test]
    fn test_two_stage_angle_is_best_on_grid() {
        for categories in [3, 4] {
            let config = EngineConfig {
                search: SearchConfig {
                    samples: 60,
                    ..SearchConfig::default()
                },
                ..EngineConfig::for_categories(categories)
            };
            let pizza = &inventory(&config)[2];
            let mut amounts = vec![1.0; categories];
            amounts[0] = 12.0 - (categories - 1) as f64;
            let target = [PreferenceVector::new(amounts), PreferenceVector::uniform(categories)];
            let cut = CutSelector::new(&config).unwrap().two_stage_search(pizza, &target);

            let (inner, _) = relevant_groups(pizza, categories);
            let inner_error = |angle: f64| {
                let outcome = compute_slice_areas(pizza, &cut_at(angle, config.search.search_radius), categories);
                l1_error(&outcome.amounts, &target, &inner)
            };
            let chosen = inner_error(cut.angle);
            for angle in crate::engine::search::linspace(0.0, TAU, config.search.samples) {
                assert!(chosen <= inner_error(angle) + 1e-9, "{categories}: {angle}");
            }

            let hi = DISC_RADIUS - config.search.radius_buffer;
            let lo = tangent_radius(pizza.extent_of(&inner)) + config.search.radius_buffer;
            let r = cut.center.length();
            assert!(r >= lo - 1e-9 && r <= hi + 1e-9, "{categories}: radius {r}");
        }
    }

    #[test]
    fn test_grid_search_never_worse_than_even_split() {
        for categories in [3, 4] {
            let config = EngineConfig {
                search: SearchConfig {
                    samples: 40,
                    ..SearchConfig::default()
                },
                ..EngineConfig::for_categories(categories)
            };
            let pizzas = inventory(&config);
            let selector = CutSelector::new(&config).unwrap();
            let mut rng = Pcg32::seed_from_u64(3);
            let even = sanitize_cut(&cut_at(0.0, 0.0));
            for target in generate_preferences(5, categories, &mut rng).unwrap() {
                let choice = selector.choose_cut(&pizzas, &[0], &target, &mut rng).unwrap();
                let chosen = score(&pizzas[0], &choice.cut, &target, categories).unwrap();
                let baseline = score(&pizzas[0], &even, &target, categories).unwrap();
                assert!(chosen.total_error <= baseline.total_error + 1e-9);
            }
        }
    }

    #[test]
    fn test_choose_cut_is_idempotent() {
        for categories in [2, 3, 4, 5] {
            let config = EngineConfig {
                search: SearchConfig {
                    samples: 30,
                    ..SearchConfig::default()
                },
                ..EngineConfig::for_categories(categories)
            };
            let pizzas = inventory(&config);
            let target = [PreferenceVector::uniform(categories), PreferenceVector::uniform(categories)];
            let selector = CutSelector::new(&config).unwrap();
            let mut a = Pcg32::seed_from_u64(99);
            let mut b = Pcg32::seed_from_u64(99);
            assert_eq!(
                selector.choose_cut(&pizzas, &[1, 2], &target, &mut a).unwrap(),
                selector.choose_cut(&pizzas, &[1, 2], &target, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_fallback_uses_first_remaining_and_neutral_center() {
        let config = EngineConfig::for_categories(6);
        let pizzas = inventory(&config);
        let target = [PreferenceVector::uniform(6), PreferenceVector::uniform(6)];
        let mut rng = Pcg32::seed_from_u64(4);
        let choice = CutSelector::new(&config)
            .unwrap()
            .choose_cut(&pizzas, &[7, 1], &target, &mut rng)
            .unwrap();
        assert_eq!(choice.pizza_id, 7);
        assert_eq!(choice.cut.center, DVec2::ZERO);
        assert!(choice.cut.angle > 0.0 && choice.cut.angle < PI);
    }

    #[test]
    fn test_best_score_picks_lowest_error() {
        let base = EngineConfig::for_categories(3);
        let config = EngineConfig {
            pizza_selection: PizzaSelection::BestScore,
            permute_categories: true,
            search: SearchConfig {
                samples: 30,
                ..SearchConfig::default()
            },
            ..base
        };
        let pizzas = inventory(&config);
        let target = pair(&[1.0, 1.0, 10.0], &[4.0, 4.0, 4.0]);
        let selector = CutSelector::new(&config).unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        let choice = selector.choose_cut(&pizzas, &[0, 1, 2], &target, &mut rng).unwrap();
        assert!([0, 1, 2].contains(&choice.pizza_id));

        let chosen = score(&pizzas[choice.pizza_id], &choice.cut, &target, 3).unwrap();
        let first_only = CutSelector::new(&EngineConfig {
            pizza_selection: PizzaSelection::First,
            ..config.clone()
        })
        .unwrap()
        .choose_cut(&pizzas, &[0, 1, 2], &target, &mut rng)
        .unwrap();
        let first = score(&pizzas[0], &first_only.cut, &target, 3).unwrap();
        assert!(chosen.total_error <= first.total_error + 1e-12);
    }

    #[test]
    fn test_bad_inputs() {
        let config = EngineConfig::for_categories(2);
        let pizzas = inventory(&config);
        let selector = CutSelector::new(&config).unwrap();
        let target = pair(&[6.0, 6.0], &[6.0, 6.0]);
        let mut rng = Pcg32::seed_from_u64(0);

        assert!(matches!(
            selector.choose_cut(&pizzas, &[], &target, &mut rng),
            Err(EngineError::NoRemainingPizza)
        ));
        assert!(matches!(
            selector.choose_cut(&pizzas, &[0, 42], &target, &mut rng),
            Err(EngineError::UnknownPizza(42))
        ));
        assert!(matches!(
            selector.choose_cut(&pizzas, &[0], &pair(&[12.0], &[12.0]), &mut rng),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            choose_cut(&pizzas, &[0], &target, 0, &mut rng),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_relevant_groups_inner_first() {
        let config = EngineConfig::for_categories(4);
        let pizzas = inventory(&config);
        let (inner, outer) = relevant_groups(&pizzas[0], 4);
        assert_eq!(inner, vec![1, 2]);
        assert_eq!(outer, vec![3, 4]);

        let (inner, outer) = relevant_groups(&inventory(&EngineConfig::for_categories(2))[0], 2);
        assert_eq!(inner, vec![1, 2]);
        assert_eq!(outer, vec![1, 2]);
    }
}
