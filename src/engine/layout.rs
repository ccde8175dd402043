//! Topping layout strategies
//!
//! Places 24 toppings per pizza. Two, three and four categories get a fixed
//! geometric pattern (one ring with angular sectors, or tangent inner rings
//! plus an outer arc); any other count falls back to random placement. Every
//! candidate goes through the clash test before it is accepted.

use rand::Rng;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use super::pizza::{CategoryCount, Pizza, ToppingItem, clash_exists};
use crate::config::{EngineConfig, LayoutStyle};
use crate::consts::*;
use crate::error::EngineError;
use crate::polar_to_cartesian;

/// Radius of the single-ring pattern
pub const SINGLE_RING_RADIUS: f64 = 3.0;
/// Outward step tried after a clash on a ring
const CLASH_RADIUS_STEP: f64 = 0.05;
/// Ring retries per item before the layout is abandoned
const MAX_RING_RETRIES: usize = 64;
/// Random draws per item before the layout is abandoned
const MAX_RANDOM_ATTEMPTS: usize = 10_000;

/// Four-category outer ring sits at least here so it clears the inner pairs
const FOUR_OUTER_MIN_RADIUS: f64 = 1.22;
/// Four-category arcs sit here, well outside the inner rings
const FOUR_ARC_RADIUS: f64 = 4.0;

/// A requested topping: angle, minimum radius and 1-based category
#[derive(Debug, Clone, Copy)]
struct Slot {
    theta: f64,
    radius: f64,
    category: usize,
}

/// `count` toppings evenly spread over the arc `[start, end)`, on the smallest
/// ring where neighbours are tangent (plus a hair), or `min_radius` if larger.
fn draw_arc(start: f64, end: f64, count: usize, category: usize, min_radius: Option<f64>) -> Vec<Slot> {
    let theta = (end - start) / (2.0 * count as f64);
    let tangent = PLACEMENT_BUFFER + ITEM_RADIUS / theta.sin();
    let radius = min_radius.map_or(tangent, |r| tangent.max(r));
    (0..count)
        .map(|i| Slot {
            theta: start + (2 * i + 1) as f64 * theta,
            radius,
            category,
        })
        .collect()
}

/// 24 evenly spaced slots on one ring; category from the angular sector
fn single_ring_slots(categories: usize) -> Vec<Slot> {
    (0..TOPPINGS_PER_PIZZA)
        .map(|i| {
            // Sector of slot i is [k·2π/K, (k+1)·2π/K) with k = ⌊i·K/24⌋
            let sector = i * categories / TOPPINGS_PER_PIZZA;
            Slot {
                theta: i as f64 / TOPPINGS_PER_PIZZA as f64 * TAU,
                radius: SINGLE_RING_RADIUS,
                category: sector + 1,
            }
        })
        .collect()
}

/// Inner rings for two categories split top/bottom, plus per-count arcs.
/// `order` relabels the pattern's categories 1..=K.
fn multi_ring_slots(count: CategoryCount, order: &[usize]) -> Vec<Slot> {
    let c = |i: usize| order[i];
    match count {
        CategoryCount::Two => [
            draw_arc(0.0, PI, 4, c(0), None),
            draw_arc(PI, TAU, 4, c(1), None),
            draw_arc(0.0, PI, 8, c(0), None),
            draw_arc(PI, TAU, 8, c(1), None),
        ]
        .concat(),
        CategoryCount::Three => [
            draw_arc(0.0, PI, 2, c(0), None),
            draw_arc(PI, TAU, 2, c(1), None),
            draw_arc(0.0, PI, 6, c(0), None),
            draw_arc(PI, TAU, 6, c(1), None),
            draw_arc(FRAC_PI_4, 3.0 * FRAC_PI_4, 8, c(2), None),
        ]
        .concat(),
        CategoryCount::Four => [
            draw_arc(0.0, PI, 2, c(0), None),
            draw_arc(PI, TAU, 2, c(1), None),
            draw_arc(0.0, PI, 4, c(0), Some(FOUR_OUTER_MIN_RADIUS)),
            draw_arc(PI, TAU, 4, c(1), Some(FOUR_OUTER_MIN_RADIUS)),
            draw_arc(0.0, FRAC_PI_2, 6, c(2), Some(FOUR_ARC_RADIUS)),
            draw_arc(FRAC_PI_2, PI, 6, c(3), Some(FOUR_ARC_RADIUS)),
        ]
        .concat(),
        CategoryCount::Other(_) => Vec::new(),
    }
}

/// Place slots in order. A clashing slot is pushed outward along its angle
/// until it fits, within the retry budget and the disc.
fn place_slots(slots: &[Slot]) -> Result<Vec<ToppingItem>, EngineError> {
    let mut placed: Vec<ToppingItem> = Vec::with_capacity(slots.len());
    for slot in slots {
        let mut radius = slot.radius;
        let mut attempts = 0;
        loop {
            let pos = polar_to_cartesian(radius, slot.theta);
            if radius + ITEM_RADIUS <= DISC_RADIUS && !clash_exists(pos, &placed) {
                placed.push(ToppingItem {
                    pos,
                    category: slot.category,
                });
                break;
            }
            attempts += 1;
            if attempts > MAX_RING_RETRIES || radius + ITEM_RADIUS > DISC_RADIUS {
                return Err(EngineError::Layout {
                    placed: placed.len(),
                    required: TOPPINGS_PER_PIZZA,
                    attempts,
                });
            }
            radius += CLASH_RADIUS_STEP;
        }
    }
    Ok(placed)
}

/// Random angle and radius per item, category `i mod K + 1`, redrawn on clash
fn place_random<R: Rng + ?Sized>(categories: usize, rng: &mut R) -> Result<Pizza, EngineError> {
    let max_radius = DISC_RADIUS - ITEM_RADIUS;
    let mut placed: Vec<ToppingItem> = Vec::with_capacity(TOPPINGS_PER_PIZZA);
    while placed.len() < TOPPINGS_PER_PIZZA {
        let mut attempts = 0;
        let pos = loop {
            if attempts == MAX_RANDOM_ATTEMPTS {
                return Err(EngineError::Layout {
                    placed: placed.len(),
                    required: TOPPINGS_PER_PIZZA,
                    attempts,
                });
            }
            attempts += 1;
            let theta = rng.random::<f64>() * TAU;
            let r = rng.random::<f64>() * max_radius;
            let pos = polar_to_cartesian(r, theta);
            if !clash_exists(pos, &placed) {
                break pos;
            }
        };
        placed.push(ToppingItem {
            pos,
            category: placed.len() % categories + 1,
        });
    }
    Pizza::new(placed, categories)
}

/// Next lexicographic permutation in place; false after the last one
fn next_permutation(order: &mut [usize]) -> bool {
    let Some(i) = order.windows(2).rposition(|w| w[0] < w[1]) else {
        order.reverse();
        return false;
    };
    let j = order.iter().rposition(|&v| v > order[i]).unwrap_or(i + 1);
    order.swap(i, j);
    order[i + 1..].reverse();
    true
}

/// Category relabelings for a batch: identity, or successive permutations (cycling)
fn category_orders(categories: usize, batch_size: usize, permute: bool) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (1..=categories).collect();
    (0..batch_size)
        .map(|_| {
            let current = order.clone();
            if permute {
                next_permutation(&mut order);
            }
            current
        })
        .collect()
}

/// Layout strategy selected by config
#[derive(Debug, Clone)]
pub struct PizzaLayout {
    style: LayoutStyle,
    permute: bool,
}

impl PizzaLayout {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            style: config.layout,
            permute: config.permute_categories,
        }
    }

    /// Lay out `batch_size` pizzas for `categories` toppings
    pub fn layout<R: Rng + ?Sized>(
        &self,
        categories: usize,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Vec<Pizza>, EngineError> {
        let count = CategoryCount::new(categories)?;

        let pizzas = match count {
            CategoryCount::Other(k) => {
                log::warn!("No pattern for {} categories, placing toppings at random", k);
                (0..batch_size)
                    .map(|_| place_random(k, rng))
                    .collect::<Result<Vec<_>, _>>()?
            }
            _ => category_orders(categories, batch_size, self.permute)
                .iter()
                .map(|order| {
                    let slots = match self.style {
                        LayoutStyle::SingleRing => single_ring_slots(categories)
                            .into_iter()
                            .map(|s| Slot {
                                category: order[s.category - 1],
                                ..s
                            })
                            .collect(),
                        LayoutStyle::MultiRing => multi_ring_slots(count, order),
                    };
                    Pizza::new(place_slots(&slots)?, categories)
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        log::info!(
            "Laid out {} pizzas: {} categories, {} (extent {:.3})",
            pizzas.len(),
            categories,
            self.style.as_str(),
            pizzas.first().map_or(0.0, Pizza::extent)
        );
        Ok(pizzas)
    }
}

/// One round's inventory with the default layout
pub fn layout_pizzas<R: Rng + ?Sized>(categories: usize, rng: &mut R) -> Result<Vec<Pizza>, EngineError> {
    PizzaLayout::new(&EngineConfig::for_categories(categories)).layout(categories, PIZZAS_PER_ROUND, rng)
}
