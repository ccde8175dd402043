//! Deterministic pizza engine
//!
//! Everything a player computes lives here. Given the same inputs and the same
//! random source, every operation returns the same result:
//! - Seeded or caller-supplied RNG only
//! - Stable iteration order (by pizza id, then category)
//! - No I/O

pub mod cut;
pub mod geometry;
pub mod layout;
pub mod pizza;
pub mod preferences;
pub mod score;
pub mod search;

pub use cut::{CutChoice, CutSelector, choose_cut, sector_angles, tangent_radius};
pub use geometry::{
    CutOutcome, ScreenTransform, SliceAreaTable, SliceBounds, circle_wedge_area, compute_slice_areas,
    sanitize_cut, slice_bounds,
};
pub use layout::{PizzaLayout, layout_pizzas};
pub use pizza::{CategoryCount, CutSpec, Pizza, PreferencePair, PreferenceVector, ToppingItem, clash_exists};
pub use preferences::{PreferenceGenerator, PreferenceSampler, dominance_tally, generate_preferences};
pub use score::{ScoreReport, score};
pub use search::{Minimum, grid_minimize};
