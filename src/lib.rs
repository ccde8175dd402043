//! Pizza Cut - topping layout and cut optimization for the pizza tournament
//!
//! Core modules:
//! - `engine`: Deterministic geometry engine (layout, preferences, slice areas, cut search)
//! - `player`: Player facade holding config and the default random source
//! - `config`: Data-driven strategy selection
//! - `error`: Engine error type

pub mod config;
pub mod engine;
pub mod error;
pub mod player;

pub use config::EngineConfig;
pub use error::EngineError;
pub use player::Player;

use glam::DVec2;

/// Pizza geometry constants (disc units, radius 6)
pub mod consts {
    /// Pizza disc radius
    pub const DISC_RADIUS: f64 = 6.0;
    /// Radius of a single topping item footprint
    pub const ITEM_RADIUS: f64 = 0.375;
    /// Two footprints closer than this overlap
    pub const MIN_CLASH_DISTANCE: f64 = 2.0 * ITEM_RADIUS;
    /// Gap added to ring radii so neighbouring items never touch exactly
    pub const PLACEMENT_BUFFER: f64 = 0.001;

    /// Items on every pizza
    pub const TOPPINGS_PER_PIZZA: usize = 24;
    /// Pizzas laid out per round
    pub const PIZZAS_PER_ROUND: usize = 10;

    /// Units of pizza every customer expects
    pub const PREFERENCE_TOTAL: f64 = 12.0;
    /// Tolerance on the preference sum invariant
    pub const SUM_TOLERANCE: f64 = 1e-6;

    /// Cut centers stay this far inside the disc edge
    pub const CUT_EDGE_BUFFER: f64 = 0.01;
    /// Substituted for a primary cut angle of exactly zero
    pub const ANGLE_EPSILON: f64 = 1e-6;

    /// Display pixels per disc unit
    pub const DISPLAY_MULTIPLIER: f64 = 40.0;
    /// Pizza center on the tournament display
    pub const DISPLAY_ORIGIN: (f64, f64) = (12.0 * DISPLAY_MULTIPLIER, 10.0 * DISPLAY_MULTIPLIER);
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= std::f64::consts::TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: DVec2) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(-PI / 2.0 - TAU) - (-PI / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_angle_full_turn_is_zero() {
        assert_eq!(wrap_angle(TAU), 0.0);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_polar_round_trip() {
        let p = polar_to_cartesian(3.0, PI / 3.0);
        let (r, theta) = cartesian_to_polar(p);
        assert!((r - 3.0).abs() < 1e-12);
        assert!((theta - PI / 3.0).abs() < 1e-12);
    }
}
