//! Slice area calculator
//!
//! A cut is a set of lines through one center. The lines split the disc into
//! wedges ("slices") around that center; even slices go to the first
//! recipient, odd slices to the second. Each topping's circular footprint is
//! shared between slices by area, using the closed-form area of a circle seen
//! through a wedge from an arbitrary apex.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use super::pizza::{CutSpec, Pizza};
use crate::consts::*;
use crate::{normalize_angle, wrap_angle};

/// Two line angles closer than this (mod π) are the same line
const LINE_MERGE_TOLERANCE: f64 = 1e-12;

/// Area of the disc (center `center`, radius `radius`) inside the wedge with
/// apex `apex` spanning `[start, start + span]` counter-clockwise.
///
/// Integrates ½(r_out² - r_in²) over the wedge angle in polar coordinates
/// around the apex. With β measured from the apex→center direction and
/// u = d·sin β, both the inside and the outside case have elementary
/// primitives.
pub fn circle_wedge_area(apex: DVec2, center: DVec2, radius: f64, start: f64, span: f64) -> f64 {
    if radius <= 0.0 || span <= 0.0 {
        return 0.0;
    }
    let span = span.min(TAU);
    let offset = center - apex;
    let d = offset.length();
    let phi = offset.y.atan2(offset.x);

    if d <= radius {
        // Apex inside the disc: every direction hits the boundary once
        let lo = start - phi;
        let hi = lo + span;
        return inside_primitive(d, radius, hi) - inside_primitive(d, radius, lo);
    }

    // Apex outside: only directions within ±asin(r/d) of the center see the disc
    let half = (radius / d).asin();
    // Exact primitive at the tangent directions, where u = d·sin β only approximates r
    let edge = 0.5 * PI * radius * radius;
    let lo = normalize_angle(start - phi);
    let hi = lo + span;
    let mut area = 0.0;
    for shift in [0.0, TAU] {
        let a = lo - shift;
        let b = hi - shift;
        if b <= -half || a >= half {
            continue;
        }
        let fa = if a <= -half { -edge } else { outside_primitive(d, radius, a) };
        let fb = if b >= half { edge } else { outside_primitive(d, radius, b) };
        area += fb - fa;
    }
    area
}

/// ∫ 2·d·cos β·√(r² - d² sin² β) dβ = u√(r² - u²) + r² asin(u/r)
#[inline]
fn outside_primitive(d: f64, r: f64, beta: f64) -> f64 {
    let u = (d * beta.sin()).clamp(-r, r);
    u * (r * r - u * u).max(0.0).sqrt() + r * r * (u / r).asin()
}

/// ∫ ½(d cos β + √(r² - d² sin² β))² dβ
#[inline]
fn inside_primitive(d: f64, r: f64, beta: f64) -> f64 {
    0.25 * d * d * (2.0 * beta).sin() + 0.5 * r * r * beta + 0.5 * outside_primitive(d, r, beta)
}

/// Angular extent of one slice, as seen from the cut center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceBounds {
    pub start: f64,
    pub span: f64,
}

impl SliceBounds {
    /// Recipient half (0 or 1) owning this slice
    #[inline]
    pub fn recipient(index: usize) -> usize {
        index % 2
    }
}

/// Repair a cut so it can always be evaluated: finite center inside the disc
/// (minus the edge buffer), primary angle wrapped to [0, 2π) and nudged off 0.
pub fn sanitize_cut(cut: &CutSpec) -> CutSpec {
    let limit = DISC_RADIUS - CUT_EDGE_BUFFER;
    let center = if cut.center.is_finite() {
        cut.center.clamp_length_max(limit)
    } else {
        DVec2::ZERO
    };

    let mut angle = if cut.angle.is_finite() { wrap_angle(cut.angle) } else { 0.0 };
    if angle == 0.0 {
        angle = ANGLE_EPSILON;
    }
    let extra_angles = cut
        .extra_angles
        .iter()
        .filter(|a| a.is_finite())
        .map(|&a| wrap_angle(a))
        .collect();

    CutSpec {
        center,
        angle,
        extra_angles,
    }
}

/// Slice boundaries for a (sanitized) cut, slice 0 starting on the primary ray
pub fn slice_bounds(cut: &CutSpec) -> Vec<SliceBounds> {
    // Distinct lines, as directions in [0, π)
    let mut lines: Vec<f64> = Vec::new();
    for angle in cut.line_angles() {
        let dir = angle.rem_euclid(PI);
        let duplicate = lines.iter().any(|&l| {
            let diff = (l - dir).abs();
            diff < LINE_MERGE_TOLERANCE || PI - diff < LINE_MERGE_TOLERANCE
        });
        if !duplicate {
            lines.push(dir);
        }
    }

    let mut rays: Vec<f64> = lines
        .iter()
        .flat_map(|&l| [wrap_angle(l), wrap_angle(l + PI)])
        .collect();
    rays.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Rotate so the ray closest to the primary angle leads
    let primary = wrap_angle(cut.angle);
    let first = rays
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = normalize_angle(**a - primary).abs();
            let db = normalize_angle(**b - primary).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    rays.rotate_left(first);

    let n = rays.len();
    (0..n)
        .map(|i| {
            let start = rays[i];
            let span = if n == 1 {
                TAU
            } else {
                wrap_angle(rays[(i + 1) % n] - start)
            };
            SliceBounds { start, span }
        })
        .collect()
}

/// Topping area per slice and category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceAreaTable {
    pub bounds: Vec<SliceBounds>,
    /// `areas[slice][category - 1]`
    pub areas: Vec<Vec<f64>>,
}

impl SliceAreaTable {
    #[inline]
    pub fn area(&self, slice: usize, category: usize) -> f64 {
        self.areas[slice][category - 1]
    }

    /// Topping area of each category summed over one recipient's slices
    pub fn recipient_areas(&self, half: usize) -> Vec<f64> {
        let categories = self.areas.first().map_or(0, Vec::len);
        let mut totals = vec![0.0; categories];
        for (slice, row) in self.areas.iter().enumerate() {
            if SliceBounds::recipient(slice) == half {
                for (t, a) in totals.iter_mut().zip(row) {
                    *t += a;
                }
            }
        }
        totals
    }
}

/// Result of applying a cut to a pizza
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutOutcome {
    /// Cut actually evaluated (after sanitizing)
    pub cut: CutSpec,
    pub slices: SliceAreaTable,
    /// Per recipient half, the share of each category scaled to the preference total
    pub amounts: [Vec<f64>; 2],
}

impl CutOutcome {
    /// Amount of `category` (1-based) received by `half`
    #[inline]
    pub fn amount(&self, half: usize, category: usize) -> f64 {
        self.amounts[half][category - 1]
    }
}

/// Share each topping's footprint among the slices of `cut` and total the
/// result per recipient.
///
/// A recipient's amounts are the composition of the topping area it receives,
/// scaled so they sum to the preference total; a recipient with no topping
/// area gets all zeros.
pub fn compute_slice_areas(pizza: &Pizza, cut: &CutSpec, categories: usize) -> CutOutcome {
    let cut = sanitize_cut(cut);
    let bounds = slice_bounds(&cut);

    let mut areas = vec![vec![0.0; categories]; bounds.len()];
    for item in pizza.items() {
        let Some(idx) = item.category.checked_sub(1).filter(|&i| i < categories) else {
            continue;
        };
        for (row, slice) in areas.iter_mut().zip(&bounds) {
            row[idx] += circle_wedge_area(cut.center, item.pos, ITEM_RADIUS, slice.start, slice.span);
        }
    }

    let slices = SliceAreaTable { bounds, areas };
    let amounts = [0, 1].map(|half| {
        let received = slices.recipient_areas(half);
        let sum: f64 = received.iter().sum();
        if sum <= f64::EPSILON {
            vec![0.0; categories]
        } else {
            received.iter().map(|a| PREFERENCE_TOTAL * a / sum).collect()
        }
    });

    CutOutcome {
        cut,
        slices,
        amounts,
    }
}

/// Maps disc units to tournament display pixels (y axis pointing down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenTransform {
    pub multiplier: f64,
    pub origin: DVec2,
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self {
            multiplier: DISPLAY_MULTIPLIER,
            origin: DVec2::new(DISPLAY_ORIGIN.0, DISPLAY_ORIGIN.1),
        }
    }
}

impl ScreenTransform {
    pub fn to_screen(&self, pos: DVec2) -> DVec2 {
        DVec2::new(
            self.origin.x + pos.x * self.multiplier,
            self.origin.y - pos.y * self.multiplier,
        )
    }

    pub fn from_screen(&self, screen: DVec2) -> DVec2 {
        DVec2::new(
            (screen.x - self.origin.x) / self.multiplier,
            (self.origin.y - screen.y) / self.multiplier,
        )
    }
}
