//! Brute-force 1-D minimization
//!
//! Evaluates a function on an evenly spaced grid (both ends included) and
//! keeps the first sample with the smallest value.

/// Minimizer and minimum of a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub value: f64,
}

/// `samples` evenly spaced points from `lo` to `hi` inclusive
pub fn linspace(lo: f64, hi: f64, samples: usize) -> impl Iterator<Item = f64> {
    let step = if samples > 1 { (hi - lo) / (samples - 1) as f64 } else { 0.0 };
    (0..samples).map(move |i| if i + 1 == samples && samples > 1 { hi } else { lo + i as f64 * step })
}

/// Minimize `f` over `[lo, hi]` on a grid. NaN values never win; ties keep the
/// earliest sample. A single sample evaluates `lo`.
pub fn grid_minimize<F: FnMut(f64) -> f64>(lo: f64, hi: f64, samples: usize, mut f: F) -> Minimum {
    let mut best = Minimum {
        x: lo,
        value: f64::INFINITY,
    };
    for x in linspace(lo, hi, samples.max(1)) {
        let value = f(x);
        if value < best.value {
            best = Minimum { x, value };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_includes_both_ends() {
        let xs: Vec<f64> = linspace(1.0, 2.0, 5).collect();
        assert_eq!(xs, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
        assert_eq!(linspace(3.0, 4.0, 1).collect::<Vec<_>>(), vec![3.0]);
    }

    #[test]
    fn test_finds_parabola_minimum() {
        let min = grid_minimize(-1.0, 3.0, 401, |x| (x - 1.3) * (x - 1.3) + 2.0);
        assert!((min.x - 1.3).abs() < 0.01);
        assert!((min.value - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_ties_keep_first_sample() {
        let min = grid_minimize(0.0, 1.0, 11, |x| if x < 0.45 { 5.0 } else { 1.0 });
        assert!((min.x - 0.5).abs() < 1e-12);
        let flat = grid_minimize(0.0, 1.0, 11, |_| 0.0);
        assert_eq!(flat.x, 0.0);
    }

    #[test]
    fn test_nan_never_wins() {
        let min = grid_minimize(0.0, 1.0, 3, |x| if x == 0.0 { f64::NAN } else { x });
        assert_eq!(min.x, 0.5);
    }
}
