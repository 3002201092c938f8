//! Trajectory extraction and smoothing.
//!
//! The trajectory is where the frame centre lands in frame-0 space
//! under each accumulated transform. Jitter is the high-frequency part
//! of that signal; the smoother removes it while keeping intentional
//! pans.

use nalgebra::Point2;
use vstab_core::geometry::{map_point, Transform};

/// One trajectory point per frame: the reference point mapped through
/// that frame's accumulated transform.
pub fn extract_trajectory(reference: Point2<f64>, transforms: &[Transform]) -> Vec<Point2<f64>> {
    transforms.iter().map(|t| map_point(t, &reference)).collect()
}

/// Symmetric moving average with boundary truncation.
///
/// The window at index `i` has radius `min(max_radius, i, n-1-i)`:
/// it never reads outside the sequence, and because it stays symmetric
/// it reproduces linear signals exactly, so steady pans pass through
/// unchanged even at the sequence ends.
pub fn smooth_trajectory(raw: &[Point2<f64>], max_radius: usize) -> Vec<Point2<f64>> {
    let n = raw.len();
    let mut smoothed = Vec::with_capacity(n);

    for i in 0..n {
        let radius = max_radius.min(i).min(n - 1 - i);
        let lo = i - radius;
        let hi = i + radius;

        let mut sx = 0.0;
        let mut sy = 0.0;
        for p in &raw[lo..=hi] {
            sx += p.x;
            sy += p.y;
        }
        let count = (hi - lo + 1) as f64;
        smoothed.push(Point2::new(sx / count, sy / count));
    }

    smoothed
}

/// Smooth with the largest radius, bounded by `max_radius`, whose
/// worst-case deviation from the raw path stays within `budget` pixels.
///
/// The deviation bound is what the crop solver ultimately pays for, so
/// shrinking the window on wild sequences trades smoothness for a
/// usable crop window. Returns the smoothed trajectory and the radius
/// actually used.
pub fn smooth_trajectory_adaptive(
    raw: &[Point2<f64>],
    max_radius: usize,
    budget: f64,
) -> (Vec<Point2<f64>>, usize) {
    let mut radius = max_radius;

    loop {
        let smoothed = smooth_trajectory(raw, radius);
        let deviation = max_deviation(raw, &smoothed);
        if deviation <= budget || radius <= 1 {
            return (smoothed, radius);
        }
        radius /= 2;
    }
}

fn max_deviation(raw: &[Point2<f64>], smoothed: &[Point2<f64>]) -> f64 {
    raw.iter()
        .zip(smoothed.iter())
        .map(|(r, s)| ((r.x - s.x).powi(2) + (r.y - s.y).powi(2)).sqrt())
        .fold(0.0, f64::max)
}

/// Variance of the frame-to-frame delta vectors around their mean.
/// The smoother's acceptance criterion: this must strictly drop
/// relative to the raw trajectory on jittery input.
pub fn delta_variance(trajectory: &[Point2<f64>]) -> f64 {
    if trajectory.len() < 2 {
        return 0.0;
    }

    let deltas: Vec<(f64, f64)> = trajectory
        .windows(2)
        .map(|w| (w[1].x - w[0].x, w[1].y - w[0].y))
        .collect();

    let n = deltas.len() as f64;
    let mean_x = deltas.iter().map(|d| d.0).sum::<f64>() / n;
    let mean_y = deltas.iter().map(|d| d.1).sum::<f64>() / n;

    deltas
        .iter()
        .map(|d| (d.0 - mean_x).powi(2) + (d.1 - mean_y).powi(2))
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use vstab_core::geometry::translation;

    fn jittery_pan(n: usize, seed: u64) -> Vec<Point2<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let trend = i as f64 * 1.5;
                Point2::new(
                    trend + rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                )
            })
            .collect()
    }

    #[test]
    fn trajectory_aligns_with_transforms() {
        let transforms = vec![
            Transform::identity(),
            translation(-2.0, 0.0),
            translation(-4.0, 0.0),
        ];
        let traj = extract_trajectory(Point2::new(50.0, 40.0), &transforms);
        assert_eq!(traj.len(), transforms.len());
        assert_eq!(traj[0], Point2::new(50.0, 40.0));
        assert!((traj[2].x - 46.0).abs() < 1e-9);
    }

    #[test]
    fn smoothing_preserves_length_for_all_sizes() {
        for n in 1..12 {
            let raw: Vec<Point2<f64>> =
                (0..n).map(|i| Point2::new(i as f64, 0.0)).collect();
            assert_eq!(smooth_trajectory(&raw, 5).len(), n);
        }
    }

    #[test]
    fn linear_trajectory_passes_through_unchanged() {
        let raw: Vec<Point2<f64>> = (0..30)
            .map(|i| Point2::new(2.0 * i as f64, -0.5 * i as f64))
            .collect();
        let smoothed = smooth_trajectory(&raw, 8);
        for (r, s) in raw.iter().zip(smoothed.iter()) {
            assert!((r.x - s.x).abs() < 1e-9);
            assert!((r.y - s.y).abs() < 1e-9);
        }
    }

    #[test]
    fn smoothing_strictly_reduces_delta_variance() {
        let raw = jittery_pan(120, 17);
        let smoothed = smooth_trajectory(&raw, 10);
        assert_eq!(smoothed.len(), raw.len());
        assert!(delta_variance(&smoothed) < delta_variance(&raw));
    }

    #[test]
    fn adaptive_radius_shrinks_under_tight_budget() {
        let raw = jittery_pan(80, 5);
        let (_, full) = smooth_trajectory_adaptive(&raw, 16, f64::INFINITY);
        let (smoothed, tight) = smooth_trajectory_adaptive(&raw, 16, 0.5);
        assert_eq!(full, 16);
        assert!(tight < full);
        assert_eq!(smoothed.len(), raw.len());
    }

    #[test]
    fn single_point_trajectory_is_a_noop() {
        let raw = vec![Point2::new(3.0, 4.0)];
        let smoothed = smooth_trajectory(&raw, 40);
        assert_eq!(smoothed, raw);
        assert_eq!(delta_variance(&raw), 0.0);
    }
}
