//! Homogeneous planar transform helpers.
//!
//! Every transform in the pipeline is a 3x3 projective matrix over `f64`.
//! Pairwise transforms map frame `i+1` coordinates into frame `i` space;
//! accumulated transforms map any frame into frame 0 space.

use nalgebra::{Matrix3, Point2};

/// A planar projective transform in homogeneous coordinates.
pub type Transform = Matrix3<f64>;

pub fn translation(dx: f64, dy: f64) -> Transform {
    Matrix3::new(1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0)
}

/// Map a point through a projective transform, applying the perspective
/// divide. Points at infinity (vanishing denominator) are mapped without
/// the divide so callers never see NaN coordinates.
pub fn map_point(m: &Transform, pt: &Point2<f64>) -> Point2<f64> {
    let x = pt.x;
    let y = pt.y;
    let w = m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)];

    if w.abs() > 1e-12 {
        Point2::new(
            (m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)]) / w,
            (m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)]) / w,
        )
    } else {
        Point2::new(
            m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)],
            m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)],
        )
    }
}

/// A transform is degenerate when it cannot plausibly describe camera
/// motion between adjacent frames: non-finite entries, a collapsing
/// determinant, or a vanishing homogeneous scale.
pub fn is_degenerate(m: &Transform) -> bool {
    if m.iter().any(|v| !v.is_finite()) {
        return true;
    }
    if m[(2, 2)].abs() < 1e-9 {
        return true;
    }
    m.determinant().abs() < 1e-9
}

/// Rescale a homography so `h22 == 1`, the canonical representative of
/// its projective equivalence class. Keeps long composition chains from
/// drifting in overall scale.
pub fn normalize(m: &Transform) -> Transform {
    let s = m[(2, 2)];
    if s.abs() > 1e-12 {
        m / s
    } else {
        *m
    }
}

/// Accumulate pairwise transforms into per-frame transforms anchored at
/// identity for frame 0.
///
/// Pure left-fold: `acc[0] = I`, `acc[i+1] = acc[i] * pairwise[i]`.
/// Matrix multiplication is associative but not commutative, so any
/// alternative evaluation order (e.g. a parallel prefix scan) must
/// preserve this composition order.
pub fn accumulate(pairwise: &[Transform]) -> Vec<Transform> {
    let mut acc = Vec::with_capacity(pairwise.len() + 1);
    acc.push(Transform::identity());
    for p in pairwise {
        let prev = acc.last().copied().unwrap_or_else(Transform::identity);
        acc.push(normalize(&(prev * p)));
    }
    acc
}
