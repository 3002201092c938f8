//! Robust homography estimation from point correspondences.
//!
//! A `HomographyEstimator` plugs the 4-point DLT solve and reprojection
//! error into the generic RANSAC engine; the winning consensus model is
//! re-fit on all of its inliers.

use nalgebra::{DMatrix, Matrix3, Vector3};
use vstab_core::{Ransac, RobustConfig, RobustModel, RobustResult, Transform};

/// One correspondence: a point in the source frame and the point in the
/// destination frame believed to depict the same scene feature.
#[derive(Debug, Clone, Copy)]
pub struct PointPair {
    pub src: (f64, f64),
    pub dst: (f64, f64),
}

pub struct HomographyEstimator;

impl RobustModel<PointPair> for HomographyEstimator {
    type Model = Matrix3<f64>;

    fn min_sample_size(&self) -> usize {
        4
    }

    fn estimate(&self, data: &[&PointPair]) -> Option<Self::Model> {
        let mut a = vec![0.0f64; data.len() * 2 * 9];
        for (i, m) in data.iter().enumerate() {
            fill_dlt_rows(&mut a, i, m);
        }
        solve_dlt(&a, data.len() * 2)
    }

    fn compute_error(&self, model: &Self::Model, data: &PointPair) -> f64 {
        let p = Vector3::new(data.src.0, data.src.1, 1.0);
        let q = model * p;
        if q[2].abs() > 1e-10 {
            let x = q[0] / q[2];
            let y = q[1] / q[2];
            ((x - data.dst.0).powi(2) + (y - data.dst.1).powi(2)).sqrt()
        } else {
            f64::INFINITY
        }
    }
}

/// Two DLT constraint rows for one correspondence.
fn fill_dlt_rows(a: &mut [f64], i: usize, m: &PointPair) {
    let (x1, y1) = m.src;
    let (x2, y2) = m.dst;
    let row1 = i * 2;
    let row2 = i * 2 + 1;

    // x constraint: [-x1, -y1, -1, 0, 0, 0, x2*x1, x2*y1, x2]
    a[row1 * 9] = -x1;
    a[row1 * 9 + 1] = -y1;
    a[row1 * 9 + 2] = -1.0;
    a[row1 * 9 + 6] = x2 * x1;
    a[row1 * 9 + 7] = x2 * y1;
    a[row1 * 9 + 8] = x2;

    // y constraint: [0, 0, 0, -x1, -y1, -1, y2*x1, y2*y1, y2]
    a[row2 * 9 + 3] = -x1;
    a[row2 * 9 + 4] = -y1;
    a[row2 * 9 + 5] = -1.0;
    a[row2 * 9 + 6] = y2 * x1;
    a[row2 * 9 + 7] = y2 * y1;
    a[row2 * 9 + 8] = y2;
}

/// Null-space solve via SVD: the homography is the right singular vector
/// of the smallest singular value.
fn solve_dlt(a: &[f64], n_rows: usize) -> Option<Matrix3<f64>> {
    let mut matrix = DMatrix::from_row_slice(n_rows, 9, a);

    // Pad underdetermined systems so all 9 right singular vectors exist.
    if n_rows < 9 {
        let mut padded = DMatrix::zeros(9, 9);
        padded.view_mut((0, 0), (n_rows, 9)).copy_from(&matrix);
        matrix = padded;
    }

    let svd = matrix.svd(false, true);
    let v_t = svd.v_t?;
    let h = v_t.row(8);

    let m = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);
    if m[(2, 2)].abs() > 1e-12 {
        Some(m / m[(2, 2)])
    } else {
        Some(m)
    }
}

/// RANSAC homography fit over a correspondence set, with a final
/// all-inlier DLT refinement when the consensus supports it.
pub fn estimate_homography(
    pairs: &[PointPair],
    config: &RobustConfig,
) -> RobustResult<Transform> {
    let ransac = Ransac::new(config.clone());
    let mut result = ransac.run(&HomographyEstimator, pairs);

    if result.model.is_some() && result.num_inliers > 4 {
        let inlier_pairs: Vec<&PointPair> = pairs
            .iter()
            .zip(result.inliers.iter())
            .filter(|(_, &keep)| keep)
            .map(|(p, _)| p)
            .collect();
        if let Some(refined) = HomographyEstimator.estimate(&inlier_pairs) {
            result.model = Some(refined);
        }
    }

    result
}
