/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates bivariate monomial bases and PHS kernel matrices used by the local systems.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Bivariate monomial bases and PHS kernel matrices.
use crate::{error::InterpError, interpolant_config::MAX_DEGREE};
use faer::Mat;
use phs_rbf_utils::PhsKernel;

/// `(a, b)` exponents of `x^a y^b`, grouped by total degree and ordered by
/// decreasing power of x within each degree.
const MONOMIAL_EXPONENTS: [(u32, u32); 15] = [
    (0, 0),
    (1, 0),
    (0, 1),
    (2, 0),
    (1, 1),
    (0, 2),
    (3, 0),
    (2, 1),
    (1, 2),
    (0, 3),
    (4, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 4),
];

/// Which quantity a basis matrix evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisKind {
    Value,
    DerivX,
    DerivY,
}

/// Number of bivariate monomials of total degree at most `degree`.
#[inline]
pub fn num_polynomials(degree: usize) -> usize {
    (degree + 1) * (degree + 2) / 2
}

#[inline(always)]
fn monomial(x: f64, y: f64, (a, b): (u32, u32), kind: BasisKind) -> f64 {
    match kind {
        BasisKind::Value => x.powi(a as i32) * y.powi(b as i32),
        BasisKind::DerivX if a == 0 => 0.0,
        BasisKind::DerivX => a as f64 * x.powi(a as i32 - 1) * y.powi(b as i32),
        BasisKind::DerivY if b == 0 => 0.0,
        BasisKind::DerivY => b as f64 * x.powi(a as i32) * y.powi(b as i32 - 1),
    }
}

/// Evaluates the monomial basis of total degree at most `degree` at each point.
///
/// `points` holds one `(x, y)` point per row. The result is
/// `num_polynomials(degree) x n`, one column per point, with rows ordered
/// `1; x, y; x^2, xy, y^2; x^3, ...`.
///
/// # Example
/// ```
/// use faer::mat;
/// use phs_rbf::{BasisKind, polynomial_matrix};
///
/// let points = mat![[2.0, 3.0]];
/// let p = polynomial_matrix(&points, 2, BasisKind::Value)?;
/// assert_eq!(p.nrows(), 6);
/// assert_eq!(p[(4, 0)], 6.0); // xy
/// # Ok::<(), phs_rbf::InterpError>(())
/// ```
pub fn polynomial_matrix(
    points: &Mat<f64>,
    degree: usize,
    kind: BasisKind,
) -> Result<Mat<f64>, InterpError> {
    if degree > MAX_DEGREE {
        return Err(InterpError::InvalidDegree { degree });
    }
    let num_polys = num_polynomials(degree);

    Ok(Mat::from_fn(num_polys, points.nrows(), |k, j| {
        monomial(points[(j, 0)], points[(j, 1)], MONOMIAL_EXPONENTS[k], kind)
    }))
}

/// Builds the dense `n_eval x n_centers` matrix of kernel values.
pub fn rbf_matrix(eval_points: &Mat<f64>, centers: &Mat<f64>, kernel: &PhsKernel) -> Mat<f64> {
    phs_rbf_utils::get_a_matrix(eval_points, centers, kernel)
}

/// Builds the kernel matrix for the requested value or partial derivative.
///
/// Entry `(i, j)` differentiates `phi(eval_i - center_j)` with respect to the
/// evaluation point coordinates.
pub fn rbf_matrix_kind(
    eval_points: &Mat<f64>,
    centers: &Mat<f64>,
    kernel: &PhsKernel,
    kind: BasisKind,
) -> Mat<f64> {
    match kind {
        BasisKind::Value => rbf_matrix(eval_points, centers, kernel),
        BasisKind::DerivX => Mat::from_fn(eval_points.nrows(), centers.nrows(), |i, j| {
            kernel.eval_offset_dx(
                eval_points[(i, 0)] - centers[(j, 0)],
                eval_points[(i, 1)] - centers[(j, 1)],
            )
        }),
        BasisKind::DerivY => Mat::from_fn(eval_points.nrows(), centers.nrows(), |i, j| {
            kernel.eval_offset_dy(
                eval_points[(i, 0)] - centers[(j, 0)],
                eval_points[(i, 1)] - centers[(j, 1)],
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{mat, utils::approx::*, Mat};

    fn run_case(points: Mat<f64>, degree: usize, kind: BasisKind, expected: Mat<f64>) {
        let p = polynomial_matrix(&points, degree, kind).unwrap();
        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0 * (2 as f64));
        assert!(&p ~ &expected);
    }

    #[test]
    fn counts_follow_triangular_numbers() {
        let counts: Vec<usize> = (0..=4).map(num_polynomials).collect();
        assert!(counts == vec![1, 3, 6, 10, 15]);
    }

    #[test]
    fn constant_values() {
        let points = mat![[1.0, 2.0], [3.0, 4.0]];
        run_case(points, 0, BasisKind::Value, mat![[1.0, 1.0]]);
    }

    #[test]
    fn linear_values() {
        let points = mat![[1.0, 2.0], [3.0, 4.0]];
        // Rows: [1, x, y]
        let expected = mat![[1.0, 1.0], [1.0, 3.0], [2.0, 4.0]];
        run_case(points, 1, BasisKind::Value, expected);
    }

    #[test]
    fn quadratic_values() {
        let points = mat![[1.0, 2.0], [3.0, 4.0]];
        // Rows: [1, x, y, x^2, xy, y^2]
        let expected = mat![
            [1.0, 1.0],
            [1.0, 3.0],
            [2.0, 4.0],
            [1.0, 9.0],
            [2.0, 12.0],
            [4.0, 16.0],
        ];
        run_case(points, 2, BasisKind::Value, expected);
    }

    #[test]
    fn quartic_values_at_single_point() {
        let points = mat![[2.0, 3.0]];
        let expected = mat![
            [1.0],
            [2.0],
            [3.0],
            [4.0],
            [6.0],
            [9.0],
            [8.0],
            [12.0],
            [18.0],
            [27.0],
            [16.0],
            [24.0],
            [36.0],
            [54.0],
            [81.0],
        ];
        run_case(points, 4, BasisKind::Value, expected);
    }

    #[test]
    fn cubic_derivatives() {
        let points = mat![[2.0, 3.0]];
        // d/dx of [1, x, y, x^2, xy, y^2, x^3, x^2y, xy^2, y^3]
        let dx = mat![
            [0.0],
            [1.0],
            [0.0],
            [4.0],
            [3.0],
            [0.0],
            [12.0],
            [12.0],
            [9.0],
            [0.0],
        ];
        // d/dy of the same rows
        let dy = mat![
            [0.0],
            [0.0],
            [1.0],
            [0.0],
            [2.0],
            [6.0],
            [0.0],
            [4.0],
            [12.0],
            [27.0],
        ];
        run_case(points.clone(), 3, BasisKind::DerivX, dx);
        run_case(points, 3, BasisKind::DerivY, dy);
    }

    #[test]
    fn degree_above_four_is_rejected() {
        let points = mat![[0.0, 0.0]];
        let result = polynomial_matrix(&points, 5, BasisKind::Value);
        assert!(result == Err(InterpError::InvalidDegree { degree: 5 }));
    }

    #[test]
    fn rbf_matrix_shapes_and_values() {
        let eval = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 2.0]];
        let centers = mat![[0.0, 0.0], [3.0, 4.0]];
        let kernel = PhsKernel::new(3);

        let a = rbf_matrix(&eval, &centers, &kernel);
        assert!(a.nrows() == 3);
        assert!(a.ncols() == 2);
        assert!((a[(0, 1)] - 125.0).abs() < 1e-12);
        assert!((a[(2, 0)] - 8.0).abs() < 1e-12);

        let ax = rbf_matrix_kind(&eval, &centers, &kernel, BasisKind::DerivX);
        // 3 * dx * r at (1, 0) from the origin
        assert!((ax[(1, 0)] - 3.0).abs() < 1e-12);
        assert!(ax[(0, 0)] == 0.0);
    }
}
