/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles, solves, and evaluates the local RBF + polynomial system of one subdomain.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # domain
//!
//! Solves the local problem of a single subdomain. The nodes inside the halo
//! determine the coefficients and the evaluation points inside the core cell
//! receive the resulting values.
//!
//! With [`Basis::RbfPlusPoly`] the local system is the square saddle-point system
//!
//! ```text
//! [ A   Pᵀ ] [ w ]   [ f ]
//! [ P   0  ] [ c ] = [ 0 ]
//! ```
//!
//! where `A` holds the PHS kernel between halo nodes and `P` the monomials at
//! the halo nodes. The zero block enforces polynomial reproduction. With
//! [`Basis::PolyOnly`] the monomial coefficients are fitted by least squares.

use crate::{
    error::InterpError,
    interpolant_config::Basis,
    partition::Subdomain,
    polynomials::{self, BasisKind},
    rtree::PointRTree,
};

use faer::linalg::triangular_solve::solve_upper_triangular_in_place;
use faer::{concat, linalg::solvers::Solve, Mat, Par};
use phs_rbf_utils::PhsKernel;

/// Values computed by one subdomain, ready to be scattered into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct SubdomainResult {
    /// Index of the subdomain that produced the values.
    pub subdomain: usize,

    /// Evaluation point indices owned by the subdomain's core cell.
    pub eval_indices: Vec<usize>,

    /// Interpolated value for each entry of `eval_indices`.
    pub values: Vec<f64>,
}

/// Relative size below which a diagonal entry of the least-squares `R` factor
/// is treated as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Read-only inputs shared by every subdomain solve.
pub(crate) struct LocalSolver<'a> {
    pub(crate) nodes: &'a Mat<f64>,
    pub(crate) values: &'a [f64],
    pub(crate) targets: &'a Mat<f64>,
    pub(crate) tree: &'a PointRTree,
    pub(crate) basis: Basis,
    pub(crate) degree: usize,
    pub(crate) halo_scale: f64,
    pub(crate) min_local_nodes: usize,
}

impl LocalSolver<'_> {
    /// Solves the local system of `subdomain` and evaluates it at `eval_indices`.
    ///
    /// The halo must hold at least `min_local_nodes` nodes even when the core
    /// owns no evaluation points, so a sparse region is reported wherever it is.
    pub(crate) fn solve(
        &self,
        subdomain: &Subdomain,
        eval_indices: Vec<usize>,
    ) -> Result<SubdomainResult, InterpError> {
        let (mins, maxs) = subdomain.halo_rect(self.halo_scale);
        let halo = self.tree.indices_in_rect(mins, maxs);

        if halo.len() < self.min_local_nodes {
            return Err(InterpError::InsufficientLocalNodes {
                subdomain: subdomain.index,
                local_nodes: halo.len(),
                required: self.min_local_nodes,
            });
        }

        if eval_indices.is_empty() {
            return Ok(SubdomainResult {
                subdomain: subdomain.index,
                eval_indices,
                values: Vec::new(),
            });
        }

        let local_nodes = phs_rbf_utils::select_mat_rows(self.nodes, &halo);
        let local_values = phs_rbf_utils::select_values(self.values, &halo);
        let eval_points = phs_rbf_utils::select_mat_rows(self.targets, &eval_indices);

        let fitted = match self.basis {
            Basis::RbfPlusPoly { power } => self.rbf_poly_values(
                &local_nodes,
                &local_values,
                &eval_points,
                &PhsKernel::new(power),
            )?,
            Basis::PolyOnly => self.poly_values(
                subdomain.index,
                &local_nodes,
                &local_values,
                &eval_points,
            )?,
        };

        let values: Vec<f64> = fitted.col(0).iter().copied().collect();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(InterpError::SingularLocalSystem {
                subdomain: subdomain.index,
            });
        }

        Ok(SubdomainResult {
            subdomain: subdomain.index,
            eval_indices,
            values,
        })
    }

    fn rbf_poly_values(
        &self,
        local_nodes: &Mat<f64>,
        local_values: &Mat<f64>,
        eval_points: &Mat<f64>,
        kernel: &PhsKernel,
    ) -> Result<Mat<f64>, InterpError> {
        let num_nodes = local_nodes.nrows();

        let a_matrix = phs_rbf_utils::get_a_matrix_symmetric(local_nodes, kernel);
        let poly = polynomials::polynomial_matrix(local_nodes, self.degree, BasisKind::Value)?;
        let num_poly = poly.nrows();

        let poly_t = poly.transpose().to_owned();
        let lhs_zeros = Mat::<f64>::zeros(num_poly, num_poly);

        let lhs = concat![[a_matrix, poly_t], [poly, lhs_zeros]];
        let rhs = concat![[local_values], [Mat::<f64>::zeros(num_poly, 1)]];

        let lu = lhs.partial_piv_lu();
        let coefficients = lu.solve(rhs);

        let (point_coefficients, poly_coefficients) = coefficients.split_at_row(num_nodes);

        let eval_a_matrix = polynomials::rbf_matrix(eval_points, local_nodes, kernel);
        let eval_poly = polynomials::polynomial_matrix(eval_points, self.degree, BasisKind::Value)?;

        Ok(&eval_a_matrix * point_coefficients + eval_poly.transpose() * poly_coefficients)
    }

    /// Least-squares polynomial fit through a thin QR factorisation of `Pᵀ`.
    fn poly_values(
        &self,
        index: usize,
        local_nodes: &Mat<f64>,
        local_values: &Mat<f64>,
        eval_points: &Mat<f64>,
    ) -> Result<Mat<f64>, InterpError> {
        let poly_t = polynomials::polynomial_matrix(local_nodes, self.degree, BasisKind::Value)?
            .transpose()
            .to_owned();

        let coefficients = least_squares(&poly_t, local_values)
            .ok_or(InterpError::SingularLocalSystem { subdomain: index })?;

        let eval_poly = polynomials::polynomial_matrix(eval_points, self.degree, BasisKind::Value)?;
        Ok(eval_poly.transpose() * &coefficients)
    }
}

/// Minimises `‖lhs · x - rhs‖₂` for a tall, full-column-rank `lhs`.
///
/// Returns `None` when `lhs` is numerically rank deficient.
fn least_squares(lhs: &Mat<f64>, rhs: &Mat<f64>) -> Option<Mat<f64>> {
    let qr = lhs.qr();
    let q = qr.compute_thin_Q();
    let r = qr.thin_R();
    let n = r.ncols();

    let scale = (0..n).fold(0.0f64, |acc, i| acc.max(r.get(i, i).abs()));
    if n == 0
        || lhs.nrows() < n
        || !(scale > 0.0)
        || (0..n).any(|i| r.get(i, i).abs() <= RANK_TOLERANCE * scale) {
        return None;
    }

    let mut x = q.transpose() * rhs;
    solve_upper_triangular_in_place(r, x.as_mut(), Par::Seq);
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::generate_random_points, partition::Partition};
    use equator::assert;
    use faer::{mat, utils::approx::*};

    fn solver<'a>(
        nodes: &'a Mat<f64>,
        values: &'a [f64],
        targets: &'a Mat<f64>,
        tree: &'a PointRTree,
        basis: Basis,
        degree: usize,
    ) -> LocalSolver<'a> {
        LocalSolver {
            nodes,
            values,
            targets,
            tree,
            basis,
            degree,
            halo_scale: 3.0,
            min_local_nodes: 2,
        }
    }

    fn single_cell() -> Subdomain {
        Partition::from_extents([0.0, 0.0, 1.0, 1.0], 1, 1, 1e-4).subdomain(0)
    }

    #[test]
    fn least_squares_recovers_exact_line() {
        let lhs = mat![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let rhs = mat![[1.0], [3.0], [5.0], [7.0]];
        let x = least_squares(&lhs, &rhs).unwrap();

        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0 * 4.0);
        assert!(&x ~ &mat![[1.0], [2.0]]);
    }

    #[test]
    fn least_squares_rejects_rank_deficient_columns() {
        let lhs = mat![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        let rhs = mat![[1.0], [2.0], [3.0]];
        assert!(least_squares(&lhs, &rhs).is_none());
    }

    #[test]
    fn least_squares_minimises_residual_of_inconsistent_system() {
        // Normal equations [[3, 3], [3, 5]] x = [2, 3] give x = [1/6, 1/2].
        let lhs = mat![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0]];
        let rhs = mat![[0.0], [1.0], [1.0]];
        let x = least_squares(&lhs, &rhs).unwrap();

        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0 * 4.0);
        assert!(&x ~ &mat![[1.0 / 6.0], [0.5]]);
    }

    #[test]
    fn least_squares_fits_exact_quadratic() {
        // Exact quadratic through five points: 2 - x + 0.5 x^2.
        let xs = [-2.0, -1.0, 0.0, 1.5, 3.0];
        let lhs = Mat::from_fn(5, 3, |i, j| f64::powi(xs[i], j as i32));
        let rhs = Mat::from_fn(5, 1, |i, _| 2.0 - xs[i] + 0.5 * xs[i] * xs[i]);
        let x = least_squares(&lhs, &rhs).unwrap();

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0);
        assert!(&x ~ &mat![[2.0], [-1.0], [0.5]]);
    }

    #[test]
    fn rbf_solve_reproduces_node_values() {
        let nodes = generate_random_points(60, 2, Some(4));
        let values: Vec<f64> = (0..60)
            .map(|i| (3.0 * nodes[(i, 0)]).sin() + nodes[(i, 1)].powi(2))
            .collect();
        let tree = PointRTree::new(&nodes);
        let local = solver(&nodes, &values, &nodes, &tree, Basis::RbfPlusPoly { power: 3 }, 1);

        let eval: Vec<usize> = (0..60).collect();
        let result = local.solve(&single_cell(), eval.clone()).unwrap();

        assert!(result.eval_indices == eval);
        for (k, &i) in result.eval_indices.iter().enumerate() {
            assert!((result.values[k] - values[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn both_bases_reproduce_quadratics() {
        let nodes = generate_random_points(40, 2, Some(9));
        let targets = generate_random_points(25, 2, Some(10));
        let f = |x: f64, y: f64| 1.0 - 2.0 * x + 0.5 * y + x * x - 3.0 * x * y + 2.0 * y * y;
        let values: Vec<f64> = (0..40).map(|i| f(nodes[(i, 0)], nodes[(i, 1)])).collect();
        let tree = PointRTree::new(&nodes);
        let eval: Vec<usize> = (0..25).collect();

        for basis in [Basis::PolyOnly, Basis::RbfPlusPoly { power: 3 }, Basis::RbfPlusPoly { power: 5 }] {
            let local = solver(&nodes, &values, &targets, &tree, basis, 2);
            let result = local.solve(&single_cell(), eval.clone()).unwrap();
            for (k, &i) in result.eval_indices.iter().enumerate() {
                let exact = f(targets[(i, 0)], targets[(i, 1)]);
                assert!((result.values[k] - exact).abs() <= 1e-8 * exact.abs().max(1.0));
            }
        }
    }

    #[test]
    fn sparse_halo_reports_node_count() {
        let nodes = mat![[0.1, 0.1], [0.9, 0.9], [0.5, 0.2]];
        let values = [1.0, 2.0, 3.0];
        let tree = PointRTree::new(&nodes);
        let mut local = solver(&nodes, &values, &nodes, &tree, Basis::PolyOnly, 2);
        local.min_local_nodes = 9;

        let err = local.solve(&single_cell(), Vec::new()).unwrap_err();
        assert!(
            err == InterpError::InsufficientLocalNodes {
                subdomain: 0,
                local_nodes: 3,
                required: 9
            }
        );
    }

    #[test]
    fn empty_core_is_skipped() {
        let nodes = generate_random_points(20, 2, Some(1));
        let values = vec![0.0; 20];
        let tree = PointRTree::new(&nodes);
        let local = solver(&nodes, &values, &nodes, &tree, Basis::RbfPlusPoly { power: 3 }, 1);

        let result = local.solve(&single_cell(), Vec::new()).unwrap();
        assert!(result.values.is_empty());
        assert!(result.eval_indices.is_empty());
    }

    #[test]
    fn collinear_nodes_are_singular_for_poly_fit() {
        let nodes = mat![[0.0, 0.0], [0.25, 0.25], [0.5, 0.5], [0.75, 0.75], [1.0, 1.0]];
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let tree = PointRTree::new(&nodes);
        let local = solver(&nodes, &values, &nodes, &tree, Basis::PolyOnly, 1);

        let err = local.solve(&single_cell(), vec![2]).unwrap_err();
        assert!(err == InterpError::SingularLocalSystem { subdomain: 0 });
    }
}
