/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for matrices, distances, extents, and kernel matrices.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::KernelFunction;
use faer::Mat;

/// Returns an owned `Mat<T>` from a subset of row indices.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use phs_rbf_utils::select_mat_rows;
///
/// let matrix = mat![
///     [0.0, 1.0],
///     [1.0, 1.0],
///     [2.0, 2.0],
///     [3.0, 3.0f64],
/// ];
///
/// let sub_matrix = select_mat_rows(&matrix, &[0usize, 2]);
///
/// assert_eq!(
///     sub_matrix,
///     mat![
///         [0.0, 1.0],
///         [2.0, 2.0f64],
///     ]
/// );
/// ```
#[inline(always)]
pub fn select_mat_rows<T>(existing_mat: &Mat<T>, row_indices: &[usize]) -> Mat<T>
where
    T: Clone,
{
    Mat::from_fn(row_indices.len(), existing_mat.ncols(), |i, j| {
        existing_mat.get(row_indices[i], j).clone()
    })
}

/// Gathers `values[idx]` for every index into a single-column matrix.
///
/// # Examples
///
/// ```
/// use phs_rbf_utils::select_values;
///
/// let column = select_values(&[10.0, 20.0, 30.0], &[2usize, 0]);
///
/// assert_eq!(column.nrows(), 2);
/// assert_eq!(column[(0, 0)], 30.0);
/// assert_eq!(column[(1, 0)], 10.0);
/// ```
#[inline(always)]
pub fn select_values(values: &[f64], indices: &[usize]) -> Mat<f64> {
    Mat::from_fn(indices.len(), 1, |i, _| values[indices[i]])
}

/// Computes the axis aligned bounding box (AABB) extents of a matrix of points.
///
/// Returns a flat vector containing the minimum and maximum values along each column (dimension)
/// of the input matrix. The result is arranged as:
///
/// `[min_0, min_1, ..., min_n, max_0, max_1, ..., max_n]`
///
/// where `n` is the number of columns in the matrix. An empty matrix yields an
/// empty vector.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use phs_rbf_utils::get_pointarray_extents;
///
/// let points = mat![
///     [1.0, 2.0],
///     [3.0, -1.0],
///     [0.5, 4.0f64]
/// ];
/// let extents = get_pointarray_extents(&points);
/// assert_eq!(extents, vec![0.5, -1.0, 3.0, 4.0]);
/// ```
#[inline(always)]
pub fn get_pointarray_extents<T>(points: &Mat<T>) -> Vec<T>
where
    T: PartialOrd + Clone,
{
    let (nrows, ncols) = points.shape();
    if nrows == 0 {
        return Vec::new();
    }

    // The first half of the vector stores mins, the second half stores maxs.
    let mut extents: Vec<T> = Vec::with_capacity(2 * ncols);
    for col in 0..ncols {
        extents.push(points.get(0, col).clone());
    }
    for col in 0..ncols {
        extents.push(points.get(0, col).clone());
    }

    for row in points.row_iter() {
        for (col, item) in row.iter().enumerate() {
            if item < &extents[col] {
                extents[col] = item.clone();
            }
            if item > &extents[col + ncols] {
                extents[col + ncols] = item.clone();
            }
        }
    }

    extents
}

/// Builds the dense kernel matrix between `target_points` (rows) and
/// `source_points` (columns), one kernel evaluation per entry.
#[inline(always)]
pub fn get_a_matrix<K>(
    target_points: &Mat<f64>,
    source_points: &Mat<f64>,
    kernel_function: &K,
) -> Mat<f64>
where
    K: KernelFunction,
{
    let m = target_points.nrows();
    let n = source_points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(m, n);

    for j in 0..n {
        let source = source_points.row(j);

        for i in 0..m {
            let target = target_points.row(i);

            a_matrix[(i, j)] = kernel_function.evaluate(target, source);
        }
    }

    a_matrix
}

/// Builds the square, symmetric kernel matrix of a point set with itself,
/// evaluating each unordered pair only once.
#[inline(always)]
pub fn get_a_matrix_symmetric<K>(points: &Mat<f64>, kernel_function: &K) -> Mat<f64>
where
    K: KernelFunction,
{
    let n = points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(n, n);

    for j in 0..n {
        let source_row = points.row(j);

        for i in j..n {
            let target_row = points.row(i);
            let k_val = kernel_function.evaluate(target_row, source_row);

            a_matrix[(i, j)] = k_val;
            a_matrix[(j, i)] = k_val;
        }
    }

    a_matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhsKernel;
    use equator::assert;
    use faer::{mat, utils::approx::*};

    #[test]
    fn symmetric_matrix_matches_general_builder() {
        let points = mat![[0.0, 0.0], [1.0, 0.0], [0.5, 2.0], [-1.0, 0.25f64]];
        let kernel = PhsKernel::new(3);

        let general = get_a_matrix(&points, &points, &kernel);
        let symmetric = get_a_matrix_symmetric(&points, &kernel);

        let approx_eq = CwiseMat(ApproxEq::eps() * 8.0);
        assert!(&general ~ &symmetric);
    }

    #[test]
    fn kernel_matrix_is_targets_by_sources() {
        let targets = mat![[0.0, 0.0], [2.0, 0.0f64]];
        let sources = mat![[1.0, 0.0], [0.0, 3.0], [0.0, 0.0f64]];
        let kernel = PhsKernel::new(1);

        let a = get_a_matrix(&targets, &sources, &kernel);

        assert!(a.nrows() == 2);
        assert!(a.ncols() == 3);
        assert!((a[(0, 1)] - 3.0).abs() < 1e-14);
        assert!((a[(1, 2)] - 2.0).abs() < 1e-14);
        assert!(a[(0, 2)] == 0.0);
    }

    #[test]
    fn empty_extents() {
        let points = Mat::<f64>::zeros(0, 2);
        assert!(get_pointarray_extents(&points).is_empty());
    }
}
