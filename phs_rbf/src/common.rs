/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for coordinate normalization, extents, and synthetic point sets.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::InterpError;
use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Node and evaluation coordinates after shifting and scaling.
///
/// Both point sets are translated so the node centroid sits at the origin and
/// divided by `scale`, the mean of the largest absolute shifted node x and y
/// coordinates. Function values are never rescaled.
#[derive(Debug, Clone)]
pub struct NormalizedFrame {
    /// Normalized node coordinates, one `(x, y)` row per node.
    pub nodes: Mat<f64>,

    /// Normalized evaluation coordinates, one `(x, y)` row per point.
    pub targets: Mat<f64>,

    /// Node centroid in the caller's coordinates.
    pub centroid: [f64; 2],

    /// Divisor applied after the shift.
    pub scale: f64,
}

impl NormalizedFrame {
    /// Maps a point from the caller's coordinates into this frame.
    pub fn to_frame(&self, x: f64, y: f64) -> [f64; 2] {
        [
            (x - self.centroid[0]) / self.scale,
            (y - self.centroid[1]) / self.scale,
        ]
    }

    /// Maps a point from this frame back to the caller's coordinates.
    pub fn from_frame(&self, x: f64, y: f64) -> [f64; 2] {
        [
            x * self.scale + self.centroid[0],
            y * self.scale + self.centroid[1],
        ]
    }
}

/// Shifts and scales nodes and evaluation points for well-conditioned local systems.
///
/// Polynomial terms up to degree 4 are formed from these coordinates, so keeping
/// them near unit size matters more than the exact choice of scale.
///
/// # Errors
/// - [`InterpError::EmptyNodes`] when `nodes` has no rows.
/// - [`InterpError::DegenerateCoordinates`] when every node coincides with the
///   centroid, or the scale is not finite.
///
/// # Example
/// ```
/// use faer::mat;
/// use phs_rbf::normalize;
///
/// let nodes = mat![[1.0, 1.0], [3.0, 5.0]];
/// let targets = mat![[2.0, 3.0]];
/// let frame = normalize(&nodes, &targets)?;
/// assert_eq!(frame.centroid, [2.0, 3.0]);
/// assert_eq!(frame.scale, 1.5);
/// assert_eq!(frame.targets[(0, 0)], 0.0);
/// # Ok::<(), phs_rbf::InterpError>(())
/// ```
pub fn normalize(nodes: &Mat<f64>, targets: &Mat<f64>) -> Result<NormalizedFrame, InterpError> {
    let n = nodes.nrows();
    if n == 0 {
        return Err(InterpError::EmptyNodes);
    }

    let centroid = [
        nodes.col(0).sum() / n as f64,
        nodes.col(1).sum() / n as f64,
    ];

    let max_abs = |col: usize| {
        nodes
            .col(col)
            .iter()
            .fold(0.0f64, |acc, v| acc.max((v - centroid[col]).abs()))
    };
    let scale = (max_abs(0) + max_abs(1)) / 2.0;

    if !(scale > 0.0 && scale.is_finite()) {
        return Err(InterpError::DegenerateCoordinates);
    }

    let shift = |points: &Mat<f64>| {
        Mat::from_fn(points.nrows(), 2, |i, j| (points[(i, j)] - centroid[j]) / scale)
    };

    Ok(NormalizedFrame {
        nodes: shift(nodes),
        targets: shift(targets),
        centroid,
        scale,
    })
}

/// Packs parallel coordinate slices into an `n x 2` point matrix.
pub(crate) fn points_from_slices(x: &[f64], y: &[f64]) -> Mat<f64> {
    Mat::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] } else { y[i] })
}

/// Merge two extent vectors `[min0, …, min{D-1}, max0, …, max{D-1}]` into their union.
///
/// An empty vector is treated as the identity, so an empty point set can be merged.
#[inline]
pub(crate) fn union_extents(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }

    let d = a.len() / 2;
    let (a_min, a_max) = a.split_at(d);
    let (b_min, b_max) = b.split_at(d);

    let mins = a_min.iter().zip(b_min).map(|(x, y)| x.min(*y));
    let maxs = a_max.iter().zip(b_max).map(|(x, y)| x.max(*y));

    mins.chain(maxs).collect()
}

/// Bounding rectangle `[xmin, ymin, xmax, ymax]` of two point sets together.
pub fn combined_extents(nodes: &Mat<f64>, targets: &Mat<f64>) -> [f64; 4] {
    let merged = union_extents(
        &phs_rbf_utils::get_pointarray_extents(nodes),
        &phs_rbf_utils::get_pointarray_extents(targets),
    );
    match merged.as_slice() {
        [x0, y0, x1, y1] => [*x0, *y0, *x1, *y1],
        _ => [0.0; 4],
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Generate a matrix of random points in the unit hypercube.
///
/// # Parameters
/// - `n`: Number of points to generate (rows in the output matrix).
/// - `d`: Number of spatial dimensions per point (columns in the output matrix).
/// - `seed`: Optional random seed. `Some(seed)` gives the same points on every
///   run; `None` seeds from the operating system's randomness source.
///
/// # Example
/// ```
/// use phs_rbf::generate_random_points;
///
/// let pts = generate_random_points(100, 2, Some(42));
/// assert_eq!(pts.ncols(), 2);
/// ```
pub fn generate_random_points(n: usize, d: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = seeded_rng(seed);
    Mat::from_fn(n, d, |_, _| rng.random_range(0.0..1.0))
}

#[inline]
fn linspace(start: f64, end: f64, count: usize, index: usize) -> f64 {
    if count < 2 {
        start
    } else {
        start + (end - start) * index as f64 / (count - 1) as f64
    }
}

/// Create a regular `nx x ny` evaluation grid over `[xmin, ymin, xmax, ymax]`.
///
/// Rows are ordered with x varying fastest, so point `(i, j)` is row `j * nx + i`.
/// Both boundary lines are included.
pub fn create_evaluation_grid(extents: [f64; 4], nx: usize, ny: usize) -> Mat<f64> {
    let [a, c, b, d] = extents;
    Mat::from_fn(nx * ny, 2, |row, col| match col {
        0 => linspace(a, b, nx, row % nx),
        _ => linspace(c, d, ny, row / nx),
    })
}

/// Create "jostled" grid nodes: a regular grid whose points are moved at random.
///
/// The grid is `nx x ny` over `extents = [xmin, ymin, xmax, ymax]` with x
/// varying fastest. The largest move is `amplitude` times the mean grid spacing.
/// Interior points move in both axes, points on the left and right edges only
/// in y, points on the top and bottom edges only in x, and corners stay fixed,
/// so the bounding rectangle is preserved. An `amplitude` of zero returns the
/// regular grid.
///
/// # Example
/// ```
/// use phs_rbf::jostle_grid;
///
/// let nodes = jostle_grid(16, 16, 0.3, [0.0, 0.0, 1.0, 1.0], Some(7));
/// assert_eq!(nodes.nrows(), 256);
/// assert_eq!((nodes[(255, 0)], nodes[(255, 1)]), (1.0, 1.0));
/// ```
pub fn jostle_grid(
    nx: usize,
    ny: usize,
    amplitude: f64,
    extents: [f64; 4],
    seed: Option<u64>,
) -> Mat<f64> {
    let [a, c, b, d] = extents;
    let mut points = create_evaluation_grid(extents, nx, ny);

    let eps = 1e-4 * ((b - a) + (d - c)) / 2.0;
    let spacing_x = (b - a) / nx.saturating_sub(1).max(1) as f64;
    let spacing_y = (d - c) / ny.saturating_sub(1).max(1) as f64;
    let max_move = (spacing_x + spacing_y) / 2.0 * amplitude;

    if max_move == 0.0 {
        return points;
    }

    let mut rng = seeded_rng(seed);
    let mut offset = || -max_move + 2.0 * max_move * rng.random::<f64>();

    for row in 0..points.nrows() {
        let (x, y) = (points[(row, 0)], points[(row, 1)]);
        let inside_x = x > a + eps && x < b - eps;
        let inside_y = y > c + eps && y < d - eps;

        match (inside_x, inside_y) {
            (true, true) => {
                points[(row, 0)] += offset();
                points[(row, 1)] += offset();
            }
            (false, true) => points[(row, 1)] += offset(),
            (true, false) => points[(row, 0)] += offset(),
            (false, false) => {}
        }
    }

    points
}
