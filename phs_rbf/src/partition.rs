/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds the rectangular subdomain grid and assigns evaluation points to core cells.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # partition
//!
//! Tiles the padded bounding rectangle of the nodes and evaluation points with
//! a regular grid of core cells. Each cell, enlarged by the halo scale, selects
//! the nodes used by its local system, while the unscaled cell owns the
//! evaluation points it will write. Cells are numbered row by row with x
//! varying fastest, so cell `(i, j)` has index `j * nx + i`.
//!
//! With automatic sizing the grid starts with two cells across the short side
//! and is doubled in both directions for as long as every halo still holds
//! enough nodes. The finest grid that passes is used.

use crate::{
    cancel::StopCheck,
    config::PartitionParams,
    error::InterpError,
    interpolant_config::GridSizing,
    progress::{ProgressMsg, ProgressSink},
    rtree::PointRTree,
};
use faer::Mat;
use rayon::prelude::*;
use std::sync::Arc;

/// One rectangular subdomain of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subdomain {
    /// Position in the grid, `j * nx + i`.
    pub index: usize,

    /// Centre of the core cell.
    pub center: [f64; 2],

    /// Half the core cell extent in x.
    pub half_width: f64,

    /// Half the core cell extent in y.
    pub half_length: f64,
}

impl Subdomain {
    /// Corners of the halo rectangle, the core cell grown by `halo_scale`.
    pub fn halo_rect(&self, halo_scale: f64) -> ([f64; 2], [f64; 2]) {
        let hw = self.half_width * halo_scale;
        let hl = self.half_length * halo_scale;
        (
            [self.center[0] - hw, self.center[1] - hl],
            [self.center[0] + hw, self.center[1] + hl],
        )
    }

    /// Corners of the core cell.
    pub fn core_rect(&self) -> ([f64; 2], [f64; 2]) {
        self.halo_rect(1.0)
    }
}

/// A regular `nx x ny` grid of core cells starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition {
    pub nx: usize,
    pub ny: usize,

    /// Lower-left corner of the padded bounding rectangle.
    pub origin: [f64; 2],

    /// Core cell extent in x.
    pub dx: f64,

    /// Core cell extent in y.
    pub dy: f64,
}

impl Partition {
    /// Tiles `extents = [xmin, ymin, xmax, ymax]`, padded on every side by
    /// `padding` times the mean extent, with `nx x ny` cells.
    pub fn from_extents(extents: [f64; 4], nx: usize, ny: usize, padding: f64) -> Self {
        let [a, c, b, d] = extents;
        let eps = padding * ((b - a) + (d - c)) / 2.0;

        Self {
            nx,
            ny,
            origin: [a - eps, c - eps],
            dx: (b - a + 2.0 * eps) / nx as f64,
            dy: (d - c + 2.0 * eps) / ny as f64,
        }
    }

    /// Total number of subdomains.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subdomain(&self, index: usize) -> Subdomain {
        let (i, j) = (index % self.nx, index / self.nx);
        Subdomain {
            index,
            center: [
                self.origin[0] + (i as f64 + 0.5) * self.dx,
                self.origin[1] + (j as f64 + 0.5) * self.dy,
            ],
            half_width: self.dx / 2.0,
            half_length: self.dy / 2.0,
        }
    }

    pub fn subdomains(&self) -> impl Iterator<Item = Subdomain> + '_ {
        (0..self.len()).map(move |index| self.subdomain(index))
    }

    /// Index of the core cell that owns `(x, y)`.
    ///
    /// Cells are half-open on their upper sides, except the last column and
    /// row, which are closed. Points outside the grid are clamped to the
    /// nearest cell, so every point is owned by exactly one cell.
    pub fn locate(&self, x: f64, y: f64) -> usize {
        let cell = |v: f64, start: f64, step: f64, count: usize| {
            let k = ((v - start) / step).floor();
            if k <= 0.0 {
                0
            } else {
                (k as usize).min(count - 1)
            }
        };
        let i = cell(x, self.origin[0], self.dx, self.nx);
        let j = cell(y, self.origin[1], self.dy, self.ny);
        j * self.nx + i
    }

    /// Buckets the rows of `points` by owning cell, keeping row order in each bucket.
    pub fn assign_points(&self, points: &Mat<f64>) -> Vec<Vec<usize>> {
        let mut owned = vec![Vec::new(); self.len()];
        for row in 0..points.nrows() {
            owned[self.locate(points[(row, 0)], points[(row, 1)])].push(row);
        }
        owned
    }

    /// Smallest number of nodes inside any subdomain halo.
    pub(crate) fn min_halo_count(
        &self,
        tree: &PointRTree,
        halo_scale: f64,
        parallel: bool,
    ) -> usize {
        let count = |index: usize| {
            let (mins, maxs) = self.subdomain(index).halo_rect(halo_scale);
            tree.count_in_rect(mins, maxs)
        };

        let min = match parallel {
            true => (0..self.len()).into_par_iter().map(count).min(),
            false => (0..self.len()).map(count).min(),
        };
        min.unwrap_or(0)
    }
}

/// Initial automatic grid: two cells across the shorter side, and the longer
/// side scaled by the aspect ratio of the padded rectangle.
fn initial_grid(extents: [f64; 4], padding: f64) -> (usize, usize) {
    let [a, c, b, d] = extents;
    let eps = padding * ((b - a) + (d - c)) / 2.0;
    let width = b - a + 2.0 * eps;
    let height = d - c + 2.0 * eps;

    let stretch = |ratio: f64| (ratio * 2.0).round().max(1.0) as usize;
    if height > width {
        (2, stretch(height / width))
    } else {
        (stretch(width / height), 2)
    }
}

/// Inputs shared by every density scan of the automatic grid sizer.
pub(crate) struct PartitionContext<'a> {
    pub(crate) tree: &'a PointRTree,
    pub(crate) params: &'a PartitionParams,
    pub(crate) num_polys: usize,
    pub(crate) parallel: bool,
    pub(crate) stop: &'a StopCheck,
    pub(crate) progress: Option<&'a Arc<dyn ProgressSink>>,
}

impl PartitionContext<'_> {
    fn emit(&self, msg: ProgressMsg) {
        if let Some(sink) = self.progress {
            sink.emit(msg);
        }
    }

    fn scan(
        &self,
        extents: [f64; 4],
        grid: (usize, usize),
        threshold: usize,
    ) -> Result<(Partition, usize), InterpError> {
        self.stop.check()?;

        let partition =
            Partition::from_extents(extents, grid.0, grid.1, self.params.boundary_padding);
        let min_halo_nodes =
            partition.min_halo_count(self.tree, self.params.halo_scale, self.parallel);

        self.emit(ProgressMsg::PartitionScan {
            nx: grid.0,
            ny: grid.1,
            min_halo_nodes,
            threshold,
        });

        Ok((partition, min_halo_nodes))
    }

    /// Builds the subdomain grid over `extents` for the requested sizing.
    pub(crate) fn build(
        &self,
        extents: [f64; 4],
        sizing: GridSizing,
    ) -> Result<Partition, InterpError> {
        let partition = match sizing {
            GridSizing::Fixed { nx, ny } => {
                Partition::from_extents(extents, nx, ny, self.params.boundary_padding)
            }
            GridSizing::Auto => self.auto_size(extents)?,
        };

        self.emit(ProgressMsg::PartitionChosen {
            nx: partition.nx,
            ny: partition.ny,
        });

        Ok(partition)
    }

    fn auto_size(&self, extents: [f64; 4]) -> Result<Partition, InterpError> {
        let threshold = self.params.density_threshold(self.num_polys);
        let start = initial_grid(extents, self.params.boundary_padding);

        let (mut chosen, min_nodes) = self.scan(extents, start, threshold)?;

        if min_nodes >= threshold {
            let mut refinements = 0;
            loop {
                if refinements == self.params.max_refinements {
                    return Err(InterpError::PartitionLimitReached {
                        refinements,
                        nx: chosen.nx,
                        ny: chosen.ny,
                    });
                }
                refinements += 1;

                let finer = (chosen.nx * 2, chosen.ny * 2);
                let (partition, min_nodes) = self.scan(extents, finer, threshold)?;
                if min_nodes < threshold {
                    return Ok(chosen);
                }
                chosen = partition;
            }
        }

        // Too sparse from the start: coarsen towards a single subdomain.
        let mut min_nodes = min_nodes;
        while min_nodes < threshold && (chosen.nx > 1 || chosen.ny > 1) {
            let coarser = ((chosen.nx / 2).max(1), (chosen.ny / 2).max(1));
            (chosen, min_nodes) = self.scan(extents, coarser, threshold)?;
        }
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::generate_random_points;
    use crate::progress::closure_sink;
    use std::sync::Mutex;

    fn unit_partition(nx: usize, ny: usize) -> Partition {
        Partition::from_extents([0.0, 0.0, 1.0, 1.0], nx, ny, 1e-4)
    }

    #[test]
    fn grid_geometry_matches_padded_extents() {
        let p = Partition::from_extents([0.0, 0.0, 2.0, 1.0], 4, 2, 1e-4);
        let eps = 1e-4 * 1.5;
        assert!((p.origin[0] + eps).abs() < 1e-15);
        assert!((p.dx - (2.0 + 2.0 * eps) / 4.0).abs() < 1e-15);

        let s = p.subdomain(5);
        // i = 1, j = 1
        assert!((s.center[0] - (-eps + 1.5 * p.dx)).abs() < 1e-14);
        assert!((s.center[1] - (-eps + 1.5 * p.dy)).abs() < 1e-14);
        assert_eq!(s.half_width, p.dx / 2.0);

        let (lo, hi) = s.halo_rect(3.0);
        assert!((hi[0] - lo[0] - 3.0 * p.dx).abs() < 1e-14);
        assert_eq!(p.subdomains().count(), 8);
    }

    #[test]
    fn every_point_is_owned_once_and_inside_its_core() {
        let p = unit_partition(7, 5);
        let points = generate_random_points(5000, 2, Some(3));
        let owned = p.assign_points(&points);

        let mut seen = vec![0usize; points.nrows()];
        for (index, rows) in owned.iter().enumerate() {
            let (lo, hi) = p.subdomain(index).core_rect();
            for &row in rows {
                seen[row] += 1;
                let (x, y) = (points[(row, 0)], points[(row, 1)]);
                assert!(x >= lo[0] - 1e-12 && x <= hi[0] + 1e-12);
                assert!(y >= lo[1] - 1e-12 && y <= hi[1] + 1e-12);
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn shared_edges_belong_to_the_upper_cell() {
        let p = Partition {
            nx: 2,
            ny: 2,
            origin: [0.0, 0.0],
            dx: 0.5,
            dy: 0.5,
        };
        assert_eq!(p.locate(0.5, 0.25), 1);
        assert_eq!(p.locate(0.25, 0.5), 2);
        // the outer boundary is closed and clamped
        assert_eq!(p.locate(1.0, 1.0), 3);
        assert_eq!(p.locate(-0.1, 0.0), 0);
    }

    #[test]
    fn initial_grid_follows_aspect_ratio() {
        assert_eq!(initial_grid([0.0, 0.0, 1.0, 1.0], 1e-4), (2, 2));
        assert_eq!(initial_grid([0.0, 0.0, 4.0, 1.0], 1e-4), (8, 2));
        assert_eq!(initial_grid([0.0, 0.0, 1.0, 3.0], 1e-4), (2, 6));
    }

    fn auto_partition(
        nodes: &Mat<f64>,
        params: &PartitionParams,
        num_polys: usize,
    ) -> Result<Partition, InterpError> {
        let tree = PointRTree::new(nodes);
        let stop = StopCheck::default();
        let ctx = PartitionContext {
            tree: &tree,
            params,
            num_polys,
            parallel: false,
            stop: &stop,
            progress: None,
        };
        let extents = crate::common::combined_extents(nodes, nodes);
        ctx.build(extents, GridSizing::Auto)
    }

    #[test]
    fn auto_grid_keeps_dense_halos() {
        let nodes = generate_random_points(4000, 2, Some(8));
        let params = PartitionParams::default();
        let partition = auto_partition(&nodes, &params, 3).unwrap();

        let tree = PointRTree::new(&nodes);
        assert!(partition.nx > 2);
        assert!(partition.min_halo_count(&tree, 3.0, true) >= 30);

        let finer = Partition::from_extents(
            crate::common::combined_extents(&nodes, &nodes),
            partition.nx * 2,
            partition.ny * 2,
            1e-4,
        );
        assert!(finer.min_halo_count(&tree, 3.0, false) < 30);
    }

    #[test]
    fn sparse_nodes_fall_back_to_one_subdomain() {
        let nodes = generate_random_points(12, 2, Some(2));
        let partition = auto_partition(&nodes, &PartitionParams::default(), 3).unwrap();
        assert_eq!((partition.nx, partition.ny), (1, 1));
    }

    #[test]
    fn refinement_ceiling_is_reported() {
        let nodes = generate_random_points(4000, 2, Some(8));
        let params = PartitionParams {
            max_refinements: 1,
            density_factor: 1,
            ..Default::default()
        };
        let result = auto_partition(&nodes, &params, 1);
        assert!(matches!(
            result,
            Err(InterpError::PartitionLimitReached { refinements: 1, .. })
        ));
    }

    #[test]
    fn scans_are_reported_and_cancellable() {
        let scans = Arc::new(Mutex::new(Vec::new()));
        let scans_in = Arc::clone(&scans);
        let (sink, handle) = closure_sink(64, move |msg| {
            if let ProgressMsg::PartitionScan { nx, ny, .. } = msg {
                scans_in.lock().unwrap().push((nx, ny));
            }
        });

        let nodes = generate_random_points(1000, 2, Some(5));
        let tree = PointRTree::new(&nodes);
        let params = PartitionParams::default();
        let stop = StopCheck::default();
        let ctx = PartitionContext {
            tree: &tree,
            params: &params,
            num_polys: 3,
            parallel: false,
            stop: &stop,
            progress: Some(&sink),
        };
        let extents = crate::common::combined_extents(&nodes, &nodes);
        ctx.build(extents, GridSizing::Auto).unwrap();
        drop(ctx);
        drop(sink);
        handle.join().unwrap();

        let scans = scans.lock().unwrap();
        assert!(scans.len() >= 2);
        assert_eq!(scans[0], (2, 2));

        let token = crate::CancelToken::new();
        token.cancel();
        let stop = StopCheck {
            token: Some(token),
            deadline: None,
        };
        let ctx = PartitionContext {
            tree: &tree,
            params: &params,
            num_polys: 3,
            parallel: false,
            stop: &stop,
            progress: None,
        };
        assert_eq!(ctx.build(extents, GridSizing::Auto), Err(InterpError::Cancelled));
    }
}
