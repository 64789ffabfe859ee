/////////////////////////////////////////////////////////////////////////////////////////////
//
// Wraps the `rstar` crate to build a point R-tree for subdomain halo queries.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # rtree
//!
//! Wrapper module for the rstar crate.
//!
//! Builds an R-tree over the node locations so that the nodes falling inside a
//! subdomain halo rectangle can be counted or collected without a full scan.

use faer::Mat;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

/// A node location tagged with its row index in the node matrix.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

pub(crate) struct PointRTree {
    tree: RTree<IndexedPoint>,
}

impl PointRTree {
    /// Bulk loads every row of an `n x 2` point matrix.
    pub(crate) fn new(points: &Mat<f64>) -> Self {
        let items = (0..points.nrows())
            .map(|i| GeomWithData::new([points[(i, 0)], points[(i, 1)]], i))
            .collect::<Vec<_>>();

        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// Row indices of the points inside the closed rectangle `[mins, maxs]`,
    /// sorted ascending so local systems are assembled in node order.
    pub(crate) fn indices_in_rect(&self, mins: [f64; 2], maxs: [f64; 2]) -> Vec<usize> {
        let envelope = AABB::from_corners(mins, maxs);
        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|item| item.data)
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Number of points inside the closed rectangle `[mins, maxs]`.
    pub(crate) fn count_in_rect(&self, mins: [f64; 2], maxs: [f64; 2]) -> usize {
        let envelope = AABB::from_corners(mins, maxs);
        self.tree.locate_in_envelope(&envelope).count()
    }

    #[cfg(test)]
    pub(crate) fn size(&self) -> usize {
        self.tree.size()
    }
}
