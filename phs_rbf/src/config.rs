/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for subdomain partitioning and local solve execution.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for subdomain partitioning and local solve execution.
use crate::error::InterpError;
use serde::{Deserialize, Serialize};

/// Parameters controlling construction of the **subdomain grid**.
///
/// The bounding rectangle of the nodes and evaluation points is padded and
/// tiled by a regular grid of core cells. Each cell is enlarged by `halo_scale`
/// to form the halo whose nodes feed the local linear system. With automatic
/// sizing the grid is doubled while every halo still holds at least
/// `density_factor` times the number of polynomial terms.
///
/// ### Default Values
/// - `halo_scale`: `3.0`
/// - `density_factor`: `10`
/// - `min_local_factor`: `1.5`
/// - `max_refinements`: `12`
/// - `boundary_padding`: `1e-4`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct PartitionParams {
    /// Halo half-dimensions as a multiple of the core half-dimensions.
    pub halo_scale: f64,

    /// Minimum halo node count, as a multiple of the number of polynomial
    /// terms, that the automatic grid must keep in every subdomain.
    pub density_factor: usize,

    /// Minimum halo node count for a local solve, as a multiple of the number
    /// of polynomial terms. Rounded half to even.
    pub min_local_factor: f64,

    /// Maximum number of grid doublings the automatic sizer may perform.
    pub max_refinements: usize,

    /// Padding added around the bounding rectangle, relative to its mean extent.
    pub boundary_padding: f64,
}

impl Default for PartitionParams {
    fn default() -> Self {
        PartitionParams {
            halo_scale: 3.0,
            density_factor: 10,
            min_local_factor: 1.5,
            max_refinements: 12,
            boundary_padding: 1e-4,
        }
    }
}

impl PartitionParams {
    /// Minimum number of halo nodes a subdomain needs for `num_polys` terms.
    pub fn min_local_nodes(&self, num_polys: usize) -> usize {
        (self.min_local_factor * num_polys as f64).round_ties_even() as usize
    }

    /// Halo node count the automatic grid sizer requires in every subdomain.
    pub fn density_threshold(&self, num_polys: usize) -> usize {
        self.density_factor * num_polys
    }

    pub(crate) fn validate(&self) -> Result<(), InterpError> {
        let reason = if !(self.halo_scale >= 1.0 && self.halo_scale.is_finite()) {
            Some(format!("halo_scale must be at least 1 (got {})", self.halo_scale))
        } else if self.density_factor == 0 {
            Some("density_factor must be positive".to_string())
        } else if !(self.min_local_factor >= 1.0 && self.min_local_factor.is_finite()) {
            Some(format!(
                "min_local_factor must be at least 1 (got {})",
                self.min_local_factor
            ))
        } else if !(self.boundary_padding > 0.0 && self.boundary_padding.is_finite()) {
            Some(format!(
                "boundary_padding must be positive (got {})",
                self.boundary_padding
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InterpError::InvalidParams { reason }),
            None => Ok(()),
        }
    }
}

/// Execution parameters for the interpolator.
///
/// `parallel` solves the independent subdomain systems on the rayon thread
/// pool. Results are identical either way; the sequential path visits
/// subdomains in grid order, which is easier to follow when debugging.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Params {
    /// Parameters controlling the subdomain grid.
    pub partition: PartitionParams,

    /// Whether subdomain solves run in parallel.
    pub parallel: bool,
}

impl Params {
    /// Returns a new [`ParamsBuilder`] populated with defaults.
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::new()
    }
}

impl Default for Params {
    fn default() -> Self {
        ParamsBuilder::new().build()
    }
}

/// A convenience builder for constructing a [`Params`] instance.
///
/// The builder should be called via the [`Params::builder`] method.
///
/// See [`Params`] for details on each field.
#[derive(Debug, Clone)]
pub struct ParamsBuilder {
    pub partition: PartitionParams,
    pub parallel: bool,
}

impl ParamsBuilder {
    fn new() -> Self {
        Self {
            partition: PartitionParams::default(),
            parallel: true,
        }
    }

    /// Sets the partition parameters.
    pub fn partition(mut self, partition: PartitionParams) -> Self {
        self.partition = partition;
        self
    }

    /// Enables or disables parallel subdomain solves.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builds and returns a [`Params`] instance.
    pub fn build(self) -> Params {
        Params {
            partition: self.partition,
            parallel: self.parallel,
        }
    }
}
