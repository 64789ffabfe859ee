/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for local PHS RBF interpolation in 2D.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Local polyharmonic spline (PHS) interpolation of scattered 2D data.
//!
//! A single global RBF system over `N` nodes needs **O(N²)** memory and
//! **O(N³)** work to solve. This crate avoids the global system altogether by
//! splitting the bounding rectangle of the data into a grid of rectangular
//! subdomains and solving a small dense system in each one:
//!
//! - Coordinates are shifted to the node centroid and scaled to unit size.
//! - The subdomain grid is either fixed by the caller or sized automatically,
//!   refining until the subdomain halos become too sparse for the local systems.
//! - Each subdomain fits the nodes inside its halo (three times the cell size by
//!   default) with a PHS kernel `r^k` plus polynomials up to degree 4, or with
//!   polynomials alone by least squares.
//! - The fit is evaluated only at the evaluation points inside the subdomain's
//!   own cell, so each output value is written exactly once.
//!
//! Subdomains are independent and are solved in parallel with
//! [`rayon`](https://docs.rs/rayon/latest/rayon/). Linear algebra is built on
//! [`faer`](https://docs.rs/faer/latest/faer/) and halo queries on an
//! [`rstar`](https://docs.rs/rstar/latest/rstar/) R-tree.
//!
//! Check out the examples directory in the repository for more examples of usage.
//!
//! # Examples
//!
//! ```
//! use phs_rbf::{
//!     LocalRbfInterpolator,
//!     interpolant_config::{Basis, InterpolationSettings},
//!     generate_random_points,
//!     RBFTestFunctions,
//! };
//!
//! // Scattered nodes in the unit square, valued with Franke's function
//! let nodes = generate_random_points(2000, 2, Some(42));
//! let values = RBFTestFunctions::franke_2d(&nodes);
//!
//! // Cubic PHS with linear polynomials on an automatically sized grid
//! let settings = InterpolationSettings::builder(Basis::RbfPlusPoly { power: 3 })
//!     .degree(1)
//!     .build();
//! let rbfi = LocalRbfInterpolator::builder(settings).build();
//!
//! // Evaluating at the nodes reproduces the data
//! let fitted = rbfi.interpolate_points(&nodes, &values, &nodes)?;
//!
//! let max_diff: f64 = values
//!     .col(0)
//!     .iter()
//!     .zip(fitted.col(0).iter())
//!     .fold(0.0, |acc, (a, b)| acc.max((a - b).abs()));
//!
//! assert!(max_diff < 1e-8);
//! # Ok::<(), phs_rbf::InterpError>(())
//! ```
//!
//! # References
//! 1.  Fasshauer, G., 2007. Meshfree Approximation Methods with Matlab. World Scientific Publishing Co.
//! 2.  Flyer, N., Fornberg, B., Bayona, V., Barnett, G. A. (2016). On the role of polynomials
//!     in RBF-FD approximations: I. Interpolation and accuracy. J. Comput. Phys. 321, 21–38.
pub mod interpolant_config;

pub mod config;

pub mod progress;

pub mod error;

mod cancel;

mod common;

mod rbf;

mod domain;

mod partition;

mod polynomials;

mod rtree;

mod io;

mod rbf_test_functions;

pub use {
    cancel::CancelToken,
    common::{
        combined_extents, create_evaluation_grid, generate_random_points, jostle_grid,
        normalize, NormalizedFrame,
    },
    config::{Params, ParamsBuilder, PartitionParams},
    domain::SubdomainResult,
    error::{DataIOError, InterpError},
    interpolant_config::{
        Basis, GridSizing, InterpolationSettings, InterpolationSettingsBuilder, MAX_DEGREE,
    },
    io::{
        load_array, load_settings, read_scattered_csv, save_array, save_settings,
        write_scattered_csv, SettingsFile,
    },
    partition::{Partition, Subdomain},
    polynomials::{num_polynomials, polynomial_matrix, rbf_matrix, rbf_matrix_kind, BasisKind},
    rbf::{
        interpolate, LocalRbfInterpolator, LocalRbfInterpolatorBuilder, PartialInterpolation,
        SubdomainFailure,
    },
    rbf_test_functions::{ParseSmoothFunctionError, RBFTestFunctions, SmoothFunction},
};
