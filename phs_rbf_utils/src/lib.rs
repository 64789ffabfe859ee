/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports the PHS kernel, kernel trait, and matrix helpers used across the phs_rbf crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`phs_rbf`] crate
//!
//! Holds the polyharmonic spline (PHS) kernel together with the small set of
//! dense-matrix helpers the local solver needs: building kernel matrices between
//! two point sets, selecting rows by index, and computing point extents.
mod kernels;
mod traits;
mod utils;

pub use {
    kernels::{PhsKernel, get_distance_sq},
    traits::KernelFunction,
    utils::{
        get_a_matrix, get_a_matrix_symmetric, get_pointarray_extents,
        select_mat_rows, select_values,
    },
};
