/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the polyharmonic spline kernel and its first partial derivatives.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::KernelFunction;
use faer::RowRef;
use serde::{Deserialize, Serialize};

/// Polyharmonic spline (PHS) kernel with `phi(r) = r^power`.
///
/// Written in terms of the offset `(dx, dy)` between two points, the kernel is
/// `(dx^2 + dy^2)^(power / 2)`. The classic conditionally positive definite
/// splines use an odd `power` (1, 3, 5, ...). Even powers are still evaluated,
/// but the resulting systems are not guaranteed to be well posed.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhsKernel {
    pub power: u32,
}

impl PhsKernel {
    #[inline(always)]
    pub fn new(power: u32) -> Self {
        Self { power }
    }

    /// Kernel value at distance `r`.
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        r.powi(self.power as i32)
    }

    /// Kernel value at squared distance `r2`.
    #[inline(always)]
    pub fn eval_r2(&self, r2: f64) -> f64 {
        match self.power % 2 {
            0 => r2.powi((self.power / 2) as i32),
            _ => r2.sqrt().powi(self.power as i32),
        }
    }

    /// Kernel value for the offset `(dx, dy)`.
    #[inline(always)]
    pub fn eval_offset(&self, dx: f64, dy: f64) -> f64 {
        self.eval_r2(dx * dx + dy * dy)
    }

    /// Partial derivative with respect to x, `power * dx * r^(power - 2)`.
    ///
    /// Defined as zero at the origin, where the `power == 1` kernel has a kink.
    #[inline(always)]
    pub fn eval_offset_dx(&self, dx: f64, dy: f64) -> f64 {
        self.radial_derivative_factor(dx * dx + dy * dy) * dx
    }

    /// Partial derivative with respect to y, `power * dy * r^(power - 2)`.
    #[inline(always)]
    pub fn eval_offset_dy(&self, dx: f64, dy: f64) -> f64 {
        self.radial_derivative_factor(dx * dx + dy * dy) * dy
    }

    #[inline(always)]
    fn radial_derivative_factor(&self, r2: f64) -> f64 {
        if r2 == 0.0 {
            return 0.0;
        }
        let p = self.power as f64;
        p * r2.powf((p - 2.0) / 2.0)
    }
}

impl KernelFunction for PhsKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        let r2 = get_distance_sq(target, source);
        self.eval_r2(r2)
    }
}

/// Returns the squared Euclidean distance between two points.
#[inline(always)]
pub fn get_distance_sq(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist
}
