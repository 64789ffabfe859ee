/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides smooth 2D test functions for validating and demonstrating local RBF interpolation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Franke's function plus four smooth fields scaled to a bounding rectangle.
use faer::Mat;
use std::{error::Error, f64::consts::PI, fmt, str::FromStr};

/// Struct that implements 2D functions to generate values for testing RBF
/// interpolation.
pub struct RBFTestFunctions;

impl RBFTestFunctions {
    /// Franke's two-dimensional test function:
    /// <div>
    /// $$
    /// \begin{aligned}
    /// F(x,y) &=
    /// \tfrac{3}{4}\exp\!\left[
    ///     -\frac{(9x-2)^2 + (9y-2)^2}{4}
    /// \right] \\[6pt]
    /// &\quad+ \tfrac{3}{4}\exp\!\left[
    ///     -\frac{(9x+1)^2}{49}
    ///     -\frac{(9y+1)^2}{10}
    /// \right] \\[6pt]
    /// &\quad+ \tfrac{1}{2}\exp\!\left[
    ///     -\frac{(9x-7)^2 + (9y-3)^2}{4}
    /// \right] \\[6pt]
    /// &\quad- \tfrac{1}{5}\exp\!\left[
    ///     -(9x-4)^2 - (9y-7)^2
    /// \right]
    /// \end{aligned}
    /// $$
    /// </div>
    pub fn franke_2d(points: &Mat<f64>) -> Mat<f64> {
        assert_eq!(points.ncols(), 2);

        Mat::from_fn(points.nrows(), 1, |i, _| {
            let nx = 9.0 * points[(i, 0)];
            let ny = 9.0 * points[(i, 1)];

            let term1 = 0.75 * (-((nx - 2.0).powi(2) + (ny - 2.0).powi(2)) / 4.0).exp();
            let term2 = 0.75 * (-(nx + 1.0).powi(2) / 49.0 - (ny + 1.0).powi(2) / 10.0).exp();
            let term3 = 0.5 * (-((nx - 7.0).powi(2) + (ny - 3.0).powi(2)) / 4.0).exp();
            let term4 = -0.2 * (-(nx - 4.0).powi(2) - (ny - 7.0).powi(2)).exp();

            term1 + term2 + term3 + term4
        })
    }
}

/// Smooth fields defined relative to a bounding rectangle `[a, b] x [c, d]`.
///
/// With `w = b - a`, `l = d - c` and `s = (w + l) / 2`:
/// - `PeaksAndValleys`: `cos(2πx/(w/2)) sin(2πy/(l/2))`
/// - `NarrowStripes`: `cos(2πx/(w/2)) cos(2πy/(l/2)) + sin(2πx/(w/2)) sin(2πy/(l/2))`
/// - `WideStripes`: the same with periods `w` and `l`
/// - `Bells`: three Gaussian bumps of width `0.16s`, `0.16s` and `0.10s`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothFunction {
    PeaksAndValleys,
    NarrowStripes,
    WideStripes,
    Bells,
}

/// (width factor, x fraction, y fraction) of each bump in [`SmoothFunction::Bells`].
const BELLS: [(f64, f64, f64); 3] = [(0.16, 0.20, 0.70), (0.16, 0.64, 0.10), (0.10, 0.82, 0.76)];

impl SmoothFunction {
    /// Evaluates the function at a single point. `extents` is `[a, c, b, d]`,
    /// matching [`crate::combined_extents`].
    pub fn value(&self, x: f64, y: f64, extents: [f64; 4]) -> f64 {
        let [a, c, b, d] = extents;
        let w = b - a;
        let ell = d - c;

        let stripes = |px: f64, py: f64| {
            let (u, v) = (2.0 * PI * x / px, 2.0 * PI * y / py);
            u.cos() * v.cos() + u.sin() * v.sin()
        };

        match self {
            SmoothFunction::PeaksAndValleys => {
                (2.0 * PI * x / (w / 2.0)).cos() * (2.0 * PI * y / (ell / 2.0)).sin()
            }
            SmoothFunction::NarrowStripes => stripes(w / 2.0, ell / 2.0),
            SmoothFunction::WideStripes => stripes(w, ell),
            SmoothFunction::Bells => {
                let s = (w + ell) / 2.0;
                BELLS
                    .iter()
                    .map(|&(k, px, py)| {
                        let r2 = (x - (a + px * w)).powi(2) + (y - (c + py * ell)).powi(2);
                        (-(1.0 / (k * s)).powi(2) * r2).exp()
                    })
                    .sum()
            }
        }
    }

    /// Evaluates the function at every row of an `(n x 2)` point matrix.
    pub fn evaluate(&self, points: &Mat<f64>, extents: [f64; 4]) -> Mat<f64> {
        Mat::from_fn(points.nrows(), 1, |i, _| {
            self.value(points[(i, 0)], points[(i, 1)], extents)
        })
    }
}

/// Error returned when parsing an unknown [`SmoothFunction`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSmoothFunctionError {
    pub name: String,
}

impl fmt::Display for ParseSmoothFunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown function {:?}, expected one of: (1) \"peaks and valleys\", \
             (2) \"narrow stripes\", (3) \"wide stripes\", (4) \"bells\"",
            self.name
        )
    }
}

impl Error for ParseSmoothFunctionError {}

impl FromStr for SmoothFunction {
    type Err = ParseSmoothFunctionError;

    /// Accepts the function name, case-insensitively, or its number `1` to `4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "peaks and valleys" | "1" => Ok(SmoothFunction::PeaksAndValleys),
            "narrow stripes" | "2" => Ok(SmoothFunction::NarrowStripes),
            "wide stripes" | "3" => Ok(SmoothFunction::WideStripes),
            "bells" | "4" => Ok(SmoothFunction::Bells),
            _ => Err(ParseSmoothFunctionError { name: s.to_string() }),
        }
    }
}
