/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies basis, polynomial degree, and subdomain grid options for local RBF interpolation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies basis, polynomial degree, and subdomain grid options for local RBF interpolation.
use crate::error::InterpError;
use phs_rbf_utils::PhsKernel;
use serde::{Deserialize, Serialize};

/// Highest supported polynomial degree.
pub const MAX_DEGREE: usize = 4;

/// The local approximation basis used inside each subdomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Basis {
    /// Polyharmonic spline `r^power` augmented with polynomials up to the
    /// configured degree. The local system interpolates the halo nodes exactly.
    RbfPlusPoly { power: u32 },

    /// Polynomials only, fitted to the halo nodes by least squares.
    PolyOnly,
}

impl Basis {
    /// Returns the PHS kernel for this basis, if any.
    pub fn kernel(&self) -> Option<PhsKernel> {
        match self {
            Basis::RbfPlusPoly { power } => Some(PhsKernel::new(*power)),
            Basis::PolyOnly => None,
        }
    }
}

impl Default for Basis {
    fn default() -> Self {
        Basis::RbfPlusPoly { power: 3 }
    }
}

/// How the rectangular subdomain grid is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSizing {
    /// Refine the grid until the halos become too sparse for the local systems.
    Auto,

    /// Use exactly `nx` columns by `ny` rows of subdomains.
    Fixed { nx: usize, ny: usize },
}

impl GridSizing {
    /// Builds a [`GridSizing`] from optional grid dimensions.
    ///
    /// Both `None` selects [`GridSizing::Auto`]. Supplying only one dimension,
    /// or a zero dimension, is an error.
    pub fn from_dims(nx: Option<usize>, ny: Option<usize>) -> Result<Self, InterpError> {
        match (nx, ny) {
            (None, None) => Ok(GridSizing::Auto),
            (Some(x), Some(y)) if x > 0 && y > 0 => Ok(GridSizing::Fixed { nx: x, ny: y }),
            _ => Err(InterpError::InvalidGrid { nx, ny }),
        }
    }
}

impl Default for GridSizing {
    fn default() -> Self {
        GridSizing::Auto
    }
}

/// A convenience builder for constructing an [`InterpolationSettings`] instance.
///
/// The builder should be called via the [`InterpolationSettings::builder`] method.
///
/// See [`InterpolationSettings`] for details on each field.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationSettingsBuilder {
    pub basis: Basis,
    pub degree: usize,
    pub grid: GridSizing,
}

impl InterpolationSettingsBuilder {
    fn new(basis: Basis) -> Self {
        Self {
            basis,
            degree: 1,
            grid: GridSizing::Auto,
        }
    }

    /// Sets the polynomial degree (0 to 4).
    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    /// Sets how the subdomain grid is sized.
    pub fn grid(mut self, grid: GridSizing) -> Self {
        self.grid = grid;
        self
    }

    /// Builds and returns an instance of [`InterpolationSettings`] from the values
    /// defined in the builder.
    pub fn build(self) -> InterpolationSettings {
        InterpolationSettings {
            basis: self.basis,
            degree: self.degree,
            grid: self.grid,
        }
    }
}

/// Settings describing the local interpolant.
///
/// # Basis
/// [`Basis::RbfPlusPoly`] solves a square RBF plus polynomial system in each
/// subdomain halo and reproduces the node values. [`Basis::PolyOnly`] fits a
/// polynomial by least squares and smooths rather than interpolates.
///
/// # Degree
/// Polynomials up to total degree `degree` are appended, giving
/// `(degree + 1)(degree + 2) / 2` terms. Degrees 0 to 4 are supported.
///
/// # Grid
/// [`GridSizing::Auto`] picks the subdomain grid from the node density,
/// [`GridSizing::Fixed`] uses the given dimensions.
///
/// The defaults (cubic PHS, linear polynomials, automatic grid) are a good
/// starting point for smooth data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationSettings {
    /// The local approximation basis.
    pub basis: Basis,

    /// Total degree of the appended polynomial.
    pub degree: usize,

    /// Subdomain grid sizing.
    pub grid: GridSizing,
}

impl InterpolationSettings {
    /// Returns a new [`InterpolationSettingsBuilder`] for the given basis.
    pub fn builder(basis: Basis) -> InterpolationSettingsBuilder {
        InterpolationSettingsBuilder::new(basis)
    }

    /// Number of polynomial terms for the configured degree.
    pub fn num_polynomials(&self) -> usize {
        crate::polynomials::num_polynomials(self.degree)
    }

    /// Checks the settings for values that no interpolation could use.
    pub fn validate(&self) -> Result<(), InterpError> {
        if self.degree > MAX_DEGREE {
            return Err(InterpError::InvalidDegree {
                degree: self.degree,
            });
        }
        if let Basis::RbfPlusPoly { power } = self.basis {
            if power == 0 {
                return Err(InterpError::InvalidRbfPower { power });
            }
        }
        if let GridSizing::Fixed { nx, ny } = self.grid {
            if nx == 0 || ny == 0 {
                return Err(InterpError::InvalidGrid {
                    nx: Some(nx),
                    ny: Some(ny),
                });
            }
        }
        Ok(())
    }
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        InterpolationSettings::builder(Basis::default()).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_cubic_linear_auto() {
        let s = InterpolationSettings::default();
        assert_eq!(s.basis, Basis::RbfPlusPoly { power: 3 });
        assert_eq!(s.degree, 1);
        assert_eq!(s.grid, GridSizing::Auto);
        assert_eq!(s.num_polynomials(), 3);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn grid_dims_must_be_paired() {
        assert_eq!(GridSizing::from_dims(None, None), Ok(GridSizing::Auto));
        assert_eq!(
            GridSizing::from_dims(Some(4), Some(3)),
            Ok(GridSizing::Fixed { nx: 4, ny: 3 })
        );
        assert_eq!(
            GridSizing::from_dims(Some(4), None),
            Err(InterpError::InvalidGrid {
                nx: Some(4),
                ny: None
            })
        );
        assert!(GridSizing::from_dims(Some(0), Some(2)).is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let deg = InterpolationSettings::builder(Basis::PolyOnly).degree(5).build();
        assert_eq!(deg.validate(), Err(InterpError::InvalidDegree { degree: 5 }));

        let pow = InterpolationSettings::builder(Basis::RbfPlusPoly { power: 0 }).build();
        assert_eq!(pow.validate(), Err(InterpError::InvalidRbfPower { power: 0 }));

        let grid = InterpolationSettings::builder(Basis::PolyOnly)
            .grid(GridSizing::Fixed { nx: 0, ny: 1 })
            .build();
        assert!(grid.validate().is_err());
    }

    #[test]
    fn settings_round_trip_through_json() {
        let s = InterpolationSettings::builder(Basis::RbfPlusPoly { power: 5 })
            .degree(2)
            .grid(GridSizing::Fixed { nx: 3, ny: 2 })
            .build();
        let text = serde_json::to_string(&s).unwrap();
        let back: InterpolationSettings = serde_json::from_str(&text).unwrap();
        assert_eq!(s, back);
    }
}
