/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the local RBF interpolator, input validation, and subdomain solve orchestration.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    cancel::{CancelToken, StopCheck},
    common::{self, NormalizedFrame},
    config::Params,
    domain::{LocalSolver, SubdomainResult},
    error::InterpError,
    interpolant_config::InterpolationSettings,
    partition::{Partition, PartitionContext},
    progress::{self, ProgressMsg, ProgressSink},
    rtree::PointRTree,
};

use faer::Mat;
use rayon::prelude::*;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// A subdomain whose local solve failed during [`LocalRbfInterpolator::interpolate_isolated`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubdomainFailure {
    /// Index of the failed subdomain, `j * nx + i`.
    pub subdomain: usize,

    /// Evaluation points owned by the subdomain, left unwritten.
    pub eval_indices: Vec<usize>,

    /// Why the local solve failed.
    pub error: InterpError,
}

/// Result of an interpolation that isolates per-subdomain failures.
#[derive(Debug, Clone)]
pub struct PartialInterpolation {
    /// One value per evaluation point. Points owned by a failed subdomain are NaN.
    pub values: Vec<f64>,

    /// The subdomains that could not be solved, in subdomain order.
    pub failures: Vec<SubdomainFailure>,
}

impl PartialInterpolation {
    /// Returns `true` when every subdomain was solved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts to the all-or-nothing result, returning the first failure if any.
    pub fn into_result(self) -> Result<Vec<f64>, InterpError> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.values),
        }
    }
}

/// Convenience builder for constructing a [`LocalRbfInterpolator`].
///
/// The builder should be called via the [`LocalRbfInterpolator::builder`] method.
///
/// See [`LocalRbfInterpolator`] for details on each field.
pub struct LocalRbfInterpolatorBuilder {
    settings: InterpolationSettings,
    params: Params,
    progress_callback: Option<Arc<dyn ProgressSink>>,
    cancel_token: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl LocalRbfInterpolatorBuilder {
    fn new(settings: InterpolationSettings) -> Self {
        Self {
            settings,
            params: Params::default(),
            progress_callback: None,
            cancel_token: None,
            deadline: None,
        }
    }

    /// Sets custom partition and execution parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Optional callback for reporting progress.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Token the caller can trigger to stop a running interpolation.
    pub fn cancel_token(mut self, cancel_token: CancelToken) -> Self {
        self.cancel_token = Some(cancel_token);
        self
    }

    /// Point in time after which no further subdomains are started.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Like [`LocalRbfInterpolatorBuilder::deadline`], measured from now.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Builds and returns the configured [`LocalRbfInterpolator`].
    pub fn build(self) -> LocalRbfInterpolator {
        LocalRbfInterpolator {
            settings: self.settings,
            params: self.params,
            progress_callback: self.progress_callback,
            stop: StopCheck {
                token: self.cancel_token,
                deadline: self.deadline,
            },
        }
    }
}

/// Interpolates scattered 2D data with local PHS RBF + polynomial systems.
///
/// The bounding rectangle of the nodes and evaluation points is divided into
/// a grid of rectangular subdomains. Each subdomain solves a small dense system
/// over the nodes in its halo (three times the cell size by default) and
/// evaluates it at the evaluation points inside its own cell. Every
/// evaluation point is owned by exactly one cell, so the output is assembled
/// without overlap.
///
/// The interpolator holds configuration only. Each call is independent and
/// nothing is cached between calls.
///
/// ### Example
/// ```
/// use phs_rbf::{LocalRbfInterpolator, InterpolationSettings, Basis, jostle_grid};
///
/// let nodes = jostle_grid(16, 16, 0.3, [0.0, 0.0, 1.0, 1.0], Some(1));
/// let x: Vec<f64> = nodes.col(0).iter().copied().collect();
/// let y: Vec<f64> = nodes.col(1).iter().copied().collect();
/// let f: Vec<f64> = x.iter().zip(&y).map(|(x, y)| x + 2.0 * y).collect();
///
/// let settings = InterpolationSettings::builder(Basis::PolyOnly).degree(1).build();
/// let rbfi = LocalRbfInterpolator::builder(settings).build();
///
/// let fe = rbfi.interpolate(&x, &y, &f, &[0.0, 1.0], &[0.0, 1.0])?;
/// assert!((fe[0] - 0.0).abs() < 1e-6);
/// assert!((fe[1] - 3.0).abs() < 1e-6);
/// # Ok::<(), phs_rbf::InterpError>(())
/// ```
#[derive(Debug)]
pub struct LocalRbfInterpolator {
    /// Basis, polynomial degree, and grid sizing.
    pub settings: InterpolationSettings,

    /// Partition and execution parameters.
    pub params: Params,

    progress_callback: Option<Arc<dyn ProgressSink>>,

    stop: StopCheck,
}

/// Everything a run needs after validation, normalization, and partitioning.
struct Prepared {
    frame: NormalizedFrame,
    values: Vec<f64>,
    tree: PointRTree,
    partition: Partition,
    owned: Vec<Vec<usize>>,
}

type TaskOutcome = (usize, Vec<usize>, Result<SubdomainResult, InterpError>);

impl LocalRbfInterpolator {
    /// Creates a new [`LocalRbfInterpolatorBuilder`] for the given settings.
    pub fn builder(settings: InterpolationSettings) -> LocalRbfInterpolatorBuilder {
        LocalRbfInterpolatorBuilder::new(settings)
    }

    /// Interpolates `(nodes_x, nodes_y, values)` to the evaluation points.
    ///
    /// Returns one value per evaluation point, in input order. Any subdomain
    /// failure aborts the interpolation; see
    /// [`LocalRbfInterpolator::interpolate_isolated`] for a partial result.
    ///
    /// ### Errors
    /// - Configuration errors for mismatched lengths, empty or non-finite input,
    ///   and invalid settings, before any work is done.
    /// - [`InterpError::InsufficientLocalNodes`] when a subdomain halo is too sparse.
    /// - [`InterpError::SingularLocalSystem`] when a local solve breaks down.
    /// - [`InterpError::PartitionLimitReached`], [`InterpError::Cancelled`], and
    ///   [`InterpError::DeadlineExceeded`] from the run controls.
    pub fn interpolate(
        &self,
        nodes_x: &[f64],
        nodes_y: &[f64],
        values: &[f64],
        eval_x: &[f64],
        eval_y: &[f64],
    ) -> Result<Vec<f64>, InterpError> {
        let start = Instant::now();
        let prepared = self.prepare_slices(nodes_x, nodes_y, values, eval_x, eval_y)?;

        let results = match self.params.parallel {
            true => {
                let outcomes = self.run_tasks(&prepared);
                let mut results = Vec::with_capacity(outcomes.len());
                for (_, _, outcome) in outcomes {
                    results.push(outcome?);
                }
                results
            }
            false => {
                let solver = self.local_solver(&prepared);
                let completed = AtomicUsize::new(0);
                prepared
                    .owned
                    .iter()
                    .enumerate()
                    .map(|(index, eval)| {
                        self.run_one(&solver, &prepared.partition, index, eval.clone(), &completed)
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let mut output = vec![0.0; prepared.frame.targets.nrows()];
        scatter(&mut output, &results);

        self.finish(start, &prepared);
        Ok(output)
    }

    /// Like [`LocalRbfInterpolator::interpolate`], but a failed subdomain only
    /// leaves its own evaluation points unwritten.
    ///
    /// Configuration, normalization, partition, and cancellation errors are
    /// still returned as `Err`.
    pub fn interpolate_isolated(
        &self,
        nodes_x: &[f64],
        nodes_y: &[f64],
        values: &[f64],
        eval_x: &[f64],
        eval_y: &[f64],
    ) -> Result<PartialInterpolation, InterpError> {
        let start = Instant::now();
        let prepared = self.prepare_slices(nodes_x, nodes_y, values, eval_x, eval_y)?;

        let outcomes = self.run_tasks(&prepared);

        let mut values = vec![f64::NAN; prepared.frame.targets.nrows()];
        let mut failures = Vec::new();

        for (subdomain, eval_indices, outcome) in outcomes {
            match outcome {
                Ok(result) => scatter(&mut values, std::slice::from_ref(&result)),
                Err(err @ (InterpError::Cancelled | InterpError::DeadlineExceeded)) => {
                    return Err(err);
                }
                Err(error) => failures.push(SubdomainFailure {
                    subdomain,
                    eval_indices,
                    error,
                }),
            }
        }

        self.finish(start, &prepared);
        Ok(PartialInterpolation { values, failures })
    }

    /// Matrix form of [`LocalRbfInterpolator::interpolate`].
    ///
    /// `nodes` and `targets` hold one `(x, y)` point per row and `values` one
    /// value per node in its first column. Returns an `(n_targets x 1)` matrix.
    pub fn interpolate_points(
        &self,
        nodes: &Mat<f64>,
        values: &Mat<f64>,
        targets: &Mat<f64>,
    ) -> Result<Mat<f64>, InterpError> {
        check_columns("nodes", nodes)?;
        check_columns("targets", targets)?;
        if values.ncols() != 1 {
            return Err(InterpError::LengthMismatch {
                what: "value columns",
                expected: 1,
                found: values.ncols(),
            });
        }

        let column = |m: &Mat<f64>, j: usize| m.col(j).iter().copied().collect::<Vec<f64>>();

        let fitted = self.interpolate(
            &column(nodes, 0),
            &column(nodes, 1),
            &column(values, 0),
            &column(targets, 0),
            &column(targets, 1),
        )?;

        Ok(Mat::from_fn(fitted.len(), 1, |i, _| fitted[i]))
    }

    fn emit(&self, msg: ProgressMsg) {
        if let Some(sink) = &self.progress_callback {
            sink.emit(msg);
        }
    }

    fn prepare_slices(
        &self,
        nodes_x: &[f64],
        nodes_y: &[f64],
        values: &[f64],
        eval_x: &[f64],
        eval_y: &[f64],
    ) -> Result<Prepared, InterpError> {
        check_length("nodes_y", nodes_x.len(), nodes_y.len())?;
        check_length("values", nodes_x.len(), values.len())?;
        check_length("eval_y", eval_x.len(), eval_y.len())?;
        if nodes_x.is_empty() {
            return Err(InterpError::EmptyNodes);
        }

        for (what, data) in [
            ("nodes_x", nodes_x),
            ("nodes_y", nodes_y),
            ("values", values),
            ("eval_x", eval_x),
            ("eval_y", eval_y),
        ] {
            check_finite(what, data)?;
        }

        self.settings.validate()?;
        self.params.partition.validate()?;

        let num_polys = self.settings.num_polynomials();

        self.emit(ProgressMsg::Configuration {
            num_nodes: nodes_x.len(),
            num_targets: eval_x.len(),
            num_polynomials: num_polys,
        });

        let frame = common::normalize(
            &common::points_from_slices(nodes_x, nodes_y),
            &common::points_from_slices(eval_x, eval_y),
        )?;

        let tree = PointRTree::new(&frame.nodes);
        let extents = common::combined_extents(&frame.nodes, &frame.targets);

        let partition = PartitionContext {
            tree: &tree,
            params: &self.params.partition,
            num_polys,
            parallel: self.params.parallel,
            stop: &self.stop,
            progress: self.progress_callback.as_ref(),
        }
        .build(extents, self.settings.grid)?;

        let owned = partition.assign_points(&frame.targets);

        Ok(Prepared {
            frame,
            values: values.to_vec(),
            tree,
            partition,
            owned,
        })
    }

    fn local_solver<'a>(&self, prepared: &'a Prepared) -> LocalSolver<'a> {
        let partition_params = &self.params.partition;
        LocalSolver {
            nodes: &prepared.frame.nodes,
            values: &prepared.values,
            targets: &prepared.frame.targets,
            tree: &prepared.tree,
            basis: self.settings.basis,
            degree: self.settings.degree,
            halo_scale: partition_params.halo_scale,
            min_local_nodes: partition_params.min_local_nodes(self.settings.num_polynomials()),
        }
    }

    /// Checks the run controls, solves one subdomain, and reports progress.
    fn run_one(
        &self,
        solver: &LocalSolver<'_>,
        partition: &Partition,
        index: usize,
        eval_indices: Vec<usize>,
        completed: &AtomicUsize,
    ) -> Result<SubdomainResult, InterpError> {
        self.stop.check()?;

        let result = solver.solve(&partition.subdomain(index), eval_indices);

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        let total = partition.len();
        self.emit(ProgressMsg::SubdomainSolved {
            completed: done,
            total,
            progress: progress::progress_fraction(done, total),
        });

        result
    }

    /// Runs every subdomain, in parallel when enabled, and returns the
    /// outcomes in subdomain order.
    fn run_tasks(&self, prepared: &Prepared) -> Vec<TaskOutcome> {
        let solver = self.local_solver(prepared);
        let completed = AtomicUsize::new(0);

        let task = |(index, eval): (usize, &Vec<usize>)| -> TaskOutcome {
            let outcome = self.run_one(&solver, &prepared.partition, index, eval.clone(), &completed);
            (index, eval.clone(), outcome)
        };

        match self.params.parallel {
            true => prepared.owned.par_iter().enumerate().map(task).collect(),
            false => prepared.owned.iter().enumerate().map(task).collect(),
        }
    }

    fn finish(&self, start: Instant, prepared: &Prepared) {
        if self.progress_callback.is_none() {
            return;
        }

        let elapsed = start.elapsed();
        let num_targets = prepared.frame.targets.nrows();

        self.emit(ProgressMsg::Finished {
            elapsed,
            num_targets,
        });
        self.emit(ProgressMsg::Message {
            message: format!(
                "Took {:?} to interpolate {} nodes to {} points using the following settings:\n\
                 Basis: {:?}, Polynomial degree: {}\n\
                 Subdomains: {} x {}",
                elapsed,
                prepared.frame.nodes.nrows(),
                num_targets,
                self.settings.basis,
                self.settings.degree,
                prepared.partition.nx,
                prepared.partition.ny,
            ),
        });
    }
}

/// Interpolates scattered 2D data with the given settings and default parameters.
///
/// Shorthand for building a [`LocalRbfInterpolator`] and calling
/// [`LocalRbfInterpolator::interpolate`].
///
/// ### Example
/// ```
/// use phs_rbf::{interpolate, InterpolationSettings};
///
/// let x = [0.0, 1.0, 0.0, 1.0, 0.5];
/// let y = [0.0, 0.0, 1.0, 1.0, 0.5];
/// let f = [1.0, 2.0, 3.0, 4.0, 2.5];
///
/// let fe = interpolate(&x, &y, &f, &[0.5], &[0.5], &InterpolationSettings::default())?;
/// assert!((fe[0] - 2.5).abs() < 1e-10);
/// # Ok::<(), phs_rbf::InterpError>(())
/// ```
pub fn interpolate(
    nodes_x: &[f64],
    nodes_y: &[f64],
    values: &[f64],
    eval_x: &[f64],
    eval_y: &[f64],
    settings: &InterpolationSettings,
) -> Result<Vec<f64>, InterpError> {
    LocalRbfInterpolator::builder(*settings)
        .build()
        .interpolate(nodes_x, nodes_y, values, eval_x, eval_y)
}

fn scatter(output: &mut [f64], results: &[SubdomainResult]) {
    for result in results {
        for (&i, &v) in result.eval_indices.iter().zip(&result.values) {
            output[i] = v;
        }
    }
}

fn check_length(what: &'static str, expected: usize, found: usize) -> Result<(), InterpError> {
    match expected == found {
        true => Ok(()),
        false => Err(InterpError::LengthMismatch {
            what,
            expected,
            found,
        }),
    }
}

fn check_columns(what: &'static str, points: &Mat<f64>) -> Result<(), InterpError> {
    match points.ncols() {
        2 => Ok(()),
        found => Err(InterpError::LengthMismatch {
            what,
            expected: 2,
            found,
        }),
    }
}

fn check_finite(what: &'static str, data: &[f64]) -> Result<(), InterpError> {
    match data.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(InterpError::NonFiniteInput { what, index }),
        None => Ok(()),
    }
}
