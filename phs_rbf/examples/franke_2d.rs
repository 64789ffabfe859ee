use phs_rbf::generate_random_points;
use phs_rbf::{
    LocalRbfInterpolator, RBFTestFunctions, create_evaluation_grid,
    interpolant_config::{Basis, InterpolationSettings},
    progress::{ProgressMsg, closure_sink},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Scattered source points in [0, 1]^2
    let num_points = 20_000usize;
    let points = generate_random_points(num_points, 2, Some(42));

    // Define some values at the source points using Franke's function
    let point_values = RBFTestFunctions::franke_2d(&points);

    // Cubic PHS with quadratic polynomials
    let interpolation_settings = InterpolationSettings::builder(Basis::RbfPlusPoly { power: 3 })
        .degree(2)
        .build();

    // Print the summary message once the interpolation finishes
    let (sink, listener) = closure_sink(256, |msg: ProgressMsg| {
        if let ProgressMsg::Message { message } = msg {
            println!("{message}");
        }
    });

    let rbfi = LocalRbfInterpolator::builder(interpolation_settings)
        .progress_callback(sink)
        .build();

    // Build a 2D grid of target points in [0, 1]^2 to evaluate at
    let n = 200;
    let target_points = create_evaluation_grid([0.0, 0.0, 1.0, 1.0], n, n);

    let interpolated_values = rbfi.interpolate_points(&points, &point_values, &target_points)?;

    let exact = RBFTestFunctions::franke_2d(&target_points);
    let max_error = (0..exact.nrows()).fold(0.0f64, |acc, i| {
        acc.max((interpolated_values[(i, 0)] - exact[(i, 0)]).abs())
    });
    println!("Max error on {} x {} grid: {:.3e}", n, n, max_error);

    drop(rbfi);
    let _ = listener.join();

    Ok(())
}
