use std::env;

use phs_rbf::{
    GridSizing, LocalRbfInterpolator, SmoothFunction, combined_extents, jostle_grid,
    interpolant_config::{Basis, InterpolationSettings},
    load_array, save_array,
};

/// Interpolates a smooth field from a jostled grid of nodes onto a regular grid.
///
/// Usage: `jostled_grid [function] [output_dir]`, where `function` is one of
/// "peaks and valleys", "narrow stripes", "wide stripes", "bells", or `1` to `4`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let function: SmoothFunction = match args.next() {
        Some(name) => name.parse()?,
        None => SmoothFunction::PeaksAndValleys,
    };
    let output_dir = args.next().map(std::path::PathBuf::from).unwrap_or_else(env::temp_dir);

    // Nodes on a jostled 100 x 100 grid, evaluation points on an exact 150 x 150 grid
    let domain = [0.0, 0.0, 50_000.0, 50_000.0];
    let nodes = jostle_grid(100, 100, 0.3, domain, Some(7));
    let targets = jostle_grid(150, 150, 0.0, domain, None);

    let extents = combined_extents(&nodes, &targets);
    let values = function.evaluate(&nodes, extents);
    let exact = function.evaluate(&targets, extents);

    for (basis, grid) in [
        (Basis::RbfPlusPoly { power: 3 }, GridSizing::Auto),
        (Basis::RbfPlusPoly { power: 5 }, GridSizing::Fixed { nx: 12, ny: 12 }),
        (Basis::PolyOnly, GridSizing::Auto),
    ] {
        let settings = InterpolationSettings::builder(basis).degree(2).grid(grid).build();
        let rbfi = LocalRbfInterpolator::builder(settings).build();

        let start = std::time::Instant::now();
        let fitted = rbfi.interpolate_points(&nodes, &values, &targets)?;

        let max_error = (0..exact.nrows()).fold(0.0f64, |acc, i| {
            acc.max((fitted[(i, 0)] - exact[(i, 0)]).abs())
        });
        println!(
            "{:?} on {:?}: max error {:.3e} in {:?}",
            basis,
            grid,
            max_error,
            start.elapsed()
        );
    }

    // Array files hold one value per line
    let path = output_dir.join("fe.txt");
    let exact_values: Vec<f64> = exact.col(0).iter().copied().collect();
    save_array(&path, &exact_values)?;
    assert_eq!(load_array(&path)?.len(), exact_values.len());
    println!("Wrote {}", path.display());

    Ok(())
}
