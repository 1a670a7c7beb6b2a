use log::info;
use transits::prelude::*;

/// Compares the closed-form median transit time with its 10th order Taylor approximation.
fn main() -> Result<(), TransitError> {
    pretty_env_logger::init();
    let vouts = vec![
        100.0, 150.0, 200.0, 300.0, 400.0, 600.0, 800.0, 1000.0, 1200.0, 1400.0,
    ];
    let curve = theory::compare_curve(10, 1500.0, &vouts, 30.0, 2.5)?;
    for p in curve.iter() {
        info!(
            "Vout = {} ml/day: exact {:.2} min, approx {:.2} min",
            p.outflow,
            p.exact,
            p.approximate.unwrap_or(f64::NAN)
        );
    }
    utils::record(&curve, "theoretical_median.csv")?;
    Ok(())
}
