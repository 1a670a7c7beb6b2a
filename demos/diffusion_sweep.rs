use log::{info, warn};
use transits::prelude::*;

/// Aggregates a full Vout / diffusion constant sweep and writes summary csv files.
/// Usage: `cargo run --example diffusion_sweep -- <root of CorrelationData>`
fn main() -> Result<(), TransitError> {
    pretty_env_logger::init();
    let root = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/CorrelationData".to_string());
    let layout = Layout::new(root);

    let vouts = vec![100.0, 150.0, 200.0, 300.0, 400.0];
    let diffs = vec![
        0.01, 0.015, 0.02, 0.025, 0.03, 0.035, 0.04, 0.045, 0.05, 0.055, 0.06, 0.065, 0.07, 0.075,
        0.08, 0.085, 0.09, 0.095, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6,
    ];

    let sweep = Collector::new().by_two_parameters(&vouts, &diffs, |v, d| layout.sweep_dir(v, d))?;

    for (vout, diff, err) in sweep.failures() {
        warn!("Vout={} D={}: {}", vout, diff, err);
    }
    for (vout, diff, median) in sweep.min_medians() {
        info!("Vout={}: minimal median = {} at D = {}", vout, median, diff);
    }

    utils::record(&sweep.summaries(), "transit_summaries.csv")?;
    for (vout, agg) in sweep.iter() {
        agg.record(format!("transit_means_vout_{}.csv", vout))?;
    }
    Ok(())
}
