use log::info;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use std::fs;
use std::io::Write;
use transits::prelude::*;

/// Writes a synthetic sweep of exponential exit ticks, aggregates it, and checks each
/// outflow volume's lowest median against the theoretical median transit time.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let dir = tempfile::tempdir()?;
    let layout = Layout::new(dir.path());
    let mut rng = rand::rngs::StdRng::seed_from_u64(1004);

    let vouts = vec![100.0, 400.0, 1000.0];
    let diffs = vec![0.01, 0.1, 0.5];
    for &vout in vouts.iter() {
        let tau = theory::exact_median(1500.0, vout, 30.0, 2.5)?;
        for &diff in diffs.iter() {
            // exponential exit times with median tau, stretched at slow diffusion
            let rate = std::f64::consts::LN_2 / (tau * (1.0 + 0.01 / diff));
            let exp = Exp::new(rate)?;
            let folder = layout.sweep_dir(vout, diff);
            fs::create_dir_all(&folder)?;
            for run in 0..10 {
                let mut file = fs::File::create(folder.join(format!("run_{}.txt", run)))?;
                writeln!(file, "synthetic run {}", run)?;
                writeln!(file, "who,{},xcor", TICK_COLUMN)?;
                for who in 0..200 {
                    writeln!(file, "{},{:.0},0", who, exp.sample(&mut rng))?;
                }
            }
        }
    }

    let sweep = Collector::new().by_two_parameters(&vouts, &diffs, |v, d| layout.sweep_dir(v, d))?;
    for (vout, diff, median) in sweep.min_medians() {
        let tau = theory::exact_median(1500.0, vout, 30.0, 2.5)?;
        info!(
            "Vout={}: lowest replicate-mean median {:.1} at D={}, theoretical median {:.1}",
            vout, median, diff, tau
        );
    }
    Ok(())
}
