/*!
* # Transits - Aggregating agent-based colon transit simulations.
* An agent-based model of the colon releases particles at the inflow end and records the tick at which each
* one leaves.  Every run of the model at a fixed diffusion constant and outflow volume writes one replicate
* file, and a parameter sweep produces a folder tree of them.  The functions in this crate reduce each
* replicate to its mean transit time, group the means by diffusion constant (and outflow volume), and
* compute the theoretical median transit time the simulation should reproduce.
*
* Reading is parallel across parameter values and across files, and every parameter value carries its own
* `Result`, so one unreadable folder does not hide the others.
*
*  ## Quick Start
*
* To use transits, add it to your `Cargo.toml`
* ```toml
* [dependencies]
* transits = "^0.1.0"
* ```
*
*  - Load the crate prelude in the preamble of your `main.rs`.
*  - Point a [Layout](sweep/struct.Layout.html) at the root of the simulator output and aggregate:
* ```no_run
* use transits::prelude::*;
*
* fn main() -> Result<(), TransitError> {
*     let layout = Layout::new("data/CorrelationData");
*     let vouts = vec![100.0, 150.0, 200.0];
*     let diffs = vec![0.01, 0.015, 0.02, 0.1];
*
*     let sweep = Collector::new()
*         .threads(4)
*         .by_two_parameters(&vouts, &diffs, |v, d| layout.sweep_dir(v, d))?;
*
*     for (vout, diffusion, median) in sweep.min_medians() {
*         let theory = theory::exact_median(1500.0, vout, 30.0, 2.5)?;
*         println!("Vout={}: lowest median {} at D={}, theory {}", vout, median, diffusion, theory);
*     }
*     utils::record(&sweep.summaries(), "summaries.csv")?;
*     Ok(())
* }
* ```
*
* Replicate files are plain comma-separated text: a metadata row, a header row, then one row per particle.
* The exit tick is read from the column labelled `"  turtle_die_tick "`, spaces included.
*
* ```rust
* use transits::prelude::*;
*
* let a = Replicate::from_ticks("a.txt", vec![1.0, 2.0, 3.0]);
* let b = Replicate::from_ticks("b.txt", vec![4.0, 5.0, 6.0]);
* assert_eq!(summarize(&[a, b])?, vec![2.0, 5.0]);
* # Ok::<(), TransitError>(())
* ```
*/

#![warn(missing_docs)]
pub mod errors;
pub mod replicate;
pub mod sweep;
pub mod theory;
pub mod utils;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::errors::TransitError;
    pub use crate::replicate::{discover, ingest, summarize, Replicate, TICK_COLUMN};
    pub use crate::sweep::{
        aggregate_by_parameter, aggregate_by_two_parameters, Aggregation, Collector, Layout,
        Param, Summary, Sweep,
    };
    pub use crate::theory;
    pub use crate::utils;
}
