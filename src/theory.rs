//! Theoretical median transit time of a colon with constant inflow and outflow volumes.
//!
//! With inflow volume `Vin`, outflow volume `Vout`, colon length `L` and radius `R`:
//!
//! ```text
//! τ_median = 8/27 · 1440 · L · π · R² / (Vin - Vout) · ln(Vin / Vout)
//! ```
//!
//! 1440 converts volumes per day into minutes.  The logarithm can be replaced by its Taylor
//! expansion around `Vout / Vin = 1`, see [approximate_median].
use crate::errors::TransitError;
use serde::Serialize;
use std::f64::consts::PI;

/// Shape constant of the residence time distribution.
pub const SHAPE: f64 = 8.0 / 27.0;

/// Minutes per day.
pub const MINUTES_PER_DAY: f64 = 1440.0;

fn prefactor(length: f64, radius: f64) -> f64 {
    SHAPE * MINUTES_PER_DAY * length * PI * radius.powi(2)
}

fn check_volumes(inflow: f64, outflow: f64) -> Result<(), TransitError> {
    if !(inflow > 0.0 && inflow.is_finite()) {
        return Err(TransitError::DomainError(format!(
            "inflow volume must be positive, got {}",
            inflow
        )));
    }
    if !(outflow > 0.0 && outflow.is_finite()) {
        return Err(TransitError::DomainError(format!(
            "outflow volume must be positive, got {}",
            outflow
        )));
    }
    Ok(())
}

/// Median transit time in minutes.
///  - `inflow` and `outflow` are volumes per day, both positive and not equal.
///  - `length` and `radius` describe the simulated colon.
///
/// # Examples
///
/// ```rust
/// let tau = transits::theory::exact_median(1500.0, 100.0, 30.0, 2.5).unwrap();
/// assert!((tau - 486.148).abs() < 1e-3);
/// ```
pub fn exact_median(
    inflow: f64,
    outflow: f64,
    length: f64,
    radius: f64,
) -> Result<f64, TransitError> {
    check_volumes(inflow, outflow)?;
    if inflow == outflow {
        return Err(TransitError::DomainError(format!(
            "inflow and outflow volumes are both {}",
            inflow
        )));
    }
    Ok(prefactor(length, radius) / (inflow - outflow) * (inflow / outflow).ln())
}

/// Truncated series `Σ_{i=0}^{order-1} (-1)^i (x - 1)^i / (i + 1)` with `x = outflow / inflow`,
/// which tends to `ln(inflow / outflow) / (1 - outflow / inflow)` as `order` grows.
/// Converges for `0 < outflow < 2 · inflow`.
pub fn taylor_factor(order: usize, inflow: f64, outflow: f64) -> Result<f64, TransitError> {
    if order < 1 {
        return Err(TransitError::DomainError(
            "series order must be at least 1".to_string(),
        ));
    }
    check_volumes(inflow, outflow)?;
    let step = 1.0 - outflow / inflow;
    let mut term = 1.0;
    let mut sum = 0.0;
    for i in 0..order {
        sum += term / (i + 1) as f64;
        term *= step;
    }
    Ok(sum)
}

/// Median transit time with the logarithm replaced by a Taylor series of `order` terms.
/// Defined at `inflow == outflow`, where every term past the first vanishes.
///
/// # Examples
///
/// ```rust
/// use transits::theory::{approximate_median, exact_median};
///
/// let exact = exact_median(1500.0, 1400.0, 30.0, 2.5).unwrap();
/// let approx = approximate_median(10, 1500.0, 1400.0, 30.0, 2.5).unwrap();
/// assert!((exact - approx).abs() < 1e-6);
/// ```
pub fn approximate_median(
    order: usize,
    inflow: f64,
    outflow: f64,
    length: f64,
    radius: f64,
) -> Result<f64, TransitError> {
    let factor = taylor_factor(order, inflow, outflow)?;
    Ok(prefactor(length, radius) / inflow * factor)
}

/// Theoretical median at one outflow volume, with its Taylor approximation if requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Inflow volume per day.
    pub inflow: f64,
    /// Outflow volume per day.
    pub outflow: f64,
    /// Closed-form median transit time (minutes).
    pub exact: f64,
    /// Order of the Taylor approximation.
    pub order: Option<usize>,
    /// Approximated median transit time (minutes).
    pub approximate: Option<f64>,
}

/// Closed-form median transit time for each volume in `outflows` at a fixed `inflow`.
pub fn median_curve(
    inflow: f64,
    outflows: &[f64],
    length: f64,
    radius: f64,
) -> Result<Vec<Prediction>, TransitError> {
    outflows
        .iter()
        .map(|&outflow| {
            Ok(Prediction {
                inflow,
                outflow,
                exact: exact_median(inflow, outflow, length, radius)?,
                order: None,
                approximate: None,
            })
        })
        .collect()
}

/// Closed-form median and its `order`-term Taylor approximation for each volume in `outflows`.
pub fn compare_curve(
    order: usize,
    inflow: f64,
    outflows: &[f64],
    length: f64,
    radius: f64,
) -> Result<Vec<Prediction>, TransitError> {
    let mut curve = median_curve(inflow, outflows, length, radius)?;
    for p in curve.iter_mut() {
        p.order = Some(order);
        p.approximate = Some(approximate_median(order, inflow, p.outflow, length, radius)?);
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTFLOWS: [f64; 10] = [
        100.0, 150.0, 200.0, 300.0, 400.0, 600.0, 800.0, 1000.0, 1200.0, 1400.0,
    ];

    #[test]
    fn exact_median_matches_closed_form() {
        let expected = 8.0 / 27.0 * 1440.0 * 30.0 * PI * 2.5 * 2.5 / (1500.0 - 100.0)
            * (1500.0f64 / 100.0).ln();
        let tau = exact_median(1500.0, 100.0, 30.0, 2.5).unwrap();
        assert!((tau - expected).abs() < 1e-9);
        assert!((tau - 486.148_035_276).abs() < 1e-6);
    }

    #[test]
    fn median_shrinks_as_outflow_grows() {
        let curve = median_curve(1500.0, &OUTFLOWS, 30.0, 2.5).unwrap();
        assert_eq!(curve.len(), OUTFLOWS.len());
        for pair in curve.windows(2) {
            assert!(pair[1].exact < pair[0].exact);
        }
    }

    #[test]
    fn exact_median_rejects_bad_volumes() {
        let cases = [
            (1500.0, 1500.0),
            (0.0, 100.0),
            (1500.0, 0.0),
            (-1500.0, 100.0),
            (1500.0, -100.0),
            (f64::NAN, 100.0),
        ];
        for (vin, vout) in cases.iter() {
            assert!(
                matches!(
                    exact_median(*vin, *vout, 30.0, 2.5),
                    Err(TransitError::DomainError(_))
                ),
                "accepted inflow {} outflow {}",
                vin,
                vout
            );
        }
    }

    #[test]
    fn first_order_factor_is_one() {
        assert_eq!(taylor_factor(1, 1500.0, 100.0).unwrap(), 1.0);
        let two = taylor_factor(2, 1500.0, 300.0).unwrap();
        assert!((two - 1.4).abs() < 1e-12);
    }

    #[test]
    fn zero_order_is_rejected() {
        assert!(matches!(
            taylor_factor(0, 1500.0, 100.0),
            Err(TransitError::DomainError(_))
        ));
        assert!(approximate_median(0, 1500.0, 100.0, 30.0, 2.5).is_err());
    }

    #[test]
    fn approximation_is_defined_at_equal_volumes() {
        let tau = approximate_median(5, 1500.0, 1500.0, 30.0, 2.5).unwrap();
        let expected = 8.0 / 27.0 * 1440.0 * 30.0 * PI * 2.5 * 2.5 / 1500.0;
        assert!((tau - expected).abs() < 1e-9);
    }

    #[test]
    fn approximation_error_never_grows_with_order() {
        for &vout in OUTFLOWS.iter() {
            let exact = exact_median(1500.0, vout, 30.0, 2.5).unwrap();
            let mut last = f64::INFINITY;
            for order in 1..60 {
                let approx = approximate_median(order, 1500.0, vout, 30.0, 2.5).unwrap();
                let err = (approx - exact).abs();
                assert!(err <= last + 1e-9, "order {} outflow {}", order, vout);
                last = err;
            }
        }
    }

    #[test]
    fn approximation_converges_near_unit_ratio() {
        let exact = exact_median(1500.0, 1200.0, 30.0, 2.5).unwrap();
        let approx = approximate_median(40, 1500.0, 1200.0, 30.0, 2.5).unwrap();
        assert!((exact - approx).abs() / exact < 1e-12);
    }

    #[test]
    fn compare_curve_pairs_exact_and_approximate() {
        let curve = compare_curve(10, 1500.0, &OUTFLOWS, 30.0, 2.5).unwrap();
        let last = curve.last().unwrap();
        assert_eq!(last.order, Some(10));
        let approx = last.approximate.unwrap();
        assert!((approx - last.exact).abs() < 1e-6);
        let first = &curve[0];
        assert!(first.approximate.unwrap() < first.exact);
    }
}
