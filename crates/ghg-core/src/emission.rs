//! Per-row emission calculator
//!
//! Pure formulas converting activity data (vehicle count, distance) and
//! emission factors into gas masses and CO2-equivalents. Everything here is
//! a total function over f64 inputs: no error path, no caching, recomputed
//! fresh on every call so derived values can never go stale.

use crate::factors::FactorPair;
use serde::{Deserialize, Serialize};

/// Global warming potential of N2O (AR6, 100-year horizon)
pub const GWP_N2O: f64 = 273.0;

/// Global warming potential of CH4 (AR6, 100-year horizon, fossil)
pub const GWP_CH4: f64 = 28.0;

/// Milligrams per metric ton
pub const MG_PER_TONNE: f64 = 1e9;

/// Derived emission quantities for one combination row
///
/// All masses are full precision; display rounding is a presentation
/// concern and must not happen here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedEmissions {
    /// N2O mass, mg
    pub n2o_mg: f64,
    /// CH4 mass, mg
    pub ch4_mg: f64,
    /// N2O as CO2-equivalent, mg
    pub n2o_co2e_mg: f64,
    /// CH4 as CO2-equivalent, mg
    pub ch4_co2e_mg: f64,
    /// Combined CO2-equivalent, metric tons
    pub total_co2e_t: f64,
}

impl DerivedEmissions {
    /// All-zero emissions (no activity)
    pub fn zero() -> Self {
        Self {
            n2o_mg: 0.0,
            ch4_mg: 0.0,
            n2o_co2e_mg: 0.0,
            ch4_co2e_mg: 0.0,
            total_co2e_t: 0.0,
        }
    }
}

/// Compute derived emissions for one (factor pair, activity) combination
///
/// Non-finite activity values are treated as 0 so the function stays total.
pub fn compute(vehicle_count: u64, distance_km: f64, factors: &FactorPair) -> DerivedEmissions {
    let count = vehicle_count as f64;
    let distance = if distance_km.is_finite() { distance_km } else { 0.0 };

    let n2o_mg = factors.n2o_mg_per_km * distance * count;
    let ch4_mg = factors.ch4_mg_per_km * distance * count;
    let n2o_co2e_mg = n2o_mg * GWP_N2O;
    let ch4_co2e_mg = ch4_mg * GWP_CH4;

    DerivedEmissions {
        n2o_mg,
        ch4_mg,
        n2o_co2e_mg,
        ch4_co2e_mg,
        total_co2e_t: (n2o_co2e_mg + ch4_co2e_mg) / MG_PER_TONNE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_compute_reference_values() {
        let factors = FactorPair {
            n2o_mg_per_km: 38.0,
            ch4_mg_per_km: 45.0,
        };
        let e = compute(2, 100.0, &factors);

        assert!(close(e.n2o_mg, 7600.0));
        assert!(close(e.ch4_mg, 9000.0));
        assert!(close(e.n2o_co2e_mg, 2_074_800.0));
        assert!(close(e.ch4_co2e_mg, 252_000.0));
        assert!(close(e.total_co2e_t, 0.0023268));
    }

    #[test]
    fn test_compute_zero_count() {
        let factors = FactorPair {
            n2o_mg_per_km: 38.0,
            ch4_mg_per_km: 45.0,
        };
        let e = compute(0, 100.0, &factors);
        assert_eq!(e, DerivedEmissions::zero());
    }

    #[test]
    fn test_compute_zero_distance() {
        let factors = FactorPair {
            n2o_mg_per_km: 99.0,
            ch4_mg_per_km: 12.5,
        };
        let e = compute(50, 0.0, &factors);
        assert_eq!(e, DerivedEmissions::zero());
    }

    #[test]
    fn test_compute_missing_factors_are_zero() {
        let factors = FactorPair::default();
        let e = compute(10, 1000.0, &factors);
        assert_eq!(e, DerivedEmissions::zero());
    }

    #[test]
    fn test_compute_non_finite_distance() {
        let factors = FactorPair {
            n2o_mg_per_km: 38.0,
            ch4_mg_per_km: 45.0,
        };
        let e = compute(2, f64::NAN, &factors);
        assert_eq!(e, DerivedEmissions::zero());
        let e = compute(2, f64::INFINITY, &factors);
        assert_eq!(e, DerivedEmissions::zero());
    }
}
