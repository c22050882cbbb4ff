//! Self-contained emission formulas
//!
//! Two stand-alone calculators sharing the pure-formula contract of the
//! per-row calculator: total over their inputs, no error path, invalid
//! values clamped at the boundary.

use serde::{Deserialize, Serialize};

/// Global warming potential of SF6
pub const GWP_SF6: f64 = 23900.0;

/// Default urea purity, percent, when none is supplied
pub const DEFAULT_UREA_PURITY_PCT: f64 = 99.6;

/// Tail-gas purification emission, metric tons CO2
///
/// `E = M × (12/60) × (P/100) × (44/12) × 0.001` with M the urea mass in kg
/// and P the urea purity percent. A missing or non-finite purity uses the
/// default 99.6; out-of-range purity clamps to [0, 100].
pub fn tail_gas_emission_t(urea_kg: f64, purity_pct: Option<f64>) -> f64 {
    let urea_kg = if urea_kg.is_finite() { urea_kg } else { 0.0 };
    let purity = match purity_pct {
        Some(p) if p.is_finite() => p.clamp(0.0, 100.0),
        _ => DEFAULT_UREA_PURITY_PCT,
    };
    urea_kg * (12.0 / 60.0) * (purity / 100.0) * (44.0 / 12.0) * 0.001
}

/// One piece of SF6-containing equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sf6Device {
    /// Inventory id, unique within one inventory
    pub id: u64,
    /// Nameplate SF6 capacity, kg
    pub capacity_kg: f64,
    /// SF6 recovered during repair/retirement, kg
    pub recovered_kg: f64,
}

/// SF6 equipment lists for one reporting period
///
/// Repaired and retired equipment are tracked separately; both contribute
/// to the total the same way. Devices are added and removed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sf6Inventory {
    /// Equipment repaired during the period
    pub repaired: Vec<Sf6Device>,
    /// Equipment retired during the period
    pub retired: Vec<Sf6Device>,
    next_id: u64,
}

impl Sf6Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add a repaired device; returns its generated id
    pub fn add_repaired(&mut self, capacity_kg: f64, recovered_kg: f64) -> u64 {
        let id = self.next_id();
        self.repaired.push(Sf6Device {
            id,
            capacity_kg,
            recovered_kg,
        });
        id
    }

    /// Add a retired device; returns its generated id
    pub fn add_retired(&mut self, capacity_kg: f64, recovered_kg: f64) -> u64 {
        let id = self.next_id();
        self.retired.push(Sf6Device {
            id,
            capacity_kg,
            recovered_kg,
        });
        id
    }

    /// Remove a device from either list; returns true if found
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.repaired.len() + self.retired.len();
        self.repaired.retain(|d| d.id != id);
        self.retired.retain(|d| d.id != id);
        self.repaired.len() + self.retired.len() != before
    }

    /// Total SF6 emission, metric tons CO2e
    ///
    /// `Σ(capacity − recovered) × GWP_SF6 × 0.001` over both lists.
    pub fn total_emission_t(&self) -> f64 {
        let escaped_kg: f64 = self
            .repaired
            .iter()
            .chain(self.retired.iter())
            .map(|d| d.capacity_kg - d.recovered_kg)
            .sum();
        escaped_kg * GWP_SF6 * 0.001
    }
}
