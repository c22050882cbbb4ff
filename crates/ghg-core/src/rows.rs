//! Combination table generator and edit handling
//!
//! Expands a factor table into one flat row per (vehicle type, fuel type,
//! standard) leaf. Rows are generated once, sorted, and fixed; only the
//! activity fields (vehicle count, distance) mutate afterwards, through
//! discrete edit events. Derived emissions are never stored on the row:
//! they are recomputed from the inputs on every read.

use crate::emission::{self, DerivedEmissions};
use crate::error::{Error, Result};
use crate::factors::{fuel_label, split_compound_key, vehicle_label, FactorPair, FactorTable};
use serde::{Deserialize, Serialize};

/// One (vehicle type, fuel type, emission standard) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationRow {
    /// Composite key "entry-key:standard", unique within a table
    pub key: String,
    /// Vehicle-type code
    pub vehicle_type: String,
    /// Fuel-type code
    pub fuel_type: String,
    /// Human-readable vehicle label
    pub vehicle_label: String,
    /// Human-readable fuel label
    pub fuel_label: String,
    /// Emission standard label
    pub standard: String,
    /// Published factors for this combination
    pub factors: FactorPair,
    /// Entered vehicle count
    pub vehicle_count: u64,
    /// Entered annual distance per vehicle, km
    pub distance_km: f64,
}

impl CombinationRow {
    /// Derived emissions for the current activity values, computed fresh
    pub fn emissions(&self) -> DerivedEmissions {
        emission::compute(self.vehicle_count, self.distance_km, &self.factors)
    }
}

/// Which editable field an edit event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    VehicleCount,
    DistanceKm,
}

/// Generate the flat combination-row list for a factor table
///
/// One row per (entry, standard) leaf, all activity fields 0. Output is
/// stably sorted by (vehicle type, fuel type) as plain strings; standards
/// within a group keep the table's source order. Idempotent: calling twice
/// yields structurally identical, freshly allocated rows.
pub fn generate_rows(table: &FactorTable) -> Vec<CombinationRow> {
    let mut rows: Vec<CombinationRow> = Vec::with_capacity(table.leaf_count());

    for entry in &table.entries {
        let (vehicle_type, fuel_type) = split_compound_key(&entry.key);
        for standard in &entry.standards {
            // The colon keeps dashed standards unambiguous: the dash-joined
            // triple would collide for e.g. ("a-b", "c-x") and ("a-b-c", "x").
            rows.push(CombinationRow {
                key: format!("{}:{}", entry.key, standard.standard),
                vehicle_type: vehicle_type.clone(),
                fuel_type: fuel_type.clone(),
                vehicle_label: vehicle_label(&vehicle_type),
                fuel_label: fuel_label(&fuel_type),
                standard: standard.standard.clone(),
                factors: standard.factors,
                vehicle_count: 0,
                distance_km: 0.0,
            });
        }
    }

    rows.sort_by(|a, b| {
        a.vehicle_type
            .cmp(&b.vehicle_type)
            .then_with(|| a.fuel_type.cmp(&b.fuel_type))
    });

    rows
}

/// The row collection for one sector, the single owner of its activity data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowTable {
    /// Sector name
    pub sector: String,
    /// Combination rows, sorted by (vehicle type, fuel type)
    pub rows: Vec<CombinationRow>,
}

impl RowTable {
    /// Generate the row table for a factor table
    pub fn generate(table: &FactorTable) -> Self {
        Self {
            sector: table.sector.clone(),
            rows: generate_rows(table),
        }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a row by composite key
    pub fn find_row(&self, key: &str) -> Option<&CombinationRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Apply one edit event `(row key, field, raw value)`
    ///
    /// The raw value is coerced at this boundary: non-numeric and negative
    /// input both become 0. An unknown row key is the only error.
    pub fn apply_edit(&mut self, key: &str, field: EditField, raw: &str) -> Result<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.key == key)
            .ok_or_else(|| Error::RowNotFound(key.to_string()))?;

        match field {
            EditField::VehicleCount => row.vehicle_count = coerce_count(raw),
            EditField::DistanceKm => row.distance_km = coerce_distance(raw),
        }

        Ok(())
    }

    /// Sector total, metric tons CO2e — the scalar reported upward
    pub fn total_co2e_t(&self) -> f64 {
        self.rows.iter().map(|r| r.emissions().total_co2e_t).sum()
    }
}

/// Coerce a raw count input: non-numeric or negative becomes 0
///
/// Shared by every activity-input boundary (edits and CSV import) so a
/// given raw value always lands as the same count.
pub(crate) fn coerce_count(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<u64>() {
        return n;
    }
    // Tolerate decimal input for a count field by truncating
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f as u64,
        _ => 0,
    }
}

/// Coerce a raw distance input: non-numeric, non-finite, or negative becomes 0
pub(crate) fn coerce_distance(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::{land_transport, FactorEntry, StandardFactors};

    #[test]
    fn test_generate_rows_one_per_leaf() {
        let table = land_transport();
        let rows = generate_rows(&table);
        assert_eq!(rows.len(), table.leaf_count());
    }

    #[test]
    fn test_generate_rows_unique_keys() {
        let table = land_transport();
        let rows = generate_rows(&table);
        let mut keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), rows.len());
    }

    #[test]
    fn test_generate_rows_keys_distinct_for_dashed_standards() {
        // Dash-joining (vehicle, fuel, standard) would make these two
        // leaves collide on "a-b-c-x"; the colon separator keeps them apart.
        let table = FactorTable {
            sector: "test".to_string(),
            entries: vec![
                FactorEntry {
                    key: "a-b".to_string(),
                    standards: vec![StandardFactors {
                        standard: "c-x".to_string(),
                        factors: FactorPair::default(),
                    }],
                },
                FactorEntry {
                    key: "a-b-c".to_string(),
                    standards: vec![StandardFactors {
                        standard: "x".to_string(),
                        factors: FactorPair::default(),
                    }],
                },
            ],
        };

        let rows = generate_rows(&table);
        let mut keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), rows.len());

        // Each leaf stays individually addressable by its key
        let mut table = RowTable {
            sector: "test".to_string(),
            rows,
        };
        table.apply_edit("a-b:c-x", EditField::VehicleCount, "1").unwrap();
        table.apply_edit("a-b-c:x", EditField::VehicleCount, "2").unwrap();
        assert_eq!(table.find_row("a-b:c-x").unwrap().vehicle_count, 1);
        assert_eq!(table.find_row("a-b-c:x").unwrap().vehicle_count, 2);
    }

    #[test]
    fn test_generate_rows_sorted() {
        let table = land_transport();
        let rows = generate_rows(&table);
        for pair in rows.windows(2) {
            let a = (&pair[0].vehicle_type, &pair[0].fuel_type);
            let b = (&pair[1].vehicle_type, &pair[1].fuel_type);
            assert!(a <= b, "rows out of order: {:?} > {:?}", a, b);
        }
    }

    #[test]
    fn test_generate_rows_standards_keep_source_order() {
        let table = land_transport();
        let rows = generate_rows(&table);
        let light_gasoline: Vec<&str> = rows
            .iter()
            .filter(|r| r.vehicle_type == "light" && r.fuel_type == "gasoline")
            .map(|r| r.standard.as_str())
            .collect();
        let source: Vec<&str> = table
            .find_entry("light-gasoline")
            .unwrap()
            .standards
            .iter()
            .map(|s| s.standard.as_str())
            .collect();
        assert_eq!(light_gasoline, source);
    }

    #[test]
    fn test_generate_rows_idempotent() {
        let table = land_transport();
        let first = generate_rows(&table);
        let second = generate_rows(&table);
        assert_eq!(first, second);
        assert!(second.iter().all(|r| r.vehicle_count == 0 && r.distance_km == 0.0));
    }

    #[test]
    fn test_generate_rows_irregular_keys_split() {
        let table = land_transport();
        let rows = generate_rows(&table);
        assert!(rows
            .iter()
            .any(|r| r.vehicle_type == "other-light" && r.fuel_type == "gasoline"));
        assert!(rows
            .iter()
            .any(|r| r.vehicle_type == "heavy" && r.fuel_type == "natural-gas"));
    }

    #[test]
    fn test_apply_edit_and_total() {
        let table = land_transport();
        let mut rows = RowTable::generate(&table);
        let key = "light-gasoline:china-i";

        rows.apply_edit(key, EditField::VehicleCount, "2").unwrap();
        rows.apply_edit(key, EditField::DistanceKm, "100").unwrap();

        let row = rows.find_row(key).unwrap();
        assert_eq!(row.vehicle_count, 2);
        assert_eq!(row.distance_km, 100.0);

        // light-gasoline china-i factors are 38/45 mg/km
        let total = rows.total_co2e_t();
        assert!((total - 0.0023268).abs() < 1e-12);
    }

    #[test]
    fn test_apply_edit_unknown_key() {
        let table = land_transport();
        let mut rows = RowTable::generate(&table);
        let err = rows.apply_edit("no-such-row", EditField::VehicleCount, "1");
        assert!(matches!(err, Err(Error::RowNotFound(_))));
    }

    #[test]
    fn test_apply_edit_coerces_invalid_input() {
        let table = land_transport();
        let mut rows = RowTable::generate(&table);
        let key = "light-gasoline:china-i";

        rows.apply_edit(key, EditField::VehicleCount, "abc").unwrap();
        rows.apply_edit(key, EditField::DistanceKm, "-50").unwrap();

        let row = rows.find_row(key).unwrap();
        assert_eq!(row.vehicle_count, 0);
        assert_eq!(row.distance_km, 0.0);
    }

    #[test]
    fn test_coerce_count_truncates_decimals() {
        assert_eq!(coerce_count("3.7"), 3);
        assert_eq!(coerce_count("-2"), 0);
        assert_eq!(coerce_count(""), 0);
        assert_eq!(coerce_count("12"), 12);
    }
}
