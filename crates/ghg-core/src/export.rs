//! Export of computed emission tables
//!
//! Joins rows, span annotations, and freshly computed emissions into one
//! serializable view, written as CSV or pretty JSON. In CSV output the
//! vehicle/fuel cells appear only on the first row of their group, blank on
//! the rest, mirroring the merged-cell table the presentation layer shows.

use crate::emission::DerivedEmissions;
use crate::error::Result;
use crate::rows::{CombinationRow, RowTable};
use crate::rowspan::{annotate, RowSpan};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One row of the computed view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedRow {
    #[serde(flatten)]
    pub row: CombinationRow,
    pub span: RowSpan,
    pub emissions: DerivedEmissions,
}

/// The full computed view of a sector's row table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedTable {
    pub sector: String,
    pub rows: Vec<ComputedRow>,
    /// Sector total, tCO2e
    pub total_co2e_t: f64,
}

impl ComputedTable {
    /// Build the computed view from a row table
    pub fn build(table: &RowTable) -> Self {
        let spans = annotate(&table.rows);
        let rows = table
            .rows
            .iter()
            .zip(spans)
            .map(|(row, span)| ComputedRow {
                row: row.clone(),
                span,
                emissions: row.emissions(),
            })
            .collect();

        Self {
            sector: table.sector.clone(),
            rows,
            total_co2e_t: table.total_co2e_t(),
        }
    }
}

const CSV_HEADER: &[&str] = &[
    "vehicle_type",
    "fuel_type",
    "standard",
    "n2o_mg_per_km",
    "ch4_mg_per_km",
    "vehicle_count",
    "distance_km",
    "n2o_mg",
    "ch4_mg",
    "n2o_co2e_mg",
    "ch4_co2e_mg",
    "total_co2e_t",
];

/// Write the computed table as CSV
///
/// Grouped vehicle/fuel cells are blank except on the group's first row.
pub fn write_csv<W: Write>(writer: W, table: &ComputedTable) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for computed in &table.rows {
        let vehicle = if computed.span.first_of_vehicle {
            computed.row.vehicle_label.as_str()
        } else {
            ""
        };
        let fuel = if computed.span.first_of_fuel {
            computed.row.fuel_label.as_str()
        } else {
            ""
        };

        csv_writer.write_record(&[
            vehicle.to_string(),
            fuel.to_string(),
            computed.row.standard.clone(),
            computed.row.factors.n2o_mg_per_km.to_string(),
            computed.row.factors.ch4_mg_per_km.to_string(),
            computed.row.vehicle_count.to_string(),
            computed.row.distance_km.to_string(),
            computed.emissions.n2o_mg.to_string(),
            computed.emissions.ch4_mg.to_string(),
            computed.emissions.n2o_co2e_mg.to_string(),
            computed.emissions.ch4_co2e_mg.to_string(),
            computed.emissions.total_co2e_t.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the computed table as pretty JSON
pub fn write_json<W: Write>(mut writer: W, table: &ComputedTable) -> Result<()> {
    let json = serde_json::to_string_pretty(table)?;
    writeln!(writer, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::land_transport;
    use crate::rows::{EditField, RowTable};

    #[test]
    fn test_build_matches_row_table() {
        let table = land_transport();
        let mut rows = RowTable::generate(&table);
        rows.apply_edit("light-gasoline:china-i", EditField::VehicleCount, "2")
            .unwrap();
        rows.apply_edit("light-gasoline:china-i", EditField::DistanceKm, "100")
            .unwrap();

        let computed = ComputedTable::build(&rows);
        assert_eq!(computed.rows.len(), rows.row_count());
        assert!((computed.total_co2e_t - 0.0023268).abs() < 1e-12);
    }

    #[test]
    fn test_csv_suppresses_grouped_cells() {
        let table = land_transport();
        let rows = RowTable::generate(&table);
        let computed = ComputedTable::build(&rows);

        let mut out = Vec::new();
        write_csv(&mut out, &computed).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        // Header plus one line per row
        assert_eq!(lines.len(), computed.rows.len() + 1);

        // The second row of the first group has blank vehicle and fuel cells
        let first_group_span = computed.rows[0].span.fuel_span;
        if first_group_span > 1 {
            assert!(lines[2].starts_with(",,"));
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let table = land_transport();
        let rows = RowTable::generate(&table);
        let computed = ComputedTable::build(&rows);

        let mut out = Vec::new();
        write_json(&mut out, &computed).unwrap();
        let loaded: ComputedTable = serde_json::from_slice(&out).unwrap();
        assert_eq!(loaded.rows.len(), computed.rows.len());
        assert_eq!(loaded.sector, computed.sector);
    }
}
