//! Row-span aggregation for merged-cell rendering
//!
//! Given rows already grouped contiguously by vehicle type, and within that
//! by fuel type (the order `generate_rows` produces), compute for each row
//! whether it opens its vehicle/fuel group and how many rows the group
//! spans. The first row of a contiguous run carries the full span; the rest
//! carry 0, which a renderer reads as "suppress this cell". Nothing here
//! depends on any rendering layer.

use crate::rows::CombinationRow;
use serde::{Deserialize, Serialize};

/// Span annotation for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    /// This row opens a vehicle-type group
    pub first_of_vehicle: bool,
    /// Rows in the vehicle-type group (0 unless first)
    pub vehicle_span: usize,
    /// This row opens a (vehicle, fuel) group
    pub first_of_fuel: bool,
    /// Rows in the (vehicle, fuel) group (0 unless first)
    pub fuel_span: usize,
}

/// Compute span annotations, parallel to the input rows
///
/// Precondition: rows are grouped contiguously by vehicle type and then
/// fuel type. Non-contiguous groups are annotated as separate runs.
pub fn annotate(rows: &[CombinationRow]) -> Vec<RowSpan> {
    let mut spans = vec![
        RowSpan {
            first_of_vehicle: false,
            vehicle_span: 0,
            first_of_fuel: false,
            fuel_span: 0,
        };
        rows.len()
    ];

    // Walk contiguous runs; the run head gets the full span.
    let mut i = 0;
    while i < rows.len() {
        let vehicle = &rows[i].vehicle_type;
        let mut vehicle_end = i + 1;
        while vehicle_end < rows.len() && &rows[vehicle_end].vehicle_type == vehicle {
            vehicle_end += 1;
        }
        spans[i].first_of_vehicle = true;
        spans[i].vehicle_span = vehicle_end - i;

        let mut j = i;
        while j < vehicle_end {
            let fuel = &rows[j].fuel_type;
            let mut fuel_end = j + 1;
            while fuel_end < vehicle_end && &rows[fuel_end].fuel_type == fuel {
                fuel_end += 1;
            }
            spans[j].first_of_fuel = true;
            spans[j].fuel_span = fuel_end - j;
            j = fuel_end;
        }

        i = vehicle_end;
    }

    spans
}
