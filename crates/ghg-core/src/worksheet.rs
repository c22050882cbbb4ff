//! Activity-data worksheets
//!
//! A worksheet is a saved set of entered activity values for one sector: the
//! file-based equivalent of a completed data-entry session. Worksheets are
//! JSON documents; activity data can also be imported from CSV. Applying a
//! worksheet never fails as a whole: entries whose row key does not exist in
//! the target table are collected and reported back.

use crate::error::{Error, Result};
use crate::factors::FactorTable;
use crate::rows::{coerce_count, coerce_distance, generate_rows, RowTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Entered activity values for one combination row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Composite row key ("entry-key:standard")
    pub row_key: String,
    /// Vehicle count
    #[serde(default)]
    pub vehicle_count: u64,
    /// Annual distance per vehicle, km
    #[serde(default)]
    pub distance_km: f64,
}

/// A saved data-entry session for one sector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worksheet {
    /// Sector the entries belong to
    pub sector: String,
    /// When the worksheet was created
    pub created: DateTime<Utc>,
    /// Activity entries
    pub entries: Vec<ActivityEntry>,
}

impl Worksheet {
    /// Create an empty worksheet for a sector
    pub fn new(sector: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            created: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Template worksheet with one zeroed entry per combination row
    pub fn template(table: &FactorTable) -> Self {
        let entries = generate_rows(table)
            .into_iter()
            .map(|row| ActivityEntry {
                row_key: row.key,
                vehicle_count: 0,
                distance_km: 0.0,
            })
            .collect();
        Self {
            sector: table.sector.clone(),
            created: Utc::now(),
            entries,
        }
    }

    /// Load a worksheet from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the worksheet to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Outcome of applying a worksheet to a row table
#[derive(Debug, Clone, Default)]
pub struct ApplyResult {
    /// Entries that matched a row
    pub applied: usize,
    /// Entries whose row key was not found, with the reason
    pub skipped: Vec<(ActivityEntry, String)>,
}

/// Apply a worksheet's entries to a row table
///
/// Negative distances are clamped to 0 at this boundary; unknown row keys
/// are skipped and reported, never fatal.
pub fn apply_worksheet(table: &mut RowTable, worksheet: &Worksheet) -> ApplyResult {
    let mut result = ApplyResult::default();

    for entry in &worksheet.entries {
        match table.rows.iter_mut().find(|r| r.key == entry.row_key) {
            Some(row) => {
                row.vehicle_count = entry.vehicle_count;
                row.distance_km = if entry.distance_km.is_finite() && entry.distance_km > 0.0 {
                    entry.distance_km
                } else {
                    0.0
                };
                result.applied += 1;
            }
            None => {
                result.skipped.push((
                    entry.clone(),
                    format!("row key '{}' not found", entry.row_key),
                ));
            }
        }
    }

    result
}

/// Read activity entries from CSV (`row_key,vehicle_count,distance_km`)
///
/// Numeric cells that fail to parse coerce to 0, matching the edit-boundary
/// rule.
pub fn read_activity_csv<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<ActivityEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        let row_key = record.get(0).unwrap_or("").trim();
        if row_key.is_empty() {
            continue;
        }

        // Same coercion rules as the edit boundary
        let vehicle_count = coerce_count(record.get(1).unwrap_or(""));
        let distance_km = coerce_distance(record.get(2).unwrap_or(""));

        entries.push(ActivityEntry {
            row_key: row_key.to_string(),
            vehicle_count,
            distance_km,
        });
    }

    Ok(entries)
}

/// Load activity entries from a CSV file
pub fn load_activity_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ActivityEntry>> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_activity_csv(std::io::BufReader::new(file), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::land_transport;
    use std::path::PathBuf;

    #[test]
    fn test_template_covers_all_rows() {
        let table = land_transport();
        let worksheet = Worksheet::template(&table);
        assert_eq!(worksheet.entries.len(), table.leaf_count());
        assert!(worksheet
            .entries
            .iter()
            .all(|e| e.vehicle_count == 0 && e.distance_km == 0.0));
    }

    #[test]
    fn test_worksheet_roundtrip_json() {
        let mut worksheet = Worksheet::new("land-transport");
        worksheet.entries.push(ActivityEntry {
            row_key: "light-gasoline:china-i".to_string(),
            vehicle_count: 2,
            distance_km: 100.0,
        });

        let json = serde_json::to_string_pretty(&worksheet).unwrap();
        let loaded: Worksheet = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.sector, "land-transport");
        assert_eq!(loaded.entries, worksheet.entries);
    }

    #[test]
    fn test_apply_worksheet() {
        let table = land_transport();
        let mut rows = RowTable::generate(&table);

        let mut worksheet = Worksheet::new("land-transport");
        worksheet.entries.push(ActivityEntry {
            row_key: "light-gasoline:china-i".to_string(),
            vehicle_count: 2,
            distance_km: 100.0,
        });
        worksheet.entries.push(ActivityEntry {
            row_key: "no-such-row".to_string(),
            vehicle_count: 9,
            distance_km: 9.0,
        });

        let result = apply_worksheet(&mut rows, &worksheet);
        assert_eq!(result.applied, 1);
        assert_eq!(result.skipped.len(), 1);

        let row = rows.find_row("light-gasoline:china-i").unwrap();
        assert_eq!(row.vehicle_count, 2);
        assert_eq!(row.distance_km, 100.0);
    }

    #[test]
    fn test_apply_worksheet_clamps_negative_distance() {
        let table = land_transport();
        let mut rows = RowTable::generate(&table);

        let mut worksheet = Worksheet::new("land-transport");
        worksheet.entries.push(ActivityEntry {
            row_key: "light-gasoline:china-i".to_string(),
            vehicle_count: 1,
            distance_km: -500.0,
        });

        apply_worksheet(&mut rows, &worksheet);
        assert_eq!(rows.find_row("light-gasoline:china-i").unwrap().distance_km, 0.0);
    }

    #[test]
    fn test_read_activity_csv() {
        let csv = "row_key,vehicle_count,distance_km\n\
                   light-gasoline:china-i,2,100\n\
                   heavy-diesel:china-iv,abc,-5\n";
        let entries = read_activity_csv(csv.as_bytes(), &PathBuf::from("test.csv")).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].vehicle_count, 2);
        assert_eq!(entries[0].distance_km, 100.0);
        // Unparsable and negative cells coerce to 0
        assert_eq!(entries[1].vehicle_count, 0);
        assert_eq!(entries[1].distance_km, 0.0);
    }

    #[test]
    fn test_read_activity_csv_counts_match_edit_boundary() {
        // Decimal counts truncate here exactly as they do in apply_edit
        let csv = "row_key,vehicle_count,distance_km\n\
                   light-gasoline:china-i,3.7,10\n";
        let entries = read_activity_csv(csv.as_bytes(), &PathBuf::from("test.csv")).unwrap();
        assert_eq!(entries[0].vehicle_count, 3);

        let table = land_transport();
        let mut rows = RowTable::generate(&table);
        rows.apply_edit("light-gasoline:china-i", crate::rows::EditField::VehicleCount, "3.7")
            .unwrap();
        assert_eq!(
            rows.find_row("light-gasoline:china-i").unwrap().vehicle_count,
            entries[0].vehicle_count
        );
    }
}
