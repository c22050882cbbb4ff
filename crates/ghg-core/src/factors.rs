//! Emission-factor tables
//!
//! A factor table is the static per-sector configuration object: a list of
//! dash-delimited compound keys (vehicle type + fuel type), each carrying the
//! published N2O/CH4 factors per emission standard. Loaded once, never
//! mutated. Tables can be built in (land transport) or loaded from JSON/CSV
//! files, one sector per file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// N2O/CH4 factor pair, mg per km
///
/// A factor absent from the source table is 0, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorPair {
    /// N2O factor, mg/km
    #[serde(default)]
    pub n2o_mg_per_km: f64,
    /// CH4 factor, mg/km
    #[serde(default)]
    pub ch4_mg_per_km: f64,
}

/// Factors for one emission standard under a compound key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardFactors {
    /// Emission standard label (e.g., "china-iv")
    pub standard: String,
    /// The published factor pair
    #[serde(flatten)]
    pub factors: FactorPair,
}

/// One compound key with its per-standard factors
///
/// Standards are kept in a Vec so source order survives; rendering keeps
/// standards in the order the regulation tables list them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorEntry {
    /// Dash-delimited compound (vehicle type, fuel type) key
    pub key: String,
    /// Per-standard factors, in source order
    pub standards: Vec<StandardFactors>,
}

/// A sector's complete emission-factor table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorTable {
    /// Sector name (e.g., "land-transport")
    pub sector: String,
    /// Compound-key entries
    pub entries: Vec<FactorEntry>,
}

impl FactorTable {
    /// Total number of (key, standard) leaf combinations
    pub fn leaf_count(&self) -> usize {
        self.entries.iter().map(|e| e.standards.len()).sum()
    }

    /// Find an entry by compound key
    pub fn find_entry(&self, key: &str) -> Option<&FactorEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// A compound-key splitting rule
///
/// The irregular keys are a finite exception list, evaluated in priority
/// order before the generic split. Keep this enumerable and auditable; it
/// is deliberately not a parser.
#[derive(Debug, Clone, Copy)]
enum KeyRule {
    /// The whole key matches exactly
    Exact {
        key: &'static str,
        vehicle: &'static str,
        fuel: &'static str,
    },
    /// The key starts with a multi-segment vehicle-type prefix; the
    /// remainder is the fuel type
    Prefix {
        prefix: &'static str,
        vehicle: &'static str,
    },
}

/// Known irregular compound keys
///
/// The "other-light" family uses a two-segment vehicle type, and the heavy
/// natural-gas key names its fuel with an internal dash; neither fits the
/// generic "first segment = vehicle type" rule.
const KEY_RULES: &[KeyRule] = &[
    KeyRule::Exact {
        key: "heavy-natural-gas",
        vehicle: "heavy",
        fuel: "natural-gas",
    },
    KeyRule::Prefix {
        prefix: "other-light-",
        vehicle: "other-light",
    },
];

/// Split a compound key into (vehicle type, fuel type)
///
/// Irregular keys are matched against `KEY_RULES` first; everything else
/// splits at the first dash. A key with no dash is all vehicle type.
pub fn split_compound_key(key: &str) -> (String, String) {
    for rule in KEY_RULES {
        match *rule {
            KeyRule::Exact { key: k, vehicle, fuel } => {
                if key == k {
                    return (vehicle.to_string(), fuel.to_string());
                }
            }
            KeyRule::Prefix { prefix, vehicle } => {
                if let Some(rest) = key.strip_prefix(prefix) {
                    return (vehicle.to_string(), rest.to_string());
                }
            }
        }
    }

    match key.split_once('-') {
        Some((vehicle, fuel)) => (vehicle.to_string(), fuel.to_string()),
        None => (key.to_string(), String::new()),
    }
}

/// Human-readable label for a vehicle-type code
///
/// Unknown codes fall back to the code itself.
pub fn vehicle_label(code: &str) -> String {
    match code {
        "mini" => "Mini passenger vehicle".to_string(),
        "light" => "Light-duty vehicle".to_string(),
        "medium" => "Medium-duty vehicle".to_string(),
        "heavy" => "Heavy-duty vehicle".to_string(),
        "other-light" => "Other light vehicle".to_string(),
        "motorcycle" => "Motorcycle".to_string(),
        _ => code.to_string(),
    }
}

/// Human-readable label for a fuel-type code
pub fn fuel_label(code: &str) -> String {
    match code {
        "gasoline" => "Gasoline".to_string(),
        "diesel" => "Diesel".to_string(),
        "natural-gas" => "Natural gas".to_string(),
        "lpg" => "LPG".to_string(),
        _ => code.to_string(),
    }
}

fn entry(key: &str, standards: &[(&str, f64, f64)]) -> FactorEntry {
    FactorEntry {
        key: key.to_string(),
        standards: standards
            .iter()
            .map(|&(standard, n2o, ch4)| StandardFactors {
                standard: standard.to_string(),
                factors: FactorPair {
                    n2o_mg_per_km: n2o,
                    ch4_mg_per_km: ch4,
                },
            })
            .collect(),
    }
}

/// Built-in land-transport factor table
///
/// N2O/CH4 factors in mg/km per Chinese mobile-source inventory guidelines,
/// by vehicle class, fuel, and China emission standard. A 0 entry means the
/// guideline table publishes no factor for that cell.
pub fn land_transport() -> FactorTable {
    FactorTable {
        sector: "land-transport".to_string(),
        entries: vec![
            entry(
                "mini-gasoline",
                &[
                    ("pre-china-i", 10.0, 99.0),
                    ("china-i", 19.0, 55.0),
                    ("china-ii", 12.0, 42.0),
                    ("china-iii", 5.0, 27.0),
                    ("china-iv", 5.0, 27.0),
                    ("china-v", 5.0, 27.0),
                ],
            ),
            entry(
                "light-gasoline",
                &[
                    ("pre-china-i", 10.0, 99.0),
                    ("china-i", 38.0, 45.0),
                    ("china-ii", 25.0, 35.0),
                    ("china-iii", 12.0, 25.0),
                    ("china-iv", 6.0, 25.0),
                    ("china-v", 6.0, 25.0),
                ],
            ),
            entry(
                "light-diesel",
                &[
                    ("pre-china-i", 0.0, 18.0),
                    ("china-i", 10.0, 9.0),
                    ("china-ii", 10.0, 7.0),
                    ("china-iii", 10.0, 4.0),
                    ("china-iv", 10.0, 0.0),
                    ("china-v", 10.0, 0.0),
                ],
            ),
            entry(
                "medium-gasoline",
                &[
                    ("pre-china-i", 20.0, 131.0),
                    ("china-i", 41.0, 86.0),
                    ("china-ii", 30.0, 64.0),
                    ("china-iii", 14.0, 42.0),
                    ("china-iv", 8.0, 42.0),
                    ("china-v", 8.0, 42.0),
                ],
            ),
            entry(
                "medium-diesel",
                &[
                    ("pre-china-i", 3.0, 40.0),
                    ("china-i", 20.0, 17.0),
                    ("china-ii", 20.0, 13.0),
                    ("china-iii", 20.0, 9.0),
                    ("china-iv", 20.0, 5.0),
                    ("china-v", 20.0, 5.0),
                ],
            ),
            entry(
                "heavy-gasoline",
                &[
                    ("pre-china-i", 25.0, 145.0),
                    ("china-i", 45.0, 96.0),
                    ("china-ii", 33.0, 72.0),
                    ("china-iii", 16.0, 48.0),
                    ("china-iv", 9.0, 48.0),
                    ("china-v", 9.0, 48.0),
                ],
            ),
            entry(
                "heavy-diesel",
                &[
                    ("pre-china-i", 3.0, 58.0),
                    ("china-i", 30.0, 25.0),
                    ("china-ii", 30.0, 19.0),
                    ("china-iii", 30.0, 13.0),
                    ("china-iv", 30.0, 8.0),
                    ("china-v", 30.0, 8.0),
                ],
            ),
            entry(
                "heavy-natural-gas",
                &[
                    ("china-iii", 20.0, 5400.0),
                    ("china-iv", 20.0, 5400.0),
                    ("china-v", 20.0, 4000.0),
                ],
            ),
            entry(
                "other-light-gasoline",
                &[
                    ("pre-china-i", 15.0, 110.0),
                    ("china-i", 25.0, 60.0),
                    ("china-ii", 18.0, 45.0),
                    ("china-iii", 8.0, 30.0),
                    ("china-iv", 8.0, 30.0),
                ],
            ),
            entry(
                "other-light-diesel",
                &[
                    ("pre-china-i", 1.0, 25.0),
                    ("china-i", 12.0, 11.0),
                    ("china-ii", 12.0, 8.0),
                    ("china-iii", 12.0, 5.0),
                    ("china-iv", 12.0, 3.0),
                ],
            ),
            entry(
                "motorcycle-gasoline",
                &[
                    ("pre-china-i", 2.0, 150.0),
                    ("china-i", 2.0, 150.0),
                    ("china-ii", 2.0, 120.0),
                    ("china-iii", 2.0, 80.0),
                ],
            ),
        ],
    }
}

/// Load a factor table from a JSON or CSV file, dispatching on extension
pub fn load_factor_table<P: AsRef<Path>>(path: P) -> Result<FactorTable> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

fn load_json(path: &Path) -> Result<FactorTable> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let table: FactorTable = serde_json::from_str(&content)?;
    validate(path, &table)?;
    Ok(table)
}

fn load_csv(path: &Path) -> Result<FactorTable> {
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let sector = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();
    parse_factor_csv(BufReader::new(file), path, sector)
}

/// Parse factor-table CSV (`key,standard,n2o_mg_per_km,ch4_mg_per_km`)
///
/// Consecutive rows sharing a key fold into one entry; entries appear in
/// first-seen order and standards keep row order. Blank factor cells are 0.
pub fn parse_factor_csv<R: std::io::Read>(
    reader: R,
    path: &Path,
    sector: String,
) -> Result<FactorTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut entries: Vec<FactorEntry> = Vec::new();

    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        let key = record.get(0).unwrap_or("").trim();
        let standard = record.get(1).unwrap_or("").trim();
        if key.is_empty() || standard.is_empty() {
            return Err(Error::InvalidFactorTable {
                path: path.to_path_buf(),
                message: "row missing key or standard".to_string(),
            });
        }

        let n2o = parse_factor_cell(record.get(2), path)?;
        let ch4 = parse_factor_cell(record.get(3), path)?;

        let standards = StandardFactors {
            standard: standard.to_string(),
            factors: FactorPair {
                n2o_mg_per_km: n2o,
                ch4_mg_per_km: ch4,
            },
        };

        match entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.standards.push(standards),
            None => entries.push(FactorEntry {
                key: key.to_string(),
                standards: vec![standards],
            }),
        }
    }

    let table = FactorTable { sector, entries };
    validate(path, &table)?;
    Ok(table)
}

fn parse_factor_cell(cell: Option<&str>, path: &Path) -> Result<f64> {
    let cell = cell.unwrap_or("").trim();
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.parse::<f64>().map_err(|_| Error::InvalidFactorTable {
        path: path.to_path_buf(),
        message: format!("non-numeric factor value '{}'", cell),
    })
}

fn validate(path: &Path, table: &FactorTable) -> Result<()> {
    if table.entries.is_empty() {
        return Err(Error::InvalidFactorTable {
            path: path.to_path_buf(),
            message: "no factor entries found".to_string(),
        });
    }
    for entry in &table.entries {
        if entry.standards.is_empty() {
            return Err(Error::InvalidFactorTable {
                path: path.to_path_buf(),
                message: format!("entry '{}' has no standards", entry.key),
            });
        }
    }
    Ok(())
}
