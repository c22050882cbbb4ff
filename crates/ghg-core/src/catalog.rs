//! Directory scanner for discovering sector factor-table files

use crate::error::Result;
use crate::factors::{load_factor_table, FactorTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered sector factor-table file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorFile {
    /// Sector name (file stem, e.g., "power-grid")
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
}

impl SectorFile {
    /// Load the factor table behind this entry
    pub fn load(&self) -> Result<FactorTable> {
        load_factor_table(&self.path)
    }
}

/// Result of scanning directories for factor tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// Discovered sector files, sorted by sector name
    pub sectors: Vec<SectorFile>,
}

impl Catalog {
    /// Find a sector by name
    pub fn find_sector(&self, name: &str) -> Option<&SectorFile> {
        self.sectors.iter().find(|s| s.name == name)
    }

    /// Get all sector names
    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Scan one or more directories for factor-table files (.json or .csv)
///
/// One sector per file, named by file stem. When the same sector name
/// appears more than once, the first path encountered wins.
pub fn scan_factor_dir<P: AsRef<Path>>(roots: &[P]) -> Result<Catalog> {
    let mut by_name: BTreeMap<String, PathBuf> = BTreeMap::new();

    for root in roots {
        let root = root.as_ref();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            let is_table = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("csv"));

            if is_table {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    by_name
                        .entry(stem.to_string())
                        .or_insert_with(|| path.to_path_buf());
                }
            }
        }
    }

    let sectors = by_name
        .into_iter()
        .map(|(name, path)| SectorFile { name, path })
        .collect();

    Ok(Catalog {
        roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
        sectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sector() {
        let catalog = Catalog {
            roots: vec![PathBuf::from("conf")],
            sectors: vec![
                SectorFile {
                    name: "land-transport".to_string(),
                    path: PathBuf::from("conf/land-transport.json"),
                },
                SectorFile {
                    name: "power-grid".to_string(),
                    path: PathBuf::from("conf/power-grid.csv"),
                },
            ],
        };

        assert!(catalog.find_sector("power-grid").is_some());
        assert!(catalog.find_sector("steel").is_none());
        assert_eq!(catalog.sector_names(), vec!["land-transport", "power-grid"]);
    }
}
