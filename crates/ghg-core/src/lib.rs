//! ghg-core: Core library for industrial GHG emission accounting
//!
//! This library provides functionality to:
//! - Hold per-sector emission-factor tables (built in or loaded from JSON/CSV)
//! - Expand a factor table into a flat (vehicle, fuel, standard) combination table
//! - Annotate rows with the spans a renderer needs to merge repeated cells
//! - Compute N2O/CH4 masses and CO2-equivalents from entered activity data
//! - Collect per-category totals into industry base and grand totals
//! - Apply saved activity worksheets and export computed tables

pub mod catalog;
pub mod emission;
pub mod error;
pub mod export;
pub mod factors;
pub mod formulas;
pub mod rows;
pub mod rowspan;
pub mod summary;
pub mod worksheet;

pub use catalog::{scan_factor_dir, Catalog, SectorFile};
pub use emission::{compute, DerivedEmissions, GWP_CH4, GWP_N2O};
pub use error::{Error, Result};
pub use export::{write_csv, write_json, ComputedRow, ComputedTable};
pub use factors::{
    land_transport, load_factor_table, split_compound_key, FactorEntry, FactorPair, FactorTable,
    StandardFactors,
};
pub use formulas::{tail_gas_emission_t, Sf6Device, Sf6Inventory, GWP_SF6};
pub use rows::{generate_rows, CombinationRow, EditField, RowTable};
pub use rowspan::{annotate, RowSpan};
pub use summary::{summarize, CategoryKind, EmissionReport, SummaryCollector, SummaryTotals};
pub use worksheet::{
    apply_worksheet, load_activity_csv, ActivityEntry, ApplyResult, Worksheet,
};
