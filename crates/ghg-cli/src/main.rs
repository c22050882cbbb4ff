//! GHG Ledger CLI
//!
//! Command-line tool for generating combination tables, entering activity
//! data, and computing industrial GHG emission totals.

use clap::{Parser, Subcommand};
use ghg_core::{
    annotate, apply_worksheet, land_transport, load_activity_csv, scan_factor_dir, summarize,
    tail_gas_emission_t, CategoryKind, ComputedTable, EmissionReport, FactorTable, RowTable,
    Sf6Inventory, Worksheet,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghg-cli")]
#[command(about = "Industrial GHG emission accounting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories for sector factor-table files
    Sectors {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,
    },

    /// List the emission factors of a sector table
    Factors {
        /// Root directories holding factor-table files
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Sector name (defaults to the built-in land-transport table)
        #[arg(short, long)]
        sector: Option<String>,
    },

    /// Show the generated combination table with merged group cells
    Rows {
        /// Root directories holding factor-table files
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Sector name (defaults to the built-in land-transport table)
        #[arg(short, long)]
        sector: Option<String>,
    },

    /// Apply entered activity data and compute per-row emissions and totals
    Compute {
        /// Root directories holding factor-table files
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Sector name (defaults to the built-in land-transport table)
        #[arg(short, long)]
        sector: Option<String>,

        /// Worksheet file (JSON) with activity entries
        #[arg(short, long)]
        worksheet: Option<PathBuf>,

        /// Activity data CSV (row_key,vehicle_count,distance_km)
        #[arg(short, long)]
        activity: Option<PathBuf>,

        /// Output format (csv or json); omit for a plain listing
        #[arg(long)]
        format: Option<String>,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine category totals into base and grand industry totals
    Summarize {
        /// Category reports as NAME=KIND:VALUE, where KIND is
        /// "direct" or "purchased" (e.g., fossil-fuel=direct:120.5)
        #[arg(short = 'e', long = "report", required = true)]
        report: Vec<String>,
    },

    /// Tail-gas purification emission from urea consumption
    Tailgas {
        /// Urea mass consumed, kg
        #[arg(short, long)]
        urea_kg: f64,

        /// Urea purity percent (defaults to 99.6)
        #[arg(short, long)]
        purity: Option<f64>,
    },

    /// SF6 emission from repaired and retired equipment
    Sf6 {
        /// Repaired devices as CAPACITY:RECOVERED (kg)
        #[arg(long)]
        repaired: Vec<String>,

        /// Retired devices as CAPACITY:RECOVERED (kg)
        #[arg(long)]
        retired: Vec<String>,
    },

    /// Create a worksheet template with one entry per combination row
    InitWorksheet {
        /// Root directories holding factor-table files
        #[arg(short, long)]
        root: Vec<PathBuf>,

        /// Sector name (defaults to the built-in land-transport table)
        #[arg(short, long)]
        sector: Option<String>,

        /// Output path for the worksheet file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> ghg_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sectors { root } => cmd_sectors(&root),
        Commands::Factors { root, sector } => cmd_factors(&root, sector.as_deref()),
        Commands::Rows { root, sector } => cmd_rows(&root, sector.as_deref()),
        Commands::Compute {
            root,
            sector,
            worksheet,
            activity,
            format,
            output,
        } => cmd_compute(&root, sector.as_deref(), worksheet, activity, format, output),
        Commands::Summarize { report } => cmd_summarize(&report),
        Commands::Tailgas { urea_kg, purity } => cmd_tailgas(urea_kg, purity),
        Commands::Sf6 { repaired, retired } => cmd_sf6(&repaired, &retired),
        Commands::InitWorksheet { root, sector, output } => {
            cmd_init_worksheet(&root, sector.as_deref(), &output)
        }
    }
}

/// Resolve a factor table: a named sector from the scanned roots, or the
/// built-in land-transport table when no sector is named
fn resolve_table(roots: &[PathBuf], sector: Option<&str>) -> ghg_core::Result<FactorTable> {
    match sector {
        None => Ok(land_transport()),
        Some(name) => {
            if roots.is_empty() && name == "land-transport" {
                return Ok(land_transport());
            }
            let catalog = scan_factor_dir(roots)?;
            let sector_file = catalog
                .find_sector(name)
                .ok_or_else(|| ghg_core::Error::SectorNotFound(name.to_string()))?;
            sector_file.load()
        }
    }
}

fn cmd_sectors(roots: &[PathBuf]) -> ghg_core::Result<()> {
    let catalog = scan_factor_dir(roots)?;

    println!("Scanned {} root(s):", catalog.roots.len());
    for root in &catalog.roots {
        println!("  {}", root.display());
    }
    println!();
    println!("Found {} sector table(s):", catalog.sectors.len());
    for sector in &catalog.sectors {
        println!("  {} ({})", sector.name, sector.path.display());
    }

    Ok(())
}

fn cmd_factors(roots: &[PathBuf], sector: Option<&str>) -> ghg_core::Result<()> {
    let table = resolve_table(roots, sector)?;

    println!("Sector: {}", table.sector);
    println!("Entries: {} ({} combinations)", table.entries.len(), table.leaf_count());
    println!();
    println!("key\tstandard\tn2o mg/km\tch4 mg/km");
    println!("{}", "-".repeat(48));

    for entry in &table.entries {
        for standard in &entry.standards {
            println!(
                "{}\t{}\t{}\t{}",
                entry.key,
                standard.standard,
                standard.factors.n2o_mg_per_km,
                standard.factors.ch4_mg_per_km
            );
        }
    }

    Ok(())
}

fn cmd_rows(roots: &[PathBuf], sector: Option<&str>) -> ghg_core::Result<()> {
    let table = resolve_table(roots, sector)?;
    let rows = RowTable::generate(&table);
    print_row_table(&rows);
    Ok(())
}

fn print_row_table(rows: &RowTable) {
    let spans = annotate(&rows.rows);

    println!("vehicle\tfuel\tstandard\tcount\tkm\ttCO2e");
    println!("{}", "-".repeat(64));

    for (row, span) in rows.rows.iter().zip(&spans) {
        // Merged cells: only the group head shows its label
        let vehicle = if span.first_of_vehicle {
            row.vehicle_label.as_str()
        } else {
            ""
        };
        let fuel = if span.first_of_fuel {
            row.fuel_label.as_str()
        } else {
            ""
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.9}",
            vehicle,
            fuel,
            row.standard,
            row.vehicle_count,
            row.distance_km,
            row.emissions().total_co2e_t
        );
    }

    println!();
    println!("Total: {:.9} tCO2e", rows.total_co2e_t());
}

fn cmd_compute(
    roots: &[PathBuf],
    sector: Option<&str>,
    worksheet_path: Option<PathBuf>,
    activity_path: Option<PathBuf>,
    format: Option<String>,
    output: Option<PathBuf>,
) -> ghg_core::Result<()> {
    let table = resolve_table(roots, sector)?;
    let mut rows = RowTable::generate(&table);

    if let Some(path) = worksheet_path {
        let worksheet = Worksheet::load(&path)?;
        let result = apply_worksheet(&mut rows, &worksheet);
        println!(
            "Applied {} worksheet entries from {}",
            result.applied,
            path.display()
        );
        for (entry, reason) in &result.skipped {
            eprintln!("Warning: skipped '{}': {}", entry.row_key, reason);
        }
    }

    if let Some(path) = activity_path {
        let entries = load_activity_csv(&path)?;
        let mut worksheet = Worksheet::new(rows.sector.clone());
        worksheet.entries = entries;
        let result = apply_worksheet(&mut rows, &worksheet);
        println!(
            "Applied {} activity entries from {}",
            result.applied,
            path.display()
        );
        for (entry, reason) in &result.skipped {
            eprintln!("Warning: skipped '{}': {}", entry.row_key, reason);
        }
    }

    match format.as_deref() {
        None => {
            print_row_table(&rows);
            Ok(())
        }
        Some(fmt) => {
            let computed = ComputedTable::build(&rows);
            match output {
                Some(path) => {
                    let file = File::create(&path)?;
                    let writer = BufWriter::new(file);
                    write_formatted(writer, &computed, fmt)?;
                    println!("Exported {} rows to {}", computed.rows.len(), path.display());
                    Ok(())
                }
                None => write_formatted(std::io::stdout().lock(), &computed, fmt),
            }
        }
    }
}

fn write_formatted<W: std::io::Write>(
    writer: W,
    computed: &ComputedTable,
    format: &str,
) -> ghg_core::Result<()> {
    match format.to_lowercase().as_str() {
        "csv" => ghg_core::write_csv(writer, computed),
        "json" => ghg_core::write_json(writer, computed),
        other => {
            eprintln!("Unknown format: {}. Supported formats: csv, json", other);
            std::process::exit(1);
        }
    }
}

fn cmd_summarize(specs: &[String]) -> ghg_core::Result<()> {
    let mut reports = Vec::new();

    for spec in specs {
        match parse_report_spec(spec) {
            Some(report) => reports.push(report),
            None => {
                eprintln!(
                    "Warning: invalid report '{}', expected NAME=direct:VALUE or NAME=purchased:VALUE",
                    spec
                );
            }
        }
    }

    let totals = summarize(&reports);

    println!("Categories:");
    for report in &reports {
        let kind = match report.kind {
            CategoryKind::Direct => "direct",
            CategoryKind::PurchasedEnergy => "purchased",
        };
        println!("  {} ({}): {:.6} tCO2e", report.category, kind, report.total_t);
    }
    println!();
    println!("Base total:  {:.6} tCO2e", totals.base_total_t);
    println!("Grand total: {:.6} tCO2e", totals.grand_total_t);

    Ok(())
}

/// Parse "NAME=KIND:VALUE" into a report
fn parse_report_spec(spec: &str) -> Option<EmissionReport> {
    let (category, rest) = spec.split_once('=')?;
    let (kind, value) = rest.split_once(':')?;

    let kind = match kind {
        "direct" => CategoryKind::Direct,
        "purchased" => CategoryKind::PurchasedEnergy,
        _ => return None,
    };
    let total_t: f64 = value.parse().ok()?;

    Some(EmissionReport::new(category, kind, total_t))
}

fn cmd_tailgas(urea_kg: f64, purity: Option<f64>) -> ghg_core::Result<()> {
    let emission = tail_gas_emission_t(urea_kg, purity);

    println!("Urea consumed: {} kg", urea_kg);
    match purity {
        Some(p) => println!("Urea purity: {}%", p),
        None => println!("Urea purity: 99.6% (default)"),
    }
    println!("Emission: {:.6} tCO2", emission);

    Ok(())
}

fn cmd_sf6(repaired: &[String], retired: &[String]) -> ghg_core::Result<()> {
    let mut inventory = Sf6Inventory::new();

    for spec in repaired {
        match parse_device_spec(spec) {
            Some((capacity, recovered)) => {
                inventory.add_repaired(capacity, recovered);
            }
            None => eprintln!("Warning: invalid device '{}', expected CAPACITY:RECOVERED", spec),
        }
    }
    for spec in retired {
        match parse_device_spec(spec) {
            Some((capacity, recovered)) => {
                inventory.add_retired(capacity, recovered);
            }
            None => eprintln!("Warning: invalid device '{}', expected CAPACITY:RECOVERED", spec),
        }
    }

    println!("Repaired devices: {}", inventory.repaired.len());
    println!("Retired devices: {}", inventory.retired.len());
    println!("Emission: {:.6} tCO2e", inventory.total_emission_t());

    Ok(())
}

/// Parse "CAPACITY:RECOVERED" in kg
fn parse_device_spec(spec: &str) -> Option<(f64, f64)> {
    let (capacity, recovered) = spec.split_once(':')?;
    Some((capacity.trim().parse().ok()?, recovered.trim().parse().ok()?))
}

fn cmd_init_worksheet(
    roots: &[PathBuf],
    sector: Option<&str>,
    output: &PathBuf,
) -> ghg_core::Result<()> {
    let table = resolve_table(roots, sector)?;
    let worksheet = Worksheet::template(&table);

    worksheet.save(output)?;
    println!("Created worksheet: {}", output.display());
    println!("Sector: {}", worksheet.sector);
    println!("Entries: {}", worksheet.entries.len());
    println!();
    println!("Fill in vehicle_count and distance_km, then run:");
    println!("  ghg-cli compute --worksheet {}", output.display());

    Ok(())
}
