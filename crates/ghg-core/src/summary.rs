//! Industry-level emission summary
//!
//! Each sector calculator reports its total upward as a typed
//! `EmissionReport`; the collector merges reports into two totals. The base
//! total covers direct emissions; the grand total adds purchased
//! electricity/heat. Totals are pure sums, recomputed on demand, and
//! independent of the order reports arrive in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a category contributes to the two totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Direct emissions, counted in both totals
    Direct,
    /// Purchased electricity/heat, counted only in the grand total
    PurchasedEnergy,
}

/// Typed payload a child calculator sends to the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionReport {
    /// Emission-category name (e.g., "fossil-fuel", "tail-gas")
    pub category: String,
    /// Contribution kind
    pub kind: CategoryKind,
    /// Category total, metric tons CO2e
    pub total_t: f64,
}

impl EmissionReport {
    pub fn new(category: impl Into<String>, kind: CategoryKind, total_t: f64) -> Self {
        Self {
            category: category.into(),
            kind,
            total_t,
        }
    }
}

/// The two industry totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Sum of direct categories, tCO2e
    pub base_total_t: f64,
    /// Base total plus purchased electricity/heat, tCO2e
    pub grand_total_t: f64,
}

/// Sum category reports into the two totals
///
/// A category absent from the input contributes 0. Duplicate category names
/// all contribute; the collector below is the dedup point.
pub fn summarize(reports: &[EmissionReport]) -> SummaryTotals {
    let mut base = 0.0;
    let mut purchased = 0.0;

    for report in reports {
        match report.kind {
            CategoryKind::Direct => base += report.total_t,
            CategoryKind::PurchasedEnergy => purchased += report.total_t,
        }
    }

    SummaryTotals {
        base_total_t: base,
        grand_total_t: base + purchased,
    }
}

/// Receives reports from child calculators and keeps the latest per category
///
/// Children re-report on every recompute, so the last report for a category
/// name wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryCollector {
    categories: BTreeMap<String, EmissionReport>,
}

impl SummaryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a report, replacing any earlier report for the same category
    pub fn submit(&mut self, report: EmissionReport) {
        self.categories.insert(report.category.clone(), report);
    }

    /// Drop a category (e.g., the component unmounted)
    pub fn retract(&mut self, category: &str) -> Option<EmissionReport> {
        self.categories.remove(category)
    }

    /// Current reports, by category name
    pub fn reports(&self) -> Vec<&EmissionReport> {
        self.categories.values().collect()
    }

    /// Current totals
    pub fn totals(&self) -> SummaryTotals {
        let reports: Vec<EmissionReport> = self.categories.values().cloned().collect();
        summarize(&reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_summarize_base_and_grand() {
        let reports = vec![
            EmissionReport::new("fossil-fuel", CategoryKind::Direct, 120.5),
            EmissionReport::new("tail-gas", CategoryKind::Direct, 0.7304),
            EmissionReport::new("electricity-heat", CategoryKind::PurchasedEnergy, 30.0),
        ];
        let totals = summarize(&reports);
        assert!(close(totals.base_total_t, 121.2304));
        assert!(close(totals.grand_total_t, 151.2304));
    }

    #[test]
    fn test_summarize_order_independent() {
        let mut reports = vec![
            EmissionReport::new("a", CategoryKind::Direct, 1.5),
            EmissionReport::new("b", CategoryKind::PurchasedEnergy, 2.25),
            EmissionReport::new("c", CategoryKind::Direct, 3.0),
        ];
        let forward = summarize(&reports);
        reports.reverse();
        let backward = summarize(&reports);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_summarize_empty() {
        let totals = summarize(&[]);
        assert_eq!(totals.base_total_t, 0.0);
        assert_eq!(totals.grand_total_t, 0.0);
    }

    #[test]
    fn test_summarize_no_purchased_energy() {
        let reports = vec![EmissionReport::new("fossil-fuel", CategoryKind::Direct, 10.0)];
        let totals = summarize(&reports);
        assert_eq!(totals.base_total_t, 10.0);
        assert_eq!(totals.grand_total_t, 10.0);
    }

    #[test]
    fn test_summarize_ignores_zero_valued_omission() {
        // Omitting a zero-valued category must not change the totals
        let with_zero = vec![
            EmissionReport::new("fossil-fuel", CategoryKind::Direct, 10.0),
            EmissionReport::new("sf6", CategoryKind::Direct, 0.0),
        ];
        let without = vec![EmissionReport::new("fossil-fuel", CategoryKind::Direct, 10.0)];
        assert_eq!(summarize(&with_zero), summarize(&without));
    }

    #[test]
    fn test_collector_last_report_wins() {
        let mut collector = SummaryCollector::new();
        collector.submit(EmissionReport::new("fossil-fuel", CategoryKind::Direct, 5.0));
        collector.submit(EmissionReport::new("fossil-fuel", CategoryKind::Direct, 7.5));

        let totals = collector.totals();
        assert_eq!(totals.base_total_t, 7.5);
    }

    #[test]
    fn test_collector_retract() {
        let mut collector = SummaryCollector::new();
        collector.submit(EmissionReport::new("a", CategoryKind::Direct, 1.0));
        collector.submit(EmissionReport::new("b", CategoryKind::PurchasedEnergy, 2.0));

        collector.retract("b");
        let totals = collector.totals();
        assert_eq!(totals.base_total_t, 1.0);
        assert_eq!(totals.grand_total_t, 1.0);
    }
}
