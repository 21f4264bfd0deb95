//! Per-database rollups and summary statistics.

use crate::models::{AssessmentSummary, DatabaseDescriptor, TableAssessment};
use std::collections::BTreeMap;

/// Group assessments by database name, sorted by name.
pub fn group_by_database(tables: &[TableAssessment]) -> BTreeMap<&str, Vec<&TableAssessment>> {
    let mut grouped: BTreeMap<&str, Vec<&TableAssessment>> = BTreeMap::new();

    for table in tables {
        grouped
            .entry(table.database_name.as_str())
            .or_default()
            .push(table);
    }

    grouped
}

/// Per-database aggregate used by the database overview table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRollup {
    pub database: String,
    pub table_count: usize,
    pub iceberg_count: usize,
    /// Size subtotal over tables with a known size estimate; `None` when
    /// no table in the database reported one.
    pub size_gb: Option<f64>,
}

/// Roll up assessments per database, in the databases' discovery order.
///
/// A database with zero enumerated tables still appears, with zero counts.
pub fn database_rollups(
    databases: &[DatabaseDescriptor],
    tables: &[TableAssessment],
) -> Vec<DatabaseRollup> {
    let grouped = group_by_database(tables);

    databases
        .iter()
        .map(|db| {
            let tables = grouped.get(db.name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let iceberg_count = tables.iter().filter(|t| t.is_iceberg).count();
            let size_gb = tables
                .iter()
                .filter_map(|t| t.estimated_size_gb)
                .fold(None, |acc: Option<f64>, size| {
                    Some(acc.unwrap_or(0.0) + size)
                });

            DatabaseRollup {
                database: db.name.clone(),
                table_count: tables.len(),
                iceberg_count,
                size_gb,
            }
        })
        .collect()
}

/// Whole-percent shares of the three readiness buckets.
///
/// Uses largest-remainder rounding so the shares always sum to exactly
/// 100 when any tables exist. Returns `[ready, needs_conversion, unknown]`.
pub fn readiness_percentages(summary: &AssessmentSummary) -> [u64; 3] {
    let total = summary.total_tables;
    if total == 0 {
        return [0, 0, 0];
    }

    let counts = [
        summary.migration_ready,
        summary.needs_conversion,
        summary.unknown,
    ];

    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * 100.0 / total as f64)
        .collect();
    let mut shares: Vec<u64> = exact.iter().map(|&p| p.floor() as u64).collect();
    let assigned: u64 = shares.iter().sum();

    // Hand the leftover points to the buckets with the largest remainders.
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });
    for &index in order.iter().take((100 - assigned) as usize) {
        shares[index] += 1;
    }

    [shares[0], shares[1], shares[2]]
}
