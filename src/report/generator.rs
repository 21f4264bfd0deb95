//! Markdown and JSON report generation.
//!
//! Every number rendered here comes out of the report's single
//! precomputed summary and the shared rollup helpers, so the two output
//! formats can never disagree.

use crate::analysis::{database_rollups, group_by_database, readiness_percentages};
use crate::models::{AssessmentMetadata, AssessmentReport, AssessmentSummary, RunStatus};
use anyhow::{Context, Result};
use std::path::Path;

/// Rendering options for the markdown report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Include the per-table notes column in the detailed inventory.
    pub include_notes: bool,
    /// Include the migration-strategy recommendations section.
    pub include_recommendations: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_notes: true,
            include_recommendations: true,
        }
    }
}

/// Generate the complete markdown report with default options.
pub fn generate_markdown_report(report: &AssessmentReport) -> String {
    generate_markdown_report_with(report, &ReportOptions::default())
}

/// Generate the complete markdown report.
pub fn generate_markdown_report_with(report: &AssessmentReport, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str(&generate_header(&report.metadata));
    output.push_str(&generate_status_section(&report.status));
    output.push_str(&generate_executive_summary(&report.summary));
    output.push_str(&generate_readiness_breakdown(&report.summary));
    output.push_str(&generate_database_overview(report));
    output.push_str(&generate_table_details(report, options));

    if options.include_recommendations {
        output.push_str(&generate_recommendations(&report.summary));
    }

    output.push_str(&generate_footer());
    output
}

fn generate_header(metadata: &AssessmentMetadata) -> String {
    let mut section = String::new();

    section.push_str("# Catalog Migration Assessment\n\n");
    section.push_str(&format!(
        "**Generated:** {}\n",
        metadata.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("**Region:** {}\n", metadata.region));
    section.push_str(&format!("**Account:** {}\n", metadata.account_id));
    section.push_str(&format!("**Tool Version:** {}\n\n", metadata.tool_version));

    section
}

fn generate_status_section(status: &RunStatus) -> String {
    let mut section = String::new();

    section.push_str("## Run Status\n\n");

    match status {
        RunStatus::Complete => {
            section.push_str("Complete. Every database and table was enumerated.\n\n");
        }
        RunStatus::Partial { failures } => {
            section.push_str(&format!(
                "⚠️ Completed with {} item-level failure(s). Affected items were \
                 degraded, not dropped silently:\n\n",
                failures.len()
            ));
            for failure in failures {
                section.push_str(&format!("- {}\n", failure));
            }
            section.push('\n');
        }
        RunStatus::Aborted { cause, failures } => {
            section.push_str(&format!(
                "⛔ Aborted: {}. Results below are partial.\n\n",
                cause
            ));
            for failure in failures {
                section.push_str(&format!("- {}\n", failure));
            }
            if !failures.is_empty() {
                section.push('\n');
            }
        }
    }

    section
}

fn generate_executive_summary(summary: &AssessmentSummary) -> String {
    let mut section = String::new();

    let iceberg_pct = if summary.total_tables > 0 {
        summary.iceberg_tables as f64 * 100.0 / summary.total_tables as f64
    } else {
        0.0
    };

    section.push_str("## Executive Summary\n\n");
    section.push_str(&format!(
        "- **Total Databases:** {}\n",
        summary.total_databases
    ));
    section.push_str(&format!("- **Total Tables:** {}\n", summary.total_tables));
    section.push_str(&format!(
        "- **Iceberg Tables:** {} ({:.1}%)\n",
        summary.iceberg_tables, iceberg_pct
    ));
    section.push_str(&format!(
        "- **Migration Ready:** {} tables\n",
        summary.migration_ready
    ));
    section.push_str(&format!(
        "- **Needs Conversion:** {} tables\n",
        summary.needs_conversion
    ));
    section.push_str(&format!(
        "- **Total Estimated Storage:** {:.1} GB\n\n",
        summary.total_estimated_size_gb
    ));

    section
}

fn generate_readiness_breakdown(summary: &AssessmentSummary) -> String {
    let mut section = String::new();

    section.push_str("## Migration Readiness Breakdown\n\n");

    if summary.total_tables == 0 {
        section.push_str("No tables found.\n\n");
        return section;
    }

    let [ready_pct, conversion_pct, unknown_pct] = readiness_percentages(summary);

    section.push_str("| Status | Count | Percentage |\n");
    section.push_str("|:---|---:|---:|\n");
    section.push_str(&format!(
        "| READY | {} | {}% |\n",
        summary.migration_ready, ready_pct
    ));
    section.push_str(&format!(
        "| NEEDS_CONVERSION | {} | {}% |\n",
        summary.needs_conversion, conversion_pct
    ));
    section.push_str(&format!(
        "| UNKNOWN | {} | {}% |\n\n",
        summary.unknown, unknown_pct
    ));

    section
}

fn generate_database_overview(report: &AssessmentReport) -> String {
    let mut section = String::new();

    section.push_str("## Database Overview\n\n");

    if report.databases.is_empty() {
        section.push_str("No databases found.\n\n");
        return section;
    }

    section.push_str("| Database | Tables | Iceberg Tables | Storage (GB) |\n");
    section.push_str("|:---|---:|---:|---:|\n");

    for rollup in database_rollups(&report.databases, &report.tables) {
        let storage = match rollup.size_gb {
            Some(size) => format!("{:.1}", size),
            None => "N/A".to_string(),
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            rollup.database, rollup.table_count, rollup.iceberg_count, storage
        ));
    }
    section.push('\n');

    section
}

fn generate_table_details(report: &AssessmentReport, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Detailed Table Inventory\n\n");

    if report.tables.is_empty() {
        section.push_str("No tables found.\n\n");
        return section;
    }

    for (database, tables) in group_by_database(&report.tables) {
        section.push_str(&format!("### Database: {}\n\n", database));

        if options.include_notes {
            section.push_str("| Table | Format | Size (GB) | Partitions | Readiness | Notes |\n");
            section.push_str("|:---|:---|---:|:---|:---|:---|\n");
        } else {
            section.push_str("| Table | Format | Size (GB) | Partitions | Readiness |\n");
            section.push_str("|:---|:---|---:|:---|:---|\n");
        }

        for table in tables {
            let size = match table.estimated_size_gb {
                Some(size) => format!("{:.1}", size),
                None => "N/A".to_string(),
            };
            let partitions = if table.partition_keys.is_empty() {
                "None".to_string()
            } else {
                table.partition_keys.join(", ")
            };

            if options.include_notes {
                section.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    table.table_name,
                    table.format,
                    size,
                    partitions,
                    table.migration_readiness,
                    table.notes.join("; ")
                ));
            } else {
                section.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    table.table_name, table.format, size, partitions, table.migration_readiness
                ));
            }
        }
        section.push('\n');
    }

    section
}

fn generate_recommendations(summary: &AssessmentSummary) -> String {
    let mut section = String::new();

    section.push_str("## Recommendations\n\n### Migration Strategy\n\n");

    if summary.migration_ready > 0 {
        section.push_str(&format!(
            "- **{} Iceberg tables (READY):** can be migrated immediately with \
             bulk copy tools; metadata registers directly in the target catalog\n",
            summary.migration_ready
        ));
    }
    if summary.needs_conversion > 0 {
        section.push_str(&format!(
            "- **{} non-Iceberg tables (NEEDS_CONVERSION):** convert in place to \
             Iceberg first, then migrate as Iceberg tables\n",
            summary.needs_conversion
        ));
    }
    if summary.unknown > 0 {
        section.push_str(&format!(
            "- **{} tables (UNKNOWN):** need manual review\n",
            summary.unknown
        ));
    }

    section.push_str("\n### Next Steps\n\n");
    section.push_str("1. Review tables marked as NEEDS_CONVERSION\n");
    section.push_str("2. Prioritize tables by business criticality and size\n");
    section.push_str("3. Plan conversion strategy for non-Iceberg tables\n\n");

    section
}

fn generate_footer() -> String {
    "---\n\n*Generated by icescout*\n".to_string()
}

/// Generate the JSON report.
///
/// Lossless with respect to the report's field set: absent optionals stay
/// absent in the document.
pub fn generate_json_report(report: &AssessmentReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write the markdown report to a caller-specified path.
pub fn write_markdown_report(report: &AssessmentReport, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report);
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write markdown report to {}", path.display()))
}

/// Write the JSON report to a caller-specified path.
pub fn write_json_report(report: &AssessmentReport, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write JSON report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AssessmentMetadata, DatabaseDescriptor, ItemFailure, MigrationReadiness, TableAssessment,
        TableFormat,
    };
    use chrono::Utc;

    fn sample_report() -> AssessmentReport {
        let tables = vec![
            TableAssessment {
                database_name: "sales".to_string(),
                table_name: "orders".to_string(),
                format: TableFormat::Iceberg,
                storage_location: "s3://bucket/orders/".to_string(),
                estimated_size_gb: Some(4.0),
                partition_keys: vec!["ds".to_string()],
                column_count: 12,
                last_updated: None,
                is_iceberg: true,
                migration_readiness: MigrationReadiness::Ready,
                notes: Vec::new(),
            },
            TableAssessment {
                database_name: "sales".to_string(),
                table_name: "legacy".to_string(),
                format: TableFormat::Parquet,
                storage_location: "s3://bucket/legacy/".to_string(),
                estimated_size_gb: None,
                partition_keys: Vec::new(),
                column_count: 3,
                last_updated: None,
                is_iceberg: false,
                migration_readiness: MigrationReadiness::NeedsConversion,
                notes: vec!["PARQUET format requires conversion to Iceberg".to_string()],
            },
        ];

        AssessmentReport {
            metadata: AssessmentMetadata {
                timestamp: Utc::now(),
                region: "us-east-1".to_string(),
                account_id: "123456789012".to_string(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            status: RunStatus::Partial {
                failures: vec![ItemFailure {
                    database: "locked".to_string(),
                    table: None,
                    reason: "access denied".to_string(),
                }],
            },
            summary: AssessmentSummary::from_parts(3, &tables),
            databases: vec![
                DatabaseDescriptor {
                    name: "sales".to_string(),
                    description: None,
                    location_uri: None,
                    table_count: 2,
                },
                DatabaseDescriptor {
                    name: "empty".to_string(),
                    description: None,
                    location_uri: None,
                    table_count: 0,
                },
                DatabaseDescriptor {
                    name: "locked".to_string(),
                    description: None,
                    location_uri: None,
                    table_count: 0,
                },
            ],
            tables,
        }
    }

    #[test]
    fn test_markdown_contains_all_sections() {
        let markdown = generate_markdown_report(&sample_report());

        assert!(markdown.contains("# Catalog Migration Assessment"));
        assert!(markdown.contains("## Run Status"));
        assert!(markdown.contains("## Executive Summary"));
        assert!(markdown.contains("## Migration Readiness Breakdown"));
        assert!(markdown.contains("## Database Overview"));
        assert!(markdown.contains("## Detailed Table Inventory"));
        assert!(markdown.contains("## Recommendations"));
    }

    #[test]
    fn test_markdown_surfaces_partial_failures() {
        let markdown = generate_markdown_report(&sample_report());

        assert!(markdown.contains("1 item-level failure"));
        assert!(markdown.contains("locked: access denied"));
    }

    #[test]
    fn test_markdown_zero_table_database_in_overview() {
        let markdown = generate_markdown_report(&sample_report());

        assert!(markdown.contains("| empty | 0 | 0 | N/A |"));
    }

    #[test]
    fn test_markdown_absent_size_renders_na() {
        let markdown = generate_markdown_report(&sample_report());

        assert!(markdown.contains("| legacy | PARQUET | N/A | None | NEEDS_CONVERSION |"));
    }

    #[test]
    fn test_notes_column_can_be_disabled() {
        let options = ReportOptions {
            include_notes: false,
            include_recommendations: false,
        };
        let markdown = generate_markdown_report_with(&sample_report(), &options);

        assert!(!markdown.contains("| Notes |"));
        assert!(!markdown.contains("## Recommendations"));
    }

    #[test]
    fn test_json_and_markdown_agree_on_summary_counts() {
        let report = sample_report();
        let markdown = generate_markdown_report(&report);
        let json = generate_json_report(&report).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let summary = &parsed["summary"];

        assert_eq!(summary["total_databases"], 3);
        assert_eq!(summary["total_tables"], 2);
        assert!(markdown.contains("- **Total Databases:** 3"));
        assert!(markdown.contains("- **Total Tables:** 2"));
        assert_eq!(
            summary["migration_ready"].as_u64().unwrap()
                + summary["needs_conversion"].as_u64().unwrap()
                + summary["unknown"].as_u64().unwrap(),
            summary["total_tables"].as_u64().unwrap()
        );
    }

    #[test]
    fn test_json_preserves_absent_optionals() {
        let json = generate_json_report(&sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        // legacy table has no size estimate; the field is absent, not zero
        let legacy = &parsed["tables"][1];
        assert_eq!(legacy["table_name"], "legacy");
        assert!(legacy.get("estimated_size_gb").is_none());
    }

    #[test]
    fn test_write_reports_to_disk() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();

        let md_path = dir.path().join("assessment.md");
        let json_path = dir.path().join("assessment.json");

        write_markdown_report(&report, &md_path).unwrap();
        write_json_report(&report, &json_path).unwrap();

        let markdown = std::fs::read_to_string(&md_path).unwrap();
        assert!(markdown.contains("# Catalog Migration Assessment"));

        let restored: AssessmentReport =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(restored.summary, report.summary);
    }
}
