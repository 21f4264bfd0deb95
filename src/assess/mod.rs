//! Assessment orchestration.
//!
//! Wires the pipeline together: discovery produces raw descriptors,
//! classification maps each one to an assessment as it arrives, and the
//! final report carries the single shared summary both renderers consume.

use crate::catalog::CatalogClient;
use crate::classify::classify_table;
use crate::discovery::{Discovery, DiscoveryEvent, DiscoveryOptions};
use crate::error::AssessError;
use crate::models::{
    AssessmentMetadata, AssessmentReport, AssessmentSummary, DatabaseDescriptor, ItemFailure,
    RunStatus, TableAssessment,
};
use chrono::Utc;
use futures::StreamExt;
use std::collections::HashMap;
use tracing::{info, warn};

/// Drives one assessment run over a resolved catalog client.
pub struct CatalogAssessor<C> {
    client: C,
    region: String,
    account_id: String,
    options: DiscoveryOptions,
}

impl<C: CatalogClient> CatalogAssessor<C> {
    /// Create an assessor for an already-authorized catalog client.
    pub fn new(client: C, region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
            account_id: account_id.into(),
            options: DiscoveryOptions::default(),
        }
    }

    /// Replace the default discovery options.
    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the complete assessment.
    ///
    /// Item-level and transient failures are absorbed into the report's
    /// status; an `Err` here means the run produced nothing usable (or
    /// aborted with fail-soft delivery disabled).
    pub async fn run(&self) -> Result<AssessmentReport, AssessError> {
        let started = Utc::now();
        info!("Starting catalog assessment for region {}", self.region);

        let discovery = Discovery::new(&self.client, self.options.clone());
        let events = discovery.run();
        futures::pin_mut!(events);

        let mut databases: Vec<DatabaseDescriptor> = Vec::new();
        let mut tables: Vec<TableAssessment> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut failures: Vec<ItemFailure> = Vec::new();
        let mut abort_cause: Option<String> = None;

        let deadline = async {
            match self.options.deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    warn!("run deadline exceeded; delivering partial results");
                    abort_cause = Some("run deadline exceeded".to_string());
                    break;
                }
                event = events.next() => match event {
                    None => break,
                    Some(DiscoveryEvent::Database(descriptor)) => databases.push(descriptor),
                    Some(DiscoveryEvent::Table { database, table }) => {
                        let assessment = classify_table(&database, &table, &[]);
                        *counts.entry(database).or_default() += 1;
                        tables.push(assessment);
                    }
                    Some(DiscoveryEvent::ItemFailed(failure)) => {
                        warn!("item degraded: {}", failure);
                        failures.push(failure);
                    }
                    Some(DiscoveryEvent::Aborted { cause }) => {
                        abort_cause = Some(cause);
                        break;
                    }
                }
            }
        }

        if databases.is_empty() && tables.is_empty() {
            if let Some(cause) = abort_cause {
                return Err(AssessError::NothingEnumerated { cause });
            }
        }
        if let Some(cause) = &abort_cause {
            if !self.options.fail_soft {
                return Err(AssessError::Aborted {
                    cause: cause.clone(),
                });
            }
        }

        // Table counts always come from what was actually enumerated, not
        // from anything the catalog reports about itself.
        for database in &mut databases {
            database.table_count = counts.get(&database.name).copied().unwrap_or(0);
        }

        let summary = AssessmentSummary::from_parts(databases.len(), &tables);
        info!(
            "Assessed {} tables across {} databases ({} degraded items)",
            summary.total_tables,
            summary.total_databases,
            failures.len()
        );

        Ok(AssessmentReport {
            metadata: AssessmentMetadata {
                timestamp: started,
                region: self.region.clone(),
                account_id: self.account_id.clone(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            status: RunStatus::from_run(failures, abort_cause),
            summary,
            databases,
            tables,
        })
    }
}
