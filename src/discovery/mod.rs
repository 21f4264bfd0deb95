//! Catalog discovery.
//!
//! Enumerates every database and table the remote catalog will hand out,
//! following pagination to exhaustion. Output is a lazy stream of events
//! so very large catalogs never need to sit in memory as one batch.
//!
//! Failure policy: transient errors are retried with exponential backoff;
//! a database that stays unreadable degrades into an [`ItemFailure`] event
//! and enumeration moves on. Only a network failure that outlives the
//! retry budget halts the phase, and even then every event produced so far
//! has already been delivered downstream.

use crate::catalog::{CatalogClient, RawDatabase, RawTable};
use crate::error::CatalogError;
use crate::models::{DatabaseDescriptor, ItemFailure};
use futures::future::Either;
use futures::stream::{self, Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tuning knobs for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Retry attempts for transient failures, per call.
    pub max_retries: usize,
    /// Backoff before the first retry; doubles per attempt.
    pub base_backoff: Duration,
    /// How many databases to enumerate concurrently.
    pub concurrency: usize,
    /// Overall run deadline. `None` means no deadline.
    pub deadline: Option<Duration>,
    /// Deliver partial results when discovery aborts mid-run.
    pub fail_soft: bool,
    /// Show an indicatif progress spinner while enumerating.
    pub show_progress: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(200),
            concurrency: 4,
            deadline: None,
            fail_soft: true,
            show_progress: false,
        }
    }
}

/// One event in the discovery stream.
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// A database was enumerated. Its `table_count` is zero here; the
    /// orchestrator recomputes it from the table events that follow.
    Database(DatabaseDescriptor),
    /// A raw table descriptor, ready for classification.
    Table { database: String, table: RawTable },
    /// One database or table could not be read; the run continues.
    ItemFailed(ItemFailure),
    /// Discovery halted. No further events follow.
    Aborted { cause: String },
}

/// Paginated, fail-soft enumeration of a remote catalog.
pub struct Discovery<'a, C> {
    client: &'a C,
    options: DiscoveryOptions,
}

impl<'a, C: CatalogClient> Discovery<'a, C> {
    pub fn new(client: &'a C, options: DiscoveryOptions) -> Self {
        Self { client, options }
    }

    /// Run discovery, producing events lazily.
    ///
    /// The stream always terminates: either the catalog is exhausted or an
    /// `Aborted` event is the final element.
    pub fn run(&self) -> impl Stream<Item = DiscoveryEvent> + '_ {
        let progress = self.options.show_progress.then(progress_bar);

        let events = stream::once(self.collect_databases()).flat_map(move |outcome| {
            match outcome {
                Err(e) => Either::Left(stream::iter(vec![DiscoveryEvent::Aborted {
                    cause: e.to_string(),
                }])),
                Ok((databases, abort_cause)) => {
                    info!("Discovered {} databases", databases.len());

                    let db_events: Vec<DiscoveryEvent> = databases
                        .iter()
                        .map(|db| {
                            DiscoveryEvent::Database(DatabaseDescriptor {
                                name: db.name.clone(),
                                description: db.description.clone(),
                                location_uri: db.location_uri.clone(),
                                table_count: 0,
                            })
                        })
                        .collect();

                    let names: Vec<String> =
                        databases.into_iter().map(|db| db.name).collect();

                    // When the database listing itself aborted, the network
                    // is already gone; skip table enumeration entirely.
                    let table_events = if abort_cause.is_none() {
                        Either::Left(
                            stream::iter(names)
                                .map(move |name| self.table_events(name).boxed_local())
                                .flatten_unordered(self.options.concurrency),
                        )
                    } else {
                        Either::Right(stream::empty())
                    };

                    let abort_events = stream::iter(
                        abort_cause.map(|cause| DiscoveryEvent::Aborted { cause }),
                    );

                    Either::Right(
                        stream::iter(db_events).chain(table_events).chain(abort_events),
                    )
                }
            }
        });

        events.inspect(move |event| {
            if let Some(pb) = &progress {
                match event {
                    DiscoveryEvent::Table { .. } => pb.inc(1),
                    DiscoveryEvent::ItemFailed(failure) => {
                        pb.set_message(format!("degraded: {}", failure.database));
                    }
                    DiscoveryEvent::Aborted { .. } => pb.abandon(),
                    DiscoveryEvent::Database(_) => {}
                }
            }
        })
    }

    /// Enumerate every database page.
    ///
    /// Returns the databases gathered plus an abort cause when the listing
    /// broke off partway. Fails outright only when not a single page could
    /// be read.
    async fn collect_databases(
        &self,
    ) -> Result<(Vec<RawDatabase>, Option<String>), CatalogError> {
        let mut databases = Vec::new();
        let mut token: Option<String> = None;

        loop {
            match self
                .with_retry(|| self.client.list_databases(token.clone()))
                .await
            {
                Ok(page) => {
                    debug!("database page: {} items", page.items.len());
                    databases.extend(page.items);
                    match page.next_token {
                        Some(next) => token = Some(next),
                        None => return Ok((databases, None)),
                    }
                }
                Err(e) if databases.is_empty() => return Err(e),
                Err(e) => {
                    warn!("database enumeration broke off after {} databases: {}", databases.len(), e);
                    return Ok((
                        databases,
                        Some(format!("database enumeration aborted: {}", e)),
                    ));
                }
            }
        }
    }

    /// Enumerate one database's tables as a lazy event stream.
    fn table_events(&self, database: String) -> impl Stream<Item = DiscoveryEvent> + '_ {
        enum PageState {
            Fetch(Option<String>),
            Degrade(ItemFailure),
            Halt(String),
            Done,
        }

        stream::unfold(PageState::Fetch(None), move |state| {
            let database = database.clone();
            async move {
                match state {
                    PageState::Done => None,
                    PageState::Degrade(failure) => {
                        Some((vec![DiscoveryEvent::ItemFailed(failure)], PageState::Done))
                    }
                    PageState::Halt(cause) => {
                        Some((vec![DiscoveryEvent::Aborted { cause }], PageState::Done))
                    }
                    PageState::Fetch(token) => {
                        let outcome = self
                            .with_retry(|| self.client.list_tables(&database, token.clone()))
                            .await;
                        match outcome {
                            Ok(page) => {
                                debug!(
                                    "table page for '{}': {} items",
                                    database,
                                    page.items.len()
                                );
                                let next = match page.next_token {
                                    Some(next) => PageState::Fetch(Some(next)),
                                    None => PageState::Done,
                                };
                                let events = page
                                    .items
                                    .into_iter()
                                    .map(|table| DiscoveryEvent::Table {
                                        database: database.clone(),
                                        table,
                                    })
                                    .collect();
                                Some((events, next))
                            }
                            Err(CatalogError::Network(cause)) => {
                                warn!(
                                    "network failure enumerating '{}' past the retry budget",
                                    database
                                );
                                Some((
                                    Vec::new(),
                                    PageState::Halt(format!(
                                        "table enumeration for '{}' failed: {}",
                                        database, cause
                                    )),
                                ))
                            }
                            Err(e) => {
                                warn!("degrading database '{}': {}", database, e);
                                Some((
                                    Vec::new(),
                                    PageState::Degrade(ItemFailure {
                                        database: database.clone(),
                                        table: None,
                                        reason: e.to_string(),
                                    }),
                                ))
                            }
                        }
                    }
                }
            }
        })
        .flat_map(stream::iter)
    }

    /// Run one catalog call, retrying transient failures with exponential
    /// backoff up to the configured attempt budget.
    async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T, CatalogError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let mut attempt = 0usize;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    let backoff = self.options.base_backoff * 2u32.saturating_pow(attempt as u32);
                    warn!(
                        "transient catalog failure (attempt {}/{}), backing off {:?}: {}",
                        attempt + 1,
                        self.options.max_retries,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {pos} tables enumerated {msg}")
            .unwrap(),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::MockCatalog;

    fn fast_options() -> DiscoveryOptions {
        DiscoveryOptions {
            base_backoff: Duration::from_millis(1),
            ..DiscoveryOptions::default()
        }
    }

    async fn collect_events(catalog: &MockCatalog, options: DiscoveryOptions) -> Vec<DiscoveryEvent> {
        Discovery::new(catalog, options).run().collect().await
    }

    fn count_kinds(events: &[DiscoveryEvent]) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for event in events {
            match event {
                DiscoveryEvent::Database(_) => counts.0 += 1,
                DiscoveryEvent::Table { .. } => counts.1 += 1,
                DiscoveryEvent::ItemFailed(_) => counts.2 += 1,
                DiscoveryEvent::Aborted { .. } => counts.3 += 1,
            }
        }
        counts
    }

    #[tokio::test]
    async fn test_pagination_is_exhaustive() {
        let catalog = MockCatalog::new(2, 3)
            .with_database("a", 7)
            .with_database("b", 1)
            .with_database("c", 0)
            .with_database("d", 4)
            .with_database("e", 5);

        let events = collect_events(&catalog, fast_options()).await;
        let (dbs, tables, failed, aborted) = count_kinds(&events);

        assert_eq!(dbs, 5);
        assert_eq!(tables, 17);
        assert_eq!(failed, 0);
        assert_eq!(aborted, 0);
    }

    #[tokio::test]
    async fn test_denied_database_degrades_without_stopping_run() {
        let mut catalog = MockCatalog::new(10, 10)
            .with_database("locked", 5)
            .with_database("open", 3);
        catalog.deny.insert("locked".to_string());

        let events = collect_events(&catalog, fast_options()).await;
        let (dbs, tables, failed, aborted) = count_kinds(&events);

        assert_eq!(dbs, 2);
        assert_eq!(tables, 3);
        assert_eq!(failed, 1);
        assert_eq!(aborted, 0);

        let failure = events
            .iter()
            .find_map(|e| match e {
                DiscoveryEvent::ItemFailed(f) => Some(f),
                _ => None,
            })
            .unwrap();
        assert_eq!(failure.database, "locked");
        assert!(failure.reason.contains("access denied"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttling_is_retried_until_success() {
        let catalog = MockCatalog::new(10, 10).with_database("busy", 2);
        catalog
            .throttle
            .lock()
            .unwrap()
            .insert("busy".to_string(), 2);

        let events = collect_events(&catalog, fast_options()).await;
        let (_, tables, failed, _) = count_kinds(&events);

        assert_eq!(tables, 2);
        assert_eq!(failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_degrades_item() {
        let catalog = MockCatalog::new(10, 10).with_database("hammered", 2);
        catalog
            .throttle
            .lock()
            .unwrap()
            .insert("hammered".to_string(), 50);

        let options = DiscoveryOptions {
            max_retries: 2,
            ..fast_options()
        };
        let events = collect_events(&catalog, options).await;
        let (_, tables, failed, aborted) = count_kinds(&events);

        assert_eq!(tables, 0);
        assert_eq!(failed, 1);
        assert_eq!(aborted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_network_failure_aborts_discovery() {
        let mut catalog = MockCatalog::new(10, 10)
            .with_database("fine", 2)
            .with_database("dark", 2);
        catalog.network_fail.insert("dark".to_string());

        let options = DiscoveryOptions {
            max_retries: 1,
            concurrency: 1,
            ..fast_options()
        };
        let events = collect_events(&catalog, options).await;
        let (dbs, _, _, aborted) = count_kinds(&events);

        assert_eq!(dbs, 2);
        assert_eq!(aborted, 1);
    }
}
