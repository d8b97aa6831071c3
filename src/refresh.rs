//! # Refresh
//!
//! Reloads every tracked sheet from the configured source and publishes the fresh
//! tables into the [`TableStore`]. The same [`Refresher::refresh`] backs the `/reload`
//! command and the [`PeriodicRefresh`] task.
use crate::error::BotError;
use crate::loader::TableLoader;
use crate::table::TableStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

/// A worksheet kept in the store, with the column the loader normalizes to trimmed text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedSheet {
    pub name: String,
    pub key_column: String,
}

impl TrackedSheet {
    pub fn new(name: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_column: key_column.into(),
        }
    }
}

/// Rows loaded per tracked sheet by one refresh, in tracking order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub sheets: Vec<(String, usize)>,
}

impl RefreshReport {
    /// A refresh succeeds only when every tracked sheet came back with rows.
    pub fn is_success(&self) -> bool {
        !self.sheets.is_empty() && self.sheets.iter().all(|(_, rows)| *rows > 0)
    }

    /// Names of the sheets that loaded no rows.
    pub fn empty_sheets(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .filter(|(_, rows)| *rows == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Loads all tracked sheets together and swaps them into the store.
pub struct Refresher {
    loader: Arc<dyn TableLoader>,
    store: Arc<TableStore>,
    location: String,
    sheets: Vec<TrackedSheet>,
}

impl Refresher {
    pub fn new(loader: Arc<dyn TableLoader>, store: Arc<TableStore>, location: impl Into<String>, sheets: Vec<TrackedSheet>) -> Self {
        Self {
            loader,
            store,
            location: location.into(),
            sheets,
        }
    }

    pub fn store(&self) -> &Arc<TableStore> {
        &self.store
    }

    /// Loads every tracked sheet and publishes each result, empty tables included.
    ///
    /// Blocks on I/O; from async code use [`Refresher::refresh_in_background`].
    pub fn refresh(&self) -> RefreshReport {
        let mut report = RefreshReport::default();
        for sheet in &self.sheets {
            let table = self.loader.load(&self.location, &sheet.name, &sheet.key_column);
            report.sheets.push((sheet.name.clone(), table.len()));
            self.store.publish(&sheet.name, table);
        }
        if report.is_success() {
            log::info!("Refresh finished: {:?}", report.sheets);
        } else {
            log::warn!("Refresh left sheets empty: {:?}", report.empty_sheets());
        }
        report
    }

    /// Runs [`Refresher::refresh`] on tokio's blocking pool.
    pub async fn refresh_in_background(self: Arc<Self>) -> Result<RefreshReport, BotError> {
        Ok(tokio::task::spawn_blocking(move || self.refresh()).await?)
    }
}

/// Timer task re-running the refresh at a fixed period until stopped.
pub struct PeriodicRefresh {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl PeriodicRefresh {
    /// Starts ticking one `period` from now; the initial load is the caller's job.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(refresher: Arc<Refresher>, period: Duration) -> Self {
        let (shutdown, mut stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        log::debug!("Timed refresh started");
                        if let Err(e) = refresher.clone().refresh_in_background().await {
                            log::error!("Timed refresh aborted: {}", e);
                        }
                    }
                }
            }
            log::info!("Timed refresh stopped");
        });
        Self { shutdown, handle }
    }

    /// Signals the task to stop and waits for it; an in-flight refresh completes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            log::error!("Timed refresh task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use crate::table::Value;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Serves canned tables and counts calls.
    #[derive(Default)]
    struct FakeLoader {
        tables: Mutex<HashMap<String, Table>>,
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeLoader {
        fn set(&self, sheet: &str, rows: usize) {
            let rows = (0..rows).map(|i| vec![Value::from(i.to_string())]).collect();
            let table = Table::with_rows(vec!["key".to_owned()], rows);
            self.tables.lock().insert(sheet.to_owned(), table);
        }

        fn calls(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl TableLoader for FakeLoader {
        fn load(&self, location: &str, sheet: &str, key_column: &str) -> Table {
            self.calls.lock().push((location.to_owned(), sheet.to_owned(), key_column.to_owned()));
            self.tables.lock().get(sheet).cloned().unwrap_or_default()
        }
    }

    fn refresher(loader: Arc<FakeLoader>) -> Arc<Refresher> {
        Arc::new(Refresher::new(
            loader,
            Arc::new(TableStore::new()),
            "data.xlsx",
            vec![TrackedSheet::new("main", "key"), TrackedSheet::new("report", "supplier")],
        ))
    }

    #[test]
    fn refresh_publishes_every_tracked_sheet() {
        let loader = Arc::new(FakeLoader::default());
        loader.set("main", 3);
        loader.set("report", 2);
        let refresher = refresher(loader.clone());

        let report = refresher.refresh();
        assert!(report.is_success());
        assert_eq!(report.sheets, vec![("main".to_owned(), 3), ("report".to_owned(), 2)]);
        assert_eq!(refresher.store().get("main").len(), 3);
        assert_eq!(refresher.store().get("report").len(), 2);

        let calls = loader.calls.lock().clone();
        assert_eq!(calls[0], ("data.xlsx".to_owned(), "main".to_owned(), "key".to_owned()));
        assert_eq!(calls[1], ("data.xlsx".to_owned(), "report".to_owned(), "supplier".to_owned()));
    }

    #[test]
    fn empty_sheet_fails_refresh_and_replaces_old_table() {
        let loader = Arc::new(FakeLoader::default());
        loader.set("main", 3);
        loader.set("report", 2);
        let refresher = refresher(loader.clone());
        refresher.refresh();

        loader.set("report", 0);
        let report = refresher.refresh();
        assert!(!report.is_success());
        assert_eq!(report.empty_sheets(), vec!["report"]);
        assert!(refresher.store().get("report").is_empty());
        assert_eq!(refresher.store().get("main").len(), 3);
    }

    #[test]
    fn report_without_sheets_is_not_success() {
        assert!(!RefreshReport::default().is_success());
    }

    #[tokio::test]
    async fn refresh_runs_on_blocking_pool() {
        let loader = Arc::new(FakeLoader::default());
        loader.set("main", 1);
        loader.set("report", 1);
        let report = refresher(loader).refresh_in_background().await.unwrap();
        assert!(report.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_refresh_ticks_until_stopped() {
        let loader = Arc::new(FakeLoader::default());
        let periodic = PeriodicRefresh::start(refresher(loader.clone()), Duration::from_secs(60));

        // Nothing happens before the first period elapses
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(loader.calls(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        wait_for_calls(&loader, 2).await;

        periodic.stop().await;
        let after_stop = loader.calls();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(loader.calls(), after_stop);
    }

    async fn wait_for_calls(loader: &FakeLoader, expected: usize) {
        for _ in 0..100 {
            if loader.calls() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} loader calls, saw {}", expected, loader.calls());
    }
}
