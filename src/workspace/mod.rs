// src/workspace/mod.rs
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::chart::{build_chart_data, ChartConfig, ChartData, ChartState, ConfigField};
use crate::config::Settings;
use crate::error::{ConfigFieldError, TableError};
use crate::parse::{parse_bytes, ParseOptions, RawInput};
use crate::table::{normalize, Column, Row, Snapshot};

/// What table consumers see. `snapshot` is `None` while processing, after a failure, and
/// before the first upload.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub snapshot: Option<Arc<Snapshot>>,
    pub processing: bool,
    pub error: Option<String>,
}

impl TableView {
    pub fn columns(&self) -> &[Column] {
        match &self.snapshot {
            Some(snap) => &snap.columns,
            None => &[],
        }
    }

    pub fn rows(&self) -> &[Arc<Row>] {
        match &self.snapshot {
            Some(snap) => &snap.rows,
            None => &[],
        }
    }
}

/// Work handed to the blocking pool for one upload.
enum Job {
    Raw(RawInput),
    Bytes(Vec<u8>),
    Failed(TableError),
}

impl Job {
    fn run(self, options: &ParseOptions) -> Result<Snapshot, TableError> {
        match self {
            Job::Raw(raw) => normalize(&raw),
            Job::Bytes(bytes) => normalize(&parse_bytes(&bytes, options)?),
            Job::Failed(err) => Err(err),
        }
    }
}

struct State {
    /// Bumped on every accepted input; a finishing job only publishes if it still matches.
    generation: u64,
    pending: Option<JoinHandle<()>>,
    snapshot: Option<Arc<Snapshot>>,
    processing: bool,
    error: Option<String>,
    chart: ChartState,
}

struct Inner {
    settings: Settings,
    state: Mutex<State>,
    table_tx: watch::Sender<TableView>,
    chart_tx: watch::Sender<Option<ChartConfig>>,
}

/// Owner of the table snapshot and chart configuration.
///
/// Cloning gives another handle to the same state. The only mutations are
/// [`process_raw_input`](Self::process_raw_input) (and its byte/file variants),
/// [`update_cell`](Self::update_cell) and [`set_config_field`](Self::set_config_field);
/// everything else is read-only through the watch receivers. Input methods spawn onto the
/// current Tokio runtime.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<Inner>,
}

impl Workspace {
    pub fn new(settings: Settings) -> Self {
        let (table_tx, _) = watch::channel(TableView::default());
        let (chart_tx, _) = watch::channel(None);
        let chart = ChartState::new(settings.chart.clone());
        Self {
            inner: Arc::new(Inner {
                settings,
                state: Mutex::new(State {
                    generation: 0,
                    pending: None,
                    snapshot: None,
                    processing: false,
                    error: None,
                    chart,
                }),
                table_tx,
                chart_tx,
            }),
        }
    }

    // ─── input ──────────────────────────────────────────────────────

    /// Accept already-parsed rows. The previous snapshot is cleared immediately and the new
    /// one is published once normalization finishes, unless newer input arrives first.
    pub fn process_raw_input(&self, raw: RawInput) {
        self.schedule(Job::Raw(raw));
    }

    /// Accept delimited text; parsing runs inside the scheduled job.
    pub fn process_bytes(&self, bytes: Vec<u8>) {
        self.schedule(Job::Bytes(bytes));
    }

    /// Read `path` and accept its contents. A read failure is reported like a parse failure.
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                info!(path = %path.display(), bytes = bytes.len(), "loaded file");
                self.process_bytes(bytes);
            }
            Err(source) => self.schedule(Job::Failed(TableError::Read {
                path: path.to_path_buf(),
                source,
            })),
        }
    }

    /// Re-coerce one cell from the grid. Returns false, changing nothing, when the row or
    /// column is unknown. Chart configuration is left alone.
    pub fn update_cell(&self, row_id: &str, key: &str, raw: &str) -> bool {
        let mut st = self.lock();
        let Some(next) = st
            .snapshot
            .as_ref()
            .and_then(|snap| snap.with_cell(row_id, key, raw))
        else {
            return false;
        };
        st.snapshot = Some(Arc::new(next));
        self.publish_table(&st);
        true
    }

    /// Merge one field into the chart configuration and republish it.
    ///
    /// An `xAxis` naming a column the current snapshot does not have is refused and the
    /// configuration is left as it was. `Ok(false)` means no configuration exists yet.
    pub fn set_config_field(&self, field: ConfigField) -> Result<bool, ConfigFieldError> {
        let mut st = self.lock();
        check_field(st.snapshot.as_deref(), &field)?;
        if !st.chart.apply(field) {
            debug!("config override ignored; no chart configuration yet");
            return Ok(false);
        }
        self.publish_chart(&st);
        Ok(true)
    }

    /// Validate an override against the current columns without applying it.
    pub fn check_config_field(&self, field: &ConfigField) -> Result<(), ConfigFieldError> {
        check_field(self.lock().snapshot.as_deref(), field)
    }

    // ─── read side ──────────────────────────────────────────────────

    pub fn subscribe_table(&self) -> watch::Receiver<TableView> {
        self.inner.table_tx.subscribe()
    }

    pub fn subscribe_chart(&self) -> watch::Receiver<Option<ChartConfig>> {
        self.inner.chart_tx.subscribe()
    }

    pub fn table(&self) -> TableView {
        self.inner.table_tx.borrow().clone()
    }

    pub fn chart_config(&self) -> Option<ChartConfig> {
        self.inner.chart_tx.borrow().clone()
    }

    /// Column list offered to the config panel as axis choices.
    pub fn columns(&self) -> Vec<Column> {
        self.table().columns().to_vec()
    }

    /// What the chart renderer should draw right now; `None` means the placeholder.
    pub fn chart_data(&self) -> Option<ChartData> {
        let view = self.table();
        if view.processing {
            return None;
        }
        let config = self.chart_config()?;
        build_chart_data(view.rows(), &config)
    }

    /// Resolve once no normalization is in flight.
    pub async fn wait_until_idle(&self) -> TableView {
        let mut rx = self.subscribe_table();
        let idle = match rx.wait_for(|view| !view.processing).await {
            Ok(view) => Some(view.clone()),
            Err(_) => None,
        };
        idle.unwrap_or_else(|| self.table())
    }

    // ─── internals ──────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule(&self, job: Job) {
        let mut st = self.lock();
        st.generation += 1;
        let generation = st.generation;
        if let Some(prev) = st.pending.take() {
            prev.abort();
            debug!(generation, "cancelled superseded normalization");
        }

        st.snapshot = None;
        st.error = None;
        st.processing = true;
        st.chart.clear();
        self.publish_table(&st);
        self.publish_chart(&st);

        let this = self.clone();
        let delay = self.inner.settings.debounce();
        let options = self.inner.settings.parse_options();
        st.pending = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = tokio::task::spawn_blocking(move || job.run(&options))
                .await
                .unwrap_or_else(|e| Err(TableError::Aborted(e.to_string())));
            this.complete(generation, outcome);
        }));
    }

    fn complete(&self, generation: u64, outcome: Result<Snapshot, TableError>) {
        let mut st = self.lock();
        if st.generation != generation {
            debug!(
                generation,
                current = st.generation,
                "discarding result of superseded normalization"
            );
            return;
        }

        st.pending = None;
        st.processing = false;
        match outcome {
            Ok(snapshot) => {
                info!(
                    generation,
                    columns = snapshot.columns.len(),
                    rows = snapshot.rows.len(),
                    "published snapshot"
                );
                st.chart.on_snapshot(&snapshot);
                st.snapshot = Some(Arc::new(snapshot));
            }
            Err(err) => {
                warn!(generation, error = %err, "normalization failed; snapshot cleared");
                st.snapshot = None;
                st.chart.clear();
                st.error = Some(err.to_string());
            }
        }
        self.publish_table(&st);
        self.publish_chart(&st);
    }

    fn publish_table(&self, st: &State) {
        self.inner.table_tx.send_replace(TableView {
            snapshot: st.snapshot.clone(),
            processing: st.processing,
            error: st.error.clone(),
        });
    }

    fn publish_chart(&self, st: &State) {
        self.inner.chart_tx.send_replace(st.chart.current().cloned());
    }
}

/// Axis choices are restricted to the snapshot's columns.
fn check_field(snapshot: Option<&Snapshot>, field: &ConfigField) -> Result<(), ConfigFieldError> {
    match (field, snapshot) {
        (ConfigField::XAxis(key), Some(snap)) if snap.column(key).is_none() => {
            Err(ConfigFieldError::UnknownColumn {
                field: "xAxis",
                key: key.clone(),
                choices: snap.columns.iter().map(|c| c.accessor_key.clone()).collect(),
            })
        }
        _ => Ok(()),
    }
}
