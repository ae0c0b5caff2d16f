use shared::domain::Row;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetEvent {
    /// A new dataset replaced both the working and baseline rows.
    Loaded { row_count: usize },
}

#[derive(Default)]
struct DatasetInner {
    /// Rows currently presented by the render layer, possibly transformed.
    working: Vec<Row>,
    /// Pristine rows as imported. Sort/filter operations always start here
    /// so transformations never compound.
    baseline: Vec<Row>,
}

/// Process-wide dataset store. Injected into consumers rather than looked up
/// ambiently; the interaction controller only ever reads the baseline view.
pub struct DatasetStore {
    inner: RwLock<DatasetInner>,
    events: broadcast::Sender<DatasetEvent>,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: RwLock::new(DatasetInner::default()),
            events,
        }
    }

    /// Replace the dataset. Both views are reset to `rows` and a `Loaded`
    /// event is broadcast to subscribers.
    pub async fn load(&self, rows: Vec<Row>) {
        let row_count = rows.len();
        {
            let mut inner = self.inner.write().await;
            inner.working = rows.clone();
            inner.baseline = rows;
        }
        info!(row_count, "dataset: loaded new dataset");
        let _ = self.events.send(DatasetEvent::Loaded { row_count });
    }

    /// Replace only the working view. Used by the render layer after a
    /// transformation; the baseline stays pristine.
    pub async fn set_working(&self, rows: Vec<Row>) {
        let mut inner = self.inner.write().await;
        inner.working = rows;
    }

    pub async fn working(&self) -> Vec<Row> {
        self.inner.read().await.working.clone()
    }

    pub async fn baseline(&self) -> Vec<Row> {
        self.inner.read().await.baseline.clone()
    }

    /// Column names in first-row key order, empty when no rows are loaded.
    pub async fn column_names(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        inner
            .baseline
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DatasetEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
