use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dataset::DatasetStore;
use shared::{
    domain::{ChartType, MarkerId, MarkerPurpose, Row, SlotId, SortOrder},
    protocol::{ChartConfig, Operation, ProcessOutcome},
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

pub mod config;
pub mod debounce;
pub mod routes;
pub mod sector;
pub mod smoothing;

pub use config::InteractionTuning;
pub use debounce::Debouncer;
pub use routes::{MarkerRoutes, RouteConfigError};
pub use sector::{classify_sort_zone, select_sector};
pub use smoothing::{normalize_degrees, RotationSmoother};

/// Display slot the marker-controlled chart renders into.
pub const MARKER_CHART_SLOT: SlotId = SlotId(1);

/// AR tracking seam: current marker orientation, reduced to its yaw.
pub trait MarkerPoseSource: Send + Sync {
    /// Yaw of the marker in radians, `None` while the marker is not visible.
    fn yaw_radians(&self, marker: MarkerId) -> Option<f64>;
}

/// Pose source for controllers constructed before tracking hardware exists;
/// every marker reads as not visible.
pub struct MissingPoseSource;

impl MarkerPoseSource for MissingPoseSource {
    fn yaw_radians(&self, _marker: MarkerId) -> Option<f64> {
        None
    }
}

/// External column registry for the active dataset. May be empty before any
/// dataset is loaded; the controller then falls back to inspecting the chart
/// surface's current rows.
pub trait ColumnRegistry: Send + Sync {
    fn available_columns(&self) -> Vec<String>;
}

pub struct MissingColumnRegistry;

impl ColumnRegistry for MissingColumnRegistry {
    fn available_columns(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Chart/render collaborator seam.
#[async_trait]
pub trait ChartSurface: Send + Sync {
    /// Rows currently backing the rendered chart; used as the fallback for
    /// column discovery.
    async fn current_data(&self) -> Vec<Row>;
    async fn update_marker_chart(&self, slot: SlotId, config: ChartConfig) -> Result<()>;
    async fn load_custom_data(&self, rows: Vec<Row>, label: &str) -> Result<()>;
    async fn set_sort_config(&self, column: &str, order: SortOrder) -> Result<()>;
}

/// Render-less chart surface: accepts every call and draws nothing.
pub struct NullChartSurface;

#[async_trait]
impl ChartSurface for NullChartSurface {
    async fn current_data(&self) -> Vec<Row> {
        Vec::new()
    }

    async fn update_marker_chart(&self, _slot: SlotId, _config: ChartConfig) -> Result<()> {
        Ok(())
    }

    async fn load_custom_data(&self, _rows: Vec<Row>, _label: &str) -> Result<()> {
        Ok(())
    }

    async fn set_sort_config(&self, _column: &str, _order: SortOrder) -> Result<()> {
        Ok(())
    }
}

/// Backend data-processing seam. `apply_sorting` issues exactly one
/// `Operation::Sort` per call.
#[async_trait]
pub trait DataProcessor: Send + Sync {
    async fn process(&self, rows: Vec<Row>, operations: Vec<Operation>)
        -> Result<ProcessOutcome>;
}

pub struct MissingDataProcessor;

#[async_trait]
impl DataProcessor for MissingDataProcessor {
    async fn process(
        &self,
        _rows: Vec<Row>,
        _operations: Vec<Operation>,
    ) -> Result<ProcessOutcome> {
        Err(anyhow!("data-processing backend is unavailable"))
    }
}

#[async_trait]
impl DataProcessor for processing::LocalDataProcessor {
    async fn process(
        &self,
        rows: Vec<Row>,
        operations: Vec<Operation>,
    ) -> Result<ProcessOutcome> {
        let data = self.apply(rows, &operations)?;
        Ok(ProcessOutcome { data })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub available_columns: Vec<String>,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    pub sort_column: Option<String>,
    pub sort_order: SortOrder,
    pub chart_type: ChartType,
    pub filter_column: Option<String>,
    pub filter_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub enum InteractionEvent {
    StateChanged(StateSnapshot),
    DataSorted {
        column: String,
        order: SortOrder,
        row_count: usize,
    },
}

#[derive(Debug, Error)]
pub enum SortApplyError {
    #[error("sort backend rejected the request: {0}")]
    Backend(String),
    #[error("chart surface failed to apply sorted rows: {0}")]
    ChartLoad(String),
}

struct ControllerState {
    available_columns: Vec<String>,
    x_column: Option<String>,
    y_column: Option<String>,
    sort_column: Option<String>,
    sort_order: SortOrder,
    chart_type: ChartType,
    filter_column: Option<String>,
    filter_value: Option<serde_json::Value>,
}

impl ControllerState {
    fn seeded(available_columns: Vec<String>) -> Self {
        Self {
            x_column: available_columns.first().cloned(),
            y_column: available_columns.get(1).cloned(),
            sort_column: available_columns.first().cloned(),
            sort_order: SortOrder::default(),
            chart_type: ChartType::default(),
            filter_column: None,
            filter_value: None,
            available_columns,
        }
    }

    /// Re-seed any selection that fell out of the column set, preserving
    /// selections that are still valid.
    fn revalidate_selections(&mut self) {
        let columns = &self.available_columns;
        let still_valid =
            |selection: &Option<String>| matches!(selection, Some(name) if columns.contains(name));

        if !still_valid(&self.x_column) {
            self.x_column = columns.first().cloned();
        }
        if !still_valid(&self.y_column) {
            self.y_column = columns.get(1).cloned();
        }
        if !still_valid(&self.sort_column) {
            self.sort_column = columns.first().cloned();
        }
        if !still_valid(&self.filter_column) {
            self.filter_column = None;
            self.filter_value = None;
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            available_columns: self.available_columns.clone(),
            x_column: self.x_column.clone(),
            y_column: self.y_column.clone(),
            sort_column: self.sort_column.clone(),
            sort_order: self.sort_order,
            chart_type: self.chart_type,
            filter_column: self.filter_column.clone(),
            filter_value: self.filter_value.clone(),
        }
    }
}

struct TrackingSession {
    poll_task: JoinHandle<()>,
}

/// Which column selection a sector handler writes.
#[derive(Debug, Clone, Copy)]
enum ColumnTarget {
    XAxis,
    YAxis,
    Sort,
}

/// Converts continuous, noisy marker rotation into discrete visualization
/// configuration changes, debouncing the resulting render and backend work.
///
/// One polling session runs per tracked marker; each marker id steers a
/// disjoint state field (enforced by [`MarkerRoutes`]). Stopping tracking
/// does not cancel backend calls already in flight from a debounced sort.
pub struct MarkerInteractionController {
    pose_source: Arc<dyn MarkerPoseSource>,
    registry: Arc<dyn ColumnRegistry>,
    chart: Arc<dyn ChartSurface>,
    processor: Arc<dyn DataProcessor>,
    dataset: Arc<DatasetStore>,
    routes: MarkerRoutes,
    tuning: InteractionTuning,
    inner: Mutex<ControllerState>,
    sessions: Mutex<HashMap<MarkerId, TrackingSession>>,
    chart_refresh: Debouncer,
    sort_apply: Debouncer,
    filter_apply: Debouncer,
    events: broadcast::Sender<InteractionEvent>,
    dataset_listener: Mutex<Option<JoinHandle<()>>>,
}

impl MarkerInteractionController {
    /// Minimal constructor: chart surface and dataset store only, with no
    /// tracking hardware, registry, or backend attached.
    pub async fn new(chart: Arc<dyn ChartSurface>, store: Arc<DatasetStore>) -> Arc<Self> {
        Self::new_with_dependencies(
            Arc::new(MissingPoseSource),
            Arc::new(MissingColumnRegistry),
            chart,
            Arc::new(MissingDataProcessor),
            store,
            MarkerRoutes::default(),
            InteractionTuning::default(),
        )
        .await
    }

    pub async fn new_with_dependencies(
        pose_source: Arc<dyn MarkerPoseSource>,
        registry: Arc<dyn ColumnRegistry>,
        chart: Arc<dyn ChartSurface>,
        processor: Arc<dyn DataProcessor>,
        dataset: Arc<DatasetStore>,
        routes: MarkerRoutes,
        tuning: InteractionTuning,
    ) -> Arc<Self> {
        let columns = discover_columns(registry.as_ref(), chart.as_ref()).await;
        info!(
            column_count = columns.len(),
            "marker: controller initialized"
        );
        let (events, _) = broadcast::channel(256);
        let debounce = tuning.debounce();
        let controller = Arc::new(Self {
            pose_source,
            registry,
            chart,
            processor,
            dataset,
            routes,
            tuning,
            inner: Mutex::new(ControllerState::seeded(columns)),
            sessions: Mutex::new(HashMap::new()),
            chart_refresh: Debouncer::new(debounce),
            sort_apply: Debouncer::new(debounce),
            filter_apply: Debouncer::new(debounce),
            events,
            dataset_listener: Mutex::new(None),
        });
        controller.spawn_dataset_listener().await;
        controller
    }

    async fn spawn_dataset_listener(self: &Arc<Self>) {
        let mut changes = self.dataset.subscribe();
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(_) => controller.refresh_available_columns().await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "marker: dataset change stream lagged");
                        controller.refresh_available_columns().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *self.dataset_listener.lock().await = Some(task);
    }

    /// Recompute the column set and re-seed selections that are no longer
    /// valid. Publishes a state-change event unconditionally.
    pub async fn refresh_available_columns(&self) {
        let columns = discover_columns(self.registry.as_ref(), self.chart.as_ref()).await;
        let snapshot = {
            let mut state = self.inner.lock().await;
            state.available_columns = columns;
            state.revalidate_selections();
            state.snapshot()
        };
        debug!(
            column_count = snapshot.available_columns.len(),
            "marker: refreshed available columns"
        );
        let _ = self.events.send(InteractionEvent::StateChanged(snapshot));
    }

    pub async fn state_snapshot(&self) -> StateSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<InteractionEvent> {
        self.events.subscribe()
    }

    /// Begin a polling session for `marker`. An existing session for the
    /// same marker is cancelled first, so no duplicate timers can run.
    pub async fn start_tracking_rotation(self: &Arc<Self>, marker: MarkerId) {
        let mut sessions = self.sessions.lock().await;
        if let Some(previous) = sessions.remove(&marker) {
            previous.poll_task.abort();
            debug!(marker = marker.0, "marker: replaced tracking session");
        }

        let controller = Arc::clone(self);
        let poll_interval = self.tuning.poll_interval();
        let window = self.tuning.smoothing_window;
        let poll_task = tokio::spawn(async move {
            let mut smoother = RotationSmoother::new(window);
            let mut ticks = interval(poll_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let Some(yaw) = controller.pose_source.yaw_radians(marker) else {
                    continue;
                };
                let degrees = normalize_degrees(yaw.to_degrees());
                let smoothed = smoother.add_reading(degrees);
                controller.handle_marker_rotation(marker, smoothed).await;
            }
        });
        sessions.insert(marker, TrackingSession { poll_task });
        info!(marker = marker.0, "marker: tracking rotation");
    }

    /// Cancel the polling session for `marker`, discarding its smoothing
    /// state. Idempotent. Backend calls already in flight are not cancelled.
    pub async fn stop_tracking_rotation(&self, marker: MarkerId) {
        if let Some(session) = self.sessions.lock().await.remove(&marker) {
            session.poll_task.abort();
            info!(marker = marker.0, "marker: stopped tracking rotation");
        }
    }

    pub async fn stop_all_tracking(&self) {
        let mut sessions = self.sessions.lock().await;
        for (marker, session) in sessions.drain() {
            session.poll_task.abort();
            debug!(marker = marker.0, "marker: stopped tracking rotation");
        }
    }

    /// Tear down polling sessions, the dataset listener, and any debounced
    /// work still waiting out its delay.
    pub async fn shutdown(&self) {
        self.stop_all_tracking().await;
        if let Some(task) = self.dataset_listener.lock().await.take() {
            task.abort();
        }
        self.chart_refresh.cancel().await;
        self.sort_apply.cancel().await;
        self.filter_apply.cancel().await;
    }

    /// Route a smoothed rotation reading to the handler for whatever this
    /// marker controls. Unknown markers only warn; routing never fails.
    pub async fn handle_marker_rotation(self: &Arc<Self>, marker: MarkerId, degrees: f64) {
        match self.routes.purpose_for(marker) {
            Some(MarkerPurpose::XAxis) => {
                self.handle_column_rotation(ColumnTarget::XAxis, degrees)
                    .await
            }
            Some(MarkerPurpose::YAxis) => {
                self.handle_column_rotation(ColumnTarget::YAxis, degrees)
                    .await
            }
            Some(MarkerPurpose::SortColumn) => {
                self.handle_column_rotation(ColumnTarget::Sort, degrees)
                    .await
            }
            Some(MarkerPurpose::SortOrder) => self.handle_sort_order_rotation(degrees).await,
            Some(MarkerPurpose::FilterCategory) => {
                self.handle_filter_category_rotation(degrees).await
            }
            Some(MarkerPurpose::ChartType) => self.handle_chart_type_rotation(degrees).await,
            Some(MarkerPurpose::Reserved) => {
                debug!(marker = marker.0, degrees, "marker: reserved marker rotated");
            }
            None => {
                warn!(marker = marker.0, "marker: rotation from unhandled marker id");
            }
        }
    }

    /// Shared sector handler for the x-axis, y-axis, and sort-column markers.
    async fn handle_column_rotation(self: &Arc<Self>, target: ColumnTarget, degrees: f64) {
        let changed = {
            let mut state = self.inner.lock().await;
            let columns = state.available_columns.clone();
            let selected = match target {
                ColumnTarget::XAxis => state.x_column.as_deref(),
                ColumnTarget::YAxis => state.y_column.as_deref(),
                ColumnTarget::Sort => state.sort_column.as_deref(),
            };
            let current = column_index(&columns, selected);
            match select_sector(
                degrees,
                columns.len(),
                current,
                self.tuning.hysteresis_degrees,
            ) {
                Some(index) => {
                    let column = columns[index].clone();
                    info!(?target, column = %column, "marker: column selection changed");
                    match target {
                        ColumnTarget::XAxis => state.x_column = Some(column),
                        ColumnTarget::YAxis => state.y_column = Some(column),
                        ColumnTarget::Sort => state.sort_column = Some(column),
                    }
                    Some(state.snapshot())
                }
                None => None,
            }
        };

        if let Some(snapshot) = changed {
            let _ = self.events.send(InteractionEvent::StateChanged(snapshot));
            match target {
                ColumnTarget::XAxis | ColumnTarget::YAxis => self.schedule_chart_refresh().await,
                ColumnTarget::Sort => self.schedule_sort_apply().await,
            }
        }
    }

    async fn handle_sort_order_rotation(self: &Arc<Self>, degrees: f64) {
        let changed = {
            let mut state = self.inner.lock().await;
            match classify_sort_zone(degrees, self.tuning.sort_deadband_degrees) {
                Some(order) if order != state.sort_order => {
                    info!(order = order.as_str(), "marker: sort order changed");
                    state.sort_order = order;
                    Some(state.snapshot())
                }
                _ => None,
            }
        };

        if let Some(snapshot) = changed {
            let _ = self.events.send(InteractionEvent::StateChanged(snapshot));
            self.schedule_sort_apply().await;
        }
    }

    async fn handle_chart_type_rotation(self: &Arc<Self>, degrees: f64) {
        let changed = {
            let mut state = self.inner.lock().await;
            let current = ChartType::ALL
                .iter()
                .position(|kind| *kind == state.chart_type)
                .unwrap_or(0);
            match select_sector(
                degrees,
                ChartType::ALL.len(),
                current,
                self.tuning.hysteresis_degrees,
            ) {
                Some(index) => {
                    let kind = ChartType::ALL[index];
                    info!(chart_type = kind.as_str(), "marker: chart type changed");
                    state.chart_type = kind;
                    Some(state.snapshot())
                }
                None => None,
            }
        };

        if let Some(snapshot) = changed {
            let _ = self.events.send(InteractionEvent::StateChanged(snapshot));
            self.schedule_chart_refresh().await;
        }
    }

    /// Sector-select among the distinct values of the current filter column.
    /// No-op until a filter column has been chosen.
    async fn handle_filter_category_rotation(self: &Arc<Self>, degrees: f64) {
        let column = { self.inner.lock().await.filter_column.clone() };
        let Some(column) = column else {
            return;
        };
        let values = distinct_column_values(&self.dataset.baseline().await, &column);
        if values.len() < 2 {
            return;
        }

        let changed = {
            let mut state = self.inner.lock().await;
            let current = state
                .filter_value
                .as_ref()
                .and_then(|value| values.iter().position(|candidate| candidate == value))
                .unwrap_or(0);
            match select_sector(
                degrees,
                values.len(),
                current,
                self.tuning.hysteresis_degrees,
            ) {
                Some(index) => {
                    info!(column = %column, "marker: filter category changed");
                    state.filter_value = Some(values[index].clone());
                    Some(state.snapshot())
                }
                None => None,
            }
        };

        if let Some(snapshot) = changed {
            let _ = self.events.send(InteractionEvent::StateChanged(snapshot));
            self.schedule_filter_apply().await;
        }
    }

    /// Choose the column whose distinct values the filter-category marker
    /// cycles through. `None` clears the filter.
    pub async fn set_filter_column(&self, column: Option<String>) -> Result<()> {
        let snapshot = {
            let mut state = self.inner.lock().await;
            if let Some(name) = &column {
                if !state.available_columns.contains(name) {
                    return Err(anyhow!("unknown filter column: {name}"));
                }
            }
            state.filter_column = column;
            state.filter_value = None;
            state.snapshot()
        };
        let _ = self.events.send(InteractionEvent::StateChanged(snapshot));
        Ok(())
    }

    async fn schedule_chart_refresh(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        self.chart_refresh
            .call(async move {
                if let Err(err) = controller.update_chart().await {
                    warn!("chart: debounced refresh failed: {err:#}");
                }
            })
            .await;
    }

    async fn schedule_sort_apply(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        self.sort_apply
            .call(async move {
                if let Err(err) = controller.apply_sorting().await {
                    warn!("sort: debounced apply failed: {err:#}");
                }
            })
            .await;
    }

    async fn schedule_filter_apply(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        self.filter_apply
            .call(async move {
                if let Err(err) = controller.apply_filter().await {
                    warn!("filter: debounced apply failed: {err:#}");
                }
            })
            .await;
    }

    /// Build a chart configuration from the current state and re-render the
    /// marker chart slot with it.
    pub async fn update_chart(&self) -> Result<()> {
        let config = {
            let state = self.inner.lock().await;
            ChartConfig {
                chart_type: state.chart_type,
                x_column: state.x_column.clone(),
                y_column: state.y_column.clone(),
            }
        };
        debug!(
            chart_type = config.chart_type.as_str(),
            "chart: rendering marker chart"
        );
        self.chart
            .update_marker_chart(MARKER_CHART_SLOT, config)
            .await
    }

    /// Sort the pristine baseline rows through the backend and load the
    /// result into the chart. Nothing is applied to the chart until the
    /// backend confirms success.
    pub async fn apply_sorting(&self) -> Result<()> {
        let (column, order) = {
            let state = self.inner.lock().await;
            match state.sort_column.clone() {
                Some(column) => (column, state.sort_order),
                None => {
                    debug!("sort: no sort column selected, skipping");
                    return Ok(());
                }
            }
        };

        let baseline = self.dataset.baseline().await;
        let operations = vec![Operation::Sort {
            column: column.clone(),
            order,
        }];
        let outcome = self
            .processor
            .process(baseline, operations)
            .await
            .map_err(|err| SortApplyError::Backend(err.to_string()))?;

        let row_count = outcome.data.len();
        let label = format!("{column} ({})", order.as_str());
        self.chart
            .load_custom_data(outcome.data, &label)
            .await
            .map_err(|err| SortApplyError::ChartLoad(err.to_string()))?;
        self.chart
            .set_sort_config(&column, order)
            .await
            .map_err(|err| SortApplyError::ChartLoad(err.to_string()))?;
        self.update_chart().await?;

        info!(
            column = %column,
            order = order.as_str(),
            row_count,
            "sort: applied backend sort"
        );
        let _ = self.events.send(InteractionEvent::DataSorted {
            column,
            order,
            row_count,
        });
        Ok(())
    }

    /// Intentionally unfinished: filtering never shipped in the interaction
    /// pipeline. TODO: mirror `apply_sorting` with a single
    /// `Operation::Filter` once the backend supports it.
    pub async fn apply_filter(&self) -> Result<()> {
        let state = self.inner.lock().await;
        info!(
            column = state.filter_column.as_deref().unwrap_or("<none>"),
            "filter: application not implemented"
        );
        Ok(())
    }
}

async fn discover_columns(registry: &dyn ColumnRegistry, chart: &dyn ChartSurface) -> Vec<String> {
    let columns = registry.available_columns();
    if !columns.is_empty() {
        return columns;
    }
    chart
        .current_data()
        .await
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

fn column_index(columns: &[String], selected: Option<&str>) -> usize {
    selected
        .and_then(|name| columns.iter().position(|column| column == name))
        .unwrap_or(0)
}

/// Distinct values of `column` across `rows`, in first-seen order.
fn distinct_column_values(rows: &[Row], column: &str) -> Vec<serde_json::Value> {
    let mut values = Vec::new();
    for row in rows {
        if let Some(value) = row.get(column) {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
    }
    values
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
