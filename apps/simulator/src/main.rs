//! Drives the whole interaction pipeline without AR hardware: a scripted
//! pose source sweeps a marker's yaw while the controller sorts a sample
//! dataset through the in-process backend and "renders" to the console.

use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use dataset::DatasetStore;
use interaction::{
    ChartSurface, ColumnRegistry, InteractionEvent, InteractionTuning,
    MarkerInteractionController, MarkerPoseSource, MarkerRoutes,
};
use processing::LocalDataProcessor;
use serde_json::json;
use shared::{
    domain::{MarkerId, Row, SlotId, SortOrder},
    protocol::ChartConfig,
};
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    /// How long to run the scripted interaction, in seconds.
    #[arg(long, default_value_t = 6)]
    seconds: u64,
    /// Marker to rotate (default table: 1=x, 2=y, 3=sort column,
    /// 4=sort order, 5=filter category, 6=chart type).
    #[arg(long, default_value_t = 3)]
    marker: u32,
    /// Yaw sweep rate in degrees per second.
    #[arg(long, default_value_t = 45.0)]
    degrees_per_second: f64,
    /// Optional TOML file overriding the interaction tuning.
    #[arg(long)]
    tuning: Option<PathBuf>,
}

/// Pose source whose yaw sweeps linearly from zero at a fixed rate.
struct SweepingPose {
    started: Instant,
    degrees_per_second: f64,
}

impl MarkerPoseSource for SweepingPose {
    fn yaw_radians(&self, _marker: MarkerId) -> Option<f64> {
        let degrees = self.started.elapsed().as_secs_f64() * self.degrees_per_second;
        Some(degrees.to_radians())
    }
}

struct SampleRegistry;

impl ColumnRegistry for SampleRegistry {
    fn available_columns(&self) -> Vec<String> {
        ["name", "age", "score", "grade"]
            .map(str::to_string)
            .to_vec()
    }
}

/// Chart surface that renders as log lines.
struct ConsoleChart;

#[async_trait]
impl ChartSurface for ConsoleChart {
    async fn current_data(&self) -> Vec<Row> {
        Vec::new()
    }

    async fn update_marker_chart(&self, slot: SlotId, config: ChartConfig) -> Result<()> {
        info!(
            slot = slot.0,
            chart_type = config.chart_type.as_str(),
            x = config.x_column.as_deref().unwrap_or("<none>"),
            y = config.y_column.as_deref().unwrap_or("<none>"),
            "chart: render"
        );
        Ok(())
    }

    async fn load_custom_data(&self, rows: Vec<Row>, label: &str) -> Result<()> {
        info!(rows = rows.len(), label, "chart: loaded custom dataset");
        Ok(())
    }

    async fn set_sort_config(&self, column: &str, order: SortOrder) -> Result<()> {
        info!(column, order = order.as_str(), "chart: sort indicator set");
        Ok(())
    }
}

fn sample_rows() -> Vec<Row> {
    [
        json!({"name": "ada", "age": 36, "score": 72, "grade": "b"}),
        json!({"name": "grace", "age": 45, "score": 98, "grade": "a"}),
        json!({"name": "alan", "age": 41, "score": 85, "grade": "a"}),
        json!({"name": "edsger", "age": 39, "score": 91, "grade": "a"}),
    ]
    .into_iter()
    .filter_map(|value| match value {
        serde_json::Value::Object(row) => Some(row),
        _ => None,
    })
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => InteractionTuning::from_toml(&std::fs::read_to_string(path)?)?,
        None => InteractionTuning::default(),
    };

    let store = Arc::new(DatasetStore::new());
    store.load(sample_rows()).await;

    let controller = MarkerInteractionController::new_with_dependencies(
        Arc::new(SweepingPose {
            started: Instant::now(),
            degrees_per_second: args.degrees_per_second,
        }),
        Arc::new(SampleRegistry),
        Arc::new(ConsoleChart),
        Arc::new(LocalDataProcessor::new()),
        store,
        MarkerRoutes::default(),
        tuning,
    )
    .await;

    let mut events = controller.subscribe_events();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                InteractionEvent::StateChanged(snapshot) => info!(
                    x = snapshot.x_column.as_deref().unwrap_or("<none>"),
                    y = snapshot.y_column.as_deref().unwrap_or("<none>"),
                    sort = snapshot.sort_column.as_deref().unwrap_or("<none>"),
                    order = snapshot.sort_order.as_str(),
                    chart_type = snapshot.chart_type.as_str(),
                    "event: state changed"
                ),
                InteractionEvent::DataSorted {
                    column,
                    order,
                    row_count,
                } => info!(
                    column,
                    order = order.as_str(),
                    row_count,
                    "event: data sorted"
                ),
            }
        }
    });

    let marker = MarkerId(args.marker);
    controller.start_tracking_rotation(marker).await;
    info!(
        marker = marker.0,
        seconds = args.seconds,
        rate = args.degrees_per_second,
        "simulator: sweeping marker yaw"
    );
    tokio::time::sleep(std::time::Duration::from_secs(args.seconds)).await;

    controller.stop_tracking_rotation(marker).await;
    controller.shutdown().await;
    printer.abort();

    let final_state = controller.state_snapshot().await;
    info!(
        sort = final_state.sort_column.as_deref().unwrap_or("<none>"),
        order = final_state.sort_order.as_str(),
        "simulator: final state"
    );
    Ok(())
}
