use serde::{Deserialize, Serialize};

use crate::domain::{ChartType, Row, SortOrder};

/// A single transformation step for the data-processing service.
///
/// Serialized as `{"type": ..., "params": {...}}`; `apply_sorting` issues
/// exactly one `Sort` per call. `Filter` exists for protocol symmetry and is
/// not issued by the interaction controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum Operation {
    Sort {
        column: String,
        order: SortOrder,
    },
    Filter {
        column: String,
        value: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub data: Vec<Row>,
}

/// Render-side chart configuration built from the controller state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartConfig {
    pub chart_type: ChartType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_column: Option<String>,
}
