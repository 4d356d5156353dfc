use axum::{
    extract::{rejection::FormRejection, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, INVALID_INPUT};
use super::AppState;
use crate::error::parse_measurement;
use crate::estimator;
use crate::models::*;
use crate::report::{self, Report};
use crate::storage::{self, allowed_file};

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Single tree
// ============================================================

/// Form fields as submitted; parsed server-side so bad input gets a
/// friendly message instead of an extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculateForm {
    #[serde(default)]
    pub circumference: String,
    #[serde(default)]
    pub height: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub circumference: f64,
    pub height: f64,
    pub breakdown: CarbonBreakdown,
}

pub async fn calculate(
    form: Result<Form<CalculateForm>, FormRejection>,
) -> Result<Json<CalculationResponse>, ApiError> {
    let Form(form) = form.map_err(|e| {
        tracing::warn!("Rejected calculate body: {}", e);
        ApiError::bad_request(INVALID_INPUT)
    })?;
    let parsed = parse_measurement("circumference", &form.circumference)
        .and_then(|c| parse_measurement("height", &form.height).map(|h| (c, h)));
    let (circumference, height) = parsed.map_err(|e| {
        tracing::warn!("Invalid calculate input: {}", e);
        ApiError::bad_request(INVALID_INPUT)
    })?;

    let breakdown = estimator::estimate(circumference, height)
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    Ok(Json(CalculationResponse {
        circumference,
        height,
        breakdown,
    }))
}

// ============================================================
// Batch upload
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRow {
    /// `Tree number N`, 1-based in upload order.
    pub label: String,
    pub cells: Vec<serde_json::Value>,
    pub breakdown: CarbonBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub total_carbon: f64,
    pub tree_count: usize,
    /// Original columns followed by the derived ones.
    pub columns: Vec<String>,
    pub rows: Vec<UploadRow>,
    pub download_link: String,
    pub chart_link: String,
}

fn cell_json(cell: &Cell) -> serde_json::Value {
    match cell {
        Cell::Empty => serde_json::Value::Null,
        Cell::Number(v) => serde_json::json!(v),
        Cell::Text(s) => serde_json::Value::String(s.clone()),
    }
}

fn download_link(filename: &str) -> String {
    format!("/api/v1/download/{}", filename)
}

impl From<Report> for UploadResponse {
    fn from(report: Report) -> Self {
        let table = &report.result.table;
        let columns = crate::export::report_header(table);
        let rows = table
            .rows
            .iter()
            .map(|row| UploadRow {
                label: row.label(),
                cells: row.cells.iter().map(cell_json).collect(),
                breakdown: row.breakdown,
            })
            .collect();

        Self {
            download_link: download_link(&report.report_filename),
            chart_link: download_link(&report.chart_filename),
            filename: report.filename,
            total_carbon: report.result.summary.total_carbon,
            tree_count: report.result.summary.tree_count,
            columns,
            rows,
        }
    }
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            file = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::bad_request("No file part"))?;
    if filename.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }
    if !allowed_file(&filename) {
        return Err(ApiError::bad_request(format!(
            "File type not allowed, expected one of: {}",
            storage::ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let storage = state.storage.clone();
    let chart = state.config.chart.clone();
    let report = tokio::task::spawn_blocking(move || {
        report::process_upload(&storage, &chart, &filename, bytes.to_vec())
    })
    .await
    .map_err(ApiError::internal)??;

    Ok(Json(report.into()))
}

// ============================================================
// Downloads
// ============================================================

pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let storage = state.storage.clone();
    let name = filename.clone();
    let bytes = tokio::task::spawn_blocking(move || storage.read(&name))
        .await
        .map_err(ApiError::internal)??;

    let headers = [
        (header::CONTENT_TYPE, storage::content_type(&filename).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, bytes))
}
