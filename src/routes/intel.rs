use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::analysis::intel::{
    analyze_intel, extract_domain_metrics, DomainMetrics, ExportKind, ExportTable, IntelReport,
};
use crate::error::AppError;

/// One uploaded rank-tracker export.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportFile {
    /// Original filename, used in degradation reporting
    pub name: String,
    /// Export kind; auto-detected from the headers when omitted
    #[serde(default)]
    pub report_type: Option<ExportKind>,
    /// Raw CSV content
    pub csv: String,
}

/// Request body for a competitive-intelligence analysis.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IntelRequest {
    /// Your domain, used to pick out your column in the exports
    pub your_domain: String,
    /// Keyword-gap and backlink-gap exports
    #[serde(default)]
    pub files: Vec<ExportFile>,
    /// Free-form report text (e.g. extracted from a PDF) for your domain
    #[serde(default)]
    pub your_report_text: Option<String>,
    /// Free-form report text for the competitor domain
    #[serde(default)]
    pub competitor_report_text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntelResponse {
    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
    /// Domain the exports were interpreted for
    pub your_domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_metrics: Option<DomainMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_metrics: Option<DomainMetrics>,
    /// Action items and scoring derived from the exports
    pub report: IntelReport,
}

/// Analyze rank-tracker exports for competitive gaps
#[utoipa::path(
    post,
    path = "/analyze/competitive-intel",
    request_body = IntelRequest,
    responses(
        (status = 200, description = "Analysis complete", body = IntelResponse),
        (status = 400, description = "Bad Request - missing your_domain")
    )
)]
#[tracing::instrument(skip(request), fields(your_domain = %request.your_domain, files = request.files.len()))]
pub async fn analyze_competitive_intel(
    Json(request): Json<IntelRequest>,
) -> Result<(StatusCode, Json<IntelResponse>), AppError> {
    if request.your_domain.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "your_domain is required to detect export columns".to_string(),
        ));
    }

    // Files are independent; parse them concurrently and merge afterwards.
    let parse_tasks = request.files.into_iter().map(|file| {
        tokio::task::spawn_blocking(move || {
            let name = file.name.clone();
            (name, parse_export_file(file))
        })
    });
    let parsed = join_all(parse_tasks).await;

    let mut tables = Vec::new();
    let mut unreadable = Vec::new();
    for joined in parsed {
        let (name, result) =
            joined.map_err(|e| AppError::InternalError(format!("parse task failed: {}", e)))?;
        match result {
            Ok(table) => tables.push(table),
            Err(e) => {
                tracing::warn!(file = %name, "Could not parse export file: {}", e);
                unreadable.push(name);
            }
        }
    }

    let your_metrics = request
        .your_report_text
        .as_deref()
        .map(extract_domain_metrics);
    let competitor_metrics = request
        .competitor_report_text
        .as_deref()
        .map(extract_domain_metrics);

    let mut report = analyze_intel(
        &tables,
        &request.your_domain,
        your_metrics.as_ref(),
        competitor_metrics.as_ref(),
    );
    report.degraded_files.extend(unreadable);

    tracing::info!(
        action_items = report.action_items.len(),
        degraded = report.degraded_files.len(),
        "Competitive intel analysis complete"
    );

    Ok((
        StatusCode::OK,
        Json(IntelResponse {
            analyzed_at: Utc::now(),
            your_domain: request.your_domain,
            your_metrics,
            competitor_metrics,
            report,
        }),
    ))
}

/// Turn raw CSV text into the ordered header + row maps the engine expects.
/// Rows that fail to parse are skipped; only a missing header row fails the
/// whole file.
fn parse_export_file(file: ExportFile) -> Result<ExportTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(file.csv.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(ExportTable {
        name: file.name,
        kind: file.report_type,
        headers,
        rows,
    })
}
