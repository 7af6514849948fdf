use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::compare::compare_profiles;
use crate::analysis::report::{self, Report};
use crate::analysis::{analyze_document, AnalyzeOptions, PageAnalysis};
use crate::error::AppError;

/// Request body for a single-page analysis. The caller supplies raw HTML;
/// this service never fetches network resources itself.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzePageRequest {
    /// URL the HTML was fetched from (used for link classification and HTTPS check)
    pub url: String,
    /// Raw HTML of the page
    pub html: String,
    /// Optional target keyword to analyze relevance for
    #[serde(default)]
    pub target_keyword: Option<String>,
    /// Treat the page as a pillar post (stricter length/structure thresholds)
    #[serde(default)]
    pub is_pillar_post: bool,
    /// Optional competitor page to benchmark against
    #[serde(default)]
    pub competitor: Option<CompetitorDocument>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompetitorDocument {
    /// URL the competitor HTML was fetched from
    pub url: String,
    /// Raw HTML of the competitor page
    pub html: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzePageResponse {
    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
    /// The full merged report
    pub report: Report,
}

/// Analyze a page for on-page SEO quality, optionally against a competitor
#[utoipa::path(
    post,
    path = "/analyze/page",
    request_body = AnalyzePageRequest,
    responses(
        (status = 200, description = "Analysis complete", body = AnalyzePageResponse),
        (status = 422, description = "Unprocessable Entity - empty or unusable document"),
        (status = 500, description = "Internal Server Error during processing")
    )
)]
#[tracing::instrument(skip(request), fields(url = %request.url, has_competitor = request.competitor.is_some()))]
pub async fn analyze_page(
    Json(request): Json<AnalyzePageRequest>,
) -> Result<(StatusCode, Json<AnalyzePageResponse>), AppError> {
    let opts = AnalyzeOptions {
        target_keyword: request.target_keyword.clone(),
        is_pillar_post: request.is_pillar_post,
    };

    // The two extractions are independent; run both on blocking threads and
    // only join once both are done.
    let your_task = {
        let html = request.html;
        let url = request.url.clone();
        let opts = opts.clone();
        tokio::task::spawn_blocking(move || analyze_document(&html, &url, &opts))
    };
    let competitor_task = request.competitor.map(|competitor| {
        let opts = AnalyzeOptions {
            target_keyword: request.target_keyword.clone(),
            is_pillar_post: false,
        };
        tokio::task::spawn_blocking(move || analyze_document(&competitor.html, &competitor.url, &opts))
    });

    let (your_result, competitor_result) = match competitor_task {
        Some(task) => {
            let (yours, theirs) = futures::future::join(your_task, task).await;
            (yours, Some(theirs))
        }
        None => (your_task.await, None),
    };

    let page: PageAnalysis = your_result
        .map_err(|e| AppError::InternalError(format!("analysis task failed: {}", e)))??;

    // A broken competitor document degrades that section instead of failing
    // the request; only the primary document is load-bearing.
    let competitor = match competitor_result {
        Some(joined) => {
            let result =
                joined.map_err(|e| AppError::InternalError(format!("analysis task failed: {}", e)))?;
            match result {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    tracing::warn!("Competitor document could not be analyzed: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let comparison = competitor.as_ref().map(|theirs| {
        compare_profiles(
            &page.profile,
            &theirs.profile,
            page.keyword.as_ref().zip(theirs.keyword.as_ref()),
        )
    });

    let report = report::synthesize(page, competitor, comparison, None);
    tracing::info!(
        issues = report.issues.len(),
        recommendations = report.recommendations.len(),
        "Page analysis complete"
    );

    Ok((
        StatusCode::OK,
        Json(AnalyzePageResponse {
            analyzed_at: Utc::now(),
            report,
        }),
    ))
}
