use crate::infra::{deserialize_optional_date, AppState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use teampulse::directory::domain::{KpiKind, TeamId};
use teampulse::directory::{directory_router, DirectoryService};
use teampulse::evaluations::{evaluation_router, EvaluationService};
use teampulse::reports::{
    performance_report, GroupKey, PerformanceReport, ReportOptions, RiskThresholds,
};
use teampulse::store::{DirectoryStore, EvaluationFilter, EvaluationStore};

pub(crate) struct ReportContext<S> {
    pub(crate) store: Arc<S>,
    pub(crate) thresholds: RiskThresholds,
}

impl<S> Clone for ReportContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            thresholds: self.thresholds,
        }
    }
}

pub(crate) fn api_router<S>(
    directory: Arc<DirectoryService<S>>,
    evaluations: Arc<EvaluationService<S>>,
    reports: ReportContext<S>,
) -> axum::Router
where
    S: DirectoryStore + EvaluationStore + 'static,
{
    let report_routes = axum::Router::new()
        .route(
            "/api/v1/reports/performance",
            axum::routing::post(performance_report_endpoint::<S>),
        )
        .with_state(reports);

    directory_router(directory)
        .merge(evaluation_router(evaluations))
        .merge(report_routes)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct PerformanceReportRequest {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) to: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) team_id: Option<u64>,
    #[serde(default)]
    pub(crate) kpi_kind: Option<KpiKind>,
    #[serde(default = "default_group_by")]
    pub(crate) group_by: GroupKey,
    #[serde(default = "default_include")]
    pub(crate) include_trend: bool,
    #[serde(default = "default_include")]
    pub(crate) include_compliance: bool,
}

fn default_group_by() -> GroupKey {
    GroupKey::Member
}

fn default_include() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub(crate) struct PerformanceReportResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) team_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kpi_kind: Option<KpiKind>,
    pub(crate) evaluations: usize,
    pub(crate) report: PerformanceReport,
}

pub(crate) async fn performance_report_endpoint<S>(
    State(context): State<ReportContext<S>>,
    Json(request): Json<PerformanceReportRequest>,
) -> Response
where
    S: DirectoryStore + EvaluationStore + 'static,
{
    let filter = EvaluationFilter {
        from: request.from,
        to: request.to,
        team: request.team_id.map(TeamId),
        kind: request.kpi_kind,
    };

    let records = match context.store.evaluations(&filter) {
        Ok(records) => records,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    let options = ReportOptions {
        group_by: request.group_by,
        include_trend: request.include_trend,
        include_compliance: request.include_compliance,
    };
    let report = performance_report(&records, &context.thresholds, &options);

    let response = PerformanceReportResponse {
        from: request.from,
        to: request.to,
        team_id: request.team_id,
        kpi_kind: request.kpi_kind,
        evaluations: records.len(),
        report,
    };
    (StatusCode::OK, Json(response)).into_response()
}
