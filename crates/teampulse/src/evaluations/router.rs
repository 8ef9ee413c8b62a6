use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::EvaluationBatch;
use super::service::{EvaluationService, EvaluationServiceError};
use crate::directory::domain::{KpiId, KpiKind, TeamId};
use crate::store::{DirectoryStore, EvaluationFilter, EvaluationStore, StoreError};

/// Router builder exposing evaluation intake, listing, and the rating
/// suggestion endpoint.
pub fn evaluation_router<S>(service: Arc<EvaluationService<S>>) -> Router
where
    S: DirectoryStore + EvaluationStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/evaluations",
            post(submit_handler::<S>).get(list_handler::<S>),
        )
        .route(
            "/api/v1/evaluations/suggestion",
            get(suggestion_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) from: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) to: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) team_id: Option<u64>,
    #[serde(default)]
    pub(crate) kind: Option<KpiKind>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionQuery {
    pub(crate) kpi_id: u64,
    pub(crate) percentage: f64,
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    axum::Json(batch): axum::Json<EvaluationBatch>,
) -> Response
where
    S: DirectoryStore + EvaluationStore + 'static,
{
    match service.submit(batch) {
        Ok(saved) => {
            let payload = json!({ "stored": saved.len(), "evaluations": saved });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: DirectoryStore + EvaluationStore + 'static,
{
    let filter = EvaluationFilter {
        from: query.from,
        to: query.to,
        team: query.team_id.map(TeamId),
        kind: query.kind,
    };

    match service.list(&filter) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn suggestion_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    Query(query): Query<SuggestionQuery>,
) -> Response
where
    S: DirectoryStore + EvaluationStore + 'static,
{
    match service.suggestion(KpiId(query.kpi_id), query.percentage) {
        Ok(suggestion) => (StatusCode::OK, axum::Json(suggestion)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: EvaluationServiceError) -> Response {
    let status = match &error {
        EvaluationServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EvaluationServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        EvaluationServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
