use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EntityKind, KpiKind, NewKpi, NewMember, NewTeam, TeamId};
use super::service::{DirectoryService, DirectoryServiceError};
use crate::store::{DirectoryStore, StoreError};

/// Router builder exposing catalog endpoints for teams, members, and KPIs.
pub fn directory_router<S>(service: Arc<DirectoryService<S>>) -> Router
where
    S: DirectoryStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/teams",
            post(create_team_handler::<S>).get(list_teams_handler::<S>),
        )
        .route(
            "/api/v1/members",
            post(create_member_handler::<S>).get(list_members_handler::<S>),
        )
        .route(
            "/api/v1/kpis",
            post(create_kpi_handler::<S>).get(list_kpis_handler::<S>),
        )
        .route(
            "/api/v1/directory/:kind/:id/deactivate",
            post(deactivate_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) include_inactive: bool,
    #[serde(default)]
    pub(crate) team_id: Option<u64>,
    #[serde(default)]
    pub(crate) kind: Option<KpiKind>,
}

pub(crate) async fn create_team_handler<S>(
    State(service): State<Arc<DirectoryService<S>>>,
    axum::Json(team): axum::Json<NewTeam>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    match service.create_team(team) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_teams_handler<S>(
    State(service): State<Arc<DirectoryService<S>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    match service.teams(query.include_inactive) {
        Ok(teams) => (StatusCode::OK, axum::Json(teams)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_member_handler<S>(
    State(service): State<Arc<DirectoryService<S>>>,
    axum::Json(member): axum::Json<NewMember>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    match service.create_member(member) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_members_handler<S>(
    State(service): State<Arc<DirectoryService<S>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    match service.members(query.include_inactive, query.team_id.map(TeamId)) {
        Ok(members) => (StatusCode::OK, axum::Json(members)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_kpi_handler<S>(
    State(service): State<Arc<DirectoryService<S>>>,
    axum::Json(kpi): axum::Json<NewKpi>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    match service.create_kpi(kpi) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_kpis_handler<S>(
    State(service): State<Arc<DirectoryService<S>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    match service.kpis(query.include_inactive, query.kind) {
        Ok(kpis) => (StatusCode::OK, axum::Json(kpis)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn deactivate_handler<S>(
    State(service): State<Arc<DirectoryService<S>>>,
    Path((kind, id)): Path<(String, u64)>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    let Some(kind) = EntityKind::parse(&kind) else {
        let payload = json!({ "error": format!("unknown entity kind '{kind}'") });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    match service.deactivate(kind, id) {
        Ok(()) => {
            let payload = json!({ "entity": kind.label(), "id": id, "active": false });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: DirectoryServiceError) -> Response {
    let status = match &error {
        DirectoryServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DirectoryServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        DirectoryServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
