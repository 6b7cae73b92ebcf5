//! Visitors API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, ErrorCode, ErrorResponse},
    models::visitor::{CreateVisitor, VisitorListing, VisitorQuery, VisitorSummary, VisitorView},
};

use super::ApiJson;

pub const NO_DATA_MESSAGE: &str = "No data found for this date";

/// Purge response
#[derive(Serialize, ToSchema)]
pub struct PurgeResponse {
    /// Number of deleted records
    pub deleted: u64,
}

/// Ids are opaque: anything that is not a UUID cannot name a record
fn visitor_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::NotFound(format!("Visitor with id {} not found", raw)))
}

/// Register (check in) a visitor
#[utoipa::path(
    post,
    path = "/visitors",
    tag = "visitors",
    request_body = CreateVisitor,
    responses(
        (status = 201, description = "Visitor checked in", body = VisitorView),
        (status = 400, description = "Invalid or unrecognized field", body = ErrorResponse)
    )
)]
pub async fn register_visitor(
    State(state): State<crate::AppState>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<(StatusCode, Json<VisitorView>)> {
    let data = CreateVisitor::from_json(body)?;
    let visitor = state.services.visitors.register(data).await?;
    Ok((StatusCode::CREATED, Json(visitor.into())))
}

/// List visitors, optionally for a single log date
#[utoipa::path(
    get,
    path = "/visitors",
    tag = "visitors",
    params(VisitorQuery),
    responses(
        (status = 200, description = "Visitors, most recent check-in first", body = Vec<VisitorView>),
        (status = 404, description = "No data for this date (error `NoData`)", body = ErrorResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse)
    )
)]
pub async fn list_visitors(
    State(state): State<crate::AppState>,
    Query(query): Query<VisitorQuery>,
) -> AppResult<Response> {
    let date = query.log_date()?;

    let response = match state.services.visitors.list_by_date(date).await? {
        VisitorListing::Records(records) => {
            let views: Vec<VisitorView> = records.into_iter().map(VisitorView::from).collect();
            Json(views).into_response()
        }
        VisitorListing::NoRecords { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(ErrorCode::NoData, NO_DATA_MESSAGE)),
        )
            .into_response(),
    };
    Ok(response)
}

/// Active and checked-out totals for a log date (today by default)
#[utoipa::path(
    get,
    path = "/visitors/summary",
    tag = "visitors",
    params(VisitorQuery),
    responses(
        (status = 200, description = "Visitor totals", body = VisitorSummary),
        (status = 400, description = "Malformed date", body = ErrorResponse)
    )
)]
pub async fn visitor_summary(
    State(state): State<crate::AppState>,
    Query(query): Query<VisitorQuery>,
) -> AppResult<Json<VisitorSummary>> {
    let summary = state.services.visitors.summary(query.log_date()?).await?;
    Ok(Json(summary))
}

/// Get a visitor by ID
#[utoipa::path(
    get,
    path = "/visitors/{id}",
    tag = "visitors",
    params(("id" = String, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Visitor", body = VisitorView),
        (status = 404, description = "Visitor not found", body = ErrorResponse)
    )
)]
pub async fn get_visitor(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<VisitorView>> {
    let visitor = state.services.visitors.get(visitor_id(&id)?).await?;
    Ok(Json(visitor.into()))
}

/// Check a visitor out
#[utoipa::path(
    put,
    path = "/visitors/{id}/checkout",
    tag = "visitors",
    params(("id" = String, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Visitor checked out", body = VisitorView),
        (status = 404, description = "Visitor not found", body = ErrorResponse),
        (status = 409, description = "Visitor already checked out", body = ErrorResponse)
    )
)]
pub async fn check_out_visitor(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<VisitorView>> {
    let visitor = state.services.visitors.check_out(visitor_id(&id)?).await?;
    Ok(Json(visitor.into()))
}

/// Delete every record logged today
#[utoipa::path(
    delete,
    path = "/admin/visitors/today",
    tag = "admin",
    responses(
        (status = 200, description = "Today's records deleted", body = PurgeResponse),
        (status = 403, description = "Bulk deletion disabled", body = ErrorResponse)
    )
)]
pub async fn purge_today(State(state): State<crate::AppState>) -> AppResult<Json<PurgeResponse>> {
    let deleted = state.services.visitors.purge_today().await?;
    Ok(Json(PurgeResponse { deleted }))
}
