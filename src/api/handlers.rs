use crate::application::circulation::{
    ServiceDependencies, checkout as execute_checkout, find_open_entry, list_overdue,
    return_book as execute_return_book,
};
use crate::domain::value_objects::{BorrowerId, EntryId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{CheckoutRequest, EntryResponse, OpenEntryQuery, ReturnRequest},
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// POST /checkout - check a book out to a borrower.
///
/// Returns 201 with the created entry, 404 if the book or borrower does
/// not resolve, 409 if no copy is available or the borrower already
/// holds this book.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let entry = execute_checkout(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// POST /entries/:id/return - return a checked-out book.
///
/// `borrower_id` in the body is the acting identity; a non-owner gets
/// the same 404 as a missing entry.
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = execute_return_book(&state.service_deps, req.to_command(entry_id)).await?;
    Ok(Json(entry.into()))
}

/// GET /entries/:id - look up an open entry for the acting borrower.
pub async fn get_open_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    Query(query): Query<OpenEntryQuery>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = find_open_entry(
        &state.service_deps,
        EntryId::from_uuid(entry_id),
        BorrowerId::from_uuid(query.borrower_id),
    )
    .await?;
    Ok(Json(entry.into()))
}

/// GET /overdue - all open, past-due entries, oldest overdue first.
///
/// Restricting this to privileged callers is the auth layer's job.
pub async fn overdue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let entries = list_overdue(&state.service_deps).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}
