use crate::application::circulation::CirculationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API-layer error wrapper.
///
/// Maps the service's NotFound / Conflict taxonomy onto HTTP status
/// codes. Infrastructure failures are logged and returned as an opaque
/// 500; the detail never reaches the client.
#[derive(Debug)]
pub struct ApiError(CirculationError);

impl From<CirculationError> for ApiError {
    fn from(err: CirculationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found
            CirculationError::BookNotFound => {
                (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", "Book not found")
            }
            CirculationError::EntryNotFound => (
                StatusCode::NOT_FOUND,
                "ENTRY_NOT_FOUND",
                "Ledger entry not found or already returned",
            ),
            // An inactive borrower does not resolve to an identity;
            // account status is not leaked through a different code.
            CirculationError::BorrowerInactive => (
                StatusCode::NOT_FOUND,
                "BORROWER_NOT_FOUND",
                "Borrower does not resolve to an active identity",
            ),

            // 409 Conflict
            CirculationError::NoCopiesAvailable => (
                StatusCode::CONFLICT,
                "NO_COPIES_AVAILABLE",
                "No copies of this book are available",
            ),
            CirculationError::AlreadyCheckedOut => (
                StatusCode::CONFLICT,
                "ALREADY_CHECKED_OUT",
                "Borrower already has this book checked out",
            ),

            // 500 Internal Server Error
            CirculationError::CatalogError(ref e) => {
                tracing::error!("catalog store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CATALOG_ERROR",
                    "Catalog store error",
                )
            }
            CirculationError::LedgerError(ref e) => {
                tracing::error!("ledger entry store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LEDGER_ERROR",
                    "Ledger entry store error",
                )
            }
            CirculationError::DirectoryError(ref e) => {
                tracing::error!("borrower directory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DIRECTORY_ERROR",
                    "Borrower directory error",
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
