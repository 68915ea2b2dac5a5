//! Batch and entry API handlers.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use convertino_core::{
    BatchStart, EntryId, EntrySnapshot, ExportReceipt, FileSource, SessionError, SessionSummary,
};

use crate::metrics::{UPLOADED_BYTES_TOTAL, UPLOADED_FILES_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for choosing an output format
#[derive(Debug, Deserialize)]
pub struct ChooseFormatBody {
    pub format: String,
}

/// Response for a new batch
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: String,
    pub entries: Vec<EntrySnapshot>,
}

/// Response for listing entries
#[derive(Debug, Serialize)]
pub struct ListEntriesResponse {
    pub entries: Vec<EntrySnapshot>,
    pub summary: SessionSummary,
}

/// Response for conversion requests
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    /// Entries marked converting by this request
    pub dispatched: Vec<EntryId>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn session_error(e: SessionError) -> ApiError {
    let status = match &e {
        SessionError::EntryNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::FormatNotOffered { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::FormatsPending(_)
        | SessionError::NotEligible { .. }
        | SessionError::InvalidTransition { .. } => StatusCode::CONFLICT,
    };
    error(status, e.to_string())
}

// ============================================================================
// Batch
// ============================================================================

/// Replace the batch with the uploaded files and start format discovery
pub async fn replace_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BatchResponse>), ApiError> {
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(error(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart body: {}", e),
                ))
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(error(
                    StatusCode::BAD_REQUEST,
                    "Every file field needs a file name",
                ))
            }
        };

        let bytes = field.bytes().await.map_err(|e| {
            error(
                StatusCode::BAD_REQUEST,
                format!("Failed to read file: {}", e),
            )
        })?;

        UPLOADED_BYTES_TOTAL.inc_by(bytes.len() as u64);
        files.push(FileSource::new(name, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "No files uploaded"));
    }
    UPLOADED_FILES_TOTAL.inc_by(files.len() as u64);

    // Discovery answers land in the store as they arrive
    let BatchStart {
        batch_id,
        entries,
        tickets,
    } = state.store().start_batch(files).await;
    let orchestrator = state.orchestrator().clone();
    tokio::spawn(async move {
        orchestrator.run_discoveries(tickets).await;
    });

    Ok((
        StatusCode::CREATED,
        Json(BatchResponse { batch_id, entries }),
    ))
}

/// Convert every idle entry with a chosen format
pub async fn convert_all(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DispatchResponse>) {
    let tickets = state.store().begin_all_conversions().await;
    let dispatched: Vec<EntryId> = tickets.iter().map(|ticket| ticket.id).collect();

    if !tickets.is_empty() {
        info!("Dispatching {} conversions", tickets.len());
        let orchestrator = state.orchestrator().clone();
        tokio::spawn(async move {
            orchestrator.run_conversions(tickets).await;
        });
    }

    (StatusCode::ACCEPTED, Json(DispatchResponse { dispatched }))
}

// ============================================================================
// Entries
// ============================================================================

/// List all entries with per-state counts
pub async fn list_entries(State(state): State<Arc<AppState>>) -> Json<ListEntriesResponse> {
    Json(ListEntriesResponse {
        entries: state.store().snapshot().await,
        summary: state.store().summary().await,
    })
}

/// Get one entry
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<EntrySnapshot>, ApiError> {
    state
        .store()
        .entry(EntryId(id))
        .await
        .map(Json)
        .ok_or_else(|| session_error(SessionError::EntryNotFound(EntryId(id))))
}

/// Remove one entry from the batch
pub async fn remove_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .store()
        .remove_entry(EntryId(id))
        .await
        .map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Choose the output format of one entry
pub async fn choose_format(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<ChooseFormatBody>,
) -> Result<Json<EntrySnapshot>, ApiError> {
    state
        .store()
        .set_chosen_format(EntryId(id), &body.format)
        .await
        .map(Json)
        .map_err(session_error)
}

/// Look up the formats of one entry again
pub async fn rediscover(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<(StatusCode, Json<EntrySnapshot>), ApiError> {
    let id = EntryId(id);
    let ticket = state
        .store()
        .begin_discovery(id)
        .await
        .map_err(session_error)?;

    let orchestrator = state.orchestrator().clone();
    tokio::spawn(async move {
        orchestrator.run_discovery(ticket).await;
    });

    let snapshot = state
        .store()
        .entry(id)
        .await
        .ok_or_else(|| session_error(SessionError::EntryNotFound(id)))?;
    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// Convert one entry
pub async fn convert_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<(StatusCode, Json<DispatchResponse>), ApiError> {
    let ticket = state
        .store()
        .begin_conversion(EntryId(id))
        .await
        .map_err(session_error)?;
    let dispatched = vec![ticket.id];

    let orchestrator = state.orchestrator().clone();
    tokio::spawn(async move {
        orchestrator.run_conversion(ticket).await;
    });

    Ok((StatusCode::ACCEPTED, Json(DispatchResponse { dispatched })))
}

/// Download the converted file of one entry
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let artifact = state.store().artifact(EntryId(id)).await.ok_or_else(|| {
        error(
            StatusCode::NOT_FOUND,
            format!("entry {} has no converted file", id),
        )
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        artifact.filename().replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(artifact.bytes().to_vec()),
    )
        .into_response())
}

/// Export the converted file of one entry to the configured sink
pub async fn export_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ExportReceipt>, ApiError> {
    match state.exporter().export(EntryId(id)).await {
        Ok(Some(receipt)) => Ok(Json(receipt)),
        Ok(None) => Err(error(
            StatusCode::NOT_FOUND,
            format!("entry {} has no converted file", id),
        )),
        Err(e) => {
            warn!("Export of entry {} failed: {}", id, e);
            Err(error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
