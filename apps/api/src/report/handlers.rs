//! Axum route handlers for the Report API.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant::forms::LookupForm;
use crate::errors::AppError;
use crate::layout::{Field, Helvetica, LayoutInstruction};
use crate::render::render_report;
use crate::report::fields::{FieldPreview, Notice};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct NoticePreviewResponse {
    pub name: String,
    pub title: String,
    pub file_name: String,
    pub fields: Vec<FieldPreview>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub title: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub instructions: Vec<LayoutInstruction>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/reports/:drug
///
/// Fetches the drug from the backend and returns the notice as a PDF download.
pub async fn handle_download_report(
    State(state): State<AppState>,
    Path(drug): Path<String>,
) -> Result<Response, AppError> {
    let notice = load_notice(&state, &drug).await?;
    let file_name = notice.file_name.clone();
    let layout = state.report_layout.clone();

    // printpdf documents are not Send; build and finish the whole PDF on one blocking thread.
    let pdf = tokio::task::spawn_blocking(move || {
        render_report(&notice.title, &notice.fields, &layout)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in report render: {e}")))??;

    info!(file_name = %file_name, bytes = pdf.len(), "Notice rendered");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        pdf,
    )
        .into_response())
}

/// GET /api/v1/reports/:drug/fields
///
/// Returns what would be printed, without rendering.
pub async fn handle_preview_report(
    State(state): State<AppState>,
    Path(drug): Path<String>,
) -> Result<Json<NoticePreviewResponse>, AppError> {
    let notice = load_notice(&state, &drug).await?;
    Ok(Json(NoticePreviewResponse {
        fields: notice.preview(),
        name: notice.name,
        title: notice.title,
        file_name: notice.file_name,
    }))
}

/// POST /api/v1/reports/layout
///
/// Lays out caller-supplied fields and returns the positioned text blocks.
/// Fields with an empty value are dropped before layout.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    let fields: Vec<Field> = request
        .fields
        .into_iter()
        .filter(|f| !f.value.is_empty())
        .collect();

    let instructions = state.report_layout.layout(&request.title, &fields, &Helvetica);
    Ok(Json(LayoutResponse { instructions }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_notice(state: &AppState, drug: &str) -> Result<Notice, AppError> {
    let query = LookupForm::with_query(drug)
        .submission()
        .ok_or_else(|| AppError::Validation("drug name cannot be empty".to_string()))?;

    let data = state.backend.fetch_medicament(&query).await?;
    Ok(Notice::from_backend(&query, &data))
}

/// `attachment; filename="..."` with anything outside printable ASCII replaced by `_`.
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("notice-abacavir.pdf"),
            "attachment; filename=\"notice-abacavir.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_replaces_unsafe_chars() {
        assert_eq!(
            content_disposition("notice-acide \"acétyl\".pdf"),
            "attachment; filename=\"notice-acide _ac_tyl_.pdf\""
        );
    }
}
