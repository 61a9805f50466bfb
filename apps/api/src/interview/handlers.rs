//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::AnswerRecord;
use crate::interview::report::Report;
use crate::interview::session::{InterviewSession, Phase, SubmitOutcome};
use crate::interview::transcript::TranscriptEntry;
use crate::state::{AppState, SessionHandle};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub text: String,
}

/// The entries one event appended, plus progress for rendering.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub phase: Phase,
    pub question_count: u32,
    pub target_question_count: u32,
    pub entries: Vec<TranscriptEntry>,
    /// Set when the answer was blank and nothing changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<String>,
}

impl TurnResponse {
    fn new(session: &InterviewSession, entries: Vec<TranscriptEntry>) -> Self {
        Self {
            session_id: session.id(),
            phase: session.phase(),
            question_count: session.question_count(),
            target_question_count: session.target_question_count(),
            entries,
            reprompt: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InterviewView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub phase: Phase,
    pub question_count: u32,
    pub target_question_count: u32,
    /// Size of the question pool, once generated.
    pub question_bank_size: Option<usize>,
    pub transcript: Vec<TranscriptEntry>,
    pub answers: Vec<AnswerRecord>,
    pub report: Option<Report>,
}

impl From<&InterviewSession> for InterviewView {
    fn from(session: &InterviewSession) -> Self {
        Self {
            session_id: session.id(),
            created_at: session.created_at(),
            phase: session.phase(),
            question_count: session.question_count(),
            target_question_count: session.target_question_count(),
            question_bank_size: session.bank().map(|bank| bank.len()),
            transcript: session.transcript().entries().to_vec(),
            answers: session.answers().to_vec(),
            report: session.report().cloned(),
        }
    }
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Creates a session, generates its question bank and asks the first question.
pub async fn handle_create_interview(
    State(state): State<AppState>,
) -> Result<Json<TurnResponse>, AppError> {
    let mut session = InterviewSession::new(state.config.interview_settings());
    let entries = session.start(state.llm.as_ref()).await?;
    let response = TurnResponse::new(&session, entries);

    state.sessions.insert(session).await;
    Ok(Json(response))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewView>, AppError> {
    let handle = find_session(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(InterviewView::from(&*session)))
}

/// POST /api/v1/interviews/:id/answers
///
/// A blank answer is not an error: the response carries `reprompt` and no entries.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;

    let response = match session.submit(&request.text, state.llm.as_ref()).await? {
        SubmitOutcome::Accepted { entries } => TurnResponse::new(&session, entries),
        SubmitOutcome::Reprompt { message } => TurnResponse {
            reprompt: Some(message),
            ..TurnResponse::new(&session, Vec::new())
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/interviews/:id/conclude
///
/// Ends the interview early. Calling it again returns no new entries.
pub async fn handle_conclude(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TurnResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;

    let entries = session.conclude(state.llm.as_ref()).await;
    Ok(Json(TurnResponse::new(&session, entries)))
}

/// POST /api/v1/interviews/:id/restart
///
/// Replaces the session wholesale with a fresh one under the same id and starts it.
pub async fn handle_restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TurnResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;

    *session = session.restarted();
    let entries = session.start(state.llm.as_ref()).await?;
    Ok(Json(TurnResponse::new(&session, entries)))
}

/// GET /api/v1/interviews/:id/transcript
///
/// Plain-text transcript as a downloadable attachment.
pub async fn handle_download_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let handle = find_session(&state, id).await?;
    let body = handle.lock().await.export_transcript();

    let filename = format!(
        "interview_transcript_{}.txt",
        Utc::now().format("%Y%m%d_%H%M")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    Ok(StatusCode::NO_CONTENT)
}
