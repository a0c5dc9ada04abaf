//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; engine rejections map to 422, unknown paper
//! ids to 404.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::GenerationRequest;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_courses(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.courses())
}

#[instrument(level = "info", skip(state), fields(%q.course_id))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<StatsQuery>,
) -> impl IntoResponse {
  let (difficulty_stats, knowledge_area_stats) = logic::question_stats(&state, &q.course_id);
  Json(StatsOut { difficulty_stats, knowledge_area_stats })
}

#[instrument(level = "info", skip(state, body), fields(course = body.course_id.as_deref().unwrap_or("*")))]
pub async fn http_post_search(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SearchIn>,
) -> impl IntoResponse {
  let results = logic::search_questions(
    &state,
    body.course_id.as_deref(),
    body.difficulty_level,
    &body.knowledge_areas,
  );
  info!(target: "bank", results = results.len(), "HTTP question search");
  Json(results)
}

#[instrument(level = "info", skip(state, body), fields(%body.course_id))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerationRequest>,
) -> impl IntoResponse {
  match logic::generate_test_paper(&state, &body).await {
    Ok(paper) => Json(paper).into_response(),
    Err(e) => (
      StatusCode::UNPROCESSABLE_ENTITY,
      Json(ErrorOut { message: e.to_string() }),
    )
      .into_response(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_papers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.list_papers().await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_paper(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  match state.get_paper(&id).await {
    Some(paper) => Json(paper).into_response(),
    None => (
      StatusCode::NOT_FOUND,
      Json(ErrorOut { message: format!("Unknown test paper: {id}") }),
    )
      .into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_paper(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  if state.delete_paper(&id).await {
    info!(target: "paper", %id, "Test paper deleted");
    Json(DeleteOut { deleted: true }).into_response()
  } else {
    (
      StatusCode::NOT_FOUND,
      Json(ErrorOut { message: format!("Unknown test paper: {id}") }),
    )
      .into_response()
  }
}
