//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Generating test papers (validate + allocate on a pool snapshot, then
//!     record the paper in the history store)
//!   - Question stats and bank search
//!   - Paper history access (list / view / delete)
//!
//! Everything here takes plain data in and returns plain data or typed
//! errors out; handlers only translate to and from the wire.

use std::collections::BTreeMap;

use tracing::{error, info, instrument};

use crate::domain::{Difficulty, GenerationRequest, Question, TestPaper};
use crate::generate::{generate_test_paper as run_engine, validate, GenerateError, ValidationError};
use crate::state::AppState;

/// Run the full generation flow for one request. On success the paper is
/// already recorded in the history when this returns.
#[instrument(level = "info", skip(state, request), fields(course_id = %request.course_id, total = request.difficulty.total(), areas = request.areas.len()))]
pub async fn generate_test_paper(
  state: &AppState,
  request: &GenerationRequest,
) -> Result<TestPaper, GenerateError> {
  let pool = state.pool_for_course(&request.course_id);
  let Some(course) = state.course(&request.course_id) else {
    // Unknown course behaves like an empty pool, not a distinct failure;
    // running validation keeps the rejection order (an all-zero request is
    // still EmptyRequest first).
    error!(target: "paper", course_id = %request.course_id, "Generation for unknown course");
    return match validate(&pool, request) {
      Err(e) => Err(e.into()),
      Ok(_) => Err(
        ValidationError::NoQuestionsForCourse {
          course_id: request.course_id.clone(),
        }
        .into(),
      ),
    };
  };

  match run_engine(&pool, course, request) {
    Ok(paper) => {
      info!(target: "paper", id = %paper.id, course_id = %paper.course_id, questions = paper.questions.len(), "Test paper generated");
      state.add_paper(paper.clone()).await;
      Ok(paper)
    }
    Err(e) => {
      info!(target: "paper", course_id = %request.course_id, error = %e, "Test paper request rejected");
      Err(e)
    }
  }
}

/// Per-difficulty and per-area availability for one course. Read-only,
/// side-effect free; unknown courses yield zeroed stats.
#[instrument(level = "debug", skip(state), fields(%course_id))]
pub fn question_stats(
  state: &AppState,
  course_id: &str,
) -> (BTreeMap<Difficulty, usize>, BTreeMap<String, usize>) {
  let pool = state.pool_for_course(course_id);
  let declared = state
    .course(course_id)
    .map(|c| c.knowledge_areas.clone())
    .unwrap_or_default();
  (pool.difficulty_stats(), pool.knowledge_area_stats(&declared))
}

/// Unordered filter over the whole bank; all filters optional and
/// conjunctive.
#[instrument(level = "debug", skip(state, knowledge_areas), fields(areas = knowledge_areas.len()))]
pub fn search_questions(
  state: &AppState,
  course_id: Option<&str>,
  difficulty_level: Option<Difficulty>,
  knowledge_areas: &[String],
) -> Vec<Question> {
  state.search_questions(course_id, difficulty_level, knowledge_areas)
}
