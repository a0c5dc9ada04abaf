//! Test-paper constraint validation and stratified sampling.
//!
//! Flow:
//! 1) `validate` checks a generation request against the course's question
//!    pool and produces a normalized `AllocationPlan`, or a typed rejection.
//! 2) `allocate` consumes the plan and performs the disjoint selection:
//!    area-constrained draws first, then a per-difficulty remainder pass.
//! 3) `generate_test_paper` wraps the selection into a `TestPaper`.
//!
//! Selection is deterministic: candidates are always consumed in pool
//! insertion order, so an unchanged pool snapshot and plan yield the same
//! paper (modulo the paper id and timestamp).

use std::collections::BTreeSet;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
  Course, Difficulty, DifficultyDistribution, GenerationRequest, KnowledgeAreaDistribution,
  Question, TestPaper,
};
use crate::pool::QuestionPool;

/// Rejections raised before any selection happens.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("test paper request contains no questions")]
  EmptyRequest,

  #[error("no questions available for course {course_id}")]
  NoQuestionsForCourse { course_id: String },

  #[error("not enough {difficulty} questions: requested {requested}, available {available}")]
  InsufficientDifficultyCount {
    difficulty: Difficulty,
    requested: usize,
    available: usize,
  },

  #[error("knowledge areas were selected but no per-area counts were given")]
  MissingAreaCounts,

  #[error("no {difficulty} questions in knowledge area \"{area}\"")]
  NoAreaDifficultyQuestions { area: String, difficulty: Difficulty },
}

/// Rejections raised during selection. Validation does not prove joint
/// feasibility across areas, so these are normal reportable outcomes, not
/// internal errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AllocationError {
  #[error("knowledge area \"{area}\" quota unmet: requested {requested}, obtained {obtained}")]
  AreaQuotaUnmet {
    area: String,
    requested: usize,
    obtained: usize,
  },

  #[error("{difficulty} quota unmet: requested {requested}, obtained {obtained}")]
  DifficultyQuotaUnmet {
    difficulty: Difficulty,
    requested: usize,
    obtained: usize,
  },
}

/// Union surfaced by `generate_test_paper`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Validation(#[from] ValidationError),
  #[error(transparent)]
  Allocation(#[from] AllocationError),
}

/// The validated, normalized form of a generation request: the full
/// difficulty distribution plus the positive-count area quotas only.
#[derive(Clone, Debug)]
pub struct AllocationPlan {
  pub difficulty: DifficultyDistribution,
  pub areas: KnowledgeAreaDistribution,
}

/// Check a request against the pool. Rules run in order and the first
/// failure wins.
///
/// The per-(area, difficulty) rule asserts that each cell is non-empty, not
/// that the quotas are jointly satisfiable: two areas can both pass here
/// while competing for the same single question. The allocator re-checks
/// quotas and reports `AreaQuotaUnmet` in that case.
pub fn validate(
  pool: &QuestionPool,
  request: &GenerationRequest,
) -> Result<AllocationPlan, ValidationError> {
  if request.difficulty.total() == 0 {
    return Err(ValidationError::EmptyRequest);
  }

  if pool.is_empty() {
    return Err(ValidationError::NoQuestionsForCourse {
      course_id: request.course_id.clone(),
    });
  }

  for level in Difficulty::ALL {
    let requested = request.difficulty.get(level);
    if requested == 0 {
      continue;
    }
    let available = pool.count_by_difficulty(level);
    if available < requested {
      return Err(ValidationError::InsufficientDifficultyCount {
        difficulty: level,
        requested,
        available,
      });
    }
  }

  if !request.areas.is_empty() && request.areas.values().all(|&count| count == 0) {
    return Err(ValidationError::MissingAreaCounts);
  }

  for (area, &count) in &request.areas {
    if count == 0 {
      continue;
    }
    for level in Difficulty::ALL {
      if request.difficulty.get(level) == 0 {
        continue;
      }
      if pool.count_area_difficulty(area, level) == 0 {
        return Err(ValidationError::NoAreaDifficultyQuestions {
          area: area.clone(),
          difficulty: level,
        });
      }
    }
  }

  Ok(AllocationPlan {
    difficulty: request.difficulty.clone(),
    areas: request
      .areas
      .iter()
      .filter(|(_, &count)| count > 0)
      .map(|(area, &count)| (area.clone(), count))
      .collect(),
  })
}

/// Select questions for a validated plan. Two-phase greedy, no replacement:
///
/// 1. Per area (canonical map order), draw matching questions from
///    difficulties with remaining quota, serving first the difficulties whose
///    quota cannot be covered by questions outside the named areas. Every
///    draw consumes the matching difficulty quota.
/// 2. Per difficulty (canonical order), top up from questions outside the
///    named areas; drawing a named area here would overshoot its exact quota.
///
/// Returned questions are grouped by difficulty in canonical order, area
/// picks before remainder picks, each group in draw order.
pub fn allocate(pool: &QuestionPool, plan: &AllocationPlan) -> Result<Vec<Question>, AllocationError> {
  let questions = pool.questions();
  let named: BTreeSet<&str> = plan.areas.keys().map(String::as_str).collect();

  // Per-difficulty bookkeeping, indexed by canonical rank.
  let mut remaining = [0usize; 4];
  for level in Difficulty::ALL {
    remaining[level as usize] = plan.difficulty.get(level);
  }

  // Questions outside every named area, per difficulty. Phase 1 only draws
  // named-area questions, so these counts stay valid throughout it.
  let mut unconstrained = [0usize; 4];
  for q in questions {
    if !named.contains(q.knowledge_area.as_str()) {
      unconstrained[q.difficulty_level as usize] += 1;
    }
  }

  let mut taken = vec![false; questions.len()];
  let mut area_picks: [Vec<usize>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
  let mut rest_picks: [Vec<usize>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];

  // Phase 1: area-constrained draws.
  for (area, &need) in &plan.areas {
    let mut got = 0;
    for scarce_only in [true, false] {
      for level in Difficulty::ALL {
        while got < need {
          let quota_left = remaining[level as usize];
          if quota_left == 0 {
            break;
          }
          if scarce_only && quota_left <= unconstrained[level as usize] {
            break;
          }
          let next = questions.iter().enumerate().find(|(i, q)| {
            !taken[*i] && q.difficulty_level == level && q.knowledge_area == *area
          });
          let Some((idx, _)) = next else { break };
          taken[idx] = true;
          area_picks[level as usize].push(idx);
          remaining[level as usize] -= 1;
          got += 1;
        }
      }
    }
    if got < need {
      return Err(AllocationError::AreaQuotaUnmet {
        area: area.clone(),
        requested: need,
        obtained: got,
      });
    }
  }

  // Phase 2: per-difficulty remainder from outside the named areas.
  for level in Difficulty::ALL {
    while remaining[level as usize] > 0 {
      let next = questions.iter().enumerate().find(|(i, q)| {
        !taken[*i]
          && q.difficulty_level == level
          && !named.contains(q.knowledge_area.as_str())
      });
      let Some((idx, _)) = next else { break };
      taken[idx] = true;
      rest_picks[level as usize].push(idx);
      remaining[level as usize] -= 1;
    }
    if remaining[level as usize] > 0 {
      let requested = plan.difficulty.get(level);
      return Err(AllocationError::DifficultyQuotaUnmet {
        difficulty: level,
        requested,
        obtained: requested - remaining[level as usize],
      });
    }
  }

  let mut selected = Vec::with_capacity(plan.difficulty.total());
  for level in Difficulty::ALL {
    for &idx in &area_picks[level as usize] {
      selected.push(questions[idx].clone());
    }
    for &idx in &rest_picks[level as usize] {
      selected.push(questions[idx].clone());
    }
  }
  Ok(selected)
}

/// Run validation then allocation and assemble the paper.
pub fn generate_test_paper(
  pool: &QuestionPool,
  course: &Course,
  request: &GenerationRequest,
) -> Result<TestPaper, GenerateError> {
  let plan = validate(pool, request)?;
  let questions = allocate(pool, &plan)?;
  Ok(TestPaper {
    id: Uuid::new_v4().to_string(),
    course_id: course.id.clone(),
    course_name: course.name.clone(),
    created_at: Utc::now(),
    questions,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(id: &str, level: Difficulty, area: &str) -> Question {
    Question {
      id: id.into(),
      course_id: "course-1".into(),
      content: format!("question {id}"),
      difficulty_level: level,
      knowledge_area: area.into(),
    }
  }

  fn course() -> Course {
    Course {
      id: "course-1".into(),
      name: "Introduction to Programming".into(),
      knowledge_areas: vec!["Loops".into(), "Arrays".into(), "Graphs".into()],
    }
  }

  fn dist(easy: usize, medium: usize, hard: usize, very_hard: usize) -> DifficultyDistribution {
    DifficultyDistribution { easy, medium, hard, very_hard }
  }

  fn request(
    difficulty: DifficultyDistribution,
    areas: &[(&str, usize)],
  ) -> GenerationRequest {
    GenerationRequest {
      course_id: "course-1".into(),
      difficulty,
      areas: areas.iter().map(|(a, c)| (a.to_string(), *c)).collect(),
    }
  }

  fn ids(paper: &TestPaper) -> Vec<&str> {
    paper.questions.iter().map(|q| q.id.as_str()).collect()
  }

  #[test]
  fn zero_request_is_rejected() {
    let pool = QuestionPool::new(vec![q("a", Difficulty::Easy, "Loops")]);
    let err = validate(&pool, &request(dist(0, 0, 0, 0), &[])).unwrap_err();
    assert_eq!(err, ValidationError::EmptyRequest);
  }

  #[test]
  fn empty_pool_is_rejected() {
    let pool = QuestionPool::new(vec![]);
    let err = validate(&pool, &request(dist(1, 0, 0, 0), &[])).unwrap_err();
    assert_eq!(
      err,
      ValidationError::NoQuestionsForCourse { course_id: "course-1".into() }
    );
  }

  #[test]
  fn over_request_fails_instead_of_truncating() {
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Easy, "Loops"),
      q("b", Difficulty::Easy, "Loops"),
      q("c", Difficulty::Easy, "Arrays"),
      q("d", Difficulty::Hard, "Arrays"),
    ]);
    let err = validate(&pool, &request(dist(0, 0, 2, 0), &[])).unwrap_err();
    assert_eq!(
      err,
      ValidationError::InsufficientDifficultyCount {
        difficulty: Difficulty::Hard,
        requested: 2,
        available: 1,
      }
    );
  }

  #[test]
  fn named_areas_without_counts_are_rejected() {
    let pool = QuestionPool::new(vec![q("a", Difficulty::Easy, "Loops")]);
    let err = validate(&pool, &request(dist(1, 0, 0, 0), &[("Loops", 0)])).unwrap_err();
    assert_eq!(err, ValidationError::MissingAreaCounts);
  }

  #[test]
  fn empty_area_difficulty_cell_is_rejected() {
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Medium, "Loops"),
      q("b", Difficulty::Easy, "Arrays"),
    ]);
    let err = validate(&pool, &request(dist(0, 1, 0, 0), &[("Graphs", 1)])).unwrap_err();
    assert_eq!(
      err,
      ValidationError::NoAreaDifficultyQuestions {
        area: "Graphs".into(),
        difficulty: Difficulty::Medium,
      }
    );
  }

  #[test]
  fn plan_keeps_positive_area_quotas_only() {
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Easy, "Loops"),
      q("b", Difficulty::Easy, "Arrays"),
    ]);
    let plan = validate(&pool, &request(dist(1, 0, 0, 0), &[("Arrays", 1), ("Loops", 0)]))
      .expect("plan");
    assert_eq!(plan.areas.len(), 1);
    assert_eq!(plan.areas["Arrays"], 1);
  }

  #[test]
  fn mixed_quotas_resolve_with_exact_area_count() {
    // 3 Easy (2 "Loops", 1 "Arrays"), 1 Hard ("Arrays"); Easy:2 + Hard:1
    // with Arrays:1. The Hard quota can only be covered inside "Arrays", so
    // the area draw must land there and leave Easy to the "Loops" questions.
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Easy, "Loops"),
      q("b", Difficulty::Easy, "Loops"),
      q("c", Difficulty::Easy, "Arrays"),
      q("d", Difficulty::Hard, "Arrays"),
    ]);
    let req = request(dist(2, 0, 1, 0), &[("Arrays", 1)]);
    let paper = generate_test_paper(&pool, &course(), &req).expect("paper");

    assert_eq!(paper.questions.len(), 3);
    assert_eq!(ids(&paper), vec!["a", "b", "d"]);
    let arrays = paper
      .questions
      .iter()
      .filter(|q| q.knowledge_area == "Arrays")
      .count();
    assert_eq!(arrays, 1);
  }

  #[test]
  fn remainder_never_overshoots_a_named_area() {
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Easy, "Arrays"),
      q("b", Difficulty::Easy, "Loops"),
      q("c", Difficulty::Easy, "Arrays"),
    ]);
    let req = request(dist(2, 0, 0, 0), &[("Arrays", 1)]);
    let paper = generate_test_paper(&pool, &course(), &req).expect("paper");
    // "c" stays unused even though the Easy quota could take it.
    assert_eq!(ids(&paper), vec!["a", "b"]);
  }

  #[test]
  fn two_areas_meet_exact_quotas_across_difficulties() {
    let pool = QuestionPool::new(vec![
      q("ea", Difficulty::Easy, "A"),
      q("eb", Difficulty::Easy, "B"),
      q("ma", Difficulty::Medium, "A"),
      q("mb", Difficulty::Medium, "B"),
      q("ec", Difficulty::Easy, "C"),
    ]);
    let req = request(dist(2, 2, 0, 0), &[("A", 2), ("B", 2)]);
    let paper = generate_test_paper(&pool, &course(), &req).expect("paper");

    assert_eq!(paper.questions.len(), 4);
    for area in ["A", "B"] {
      let got = paper
        .questions
        .iter()
        .filter(|q| q.knowledge_area == area)
        .count();
      assert_eq!(got, 2, "area {area}");
    }
    // Grouped by difficulty, area picks in area order within each level.
    assert_eq!(ids(&paper), vec!["ea", "eb", "ma", "mb"]);
  }

  #[test]
  fn validator_gap_surfaces_as_area_quota_unmet() {
    // Both areas pass the per-cell existence check, but a single Hard slot
    // cannot serve two area quotas.
    let pool = QuestionPool::new(vec![
      q("x", Difficulty::Hard, "A"),
      q("y", Difficulty::Hard, "B"),
    ]);
    let req = request(dist(0, 0, 1, 0), &[("A", 1), ("B", 1)]);
    let plan = validate(&pool, &req).expect("validation passes despite the joint conflict");
    let err = allocate(&pool, &plan).unwrap_err();
    assert_eq!(
      err,
      AllocationError::AreaQuotaUnmet {
        area: "B".into(),
        requested: 1,
        obtained: 0,
      }
    );
  }

  #[test]
  fn exhausted_remainder_surfaces_as_difficulty_quota_unmet() {
    // Every Easy question is inside the named area; the second Easy slot has
    // nowhere to draw from without overshooting the area quota.
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Easy, "Arrays"),
      q("b", Difficulty::Easy, "Arrays"),
    ]);
    let req = request(dist(2, 0, 0, 0), &[("Arrays", 1)]);
    let plan = validate(&pool, &req).expect("plan");
    let err = allocate(&pool, &plan).unwrap_err();
    assert_eq!(
      err,
      AllocationError::DifficultyQuotaUnmet {
        difficulty: Difficulty::Easy,
        requested: 2,
        obtained: 1,
      }
    );
  }

  #[test]
  fn conservation_no_duplicates_and_course_fields() {
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Easy, "Loops"),
      q("b", Difficulty::Medium, "Loops"),
      q("c", Difficulty::Hard, "Arrays"),
      q("d", Difficulty::VeryHard, "Graphs"),
    ]);
    let req = request(dist(1, 1, 1, 1), &[]);
    let paper = generate_test_paper(&pool, &course(), &req).expect("paper");

    assert_eq!(paper.questions.len(), req.difficulty.total());
    let mut seen: Vec<&str> = ids(&paper);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), paper.questions.len());
    assert!(paper.questions.iter().all(|q| q.course_id == "course-1"));
    assert_eq!(paper.course_name, "Introduction to Programming");
  }

  #[test]
  fn identical_inputs_give_identical_selection() {
    let pool = QuestionPool::new(vec![
      q("a", Difficulty::Easy, "Loops"),
      q("b", Difficulty::Easy, "Loops"),
      q("c", Difficulty::Easy, "Arrays"),
      q("d", Difficulty::Hard, "Arrays"),
      q("e", Difficulty::Hard, "Loops"),
    ]);
    let req = request(dist(2, 0, 1, 0), &[("Arrays", 1)]);
    let first = generate_test_paper(&pool, &course(), &req).expect("paper");
    let second = generate_test_paper(&pool, &course(), &req).expect("paper");
    assert_eq!(ids(&first), ids(&second));
  }

  #[test]
  fn insertion_order_breaks_ties() {
    let pool = QuestionPool::new(vec![
      q("first", Difficulty::Easy, "Loops"),
      q("second", Difficulty::Easy, "Loops"),
    ]);
    let req = request(dist(1, 0, 0, 0), &[]);
    let paper = generate_test_paper(&pool, &course(), &req).expect("paper");
    assert_eq!(ids(&paper), vec!["first"]);
  }
}
