//! Read-only view over one course's questions.
//!
//! A `QuestionPool` is an owned snapshot taken from the app state at the
//! start of a request: questions stay in pool insertion order, which is the
//! tie-break order the allocator relies on. Cloning the questions out keeps
//! the engine a pure function of plain data even if other requests touch the
//! bank concurrently.

use std::collections::BTreeMap;

use crate::domain::{Difficulty, Question};

#[derive(Clone, Debug)]
pub struct QuestionPool {
  questions: Vec<Question>,
}

impl QuestionPool {
  /// Build a pool from questions already filtered to a single course,
  /// in insertion order.
  pub fn new(questions: Vec<Question>) -> Self {
    Self { questions }
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }

  /// All questions in insertion order.
  pub fn questions(&self) -> &[Question] {
    &self.questions
  }

  /// How many questions carry the given difficulty, regardless of area.
  pub fn count_by_difficulty(&self, level: Difficulty) -> usize {
    self
      .questions
      .iter()
      .filter(|q| q.difficulty_level == level)
      .count()
  }

  /// How many questions match both the area and the difficulty.
  /// An unknown area is simply zero matches.
  pub fn count_area_difficulty(&self, area: &str, level: Difficulty) -> usize {
    self
      .questions
      .iter()
      .filter(|q| q.knowledge_area == area && q.difficulty_level == level)
      .count()
  }

  /// Per-difficulty counts, all four levels present (zeros included).
  pub fn difficulty_stats(&self) -> BTreeMap<Difficulty, usize> {
    let mut stats: BTreeMap<Difficulty, usize> = Difficulty::ALL.iter().map(|d| (*d, 0)).collect();
    for q in &self.questions {
      *stats.entry(q.difficulty_level).or_insert(0) += 1;
    }
    stats
  }

  /// Per-area counts. Declared areas are listed even when empty so the
  /// caller's selector can offer them; areas observed only on questions
  /// (course/area mismatches) are counted too.
  pub fn knowledge_area_stats(&self, declared_areas: &[String]) -> BTreeMap<String, usize> {
    let mut stats: BTreeMap<String, usize> =
      declared_areas.iter().map(|a| (a.clone(), 0)).collect();
    for q in &self.questions {
      *stats.entry(q.knowledge_area.clone()).or_insert(0) += 1;
    }
    stats
  }
}
