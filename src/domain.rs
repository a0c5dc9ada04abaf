//! Domain models used by the backend: difficulty levels, questions, courses,
//! requested distributions, and generated test papers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed, ordered difficulty scale. Declaration order is the canonical order
/// used everywhere a difficulty sequence matters (allocation, paper assembly,
/// stats output).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
  #[serde(rename = "Very Hard")]
  VeryHard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 4] = [
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::VeryHard,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
      Difficulty::VeryHard => "Very Hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single question in the bank. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  #[serde(rename = "courseId")]
  pub course_id: String,
  pub content: String,
  #[serde(rename = "difficultyLevel")]
  pub difficulty_level: Difficulty,
  #[serde(rename = "knowledgeArea")]
  pub knowledge_area: String,
}

/// A course and the knowledge-area labels valid for it. A question tagged
/// with an undeclared area is tolerated (it counts as zero matches for that
/// area), never fatal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
  pub id: String,
  pub name: String,
  #[serde(rename = "knowledgeAreas")]
  pub knowledge_areas: Vec<String>,
}

/// Requested question counts per difficulty. All four levels are always
/// present; a missing field on the wire means 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyDistribution {
  #[serde(rename = "Easy", default)]
  pub easy: usize,
  #[serde(rename = "Medium", default)]
  pub medium: usize,
  #[serde(rename = "Hard", default)]
  pub hard: usize,
  #[serde(rename = "Very Hard", default)]
  pub very_hard: usize,
}

impl DifficultyDistribution {
  pub fn get(&self, level: Difficulty) -> usize {
    match level {
      Difficulty::Easy => self.easy,
      Difficulty::Medium => self.medium,
      Difficulty::Hard => self.hard,
      Difficulty::VeryHard => self.very_hard,
    }
  }

  pub fn total(&self) -> usize {
    self.easy + self.medium + self.hard + self.very_hard
  }
}

/// Requested question counts per knowledge area. Only areas the caller named
/// appear; absence means "unconstrained", not zero. The BTreeMap pins area
/// iteration to a canonical sort so allocation stays deterministic.
pub type KnowledgeAreaDistribution = BTreeMap<String, usize>;

/// The engine's sole input: which course to draw from and the two
/// distributions to honor simultaneously.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerationRequest {
  #[serde(rename = "courseId")]
  pub course_id: String,
  #[serde(rename = "difficultyDistribution", default)]
  pub difficulty: DifficultyDistribution,
  #[serde(rename = "knowledgeAreaDistribution", default)]
  pub areas: KnowledgeAreaDistribution,
}

/// A generated test paper. Created once by the sampler on success, immutable
/// thereafter; deleted only through the history store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestPaper {
  pub id: String,
  #[serde(rename = "courseId")]
  pub course_id: String,
  #[serde(rename = "courseName")]
  pub course_name: String,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  pub questions: Vec<Question>,
}
