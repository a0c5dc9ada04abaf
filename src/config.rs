//! Loading the question bank (courses + questions) from TOML.
//!
//! See `BankConfig` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Difficulty;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub courses: Vec<CourseCfg>,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Course entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct CourseCfg {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub knowledge_areas: Vec<String>,
}

/// Question entry accepted in TOML configuration. `id` is optional; a UUID is
/// assigned when absent.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)]
  pub id: Option<String>,
  pub course_id: String,
  pub content: String,
  pub difficulty_level: Difficulty,
  pub knowledge_area: String,
}

/// Attempt to load `BankConfig` from BANK_CONFIG_PATH. On any parsing/IO
/// error, returns None and the built-in seed bank is used alone.
pub fn load_bank_config_from_env() -> Option<BankConfig> {
  let path = std::env::var("BANK_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "questionbank_backend", %path, courses = cfg.courses.len(), questions = cfg.questions.len(), "Loaded question bank (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "questionbank_backend", %path, error = %e, "Failed to parse TOML bank config");
        None
      }
    },
    Err(e) => {
      error!(target: "questionbank_backend", %path, error = %e, "Failed to read TOML bank config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_a_minimal_bank() {
    let cfg: BankConfig = toml::from_str(
      r#"
        [[courses]]
        id = "crs-1"
        name = "Algorithms"
        knowledge_areas = ["Sorting", "Graphs"]

        [[questions]]
        course_id = "crs-1"
        content = "Explain quicksort's average-case complexity."
        difficulty_level = "Medium"
        knowledge_area = "Sorting"

        [[questions]]
        id = "q-fixed"
        course_id = "crs-1"
        content = "Prove Dijkstra's algorithm correct."
        difficulty_level = "Very Hard"
        knowledge_area = "Graphs"
      "#,
    )
    .expect("toml");

    assert_eq!(cfg.courses.len(), 1);
    assert_eq!(cfg.questions.len(), 2);
    assert_eq!(cfg.questions[0].difficulty_level, Difficulty::Medium);
    assert_eq!(cfg.questions[1].id.as_deref(), Some("q-fixed"));
    assert_eq!(cfg.questions[1].difficulty_level, Difficulty::VeryHard);
  }
}
