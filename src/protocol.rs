//! Public request/response structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Courses, questions and test papers go over the wire in their domain
//! serialization (the field names the original frontend used), so only the
//! inputs and the small envelope types live here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Difficulty;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(rename = "courseId")]
    pub course_id: String,
}

/// Bank search filters; every field is optional and they combine
/// conjunctively.
#[derive(Debug, Deserialize)]
pub struct SearchIn {
    #[serde(rename = "courseId")]
    pub course_id: Option<String>,
    #[serde(rename = "difficultyLevel")]
    pub difficulty_level: Option<Difficulty>,
    #[serde(rename = "knowledgeAreas", default)]
    pub knowledge_areas: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsOut {
    #[serde(rename = "difficultyStats")]
    pub difficulty_stats: BTreeMap<Difficulty, usize>,
    #[serde(rename = "knowledgeAreaStats")]
    pub knowledge_area_stats: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct DeleteOut {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
