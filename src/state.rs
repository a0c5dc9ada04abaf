//! Application state: course map, question bank, and the test-paper history.
//!
//! This module owns:
//!   - the courses and the question bank (loaded once at startup from the
//!     optional TOML bank plus built-in seeds, read-only afterwards)
//!   - the per-course index that preserves question insertion order, which is
//!     what makes paper generation deterministic
//!   - the test-paper history, the only shared mutable resource; when
//!     PAPERS_PATH is set the whole collection is rewritten to that JSON file
//!     on every add/delete and loaded back at startup

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_bank_config_from_env, BankConfig};
use crate::domain::{Course, Difficulty, Question, TestPaper};
use crate::pool::QuestionPool;
use crate::seeds::{seed_courses, seed_questions};

#[derive(Clone)]
pub struct AppState {
    courses: HashMap<String, Course>,
    questions: Vec<Question>,
    by_course: HashMap<String, Vec<usize>>,
    papers: Arc<RwLock<Vec<TestPaper>>>,
    papers_path: Option<PathBuf>,
}

impl AppState {
    /// Build state from env: load the TOML bank if configured, merge the
    /// built-in seeds, build indices, and load any persisted paper history.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_bank_config_from_env();
        let papers_path = std::env::var("PAPERS_PATH").ok().map(PathBuf::from);
        Self::with_bank(cfg, papers_path)
    }

    /// Build state from explicit parts. `new()` and the tests both go
    /// through here.
    pub fn with_bank(cfg: Option<BankConfig>, papers_path: Option<PathBuf>) -> Self {
        let mut courses = HashMap::<String, Course>::new();
        let mut questions = Vec::<Question>::new();
        let mut by_course = HashMap::<String, Vec<usize>>::new();
        let mut seen_ids = HashSet::<String>::new();

        // Config-based courses first.
        if let Some(cfg) = &cfg {
            for cc in &cfg.courses {
                courses.insert(
                    cc.id.clone(),
                    Course {
                        id: cc.id.clone(),
                        name: cc.name.clone(),
                        knowledge_areas: cc.knowledge_areas.clone(),
                    },
                );
            }
        }
        // Always add built-in seed courses, but don't overwrite existing ids.
        for c in seed_courses() {
            courses.entry(c.id.clone()).or_insert(c);
        }

        let mut insert = |q: Question,
                          questions: &mut Vec<Question>,
                          by_course: &mut HashMap<String, Vec<usize>>| {
            if !seen_ids.insert(q.id.clone()) {
                warn!(target: "bank", id = %q.id, "Skipping duplicate question id");
                return;
            }
            let course = match courses.get(&q.course_id) {
                Some(c) => c,
                None => {
                    error!(target: "bank", id = %q.id, course = %q.course_id, "Skipping question: unknown course");
                    return;
                }
            };
            if !course.knowledge_areas.contains(&q.knowledge_area) {
                // Tolerated: such a question simply never matches an
                // area-constrained request for its declared areas.
                warn!(target: "bank", id = %q.id, course = %q.course_id, area = %q.knowledge_area, "Question area not declared by its course");
            }
            by_course
                .entry(q.course_id.clone())
                .or_default()
                .push(questions.len());
            questions.push(q);
        };

        // Config-based questions first, seeds after (no overwrites).
        if let Some(cfg) = &cfg {
            for qc in &cfg.questions {
                let q = Question {
                    id: qc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
                    course_id: qc.course_id.clone(),
                    content: qc.content.clone(),
                    difficulty_level: qc.difficulty_level,
                    knowledge_area: qc.knowledge_area.clone(),
                };
                insert(q, &mut questions, &mut by_course);
            }
        }
        for q in seed_questions() {
            insert(q, &mut questions, &mut by_course);
        }

        // Startup inventory summary per course.
        for (course_id, idxs) in &by_course {
            let mut counts: HashMap<Difficulty, usize> = HashMap::new();
            for &i in idxs {
                *counts.entry(questions[i].difficulty_level).or_insert(0) += 1;
            }
            info!(
                target: "bank",
                %course_id,
                total = idxs.len(),
                easy = counts.get(&Difficulty::Easy).copied().unwrap_or(0),
                medium = counts.get(&Difficulty::Medium).copied().unwrap_or(0),
                hard = counts.get(&Difficulty::Hard).copied().unwrap_or(0),
                very_hard = counts.get(&Difficulty::VeryHard).copied().unwrap_or(0),
                "Startup question inventory"
            );
        }

        let papers = load_persisted_papers(papers_path.as_deref());
        info!(target: "paper", count = papers.len(), persisted = papers_path.is_some(), "Test paper history ready");

        Self {
            courses,
            questions,
            by_course,
            papers: Arc::new(RwLock::new(papers)),
            papers_path,
        }
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    /// All courses, sorted by id for stable listings.
    pub fn courses(&self) -> Vec<Course> {
        let mut out: Vec<Course> = self.courses.values().cloned().collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Copy-on-read snapshot of one course's questions, insertion order kept.
    /// Unknown course ids yield an empty pool, never an error.
    pub fn pool_for_course(&self, course_id: &str) -> QuestionPool {
        let questions = self
            .by_course
            .get(course_id)
            .map(|idxs| idxs.iter().map(|&i| self.questions[i].clone()).collect())
            .unwrap_or_default();
        QuestionPool::new(questions)
    }

    /// Conjunctive optional filters over the whole bank; an absent filter
    /// matches everything for that dimension.
    pub fn search_questions(
        &self,
        course_id: Option<&str>,
        difficulty_level: Option<Difficulty>,
        knowledge_areas: &[String],
    ) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| course_id.map_or(true, |c| q.course_id == c))
            .filter(|q| difficulty_level.map_or(true, |d| q.difficulty_level == d))
            .filter(|q| knowledge_areas.is_empty() || knowledge_areas.contains(&q.knowledge_area))
            .cloned()
            .collect()
    }

    /// Read-only access to the paper history, newest last.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_papers(&self) -> Vec<TestPaper> {
        self.papers.read().await.clone()
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_paper(&self, id: &str) -> Option<TestPaper> {
        self.papers.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// Append a paper and rewrite the persisted collection.
    #[instrument(level = "info", skip(self, paper), fields(id = %paper.id))]
    pub async fn add_paper(&self, paper: TestPaper) {
        let mut papers = self.papers.write().await;
        papers.push(paper);
        self.persist_papers(&papers);
    }

    /// Remove a paper by id; true if something was deleted.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn delete_paper(&self, id: &str) -> bool {
        let mut papers = self.papers.write().await;
        let before = papers.len();
        papers.retain(|p| p.id != id);
        let removed = papers.len() != before;
        if removed {
            self.persist_papers(&papers);
        }
        removed
    }

    /// Full rewrite of the persisted collection. Failures are logged and the
    /// in-memory history stays authoritative for the process lifetime.
    fn persist_papers(&self, papers: &[TestPaper]) {
        let Some(path) = &self.papers_path else { return };
        match serde_json::to_string_pretty(papers) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    error!(target: "paper", path = %path.display(), error = %e, "Failed to persist test papers");
                }
            }
            Err(e) => {
                error!(target: "paper", error = %e, "Failed to serialize test papers");
            }
        }
    }
}

fn load_persisted_papers(path: Option<&std::path::Path>) -> Vec<TestPaper> {
    let Some(path) = path else { return Vec::new() };
    match std::fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str::<Vec<TestPaper>>(&s) {
            Ok(papers) => {
                info!(target: "paper", path = %path.display(), count = papers.len(), "Loaded persisted test papers");
                papers
            }
            Err(e) => {
                error!(target: "paper", path = %path.display(), error = %e, "Failed to parse persisted test papers; starting empty");
                Vec::new()
            }
        },
        // Missing file is the normal first run.
        Err(_) => Vec::new(),
    }
}
