//! Built-in seed content so the app is useful without any external config.

use crate::domain::{Course, Difficulty, Question};

/// Default courses with their declared knowledge areas.
pub fn seed_courses() -> Vec<Course> {
  vec![
    Course {
      id: "crs-101".into(),
      name: "Introduction to Programming".into(),
      knowledge_areas: vec![
        "Loops".into(),
        "Arrays".into(),
        "Functions".into(),
        "Recursion".into(),
      ],
    },
    Course {
      id: "crs-201".into(),
      name: "Data Structures".into(),
      knowledge_areas: vec![
        "Stacks".into(),
        "Queues".into(),
        "Trees".into(),
        "Graphs".into(),
      ],
    },
  ]
}

/// Minimal question bank covering every difficulty in both seed courses.
pub fn seed_questions() -> Vec<Question> {
  fn q(id: &str, course_id: &str, content: &str, level: Difficulty, area: &str) -> Question {
    Question {
      id: id.into(),
      course_id: course_id.into(),
      content: content.into(),
      difficulty_level: level,
      knowledge_area: area.into(),
    }
  }

  vec![
    q("q101", "crs-101", "Write a for loop that prints the numbers 1 through 10.", Difficulty::Easy, "Loops"),
    q("q102", "crs-101", "What does a while loop do when its condition is false on entry?", Difficulty::Easy, "Loops"),
    q("q103", "crs-101", "Declare an array of five integers and read its third element.", Difficulty::Easy, "Arrays"),
    q("q104", "crs-101", "Rewrite a given nested loop so it stops after the first match.", Difficulty::Medium, "Loops"),
    q("q105", "crs-101", "Write a function that returns the larger of two numbers.", Difficulty::Medium, "Functions"),
    q("q106", "crs-101", "Reverse an array in place without allocating a second array.", Difficulty::Hard, "Arrays"),
    q("q107", "crs-101", "Implement binary search over a sorted array and state its invariant.", Difficulty::Hard, "Arrays"),
    q("q108", "crs-101", "Write a recursive function computing the n-th Fibonacci number and discuss its cost.", Difficulty::Hard, "Recursion"),
    q("q109", "crs-101", "Convert a given tail-recursive function into an iterative one and argue equivalence.", Difficulty::VeryHard, "Recursion"),
    q("q201", "crs-201", "Push three values onto a stack and state the pop order.", Difficulty::Easy, "Stacks"),
    q("q202", "crs-201", "Explain the difference between a queue and a stack.", Difficulty::Easy, "Queues"),
    q("q203", "crs-201", "Implement a queue using two stacks.", Difficulty::Medium, "Queues"),
    q("q204", "crs-201", "Write an in-order traversal of a binary tree.", Difficulty::Medium, "Trees"),
    q("q205", "crs-201", "Balance an unbalanced binary search tree and give the resulting height.", Difficulty::Hard, "Trees"),
    q("q206", "crs-201", "Detect a cycle in a directed graph.", Difficulty::Hard, "Graphs"),
    q("q207", "crs-201", "Prove that a graph with n nodes and n edges contains at least one cycle.", Difficulty::VeryHard, "Graphs"),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_questions_reference_seeded_courses_and_areas() {
    let courses = seed_courses();
    for q in seed_questions() {
      let course = courses
        .iter()
        .find(|c| c.id == q.course_id)
        .unwrap_or_else(|| panic!("unknown course {}", q.course_id));
      assert!(
        course.knowledge_areas.contains(&q.knowledge_area),
        "question {} uses undeclared area {}",
        q.id,
        q.knowledge_area
      );
    }
  }

  #[test]
  fn every_difficulty_is_represented_per_course() {
    let questions = seed_questions();
    for course_id in ["crs-101", "crs-201"] {
      for level in Difficulty::ALL {
        assert!(
          questions
            .iter()
            .any(|q| q.course_id == course_id && q.difficulty_level == level),
          "course {course_id} missing a {level} question"
        );
      }
    }
  }
}
