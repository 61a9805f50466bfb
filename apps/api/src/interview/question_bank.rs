//! Question bank — the deduplicated pool of questions generated once per session.

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use super::models::Question;

/// Default cap on the number of questions kept from generation.
pub const DEFAULT_BANK_SIZE: usize = 15;

/// Lines whose trimmed length is at or below this are treated as noise.
const MIN_QUESTION_CHARS: usize = 10;

const FALLBACK_QUESTIONS: [&str; 5] = [
    "Explain the difference between VLOOKUP and INDEX-MATCH functions.",
    "How would you remove duplicates from a large dataset in Excel?",
    "Describe how to create a dynamic chart that updates automatically.",
    "What are the key benefits of using Pivot Tables for data analysis?",
    "How do you use conditional formatting to highlight specific data patterns?",
];

static ENUMERATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid enumeration regex"));

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    asked: HashSet<Question>,
}

impl QuestionBank {
    /// Builds a bank from raw model output. Never fails: output with no usable
    /// lines yields the built-in fallback bank.
    pub fn initialize(raw_text: &str, cap: usize) -> Self {
        let mut seen = HashSet::new();
        let questions: Vec<Question> = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| line.chars().count() > MIN_QUESTION_CHARS)
            .map(|line| ENUMERATION_MARKER.replace(line, "").trim().to_string())
            .filter(|q| !q.is_empty() && seen.insert(q.clone()))
            .take(cap)
            .collect();

        if questions.is_empty() {
            return Self::fallback();
        }

        Self {
            questions,
            asked: HashSet::new(),
        }
    }

    /// The fixed built-in bank used when generation yields nothing usable.
    pub fn fallback() -> Self {
        Self {
            questions: FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            asked: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Picks uniformly among questions not yet asked in the current cycle and
    /// marks the pick as asked. Once every question has been asked, a new cycle
    /// begins over the full pool.
    pub fn pick_unused<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Question {
        if self.asked.len() >= self.questions.len() {
            self.asked.clear();
        }

        let available: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| !self.asked.contains(*q))
            .collect();

        // The bank is never empty, so `available` is non-empty after the reset above.
        let question = available
            .choose(rng)
            .map(|q| (*q).clone())
            .unwrap_or_else(|| self.questions[0].clone());

        self.asked.insert(question.clone());
        question
    }
}
