//! Interview session — the state machine driving one candidate's interview.
//!
//! Lifecycle: NotStarted → Introduction → Questioning → Completed.
//! Each public operation handles one external event to completion and returns the
//! transcript entries it appended. Model calls are the only suspension points, and
//! every model failure degrades to fixed content, so a session can always complete.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::evaluator::evaluate;
use super::models::{AnswerRecord, Question};
use super::prompts::build_question_bank_prompt;
use super::question_bank::{QuestionBank, DEFAULT_BANK_SIZE};
use super::report::{aggregate, Report, ScoreSummary};
use super::transcript::{EntryKind, Speaker, Transcript, TranscriptEntry};
use crate::llm_client::TextGenerator;

pub const DEFAULT_TARGET_QUESTION_COUNT: u32 = 5;

pub const EMPTY_ANSWER_REPROMPT: &str = "Please provide a response to continue with the interview.";
pub const NOTHING_TO_EVALUATE: &str = "Interview completed. No responses to evaluate.";

/// Per-session knobs, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub target_question_count: u32,
    pub question_bank_size: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            target_question_count: DEFAULT_TARGET_QUESTION_COUNT,
            question_bank_size: DEFAULT_BANK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Introduction,
    Questioning,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Introduction => write!(f, "in introduction"),
            Self::Questioning => write!(f, "in progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while the interview is {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },

    #[error("no open question to answer")]
    NoOpenQuestion,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The answer was blank; nothing changed.
    Reprompt { message: String },
    /// The answer was recorded; these entries were appended.
    Accepted { entries: Vec<TranscriptEntry> },
}

pub struct InterviewSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    settings: SessionSettings,
    phase: Phase,
    question_count: u32,
    answers: Vec<AnswerRecord>,
    transcript: Transcript,
    bank: Option<QuestionBank>,
    report: Option<Report>,
    rng: StdRng,
}

impl InterviewSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_rng(Uuid::new_v4(), settings, StdRng::from_entropy())
    }

    /// Builds a session with an explicit id and random source (seed it for determinism).
    pub fn with_rng(id: Uuid, settings: SessionSettings, rng: StdRng) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            settings,
            phase: Phase::NotStarted,
            question_count: 0,
            answers: Vec::new(),
            transcript: Transcript::new(),
            bank: None,
            report: None,
            rng,
        }
    }

    /// A fresh, not-yet-started session under the same id and settings.
    pub fn restarted(&self) -> Self {
        Self::with_rng(self.id, self.settings, StdRng::from_entropy())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn target_question_count(&self) -> u32 {
        self.settings.target_question_count
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn bank(&self) -> Option<&QuestionBank> {
        self.bank.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Generates the question bank, introduces the interview and asks the first question.
    pub async fn start(&mut self, llm: &dyn TextGenerator) -> Result<Vec<TranscriptEntry>, SessionError> {
        if self.phase != Phase::NotStarted {
            return Err(SessionError::InvalidPhase {
                action: "start",
                phase: self.phase,
            });
        }

        let mark = self.transcript.len();
        self.phase = Phase::Introduction;
        info!("Interview {} starting", self.id);

        self.bank = Some(self.generate_bank(llm).await);
        let intro = introduction_message(self.settings.target_question_count);
        self.transcript
            .append(Speaker::System, EntryKind::Introduction, intro);

        self.ask_next(llm).await;

        Ok(self.transcript.since(mark))
    }

    /// Records and evaluates an answer to the open question, then moves on.
    pub async fn submit(
        &mut self,
        answer_text: &str,
        llm: &dyn TextGenerator,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.phase != Phase::Questioning {
            return Err(SessionError::InvalidPhase {
                action: "submit an answer",
                phase: self.phase,
            });
        }

        if answer_text.trim().is_empty() {
            return Ok(SubmitOutcome::Reprompt {
                message: EMPTY_ANSWER_REPROMPT.to_string(),
            });
        }

        let question = self
            .transcript
            .last_question()
            .cloned()
            .ok_or(SessionError::NoOpenQuestion)?;

        let mark = self.transcript.len();
        self.transcript
            .append(Speaker::Candidate, EntryKind::Answer, answer_text);

        info!(
            "Interview {}: evaluating answer {}/{} ({} chars)",
            self.id,
            self.question_count,
            self.settings.target_question_count,
            answer_text.chars().count()
        );
        let (evaluation, evaluation_source) = evaluate(llm, &question, answer_text).await;

        let feedback = format!(
            "Quick Feedback:\n\nScore: {}/10\n\n{}",
            evaluation.overall_score, evaluation.feedback
        );
        self.answers.push(AnswerRecord {
            question,
            response_text: answer_text.to_string(),
            evaluation,
            evaluation_source,
        });
        self.transcript
            .append(Speaker::System, EntryKind::Feedback, feedback);

        if self.question_count < self.settings.target_question_count {
            self.ask_next(llm).await;
        } else {
            self.conclude(llm).await;
        }

        Ok(SubmitOutcome::Accepted {
            entries: self.transcript.since(mark),
        })
    }

    /// Ends the interview and produces the final report. Idempotent: a completed
    /// session appends nothing and does not aggregate again.
    pub async fn conclude(&mut self, llm: &dyn TextGenerator) -> Vec<TranscriptEntry> {
        if self.phase == Phase::Completed {
            return Vec::new();
        }

        let mark = self.transcript.len();
        match ScoreSummary::from_answers(&self.answers) {
            None => {
                self.transcript
                    .append(Speaker::System, EntryKind::Notice, NOTHING_TO_EVALUATE);
            }
            Some(summary) => {
                let report = aggregate(summary, &self.answers, llm).await;
                self.transcript
                    .append(Speaker::System, EntryKind::Report, report.text.clone());
                self.report = Some(report);
            }
        }

        self.phase = Phase::Completed;
        info!(
            "Interview {} completed with {} answers",
            self.id,
            self.answers.len()
        );

        self.transcript.since(mark)
    }

    /// Plain-text transcript for download.
    pub fn export_transcript(&self) -> String {
        self.transcript.export_text()
    }

    /// Asks an unused question, or concludes once the target is reached.
    async fn ask_next(&mut self, llm: &dyn TextGenerator) {
        if self.question_count >= self.settings.target_question_count {
            self.conclude(llm).await;
            return;
        }

        let question: Question = self
            .bank
            .get_or_insert_with(QuestionBank::fallback)
            .pick_unused(&mut self.rng);
        self.question_count += 1;
        self.phase = Phase::Questioning;

        let text = format!(
            "Question {}/{}:\n\n{}",
            self.question_count, self.settings.target_question_count, question
        );
        self.transcript
            .append(Speaker::System, EntryKind::Question { question }, text);
    }

    async fn generate_bank(&self, llm: &dyn TextGenerator) -> QuestionBank {
        let prompt = build_question_bank_prompt(self.settings.question_bank_size);
        match llm.generate(&prompt).await {
            Ok(raw) => {
                let bank = QuestionBank::initialize(&raw, self.settings.question_bank_size);
                info!("Interview {}: question bank holds {} questions", self.id, bank.len());
                bank
            }
            Err(e) => {
                warn!("Question generation failed, using built-in questions: {e}");
                QuestionBank::fallback()
            }
        }
    }
}

fn introduction_message(total: u32) -> String {
    format!(
        "Hello! I'm your AI Excel Interview Assistant. I'll be conducting a structured interview \
         to assess your Microsoft Excel skills.\n\n\
         Here's how this will work:\n\
         • I'll ask you {total} questions covering different Excel topics\n\
         • Please provide detailed answers explaining your approach\n\
         • After each response, I'll give you brief feedback\n\
         • At the end, you'll receive a comprehensive evaluation report\n\n\
         Let's start with your first question!"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::interview::models::{Evaluation, EvaluationSource};
    use crate::interview::test_support::{evaluation_json, ScriptedGenerator};

    const FALLBACK_FIRST: &str = "Explain the difference between VLOOKUP and INDEX-MATCH functions.";

    fn session(target: u32) -> InterviewSession {
        InterviewSession::with_rng(
            Uuid::new_v4(),
            SessionSettings {
                target_question_count: target,
                question_bank_size: 15,
            },
            StdRng::seed_from_u64(11),
        )
    }

    fn bank_text(n: usize) -> String {
        (1..=n)
            .map(|i| format!("{i}. Generated Excel question number {i}?"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_start_introduces_and_asks_first_question() {
        let llm = ScriptedGenerator::replies([bank_text(15)]);
        let mut session = session(5);

        let delta = session.start(&llm).await.unwrap();

        assert_eq!(session.phase(), Phase::Questioning);
        assert_eq!(session.question_count(), 1);
        assert_eq!(session.bank().unwrap().len(), 15);
        assert_eq!(delta.len(), 2);
        assert_eq!(delta[0].kind, EntryKind::Introduction);
        assert!(delta[0].text.contains("I'll ask you 5 questions"));
        assert!(delta[1].text.starts_with("Question 1/5:\n\n"));
        assert!(matches!(delta[1].kind, EntryKind::Question { .. }));
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let llm = ScriptedGenerator::replies([bank_text(5)]);
        let mut session = session(5);
        session.start(&llm).await.unwrap();

        let err = session.start(&llm).await.unwrap_err();

        assert_eq!(
            err,
            SessionError::InvalidPhase {
                action: "start",
                phase: Phase::Questioning
            }
        );
    }

    #[tokio::test]
    async fn test_empty_answer_reprompts_without_state_change() {
        let llm = ScriptedGenerator::replies([bank_text(15)]);
        let mut session = session(5);
        session.start(&llm).await.unwrap();
        let transcript_len = session.transcript().len();

        for blank in ["", "   \n\t"] {
            let outcome = session.submit(blank, &llm).await.unwrap();
            assert_eq!(
                outcome,
                SubmitOutcome::Reprompt {
                    message: EMPTY_ANSWER_REPROMPT.to_string()
                }
            );
        }

        assert_eq!(session.phase(), Phase::Questioning);
        assert_eq!(session.question_count(), 1);
        assert!(session.answers().is_empty());
        assert_eq!(session.transcript().len(), transcript_len);
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_records_answer_against_open_question() {
        let llm = ScriptedGenerator::replies([bank_text(15), evaluation_json(8)]);
        let mut session = session(5);
        session.start(&llm).await.unwrap();
        let asked = session.transcript().last_question().cloned().unwrap();

        let outcome = session.submit("Use =SUM(A1:A10)", &llm).await.unwrap();

        let SubmitOutcome::Accepted { entries } = outcome else {
            panic!("answer should be accepted");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].speaker, Speaker::Candidate);
        assert_eq!(entries[0].text, "Use =SUM(A1:A10)");
        assert!(entries[1].text.contains("Score: 8/10"));
        assert!(entries[2].text.starts_with("Question 2/5:"));

        let record = &session.answers()[0];
        assert_eq!(record.question, asked);
        assert_eq!(record.evaluation.overall_score, 8);
        assert_eq!(record.evaluation_source, EvaluationSource::Model);
        assert!(llm.prompts()[1].contains(&format!("Question: {asked}")));
    }

    #[tokio::test]
    async fn test_failing_model_still_completes_with_default_scores() {
        let llm = ScriptedGenerator::failing();
        let mut session = session(5);
        session.start(&llm).await.unwrap();

        let mut counts = vec![session.question_count()];
        for i in 0..5 {
            session.submit(&format!("answer {i}"), &llm).await.unwrap();
            counts.push(session.question_count());
        }

        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.answers().len(), 5);
        assert!(session
            .answers()
            .iter()
            .all(|a| a.evaluation == Evaluation::unreachable_default()));
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        assert!(counts.iter().all(|c| *c <= 5));

        let report = session.report().unwrap();
        assert_eq!(report.summary.overall_mean, 5.0);
        assert!(report.narrative.is_none());
        assert_eq!(
            session.transcript().entries().last().map(|e| &e.kind),
            Some(&EntryKind::Report)
        );
    }

    #[tokio::test]
    async fn test_empty_bank_generation_only_issues_fallback_questions() {
        let llm = ScriptedGenerator::replies([""]);
        let mut session = session(5);
        session.start(&llm).await.unwrap();
        for i in 0..5 {
            session.submit(&format!("answer {i}"), &llm).await.unwrap();
        }

        let fallback: HashSet<String> = QuestionBank::fallback().questions().iter().cloned().collect();
        let asked: HashSet<String> = session.answers().iter().map(|a| a.question.clone()).collect();
        assert_eq!(asked, fallback);
        assert!(fallback.contains(FALLBACK_FIRST));
    }

    #[tokio::test]
    async fn test_questions_do_not_repeat_before_bank_is_exhausted() {
        let mut replies = vec![bank_text(8)];
        replies.extend((0..8).map(|_| evaluation_json(7)));
        replies.push("Narrative".to_string());
        let llm = ScriptedGenerator::replies(replies);
        let mut session = session(8);
        session.start(&llm).await.unwrap();
        for i in 0..8 {
            session.submit(&format!("answer {i}"), &llm).await.unwrap();
        }

        let unique: HashSet<&String> = session.answers().iter().map(|a| &a.question).collect();
        assert_eq!(unique.len(), 8);
        assert_eq!(session.report().unwrap().narrative.as_deref(), Some("Narrative"));
    }

    #[tokio::test]
    async fn test_conclude_is_idempotent() {
        let llm = ScriptedGenerator::replies([bank_text(15), evaluation_json(9), "Narrative".to_string()]);
        let mut session = session(5);
        session.start(&llm).await.unwrap();
        session.submit("An answer", &llm).await.unwrap();

        let first = session.conclude(&llm).await;
        let calls_after_first = llm.prompts().len();
        let second = session.conclude(&llm).await;

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, EntryKind::Report);
        assert!(second.is_empty());
        assert_eq!(llm.prompts().len(), calls_after_first);
        let reports = session
            .transcript()
            .entries()
            .iter()
            .filter(|e| e.kind == EntryKind::Report)
            .count();
        assert_eq!(reports, 1);
        assert_eq!(session.question_count(), 2);
    }

    #[tokio::test]
    async fn test_huge_model_scores_still_complete_the_interview() {
        let huge = r#"{"score": 1e300, "technical_accuracy": 1, "completeness": 1, "clarity": 1}"#;
        let llm = ScriptedGenerator::replies([bank_text(15), huge.to_string(), huge.to_string()]);
        let mut session = session(2);
        session.start(&llm).await.unwrap();

        session.submit("first answer", &llm).await.unwrap();
        session.submit("second answer", &llm).await.unwrap();

        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.answers()[0].evaluation.overall_score, i64::MAX);
        let summary = session.report().unwrap().summary;
        assert_eq!(summary.overall_mean, i64::MAX as f64);
        assert!((summary.clarity_mean - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_conclude_without_answers_skips_aggregation() {
        let llm = ScriptedGenerator::replies([bank_text(15)]);
        let mut session = session(5);
        session.start(&llm).await.unwrap();

        let delta = session.conclude(&llm).await;

        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].text, NOTHING_TO_EVALUATE);
        assert!(session.report().is_none());
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_target_completes_immediately() {
        let llm = ScriptedGenerator::replies([bank_text(15)]);
        let mut session = session(0);

        let delta = session.start(&llm).await.unwrap();

        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.question_count(), 0);
        assert_eq!(delta.last().unwrap().text, NOTHING_TO_EVALUATE);
    }

    #[tokio::test]
    async fn test_submit_after_completion_is_rejected() {
        let llm = ScriptedGenerator::failing();
        let mut session = session(1);
        session.start(&llm).await.unwrap();
        session.submit("only answer", &llm).await.unwrap();
        assert_eq!(session.phase(), Phase::Completed);

        let err = session.submit("late answer", &llm).await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::InvalidPhase {
                phase: Phase::Completed,
                ..
            }
        ));
        assert_eq!(session.answers().len(), 1);
    }

    #[tokio::test]
    async fn test_restarted_session_is_fresh() {
        let llm = ScriptedGenerator::failing();
        let mut session = session(1);
        session.start(&llm).await.unwrap();
        session.submit("answer", &llm).await.unwrap();

        let fresh = session.restarted();

        assert_eq!(fresh.id(), session.id());
        assert_eq!(fresh.phase(), Phase::NotStarted);
        assert_eq!(fresh.question_count(), 0);
        assert_eq!(fresh.target_question_count(), 1);
        assert!(fresh.transcript().entries().is_empty());
        assert!(fresh.answers().is_empty());
    }
}
