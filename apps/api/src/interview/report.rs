//! Report aggregation — per-dimension means plus a model-written narrative.
//!
//! The numeric summary is always present; only the narrative depends on the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::models::AnswerRecord;
use super::prompts::build_report_prompt;
use crate::llm_client::TextGenerator;

const FALLBACK_ASSESSMENT: &str = "\
Based on your responses, you demonstrated solid Excel knowledge with room for improvement.
Focus on providing more detailed explanations and practical examples in your answers.";

/// Mean scores across all answers. Only constructible from a non-empty answer list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub questions_answered: usize,
    pub overall_mean: f64,
    pub technical_mean: f64,
    pub completeness_mean: f64,
    pub clarity_mean: f64,
}

impl ScoreSummary {
    /// Returns `None` for an empty list; the mean of nothing is undefined.
    pub fn from_answers(answers: &[AnswerRecord]) -> Option<Self> {
        if answers.is_empty() {
            return None;
        }
        let n = answers.len() as f64;
        // Scores are unbounded model output; summing as i64 can overflow.
        let mean = |score: fn(&AnswerRecord) -> i64| {
            answers.iter().map(|a| score(a) as f64).sum::<f64>() / n
        };

        Some(Self {
            questions_answered: answers.len(),
            overall_mean: mean(|a| a.evaluation.overall_score),
            technical_mean: mean(|a| a.evaluation.technical_accuracy),
            completeness_mean: mean(|a| a.evaluation.completeness),
            clarity_mean: mean(|a| a.evaluation.clarity),
        })
    }

    fn means(&self) -> [f64; 4] {
        [
            self.overall_mean,
            self.technical_mean,
            self.completeness_mean,
            self.clarity_mean,
        ]
    }
}

/// The final interview report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: ScoreSummary,
    /// Model-written assessment; `None` when the narrative call failed.
    pub narrative: Option<String>,
    pub completed_at: DateTime<Utc>,
    /// Rendered report shown to the candidate.
    pub text: String,
}

/// Aggregates scores and asks the model for a narrative assessment once.
pub async fn aggregate(summary: ScoreSummary, answers: &[AnswerRecord], llm: &dyn TextGenerator) -> Report {
    let per_question_json = per_question_summary(answers);
    let prompt = build_report_prompt(summary.questions_answered, summary.means(), &per_question_json);

    let narrative = match llm.generate(&prompt).await {
        Ok(text) => Some(text.trim().to_string()),
        Err(e) => {
            warn!("Report narrative generation failed, using static assessment: {e}");
            None
        }
    };

    let completed_at = Utc::now();
    let text = render_report(&summary, narrative.as_deref(), completed_at);

    info!(
        "Interview report built: answered={} overall_mean={:.1}",
        summary.questions_answered, summary.overall_mean
    );

    Report {
        summary,
        narrative,
        completed_at,
        text,
    }
}

/// Per-question score, strengths and weaknesses as pretty JSON for the report prompt.
fn per_question_summary(answers: &[AnswerRecord]) -> String {
    let rows: Vec<_> = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            serde_json::json!({
                "question_num": i + 1,
                "score": answer.evaluation.overall_score,
                "strengths": answer.evaluation.strengths,
                "weaknesses": answer.evaluation.weaknesses,
            })
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

fn render_report(summary: &ScoreSummary, narrative: Option<&str>, completed_at: DateTime<Utc>) -> String {
    let header = format!(
        "## Final Interview Report\n\n\
         **Interview Completed:** {}\n\n\
         ### Score Summary\n\
         - **Overall Score:** {:.1}/10\n\
         - **Technical Accuracy:** {:.1}/10\n\
         - **Response Completeness:** {:.1}/10\n\
         - **Communication Clarity:** {:.1}/10",
        completed_at.format("%Y-%m-%d %H:%M"),
        summary.overall_mean,
        summary.technical_mean,
        summary.completeness_mean,
        summary.clarity_mean,
    );

    match narrative {
        Some(narrative) => format!(
            "{header}\n\n### Detailed Assessment\n\n{narrative}\n\n---\n\n\
             Thank you for completing the Excel Mock Interview! \
             Use this feedback to improve your Excel skills."
        ),
        None => format!(
            "{header}\n\n### Assessment\n{FALLBACK_ASSESSMENT}\n\n\
             Thank you for completing the interview!"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::{Evaluation, EvaluationSource};
    use crate::interview::test_support::ScriptedGenerator;

    fn record(overall: i64, technical: i64, completeness: i64, clarity: i64) -> AnswerRecord {
        AnswerRecord {
            question: "Q".to_string(),
            response_text: "A".to_string(),
            evaluation: Evaluation {
                overall_score: overall,
                technical_accuracy: technical,
                completeness,
                clarity,
                strengths: vec!["Clear".to_string()],
                weaknesses: vec!["Brief".to_string()],
                feedback: String::new(),
            },
            evaluation_source: EvaluationSource::Model,
        }
    }

    #[test]
    fn test_summary_of_empty_answers_is_none() {
        assert!(ScoreSummary::from_answers(&[]).is_none());
    }

    #[test]
    fn test_summary_means_are_exact() {
        let answers = vec![record(8, 7, 6, 9), record(5, 5, 5, 5), record(9, 10, 8, 7)];

        let summary = ScoreSummary::from_answers(&answers).unwrap();

        assert_eq!(summary.questions_answered, 3);
        assert!((summary.overall_mean - 22.0 / 3.0).abs() < 1e-9);
        assert!((summary.technical_mean - 22.0 / 3.0).abs() < 1e-9);
        assert!((summary.completeness_mean - 19.0 / 3.0).abs() < 1e-9);
        assert!((summary.clarity_mean - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_tolerates_out_of_range_scores() {
        let answers = vec![record(12, 0, -1, 10), record(0, 0, 1, 10)];
        let summary = ScoreSummary::from_answers(&answers).unwrap();
        assert!((summary.overall_mean - 6.0).abs() < 1e-9);
        assert!((summary.completeness_mean - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_of_extreme_scores_does_not_overflow() {
        let answers = vec![record(i64::MAX, 1, i64::MIN, 1), record(i64::MAX, 1, i64::MIN, 1)];

        let summary = ScoreSummary::from_answers(&answers).unwrap();

        assert_eq!(summary.overall_mean, i64::MAX as f64);
        assert_eq!(summary.completeness_mean, i64::MIN as f64);
        assert!((summary.technical_mean - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_aggregate_includes_narrative_and_scores() {
        let answers = vec![record(8, 7, 6, 9), record(7, 7, 7, 7)];
        let summary = ScoreSummary::from_answers(&answers).unwrap();
        let llm = ScriptedGenerator::replies(["Recommendation: Hire."]);

        let report = aggregate(summary, &answers, &llm).await;

        assert_eq!(report.narrative.as_deref(), Some("Recommendation: Hire."));
        assert!(report.text.contains("**Overall Score:** 7.5/10"));
        assert!(report.text.contains("**Communication Clarity:** 8.0/10"));
        assert!(report.text.contains("Recommendation: Hire."));

        let prompts = llm.prompts();
        assert!(prompts[0].contains("Overall Score: 7.5/10"));
        assert!(prompts[0].contains("\"question_num\": 2"));
    }

    #[tokio::test]
    async fn test_aggregate_falls_back_to_static_report() {
        let answers = vec![record(5, 5, 5, 5)];
        let summary = ScoreSummary::from_answers(&answers).unwrap();
        let llm = ScriptedGenerator::failing();

        let report = aggregate(summary, &answers, &llm).await;

        assert!(report.narrative.is_none());
        assert!(report.text.contains("**Overall Score:** 5.0/10"));
        assert!(report.text.contains("**Technical Accuracy:** 5.0/10"));
        assert!(report.text.contains("**Response Completeness:** 5.0/10"));
        assert!(report.text.contains("Thank you for completing the interview!"));
    }
}
