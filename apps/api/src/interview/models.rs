use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A question as served to the candidate. Compared by exact string equality.
pub type Question = String;

/// Structured per-answer scoring produced by the evaluator.
///
/// Scores are nominally 1–10 but are stored as given; the model's numbers are
/// trusted and aggregation tolerates any integer.
///
/// The overall score is read from `overall_score` or `score`. When a reply
/// carries both, `overall_score` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvaluation")]
pub struct Evaluation {
    pub overall_score: i64,
    pub technical_accuracy: i64,
    pub completeness: i64,
    pub clarity: i64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub feedback: String,
}

/// Evaluation as the model writes it.
#[derive(Deserialize)]
struct RawEvaluation {
    #[serde(default, deserialize_with = "coerce_optional_score")]
    overall_score: Option<i64>,
    #[serde(default, deserialize_with = "coerce_optional_score")]
    score: Option<i64>,
    #[serde(deserialize_with = "coerce_score")]
    technical_accuracy: i64,
    #[serde(deserialize_with = "coerce_score")]
    completeness: i64,
    #[serde(deserialize_with = "coerce_score")]
    clarity: i64,
    #[serde(default, deserialize_with = "string_list")]
    strengths: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    weaknesses: Vec<String>,
    #[serde(default)]
    feedback: String,
}

impl TryFrom<RawEvaluation> for Evaluation {
    type Error = String;

    fn try_from(raw: RawEvaluation) -> Result<Self, Self::Error> {
        let overall_score = raw
            .overall_score
            .or(raw.score)
            .ok_or_else(|| "missing field `overall_score` or `score`".to_string())?;

        Ok(Self {
            overall_score,
            technical_accuracy: raw.technical_accuracy,
            completeness: raw.completeness,
            clarity: raw.clarity,
            strengths: raw.strengths,
            weaknesses: raw.weaknesses,
            feedback: raw.feedback,
        })
    }
}

impl Evaluation {
    /// Used when the model could not be reached at all, or its object would not parse.
    pub fn unreachable_default() -> Self {
        Self {
            overall_score: 5,
            technical_accuracy: 5,
            completeness: 5,
            clarity: 5,
            strengths: vec!["Attempted to answer the question".to_string()],
            weaknesses: vec!["Response needs more technical depth".to_string()],
            feedback: "Please provide more detailed explanations with specific examples."
                .to_string(),
        }
    }

    /// Used when the model answered but no structured object could be located.
    pub fn format_drift_default() -> Self {
        Self {
            overall_score: 7,
            technical_accuracy: 7,
            completeness: 6,
            clarity: 7,
            strengths: vec!["Provided relevant information".to_string()],
            weaknesses: vec!["Could provide more detail".to_string()],
            feedback: "Good response, consider adding more specific examples.".to_string(),
        }
    }
}

/// Which path produced an answer's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    Model,
    FormatFallback,
    UnreachableFallback,
}

/// One answered question. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: Question,
    pub response_text: String,
    pub evaluation: Evaluation,
    pub evaluation_source: EvaluationSource,
}

/// Accepts integers, floats (truncated toward zero) and numeric strings.
fn coerce_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| de::Error::custom(format!("score out of range: {n}"))),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f.trunc() as i64))
                .map_err(|_| de::Error::custom(format!("score is not numeric: {s:?}")))
        }
        other => Err(de::Error::custom(format!("score is not numeric: {other}"))),
    }
}

fn coerce_optional_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    coerce_score(deserializer).map(Some)
}

/// Accepts a list of strings or a single string; anything else becomes an empty list.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_accepts_score_alias_and_coerces_numbers() {
        let json = serde_json::json!({
            "score": 8.7,
            "technical_accuracy": "9",
            "completeness": 6,
            "clarity": "7.2",
            "strengths": ["Knows XLOOKUP"],
            "weaknesses": "No examples",
            "feedback": "Solid."
        });

        let evaluation: Evaluation = serde_json::from_value(json).unwrap();

        assert_eq!(evaluation.overall_score, 8);
        assert_eq!(evaluation.technical_accuracy, 9);
        assert_eq!(evaluation.completeness, 6);
        assert_eq!(evaluation.clarity, 7);
        assert_eq!(evaluation.strengths, vec!["Knows XLOOKUP"]);
        assert_eq!(evaluation.weaknesses, vec!["No examples"]);
    }

    #[test]
    fn test_evaluation_passes_out_of_range_scores_through() {
        let json = serde_json::json!({
            "overall_score": 14,
            "technical_accuracy": -2,
            "completeness": 0,
            "clarity": 11
        });
        let evaluation: Evaluation = serde_json::from_value(json).unwrap();
        assert_eq!(evaluation.overall_score, 14);
        assert_eq!(evaluation.technical_accuracy, -2);
        assert!(evaluation.strengths.is_empty());
        assert!(evaluation.feedback.is_empty());
    }

    #[test]
    fn test_evaluation_prefers_overall_score_when_both_present() {
        let json = serde_json::json!({
            "score": 3,
            "overall_score": 8,
            "technical_accuracy": 7,
            "completeness": 6,
            "clarity": 9
        });

        let evaluation: Evaluation = serde_json::from_value(json).unwrap();

        assert_eq!(evaluation.overall_score, 8);
        assert_eq!(evaluation.clarity, 9);
    }

    #[test]
    fn test_evaluation_without_any_overall_score_fails() {
        let json = serde_json::json!({
            "technical_accuracy": 8,
            "completeness": 8,
            "clarity": 8
        });
        assert!(serde_json::from_value::<Evaluation>(json).is_err());
    }

    #[test]
    fn test_evaluation_missing_score_field_fails() {
        let json = serde_json::json!({
            "score": 8,
            "technical_accuracy": 8,
            "completeness": 8
        });
        assert!(serde_json::from_value::<Evaluation>(json).is_err());
    }

    #[test]
    fn test_evaluation_non_numeric_score_fails() {
        let json = serde_json::json!({
            "score": "excellent",
            "technical_accuracy": 8,
            "completeness": 8,
            "clarity": 8
        });
        assert!(serde_json::from_value::<Evaluation>(json).is_err());
    }
}
