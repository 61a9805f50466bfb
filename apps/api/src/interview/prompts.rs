// All LLM prompt templates for the Interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{fill_template, JSON_OBJECT_INSTRUCTION, ONE_PER_LINE_INSTRUCTION};

/// Question bank prompt. Replace: {count}, {line_instruction}
pub const QUESTION_BANK_PROMPT_TEMPLATE: &str = r#"Generate {count} diverse Microsoft Excel interview questions covering different skill levels and topics.
Include questions about:
1. Basic formulas and functions (SUM, AVERAGE, COUNT, etc.)
2. Advanced functions (VLOOKUP, HLOOKUP, INDEX-MATCH, etc.)
3. Data analysis (Pivot Tables, filtering, sorting)
4. Data visualization (Charts, conditional formatting)
5. Excel shortcuts and productivity tips
6. Problem-solving scenarios
7. Data validation and error handling

Format each question as a clear, specific question that would be asked in a real interview.
Make questions practical and job-relevant.

Return exactly {count} questions, numbered 1-{count}. {line_instruction}"#;

/// Evaluation prompt. Replace: {question}, {response}, {json_instruction}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an expert Excel interviewer. Evaluate this candidate's response to an Excel interview question.

Question: {question}
Candidate's Response: {response}

Provide evaluation in this JSON format:
{
  "score": <score from 1-10>,
  "strengths": ["list of strengths shown in the response"],
  "weaknesses": ["list of areas for improvement"],
  "feedback": "Detailed constructive feedback (2-3 sentences)",
  "technical_accuracy": <score from 1-10>,
  "completeness": <score from 1-10>,
  "clarity": <score from 1-10>
}

Consider:
- Technical accuracy of the information
- Completeness of the answer
- Clarity of explanation
- Practical applicability
- Best practices mentioned

{json_instruction}"#;

/// Final report prompt.
/// Replace: {answered}, {overall}, {technical}, {completeness}, {clarity}, {per_question_json}
pub const REPORT_PROMPT_TEMPLATE: &str = r#"Generate a comprehensive Excel interview evaluation report for a candidate.

Interview Summary:
- Questions Asked: {answered}
- Overall Score: {overall}/10
- Technical Accuracy: {technical}/10
- Completeness: {completeness}/10
- Clarity: {clarity}/10

Individual Question Performance:
{per_question_json}

Generate a professional interview evaluation report including:
1. Overall assessment and recommendation (Hire/No Hire/Maybe)
2. Key strengths demonstrated
3. Areas for improvement
4. Specific Excel skills observed
5. Recommendations for skill development

Keep it professional but constructive."#;

pub fn build_question_bank_prompt(count: usize) -> String {
    let count = count.to_string();
    fill_template(
        QUESTION_BANK_PROMPT_TEMPLATE,
        &[("count", count.as_str()), ("line_instruction", ONE_PER_LINE_INSTRUCTION)],
    )
}

/// The question and response are embedded verbatim.
pub fn build_evaluation_prompt(question: &str, response: &str) -> String {
    fill_template(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("question", question),
            ("response", response),
            ("json_instruction", JSON_OBJECT_INSTRUCTION),
        ],
    )
}

/// Means are rendered with one decimal place.
pub fn build_report_prompt(
    answered: usize,
    means: [f64; 4],
    per_question_json: &str,
) -> String {
    let [overall, technical, completeness, clarity] = means.map(|m| format!("{m:.1}"));
    let answered = answered.to_string();
    fill_template(
        REPORT_PROMPT_TEMPLATE,
        &[
            ("answered", answered.as_str()),
            ("overall", overall.as_str()),
            ("technical", technical.as_str()),
            ("completeness", completeness.as_str()),
            ("clarity", clarity.as_str()),
            ("per_question_json", per_question_json),
        ],
    )
}
