// AI-evaluated skills interview.
// Implements: question bank, per-answer evaluation, report aggregation, session state machine.
// All LLM calls go through llm_client::TextGenerator — no direct Gemini calls here.

pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod question_bank;
pub mod report;
pub mod session;
pub mod transcript;
