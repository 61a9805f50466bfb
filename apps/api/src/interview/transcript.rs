use std::fmt;

use serde::{Deserialize, Serialize};

use super::models::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Speaker {
    System,
    Candidate,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "SYSTEM"),
            Self::Candidate => write!(f, "CANDIDATE"),
        }
    }
}

/// What an entry is for. Questions keep the raw question so answers can be matched to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Introduction,
    Question { question: Question },
    Answer,
    Feedback,
    Report,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub ordinal: u64,
    pub speaker: Speaker,
    pub text: String,
    pub kind: EntryKind,
}

/// Append-only conversation log. Entries are never mutated or removed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry with the next ordinal (starting at 1).
    pub fn append(&mut self, speaker: Speaker, kind: EntryKind, text: impl Into<String>) {
        let ordinal = self.entries.last().map_or(1, |e| e.ordinal + 1);
        self.entries.push(TranscriptEntry {
            ordinal,
            speaker,
            text: text.into(),
            kind,
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries appended at or after position `mark`.
    pub fn since(&self, mark: usize) -> Vec<TranscriptEntry> {
        self.entries.get(mark..).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// The raw text of the most recently asked question.
    pub fn last_question(&self) -> Option<&Question> {
        self.entries.iter().rev().find_map(|e| match (&e.speaker, &e.kind) {
            (Speaker::System, EntryKind::Question { question }) => Some(question),
            _ => None,
        })
    }

    /// Plain-text export: `"<SPEAKER>: <text>"` per entry, separated by blank lines.
    pub fn export_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.speaker, e.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
