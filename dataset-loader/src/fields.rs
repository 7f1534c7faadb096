//! Question/answer field detection over a single sample record.

use serde_json::{Map, Value};

use crate::errors::DatasetError;

/// Known `(question, answer)` layouts, tried in order.
pub const CANDIDATE_PAIRS: [(&str, &str); 5] = [
    ("input", "output"),
    ("instruction", "output"),
    ("question", "answer"),
    ("prompt", "response"),
    ("query", "response"),
];

/// Field names chosen for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetectedFields {
    pub question: Option<String>,
    pub answer: Option<String>,
}

impl DetectedFields {
    /// Returns `(question, answer)` or [`DatasetError::FieldDetection`] when no
    /// question field was found.
    pub fn require(self) -> Result<(String, Option<String>), DatasetError> {
        match self.question {
            Some(q) => Ok((q, self.answer)),
            None => Err(DatasetError::FieldDetection),
        }
    }
}

/// Picks the question/answer fields of a record.
///
/// 1. First candidate pair whose two keys are both present.
/// 2. A `text` key, with no answer field.
/// 3. The first two keys (record order) holding non-blank strings.
/// 4. Nothing.
pub fn detect_fields(record: &Map<String, Value>) -> DetectedFields {
    for (q, a) in CANDIDATE_PAIRS {
        if record.contains_key(q) && record.contains_key(a) {
            return DetectedFields {
                question: Some(q.to_string()),
                answer: Some(a.to_string()),
            };
        }
    }

    if record.contains_key("text") {
        return DetectedFields {
            question: Some("text".to_string()),
            answer: None,
        };
    }

    let mut strings = record
        .iter()
        .filter(|(_, v)| v.as_str().is_some_and(|s| !s.trim().is_empty()))
        .map(|(k, _)| k.clone());

    DetectedFields {
        question: strings.next(),
        answer: strings.next(),
    }
}
