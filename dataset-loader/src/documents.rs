//! Document model and record → document composition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{curated::curated_documents, errors::DatasetError, fields::detect_fields};

/// One dataset row as returned by a source, with keys in their natural order.
pub type Record = Map<String, Value>;

/// Maximum length (in characters) of the `question`/`answer` metadata excerpts.
pub const EXCERPT_MAX_CHARS: usize = 200;

/// A unit of indexable text with string metadata.
///
/// `text` is never empty; `metadata` always carries `source` and `doc_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Unique document id (`metadata["doc_id"]`).
    pub fn doc_id(&self) -> &str {
        self.metadata.get("doc_id").map(String::as_str).unwrap_or_default()
    }

    /// Origin tag (`huggingface` or `curated`).
    pub fn source(&self) -> &str {
        self.metadata.get("source").map(String::as_str).unwrap_or_default()
    }
}

/// Shortens `value` to at most `max_len` characters, ending with `"..."` when cut.
///
/// Lengths count Unicode scalar values, so multi-byte text is never split.
pub fn truncate(value: &str, max_len: usize) -> String {
    if value.chars().count() <= max_len {
        return value.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = value.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Renders a record field as text: strings verbatim, missing/null as `""`,
/// anything else as compact JSON.
fn field_text(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Turns raw dataset rows into documents and appends the curated set.
///
/// Fields are detected once, from the first record. With an answer field the
/// text is `"Question: {q}\n\nAnswer: {a}"`, otherwise just the question text.
/// Without an answer field, rows with blank text are skipped; indices are
/// never reused. Question/answer rows are always kept.
///
/// # Errors
/// [`DatasetError::FieldDetection`] when the first record has no usable field.
pub fn build_documents(records: &[Record], dataset: &str) -> Result<Vec<Document>, DatasetError> {
    let mut documents = Vec::with_capacity(records.len() + 20);

    if let Some(first) = records.first() {
        let (question_field, answer_field) = detect_fields(first).require()?;
        info!(
            dataset,
            question_field = %question_field,
            answer_field = answer_field.as_deref().unwrap_or(""),
            rows = records.len(),
            "detected dataset fields"
        );

        for (idx, record) in records.iter().enumerate() {
            let question = field_text(record, &question_field);
            let answer = answer_field
                .as_deref()
                .map(|f| field_text(record, f))
                .unwrap_or_default();

            let text = if answer_field.is_some() {
                format!("Question: {question}\n\nAnswer: {answer}")
            } else {
                question.clone()
            };

            if answer_field.is_none() && text.trim().is_empty() {
                warn!(dataset, idx, "skipping record with no text");
                continue;
            }

            let mut metadata = BTreeMap::new();
            metadata.insert("source".into(), "huggingface".into());
            metadata.insert("dataset".into(), dataset.to_string());
            metadata.insert("doc_id".into(), format!("{dataset}_{idx}"));
            metadata.insert("question_field".into(), question_field.clone());
            metadata.insert(
                "answer_field".into(),
                answer_field.clone().unwrap_or_default(),
            );
            metadata.insert("question".into(), truncate(&question, EXCERPT_MAX_CHARS));
            metadata.insert("answer".into(), truncate(&answer, EXCERPT_MAX_CHARS));

            documents.push(Document { text, metadata });
        }
    } else {
        warn!(dataset, "dataset returned no rows; only curated documents will be indexed");
    }

    documents.extend(curated_documents());
    debug!(dataset, total = documents.len(), "documents built");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rec(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => unreachable!("test input must be an object"),
        }
    }

    #[test]
    fn composes_question_and_answer() {
        let rows = vec![rec(json!({"question": "What is flu?", "answer": "A viral infection."}))];
        let docs = build_documents(&rows, "med").unwrap();
        let d = &docs[0];
        assert_eq!(d.text, "Question: What is flu?\n\nAnswer: A viral infection.");
        assert_eq!(d.doc_id(), "med_0");
        assert_eq!(d.source(), "huggingface");
        assert_eq!(d.metadata["dataset"], "med");
        assert_eq!(d.metadata["question_field"], "question");
        assert_eq!(d.metadata["answer_field"], "answer");
        assert_eq!(d.metadata["question"], "What is flu?");
        assert_eq!(d.metadata["answer"], "A viral infection.");
    }

    #[test]
    fn text_only_records_have_empty_answer_metadata() {
        let rows = vec![rec(json!({"text": "Rest and fluids help."}))];
        let docs = build_documents(&rows, "notes").unwrap();
        let d = &docs[0];
        assert_eq!(d.text, "Rest and fluids help.");
        assert_eq!(d.metadata["answer_field"], "");
        assert_eq!(d.metadata["answer"], "");
    }

    #[test]
    fn curated_set_is_always_appended() {
        let docs = build_documents(&[], "empty").unwrap();
        assert_eq!(docs.len(), 20);
        assert!(docs.iter().all(|d| d.doc_id().starts_with("curated_")));

        let rows = vec![rec(json!({"input": "q", "output": "a"}))];
        let docs = build_documents(&rows, "one").unwrap();
        assert_eq!(docs.len(), 21);
        assert_eq!(docs[0].doc_id(), "one_0");
    }

    #[test]
    fn undetectable_first_record_is_fatal() {
        let rows = vec![rec(json!({})), rec(json!({"question": "q", "answer": "a"}))];
        assert!(matches!(
            build_documents(&rows, "bad"),
            Err(DatasetError::FieldDetection)
        ));
    }

    #[test]
    fn blank_rows_are_skipped_without_reusing_ids() {
        let rows = vec![
            rec(json!({"text": "first"})),
            rec(json!({"text": "   "})),
            rec(json!({"text": "third"})),
        ];
        let docs = build_documents(&rows, "d").unwrap();
        let ids: Vec<&str> = docs.iter().take(2).map(Document::doc_id).collect();
        assert_eq!(ids, ["d_0", "d_2"]);
    }

    #[test]
    fn blank_question_answer_rows_are_kept() {
        let rows = vec![
            rec(json!({"question": "What is flu?", "answer": "A viral infection."})),
            rec(json!({"question": " ", "answer": ""})),
        ];
        let docs = build_documents(&rows, "d").unwrap();
        assert_eq!(docs.len(), 22);
        assert_eq!(docs[1].doc_id(), "d_1");
        assert_eq!(docs[1].text, "Question:  \n\nAnswer: ");
    }

    #[test]
    fn non_string_values_render_as_json() {
        let rows = vec![rec(json!({"question": "dose?", "answer": 5}))];
        let docs = build_documents(&rows, "d").unwrap();
        assert_eq!(docs[0].text, "Question: dose?\n\nAnswer: 5");
    }

    #[test]
    fn truncation_bounds() {
        let long = "x".repeat(250);
        let t = truncate(&long, EXCERPT_MAX_CHARS);
        assert_eq!(t.chars().count(), 200);
        assert!(t.ends_with("..."));
        assert_eq!(&t[..197], &long[..197]);

        let exact = "y".repeat(200);
        assert_eq!(truncate(&exact, EXCERPT_MAX_CHARS), exact);
        assert_eq!(truncate("", EXCERPT_MAX_CHARS), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(201);
        let t = truncate(&long, EXCERPT_MAX_CHARS);
        assert_eq!(t.chars().count(), 200);
    }
}
