//! Prompt builder: short system message + compact context block.

use crate::record::RetrievedNode;

/// Default system instructions for health answers.
pub const DEFAULT_SYSTEM: &str = r#"
You are a careful medical information assistant. Answer in plain language using the
provided context. If the context is insufficient, say so. Do not diagnose; suggest
seeing a clinician when symptoms are severe or persistent.
"#;

/// Character budget for the context block.
pub const CONTEXT_MAX_CHARS: usize = 12_000;

/// Builds the user prompt: retrieved passages packed into one context block,
/// followed by the question.
///
/// Passages keep their ranking order; the block is cut at `max_chars`.
pub fn build_user_prompt(question: &str, nodes: &[RetrievedNode], max_chars: usize) -> String {
    let mut ctx = String::new();
    let mut budget = max_chars;

    for n in nodes {
        let text = n.content.trim();
        if text.is_empty() {
            continue;
        }
        if !ctx.is_empty() {
            if budget < 2 {
                break;
            }
            ctx.push_str("\n\n");
            budget -= 2;
        }
        if text.len() > budget {
            ctx.push_str(safe_truncate(text, budget));
            break;
        }
        ctx.push_str(text);
        budget -= text.len();
    }

    let mut out = String::new();
    out.push_str("Context information is below.\n---------------------\n");
    out.push_str(&ctx);
    out.push_str("\n---------------------\n");
    out.push_str("Given the context information and not prior knowledge, answer the query.\n");
    out.push_str("Query: ");
    out.push_str(question.trim());
    out.push_str("\nAnswer: ");
    out
}

fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn node(content: &str) -> RetrievedNode {
        RetrievedNode {
            content: content.to_string(),
            score: 1.0,
            doc_id: "d".into(),
            seq: 0,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn context_keeps_order_and_question_last() {
        let p = build_user_prompt(" What helps? ", &[node("first"), node(" "), node("second")], 1000);
        let first = p.find("first").unwrap();
        let second = p.find("second").unwrap();
        assert!(first < second);
        assert!(p.contains("first\n\nsecond"));
        assert!(p.ends_with("Query: What helps?\nAnswer: "));
    }

    #[test]
    fn context_respects_budget_on_char_boundary() {
        let p = build_user_prompt("q", &[node("ééééé")], 3);
        assert!(p.contains("---------------------\né\n---"));
    }
}
