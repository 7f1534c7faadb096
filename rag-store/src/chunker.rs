//! Splits documents into bounded nodes.
//!
//! Paragraphs (blank-line separated) are packed greedily; a paragraph longer
//! than the bound is split on whitespace, and a single oversized word is cut
//! on character boundaries. Lengths are counted in characters.

use dataset_loader::Document;

use crate::record::{Node, point_id};

/// Splits `text` into pieces of at most `max_chars` characters.
///
/// Always returns at least one piece for non-blank input.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return if text.is_empty() { Vec::new() } else { vec![text.to_string()] };
    }

    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let para_len = para.chars().count();
        let sep = if cur.is_empty() { 0 } else { 2 };

        if cur_len + sep + para_len <= max_chars {
            if sep > 0 {
                cur.push_str("\n\n");
            }
            cur.push_str(para);
            cur_len += sep + para_len;
            continue;
        }

        flush(&mut out, &mut cur, &mut cur_len);
        if para_len <= max_chars {
            cur.push_str(para);
            cur_len = para_len;
        } else {
            split_words(para, max_chars, &mut out, &mut cur, &mut cur_len);
        }
    }

    flush(&mut out, &mut cur, &mut cur_len);
    out
}

fn split_words(
    para: &str,
    max_chars: usize,
    out: &mut Vec<String>,
    cur: &mut String,
    cur_len: &mut usize,
) {
    for word in para.split_whitespace() {
        let word_len = word.chars().count();
        let sep = if cur.is_empty() { 0 } else { 1 };

        if *cur_len + sep + word_len <= max_chars {
            if sep > 0 {
                cur.push(' ');
            }
            cur.push_str(word);
            *cur_len += sep + word_len;
            continue;
        }

        flush(out, cur, cur_len);
        if word_len <= max_chars {
            cur.push_str(word);
            *cur_len = word_len;
        } else {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                out.push(piece.iter().collect());
            }
        }
    }
}

fn flush(out: &mut Vec<String>, cur: &mut String, cur_len: &mut usize) {
    if !cur.is_empty() {
        out.push(std::mem::take(cur));
        *cur_len = 0;
    }
}

/// Turns documents into nodes, numbering them from `first_seq` in input order.
pub fn nodes_from_documents(docs: &[Document], max_chars: usize, first_seq: u64) -> Vec<Node> {
    let mut seq = first_seq;
    let mut nodes = Vec::with_capacity(docs.len());

    for doc in docs {
        let doc_id = doc.doc_id();
        for (chunk, text) in split_text(&doc.text, max_chars).into_iter().enumerate() {
            nodes.push(Node {
                id: point_id(doc_id, chunk).to_string(),
                doc_id: doc_id.to_string(),
                chunk,
                seq,
                text,
                metadata: doc.metadata.clone(),
            });
            seq += 1;
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn doc(id: &str, text: &str) -> Document {
        let mut metadata = BTreeMap::new();
        metadata.insert("doc_id".to_string(), id.to_string());
        metadata.insert("source".to_string(), "test".to_string());
        Document {
            text: text.to_string(),
            metadata,
        }
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("  Rest and fluids.  ", 100), ["Rest and fluids."]);
        assert!(split_text("   ", 100).is_empty());
    }

    #[test]
    fn packs_paragraphs_within_bound() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let parts = split_text(text, 10);
        assert_eq!(parts, ["aaaa\n\nbbbb", "cccc"]);
        assert!(parts.iter().all(|p| p.chars().count() <= 10));
    }

    #[test]
    fn long_paragraph_splits_on_whitespace_and_long_word_on_chars() {
        let parts = split_text("one two three four", 9);
        assert_eq!(parts, ["one two", "three", "four"]);

        let parts = split_text("abcdefghijkl xy", 5);
        assert_eq!(parts, ["abcde", "fghij", "kl", "xy"]);
    }

    #[test]
    fn nodes_are_numbered_in_order() {
        let docs = vec![doc("a", "x\n\ny"), doc("b", "z")];
        let nodes = nodes_from_documents(&docs, 1, 10);
        let seqs: Vec<u64> = nodes.iter().map(|n| n.seq).collect();
        assert_eq!(seqs, [10, 11, 12]);
        assert_eq!(nodes[1].doc_id, "a");
        assert_eq!(nodes[1].chunk, 1);
        assert_eq!(nodes[2].id, point_id("b", 0).to_string());
        assert_eq!(nodes[2].metadata["source"], "test");
    }
}
