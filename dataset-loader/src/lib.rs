//! Dataset ingestion for the medical Q&A index.
//!
//! Rows come from the Hugging Face datasets-server or a local JSONL file.
//! [`fields::detect_fields`] picks the question/answer columns from the first
//! row, [`documents::build_documents`] composes one [`Document`] per row and
//! appends the curated home-care notes.

pub mod config;
pub mod curated;
pub mod documents;
pub mod errors;
pub mod fields;
pub mod hub;
pub mod jsonl;
pub mod loader;

pub use config::{DatasetConfig, DatasetSource};
pub use documents::{Document, Record, build_documents, truncate};
pub use errors::DatasetError;
pub use fields::{DetectedFields, detect_fields};
pub use loader::DatasetLoader;
