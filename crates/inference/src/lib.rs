//! # Feedlens Inference
//!
//! LLM-backed schema inference for unknown message types.
//!
//! One representative anonymized line per message type becomes a prompt
//! asking for a JSON object mapping `Champ N` keys to short field
//! meanings. Replies are extracted and, when truncated, repaired by brace
//! counting before parsing. Message types are inferred concurrently with
//! bounded parallelism and isolated failure domains.
//!
//! The generative-text transport is out of scope; [`TextGenerator`] is the
//! seam an HTTP client implements.

mod client;
mod error;
mod inferencer;
mod prompt;
mod repair;
mod types;

pub use client::{GenerationSettings, TextGenerator};
pub use error::{InferenceError, Result};
pub use inferencer::{InferenceReport, SchemaInferencer};
pub use prompt::{build_prompt, field_key, FIELD_KEY_PREFIX};
pub use repair::{extract_json_object, parse_mapping};
pub use types::FieldMapping;
