use crate::client::TextGenerator;
use crate::error::{InferenceError, Result};
use crate::prompt::build_prompt;
use crate::repair::{extract_json_object, parse_mapping};
use crate::types::FieldMapping;
use feedlens_anonymizer::AnonymizedLine;
use feedlens_parser::FIELD_SEPARATOR;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const MAX_INFERENCE_CONCURRENCY: usize = 16;

/// Outcome of one inference run: partial results plus per-msgType errors.
#[derive(Debug, Default)]
pub struct InferenceReport {
    pub mappings: Vec<FieldMapping>,
    pub errors: HashMap<String, String>,
}

impl InferenceReport {
    #[must_use]
    pub fn inferred_msg_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .mappings
            .iter()
            .map(|m| m.msg_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

/// LLM-backed schema inference for unknown message types.
///
/// One task per message type, bounded by a semaphore; a failing type
/// records an error without blocking or cancelling the others.
pub struct SchemaInferencer {
    generator: Arc<dyn TextGenerator>,
    primary_model: String,
    fallback_model: String,
    max_concurrency: usize,
}

impl SchemaInferencer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
            max_concurrency: MAX_INFERENCE_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.clamp(1, MAX_INFERENCE_CONCURRENCY);
        self
    }

    /// Infer a schema for every message type in `groups`, concurrently.
    pub async fn infer_all(
        &self,
        groups: HashMap<String, Vec<AnonymizedLine>>,
    ) -> InferenceReport {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join = JoinSet::new();

        for (msg_type, lines) in groups {
            let generator = self.generator.clone();
            let primary = self.primary_model.clone();
            let fallback = self.fallback_model.clone();
            let semaphore = semaphore.clone();

            join.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("inference semaphore closed");
                let outcome =
                    infer_group(generator.as_ref(), &primary, &fallback, &msg_type, &lines).await;
                (msg_type, outcome)
            });
        }

        let mut report = InferenceReport::default();
        while let Some(joined) = join.join_next().await {
            match joined {
                Ok((msg_type, Ok(mappings))) => {
                    log::info!(
                        "Inferred schema for msg_type {msg_type} ({} lines)",
                        mappings.len()
                    );
                    report.mappings.extend(mappings);
                }
                Ok((msg_type, Err(err))) => {
                    log::error!("Schema inference failed for msg_type {msg_type}: {err}");
                    report.errors.insert(msg_type, err.to_string());
                }
                Err(join_err) => {
                    log::error!("Inference task aborted: {join_err}");
                    report
                        .errors
                        .entry("<task>".to_string())
                        .or_insert_with(|| InferenceError::TaskFailed(join_err.to_string()).to_string());
                }
            }
        }
        report
    }
}

async fn infer_group(
    generator: &dyn TextGenerator,
    primary: &str,
    fallback: &str,
    msg_type: &str,
    lines: &[AnonymizedLine],
) -> Result<Vec<FieldMapping>> {
    let sample = lines
        .first()
        .ok_or_else(|| InferenceError::EmptyGroup(msg_type.to_string()))?;
    let prompt = build_prompt(sample);

    let reply = match generator.generate(primary, &prompt).await {
        Ok(reply) => reply,
        Err(err) => {
            log::warn!(
                "Primary model '{primary}' failed for msg_type {msg_type} ({err}); \
                 retrying with '{fallback}'"
            );
            generator.generate(fallback, &prompt).await?
        }
    };

    let json = extract_json_object(&reply)?;
    let mapping = parse_mapping(&json)?;

    Ok(lines
        .iter()
        .map(|line| FieldMapping {
            msg_type: msg_type.to_string(),
            mapping: mapping.clone(),
            sample_original_line: line.original_line.clone(),
            sample_anonymized_line: line.anonymized_line.clone(),
            field_count: line.field_count(FIELD_SEPARATOR),
        })
        .collect())
}
