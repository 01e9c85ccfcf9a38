use crate::config::IngestConfig;
use crate::error::Result;
use feedlens_anonymizer::{AnonymizedLine, Anonymizer};
use feedlens_inference::{SchemaInferencer, TextGenerator};
use feedlens_parser::{FeedParser, RawLineReader};
use feedlens_store::{MappingStore, StoreOutcome};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// What happened to one claimed file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub total_lines: usize,
    pub valid_lines: usize,
    pub parse_issues: usize,
    pub known_types: usize,
    pub unknown_types: usize,
    /// Message types persisted for the first time.
    pub stored: Vec<String>,
    /// Message types that already had an active mapping (dedup, not an
    /// error).
    pub skipped: Vec<String>,
    /// Message types whose inference or persistence failed.
    pub failed: HashMap<String, String>,
    pub duration_ms: u64,
}

/// Parse → classify → anonymize → infer → store, for one file at a time.
pub struct FeedPipeline {
    reader: RawLineReader,
    parser: FeedParser,
    anonymizer: Anonymizer,
    inferencer: SchemaInferencer,
    store: Arc<MappingStore>,
}

impl FeedPipeline {
    pub fn new(
        config: &IngestConfig,
        generator: Arc<dyn TextGenerator>,
        store: Arc<MappingStore>,
    ) -> Self {
        Self {
            reader: RawLineReader::new(config.max_file_size_bytes()),
            parser: FeedParser::default(),
            anonymizer: Anonymizer::new(config.anonymization_mode),
            inferencer: SchemaInferencer::new(
                generator,
                config.primary_model.clone(),
                config.fallback_model.clone(),
            )
            .with_max_concurrency(config.inference_concurrency),
            store,
        }
    }

    /// Process one claimed file end to end. Everything below an unreadable
    /// file degrades per message type.
    pub async fn process_file(&self, path: &Path) -> Result<FileReport> {
        let started = Instant::now();
        log::info!("Processing {}", path.display());

        let lines = self.reader.read_lines(path)?;
        let batch = self.parser.group(lines);

        let known = self.store.active_msg_types().await;
        let mut unknown_groups: HashMap<String, Vec<AnonymizedLine>> = HashMap::new();
        let mut known_types = 0usize;
        for (msg_type, group) in &batch.groups {
            if known.contains(msg_type) {
                log::debug!("msg_type {msg_type} already has an active schema");
                known_types += 1;
                continue;
            }
            unknown_groups.insert(msg_type.clone(), self.anonymizer.anonymize_group(group));
        }
        let unknown_types = unknown_groups.len();

        let inference = self.inferencer.infer_all(unknown_groups).await;

        let mut stored = Vec::new();
        let mut skipped = Vec::new();
        let mut failed: HashMap<String, String> = inference.errors.clone();

        // One store attempt per inferred message type; every FieldMapping
        // of a type carries the same map.
        let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
        for mapping in &inference.mappings {
            if !seen.insert(mapping.msg_type.as_str()) {
                continue;
            }
            match self.store.store_if_absent(mapping).await {
                Ok(StoreOutcome::Inserted { .. }) => stored.push(mapping.msg_type.clone()),
                Ok(StoreOutcome::Skipped) => skipped.push(mapping.msg_type.clone()),
                Err(err) => {
                    log::error!("Failed to store mapping for {}: {err}", mapping.msg_type);
                    failed.insert(mapping.msg_type.clone(), err.to_string());
                }
            }
        }
        stored.sort();
        skipped.sort();

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = FileReport {
            path: path.to_path_buf(),
            total_lines: batch.total_lines,
            valid_lines: batch.valid_lines,
            parse_issues: batch.issues.len(),
            known_types,
            unknown_types,
            stored,
            skipped,
            failed,
            duration_ms,
        };
        log::info!(
            "Processed {} in {duration_ms}ms: {} stored, {} skipped, {} failed",
            path.display(),
            report.stored.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use feedlens_inference::InferenceError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct CannedGenerator;

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(
            &self,
            _model: &str,
            prompt: &str,
        ) -> feedlens_inference::Result<String> {
            let field_count = prompt
                .split(" fields")
                .next()
                .and_then(|head| head.rsplit(' ').next())
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| InferenceError::Other("no field count in prompt".into()))?;
            let entries: Vec<String> = (1..=field_count)
                .map(|i| format!("\"Champ {i}\": \"Field {i}\""))
                .collect();
            Ok(format!("{{{}}}", entries.join(", ")))
        }
    }

    async fn pipeline(dir: &TempDir) -> (FeedPipeline, Arc<MappingStore>) {
        let store = Arc::new(
            MappingStore::open(dir.path().join("mappings.json"))
                .await
                .unwrap(),
        );
        let config = IngestConfig::default();
        (
            FeedPipeline::new(&config, Arc::new(CannedGenerator), store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn processes_unknown_types_and_stores_once() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&dir).await;

        let file = dir.path().join("FEED1.txt");
        std::fs::write(&file, "077;99;a;b\n078;99;c;d\n077;42;x\nbroken\n").unwrap();

        let report = pipeline.process_file(&file).await.unwrap();
        assert_eq!(report.total_lines, 4);
        assert_eq!(report.valid_lines, 3);
        assert_eq!(report.parse_issues, 1);
        assert_eq!(report.unknown_types, 2);
        assert_eq!(report.stored, vec!["42", "99"]);
        assert!(report.failed.is_empty());
        assert_eq!(store.count().await, 2);

        let mapping = store.find_by_msg_type("99").await.unwrap();
        assert_eq!(mapping.mapping.len(), 4);
    }

    #[tokio::test]
    async fn known_types_are_not_reinferred() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&dir).await;

        let file = dir.path().join("FEED1.txt");
        std::fs::write(&file, "077;99;a;b\n").unwrap();
        pipeline.process_file(&file).await.unwrap();

        let second = pipeline.process_file(&file).await.unwrap();
        assert_eq!(second.known_types, 1);
        assert_eq!(second.unknown_types, 0);
        assert!(second.stored.is_empty());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error_not_a_panic() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _store) = pipeline(&dir).await;
        let missing = dir.path().join("FEED_GONE.txt");
        assert!(pipeline.process_file(&missing).await.is_err());
    }
}
