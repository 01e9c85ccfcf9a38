use async_trait::async_trait;
use feedlens_ingest::{FeedPipeline, FeedService, IngestConfig};
use feedlens_inference::{InferenceError, TextGenerator};
use feedlens_store::MappingStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _model: &str, prompt: &str) -> feedlens_inference::Result<String> {
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

#[cfg_attr(
    not(target_os = "linux"),
    ignore = "watcher latency is only reliable on Linux"
)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn file_is_processed_after_stabilization() {
    let temp = TempDir::new().expect("tempdir");
    let input_dir = temp.path().join("in");

    let config = IngestConfig {
        input_dir: input_dir.clone(),
        stabilization_delay: Duration::from_millis(700),
        check_interval: Duration::from_millis(100),
        ..IngestConfig::default()
    };

    let store = Arc::new(
        MappingStore::open(temp.path().join("mappings.json"))
            .await
            .expect("open store"),
    );
    let pipeline = FeedPipeline::new(&config, Arc::new(CannedGenerator), store.clone());
    let service = FeedService::start(config, pipeline).expect("start service");
    let mut reports = service.subscribe_reports();

    tokio::fs::write(input_dir.join("FEED20250101.txt"), "077;99;a;b\n078;42;x\n")
        .await
        .expect("write feed");

    // Well before the stabilization delay nothing may be persisted.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(store.count().await, 0, "processed before stabilization");

    // Within one check interval after the delay the file must land.
    let report = tokio::time::timeout(Duration::from_secs(10), reports.recv())
        .await
        .expect("no file report within 10s")
        .expect("report channel closed");
    assert_eq!(report.stored, vec!["42", "99"]);
    assert!(report.failed.is_empty());
    assert!(store.exists("99").await, "msg_type 99 not persisted");
    assert!(store.exists("42").await, "msg_type 42 not persisted");

    let deadline = Instant::now() + Duration::from_secs(5);
    while service.health_snapshot().files_processed < 1 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let health = service.health_snapshot();
    assert_eq!(health.files_processed, 1);
    assert!(health.last_error.is_none());

    service.shutdown().await.expect("shutdown");
}

#[cfg_attr(
    not(target_os = "linux"),
    ignore = "watcher latency is only reliable on Linux"
)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn preexisting_files_are_swept_on_startup() {
    let temp = TempDir::new().expect("tempdir");
    let input_dir = temp.path().join("in");
    tokio::fs::create_dir_all(&input_dir).await.expect("mkdir");
    tokio::fs::write(input_dir.join("FEED_OLD.txt"), "077;07;x;y\n")
        .await
        .expect("write feed");

    let config = IngestConfig {
        input_dir,
        stabilization_delay: Duration::from_millis(300),
        check_interval: Duration::from_millis(100),
        ..IngestConfig::default()
    };
    let store = Arc::new(
        MappingStore::open(temp.path().join("mappings.json"))
            .await
            .expect("open store"),
    );
    let pipeline = FeedPipeline::new(&config, Arc::new(CannedGenerator), store.clone());
    let service = FeedService::start(config, pipeline).expect("start service");

    let deadline = Instant::now() + Duration::from_secs(10);
    while !store.exists("07").await && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(store.exists("07").await, "swept file not processed");

    service.shutdown().await.expect("shutdown");
}
