use feedlens_anonymizer::AnonymizationMode;
use feedlens_inference::GenerationSettings;
use feedlens_parser::DEFAULT_FEED_PATTERN;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_INPUT_DIR: &str = "input/feeds";
const DEFAULT_STABILIZATION_DELAY_MINUTES: u64 = 5;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
const DEFAULT_PRIMARY_MODEL: &str = "mistral";
const DEFAULT_FALLBACK_MODEL: &str = "llama3";
const DEFAULT_INFERENCE_CONCURRENCY: usize = 4;
const MAX_CHECK_INTERVAL_SECS: u64 = 3_600;

/// Runtime configuration of the ingestion service, env-first with CLI or
/// test overrides on top.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub input_dir: PathBuf,
    pub file_pattern: String,
    pub stabilization_delay: Duration,
    pub check_interval: Duration,
    pub max_file_size_mb: u64,
    pub anonymization_mode: AnonymizationMode,
    pub primary_model: String,
    pub fallback_model: String,
    pub inference_concurrency: usize,
    pub generation: GenerationSettings,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            file_pattern: DEFAULT_FEED_PATTERN.to_string(),
            stabilization_delay: Duration::from_secs(DEFAULT_STABILIZATION_DELAY_MINUTES * 60),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            anonymization_mode: AnonymizationMode::Classified,
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            inference_concurrency: DEFAULT_INFERENCE_CONCURRENCY,
            generation: GenerationSettings::default(),
        }
    }
}

impl IngestConfig {
    /// Build from `FEEDLENS_*` environment variables, falling back to the
    /// defaults field by field.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut generation = defaults.generation.clone();
        generation.base_url = env_string("FEEDLENS_LLM_BASE_URL", &generation.base_url);
        generation.timeout_secs = env_u64("FEEDLENS_LLM_TIMEOUT_SECS", generation.timeout_secs)
            .clamp(1, 3_600);
        generation.max_retries =
            env_u64("FEEDLENS_LLM_MAX_RETRIES", u64::from(generation.max_retries)).min(10) as u32;
        generation.temperature = env_f32("FEEDLENS_LLM_TEMPERATURE", generation.temperature)
            .clamp(0.0, 2.0);
        generation.max_tokens =
            env_u64("FEEDLENS_LLM_MAX_TOKENS", u64::from(generation.max_tokens)).clamp(16, 32_768)
                as u32;

        Self {
            input_dir: PathBuf::from(env_string(
                "FEEDLENS_INPUT_DIR",
                &defaults.input_dir.display().to_string(),
            )),
            file_pattern: env_string("FEEDLENS_FILE_PATTERN", &defaults.file_pattern),
            stabilization_delay: Duration::from_secs(
                env_u64(
                    "FEEDLENS_STABILIZATION_DELAY_MINUTES",
                    DEFAULT_STABILIZATION_DELAY_MINUTES,
                ) * 60,
            ),
            check_interval: Duration::from_secs(
                env_u64("FEEDLENS_CHECK_INTERVAL_SECS", DEFAULT_CHECK_INTERVAL_SECS)
                    .clamp(1, MAX_CHECK_INTERVAL_SECS),
            ),
            max_file_size_mb: env_u64("FEEDLENS_MAX_FILE_SIZE_MB", DEFAULT_MAX_FILE_SIZE_MB)
                .max(1),
            anonymization_mode: match env_string("FEEDLENS_ANONYMIZATION_MODE", "classified")
                .to_lowercase()
                .as_str()
            {
                "coarse" => AnonymizationMode::Coarse,
                _ => AnonymizationMode::Classified,
            },
            primary_model: env_string("FEEDLENS_LLM_MODEL", &defaults.primary_model),
            fallback_model: env_string("FEEDLENS_LLM_FALLBACK_MODEL", &defaults.fallback_model),
            inference_concurrency: env_u64(
                "FEEDLENS_INFERENCE_CONCURRENCY",
                DEFAULT_INFERENCE_CONCURRENCY as u64,
            )
            .clamp(1, 16) as usize,
            generation,
        }
    }

    #[must_use]
    pub const fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

fn env_string(key: &str, default_value: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default_value.to_string())
}

fn env_u64(key: &str, default_value: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default_value)
}

fn env_f32(key: &str, default_value: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default_value)
}
