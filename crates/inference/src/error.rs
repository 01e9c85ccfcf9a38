use thiserror::Error;

pub type Result<T> = std::result::Result<T, InferenceError>;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Generation failed for model '{model}': {reason}")]
    GenerationFailed { model: String, reason: String },

    #[error("No JSON object found in model reply")]
    NoJsonObject,

    #[error("Model reply is not a usable field mapping: {0}")]
    MalformedMapping(String),

    #[error("Message type '{0}' has no anonymized lines to infer from")]
    EmptyGroup(String),

    #[error("Inference task panicked: {0}")]
    TaskFailed(String),

    #[error("{0}")]
    Other(String),
}
