use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Producer-side "ring full". The offered sample was not stored.
    #[error("Sample ring full")]
    Overflow,

    /// Consumer-side "ring empty". Nothing was dequeued.
    #[error("Sample ring empty")]
    Underflow,

    #[error("Filter history allocation failed: {0}")]
    Allocation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sample source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
