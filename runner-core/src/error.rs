use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Backend failed to initialize: {0}")]
    BackendInit(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Timeout after {0} ms")]
    Timeout(u64),

    #[error("Worker error ({worker}): {message}")]
    WorkerCrash { worker: String, message: String },

    #[error("A run is already in progress")]
    Busy,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
