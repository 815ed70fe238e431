//! # Code Runner Core
//!
//! Execution dispatch and response protocol for a multi-language code runner.
//! A [`Dispatcher`] routes each submitted program to the backend registered
//! for its language, applies the timeout policy, and normalizes whatever
//! comes back into exactly one [`RunOutcome`].
//!
//! Backends:
//!
//! - **javascript**: an embedded script evaluator with a capturing `console`
//! - **python**: a WASI build of CPython, loaded once on first use
//! - **cpp**: a stub that reports compilation is unavailable
//! - **java**: listed, but answered with a fixed not-implemented message

mod config;
mod dispatcher;
mod error;
mod executor;
pub mod languages;
mod registry;
mod service;
mod types;
mod worker;

#[cfg(test)]
mod tests;

pub use config::{
    DispatchConfig, PythonConfig, RunnerConfig, DEFAULT_PYTHON_RUNTIME_URL, DEFAULT_TIMEOUT_MS,
};
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use executor::ExecutionBackend;
pub use languages::LanguageSpec;
pub use registry::{BackendFactory, BackendHandle, BackendRegistry};
pub use service::RunnerService;
pub use types::{
    BackendState, FailureKind, Language, RunOutcome, RunReport, RunRequest, RunStatus,
    WorkerRequest, WorkerResponse, UNDEFINED_RESULT,
};
pub use worker::Worker;

/// Result type for code runner operations
pub type Result<T> = std::result::Result<T, Error>;
