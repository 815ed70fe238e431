use async_trait::async_trait;

use crate::{
    error::Error,
    types::{BackendState, Language, WorkerRequest, WorkerResponse},
};

/// Trait for language-specific execution backends
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Language this backend executes
    fn language(&self) -> Language;

    /// Current lifecycle state of the backend's runtime
    fn state(&self) -> BackendState {
        BackendState::Ready
    }

    /// Bring the runtime up. Backends without a runtime are always ready.
    async fn prepare(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Execute one request and produce its terminal message.
    ///
    /// Program errors are reported as [`WorkerResponse::Error`]. An `Err` here
    /// means the backend itself broke down and no message could be produced.
    async fn execute(&self, request: WorkerRequest) -> Result<WorkerResponse, Error>;
}
