//! Routes run requests to backends and normalizes what comes back.
//!
//! The dispatcher accepts one run at a time. For timeout-eligible languages it
//! races the backend's reply against a countdown; when the countdown wins the
//! reply receiver is dropped, so a late answer from the worker has nowhere to
//! go and is discarded by the worker loop.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::{
    error::Error,
    languages,
    registry::{BackendHandle, BackendRegistry},
    types::{
        BackendState, FailureKind, Language, RunOutcome, RunReport, RunRequest, WorkerRequest,
        WorkerResponse, UNDEFINED_RESULT,
    },
    worker::Worker,
};

pub struct Dispatcher {
    registry: Arc<BackendRegistry>,
    timeout: Duration,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the run ends or is cancelled
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Dispatcher {
    pub fn new(registry: Arc<BackendRegistry>, timeout: Duration) -> Self {
        Self {
            registry,
            timeout,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run a request to its single terminal outcome.
    ///
    /// Fails only with [`Error::Busy`] when another run is still in flight;
    /// every other condition is reported inside the returned outcome.
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, Error> {
        let _guard = self.acquire()?;
        let id = Uuid::new_v4();
        let language = request.language;
        let started = Instant::now();

        let span = tracing::info_span!("run", %id, %language);
        let outcome = self.dispatch(&request).instrument(span).await;

        Ok(RunReport {
            id,
            language: Some(language),
            outcome,
            elapsed: started.elapsed(),
        })
    }

    /// Like [`Dispatcher::run`], for a language given by id.
    /// An unrecognized id yields an `UnknownLanguage` failure.
    pub async fn run_source(&self, language: &str, source: String) -> Result<RunReport, Error> {
        match language.parse::<Language>() {
            Ok(language) => self.run(RunRequest::new(language, source)).await,
            Err(e) => {
                let _guard = self.acquire()?;
                warn!("rejecting run for {}", e);
                Ok(RunReport {
                    id: Uuid::new_v4(),
                    language: None,
                    outcome: RunOutcome::failure(FailureKind::UnknownLanguage, e.to_string()),
                    elapsed: Duration::ZERO,
                })
            }
        }
    }

    fn acquire(&self) -> Result<InFlightGuard<'_>, Error> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::Busy)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    async fn dispatch(&self, request: &RunRequest) -> RunOutcome {
        let handle = match self.registry.resolve(request.language) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("no backend: {}", e);
                return RunOutcome::failure(FailureKind::UnknownLanguage, e.to_string());
            }
        };

        let worker = match handle.as_ref() {
            BackendHandle::Stub { message } => {
                info!("language has no backend, returning stub");
                return RunOutcome::failure(FailureKind::NotImplemented, message.clone());
            }
            BackendHandle::Worker(worker) => worker,
        };

        let reply = match worker.post(WorkerRequest::from(request)) {
            Ok(reply) => reply,
            Err(e) => return crash_outcome(worker, e),
        };

        let received = if languages::spec(request.language).timeout_eligible {
            debug!(timeout_ms = self.timeout.as_millis() as u64, "countdown started");
            match tokio::time::timeout(self.timeout, reply).await {
                Ok(received) => received,
                Err(_) => {
                    warn!("no response within {:?}, abandoning run", self.timeout);
                    return RunOutcome::Timeout {
                        after: self.timeout,
                    };
                }
            }
        } else {
            reply.await
        };

        match received {
            Ok(Ok(response)) => normalize(worker, response),
            Ok(Err(e)) => crash_outcome(worker, e),
            Err(_) => crash_outcome(
                worker,
                Error::WorkerCrash {
                    worker: worker.name().to_string(),
                    message: "worker terminated without responding".to_string(),
                },
            ),
        }
    }
}

fn normalize(worker: &Worker, response: WorkerResponse) -> RunOutcome {
    match response {
        WorkerResponse::Success { logs, result, .. } => {
            info!(logs = logs.len(), "run succeeded");
            RunOutcome::Success {
                logs,
                result: result.unwrap_or_else(|| UNDEFINED_RESULT.to_string()),
            }
        }
        WorkerResponse::Error { logs, error, .. } => {
            let kind = if worker.state() == BackendState::Failed {
                FailureKind::BackendInit
            } else {
                FailureKind::Execution
            };
            info!(?kind, "run failed");
            RunOutcome::Failure { kind, logs, error }
        }
    }
}

fn crash_outcome(worker: &Worker, error: Error) -> RunOutcome {
    warn!(worker = worker.name(), "worker crashed: {}", error);
    let message = match error {
        Error::WorkerCrash { message, .. } => message,
        other => other.to_string(),
    };
    RunOutcome::failure(FailureKind::WorkerCrash, message)
}
