//! Request/response channel between the dispatcher and one backend.
//!
//! Each [`Worker`] owns a spawned task that takes envelopes off an unbounded
//! queue and runs them one at a time against its backend, so a slow or hung
//! backend only ever blocks its own queue.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::{
    error::Error,
    executor::ExecutionBackend,
    languages,
    types::{BackendState, Language, WorkerRequest, WorkerResponse},
};

/// Reply half handed back to the dispatcher
pub type Reply = oneshot::Receiver<Result<WorkerResponse, Error>>;

struct Envelope {
    request: WorkerRequest,
    reply: oneshot::Sender<Result<WorkerResponse, Error>>,
}

pub struct Worker {
    name: &'static str,
    backend: Arc<dyn ExecutionBackend>,
    sender: mpsc::UnboundedSender<Envelope>,
    discarded: Arc<AtomicUsize>,
}

impl Worker {
    /// Spawn the worker loop for `backend` on the current runtime
    pub fn spawn(backend: Arc<dyn ExecutionBackend>) -> Self {
        let name = languages::spec(backend.language()).display_label;
        let (sender, receiver) = mpsc::unbounded_channel();
        let discarded = Arc::new(AtomicUsize::new(0));

        tokio::spawn(run_loop(
            name,
            backend.clone(),
            receiver,
            discarded.clone(),
        ));

        Self {
            name,
            backend,
            sender,
            discarded,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn language(&self) -> Language {
        self.backend.language()
    }

    pub fn state(&self) -> BackendState {
        self.backend.state()
    }

    pub fn backend(&self) -> &Arc<dyn ExecutionBackend> {
        &self.backend
    }

    /// Queue a request. The returned receiver yields at most one reply.
    pub fn post(&self, request: WorkerRequest) -> Result<Reply, Error> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(Envelope { request, reply })
            .map_err(|_| Error::WorkerCrash {
                worker: self.name.to_string(),
                message: "worker is no longer running".to_string(),
            })?;
        Ok(receiver)
    }

    /// Replies dropped because nobody was listening any more
    pub fn discarded_responses(&self) -> usize {
        self.discarded.load(Ordering::SeqCst)
    }
}

async fn run_loop(
    name: &'static str,
    backend: Arc<dyn ExecutionBackend>,
    mut receiver: mpsc::UnboundedReceiver<Envelope>,
    discarded: Arc<AtomicUsize>,
) {
    while let Some(Envelope { request, reply }) = receiver.recv().await {
        debug!(worker = name, lang = %request.lang, "worker received request");

        let task_backend = backend.clone();
        let outcome = tokio::spawn(async move { task_backend.execute(request).await }).await;

        let message = match outcome {
            Ok(result) => result,
            Err(join_error) => {
                error!(worker = name, "backend task aborted: {}", join_error);
                Err(Error::WorkerCrash {
                    worker: name.to_string(),
                    message: panic_message(join_error),
                })
            }
        };

        if reply.send(message).is_err() {
            discarded.fetch_add(1, Ordering::SeqCst);
            debug!(worker = name, "discarding response for abandoned request");
        }
    }

    warn!(worker = name, "worker loop stopped");
}

fn panic_message(join_error: tokio::task::JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }
    let payload = join_error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "backend panicked".to_string()
    }
}
