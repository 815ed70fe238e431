use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    executor::ExecutionBackend,
    languages,
    types::{BackendState, Language},
    worker::Worker,
};

/// Builds a backend the first time its language is resolved
pub type BackendFactory = Box<dyn Fn() -> Arc<dyn ExecutionBackend> + Send + Sync>;

/// What a language resolves to
pub enum BackendHandle {
    /// A live worker in front of a real backend
    Worker(Worker),
    /// A listed language without a backend; yields `message` and never executes
    Stub { message: String },
}

impl BackendHandle {
    pub fn state(&self) -> BackendState {
        match self {
            BackendHandle::Worker(worker) => worker.state(),
            BackendHandle::Stub { .. } => BackendState::Ready,
        }
    }
}

/// Maps languages to backend handles.
///
/// Workers are created lazily and the handle for a language is written once,
/// on its first resolution.
#[derive(Default)]
pub struct BackendRegistry {
    factories: HashMap<Language, BackendFactory>,
    stubs: HashMap<Language, String>,
    handles: Mutex<HashMap<Language, Arc<BackendHandle>>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend<F>(mut self, language: Language, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn ExecutionBackend> + Send + Sync + 'static,
    {
        self.stubs.remove(&language);
        self.factories.insert(language, Box::new(factory));
        self
    }

    pub fn with_stub(mut self, language: Language, message: impl Into<String>) -> Self {
        self.factories.remove(&language);
        self.stubs.insert(language, message.into());
        self
    }

    pub fn is_registered(&self, language: Language) -> bool {
        self.factories.contains_key(&language) || self.stubs.contains_key(&language)
    }

    /// Handle for `language`, creating its worker on first use
    pub fn resolve(&self, language: Language) -> Result<Arc<BackendHandle>, Error> {
        let mut handles = self
            .handles
            .lock()
            .map_err(|_| Error::WorkerCrash {
                worker: "registry".to_string(),
                message: "backend registry lock poisoned".to_string(),
            })?;

        if let Some(handle) = handles.get(&language) {
            return Ok(handle.clone());
        }

        let handle = if let Some(factory) = self.factories.get(&language) {
            info!(%language, "starting {} worker", languages::spec(language).display_label);
            BackendHandle::Worker(Worker::spawn(factory()))
        } else if let Some(message) = self.stubs.get(&language) {
            debug!(%language, "resolved to not-implemented stub");
            BackendHandle::Stub {
                message: message.clone(),
            }
        } else {
            return Err(Error::UnknownLanguage(language.id().to_string()));
        };

        let handle = Arc::new(handle);
        handles.insert(language, handle.clone());
        Ok(handle)
    }

    /// Resolve `language` and start its runtime initialization in the background
    pub fn warm_up(&self, language: Language) -> Result<(), Error> {
        if let BackendHandle::Worker(worker) = self.resolve(language)?.as_ref() {
            let backend = worker.backend().clone();
            tokio::spawn(async move {
                if let Err(e) = backend.prepare().await {
                    warn!(%language, "warm-up failed: {}", e);
                }
            });
        }
        Ok(())
    }
}
