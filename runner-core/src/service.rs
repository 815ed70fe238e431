use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    config::RunnerConfig,
    dispatcher::Dispatcher,
    error::Error,
    languages::{
        self, CompilerStubBackend, InterpreterBackend, LanguageSpec, ScriptBackend,
        WasiPythonLoader, JAVA_STUB_MESSAGE,
    },
    registry::BackendRegistry,
    types::{BackendState, Language, RunReport, RunRequest},
};

/// The runner as a whole: registry, dispatcher and configuration
pub struct RunnerService {
    dispatcher: Dispatcher,
    config: RunnerConfig,
}

impl RunnerService {
    /// Build the standard set of backends from `config`.
    ///
    /// Must be called inside a tokio runtime when `python.eager` is set.
    pub fn new(config: RunnerConfig) -> Result<Self, Error> {
        config.validate()?;
        let loader = Arc::new(WasiPythonLoader::new(&config.python)?);

        let registry = BackendRegistry::new()
            .with_backend(Language::JavaScript, || Arc::new(ScriptBackend::new()))
            .with_backend(Language::Python, move || {
                Arc::new(InterpreterBackend::new(loader.clone()))
            })
            .with_backend(Language::Cpp, || Arc::new(CompilerStubBackend::new()))
            .with_stub(Language::Java, JAVA_STUB_MESSAGE);

        let service = Self::with_registry(registry, config);
        if service.config.python.eager {
            info!("warming up python runtime");
            service.registry().warm_up(Language::Python)?;
        }
        Ok(service)
    }

    /// Use a caller-assembled registry
    pub fn with_registry(registry: BackendRegistry, config: RunnerConfig) -> Self {
        debug!(timeout_ms = config.dispatch.timeout_ms, "creating runner service");
        Self {
            dispatcher: Dispatcher::new(Arc::new(registry), config.timeout()),
            config,
        }
    }

    pub async fn run(&self, request: RunRequest) -> Result<RunReport, Error> {
        self.dispatcher.run(request).await
    }

    pub async fn run_source(&self, language: &str, source: String) -> Result<RunReport, Error> {
        self.dispatcher.run_source(language, source).await
    }

    pub fn languages(&self) -> &'static [LanguageSpec] {
        languages::catalog()
    }

    /// Lifecycle state of a language's backend, if it has been started
    pub fn backend_state(&self, language: Language) -> Result<BackendState, Error> {
        Ok(self.registry().resolve(language)?.state())
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        self.dispatcher.registry()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}
