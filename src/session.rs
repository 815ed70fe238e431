use std::sync::Arc;
use tracing::{info, warn};

use runner_core::{languages, Language, Result, RunReport, RunRequest, RunStatus, RunnerService};

use crate::{
    editor::Editor,
    render::{format_outcome, Renderer},
};

/// One user session: the editor, the selected language and where output goes
pub struct AppContext<E, R> {
    service: Arc<RunnerService>,
    editor: E,
    renderer: R,
    language: Language,
}

impl<E: Editor, R: Renderer> AppContext<E, R> {
    /// Start a session on javascript with its sample program loaded
    pub fn new(service: Arc<RunnerService>, editor: E, renderer: R) -> Self {
        let mut context = Self {
            service,
            editor,
            renderer,
            language: Language::JavaScript,
        };
        context.select_language(Language::JavaScript);
        context
    }

    /// Switch language, replacing the buffer with that language's sample
    pub fn select_language(&mut self, language: Language) {
        let entry = languages::spec(language);
        self.language = language;
        self.editor.set_mode(entry.id);
        self.editor.set_value(entry.sample_source.to_string());
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn service(&self) -> &Arc<RunnerService> {
        &self.service
    }

    /// Run the buffer and render its outcome.
    ///
    /// Nothing is rendered when the shared service is busy with another run.
    pub async fn run(&mut self) -> Result<RunReport> {
        let request = RunRequest::new(self.language, self.editor.value());
        self.renderer.show_output("");
        self.renderer.set_status(RunStatus::Running);

        let report = match self.service.run(request).await {
            Ok(report) => report,
            Err(e) => {
                warn!("run rejected: {}", e);
                return Err(e);
            }
        };

        info!(id = %report.id, status = ?report.status(), "rendering outcome");
        self.renderer
            .show_output(&format_outcome(self.language, &report.outcome));
        self.renderer.set_status(report.status());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{editor::SourceBuffer, render::TextRenderer};
    use runner_core::{
        languages::{ScriptBackend, JAVA_STUB_MESSAGE},
        BackendRegistry, RunnerConfig,
    };

    #[derive(Default)]
    struct Recording {
        statuses: Vec<RunStatus>,
        outputs: Vec<String>,
    }

    impl Renderer for Recording {
        fn set_status(&mut self, status: RunStatus) {
            self.statuses.push(status);
        }

        fn show_output(&mut self, text: &str) {
            self.outputs.push(text.to_string());
        }
    }

    fn service() -> Arc<RunnerService> {
        let registry = BackendRegistry::new()
            .with_backend(Language::JavaScript, || Arc::new(ScriptBackend::new()))
            .with_stub(Language::Java, JAVA_STUB_MESSAGE);
        Arc::new(RunnerService::with_registry(
            registry,
            RunnerConfig::default().with_eager_python(false),
        ))
    }

    #[tokio::test]
    async fn test_select_language_loads_sample() {
        let mut context = AppContext::new(service(), SourceBuffer::new(), TextRenderer::new());
        assert!(context.editor().value().contains("Hello from the JavaScript sandbox!"));

        context.select_language(Language::Cpp);
        assert_eq!(context.language(), Language::Cpp);
        assert_eq!(context.editor().mode(), "cpp");
        assert!(context.editor().value().contains("Hello from C++!"));
    }

    #[tokio::test]
    async fn test_run_renders_exactly_once() {
        let mut context = AppContext::new(service(), SourceBuffer::new(), Recording::default());
        context
            .editor_mut()
            .set_value("console.log('hi'); 1+1".to_string());

        let report = context.run().await.unwrap();
        assert_eq!(report.status(), RunStatus::Success);

        let renderer = context.renderer();
        assert_eq!(renderer.statuses, vec![RunStatus::Running, RunStatus::Success]);
        assert_eq!(
            renderer.outputs,
            vec![
                String::new(),
                "Console output:\nhi\n\nExecution result:\n2".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_java_renders_stub_note() {
        let mut context = AppContext::new(service(), SourceBuffer::new(), TextRenderer::new());
        context.select_language(Language::Java);

        context.run().await.unwrap();
        assert_eq!(context.renderer().status(), Some(RunStatus::Stub));
        assert_eq!(context.renderer().output(), JAVA_STUB_MESSAGE);
    }

    #[tokio::test]
    async fn test_unregistered_language_renders_error() {
        let mut context = AppContext::new(service(), SourceBuffer::new(), TextRenderer::new());
        context.select_language(Language::Python);

        context.run().await.unwrap();
        assert_eq!(context.renderer().status_text(), "Error ❌");
        assert_eq!(context.renderer().output(), "Error:\nUnknown language: python");
    }
}
