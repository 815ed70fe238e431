use runner_core::{languages, FailureKind, Language, RunOutcome, RunStatus};

/// Receives status changes and the rendered text of each outcome
pub trait Renderer {
    fn set_status(&mut self, status: RunStatus);
    fn show_output(&mut self, text: &str);
}

pub fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Running => "Running…",
        RunStatus::Success => "Done ✅",
        RunStatus::Error => "Error ❌",
        RunStatus::Stub => "Stub only",
    }
}

/// Render one outcome the way the output panel shows it
pub fn format_outcome(language: Language, outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Success { logs, result } => {
            format!("{}Execution result:\n{}", console_section(logs), result)
        }
        RunOutcome::Failure {
            kind: FailureKind::WorkerCrash,
            error,
            ..
        } => format!(
            "Worker Error ({}):\n{}",
            languages::spec(language).display_label,
            error
        ),
        RunOutcome::Failure {
            kind: FailureKind::NotImplemented,
            error,
            ..
        } => error.clone(),
        RunOutcome::Failure { logs, error, .. } => {
            format!("{}Error:\n{}", console_section(logs), error)
        }
        RunOutcome::Timeout { after } => format!(
            "Error: Execution timeout ({} seconds exceeded)",
            after.as_secs()
        ),
    }
}

fn console_section(logs: &[String]) -> String {
    if logs.is_empty() {
        return String::new();
    }
    format!("Console output:\n{}\n\n", logs.join("\n"))
}

/// Keeps the latest status and output in memory
#[derive(Debug, Default)]
pub struct TextRenderer {
    status: Option<RunStatus>,
    output: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<RunStatus> {
        self.status
    }

    pub fn status_text(&self) -> &'static str {
        self.status.map(status_label).unwrap_or("")
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Renderer for TextRenderer {
    fn set_status(&mut self, status: RunStatus) {
        self.status = Some(status);
    }

    fn show_output(&mut self, text: &str) {
        self.output = text.to_string();
    }
}
