use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::error::Error;

/// Result text reported when a program produces no final value
pub const UNDEFINED_RESULT: &str = "(undefined)";

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Cpp,
    Java,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::JavaScript,
        Language::Python,
        Language::Cpp,
        Language::Java,
    ];

    /// Identifier used on the wire and in language selection
    pub fn id(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Java => "java",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "javascript" => Ok(Language::JavaScript),
            "python" => Ok(Language::Python),
            "cpp" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A submitted program. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub language: Language,
    pub source: String,
}

impl RunRequest {
    pub fn new(language: Language, source: impl Into<String>) -> Self {
        Self {
            language,
            source: source.into(),
        }
    }
}

/// Request message posted to a backend worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub lang: String,
    pub code: String,
}

impl From<&RunRequest> for WorkerRequest {
    fn from(request: &RunRequest) -> Self {
        Self {
            lang: request.language.id().to_string(),
            code: request.source.clone(),
        }
    }
}

/// Terminal message emitted by a backend worker, one per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerResponse {
    Success {
        lang: String,
        logs: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<String>,
    },
    Error {
        lang: String,
        logs: Vec<String>,
        error: String,
    },
}

impl WorkerResponse {
    pub fn success(lang: &str, logs: Vec<String>, result: Option<String>) -> Self {
        WorkerResponse::Success {
            lang: lang.to_string(),
            logs,
            result,
        }
    }

    pub fn error(lang: &str, logs: Vec<String>, error: impl Into<String>) -> Self {
        WorkerResponse::Error {
            lang: lang.to_string(),
            logs,
            error: error.into(),
        }
    }

    pub fn lang(&self) -> &str {
        match self {
            WorkerResponse::Success { lang, .. } | WorkerResponse::Error { lang, .. } => lang,
        }
    }

    pub fn logs(&self) -> &[String] {
        match self {
            WorkerResponse::Success { logs, .. } | WorkerResponse::Error { logs, .. } => logs,
        }
    }
}

/// Why a run ended in failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The program raised an error
    Execution,
    /// The backend runtime never became ready
    BackendInit,
    /// The worker terminated without a normal response
    WorkerCrash,
    /// No backend is registered for the language
    UnknownLanguage,
    /// The language is listed but has no execution backend
    NotImplemented,
}

/// Normalized terminal outcome of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunOutcome {
    Success {
        logs: Vec<String>,
        result: String,
    },
    Failure {
        kind: FailureKind,
        logs: Vec<String>,
        error: String,
    },
    Timeout {
        #[serde(with = "duration_ms")]
        after: Duration,
    },
}

impl RunOutcome {
    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        RunOutcome::Failure {
            kind,
            logs: Vec::new(),
            error: error.into(),
        }
    }

    pub fn status(&self) -> RunStatus {
        match self {
            RunOutcome::Success { .. } => RunStatus::Success,
            RunOutcome::Failure {
                kind: FailureKind::NotImplemented,
                ..
            } => RunStatus::Stub,
            RunOutcome::Failure { .. } | RunOutcome::Timeout { .. } => RunStatus::Error,
        }
    }

    pub fn logs(&self) -> &[String] {
        match self {
            RunOutcome::Success { logs, .. } | RunOutcome::Failure { logs, .. } => logs,
            RunOutcome::Timeout { .. } => &[],
        }
    }
}

/// Status indicator shown for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Success,
    Error,
    Stub,
}

impl ToString for RunStatus {
    fn to_string(&self) -> String {
        match self {
            RunStatus::Running => "running".to_string(),
            RunStatus::Success => "success".to_string(),
            RunStatus::Error => "error".to_string(),
            RunStatus::Stub => "stub".to_string(),
        }
    }
}

/// Lifecycle of a backend's runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// A delivered outcome together with its bookkeeping
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub id: Uuid,
    /// `None` when the requested language id was not recognized
    pub language: Option<Language>,
    pub outcome: RunOutcome,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        self.outcome.status()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
