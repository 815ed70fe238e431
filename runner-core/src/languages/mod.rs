//! Language catalog and backend implementations

mod cpp;
mod java;
mod javascript;
mod python;
mod wasi_python;

pub use cpp::{CompilerStubBackend, STUB_LOGS as CPP_STUB_LOGS, STUB_RESULT as CPP_STUB_RESULT};
pub use java::NOT_IMPLEMENTED_MESSAGE as JAVA_STUB_MESSAGE;
pub use javascript::ScriptBackend;
pub use python::{Interpreter, InterpreterBackend, ProgramRun, RuntimeLoader};
pub use wasi_python::{WasiPython, WasiPythonLoader};

use serde::Serialize;

use crate::types::Language;

/// Registry entry describing one selectable language
#[derive(Debug, Clone, Serialize)]
pub struct LanguageSpec {
    pub language: Language,
    pub id: &'static str,
    pub display_label: &'static str,
    pub editor_mode: &'static str,
    /// Whether an unanswered run is abandoned after the dispatch countdown
    pub timeout_eligible: bool,
    pub sample_source: &'static str,
}

static CATALOG: [LanguageSpec; 4] = [
    LanguageSpec {
        language: Language::JavaScript,
        id: "javascript",
        display_label: "JavaScript",
        editor_mode: "javascript",
        timeout_eligible: true,
        sample_source: javascript::SAMPLE_SOURCE,
    },
    LanguageSpec {
        language: Language::Python,
        id: "python",
        display_label: "Python",
        editor_mode: "python",
        // First use downloads the interpreter.
        timeout_eligible: false,
        sample_source: python::SAMPLE_SOURCE,
    },
    LanguageSpec {
        language: Language::Cpp,
        id: "cpp",
        display_label: "C++",
        editor_mode: "cpp",
        timeout_eligible: false,
        sample_source: cpp::SAMPLE_SOURCE,
    },
    LanguageSpec {
        language: Language::Java,
        id: "java",
        display_label: "Java",
        editor_mode: "java",
        timeout_eligible: false,
        sample_source: java::SAMPLE_SOURCE,
    },
];

pub fn catalog() -> &'static [LanguageSpec] {
    &CATALOG
}

pub fn spec(language: Language) -> &'static LanguageSpec {
    match language {
        Language::JavaScript => &CATALOG[0],
        Language::Python => &CATALOG[1],
        Language::Cpp => &CATALOG[2],
        Language::Java => &CATALOG[3],
    }
}

/// Editor mode for a language id; unrecognized ids fall back to javascript
pub fn editor_mode(id: &str) -> &'static str {
    id.parse::<Language>()
        .map(|language| spec(language).editor_mode)
        .unwrap_or(CATALOG[0].editor_mode)
}
