use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::Error,
    executor::ExecutionBackend,
    types::{Language, WorkerRequest, WorkerResponse},
};

const LANG: &str = "cpp";

pub(crate) const SAMPLE_SOURCE: &str = r#"#include <iostream>
using namespace std;

int main() {
    cout << "Hello from C++!" << endl;
    
    int a = 2, b = 3;
    cout << a << " + " << b << " = " << (a + b) << endl;
    
    return 0;
}"#;

/// Fixed notes returned in place of compiler output
pub const STUB_LOGS: [&str; 3] = [
    "[C++ Execution Module Initialized]",
    "Note: Full Emscripten compilation requires browser support for WASM compilation.",
    "For production, use a backend compiler or pre-compiled WASM modules.",
];

pub const STUB_RESULT: &str = "(WebAssembly execution ready)";

/// Stands in for an in-process C++ toolchain.
///
/// Nothing is compiled: every request succeeds with the same informational
/// logs and placeholder result, whatever the source contains.
#[derive(Debug, Default)]
pub struct CompilerStubBackend;

impl CompilerStubBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutionBackend for CompilerStubBackend {
    fn language(&self) -> Language {
        Language::Cpp
    }

    async fn execute(&self, request: WorkerRequest) -> Result<WorkerResponse, Error> {
        debug!(bytes = request.code.len(), "c++ source accepted without compilation");
        Ok(WorkerResponse::success(
            LANG,
            STUB_LOGS.iter().map(|line| line.to_string()).collect(),
            Some(STUB_RESULT.to_string()),
        ))
    }
}
