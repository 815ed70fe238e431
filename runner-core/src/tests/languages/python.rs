use super::{
    fixtures::code_samples::PYTHON_LOG_AND_VALUE,
    utils::backends::StaticLoader,
};
use super::*;
use crate::{languages::InterpreterBackend, BackendRegistry, BackendState, RunStatus};
use std::sync::Arc;

fn service_with_fake_runtime() -> RunnerService {
    let loader = Arc::new(StaticLoader { fail_with: None });
    RunnerService::with_registry(
        BackendRegistry::new().with_backend(Language::Python, move || {
            Arc::new(InterpreterBackend::new(loader.clone()))
        }),
        test_config(default_timeout()),
    )
}

#[tokio::test]
async fn test_python_runtime_loads_on_first_run() -> Result<()> {
    let service = service_with_fake_runtime();
    assert_eq!(
        service.backend_state(Language::Python)?,
        BackendState::Uninitialized
    );

    let report = service
        .run(RunRequest::new(Language::Python, "a\nb\nc"))
        .await?;
    assert_eq!(
        report.outcome,
        RunOutcome::Success {
            logs: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            result: "3".to_string(),
        }
    );
    assert_eq!(service.backend_state(Language::Python)?, BackendState::Ready);
    Ok(())
}

#[tokio::test]
async fn test_python_runs_reuse_runtime() -> Result<()> {
    let service = service_with_fake_runtime();
    for _ in 0..3 {
        let report = service
            .run(RunRequest::new(Language::Python, "x"))
            .await?;
        assert_eq!(report.status(), RunStatus::Success);
    }
    assert_eq!(service.backend_state(Language::Python)?, BackendState::Ready);
    Ok(())
}

// Downloads the CPython WASI runtime.
#[tokio::test]
#[ignore]
async fn test_python_with_real_runtime() -> Result<()> {
    let outcome = run_with_standard_backends(Language::Python, PYTHON_LOG_AND_VALUE).await?;
    assert_eq!(
        outcome,
        RunOutcome::Success {
            logs: vec!["hi".to_string()],
            result: "2".to_string(),
        }
    );

    test_sample_source(
        Language::Python,
        &["Hello from the Python sandbox!", "2 + 3 = 5"],
    )
    .await
}
