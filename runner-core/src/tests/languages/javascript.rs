use super::*;
use crate::{FailureKind, UNDEFINED_RESULT};

#[tokio::test]
async fn test_javascript_sample_source() -> Result<()> {
    test_sample_source(
        Language::JavaScript,
        &["Hello from the JavaScript sandbox!", "2 + 3 = 5"],
    )
    .await
}

#[tokio::test]
async fn test_javascript_object_result() -> Result<()> {
    let outcome =
        run_with_standard_backends(Language::JavaScript, "const xs = [1, 2, 3]; xs.map(x => x * 2)")
            .await?;
    assert_eq!(
        outcome,
        RunOutcome::Success {
            logs: vec![],
            result: "2,4,6".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_javascript_empty_program() -> Result<()> {
    let outcome = run_with_standard_backends(Language::JavaScript, "").await?;
    assert_eq!(
        outcome,
        RunOutcome::Success {
            logs: vec![],
            result: UNDEFINED_RESULT.to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_javascript_reference_error() -> Result<()> {
    let outcome = run_with_standard_backends(Language::JavaScript, "console.log('a'); missing()").await?;
    match outcome {
        RunOutcome::Failure { kind, logs, error } => {
            assert_eq!(kind, FailureKind::Execution);
            assert_eq!(logs, vec!["a"]);
            assert!(error.contains("missing"));
        }
        other => panic!("expected reference error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_javascript_globals_do_not_leak_between_runs() -> Result<()> {
    let service = RunnerService::new(test_config(default_timeout()))?;
    service
        .run(RunRequest::new(Language::JavaScript, "globalThis.counter = 41"))
        .await?;
    let report = service
        .run(RunRequest::new(Language::JavaScript, "typeof counter"))
        .await?;
    assert_eq!(
        report.outcome,
        RunOutcome::Success {
            logs: vec![],
            result: "undefined".to_string(),
        }
    );
    Ok(())
}
