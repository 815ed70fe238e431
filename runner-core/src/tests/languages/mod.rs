use super::utils::defaults::*;
pub use super::*;
use crate::{Language, Result, RunOutcome, RunRequest, RunnerService};

pub mod javascript;
pub mod python;

// Common test utilities for language tests
pub(crate) async fn run_with_standard_backends(language: Language, code: &str) -> Result<RunOutcome> {
    let service = RunnerService::new(test_config(default_timeout()))?;
    let report = service.run(RunRequest::new(language, code)).await?;
    assert_eq!(report.language, Some(language));
    Ok(report.outcome)
}

pub(crate) async fn test_sample_source(language: Language, expected_logs: &[&str]) -> Result<()> {
    let sample = crate::languages::spec(language).sample_source;
    match run_with_standard_backends(language, sample).await? {
        RunOutcome::Success { logs, .. } => {
            assert_eq!(logs, expected_logs);
            Ok(())
        }
        other => panic!("sample for {} did not succeed: {:?}", language, other),
    }
}
