use std::future::Future;
use tokio::runtime::{Builder, Runtime};

/// Multi-thread runtime for the front end
fn build() -> std::io::Result<Runtime> {
    Builder::new_multi_thread().enable_all().build()
}

/// Drive `future` to completion, then shut the runtime down without waiting.
///
/// A timed-out script keeps its evaluator thread busy until the script ends,
/// which may be never; dropping the runtime normally would block on it.
pub fn block_on_detached<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_core::{
        languages::ScriptBackend, BackendRegistry, Language, RunOutcome, RunRequest,
        RunnerConfig, RunnerService,
    };
    use std::{sync::mpsc, sync::Arc, thread, time::Duration};

    #[test]
    fn test_runaway_script_does_not_hold_the_runtime() {
        let timeout = Duration::from_millis(100);
        let (done, finished) = mpsc::channel();

        thread::spawn(move || {
            let outcome = block_on_detached(async move {
                let service = RunnerService::with_registry(
                    BackendRegistry::new()
                        .with_backend(Language::JavaScript, || Arc::new(ScriptBackend::new())),
                    RunnerConfig::default()
                        .with_timeout(timeout)
                        .with_eager_python(false),
                );
                service
                    .run(RunRequest::new(Language::JavaScript, "while (true) {}"))
                    .await
                    .map(|report| report.outcome)
            });
            let _ = done.send(outcome);
        });

        let outcome = finished
            .recv_timeout(Duration::from_secs(10))
            .expect("runtime shutdown blocked on the runaway evaluator")
            .unwrap()
            .unwrap();
        assert_eq!(outcome, RunOutcome::Timeout { after: timeout });
    }
}
