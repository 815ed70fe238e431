pub mod defaults {
    use crate::RunnerConfig;
    use tokio::time::Duration;

    pub fn default_timeout() -> Duration {
        Duration::from_secs(5)
    }

    pub fn short_timeout() -> Duration {
        Duration::from_millis(50)
    }

    pub fn test_config(timeout: Duration) -> RunnerConfig {
        RunnerConfig::default()
            .with_timeout(timeout)
            .with_eager_python(false)
    }
}

pub mod backends {
    use crate::{
        languages::{Interpreter, ProgramRun, RuntimeLoader},
        Error, ExecutionBackend, Language, WorkerRequest, WorkerResponse,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::time::Duration;

    /// Echoes the submitted code as its only log; code `"slow"` waits `delay` first
    pub struct Delayed {
        pub language: Language,
        pub delay: Duration,
    }

    #[async_trait]
    impl ExecutionBackend for Delayed {
        fn language(&self) -> Language {
            self.language
        }

        async fn execute(&self, request: WorkerRequest) -> Result<WorkerResponse, Error> {
            if request.code == "slow" {
                tokio::time::sleep(self.delay).await;
            }
            Ok(WorkerResponse::success(
                &request.lang,
                vec![request.code],
                Some("answered".to_string()),
            ))
        }
    }

    /// Blows up on every request
    pub struct Crashing(pub Language);

    #[async_trait]
    impl ExecutionBackend for Crashing {
        fn language(&self) -> Language {
            self.0
        }

        async fn execute(&self, _request: WorkerRequest) -> Result<WorkerResponse, Error> {
            panic!("backend context terminated")
        }
    }

    /// Prints every line of the program and returns the line count
    pub struct LineEcho;

    impl Interpreter for LineEcho {
        fn run(&self, source: &str) -> Result<ProgramRun, Error> {
            let logs: Vec<String> = source.lines().map(str::to_string).collect();
            Ok(ProgramRun {
                outcome: Ok(logs.len().to_string()),
                logs,
            })
        }
    }

    pub struct StaticLoader {
        pub fail_with: Option<String>,
    }

    #[async_trait]
    impl RuntimeLoader for StaticLoader {
        async fn load(&self) -> Result<Arc<dyn Interpreter>, Error> {
            match &self.fail_with {
                Some(message) => Err(Error::BackendInit(message.clone())),
                None => Ok(Arc::new(LineEcho)),
            }
        }
    }
}
