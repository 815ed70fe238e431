use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::{
    error::Error,
    executor::ExecutionBackend,
    types::{BackendState, Language, WorkerRequest, WorkerResponse},
};

const LANG: &str = "python";

pub(crate) const SAMPLE_SOURCE: &str = r#"# Welcome to the Code Runner!
# Select a language, write your code, and press "Run Code".

print("Hello from the Python sandbox!")

def add(a, b):
    return a + b

result = add(2, 3)
print(f"2 + 3 = {result}")"#;

/// Captured output and final value of one interpreted program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRun {
    /// Standard output and standard error lines, in arrival order
    pub logs: Vec<String>,
    /// The last expression's value, or the exception text with traceback
    pub outcome: Result<String, String>,
}

/// A ready interpreter instance. Runs are blocking.
pub trait Interpreter: Send + Sync {
    fn run(&self, source: &str) -> Result<ProgramRun, Error>;
}

/// Produces the interpreter; called at most once per backend
#[async_trait]
pub trait RuntimeLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Interpreter>, Error>;
}

/// Backend for an interpreter that must be loaded before first use.
///
/// Readiness is a one-shot cell: every request arriving while the runtime
/// loads awaits the same initialization, and a failed load is remembered and
/// reported to every later request.
pub struct InterpreterBackend {
    loader: Arc<dyn RuntimeLoader>,
    runtime: OnceCell<Result<Arc<dyn Interpreter>, String>>,
    state: RwLock<BackendState>,
}

impl InterpreterBackend {
    pub fn new(loader: Arc<dyn RuntimeLoader>) -> Self {
        Self {
            loader,
            runtime: OnceCell::new(),
            state: RwLock::new(BackendState::Uninitialized),
        }
    }

    fn set_state(&self, state: BackendState) {
        if let Ok(mut current) = self.state.write() {
            *current = state;
        }
    }

    async fn ready(&self) -> Result<Arc<dyn Interpreter>, Error> {
        let slot = self
            .runtime
            .get_or_init(|| async {
                self.set_state(BackendState::Initializing);
                info!("loading python runtime");
                match self.loader.load().await {
                    Ok(runtime) => {
                        self.set_state(BackendState::Ready);
                        info!("python runtime ready");
                        Ok(runtime)
                    }
                    Err(e) => {
                        self.set_state(BackendState::Failed);
                        error!("python runtime failed to initialize: {}", e);
                        Err(match e {
                            Error::BackendInit(message) => message,
                            other => other.to_string(),
                        })
                    }
                }
            })
            .await;

        slot.clone().map_err(Error::BackendInit)
    }
}

#[async_trait]
impl ExecutionBackend for InterpreterBackend {
    fn language(&self) -> Language {
        Language::Python
    }

    fn state(&self) -> BackendState {
        self.state
            .read()
            .map(|state| *state)
            .unwrap_or(BackendState::Failed)
    }

    async fn prepare(&self) -> Result<(), Error> {
        self.ready().await.map(|_| ())
    }

    async fn execute(&self, request: WorkerRequest) -> Result<WorkerResponse, Error> {
        let runtime = match self.ready().await {
            Ok(runtime) => runtime,
            Err(e) => return Ok(WorkerResponse::error(LANG, Vec::new(), e.to_string())),
        };

        let code = request.code;
        let run = tokio::task::spawn_blocking(move || runtime.run(&code))
            .await
            .map_err(|e| Error::WorkerCrash {
                worker: "Python".to_string(),
                message: e.to_string(),
            })?;

        Ok(match run {
            Ok(ProgramRun {
                logs,
                outcome: Ok(result),
            }) => WorkerResponse::success(LANG, logs, Some(result)),
            Ok(ProgramRun {
                logs,
                outcome: Err(error),
            }) => WorkerResponse::error(LANG, logs, error),
            Err(e) => WorkerResponse::error(LANG, Vec::new(), e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Understands `print('...')` lines and a trailing integer sum
    struct ToyInterpreter;

    impl Interpreter for ToyInterpreter {
        fn run(&self, source: &str) -> Result<ProgramRun, Error> {
            let mut logs = Vec::new();
            let mut result = String::new();
            for line in source.lines() {
                if let Some(text) = line
                    .strip_prefix("print('")
                    .and_then(|rest| rest.strip_suffix("')"))
                {
                    logs.push(text.to_string());
                } else if line.starts_with("raise") {
                    return Ok(ProgramRun {
                        logs,
                        outcome: Err("Traceback (most recent call last):\nValueError: bad".into()),
                    });
                } else if let Some((a, b)) = line.split_once('+') {
                    let sum: i64 = a.trim().parse::<i64>().unwrap() + b.trim().parse::<i64>().unwrap();
                    result = sum.to_string();
                }
            }
            Ok(ProgramRun {
                logs,
                outcome: Ok(result),
            })
        }
    }

    struct CountingLoader {
        loads: AtomicUsize,
        fail: bool,
    }

    impl CountingLoader {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                loads: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl RuntimeLoader for CountingLoader {
        async fn load(&self) -> Result<Arc<dyn Interpreter>, Error> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail {
                return Err(Error::BackendInit("runtime download refused".to_string()));
            }
            Ok(Arc::new(ToyInterpreter))
        }
    }

    fn request(code: &str) -> WorkerRequest {
        WorkerRequest {
            lang: LANG.to_string(),
            code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_runs_after_readiness() {
        let backend = InterpreterBackend::new(CountingLoader::new(false));
        assert_eq!(backend.state(), BackendState::Uninitialized);

        let response = backend.execute(request("print('hi')\n1+1")).await.unwrap();
        assert_eq!(
            response,
            WorkerResponse::success(LANG, vec!["hi".to_string()], Some("2".to_string()))
        );
        assert_eq!(backend.state(), BackendState::Ready);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_initialization() {
        let loader = CountingLoader::new(false);
        let backend = Arc::new(InterpreterBackend::new(loader.clone()));

        let mut handles = vec![];
        for i in 0..5 {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move {
                backend.execute(request(&format!("print('run {i}')"))).await
            }));
        }

        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            assert!(matches!(response, WorkerResponse::Success { .. }));
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

        backend.execute(request("print('later')")).await.unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_initialization_is_terminal_for_everyone() {
        let loader = CountingLoader::new(true);
        let backend = Arc::new(InterpreterBackend::new(loader.clone()));

        let mut handles = vec![];
        for _ in 0..3 {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move {
                backend.execute(request("print('hi')")).await
            }));
        }

        let mut responses = vec![];
        for handle in handles {
            responses.push(handle.await.unwrap().unwrap());
        }
        let later = backend.execute(request("print('again')")).await.unwrap();
        responses.push(later);

        let expected = WorkerResponse::error(
            LANG,
            vec![],
            "Backend failed to initialize: runtime download refused",
        );
        for response in responses {
            assert_eq!(response, expected);
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(backend.state(), BackendState::Failed);
        assert!(backend.prepare().await.is_err());
    }

    #[tokio::test]
    async fn test_program_error_keeps_logs_and_traceback() {
        let backend = InterpreterBackend::new(CountingLoader::new(false));
        let response = backend
            .execute(request("print('start')\nraise ValueError('bad')"))
            .await
            .unwrap();
        match response {
            WorkerResponse::Error { logs, error, .. } => {
                assert_eq!(logs, ["start"]);
                assert!(error.starts_with("Traceback"));
                assert!(error.ends_with("ValueError: bad"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }
}
