//! CPython compiled to `wasm32-wasi`, run under wasmtime.
//!
//! The module is downloaded once into the cache directory and compiled when
//! the backend first becomes ready. Each program then runs in a fresh store
//! with stdout and stderr sharing one in-memory pipe, and a scratch directory
//! preopened at `/session` carrying the source in and the outcome out.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};
use wasmtime::{Engine, Linker, Module, Store};
use wasmtime_wasi::p1::WasiP1Ctx;
use wasmtime_wasi::p2::pipe::MemoryOutputPipe;
use wasmtime_wasi::{DirPerms, FilePerms, WasiCtxBuilder};

use crate::{
    config::PythonConfig,
    error::Error,
    languages::python::{Interpreter, ProgramRun, RuntimeLoader},
};

const OUTPUT_CAPACITY: usize = 4 * 1024 * 1024;
const GUEST_SESSION_DIR: &str = "/session";
const SOURCE_FILE: &str = "main.py";
const OUTCOME_FILE: &str = "outcome.json";

/// Evaluates `main.py` in the directory named by the first argument and
/// writes `outcome.json` beside it
const DRIVER: &str = r#"
import ast, json, os, sys, traceback

def _drive(session):
    with open(os.path.join(session, "main.py")) as f:
        source = f.read()
    scope = {"__name__": "__main__"}
    try:
        tree = ast.parse(source, "<exec>", "exec")
        tail = None
        if tree.body and isinstance(tree.body[-1], ast.Expr):
            tail = ast.Expression(tree.body.pop().value)
        exec(compile(tree, "<exec>", "exec"), scope)
        value = eval(compile(tail, "<exec>", "eval"), scope) if tail is not None else None
        outcome = {"ok": True, "result": "" if value is None else str(value)}
    except BaseException as e:
        tb = e.__traceback__.tb_next if e.__traceback__ is not None else None
        text = "".join(traceback.format_exception(type(e), e, tb))
        outcome = {"ok": False, "error": "PythonError: " + text}
    sys.stdout.flush()
    sys.stderr.flush()
    with open(os.path.join(session, "outcome.json"), "w") as f:
        json.dump(outcome, f)

_drive(sys.argv[1])
"#;

#[derive(Debug, Deserialize)]
struct DriverOutcome {
    ok: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Fetches and compiles the interpreter module
pub struct WasiPythonLoader {
    runtime_url: String,
    cache_dir: PathBuf,
    client: reqwest::Client,
}

impl WasiPythonLoader {
    pub fn new(config: &PythonConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            runtime_url: config.runtime_url.clone(),
            cache_dir: config.cache_dir.clone(),
            client,
        })
    }

    /// Local path of the cached module
    pub fn cached_path(&self) -> PathBuf {
        let name = self
            .runtime_url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("python.wasm");
        self.cache_dir.join(name)
    }

    /// Download the module unless a cached copy exists
    pub async fn fetch_runtime(&self) -> Result<PathBuf, Error> {
        let target = self.cached_path();
        if fs::try_exists(&target).await? {
            debug!("using cached python runtime at {}", target.display());
            return Ok(target);
        }

        fs::create_dir_all(&self.cache_dir).await?;
        info!("downloading python runtime from {}", self.runtime_url);

        let response = self.client.get(&self.runtime_url).send().await?;
        if !response.status().is_success() {
            return Err(Error::BackendInit(format!(
                "runtime download failed with status {}",
                response.status()
            )));
        }
        let bytes = response.bytes().await?;

        // Write beside the target and rename so a partial download is never cached.
        let partial = target.with_extension(format!("partial-{}", uuid::Uuid::new_v4()));
        fs::write(&partial, &bytes).await?;
        fs::rename(&partial, &target).await?;

        info!(
            "cached python runtime ({} bytes) at {}",
            bytes.len(),
            target.display()
        );
        Ok(target)
    }
}

#[async_trait]
impl RuntimeLoader for WasiPythonLoader {
    async fn load(&self) -> Result<Arc<dyn Interpreter>, Error> {
        let path = self.fetch_runtime().await?;
        let interpreter = tokio::task::spawn_blocking(move || WasiPython::compile(&path))
            .await
            .map_err(|e| Error::BackendInit(format!("runtime compilation aborted: {e}")))??;
        Ok(Arc::new(interpreter))
    }
}

/// A compiled interpreter module ready to instantiate per run
pub struct WasiPython {
    engine: Engine,
    module: Module,
}

impl WasiPython {
    pub fn compile(path: &Path) -> Result<Self, Error> {
        let engine = Engine::default();
        let module = Module::from_file(&engine, path).map_err(|e| {
            Error::BackendInit(format!(
                "failed to compile python runtime {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self { engine, module })
    }

    fn execute_sync(&self, session: &Path) -> Result<(Vec<String>, i32), Error> {
        let output = MemoryOutputPipe::new(OUTPUT_CAPACITY);

        let mut builder = WasiCtxBuilder::new();
        builder
            .args(&["python", "-u", "-c", DRIVER, GUEST_SESSION_DIR])
            .stdout(output.clone())
            .stderr(output.clone());
        builder
            .preopened_dir(session, GUEST_SESSION_DIR, DirPerms::all(), FilePerms::all())
            .map_err(|e| Error::Execution(format!("failed to preopen session directory: {e}")))?;

        let mut store = Store::new(&self.engine, builder.build_p1());

        let mut linker: Linker<WasiP1Ctx> = Linker::new(&self.engine);
        wasmtime_wasi::p1::add_to_linker_sync(&mut linker, |ctx: &mut WasiP1Ctx| ctx)
            .map_err(|e| Error::Execution(format!("failed to link WASI: {e}")))?;

        let instance = linker
            .instantiate(&mut store, &self.module)
            .map_err(|e| Error::Execution(format!("failed to instantiate runtime: {e}")))?;
        let start = instance
            .get_typed_func::<(), ()>(&mut store, "_start")
            .map_err(|e| Error::Execution(format!("runtime has no entry point: {e}")))?;

        let exit_code = match start.call(&mut store, ()) {
            Ok(()) => 0,
            Err(e) => match e.downcast_ref::<wasmtime_wasi::I32Exit>() {
                Some(exit) => exit.0,
                None => return Err(Error::Execution(format!("python runtime trapped: {e}"))),
            },
        };

        drop(store);
        Ok((split_lines(&output.contents()), exit_code))
    }
}

impl Interpreter for WasiPython {
    fn run(&self, source: &str) -> Result<ProgramRun, Error> {
        let session = tempfile::tempdir()?;
        std::fs::write(session.path().join(SOURCE_FILE), source)?;

        let (logs, exit_code) = self.execute_sync(session.path())?;
        let outcome = read_outcome(session.path(), exit_code)?;

        Ok(ProgramRun { logs, outcome })
    }
}

/// Result left behind by the driver, or the exit code when it left none
fn read_outcome(session: &Path, exit_code: i32) -> Result<Result<String, String>, Error> {
    let raw = match std::fs::read(session.join(OUTCOME_FILE)) {
        Ok(raw) => raw,
        Err(_) => return Ok(Err(format!("python runtime exited with code {exit_code}"))),
    };
    let parsed: DriverOutcome = serde_json::from_slice(&raw)
        .map_err(|e| Error::Execution(format!("unreadable interpreter outcome: {e}")))?;
    Ok(if parsed.ok {
        Ok(parsed.result.unwrap_or_default())
    } else {
        Err(parsed.error.unwrap_or_default())
    })
}

/// Break captured output into lines, one log entry per line
fn split_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .map(str::to_string)
        .collect()
}
