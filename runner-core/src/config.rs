use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// CPython build for `wasm32-wasi` with the standard library embedded
pub const DEFAULT_PYTHON_RUNTIME_URL: &str = "https://github.com/vmware-labs/webassembly-language-runtimes/releases/download/python%2F3.11.1%2B20230127-c8036b4/python-3.11.1.wasm";

/// Countdown applied to timeout-eligible languages
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Runner configuration, loadable from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub dispatch: DispatchConfig,
    pub python: PythonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Milliseconds to wait before abandoning a timeout-eligible run
    pub timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Where to download the interpreter module from
    pub runtime_url: String,
    /// Directory holding the downloaded module
    pub cache_dir: PathBuf,
    /// Begin loading the runtime when the service starts
    pub eager: bool,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            runtime_url: DEFAULT_PYTHON_RUNTIME_URL.to_string(),
            cache_dir: std::env::temp_dir().join("code-runner"),
            eager: true,
        }
    }
}

impl RunnerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let config: RunnerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_eager_python(mut self, eager: bool) -> Self {
        self.python.eager = eager;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.dispatch.timeout_ms == 0 {
            return Err(Error::Config(
                "dispatch.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.python.runtime_url.trim().is_empty() {
            return Err(Error::Config("python.runtime_url is empty".to_string()));
        }
        Ok(())
    }
}
