//! Terminal front end for the code runner.
//!
//! [`AppContext`] plays the part of the page: it owns the editor buffer, the
//! selected language and the renderer, and hands the buffer to a shared
//! [`RunnerService`] when asked to run.

mod editor;
mod render;
pub mod runtime;
mod session;

pub use editor::{Editor, SourceBuffer};
pub use render::{format_outcome, status_label, Renderer, TextRenderer};
pub use session::AppContext;

pub use runner_core::{Language, RunReport, RunStatus, RunnerConfig, RunnerService};
