use clap::Parser;
use code_runner::{
    runtime, AppContext, Editor, Language, RunStatus, RunnerConfig, RunnerService, SourceBuffer,
    TextRenderer,
};
use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Language to run: javascript, python, cpp or java
    #[arg(short, long, default_value = "javascript")]
    language: Language,

    /// Source file to run; the language's sample program when omitted
    file: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "CODE_RUNNER_CONFIG")]
    config: Option<PathBuf>,

    /// Script evaluation timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    runtime::block_on_detached(run(args))?
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::from_file(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(timeout_ms));
    }
    // Only one program runs, so there is nothing to warm up for other languages.
    if args.language != Language::Python {
        config = config.with_eager_python(false);
    }

    let service = Arc::new(RunnerService::new(config)?);
    let mut context = AppContext::new(service, SourceBuffer::new(), TextRenderer::new());
    context.select_language(args.language);
    if let Some(path) = &args.file {
        let source = tokio::fs::read_to_string(path).await?;
        context.editor_mut().set_value(source);
    }

    let report = context.run().await?;
    println!("{}", context.renderer().output());
    eprintln!("{}", context.renderer().status_text());

    Ok(match report.status() {
        RunStatus::Error => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
