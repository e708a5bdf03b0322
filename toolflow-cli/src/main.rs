use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use toolflow::config::PipelineConfig;
use toolflow::events::LoggingEventSink;
use toolflow::observability::{init_tracing, LogFormat};
use toolflow::pipeline::{PipelineRunner, PipelineSession};
use toolflow::presentation::{PresentationModel, Renderer, TextRenderer};
use tracing::{debug, error};

/// Runs the lexer, syntax analyzer, intermediate-code generator and DAG
/// builder on one source file and prints every view.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file to compile.
    input: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Directory holding the tool executables and pipeline files"
    )]
    base_dir: PathBuf,

    #[arg(long, value_name = "SECS", help = "Per-stage timeout in seconds (default 120)")]
    timeout_secs: Option<f64>,

    #[arg(long, conflicts_with = "timeout_secs", help = "Wait for each stage without a limit")]
    no_timeout: bool,

    #[arg(long, help = "Print the run record as JSON instead of text views")]
    json: bool,

    #[arg(long, help = "Only check that every tool executable is present")]
    check: bool,

    #[arg(long, value_name = "FORMAT", default_value = "plain", help = "Log format: plain, json")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format).map_err(|e| anyhow::anyhow!(e))?;
    execute(cli).await
}

async fn execute(cli: Cli) -> Result<ExitCode> {
    let config = build_config(&cli)?;
    let runner = PipelineRunner::new(config.clone())
        .context("invalid pipeline configuration")?
        .with_event_sink(Arc::new(LoggingEventSink::debug()));
    let session = PipelineSession::new(runner);

    if cli.check {
        let missing = session.preflight();
        if missing.is_empty() {
            println!("All executables found in {}", config.base_dir.display());
            return Ok(ExitCode::SUCCESS);
        }
        println!("Error: Missing executables.");
        for tool in &missing {
            println!("{tool}");
        }
        return Ok(ExitCode::FAILURE);
    }

    let Some(input) = cli.input.as_ref() else {
        bail!("no input file given (pass a source file, or --check)");
    };
    let input = absolute(input)?;
    debug!(input = %input.display(), "Resolved input file");

    let run = session
        .start(&input)
        .context("failed to start pipeline run")?
        .wait()
        .await
        .context("pipeline run did not finish")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&run).context("failed to serialize run")?;
        println!("{json}");
    } else {
        let model = PresentationModel::from_run(&run, &config.files);
        TextRenderer::new(io::stdout().lock())
            .render(&model)
            .context("failed to write output")?;
    }

    if run.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(status = %run.status, "Pipeline did not complete");
        Ok(ExitCode::FAILURE)
    }
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let base_dir = absolute(&cli.base_dir)?;
    let mut config = PipelineConfig::new(base_dir);
    if cli.no_timeout {
        config = config.without_stage_timeout();
    } else if let Some(secs) = cli.timeout_secs {
        config = config.with_stage_timeout(secs);
    }
    Ok(config)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "toolflow",
            "main.cpp",
            "--base-dir",
            "/opt/tools",
            "--timeout-secs",
            "5",
            "--json",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.input, Some(PathBuf::from("main.cpp")));
        assert_eq!(cli.base_dir, PathBuf::from("/opt/tools"));
        assert_eq!(cli.timeout_secs, Some(5.0));
        assert!(cli.json);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_timeout_flags_conflict() {
        let result = Cli::try_parse_from(["toolflow", "a.cpp", "--timeout-secs", "5", "--no-timeout"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_config() {
        let cli = Cli::parse_from(["toolflow", "--base-dir", "/opt/tools", "--no-timeout"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/opt/tools"));
        assert_eq!(config.stage_timeout(), None);

        let cli = Cli::parse_from(["toolflow", "--base-dir", "/opt/tools"]);
        assert_eq!(build_config(&cli).unwrap().stage_timeout_secs, Some(120.0));
    }
}
