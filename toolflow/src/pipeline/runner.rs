//! Sequential, fail-fast execution of the four stages.

use super::cleanup::remove_pipeline_outputs;
use super::run::PipelineRun;
use super::stages::{build_stages, missing_paths, validate_chain, StageDescriptor};
use crate::bundle::{load_slot, ResultBundle, ResultSlot, SlotValue};
use crate::config::PipelineConfig;
use crate::core::{Diagnostic, FailureKind, RunStatus, StageOutcome, StageStatus};
use crate::errors::{InvokeError, PipelineError, SlotReadError};
use crate::events::{EventSink, NoOpEventSink};
use crate::observability::SpanTimer;
use crate::process::{ProcessInvoker, SystemInvoker};
use crate::tools::ToolchainRegistry;
use crate::utils::now_utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Drives one run: pre-flight, cleanup, the four stages, then the reference load.
///
/// A runner holds no per-run state, so the same instance can serve any
/// number of sequential runs.
pub struct PipelineRunner {
    config: PipelineConfig,
    registry: ToolchainRegistry,
    invoker: Arc<dyn ProcessInvoker>,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl PipelineRunner {
    /// Creates a runner that spawns real processes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is unusable.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let registry = ToolchainRegistry::new(&config);
        Ok(Self {
            config,
            registry,
            invoker: Arc::new(SystemInvoker),
            event_sink: Arc::new(NoOpEventSink),
        })
    }

    /// Replaces the process seam.
    #[must_use]
    pub fn with_invoker(mut self, invoker: Arc<dyn ProcessInvoker>) -> Self {
        self.invoker = invoker;
        self
    }

    /// Sets the sink receiving lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the toolchain registry.
    #[must_use]
    pub fn registry(&self) -> &ToolchainRegistry {
        &self.registry
    }

    /// Returns the stage descriptors a run on `input` would execute.
    #[must_use]
    pub fn stages(&self, input: &Path) -> Vec<StageDescriptor> {
        build_stages(&self.config.artifact_paths(), &self.registry, input)
    }

    /// Executes one complete run on `input`.
    ///
    /// Never fails: every problem ends up as a diagnostic on the returned
    /// record.
    pub async fn run(&self, input: &Path) -> PipelineRun {
        let run = PipelineRun::begin(input);
        let span = info_span!("pipeline_run", run_id = %run.run_id, input = %input.display());
        self.execute(run).instrument(span).await
    }

    async fn execute(&self, mut run: PipelineRun) -> PipelineRun {
        let input = run.input.clone();
        info!("Pipeline started");
        self.event_sink
            .emit(
                "pipeline.started",
                Some(serde_json::json!({
                    "run_id": run.run_id.to_string(),
                    "input": input.display().to_string(),
                })),
            )
            .await;

        let missing = self.registry.verify_all();
        if !missing.is_empty() {
            run.diagnostics
                .extend(missing.iter().map(Diagnostic::tooling_missing));
            let status = RunStatus::ToolingUnavailable {
                missing: missing
                    .iter()
                    .map(|m| m.kind.display_name().to_string())
                    .collect(),
            };
            return self.finish(run, status).await;
        }

        let paths = self.config.artifact_paths();
        let cleanup = remove_pipeline_outputs(&paths).await;
        run.diagnostics.extend(cleanup.diagnostics());

        let stages = self.stages(&input);
        debug_assert!(validate_chain(&stages, &input).is_ok());

        let mut stopped: Option<(String, FailureKind)> = None;
        for stage in &stages {
            let outcome = self.execute_stage(stage, &mut run.diagnostics).await;
            let failure = outcome.failure_kind();
            run.outcomes.push(outcome);

            if let Some(reason) = failure {
                stopped = Some((stage.name.clone(), reason));
                break;
            }
            if stage.captures_output {
                capture_output(stage, &mut run).await;
            }
        }

        let (reference, reference_diagnostics) = load_reference_bundle(&self.config).await;
        run.reference = reference;
        run.diagnostics.extend(reference_diagnostics);

        let status = match stopped {
            None => RunStatus::Complete,
            Some((stopped_at, reason)) => RunStatus::PartiallyComplete { stopped_at, reason },
        };
        self.finish(run, status).await
    }

    async fn execute_stage(
        &self,
        stage: &StageDescriptor,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> StageOutcome {
        let timer = SpanTimer::start(&stage.name);
        info!(stage = %stage.name, program = %stage.program.display(), "Running stage");
        self.event_sink
            .emit("stage.started", Some(serde_json::json!({ "stage": &stage.name })))
            .await;

        let missing_inputs = missing_paths(&stage.inputs).await;
        if !missing_inputs.is_empty() {
            warn!(stage = %stage.name, missing = ?missing_inputs, "Stage input missing");
            diagnostics.push(Diagnostic::input_missing(&stage.name, missing_inputs.clone()));
            let outcome = StageOutcome::input_missing(&stage.name, missing_inputs);
            self.emit_finished(&outcome).await;
            return outcome;
        }

        let invocation = stage.invocation(&self.config.base_dir, self.config.stage_timeout());
        let output = match self.invoker.invoke(&invocation).await {
            Ok(output) => output,
            Err(err) => {
                warn!(stage = %stage.name, error = %err, "Stage could not complete");
                diagnostics.push(Diagnostic::invoke_failed(&stage.name, &err));
                let status = match err {
                    InvokeError::Launch { .. } => StageStatus::LaunchFailed,
                    InvokeError::TimedOut { .. } => StageStatus::TimedOut,
                };
                let outcome = StageOutcome {
                    stage: stage.name.clone(),
                    status,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    missing_inputs: Vec::new(),
                    missing_outputs: Vec::new(),
                    duration_ms: timer.finish(),
                };
                self.emit_finished(&outcome).await;
                return outcome;
            }
        };

        diagnostics.push(Diagnostic::stage_report(
            &stage.name,
            output.exit_code,
            &output.stdout,
            &output.stderr,
        ));

        let mut missing_outputs = Vec::new();
        let status = if output.success() {
            missing_outputs = missing_paths(&stage.outputs).await;
            if missing_outputs.is_empty() {
                StageStatus::Succeeded
            } else {
                warn!(stage = %stage.name, missing = ?missing_outputs, "Stage output missing");
                diagnostics.push(Diagnostic::output_missing(&stage.name, missing_outputs.clone()));
                StageStatus::OutputMissing
            }
        } else {
            warn!(stage = %stage.name, exit_code = ?output.exit_code, "Stage failed");
            diagnostics.push(Diagnostic::process_failed(&stage.name, output.exit_code));
            StageStatus::ProcessFailed
        };

        let outcome = StageOutcome {
            stage: stage.name.clone(),
            status,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            missing_inputs: Vec::new(),
            missing_outputs,
            duration_ms: timer.finish(),
        };
        self.emit_finished(&outcome).await;
        outcome
    }

    async fn emit_finished(&self, outcome: &StageOutcome) {
        if outcome.is_success() {
            debug!(stage = %outcome.stage, duration_ms = outcome.duration_ms, "Stage completed");
            self.event_sink
                .emit(
                    "stage.completed",
                    Some(serde_json::json!({
                        "stage": &outcome.stage,
                        "duration_ms": outcome.duration_ms,
                    })),
                )
                .await;
        } else {
            self.event_sink
                .emit(
                    "stage.failed",
                    Some(serde_json::json!({
                        "stage": &outcome.stage,
                        "status": outcome.status.to_string(),
                        "exit_code": outcome.exit_code,
                        "duration_ms": outcome.duration_ms,
                    })),
                )
                .await;
        }
    }

    async fn finish(&self, mut run: PipelineRun, status: RunStatus) -> PipelineRun {
        run.status = status;
        run.finished_at = now_utc();
        info!(
            status = %run.status,
            stages = run.outcomes.len(),
            diagnostics = run.diagnostics.len(),
            "Pipeline finished"
        );
        self.event_sink
            .emit(
                "pipeline.completed",
                Some(serde_json::json!({
                    "run_id": run.run_id.to_string(),
                    "status": &run.status,
                    "duration_ms": run.duration_ms(),
                })),
            )
            .await;
        run
    }
}

/// Placeholder stored in a slot whose file could not be loaded.
fn unavailable(path: &Path) -> SlotValue {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    SlotValue::Unavailable {
        marker: format!("ERROR READING {name}"),
    }
}

async fn capture_output(stage: &StageDescriptor, run: &mut PipelineRun) {
    let Some(path) = stage.primary_output() else {
        return;
    };
    let value = match load_slot(path).await {
        Ok(text) => SlotValue::Loaded(text),
        Err(err) => {
            warn!(stage = %stage.name, error = %err, "Could not read stage output");
            run.diagnostics
                .push(Diagnostic::result_read_failed(&stage.name, &err));
            unavailable(path)
        }
    };
    run.pipeline.insert(stage.slot, value);
}

async fn load_reference(path: &Path, diagnostics: &mut Vec<Diagnostic>) -> SlotValue {
    match load_slot(path).await {
        Ok(text) => SlotValue::Loaded(text),
        Err(err) => {
            report_reference_error(&err);
            diagnostics.push(Diagnostic::reference_unavailable(&err));
            unavailable(path)
        }
    }
}

fn report_reference_error(err: &SlotReadError) {
    if err.is_missing() {
        warn!(path = %err.path().display(), "Reference file not found");
    } else {
        warn!(path = %err.path().display(), error = %err, "Could not read reference file");
    }
}

/// Loads only the reference bundle, without running any stage.
///
/// Used by front ends to show the reference views before the first run.
pub async fn load_reference_bundle(config: &PipelineConfig) -> (ResultBundle, Vec<Diagnostic>) {
    let paths = config.artifact_paths();
    let mut bundle = ResultBundle::new();
    let mut diagnostics = Vec::new();
    for (slot, path) in [
        (ResultSlot::Tac, &paths.reference_tac),
        (ResultSlot::Dag, &paths.reference_dag),
    ] {
        let value = load_reference(path, &mut diagnostics).await;
        bundle.insert(slot, value);
    }
    debug!(diagnostics = diagnostics.len(), "Reference bundle loaded");
    (bundle, diagnostics)
}
