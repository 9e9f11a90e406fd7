use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use weft_composite::{ExecutionMode, SequenceWorkflow, TupleWorkflow, ZipWorkflow};
use weft_config::{PipelineDef, PipelineView, StepDef, StepOutcome};
use weft_workflow::{AnyWorkflow, Outcome, Workflow, WorkflowError};

/// Weft - composable, memoized async workflows
#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a pipeline of demo steps
  Run {
    /// Path to the pipeline file (JSON)
    pipeline_file: PathBuf,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("weft=info")),
    )
    .with_writer(std::io::stderr)
    .init();

  match cli.command {
    Some(Commands::Run { pipeline_file }) => {
      run_pipeline(pipeline_file)?;
    }
    None => {
      println!("weft - use --help to see available commands");
    }
  }

  Ok(())
}

fn run_pipeline(pipeline_file: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_pipeline_async(pipeline_file).await })
}

async fn run_pipeline_async(pipeline_file: PathBuf) -> Result<()> {
  let content = tokio::fs::read_to_string(&pipeline_file)
    .await
    .with_context(|| format!("failed to read pipeline file: {}", pipeline_file.display()))?;

  let pipeline = PipelineDef::from_json_str(&content)
    .with_context(|| format!("invalid pipeline file: {}", pipeline_file.display()))?;

  info!(
    pipeline = %pipeline.name,
    mode = %pipeline.mode,
    steps = pipeline.steps.len(),
    "pipeline_loaded"
  );

  let cancel = CancellationToken::new();
  tokio::spawn({
    let cancel = cancel.clone();
    async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, cancelling pipeline");
        cancel.cancel();
      }
    }
  });

  let names: Vec<String> = pipeline.steps.iter().map(|s| s.name.clone()).collect();
  let steps: Vec<AnyWorkflow<Value>> = pipeline.steps.iter().map(step_workflow).collect();

  let output = match pipeline.view {
    PipelineView::Tuple => {
      let values = TupleWorkflow::new(steps, pipeline.mode)
        .run(cancel)
        .await
        .context("pipeline failed")?;
      named(&names, values)
    }
    PipelineView::Result => {
      let values = match pipeline.mode {
        ExecutionMode::Sequential => SequenceWorkflow::new(steps).result(cancel).await,
        ExecutionMode::Concurrent => ZipWorkflow::new(steps).result(cancel).await,
      }
      .context("pipeline failed")?;
      named(&names, values)
    }
    PipelineView::Outcomes => {
      let outcomes = match pipeline.mode {
        ExecutionMode::Sequential => SequenceWorkflow::new(steps).outcomes(cancel).await,
        ExecutionMode::Concurrent => ZipWorkflow::new(steps).outcomes(cancel).await,
      };
      named(&names, outcomes.into_iter().map(render_outcome))
    }
  };

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

/// Build the workflow for one step: wait out its delay, then produce its
/// configured value or error.
fn step_workflow(step: &StepDef) -> AnyWorkflow<Value> {
  let name = step.name.clone();
  let delay = Duration::from_millis(step.delay_ms);
  let outcome = step.outcome.clone();

  AnyWorkflow::from_fn(move |cancel: CancellationToken| {
    let name = name.clone();
    let outcome = outcome.clone();
    async move {
      tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = cancel.cancelled() => {
          warn!(step = %name, "step cancelled");
          return Err(WorkflowError::Cancelled);
        }
      }

      info!(step = %name, "step_finished");
      match outcome {
        StepOutcome::Value(value) => Ok(value),
        StepOutcome::Error(message) => Err(WorkflowError::message(message)),
      }
    }
  })
}

fn named(names: &[String], values: impl IntoIterator<Item = Value>) -> Value {
  let map: Map<String, Value> = names.iter().cloned().zip(values).collect();
  Value::Object(map)
}

fn render_outcome(outcome: Outcome<Value>) -> Value {
  match outcome {
    Ok(value) => json!({ "value": value }),
    Err(WorkflowError::Cancelled) => json!({ "cancelled": true }),
    Err(e) => json!({ "error": e.to_string() }),
  }
}
