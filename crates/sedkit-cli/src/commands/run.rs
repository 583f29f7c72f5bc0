use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use sedkit_core::config::load_config;
use sedkit_core::io::load_frame_stack;
use sedkit_core::pipeline::{run_pipeline, PipelineStage, ProgressReporter};
use tracing::info;

use super::save_output;
use crate::summary::{print_pipeline_summary, print_results};

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline config file (TOML)
    pub config: PathBuf,

    /// Output directory, overriding the config
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Shows a spinner with the current pipeline stage.
struct StageSpinner {
    bar: ProgressBar,
}

impl ProgressReporter for StageSpinner {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        match total_items {
            Some(n) => self.bar.set_message(format!("{stage} ({n} frames)")),
            None => self.bar.set_message(stage.to_string()),
        }
    }

    fn finish_stage(&self) {
        self.bar.println(format!("  done: {}", self.bar.message()));
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to read config {}", args.config.display()))?;
    if args.output.is_some() {
        config.output_dir = args.output.clone();
    }
    if config.input.is_empty() {
        bail!("Config lists no input files");
    }
    info!(config = %args.config.display(), files = config.input.len(), "Loaded pipeline config");

    print_pipeline_summary(&config);

    let stack = load_frame_stack(&config.input, config.nav_shape)?;

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    bar.enable_steady_tick(Duration::from_millis(100));
    let reporter = StageSpinner { bar };

    let output = run_pipeline(&stack, &config, &reporter)?;
    reporter.bar.finish_and_clear();

    print_results(&output);

    if let Some(ref frames) = output.frames {
        match config.output_dir {
            Some(ref dir) => save_output(frames, dir)?,
            None => println!("No output_dir set, processed frames were not saved"),
        }
    }

    Ok(())
}
