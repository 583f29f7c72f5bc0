use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use sedkit_core::background::remove_background;
use sedkit_core::config::{BackgroundConfig, ReconstructionMethod};
use sedkit_core::consts::DEFAULT_BACKGROUND_H;

use super::{save_output, InputArgs};

#[derive(Clone, Copy, ValueEnum)]
pub enum ReconstructionArg {
    Iterative,
    Hybrid,
}

#[derive(Args)]
pub struct BackgroundArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Peak depth kept as signal, relative to the stack maximum
    #[arg(long, default_value_t = DEFAULT_BACKGROUND_H)]
    pub h: f32,

    /// Reconstruction algorithm
    #[arg(long, value_enum, default_value = "hybrid")]
    pub method: ReconstructionArg,

    /// Output directory
    #[arg(short, long, default_value = "background_removed")]
    pub output: PathBuf,
}

pub fn run(args: &BackgroundArgs) -> Result<()> {
    let stack = args.input.load()?;
    let config = BackgroundConfig {
        h: args.h,
        reconstruction: match args.method {
            ReconstructionArg::Iterative => ReconstructionMethod::Iterative,
            ReconstructionArg::Hybrid => ReconstructionMethod::Hybrid,
        },
    };
    let result = remove_background(&stack, &config)?;
    save_output(&result, &args.output)
}
