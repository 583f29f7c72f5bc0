use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sedkit_core::transform::rotate_patterns;

use super::{save_output, InputArgs, InterpolationArg};

#[derive(Args)]
pub struct RotateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Angle in degrees, counter-clockwise
    #[arg(long, allow_hyphen_values = true)]
    pub angle: f64,

    /// Resampling kernel
    #[arg(long, value_enum, default_value = "bicubic")]
    pub interpolation: InterpolationArg,

    /// Output directory
    #[arg(short, long, default_value = "rotated")]
    pub output: PathBuf,
}

pub fn run(args: &RotateArgs) -> Result<()> {
    let stack = args.input.load()?;
    let rotated = rotate_patterns(&stack, args.angle, args.interpolation.into())?;
    save_output(&rotated, &args.output)
}
