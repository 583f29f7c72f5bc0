use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sedkit_core::beam::{get_direct_beam_shifts, CenterSource};
use sedkit_core::config::BeamConfig;
use sedkit_core::consts::DEFAULT_BEAM_RADIUS;
use sedkit_core::transform::center_patterns;

use super::{save_output, InputArgs, InterpolationArg};

#[derive(Args)]
pub struct RecenterArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Beam search radius in pixels
    #[arg(long, default_value_t = DEFAULT_BEAM_RADIUS)]
    pub radius: f64,

    /// Resampling kernel
    #[arg(long, value_enum, default_value = "bicubic")]
    pub interpolation: InterpolationArg,

    /// Output directory
    #[arg(short, long, default_value = "centered")]
    pub output: PathBuf,
}

pub fn run(args: &RecenterArgs) -> Result<()> {
    let stack = args.input.load()?;
    let source = CenterSource::Refine(BeamConfig {
        radius: args.radius,
        ..Default::default()
    });
    let shifts = get_direct_beam_shifts(&stack, &source)?;
    let max_shift = shifts
        .iter()
        .map(|s| s.dx.hypot(s.dy))
        .fold(0.0f64, f64::max);
    println!("Largest beam offset: {max_shift:.2} px");

    let centered = center_patterns(&stack, &shifts, args.interpolation.into())?;
    save_output(&centered, &args.output)
}
