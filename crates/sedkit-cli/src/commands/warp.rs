use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use sedkit_core::transform::{correct_geometric_distortion, AffineMatrix};

use super::{save_output, InputArgs, InterpolationArg};

#[derive(Args)]
pub struct WarpArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Nine comma-separated values of the 3x3 matrix, row-major
    #[arg(long, allow_hyphen_values = true, value_parser = parse_matrix)]
    pub matrix: AffineMatrix,

    /// Resampling kernel
    #[arg(long, value_enum, default_value = "bicubic")]
    pub interpolation: InterpolationArg,

    /// Output directory
    #[arg(short, long, default_value = "corrected")]
    pub output: PathBuf,
}

fn parse_matrix(s: &str) -> Result<AffineMatrix> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if values.len() != 9 {
        bail!("expected 9 matrix values, got {}", values.len());
    }
    let mut rows = [[0.0f64; 3]; 3];
    for (i, v) in values.into_iter().enumerate() {
        rows[i / 3][i % 3] = v;
    }
    Ok(AffineMatrix::from_rows(rows))
}

pub fn run(args: &WarpArgs) -> Result<()> {
    let stack = args.input.load()?;
    let corrected =
        correct_geometric_distortion(&stack, &args.matrix, args.interpolation.into())?;
    save_output(&corrected, &args.output)
}
