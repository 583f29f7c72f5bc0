pub mod background;
pub mod centers;
pub mod config;
pub mod profile;
pub mod recenter;
pub mod rotate;
pub mod run;
pub mod vacuum;
pub mod warp;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use sedkit_core::config::Interpolation;
use sedkit_core::io::{load_frame_stack, save_frame_stack};
use sedkit_core::stack::{FrameStack, NavShape};

/// Frame files shared by every per-stack command.
#[derive(Args)]
pub struct InputArgs {
    /// Input image files, one frame each, in scan order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Scan grid as ROWSxCOLS (default: a single line)
    #[arg(long, value_parser = parse_grid)]
    pub grid: Option<NavShape>,
}

impl InputArgs {
    pub fn load(&self) -> Result<FrameStack> {
        let stack = load_frame_stack(&self.files, self.grid)
            .context("Failed to load input frames")?;
        let (h, w) = stack.frame_shape();
        println!(
            "Loaded {} frames ({}x{}), scan {}",
            stack.len(),
            w,
            h,
            stack.nav_shape()
        );
        Ok(stack)
    }
}

fn parse_grid(s: &str) -> Result<NavShape> {
    let Some((rows, cols)) = s.split_once(|c| c == 'x' || c == 'X') else {
        bail!("expected ROWSxCOLS, got '{s}'");
    };
    let rows: usize = rows.trim().parse().context("invalid row count")?;
    let cols: usize = cols.trim().parse().context("invalid column count")?;
    if rows == 0 || cols == 0 {
        bail!("grid dimensions must be positive");
    }
    Ok(NavShape::Grid { rows, cols })
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InterpolationArg {
    Nearest,
    Bilinear,
    Bicubic,
}

impl From<InterpolationArg> for Interpolation {
    fn from(arg: InterpolationArg) -> Self {
        match arg {
            InterpolationArg::Nearest => Interpolation::Nearest,
            InterpolationArg::Bilinear => Interpolation::Bilinear,
            InterpolationArg::Bicubic => Interpolation::Bicubic,
        }
    }
}

/// Write `stack` into `dir` and report where it went.
pub fn save_output(stack: &FrameStack, dir: &Path) -> Result<()> {
    let paths = save_frame_stack(stack, dir)
        .with_context(|| format!("Failed to write frames to {}", dir.display()))?;
    println!("Saved {} frames to {}", paths.len(), dir.display());
    Ok(())
}
