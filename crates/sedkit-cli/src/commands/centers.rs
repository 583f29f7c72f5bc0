use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use sedkit_core::beam::{get_direct_beam_position, shifts_from_centers};
use sedkit_core::config::{BeamConfig, ConvergenceFallback};
use sedkit_core::consts::{DEFAULT_BEAM_RADIUS, MAX_REFINE_ITERATIONS};
use sedkit_core::frame::{Center, Shift};

use super::InputArgs;

#[derive(Args)]
pub struct CentersArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Search radius around the beam in pixels
    #[arg(long, default_value_t = DEFAULT_BEAM_RADIUS)]
    pub radius: f64,

    /// Maximum hill-climbing steps per frame
    #[arg(long, default_value_t = MAX_REFINE_ITERATIONS)]
    pub max_iterations: usize,

    /// Fall back to the global seed when a frame does not converge
    #[arg(long)]
    pub use_seed: bool,

    /// Write centers and shifts as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &CentersArgs) -> Result<()> {
    let stack = args.input.load()?;
    let config = BeamConfig {
        radius: args.radius,
        max_iterations: args.max_iterations,
        fallback: if args.use_seed {
            ConvergenceFallback::UseSeed
        } else {
            ConvergenceFallback::Fail
        },
    };

    let centers = get_direct_beam_position(&stack, &config)?;
    let shifts = shifts_from_centers(&centers, stack.frame_shape());

    println!(
        "\n{:>6}  {:>9}  {:>9}  {:>8}  {:>8}",
        "Frame", "Row", "Col", "dx", "dy"
    );
    println!("{}", "-".repeat(48));
    for (i, (c, s)) in centers.iter().zip(&shifts).enumerate() {
        println!(
            "{:>6}  {:>9.3}  {:>9.3}  {:>8.3}  {:>8.3}",
            i, c.row, c.col, s.dx, s.dy
        );
    }

    if let Some(ref path) = args.output {
        write_centers_csv(path, &centers, &shifts)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nCenters saved to {}", path.display());
    }

    Ok(())
}

/// One record per frame: index, center and shift from the frame center.
pub fn write_centers_csv(path: &Path, centers: &[Center], shifts: &[Shift]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["frame", "row", "col", "dx", "dy"])?;
    for (i, (c, s)) in centers.iter().zip(shifts).enumerate() {
        wtr.write_record([
            i.to_string(),
            c.row.to_string(),
            c.col.to_string(),
            s.dx.to_string(),
            s.dy.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_csv_has_header_and_one_record_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("centers.csv");
        let centers = [Center::new(3.5, 4.0), Center::new(2.0, 1.25)];
        let shifts = [Shift { dx: 0.5, dy: 1.0 }, Shift { dx: -2.25, dy: -0.5 }];
        write_centers_csv(&path, &centers, &shifts).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(rdr.headers().unwrap(), vec!["frame", "row", "col", "dx", "dy"]);
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["1", "2", "1.25", "-2.25", "-0.5"]);
    }
}
