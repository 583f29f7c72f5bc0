use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use sedkit_core::beam::CenterSource;
use sedkit_core::config::BeamConfig;
use sedkit_core::consts::DEFAULT_BEAM_RADIUS;
use sedkit_core::radial::{get_radial_profile, profiles_to_array, RadialProfile};

use super::InputArgs;

#[derive(Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Beam search radius used to center each profile
    #[arg(long, default_value_t = DEFAULT_BEAM_RADIUS)]
    pub radius: f64,

    /// Write all profiles as CSV (one record per frame, empty fields for missing bins)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ProfileArgs) -> Result<()> {
    let stack = args.input.load()?;
    let source = CenterSource::Refine(BeamConfig {
        radius: args.radius,
        ..Default::default()
    });
    let profiles = get_radial_profile(&stack, &source)?;

    println!(
        "\n{:>6}  {:>9}  {:>9}  {:>6}  {:>10}",
        "Frame", "Row", "Col", "Bins", "I(r=0)"
    );
    println!("{}", "-".repeat(48));
    for (i, p) in profiles.iter().enumerate() {
        let center_value = p
            .get(0)
            .map(|v| format!("{v:.5}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>6}  {:>9.3}  {:>9.3}  {:>6}  {:>10}",
            i,
            p.center.row,
            p.center.col,
            p.len(),
            center_value
        );
    }

    if let Some(ref path) = args.output {
        write_profiles_csv(path, &profiles)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nProfiles saved to {}", path.display());
    }

    Ok(())
}

/// One record per frame with a column per radius bin. Missing bins and the
/// padding of shorter profiles are empty fields.
pub fn write_profiles_csv(path: &Path, profiles: &[RadialProfile]) -> Result<()> {
    let table = profiles_to_array(profiles);
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec![String::from("frame")];
    header.extend((0..table.ncols()).map(|r| format!("r{r}")));
    wtr.write_record(&header)?;

    for (i, row) in table.rows().into_iter().enumerate() {
        let mut record = vec![i.to_string()];
        record.extend(
            row.iter()
                .map(|v| if v.is_nan() { String::new() } else { v.to_string() }),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
