use anyhow::Result;
use clap::Args;
use console::Style;
use sedkit_core::config::VacuumConfig;
use sedkit_core::consts::DEFAULT_VACUUM_RADIUS;
use sedkit_core::frame::Center;
use sedkit_core::vacuum::get_vacuum_mask;

use super::InputArgs;

#[derive(Args)]
pub struct VacuumArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Radius of the direct beam excluded from the test
    #[arg(long, default_value_t = DEFAULT_VACUUM_RADIUS)]
    pub radius: f64,

    /// Beam center as ROW,COL (default: frame center)
    #[arg(long, value_parser = parse_center)]
    pub center: Option<Center>,

    /// Highest intensity outside the beam that still counts as vacuum
    #[arg(long, default_value = "0")]
    pub threshold: f32,

    /// Skip the closing step that fills isolated non-vacuum frames
    #[arg(long)]
    pub no_closing: bool,

    /// Remove isolated vacuum frames
    #[arg(long)]
    pub opening: bool,
}

fn parse_center(s: &str) -> Result<Center> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected ROW,COL, got '{s}'"))?;
    Ok(Center::new(row.trim().parse()?, col.trim().parse()?))
}

pub fn run(args: &VacuumArgs) -> Result<()> {
    let stack = args.input.load()?;
    let config = VacuumConfig {
        radius: args.radius,
        center: args.center,
        threshold: args.threshold,
        closing: !args.no_closing,
        opening: args.opening,
    };
    let mask = get_vacuum_mask(&stack, &config)?;

    let vacuum = Style::new().dim();
    let signal = Style::new().green().bold();
    println!();
    for row in mask.data.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|&v| {
                if v {
                    vacuum.apply_to(".").to_string()
                } else {
                    signal.apply_to("#").to_string()
                }
            })
            .collect();
        println!("  {}", line.join(" "));
    }
    println!(
        "\n{} of {} frames are vacuum",
        mask.vacuum_count(),
        stack.len()
    );

    Ok(())
}
