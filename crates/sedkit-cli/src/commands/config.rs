use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sedkit_core::config::{BackgroundConfig, ProcessingConfig, VacuumConfig};
use sedkit_core::stack::NavShape;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default ProcessingConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = ProcessingConfig {
        input: vec![
            PathBuf::from("scan/frame_00000.tiff"),
            PathBuf::from("scan/frame_00001.tiff"),
        ],
        nav_shape: Some(NavShape::Linear(2)),
        output_dir: Some(PathBuf::from("processed")),
        background: Some(BackgroundConfig::default()),
        vacuum: Some(VacuumConfig::default()),
        ..Default::default()
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
