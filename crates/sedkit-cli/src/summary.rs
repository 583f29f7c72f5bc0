use console::Style;
use sedkit_core::config::ProcessingConfig;
use sedkit_core::pipeline::PipelineOutput;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }

    fn row(&self, label: &str, value: impl std::fmt::Display) {
        println!(
            "    {:<14}{}",
            self.label.apply_to(label),
            self.value.apply_to(value)
        );
    }

    fn off(&self, section: &str) {
        println!(
            "  {:<16}{}",
            self.header.apply_to(section),
            self.disabled.apply_to("disabled")
        );
    }
}

pub fn print_pipeline_summary(config: &ProcessingConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("SED Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!(
        "  {:<16}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(config.input.len())
    );
    if let Some(nav) = config.nav_shape {
        println!(
            "  {:<16}{}",
            s.label.apply_to("Scan"),
            s.value.apply_to(nav)
        );
    }
    match config.output_dir {
        Some(ref dir) => println!(
            "  {:<16}{}",
            s.label.apply_to("Output"),
            s.path.apply_to(dir.display())
        ),
        None => println!(
            "  {:<16}{}",
            s.label.apply_to("Output"),
            s.disabled.apply_to("none")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Direct Beam"));
    s.row("Radius", format!("{} px", config.beam.radius));
    s.row("Max steps", config.beam.max_iterations);
    s.row("Fallback", config.beam.fallback);
    println!();

    if config.radial_profile {
        println!("  {}", s.header.apply_to("Radial Profile"));
        s.row("Bins", "1 px");
        println!();
    } else {
        s.off("Radial Profile");
    }

    let t = &config.transform;
    if t.center_beam || t.distortion.is_some() || t.rotation_degrees.is_some() {
        println!("  {}", s.header.apply_to("Transforms"));
        println!(
            "    {:<14}{}",
            s.label.apply_to("Kernel"),
            s.method.apply_to(t.interpolation)
        );
        if t.center_beam {
            s.row("Recenter", "yes");
        }
        if let Some(m) = t.distortion {
            s.row("Distortion", format!("{:?}", m));
        }
        if let Some(angle) = t.rotation_degrees {
            s.row("Rotation", format!("{angle}\u{b0}"));
        }
        println!();
    } else {
        s.off("Transforms");
    }

    match config.background {
        Some(ref bg) => {
            println!("  {}", s.header.apply_to("Background"));
            s.row("h", bg.h);
            println!(
                "    {:<14}{}",
                s.label.apply_to("Method"),
                s.method.apply_to(bg.reconstruction)
            );
            println!();
        }
        None => s.off("Background"),
    }

    match config.vacuum {
        Some(ref vac) => {
            println!("  {}", s.header.apply_to("Vacuum"));
            s.row("Radius", format!("{} px", vac.radius));
            s.row("Threshold", vac.threshold);
            s.row("Closing", if vac.closing { "yes" } else { "no" });
            s.row("Opening", if vac.opening { "yes" } else { "no" });
            println!();
        }
        None => s.off("Vacuum"),
    }
    println!();
}

pub fn print_results(output: &PipelineOutput) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Results"));
    println!();

    let n = output.centers.len();
    let mean_dx = output.shifts.iter().map(|sh| sh.dx).sum::<f64>() / n as f64;
    let mean_dy = output.shifts.iter().map(|sh| sh.dy).sum::<f64>() / n as f64;
    let max_offset = output
        .shifts
        .iter()
        .map(|sh| sh.dx.hypot(sh.dy))
        .fold(0.0f64, f64::max);

    println!("  {}", s.header.apply_to("Direct Beam"));
    s.row("Frames", n);
    s.row("Mean shift", format!("({mean_dx:.3}, {mean_dy:.3}) px"));
    s.row("Max offset", format!("{max_offset:.3} px"));
    println!();

    if let Some(ref profiles) = output.profiles {
        let longest = profiles.iter().map(|p| p.len()).max().unwrap_or(0);
        println!("  {}", s.header.apply_to("Radial Profile"));
        s.row("Profiles", profiles.len());
        s.row("Max bins", longest);
        println!();
    }

    if let Some(ref vacuum) = output.vacuum {
        println!("  {}", s.header.apply_to("Vacuum"));
        s.row("Vacuum", format!("{} / {}", vacuum.vacuum_count(), n));
        println!();
    }
}
