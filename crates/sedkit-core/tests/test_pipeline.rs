mod common;

use std::sync::Mutex;

use approx::assert_abs_diff_eq;

use sedkit_core::config::{BackgroundConfig, ProcessingConfig, VacuumConfig};
use sedkit_core::pipeline::{run_pipeline, NoOpReporter, PipelineStage, ProgressReporter};
use sedkit_core::stack::{FrameStack, NavShape};

use common::{argmax, gaussian_frame};

/// Records the stages it is told about.
#[derive(Default)]
struct StageLog {
    stages: Mutex<Vec<PipelineStage>>,
}

impl ProgressReporter for StageLog {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }
}

fn grid_stack() -> FrameStack {
    let peaks = [(14.0, 15.0), (16.0, 17.0), (15.0, 13.0), (17.0, 16.0)];
    let frames = peaks
        .iter()
        .map(|&(r, c)| gaussian_frame(32, 32, r, c, 2.0, 1.0, 0.01))
        .collect();
    FrameStack::with_nav_shape(frames, NavShape::Grid { rows: 2, cols: 2 }).unwrap()
}

#[test]
fn test_default_pipeline_locates_beams_and_profiles() {
    let stack = grid_stack();
    let out = run_pipeline(&stack, &ProcessingConfig::default(), &NoOpReporter).unwrap();

    assert_eq!(out.centers.len(), 4);
    assert_eq!(out.shifts.len(), 4);
    assert_abs_diff_eq!(out.centers[0].row, 14.0, epsilon = 0.1);
    assert_abs_diff_eq!(out.centers[0].col, 15.0, epsilon = 0.1);
    // Geometric center of a 32x32 frame is (15.5, 15.5).
    assert_abs_diff_eq!(out.shifts[1].dx, 1.5, epsilon = 0.1);
    assert_abs_diff_eq!(out.shifts[1].dy, 0.5, epsilon = 0.1);

    let profiles = out.profiles.unwrap();
    assert_eq!(profiles.len(), 4);
    assert!(out.vacuum.is_none());
    assert!(out.frames.is_none());
}

#[test]
fn test_full_pipeline_runs_every_stage_in_order() {
    let stack = grid_stack();
    let mut config = ProcessingConfig::default();
    config.transform.center_beam = true;
    config.transform.rotation_degrees = Some(0.0);
    config.transform.distortion = Some([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    config.vacuum = Some(VacuumConfig {
        radius: 6.0,
        threshold: 0.5,
        ..Default::default()
    });
    config.background = Some(BackgroundConfig::default());

    let log = StageLog::default();
    let out = run_pipeline(&stack, &config, &log).unwrap();

    assert_eq!(
        *log.stages.lock().unwrap(),
        vec![
            PipelineStage::BeamSearch,
            PipelineStage::RadialProfile,
            PipelineStage::VacuumMask,
            PipelineStage::Transform,
            PipelineStage::Background,
        ]
    );

    // Frames carry only the beam and low background, so all count as vacuum.
    let vacuum = out.vacuum.unwrap();
    assert_eq!(vacuum.data.dim(), (2, 2));
    assert_eq!(vacuum.vacuum_count(), 4);

    let frames = out.frames.unwrap();
    assert_eq!(frames.len(), 4);
    assert_eq!(frames.nav_shape(), NavShape::Grid { rows: 2, cols: 2 });
    for frame in frames.frames() {
        let (r, c) = argmax(frame);
        assert!((15..=16).contains(&r) && (15..=16).contains(&c), "peak at ({r}, {c})");
    }
}

#[test]
fn test_pipeline_skips_radial_profile_when_disabled() {
    let stack = grid_stack();
    let config = ProcessingConfig {
        radial_profile: false,
        ..Default::default()
    };
    let log = StageLog::default();
    let out = run_pipeline(&stack, &config, &log).unwrap();
    assert!(out.profiles.is_none());
    assert_eq!(*log.stages.lock().unwrap(), vec![PipelineStage::BeamSearch]);
}
