//! End-to-end processing of a frame stack from a [`ProcessingConfig`].

use tracing::info;

use crate::background::remove_background;
use crate::beam::{get_direct_beam_position, shifts_from_centers};
use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::frame::{Center, Shift};
use crate::radial::{radial_profiles_at, RadialProfile};
use crate::stack::FrameStack;
use crate::transform::{center_patterns, correct_geometric_distortion, rotate_patterns, AffineMatrix};
use crate::vacuum::{get_vacuum_mask, VacuumMask};

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    BeamSearch,
    RadialProfile,
    VacuumMask,
    Transform,
    Background,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeamSearch => write!(f, "Locating direct beam"),
            Self::RadialProfile => write!(f, "Computing radial profiles"),
            Self::VacuumMask => write!(f, "Classifying vacuum frames"),
            Self::Transform => write!(f, "Transforming frames"),
            Self::Background => write!(f, "Removing background"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started over `total_items` frames, if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Everything the pipeline computed.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub centers: Vec<Center>,
    pub shifts: Vec<Shift>,
    pub profiles: Option<Vec<RadialProfile>>,
    pub vacuum: Option<VacuumMask>,
    /// Frames after transforms and background removal, when any were requested.
    pub frames: Option<FrameStack>,
}

/// Run every stage enabled in `config` over `stack`.
///
/// Beam centers are computed once and reused for shifts, radial profiles and
/// re-registration. Transforms are applied in the order: beam centering,
/// distortion correction, rotation; background removal runs last.
pub fn run_pipeline(
    stack: &FrameStack,
    config: &ProcessingConfig,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineOutput> {
    let n = stack.len();
    info!(frames = n, nav = %stack.nav_shape(), "Starting pipeline");

    reporter.begin_stage(PipelineStage::BeamSearch, Some(n));
    let centers = get_direct_beam_position(stack, &config.beam)?;
    let shifts = shifts_from_centers(&centers, stack.frame_shape());
    reporter.finish_stage();

    let profiles = if config.radial_profile {
        reporter.begin_stage(PipelineStage::RadialProfile, Some(n));
        let profiles = radial_profiles_at(stack, &centers)?;
        reporter.finish_stage();
        Some(profiles)
    } else {
        None
    };

    let vacuum = match &config.vacuum {
        Some(vacuum_config) => {
            reporter.begin_stage(PipelineStage::VacuumMask, Some(n));
            let mask = get_vacuum_mask(stack, vacuum_config)?;
            reporter.finish_stage();
            Some(mask)
        }
        None => None,
    };

    let transform = &config.transform;
    let mut frames: Option<FrameStack> = None;
    if transform.center_beam || transform.distortion.is_some() || transform.rotation_degrees.is_some()
    {
        reporter.begin_stage(PipelineStage::Transform, Some(n));
        if transform.center_beam {
            let current = frames.as_ref().unwrap_or(stack);
            frames = Some(center_patterns(current, &shifts, transform.interpolation)?);
        }
        if let Some(rows) = transform.distortion {
            let current = frames.as_ref().unwrap_or(stack);
            let matrix = AffineMatrix::from_rows(rows);
            frames = Some(correct_geometric_distortion(
                current,
                &matrix,
                transform.interpolation,
            )?);
        }
        if let Some(angle) = transform.rotation_degrees {
            let current = frames.as_ref().unwrap_or(stack);
            frames = Some(rotate_patterns(current, angle, transform.interpolation)?);
        }
        reporter.finish_stage();
    }

    if let Some(background_config) = &config.background {
        reporter.begin_stage(PipelineStage::Background, Some(n));
        let current = frames.as_ref().unwrap_or(stack);
        frames = Some(remove_background(current, background_config)?);
        reporter.finish_stage();
    }

    info!(frames = n, "Pipeline complete");
    Ok(PipelineOutput {
        centers,
        shifts,
        profiles,
        vacuum,
        frames,
    })
}
