//! Direct-beam localization across a frame stack.

pub mod refine;
pub mod seed;

pub use refine::{center_of_mass, refine_beam_position};
pub use seed::estimate_global_center;

use tracing::{info, warn};

use crate::config::{BeamConfig, ConvergenceFallback};
use crate::error::{Result, SedError};
use crate::frame::{Center, Shift};
use crate::geometry::validate_radius;
use crate::stack::FrameStack;

/// Where per-frame beam centers come from.
#[derive(Clone, Debug)]
pub enum CenterSource<'a> {
    /// Locate the beam in every frame with the given search parameters.
    Refine(BeamConfig),
    /// Caller-provided centers, one per navigation index.
    Supplied(&'a [Center]),
}

impl Default for CenterSource<'_> {
    fn default() -> Self {
        Self::Refine(BeamConfig::default())
    }
}

impl CenterSource<'_> {
    /// Resolve to one center per frame of `stack`.
    pub fn resolve(&self, stack: &FrameStack) -> Result<Vec<Center>> {
        match self {
            Self::Refine(config) => get_direct_beam_position(stack, config),
            Self::Supplied(centers) => {
                if centers.len() != stack.len() {
                    return Err(SedError::NavigationMismatch {
                        expected: stack.len(),
                        actual: centers.len(),
                    });
                }
                Ok(centers.to_vec())
            }
        }
    }
}

/// Locate the direct beam in every frame.
///
/// A single seed from [`estimate_global_center`] is refined independently in
/// each frame. Results are in navigation order.
pub fn get_direct_beam_position(stack: &FrameStack, config: &BeamConfig) -> Result<Vec<Center>> {
    validate_radius(config.radius)?;
    let seed = estimate_global_center(stack)?;
    let start = seed.to_pixel();

    info!(
        frames = stack.len(),
        radius = config.radius,
        seed_row = start.0,
        seed_col = start.1,
        "Refining direct beam positions"
    );

    stack.try_map_frames(|index, frame| {
        match refine_beam_position(frame, start, config.radius, config.max_iterations) {
            Ok(center) => Ok(center),
            Err(SedError::NotConverged { iterations, .. })
                if config.fallback == ConvergenceFallback::UseSeed =>
            {
                warn!(index, iterations, "Beam refinement did not converge, using seed");
                Ok(seed)
            }
            Err(e) => Err(e),
        }
    })
}

/// Shift of each frame's beam from the geometric frame center.
pub fn get_direct_beam_shifts(stack: &FrameStack, centers: &CenterSource) -> Result<Vec<Shift>> {
    let centers = centers.resolve(stack)?;
    Ok(shifts_from_centers(&centers, stack.frame_shape()))
}

/// `center - geometric_center` for each center, for frames of `shape`.
pub fn shifts_from_centers(centers: &[Center], shape: (usize, usize)) -> Vec<Shift> {
    let reference = Center::geometric(shape);
    centers
        .iter()
        .map(|c| Shift::between(c, &reference))
        .collect()
}
