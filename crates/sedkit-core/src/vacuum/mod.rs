//! Classification of vacuum (signal-free) frames across the navigation grid.

pub mod morphology;

use ndarray::Array2;
use tracing::info;

use crate::config::VacuumConfig;
use crate::error::{Result, SedError};
use crate::frame::Center;
use crate::geometry::{apply_mask, build_circular_mask, CircularMask};
use crate::stack::{frame_max, FrameStack, NavShape};

use morphology::{binary_closing, binary_opening};

/// One flag per navigation index; `true` marks a vacuum frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VacuumMask {
    /// Flags laid out over the navigation grid (a linear scan is one row).
    pub data: Array2<bool>,
    pub nav: NavShape,
}

impl VacuumMask {
    /// Flag at linear navigation `index`.
    pub fn get(&self, index: usize) -> Option<bool> {
        let (_, cols) = self.data.dim();
        if cols == 0 || index >= self.nav.size() {
            return None;
        }
        self.data.get([index / cols, index % cols]).copied()
    }

    /// Flags in navigation order.
    pub fn to_vec(&self) -> Vec<bool> {
        self.data.iter().copied().collect()
    }

    pub fn vacuum_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Circular mask covering the direct beam; `None` centers it on the frame.
pub fn get_direct_beam_mask(
    shape: (usize, usize),
    radius: f64,
    center: Option<Center>,
) -> Result<CircularMask> {
    build_circular_mask(shape, radius, center)
}

/// Flag frames whose intensity outside the direct beam never exceeds
/// `config.threshold`, then optionally clean the flags with navigation-space
/// closing and/or opening (closing first when both are requested).
pub fn get_vacuum_mask(stack: &FrameStack, config: &VacuumConfig) -> Result<VacuumMask> {
    if !config.threshold.is_finite() {
        return Err(SedError::InvalidParameter(format!(
            "vacuum threshold must be finite, got {}",
            config.threshold
        )));
    }
    let beam = get_direct_beam_mask(stack.frame_shape(), config.radius, config.center)?;
    let outside_beam = beam.inverted();

    info!(
        frames = stack.len(),
        radius = config.radius,
        threshold = config.threshold,
        closing = config.closing,
        opening = config.opening,
        "Classifying vacuum frames"
    );

    let flags = stack.map_frames(|_, frame| {
        frame_max(&apply_mask(frame, &outside_beam)) <= config.threshold
    });

    let nav = stack.nav_shape();
    let mut data = Array2::from_shape_vec(nav.dims(), flags).map_err(|_| {
        SedError::NavigationMismatch {
            expected: nav.size(),
            actual: stack.len(),
        }
    })?;

    if config.closing {
        data = binary_closing(&data);
    }
    if config.opening {
        data = binary_opening(&data);
    }

    Ok(VacuumMask { data, nav })
}
