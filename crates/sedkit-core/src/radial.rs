//! Rotational averaging of frames into 1D radial intensity profiles.

use ndarray::Array2;
use tracing::info;

use crate::beam::CenterSource;
use crate::error::{Result, SedError};
use crate::frame::Center;
use crate::geometry::validate_center;
use crate::stack::FrameStack;

/// Mean intensity per integer radius bin around a center.
///
/// Bins with no pixels hold `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialProfile {
    pub values: Vec<f64>,
    pub center: Center,
}

impl RadialProfile {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at bin `r`, or `None` when the bin is missing or out of range.
    pub fn get(&self, r: usize) -> Option<f64> {
        self.values.get(r).copied().filter(|v| !v.is_nan())
    }

    pub fn is_missing(&self, r: usize) -> bool {
        self.get(r).is_none()
    }

    /// Number of bins that received at least one pixel.
    pub fn populated_bins(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

/// Average `frame` over rings of integer radius about `center`.
///
/// Each pixel falls into bin `trunc(sqrt(dx^2 + dy^2))`; bins run from 0 to
/// the largest such value over the frame. An empty frame gives an empty profile.
pub fn radial_average(frame: &Array2<f32>, center: Center) -> RadialProfile {
    let (h, w) = frame.dim();
    if h == 0 || w == 0 {
        return RadialProfile {
            values: Vec::new(),
            center,
        };
    }
    let bin_of = |row: usize, col: usize| -> usize {
        let dy = row as f64 - center.row;
        let dx = col as f64 - center.col;
        (dx * dx + dy * dy).sqrt() as usize
    };

    // The farthest pixel is always a corner.
    let max_r = [(0, 0), (0, w - 1), (h - 1, 0), (h - 1, w - 1)]
        .iter()
        .map(|&(r, c)| bin_of(r, c))
        .max()
        .unwrap_or(0);

    let mut sums = vec![0.0f64; max_r + 1];
    let mut counts = vec![0usize; max_r + 1];
    for ((row, col), &val) in frame.indexed_iter() {
        let r = bin_of(row, col);
        sums[r] += val as f64;
        counts[r] += 1;
    }

    let values = sums
        .into_iter()
        .zip(counts)
        .map(|(s, n)| if n == 0 { f64::NAN } else { s / n as f64 })
        .collect();

    RadialProfile { values, center }
}

/// Radial profile of every frame about its own center.
///
/// Profiles may differ in length when centers differ; see [`profiles_to_array`].
pub fn get_radial_profile(
    stack: &FrameStack,
    centers: &CenterSource,
) -> Result<Vec<RadialProfile>> {
    let centers = centers.resolve(stack)?;
    info!(frames = stack.len(), "Computing radial profiles");
    radial_profiles_at(stack, &centers)
}

/// Radial profiles for already-resolved centers.
pub fn radial_profiles_at(stack: &FrameStack, centers: &[Center]) -> Result<Vec<RadialProfile>> {
    if centers.len() != stack.len() {
        return Err(SedError::NavigationMismatch {
            expected: stack.len(),
            actual: centers.len(),
        });
    }
    for center in centers {
        validate_center(center, stack.frame_shape())?;
    }
    Ok(stack.map_frames(|i, frame| radial_average(frame, centers[i])))
}

/// Pack ragged profiles into a `(n_profiles, max_len)` array padded with `NaN`.
pub fn profiles_to_array(profiles: &[RadialProfile]) -> Array2<f64> {
    let width = profiles.iter().map(RadialProfile::len).max().unwrap_or(0);
    let mut out = Array2::from_elem((profiles.len(), width), f64::NAN);
    for (i, profile) in profiles.iter().enumerate() {
        for (r, &v) in profile.values.iter().enumerate() {
            out[[i, r]] = v;
        }
    }
    out
}
