//! Hill-climbing refinement of the direct beam in a single frame.
//!
//! Starting from an integer seed, the search repeatedly masks a disk around
//! the current pixel and jumps to the brightest location inside it. It stops
//! once the current pixel is itself the brightest in its own disk, then takes
//! the intensity-weighted centroid of that final disk.

use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, SedError};
use crate::frame::Center;
use crate::geometry::{argmax_all, build_circular_mask, mean_pixel, validate_center};

/// Refine the beam position in `frame` from an integer `start` pixel.
///
/// Returns the sub-pixel center of mass of the converged disk, or
/// [`SedError::NotConverged`] when the climb has not settled after
/// `max_iterations` moves or cycles on a plateau it cannot leave.
pub fn refine_beam_position(
    frame: &Array2<f32>,
    start: (usize, usize),
    radius: f64,
    max_iterations: usize,
) -> Result<Center> {
    let shape = frame.dim();
    validate_center(&Center::from(start), shape)?;

    let mut current = start;
    let mut mask = build_circular_mask(shape, radius, Some(Center::from(current)))?;
    let mut masked = mask.apply(frame);
    let mut iterations = 0usize;

    loop {
        let (masked_max, locations) = argmax_all(&masked).ok_or(SedError::EmptyStack)?;
        if frame[current] >= masked_max {
            break;
        }

        let candidate = mean_pixel(&locations);
        if candidate == current || iterations >= max_iterations {
            // Tied maxima averaging back onto a non-maximal pixel never resolve.
            return Err(SedError::NotConverged {
                iterations,
                row: current.0,
                col: current.1,
            });
        }

        iterations += 1;
        current = candidate;
        mask = build_circular_mask(shape, radius, Some(Center::from(current)))?;
        masked = mask.apply(frame);
    }

    debug!(
        start_row = start.0,
        start_col = start.1,
        row = current.0,
        col = current.1,
        iterations,
        "Beam refinement converged"
    );

    Ok(center_of_mass(&masked, &mask.data).unwrap_or_else(|| Center::from(current)))
}

/// Intensity-weighted centroid over the pixels selected by `mask`.
///
/// Returns `None` when the selected pixels carry no intensity.
pub fn center_of_mass(data: &Array2<f32>, mask: &Array2<bool>) -> Option<Center> {
    let mut sum_r = 0.0f64;
    let mut sum_c = 0.0f64;
    let mut sum_w = 0.0f64;

    for ((row, col), &val) in data.indexed_iter() {
        if !mask[[row, col]] {
            continue;
        }
        let weight = val as f64;
        sum_r += row as f64 * weight;
        sum_c += col as f64 * weight;
        sum_w += weight;
    }

    if sum_w > 0.0 {
        Some(Center::new(sum_r / sum_w, sum_c / sum_w))
    } else {
        None
    }
}
