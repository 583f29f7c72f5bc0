//! Background removal by grayscale morphological reconstruction.
//!
//! For each frame, the reconstruction of `frame - h` under `frame` is the
//! smooth "floor" left once every peak shallower than `h` has been flattened.
//! Subtracting it keeps only the tops of peaks that stand at least `h`
//! above their surroundings.

use std::collections::VecDeque;

use ndarray::{Array2, Axis};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{BackgroundConfig, ReconstructionMethod};
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{Result, SedError};
use crate::stack::FrameStack;

/// Normalize, subtract the reconstructed background from every frame,
/// smooth with a 3x3 mean, then normalize again.
pub fn remove_background(stack: &FrameStack, config: &BackgroundConfig) -> Result<FrameStack> {
    if !config.h.is_finite() || config.h < 0.0 {
        return Err(SedError::InvalidParameter(format!(
            "background h must be a non-negative number, got {}",
            config.h
        )));
    }
    info!(
        frames = stack.len(),
        h = config.h,
        method = %config.reconstruction,
        "Removing background"
    );

    let mut normalized = stack.clone();
    normalize_by_max(&mut normalized);

    let mut filtered = normalized.map_into_stack(|_, frame| {
        let residual = regional_filter(frame, config.h, config.reconstruction)?;
        Ok(mean_filter_3x3(&residual))
    })?;
    normalize_by_max(&mut filtered);
    Ok(filtered)
}

fn normalize_by_max(stack: &mut FrameStack) {
    let max = stack.max();
    if max > 0.0 && max.is_finite() {
        stack.scale_in_place(max);
    } else {
        warn!(max, "Stack maximum is not positive, skipping normalization");
    }
}

/// `frame - reconstruct_by_dilation(frame - h, frame)`.
pub fn regional_filter(
    frame: &Array2<f32>,
    h: f32,
    method: ReconstructionMethod,
) -> Result<Array2<f32>> {
    let seed = frame.mapv(|v| v - h);
    let background = reconstruct_by_dilation(&seed, frame, method)?;
    Ok(frame - &background)
}

/// Grayscale reconstruction of `seed` under `mask` with a 3x3 neighborhood.
///
/// The seed is first clipped to the mask. Both methods converge to the same
/// image: the fixed point of repeated dilation clipped to `mask`.
pub fn reconstruct_by_dilation(
    seed: &Array2<f32>,
    mask: &Array2<f32>,
    method: ReconstructionMethod,
) -> Result<Array2<f32>> {
    if seed.dim() != mask.dim() {
        return Err(SedError::ShapeMismatch {
            expected: mask.dim(),
            actual: seed.dim(),
        });
    }
    let mut marker = seed.clone();
    marker.zip_mut_with(mask, |s, &m| *s = s.min(m));

    Ok(match method {
        ReconstructionMethod::Iterative => reconstruct_iterative(marker, mask),
        ReconstructionMethod::Hybrid => reconstruct_hybrid(marker, mask),
    })
}

fn reconstruct_iterative(mut marker: Array2<f32>, mask: &Array2<f32>) -> Array2<f32> {
    let mut passes = 0usize;
    loop {
        let mut next = dilate_3x3(&marker);
        next.zip_mut_with(mask, |v, &m| *v = v.min(m));
        passes += 1;
        if next == marker {
            break;
        }
        marker = next;
    }
    debug!(passes, "Iterative reconstruction reached fixed point");
    marker
}

/// Forward and backward raster scans, then FIFO propagation of the pixels
/// the backward scan could still raise.
fn reconstruct_hybrid(mut marker: Array2<f32>, mask: &Array2<f32>) -> Array2<f32> {
    let (h, w) = marker.dim();
    let (hi, wi) = (h as isize, w as isize);
    let inside = |r: isize, c: isize| r >= 0 && r < hi && c >= 0 && c < wi;

    const FORWARD: [(isize, isize); 4] = [(-1, -1), (-1, 0), (-1, 1), (0, -1)];
    const BACKWARD: [(isize, isize); 4] = [(0, 1), (1, -1), (1, 0), (1, 1)];

    for row in 0..hi {
        for col in 0..wi {
            let mut v = marker[[row as usize, col as usize]];
            for &(dr, dc) in &FORWARD {
                let (nr, nc) = (row + dr, col + dc);
                if inside(nr, nc) {
                    v = v.max(marker[[nr as usize, nc as usize]]);
                }
            }
            marker[[row as usize, col as usize]] = v.min(mask[[row as usize, col as usize]]);
        }
    }

    let mut queue = VecDeque::new();
    for row in (0..hi).rev() {
        for col in (0..wi).rev() {
            let idx = [row as usize, col as usize];
            let mut v = marker[idx];
            for &(dr, dc) in &BACKWARD {
                let (nr, nc) = (row + dr, col + dc);
                if inside(nr, nc) {
                    v = v.max(marker[[nr as usize, nc as usize]]);
                }
            }
            let v = v.min(mask[idx]);
            marker[idx] = v;

            let raises_neighbor = BACKWARD.iter().any(|&(dr, dc)| {
                let (nr, nc) = (row + dr, col + dc);
                if !inside(nr, nc) {
                    return false;
                }
                let q = [nr as usize, nc as usize];
                marker[q] < v && marker[q] < mask[q]
            });
            if raises_neighbor {
                queue.push_back((row, col));
            }
        }
    }

    let mut propagated = 0usize;
    while let Some((row, col)) = queue.pop_front() {
        let v = marker[[row as usize, col as usize]];
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (nr, nc) = (row + dr, col + dc);
                if !inside(nr, nc) {
                    continue;
                }
                let q = [nr as usize, nc as usize];
                if marker[q] < v && marker[q] != mask[q] {
                    marker[q] = v.min(mask[q]);
                    queue.push_back((nr, nc));
                    propagated += 1;
                }
            }
        }
    }
    debug!(propagated, "Hybrid reconstruction finished");
    marker
}

/// Grayscale dilation: maximum over the in-bounds 3x3 neighborhood.
pub fn dilate_3x3(data: &Array2<f32>) -> Array2<f32> {
    neighborhood_map(data, |values| {
        values.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    })
}

/// Local mean over the in-bounds 3x3 neighborhood.
///
/// Border pixels average only the neighbors that exist, so a constant frame
/// stays constant.
pub fn mean_filter_3x3(data: &Array2<f32>) -> Array2<f32> {
    neighborhood_map(data, |values| {
        values.iter().sum::<f32>() / values.len() as f32
    })
}

fn neighborhood_map<F>(data: &Array2<f32>, reduce: F) -> Array2<f32>
where
    F: Fn(&[f32]) -> f32 + Sync,
{
    let (h, w) = data.dim();
    let compute_row = |row: usize, out: &mut dyn FnMut(usize, f32)| {
        let mut values = [0.0f32; 9];
        for col in 0..w {
            let mut n = 0;
            for r in row.saturating_sub(1)..=(row + 1).min(h - 1) {
                for c in col.saturating_sub(1)..=(col + 1).min(w - 1) {
                    values[n] = data[[r, c]];
                    n += 1;
                }
            }
            out(col, reduce(&values[..n]));
        }
    };

    let mut result = Array2::<f32>::zeros((h, w));
    if h == 0 || w == 0 {
        return result;
    }
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut line)| compute_row(row, &mut |col, v| line[col] = v));
    } else {
        for (row, mut line) in result.axis_iter_mut(Axis(0)).enumerate() {
            compute_row(row, &mut |col, v| line[col] = v);
        }
    }
    result
}
