#![allow(dead_code)]

use ndarray::Array2;

use sedkit_core::stack::{FrameStack, NavShape};

/// Frame with a single Gaussian spot of `amplitude` at `(row, col)` on a flat `background`.
pub fn gaussian_frame(
    h: usize,
    w: usize,
    row: f64,
    col: f64,
    sigma: f64,
    amplitude: f32,
    background: f32,
) -> Array2<f32> {
    let s2 = 2.0 * sigma * sigma;
    Array2::from_shape_fn((h, w), |(r, c)| {
        let dy = r as f64 - row;
        let dx = c as f64 - col;
        background + amplitude * (-(dx * dx + dy * dy) / s2).exp() as f32
    })
}

/// Linear stack of Gaussian spots, one per entry of `peaks`.
pub fn gaussian_stack(h: usize, w: usize, peaks: &[(f64, f64)], sigma: f64) -> FrameStack {
    let frames = peaks
        .iter()
        .map(|&(row, col)| gaussian_frame(h, w, row, col, sigma, 1.0, 0.01))
        .collect();
    FrameStack::new(frames).unwrap()
}

/// Stack of `n` all-zero frames laid out as `nav`.
pub fn zero_stack(h: usize, w: usize, nav: NavShape) -> FrameStack {
    let frames = (0..nav.size()).map(|_| Array2::zeros((h, w))).collect();
    FrameStack::with_nav_shape(frames, nav).unwrap()
}

/// Deterministic pseudo-random frame in [0, 1) from a linear congruential generator.
pub fn noise_frame(h: usize, w: usize, seed: u64) -> Array2<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    Array2::from_shape_fn((h, w), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 40) as f32) / (1u64 << 24) as f32
    })
}

/// Location of the brightest pixel.
pub fn argmax(data: &Array2<f32>) -> (usize, usize) {
    data.indexed_iter()
        .fold(((0, 0), f32::NEG_INFINITY), |(best, bv), (idx, &v)| {
            if v > bv {
                (idx, v)
            } else {
                (best, bv)
            }
        })
        .0
}
