//! Affine warps of whole frames: rotation, distortion correction and
//! re-registration of the direct beam.
//!
//! Matrices act on homogeneous `(x, y, 1)` column vectors with `x` along
//! columns and `y` along rows. A matrix is applied about the frame center
//! `(width / 2, height / 2)`; the output is produced by sampling the source
//! frame at the inverse-mapped position of every output pixel.

use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Interpolation;
use crate::consts::{PARALLEL_PIXEL_THRESHOLD, SAMPLE_SNAP_EPSILON, SINGULAR_DETERMINANT};
use crate::error::{Result, SedError};
use crate::frame::Shift;
use crate::stack::FrameStack;

/// 3x3 homogeneous transform, row-major.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix(pub [[f64; 3]; 3]);

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMatrix {
    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self(rows)
    }

    /// Rotation by `degrees`, counter-clockwise as displayed (rows increase downwards).
    pub fn rotation(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self([[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Moves content by `dx` columns and `dy` rows.
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self([[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]])
    }

    /// `self * other`: `other` is applied first.
    pub fn compose(&self, other: &AffineMatrix) -> AffineMatrix {
        let a = &self.0;
        let b = &other.0;
        let mut out = [[0.0f64; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (0..3).map(|k| a[i][k] * b[k][j]).sum();
            }
        }
        AffineMatrix(out)
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse via the adjugate.
    pub fn inverse(&self) -> Result<AffineMatrix> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
            return Err(SedError::SingularMatrix);
        }
        let m = &self.0;
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        let adj = [
            [cof(1, 2, 1, 2), -cof(0, 2, 1, 2), cof(0, 1, 1, 2)],
            [-cof(1, 2, 0, 2), cof(0, 2, 0, 2), -cof(0, 1, 0, 2)],
            [cof(1, 2, 0, 1), -cof(0, 2, 0, 1), cof(0, 1, 0, 1)],
        ];
        let mut out = [[0.0f64; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = adj[i][j] / det;
            }
        }
        Ok(AffineMatrix(out))
    }

    /// Map point `(x, y)`. Returns `None` when it lands at infinity.
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let m = &self.0;
        let tx = m[0][0] * x + m[0][1] * y + m[0][2];
        let ty = m[1][0] * x + m[1][1] * y + m[1][2];
        let tw = m[2][0] * x + m[2][1] * y + m[2][2];
        if tw.abs() < SINGULAR_DETERMINANT {
            return None;
        }
        Some((tx / tw, ty / tw))
    }

    /// Conjugate `self` so it acts about `(width / 2, height / 2)` instead of the origin.
    pub fn about_frame_center(&self, shape: (usize, usize)) -> AffineMatrix {
        let (h, w) = shape;
        let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
        AffineMatrix::translation(cx, cy)
            .compose(self)
            .compose(&AffineMatrix::translation(-cx, -cy))
    }
}

/// Warp `frame` by `matrix` applied about the frame center.
///
/// Output pixels whose source falls outside the frame are zero.
pub fn apply_affine(
    frame: &Array2<f32>,
    matrix: &AffineMatrix,
    interpolation: Interpolation,
) -> Result<Array2<f32>> {
    let (h, w) = frame.dim();
    let inverse = matrix.about_frame_center((h, w)).inverse()?;
    let resampler = Resampler::new(frame, interpolation);

    let sample_at = |row: usize, col: usize| -> f32 {
        match inverse.apply(col as f64, row as f64) {
            Some((sx, sy)) => resampler.sample(sy, sx),
            None => 0.0,
        }
    };

    let mut out = Array2::<f32>::zeros((h, w));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut line)| {
                for (col, v) in line.iter_mut().enumerate() {
                    *v = sample_at(row, col);
                }
            });
    } else {
        for ((row, col), v) in out.indexed_iter_mut() {
            *v = sample_at(row, col);
        }
    }
    Ok(out)
}

/// Sample `data` at fractional position `(y, x)`.
///
/// Builds a [`Resampler`] for a single lookup; warps reuse one per frame.
pub fn sample(data: &Array2<f32>, y: f64, x: f64, interpolation: Interpolation) -> f32 {
    Resampler::new(data, interpolation).sample(y, x)
}

/// A frame prepared for repeated fractional lookups.
///
/// Positions outside `[0, h-1] x [0, w-1]` give zero. Bilinear taps past the
/// border reuse the edge pixel. Cubic sampling evaluates an interpolating
/// cubic B-spline whose coefficients are prefiltered with mirror boundaries,
/// and its output is clipped to the value range of the frame (zero included).
pub struct Resampler<'a> {
    data: &'a Array2<f32>,
    interpolation: Interpolation,
    coefficients: Option<Array2<f64>>,
    range: (f32, f32),
}

impl<'a> Resampler<'a> {
    pub fn new(data: &'a Array2<f32>, interpolation: Interpolation) -> Self {
        let (coefficients, range) = match interpolation {
            Interpolation::Bicubic if !data.is_empty() => {
                let lo = data.iter().cloned().fold(0.0f32, f32::min);
                let hi = data.iter().cloned().fold(0.0f32, f32::max);
                (Some(spline_coefficients(data)), (lo, hi))
            }
            _ => (None, (f32::NEG_INFINITY, f32::INFINITY)),
        };
        Self {
            data,
            interpolation,
            coefficients,
            range,
        }
    }

    pub fn sample(&self, y: f64, x: f64) -> f32 {
        let (h, w) = self.data.dim();
        if h == 0 || w == 0 {
            return 0.0;
        }
        let y = snap(y);
        let x = snap(x);
        if !(y >= 0.0 && x >= 0.0 && y <= (h - 1) as f64 && x <= (w - 1) as f64) {
            return 0.0;
        }
        if y.fract() == 0.0 && x.fract() == 0.0 {
            return self.data[[y as usize, x as usize]];
        }

        let at = |r: i64, c: i64| -> f32 {
            let r = r.clamp(0, h as i64 - 1) as usize;
            let c = c.clamp(0, w as i64 - 1) as usize;
            self.data[[r, c]]
        };

        match (self.interpolation, &self.coefficients) {
            (Interpolation::Nearest, _) => at(y.round() as i64, x.round() as i64),
            (Interpolation::Bicubic, Some(coefficients)) => {
                let x0 = x.floor() as i64;
                let y0 = y.floor() as i64;
                let wx = bspline_weights(x - x0 as f64);
                let wy = bspline_weights(y - y0 as f64);

                let mut acc = 0.0f64;
                for (i, wyi) in wy.iter().enumerate() {
                    let r = mirror_index(y0 - 1 + i as i64, h);
                    let mut row_acc = 0.0f64;
                    for (j, wxj) in wx.iter().enumerate() {
                        let c = mirror_index(x0 - 1 + j as i64, w);
                        row_acc += coefficients[[r, c]] * wxj;
                    }
                    acc += row_acc * wyi;
                }
                (acc as f32).clamp(self.range.0, self.range.1)
            }
            _ => {
                let x0 = x.floor() as i64;
                let y0 = y.floor() as i64;
                let fx = (x - x0 as f64) as f32;
                let fy = (y - y0 as f64) as f32;

                at(y0, x0) * (1.0 - fx) * (1.0 - fy)
                    + at(y0, x0 + 1) * fx * (1.0 - fy)
                    + at(y0 + 1, x0) * (1.0 - fx) * fy
                    + at(y0 + 1, x0 + 1) * fx * fy
            }
        }
    }
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SAMPLE_SNAP_EPSILON {
        r
    } else {
        v
    }
}

/// Cubic B-spline basis weights for taps at offsets -1, 0, 1, 2.
fn bspline_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        (1.0 - t).powi(3) / 6.0,
        (4.0 - 6.0 * t2 + 3.0 * t3) / 6.0,
        (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) / 6.0,
        t3 / 6.0,
    ]
}

/// Whole-sample symmetric reflection of `i` into `0..n`.
fn mirror_index(i: i64, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as i64 - 1);
    let m = i.rem_euclid(period);
    if m >= n as i64 {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Separable cubic B-spline prefilter: rows first, then columns.
fn spline_coefficients(data: &Array2<f32>) -> Array2<f64> {
    let mut coefficients = data.mapv(|v| v as f64);
    for axis in [Axis(1), Axis(0)] {
        for mut lane in coefficients.lanes_mut(axis) {
            let mut line: Vec<f64> = lane.iter().copied().collect();
            prefilter_line(&mut line);
            for (dst, src) in lane.iter_mut().zip(line) {
                *dst = src;
            }
        }
    }
    coefficients
}

/// In-place causal/anti-causal recursion for the cubic B-spline pole,
/// with mirror boundary initialization.
fn prefilter_line(c: &mut [f64]) {
    let n = c.len();
    if n < 2 {
        return;
    }
    let z = 3.0f64.sqrt() - 2.0;
    let gain = (1.0 - z) * (1.0 - 1.0 / z);
    c.iter_mut().for_each(|v| *v *= gain);

    let mut zn = z;
    let mut z2n = z.powi(n as i32 - 1);
    let mut sum = c[0] + z2n * c[n - 1];
    z2n *= z2n / z;
    for k in 1..n - 1 {
        sum += (zn + z2n) * c[k];
        zn *= z;
        z2n /= z;
    }
    c[0] = sum / (1.0 - zn * zn);
    for k in 1..n {
        c[k] += z * c[k - 1];
    }

    c[n - 1] = (z / (z * z - 1.0)) * (z * c[n - 2] + c[n - 1]);
    for k in (0..n - 1).rev() {
        c[k] = z * (c[k + 1] - c[k]);
    }
}

/// Rotate every frame by `angle_degrees` about its center.
pub fn rotate_patterns(
    stack: &FrameStack,
    angle_degrees: f64,
    interpolation: Interpolation,
) -> Result<FrameStack> {
    info!(
        frames = stack.len(),
        angle = angle_degrees,
        %interpolation,
        "Rotating patterns"
    );
    let matrix = AffineMatrix::rotation(angle_degrees);
    stack.map_into_stack(|_, frame| apply_affine(frame, &matrix, interpolation))
}

/// Apply a distortion-correction matrix to every frame.
pub fn correct_geometric_distortion(
    stack: &FrameStack,
    matrix: &AffineMatrix,
    interpolation: Interpolation,
) -> Result<FrameStack> {
    matrix.inverse()?;
    info!(frames = stack.len(), %interpolation, "Correcting geometric distortion");
    stack.map_into_stack(|_, frame| apply_affine(frame, matrix, interpolation))
}

/// Translate each frame by `-shift` so its beam lands on the geometric center.
pub fn center_patterns(
    stack: &FrameStack,
    shifts: &[Shift],
    interpolation: Interpolation,
) -> Result<FrameStack> {
    if shifts.len() != stack.len() {
        return Err(SedError::NavigationMismatch {
            expected: stack.len(),
            actual: shifts.len(),
        });
    }
    info!(frames = stack.len(), %interpolation, "Centering patterns on the direct beam");
    stack.map_into_stack(|i, frame| shift_frame(frame, &shifts[i].negated(), interpolation))
}

/// Move the content of `frame` by `shift`.
pub fn shift_frame(
    frame: &Array2<f32>,
    shift: &Shift,
    interpolation: Interpolation,
) -> Result<Array2<f32>> {
    apply_affine(
        frame,
        &AffineMatrix::translation(shift.dx, shift.dy),
        interpolation,
    )
}
