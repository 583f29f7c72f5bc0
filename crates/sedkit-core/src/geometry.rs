//! Circular masks and coordinate helpers shared by the beam finder, the
//! radial profiler and the vacuum classifier.

use ndarray::Array2;

use crate::error::{Result, SedError};
use crate::frame::Center;

/// Boolean disk over a frame: `true` where a pixel lies within `radius` of `center`.
#[derive(Clone, Debug)]
pub struct CircularMask {
    pub data: Array2<bool>,
    pub center: Center,
    pub radius: f64,
}

impl CircularMask {
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of pixels inside the disk.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Complement of the mask (pixels outside the disk).
    pub fn inverted(&self) -> Array2<bool> {
        self.data.mapv(|v| !v)
    }

    /// Zero every pixel of `frame` outside the disk.
    pub fn apply(&self, frame: &Array2<f32>) -> Array2<f32> {
        apply_mask(frame, &self.data)
    }
}

/// Build a circular mask of `radius` around `center`, or around the
/// geometric frame center when `center` is `None`.
///
/// Pixel `(y, x)` is included iff `(x - cx)^2 + (y - cy)^2 <= radius^2`,
/// evaluated in real arithmetic so fractional centers are honoured.
pub fn build_circular_mask(
    shape: (usize, usize),
    radius: f64,
    center: Option<Center>,
) -> Result<CircularMask> {
    validate_radius(radius)?;
    let center = center.unwrap_or_else(|| Center::geometric(shape));
    validate_center(&center, shape)?;

    let r2 = radius * radius;
    let data = Array2::from_shape_fn(shape, |(row, col)| {
        let dy = row as f64 - center.row;
        let dx = col as f64 - center.col;
        dx * dx + dy * dy <= r2
    });

    Ok(CircularMask {
        data,
        center,
        radius,
    })
}

pub fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SedError::InvalidRadius(radius));
    }
    Ok(())
}

pub fn validate_center(center: &Center, shape: (usize, usize)) -> Result<()> {
    if !center.is_inside(shape) {
        return Err(SedError::CenterOutOfRange {
            row: center.row,
            col: center.col,
            height: shape.0,
            width: shape.1,
        });
    }
    Ok(())
}

/// Elementwise `frame * mask`.
pub fn apply_mask(frame: &Array2<f32>, mask: &Array2<bool>) -> Array2<f32> {
    let mut out = frame.clone();
    out.zip_mut_with(mask, |v, &keep| {
        if !keep {
            *v = 0.0;
        }
    });
    out
}

/// The maximum of `data` and the coordinates of every pixel equal to it.
///
/// NaN pixels never win. Returns `None` for an empty array.
pub(crate) fn argmax_all<T>(data: &Array2<T>) -> Option<(T, Vec<(usize, usize)>)>
where
    T: Copy + PartialOrd,
{
    let max_val = data.iter().copied().reduce(|m, v| {
        let m_is_nan = m.partial_cmp(&m).is_none();
        if v > m || m_is_nan {
            v
        } else {
            m
        }
    })?;
    let locations = data
        .indexed_iter()
        .filter(|(_, &v)| v == max_val)
        .map(|(idx, _)| idx)
        .collect();
    Some((max_val, locations))
}

/// Average of `locations`, rounded to the nearest pixel (halves to even).
pub(crate) fn mean_pixel(locations: &[(usize, usize)]) -> (usize, usize) {
    let n = locations.len().max(1) as f64;
    let (sr, sc) = locations
        .iter()
        .fold((0.0f64, 0.0f64), |(ar, ac), &(r, c)| (ar + r as f64, ac + c as f64));
    (
        (sr / n).round_ties_even() as usize,
        (sc / n).round_ties_even() as usize,
    )
}
