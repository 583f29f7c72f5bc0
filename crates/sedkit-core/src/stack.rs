//! In-memory frame stack indexed by navigation position.
//!
//! Every per-frame operation in the crate runs through [`FrameStack::map_frames`]
//! or [`FrameStack::try_map_frames`], which fan work out across frames with
//! Rayon and collect results in navigation order.

use ndarray::{Array2, ArrayViewMut1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consts::{PARALLEL_FRAME_THRESHOLD, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{Result, SedError};

/// Shape of the navigation (scan) dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavShape {
    /// A single line of `n` positions.
    Linear(usize),
    /// A raster of `rows x cols` positions, row-major.
    Grid { rows: usize, cols: usize },
}

impl NavShape {
    pub fn size(&self) -> usize {
        match *self {
            Self::Linear(n) => n,
            Self::Grid { rows, cols } => rows * cols,
        }
    }

    /// 2D extent used for navigation-space morphology. A linear axis is a single row.
    pub fn dims(&self) -> (usize, usize) {
        match *self {
            Self::Linear(n) => (1, n),
            Self::Grid { rows, cols } => (rows, cols),
        }
    }
}

impl std::fmt::Display for NavShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear(n) => write!(f, "{n}"),
            Self::Grid { rows, cols } => write!(f, "{rows}x{cols}"),
        }
    }
}

/// An ordered collection of equally-sized 2D intensity frames.
#[derive(Clone, Debug)]
pub struct FrameStack {
    frames: Vec<Array2<f32>>,
    nav: NavShape,
    frame_shape: (usize, usize),
}

impl FrameStack {
    /// Build a linear stack. All frames must share one `(height, width)`.
    pub fn new(frames: Vec<Array2<f32>>) -> Result<Self> {
        let n = frames.len();
        Self::with_nav_shape(frames, NavShape::Linear(n))
    }

    pub fn with_nav_shape(frames: Vec<Array2<f32>>, nav: NavShape) -> Result<Self> {
        let first = frames.first().ok_or(SedError::EmptyStack)?;
        let frame_shape = first.dim();
        if frame_shape.0 == 0 || frame_shape.1 == 0 {
            return Err(SedError::InvalidParameter(format!(
                "frames must be non-empty, got {}x{}",
                frame_shape.1, frame_shape.0
            )));
        }
        if let Some(bad) = frames.iter().find(|f| f.dim() != frame_shape) {
            return Err(SedError::ShapeMismatch {
                expected: frame_shape,
                actual: bad.dim(),
            });
        }
        if nav.size() != frames.len() {
            return Err(SedError::NavigationMismatch {
                expected: nav.size(),
                actual: frames.len(),
            });
        }
        Ok(Self {
            frames,
            nav,
            frame_shape,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn nav_shape(&self) -> NavShape {
        self.nav
    }

    /// `(height, width)` shared by every frame.
    pub fn frame_shape(&self) -> (usize, usize) {
        self.frame_shape
    }

    pub fn frame(&self, index: usize) -> Option<&Array2<f32>> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Array2<f32>] {
        &self.frames
    }

    /// Apply `f` to every frame, returning results in navigation order.
    pub fn map_frames<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize, &Array2<f32>) -> T + Sync + Send,
    {
        if self.frames.len() >= PARALLEL_FRAME_THRESHOLD {
            self.frames
                .par_iter()
                .enumerate()
                .map(|(i, frame)| f(i, frame))
                .collect()
        } else {
            self.frames
                .iter()
                .enumerate()
                .map(|(i, frame)| f(i, frame))
                .collect()
        }
    }

    /// Fallible variant of [`map_frames`](Self::map_frames). The first error
    /// encountered (in any order) is returned.
    pub fn try_map_frames<T, F>(&self, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize, &Array2<f32>) -> Result<T> + Sync + Send,
    {
        if self.frames.len() >= PARALLEL_FRAME_THRESHOLD {
            self.frames
                .par_iter()
                .enumerate()
                .map(|(i, frame)| f(i, frame))
                .collect()
        } else {
            self.frames
                .iter()
                .enumerate()
                .map(|(i, frame)| f(i, frame))
                .collect()
        }
    }

    /// Build a new stack with the same navigation shape from per-frame outputs.
    pub fn map_into_stack<F>(&self, f: F) -> Result<FrameStack>
    where
        F: Fn(usize, &Array2<f32>) -> Result<Array2<f32>> + Sync + Send,
    {
        let frames = self.try_map_frames(f)?;
        FrameStack::with_nav_shape(frames, self.nav)
    }

    /// Elementwise sum of every frame in f64.
    ///
    /// Each pixel is accumulated in navigation order, so the result is the
    /// same for any thread count.
    pub fn sum(&self) -> Array2<f64> {
        let (h, w) = self.frame_shape;
        let mut acc = Array2::<f64>::zeros((h, w));
        let sum_row = |row: usize, mut line: ArrayViewMut1<f64>| {
            for frame in &self.frames {
                for (dst, &v) in line.iter_mut().zip(frame.row(row)) {
                    *dst += v as f64;
                }
            }
        };
        if h * w >= PARALLEL_PIXEL_THRESHOLD || self.frames.len() >= PARALLEL_FRAME_THRESHOLD {
            acc.axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(row, line)| sum_row(row, line));
        } else {
            for (row, line) in acc.axis_iter_mut(Axis(0)).enumerate() {
                sum_row(row, line);
            }
        }
        acc
    }

    /// Largest intensity over the whole stack.
    pub fn max(&self) -> f32 {
        self.map_frames(|_, frame| frame_max(frame))
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Divide every pixel of every frame by `divisor`.
    pub(crate) fn scale_in_place(&mut self, divisor: f32) {
        self.frames.par_iter_mut().for_each(|frame| {
            frame.mapv_inplace(|v| v / divisor);
        });
    }
}

pub(crate) fn frame_max(frame: &Array2<f32>) -> f32 {
    frame.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dims_are_row_major() {
        let nav = NavShape::Grid { rows: 2, cols: 3 };
        assert_eq!(nav.size(), 6);
        assert_eq!(nav.dims(), (2, 3));
        assert_eq!(NavShape::Linear(5).dims(), (1, 5));
    }

    #[test]
    fn rejects_mismatched_frames() {
        let frames = vec![Array2::zeros((4, 4)), Array2::zeros((4, 5))];
        assert!(matches!(
            FrameStack::new(frames),
            Err(SedError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn frame_lookup_by_navigation_index() {
        let frames: Vec<Array2<f32>> = (0..6).map(|i| Array2::from_elem((2, 3), i as f32)).collect();
        let stack =
            FrameStack::with_nav_shape(frames, NavShape::Grid { rows: 2, cols: 3 }).unwrap();
        assert_eq!(stack.frame(4).map(|f| f[[1, 2]]), Some(4.0));
        assert!(stack.frame(6).is_none());
    }

    #[test]
    fn sum_accumulates_in_f64() {
        let mut first = Array2::<f32>::zeros((2, 2));
        first[[0, 1]] = 16_777_216.0;
        let mut frames = vec![first];
        frames.extend((0..3).map(|_| Array2::from_elem((2, 2), 1.0f32)));
        let sum = FrameStack::new(frames).unwrap().sum();
        assert_eq!(sum[[0, 1]], 16_777_219.0);
        assert_eq!(sum[[1, 1]], 3.0);
    }

    #[test]
    fn map_preserves_order() {
        let frames: Vec<Array2<f32>> = (0..9).map(|i| Array2::from_elem((2, 2), i as f32)).collect();
        let stack = FrameStack::new(frames).unwrap();
        let firsts = stack.map_frames(|_, f| f[[0, 0]]);
        assert_eq!(firsts, (0..9).map(|i| i as f32).collect::<Vec<_>>());
    }
}
