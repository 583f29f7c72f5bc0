use serde::{Deserialize, Serialize};

/// A beam position in a frame's own pixel coordinates.
///
/// `row` runs along the frame height, `col` along the width. Values may be
/// fractional after sub-pixel refinement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub row: f64,
    pub col: f64,
}

impl Center {
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Geometric center of a frame of the given `(height, width)`:
    /// `((H-1)/2, (W-1)/2)`, the midpoint between the outermost pixel centers.
    pub fn geometric(shape: (usize, usize)) -> Self {
        let (h, w) = shape;
        Self {
            row: (h as f64 - 1.0) / 2.0,
            col: (w as f64 - 1.0) / 2.0,
        }
    }

    /// Integer pixel nearest to this position, rounding halves to even.
    pub fn to_pixel(&self) -> (usize, usize) {
        (
            self.row.round_ties_even().max(0.0) as usize,
            self.col.round_ties_even().max(0.0) as usize,
        )
    }

    /// True when the position lies within `[0, height) x [0, width)`.
    pub fn is_inside(&self, shape: (usize, usize)) -> bool {
        let (h, w) = shape;
        self.row.is_finite()
            && self.col.is_finite()
            && self.row >= 0.0
            && self.col >= 0.0
            && self.row < h as f64
            && self.col < w as f64
    }
}

impl From<(usize, usize)> for Center {
    fn from((row, col): (usize, usize)) -> Self {
        Self {
            row: row as f64,
            col: col as f64,
        }
    }
}

/// Displacement of a beam from the geometric frame center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub dx: f64,
    pub dy: f64,
}

impl Shift {
    /// `center - reference`, with `dy` along rows and `dx` along columns.
    pub fn between(center: &Center, reference: &Center) -> Self {
        Self {
            dx: center.col - reference.col,
            dy: center.row - reference.row,
        }
    }

    pub fn negated(&self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}
