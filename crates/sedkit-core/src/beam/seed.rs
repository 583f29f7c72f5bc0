use tracing::debug;

use crate::error::{Result, SedError};
use crate::frame::Center;
use crate::geometry::{argmax_all, mean_pixel};
use crate::stack::FrameStack;

/// Coarse beam position shared by the whole stack.
///
/// Sums every frame so the direct beam reinforces itself, then returns the
/// average of all locations attaining the summed maximum, rounded to a pixel.
/// The sum is exact-order f64, so the seed does not depend on thread count.
pub fn estimate_global_center(stack: &FrameStack) -> Result<Center> {
    let aggregate = stack.sum();
    let (max_val, locations) = argmax_all(&aggregate).ok_or(SedError::EmptyStack)?;
    let (row, col) = mean_pixel(&locations);
    debug!(
        row,
        col,
        max = max_val,
        ties = locations.len(),
        "Estimated global beam seed"
    );
    Ok(Center::from((row, col)))
}
