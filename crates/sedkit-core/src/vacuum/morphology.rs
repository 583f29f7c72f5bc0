use ndarray::Array2;

/// Offsets of the 4-connected cross structuring element (center included).
const CROSS: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// Morphological closing (dilation followed by erosion) with a cross element.
///
/// Fills small gaps of `false` inside `true` regions.
pub fn binary_closing(mask: &Array2<bool>) -> Array2<bool> {
    binary_erosion(&binary_dilation(mask, false), true)
}

/// Morphological opening (erosion followed by dilation) with a cross element.
///
/// Removes small isolated `true` islands.
pub fn binary_opening(mask: &Array2<bool>) -> Array2<bool> {
    binary_dilation(&binary_erosion(mask, true), false)
}

/// Binary erosion: a pixel stays true only if every cross neighbor is true.
/// Out-of-bounds neighbors take the value `border`.
pub fn binary_erosion(mask: &Array2<bool>, border: bool) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        CROSS.iter().all(|&(dr, dc)| {
            let nr = row as i32 + dr;
            let nc = col as i32 + dc;
            if nr < 0 || nr >= h as i32 || nc < 0 || nc >= w as i32 {
                border
            } else {
                mask[[nr as usize, nc as usize]]
            }
        })
    })
}

/// Binary dilation: a pixel becomes true if any cross neighbor is true.
/// Out-of-bounds neighbors take the value `border`.
pub fn binary_dilation(mask: &Array2<bool>, border: bool) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        CROSS.iter().any(|&(dr, dc)| {
            let nr = row as i32 + dr;
            let nc = col as i32 + dc;
            if nr < 0 || nr >= h as i32 || nc < 0 || nc >= w as i32 {
                border
            } else {
                mask[[nr as usize, nc as usize]]
            }
        })
    })
}
