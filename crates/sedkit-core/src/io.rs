use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};
use ndarray::Array2;
use rayon::prelude::*;
use tracing::info;

use crate::error::{Result, SedError};
use crate::stack::{frame_max, FrameStack, NavShape};

/// Load a grayscale image file as a frame with intensities in [0, 1].
pub fn load_frame(path: &Path) -> Result<Array2<f32>> {
    let img = image::open(path)?;
    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));

    for (col, row, pixel) in gray.enumerate_pixels() {
        data[[row as usize, col as usize]] = pixel.0[0] as f32 / 65535.0;
    }

    Ok(data)
}

/// Load one frame per file, in the order given.
///
/// `nav` defaults to a linear scan over all files.
pub fn load_frame_stack(paths: &[PathBuf], nav: Option<NavShape>) -> Result<FrameStack> {
    if paths.is_empty() {
        return Err(SedError::EmptyStack);
    }
    info!(files = paths.len(), "Loading frame stack");
    let frames = paths
        .par_iter()
        .map(|p| load_frame(p))
        .collect::<Result<Vec<_>>>()?;
    let nav = nav.unwrap_or(NavShape::Linear(frames.len()));
    FrameStack::with_nav_shape(frames, nav)
}

/// Save a frame as 16-bit TIFF or 8-bit PNG, chosen by extension (TIFF by default).
///
/// Intensities are scaled so the frame maximum maps to full range; frames
/// already within [0, 1] are written unscaled.
pub fn save_frame(frame: &Array2<f32>, path: &Path) -> Result<()> {
    let max = frame_max(frame);
    let scale = if max > 1.0 { 1.0 / max } else { 1.0 };
    let (h, w) = frame.dim();

    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => {
            let mut img = GrayImage::new(w as u32, h as u32);
            for ((row, col), &v) in frame.indexed_iter() {
                let val = ((v * scale).clamp(0.0, 1.0) * 255.0).round() as u8;
                img.put_pixel(col as u32, row as u32, Luma([val]));
            }
            img.save_with_format(path, ImageFormat::Png)?;
        }
        _ => {
            let pixels: Vec<u16> = frame
                .iter()
                .map(|&v| ((v * scale).clamp(0.0, 1.0) * 65535.0).round() as u16)
                .collect();
            let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(
                w as u32,
                h as u32,
                pixels,
            )
            .ok_or_else(|| {
                SedError::InvalidParameter(format!("cannot build {w}x{h} image buffer"))
            })?;
            img.save_with_format(path, ImageFormat::Tiff)?;
        }
    }
    Ok(())
}

/// Write every frame of `stack` into `dir` as `frame_00000.tiff`, ...
pub fn save_frame_stack(stack: &FrameStack, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let paths: Vec<PathBuf> = (0..stack.len())
        .map(|i| dir.join(format!("frame_{i:05}.tiff")))
        .collect();
    stack
        .frames()
        .par_iter()
        .zip(paths.par_iter())
        .try_for_each(|(frame, path)| save_frame(frame, path))?;
    info!(frames = stack.len(), dir = %dir.display(), "Saved frame stack");
    Ok(paths)
}
