/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Default radius (pixels) of the circular search window used to refine the
/// direct beam position.
pub const DEFAULT_BEAM_RADIUS: f64 = 10.0;

/// Maximum number of hill-climbing steps during beam refinement before the
/// search is reported as not converged.
pub const MAX_REFINE_ITERATIONS: usize = 100;

/// Default height threshold for background removal by reconstruction
/// (intensities are normalized to [0, 1] before it is applied).
pub const DEFAULT_BACKGROUND_H: f32 = 0.1;

/// Default radius (pixels) of the direct-beam disk excluded when classifying
/// vacuum frames.
pub const DEFAULT_VACUUM_RADIUS: f64 = 10.0;

/// Source coordinates within this distance of an integer are sampled
/// exactly, so identity warps reproduce their input.
pub const SAMPLE_SNAP_EPSILON: f64 = 1e-9;

/// Determinant magnitude below which an affine matrix is treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-12;
