use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_H, DEFAULT_BEAM_RADIUS, DEFAULT_VACUUM_RADIUS, MAX_REFINE_ITERATIONS,
};
use crate::error::{Result, SedError};
use crate::frame::Center;
use crate::stack::NavShape;

/// What to do when beam refinement in a frame hits the iteration cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceFallback {
    /// Propagate `SedError::NotConverged`.
    #[default]
    Fail,
    /// Use the global seed position for that frame and log a warning.
    UseSeed,
}

impl std::fmt::Display for ConvergenceFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "Fail"),
            Self::UseSeed => write!(f, "Use Seed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Radius (pixels) of the circular search window.
    #[serde(default = "default_beam_radius")]
    pub radius: f64,
    /// Hill-climbing step cap per frame.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub fallback: ConvergenceFallback,
}

fn default_beam_radius() -> f64 {
    DEFAULT_BEAM_RADIUS
}
fn default_max_iterations() -> usize {
    MAX_REFINE_ITERATIONS
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BEAM_RADIUS,
            max_iterations: MAX_REFINE_ITERATIONS,
            fallback: ConvergenceFallback::default(),
        }
    }
}

/// Resampling kernel used by affine warps, named after its spline order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Order 0.
    Nearest,
    /// Order 1.
    Bilinear,
    /// Order 3 (interpolating cubic B-spline).
    #[default]
    Bicubic,
}

impl Interpolation {
    pub fn from_order(order: u8) -> Result<Self> {
        match order {
            0 => Ok(Self::Nearest),
            1 => Ok(Self::Bilinear),
            3 => Ok(Self::Bicubic),
            other => Err(SedError::UnsupportedInterpolation(other)),
        }
    }

    pub fn order(&self) -> u8 {
        match self {
            Self::Nearest => 0,
            Self::Bilinear => 1,
            Self::Bicubic => 3,
        }
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Bilinear => write!(f, "Bilinear"),
            Self::Bicubic => write!(f, "Bicubic"),
        }
    }
}

/// Algorithm used for grayscale reconstruction by dilation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconstructionMethod {
    /// Repeated full-image 3x3 dilation clipped to the mask until nothing changes.
    Iterative,
    /// Forward/backward raster scans followed by FIFO propagation.
    #[default]
    Hybrid,
}

impl std::fmt::Display for ReconstructionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iterative => write!(f, "Iterative"),
            Self::Hybrid => write!(f, "Hybrid"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Depth below each local maximum that is kept as signal.
    #[serde(default = "default_background_h")]
    pub h: f32,
    #[serde(default)]
    pub reconstruction: ReconstructionMethod,
}

fn default_background_h() -> f32 {
    DEFAULT_BACKGROUND_H
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            h: DEFAULT_BACKGROUND_H,
            reconstruction: ReconstructionMethod::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VacuumConfig {
    /// Radius of the direct-beam disk excluded before thresholding.
    #[serde(default = "default_vacuum_radius")]
    pub radius: f64,
    /// Beam center; `None` means the geometric frame center.
    #[serde(default)]
    pub center: Option<Center>,
    /// A frame is vacuum when no pixel outside the beam exceeds this value.
    #[serde(default)]
    pub threshold: f32,
    #[serde(default = "default_true")]
    pub closing: bool,
    #[serde(default)]
    pub opening: bool,
}

fn default_vacuum_radius() -> f64 {
    DEFAULT_VACUUM_RADIUS
}
fn default_true() -> bool {
    true
}

impl Default for VacuumConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_VACUUM_RADIUS,
            center: None,
            threshold: 0.0,
            closing: true,
            opening: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Rotation applied to every frame, degrees counter-clockwise.
    #[serde(default)]
    pub rotation_degrees: Option<f64>,
    /// Distortion-correction matrix applied to every frame.
    #[serde(default)]
    pub distortion: Option<[[f64; 3]; 3]>,
    /// Re-register frames so the direct beam sits at the geometric center.
    #[serde(default)]
    pub center_beam: bool,
}

/// Full processing description, as read from a TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// One image file per frame, in navigation order.
    #[serde(default)]
    pub input: Vec<PathBuf>,
    /// Navigation layout; defaults to a line of `input.len()` frames.
    #[serde(default)]
    pub nav_shape: Option<NavShape>,
    /// Directory for transformed frames, if any are produced.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub beam: BeamConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    /// Background removal is skipped when absent.
    #[serde(default)]
    pub background: Option<BackgroundConfig>,
    /// Vacuum classification is skipped when absent.
    #[serde(default)]
    pub vacuum: Option<VacuumConfig>,
    #[serde(default = "default_true")]
    pub radial_profile: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            input: Vec::new(),
            nav_shape: None,
            output_dir: None,
            beam: BeamConfig::default(),
            transform: TransformConfig::default(),
            background: None,
            vacuum: None,
            radial_profile: true,
        }
    }
}

impl ProcessingConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SedError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SedError::Config(e.to_string()))
    }
}

/// Read a [`ProcessingConfig`] from a TOML file.
pub fn load_config(path: &Path) -> Result<ProcessingConfig> {
    let text = std::fs::read_to_string(path)?;
    ProcessingConfig::from_toml_str(&text)
}
