mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use sedkit_core::background::{
    mean_filter_3x3, reconstruct_by_dilation, regional_filter, remove_background,
};
use sedkit_core::config::{BackgroundConfig, ReconstructionMethod};
use sedkit_core::error::SedError;
use sedkit_core::stack::FrameStack;

use common::{gaussian_frame, noise_frame};

const METHODS: [ReconstructionMethod; 2] =
    [ReconstructionMethod::Iterative, ReconstructionMethod::Hybrid];

#[test]
fn test_hybrid_matches_iterative_fixed_point() {
    for seed in 0..4 {
        let mask = noise_frame(37, 29, seed);
        let marker = mask.mapv(|v| v - 0.35);
        let iterative =
            reconstruct_by_dilation(&marker, &mask, ReconstructionMethod::Iterative).unwrap();
        let hybrid = reconstruct_by_dilation(&marker, &mask, ReconstructionMethod::Hybrid).unwrap();
        assert_eq!(iterative, hybrid, "seed {seed}");
    }
}

#[test]
fn test_reconstruction_never_exceeds_mask() {
    let mask = noise_frame(20, 20, 11);
    let marker = mask.mapv(|v| v - 0.2);
    for method in METHODS {
        let rec = reconstruct_by_dilation(&marker, &mask, method).unwrap();
        for (r, m) in rec.iter().zip(mask.iter()) {
            assert!(r <= m);
        }
        for (r, s) in rec.iter().zip(marker.iter()) {
            assert!(r >= s);
        }
    }
}

#[test]
fn test_reconstruction_rejects_shape_mismatch() {
    let result = reconstruct_by_dilation(
        &Array2::zeros((4, 4)),
        &Array2::zeros((4, 5)),
        ReconstructionMethod::Hybrid,
    );
    assert!(matches!(result, Err(SedError::ShapeMismatch { .. })));
}

#[test]
fn test_regional_filter_keeps_top_h_of_sharp_peak() {
    let mut frame = Array2::from_elem((9, 9), 0.2f32);
    frame[[4, 4]] = 1.0;
    for method in METHODS {
        let out = regional_filter(&frame, 0.3, method).unwrap();
        assert_abs_diff_eq!(out[[4, 4]], 0.3, epsilon = 1e-6);
        for ((r, c), &v) in out.indexed_iter() {
            if (r, c) != (4, 4) {
                assert_abs_diff_eq!(v, 0.0, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn test_regional_filter_of_flat_frame_is_h() {
    let frame = Array2::from_elem((6, 6), 0.5f32);
    let out = regional_filter(&frame, 0.1, ReconstructionMethod::Hybrid).unwrap();
    for v in out.iter() {
        assert_abs_diff_eq!(*v, 0.1, epsilon = 1e-6);
    }
}

#[test]
fn test_regional_filter_with_zero_h_is_zero() {
    let frame = noise_frame(12, 12, 3);
    let out = regional_filter(&frame, 0.0, ReconstructionMethod::Hybrid).unwrap();
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn test_mean_filter_averages_interior_neighborhood() {
    let mut data = Array2::<f32>::zeros((5, 5));
    data[[2, 2]] = 9.0;
    let out = mean_filter_3x3(&data);
    assert_abs_diff_eq!(out[[2, 2]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out[[1, 1]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(out[[0, 0]], 0.0, epsilon = 1e-6);
}

#[test]
fn test_remove_background_normalizes_output() {
    let frames = vec![
        gaussian_frame(32, 32, 12.0, 12.0, 1.5, 40.0, 5.0),
        gaussian_frame(32, 32, 20.0, 18.0, 1.5, 80.0, 5.0),
        gaussian_frame(32, 32, 16.0, 16.0, 1.5, 60.0, 5.0),
    ];
    let stack = FrameStack::new(frames).unwrap();
    let config = BackgroundConfig {
        h: 0.2,
        ..Default::default()
    };
    let out = remove_background(&stack, &config).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out.frame_shape(), (32, 32));

    let max = out.max();
    assert_abs_diff_eq!(max, 1.0, epsilon = 1e-6);
    // The flat background is gone; only the peak neighborhoods carry signal.
    for frame in out.frames() {
        assert_abs_diff_eq!(frame[[0, 31]], 0.0, epsilon = 1e-6);
    }
}

#[test]
fn test_remove_background_rejects_negative_h() {
    let stack = FrameStack::new(vec![Array2::ones((4, 4))]).unwrap();
    let config = BackgroundConfig {
        h: -0.1,
        ..Default::default()
    };
    assert!(matches!(
        remove_background(&stack, &config),
        Err(SedError::InvalidParameter(_))
    ));
}

#[test]
fn test_remove_background_on_empty_signal_stays_finite() {
    let stack = FrameStack::new(vec![Array2::zeros((6, 6)); 2]).unwrap();
    let out = remove_background(&stack, &BackgroundConfig::default()).unwrap();
    assert!(out.frames().iter().all(|f| f.iter().all(|v| v.is_finite())));
}
