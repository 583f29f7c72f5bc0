mod common;

use ndarray::Array2;

use sedkit_core::config::Interpolation;
use sedkit_core::error::SedError;
use sedkit_core::frame::Shift;
use sedkit_core::stack::{FrameStack, NavShape};
use sedkit_core::transform::{
    apply_affine, center_patterns, correct_geometric_distortion, rotate_patterns, sample,
    shift_frame, AffineMatrix,
};

use common::{argmax, gaussian_frame, noise_frame};

const ALL_ORDERS: [Interpolation; 3] = [
    Interpolation::Nearest,
    Interpolation::Bilinear,
    Interpolation::Bicubic,
];

#[test]
fn test_identity_reproduces_frame_exactly() {
    let frame = noise_frame(17, 23, 7);
    for interp in ALL_ORDERS {
        let out = apply_affine(&frame, &AffineMatrix::identity(), interp).unwrap();
        assert_eq!(out, frame, "interpolation {interp}");
    }
}

#[test]
fn test_interpolation_orders() {
    assert_eq!(Interpolation::from_order(0).unwrap(), Interpolation::Nearest);
    assert_eq!(Interpolation::from_order(1).unwrap(), Interpolation::Bilinear);
    assert_eq!(Interpolation::from_order(3).unwrap(), Interpolation::Bicubic);
    assert!(matches!(
        Interpolation::from_order(2),
        Err(SedError::UnsupportedInterpolation(2))
    ));
    assert_eq!(Interpolation::default().order(), 3);
}

#[test]
fn test_sample_between_pixels() {
    let mut data = Array2::<f32>::zeros((4, 4));
    data[[1, 1]] = 1.0;
    assert!((sample(&data, 1.0, 1.0, Interpolation::Bilinear) - 1.0).abs() < 1e-6);
    assert!((sample(&data, 1.0, 1.5, Interpolation::Bilinear) - 0.5).abs() < 1e-6);
    assert_eq!(sample(&data, 1.0, 1.4, Interpolation::Nearest), 1.0);
    assert_eq!(sample(&data, -0.5, 1.0, Interpolation::Bicubic), 0.0);
    assert_eq!(sample(&data, 1.0, 3.5, Interpolation::Bilinear), 0.0);
}

#[test]
fn test_cubic_sampling_is_an_interpolating_bspline() {
    // Values of the mirror-boundary cubic spline through a unit impulse.
    let mut line = Array2::<f32>::zeros((1, 7));
    line[[0, 3]] = 1.0;
    let at = |x: f64| sample(&line, 0.0, x, Interpolation::Bicubic);
    assert!((at(3.5) - 0.6).abs() < 1e-6, "got {}", at(3.5));
    assert!((at(2.25) - 0.26875).abs() < 1e-6, "got {}", at(2.25));
    assert!((at(0.5) - 0.025).abs() < 1e-6, "got {}", at(0.5));
    // Ringing below the frame minimum is clipped.
    assert_eq!(at(1.5), 0.0);

    let mut frame = Array2::<f32>::zeros((7, 7));
    frame[[3, 3]] = 1.0;
    let v = sample(&frame, 3.5, 3.5, Interpolation::Bicubic);
    assert!((v - 0.36).abs() < 1e-6, "got {v}");
}

#[test]
fn test_rotation_by_90_degrees_is_counter_clockwise() {
    // 6x6 frame rotates about (3, 3): source (x=1, y=1) lands on (x=1, y=5).
    let mut frame = Array2::<f32>::zeros((6, 6));
    frame[[1, 1]] = 1.0;
    let out = apply_affine(&frame, &AffineMatrix::rotation(90.0), Interpolation::Nearest).unwrap();
    assert_eq!(argmax(&out), (5, 1));
    assert_eq!(out[[5, 1]], 1.0);
}

#[test]
fn test_rotation_fills_outside_with_zero() {
    let frame = Array2::from_elem((10, 10), 1.0f32);
    let out = apply_affine(&frame, &AffineMatrix::rotation(45.0), Interpolation::Bilinear).unwrap();
    assert_eq!(out.dim(), (10, 10));
    assert_eq!(out[[0, 0]], 0.0);
    assert!((out[[5, 5]] - 1.0).abs() < 1e-6);
}

#[test]
fn test_integer_shift_round_trip_is_exact_in_interior() {
    let frame = gaussian_frame(40, 40, 20.0, 20.0, 4.0, 1.0, 0.05);
    let shift = Shift { dx: 3.0, dy: -2.0 };
    for interp in ALL_ORDERS {
        let moved = shift_frame(&frame, &shift, interp).unwrap();
        assert_eq!(argmax(&moved), (18, 23));
        let back = shift_frame(&moved, &shift.negated(), interp).unwrap();
        for r in 3..37 {
            for c in 4..36 {
                assert!((back[[r, c]] - frame[[r, c]]).abs() < 1e-6);
            }
        }
    }
}

#[test]
fn test_fractional_shift_round_trip_within_tolerance() {
    let frame = gaussian_frame(48, 48, 24.0, 24.0, 5.0, 1.0, 0.0);
    let shift = Shift { dx: 1.5, dy: 0.5 };
    for interp in [Interpolation::Bilinear, Interpolation::Bicubic] {
        let moved = shift_frame(&frame, &shift, interp).unwrap();
        let back = shift_frame(&moved, &shift.negated(), interp).unwrap();
        for r in 4..44 {
            for c in 4..44 {
                let err = (back[[r, c]] - frame[[r, c]]).abs();
                assert!(err < 0.05, "{interp}: err {err} at ({r}, {c})");
            }
        }
    }
}

#[test]
fn test_center_patterns_moves_beam_to_geometric_center() {
    let frames = vec![
        gaussian_frame(25, 25, 12.0, 14.0, 1.5, 1.0, 0.0),
        gaussian_frame(25, 25, 9.0, 12.0, 1.5, 1.0, 0.0),
    ];
    let stack = FrameStack::new(frames).unwrap();
    let shifts = [Shift { dx: 2.0, dy: 0.0 }, Shift { dx: 0.0, dy: -3.0 }];
    let centered = center_patterns(&stack, &shifts, Interpolation::Bilinear).unwrap();
    for frame in centered.frames() {
        assert_eq!(argmax(frame), (12, 12));
    }
}

#[test]
fn test_center_patterns_rejects_wrong_shift_count() {
    let stack = FrameStack::new(vec![Array2::zeros((8, 8)); 2]).unwrap();
    let result = center_patterns(&stack, &[Shift::default()], Interpolation::Nearest);
    assert!(matches!(
        result,
        Err(SedError::NavigationMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn test_rotate_patterns_keeps_stack_layout() {
    let frames: Vec<_> = (0..6).map(|i| noise_frame(12, 16, i)).collect();
    let nav = NavShape::Grid { rows: 2, cols: 3 };
    let stack = FrameStack::with_nav_shape(frames, nav).unwrap();
    let rotated = rotate_patterns(&stack, 0.0, Interpolation::Bicubic).unwrap();
    assert_eq!(rotated.nav_shape(), nav);
    assert_eq!(rotated.frame_shape(), (12, 16));
    for (a, b) in rotated.frames().iter().zip(stack.frames()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_distortion_correction_applies_matrix_to_every_frame() {
    let frames = vec![gaussian_frame(32, 32, 16.0, 16.0, 2.0, 1.0, 0.0); 4];
    let stack = FrameStack::new(frames).unwrap();
    // Pure translation by (+4 cols, +1 row) expressed as a distortion matrix.
    let matrix = AffineMatrix::from_rows([[1.0, 0.0, 4.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]]);
    let corrected = correct_geometric_distortion(&stack, &matrix, Interpolation::Bilinear).unwrap();
    for frame in corrected.frames() {
        assert_eq!(argmax(frame), (17, 20));
    }
}

#[test]
fn test_distortion_correction_rejects_singular_matrix() {
    let stack = FrameStack::new(vec![Array2::zeros((8, 8))]).unwrap();
    let matrix = AffineMatrix::from_rows([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    assert!(matches!(
        correct_geometric_distortion(&stack, &matrix, Interpolation::Bicubic),
        Err(SedError::SingularMatrix)
    ));
}
