extern crate nyx_launch as nyx;

use nyx::cosmic::{dcm_from_quaternion, earth_orientation, SpinModel, TimeGrid, UniformSpin};
use nyx::linalg::{Quaternion, Vector3};
use nyx::utils::orthonormality_error;
use nyx::ErrorKind;
use rstest::*;

#[fixture]
fn grid() -> TimeGrid {
    TimeGrid::default()
}

#[rstest]
fn stack_is_orthonormal(grid: TimeGrid) {
    let stack = earth_orientation(grid.samples(), &UniformSpin::default()).unwrap();
    assert_eq!(stack.len(), grid.len());
    for dcm in stack.iter() {
        assert!(orthonormality_error(dcm) < 1e-9);
        assert!((dcm.determinant() - 1.0).abs() < 1e-9);
    }
    assert!(stack.max_orthonormality_error() < 1e-9);
}

#[rstest]
fn spin_about_z(grid: TimeGrid) {
    let stack = earth_orientation(grid.samples(), &UniformSpin::default()).unwrap();
    // The pole does not move, and a full turn takes a day
    for dcm in stack.iter() {
        let pole = dcm * Vector3::z();
        assert!((pole - Vector3::z()).norm() < 1e-12);
    }
    let half_day = stack[grid.len() - 1] * Vector3::x();
    assert!((half_day + Vector3::x()).norm() < 1e-9);
}

struct BrokenSpin;

impl SpinModel for BrokenSpin {
    fn quaternions(&self, epochs_s: &[f64]) -> Vec<Quaternion<f64>> {
        epochs_s
            .iter()
            .map(|t| {
                if *t > 0.0 {
                    Quaternion::new(0.0, 0.0, 0.0, 0.0)
                } else {
                    Quaternion::identity()
                }
            })
            .collect()
    }
}

#[test]
fn unusable_quaternions() {
    let err = earth_orientation(&[0.0, 1.0], &BrokenSpin).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(dcm_from_quaternion(&Quaternion::new(f64::NAN, 0.0, 0.0, 1.0)).is_none());
}
