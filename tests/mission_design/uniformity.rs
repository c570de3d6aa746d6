extern crate nyx_launch as nyx;

use approx::assert_abs_diff_eq;
use nyx::md::{excess_kurtosis, uniformity, UniformityError, UNIFORM_EXCESS_KURTOSIS};
use nyx::ErrorKind;
use rstest::*;

#[fixture]
fn linear() -> Vec<f64> {
    (0..1000).map(|i| -90.0 + 180.0 * i as f64 / 999.0).collect()
}

#[rstest]
fn linear_sample_is_uniform(linear: Vec<f64>) {
    let k = excess_kurtosis(&linear).unwrap();
    assert_abs_diff_eq!(k, UNIFORM_EXCESS_KURTOSIS, epsilon = 1e-5);
    assert_abs_diff_eq!(uniformity(&linear).unwrap(), 0.0, epsilon = 1e-9);
}

#[rstest]
fn permutation_invariance(linear: Vec<f64>) {
    let reference = uniformity(&linear).unwrap();
    let mut reversed = linear.clone();
    reversed.reverse();
    assert_abs_diff_eq!(uniformity(&reversed).unwrap(), reference, epsilon = 1e-12);

    // Deterministic shuffle: 7 is coprime with 1000
    let shuffled: Vec<f64> = (0..linear.len()).map(|i| linear[(7 * i) % 1000]).collect();
    assert_abs_diff_eq!(uniformity(&shuffled).unwrap(), reference, epsilon = 1e-12);
}

#[test]
fn clustered_sample_is_penalized() {
    // Mostly at the origin with a few outliers: heavy tails
    let mut sample = vec![0.0; 97];
    sample.extend([-45.0, 30.0, 60.0]);
    let score = uniformity(&sample).unwrap();
    assert!(score > 100.0, "score = {score}");
}

#[rstest]
#[case(vec![0.0; 50])]
#[case(vec![12.5; 3])]
#[case(vec![42.0])]
fn zero_variance(#[case] sample: Vec<f64>) {
    let err = uniformity(&sample).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DegenerateSample);
    assert!(matches!(err, UniformityError::DegenerateSample { .. }));
}

#[test]
fn invalid_samples() {
    assert_eq!(uniformity(&[]).unwrap_err(), UniformityError::EmptySample);
    let err = uniformity(&[1.0, f64::NAN, 3.0]).unwrap_err();
    assert_eq!(err, UniformityError::NonFiniteSample { index: 1 });
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
