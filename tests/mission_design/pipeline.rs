extern crate nyx_launch as nyx;

use crate::circular_period_s;
use approx::assert_abs_diff_eq;
use nyx::cosmic::{DcmStack, Injection, OrbitalParameters, TimeGrid, UniformSpin};
use nyx::dynamics::OrbitalDynamics;
use nyx::md::{uniformity, Pipeline};
use nyx::propagators::{FixedStepPropagator, RK2Fixed, RK4Fixed};
use nyx::ErrorKind;
use rstest::*;

/// One orbital period of a circular orbit at 500 km
#[fixture]
fn one_period() -> Pipeline {
    let _ = pretty_env_logger::try_init();
    let grid = TimeGrid::new(400, 0.0, circular_period_s(500.0)).unwrap();
    Pipeline::new(grid).unwrap()
}

#[rstest]
fn polar_orbit_covers_all_latitudes(one_period: Pipeline) {
    let eval = one_period
        .evaluate(&OrbitalParameters::circular(500.0, 0.0, 90.0))
        .unwrap();
    let (lat_min, lat_max) = eval.ground_track.latitude_range().unwrap();
    assert!(lat_min < -89.0, "min latitude {lat_min}");
    assert!(lat_max > 89.0, "max latitude {lat_max}");

    let (lon_min, lon_max) = eval.ground_track.longitude_range().unwrap();
    assert!(lon_min > -180.0 && lon_max <= 180.0);
}

#[rstest]
fn equatorial_orbit_stays_on_equator(one_period: Pipeline) {
    let eval = one_period
        .evaluate(&OrbitalParameters::circular(500.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(eval.ground_track.len(), 400);
    for lat in &eval.ground_track.latitudes_deg {
        assert!(lat.abs() < 0.1, "latitude {lat} off the equator");
    }
}

#[rstest]
fn scores_add_up(one_period: Pipeline) {
    let eval = one_period.evaluate(&OrbitalParameters::default()).unwrap();
    assert_abs_diff_eq!(
        eval.latitude_score,
        uniformity(&eval.ground_track.latitudes_deg).unwrap()
    );
    assert_abs_diff_eq!(
        eval.longitude_score,
        uniformity(&eval.ground_track.longitudes_deg).unwrap()
    );
    assert_abs_diff_eq!(eval.objective, eval.latitude_score + eval.longitude_score);
    assert!(eval.objective >= 0.0);

    // Evaluating twice yields the same result
    let again = one_period.evaluate(&OrbitalParameters::default()).unwrap();
    assert_eq!(eval, again);
    assert_eq!(
        one_period.objective(&OrbitalParameters::default()).unwrap(),
        eval.objective
    );
}

#[test]
fn custom_stages() {
    let grid = TimeGrid::new(300, 0.0, 6000.0).unwrap();
    let params = OrbitalParameters::new(550.0, 800.0, 10.0, 63.4, 270.0);

    let rk4 = Pipeline::with(
        grid.clone(),
        &UniformSpin::default(),
        Injection::default(),
        FixedStepPropagator::<RK4Fixed, _>::new(OrbitalDynamics::two_body()),
    )
    .unwrap();
    let rk2 = Pipeline::with(
        grid.clone(),
        &UniformSpin::default(),
        Injection::default(),
        FixedStepPropagator::<RK2Fixed, _>::new(OrbitalDynamics::two_body()),
    )
    .unwrap();
    let eval4 = rk4.evaluate(&params).unwrap();
    let eval2 = rk2.evaluate(&params).unwrap();
    // 20 second steps: both integrators agree closely
    assert_abs_diff_eq!(eval4.objective, eval2.objective, epsilon = 1e-2 * eval4.objective.max(1.0));

    // An Earth which does not rotate
    let inertial = Pipeline::from_parts(
        grid.clone(),
        DcmStack::identity(grid.len()),
        Injection::default(),
        FixedStepPropagator::<RK4Fixed, _>::new(OrbitalDynamics::two_body()),
    )
    .unwrap();
    let still = inertial.evaluate(&params).unwrap();
    // Spinning about the pole does not change the latitudes
    for (lat, lat_rot) in still
        .ground_track
        .latitudes_deg
        .iter()
        .zip(&eval4.ground_track.latitudes_deg)
    {
        assert_abs_diff_eq!(*lat, *lat_rot, epsilon = 1e-9);
    }
    assert_ne!(still.ground_track.longitudes_deg, eval4.ground_track.longitudes_deg);
}

#[rstest]
fn failures_carry_parameters(one_period: Pipeline) {
    let bad = OrbitalParameters::new(f64::NAN, 500.0, 0.0, 45.0, 0.0);
    let err = one_period.evaluate(&bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.params().alt_apogee_km, 500.0);

    let mismatched = Pipeline::from_parts(
        TimeGrid::new(10, 0.0, 100.0).unwrap(),
        DcmStack::identity(11),
        Injection::default(),
        FixedStepPropagator::<RK4Fixed, _>::new(OrbitalDynamics::two_body()),
    );
    assert!(mismatched.is_err());
}
