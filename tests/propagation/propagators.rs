extern crate nyx_launch as nyx;

use crate::circular_period_s;
use approx::assert_abs_diff_eq;
use nyx::cosmic::{InitialStateProvider, Injection, OrbitalParameters, EARTH_RADIUS_KM};
use nyx::dynamics::{OrbitalDynamics, ZonalHarmonics};
use nyx::propagators::{DefaultPropagator, FixedStepPropagator, OrbitPropagator, RK4Fixed};
use nyx::linalg::{Vector3, Vector6};
use nyx::ErrorKind;
use rstest::*;
use std::sync::Arc;

fn final_position<P: OrbitPropagator>(prop: &P, state: &Vector6<f64>, period: f64) -> Vector3<f64> {
    prop.propagate(state, period / 200.0, 201)
        .unwrap()
        .position(200)
        .unwrap()
}

#[fixture]
fn injection() -> Injection {
    Injection::with_true_anomaly(0.0)
}

#[rstest]
fn circular_orbit_closes(injection: Injection) {
    let _ = pretty_env_logger::try_init();
    let params = OrbitalParameters::circular(500.0, 30.0, 51.6);
    let state = injection.initial_state(&params).unwrap();
    let period = circular_period_s(500.0);

    let prop = FixedStepPropagator::<RK4Fixed, _>::new(OrbitalDynamics::two_body());
    let hist = prop.propagate(&state, period / 500.0, 501).unwrap();
    assert_eq!(hist.len(), 501);
    let closure = (hist.position(500).unwrap() - hist.position(0).unwrap()).norm();
    assert!(closure < 1e-2, "orbit did not close: {closure} km");
    for state in hist.iter() {
        let alt = state.fixed_rows::<3>(0).norm() - EARTH_RADIUS_KM;
        assert_abs_diff_eq!(alt, 500.0, epsilon = 1e-3);
    }
}

#[rstest]
fn zonal_harmonics_perturb(injection: Injection) {
    let params = OrbitalParameters::circular(500.0, 0.0, 45.0);
    let state = injection.initial_state(&params).unwrap();
    let period = circular_period_s(500.0);

    let two_body = FixedStepPropagator::<RK4Fixed, _>::new(OrbitalDynamics::two_body());
    let mut j2_dyn = OrbitalDynamics::two_body();
    j2_dyn.add_model(Arc::new(ZonalHarmonics::j2_only()));
    let j2 = FixedStepPropagator::<RK4Fixed, _>::new(j2_dyn);
    let full = DefaultPropagator::default();

    let r_2b = final_position(&two_body, &state, period);
    let r_j2 = final_position(&j2, &state, period);
    let r_j4 = final_position(&full, &state, period);
    // J2 moves the spacecraft by kilometers over one orbit, J3 and J4 by much less
    let d_j2 = (r_j2 - r_2b).norm();
    let d_j34 = (r_j4 - r_j2).norm();
    assert!(d_j2 > 1.0, "J2 effect is {d_j2} km");
    assert!(d_j34 < 0.1 * d_j2, "J3 and J4 effect is {d_j34} km");
}

#[rstest]
fn decaying_orbit_fails(injection: Injection) {
    // Apogee at 500 km and perigee inside the Earth
    let params = OrbitalParameters::new(-1000.0, 500.0, 0.0, 45.0, 0.0);
    let state = Injection::with_true_anomaly(180.0)
        .initial_state(&params)
        .unwrap();
    let err = DefaultPropagator::default()
        .propagate(&state, 60.0, 200)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PropagationFailure);

    let err = DefaultPropagator::default()
        .propagate(&injection.initial_state(&OrbitalParameters::default()).unwrap(), f64::NAN, 10)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
