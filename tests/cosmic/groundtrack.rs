extern crate nyx_launch as nyx;

use approx::assert_abs_diff_eq;
use nyx::cosmic::groundtrack::project;
use nyx::cosmic::{DcmStack, TimeGrid};
use nyx::linalg::Vector6;
use nyx::propagators::StateHistory;
use rstest::*;

/// Circular orbit of 7000 km radius, inclined by 30 degrees, whose argument of latitude grows at 0.01 rad/s
fn synthetic_history(grid: &TimeGrid) -> StateHistory {
    let (rmag, rate, inc) = (7000.0_f64, 0.01_f64, 30.0_f64.to_radians());
    StateHistory::new(
        grid.samples()
            .iter()
            .map(|t| {
                let (s, c) = (rate * t).sin_cos();
                Vector6::new(
                    rmag * c,
                    rmag * s * inc.cos(),
                    rmag * s * inc.sin(),
                    -rmag * rate * s,
                    rmag * rate * c * inc.cos(),
                    rmag * rate * c * inc.sin(),
                )
            })
            .collect(),
    )
}

#[fixture]
fn grid() -> TimeGrid {
    TimeGrid::new(4, 0.0, 30.0).unwrap()
}

#[rstest]
fn synthetic_circular_orbit(grid: TimeGrid) {
    assert_eq!(grid.samples(), &[0.0, 10.0, 20.0, 30.0]);
    let track = project(&synthetic_history(&grid), &DcmStack::identity(4)).unwrap();
    assert_eq!(track.len(), 4);

    // sin(lat) = sin(u) sin(i), tan(lon) = tan(u) cos(i)
    let expected_lat = [0.0, 2.861_205_754_495_7, 5.700_858_851_185_6, 8.497_143_505_622_8];
    let expected_lon = [0.0, 4.966_092_947_444_9, 9.956_932_337_199_7, 14.996_998_738_500_5];
    for i in 0..4 {
        let u = 0.01 * grid.samples()[i];
        let lat = (u.sin() * 30.0_f64.to_radians().sin()).asin().to_degrees();
        let lon = (u.sin() * 30.0_f64.to_radians().cos())
            .atan2(u.cos())
            .to_degrees();
        assert_abs_diff_eq!(track.latitudes_deg[i], lat, epsilon = 1e-6);
        assert_abs_diff_eq!(track.longitudes_deg[i], lon, epsilon = 1e-6);
        assert_abs_diff_eq!(track.latitudes_deg[i], expected_lat[i], epsilon = 1e-6);
        assert_abs_diff_eq!(track.longitudes_deg[i], expected_lon[i], epsilon = 1e-6);
    }
}

#[rstest]
fn ranges(grid: TimeGrid) {
    let track = project(&synthetic_history(&grid), &DcmStack::identity(4)).unwrap();
    let (lat_min, lat_max) = track.latitude_range().unwrap();
    assert!(lat_min >= -90.0 && lat_max <= 90.0);
    let (lon_min, lon_max) = track.longitude_range().unwrap();
    assert!(lon_min > -180.0 && lon_max <= 180.0);
}
