/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2024 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{AstroError, DcmStack, DegenerateVectorSnafu, ShapeMismatchSnafu, EARTH_RADIUS_KM};
use crate::linalg::{Matrix3, Vector3};
use crate::propagators::StateHistory;
use crate::utils::is_finite_vec;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;

/// Latitudes and longitudes (degrees) of the point of the spherical Earth directly beneath the spacecraft, one per sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTrack {
    pub latitudes_deg: Vec<f64>,
    pub longitudes_deg: Vec<f64>,
}

impl GroundTrack {
    pub fn len(&self) -> usize {
        self.latitudes_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitudes_deg.is_empty()
    }

    /// Minimum and maximum latitude, if any
    pub fn latitude_range(&self) -> Option<(f64, f64)> {
        min_max(&self.latitudes_deg)
    }

    /// Minimum and maximum longitude, if any
    pub fn longitude_range(&self) -> Option<(f64, f64)> {
        min_max(&self.longitudes_deg)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        }))
    }
}

impl fmt::Display for GroundTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.latitude_range(), self.longitude_range()) {
            (Some((lat_min, lat_max)), Some((lon_min, lon_max))) => write!(
                f,
                "ground track of {} samples: lat in [{:.3}, {:.3}] deg, lon in [{:.3}, {:.3}] deg",
                self.len(),
                lat_min,
                lat_max,
                lon_min,
                lon_max
            ),
            _ => write!(f, "empty ground track"),
        }
    }
}

/// Projects one inertial position onto the spherical Earth, returning the (latitude, longitude) in degrees.
///
/// The position is scaled onto the sphere, rotated into the Earth fixed frame by the transpose of `dcm`,
/// and converted to spherical coordinates. The sine of the latitude is clamped to [-1, 1] and a longitude
/// of exactly -180 degrees is reported as +180. Returns None if the position has a zero or non finite norm.
pub fn project_position(position_km: &Vector3<f64>, dcm: &Matrix3<f64>) -> Option<(f64, f64)> {
    let rmag = position_km.norm();
    if !is_finite_vec(position_km) || !rmag.is_finite() || rmag == 0.0 {
        return None;
    }

    let on_surface = position_km / rmag * EARTH_RADIUS_KM;
    let fixed = dcm.transpose() * on_surface;

    let lat_deg = (fixed[2] / EARTH_RADIUS_KM).clamp(-1.0, 1.0).asin().to_degrees();
    let mut lon_deg = fixed[1].atan2(fixed[0]).to_degrees();
    if lon_deg <= -180.0 {
        lon_deg = 180.0;
    }

    Some((lat_deg, lon_deg))
}

/// Computes the ground track of the state history given the Earth orientation at each sample.
pub fn project(states: &StateHistory, dcms: &DcmStack) -> Result<GroundTrack, AstroError> {
    ensure!(
        states.len() == dcms.len(),
        ShapeMismatchSnafu {
            what: "Earth rotation stack",
            expected: states.len(),
            got: dcms.len()
        }
    );

    let mut track = GroundTrack {
        latitudes_deg: Vec::with_capacity(states.len()),
        longitudes_deg: Vec::with_capacity(states.len()),
    };

    for (index, (state, dcm)) in states.iter().zip(dcms.iter()).enumerate() {
        let position = Vector3::new(state[0], state[1], state[2]);
        match project_position(&position, dcm) {
            Some((lat_deg, lon_deg)) => {
                track.latitudes_deg.push(lat_deg);
                track.longitudes_deg.push(lon_deg);
            }
            None => return DegenerateVectorSnafu { index }.fail(),
        }
    }

    Ok(track)
}

#[cfg(test)]
mod ut_groundtrack {
    use super::*;
    use crate::linalg::Vector6;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equator_and_poles() {
        let eye = Matrix3::identity();
        let (lat, lon) = project_position(&Vector3::new(7000.0, 0.0, 0.0), &eye).unwrap();
        assert_abs_diff_eq!(lat, 0.0);
        assert_abs_diff_eq!(lon, 0.0);

        let (lat, lon) = project_position(&Vector3::new(0.0, -42.0, 0.0), &eye).unwrap();
        assert_abs_diff_eq!(lat, 0.0);
        assert_abs_diff_eq!(lon, -90.0, epsilon = 1e-12);

        let (lat, _) = project_position(&Vector3::new(0.0, 0.0, 8000.0), &eye).unwrap();
        assert_abs_diff_eq!(lat, 90.0, epsilon = 1e-12);
        let (lat, _) = project_position(&Vector3::new(0.0, 0.0, -1e-3), &eye).unwrap();
        assert_abs_diff_eq!(lat, -90.0, epsilon = 1e-12);
    }

    #[test]
    fn rounding_past_the_pole() {
        // Slightly non orthonormal rotation, as accumulated by repeated products
        let mut dcm = Matrix3::identity();
        dcm[(2, 2)] = 1.0 + 4.0 * f64::EPSILON;
        let position = Vector3::new(0.0, 0.0, 7000.0);
        let fixed: Vector3<f64> = dcm.transpose() * (position / position.norm() * EARTH_RADIUS_KM);
        assert!(fixed[2] / EARTH_RADIUS_KM > 1.0);

        let (lat, lon) = project_position(&position, &dcm).unwrap();
        assert!(!lat.is_nan() && !lon.is_nan());
        assert_eq!(lat, 90.0);

        let (lat, _) = project_position(&-position, &dcm).unwrap();
        assert_eq!(lat, -90.0);
    }

    #[test]
    fn antimeridian_is_positive() {
        let eye = Matrix3::identity();
        let (_, lon) = project_position(&Vector3::new(-7000.0, -0.0, 0.0), &eye).unwrap();
        assert_abs_diff_eq!(lon, 180.0);
        let (_, lon) = project_position(&Vector3::new(-7000.0, 0.0, 0.0), &eye).unwrap();
        assert_abs_diff_eq!(lon, 180.0);
    }

    #[test]
    fn degenerate_and_mismatched() {
        let states = StateHistory::new(vec![
            Vector6::new(7000.0, 0.0, 0.0, 0.0, 7.5, 0.0),
            Vector6::zeros(),
        ]);
        let err = project(&states, &DcmStack::identity(2)).unwrap_err();
        assert_eq!(err, AstroError::DegenerateVector { index: 1 });
        assert_eq!(err.kind(), crate::ErrorKind::DegenerateVector);

        let err = project(&states, &DcmStack::identity(3)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }
}
