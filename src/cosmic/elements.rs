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

use super::{AstroError, InvalidElementsSnafu, EARTH_GM_KM3_S2, EARTH_RADIUS_KM};
use crate::linalg::{Vector3, Vector6};
use crate::utils::{r1, r3};
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;

/// True anomaly at injection of the default launch, in degrees
pub const DEFAULT_TRUE_ANOMALY_DEG: f64 = 337.987;

/// One of the five launch parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum OrbitalParameter {
    /// Altitude of the perigee above the spherical Earth, km
    AltPerigee,
    /// Altitude of the apogee above the spherical Earth, km
    AltApogee,
    /// Right ascension of the ascending node, degrees
    Raan,
    /// Inclination, degrees
    Inc,
    /// Argument of perigee, degrees
    ArgPerigee,
}

impl OrbitalParameter {
    pub fn unit(&self) -> &'static str {
        match self {
            Self::AltPerigee | Self::AltApogee => "km",
            _ => "deg",
        }
    }

    /// The declared bounds of this parameter for the launch search
    pub fn default_bounds(&self) -> (f64, f64) {
        match self {
            Self::AltPerigee | Self::AltApogee => (500.0, 1000.0),
            Self::Raan => (-180.0, 180.0),
            Self::Inc => (0.0, 90.0),
            Self::ArgPerigee => (0.0, 90.0),
        }
    }

    /// Starting point of a search when none is provided
    pub fn default_guess(&self) -> f64 {
        match self {
            Self::AltPerigee | Self::AltApogee => 600.0,
            Self::Raan => 0.0,
            Self::Inc => 45.0,
            Self::ArgPerigee => 0.0,
        }
    }
}

impl fmt::Display for OrbitalParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::AltPerigee => "altPerigee",
            Self::AltApogee => "altApogee",
            Self::Raan => "RAAN",
            Self::Inc => "Inc",
            Self::ArgPerigee => "argPerigee",
        };
        write!(f, "{name}")
    }
}

/// The launch parameters: perigee and apogee altitudes (km), RAAN, inclination and argument of perigee (degrees).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitalParameters {
    pub alt_perigee_km: f64,
    pub alt_apogee_km: f64,
    pub raan_deg: f64,
    pub inc_deg: f64,
    pub aop_deg: f64,
}

impl OrbitalParameters {
    pub fn new(
        alt_perigee_km: f64,
        alt_apogee_km: f64,
        raan_deg: f64,
        inc_deg: f64,
        aop_deg: f64,
    ) -> Self {
        Self {
            alt_perigee_km,
            alt_apogee_km,
            raan_deg,
            inc_deg,
            aop_deg,
        }
    }

    /// Circular orbit at the provided altitude
    pub fn circular(alt_km: f64, raan_deg: f64, inc_deg: f64) -> Self {
        Self::new(alt_km, alt_km, raan_deg, inc_deg, 0.0)
    }

    pub fn value(&self, param: OrbitalParameter) -> f64 {
        match param {
            OrbitalParameter::AltPerigee => self.alt_perigee_km,
            OrbitalParameter::AltApogee => self.alt_apogee_km,
            OrbitalParameter::Raan => self.raan_deg,
            OrbitalParameter::Inc => self.inc_deg,
            OrbitalParameter::ArgPerigee => self.aop_deg,
        }
    }

    pub fn set_value(&mut self, param: OrbitalParameter, val: f64) {
        match param {
            OrbitalParameter::AltPerigee => self.alt_perigee_km = val,
            OrbitalParameter::AltApogee => self.alt_apogee_km = val,
            OrbitalParameter::Raan => self.raan_deg = val,
            OrbitalParameter::Inc => self.inc_deg = val,
            OrbitalParameter::ArgPerigee => self.aop_deg = val,
        }
    }

    /// Returns a copy of these parameters with the provided parameter changed
    pub fn with_value(mut self, param: OrbitalParameter, val: f64) -> Self {
        self.set_value(param, val);
        self
    }

    /// Returns these parameters in the order of `OrbitalParameter`
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.alt_perigee_km,
            self.alt_apogee_km,
            self.raan_deg,
            self.inc_deg,
            self.aop_deg,
        ]
    }

    /// Radius of perigee on the spherical Earth, km
    pub fn periapsis_km(&self) -> f64 {
        EARTH_RADIUS_KM + self.alt_perigee_km
    }

    /// Radius of apogee on the spherical Earth, km
    pub fn apoapsis_km(&self) -> f64 {
        EARTH_RADIUS_KM + self.alt_apogee_km
    }

    /// Semi major axis, km
    pub fn sma_km(&self) -> f64 {
        0.5 * (self.periapsis_km() + self.apoapsis_km())
    }

    /// Eccentricity. Negative if the "perigee" is higher than the "apogee", which amounts to swapping both apsides.
    pub fn ecc(&self) -> f64 {
        (self.apoapsis_km() - self.periapsis_km()) / (self.apoapsis_km() + self.periapsis_km())
    }
}

impl Default for OrbitalParameters {
    fn default() -> Self {
        Self::new(500.0, 500.0, 66.279, 82.072, 0.0)
    }
}

impl fmt::Display for OrbitalParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[altPerigee = {:.3} km, altApogee = {:.3} km, RAAN = {:.3} deg, Inc = {:.3} deg, argPerigee = {:.3} deg]",
            self.alt_perigee_km, self.alt_apogee_km, self.raan_deg, self.inc_deg, self.aop_deg
        )
    }
}

/// Maps the launch parameters onto an initial inertial state (position in km, velocity in km/s).
pub trait InitialStateProvider: Send + Sync {
    fn initial_state(&self, params: &OrbitalParameters) -> Result<Vector6<f64>, AstroError>;
}

/// Injection of the spacecraft on the conic defined by the launch parameters, at a fixed true anomaly.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Injection {
    pub gm_km3_s2: f64,
    pub radius_km: f64,
    pub true_anomaly_deg: f64,
}

impl Injection {
    pub fn with_true_anomaly(true_anomaly_deg: f64) -> Self {
        Self {
            true_anomaly_deg,
            ..Default::default()
        }
    }
}

impl Default for Injection {
    fn default() -> Self {
        Self {
            gm_km3_s2: EARTH_GM_KM3_S2,
            radius_km: EARTH_RADIUS_KM,
            true_anomaly_deg: DEFAULT_TRUE_ANOMALY_DEG,
        }
    }
}

impl InitialStateProvider for Injection {
    fn initial_state(&self, params: &OrbitalParameters) -> Result<Vector6<f64>, AstroError> {
        ensure!(
            params.to_array().iter().all(|v| v.is_finite()),
            InvalidElementsSnafu {
                reason: format!("non finite parameter in {params}")
            }
        );

        let r_p = self.radius_km + params.alt_perigee_km;
        let r_a = self.radius_km + params.alt_apogee_km;
        ensure!(
            r_p > 0.0 && r_a > 0.0,
            InvalidElementsSnafu {
                reason: format!("apsides must be above the center of the Earth (r_p = {r_p} km, r_a = {r_a} km)")
            }
        );

        let ecc = (r_a - r_p) / (r_a + r_p);
        let sma = 0.5 * (r_p + r_a);
        let p = sma * (1.0 - ecc.powi(2));

        let (sin_ta, cos_ta) = self.true_anomaly_deg.to_radians().sin_cos();
        let rmag = p / (1.0 + ecc * cos_ta);
        let sqrt_gm_p = (self.gm_km3_s2 / p).sqrt();

        // Perifocal frame
        let r_pqw = Vector3::new(rmag * cos_ta, rmag * sin_ta, 0.0);
        let v_pqw = Vector3::new(-sqrt_gm_p * sin_ta, sqrt_gm_p * (ecc + cos_ta), 0.0);

        let dcm_pqw2inertial = r3(params.raan_deg.to_radians())
            * r1(params.inc_deg.to_radians())
            * r3(params.aop_deg.to_radians());

        let radius = dcm_pqw2inertial * r_pqw;
        let velocity = dcm_pqw2inertial * v_pqw;

        Ok(Vector6::new(
            radius[0],
            radius[1],
            radius[2],
            velocity[0],
            velocity[1],
            velocity[2],
        ))
    }
}

#[cfg(test)]
mod ut_elements {
    use super::*;
    use approx::assert_abs_diff_eq;
    use enum_iterator::all;

    #[test]
    fn parameter_access() {
        let params = OrbitalParameters::new(510.0, 720.0, -30.0, 51.6, 12.0);
        let expected = params.to_array();
        for (i, param) in all::<OrbitalParameter>().enumerate() {
            assert_abs_diff_eq!(params.value(param), expected[i]);
            let (min, max) = param.default_bounds();
            assert!(min < max, "{param}");
            let guess = param.default_guess();
            assert!(guess >= min && guess <= max, "{param}");
        }
        let raised = params.with_value(OrbitalParameter::AltApogee, 900.0);
        assert_abs_diff_eq!(raised.alt_apogee_km, 900.0);
        assert_abs_diff_eq!(raised.alt_perigee_km, 510.0);
    }

    #[test]
    fn circular_injection() {
        let inj = Injection::default();
        let params = OrbitalParameters::circular(700.0, 40.0, 60.0);
        let state = inj.initial_state(&params).unwrap();
        let r = Vector3::new(state[0], state[1], state[2]);
        let v = Vector3::new(state[3], state[4], state[5]);
        let rmag = EARTH_RADIUS_KM + 700.0;
        assert_abs_diff_eq!(r.norm(), rmag, epsilon = 1e-9);
        assert_abs_diff_eq!(v.norm(), (EARTH_GM_KM3_S2 / rmag).sqrt(), epsilon = 1e-12);
        // Circular: velocity perpendicular to position
        assert_abs_diff_eq!(r.dot(&v), 0.0, epsilon = 1e-8);

        let h = r.cross(&v);
        assert_abs_diff_eq!((h[2] / h.norm()).acos().to_degrees(), 60.0, epsilon = 1e-9);
        // Ascending node along (cos RAAN, sin RAAN)
        let node = Vector3::z().cross(&h);
        assert_abs_diff_eq!(node[1].atan2(node[0]).to_degrees(), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn elliptical_injection_at_perigee() {
        let inj = Injection::with_true_anomaly(0.0);
        let params = OrbitalParameters::new(500.0, 1000.0, 0.0, 0.0, 0.0);
        let state = inj.initial_state(&params).unwrap();
        assert_abs_diff_eq!(state[0], EARTH_RADIUS_KM + 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state[1], 0.0, epsilon = 1e-9);
        // Vis viva at perigee
        let sma = params.sma_km();
        let vp = (EARTH_GM_KM3_S2 * (2.0 / params.periapsis_km() - 1.0 / sma)).sqrt();
        assert_abs_diff_eq!(state[4], vp, epsilon = 1e-9);
        assert!(params.ecc() > 0.0);
    }

    #[test]
    fn invalid_elements() {
        let inj = Injection::default();
        let below_center = OrbitalParameters::circular(-7000.0, 0.0, 0.0);
        assert!(inj.initial_state(&below_center).is_err());
        let nan = OrbitalParameters::circular(f64::NAN, 0.0, 0.0);
        assert_eq!(
            inj.initial_state(&nan).unwrap_err().kind(),
            crate::ErrorKind::InvalidInput
        );
    }
}
