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

use crate::cosmic::EARTH_GM_KM3_S2;
use crate::linalg::{Vector3, Vector6};
use std::fmt;
use std::sync::Arc;

/// Zonal harmonics of the Earth's gravity field.
pub mod harmonics;
pub use self::harmonics::*;

/// A trait for models with equations of motion that can be integrated.
///
/// The state is the inertial position (km) and velocity (km/s).
pub trait Dynamics: Clone + Send + Sync {
    /// Defines the equations of motion at `delta_t_s` seconds past the initial state.
    fn eom(&self, delta_t_s: f64, state: &Vector6<f64>) -> Vector6<f64>;
}

/// A trait for immutable dynamics that return an acceleration (e.g., zonal harmonics).
pub trait AccelModel: Send + Sync + fmt::Display {
    /// Acceleration in km/s^2 at the provided inertial position in km.
    fn eom(&self, radius_km: &Vector3<f64>) -> Vector3<f64>;
}

/// `OrbitalDynamics` provides the point mass gravity of the Earth plus any acceleration model.
#[derive(Clone)]
pub struct OrbitalDynamics {
    pub gm_km3_s2: f64,
    pub accel_models: Vec<Arc<dyn AccelModel>>,
}

impl OrbitalDynamics {
    /// Initializes a OrbitalDynamics which only includes the point mass gravity of the Earth.
    pub fn two_body() -> Self {
        Self::new(vec![])
    }

    /// Point mass gravity of the Earth and its J2, J3 and J4 zonal harmonics.
    pub fn zonal_j4() -> Self {
        Self::new(vec![Arc::new(ZonalHarmonics::default())])
    }

    /// Initialize orbital dynamics with a list of acceleration models
    pub fn new(accel_models: Vec<Arc<dyn AccelModel>>) -> Self {
        Self {
            gm_km3_s2: EARTH_GM_KM3_S2,
            accel_models,
        }
    }

    /// Add a model to the currently defined orbital dynamics
    pub fn add_model(&mut self, accel_model: Arc<dyn AccelModel>) {
        self.accel_models.push(accel_model);
    }
}

impl Default for OrbitalDynamics {
    fn default() -> Self {
        Self::zonal_j4()
    }
}

impl fmt::Display for OrbitalDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let models: Vec<String> = self.accel_models.iter().map(|m| format!("{m}")).collect();
        write!(
            f,
            "Orbital dynamics (GM = {} km^3/s^2) with {} accel models {:?}",
            self.gm_km3_s2,
            self.accel_models.len(),
            models
        )
    }
}

impl Dynamics for OrbitalDynamics {
    fn eom(&self, _delta_t_s: f64, state: &Vector6<f64>) -> Vector6<f64> {
        let radius = state.fixed_rows::<3>(0).into_owned();
        let rmag = radius.norm();
        let mut accel = (-self.gm_km3_s2 / rmag.powi(3)) * radius;

        for model in &self.accel_models {
            accel += model.eom(&radius);
        }

        Vector6::new(state[3], state[4], state[5], accel[0], accel[1], accel[2])
    }
}
