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

use super::AccelModel;
use crate::cosmic::{EARTH_GM_KM3_S2, EARTH_J2, EARTH_J3, EARTH_J4, EARTH_RADIUS_KM};
use crate::linalg::Vector3;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Acceleration of the J2, J3 and J4 zonal harmonics of a central body.
///
/// A coefficient set to zero disables its term.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZonalHarmonics {
    pub gm_km3_s2: f64,
    pub radius_km: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
}

impl ZonalHarmonics {
    /// Only the J2 term of the Earth
    pub fn j2_only() -> Self {
        Self {
            j3: 0.0,
            j4: 0.0,
            ..Default::default()
        }
    }
}

impl Default for ZonalHarmonics {
    fn default() -> Self {
        Self {
            gm_km3_s2: EARTH_GM_KM3_S2,
            radius_km: EARTH_RADIUS_KM,
            j2: EARTH_J2,
            j3: EARTH_J3,
            j4: EARTH_J4,
        }
    }
}

impl fmt::Display for ZonalHarmonics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "zonal harmonics (J2 = {:e}, J3 = {:e}, J4 = {:e})",
            self.j2, self.j3, self.j4
        )
    }
}

impl AccelModel for ZonalHarmonics {
    fn eom(&self, radius_km: &Vector3<f64>) -> Vector3<f64> {
        let (x, y, z) = (radius_km[0], radius_km[1], radius_km[2]);
        let r2 = radius_km.norm_squared();
        let r = r2.sqrt();
        let z2_r2 = z * z / r2;
        let mu = self.gm_km3_s2;
        let re = self.radius_km;

        let mut accel = Vector3::zeros();

        if self.j2 != 0.0 {
            let coeff = -1.5 * self.j2 * mu * re.powi(2) / r.powi(5);
            accel += coeff
                * Vector3::new(
                    x * (1.0 - 5.0 * z2_r2),
                    y * (1.0 - 5.0 * z2_r2),
                    z * (3.0 - 5.0 * z2_r2),
                );
        }

        if self.j3 != 0.0 {
            let coeff = -2.5 * self.j3 * mu * re.powi(3) / r.powi(7);
            let xy_term = 3.0 * z - 7.0 * z.powi(3) / r2;
            accel += coeff
                * Vector3::new(
                    x * xy_term,
                    y * xy_term,
                    6.0 * z * z - 7.0 * z.powi(4) / r2 - 0.6 * r2,
                );
        }

        if self.j4 != 0.0 {
            let coeff = 1.875 * self.j4 * mu * re.powi(4) / r.powi(7);
            let z4_r4 = z2_r2 * z2_r2;
            let xy_term = 1.0 - 14.0 * z2_r2 + 21.0 * z4_r4;
            accel += coeff
                * Vector3::new(
                    x * xy_term,
                    y * xy_term,
                    z * (5.0 - 70.0 / 3.0 * z2_r2 + 21.0 * z4_r4),
                );
        }

        accel
    }
}
