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

use crate::errors::ErrorKind;
use snafu::Snafu;

// Re-Export the time grid
mod timegrid;
pub use self::timegrid::*;

// Re-Export the orbital elements and the initial state provider
mod elements;
pub use self::elements::*;

// Re-Export the Earth spin and rotation stack
mod rotations;
pub use self::rotations::*;

/// The ground track module projects an inertial state history onto the spherical Earth.
pub mod groundtrack;
pub use self::groundtrack::GroundTrack;

/// Equatorial radius of the Earth in kilometers, also used as the radius of the spherical Earth of the ground track.
pub const EARTH_RADIUS_KM: f64 = 6_378.137;
/// Gravitational parameter of the Earth in km^3/s^2
pub const EARTH_GM_KM3_S2: f64 = 398_600.44;
/// Second zonal harmonic of the Earth
pub const EARTH_J2: f64 = 1.082_64e-3;
/// Third zonal harmonic of the Earth
pub const EARTH_J3: f64 = -2.51e-6;
/// Fourth zonal harmonic of the Earth
pub const EARTH_J4: f64 = -1.60e-6;
/// Rotation rate of the Earth in radians per second: one full turn per 86400 seconds.
pub const EARTH_SPIN_RATE_RAD_S: f64 = std::f64::consts::PI / 43_200.0;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("invalid time grid: {reason}"))]
    InvalidTimeGrid { reason: String },
    #[snafu(display("invalid orbital elements: {reason}"))]
    InvalidElements { reason: String },
    #[snafu(display("quaternion #{index} has a zero or non-finite norm"))]
    DegenerateQuaternion { index: usize },
    #[snafu(display("position vector of sample #{index} has a zero or non-finite norm"))]
    DegenerateVector { index: usize },
    #[snafu(display("{what}: expected {expected} samples but got {got}"))]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

impl AstroError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DegenerateVector { .. } => ErrorKind::DegenerateVector,
            _ => ErrorKind::InvalidInput,
        }
    }
}
