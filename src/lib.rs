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

/*! # nyx-launch

Launch parameter analysis: how uniformly does the ground track of a freshly injected satellite sample the Earth's surface over a fixed horizon, and which orbital elements make it most uniform?

The computation is a fixed pipeline: orbital elements → initial state → propagated state history → ground track (using the Earth spin rotation stack) → kurtosis based uniformity scores. A bounded optimizer drives the orbital elements to minimize the sum of the scores.
*/

/// Provides the fixed step propagators and the `OrbitPropagator` interface.
pub mod propagators;

/// Provides the equations of motion (two body and zonal harmonics).
pub mod dynamics;

/// Orbital elements, time grid, Earth spin and ground track projection.
pub mod cosmic;

/// Utility functions shared by different modules.
pub mod utils;

mod errors;
/// Functions which may fail will return an error instead of panicking.
pub use self::errors::{ErrorKind, LaunchError};

/// Configuration files and ground track export.
pub mod io;

/// Mission design: uniformity scoring, the evaluation pipeline and the parameter search.
pub mod md;

/// Multi-start sweep of the parameter search on all threads.
pub mod mc;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::geometry::Quaternion;
}

pub use self::cosmic::{GroundTrack, OrbitalParameters, TimeGrid};
pub use self::md::{Evaluation, Pipeline};
