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

use crate::linalg::{Matrix3, Vector3};

/// Rotation matrix about the X axis of the provided angle in radians.
/// This is the active rotation, i.e. it rotates a vector by `angle` in the right-handed sense.
pub fn r1(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

/// Rotation matrix about the Z axis of the provided angle in radians (active rotation).
pub fn r3(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Returns the Frobenius norm of `Mᵀ·M - I`, i.e. how far the matrix is from being orthonormal.
pub fn orthonormality_error(m: &Matrix3<f64>) -> f64 {
    (m.transpose() * m - Matrix3::identity()).norm()
}

/// Returns whether all of the components of this vector are finite.
pub fn is_finite_vec(v: &Vector3<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}
