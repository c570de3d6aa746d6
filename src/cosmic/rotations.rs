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

use super::{
    AstroError, DegenerateQuaternionSnafu, InvalidTimeGridSnafu, ShapeMismatchSnafu,
    EARTH_SPIN_RATE_RAD_S,
};
use crate::linalg::{Matrix3, Matrix4x3, Quaternion};
use crate::utils::orthonormality_error;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::ops::Index;

/// Provides the orientation of the Earth, as a scalar-first quaternion, at each of the requested times (seconds).
pub trait SpinModel: Send + Sync {
    fn quaternions(&self, epochs_s: &[f64]) -> Vec<Quaternion<f64>>;
}

/// The Earth spins about the inertial Z axis at a fixed rate, starting aligned with the inertial frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniformSpin {
    pub rate_rad_s: f64,
}

impl Default for UniformSpin {
    fn default() -> Self {
        Self {
            rate_rad_s: EARTH_SPIN_RATE_RAD_S,
        }
    }
}

impl SpinModel for UniformSpin {
    fn quaternions(&self, epochs_s: &[f64]) -> Vec<Quaternion<f64>> {
        epochs_s
            .iter()
            .map(|t| {
                let (sin_half, cos_half) = (0.5 * self.rate_rad_s * t).sin_cos();
                Quaternion::new(cos_half, 0.0, 0.0, -sin_half)
            })
            .collect()
    }
}

/// Computes the direction cosine matrix of the provided quaternion as `Aᵀ·B`.
///
/// The quaternion is normalized first. Returns None if its norm is zero or not finite.
pub fn dcm_from_quaternion(q: &Quaternion<f64>) -> Option<Matrix3<f64>> {
    let norm = q.norm();
    if !norm.is_finite() || norm < f64::EPSILON {
        return None;
    }
    let (q0, q1, q2, q3) = (q.w / norm, q.i / norm, q.j / norm, q.k / norm);

    #[rustfmt::skip]
    let a = Matrix4x3::new(
        q0, -q3, q2,
        q3, q0, -q1,
        -q2, q1, q0,
        q1, q2, q3,
    );
    #[rustfmt::skip]
    let b = Matrix4x3::new(
        q0, q3, -q2,
        -q3, q0, q1,
        q2, -q1, q0,
        q1, q2, q3,
    );

    Some(a.transpose() * b)
}

/// One rotation matrix per sample, mapping inertial vectors to Earth fixed vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct DcmStack {
    dcms: Vec<Matrix3<f64>>,
}

impl DcmStack {
    pub fn new(dcms: Vec<Matrix3<f64>>) -> Self {
        Self { dcms }
    }

    /// A stack of `n` identity matrices, i.e. an Earth which does not rotate.
    pub fn identity(n: usize) -> Self {
        Self {
            dcms: vec![Matrix3::identity(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.dcms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dcms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Matrix3<f64>> {
        self.dcms.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Matrix3<f64>> {
        self.dcms.iter()
    }

    /// Largest `‖RᵀR - I‖` of the stack
    pub fn max_orthonormality_error(&self) -> f64 {
        self.dcms
            .iter()
            .map(orthonormality_error)
            .fold(0.0, f64::max)
    }
}

impl Index<usize> for DcmStack {
    type Output = Matrix3<f64>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.dcms[index]
    }
}

/// Computes the rotation matrix stack of the Earth at each of the provided times (seconds).
///
/// Fails if the times are empty, not finite, or not strictly increasing, or if the spin model
/// returns an unusable quaternion.
pub fn earth_orientation<S: SpinModel + ?Sized>(
    epochs_s: &[f64],
    spin: &S,
) -> Result<DcmStack, AstroError> {
    ensure!(
        !epochs_s.is_empty(),
        InvalidTimeGridSnafu {
            reason: "no sample times".to_string()
        }
    );
    ensure!(
        epochs_s.iter().all(|t| t.is_finite()),
        InvalidTimeGridSnafu {
            reason: "non finite sample time".to_string()
        }
    );
    if let Some(i) = epochs_s.windows(2).position(|w| w[1] <= w[0]) {
        return InvalidTimeGridSnafu {
            reason: format!(
                "sample times are not strictly increasing at #{}: {} then {}",
                i + 1,
                epochs_s[i],
                epochs_s[i + 1]
            ),
        }
        .fail();
    }

    let quaternions = spin.quaternions(epochs_s);
    ensure!(
        quaternions.len() == epochs_s.len(),
        ShapeMismatchSnafu {
            what: "Earth spin quaternions",
            expected: epochs_s.len(),
            got: quaternions.len()
        }
    );

    let mut dcms = Vec::with_capacity(quaternions.len());
    for (index, q) in quaternions.iter().enumerate() {
        match dcm_from_quaternion(q) {
            Some(dcm) => dcms.push(dcm),
            None => return DegenerateQuaternionSnafu { index }.fail(),
        }
    }

    let stack = DcmStack { dcms };
    debug!(
        "Earth orientation computed for {} samples (max orthonormality error {:.3e})",
        stack.len(),
        stack.max_orthonormality_error()
    );

    Ok(stack)
}

#[cfg(test)]
mod ut_rotations {
    use super::*;
    use crate::utils::r3;
    use approx::assert_abs_diff_eq;

    #[test]
    fn quaternion_dcm_is_z_rotation() {
        let spin = UniformSpin::default();
        let stack = earth_orientation(&[0.0, 21_600.0, 43_200.0], &spin).unwrap();
        assert_abs_diff_eq!(stack[0], Matrix3::identity(), epsilon = 1e-15);
        // A quarter of a day is a quarter turn
        assert_abs_diff_eq!(stack[1], r3(std::f64::consts::FRAC_PI_2), epsilon = 1e-12);
        assert_abs_diff_eq!(stack[2], r3(std::f64::consts::PI), epsilon = 1e-12);
    }

    #[test]
    fn generic_quaternion_is_orthonormal() {
        let q = Quaternion::new(0.3, -1.2, 0.7, 2.1);
        let dcm = dcm_from_quaternion(&q).unwrap();
        assert!(orthonormality_error(&dcm) < 1e-12);
        assert_abs_diff_eq!(dcm.determinant(), 1.0, epsilon = 1e-12);
        assert!(dcm_from_quaternion(&Quaternion::new(0.0, 0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn invalid_times() {
        let spin = UniformSpin::default();
        assert!(earth_orientation(&[], &spin).is_err());
        assert!(earth_orientation(&[0.0, 10.0, 10.0], &spin).is_err());
        assert!(earth_orientation(&[0.0, 10.0, 5.0], &spin).is_err());
        assert!(earth_orientation(&[0.0, f64::INFINITY], &spin).is_err());
    }
}
