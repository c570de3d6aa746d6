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

/// The `RK` trait defines a Runge Kutta integrator.
#[allow(clippy::upper_case_acronyms)]
pub trait RK
where
    Self: Sized,
{
    /// Returns the order of this integrator (as u8 because there probably isn't an order greater than 255).
    const ORDER: u8;

    /// Returns the stages of this integrator (as usize because it's used as indexing)
    const STAGES: usize;

    /// Returns a pointer to a list of f64 corresponding to the A coefficients of the Butcher table for that RK.
    /// This module only supports *explicit* integrators, and as such, `Self::A_COEFFS.len()` must be of
    /// size (stages)*(stages - 1)/2.
    /// *Warning:* this RK trait supposes that the implementation is consistent, i.e. c_i = \sum_j a_{ij}.
    const A_COEFFS: &'static [f64];
    /// Returns a pointer to a list of f64 corresponding to the b_i coefficients of the Butcher table for that RK.
    /// `Self::B_COEFFS.len()` must be of size (stages).
    const B_COEFFS: &'static [f64];
}

/// `RK4Fixed` is a fixed step RK4 (or in other words, a Runge Kutta Fehlberg 4 integrator without the error control).
pub struct RK4Fixed {}

impl RK for RK4Fixed {
    const ORDER: u8 = 4;
    const STAGES: usize = 4;
    const A_COEFFS: &'static [f64] = &[0.5, 0.0, 0.5, 0.0, 0.0, 1.0];
    const B_COEFFS: &'static [f64] = &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];
}

/// `RK2Fixed` is the explicit midpoint method, mostly useful to compare against RK4.
pub struct RK2Fixed {}

impl RK for RK2Fixed {
    const ORDER: u8 = 2;
    const STAGES: usize = 2;
    const A_COEFFS: &'static [f64] = &[0.5];
    const B_COEFFS: &'static [f64] = &[0.0, 1.0];
}

#[cfg(test)]
mod ut_rk_methods {
    use super::*;

    fn consistent<M: RK>() -> bool {
        M::A_COEFFS.len() == M::STAGES * (M::STAGES - 1) / 2
            && M::B_COEFFS.len() == M::STAGES
            && (M::B_COEFFS.iter().sum::<f64>() - 1.0).abs() < 1e-15
    }

    #[test]
    fn butcher_tables() {
        assert!(consistent::<RK4Fixed>());
        assert!(consistent::<RK2Fixed>());
    }
}
