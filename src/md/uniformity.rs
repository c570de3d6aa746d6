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
use snafu::prelude::*;

/// Fisher excess kurtosis of a continuous uniform distribution
pub const UNIFORM_EXCESS_KURTOSIS: f64 = -1.2;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum UniformityError {
    #[snafu(display("cannot score an empty sample"))]
    EmptySample,
    #[snafu(display("sample of {len} values has zero variance"))]
    DegenerateSample { len: usize },
    #[snafu(display("sample value #{index} is not finite"))]
    NonFiniteSample { index: usize },
}

impl UniformityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonFiniteSample { .. } => ErrorKind::InvalidInput,
            Self::EmptySample | Self::DegenerateSample { .. } => ErrorKind::DegenerateSample,
        }
    }
}

/// Computes the biased (population) Fisher excess kurtosis `m4 / m2² - 3` of the sample.
///
/// The variance is considered to be zero if its square root is within a few thousand ULPs of the mean,
/// since the mean of a constant sample is itself rounded.
pub fn excess_kurtosis(sample: &[f64]) -> Result<f64, UniformityError> {
    ensure!(!sample.is_empty(), EmptySampleSnafu);
    if let Some(index) = sample.iter().position(|x| !x.is_finite()) {
        return NonFiniteSampleSnafu { index }.fail();
    }

    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;

    let (mut m2, mut m4) = (0.0, 0.0);
    for x in sample {
        let dev2 = (x - mean).powi(2);
        m2 += dev2;
        m4 += dev2 * dev2;
    }
    m2 /= n;
    m4 /= n;

    ensure!(
        m2 > 0.0 && m2.sqrt() > 1e3 * f64::EPSILON * mean.abs(),
        DegenerateSampleSnafu { len: sample.len() }
    );

    Ok(m4 / (m2 * m2) - 3.0)
}

/// Scores how close the sample is to being uniformly distributed: the squared distance of its
/// excess kurtosis to that of the uniform distribution. Zero is perfectly uniform, lower is better.
///
/// The score does not depend on the order of the sample.
pub fn uniformity(sample: &[f64]) -> Result<f64, UniformityError> {
    Ok((excess_kurtosis(sample)? - UNIFORM_EXCESS_KURTOSIS).powi(2))
}
