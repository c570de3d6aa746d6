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

use super::{AstroError, InvalidTimeGridSnafu};
use crate::time::{Duration, Unit};
use snafu::ensure;
use std::fmt;

/// Default number of samples of the analysis
pub const DEFAULT_SAMPLES: usize = 200;
/// Default end of the analysis window, in seconds (half a day)
pub const DEFAULT_WINDOW_END_S: f64 = 43_200.0;

/// Uniformly spaced sample times of the analysis.
///
/// The samples are offsets in seconds from the epoch of the initial state: `t[i] = i·h` with
/// `h = (t2 - t1) / (n - 1)`. The start of the window only contributes to the span of the window.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    start_s: f64,
    end_s: f64,
    step_s: f64,
    samples_s: Vec<f64>,
}

impl TimeGrid {
    /// Builds a grid of `n` samples over the window `[t1, t2]` (seconds).
    pub fn new(n: usize, t1: f64, t2: f64) -> Result<Self, AstroError> {
        ensure!(
            n >= 2,
            InvalidTimeGridSnafu {
                reason: format!("at least two samples are needed, got {n}")
            }
        );
        ensure!(
            t1.is_finite() && t2.is_finite(),
            InvalidTimeGridSnafu {
                reason: format!("window bounds must be finite, got [{t1}, {t2}]")
            }
        );
        ensure!(
            t2 > t1,
            InvalidTimeGridSnafu {
                reason: format!("window end ({t2} s) must be after its start ({t1} s)")
            }
        );

        let step_s = (t2 - t1) / (n - 1) as f64;
        let samples_s = (0..n).map(|i| i as f64 * step_s).collect::<Vec<f64>>();

        Ok(Self {
            start_s: t1,
            end_s: t2,
            step_s,
            samples_s,
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples_s.len()
    }

    /// A valid grid is never empty
    pub fn is_empty(&self) -> bool {
        self.samples_s.is_empty()
    }

    /// Step between two consecutive samples, in seconds
    pub fn step_s(&self) -> f64 {
        self.step_s
    }

    /// Step between two consecutive samples
    pub fn step(&self) -> Duration {
        self.step_s * Unit::Second
    }

    /// Span of the analysis window
    pub fn span(&self) -> Duration {
        (self.end_s - self.start_s) * Unit::Second
    }

    pub fn start_s(&self) -> f64 {
        self.start_s
    }

    pub fn end_s(&self) -> f64 {
        self.end_s
    }

    /// The sample times in seconds
    pub fn samples(&self) -> &[f64] {
        &self.samples_s
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        let step_s = DEFAULT_WINDOW_END_S / (DEFAULT_SAMPLES - 1) as f64;
        Self {
            start_s: 0.0,
            end_s: DEFAULT_WINDOW_END_S,
            step_s,
            samples_s: (0..DEFAULT_SAMPLES).map(|i| i as f64 * step_s).collect(),
        }
    }
}

impl fmt::Display for TimeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} samples over {} (step {})",
            self.len(),
            self.span(),
            self.step()
        )
    }
}
