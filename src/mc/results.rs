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

use crate::linalg::DVector;
use crate::md::opti::{SearchError, SearchSolution};
use std::fmt;

/// Outcome of one search of a multi-start sweep
#[derive(Debug)]
pub struct StartResult {
    pub index: usize,
    /// Initial guess of the design vector
    pub guess: DVector<f64>,
    pub outcome: Result<SearchSolution, SearchError>,
}

/// A structure of all of the runs of a multi-start sweep, sorted by index
#[derive(Debug)]
pub struct SweepResults {
    pub runs: Vec<StartResult>,
    pub seed: u64,
    pub scenario: String,
}

impl SweepResults {
    /// Solutions of the runs which succeeded
    pub fn solutions(&self) -> impl Iterator<Item = &SearchSolution> {
        self.runs.iter().filter_map(|run| run.outcome.as_ref().ok())
    }

    /// Number of runs which failed
    pub fn failures(&self) -> usize {
        self.runs.iter().filter(|run| run.outcome.is_err()).count()
    }

    /// Solution with the lowest objective, the earliest run winning ties
    pub fn best(&self) -> Option<&SearchSolution> {
        self.solutions().fold(None, |best: Option<&SearchSolution>, sol| match best {
            Some(b) if b.objective <= sol.objective => Some(b),
            _ => Some(sol),
        })
    }
}

impl fmt::Display for SweepResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - seed: {} - {} runs, {} failed",
            self.scenario,
            self.seed,
            self.runs.len(),
            self.failures()
        )?;
        if let Some(best) = self.best() {
            write!(f, "\nbest: {} -> {:.6e}", best.params, best.objective)?;
        }
        Ok(())
    }
}
