//! Transition-matrix presets for generated scenarios.
//!
//! Every preset yields an `n × n` row-stochastic matrix whose last station is
//! the terminal. Rows left with no positive weight are sent straight to the
//! terminal.

use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionPreset {
    /// Equal weight on every station.
    Uniform,
    /// Equal weight on every later station; the terminal loops on itself.
    UniformUpperTriangle,
    /// Equal weight on stations `i + left ..= i + right`.
    ///
    /// Offsets are signed: `left = 1` excludes the current station. Older
    /// configs that wrote the lower bound negated (`-1_3`) map to `left = 1`.
    UniformCorridor { left: i64, right: i64 },
    /// Equal weight on a random `percentage` of all cells.
    ///
    /// A row that keeps no cell goes to the terminal, not to a random station.
    UniformPercentage { percentage: f64 },
    Random,
    RandomUpperTriangle,
    RandomCorridor { left: i64, right: i64 },
    RandomPercentage { percentage: f64 },
}

impl TransitionPreset {
    /// Short name used for generated file names, e.g. `random_corridor_1_3`.
    pub fn label(&self) -> String {
        match self {
            Self::Uniform => "uniform".to_string(),
            Self::UniformUpperTriangle => "uniform_upper_triangle".to_string(),
            Self::UniformCorridor { left, right } => format!("uniform_corridor_{left}_{right}"),
            Self::UniformPercentage { percentage } => {
                format!("uniform_percentage_{}", percent_label(*percentage))
            }
            Self::Random => "random".to_string(),
            Self::RandomUpperTriangle => "random_upper_triangle".to_string(),
            Self::RandomCorridor { left, right } => format!("random_corridor_{left}_{right}"),
            Self::RandomPercentage { percentage } => {
                format!("random_percentage_{}", percent_label(*percentage))
            }
        }
    }

    fn is_random(&self) -> bool {
        matches!(
            self,
            Self::Random
                | Self::RandomUpperTriangle
                | Self::RandomCorridor { .. }
                | Self::RandomPercentage { .. }
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent_label(percentage: f64) -> String {
    format!("{:02}", (percentage * 100.0).round() as u64)
}

/// Build a transition matrix for `station_count` stations.
///
/// Random presets and the cell shuffle of the percentage presets draw from
/// `rng`; the other presets are deterministic.
pub fn generate_transitions(
    station_count: usize,
    preset: TransitionPreset,
    rng: &mut impl Rng,
) -> Result<Vec<Vec<f64>>> {
    if station_count == 0 {
        bail!("station count must be at least 1");
    }
    let n = station_count;
    let terminal = n - 1;
    let random = preset.is_random();

    let mut matrix = vec![vec![0.0; n]; n];
    match preset {
        TransitionPreset::Uniform | TransitionPreset::Random => {
            for row in &mut matrix {
                for cell in row.iter_mut() {
                    *cell = cell_weight(random, rng);
                }
            }
        }
        TransitionPreset::UniformUpperTriangle | TransitionPreset::RandomUpperTriangle => {
            for (i, row) in matrix.iter_mut().enumerate() {
                for cell in row.iter_mut().skip(i + 1) {
                    *cell = cell_weight(random, rng);
                }
            }
            matrix[terminal][terminal] = 1.0;
        }
        TransitionPreset::UniformCorridor { left, right }
        | TransitionPreset::RandomCorridor { left, right } => {
            for (i, row) in matrix.iter_mut().enumerate() {
                for (j, cell) in row.iter_mut().enumerate() {
                    let offset = signed(j) - signed(i);
                    if (left..=right).contains(&offset) {
                        *cell = cell_weight(random, rng);
                    }
                }
            }
        }
        TransitionPreset::UniformPercentage { percentage }
        | TransitionPreset::RandomPercentage { percentage } => {
            if !(percentage > 0.0 && percentage <= 1.0) {
                bail!("percentage must be in (0, 1], got {percentage}");
            }
            let cells = n * n;
            let kept = kept_cells(cells, percentage);
            let mut flat: Vec<f64> = (0..cells)
                .map(|idx| if idx < cells - kept { 0.0 } else { cell_weight(random, rng) })
                .collect();
            flat.shuffle(rng);
            for (row, chunk) in matrix.iter_mut().zip(flat.chunks(n)) {
                row.copy_from_slice(chunk);
            }
        }
    }

    for row in &mut matrix {
        normalize_row(row, terminal);
    }
    Ok(matrix)
}

/// Cells left non-zero: everything except `floor(cells * (1 - percentage))`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn kept_cells(cells: usize, percentage: f64) -> usize {
    let zeroed = ((cells as f64) * (1.0 - percentage)).floor() as usize;
    cells - zeroed.min(cells)
}

fn cell_weight(random: bool, rng: &mut impl Rng) -> f64 {
    if random {
        rng.gen()
    } else {
        1.0
    }
}

fn signed(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn normalize_row(row: &mut [f64], terminal: usize) {
    let sum: f64 = row.iter().sum();
    if sum > 0.0 {
        for cell in row.iter_mut() {
            *cell /= sum;
        }
    } else {
        row[terminal] = 1.0;
    }
}
