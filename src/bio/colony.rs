//! Colonies: groups of cells descending from the same seed cells and
//! sharing one treatment regimen.

use crate::bio::{Cell, CellOutcome, ColonyId, IdAllocator, Treatment};
use crate::error::Result;
use crate::scientific::CellSignal;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Treatments keyed by the frame at which they take effect.
pub type TreatmentRegimen = BTreeMap<u64, Arc<Treatment>>;

/// Regimen with the control treatment from frame 0.
pub fn default_treatment_regimen() -> TreatmentRegimen {
    BTreeMap::from([(0, Arc::new(Treatment::control()))])
}

#[derive(Debug, Clone)]
pub struct Colony {
    pub id: ColonyId,
    pub cells: Vec<Cell>,
    pub treatment_regimen: TreatmentRegimen,
    pub seconds_since_birth: u64,
}

impl Colony {
    pub fn new(id: ColonyId, cells: Vec<Cell>, treatment_regimen: TreatmentRegimen) -> Self {
        Self {
            id,
            cells,
            treatment_regimen,
            seconds_since_birth: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Colony name taken from the first cell, `None` when empty.
    pub fn name(&self) -> Option<&str> {
        self.cells.first().map(Cell::colony_name)
    }

    /// Mean position of all cells.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.cells.is_empty() {
            return None;
        }
        let n = self.cells.len() as f64;
        let (sx, sy) = self
            .cells
            .iter()
            .fold((0.0, 0.0), |(sx, sy), cell| (sx + cell.x(), sy + cell.y()));
        Some((sx / n, sy / n))
    }

    pub fn is_dead(&self) -> bool {
        self.cells.iter().all(|cell| !cell.alive)
    }

    /// Mean signal value; 0 for an empty colony.
    pub fn signal_mean(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(Cell::signal_value).sum::<f64>() / self.cells.len() as f64
    }

    /// Population standard deviation of signal values; 0 for an empty colony.
    pub fn signal_std(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let mean = self.signal_mean();
        let variance = self
            .cells
            .iter()
            .map(|cell| (cell.signal_value() - mean).powi(2))
            .sum::<f64>()
            / self.cells.len() as f64;
        variance.sqrt()
    }

    /// Executes every cell's decided fate and rebuilds the cell list:
    /// survivors keep their order, children are appended after them.
    pub fn pass_time<R: Rng + ?Sized>(
        &mut self,
        delta: u64,
        current_seconds: u64,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) {
        let previous = std::mem::take(&mut self.cells);
        let mut survivors = Vec::with_capacity(previous.len());
        let mut born = Vec::new();
        for mut cell in previous {
            match cell.pass_time(delta, current_seconds, ids, rng) {
                CellOutcome::Died => {}
                CellOutcome::Divided(first, second) => {
                    born.push(first);
                    born.push(second);
                }
                CellOutcome::Migrated => survivors.push(cell),
            }
        }
        survivors.append(&mut born);
        self.cells = survivors;
        self.seconds_since_birth += delta;
    }

    /// Switches every cell to the treatment scheduled for `current_frame`,
    /// if any. Returns whether a switch happened.
    pub fn attempt_treatment_change<R: Rng + ?Sized>(
        &mut self,
        current_frame: u64,
        rng: &mut R,
    ) -> Result<bool> {
        let Some(treatment) = self.treatment_regimen.get(&current_frame) else {
            return Ok(false);
        };
        let treatment = Arc::clone(treatment);
        for cell in &mut self.cells {
            cell.treatment = Arc::clone(&treatment);
            if let Some(params) = &treatment.signal_disturbance {
                cell.signal = CellSignal::from_params(params, rng)?;
            }
            if let Some(fitness_memory) = treatment.fitness_memory_disturbance {
                cell.fitness_memory = fitness_memory;
            }
        }
        log::debug!(
            "Colony {} switched to treatment '{}' at frame {}",
            self.id,
            treatment.name,
            current_frame
        );
        Ok(true)
    }
}

impl<'a> IntoIterator for &'a Colony {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
