//! The well: the spatial container holding every colony.

use crate::bio::{Cell, Colony, IdAllocator};
use crate::circle::Circle;
use crate::error::Result;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Well {
    pub circle: Circle,
    pub colonies: Vec<Colony>,
}

impl Well {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            circle: Circle::new(x, y, radius),
            colonies: Vec::new(),
        }
    }

    /// Number of colonies
    pub fn len(&self) -> usize {
        self.colonies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colonies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Colony> {
        self.colonies.iter()
    }

    /// All cells across all colonies.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.colonies.iter().flat_map(|colony| colony.iter())
    }

    pub fn cell_count(&self) -> usize {
        self.colonies.iter().map(Colony::len).sum()
    }

    pub fn colony_sizes(&self) -> Vec<usize> {
        self.colonies.iter().map(Colony::len).collect()
    }

    /// `None` when there are no colonies.
    pub fn largest_colony_size(&self) -> Option<usize> {
        self.colonies.iter().map(Colony::len).max()
    }

    /// Places each colony at a random point inside the well and adds it.
    pub fn set_initial_colonies<R: Rng + ?Sized>(&mut self, colonies: Vec<Colony>, rng: &mut R) {
        for mut colony in colonies {
            self.place_colony_inside(&mut colony, rng);
            self.add_colony(colony);
        }
    }

    /// Picks a colony centre inside the well and scatters the cells around
    /// it, each offset by a hundredth of another random well point.
    pub fn place_colony_inside<R: Rng + ?Sized>(&self, colony: &mut Colony, rng: &mut R) {
        let (colony_x, colony_y) = self.circle.random_point(rng);
        for cell in &mut colony.cells {
            let (jitter_x, jitter_y) = self.circle.random_point(rng);
            cell.circle.x = colony_x + jitter_x / 100.0;
            cell.circle.y = colony_y + jitter_y / 100.0;
        }
    }

    pub fn add_colony(&mut self, colony: Colony) {
        self.colonies.push(colony);
    }

    /// Decision phase: every cell picks its fate from the current state.
    pub fn set_cell_fate(&mut self, delta: u64) {
        for colony in &mut self.colonies {
            for cell in &mut colony.cells {
                cell.set_cell_fate(delta);
            }
        }
    }

    /// Execution phase: advances every colony, then drops dead ones.
    pub fn pass_time<R: Rng + ?Sized>(
        &mut self,
        delta: u64,
        current_seconds: u64,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) {
        for colony in &mut self.colonies {
            colony.pass_time(delta, current_seconds, ids, rng);
        }
        let before = self.colonies.len();
        self.colonies.retain(|colony| !colony.is_dead());
        let removed = before - self.colonies.len();
        if removed > 0 {
            log::debug!("{} colonies died out at t={}s", removed, current_seconds);
        }
    }

    pub fn modify_colony_treatment_regimens<R: Rng + ?Sized>(
        &mut self,
        current_frame: u64,
        rng: &mut R,
    ) -> Result<()> {
        for colony in &mut self.colonies {
            colony.attempt_treatment_change(current_frame, rng)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Well {
    type Item = &'a Colony;
    type IntoIter = std::slice::Iter<'a, Colony>;

    fn into_iter(self) -> Self::IntoIter {
        self.colonies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::{default_treatment_regimen, Fate, Treatment};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(21)
    }

    fn colony(ids: &mut IdAllocator, label: &str, size: usize, rng: &mut ChaCha8Rng) -> Colony {
        let treatment = Arc::new(Treatment::control());
        let cells = (0..size)
            .map(|n| Cell::new(ids.next_cell_id(), format!("{}-{}", label, n + 1), Arc::clone(&treatment), rng))
            .collect();
        Colony::new(ids.next_colony_id(), cells, default_treatment_regimen())
    }

    #[test]
    fn test_empty_well_queries() {
        let well = Well::new(0.0, 0.0, 10.0);
        assert!(well.is_empty());
        assert_eq!(well.cell_count(), 0);
        assert!(well.colony_sizes().is_empty());
        assert_eq!(well.largest_colony_size(), None);
    }

    #[test]
    fn test_initial_colonies_are_placed_inside() {
        let mut rng = rng();
        let mut ids = IdAllocator::new();
        let mut well = Well::new(100.0, 100.0, 100.0);
        let colonies = vec![colony(&mut ids, "1a", 3, &mut rng), colony(&mut ids, "1b", 5, &mut rng)];
        well.set_initial_colonies(colonies, &mut rng);

        assert_eq!(well.len(), 2);
        assert_eq!(well.colony_sizes(), vec![3, 5]);
        assert_eq!(well.largest_colony_size(), Some(5));
        for colony in &well {
            let center = colony.center().unwrap();
            for cell in colony {
                // colony centre within the well, jitter at most 1/100 of a well point
                assert!((cell.x() - center.0).abs() <= 4.0);
                assert!((cell.y() - center.1).abs() <= 4.0);
                assert!(well.circle.distance_to(&cell.circle) <= 100.0 + 3.0);
            }
        }
    }

    #[test]
    fn test_dead_colonies_are_dropped() {
        let mut rng = rng();
        let mut ids = IdAllocator::new();
        let mut well = Well::new(0.0, 0.0, 10.0);
        well.add_colony(colony(&mut ids, "1a", 2, &mut rng));
        well.add_colony(colony(&mut ids, "1b", 2, &mut rng));
        for cell in &mut well.colonies[0].cells {
            cell.fate = Fate::Death;
        }
        well.pass_time(60, 60, &mut ids, &mut rng);
        assert_eq!(well.len(), 1);
        assert_eq!(well.colonies[0].name(), Some("1b"));
    }

    #[test]
    fn test_set_cell_fate_reaches_every_cell() {
        let mut rng = rng();
        let mut ids = IdAllocator::new();
        let mut well = Well::new(0.0, 0.0, 10.0);
        well.add_colony(colony(&mut ids, "1a", 3, &mut rng));
        well.add_colony(colony(&mut ids, "2a", 3, &mut rng));
        for colony in &mut well.colonies {
            for cell in &mut colony.cells {
                cell.death_threshold = -0.1;
            }
        }
        well.set_cell_fate(60);
        assert!(well.cells().all(|cell| cell.fate == Fate::Death));
        assert_eq!(well.cell_count(), 6);
    }
}
