//! Biological entities: cells, treatments, colonies and the well that
//! holds them.

pub mod cell;
pub mod colony;
pub mod treatment;
pub mod well;

pub use cell::{Cell, CellOutcome, Fate, Movement};
pub use colony::{default_treatment_regimen, Colony, TreatmentRegimen};
pub use treatment::{Treatment, TreatmentParams};
pub use well::Well;

/// Unique cell identifier
pub type CellId = u64;

/// Unique colony identifier
pub type ColonyId = u64;

/// Hands out monotonically increasing ids for cells and colonies.
///
/// One allocator belongs to one simulation, so independent runs (and
/// tests) never share counters.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_cell: CellId,
    next_colony: ColonyId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_cell_id(&mut self) -> CellId {
        let id = self.next_cell;
        self.next_cell += 1;
        id
    }

    pub fn next_colony_id(&mut self) -> ColonyId {
        let id = self.next_colony;
        self.next_colony += 1;
        id
    }

    /// Number of cell ids handed out so far.
    pub fn cells_allocated(&self) -> u64 {
        self.next_cell
    }
}
