//! Builds the initial well and colonies from configuration.

use crate::bio::{default_treatment_regimen, Cell, Colony, IdAllocator, Treatment, TreatmentRegimen, Well};
use crate::config::{CellSpec, ColonySpec, WellConfig};
use crate::error::Result;
use crate::scientific::CellSignal;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Creates the seed colonies described by a list of [`ColonySpec`]s.
pub struct ColonyLoader<'a> {
    specs: &'a [ColonySpec],
}

impl<'a> ColonyLoader<'a> {
    pub fn new(specs: &'a [ColonySpec]) -> Self {
        Self { specs }
    }

    /// Expands every spec into `copies` colonies of `initial_size` cells.
    ///
    /// Cells are named `{spec index}{copy label}-{cell index}`, e.g. the
    /// third cell of the second copy of the first spec is `1b-3`.
    pub fn load<R: Rng + ?Sized>(&self, ids: &mut IdAllocator, rng: &mut R) -> Result<Vec<Colony>> {
        let mut colonies = Vec::new();
        // Seed cells run under control until frame 0 applies the regimen.
        let control = Arc::new(Treatment::control());
        for (index, spec) in self.specs.iter().enumerate() {
            let regimen = Self::treatment_regimen(spec, rng)?;
            for copy in 0..spec.copies {
                let label = copy_label(copy);
                let mut cells = Vec::with_capacity(spec.initial_size);
                for n in 1..=spec.initial_size {
                    let name = format!("{}{}-{}", index + 1, label, n);
                    cells.push(Self::create_cell(&spec.cells, name, &control, ids, rng)?);
                }
                colonies.push(Colony::new(ids.next_colony_id(), cells, regimen.clone()));
            }
        }
        log::debug!("Loaded {} colonies from {} specs", colonies.len(), self.specs.len());
        Ok(colonies)
    }

    /// Shared regimen for all copies of one spec. A spec without
    /// treatments gets the control regimen.
    fn treatment_regimen<R: Rng + ?Sized>(spec: &ColonySpec, rng: &mut R) -> Result<TreatmentRegimen> {
        if spec.treatment_data.is_empty() {
            return Ok(default_treatment_regimen());
        }
        let mut regimen = BTreeMap::new();
        for (frame, params) in &spec.treatment_data {
            regimen.insert(*frame, Arc::new(Treatment::from_params(params, rng)?));
        }
        Ok(regimen)
    }

    fn create_cell<R: Rng + ?Sized>(
        cells: &CellSpec,
        name: String,
        treatment: &Arc<Treatment>,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Result<Cell> {
        let signal = match &cells.signal {
            Some(params) => CellSignal::from_params(params, rng)?,
            None => CellSignal::default(),
        };
        Ok(Cell::new(ids.next_cell_id(), name, Arc::clone(treatment), rng)
            .with_radius(cells.radius)
            .with_max_speed(cells.max_speed)
            .with_signal(signal)
            .with_linked_sister_inheritance(cells.linked_sister_inheritance)
            .with_fitness_memory(cells.fitness_memory)?)
    }
}

/// `a, b, ..., z, aa, ab, ...` for copy index 0, 1, ...
pub fn copy_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Creates the well: a circle of radius `well_radius` centred at
/// `(well_radius, well_radius)`, so the whole well sits in the positive
/// quadrant.
pub struct WellLoader;

impl WellLoader {
    pub fn load(config: &WellConfig) -> Well {
        let r = config.well_radius;
        Well::new(r, r, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CellSpec;
    use crate::scientific::{CurveParams, SignalName, SignalParams};
    use crate::bio::TreatmentParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_copy_labels() {
        assert_eq!(copy_label(0), "a");
        assert_eq!(copy_label(25), "z");
        assert_eq!(copy_label(26), "aa");
        assert_eq!(copy_label(27), "ab");
        assert_eq!(copy_label(51), "az");
        assert_eq!(copy_label(52), "ba");
        assert_eq!(copy_label(701), "zz");
        assert_eq!(copy_label(702), "aaa");
    }

    #[test]
    fn test_well_loader_centres_well() {
        let well = WellLoader::load(&WellConfig { well_radius: 250.0 });
        assert_eq!(well.circle.center(), (250.0, 250.0));
        assert_eq!(well.circle.radius, 250.0);
        assert!(well.is_empty());
    }

    #[test]
    fn test_colony_names_and_sizes() {
        let specs = vec![
            ColonySpec {
                copies: 2,
                initial_size: 3,
                ..ColonySpec::default()
            },
            ColonySpec::default(),
        ];
        let mut ids = IdAllocator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let colonies = ColonyLoader::new(&specs).load(&mut ids, &mut rng).unwrap();
        assert_eq!(colonies.len(), 3);

        let names: Vec<Vec<&str>> = colonies
            .iter()
            .map(|colony| colony.iter().map(|cell| cell.name.as_str()).collect())
            .collect();
        assert_eq!(names[0], ["1a-1", "1a-2", "1a-3"]);
        assert_eq!(names[1], ["1b-1", "1b-2", "1b-3"]);
        assert_eq!(names[2], ["2a-1"]);
        assert_eq!(colonies[1].name(), Some("1b"));
        assert_eq!(colonies.iter().map(|c| c.id).collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(ids.cells_allocated(), 7);
    }

    #[test]
    fn test_cell_spec_is_applied() {
        let specs = vec![ColonySpec {
            cells: CellSpec {
                radius: 12.0,
                max_speed: 0.3,
                fitness_memory: 0.6,
                linked_sister_inheritance: true,
                signal: Some(SignalParams {
                    name: SignalName::Constant,
                    initial_value: Some(0.25),
                    ..SignalParams::default()
                }),
            },
            ..ColonySpec::default()
        }];
        let mut ids = IdAllocator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let colonies = ColonyLoader::new(&specs).load(&mut ids, &mut rng).unwrap();
        let cell = &colonies[0].cells[0];
        assert_eq!(cell.radius(), 12.0);
        assert_eq!(cell.max_speed, 0.3);
        assert_eq!(cell.fitness_memory, 0.6);
        assert!(cell.linked_sister_inheritance);
        assert_eq!(cell.signal_value(), 0.25);
        assert!((0.0..=1.0).contains(&cell.division_threshold));
    }

    #[test]
    fn test_copies_share_regimen() {
        let mut treatment_data = BTreeMap::new();
        treatment_data.insert(
            0,
            TreatmentParams {
                name: "Early".to_string(),
                ..TreatmentParams::default()
            },
        );
        treatment_data.insert(
            10,
            TreatmentParams {
                name: "Late".to_string(),
                death_curve: CurveParams::gaussian(5.0, 1.0),
                ..TreatmentParams::default()
            },
        );
        let specs = vec![ColonySpec {
            copies: 2,
            treatment_data,
            ..ColonySpec::default()
        }];
        let mut ids = IdAllocator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let colonies = ColonyLoader::new(&specs).load(&mut ids, &mut rng).unwrap();
        let (a, b) = (&colonies[0].treatment_regimen, &colonies[1].treatment_regimen);
        assert_eq!(a.keys().copied().collect::<Vec<_>>(), [0, 10]);
        assert!(Arc::ptr_eq(&a[&10], &b[&10]));
        assert_eq!(a[&10].name, "Late");
    }

    #[test]
    fn test_empty_regimen_falls_back_to_control() {
        let specs = vec![ColonySpec::default()];
        let mut ids = IdAllocator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let colonies = ColonyLoader::new(&specs).load(&mut ids, &mut rng).unwrap();
        assert_eq!(colonies[0].treatment_regimen[&0].name, "Control");
    }
}
