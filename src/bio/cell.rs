//! Cell structure and behavior.

use crate::bio::{CellId, IdAllocator, Treatment};
use crate::circle::Circle;
use crate::error::{check_range, Result};
use crate::scientific::{bounded_brownian_motion, CellSignal};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// What a cell will do on its next `pass_time` call.
///
/// Decided by [`Cell::set_cell_fate`], executed one tick later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fate {
    #[default]
    Migration,
    Division,
    Death,
}

impl Fate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fate::Migration => "migration",
            Fate::Division => "division",
            Fate::Death => "death",
        }
    }
}

impl fmt::Display for Fate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of displacement, which sets how far a cell may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Up to `max_speed * delta` away
    Migration,
    /// Up to `max_speed * delta / 100` away
    Division,
}

/// Result of executing a cell's decided fate.
#[derive(Debug)]
pub enum CellOutcome {
    /// The cell is dead and must be removed from its colony.
    Died,
    /// The cell is replaced by its two children.
    Divided(Cell, Cell),
    /// The cell moved in place and stays in its colony.
    Migrated,
}

/// A single cell at one point in time and space
#[derive(Debug, Clone)]
pub struct Cell {
    // Identity
    pub id: CellId,
    /// Lineage path, e.g. `1a-3.1.2`
    pub name: String,

    // Physical state
    pub circle: Circle,
    pub max_speed: f64,
    pub seconds_since_birth: u64,
    pub alive: bool,
    pub fate: Fate,

    // Fitness
    pub fitness_memory: f64,
    pub division_threshold: f64,
    pub death_threshold: f64,
    /// Second child inherits from its sister instead of the parent
    pub linked_sister_inheritance: bool,

    pub signal: CellSignal,
    pub treatment: Arc<Treatment>,
}

impl Cell {
    /// Creates a cell at the origin with unit radius and speed, full
    /// fitness memory, a constant signal and thresholds drawn uniformly
    /// from [0, 1].
    pub fn new<R: Rng + ?Sized>(
        id: CellId,
        name: impl Into<String>,
        treatment: Arc<Treatment>,
        rng: &mut R,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            circle: Circle::new(0.0, 0.0, 1.0),
            max_speed: 1.0,
            seconds_since_birth: 0,
            alive: true,
            fate: Fate::Migration,
            fitness_memory: 1.0,
            division_threshold: rng.gen::<f64>(),
            death_threshold: rng.gen::<f64>(),
            linked_sister_inheritance: false,
            signal: CellSignal::default(),
            treatment,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.circle.x = x;
        self.circle.y = y;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.circle.radius = radius;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_signal(mut self, signal: CellSignal) -> Self {
        self.signal = signal;
        self
    }

    pub fn with_linked_sister_inheritance(mut self, linked: bool) -> Self {
        self.linked_sister_inheritance = linked;
        self
    }

    pub fn with_fitness_memory(mut self, fitness_memory: f64) -> Result<Self> {
        self.fitness_memory = check_range("fitness_memory", fitness_memory, 0.0, 1.0)?;
        Ok(self)
    }

    pub fn with_thresholds(mut self, division_threshold: f64, death_threshold: f64) -> Result<Self> {
        self.division_threshold =
            check_range("division_threshold", division_threshold, 0.0, 1.0)?;
        self.death_threshold = check_range("death_threshold", death_threshold, 0.0, 1.0)?;
        Ok(self)
    }

    pub fn x(&self) -> f64 {
        self.circle.x
    }

    pub fn y(&self) -> f64 {
        self.circle.y
    }

    pub fn radius(&self) -> f64 {
        self.circle.radius
    }

    pub fn center(&self) -> (f64, f64) {
        self.circle.center()
    }

    pub fn area(&self) -> f64 {
        self.circle.area()
    }

    pub fn distance_to(&self, other: &Cell) -> f64 {
        self.circle.distance_to(&other.circle)
    }

    pub fn hours_since_birth(&self) -> f64 {
        self.seconds_since_birth as f64 / SECONDS_PER_HOUR
    }

    /// Name up to the first division, e.g. `1b-5.1.2` -> `1b-5`.
    pub fn branch_name(&self) -> &str {
        self.name.split('.').next().unwrap_or("")
    }

    /// Name of the founding colony, e.g. `1b-5.1.2` -> `1b`.
    pub fn colony_name(&self) -> &str {
        self.branch_name().split('-').next().unwrap_or("")
    }

    /// Number of divisions since the root cell of this lineage.
    pub fn generation(&self) -> usize {
        self.name.matches('.').count()
    }

    pub fn signal_value(&self) -> f64 {
        self.signal.value
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Age in hours at the end of the coming tick.
    fn age_after(&self, delta: u64) -> f64 {
        self.hours_since_birth() + delta as f64 / SECONDS_PER_HOUR
    }

    pub fn calculate_division_chance(&self, delta: u64) -> f64 {
        self.treatment.division_chance(self.age_after(delta))
    }

    pub fn calculate_death_chance(&self, delta: u64) -> f64 {
        self.treatment.death_chance(self.age_after(delta))
    }

    pub fn should_die(&self, delta: u64) -> bool {
        self.calculate_death_chance(delta) > self.death_threshold
    }

    pub fn should_divide(&self, delta: u64) -> bool {
        self.calculate_division_chance(delta) > self.division_threshold
    }

    /// Decides the fate for the next tick. Death takes precedence over
    /// division, division over migration.
    pub fn set_cell_fate(&mut self, delta: u64) {
        self.fate = if self.should_die(delta) {
            Fate::Death
        } else if self.should_divide(delta) {
            Fate::Division
        } else {
            Fate::Migration
        };
    }

    /// Executes the fate decided by the last [`Cell::set_cell_fate`] call.
    ///
    /// Surviving cells (migrated or newborn) have their signal advanced to
    /// `current_seconds`.
    pub fn pass_time<R: Rng + ?Sized>(
        &mut self,
        delta: u64,
        current_seconds: u64,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> CellOutcome {
        match self.fate {
            Fate::Death => {
                self.die();
                CellOutcome::Died
            }
            Fate::Division => {
                let (mut first, mut second) = self.divide(delta, ids, rng);
                first.signal.oscillate(current_seconds, rng);
                second.signal.oscillate(current_seconds, rng);
                CellOutcome::Divided(first, second)
            }
            Fate::Migration => {
                self.migrate(delta, rng);
                self.signal.oscillate(current_seconds, rng);
                CellOutcome::Migrated
            }
        }
    }

    pub fn die(&mut self) {
        self.alive = false;
    }

    /// Creates the two children `{name}.1` and `{name}.2`.
    pub fn divide<R: Rng + ?Sized>(
        &self,
        delta: u64,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> (Cell, Cell) {
        let first_fitness = self.get_child_fitness(rng);
        let second_fitness = if self.linked_sister_inheritance {
            self.inherit_fitness(first_fitness, rng)
        } else {
            self.get_child_fitness(rng)
        };
        let first = self.child(ids.next_cell_id(), '1', first_fitness, delta, rng);
        let second = self.child(ids.next_cell_id(), '2', second_fitness, delta, rng);
        (first, second)
    }

    fn child<R: Rng + ?Sized>(
        &self,
        id: CellId,
        suffix: char,
        (division_threshold, death_threshold): (f64, f64),
        delta: u64,
        rng: &mut R,
    ) -> Cell {
        let (x, y) = self.get_new_xy_coordinates(delta, Movement::Division, rng);
        Cell {
            id,
            name: format!("{}.{}", self.name, suffix),
            circle: Circle::new(x, y, self.circle.radius),
            max_speed: self.max_speed,
            seconds_since_birth: 0,
            alive: true,
            fate: Fate::Migration,
            fitness_memory: self.fitness_memory,
            division_threshold,
            death_threshold,
            linked_sister_inheritance: self.linked_sister_inheritance,
            signal: self.signal.split(),
            treatment: Arc::clone(&self.treatment),
        }
    }

    /// Perturbed `(division_threshold, death_threshold)` for a child.
    pub fn get_child_fitness<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        self.inherit_fitness((self.division_threshold, self.death_threshold), rng)
    }

    fn inherit_fitness<R: Rng + ?Sized>(
        &self,
        (division_threshold, death_threshold): (f64, f64),
        rng: &mut R,
    ) -> (f64, f64) {
        let scale = self.fitness_memory;
        (
            bounded_brownian_motion(division_threshold, scale, 0.0, 1.0, rng),
            bounded_brownian_motion(death_threshold, scale, 0.0, 1.0, rng),
        )
    }

    /// Uniform random point around the current position.
    pub fn get_new_xy_coordinates<R: Rng + ?Sized>(
        &self,
        delta: u64,
        movement: Movement,
        rng: &mut R,
    ) -> (f64, f64) {
        let reach = self.max_speed * delta as f64;
        let search_radius = match movement {
            Movement::Migration => reach,
            Movement::Division => reach / 100.0,
        };
        Circle::new(self.circle.x, self.circle.y, search_radius).random_point(rng)
    }

    /// Moves the cell in place and ages it by `delta` seconds.
    pub fn migrate<R: Rng + ?Sized>(&mut self, delta: u64, rng: &mut R) {
        let (x, y) = self.get_new_xy_coordinates(delta, Movement::Migration, rng);
        self.circle.x = x;
        self.circle.y = y;
        self.seconds_since_birth += delta;
    }
}
