//! Circle geometry shared by cells and wells.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A circle in the plane, in micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    /// `(x, y)` of the centre
    pub fn center(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// Euclidean distance between the two centres.
    pub fn distance_to(&self, other: &Circle) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn overlaps_with(&self, other: &Circle) -> bool {
        self.radius + other.radius >= self.distance_to(other)
    }

    /// True if `other` lies entirely inside this circle.
    pub fn contains(&self, other: &Circle) -> bool {
        self.radius >= self.distance_to(other) + other.radius
    }

    /// Uniformly distributed point inside the disk.
    ///
    /// Taking the square root of the radial draw keeps the density uniform
    /// over the area instead of clustering points at the centre.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        let r = self.radius * rng.gen::<f64>().sqrt();
        let theta = rng.gen::<f64>() * 2.0 * PI;
        (self.x + r * theta.cos(), self.y + r * theta.sin())
    }
}
