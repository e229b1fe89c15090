//! Planar distance matrix provider (fallback when OSRM is unavailable).
//!
//! Treats coordinates as a flat plane where one degree is a fixed number of
//! meters, and estimates travel time from an assumed constant speed. Far less
//! accurate than OSRM, but pure and always available.

use crate::model::{Coordinate, CostMatrix};
use crate::traits::DistanceMatrixProvider;

/// Meters per degree of arc, used for both axes.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Assumed driving speed, ~50 km/h.
const DEFAULT_SPEED_MPS: f64 = 13.9;

#[derive(Debug, Clone)]
pub struct PlanarMatrix {
    pub meters_per_degree: f64,
    /// Assumed average driving speed in meters per second.
    pub speed_mps: f64,
}

impl Default for PlanarMatrix {
    fn default() -> Self {
        Self {
            meters_per_degree: METERS_PER_DEGREE,
            speed_mps: DEFAULT_SPEED_MPS,
        }
    }
}

impl PlanarMatrix {
    /// Euclidean distance between two points, scaled to meters (not truncated).
    fn planar_meters(&self, from: Coordinate, to: Coordinate) -> f64 {
        let (lon1, lat1) = from;
        let (lon2, lat2) = to;
        ((lat2 - lat1).powi(2) + (lon2 - lon1).powi(2)).sqrt() * self.meters_per_degree
    }

    fn meters_to_seconds(&self, meters: f64) -> i64 {
        (meters / self.speed_mps) as i64
    }
}

impl DistanceMatrixProvider for PlanarMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> CostMatrix {
        let n = locations.len();
        let mut matrix = CostMatrix::zeros(n);

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate() {
                if i != j {
                    let meters = self.planar_meters(*from, *to);
                    matrix.set(i, j, meters as i64, self.meters_to_seconds(meters));
                }
            }
        }

        matrix
    }
}
