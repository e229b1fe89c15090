//! Request-scoped data: coordinates, orders, fleet and the cost matrix.

use serde::{Deserialize, Serialize};

/// A `(longitude, latitude)` pair. Serialized as `[lon, lat]`.
pub type Coordinate = (f64, f64);

/// Index of the depot in every location list.
pub const DEPOT: usize = 0;

/// Minutes in one day; the default window spans it.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Time window `[earliest, latest]` in minutes from a shared origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow(pub f64, pub f64);

impl TimeWindow {
    pub fn full_day() -> Self {
        Self(0.0, MINUTES_PER_DAY)
    }

    pub fn earliest(&self) -> f64 {
        self.0
    }

    pub fn latest(&self) -> f64 {
        self.1
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::full_day()
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A single stop as supplied by the request. Element 0 of an order list is the depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub coordinates: Coordinate,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub time_window: TimeWindow,
}

impl Order {
    pub fn new(coordinates: Coordinate) -> Self {
        Self {
            coordinates,
            weight: default_weight(),
            time_window: TimeWindow::full_day(),
        }
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn window(mut self, earliest: f64, latest: f64) -> Self {
        self.time_window = TimeWindow(earliest, latest);
        self
    }
}

/// Vehicles handed to one solve attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleFleet {
    pub count: usize,
    pub capacity: f64,
}

/// Paired distance (meters) and duration (seconds) lookups, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    distances: Vec<i64>,
    durations: Vec<i64>,
}

impl CostMatrix {
    /// All-zero matrix of the given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            distances: vec![0; size * size],
            durations: vec![0; size * size],
        }
    }

    /// Builds a matrix from square row lists. Returns `None` when the shapes disagree.
    pub fn from_rows(distances: Vec<Vec<i64>>, durations: Vec<Vec<i64>>) -> Option<Self> {
        let size = distances.len();
        let square = |rows: &[Vec<i64>]| rows.len() == size && rows.iter().all(|row| row.len() == size);
        if !square(&distances) || !square(&durations) {
            return None;
        }

        Some(Self {
            size,
            distances: distances.into_iter().flatten().collect(),
            durations: durations.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn distance(&self, from: usize, to: usize) -> i64 {
        self.distances[from * self.size + to]
    }

    pub fn duration(&self, from: usize, to: usize) -> i64 {
        self.durations[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, distance: i64, duration: i64) {
        self.distances[from * self.size + to] = distance;
        self.durations[from * self.size + to] = duration;
    }
}
