//! Polyline representation for route geometries.
//!
//! Points are decoded `(longitude, latitude)` pairs, the order OSRM returns
//! in GeoJSON geometries and the order the plan response uses.

use serde::{Deserialize, Serialize};

use crate::model::Coordinate;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a road segment found at `position` within its route.
    ///
    /// Every segment after the first starts where the previous one ended, so
    /// its first point is dropped when it has more than one. The rule depends
    /// on position only, not on whether earlier segments were found.
    pub fn append_segment(&mut self, position: usize, segment: Vec<Coordinate>) {
        let skip = usize::from(position > 0 && segment.len() > 1);
        self.points.extend(segment.into_iter().skip(skip));
    }
}
