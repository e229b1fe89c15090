//! Seams between the planner and its collaborators.
//!
//! The planner only talks to the routing service and the solver through these
//! traits, so tests and alternative backends can stand in for OSRM and for the
//! bundled insertion solver.

use crate::error::{OsrmError, SolverError};
use crate::model::{Coordinate, CostMatrix};
use crate::solver::{Model, SolveOutcome, SolveParams};

/// Provides a distance/duration matrix for a set of locations.
///
/// The matrix is indexed by the provided location order. Implementations must
/// always return a matrix; failures are recovered internally.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> CostMatrix;
}

/// A remote table service that may fail.
pub trait TableService {
    fn table(&self, locations: &[Coordinate]) -> Result<CostMatrix, OsrmError>;
}

/// Point-to-point road geometry.
pub trait RouteService {
    /// Returns the geometry of the best route between two points, or `None`
    /// when the service found no route.
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<Vec<Coordinate>>, OsrmError>;
}

/// A vehicle-routing solver. Stateless: every call receives a complete model.
pub trait VrpSolver {
    fn solve(&self, model: &Model, params: &SolveParams) -> Result<SolveOutcome, SolverError>;
}

impl<T: DistanceMatrixProvider + ?Sized> DistanceMatrixProvider for &T {
    fn matrix_for(&self, locations: &[Coordinate]) -> CostMatrix {
        (**self).matrix_for(locations)
    }
}

impl<T: RouteService + ?Sized> RouteService for &T {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<Vec<Coordinate>>, OsrmError> {
        (**self).route(from, to)
    }
}

impl<T: VrpSolver + ?Sized> VrpSolver for &T {
    fn solve(&self, model: &Model, params: &SolveParams) -> Result<SolveOutcome, SolverError> {
        (**self).solve(model, params)
    }
}
