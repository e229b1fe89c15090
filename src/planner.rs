//! Request orchestration: matrix, fleet sizing with one escalation, solve,
//! reconstruction, geometry and assembly.

use tracing::{debug, info, warn};

use crate::baseline::InsertionSolver;
use crate::config::PlannerConfig;
use crate::error::{OsrmError, PlanError};
use crate::fleet::FleetSizing;
use crate::geometry::{SegmentBudget, stitch_route};
use crate::matrix::FallbackMatrix;
use crate::model::{Coordinate, CostMatrix, VehicleFleet};
use crate::osrm::OsrmClient;
use crate::plan::{Plan, assemble};
use crate::polyline::Polyline;
use crate::reconstruct::reconstruct;
use crate::request::PlanRequest;
use crate::solver::{SolveOptions, SolveOutcome, Solution, solve_with_fleet};
use crate::traits::{DistanceMatrixProvider, RouteService, VrpSolver};

/// The production wiring: OSRM with planar fallback and the bundled solver.
pub type OsrmPlanner = Planner<FallbackMatrix<OsrmClient>, OsrmClient, InsertionSolver>;

pub struct Planner<M, R, S> {
    matrix: M,
    routes: R,
    solver: S,
    config: PlannerConfig,
}

impl OsrmPlanner {
    pub fn from_config(config: PlannerConfig) -> Result<Self, OsrmError> {
        let client = OsrmClient::new(config.osrm.clone())?;
        Ok(Planner::new(
            FallbackMatrix::new(client.clone()),
            client,
            InsertionSolver::default(),
            config,
        ))
    }
}

impl<M, R, S> Planner<M, R, S>
where
    M: DistanceMatrixProvider,
    R: RouteService + Sync,
    S: VrpSolver,
{
    pub fn new(matrix: M, routes: R, solver: S, config: PlannerConfig) -> Self {
        Self {
            matrix,
            routes,
            solver,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(&self, request: &PlanRequest) -> Result<Plan, PlanError> {
        request.validate()?;

        let sizing = FleetSizing::new(request.total_demand(), request.vehicle_capacity, request.num_vehicles);
        info!(
            total_demand = request.total_demand(),
            capacity = request.vehicle_capacity,
            requested = sizing.requested,
            optimal = sizing.optimal,
            "fleet sizing"
        );
        if sizing.requested > sizing.optimal {
            info!(
                requested = sizing.requested,
                using = sizing.optimal,
                "reducing fleet to the demand lower bound"
            );
        }

        let coordinates = request.coordinates();
        let matrix = self.matrix.matrix_for(&coordinates);
        if matrix.size() != coordinates.len() {
            return Err(PlanError::Unexpected(format!(
                "matrix has {} locations, expected {}",
                matrix.size(),
                coordinates.len()
            )));
        }

        let options = self.config.solve_options();
        let (fleet_size, solution) = self.solve(request, &matrix, sizing, &options)?;

        let budget = SegmentBudget::new(self.config.max_geometry_segments);
        let mut routes = Vec::with_capacity(fleet_size);
        for (vehicle, raw) in solution.routes.iter().enumerate() {
            debug!(vehicle = vehicle + 1, raw = ?raw, "raw route");
            let route = reconstruct(raw, &matrix, &request.orders, options.service_minutes)?;
            let stops: Vec<Coordinate> = route.stops.iter().map(|&i| coordinates[i]).collect();
            // an unused [0, 0] route has no road to trace, so it costs no lookups
            let geometry = if route.is_used() {
                stitch_route(&self.routes, &stops, &budget)
            } else {
                Polyline::default()
            };
            debug!(
                vehicle = vehicle + 1,
                stops = ?route.stops,
                clients = route.num_clients(),
                geometry_points = geometry.len(),
                "reconstructed route"
            );
            routes.push((route, geometry));
        }

        let plan = assemble(&request.orders, routes, fleet_size, request.vehicle_capacity, &solution);
        info!(
            routes = plan.num_routes,
            used = plan.vehicle_info.used,
            total_distance = plan.statistics.total_distance,
            total_duration = plan.statistics.total_duration,
            "plan ready"
        );

        Ok(plan)
    }

    /// Solves at the initial fleet size and, if that was the lower bound and
    /// proved infeasible, once more with one extra vehicle.
    fn solve(
        &self,
        request: &PlanRequest,
        matrix: &CostMatrix,
        sizing: FleetSizing,
        options: &SolveOptions,
    ) -> Result<(usize, Solution), PlanError> {
        let mut fleet = VehicleFleet {
            count: sizing.initial(),
            capacity: request.vehicle_capacity,
        };

        loop {
            match solve_with_fleet(&self.solver, matrix, &request.orders, fleet, options)? {
                SolveOutcome::Feasible(mut solution) => {
                    // solvers may leave out vehicles without stops
                    if solution.routes.len() < fleet.count {
                        solution.routes.resize(fleet.count, Vec::new());
                    }
                    if solution.routes.len() > fleet.count {
                        return Err(PlanError::Unexpected(format!(
                            "solver returned {} routes for {} vehicles",
                            solution.routes.len(),
                            fleet.count
                        )));
                    }
                    return Ok((fleet.count, solution));
                }
                SolveOutcome::Infeasible { .. } => match sizing.escalate(fleet.count) {
                    Some(next) => {
                        warn!(from = fleet.count, to = next, "infeasible, retrying with one more vehicle");
                        fleet.count = next;
                    }
                    None => {
                        warn!(vehicles = fleet.count, "infeasible, no further escalation");
                        return Err(PlanError::Infeasible { vehicles: fleet.count });
                    }
                },
            }
        }
    }
}
