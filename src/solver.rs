//! Solver model construction and invocation.
//!
//! The model mirrors what a general vehicle-routing solver consumes: one
//! vehicle type, one depot, clients with demand and windows, and a complete
//! directed edge set. Units: windows and service durations are minutes, edge
//! durations are seconds (solvers convert them to minutes before comparing
//! against windows), edge distances are meters.

use std::time::Duration;

use tracing::info;

use crate::error::SolverError;
use crate::model::{Coordinate, CostMatrix, Order, TimeWindow, VehicleFleet};
use crate::traits::VrpSolver;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Service time at every client, in minutes.
    pub service_minutes: f64,
    /// Opening hours of the depot, in minutes.
    pub depot_window: TimeWindow,
    /// Wall-clock budget handed to the solver.
    pub max_runtime: Duration,
    /// Fixed seed so repeated requests produce the same plan.
    pub seed: u64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            service_minutes: 15.0,
            depot_window: TimeWindow::full_day(),
            max_runtime: Duration::from_secs(30),
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleType {
    pub num_available: usize,
    pub capacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Depot {
    pub location: Coordinate,
    pub time_window: TimeWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Client {
    pub location: Coordinate,
    pub delivery: f64,
    pub time_window: TimeWindow,
    pub service_duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub distance: i64,
    pub duration: i64,
}

/// Solver input. Location 0 is the depot, location `k` is `clients[k - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub vehicle_type: VehicleType,
    pub depot: Depot,
    pub clients: Vec<Client>,
    pub edges: Vec<Edge>,
}

impl Model {
    pub fn num_locations(&self) -> usize {
        self.clients.len() + 1
    }
}

#[derive(Debug, Clone)]
pub struct SolveParams {
    pub max_runtime: Duration,
    pub seed: u64,
}

/// A feasible assignment. One route per available vehicle, possibly empty,
/// holding location indices without depot bookends.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub routes: Vec<Vec<usize>>,
    pub cost: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Feasible(Solution),
    Infeasible { iterations: usize },
}

impl SolveOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, SolveOutcome::Feasible(_))
    }
}

/// Builds a full model for `fleet`. `orders[0]` is the depot.
pub fn build_model(
    matrix: &CostMatrix,
    orders: &[Order],
    fleet: VehicleFleet,
    options: &SolveOptions,
) -> Model {
    let depot = Depot {
        location: orders.first().map(|order| order.coordinates).unwrap_or_default(),
        time_window: options.depot_window,
    };

    let clients = orders
        .iter()
        .skip(1)
        .map(|order| Client {
            location: order.coordinates,
            delivery: order.weight,
            time_window: order.time_window,
            service_duration: options.service_minutes,
        })
        .collect();

    let n = matrix.size();
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1));
    for from in 0..n {
        for to in 0..n {
            if from != to {
                edges.push(Edge {
                    from,
                    to,
                    distance: matrix.distance(from, to),
                    duration: matrix.duration(from, to),
                });
            }
        }
    }

    Model {
        vehicle_type: VehicleType {
            num_available: fleet.count,
            capacity: fleet.capacity,
        },
        depot,
        clients,
        edges,
    }
}

/// Rebuilds the model for `fleet` and runs one bounded solve.
pub fn solve_with_fleet<S: VrpSolver>(
    solver: &S,
    matrix: &CostMatrix,
    orders: &[Order],
    fleet: VehicleFleet,
    options: &SolveOptions,
) -> Result<SolveOutcome, SolverError> {
    let model = build_model(matrix, orders, fleet, options);
    let params = SolveParams {
        max_runtime: options.max_runtime,
        seed: options.seed,
    };

    info!(
        vehicles = fleet.count,
        capacity = fleet.capacity,
        clients = model.clients.len(),
        budget_secs = params.max_runtime.as_secs_f64(),
        "solving"
    );

    let outcome = solver.solve(&model, &params)?;
    match &outcome {
        SolveOutcome::Feasible(solution) => info!(
            vehicles = fleet.count,
            cost = solution.cost,
            iterations = solution.iterations,
            "solver found a feasible solution"
        ),
        SolveOutcome::Infeasible { iterations } => {
            info!(vehicles = fleet.count, iterations, "solver found no feasible solution")
        }
    }

    Ok(outcome)
}
