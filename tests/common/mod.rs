//! Shared fixtures for planner integration tests.
//!
//! Provides scripted collaborators (solver, route service, matrix provider)
//! that record how they were called, plus a few small delivery scenarios.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use delivery_planner::config::PlannerConfig;
use delivery_planner::error::{OsrmError, SolverError};
use delivery_planner::fallback::PlanarMatrix;
use delivery_planner::model::{Coordinate, CostMatrix, Order};
use delivery_planner::solver::{Model, SolveOutcome, SolveParams, Solution};
use delivery_planner::traits::{DistanceMatrixProvider, RouteService, VrpSolver};

// ============================================================================
// Solver
// ============================================================================

/// Returns pre-scripted outcomes in order and records every model it saw.
pub struct ScriptedSolver {
    outcomes: Mutex<VecDeque<Result<SolveOutcome, SolverError>>>,
    pub calls: Mutex<Vec<(Model, SolveParams)>>,
}

impl ScriptedSolver {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn then_feasible(self, routes: Vec<Vec<usize>>) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(SolveOutcome::Feasible(Solution {
            routes,
            cost: 1000.0,
            iterations: 10,
        })));
        self
    }

    pub fn then_infeasible(self) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(SolveOutcome::Infeasible { iterations: 10 }));
        self
    }

    pub fn then_error(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(SolverError::InvalidModel(message.to_string())));
        self
    }

    /// Fleet sizes passed to each invocation, in order.
    pub fn fleet_sizes(&self) -> Vec<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.vehicle_type.num_available)
            .collect()
    }
}

impl VrpSolver for ScriptedSolver {
    fn solve(&self, model: &Model, params: &SolveParams) -> Result<SolveOutcome, SolverError> {
        self.calls.lock().unwrap().push((model.clone(), params.clone()));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("solver called more often than scripted")
    }
}

// ============================================================================
// Routing service
// ============================================================================

/// Answers every segment with a straight two-point line.
pub struct StraightRoutes {
    pub calls: AtomicUsize,
}

impl StraightRoutes {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteService for StraightRoutes {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<Vec<Coordinate>>, OsrmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(vec![from, to]))
    }
}

/// Fails every segment lookup.
pub struct DownRoutes;

impl RouteService for DownRoutes {
    fn route(&self, _from: Coordinate, _to: Coordinate) -> Result<Option<Vec<Coordinate>>, OsrmError> {
        Err(OsrmError::IncompleteResponse)
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// Planar matrix that counts requests.
pub struct CountingMatrix {
    pub calls: AtomicUsize,
}

impl CountingMatrix {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DistanceMatrixProvider for CountingMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> CostMatrix {
        self.calls.fetch_add(1, Ordering::SeqCst);
        PlanarMatrix::default().matrix_for(locations)
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// Config with a short solve budget so tests stay fast.
pub fn test_config() -> PlannerConfig {
    PlannerConfig {
        solve_budget_secs: 2,
        ..PlannerConfig::default()
    }
}

/// Depot at the origin with clients spread over a few kilometers.
pub fn neighbourhood(weights: &[f64]) -> Vec<Order> {
    let mut orders = vec![Order::new((0.0, 0.0))];
    for (i, &weight) in weights.iter().enumerate() {
        let angle = i as f64 * 0.9;
        let radius = 0.005 + 0.002 * i as f64;
        orders.push(Order::new((radius * angle.cos(), radius * angle.sin())).weight(weight));
    }
    orders
}
