//! Final plan structure returned to callers.

use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, Order};
use crate::polyline::Polyline;
use crate::reconstruct::ReconstructedRoute;
use crate::solver::Solution;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub num_routes: usize,
    pub routes: Vec<PlannedRoute>,
    pub depot: Coordinate,
    pub vehicle_info: VehicleInfo,
    pub statistics: Statistics,
    pub solution_quality: SolutionQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoute {
    /// 1-based position in the fleet.
    pub vehicle_id: usize,
    /// Client coordinates in visiting order.
    pub nodes: Vec<Coordinate>,
    pub weights: Vec<f64>,
    /// Minutes since departure.
    pub arrival_times: Vec<f64>,
    /// Every stop including the depot at both ends.
    pub full_route: Vec<Coordinate>,
    pub geometry: Polyline,
    pub distance: i64,
    pub duration: i64,
    pub total_weight: f64,
    pub num_clients: usize,
    pub route_indices: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub available: usize,
    pub used: usize,
    pub capacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_distance: i64,
    pub total_duration: i64,
    pub total_weight: f64,
    pub num_clients: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolutionQuality {
    pub cost: f64,
    pub iterations: usize,
    pub is_feasible: bool,
}

impl PlannedRoute {
    pub fn new(vehicle_index: usize, route: ReconstructedRoute, geometry: Polyline, orders: &[Order]) -> Self {
        let coordinates = |index: usize| orders[index].coordinates;

        Self {
            vehicle_id: vehicle_index + 1,
            nodes: route.clients().map(coordinates).collect(),
            full_route: route.stops.iter().map(|&index| coordinates(index)).collect(),
            num_clients: route.num_clients(),
            weights: route.loads,
            arrival_times: route.arrival_times,
            geometry,
            distance: route.distance,
            duration: route.duration,
            total_weight: route.load,
            route_indices: route.stops,
        }
    }

    pub fn is_used(&self) -> bool {
        self.num_clients > 0
    }
}

/// Combines the accepted solution's routes into a [`Plan`].
///
/// `routes` must hold one entry per vehicle in `fleet_size`, in fleet order,
/// with its geometry. Distance and duration totals only count used vehicles.
pub fn assemble(
    orders: &[Order],
    routes: Vec<(ReconstructedRoute, Polyline)>,
    fleet_size: usize,
    capacity: f64,
    solution: &Solution,
) -> Plan {
    let routes: Vec<PlannedRoute> = routes
        .into_iter()
        .enumerate()
        .map(|(index, (route, geometry))| PlannedRoute::new(index, route, geometry, orders))
        .collect();

    let used: Vec<&PlannedRoute> = routes.iter().filter(|route| route.is_used()).collect();

    let statistics = Statistics {
        total_distance: used.iter().map(|route| route.distance).sum(),
        total_duration: used.iter().map(|route| route.duration).sum(),
        total_weight: orders.iter().skip(1).map(|order| order.weight).sum(),
        num_clients: orders.len().saturating_sub(1),
    };

    let vehicle_info = VehicleInfo {
        available: fleet_size,
        used: used.len(),
        capacity,
    };

    Plan {
        num_routes: routes.len(),
        depot: orders.first().map(|order| order.coordinates).unwrap_or_default(),
        vehicle_info,
        statistics,
        solution_quality: SolutionQuality {
            cost: solution.cost,
            iterations: solution.iterations,
            is_feasible: true,
        },
        routes,
    }
}
