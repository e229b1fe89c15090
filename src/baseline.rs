//! Baseline solver: randomized cheapest insertion followed by local search.
//!
//! Each restart inserts clients one by one at the cheapest feasible position
//! across all vehicles, then improves the result with 2-opt and relocate
//! moves. Restarts continue until the budget is spent; the best feasible
//! result by total distance wins.
//!
//! The deadline is also checked inside construction and local search. Once it
//! passes, construction only appends remaining clients to route ends and
//! local search stops, so the first restart still yields a complete result.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::SolverError;
use crate::model::DEPOT;
use crate::solver::{Model, SolveOutcome, SolveParams, Solution};
use crate::traits::VrpSolver;

#[derive(Debug, Clone)]
pub struct InsertionSolver {
    /// Upper bound on restarts, on top of the time budget.
    pub max_restarts: usize,
    /// Maximum improvement rounds per restart.
    pub local_search_iterations: usize,
}

impl Default for InsertionSolver {
    fn default() -> Self {
        Self {
            max_restarts: 200,
            local_search_iterations: 100,
        }
    }
}

impl VrpSolver for InsertionSolver {
    fn solve(&self, model: &Model, params: &SolveParams) -> Result<SolveOutcome, SolverError> {
        let instance = Instance::from_model(model)?;
        let deadline = Instant::now() + params.max_runtime;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut order: Vec<usize> = (1..instance.size).collect();
        let mut best: Option<(Vec<Vec<usize>>, i64)> = None;
        let mut iterations = 0;

        while iterations < self.max_restarts.max(1) {
            if iterations > 0 {
                if Instant::now() >= deadline {
                    break;
                }
                order.shuffle(&mut rng);
            }
            iterations += 1;

            let Some(mut routes) = instance.construct(&order, deadline) else {
                continue;
            };
            local_search(&instance, &mut routes, self.local_search_iterations, deadline);

            let cost: i64 = routes.iter().map(|route| instance.route_distance(route)).sum();
            if best.as_ref().is_none_or(|(_, best_cost)| cost < *best_cost) {
                debug!(restart = iterations, cost, "improved solution");
                best = Some((routes, cost));
            }
        }

        Ok(match best {
            Some((routes, cost)) => SolveOutcome::Feasible(Solution {
                routes,
                cost: cost as f64,
                iterations,
            }),
            None => SolveOutcome::Infeasible { iterations },
        })
    }
}

/// Dense view of a [`Model`] for fast lookups.
struct Instance {
    size: usize,
    vehicles: usize,
    capacity: f64,
    distance: Vec<i64>,
    /// Travel time in minutes.
    travel: Vec<f64>,
    demand: Vec<f64>,
    windows: Vec<(f64, f64)>,
    service: Vec<f64>,
}

impl Instance {
    fn from_model(model: &Model) -> Result<Self, SolverError> {
        let size = model.num_locations();
        if model.vehicle_type.num_available == 0 {
            return Err(SolverError::InvalidModel("no vehicles available".to_string()));
        }
        if model.edges.len() != size * (size - 1) {
            return Err(SolverError::InvalidModel(format!(
                "expected {} edges for {} locations, got {}",
                size * (size - 1),
                size,
                model.edges.len()
            )));
        }

        let mut distance = vec![0; size * size];
        let mut travel = vec![0.0; size * size];
        for edge in &model.edges {
            if edge.from >= size || edge.to >= size {
                return Err(SolverError::InvalidModel(format!(
                    "edge {} -> {} outside {} locations",
                    edge.from, edge.to, size
                )));
            }
            distance[edge.from * size + edge.to] = edge.distance;
            travel[edge.from * size + edge.to] = edge.duration as f64 / 60.0;
        }

        let depot_window = (model.depot.time_window.earliest(), model.depot.time_window.latest());
        let mut demand = vec![0.0];
        let mut windows = vec![depot_window];
        let mut service = vec![0.0];
        for client in &model.clients {
            demand.push(client.delivery);
            windows.push((client.time_window.earliest(), client.time_window.latest()));
            service.push(client.service_duration);
        }

        Ok(Self {
            size,
            vehicles: model.vehicle_type.num_available,
            capacity: model.vehicle_type.capacity,
            distance,
            travel,
            demand,
            windows,
            service,
        })
    }

    fn distance(&self, from: usize, to: usize) -> i64 {
        self.distance[from * self.size + to]
    }

    fn travel(&self, from: usize, to: usize) -> f64 {
        self.travel[from * self.size + to]
    }

    /// Total distance from the depot through `route` and back.
    fn route_distance(&self, route: &[usize]) -> i64 {
        if route.is_empty() {
            return 0;
        }
        let mut total = 0;
        let mut prev = DEPOT;
        for &stop in route {
            total += self.distance(prev, stop);
            prev = stop;
        }
        total + self.distance(prev, DEPOT)
    }

    fn load(&self, route: &[usize]) -> f64 {
        route.iter().map(|&stop| self.demand[stop]).sum()
    }

    /// Checks windows along `route`, waiting when a vehicle arrives early.
    fn schedule_fits(&self, route: &[usize]) -> bool {
        let (depot_open, depot_close) = self.windows[DEPOT];
        let mut time = depot_open;
        let mut prev = DEPOT;

        for &stop in route {
            time += self.travel(prev, stop);
            let (earliest, latest) = self.windows[stop];
            if time > latest {
                return false;
            }
            time = time.max(earliest) + self.service[stop];
            prev = stop;
        }

        time + self.travel(prev, DEPOT) <= depot_close
    }

    fn is_feasible(&self, route: &[usize]) -> bool {
        self.load(route) <= self.capacity && self.schedule_fits(route)
    }

    /// Distance added by inserting `client` before `route[position]`.
    fn insertion_delta(&self, route: &[usize], position: usize, client: usize) -> i64 {
        let prev = if position == 0 { DEPOT } else { route[position - 1] };
        let next = route.get(position).copied().unwrap_or(DEPOT);
        self.distance(prev, client) + self.distance(client, next) - self.distance(prev, next)
    }

    /// Greedy cheapest insertion in the given client order. `None` if a client cannot be placed.
    ///
    /// After `deadline` only route ends are considered.
    fn construct(&self, order: &[usize], deadline: Instant) -> Option<Vec<Vec<usize>>> {
        let mut routes: Vec<Vec<usize>> = vec![Vec::new(); self.vehicles];
        let mut loads = vec![0.0; self.vehicles];

        for &client in order {
            let append_only = Instant::now() >= deadline;
            let mut best: Option<(usize, usize, i64)> = None;

            for (route_index, route) in routes.iter().enumerate() {
                if loads[route_index] + self.demand[client] > self.capacity {
                    continue;
                }
                let first = if append_only { route.len() } else { 0 };

                for position in first..=route.len() {
                    let delta = self.insertion_delta(route, position, client);
                    if best.is_some_and(|(_, _, best_delta)| delta >= best_delta) {
                        continue;
                    }
                    let mut candidate = route.clone();
                    candidate.insert(position, client);
                    if self.schedule_fits(&candidate) {
                        best = Some((route_index, position, delta));
                    }
                }
            }

            let (route_index, position, _) = best?;
            routes[route_index].insert(position, client);
            loads[route_index] += self.demand[client];
        }

        Some(routes)
    }
}

// ============================================================================
// Local Search Operators
// ============================================================================

/// 2-opt: Reverse a segment within a route to reduce distance.
/// Returns true if an improvement was made.
fn two_opt_improve(instance: &Instance, route: &mut Vec<usize>, deadline: Instant) -> bool {
    if route.len() < 2 {
        return false;
    }

    let current = instance.route_distance(route);
    let n = route.len();

    for i in 0..n - 1 {
        if Instant::now() >= deadline {
            return false;
        }
        for j in i + 1..n {
            let mut candidate = route.clone();
            candidate[i..=j].reverse();

            if instance.route_distance(&candidate) < current && instance.schedule_fits(&candidate) {
                *route = candidate;
                return true;
            }
        }
    }

    false
}

/// Relocate: Move a stop to another position in any route.
/// Returns true if an improvement was made.
fn relocate_improve(instance: &Instance, routes: &mut [Vec<usize>], deadline: Instant) -> bool {
    for from in 0..routes.len() {
        for stop_index in 0..routes[from].len() {
            if Instant::now() >= deadline {
                return false;
            }
            let stop = routes[from][stop_index];

            let mut shortened = routes[from].clone();
            shortened.remove(stop_index);

            for to in 0..routes.len() {
                if from == to {
                    let current = instance.route_distance(&routes[from]);
                    for position in 0..=shortened.len() {
                        if position == stop_index {
                            continue;
                        }
                        let mut candidate = shortened.clone();
                        candidate.insert(position, stop);
                        if instance.route_distance(&candidate) < current && instance.schedule_fits(&candidate) {
                            routes[from] = candidate;
                            return true;
                        }
                    }
                    continue;
                }

                if instance.load(&routes[to]) + instance.demand[stop] > instance.capacity {
                    continue;
                }

                let current =
                    instance.route_distance(&routes[from]) + instance.route_distance(&routes[to]);
                let shortened_cost = instance.route_distance(&shortened);
                if !instance.schedule_fits(&shortened) {
                    continue;
                }

                for position in 0..=routes[to].len() {
                    let mut candidate = routes[to].clone();
                    candidate.insert(position, stop);

                    if shortened_cost + instance.route_distance(&candidate) < current
                        && instance.is_feasible(&candidate)
                    {
                        routes[from] = shortened;
                        routes[to] = candidate;
                        return true;
                    }
                }
            }
        }
    }

    false
}

/// Run local search improvement until no more improvements, max iterations or the deadline.
fn local_search(instance: &Instance, routes: &mut [Vec<usize>], max_iterations: usize, deadline: Instant) {
    for _ in 0..max_iterations {
        if Instant::now() >= deadline {
            break;
        }
        let mut improved = false;

        for route in routes.iter_mut() {
            if two_opt_improve(instance, route, deadline) {
                improved = true;
            }
        }

        if relocate_improve(instance, routes, deadline) {
            improved = true;
        }

        if !improved {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fallback::PlanarMatrix;
    use crate::model::{Order, VehicleFleet};
    use crate::solver::{SolveOptions, build_model};
    use crate::traits::DistanceMatrixProvider;

    fn model(orders: &[Order], vehicles: usize, capacity: f64) -> Model {
        let coords: Vec<_> = orders.iter().map(|o| o.coordinates).collect();
        let matrix = PlanarMatrix::default().matrix_for(&coords);
        build_model(
            &matrix,
            orders,
            VehicleFleet { count: vehicles, capacity },
            &SolveOptions::default(),
        )
    }

    fn params() -> SolveParams {
        SolveParams {
            max_runtime: Duration::from_secs(5),
            seed: 42,
        }
    }

    fn solver() -> InsertionSolver {
        InsertionSolver {
            max_restarts: 20,
            local_search_iterations: 50,
        }
    }

    fn solution(outcome: SolveOutcome) -> Solution {
        match outcome {
            SolveOutcome::Feasible(solution) => solution,
            SolveOutcome::Infeasible { .. } => panic!("expected a feasible solution"),
        }
    }

    #[test]
    fn single_client_single_vehicle() {
        let orders = vec![Order::new((0.0, 0.0)), Order::new((0.0, 0.01)).weight(500.0)];
        let m = model(&orders, 1, 1000.0);
        let solution = solution(solver().solve(&m, &params()).unwrap());

        let out_and_back: i64 = m.edges.iter().map(|edge| edge.distance).sum();
        assert_eq!(solution.routes, vec![vec![1]]);
        assert_eq!(solution.cost, out_and_back as f64);
    }

    #[test]
    fn returns_one_route_per_vehicle() {
        let orders = vec![Order::new((0.0, 0.0)), Order::new((0.0, 0.01))];
        let solution = solution(solver().solve(&model(&orders, 3, 1000.0), &params()).unwrap());

        assert_eq!(solution.routes.len(), 3);
        assert_eq!(solution.routes.iter().filter(|r| !r.is_empty()).count(), 1);
    }

    #[test]
    fn respects_capacity() {
        let orders = vec![
            Order::new((0.0, 0.0)),
            Order::new((0.0, 0.01)).weight(600.0),
            Order::new((0.0, 0.02)).weight(600.0),
            Order::new((0.01, 0.0)).weight(600.0),
        ];
        let m = model(&orders, 3, 1000.0);
        let solution = solution(solver().solve(&m, &params()).unwrap());

        for route in &solution.routes {
            let load: f64 = route.iter().map(|&i| orders[i].weight).sum();
            assert!(load <= 1000.0, "route {:?} overloaded", route);
        }
        let mut visited: Vec<usize> = solution.routes.concat();
        visited.sort();
        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[test]
    fn capacity_shortfall_is_infeasible() {
        let orders = vec![
            Order::new((0.0, 0.0)),
            Order::new((0.0, 0.01)).weight(600.0),
            Order::new((0.0, 0.02)).weight(600.0),
        ];
        let outcome = solver().solve(&model(&orders, 1, 1000.0), &params()).unwrap();

        assert_eq!(outcome, SolveOutcome::Infeasible { iterations: 20 });
    }

    #[test]
    fn respects_time_windows() {
        // one degree away is ~133 minutes of driving; window closes at 60
        let orders = vec![
            Order::new((0.0, 0.0)),
            Order::new((0.0, 1.0)).window(0.0, 60.0),
        ];
        let outcome = solver().solve(&model(&orders, 2, 1000.0), &params()).unwrap();
        assert!(!outcome.is_feasible());
    }

    #[test]
    fn waits_for_window_to_open() {
        let orders = vec![
            Order::new((0.0, 0.0)),
            Order::new((0.0, 0.01)).window(600.0, 660.0),
        ];
        let outcome = solver().solve(&model(&orders, 1, 1000.0), &params()).unwrap();
        assert!(outcome.is_feasible());
    }

    #[test]
    fn prefers_short_tours() {
        // clients on a line: visiting them in order is optimal
        let orders = vec![
            Order::new((0.0, 0.0)),
            Order::new((0.0, 0.03)),
            Order::new((0.0, 0.01)),
            Order::new((0.0, 0.02)),
        ];
        let solution = solution(solver().solve(&model(&orders, 1, 1000.0), &params()).unwrap());
        let route = &solution.routes[0];

        let tour = instance_distance(&orders, route);
        assert_eq!(solution.cost, tour as f64);
        let in_line = instance_distance(&orders, &[2, 3, 1]);
        assert!(tour <= in_line, "tour {} longer than visiting in line ({})", tour, in_line);
    }

    fn instance_distance(orders: &[Order], route: &[usize]) -> i64 {
        let m = model(orders, 1, 1000.0);
        Instance::from_model(&m).unwrap().route_distance(route)
    }

    #[test]
    fn same_seed_same_solution() {
        let orders = vec![
            Order::new((0.0, 0.0)),
            Order::new((0.01, 0.01)).weight(300.0),
            Order::new((-0.01, 0.02)).weight(300.0),
            Order::new((0.02, -0.01)).weight(300.0),
            Order::new((0.015, 0.005)).weight(300.0),
        ];
        let m = model(&orders, 2, 1000.0);
        let first = solver().solve(&m, &params()).unwrap();
        let second = solver().solve(&m, &params()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stays_within_time_budget() {
        let mut orders = vec![Order::new((0.0, 0.0))];
        for i in 0..400 {
            let angle = i as f64 * 0.37;
            let radius = 0.002 + 0.0001 * i as f64;
            orders.push(Order::new((radius * angle.cos(), radius * angle.sin())));
        }
        let m = model(&orders, 20, 1000.0);
        let budget = Duration::from_millis(100);

        let started = Instant::now();
        let outcome = InsertionSolver::default()
            .solve(&m, &SolveParams { max_runtime: budget, seed: 42 })
            .unwrap();
        let elapsed = started.elapsed();

        let solution = solution(outcome);
        assert_eq!(solution.routes.concat().len(), 400);
        assert!(
            elapsed < budget + Duration::from_millis(900),
            "took {:?} on a {:?} budget",
            elapsed,
            budget
        );
    }

    #[test]
    fn expired_budget_still_places_every_client() {
        let orders = vec![
            Order::new((0.0, 0.0)),
            Order::new((0.0, 0.01)).weight(300.0),
            Order::new((0.01, 0.0)).weight(300.0),
            Order::new((0.0, -0.01)).weight(300.0),
        ];
        let m = model(&orders, 2, 1000.0);
        let outcome = solver()
            .solve(&m, &SolveParams { max_runtime: Duration::ZERO, seed: 42 })
            .unwrap();

        let solution = solution(outcome);
        assert_eq!(solution.iterations, 1);
        let mut visited = solution.routes.concat();
        visited.sort();
        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[test]
    fn zero_vehicles_is_invalid() {
        let orders = vec![Order::new((0.0, 0.0)), Order::new((0.0, 0.01))];
        let result = solver().solve(&model(&orders, 0, 1000.0), &params());
        assert!(matches!(result, Err(SolverError::InvalidModel(_))));
    }
}
