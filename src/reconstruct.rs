//! Turns bare solver routes into depot-bookended, time-annotated routes.
//!
//! Reconstruction replays the route against the cost matrix. Time windows are
//! not re-checked here; they are the solver's responsibility.

use crate::error::ReconstructError;
use crate::model::{CostMatrix, DEPOT, Order};

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedRoute {
    /// Location indices, starting and ending at the depot.
    pub stops: Vec<usize>,
    /// Arrival minute at each non-depot stop, relative to departure.
    pub arrival_times: Vec<f64>,
    /// Demand delivered at each non-depot stop.
    pub loads: Vec<f64>,
    /// Meters.
    pub distance: i64,
    /// Seconds.
    pub duration: i64,
    pub load: f64,
}

impl ReconstructedRoute {
    /// Non-depot stops in visiting order.
    pub fn clients(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops.iter().copied().filter(|&stop| stop != DEPOT)
    }

    pub fn num_clients(&self) -> usize {
        self.arrival_times.len()
    }

    /// Whether the vehicle serves at least one client.
    pub fn is_used(&self) -> bool {
        self.num_clients() > 0
    }
}

/// Makes `raw` start and end at the depot. Idempotent; an empty route becomes `[0, 0]`.
pub fn normalize(raw: &[usize]) -> Vec<usize> {
    let mut stops = Vec::with_capacity(raw.len() + 2);
    if raw.first() != Some(&DEPOT) {
        stops.push(DEPOT);
    }
    stops.extend_from_slice(raw);
    if raw.last() != Some(&DEPOT) || stops.len() == 1 {
        stops.push(DEPOT);
    }
    stops
}

pub fn reconstruct(
    raw: &[usize],
    matrix: &CostMatrix,
    orders: &[Order],
    service_minutes: f64,
) -> Result<ReconstructedRoute, ReconstructError> {
    let size = matrix.size().min(orders.len());
    if let Some(&index) = raw.iter().find(|&&index| index >= size) {
        return Err(ReconstructError::UnknownLocation { index, size });
    }

    let stops = normalize(raw);
    let mut arrival_times = Vec::new();
    let mut loads = Vec::new();
    let mut clock = 0.0;

    for (position, &stop) in stops.iter().enumerate() {
        if stop != DEPOT {
            arrival_times.push(clock);
            loads.push(orders[stop].weight);
            clock += service_minutes;
        }
        if let Some(&next) = stops.get(position + 1) {
            clock += matrix.duration(stop, next) as f64 / 60.0;
        }
    }

    let (distance, duration) = stops
        .windows(2)
        .fold((0, 0), |(distance, duration), pair| {
            (
                distance + matrix.distance(pair[0], pair[1]),
                duration + matrix.duration(pair[0], pair[1]),
            )
        });

    let load: f64 = loads.iter().sum();

    Ok(ReconstructedRoute {
        stops,
        arrival_times,
        loads,
        distance,
        duration,
        load,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> CostMatrix {
        // asymmetric on purpose
        CostMatrix::from_rows(
            vec![vec![0, 1000, 2000], vec![1100, 0, 1500], vec![2100, 1600, 0]],
            vec![vec![0, 600, 1200], vec![660, 0, 900], vec![1260, 960, 0]],
        )
        .unwrap()
    }

    fn orders() -> Vec<Order> {
        vec![
            Order::new((0.0, 0.0)),
            Order::new((0.0, 0.01)).weight(120.0),
            Order::new((0.01, 0.0)).weight(80.0),
        ]
    }

    #[test]
    fn normalize_adds_missing_bookends() {
        assert_eq!(normalize(&[1, 2]), vec![0, 1, 2, 0]);
        assert_eq!(normalize(&[0, 1, 2]), vec![0, 1, 2, 0]);
        assert_eq!(normalize(&[1, 2, 0]), vec![0, 1, 2, 0]);
    }

    #[test]
    fn normalize_empty_route() {
        assert_eq!(normalize(&[]), vec![0, 0]);
        assert_eq!(normalize(&[0]), vec![0, 0]);
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [vec![], vec![0], vec![3], vec![1, 2], vec![0, 4, 0], vec![0, 0]] {
            let once = normalize(&raw);
            assert_eq!(normalize(&once), once, "raw route {:?}", raw);
        }
    }

    #[test]
    fn arrival_times_replay_travel_and_service() {
        let route = reconstruct(&[1, 2], &matrix(), &orders(), 15.0).unwrap();

        assert_eq!(route.stops, vec![0, 1, 2, 0]);
        // 600 s to the first stop
        assert_eq!(route.arrival_times[0], 10.0);
        // + 15 min service + 900 s travel
        assert_eq!(route.arrival_times[1], 40.0);
        assert_eq!(route.loads, vec![120.0, 80.0]);
    }

    #[test]
    fn arrival_times_are_non_decreasing() {
        let route = reconstruct(&[2, 1], &matrix(), &orders(), 15.0).unwrap();
        for pair in route.arrival_times.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(route.arrival_times[0], 1200.0 / 60.0);
    }

    #[test]
    fn totals_follow_matrix_direction() {
        let route = reconstruct(&[1, 2], &matrix(), &orders(), 15.0).unwrap();
        assert_eq!(route.distance, 1000 + 1500 + 2100);
        assert_eq!(route.duration, 600 + 900 + 1260);
        assert_eq!(route.load, 200.0);
        assert_eq!(route.clients().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn empty_route_is_an_unused_vehicle() {
        let route = reconstruct(&[], &matrix(), &orders(), 15.0).unwrap();
        assert_eq!(route.stops, vec![0, 0]);
        assert!(!route.is_used());
        assert_eq!(route.distance, 0);
        assert_eq!(route.load, 0.0);
    }

    #[test]
    fn windows_are_not_rechecked() {
        // the client window has long closed by the time we arrive; replay still succeeds
        let mut orders = orders();
        orders[2] = Order::new((0.01, 0.0)).weight(80.0).window(0.0, 1.0);
        let route = reconstruct(&[1, 2], &matrix(), &orders, 15.0).unwrap();
        assert!(route.arrival_times[1] > orders[2].time_window.latest());
    }

    #[test]
    fn unknown_location_is_rejected() {
        let err = reconstruct(&[1, 7], &matrix(), &orders(), 15.0).unwrap_err();
        assert!(matches!(err, ReconstructError::UnknownLocation { index: 7, size: 3 }));
    }
}
