//! Fleet sizing: start from the demand lower bound, escalate at most once.

/// Minimum number of vehicles that can carry `total_demand` at `capacity`.
///
/// Never below one, so a request with clients always gets a vehicle.
pub fn optimal_vehicles(total_demand: f64, capacity: f64) -> usize {
    ((total_demand / capacity).ceil() as usize).max(1)
}

/// Fleet size decisions for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetSizing {
    pub requested: usize,
    pub optimal: usize,
}

impl FleetSizing {
    pub fn new(total_demand: f64, capacity: f64, requested: usize) -> Self {
        Self {
            requested,
            optimal: optimal_vehicles(total_demand, capacity),
        }
    }

    /// First fleet size to attempt: the request, capped at the lower bound.
    pub fn initial(&self) -> usize {
        self.requested.min(self.optimal)
    }

    /// The single escalation step after an infeasible attempt of `attempted` vehicles.
    ///
    /// Only an attempt at exactly the lower bound escalates, and only to one
    /// more vehicle. Everything else is final, as is a bound that saturated.
    pub fn escalate(&self, attempted: usize) -> Option<usize> {
        if attempted != self.optimal {
            return None;
        }
        self.optimal.checked_add(1)
    }
}
