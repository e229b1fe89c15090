//! Plan request body.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::model::{Coordinate, Order};

fn default_num_vehicles() -> usize {
    3
}

fn default_vehicle_capacity() -> f64 {
    1000.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(default = "default_num_vehicles")]
    pub num_vehicles: usize,
    #[serde(default = "default_vehicle_capacity")]
    pub vehicle_capacity: f64,
    /// Element 0 is the depot, the rest are clients.
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            num_vehicles: default_num_vehicles(),
            vehicle_capacity: default_vehicle_capacity(),
            orders: Vec::new(),
        }
    }
}

impl PlanRequest {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            ..Self::default()
        }
    }

    pub fn vehicles(mut self, num_vehicles: usize) -> Self {
        self.num_vehicles = num_vehicles;
        self
    }

    pub fn capacity(mut self, vehicle_capacity: f64) -> Self {
        self.vehicle_capacity = vehicle_capacity;
        self
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.orders.iter().map(|order| order.coordinates).collect()
    }

    /// Sum of client weights; the depot's weight is ignored.
    pub fn total_demand(&self) -> f64 {
        self.orders.iter().skip(1).map(|order| order.weight).sum()
    }

    pub fn num_clients(&self) -> usize {
        self.orders.len().saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.orders.len() < 2 {
            return Err(PlanError::InvalidInput(
                "at least 2 locations are required (depot + clients)".to_string(),
            ));
        }
        if self.num_vehicles == 0 {
            return Err(PlanError::InvalidInput("num_vehicles must be positive".to_string()));
        }
        if !(self.vehicle_capacity > 0.0) {
            return Err(PlanError::InvalidInput("vehicle_capacity must be positive".to_string()));
        }
        Ok(())
    }
}
