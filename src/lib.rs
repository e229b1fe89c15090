//! delivery-planner
//!
//! Multi-vehicle delivery planning around an external routing service and a
//! pluggable vehicle-routing solver.

pub mod baseline;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fleet;
pub mod geometry;
pub mod matrix;
pub mod model;
pub mod osrm;
pub mod plan;
pub mod planner;
pub mod polyline;
pub mod reconstruct;
pub mod request;
pub mod solver;
pub mod traits;
