//! Planner configuration, shared read-only by every request.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::model::TimeWindow;
use crate::osrm::OsrmConfig;
use crate::solver::SolveOptions;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub osrm: OsrmConfig,
    /// Service time at every client, in minutes.
    pub service_minutes: f64,
    pub depot_window: TimeWindow,
    pub solve_budget_secs: u64,
    pub seed: u64,
    /// Cap on geometry lookups per request.
    pub max_geometry_segments: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            osrm: OsrmConfig::default(),
            service_minutes: 15.0,
            depot_window: TimeWindow::full_day(),
            solve_budget_secs: 30,
            seed: 42,
            max_geometry_segments: 500,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by `OSRM_URL`, `OSRM_PROFILE`, `SOLVE_BUDGET_SECS`,
    /// `SOLVER_SEED` and `MAX_GEOMETRY_SEGMENTS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("OSRM_URL") {
            config.osrm.base_url = url;
        }
        if let Some(profile) = lookup("OSRM_PROFILE") {
            config.osrm.profile = profile;
        }
        parse_into(&lookup, "SOLVE_BUDGET_SECS", &mut config.solve_budget_secs);
        parse_into(&lookup, "SOLVER_SEED", &mut config.seed);
        parse_into(&lookup, "MAX_GEOMETRY_SEGMENTS", &mut config.max_geometry_segments);

        config
    }

    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            service_minutes: self.service_minutes,
            depot_window: self.depot_window,
            max_runtime: Duration::from_secs(self.solve_budget_secs),
            seed: self.seed,
        }
    }
}

fn parse_into<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(key, value = %raw, "ignoring unparsable configuration value"),
    }
}
