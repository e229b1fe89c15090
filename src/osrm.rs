//! OSRM HTTP adapter for distance matrices and route geometry.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::OsrmError;
use crate::model::{Coordinate, CostMatrix};
use crate::traits::{RouteService, TableService};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub table_timeout_secs: u64,
    pub route_timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            table_timeout_secs: 30,
            route_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, OsrmError> {
        let client = reqwest::blocking::Client::builder().build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn service_url(&self, service: &str, locations: &[Coordinate]) -> String {
        format!(
            "{}/{}/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            service,
            self.config.profile,
            coordinate_path(locations)
        )
    }
}

/// Formats coordinates as OSRM expects them: `lon,lat` pairs joined by `;`.
fn coordinate_path(locations: &[Coordinate]) -> String {
    locations
        .iter()
        .map(|(lon, lat)| format!("{},{}", lon, lat))
        .collect::<Vec<_>>()
        .join(";")
}

impl TableService for OsrmClient {
    fn table(&self, locations: &[Coordinate]) -> Result<CostMatrix, OsrmError> {
        if locations.is_empty() {
            return Ok(CostMatrix::zeros(0));
        }

        let url = self.service_url("table", locations);
        debug!(url = %url, "querying OSRM table");

        let body = self
            .client
            .get(url)
            .query(&[("annotations", "distance,duration")])
            .timeout(Duration::from_secs(self.config.table_timeout_secs))
            .send()?
            .error_for_status()?
            .json::<OsrmTableResponse>()?;

        body.into_matrix(locations.len())
    }
}

impl RouteService for OsrmClient {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<Vec<Coordinate>>, OsrmError> {
        let url = self.service_url("route", &[from, to]);

        let body = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .timeout(Duration::from_secs(self.config.route_timeout_secs))
            .send()?
            .error_for_status()?
            .json::<OsrmRouteResponse>()?;

        body.into_geometry()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

impl OsrmTableResponse {
    fn into_matrix(self, expected: usize) -> Result<CostMatrix, OsrmError> {
        if self.code != "Ok" {
            return Err(OsrmError::Code(self.code));
        }

        let distances = truncate_rows(self.distances.ok_or(OsrmError::IncompleteResponse)?)?;
        let durations = truncate_rows(self.durations.ok_or(OsrmError::IncompleteResponse)?)?;

        let matrix = CostMatrix::from_rows(distances, durations).ok_or(OsrmError::IncompleteResponse)?;
        if matrix.size() != expected {
            return Err(OsrmError::IncompleteResponse);
        }

        Ok(matrix)
    }
}

/// Truncates every entry toward zero. A `null` entry (unroutable pair) fails the whole table.
fn truncate_rows(rows: Vec<Vec<Option<f64>>>) -> Result<Vec<Vec<i64>>, OsrmError> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| value.map(|v| v.trunc() as i64).ok_or(OsrmError::IncompleteResponse))
                .collect()
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<Coordinate>,
}

impl OsrmRouteResponse {
    fn into_geometry(self) -> Result<Option<Vec<Coordinate>>, OsrmError> {
        match self.code.as_str() {
            "Ok" => Ok(self.routes.into_iter().next().map(|route| route.geometry.coordinates)),
            "NoRoute" => Ok(None),
            _ => Err(OsrmError::Code(self.code)),
        }
    }
}
