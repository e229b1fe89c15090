//! Matrix provider that prefers a remote table and degrades to [`PlanarMatrix`].

use tracing::{info, warn};

use crate::fallback::PlanarMatrix;
use crate::model::{Coordinate, CostMatrix};
use crate::traits::{DistanceMatrixProvider, TableService};

/// Queries `primary` once; any failure discards it and the whole matrix is
/// synthesized by `fallback`. The remote call is never retried.
#[derive(Debug, Clone)]
pub struct FallbackMatrix<T> {
    primary: T,
    fallback: PlanarMatrix,
}

impl<T> FallbackMatrix<T> {
    pub fn new(primary: T) -> Self {
        Self {
            primary,
            fallback: PlanarMatrix::default(),
        }
    }

    pub fn with_fallback(primary: T, fallback: PlanarMatrix) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &T {
        &self.primary
    }
}

impl<T: TableService> DistanceMatrixProvider for FallbackMatrix<T> {
    fn matrix_for(&self, locations: &[Coordinate]) -> CostMatrix {
        match self.primary.table(locations) {
            Ok(matrix) if matrix.size() == locations.len() => {
                info!(locations = locations.len(), "using routing service matrix");
                matrix
            }
            Ok(matrix) => {
                warn!(
                    expected = locations.len(),
                    received = matrix.size(),
                    "routing service matrix has wrong size, using planar fallback"
                );
                self.fallback.matrix_for(locations)
            }
            Err(err) => {
                warn!(error = %err, "routing service table failed, using planar fallback");
                self.fallback.matrix_for(locations)
            }
        }
    }
}
