//! Road geometry for a route, stitched together segment by segment.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::model::Coordinate;
use crate::polyline::Polyline;
use crate::traits::RouteService;

/// Caps the number of segment lookups a single request may issue.
#[derive(Debug)]
pub struct SegmentBudget {
    remaining: AtomicUsize,
}

impl SegmentBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(limit),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Relaxed)
    }

    /// Reserves up to `wanted` lookups and returns how many were granted.
    pub fn take(&self, wanted: usize) -> usize {
        let mut granted = 0;
        let _ = self
            .remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |remaining| {
                granted = remaining.min(wanted);
                Some(remaining - granted)
            });
        granted
    }
}

/// Builds a best-effort polyline through `stops`.
///
/// Each consecutive pair is looked up independently (in parallel); a failed or
/// empty lookup leaves a gap and the remaining segments are still appended in
/// order. Segments beyond the budget are skipped.
pub fn stitch_route<R>(service: &R, stops: &[Coordinate], budget: &SegmentBudget) -> Polyline
where
    R: RouteService + Sync,
{
    let mut polyline = Polyline::default();
    if stops.len() < 2 {
        return polyline;
    }

    let segments = stops.len() - 1;
    let granted = budget.take(segments);
    if granted < segments {
        warn!(segments, granted, "geometry lookup budget exhausted, skipping segments");
    }

    let found: Vec<Option<Vec<Coordinate>>> = stops[..=granted]
        .par_windows(2)
        .enumerate()
        .map(|(position, pair)| lookup_segment(service, position, pair[0], pair[1]))
        .collect();

    for (position, segment) in found.into_iter().enumerate() {
        if let Some(segment) = segment {
            polyline.append_segment(position, segment);
        }
    }

    debug!(stops = stops.len(), points = polyline.len(), "stitched route geometry");
    polyline
}

fn lookup_segment<R: RouteService>(
    service: &R,
    position: usize,
    from: Coordinate,
    to: Coordinate,
) -> Option<Vec<Coordinate>> {
    match service.route(from, to) {
        Ok(Some(segment)) => Some(segment),
        Ok(None) => {
            warn!(segment = position, "routing service found no route for segment");
            None
        }
        Err(err) => {
            warn!(segment = position, error = %err, "segment geometry lookup failed");
            None
        }
    }
}
