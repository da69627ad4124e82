//! Route geometry carried on enriched batches.
//!
//! Providers hand geometry over in their own encoding (GeoJSON `[lng, lat]`
//! pairs for OSRM); it is decoded here once, at the boundary.

use serde::{Deserialize, Serialize};

use crate::haversine::distance_km;
use crate::model::Coordinate;

/// A route geometry as decoded `(lat, lng)` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Decodes GeoJSON-ordered `[lng, lat]` pairs.
    pub fn from_lng_lat(coordinates: &[[f64; 2]]) -> Self {
        Self {
            points: coordinates.iter().map(|[lng, lat]| (*lat, *lng)).collect(),
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Great-circle length of the path.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| distance_km(Coordinate::from(pair[0]), Coordinate::from(pair[1])))
            .sum()
    }
}
