//! Viewport model - coordinates, bounding boxes and the sampling grid

use serde::{Deserialize, Serialize};

/// A point in plain lat/lng degree space. Ranges are not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in degree space (no projection).
    pub fn degree_distance(&self, other: Coordinate) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }
}

/// Rectangular region scoping grid generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// `north > south` and `east > west`, both finite.
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite());
        finite && self.north > self.south && self.east > self.west
    }

    /// Containment test with an extra tolerance on the north/east edges,
    /// where the grid walk may overshoot by less than one step.
    pub fn contains_with_tolerance(&self, point: Coordinate, tolerance: f64) -> bool {
        point.lat >= self.south
            && point.lat <= self.north + tolerance
            && point.lng >= self.west
            && point.lng <= self.east + tolerance
    }
}

/// Square box of half-width `margin` around `center`.
pub fn derive_bounds(center: Coordinate, margin: f64) -> BoundingBox {
    BoundingBox {
        north: center.lat + margin,
        south: center.lat - margin,
        east: center.lng + margin,
        west: center.lng - margin,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
    pub bounds: BoundingBox,
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: u8, margin: f64) -> Self {
        Self {
            center,
            zoom,
            bounds: derive_bounds(center, margin),
        }
    }
}

/// Values visited when walking `start..=end` in increments of `step`.
///
/// Accumulates the step the same way a `lat += step` loop does, so the final
/// value may sit just past `end` due to float drift. Returns nothing for a
/// degenerate range or a non-positive step.
pub fn grid_axis(start: f64, end: f64, step: f64) -> Vec<f64> {
    let mut values = Vec::new();
    if !(step > 0.0) || !start.is_finite() || !end.is_finite() {
        return values;
    }
    let mut value = start;
    while value <= end {
        values.push(value);
        value += step;
    }
    values
}

/// Every `(lat, lng)` cell of the grid over `bounds`, row by row from the south.
/// Bounds that are not well formed, zero-area ones included, have no cells.
pub fn grid_cells(bounds: &BoundingBox, step: f64) -> Vec<Coordinate> {
    if !bounds.is_well_formed() {
        return Vec::new();
    }
    let lats = grid_axis(bounds.south, bounds.north, step);
    let lngs = grid_axis(bounds.west, bounds.east, step);
    let mut cells = Vec::with_capacity(lats.len() * lngs.len());
    for &lat in &lats {
        for &lng in &lngs {
            cells.push(Coordinate { lat, lng });
        }
    }
    cells
}
