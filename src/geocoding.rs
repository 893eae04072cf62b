use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Turns free text into candidate locations.
pub trait LocationResolver: Send + Sync {
    fn search(&self, text: &str) -> Vec<Location>;
}

const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Copy)]
struct GazetteerEntry {
    key: &'static str,
    name: &'static str,
    lat: f64,
    lng: f64,
}

const CITIES: &[GazetteerEntry] = &[
    GazetteerEntry {
        key: "new york",
        name: "New York City, NY",
        lat: 40.7589,
        lng: -73.9851,
    },
    GazetteerEntry {
        key: "san francisco",
        name: "San Francisco, CA",
        lat: 37.7749,
        lng: -122.4194,
    },
    GazetteerEntry {
        key: "chicago",
        name: "Chicago, IL",
        lat: 41.8781,
        lng: -87.6298,
    },
    GazetteerEntry {
        key: "miami",
        name: "Miami, FL",
        lat: 25.7617,
        lng: -80.1918,
    },
    GazetteerEntry {
        key: "seattle",
        name: "Seattle, WA",
        lat: 47.6062,
        lng: -122.3321,
    },
    GazetteerEntry {
        key: "boston",
        name: "Boston, MA",
        lat: 42.3601,
        lng: -71.0589,
    },
    GazetteerEntry {
        key: "los angeles",
        name: "Los Angeles, CA",
        lat: 34.0522,
        lng: -118.2437,
    },
    GazetteerEntry {
        key: "denver",
        name: "Denver, CO",
        lat: 39.7392,
        lng: -104.9903,
    },
];

/// Fixed table of demo cities.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticGazetteer;

impl StaticGazetteer {
    pub fn new() -> Self {
        Self
    }

    pub fn all(&self) -> Vec<Location> {
        CITIES.iter().map(GazetteerEntry::to_location).collect()
    }
}

impl GazetteerEntry {
    fn to_location(&self) -> Location {
        Location {
            lat: self.lat,
            lng: self.lng,
            name: self.name.to_string(),
        }
    }
}

impl LocationResolver for StaticGazetteer {
    fn search(&self, text: &str) -> Vec<Location> {
        let query = text.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        if let Some(entry) = CITIES
            .iter()
            .find(|entry| entry.key.contains(&query) || query.contains(entry.key))
        {
            return vec![entry.to_location()];
        }

        CITIES
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&query))
            .map(GazetteerEntry::to_location)
            .collect()
    }
}
