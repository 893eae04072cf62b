//! Analytics report export

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    analytics::AnalyticsSummary,
    coordinator::{CoordinatorState, RefreshReport},
    geo::Viewport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCounts {
    pub temperature: usize,
    pub flood: usize,
    pub buildings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub location: String,
    pub round: u64,
    pub viewport: Viewport,
    pub summary: AnalyticsSummary,
    pub layer_counts: LayerCounts,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsReport {
    pub fn from_refresh(location: impl Into<String>, report: &RefreshReport) -> Self {
        Self {
            location: location.into(),
            round: report.token,
            viewport: report.viewport,
            summary: report.summary,
            layer_counts: LayerCounts {
                temperature: report.dataset.temperature.len(),
                flood: report.dataset.flood.len(),
                buildings: report.dataset.buildings.len(),
            },
            generated_at: report.dataset.generated_at.unwrap_or_else(Utc::now),
        }
    }

    /// `None` until a round has been published.
    pub fn from_state(state: &CoordinatorState) -> Option<Self> {
        let viewport = state.viewport?;
        let generated_at = state.dataset.generated_at?;
        Some(Self {
            location: state
                .location
                .clone()
                .unwrap_or_else(|| "Custom viewport".to_string()),
            round: state.token,
            viewport,
            summary: state.summary,
            layer_counts: LayerCounts {
                temperature: state.dataset.temperature.len(),
                flood: state.dataset.flood.len(),
                buildings: state.dataset.buildings.len(),
            },
            generated_at,
        })
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.json",
            slug(&self.location),
            self.generated_at.format("%Y%m%dT%H%M%S")
        )
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report io error at '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to encode report")]
    Json(#[from] serde_json::Error),
}

/// Writes `report` as pretty JSON under `dir` and returns the file path.
pub fn write_report(
    dir: impl AsRef<Path>,
    report: &AnalyticsReport,
) -> Result<PathBuf, ReportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|err| ReportError::Io(dir.to_path_buf(), err))?;
    let path = dir.join(report.file_name());
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json).map_err(|err| ReportError::Io(path.clone(), err))?;
    Ok(path)
}

fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("report");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use chrono::TimeZone;

    fn sample_report() -> AnalyticsReport {
        AnalyticsReport {
            location: "New York City, NY".into(),
            round: 4,
            viewport: Viewport::new(Coordinate::new(40.7589, -73.9851), 12, 0.05),
            summary: AnalyticsSummary {
                avg_temperature: 17.2,
                flood_risk_area: 1.5,
                building_count: 60,
                carbon_total: 3900.0,
            },
            layer_counts: LayerCounts {
                temperature: 169,
                flood: 150,
                buildings: 60,
            },
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("New York City, NY"), "new-york-city-ny");
        assert_eq!(slug("  --  "), "report");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(sample_report().file_name(), "new-york-city-ny_20240501T123000.json");
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path().join("reports"), &sample_report()).unwrap();

        assert!(path.exists());
        let data = fs::read_to_string(&path).unwrap();
        assert!(data.contains("\"location\": \"New York City, NY\""));
        assert!(data.contains("\"buildingCount\": 60"));

        let parsed: AnalyticsReport = serde_json::from_str(&data).unwrap();
        assert_eq!(parsed.layer_counts.flood, 150);
    }

    #[test]
    fn test_from_state_requires_published_round() {
        assert!(AnalyticsReport::from_state(&CoordinatorState::default()).is_none());
    }
}
