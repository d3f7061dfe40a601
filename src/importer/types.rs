use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One decoded CSV row, still in the units of the source log.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryRecord {
    pub elapsed_s: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_ft: f64,
    pub speed_mph: f64,
    pub battery_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above ground level
    pub altitude: f64,
    /// Horizontal speed in meters per second
    pub speed: f64,
    pub battery_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlightSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance_meters: f64,
    pub max_altitude_meters: f64,
    pub min_battery_percent: u8,
    pub source_name: String,
}

/// A finished import: the summary and the samples it was computed from, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedFlight {
    pub summary: FlightSummary,
    pub samples: Vec<Sample>,
}

/// GeoJSON LineString geometry with `[longitude, latitude]` positions.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = Vec<Vec<f64>>)]
    pub coordinates: Vec<[f64; 2]>,
}

impl LineString {
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Self {
        LineString {
            kind: "LineString".to_string(),
            coordinates: samples
                .into_iter()
                .map(|s| [s.longitude, s.latitude])
                .collect(),
        }
    }
}
