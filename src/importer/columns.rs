use csv::StringRecord;
use serde::Deserialize;
use std::fmt;

use super::error::ImportError;

const FIELD_COUNT: usize = 6;

/// Telemetry fields every flight log must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FlyTime,
    Latitude,
    Longitude,
    AltitudeFt,
    SpeedMph,
    BatteryPercent,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::FlyTime,
        Field::Latitude,
        Field::Longitude,
        Field::AltitudeFt,
        Field::SpeedMph,
        Field::BatteryPercent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::FlyTime => "fly_time",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::AltitudeFt => "altitude_ft",
            Field::SpeedMph => "speed_mph",
            Field::BatteryPercent => "battery_percent",
        }
    }

    /// Header written by the DJI log converters.
    pub fn default_header(&self) -> &'static str {
        match self {
            Field::FlyTime => "OSD.flyTime [s]",
            Field::Latitude => "OSD.latitude",
            Field::Longitude => "OSD.longitude",
            Field::AltitudeFt => "OSD.altitude [ft]",
            Field::SpeedMph => "OSD.hSpeed [MPH]",
            Field::BatteryPercent => "BATTERY.chargeLevel",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepted header names per field, tried in order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub fly_time: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub altitude_ft: Vec<String>,
    pub speed_mph: Vec<String>,
    pub battery_percent: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let header = |field: Field| vec![field.default_header().to_string()];
        Self {
            fly_time: header(Field::FlyTime),
            latitude: header(Field::Latitude),
            longitude: header(Field::Longitude),
            altitude_ft: header(Field::AltitudeFt),
            speed_mph: header(Field::SpeedMph),
            battery_percent: header(Field::BatteryPercent),
        }
    }
}

impl ColumnAliases {
    pub fn for_field(&self, field: Field) -> &[String] {
        match field {
            Field::FlyTime => &self.fly_time,
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
            Field::AltitudeFt => &self.altitude_ft,
            Field::SpeedMph => &self.speed_mph,
            Field::BatteryPercent => &self.battery_percent,
        }
    }
}

/// Position of each required field in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; FIELD_COUNT],
}

impl ColumnMap {
    pub fn resolve(headers: &StringRecord, aliases: &ColumnAliases) -> Result<Self, ImportError> {
        let normalized: Vec<String> = headers.iter().map(normalize).collect();

        let mut indices = [0; FIELD_COUNT];
        let mut missing = Vec::new();

        for field in Field::ALL {
            let position = aliases
                .for_field(field)
                .iter()
                .map(|alias| normalize(alias))
                .find_map(|alias| normalized.iter().position(|h| *h == alias));

            match position {
                Some(idx) => indices[field as usize] = idx,
                None => missing.push(field),
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::HeaderMismatch { missing });
        }

        Ok(ColumnMap { indices })
    }

    pub fn index(&self, field: Field) -> usize {
        self.indices[field as usize]
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
