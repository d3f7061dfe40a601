use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use utoipa::ToSchema;

use crate::importer::{FlightSummary, ImportedFlight, LineString, Sample};

const SUMMARY_FILE: &str = "summary.json";
const SAMPLES_FILE: &str = "samples.json";
const PARTIAL_PREFIX: char = '.';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlightEntry {
    pub id: String,
    #[serde(flatten)]
    pub summary: FlightSummary,
    pub sample_count: usize,
}

/// A persisted sample, linked back to the flight it was imported with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSample {
    pub flight_id: String,
    #[serde(flatten)]
    pub sample: Sample,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Flight not found: {0}")]
    NotFound(String),
    #[error("Invalid flight id: {0}")]
    InvalidId(String),
}

/// File-backed flight store: one folder per flight holding its summary and samples.
pub struct Storage {
    base: PathBuf,
}

impl Storage {
    pub fn new(base: PathBuf) -> Self {
        Storage { base }
    }

    fn flight_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.base.join(id))
    }

    /// Assigns an id, links every sample to it and writes the flight in one step.
    /// A flight is either fully visible afterwards or not at all.
    pub fn save_flight(&self, flight: ImportedFlight) -> Result<FlightEntry, StorageError> {
        let id = self.generate_id(flight.summary.start_time);
        let entry = FlightEntry {
            id: id.clone(),
            summary: flight.summary,
            sample_count: flight.samples.len(),
        };
        let samples: Vec<StoredSample> = flight
            .samples
            .into_iter()
            .map(|sample| StoredSample {
                flight_id: id.clone(),
                sample,
            })
            .collect();

        let partial = self.base.join(format!("{}{}", PARTIAL_PREFIX, id));
        if let Err(e) = self.write_flight(&partial, &entry, &samples) {
            let _ = std::fs::remove_dir_all(&partial);
            return Err(e);
        }

        Ok(entry)
    }

    fn write_flight(
        &self,
        partial: &Path,
        entry: &FlightEntry,
        samples: &[StoredSample],
    ) -> Result<(), StorageError> {
        let target = self.flight_path(&entry.id)?;
        std::fs::create_dir_all(partial)?;
        std::fs::write(partial.join(SAMPLES_FILE), serde_json::to_vec(samples)?)?;
        std::fs::write(partial.join(SUMMARY_FILE), serde_json::to_vec_pretty(entry)?)?;
        std::fs::rename(partial, target)?;
        Ok(())
    }

    pub fn list_flights(&self) -> Result<Vec<FlightEntry>, StorageError> {
        if !self.base.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in self.base.read_dir()? {
            let entry = entry?;
            let path = entry.path();

            let hidden = entry
                .file_name()
                .to_str()
                .map_or(true, |name| name.starts_with(PARTIAL_PREFIX));
            if hidden || !path.is_dir() {
                continue;
            }

            let content = match std::fs::read(path.join(SUMMARY_FILE)) {
                Ok(content) => content,
                Err(e) => {
                    error!("Failed to read flight {}: {}", path.display(), e);
                    continue;
                }
            };

            match serde_json::from_slice::<FlightEntry>(&content) {
                Ok(flight) => entries.push(flight),
                Err(e) => error!("Failed to parse flight {}: {}", path.display(), e),
            }
        }

        entries.sort_by_key(|e| e.summary.start_time);
        Ok(entries)
    }

    pub fn get_flight(&self, id: &str) -> Result<FlightEntry, StorageError> {
        let content = self.read_file(id, SUMMARY_FILE)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Samples of a flight ordered by timestamp; equal timestamps keep import order.
    pub fn samples(&self, id: &str) -> Result<Vec<StoredSample>, StorageError> {
        let content = self.read_file(id, SAMPLES_FILE)?;
        let mut samples: Vec<StoredSample> = serde_json::from_slice(&content)?;
        samples.sort_by_key(|s| s.sample.timestamp);
        Ok(samples)
    }

    pub fn track(&self, id: &str) -> Result<LineString, StorageError> {
        let samples = self.samples(id)?;
        Ok(LineString::from_samples(samples.iter().map(|s| &s.sample)))
    }

    pub fn delete_flight(&self, id: &str) -> Result<(), StorageError> {
        let path = self.flight_path(id)?;

        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        std::fs::remove_dir_all(path)?;
        Ok(())
    }

    fn read_file(&self, id: &str, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.flight_path(id)?;

        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        Ok(std::fs::read(path.join(name))?)
    }

    fn generate_id(&self, start: DateTime<Utc>) -> String {
        let uuid = uuid::Uuid::new_v4();
        let timestamp = start.format("%Y%m%dT%H%M%SZ");
        format!("{}_{}", timestamp, uuid)
    }
}
