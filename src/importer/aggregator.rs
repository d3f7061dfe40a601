use chrono::{DateTime, Duration, Utc};

use super::columns::Field;
use super::error::{ImportError, RowDefect};
use super::geodesy::haversine_m;
use super::types::{FlightSummary, ImportedFlight, Sample, TelemetryRecord};
use super::units::{feet_to_meters, mph_to_mps};

/// Battery floor before any row has been seen.
pub const INITIAL_MIN_BATTERY: u8 = 100;

/// Folds decoded rows, in order, into samples and running flight statistics.
///
/// Timestamps are synthetic: the log only carries elapsed flight time, so every
/// sample is placed at `anchor + (elapsed - first_elapsed)`, rounded half up to the millisecond.
#[derive(Debug)]
pub struct Aggregator {
    anchor: DateTime<Utc>,
    first_elapsed_s: Option<f64>,
    previous_position: Option<(f64, f64)>,
    distance_m: f64,
    max_altitude_m: f64,
    min_battery_percent: u8,
    samples: Vec<Sample>,
}

impl Aggregator {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            first_elapsed_s: None,
            previous_position: None,
            distance_m: 0.0,
            max_altitude_m: f64::NEG_INFINITY,
            min_battery_percent: INITIAL_MIN_BATTERY,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, record: TelemetryRecord) -> Result<(), ImportError> {
        let timestamp = self.timestamp_for(record.elapsed_s)?;

        if let Some((lat, lon)) = self.previous_position {
            self.distance_m += haversine_m(lat, lon, record.latitude, record.longitude);
        }
        self.previous_position = Some((record.latitude, record.longitude));

        let altitude = feet_to_meters(record.altitude_ft);
        self.max_altitude_m = self.max_altitude_m.max(altitude);
        self.min_battery_percent = self.min_battery_percent.min(record.battery_percent);

        self.samples.push(Sample {
            timestamp,
            latitude: record.latitude,
            longitude: record.longitude,
            altitude,
            speed: mph_to_mps(record.speed_mph),
            battery_percent: record.battery_percent,
        });

        Ok(())
    }

    fn timestamp_for(&mut self, elapsed_s: f64) -> Result<DateTime<Utc>, ImportError> {
        let first = *self.first_elapsed_s.get_or_insert(elapsed_s);
        // half up, so -2.5 ms lands on -2 rather than -3
        let offset_ms = ((elapsed_s - first) * 1000.0 + 0.5).floor() as i64;

        Duration::try_milliseconds(offset_ms)
            .and_then(|offset| self.anchor.checked_add_signed(offset))
            .ok_or_else(|| ImportError::MalformedRow {
                row: self.samples.len() as u64 + 1,
                column: Field::FlyTime,
                value: elapsed_s.to_string(),
                defect: RowDefect::OutOfRange,
            })
    }

    pub fn finish(self, source_name: impl Into<String>) -> ImportedFlight {
        let (start_time, end_time) = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => (self.anchor, self.anchor),
        };

        let max_altitude_meters = if self.samples.is_empty() {
            0.0
        } else {
            self.max_altitude_m
        };

        ImportedFlight {
            summary: FlightSummary {
                start_time,
                end_time,
                distance_meters: self.distance_m,
                max_altitude_meters,
                min_battery_percent: self.min_battery_percent,
                source_name: source_name.into(),
            },
            samples: self.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn record(elapsed_s: f64, lat: f64, lon: f64, alt_ft: f64, batt: u8) -> TelemetryRecord {
        TelemetryRecord {
            elapsed_s,
            latitude: lat,
            longitude: lon,
            altitude_ft: alt_ft,
            speed_mph: 0.0,
            battery_percent: batt,
        }
    }

    #[test]
    fn two_row_flight() {
        let mut agg = Aggregator::new(anchor());
        agg.push(TelemetryRecord {
            speed_mph: 10.0,
            ..record(0.0, 52.0, 13.0, 100.0, 90)
        })
        .unwrap();
        agg.push(TelemetryRecord {
            speed_mph: 12.0,
            ..record(1.0, 52.0009, 13.0, 120.0, 88)
        })
        .unwrap();

        let flight = agg.finish("flight.csv");
        let summary = &flight.summary;

        assert_eq!(flight.samples.len(), 2);
        assert!((summary.distance_meters - 100.07).abs() < 1.0);
        assert!((summary.max_altitude_meters - 36.576).abs() < 1e-9);
        assert_eq!(summary.min_battery_percent, 88);
        assert_eq!(summary.source_name, "flight.csv");
        assert_eq!(summary.start_time, anchor());
        assert_eq!(
            flight.samples[1].timestamp - flight.samples[0].timestamp,
            Duration::milliseconds(1000)
        );
        assert_eq!(summary.end_time, flight.samples[1].timestamp);
        assert!((flight.samples[0].speed - 4.4704).abs() < 1e-9);
        assert!((flight.samples[1].altitude - 36.576).abs() < 1e-9);
    }

    #[test]
    fn empty_flight_is_anchored_and_normalized() {
        let flight = Aggregator::new(anchor()).finish("empty.csv");
        let summary = flight.summary;

        assert!(flight.samples.is_empty());
        assert_eq!(summary.start_time, anchor());
        assert_eq!(summary.end_time, anchor());
        assert_eq!(summary.distance_meters, 0.0);
        assert_eq!(summary.max_altitude_meters, 0.0);
        assert_eq!(summary.min_battery_percent, 100);
    }

    #[test]
    fn single_sample_has_no_distance() {
        let mut agg = Aggregator::new(anchor());
        agg.push(record(42.0, 10.0, 10.0, 5.0, 100)).unwrap();
        let flight = agg.finish("one.csv");

        assert_eq!(flight.summary.distance_meters, 0.0);
        assert_eq!(flight.summary.start_time, anchor());
        assert_eq!(flight.summary.end_time, anchor());
    }

    #[test]
    fn distance_is_sum_of_consecutive_segments() {
        let points = [
            (52.0, 13.0),
            (52.001, 13.0),
            (52.001, 13.002),
            (52.0, 13.0),
            (52.0, 13.0),
        ];
        let distance_of = |n: usize| {
            let mut agg = Aggregator::new(anchor());
            for (i, (lat, lon)) in points[..n].iter().enumerate() {
                agg.push(record(i as f64, *lat, *lon, 0.0, 50)).unwrap();
            }
            agg.finish("x").summary.distance_meters
        };

        let expected: f64 = points
            .windows(2)
            .map(|w| haversine_m(w[0].0, w[0].1, w[1].0, w[1].1))
            .sum();
        assert!((distance_of(points.len()) - expected).abs() < 1e-9);

        for n in 1..points.len() {
            assert!(distance_of(n + 1) >= distance_of(n));
        }
    }

    #[test]
    fn extrema_track_every_row() {
        let mut agg = Aggregator::new(anchor());
        for (i, (alt, batt)) in [(-10.0, 100), (300.0, 95), (50.0, 97), (299.0, 12), (0.0, 40)]
            .into_iter()
            .enumerate()
        {
            agg.push(record(i as f64, 0.0, 0.0, alt, batt)).unwrap();
        }
        let summary = agg.finish("x").summary;

        assert_eq!(summary.max_altitude_meters, 300.0 * 0.3048);
        assert_eq!(summary.min_battery_percent, 12);
    }

    #[test]
    fn battery_never_below_hundred_reports_hundred() {
        let mut agg = Aggregator::new(anchor());
        agg.push(record(0.0, 0.0, 0.0, 0.0, 100)).unwrap();
        agg.push(record(1.0, 0.0, 0.0, 0.0, 100)).unwrap();
        assert_eq!(agg.finish("x").summary.min_battery_percent, 100);
    }

    #[test]
    fn negative_altitudes_are_kept() {
        let mut agg = Aggregator::new(anchor());
        agg.push(record(0.0, 0.0, 0.0, -20.0, 100)).unwrap();
        agg.push(record(1.0, 0.0, 0.0, -10.0, 100)).unwrap();
        assert_eq!(agg.finish("x").summary.max_altitude_meters, -10.0 * 0.3048);
    }

    #[test]
    fn timestamps_follow_elapsed_time_spacing() {
        let elapsed = [12.3, 12.4, 12.4, 13.0, 15.25];
        let mut agg = Aggregator::new(anchor());
        for t in elapsed {
            agg.push(record(t, 0.0, 0.0, 0.0, 100)).unwrap();
        }
        let flight = agg.finish("x");

        for (pair, times) in flight.samples.windows(2).zip(elapsed.windows(2)) {
            let delta = pair[1].timestamp - pair[0].timestamp;
            let expected = ((times[1] - elapsed[0]) * 1000.0).round() as i64
                - ((times[0] - elapsed[0]) * 1000.0).round() as i64;
            assert_eq!(delta.num_milliseconds(), expected);
            assert!(pair[1].timestamp >= pair[0].timestamp);
        }
        assert_eq!(
            flight.summary.end_time - flight.summary.start_time,
            Duration::milliseconds(2950)
        );
    }

    #[test]
    fn samples_keep_arrival_order() {
        let mut agg = Aggregator::new(anchor());
        agg.push(record(5.0, 1.0, 1.0, 0.0, 100)).unwrap();
        agg.push(record(4.0, 2.0, 2.0, 0.0, 100)).unwrap();
        let flight = agg.finish("x");

        assert_eq!(flight.samples[0].latitude, 1.0);
        assert_eq!(flight.samples[1].latitude, 2.0);
        assert_eq!(
            flight.samples[1].timestamp,
            anchor() - Duration::milliseconds(1000)
        );
    }

    #[test]
    fn unrepresentable_elapsed_time_is_rejected() {
        let mut agg = Aggregator::new(anchor());
        agg.push(record(0.0, 0.0, 0.0, 0.0, 100)).unwrap();

        match agg.push(record(1e300, 0.0, 0.0, 0.0, 100)) {
            Err(ImportError::MalformedRow {
                row,
                column,
                defect,
                ..
            }) => {
                assert_eq!(row, 2);
                assert_eq!(column, Field::FlyTime);
                assert_eq!(defect, RowDefect::OutOfRange);
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
        assert_eq!(agg.finish("x").samples.len(), 1);
    }

    #[test]
    fn half_milliseconds_round_up() {
        let mut agg = Aggregator::new(anchor());
        for t in [0.0, 0.0025, -0.0025] {
            agg.push(record(t, 0.0, 0.0, 0.0, 100)).unwrap();
        }
        let flight = agg.finish("x");

        assert_eq!(flight.samples[1].timestamp, anchor() + Duration::milliseconds(3));
        assert_eq!(flight.samples[2].timestamp, anchor() - Duration::milliseconds(2));
    }
}
