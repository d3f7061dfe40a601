mod aggregator;
mod columns;
mod decoder;
mod error;
mod geodesy;
mod preamble;
mod types;
mod units;

pub use columns::ColumnAliases;
pub use error::ImportError;
pub use types::{FlightSummary, ImportedFlight, LineString, Sample};

use aggregator::Aggregator;
use decoder::RecordDecoder;
use preamble::strip_preamble;

use chrono::{DateTime, Utc};
use std::io::Read;

/// Imports one CSV flight log in a single forward pass.
///
/// `anchor` becomes the timestamp of the first sample. Any error aborts the
/// whole import; nothing partial is returned.
pub fn import_csv<R: Read>(
    input: R,
    source_name: &str,
    anchor: DateTime<Utc>,
    aliases: &ColumnAliases,
) -> Result<ImportedFlight, ImportError> {
    let mut decoder = RecordDecoder::new(strip_preamble(input)?, aliases)?;

    let aggregator = decoder.try_fold(
        Aggregator::new(anchor),
        |mut aggregator, record| -> Result<_, ImportError> {
            aggregator.push(record?)?;
            Ok(aggregator)
        },
    )?;

    let flight = aggregator.finish(source_name);
    log::info!(
        "Imported {}: {} samples, {:.1} m flown",
        source_name,
        flight.samples.len(),
        flight.summary.distance_meters
    );

    Ok(flight)
}
