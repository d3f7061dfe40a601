use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::str::FromStr;

use super::columns::{ColumnAliases, ColumnMap, Field};
use super::error::{ImportError, RowDefect};
use super::types::TelemetryRecord;

/// Lazily decodes data rows into [`TelemetryRecord`]s, one per `next()`.
///
/// Blank or missing cells decode to zero. A cell that is present but does not
/// parse aborts with [`ImportError::MalformedRow`]. Only the mapped cells are
/// decoded as UTF-8; other columns may hold arbitrary bytes.
pub struct RecordDecoder<R> {
    reader: csv::Reader<R>,
    columns: ColumnMap,
    record: ByteRecord,
    row: u64,
}

impl<R: Read> RecordDecoder<R> {
    /// Reads the header row and checks every required field is present.
    pub fn new(input: R, aliases: &ColumnAliases) -> Result<Self, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let headers: StringRecord = reader
            .byte_headers()?
            .iter()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect();
        let columns = ColumnMap::resolve(&headers, aliases)?;
        log::debug!("Resolved telemetry columns: {:?}", columns);

        Ok(RecordDecoder {
            reader,
            columns,
            record: ByteRecord::new(),
            row: 0,
        })
    }

    fn decode(&self) -> Result<TelemetryRecord, ImportError> {
        Ok(TelemetryRecord {
            elapsed_s: self.number(Field::FlyTime)?,
            latitude: self.number(Field::Latitude)?,
            longitude: self.number(Field::Longitude)?,
            altitude_ft: self.number(Field::AltitudeFt)?,
            speed_mph: self.number(Field::SpeedMph)?,
            battery_percent: self.battery()?,
        })
    }

    fn cell(&self, field: Field) -> Result<Option<&str>, ImportError> {
        let Some(bytes) = self.record.get(self.columns.index(field)) else {
            return Ok(None);
        };
        let text = std::str::from_utf8(bytes).map_err(|_| {
            self.malformed(field, &String::from_utf8_lossy(bytes), RowDefect::NotUtf8)
        })?;

        let text = text.trim();
        Ok((!text.is_empty()).then_some(text))
    }

    fn number(&self, field: Field) -> Result<f64, ImportError> {
        self.parse(field, |v: f64| v.is_finite().then_some(v))
    }

    fn battery(&self) -> Result<u8, ImportError> {
        self.parse(Field::BatteryPercent, |v: i64| {
            u8::try_from(v).ok().filter(|pct| *pct <= 100)
        })
    }

    /// Parses a cell as `T`, then narrows it with `accept`. A `None` from
    /// `accept` is reported as out of range.
    fn parse<T, U>(&self, field: Field, accept: impl Fn(T) -> Option<U>) -> Result<U, ImportError>
    where
        T: FromStr,
        U: Default,
    {
        let Some(raw) = self.cell(field)? else {
            return Ok(U::default());
        };

        let value = raw
            .parse::<T>()
            .map_err(|_| self.malformed(field, raw, RowDefect::Unparseable))?;
        accept(value).ok_or_else(|| self.malformed(field, raw, RowDefect::OutOfRange))
    }

    fn malformed(&self, field: Field, value: &str, defect: RowDefect) -> ImportError {
        ImportError::MalformedRow {
            row: self.row,
            column: field,
            value: value.to_string(),
            defect,
        }
    }
}

impl<R: Read> Iterator for RecordDecoder<R> {
    type Item = Result<TelemetryRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                self.row += 1;
                Some(self.decode())
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}
