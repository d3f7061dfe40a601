use std::fmt;
use thiserror::Error;

use super::columns::Field;

/// Why a present cell was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDefect {
    Unparseable,
    OutOfRange,
    NotUtf8,
}

impl fmt::Display for RowDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowDefect::Unparseable => "invalid",
            RowDefect::OutOfRange => "out-of-range",
            RowDefect::NotUtf8 => "non-UTF-8",
        })
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("input is empty")]
    EmptyInput,
    #[error("missing required column(s): {}", format_fields(.missing))]
    HeaderMismatch { missing: Vec<Field> },
    #[error("data row {row}: {defect} {column} value '{value}'")]
    MalformedRow {
        row: u64,
        column: Field,
        value: String,
        defect: RowDefect,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(csv::Error),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return ImportError::Csv(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(e) => ImportError::Io(e),
            other => ImportError::Io(std::io::Error::other(format!("{:?}", other))),
        }
    }
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}
