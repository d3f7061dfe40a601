use std::io::{BufRead, BufReader, Chain, Cursor, Read};

use super::error::ImportError;

/// Some spreadsheet exporters declare the delimiter on a line of its own, e.g. `sep=,`.
const SEPARATOR_MARKER: &[u8] = b"sep=";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Input with the separator declaration (if any) removed and the first line replayed.
pub type Normalized<R> = Chain<Cursor<Vec<u8>>, BufReader<R>>;

/// Reads exactly one line of lookahead. A separator declaration is dropped;
/// anything else is handed back in front of the remaining stream.
pub fn strip_preamble<R: Read>(input: R) -> Result<Normalized<R>, ImportError> {
    let mut reader = BufReader::new(input);
    let mut first_line = Vec::new();

    if reader.read_until(b'\n', &mut first_line)? == 0 {
        return Err(ImportError::EmptyInput);
    }

    if first_line.starts_with(UTF8_BOM) {
        first_line.drain(..UTF8_BOM.len());
    }

    if is_separator_declaration(&first_line) {
        log::debug!(
            "Discarding separator declaration '{}'",
            String::from_utf8_lossy(&first_line).trim_end()
        );
        first_line.clear();
    }

    Ok(Cursor::new(first_line).chain(reader))
}

fn is_separator_declaration(line: &[u8]) -> bool {
    line.len() >= SEPARATOR_MARKER.len()
        && line[..SEPARATOR_MARKER.len()].eq_ignore_ascii_case(SEPARATOR_MARKER)
}
