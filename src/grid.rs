//! Raw CSV grid loading.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::Result;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

fn is_line_break(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// Line breaks in a run of terminator bytes; "\r\n" counts once.
fn count_line_breaks(run: &[u8]) -> usize {
    run.iter()
        .enumerate()
        .filter(|&(i, &b)| !(b == b'\n' && i > 0 && run[i - 1] == b'\r'))
        .count()
}

/// Rows of text cells exactly as they appear in the sheet export.
///
/// Rows are not padded, so a row may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Read a whole CSV file. No header handling: every line is a row.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(mut input: R) -> Result<Self> {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;
        let body_start = if data.starts_with(UTF8_BOM) { UTF8_BOM.len() } else { 0 };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            // The reader skips blank lines; they still occupy a row in the sheet.
            let from = record
                .position()
                .map_or(body_start, |pos| (pos.byte() as usize).max(body_start));
            let start = data[from..]
                .iter()
                .position(|&b| !is_line_break(b))
                .map_or(data.len(), |i| from + i);
            let run_start = data[body_start..start]
                .iter()
                .rposition(|&b| !is_line_break(b))
                .map_or(body_start, |i| body_start + i + 1);
            let breaks = count_line_breaks(&data[run_start..start]);
            let blank = if rows.is_empty() { breaks } else { breaks.saturating_sub(1) };
            rows.extend(std::iter::repeat_with(Vec::new).take(blank));
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> &[String] {
        self.rows.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Cell text, or `None` past the end of a short row.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}
