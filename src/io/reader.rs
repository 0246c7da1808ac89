//! Readers for the supported input formats.
//!
//! Two line-oriented formats are recognized:
//!
//! - `simple`: one numeric value per non-blank line, one record per file;
//! - `multi-record`: each non-blank line holds a line index followed by one
//!   value per channel; the columns are transposed into one series per
//!   channel.
//!
//! Both formats support truncation to the first N values (simple) or first N
//! lines (multi-record). A malformed line aborts processing of that input
//! only, with the offending line number in the error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::Series;
use crate::error::{Result, SampenError};

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// One value per non-blank line.
    #[default]
    Simple,
    /// Line index plus one value per channel, transposed on read.
    MultiRecord,
}

/// Read a simple-format record: one value per non-blank line.
///
/// `limit` truncates to the first N parsed values; `None` reads everything.
pub fn read_simple<R: BufRead>(reader: R, limit: Option<usize>) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SampenError::InvalidFormat {
            line: line_no + 1,
            message: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = parse_value(trimmed, line_no + 1)?;
        values.push(value);
        if limit.is_some_and(|n| values.len() == n) {
            break;
        }
    }
    Ok(values)
}

/// Read a multi-record file: line index followed by one value per channel.
///
/// Returns one value vector per channel. `limit` truncates to the first N
/// non-blank lines. Every line must carry the same number of channels.
pub fn read_multi_record<R: BufRead>(reader: R, limit: Option<usize>) -> Result<Vec<Vec<f64>>> {
    let mut channels: Vec<Vec<f64>> = Vec::new();
    let mut rows = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SampenError::InvalidFormat {
            line: line_no + 1,
            message: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // First column is the line index; the rest are channel values.
        let mut fields = trimmed.split_whitespace();
        let _index = fields.next();
        let values: Vec<f64> = fields
            .map(|field| parse_value(field, line_no + 1))
            .collect::<Result<_>>()?;
        if values.is_empty() {
            return Err(SampenError::InvalidFormat {
                line: line_no + 1,
                message: "expected at least one channel value after the line index".to_string(),
            });
        }

        if channels.is_empty() {
            channels = vec![Vec::new(); values.len()];
        } else if values.len() != channels.len() {
            return Err(SampenError::InvalidFormat {
                line: line_no + 1,
                message: format!(
                    "expected {} channel values, got {}",
                    channels.len(),
                    values.len()
                ),
            });
        }
        for (channel, value) in channels.iter_mut().zip(values) {
            channel.push(value);
        }
        rows += 1;
        if limit.is_some_and(|n| rows == n) {
            break;
        }
    }
    Ok(channels)
}

/// Load one or more named series from a file.
///
/// Simple format yields a single series named after the path; multi-record
/// yields one per channel, named `"<path> (<channel>)"` with 1-based channel
/// numbers.
pub fn load_series(
    path: impl AsRef<Path>,
    format: InputFormat,
    limit: Option<usize>,
) -> Result<Vec<Series>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SampenError::InvalidFormat {
        line: 0,
        message: format!("{}: {}", path.display(), e),
    })?;
    let reader = BufReader::new(file);
    let name = path.display().to_string();

    match format {
        InputFormat::Simple => {
            let values = read_simple(reader, limit)?;
            Ok(vec![Series::new(name, values)?])
        }
        InputFormat::MultiRecord => {
            let channels = read_multi_record(reader, limit)?;
            if channels.is_empty() {
                return Err(SampenError::EmptySeries);
            }
            channels
                .into_iter()
                .enumerate()
                .map(|(i, values)| Series::new(format!("{} ({})", name, i + 1), values))
                .collect()
        }
    }
}

fn parse_value(field: &str, line: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| SampenError::InvalidFormat {
        line,
        message: format!("expected a number, got {field:?}"),
    })
}
