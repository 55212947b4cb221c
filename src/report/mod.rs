pub mod credits;
pub mod timeseries;

use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("report has no header row")]
    NoHeader,
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// One source row, every cell kept as raw text. Absent cells are empty
/// strings, never missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    /// The external song key — always the first column, whatever its header.
    pub song_key: String,
    pub title: String,
    pub release_date: String,
    pub image_url: String,
    pub artist: String,
    pub time_series: String,
}

/// Column positions resolved from the header row. The first column is the
/// song key by convention, so named lookups start from the second.
struct Layout {
    title: usize,
    release_date: usize,
    image_url: usize,
    artist: usize,
    time_series: usize,
}

impl Layout {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        if headers.is_empty() {
            return Err(ReportError::NoHeader);
        }
        let find = |name: &'static str| {
            headers
                .iter()
                .skip(1)
                .position(|h| h == name)
                .map(|i| i + 1)
                .ok_or(ReportError::MissingColumn(name))
        };
        Ok(Self {
            title: find("title")?,
            release_date: find("release_date")?,
            image_url: find("image_url")?,
            artist: find("artist")?,
            time_series: find("timeSeries")?,
        })
    }
}

/// Load a report CSV from disk. Any read or parse failure is fatal — there
/// is no partial processing.
pub fn load_report(path: &Path) -> Result<Vec<ReportRow>> {
    let file = std::fs::File::open(path)?;
    read_report(file)
}

/// Read a report from any byte source. Short rows pad with empty strings.
pub fn read_report<R: Read>(reader: R) -> Result<Vec<ReportRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let layout = Layout::resolve(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();
        rows.push(ReportRow {
            song_key: cell(0),
            title: cell(layout.title),
            release_date: cell(layout.release_date),
            image_url: cell(layout.image_url),
            artist: cell(layout.artist),
            time_series: cell(layout.time_series),
        });
    }
    Ok(rows)
}
