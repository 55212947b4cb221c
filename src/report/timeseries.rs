use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimeSeriesError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid date `{0}`")]
    Date(String),
    #[error("non-integer value `{0}`")]
    Integer(String),
}

/// One dated observation from a song's embedded time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub streams: Option<i64>,
    pub popularity: Option<i32>,
}

/// Wire shape of one series element. Counts arrive as JSON numbers or as
/// numeric strings depending on the export; unknown keys are ignored.
#[derive(Deserialize)]
struct RawObservation {
    date: Option<String>,
    #[serde(rename = "spotify-streams")]
    streams: Option<Value>,
    #[serde(rename = "spotify-popularity")]
    popularity: Option<Value>,
}

/// Parse one row's embedded JSON time series.
///
/// Elements without a `date` are dropped individually. Any malformed
/// element — bad JSON, a date that won't parse, a count that isn't an
/// integer — fails the whole field; the caller swallows that per row.
pub fn parse_series(raw: &str) -> Result<Vec<Observation>, TimeSeriesError> {
    let elements: Vec<RawObservation> = serde_json::from_str(raw)?;

    let mut observations = Vec::with_capacity(elements.len());
    for element in elements {
        let Some(date) = element.date else {
            continue;
        };
        let date = parse_date(&date)?;
        let streams = coerce_int(element.streams)?;
        let popularity = match coerce_int(element.popularity)? {
            Some(v) => {
                Some(i32::try_from(v).map_err(|_| TimeSeriesError::Integer(v.to_string()))?)
            }
            None => None,
        };
        observations.push(Observation { date, streams, popularity });
    }
    Ok(observations)
}

/// Truncate at the `T` separator, then require a plain calendar date.
fn parse_date(raw: &str) -> Result<NaiveDate, TimeSeriesError> {
    let day = match raw.split_once('T') {
        Some((day, _)) => day,
        None => raw,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| TimeSeriesError::Date(raw.to_string()))
}

/// Integer coercion: JSON null and absent are None, numbers pass through
/// (fractions truncate), numeric strings parse. Everything else fails.
fn coerce_int(value: Option<Value>) -> Result<Option<i64>, TimeSeriesError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| TimeSeriesError::Integer(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| TimeSeriesError::Integer(s)),
        other => Err(TimeSeriesError::Integer(other.to_string())),
    }
}
