//! Loading interaction logs from CSV, plus a synthetic generator for
//! testing and benchmarking.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv;
use failure;
use rand::Rng;

use data::{Interaction, Interactions};
use Timestamp;

/// Dataset error types.
#[derive(Debug, Fail)]
pub enum DataError {
    /// A required column is missing or empty.
    #[fail(display = "Line {}: missing required field `{}`.", line, field)]
    MissingField {
        /// Line of the offending record.
        line: u64,
        /// Name of the missing column.
        field: &'static str,
    },
    /// A timestamp could not be parsed.
    #[fail(display = "Line {}: cannot parse timestamp `{}`.", line, value)]
    InvalidTimestamp {
        /// Line of the offending record.
        line: u64,
        /// The raw timestamp value.
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct Record {
    user: Option<String>,
    item: Option<String>,
    timestamp: Option<String>,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD[ HH:MM[:SS[.fff]]]` (with either a space
/// or a `T` separator) and integer Unix epochs in seconds.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|datetime| datetime.naive_utc())
}

fn required(value: Option<String>, line: u64, field: &'static str) -> Result<String, DataError> {
    match value {
        Some(ref value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(DataError::MissingField { line, field }),
    }
}

/// Read interactions from headered CSV with at least the columns
/// `user`, `item` and `timestamp`. Other columns are ignored.
///
/// Any malformed record fails the whole read.
pub fn read_interactions<R: Read>(reader: R) -> Result<Interactions, failure::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut interactions = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |position| position.line());
        let row: Record = record.deserialize(Some(&headers))?;

        let user = required(row.user, line, "user")?;
        let item = required(row.item, line, "item")?;
        let raw_timestamp = required(row.timestamp, line, "timestamp")?;
        let timestamp = parse_timestamp(&raw_timestamp).ok_or_else(|| DataError::InvalidTimestamp {
            line,
            value: raw_timestamp.clone(),
        })?;

        interactions.push(Interaction::new(user, item, timestamp));
    }

    debug!(records = interactions.len(), "read interactions");

    Ok(Interactions::from(interactions))
}

/// Load interactions from a CSV file on disk.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Interactions, failure::Error> {
    let file = File::open(path.as_ref())?;
    let interactions = read_interactions(file)?;

    info!(
        path = %path.as_ref().display(),
        interactions = interactions.len(),
        "loaded dataset"
    );

    Ok(interactions)
}

/// Generate a random interaction log.
///
/// Users are named `u0000`, `u0001`, ..., items `i0000`, ...; each user
/// interacts with `per_user` uniformly drawn items at strictly
/// increasing hourly timestamps.
pub fn synthetic<R: Rng>(
    num_users: usize,
    num_items: usize,
    per_user: usize,
    rng: &mut R,
) -> Interactions {
    if num_items == 0 {
        return Interactions::new();
    }

    let start = NaiveDateTime::default();
    let mut interactions = Vec::with_capacity(num_users * per_user);

    for user in 0..num_users {
        for step in 0..per_user {
            let item = rng.gen_range(0..num_items);
            let offset = Duration::hours((user * per_user + step) as i64);

            interactions.push(Interaction::new(
                format!("u{:04}", user),
                format!("i{:04}", item),
                start + offset,
            ));
        }
    }

    Interactions::from(interactions)
}
