#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Offline loader for the US-Accidents CSV export.
//!
//! Reads the CSV row by row, converts each usable row into an
//! [`AccidentRecord`], writes them to the accidents `DuckDB` in batches,
//! and finally rebuilds the summary tables the query side reads from.

pub mod row;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use accident_risk_database::DbError;
use accident_risk_database::records::insert_records;
use accident_risk_database::summaries::refresh_summaries;
use accident_risk_database_models::AccidentRecord;
use duckdb::Connection;

use crate::row::{CsvRow, SkipReason};

/// Rows written per batch when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// Number of malformed rows reported individually before going quiet.
const MAX_LOGGED_MALFORMED: u64 = 10;

/// Errors that can occur while loading accident data.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// CSV read error that cannot be attributed to a single row.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for a single load run.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Stop after this many accepted records.
    pub limit: Option<u64>,
    /// Records per INSERT batch.
    pub batch_size: usize,
    /// Rebuild the summary tables once all records are written.
    pub refresh_summaries: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            limit: None,
            batch_size: DEFAULT_BATCH_SIZE,
            refresh_summaries: true,
        }
    }
}

/// Outcome of a load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Data rows read from the CSV (header excluded).
    pub rows_read: u64,
    /// Records written to the database.
    pub records_written: u64,
    /// Rows whose field count or encoding did not parse.
    pub skipped_malformed: u64,
    /// Rows without an id.
    pub skipped_missing_id: u64,
    /// Rows with an unusable start time.
    pub skipped_start_time: u64,
    /// Rows without coordinates.
    pub skipped_coordinates: u64,
    /// Rows with a severity outside 1-4.
    pub skipped_severity: u64,
}

impl IngestSummary {
    /// Total rows not loaded, for any reason.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped_malformed
            + self.skipped_missing_id
            + self.skipped_start_time
            + self.skipped_coordinates
            + self.skipped_severity
    }

    const fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingId => self.skipped_missing_id += 1,
            SkipReason::BadStartTime => self.skipped_start_time += 1,
            SkipReason::MissingCoordinates => self.skipped_coordinates += 1,
            SkipReason::BadSeverity => self.skipped_severity += 1,
        }
    }
}

/// Loads the CSV file at `csv_path` into `conn`.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be opened, the CSV stream
/// fails at the I/O level, or a database write fails.
pub fn load_csv(
    conn: &Connection,
    csv_path: &Path,
    options: LoadOptions,
) -> Result<IngestSummary, IngestError> {
    log::info!("Loading accidents from {}", csv_path.display());
    let file = File::open(csv_path)?;
    load_reader(conn, file, options)
}

/// Loads CSV data from any reader into `conn`.
///
/// Rows that fail to parse are counted and skipped; only I/O failures and
/// database errors abort the run. Records already written stay written if
/// a later batch fails.
///
/// # Errors
///
/// Returns [`IngestError`] on I/O or database failure.
pub fn load_reader<R: Read>(
    conn: &Connection,
    reader: R,
    options: LoadOptions,
) -> Result<IngestSummary, IngestError> {
    let start = Instant::now();
    let batch_size = options.batch_size.max(1);

    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let mut summary = IngestSummary::default();
    let mut batch: Vec<AccidentRecord> = Vec::with_capacity(batch_size);
    let mut accepted = 0u64;

    for result in csv_reader.deserialize::<CsvRow>() {
        if options.limit.is_some_and(|limit| accepted >= limit) {
            log::info!("Reached record limit ({accepted}), stopping CSV parse");
            break;
        }

        summary.rows_read += 1;

        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                summary.skipped_malformed += 1;
                if summary.skipped_malformed <= MAX_LOGGED_MALFORMED {
                    log::warn!("Skipping malformed row: {e}");
                }
                continue;
            }
        };

        match row.into_record() {
            Ok(record) => {
                accepted += 1;
                batch.push(record);
            }
            Err(reason) => {
                log::trace!("Skipping row {}: {reason:?}", summary.rows_read);
                summary.record_skip(reason);
            }
        }

        if batch.len() >= batch_size {
            summary.records_written += insert_records(conn, &batch)?;
            batch.clear();
            log::info!("  Processed {} records...", summary.records_written);
        }
    }

    if !batch.is_empty() {
        summary.records_written += insert_records(conn, &batch)?;
    }

    log::info!(
        "Loaded {} records ({} skipped) in {:.1}s",
        summary.records_written,
        summary.skipped(),
        start.elapsed().as_secs_f64(),
    );

    if options.refresh_summaries {
        summarize(conn)?;
    }

    Ok(summary)
}

/// Rebuilds the summary tables from the `accidents` table.
///
/// # Errors
///
/// Returns [`IngestError::Database`] if any statement fails.
pub fn summarize(conn: &Connection) -> Result<(), IngestError> {
    let start = Instant::now();
    log::info!("Refreshing summary tables...");
    refresh_summaries(conn)?;
    log::info!(
        "Summary tables refreshed in {:.1}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use accident_risk_database::records::{get_record_count, get_severity_distribution};
    use accident_risk_database::schema::has_summary_tables;

    use super::*;

    const HEADER: &str = "ID,Source,Severity,Start_Time,End_Time,Start_Lat,Start_Lng,End_Lat,End_Lng,Distance(mi),Description,Street,City,County,State,Zipcode,Country,Timezone,Airport_Code,Weather_Timestamp,Temperature(F),Wind_Chill(F),Humidity(%),Pressure(in),Visibility(mi),Wind_Direction,Wind_Speed(mph),Precipitation(in),Weather_Condition,Amenity,Bump,Crossing,Give_Way,Junction,No_Exit,Railway,Roundabout,Station,Stop,Traffic_Calming,Traffic_Signal,Turning_Loop,Sunrise_Sunset,Civil_Twilight,Nautical_Twilight,Astronomical_Twilight";

    fn row(id: &str, severity: &str, start: &str, lat: &str, junction: &str) -> String {
        format!(
            "{id},Source2,{severity},{start},2016-02-08 06:16:00,{lat},-84.06,,,0.01,Right lane blocked due to accident on I-70 Eastbound,I-70 E,Dayton,Montgomery,OH,45424,US,US/Eastern,KFFO,2016-02-08 05:58:00,36.9,,91.0,29.68,10.0,Calm,,0.02,Light Rain,False,False,False,False,{junction},False,False,False,False,False,False,True,False,Night,Night,Night,Night"
        )
    }

    fn csv(rows: &[String]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    fn sample() -> String {
        csv(&[
            row("A-1", "3", "2016-02-08 05:46:00", "39.865", "True"),
            row("A-2", "2", "2016-02-08 05:46:00.000000000", "39.928", "False"),
            row("A-3", "7", "2016-02-08 05:46:00", "39.063", "False"),
            row("A-4", "2", "not a time", "39.747", "False"),
            row("A-5", "2", "2016-02-08 05:46:00", "", "False"),
            "A-6,Source2,2".to_string(),
            row("A-7", "4", "2016-02-08 05:46:00", "39.627", "True"),
        ])
    }

    #[test]
    fn loads_valid_rows_and_counts_skips() {
        let conn = accident_risk_database::open_in_memory().unwrap();
        let summary = load_reader(&conn, sample().as_bytes(), LoadOptions::default()).unwrap();

        assert_eq!(summary.rows_read, 7);
        assert_eq!(summary.records_written, 3);
        assert_eq!(summary.skipped_severity, 1);
        assert_eq!(summary.skipped_start_time, 1);
        assert_eq!(summary.skipped_coordinates, 1);
        assert_eq!(summary.skipped_malformed, 1);
        assert_eq!(summary.skipped(), 4);

        assert_eq!(get_record_count(&conn).unwrap(), 3);
        assert_eq!(
            get_severity_distribution(&conn).unwrap(),
            vec![(2, 1), (3, 1), (4, 1)]
        );
        assert!(has_summary_tables(&conn).unwrap());
    }

    #[test]
    fn road_flags_and_derived_columns_are_stored() {
        let conn = accident_risk_database::open_in_memory().unwrap();
        load_reader(&conn, sample().as_bytes(), LoadOptions::default()).unwrap();

        let (junction, signal, hour, dow, duration): (bool, bool, i16, i16, f64) = conn
            .query_row(
                "SELECT junction, traffic_signal, hour_of_day, day_of_week, duration_minutes
                 FROM accidents WHERE id = 'A-1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .unwrap();

        assert!(junction);
        assert!(signal);
        assert_eq!(hour, 5);
        assert_eq!(dow, 0);
        assert!((duration - 30.0).abs() < 1e-9);
    }

    #[test]
    fn limit_and_small_batches() {
        let conn = accident_risk_database::open_in_memory().unwrap();
        let options = LoadOptions {
            limit: Some(2),
            batch_size: 1,
            refresh_summaries: false,
        };
        let summary = load_reader(&conn, sample().as_bytes(), options).unwrap();

        assert_eq!(summary.records_written, 2);
        assert_eq!(get_record_count(&conn).unwrap(), 2);
        assert!(!has_summary_tables(&conn).unwrap());
    }

    #[test]
    fn reloading_replaces_by_id() {
        let conn = accident_risk_database::open_in_memory().unwrap();
        load_reader(&conn, sample().as_bytes(), LoadOptions::default()).unwrap();
        load_reader(&conn, sample().as_bytes(), LoadOptions::default()).unwrap();
        assert_eq!(get_record_count(&conn).unwrap(), 3);
    }

    #[test]
    fn header_only_file_loads_nothing() {
        let conn = accident_risk_database::open_in_memory().unwrap();
        let summary = load_reader(&conn, csv(&[]).as_bytes(), LoadOptions::default()).unwrap();
        assert_eq!(summary, IngestSummary::default());
        assert_eq!(get_record_count(&conn).unwrap(), 0);
    }
}
