//! Persistence of extracted journeys in a SQLite store, plus the
//! post-processing passes that flag fastest paths and compute headways.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::config::{FeedMeta, RoutingConfig};
use crate::connection::StopId;
use crate::error::StoreError;
use crate::journeys::Journey;
use crate::labels::{compute_pareto_front, Criteria, LabelTime};
use crate::time::SecondsSinceDatasetStart;

/// Aggregate journey values, used when leg detail is not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyRecord {
    pub origin: StopId,
    pub destination: StopId,
    pub departure_time: SecondsSinceDatasetStart,
    pub arrival_time: SecondsSinceDatasetStart,
    pub n_boardings: u32,
}

/// One row of the journeys table, schema differences covered by options.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJourney {
    pub journey_id: i64,
    pub origin: StopId,
    pub destination: StopId,
    pub departure_time: i64,
    pub arrival_time: i64,
    pub n_boardings: Option<i64>,
    pub movement_duration: Option<i64>,
    pub route: Option<String>,
    pub time_to_prev_journey_fp: Option<i64>,
    pub fastest_path: Option<i64>,
}

const TRIP_ID_WALK: i64 = -1;

const FEED_KEYS: [&str; 5] = [
    "location_name",
    "lat_median",
    "lon_median",
    "start_date",
    "end_date",
];

/// A journey store bound to one SQLite file.
///
/// Imports run in exclusive transactions: the batch reads the current
/// maximum journey id and offsets its own ids inside the same transaction,
/// so repeated imports never collide even across processes.
pub struct JourneyStore {
    conn: Connection,
    track_route: bool,
}

impl JourneyStore {
    /// Create a fresh store. Refuses to touch an existing file.
    pub fn initialize(
        path: &Path,
        config: &RoutingConfig,
        feed: &FeedMeta,
    ) -> Result<Self, StoreError> {
        if path.exists() {
            return Err(StoreError::AlreadyInitialized(PathBuf::from(path)));
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            track_route: config.track_route,
        };
        store.create_tables()?;
        store.write_parameters(config, feed)?;
        info!(path = %path.display(), track_route = store.track_route, "journey store initialized");
        Ok(store)
    }

    /// Open an existing store and check it was built from `feed`.
    pub fn open(path: &Path, feed: &FeedMeta) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::MissingStore(PathBuf::from(path)));
        }
        let conn = Connection::open(path)?;
        for (key, current) in Self::feed_parameters(feed) {
            let stored = read_parameter(&conn, key)?;
            match stored {
                Some(value) if value == current => {}
                Some(value) => {
                    return Err(StoreError::FeedMismatch {
                        key: key.to_string(),
                        stored: value,
                        current,
                    })
                }
                None => {
                    return Err(StoreError::FeedMismatch {
                        key: key.to_string(),
                        stored: "<absent>".to_string(),
                        current,
                    })
                }
            }
        }
        let track_route = read_parameter(&conn, "track_route")?
            .map(|value| value == "true")
            .unwrap_or(false);
        Ok(Self { conn, track_route })
    }

    pub fn track_route(&self) -> bool {
        self.track_route
    }

    fn create_tables(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS parameters(
                 key TEXT UNIQUE,
                 value BLOB)",
            [],
        )?;
        if self.track_route {
            self.conn.execute(
                "CREATE TABLE IF NOT EXISTS journeys(
                     journey_id INTEGER PRIMARY KEY,
                     from_stop_I INT,
                     to_stop_I INT,
                     dep_time INT,
                     arr_time INT,
                     movement_duration INT,
                     route TEXT,
                     time_to_prev_journey_fp INT,
                     fastest_path INT)",
                [],
            )?;
            self.conn.execute(
                "CREATE TABLE IF NOT EXISTS connections(
                     journey_id INT,
                     from_stop_I INT,
                     to_stop_I INT,
                     dep_time INT,
                     arr_time INT,
                     trip_I INT,
                     seq INT,
                     leg_stops TEXT)",
                [],
            )?;
        } else {
            self.conn.execute(
                "CREATE TABLE IF NOT EXISTS journeys(
                     journey_id INTEGER PRIMARY KEY,
                     from_stop_I INT,
                     to_stop_I INT,
                     dep_time INT,
                     arr_time INT,
                     n_boardings INT,
                     time_to_prev_journey_fp INT,
                     fastest_path INT)",
                [],
            )?;
        }
        Ok(())
    }

    fn feed_parameters(feed: &FeedMeta) -> Vec<(&'static str, String)> {
        vec![
            ("location_name", feed.location_name.clone()),
            ("lat_median", feed.lat_median.to_string()),
            ("lon_median", feed.lon_median.to_string()),
            ("start_date", feed.start_date.to_string()),
            ("end_date", feed.end_date.to_string()),
        ]
    }

    fn write_parameters(&self, config: &RoutingConfig, feed: &FeedMeta) -> Result<(), StoreError> {
        let mut entries = Self::feed_parameters(feed);
        entries.push((
            "transfer_margin",
            config.transfer_margin.total_seconds().to_string(),
        ));
        entries.push(("walking_speed", config.walking_speed.to_string()));
        entries.push((
            "analysis_start_time",
            config.analysis_start_time.seconds().to_string(),
        ));
        entries.push((
            "analysis_end_time",
            config.analysis_end_time.seconds().to_string(),
        ));
        entries.push(("multiple_targets", config.multiple_targets.to_string()));
        entries.push(("track_route", config.track_route.to_string()));
        let mut stmt = self
            .conn
            .prepare("INSERT OR REPLACE INTO parameters(key, value) VALUES (?1, ?2)")?;
        for (key, value) in entries {
            stmt.execute(params![key, value])?;
        }
        Ok(())
    }

    /// Insert a batch of aggregate journey rows.
    pub fn import_journeys(&mut self, records: &[JourneyRecord]) -> Result<(), StoreError> {
        debug_assert!(!self.track_route);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)?;
        let last_id = max_journey_id(&tx)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO journeys(
                     journey_id, from_stop_I, to_stop_I, dep_time, arr_time, n_boardings)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (offset, record) in records.iter().enumerate() {
                stmt.execute(params![
                    last_id + 1 + offset as i64,
                    record.origin.0 as i64,
                    record.destination.0 as i64,
                    record.departure_time.seconds(),
                    record.arrival_time.seconds(),
                    record.n_boardings as i64,
                ])?;
            }
        }
        tx.commit()?;
        info!(nb_of_journeys = records.len(), "imported journey batch");
        Ok(())
    }

    /// Insert a batch of journeys with full leg detail.
    ///
    /// Journeys that never leave their origin are skipped.
    pub fn import_journeys_with_route(&mut self, journeys: &[Journey]) -> Result<(), StoreError> {
        debug_assert!(self.track_route);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)?;
        let last_id = max_journey_id(&tx)?;
        let mut journey_id = last_id;
        let mut inserted = 0usize;
        {
            let mut journey_stmt = tx.prepare(
                "INSERT INTO journeys(
                     journey_id, from_stop_I, to_stop_I, dep_time, arr_time,
                     movement_duration, route)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            let mut leg_stmt = tx.prepare(
                "INSERT INTO connections(
                     journey_id, from_stop_I, to_stop_I, dep_time, arr_time,
                     trip_I, seq, leg_stops)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for journey in journeys {
                if journey.origin == journey.destination {
                    debug!(stop = journey.origin.0, "skipping journey that never leaves its origin");
                    continue;
                }
                journey_id += 1;
                journey_stmt.execute(params![
                    journey_id,
                    journey.origin.0 as i64,
                    journey.destination.0 as i64,
                    journey.departure_time.seconds(),
                    journey.arrival_time.seconds(),
                    journey.movement_duration().total_seconds() as i64,
                    join_stops(&journey.route_stops),
                ])?;
                for leg in &journey.legs {
                    leg_stmt.execute(params![
                        journey_id,
                        leg.from_stop.0 as i64,
                        leg.to_stop.0 as i64,
                        leg.departure_time.seconds(),
                        leg.arrival_time.seconds(),
                        leg.trip_id.map(|trip| trip.0 as i64).unwrap_or(TRIP_ID_WALK),
                        leg.seq as i64,
                        join_stops(&leg.leg_stops),
                    ])?;
                }
                inserted += 1;
            }
        }
        tx.commit()?;
        info!(nb_of_journeys = inserted, "imported journey batch with routes");
        Ok(())
    }

    /// Flag, per origin-destination pair, the journeys on the time-only
    /// Pareto frontier. Every row ends up with fastest_path 0 or 1.
    pub fn mark_fastest_paths(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("UPDATE journeys SET fastest_path = 0", [])?;
        let od_pairs: Vec<(i64, i64)> = {
            let mut stmt = tx.prepare(
                "SELECT from_stop_I, to_stop_I FROM journeys GROUP BY from_stop_I, to_stop_I",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<Result<_, _>>()?
        };
        for (origin, destination) in od_pairs {
            let labels: Vec<StoredJourneyLabel> = {
                let mut stmt = tx.prepare(
                    "SELECT journey_id, dep_time, arr_time FROM journeys
                     WHERE from_stop_I = ?1 AND to_stop_I = ?2
                     ORDER BY dep_time ASC",
                )?;
                let rows = stmt.query_map(params![origin, destination], |row| {
                    Ok(StoredJourneyLabel {
                        journey_id: row.get(0)?,
                        criteria: LabelTime::new(
                            SecondsSinceDatasetStart::from_seconds(row.get(1)?),
                            SecondsSinceDatasetStart::from_seconds(row.get(2)?),
                        ),
                    })
                })?;
                rows.collect::<Result<_, _>>()?
            };
            for label in compute_pareto_front(labels) {
                tx.execute(
                    "UPDATE journeys SET fastest_path = 1 WHERE journey_id = ?1",
                    params![label.journey_id],
                )?;
            }
        }
        tx.commit()?;
        info!("fastest paths marked");
        Ok(())
    }

    /// Set, per origin-destination pair, the departure gap between
    /// consecutive fastest-path journeys. The first journey of each pair
    /// keeps a NULL gap.
    pub fn annotate_headways(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let trips: Vec<(i64, i64, i64, i64)> = {
            let mut stmt = tx.prepare(
                "SELECT journey_id, from_stop_I, to_stop_I, dep_time FROM journeys
                 WHERE fastest_path = 1
                 ORDER BY from_stop_I, to_stop_I, dep_time",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            rows.collect::<Result<_, _>>()?
        };
        let mut previous: Option<(i64, i64, i64)> = None;
        for (journey_id, origin, destination, dep_time) in trips {
            if let Some((prev_origin, prev_destination, prev_dep)) = previous {
                if prev_origin == origin && prev_destination == destination {
                    tx.execute(
                        "UPDATE journeys SET time_to_prev_journey_fp = ?1 WHERE journey_id = ?2",
                        params![dep_time - prev_dep, journey_id],
                    )?;
                }
            }
            previous = Some((origin, destination, dep_time));
        }
        tx.commit()?;
        info!("headways annotated");
        Ok(())
    }

    /// Compact the file and build the lookup indexes, once imports settle.
    pub fn create_indices(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "VACUUM;
             ANALYZE;
             CREATE INDEX IF NOT EXISTS idx_journeys_jid ON journeys (journey_id);
             CREATE INDEX IF NOT EXISTS idx_journeys_fid ON journeys (from_stop_I);
             CREATE INDEX IF NOT EXISTS idx_journeys_tid ON journeys (to_stop_I);",
        )?;
        if self.track_route {
            self.conn.execute_batch(
                "CREATE INDEX IF NOT EXISTS idx_connections_jid ON connections (journey_id);
                 CREATE INDEX IF NOT EXISTS idx_connections_trid ON connections (trip_I);
                 CREATE INDEX IF NOT EXISTS idx_connections_fid ON connections (from_stop_I);
                 CREATE INDEX IF NOT EXISTS idx_connections_tid ON connections (to_stop_I);",
            )?;
        }
        Ok(())
    }

    /// All journeys of one origin-destination pair, by departure time.
    pub fn od_journeys(
        &self,
        origin: StopId,
        destination: StopId,
    ) -> Result<Vec<StoredJourney>, StoreError> {
        let duration_column = if self.track_route {
            "movement_duration"
        } else {
            "n_boardings"
        };
        let route_column = if self.track_route { "route" } else { "NULL" };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT journey_id, from_stop_I, to_stop_I, dep_time, arr_time,
                    {duration_column}, {route_column}, time_to_prev_journey_fp, fastest_path
             FROM journeys
             WHERE from_stop_I = ?1 AND to_stop_I = ?2
             ORDER BY dep_time ASC"
        ))?;
        let track_route = self.track_route;
        let rows = stmt.query_map(
            params![origin.0 as i64, destination.0 as i64],
            |row| {
                let fifth: Option<i64> = row.get(5)?;
                Ok(StoredJourney {
                    journey_id: row.get(0)?,
                    origin: StopId(row.get::<_, i64>(1)? as usize),
                    destination: StopId(row.get::<_, i64>(2)? as usize),
                    departure_time: row.get(3)?,
                    arrival_time: row.get(4)?,
                    n_boardings: if track_route { None } else { fifth },
                    movement_duration: if track_route { fifth } else { None },
                    route: row.get(6)?,
                    time_to_prev_journey_fp: row.get(7)?,
                    fastest_path: row.get(8)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn journey_count(&self) -> Result<i64, StoreError> {
        let count =
            self.conn
                .query_row("SELECT count(*) FROM journeys", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn max_journey_id(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.query_row("SELECT max(journey_id) FROM journeys", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .map(|id| id.unwrap_or(0))
}

fn read_parameter(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT value FROM parameters WHERE key = ?1")?;
    let mut rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
    rows.next().transpose()
}

fn join_stops(stops: &[StopId]) -> String {
    stops
        .iter()
        .map(|stop| stop.0.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Journey row re-expressed as a time-only label for fastest-path marking.
/// Rows with equal times compare equal so both stay on the frontier.
#[derive(Debug, Clone)]
struct StoredJourneyLabel {
    journey_id: i64,
    criteria: LabelTime,
}

impl PartialEq for StoredJourneyLabel {
    fn eq(&self, other: &Self) -> bool {
        self.criteria == other.criteria
    }
}

impl Criteria for StoredJourneyLabel {
    fn departure_time(&self) -> SecondsSinceDatasetStart {
        self.criteria.departure_time()
    }

    fn dominates(&self, other: &Self) -> bool {
        self.criteria.dominates(&other.criteria)
    }
}
