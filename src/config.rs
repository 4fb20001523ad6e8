use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::{PositiveDuration, SecondsSinceDatasetStart};

const DEFAULT_TRANSFER_MARGIN: PositiveDuration = PositiveDuration::from_seconds(180);

fn default_transfer_margin() -> PositiveDuration {
    DEFAULT_TRANSFER_MARGIN
}

fn default_walking_speed() -> f64 {
    // meters per second, roughly 2.5 km/h of effective network speed
    0.7
}

/// Parameters of a routing run. Persisted alongside the journeys so a
/// store can be matched against the run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Minimal time between arriving at a stop and boarding the next
    /// vehicle there.
    #[serde(default = "default_transfer_margin")]
    pub transfer_margin: PositiveDuration,

    /// Walking speed used to synthesize walk connections, in m/s.
    #[serde(default = "default_walking_speed")]
    pub walking_speed: f64,

    /// Departure-time window of the analysis, end exclusive.
    pub analysis_start_time: SecondsSinceDatasetStart,
    pub analysis_end_time: SecondsSinceDatasetStart,

    /// Whether journeys were routed toward a set of targets rather than a
    /// single one. When set, stored journeys carry their own destination.
    #[serde(default)]
    pub multiple_targets: bool,

    /// When set, journeys are persisted with their full leg detail in a
    /// separate connections table; otherwise only aggregate values are
    /// kept.
    #[serde(default)]
    pub track_route: bool,
}

impl RoutingConfig {
    pub fn new(
        analysis_start_time: SecondsSinceDatasetStart,
        analysis_end_time: SecondsSinceDatasetStart,
    ) -> Self {
        Self {
            transfer_margin: default_transfer_margin(),
            walking_speed: default_walking_speed(),
            analysis_start_time,
            analysis_end_time,
            multiple_targets: false,
            track_route: false,
        }
    }
}

/// Identity of the source feed a store was built from. Compared key by key
/// when reopening a store, so stale stores are rejected instead of being
/// silently mixed with a different feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMeta {
    pub location_name: String,
    pub lat_median: f64,
    pub lon_median: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
