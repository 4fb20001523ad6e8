//! Multi-criteria temporal profiles for public transit networks.
//!
//! A reverse-chronological connection scan feeds per-stop [`NodeProfile`]s
//! with Pareto-optimal travel options toward one or more target stops.
//! Finalized profiles are turned into continuous-time statistics
//! (temporal distance distributions, trip duration and boarding count
//! summaries) by the analysis module, and materialized as [`Journey`]
//! records persisted in a SQLite [`JourneyStore`].

pub mod analysis;
pub mod config;
pub mod connection;
pub mod error;
pub mod journeys;
pub mod journeys_tree;
pub mod labels;
pub mod logger;
pub mod profile;
pub mod store;
pub mod time;

pub use chrono;
pub use tracing;

pub use analysis::{BoardingsProfile, ProfileBlockAnalyzer, TemporalDistanceProfile};
pub use config::{FeedMeta, RoutingConfig};
pub use connection::{Connection, ConnectionId, Connections, StopId, TripId};
pub use error::StoreError;
pub use journeys::{Journey, JourneyLeg};
pub use journeys_tree::{JourneysTree, LabelId};
pub use labels::{
    compute_pareto_front, merge_pareto_frontiers, LabelTime, LabelTimeBoardings, ParetoFront,
};
pub use profile::{NodeProfile, StopProfile};
pub use store::{JourneyRecord, JourneyStore, StoredJourney};
pub use time::{PositiveDuration, SecondsSinceDatasetStart};
