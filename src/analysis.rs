//! Turning finalized profiles into distributions and summary statistics.

pub mod boardings;
pub mod profile_blocks;
pub mod temporal_distance;

pub use boardings::BoardingsProfile;
pub use profile_blocks::{ProfileBlock, ProfileBlockAnalyzer};
pub use temporal_distance::{ProfilePlotData, Segment, TemporalDistanceProfile};
