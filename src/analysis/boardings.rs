//! Boarding-count-aware projection of a multi-criteria profile: per
//! boarding-count temporal statistics and the boardings-versus-departure
//! profile along the fastest paths.

use crate::analysis::profile_blocks::{ProfileBlock, ProfileBlockAnalyzer};
use crate::analysis::temporal_distance::TemporalDistanceProfile;
use crate::labels::{compute_pareto_front, IgnoreBoardings, LabelTime, LabelTimeBoardings};
use crate::profile::NodeProfile;
use crate::time::{PositiveDuration, SecondsSinceDatasetStart};

/// Analyzer over a finalized (departure, arrival, boardings) profile and a
/// query window `[start_time_dep, end_time_dep)`.
///
/// Temporal statistics are delegated to single-objective sub-profiles:
/// for a boarding budget `k`, the labels with at most `k` boardings are
/// reduced to their time-only frontier and re-analyzed as a plain
/// temporal-distance profile.
#[derive(Debug, Clone)]
pub struct BoardingsProfile {
    start_time_dep: SecondsSinceDatasetStart,
    end_time_dep: SecondsSinceDatasetStart,
    all_labels: Vec<LabelTimeBoardings>,
    labels_within_window: Vec<LabelTimeBoardings>,
    walk_to_target: Option<PositiveDuration>,
}

impl BoardingsProfile {
    pub fn from_profile<Id>(
        profile: &NodeProfile<Id, LabelTimeBoardings>,
        start_time_dep: SecondsSinceDatasetStart,
        end_time_dep: SecondsSinceDatasetStart,
    ) -> Self {
        debug_assert!(profile.is_finalized());
        debug_assert!(start_time_dep < end_time_dep);
        let all_labels = profile.labels();
        let labels_within_window = all_labels
            .iter()
            .filter(|label| {
                label.departure_time >= start_time_dep && label.departure_time < end_time_dep
            })
            .cloned()
            .collect();
        Self {
            start_time_dep,
            end_time_dep,
            all_labels,
            labels_within_window,
            walk_to_target: profile.walk_to_target(),
        }
    }

    pub fn n_pareto_optimal_trips(&self) -> usize {
        self.labels_within_window.len()
    }

    fn boarding_counts_summary(&self, reduce: fn(&[f64]) -> f64) -> f64 {
        if self.labels_within_window.is_empty() {
            // only a direct walk (zero boardings), or nothing at all
            return if self.walk_to_target.is_some() {
                0.0
            } else {
                f64::NAN
            };
        }
        let counts: Vec<f64> = self
            .labels_within_window
            .iter()
            .map(|label| label.n_boardings as f64)
            .collect();
        reduce(&counts)
    }

    pub fn min_trip_n_boardings(&self) -> f64 {
        self.boarding_counts_summary(|counts| counts.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn max_trip_n_boardings(&self) -> f64 {
        self.boarding_counts_summary(|counts| {
            counts.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        })
    }

    pub fn mean_trip_n_boardings(&self) -> f64 {
        self.boarding_counts_summary(|counts| counts.iter().sum::<f64>() / counts.len() as f64)
    }

    pub fn median_trip_n_boardings(&self) -> f64 {
        self.boarding_counts_summary(|counts| {
            let mut sorted = counts.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let n = sorted.len();
            if n % 2 == 1 {
                sorted[n / 2]
            } else {
                (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
            }
        })
    }

    /// Single-objective sub-profile for journeys using at most
    /// `n_boardings` vehicles. A budget of zero means walking is the only
    /// admissible option.
    pub fn time_profile(&self, n_boardings: u32) -> TemporalDistanceProfile {
        let mut sub_profile: NodeProfile<(), LabelTime> = match self.walk_to_target {
            Some(walk) => NodeProfile::with_walk_to_target(walk),
            None => NodeProfile::new(),
        };
        if n_boardings > 0 {
            let candidates: Vec<LabelTime> = self
                .all_labels
                .iter()
                .filter(|label| {
                    label.departure_time >= self.start_time_dep && label.n_boardings <= n_boardings
                })
                .map(LabelTimeBoardings::time_only)
                .collect();
            let mut front = compute_pareto_front(candidates);
            front.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));
            for label in front {
                sub_profile.update((), label);
            }
        }
        sub_profile.finalize();
        TemporalDistanceProfile::from_profile(&sub_profile, self.start_time_dep, self.end_time_dep)
    }

    /// Sub-profile with the largest boarding budget seen in the window,
    /// i.e. the fastest-possible temporal distance profile.
    pub fn fastest_time_profile(&self) -> TemporalDistanceProfile {
        let max_boardings = self
            .labels_within_window
            .iter()
            .map(|label| label.n_boardings)
            .max()
            .unwrap_or(0);
        self.time_profile(max_boardings)
    }

    pub fn min_temporal_distance(&self) -> f64 {
        self.fastest_time_profile().min_temporal_distance()
    }

    pub fn max_temporal_distance(&self) -> f64 {
        self.fastest_time_profile().max_temporal_distance()
    }

    pub fn mean_temporal_distance(&self) -> f64 {
        self.fastest_time_profile().mean_temporal_distance()
    }

    pub fn median_temporal_distance(&self) -> f64 {
        self.fastest_time_profile().median_temporal_distance()
    }

    pub fn min_trip_duration(&self) -> Option<f64> {
        self.fastest_time_profile().min_trip_duration()
    }

    pub fn max_trip_duration(&self) -> Option<f64> {
        self.fastest_time_profile().max_trip_duration()
    }

    pub fn mean_trip_duration(&self) -> Option<f64> {
        self.fastest_time_profile().mean_trip_duration()
    }

    pub fn median_trip_duration(&self) -> Option<f64> {
        self.fastest_time_profile().median_trip_duration()
    }

    /// Median temporal distance per boarding budget, indexed from
    /// `min_n_boardings` to `max_n_boardings` inclusive.
    pub fn median_temporal_distances(
        &self,
        min_n_boardings: u32,
        max_n_boardings: u32,
    ) -> Vec<f64> {
        (min_n_boardings..=max_n_boardings)
            .map(|budget| self.time_profile(budget).median_temporal_distance())
            .collect()
    }

    /// Piecewise-constant profile of "number of boardings along the
    /// fastest path" versus departure time.
    ///
    /// The window labels (plus the best options just after the window) are
    /// reduced to their time-only frontier; walking backward from each
    /// frontier departure, its boarding count holds for the whole gap back
    /// to the previous frontier departure. Departures after the last
    /// frontier label have no fastest path and carry an infinite count.
    pub fn fastest_path_boardings(&self) -> ProfileBlockAnalyzer {
        let mut frontier: Vec<LabelTimeBoardings> = compute_pareto_front(
            self.relevant_labels()
                .into_iter()
                .map(IgnoreBoardings)
                .collect(),
        )
        .into_iter()
        .map(|wrapper| wrapper.0)
        .collect();
        frontier.sort_by(|a, b| a.departure_time.cmp(&b.departure_time));

        let end = self.end_time_dep.to_f64();
        let mut blocks = Vec::new();
        let mut previous_departure = self.start_time_dep.to_f64();
        for label in &frontier {
            if previous_departure >= end {
                break;
            }
            let block_end = label.departure_time.to_f64().min(end);
            if block_end > previous_departure {
                blocks.push(ProfileBlock::flat(
                    previous_departure,
                    block_end,
                    label.n_boardings as f64,
                ));
            }
            previous_departure = block_end;
        }
        if previous_departure < end {
            blocks.push(ProfileBlock::flat(previous_departure, end, f64::INFINITY));
        }
        ProfileBlockAnalyzer::new(blocks)
    }

    pub fn min_n_boardings_along_fastest_paths(&self) -> f64 {
        self.fastest_path_boardings().min()
    }

    pub fn max_n_boardings_along_fastest_paths(&self) -> f64 {
        self.fastest_path_boardings().max()
    }

    pub fn mean_n_boardings_along_fastest_paths(&self) -> f64 {
        self.fastest_path_boardings().mean()
    }

    pub fn median_n_boardings_along_fastest_paths(&self) -> f64 {
        self.fastest_path_boardings().median()
    }

    /// Window labels plus the time-only best options departing after the
    /// window (they cover the right edge of the fastest-path profile).
    fn relevant_labels(&self) -> Vec<LabelTimeBoardings> {
        let mut labels = self.labels_within_window.clone();
        let after: Vec<IgnoreBoardings> = self
            .all_labels
            .iter()
            .filter(|label| label.departure_time >= self.end_time_dep)
            .cloned()
            .map(IgnoreBoardings)
            .collect();
        labels.extend(
            compute_pareto_front(after)
                .into_iter()
                .map(|wrapper| wrapper.0),
        );
        labels
    }
}
