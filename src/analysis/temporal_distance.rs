//! Projection of one stop's finalized Pareto frontier, restricted to a
//! departure window, onto the continuous departure-time axis.

use crate::analysis::profile_blocks::{ProfileBlock, ProfileBlockAnalyzer};
use crate::labels::{ArrivalTime, Criteria};
use crate::profile::NodeProfile;
use crate::time::SecondsSinceDatasetStart;

/// A straight segment of the departure-time-versus-duration step plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Numeric series a renderer would draw: the slanted pieces of the
/// profile and the vertical jumps between them. No drawing happens here.
#[derive(Debug, Clone)]
pub struct ProfilePlotData {
    pub slopes: Vec<Segment>,
    pub vertical_lines: Vec<Segment>,
}

/// "Distance to target as a function of departure time" over a query
/// window `[start_time_dep, end_time_dep)`, and the statistics of that
/// function for a traveler departing uniformly at random in the window.
///
/// Built from a finalized profile: labels departing within the window,
/// plus one virtual boundary label at the window end whose arrival is the
/// best option reachable just after the window. Each label covers the gap
/// back to the previous departure; over that gap the temporal distance is
/// the label's own trip duration plus the remaining wait. A direct walk to
/// the target caps the whole function at the walk duration.
#[derive(Debug, Clone)]
pub struct TemporalDistanceProfile {
    start_time_dep: f64,
    end_time_dep: f64,
    trip_durations: Vec<f64>,
    analyzer: ProfileBlockAnalyzer,
    walk_duration: Option<f64>,
}

impl TemporalDistanceProfile {
    pub fn from_profile<Id, C>(
        profile: &NodeProfile<Id, C>,
        start_time_dep: SecondsSinceDatasetStart,
        end_time_dep: SecondsSinceDatasetStart,
    ) -> Self
    where
        C: Criteria + ArrivalTime,
    {
        debug_assert!(profile.is_finalized());
        debug_assert!(start_time_dep < end_time_dep);
        let start = start_time_dep.to_f64();
        let end = end_time_dep.to_f64();
        let walk_duration = profile.walk_to_target().map(|walk| walk.to_f64());

        let mut labels: Vec<(f64, f64)> = profile
            .labels()
            .into_iter()
            .filter(|label| {
                label.departure_time() >= start_time_dep && label.departure_time() < end_time_dep
            })
            .map(|label| (label.departure_time().to_f64(), label.duration()))
            .collect();
        labels.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        let trip_durations: Vec<f64> = labels.iter().map(|&(_, duration)| duration).collect();

        // virtual boundary label: the best option reachable just after the
        // window, so the distribution is defined up to the right edge
        let boundary_arrival = profile.earliest_arrival_at_target(end_time_dep);
        labels.push((end, boundary_arrival.to_f64() - end));

        let mut blocks = Vec::new();
        let mut previous_departure = start;
        for &(departure, duration) in &labels {
            let waiting_time = departure - previous_departure;
            push_label_blocks(
                &mut blocks,
                previous_departure,
                departure,
                duration,
                waiting_time,
                walk_duration,
            );
            previous_departure = departure;
        }

        Self {
            start_time_dep: start,
            end_time_dep: end,
            trip_durations,
            analyzer: ProfileBlockAnalyzer::new(blocks),
            walk_duration,
        }
    }

    /// Number of Pareto-optimal trips departing inside the window.
    pub fn n_pareto_optimal_trips(&self) -> usize {
        self.trip_durations.len()
    }

    pub fn min_trip_duration(&self) -> Option<f64> {
        self.trip_durations
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.min(d))))
    }

    pub fn max_trip_duration(&self) -> Option<f64> {
        self.trip_durations
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))))
    }

    pub fn mean_trip_duration(&self) -> Option<f64> {
        if self.trip_durations.is_empty() {
            None
        } else {
            Some(self.trip_durations.iter().sum::<f64>() / self.trip_durations.len() as f64)
        }
    }

    pub fn median_trip_duration(&self) -> Option<f64> {
        if self.trip_durations.is_empty() {
            return None;
        }
        let mut sorted = self.trip_durations.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let n = sorted.len();
        if n % 2 == 1 {
            Some(sorted[n / 2])
        } else {
            Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
        }
    }

    pub fn min_temporal_distance(&self) -> f64 {
        self.analyzer.min()
    }

    pub fn max_temporal_distance(&self) -> f64 {
        self.analyzer.max()
    }

    pub fn mean_temporal_distance(&self) -> f64 {
        self.analyzer.mean()
    }

    pub fn median_temporal_distance(&self) -> f64 {
        self.analyzer.median()
    }

    /// Normalized CDF of the temporal distance: split points and, for each
    /// split point, the probability that the temporal distance does not
    /// exceed it. The last value plus the unreachable (infinite) mass
    /// fraction equals one.
    pub fn temporal_distance_cdf(&self) -> (Vec<f64>, Vec<f64>) {
        let width = self.end_time_dep - self.start_time_dep;
        let (split_points, unnormalized) = self.analyzer.distance_cdf_unnormalized();
        if let Some(last) = unnormalized.last() {
            // cumulative mass must close to the window width net of the
            // unreachable mass
            let infinite_mass: f64 = self
                .analyzer
                .blocks()
                .iter()
                .filter(|block| !block.max_distance().is_finite())
                .map(|block| block.width())
                .sum();
            debug_assert!((last + infinite_mass - width).abs() < 1e-6 * width.max(1.0));
        }
        let cdf: Vec<f64> = unnormalized.iter().map(|mass| mass / width).collect();
        (split_points, cdf)
    }

    /// Discrete derivative of the CDF across split-point intervals; one
    /// entry less than the number of split points.
    pub fn temporal_distance_pdf(&self) -> (Vec<f64>, Vec<f64>) {
        let (split_points, cdf) = self.temporal_distance_cdf();
        let densities = split_points
            .windows(2)
            .zip(cdf.windows(2))
            .map(|(xs, ys)| (ys[1] - ys[0]) / (xs[1] - xs[0]))
            .collect();
        (split_points, densities)
    }

    /// Segments for the departure-time-versus-duration step plot.
    pub fn plot_data(&self) -> ProfilePlotData {
        let blocks = self.analyzer.blocks();
        let slopes = blocks
            .iter()
            .map(|block| Segment {
                x0: block.start_time,
                y0: block.distance_start,
                x1: block.end_time,
                y1: block.distance_end,
            })
            .collect();
        let vertical_lines = blocks
            .windows(2)
            .filter(|pair| pair[0].distance_end != pair[1].distance_start)
            .map(|pair| Segment {
                x0: pair[0].end_time,
                y0: pair[0].distance_end,
                x1: pair[1].start_time,
                y1: pair[1].distance_start,
            })
            .collect();
        ProfilePlotData {
            slopes,
            vertical_lines,
        }
    }

    pub fn walk_duration(&self) -> Option<f64> {
        self.walk_duration
    }
}

/// Decompose one label's share of the window into profile blocks.
///
/// Without a walk cap this is a single slanted block falling from
/// `duration + waiting_time` down to `duration`. With a walk cap `w`, the
/// early part of the gap where `duration + remaining_wait >= w` is a flat
/// block at `w`. An unreachable label (infinite duration) contributes a
/// flat infinite block.
fn push_label_blocks(
    blocks: &mut Vec<ProfileBlock>,
    span_start: f64,
    span_end: f64,
    duration: f64,
    waiting_time: f64,
    walk_duration: Option<f64>,
) {
    if waiting_time <= 0.0 {
        return;
    }
    if !duration.is_finite() {
        debug_assert!(walk_duration.is_none());
        blocks.push(ProfileBlock::flat(span_start, span_end, f64::INFINITY));
        return;
    }
    match walk_duration {
        Some(walk) if duration + waiting_time > walk => {
            let flat_width = (duration + waiting_time - walk).min(waiting_time);
            blocks.push(ProfileBlock::flat(
                span_start,
                span_start + flat_width,
                walk,
            ));
            if flat_width < waiting_time {
                blocks.push(ProfileBlock {
                    start_time: span_start + flat_width,
                    end_time: span_end,
                    distance_start: walk,
                    distance_end: duration,
                });
            }
        }
        _ => {
            blocks.push(ProfileBlock {
                start_time: span_start,
                end_time: span_end,
                distance_start: duration + waiting_time,
                distance_end: duration,
            });
        }
    }
}
