use crate::time::{PositiveDuration, SecondsSinceDatasetStart};

use std::fmt::Debug;
use std::slice::Iter as SliceIter;

/// An objective vector over a fixed subset of
/// {departure time, arrival time at target, number of boardings}.
///
/// `dominates` is the non-strict product order: `a.dominates(b)` holds when
/// `a` is at least as good as `b` in every tracked objective (departure time
/// compared with `>=`, arrival time and boardings with `<=`). Two
/// attribute-equal criteria therefore dominate each other; everywhere a
/// frontier is pruned, only *strictly* dominated entries are dropped, so
/// that equal-objective labels reached through different paths all survive.
pub trait Criteria: Clone + PartialEq + Debug {
    fn departure_time(&self) -> SecondsSinceDatasetStart;

    fn dominates(&self, other: &Self) -> bool;

    /// Whether this label is strictly better than walking straight to the
    /// target in `walk` time. Criteria that do not track arrival time
    /// cannot be bounded by a walk and always pass.
    fn improves_on_walk(&self, _walk: PositiveDuration) -> bool {
        true
    }
}

/// Accessor for criteria that track the arrival time at the target.
pub trait ArrivalTime: Criteria {
    fn arrival_time_target(&self) -> SecondsSinceDatasetStart;

    /// Trip duration on the continuous axis; infinite when unreachable.
    fn duration(&self) -> f64 {
        self.arrival_time_target().to_f64() - self.departure_time().to_f64()
    }
}

/// Accessor for criteria that track the vehicle boarding count.
pub trait BoardingCount: Criteria {
    fn n_boardings(&self) -> u32;
}

/// (departure time, arrival time at target)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTime {
    pub departure_time: SecondsSinceDatasetStart,
    pub arrival_time_target: SecondsSinceDatasetStart,
}

impl LabelTime {
    pub fn new(
        departure_time: SecondsSinceDatasetStart,
        arrival_time_target: SecondsSinceDatasetStart,
    ) -> Self {
        Self {
            departure_time,
            arrival_time_target,
        }
    }
}

impl Criteria for LabelTime {
    fn departure_time(&self) -> SecondsSinceDatasetStart {
        self.departure_time
    }

    fn dominates(&self, other: &Self) -> bool {
        self.departure_time >= other.departure_time
            && self.arrival_time_target <= other.arrival_time_target
    }

    fn improves_on_walk(&self, walk: PositiveDuration) -> bool {
        self.duration() < walk.to_f64()
    }
}

impl ArrivalTime for LabelTime {
    fn arrival_time_target(&self) -> SecondsSinceDatasetStart {
        self.arrival_time_target
    }
}

/// (departure time, arrival time at target, number of boardings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTimeBoardings {
    pub departure_time: SecondsSinceDatasetStart,
    pub arrival_time_target: SecondsSinceDatasetStart,
    pub n_boardings: u32,
}

impl LabelTimeBoardings {
    pub fn new(
        departure_time: SecondsSinceDatasetStart,
        arrival_time_target: SecondsSinceDatasetStart,
        n_boardings: u32,
    ) -> Self {
        Self {
            departure_time,
            arrival_time_target,
            n_boardings,
        }
    }

    /// Projection dropping the boarding count, used when a consumer only
    /// cares about the time objectives.
    pub fn time_only(&self) -> LabelTime {
        LabelTime::new(self.departure_time, self.arrival_time_target)
    }
}

impl Criteria for LabelTimeBoardings {
    fn departure_time(&self) -> SecondsSinceDatasetStart {
        self.departure_time
    }

    fn dominates(&self, other: &Self) -> bool {
        self.departure_time >= other.departure_time
            && self.arrival_time_target <= other.arrival_time_target
            && self.n_boardings <= other.n_boardings
    }

    fn improves_on_walk(&self, walk: PositiveDuration) -> bool {
        self.duration() < walk.to_f64()
    }
}

impl ArrivalTime for LabelTimeBoardings {
    fn arrival_time_target(&self) -> SecondsSinceDatasetStart {
        self.arrival_time_target
    }
}

impl BoardingCount for LabelTimeBoardings {
    fn n_boardings(&self) -> u32 {
        self.n_boardings
    }
}

/// (number of boardings), for transfer-minimization queries. The departure
/// time is carried along for reporting but does not take part in dominance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBoardings {
    pub departure_time: SecondsSinceDatasetStart,
    pub n_boardings: u32,
}

impl LabelBoardings {
    pub fn new(departure_time: SecondsSinceDatasetStart, n_boardings: u32) -> Self {
        Self {
            departure_time,
            n_boardings,
        }
    }
}

impl Criteria for LabelBoardings {
    fn departure_time(&self) -> SecondsSinceDatasetStart {
        self.departure_time
    }

    fn dominates(&self, other: &Self) -> bool {
        self.n_boardings <= other.n_boardings
    }
}

impl BoardingCount for LabelBoardings {
    fn n_boardings(&self) -> u32 {
        self.n_boardings
    }
}

/// Time-only dominance view over a boardings-tracking label.
///
/// Two wrappers compare equal when their time objectives agree, whatever
/// their boarding counts; a frontier of wrappers is therefore the
/// fastest-path frontier, with boarding counts carried along untouched.
#[derive(Debug, Clone)]
pub struct IgnoreBoardings(pub LabelTimeBoardings);

impl PartialEq for IgnoreBoardings {
    fn eq(&self, other: &Self) -> bool {
        self.0.time_only() == other.0.time_only()
    }
}

impl Criteria for IgnoreBoardings {
    fn departure_time(&self) -> SecondsSinceDatasetStart {
        self.0.departure_time
    }

    fn dominates(&self, other: &Self) -> bool {
        self.0.time_only().dominates(&other.0.time_only())
    }
}

fn strictly_dominates<C: Criteria>(a: &C, b: &C) -> bool {
    a.dominates(b) && a != b
}

/// Reduce an arbitrary collection to its Pareto-minimal subset.
///
/// Pop a candidate, compare against all remaining labels, partition into
/// dominated and non-dominated; a candidate strictly dominated by any
/// remaining label is itself discarded. O(n^2) worst case, which is fine
/// since per-stop label counts stay small in practice. Attribute-equal
/// labels never prune each other.
pub fn compute_pareto_front<C: Criteria>(labels: Vec<C>) -> Vec<C> {
    let mut pareto_front = Vec::new();
    let mut remaining = labels;
    while let Some(candidate) = remaining.pop() {
        let mut is_dominated = false;
        remaining.retain(|other| {
            if strictly_dominates(&candidate, other) {
                return false;
            }
            if strictly_dominates(other, &candidate) {
                is_dominated = true;
            }
            true
        });
        if !is_dominated {
            pareto_front.push(candidate);
        }
    }
    pareto_front
}

/// Merge two frontiers that are each already Pareto-minimal.
///
/// Two passes: keep the members of `b` not dominated by anything in `a`,
/// then keep the members of `a` not dominated by (and not equal to) any of
/// those survivors. The union is Pareto-minimal without re-scanning the
/// full cross product, and merging a frontier with itself yields the same
/// frontier.
pub fn merge_pareto_frontiers<C: Criteria>(a: Vec<C>, b: Vec<C>) -> Vec<C> {
    let mut survivors: Vec<C> = b
        .into_iter()
        .filter(|candidate| !a.iter().any(|other| strictly_dominates(other, candidate)))
        .collect();
    let kept_from_a: Vec<C> = a
        .into_iter()
        .filter(|candidate| {
            !survivors
                .iter()
                .any(|other| strictly_dominates(other, candidate) || other == candidate)
        })
        .collect();
    survivors.extend(kept_from_a);
    survivors
}

/// An incrementally maintained Pareto frontier.
///
/// Each element pairs an opaque id (typically a handle into the label
/// arena) with its criteria; only the criteria take part in dominance.
#[derive(Debug)]
pub struct ParetoFront<Id, C> {
    elements: Vec<(Id, C)>,
}

impl<Id: Clone, C: Clone> Clone for ParetoFront<Id, C> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
        }
    }
}

impl<Id, C: Criteria> Default for ParetoFront<Id, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id, C: Criteria> ParetoFront<Id, C> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Is `criteria` (non-strictly) dominated by a member of the front?
    pub fn dominates(&self, criteria: &C) -> bool {
        self.elements
            .iter()
            .any(|(_, old)| old.dominates(criteria))
    }

    fn remove_elements_dominated_by(&mut self, criteria: &C) {
        self.elements
            .retain(|(_, old)| !strictly_dominates(criteria, old));
    }

    /// Insert `criteria` unless a member already dominates it (an
    /// attribute-equal member counts as dominating). On acceptance, every
    /// member strictly dominated by the candidate is pruned. Returns
    /// whether the candidate was accepted.
    pub fn add(&mut self, id: Id, criteria: C) -> bool {
        if self.dominates(&criteria) {
            return false;
        }
        self.remove_elements_dominated_by(&criteria);
        self.elements.push((id, criteria));
        true
    }

    pub fn iter(&self) -> SliceIter<'_, (Id, C)> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[(Id, C)] {
        &self.elements
    }

    pub fn criterias(&self) -> impl Iterator<Item = &C> {
        self.elements.iter().map(|(_, criteria)| criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SecondsSinceDatasetStart;

    fn at(seconds: i64) -> SecondsSinceDatasetStart {
        SecondsSinceDatasetStart::from_seconds(seconds)
    }

    fn is_minimal<C: Criteria>(front: &[C]) -> bool {
        front.iter().all(|a| {
            front
                .iter()
                .all(|b| !(a.dominates(b) && b.dominates(a)) || a == b)
        })
    }

    #[test]
    fn front_contains_no_dominated_pair_and_excluded_labels_are_dominated() {
        let labels = vec![
            LabelTimeBoardings::new(at(5), at(45), 0),
            LabelTimeBoardings::new(at(6), at(40), 1),
            LabelTimeBoardings::new(at(7), at(35), 2),
            LabelTimeBoardings::new(at(5), at(50), 1), // dominated by the first
            LabelTimeBoardings::new(at(6), at(45), 2), // dominated by the second
        ];
        let front = compute_pareto_front(labels.clone());
        assert_eq!(front.len(), 3);
        assert!(is_minimal(&front));
        for excluded in labels.iter().filter(|l| !front.contains(l)) {
            assert!(front.iter().any(|winner| winner.dominates(excluded)));
        }
    }

    #[test]
    fn attribute_equal_duplicates_survive() {
        let twin_a = LabelTime::new(at(1), at(2));
        let twin_b = LabelTime::new(at(1), at(2));
        let front = compute_pareto_front(vec![twin_a, twin_b]);
        assert_eq!(front.len(), 2);
    }

    #[test]
    fn merge_is_commutative_and_idempotent() {
        let a = vec![
            LabelTime::new(at(10), at(30)),
            LabelTime::new(at(20), at(50)),
        ];
        let b = vec![
            LabelTime::new(at(15), at(25)),
            LabelTime::new(at(5), at(20)),
        ];
        let ab = merge_pareto_frontiers(a.clone(), b.clone());
        let ba = merge_pareto_frontiers(b.clone(), a.clone());
        assert_eq!(ab.len(), ba.len());
        for label in &ab {
            assert!(ba.contains(label));
        }
        let aa = merge_pareto_frontiers(a.clone(), a.clone());
        assert_eq!(aa.len(), a.len());
        for label in &a {
            assert!(aa.contains(label));
        }
        assert!(is_minimal(&aa));
    }

    #[test]
    fn boardings_only_dominance_ignores_times() {
        let few = LabelBoardings::new(at(5), 1);
        let many = LabelBoardings::new(at(50), 3);
        assert!(few.dominates(&many));
        assert!(!many.dominates(&few));
    }

    #[test]
    fn pareto_front_add_rejects_dominated_candidate() {
        let mut front = ParetoFront::new();
        assert!(front.add((), LabelTime::new(at(10), at(20))));
        // earlier departure, same arrival: strictly worse
        assert!(!front.add((), LabelTime::new(at(5), at(20))));
        assert_eq!(front.len(), 1);
    }
}
