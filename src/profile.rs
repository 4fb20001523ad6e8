use crate::labels::{ArrivalTime, Criteria, ParetoFront};
use crate::time::{PositiveDuration, SecondsSinceDatasetStart};

/// Per-stop container of the Pareto-optimal ways to reach the target.
///
/// Each entry reads "departing this stop at `criteria.departure_time()`
/// via the decision recorded under `Id`, the target is reachable with
/// these objective values". The frontier is mutated only through
/// [`NodeProfile::update`], fed by the connection-scan driver in
/// non-increasing departure-time order, and is frozen by
/// [`NodeProfile::finalize`] before any analytics or extraction runs.
///
/// A stop within walking range of the target carries a
/// `walk_to_target` duration: the constant direct-walk option bounds the
/// frontier (a candidate no better than walking is useless) and backs the
/// earliest-arrival query when no connection qualifies.
#[derive(Debug, Clone)]
pub struct NodeProfile<Id, C> {
    front: ParetoFront<Id, C>,
    walk_to_target: Option<PositiveDuration>,
    finalized: bool,
    last_candidate_departure: Option<SecondsSinceDatasetStart>,
}

impl<Id, C: Criteria> Default for NodeProfile<Id, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id, C: Criteria> NodeProfile<Id, C> {
    pub fn new() -> Self {
        Self {
            front: ParetoFront::new(),
            walk_to_target: None,
            finalized: false,
            last_candidate_departure: None,
        }
    }

    pub fn with_walk_to_target(walk_to_target: PositiveDuration) -> Self {
        Self {
            front: ParetoFront::new(),
            walk_to_target: Some(walk_to_target),
            finalized: false,
            last_candidate_departure: None,
        }
    }

    pub fn walk_to_target(&self) -> Option<PositiveDuration> {
        self.walk_to_target
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn n_labels(&self) -> usize {
        self.front.len()
    }

    /// Defensive snapshot of the current frontier criteria.
    pub fn labels(&self) -> Vec<C> {
        self.front.criterias().cloned().collect()
    }

    /// Borrowed view pairing each criteria with its arena handle, for the
    /// journey extractor. Only meaningful once finalized.
    pub fn entries(&self) -> &[(Id, C)] {
        self.front.elements()
    }

    /// Freeze the profile. The scan must be complete for this stop; after
    /// the barrier the frontier is immutable and safe to analyze.
    pub fn finalize(&mut self) {
        debug_assert!(self.is_pareto_minimal());
        self.finalized = true;
    }

    fn is_pareto_minimal(&self) -> bool {
        self.front.elements().iter().all(|(_, a)| {
            self.front
                .criterias()
                .all(|b| !(a.dominates(b) && b.dominates(a)) || a == b)
        })
    }

    /// Offer one candidate label; returns whether it was accepted.
    ///
    /// Accepted iff no existing entry dominates it (an attribute-equal
    /// entry counts as dominating) and it beats the direct walk when one
    /// exists. On acceptance every entry the candidate strictly dominates
    /// is pruned.
    pub fn update(&mut self, id: Id, criteria: C) -> bool {
        debug_assert!(!self.finalized, "update on a finalized profile");
        debug_assert!(
            self.last_candidate_departure
                .map_or(true, |previous| criteria.departure_time() <= previous),
            "candidates must arrive in non-increasing departure time order"
        );
        self.last_candidate_departure = Some(criteria.departure_time());

        if let Some(walk) = self.walk_to_target {
            if !criteria.improves_on_walk(walk) {
                return false;
            }
        }
        self.front.add(id, criteria)
    }
}

impl<Id, C: Criteria + ArrivalTime> NodeProfile<Id, C> {
    /// Earliest arrival at the target when departing strictly after
    /// `departure_time`, `INFINITE` when the target is unreachable.
    pub fn earliest_arrival_at_target(
        &self,
        departure_time: SecondsSinceDatasetStart,
    ) -> SecondsSinceDatasetStart {
        let best_connection = self
            .front
            .criterias()
            .filter(|criteria| criteria.departure_time() > departure_time)
            .map(|criteria| criteria.arrival_time_target())
            .min()
            .unwrap_or(SecondsSinceDatasetStart::INFINITE);
        match self.walk_to_target {
            Some(walk) => best_connection.min(departure_time + walk),
            None => best_connection,
        }
    }
}

/// A stop's profile, with the identity special case for the target stop
/// itself: already being at the target, any candidate is pointless and the
/// earliest arrival for a departure at `t` is `t`.
#[derive(Debug, Clone)]
pub enum StopProfile<Id, C> {
    AtTarget,
    Node(NodeProfile<Id, C>),
}

impl<Id, C: Criteria> StopProfile<Id, C> {
    pub fn update(&mut self, id: Id, criteria: C) -> bool {
        match self {
            StopProfile::AtTarget => false,
            StopProfile::Node(profile) => profile.update(id, criteria),
        }
    }

    pub fn labels(&self) -> Vec<C> {
        match self {
            StopProfile::AtTarget => Vec::new(),
            StopProfile::Node(profile) => profile.labels(),
        }
    }

    pub fn finalize(&mut self) {
        if let StopProfile::Node(profile) = self {
            profile.finalize();
        }
    }
}

impl<Id, C: Criteria + ArrivalTime> StopProfile<Id, C> {
    pub fn earliest_arrival_at_target(
        &self,
        departure_time: SecondsSinceDatasetStart,
    ) -> SecondsSinceDatasetStart {
        match self {
            StopProfile::AtTarget => departure_time,
            StopProfile::Node(profile) => profile.earliest_arrival_at_target(departure_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{LabelTime, LabelTimeBoardings};

    fn at(seconds: i64) -> SecondsSinceDatasetStart {
        SecondsSinceDatasetStart::from_seconds(seconds)
    }

    #[test]
    fn dominated_candidate_leaves_the_frontier_unchanged() {
        let mut profile: NodeProfile<(), LabelTime> = NodeProfile::new();
        assert!(profile.update((), LabelTime::new(at(10), at(35))));
        // earlier departure, same arrival: dominated
        assert!(!profile.update((), LabelTime::new(at(5), at(35))));
        assert_eq!(profile.n_labels(), 1);
    }

    #[test]
    fn three_incomparable_labels_all_survive() {
        let mut profile: NodeProfile<(), LabelTimeBoardings> = NodeProfile::new();
        assert!(profile.update((), LabelTimeBoardings::new(at(7), at(35), 2)));
        assert!(profile.update((), LabelTimeBoardings::new(at(6), at(40), 1)));
        assert!(profile.update((), LabelTimeBoardings::new(at(5), at(45), 0)));
        assert_eq!(profile.n_labels(), 3);
    }

    #[test]
    fn earliest_arrival_is_monotone_and_strict() {
        let mut profile: NodeProfile<(), LabelTime> = NodeProfile::new();
        profile.update((), LabelTime::new(at(4), at(5)));
        profile.update((), LabelTime::new(at(2), at(4)));
        profile.update((), LabelTime::new(at(1), at(2)));
        profile.finalize();

        assert_eq!(profile.earliest_arrival_at_target(at(0)), at(2));
        // strict departure: a query at the departure time itself misses it
        assert_eq!(profile.earliest_arrival_at_target(at(1)), at(4));
        assert_eq!(profile.earliest_arrival_at_target(at(3)), at(5));
        assert_eq!(
            profile.earliest_arrival_at_target(at(4)),
            SecondsSinceDatasetStart::INFINITE
        );

        let mut previous = profile.earliest_arrival_at_target(at(0));
        for t in 0..10 {
            let arrival = profile.earliest_arrival_at_target(at(t));
            assert!(arrival >= previous);
            previous = arrival;
        }
    }

    #[test]
    fn walk_to_target_bounds_the_profile() {
        let mut profile: NodeProfile<(), LabelTime> =
            NodeProfile::with_walk_to_target(PositiveDuration::from_seconds(30));
        // duration 40 >= walk 30: not worth keeping
        assert!(!profile.update((), LabelTime::new(at(100), at(140))));
        assert!(profile.update((), LabelTime::new(at(90), at(110))));
        profile.finalize();
        // no connection departs after 95 except via walking
        assert_eq!(profile.earliest_arrival_at_target(at(95)), at(125));
        assert_eq!(profile.earliest_arrival_at_target(at(80)), at(110));
    }

    #[test]
    fn identity_profile_is_a_passthrough() {
        let mut profile: StopProfile<(), LabelTime> = StopProfile::AtTarget;
        assert!(!profile.update((), LabelTime::new(at(10), at(10))));
        assert_eq!(profile.earliest_arrival_at_target(at(10)), at(10));
        assert!(profile.labels().is_empty());
    }

    #[test]
    fn final_frontier_is_order_independent() {
        let labels = vec![
            LabelTimeBoardings::new(at(9), at(20), 1),
            LabelTimeBoardings::new(at(8), at(18), 2),
            LabelTimeBoardings::new(at(8), at(25), 0),
            LabelTimeBoardings::new(at(7), at(18), 2),
            LabelTimeBoardings::new(at(5), at(16), 3),
        ];
        // orderings permitted by the scan precondition: non-increasing
        // departure time, ties in either order
        let mut swapped = labels.clone();
        swapped.swap(1, 2);

        let mut reference: NodeProfile<(), LabelTimeBoardings> = NodeProfile::new();
        for label in &labels {
            reference.update((), label.clone());
        }
        let mut other: NodeProfile<(), LabelTimeBoardings> = NodeProfile::new();
        for label in &swapped {
            other.update((), label.clone());
        }
        let mut lhs = reference.labels();
        let mut rhs = other.labels();
        let key = |l: &LabelTimeBoardings| (l.departure_time, l.arrival_time_target, l.n_boardings);
        lhs.sort_by_key(key);
        rhs.sort_by_key(key);
        assert_eq!(lhs, rhs);
    }
}
