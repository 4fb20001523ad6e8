//! Journey reconstruction: turning a label chain back into the realized
//! sequence of legs.

use crate::connection::{Connection, Connections, StopId, TripId};
use crate::journeys_tree::{JourneysTree, LabelId};
use crate::time::{PositiveDuration, SecondsSinceDatasetStart};

/// One maximal same-trip run inside a journey. Consecutive walk hops share
/// the "no trip" identity and therefore merge into a single walk leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyLeg {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub departure_time: SecondsSinceDatasetStart,
    pub arrival_time: SecondsSinceDatasetStart,
    pub trip_id: Option<TripId>,
    /// 1-based position of this leg within its journey.
    pub seq: u32,
    /// Every stop visited on this leg, boundaries included.
    pub leg_stops: Vec<StopId>,
}

impl JourneyLeg {
    pub fn is_walk(&self) -> bool {
        self.trip_id.is_none()
    }

    pub fn duration(&self) -> PositiveDuration {
        let seconds = self.arrival_time.seconds() - self.departure_time.seconds();
        PositiveDuration::from_seconds(u32::try_from(seconds).unwrap_or(u32::MAX))
    }
}

/// A fully materialized travel option from one stop to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub origin: StopId,
    pub destination: StopId,
    pub departure_time: SecondsSinceDatasetStart,
    pub arrival_time: SecondsSinceDatasetStart,
    pub legs: Vec<JourneyLeg>,
    /// Leg boundary stops in travel order, destination included.
    pub route_stops: Vec<StopId>,
}

impl Journey {
    /// Reconstruct the journey realized by the chain ending at `terminal`.
    ///
    /// The chain is walked in journey order; a leg closes whenever the trip
    /// identity changes between consecutive connections. Returns `None` for
    /// a chain that never leaves its stop (no connections at all).
    pub fn from_chain<C>(
        tree: &JourneysTree<C>,
        connections: &Connections,
        terminal: LabelId,
    ) -> Option<Journey> {
        let mut chain_connections = tree
            .chain(terminal)
            .filter_map(|label| tree.connection(label))
            .map(|id| connections.get(id))
            .peekable();
        let first = chain_connections.peek()?;

        let origin = first.departure_stop;
        let departure_time = first.departure_time;
        let mut legs: Vec<JourneyLeg> = Vec::new();
        let mut current: Option<JourneyLeg> = None;
        for connection in chain_connections {
            match current.as_mut() {
                Some(leg) if leg.trip_id == connection.trip_id => {
                    leg.leg_stops.push(connection.departure_stop);
                    leg.to_stop = connection.arrival_stop;
                    leg.arrival_time = connection.arrival_time;
                }
                _ => {
                    if let Some(mut finished) = current.take() {
                        finished.leg_stops.push(finished.to_stop);
                        legs.push(finished);
                    }
                    current = Some(Self::open_leg(connection, legs.len() as u32 + 1));
                }
            }
        }
        let mut last = current.take()?;
        last.leg_stops.push(last.to_stop);
        legs.push(last);

        let destination = legs.last()?.to_stop;
        let arrival_time = legs.last()?.arrival_time;
        let mut route_stops: Vec<StopId> = legs.iter().map(|leg| leg.from_stop).collect();
        route_stops.push(destination);

        Some(Journey {
            origin,
            destination,
            departure_time,
            arrival_time,
            legs,
            route_stops,
        })
    }

    fn open_leg(connection: &Connection, seq: u32) -> JourneyLeg {
        JourneyLeg {
            from_stop: connection.departure_stop,
            to_stop: connection.arrival_stop,
            departure_time: connection.departure_time,
            arrival_time: connection.arrival_time,
            trip_id: connection.trip_id,
            seq,
            leg_stops: vec![connection.departure_stop],
        }
    }

    /// Vehicle legs only; walk legs do not count as boardings.
    pub fn n_boardings(&self) -> u32 {
        self.legs.iter().filter(|leg| !leg.is_walk()).count() as u32
    }

    /// Time spent moving, waiting at transfers excluded.
    pub fn movement_duration(&self) -> PositiveDuration {
        let total: u64 = self
            .legs
            .iter()
            .map(|leg| leg.duration().total_seconds())
            .sum();
        PositiveDuration::from_seconds(total as u32)
    }
}
