use crate::time::SecondsSinceDatasetStart;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripId(pub u64);

/// Handle into a [`Connections`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub(crate) usize);

/// One scheduled hop of the time-expanded network.
///
/// A connection with no `trip_id` is a walk link synthesized from the
/// walking network. Connections are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub departure_stop: StopId,
    pub arrival_stop: StopId,
    pub departure_time: SecondsSinceDatasetStart,
    pub arrival_time: SecondsSinceDatasetStart,
    pub trip_id: Option<TripId>,
    pub is_walk: bool,
}

impl Connection {
    pub fn new(
        departure_stop: StopId,
        arrival_stop: StopId,
        departure_time: SecondsSinceDatasetStart,
        arrival_time: SecondsSinceDatasetStart,
        trip_id: TripId,
    ) -> Self {
        debug_assert!(departure_time <= arrival_time);
        Self {
            departure_stop,
            arrival_stop,
            departure_time,
            arrival_time,
            trip_id: Some(trip_id),
            is_walk: false,
        }
    }

    pub fn walk(
        departure_stop: StopId,
        arrival_stop: StopId,
        departure_time: SecondsSinceDatasetStart,
        arrival_time: SecondsSinceDatasetStart,
    ) -> Self {
        debug_assert!(departure_time <= arrival_time);
        Self {
            departure_stop,
            arrival_stop,
            departure_time,
            arrival_time,
            trip_id: None,
            is_walk: true,
        }
    }
}

/// The connection arena, ordered by non-increasing departure time.
///
/// Profile updates are only correct when connections are scanned in
/// reverse-chronological departure order: a later-departing connection must
/// have updated its arrival stop's profile before any earlier connection
/// asks for transfer options there. The upstream driver is supposed to
/// guarantee this ordering; an unsorted input is accepted, re-sorted and
/// reported, rather than trusted.
#[derive(Debug, Clone)]
pub struct Connections {
    items: Vec<Connection>,
}

impl Connections {
    pub fn from_vec(mut items: Vec<Connection>) -> Self {
        let sorted = items
            .windows(2)
            .all(|pair| pair[0].departure_time >= pair[1].departure_time);
        if !sorted {
            warn!(
                nb_of_connections = items.len(),
                "connections were not sorted by decreasing departure time, re-sorting"
            );
            items.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));
        }
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ConnectionId) -> &Connection {
        &self.items[id.0]
    }

    /// Scan order: non-increasing departure time.
    pub fn iter_descending(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, connection)| (ConnectionId(idx), connection))
    }
}
