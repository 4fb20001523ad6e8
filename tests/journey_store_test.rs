use anyhow::Error;
use chrono::NaiveDate;
use perron::logger::init_test_logger;
use perron::{
    Connection, Connections, FeedMeta, Journey, JourneyRecord, JourneyStore, JourneysTree,
    RoutingConfig, SecondsSinceDatasetStart, StopId, StoreError, TripId,
};
use tempfile::TempDir;

fn at(seconds: i64) -> SecondsSinceDatasetStart {
    SecondsSinceDatasetStart::from_seconds(seconds)
}

fn feed() -> FeedMeta {
    FeedMeta {
        location_name: "testville".to_string(),
        lat_median: 60.17,
        lon_median: 24.94,
        start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(),
    }
}

fn config(track_route: bool) -> RoutingConfig {
    let mut config = RoutingConfig::new(at(0), at(86_400));
    config.track_route = track_route;
    config
}

fn records() -> Vec<JourneyRecord> {
    vec![
        JourneyRecord {
            origin: StopId(1),
            destination: StopId(5),
            departure_time: at(10),
            arrival_time: at(20),
            n_boardings: 1,
        },
        // dominated in time by the next departure, not a fastest path
        JourneyRecord {
            origin: StopId(1),
            destination: StopId(5),
            departure_time: at(15),
            arrival_time: at(30),
            n_boardings: 2,
        },
        JourneyRecord {
            origin: StopId(1),
            destination: StopId(5),
            departure_time: at(20),
            arrival_time: at(25),
            n_boardings: 1,
        },
    ]
}

#[test]
fn lifecycle_errors() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let dir = TempDir::new()?;
    let path = dir.path().join("journeys.sqlite");

    assert!(matches!(
        JourneyStore::open(&path, &feed()),
        Err(StoreError::MissingStore(_))
    ));

    let store = JourneyStore::initialize(&path, &config(false), &feed())?;
    drop(store);

    assert!(matches!(
        JourneyStore::initialize(&path, &config(false), &feed()),
        Err(StoreError::AlreadyInitialized(_))
    ));

    let mut other_feed = feed();
    other_feed.location_name = "elsewhere".to_string();
    let err = JourneyStore::open(&path, &other_feed)
        .err()
        .expect("reopening against another feed must fail");
    match err {
        StoreError::FeedMismatch { key, .. } => assert_eq!(key, "location_name"),
        other => panic!("expected a feed mismatch, got {other}"),
    }

    let reopened = JourneyStore::open(&path, &feed())?;
    assert!(!reopened.track_route());
    Ok(())
}

#[test]
fn repeated_imports_offset_journey_ids() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let dir = TempDir::new()?;
    let path = dir.path().join("journeys.sqlite");

    let mut store = JourneyStore::initialize(&path, &config(false), &feed())?;
    store.import_journeys(&records())?;
    store.import_journeys(&records())?;
    assert_eq!(store.journey_count()?, 6);

    let journeys = store.od_journeys(StopId(1), StopId(5))?;
    let mut ids: Vec<i64> = journeys.iter().map(|journey| journey.journey_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    Ok(())
}

#[test]
fn fastest_paths_and_headways() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let dir = TempDir::new()?;
    let path = dir.path().join("journeys.sqlite");

    let mut store = JourneyStore::initialize(&path, &config(false), &feed())?;
    store.import_journeys(&records())?;
    store.mark_fastest_paths()?;
    store.annotate_headways()?;
    store.create_indices()?;

    let journeys = store.od_journeys(StopId(1), StopId(5))?;
    assert_eq!(journeys.len(), 3);
    let by_departure: Vec<(i64, Option<i64>, Option<i64>)> = journeys
        .iter()
        .map(|journey| {
            (
                journey.departure_time,
                journey.fastest_path,
                journey.time_to_prev_journey_fp,
            )
        })
        .collect();
    assert_eq!(
        by_departure,
        vec![
            (10, Some(1), None),
            (15, Some(0), None),
            (20, Some(1), Some(10)),
        ]
    );
    Ok(())
}

#[test]
fn route_tracking_persists_leg_detail() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let dir = TempDir::new()?;
    let path = dir.path().join("journeys.sqlite");

    // trip 7 over stops 0-1-2, then a walk to stop 3
    let connections = Connections::from_vec(vec![
        Connection::walk(StopId(2), StopId(3), at(30), at(40)),
        Connection::new(StopId(1), StopId(2), at(20), at(30), TripId(7)),
        Connection::new(StopId(0), StopId(1), at(10), at(20), TripId(7)),
    ]);
    let mut tree: JourneysTree<()> = JourneysTree::new();
    let mut parent = None;
    for (id, _) in connections.iter_descending() {
        parent = Some(tree.extend((), Some(id), parent));
    }
    let journey = Journey::from_chain(&tree, &connections, parent.unwrap()).unwrap();
    assert_eq!(journey.origin, StopId(0));
    assert_eq!(journey.destination, StopId(3));

    let mut store = JourneyStore::initialize(&path, &config(true), &feed())?;
    store.import_journeys_with_route(&[journey])?;
    store.create_indices()?;

    let journeys = store.od_journeys(StopId(0), StopId(3))?;
    assert_eq!(journeys.len(), 1);
    let stored = &journeys[0];
    assert_eq!(stored.departure_time, 10);
    assert_eq!(stored.arrival_time, 40);
    // 20s aboard trip 7 plus a 10s walk
    assert_eq!(stored.movement_duration, Some(30));
    assert_eq!(stored.route.as_deref(), Some("0,2,3"));
    assert_eq!(stored.n_boardings, None);
    Ok(())
}
