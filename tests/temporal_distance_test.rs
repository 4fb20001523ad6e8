use anyhow::Error;
use perron::logger::init_test_logger;
use perron::{
    LabelTime, NodeProfile, PositiveDuration, SecondsSinceDatasetStart, TemporalDistanceProfile,
};
use rstest::rstest;

fn at(seconds: i64) -> SecondsSinceDatasetStart {
    SecondsSinceDatasetStart::from_seconds(seconds)
}

// (dep 1, arr 2), (dep 2, arr 4), (dep 4, arr 5), fed in scan order
fn three_label_profile() -> NodeProfile<(), LabelTime> {
    let mut profile = NodeProfile::new();
    for (dep, arr) in [(4, 5), (2, 4), (1, 2)] {
        assert!(profile.update((), LabelTime::new(at(dep), at(arr))));
    }
    profile.finalize();
    profile
}

#[test]
fn trip_duration_statistics_over_a_wide_window() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let profile = three_label_profile();
    let analyzer = TemporalDistanceProfile::from_profile(&profile, at(0), at(100));

    assert_eq!(analyzer.n_pareto_optimal_trips(), 3);
    assert_eq!(analyzer.min_trip_duration(), Some(1.0));
    assert_eq!(analyzer.max_trip_duration(), Some(2.0));
    assert_eq!(analyzer.mean_trip_duration(), Some(4.0 / 3.0));
    assert_eq!(analyzer.median_trip_duration(), Some(1.0));
    Ok(())
}

#[test]
fn temporal_distance_statistics_over_a_tight_window() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let profile = three_label_profile();
    let analyzer = TemporalDistanceProfile::from_profile(&profile, at(0), at(3));

    assert_eq!(analyzer.min_temporal_distance(), 1.0);
    assert_eq!(analyzer.max_temporal_distance(), 3.0);
    let expected_mean = (1.5 + 2.5 + 2.5) / 3.0;
    assert!((analyzer.mean_temporal_distance() - expected_mean).abs() < 1e-12);
    assert!((analyzer.median_temporal_distance() - 2.25).abs() < 1e-12);
    Ok(())
}

#[test]
fn temporal_distance_cdf_and_pdf() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let profile = three_label_profile();
    let analyzer = TemporalDistanceProfile::from_profile(&profile, at(0), at(3));

    let (split_points, cdf) = analyzer.temporal_distance_cdf();
    assert_eq!(split_points, vec![1.0, 2.0, 3.0]);
    assert!((cdf[0] - 0.0).abs() < 1e-12);
    assert!((cdf[1] - 1.0 / 3.0).abs() < 1e-12);
    assert!((cdf[2] - 1.0).abs() < 1e-12);
    // non-decreasing
    assert!(cdf.windows(2).all(|pair| pair[0] <= pair[1]));

    let (pdf_points, densities) = analyzer.temporal_distance_pdf();
    assert_eq!(pdf_points, split_points);
    assert!((densities[0] - 1.0 / 3.0).abs() < 1e-12);
    assert!((densities[1] - 2.0 / 3.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn cdf_carries_the_unreachable_tail_as_mass_at_infinity() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let profile = three_label_profile();
    // departures after 4 never reach the target: 96 of the 100 window
    // seconds are mass at infinity
    let analyzer = TemporalDistanceProfile::from_profile(&profile, at(0), at(100));

    let (split_points, cdf) = analyzer.temporal_distance_cdf();
    assert_eq!(split_points, vec![1.0, 2.0, 3.0]);
    assert!((cdf[0] - 0.0).abs() < 1e-12);
    assert!((cdf[1] - 0.02).abs() < 1e-12);
    assert!((cdf[2] - 0.04).abs() < 1e-12);
    // the finite mass plus the infinite fraction closes to one
    assert!((cdf[2] + 96.0 / 100.0 - 1.0).abs() < 1e-12);

    assert_eq!(analyzer.max_temporal_distance(), f64::INFINITY);
    assert_eq!(analyzer.median_temporal_distance(), f64::INFINITY);
    assert_eq!(analyzer.mean_temporal_distance(), f64::INFINITY);
    Ok(())
}

#[test]
fn walk_to_target_caps_the_profile() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    // (dep 2, arr 4), (dep 4, arr 8), (dep 8, arr 10), walking takes 3
    let mut profile: NodeProfile<(), LabelTime> =
        NodeProfile::with_walk_to_target(PositiveDuration::from_seconds(3));
    assert!(profile.update((), LabelTime::new(at(8), at(10))));
    // slower than walking, must be rejected
    assert!(!profile.update((), LabelTime::new(at(4), at(8))));
    assert!(profile.update((), LabelTime::new(at(2), at(4))));
    profile.finalize();

    let analyzer = TemporalDistanceProfile::from_profile(&profile, at(0), at(6));
    assert_eq!(analyzer.n_pareto_optimal_trips(), 1);
    assert_eq!(analyzer.min_trip_duration(), Some(2.0));
    assert_eq!(analyzer.min_temporal_distance(), 2.0);
    assert_eq!(analyzer.max_temporal_distance(), 3.0);
    assert!((analyzer.mean_temporal_distance() - 8.75 / 3.0).abs() < 1e-12);
    assert!((analyzer.median_temporal_distance() - 3.0).abs() < 1e-12);
    assert_eq!(analyzer.walk_duration(), Some(3.0));
    Ok(())
}

#[rstest]
#[case(None)]
#[case(Some(5))]
fn empty_profile_sentinels(#[case] walk_seconds: Option<u32>) -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let mut profile: NodeProfile<(), LabelTime> = match walk_seconds {
        Some(seconds) => NodeProfile::with_walk_to_target(PositiveDuration::from_seconds(seconds)),
        None => NodeProfile::new(),
    };
    profile.finalize();
    let analyzer = TemporalDistanceProfile::from_profile(&profile, at(0), at(10));

    assert_eq!(analyzer.n_pareto_optimal_trips(), 0);
    assert_eq!(analyzer.min_trip_duration(), None);
    assert_eq!(analyzer.mean_trip_duration(), None);
    match walk_seconds {
        // the constant walk option is the whole distribution
        Some(seconds) => {
            let walk = f64::from(seconds);
            assert_eq!(analyzer.min_temporal_distance(), walk);
            assert_eq!(analyzer.max_temporal_distance(), walk);
            assert_eq!(analyzer.mean_temporal_distance(), walk);
            assert_eq!(analyzer.median_temporal_distance(), walk);
        }
        None => {
            assert_eq!(analyzer.mean_temporal_distance(), f64::INFINITY);
            assert_eq!(analyzer.median_temporal_distance(), f64::INFINITY);
        }
    }
    Ok(())
}

#[test]
fn plot_data_covers_the_window() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let profile = three_label_profile();
    let analyzer = TemporalDistanceProfile::from_profile(&profile, at(0), at(3));

    let plot = analyzer.plot_data();
    assert!(!plot.slopes.is_empty());
    let first = plot.slopes.first().unwrap();
    let last = plot.slopes.last().unwrap();
    assert_eq!(first.x0, 0.0);
    assert_eq!(last.x1, 3.0);
    Ok(())
}
