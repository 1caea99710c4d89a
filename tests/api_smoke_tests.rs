use chrono::{TimeZone, Utc};
use timeline_layout::api::{LayoutSnapshot, TimelineLayout, TimelineLayoutConfig};
use timeline_layout::core::{IntervalId, PlacementConfig, Point, ScaleUnit, TimeMillis, TimeSpan};
use timeline_layout::error::LayoutError;

fn ymd(y: i32, m: u32, d: u32) -> TimeMillis {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .expect("valid date")
        .timestamp_millis()
}

fn span(from: (i32, u32, u32), to: (i32, u32, u32)) -> TimeSpan {
    TimeSpan::new(ymd(from.0, from.1, from.2), ymd(to.0, to.1, to.2)).expect("span")
}

fn january_layout() -> TimelineLayout {
    let config = TimelineLayoutConfig::new(ScaleUnit::Day)
        .with_mapped_window(span((2024, 1, 10), (2024, 1, 20)));
    let mut layout = TimelineLayout::new(config).expect("layout init");

    layout
        .insert_interval(IntervalId(1), span((2024, 1, 11), (2024, 1, 14)))
        .expect("insert 1");
    layout
        .insert_interval(IntervalId(2), span((2024, 1, 12), (2024, 1, 13)))
        .expect("insert 2");
    layout
        .insert_interval(IntervalId(3), span((2024, 1, 15), (2024, 1, 16)))
        .expect("insert 3");
    layout
}

#[test]
fn layout_smoke_flow() {
    let mut layout = january_layout();

    let first = layout.intervals().get(IntervalId(1)).expect("interval 1");
    assert_eq!((first.x_start, first.width), (79, 60));
    assert_eq!(layout.level_of(IntervalId(1)), Ok(0));
    assert_eq!(layout.level_of(IntervalId(2)), Ok(1));
    assert_eq!(layout.level_of(IntervalId(3)), Ok(0));
    assert_eq!(layout.total_height(), 60);
    assert_eq!(layout.mapper().generation(), 1);

    let hit = layout.hit_test(Point::new(100, 15)).expect("hit level 0");
    assert_eq!(hit.id, IntervalId(1));
    let hit = layout.hit_test(Point::new(100, 40)).expect("hit level 1");
    assert_eq!(hit.id, IntervalId(2));
    assert!(layout.hit_test(Point::new(150, 15)).is_none());

    layout.set_scale(ScaleUnit::Week).expect("week scale");
    assert_eq!(layout.scale(), ScaleUnit::Week);
    assert!(layout.intervals().iter().all(|interval| interval.level.is_some()));

    let removed = layout.remove_interval(IntervalId(2)).expect("remove");
    assert_eq!(removed.map(|interval| interval.id), Some(IntervalId(2)));
    assert_eq!(
        layout.level_of(IntervalId(2)),
        Err(LayoutError::NotFound { id: IntervalId(2) })
    );
    assert!(layout.remove_interval(IntervalId(2)).expect("remove again").is_none());
}

#[test]
fn inserting_outside_the_window_grows_it() {
    let mut layout = january_layout();
    assert_eq!(layout.total_width().expect("width"), 319);

    layout
        .insert_interval(IntervalId(4), span((2024, 2, 1), (2024, 2, 2)))
        .expect("insert 4");

    assert_eq!(
        layout.mapper().mapped_window(),
        Some(span((2024, 1, 10), (2024, 2, 2)))
    );
    assert_eq!(layout.total_width().expect("width"), 579);
    assert!(layout.intervals().iter().all(|interval| interval.level.is_some()));
    assert_eq!(layout.mapper().generation(), 2);
}

#[test]
fn first_insert_maps_an_unmapped_layout() {
    let mut layout = TimelineLayout::new(TimelineLayoutConfig::default()).expect("layout init");
    assert!(!layout.mapper().is_mapped());
    assert!(layout.hit_test(Point::new(0, 10)).is_none());
    assert!(layout.grid_lines(0, 100).expect("grid").is_empty());
    assert_eq!(layout.total_width().expect("width"), 0);

    let only = span((2024, 6, 1), (2024, 6, 3));
    layout.insert_interval(IntervalId(7), only).expect("insert");

    assert_eq!(layout.mapper().mapped_window(), Some(only));
    assert_eq!(layout.level_of(IntervalId(7)), Ok(0));
}

fn minutes_after_jan_10(from: i64, to: i64) -> TimeSpan {
    let base = ymd(2024, 1, 10);
    TimeSpan::new(base + from * 60_000, base + to * 60_000).expect("span")
}

#[test]
fn unmappable_insert_leaves_layout_intact() {
    let config =
        TimelineLayoutConfig::new(ScaleUnit::Second).with_mapped_window(minutes_after_jan_10(0, 10));
    let mut layout = TimelineLayout::new(config).expect("layout init");
    layout
        .insert_interval(IntervalId(1), minutes_after_jan_10(1, 2))
        .expect("insert 1");
    let window = layout.mapper().mapped_window();
    let generation = layout.mapper().generation();

    let decade = span((2024, 1, 10), (2034, 1, 10));
    let result = layout.insert_interval(IntervalId(2), decade);
    assert!(matches!(result, Err(LayoutError::CoordinateOverflow { .. })));
    assert!(!layout.intervals().contains(IntervalId(2)));
    assert_eq!(layout.mapper().mapped_window(), window);
    assert_eq!(layout.mapper().generation(), generation);
    assert_eq!(layout.level_of(IntervalId(1)), Ok(0));

    layout
        .insert_interval(IntervalId(3), minutes_after_jan_10(5, 6))
        .expect("insert 3 after rejection");
    assert_eq!(layout.level_of(IntervalId(3)), Ok(0));

    let hit = layout.hit_test(Point::new(1_300, 15)).expect("hit interval 1");
    assert_eq!(hit.id, IntervalId(1));
    assert!(layout.remove_interval(IntervalId(3)).expect("remove").is_some());
    assert_eq!(layout.level_of(IntervalId(1)), Ok(0));
}

#[test]
fn unmappable_replacement_restores_previous_span() {
    let config =
        TimelineLayoutConfig::new(ScaleUnit::Second).with_mapped_window(minutes_after_jan_10(0, 10));
    let mut layout = TimelineLayout::new(config).expect("layout init");
    let original = minutes_after_jan_10(1, 2);
    layout.insert_interval(IntervalId(1), original).expect("insert");

    let decade = span((2024, 1, 10), (2034, 1, 10));
    assert!(layout.insert_interval(IntervalId(1), decade).is_err());

    let kept = layout.intervals().get(IntervalId(1)).expect("interval kept");
    assert_eq!(kept.span, original);
    assert_eq!(kept.level, Some(0));
    assert_eq!(layout.level_of(IntervalId(1)), Ok(0));
}

#[test]
fn ensure_included_extends_to_the_viewport() {
    let mut layout = january_layout();
    let viewport = span((2023, 12, 25), (2024, 1, 5));

    assert!(layout.ensure_included(viewport).expect("grow"));
    assert_eq!(
        layout.mapper().mapped_window(),
        Some(span((2023, 12, 25), (2024, 1, 16)))
    );
    assert!(!layout.ensure_included(viewport).expect("unchanged"));
}

#[test]
fn cyclic_toggle_relayouts_intervals() {
    let mut layout = january_layout();
    layout
        .insert_interval(IntervalId(9), span((2023, 1, 11), (2023, 1, 14)))
        .expect("previous year");

    layout.set_cyclic(true).expect("cyclic");
    let this_year = layout.intervals().get(IntervalId(1)).expect("1");
    let last_year = layout.intervals().get(IntervalId(9)).expect("9");
    assert_eq!(this_year.x_start, last_year.x_start);
    assert_ne!(this_year.level, last_year.level);

    layout.set_cyclic(false).expect("linear");
    let this_year = layout.intervals().get(IntervalId(1)).expect("1");
    let last_year = layout.intervals().get(IntervalId(9)).expect("9");
    assert!(last_year.x_start < this_year.x_start);
}

#[test]
fn snapshot_json_round_trip() {
    let layout = january_layout();
    let snapshot = layout.snapshot().expect("snapshot");

    assert_eq!(snapshot.levels, vec![
        vec![IntervalId(1), IntervalId(3)],
        vec![IntervalId(2)],
    ]);
    assert_eq!(snapshot.origin_millis, Some(ymd(2024, 1, 7)));
    assert_eq!(snapshot.total_width, 319);

    let json = layout.snapshot_json_pretty().expect("json");
    let restored = LayoutSnapshot::from_json_str(&json).expect("parse");
    assert_eq!(restored, snapshot);
}

#[test]
fn config_json_defaults_and_validation() {
    let config = TimelineLayoutConfig::from_json_str("{}").expect("defaults");
    assert_eq!(config, TimelineLayoutConfig::default());
    assert_eq!(config.scale, ScaleUnit::Day);
    assert_eq!(config.placement, PlacementConfig::default());

    let json = TimelineLayoutConfig::new(ScaleUnit::Month)
        .with_cyclic(true)
        .to_json_pretty()
        .expect("serialize");
    let parsed = TimelineLayoutConfig::from_json_str(&json).expect("parse");
    assert_eq!(parsed.scale, ScaleUnit::Month);
    assert!(parsed.cyclic);

    let reversed = TimelineLayoutConfig::from_json_str(r#"{"mapped_window":{"start":10,"end":5}}"#);
    assert_eq!(reversed, Err(LayoutError::InvalidSpan { start: 10, end: 5 }));

    let bad_rows = TimelineLayoutConfig::default().with_placement(PlacementConfig {
        body_height: 0,
        ..PlacementConfig::default()
    });
    assert!(TimelineLayout::new(bad_rows).is_err());
}

#[test]
fn tracing_init_reports_feature_state() {
    let installed = timeline_layout::telemetry::init_default_tracing();
    if cfg!(feature = "telemetry") {
        // A second install always loses to the first.
        assert!(!timeline_layout::telemetry::init_default_tracing());
    } else {
        assert!(!installed);
    }
}
