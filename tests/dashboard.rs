use chrono::{Duration, NaiveDate};
use kpiboard::{
    config::DashboardConfig,
    dashboard::{Dashboard, Selection, Widget},
    encode::{decode_series, encode_series},
    filter_by_date,
    kpi::Catalogue,
    mock::MockGenerator,
    normalize,
    render::render_html,
    DateInterval, MetricRow, MetricSeries, RangeError, Timeline,
};

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Duration::days(n - 1)
}

#[test]
fn test_filter_ten_to_twenty() {
    let series = MetricSeries::new(
        (1..=30)
            .map(|n| MetricRow::new(day(n)).with("active_users", n as f64))
            .collect(),
    )
    .unwrap();
    let result = filter_by_date(&series, &DateInterval::new(day(10), day(20)).unwrap()).unwrap();
    let dates: Vec<NaiveDate> = result.rows().iter().map(|r| r.date).collect();
    assert_eq!(dates, (10..=20).map(day).collect::<Vec<_>>());

    // The source series is left untouched.
    assert_eq!(series.len(), 30);
}

#[test]
fn test_normalize_active_users() {
    assert_eq!(normalize(500.0, 5.0, 0.0, 100.0), Ok(100.0));
    assert_eq!(normalize(250.0, 5.0, 0.0, 100.0), Ok(50.0));
    assert_eq!(
        normalize(250.0, 0.0, 0.0, 100.0),
        Err(RangeError::DivisionByZero)
    );
}

#[test]
fn test_csv_to_html() {
    let series = MockGenerator::new(5).generate(day(1), 120).unwrap();
    let mut csv = vec![];
    encode_series(&mut csv, &series).unwrap();
    let loaded = decode_series(csv.as_slice()).unwrap();
    assert_eq!(loaded, series);

    let config = DashboardConfig::from_json(r#"{"title": "Support & Sales"}"#).unwrap();
    let selection = Selection {
        search: String::new(),
        timeline: Timeline::Quarter,
        projects: vec!["Lead Generator".to_string()],
        anchor: day(120),
    };
    let dashboard = Dashboard::build(&config, &Catalogue::default(), &loaded, &selection).unwrap();
    assert_eq!(dashboard.rows_in_range, 90);
    assert_eq!(dashboard.interval, Timeline::Quarter.interval(day(120)).unwrap());
    match &dashboard.tabs[0].widgets[1] {
        Widget::Gauges(gauges) => {
            let raw = loaded.last().and_then(|r| r.get("active_users")).unwrap();
            assert_eq!(gauges[0].value, normalize(raw, 5.0, 0.0, 100.0).unwrap());
        }
        w => panic!("unexpected widget {:?}", w),
    }

    let html = render_html(&dashboard);
    assert!(html.contains("<title>Support &amp; Sales</title>"));
    assert!(html.contains("Lead Generator"));
    assert!(!html.contains("<b>Expert Finder</b>"));
}
