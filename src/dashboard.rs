use crate::{
    config::{ConfigError, DashboardConfig, GaugeConfig},
    kpi::{filter_projects, search, Catalogue, Category, Kpi, Project},
    metric::MetricSeries,
    range::{filter_by_date, normalize, DateInterval, RangeError, Timeline},
};
use chrono::NaiveDate;
use log::debug;
use thiserror::Error;

// (catalogue name, label shown in the block)
const OVERVIEW_COMPANY: [(&str, &str); 3] = [
    ("ROI", "ROI"),
    ("Average Handling Time", "Avg Handling Time"),
    ("NPS", "Net Promoter Score"),
];
const COMPANY_BREAKDOWN: [(&str, &str); 4] = [
    ("Automated Resolution Rate", "Automated Resolution Rate"),
    ("First Contact Resolution", "First Contact Resolution"),
    ("Average Handling Time", "Average Handling Time"),
    ("ROI", "ROI"),
];

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("invalid dashboard config")]
    InvalidConfig(#[from] ConfigError),
    #[error("error filtering or normalizing metrics")]
    Range(#[from] RangeError),
    #[error("metric {0:?} is not present in the series")]
    UnknownMetric(String),
}

/// What the viewer picked in the filter bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub search: String,
    pub timeline: Timeline,
    pub projects: Vec<String>,
    // The timeline window ends on this date.
    pub anchor: NaiveDate,
}

impl Selection {
    pub fn new(anchor: NaiveDate) -> Self {
        Self {
            search: String::new(),
            timeline: Timeline::default(),
            projects: vec![],
            anchor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub label: String,
    pub metric: String,
    pub raw: Option<f64>,
    pub value: f64,
    pub max: f64,
}

impl Gauge {
    /// Filled share of the pie, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.value / self.max).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub metric: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub dates: Vec<NaiveDate>,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub heading: String,
    pub background: String,
    pub items: Vec<String>,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Bar(BarChart),
    Gauges(Vec<Gauge>),
    Line(LineChart),
    Text(TextBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: &'static str,
    pub label: String,
    pub heading: String,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub config: DashboardConfig,
    pub selection: Selection,
    pub interval: DateInterval,
    pub rows_in_range: usize,
    pub tabs: Vec<Tab>,
}

impl Dashboard {
    pub fn build(
        config: &DashboardConfig,
        catalogue: &Catalogue,
        series: &MetricSeries,
        selection: &Selection,
    ) -> Result<Self, DashboardError> {
        config.validate()?;
        check_metrics(config, series)?;

        let interval = selection.timeline.interval(selection.anchor)?;
        let in_range = filter_by_date(series, &interval)?;
        debug!(
            "building dashboard for {} ({} of {} rows)",
            selection.timeline,
            in_range.len(),
            series.len()
        );

        let kpis = search(&catalogue.company, &selection.search);
        let projects = filter_projects(&catalogue.projects, selection.projects.as_slice());
        let builder = TabBuilder {
            config,
            catalogue,
            kpis: &kpis,
            projects: &projects,
        };

        let tabs = vec![
            builder.overview(&in_range)?,
            builder.company(),
            builder.project(),
        ];

        Ok(Self {
            config: config.clone(),
            selection: selection.clone(),
            interval,
            rows_in_range: in_range.len(),
            tabs,
        })
    }
}

fn check_metrics(config: &DashboardConfig, series: &MetricSeries) -> Result<(), DashboardError> {
    if series.is_empty() {
        return Ok(());
    }
    let wanted = config
        .gauges
        .iter()
        .map(|g| &g.metric)
        .chain(config.line_metrics.iter());
    for metric in wanted {
        if !series.has_metric(metric) {
            return Err(DashboardError::UnknownMetric(metric.clone()));
        }
    }
    Ok(())
}

struct TabBuilder<'a> {
    config: &'a DashboardConfig,
    catalogue: &'a Catalogue,
    kpis: &'a [&'a Kpi],
    projects: &'a [&'a Project],
}

impl<'a> TabBuilder<'a> {
    fn overview(&self, in_range: &MetricSeries) -> Result<Tab, DashboardError> {
        let icons = &self.config.icons;
        let bar = BarChart {
            title: "Company & Project KPI Overview".to_string(),
            bars: self
                .kpis
                .iter()
                .map(|k| Bar {
                    label: k.name.clone(),
                    value: k.value,
                    category: k.category,
                })
                .collect(),
        };

        let gauges = self
            .config
            .gauges
            .iter()
            .map(|g| gauge(g, in_range))
            .collect::<Result<Vec<_>, _>>()?;

        let line = LineChart {
            title: "KPI Trend".to_string(),
            dates: in_range.rows().iter().map(|r| r.date).collect(),
            lines: self
                .config
                .line_metrics
                .iter()
                .map(|m| Line {
                    metric: m.clone(),
                    values: in_range.column(m).into_iter().map(|(_, v)| v).collect(),
                })
                .collect(),
        };

        Ok(Tab {
            id: "overview",
            label: format!("{} Overview", icons.overview),
            heading: format!("{} High-Level Overview", icons.overview),
            widgets: vec![
                Widget::Bar(bar),
                Widget::Gauges(gauges),
                Widget::Line(line),
                Widget::Text(self.company_block("Company-Level KPIs", &OVERVIEW_COMPANY)),
                Widget::Text(self.project_block(
                    "Project KPIs",
                    &self.config.theme.project_block,
                    |p| &p.summary,
                )),
            ],
        })
    }

    fn company(&self) -> Tab {
        let icons = &self.config.icons;
        Tab {
            id: "company",
            label: format!("{} Company KPIs", icons.company),
            heading: format!("{} Company KPI Breakdown", icons.company),
            widgets: vec![
                Widget::Text(self.company_block("Company-Level KPIs", &COMPANY_BREAKDOWN)),
                Widget::Text(self.project_block(
                    "Project KPI Overview",
                    &self.config.theme.project_block,
                    |p| &p.kpis,
                )),
            ],
        }
    }

    fn project(&self) -> Tab {
        let icons = &self.config.icons;
        let theme = &self.config.theme;
        Tab {
            id: "project",
            label: format!("{} Project KPIs", icons.project),
            heading: format!("{} Project KPI Breakdown", icons.project),
            widgets: vec![
                Widget::Text(TextBlock {
                    heading: format!("{} General Project KPIs", icons.pin),
                    background: theme.general_block.clone(),
                    items: self.catalogue.general.iter().map(Kpi::to_string).collect(),
                    cards: vec![],
                }),
                Widget::Text(self.project_block(
                    "Detailed Project KPIs",
                    &theme.company_block,
                    |p| &p.details,
                )),
            ],
        }
    }

    // Lists the named company KPIs that survive the search, in the given order.
    fn company_block(&self, heading: &str, names: &[(&str, &str)]) -> TextBlock {
        let items = names
            .iter()
            .filter_map(|(name, label)| {
                self.kpis
                    .iter()
                    .find(|k| k.name == *name)
                    .map(|k| format!("{}: {}", label, k.display_value()))
            })
            .collect();
        TextBlock {
            heading: format!("{} {}", self.config.icons.pin, heading),
            background: self.config.theme.company_block.clone(),
            items,
            cards: vec![],
        }
    }

    fn project_block<F>(&self, heading: &str, background: &str, pick: F) -> TextBlock
    where
        F: Fn(&Project) -> &Vec<Kpi>,
    {
        TextBlock {
            heading: format!("{} {}", self.config.icons.projects, heading),
            background: background.to_string(),
            items: vec![],
            cards: self
                .projects
                .iter()
                .map(|p| Card {
                    title: p.name.clone(),
                    entries: pick(p).iter().map(Kpi::to_string).collect(),
                })
                .collect(),
        }
    }
}

fn gauge(config: &GaugeConfig, in_range: &MetricSeries) -> Result<Gauge, DashboardError> {
    let raw = in_range.last().and_then(|row| row.get(&config.metric));
    let value = normalize(raw.unwrap_or(0.0), config.divisor, config.min, config.max)?;
    Ok(Gauge {
        label: config.label.clone(),
        metric: config.metric.clone(),
        raw,
        value,
        max: config.max,
    })
}

#[cfg(test)]
pub mod tests {
    use chrono::{Duration, NaiveDate};

    use super::{Dashboard, DashboardError, Selection, Widget};
    use crate::{
        config::DashboardConfig,
        kpi::Catalogue,
        metric::{MetricRow, MetricSeries},
        mock::MockGenerator,
        range::Timeline,
    };

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn build(series: &MetricSeries, selection: &Selection) -> Result<Dashboard, DashboardError> {
        Dashboard::build(
            &DashboardConfig::default(),
            &Catalogue::default(),
            series,
            selection,
        )
    }

    fn overview_widgets(dashboard: &Dashboard) -> &[Widget] {
        &dashboard.tabs[0].widgets
    }

    #[test]
    fn test_three_tabs() {
        let series = MockGenerator::new(1).generate(start(), 90).unwrap();
        let dashboard = build(&series, &Selection::new(start() + Duration::days(89))).unwrap();
        let ids: Vec<&str> = dashboard.tabs.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["overview", "company", "project"]);
        assert_eq!(dashboard.tabs[0].label, "📊 Overview");
    }

    #[test]
    fn test_timeline_limits_line_chart() {
        let series = MockGenerator::new(1).generate(start(), 90).unwrap();
        let mut selection = Selection::new(start() + Duration::days(89));
        selection.timeline = Timeline::Last30Days;
        let dashboard = build(&series, &selection).unwrap();
        assert_eq!(dashboard.rows_in_range, 30);
        match &overview_widgets(&dashboard)[2] {
            Widget::Line(line) => {
                assert_eq!(line.dates.len(), 30);
                assert_eq!(line.lines.len(), 3);
                assert!(line.lines.iter().all(|l| l.values.len() == 30));
            }
            w => panic!("unexpected widget {:?}", w),
        }
    }

    #[test]
    fn test_gauge_uses_latest_row_in_range() {
        let series = MetricSeries::new(vec![
            MetricRow::new(start())
                .with("active_users", 100.0)
                .with("csat", 1.0)
                .with("nps", 1.0)
                .with("resolution_rate", 1.0),
            MetricRow::new(start() + Duration::days(1))
                .with("active_users", 250.0)
                .with("csat", 1.0)
                .with("nps", 1.0)
                .with("resolution_rate", 1.0),
        ])
        .unwrap();
        let dashboard = build(&series, &Selection::new(start() + Duration::days(1))).unwrap();
        match &overview_widgets(&dashboard)[1] {
            Widget::Gauges(gauges) => {
                assert_eq!(gauges.len(), 1);
                assert_eq!(gauges[0].raw, Some(250.0));
                assert_eq!(gauges[0].value, 50.0);
                assert_eq!(gauges[0].fraction(), 0.5);
            }
            w => panic!("unexpected widget {:?}", w),
        }
    }

    #[test]
    fn test_empty_range_gives_zero_gauge() {
        let series = MockGenerator::new(1).generate(start(), 10).unwrap();
        let dashboard = build(&series, &Selection::new(start() + Duration::days(300))).unwrap();
        assert_eq!(dashboard.rows_in_range, 0);
        match &overview_widgets(&dashboard)[1] {
            Widget::Gauges(gauges) => {
                assert_eq!(gauges[0].raw, None);
                assert_eq!(gauges[0].value, 0.0);
            }
            w => panic!("unexpected widget {:?}", w),
        }
    }

    #[test]
    fn test_search_filters_bars_and_blocks() {
        let series = MockGenerator::new(1).generate(start(), 10).unwrap();
        let mut selection = Selection::new(start() + Duration::days(9));
        selection.search = "roi".to_string();
        let dashboard = build(&series, &selection).unwrap();
        match &overview_widgets(&dashboard)[0] {
            Widget::Bar(bar) => {
                assert_eq!(bar.bars.len(), 1);
                assert_eq!(bar.bars[0].label, "ROI");
            }
            w => panic!("unexpected widget {:?}", w),
        }
        match &overview_widgets(&dashboard)[3] {
            Widget::Text(block) => assert_eq!(block.items, vec!["ROI: 1.6x".to_string()]),
            w => panic!("unexpected widget {:?}", w),
        }
    }

    #[test]
    fn test_project_filter() {
        let series = MockGenerator::new(1).generate(start(), 10).unwrap();
        let mut selection = Selection::new(start() + Duration::days(9));
        selection.projects = vec!["Expert Finder".to_string()];
        let dashboard = build(&series, &selection).unwrap();
        match &dashboard.tabs[2].widgets[1] {
            Widget::Text(block) => {
                assert_eq!(block.cards.len(), 1);
                assert_eq!(block.cards[0].title, "Expert Finder");
                assert_eq!(
                    block.cards[0].entries,
                    vec!["Model Accuracy: 91%", "Time to Deploy: 2 weeks"]
                );
            }
            w => panic!("unexpected widget {:?}", w),
        }
    }

    #[test]
    fn test_overview_and_company_labels() {
        let series = MockGenerator::new(1).generate(start(), 10).unwrap();
        let dashboard = build(&series, &Selection::new(start() + Duration::days(9))).unwrap();
        match (&dashboard.tabs[0].widgets[3], &dashboard.tabs[0].widgets[4]) {
            (Widget::Text(company), Widget::Text(projects)) => {
                assert_eq!(
                    company.items,
                    vec![
                        "ROI: 1.6x",
                        "Avg Handling Time: 3.5 mins",
                        "Net Promoter Score: 72"
                    ]
                );
                assert_eq!(
                    projects.cards[1].entries,
                    vec!["NPS: 68", "CSAT: 84", "Res Time: 2.8 mins"]
                );
            }
            w => panic!("unexpected widgets {:?}", w),
        }
        match &dashboard.tabs[1].widgets[1] {
            Widget::Text(block) => assert_eq!(
                block.cards[1].entries,
                vec!["Resolution Time: 2.8 mins", "NPS: 68", "CSAT: 84"]
            ),
            w => panic!("unexpected widget {:?}", w),
        }
    }

    #[test]
    fn test_unknown_metric() {
        let series =
            MetricSeries::new(vec![MetricRow::new(start()).with("csat", 80.0)]).unwrap();
        let err = build(&series, &Selection::new(start())).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownMetric(m) if m == "active_users"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DashboardConfig::default();
        config.gauges[0].divisor = 0.0;
        let err = Dashboard::build(
            &config,
            &Catalogue::default(),
            &MetricSeries::default(),
            &Selection::new(start()),
        )
        .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidConfig(_)));
    }
}
