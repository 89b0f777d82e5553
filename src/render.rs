//! HTML rendering of a built [`Dashboard`].
//!
//! The output is one self-contained document: inline CSS, inline SVG charts
//! and a few lines of script that switch tabs. It opens offline.

use crate::{
    config::Theme,
    dashboard::{BarChart, Dashboard, Gauge, LineChart, Tab, TextBlock, Widget},
    encode::DATE_FORMAT,
    kpi::Category,
};
use std::f64::consts::PI;

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 260.0;
const CHART_PAD: f64 = 40.0;
const GAUGE_RADIUS: f64 = 70.0;
const GAUGE_REST: &str = "#e5e5e5";

pub fn render_html(dashboard: &Dashboard) -> String {
    let config = &dashboard.config;
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {filters}
        {tab_bar}
        {panels}
    </div>
    <script>{js}</script>
</body>
</html>"#,
        title = escape(&config.title),
        css = inline_css(&config.theme),
        filters = render_filters(dashboard),
        tab_bar = render_tab_bar(&dashboard.tabs),
        panels = dashboard
            .tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| render_tab(tab, i == 0, &config.theme))
            .collect::<String>(),
        js = inline_javascript(),
    )
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn render_filters(dashboard: &Dashboard) -> String {
    let icons = &dashboard.config.icons;
    let selection = &dashboard.selection;
    let search = match selection.search.trim() {
        "" => "all KPIs".to_string(),
        q => format!("\"{}\"", escape(q)),
    };
    let projects = match selection.projects.is_empty() {
        true => "all projects".to_string(),
        false => escape(&selection.projects.join(", ")),
    };
    format!(
        r#"<div class="filters">
            <span>{search_icon} Search: {search}</span>
            <span>{timeline_icon} {timeline} ({start} to {end}, {rows} days of data)</span>
            <span>{projects_icon} Projects: {projects}</span>
        </div>"#,
        search_icon = escape(&icons.search),
        timeline_icon = escape(&icons.timeline),
        projects_icon = escape(&icons.projects),
        timeline = selection.timeline,
        start = dashboard.interval.start.format(DATE_FORMAT),
        end = dashboard.interval.end.format(DATE_FORMAT),
        rows = dashboard.rows_in_range,
    )
}

fn render_tab_bar(tabs: &[Tab]) -> String {
    let mut out = String::from(r#"<div class="tabs">"#);
    for (i, tab) in tabs.iter().enumerate() {
        out.push_str(&format!(
            r#"<button class="tab{active}" data-tab="{id}">{label}</button>"#,
            active = if i == 0 { " active" } else { "" },
            id = tab.id,
            label = escape(&tab.label),
        ));
    }
    out.push_str("</div>");
    out
}

fn render_tab(tab: &Tab, active: bool, theme: &Theme) -> String {
    let body: String = tab
        .widgets
        .iter()
        .map(|w| match w {
            Widget::Bar(bar) => render_bar_chart(bar, theme),
            Widget::Gauges(gauges) => render_gauges(gauges, theme),
            Widget::Line(line) => render_line_chart(line, theme),
            Widget::Text(block) => render_text_block(block, theme),
        })
        .collect();
    format!(
        r#"<section class="panel{active}" id="tab-{id}"><h2>{heading}</h2>{body}</section>"#,
        active = if active { " active" } else { "" },
        id = tab.id,
        heading = escape(&tab.heading),
        body = body,
    )
}

fn render_bar_chart(chart: &BarChart, theme: &Theme) -> String {
    let mut svg = svg_open(&chart.title);
    if chart.bars.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle">No KPIs match the search</text>"#,
            x = CHART_WIDTH / 2.0,
            y = CHART_HEIGHT / 2.0,
        ));
    } else {
        let max = chart
            .bars
            .iter()
            .map(|b| b.value)
            .fold(0.0_f64, f64::max)
            .max(f64::EPSILON);
        let plot_w = CHART_WIDTH - 2.0 * CHART_PAD;
        let plot_h = CHART_HEIGHT - 2.0 * CHART_PAD;
        let slot = plot_w / chart.bars.len() as f64;
        for (i, bar) in chart.bars.iter().enumerate() {
            let h = (bar.value.max(0.0) / max) * plot_h;
            let x = CHART_PAD + i as f64 * slot + slot * 0.1;
            let y = CHART_HEIGHT - CHART_PAD - h;
            svg.push_str(&format!(
                r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"><title>{label}: {value}</title></rect>"#,
                w = slot * 0.8,
                fill = escape(theme.category_color(bar.category)),
                label = escape(&bar.label),
                value = bar.value,
            ));
        }
        svg.push_str(&render_legend(theme));
    }
    svg.push_str("</svg>");
    figure(&chart.title, svg)
}

fn render_legend(theme: &Theme) -> String {
    let mut out = String::new();
    for (i, category) in Category::ALL.iter().enumerate() {
        let x = CHART_PAD + i as f64 * 140.0;
        out.push_str(&format!(
            r#"<rect x="{x}" y="8" width="12" height="12" fill="{fill}"/><text x="{tx}" y="19" font-size="12">{label}</text>"#,
            tx = x + 16.0,
            fill = escape(theme.category_color(*category)),
            label = category.label(),
        ));
    }
    out
}

fn render_gauges(gauges: &[Gauge], theme: &Theme) -> String {
    let mut out = String::from(r#"<div class="gauges">"#);
    for gauge in gauges {
        out.push_str(&render_gauge(gauge, theme));
    }
    out.push_str("</div>");
    out
}

fn render_gauge(gauge: &Gauge, theme: &Theme) -> String {
    let size = GAUGE_RADIUS * 2.0 + 20.0;
    let (cx, cy) = (size / 2.0, size / 2.0);
    let fraction = gauge.fraction();
    let mut svg = format!(
        r#"<svg class="gauge" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#
    );
    // A full circle can't be drawn as a single arc.
    if fraction >= 1.0 || fraction <= 0.0 {
        let fill = if fraction >= 1.0 {
            theme.operational.as_str()
        } else {
            GAUGE_REST
        };
        svg.push_str(&format!(
            r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}"/>"#,
            r = GAUGE_RADIUS,
            fill = escape(fill),
        ));
    } else {
        svg.push_str(&pie_slice(cx, cy, 0.0, fraction, &theme.operational));
        svg.push_str(&pie_slice(cx, cy, fraction, 1.0, GAUGE_REST));
    }
    svg.push_str(&format!(
        r#"<text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle" font-weight="bold">{value:.0}</text></svg>"#,
        value = gauge.value,
    ));
    let caption = match gauge.raw {
        Some(raw) => format!("{} ({})", gauge.label, raw),
        None => format!("{} (no data)", gauge.label),
    };
    figure(&caption, svg)
}

fn pie_slice(cx: f64, cy: f64, from: f64, to: f64, fill: &str) -> String {
    let point = |t: f64| {
        let angle = 2.0 * PI * t - PI / 2.0;
        (cx + GAUGE_RADIUS * angle.cos(), cy + GAUGE_RADIUS * angle.sin())
    };
    let (x0, y0) = point(from);
    let (x1, y1) = point(to);
    let large_arc = if to - from > 0.5 { 1 } else { 0 };
    format!(
        r#"<path d="M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {r} {r} 0 {large_arc} 1 {x1:.2} {y1:.2} Z" fill="{fill}"/>"#,
        r = GAUGE_RADIUS,
        fill = escape(fill),
    )
}

fn render_line_chart(chart: &LineChart, theme: &Theme) -> String {
    let mut svg = svg_open(&chart.title);
    let palette = [
        &theme.operational,
        &theme.financial,
        &theme.customer,
        &theme.ai_model,
    ];
    let max = chart
        .lines
        .iter()
        .flat_map(|l| l.values.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let min = chart
        .lines
        .iter()
        .flat_map(|l| l.values.iter().copied())
        .fold(f64::INFINITY, f64::min);

    if chart.dates.is_empty() || !max.is_finite() {
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle">No data in the selected range</text>"#,
            x = CHART_WIDTH / 2.0,
            y = CHART_HEIGHT / 2.0,
        ));
    } else {
        let span = (max - min).max(1.0);
        let plot_w = CHART_WIDTH - 2.0 * CHART_PAD;
        let plot_h = CHART_HEIGHT - 2.0 * CHART_PAD;
        let step = match chart.dates.len() {
            1 => 0.0,
            n => plot_w / (n - 1) as f64,
        };
        for (i, line) in chart.lines.iter().enumerate() {
            let color = palette[i % palette.len()];
            let points: Vec<String> = line
                .values
                .iter()
                .enumerate()
                .map(|(j, v)| {
                    let x = CHART_PAD + j as f64 * step;
                    let y = CHART_HEIGHT - CHART_PAD - (v - min) / span * plot_h;
                    format!("{:.1},{:.1}", x, y)
                })
                .collect();
            svg.push_str(&format!(
                r#"<polyline fill="none" stroke="{color}" stroke-width="2" points="{points}"><title>{metric}</title></polyline><text x="{lx}" y="19" font-size="12" fill="{color}">{metric}</text>"#,
                color = escape(color),
                points = points.join(" "),
                metric = escape(&line.metric),
                lx = CHART_PAD + i as f64 * 140.0,
            ));
        }
        if let (Some(first), Some(last)) = (chart.dates.first(), chart.dates.last()) {
            svg.push_str(&format!(
                r#"<text x="{l}" y="{y}" font-size="11">{first}</text><text x="{r}" y="{y}" font-size="11" text-anchor="end">{last}</text>"#,
                l = CHART_PAD,
                r = CHART_WIDTH - CHART_PAD,
                y = CHART_HEIGHT - CHART_PAD / 3.0,
                first = first.format(DATE_FORMAT),
                last = last.format(DATE_FORMAT),
            ));
        }
    }
    svg.push_str("</svg>");
    figure(&chart.title, svg)
}

fn render_text_block(block: &TextBlock, theme: &Theme) -> String {
    let mut out = format!(
        r#"<div class="block" style="background-color:{bg}"><h3 style="color:{text}">{heading}</h3>"#,
        bg = escape(&block.background),
        text = escape(&theme.text),
        heading = escape(&block.heading),
    );
    if !block.items.is_empty() {
        out.push_str("<ul>");
        for item in &block.items {
            out.push_str(&format!("<li>{}</li>", escape(item)));
        }
        out.push_str("</ul>");
    }
    for (i, card) in block.cards.iter().enumerate() {
        out.push_str(&format!(
            r#"<div class="card" style="background-color:{bg}"><b>{title}</b>: {entries}</div>"#,
            bg = escape(theme.project_card(i)),
            title = escape(&card.title),
            entries = escape(&card.entries.join(" | ")),
        ));
    }
    out.push_str("</div>");
    out
}

fn svg_open(title: &str) -> String {
    format!(
        r#"<svg class="chart" viewBox="0 0 {w} {h}" role="img" aria-label="{label}">"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        label = escape(title),
    )
}

fn figure(caption: &str, svg: String) -> String {
    format!(
        "<figure>{}<figcaption>{}</figcaption></figure>",
        svg,
        escape(caption)
    )
}

fn inline_css(theme: &Theme) -> String {
    format!(
        r#"
body {{ font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; color: {text}; }}
.container {{ max-width: 1100px; margin: 0 auto; padding: 24px; }}
.filters {{ display: flex; gap: 24px; flex-wrap: wrap; margin-bottom: 16px; }}
.tabs {{ display: flex; gap: 4px; border-bottom: 1px solid #ddd; }}
.tab {{ border: none; background: none; padding: 10px 16px; cursor: pointer; font-size: 15px; }}
.tab.active {{ border-bottom: 3px solid {accent}; font-weight: bold; }}
.panel {{ display: none; padding-top: 12px; }}
.panel.active {{ display: block; }}
.chart {{ width: 100%; height: auto; }}
.gauges {{ display: flex; gap: 24px; flex-wrap: wrap; }}
figure {{ margin: 12px 0; }}
figcaption {{ text-align: center; font-size: 13px; }}
.block {{ padding: 20px; border-radius: 15px; margin-top: 20px; }}
.card {{ padding: 15px; border-radius: 10px; margin-top: 10px; }}
"#,
        text = theme.text,
        accent = theme.operational,
    )
}

fn inline_javascript() -> &'static str {
    r#"
document.querySelectorAll('.tab').forEach(function (button) {
    button.addEventListener('click', function () {
        document.querySelectorAll('.tab').forEach(function (b) { b.classList.remove('active'); });
        document.querySelectorAll('.panel').forEach(function (p) { p.classList.remove('active'); });
        button.classList.add('active');
        document.getElementById('tab-' + button.dataset.tab).classList.add('active');
    });
});
"#
}
