use ratatui::{
    layout::Direction,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType},
};

use crate::analytics::{month_label, AgePoint, CategoryBreakdown, ItemTotal, MonthlyGender};
use crate::fmt::{percent, whole_money};
use crate::tui::{gender_color, FOOTER_STYLE, PALETTE};

const TITLE_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

fn chart_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(TITLE_STYLE)
        .borders(Borders::NONE)
}

fn whole(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

/// Category share as horizontal bars, one color per slice.
pub fn category_chart(breakdown: &CategoryBreakdown) -> BarChart<'static> {
    let bars: Vec<Bar> = breakdown
        .slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            let color = PALETTE[i % PALETTE.len()];
            Bar::default()
                .value(whole(slice.total))
                .label(Line::from(slice.label.clone()))
                .text_value(format!("{} {}", whole_money(whole(slice.total) as i64), percent(slice.pct)))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    BarChart::default()
        .block(chart_block(breakdown.title()))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
}

/// Monthly totals, one bar per gender inside each month group.
pub fn monthly_chart(monthly: &MonthlyGender) -> BarChart<'static> {
    let mut chart = BarChart::default()
        .block(chart_block("Sales by Month and Gender".to_string()))
        .bar_width(4)
        .bar_gap(0)
        .group_gap(2);

    for (i, month) in monthly.months.iter().enumerate() {
        let bars: Vec<Bar> = monthly
            .series
            .iter()
            .map(|s| {
                let total = s.totals.get(i).copied().unwrap_or(0.0);
                Bar::default()
                    .value(whole(total))
                    .text_value(String::new())
                    .style(Style::default().fg(gender_color(&s.gender)))
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(month_label(*month)))
                .bars(&bars),
        );
    }
    chart
}

/// Legend line for the series of the monthly and age charts.
pub fn gender_legend<'a>(genders: impl IntoIterator<Item = &'a str>) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for gender in genders {
        spans.push(Span::styled("■ ", Style::default().fg(gender_color(gender))));
        spans.push(Span::styled(format!("{gender}  "), FOOTER_STYLE));
    }
    Line::from(spans)
}

/// Top items as horizontal bars, best seller on top.
pub fn top_items_chart(items: &[ItemTotal]) -> BarChart<'static> {
    let bars: Vec<Bar> = items
        .iter()
        .rev()
        .map(|item| {
            Bar::default()
                .value(whole(item.total))
                .label(Line::from(item.item_name.clone()))
                .text_value(whole_money(item.total as i64))
                .style(Style::default().fg(PALETTE[0]))
                .value_style(Style::default().fg(Color::Black).bg(PALETTE[0]))
        })
        .collect();

    BarChart::default()
        .block(chart_block(format!("Top {} Items", items.len())))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars))
}

/// Scatter points grouped per gender, in legend order.
pub struct AgeSeries {
    pub gender: String,
    pub points: Vec<(f64, f64)>,
}

pub fn age_series(points: &[AgePoint]) -> Vec<AgeSeries> {
    let mut series: Vec<AgeSeries> = Vec::new();
    for p in points {
        let point = (p.age as f64, p.total);
        match series.iter_mut().find(|s| s.gender == p.gender) {
            Some(s) => s.points.push(point),
            None => series.push(AgeSeries {
                gender: p.gender.clone(),
                points: vec![point],
            }),
        }
    }
    let rank = |g: &str| match g {
        "male" => 0,
        "female" => 1,
        _ => 2,
    };
    series.sort_by(|a, b| rank(&a.gender).cmp(&rank(&b.gender)).then_with(|| a.gender.cmp(&b.gender)));
    series
}

/// Axis bounds padded so edge points are not drawn on the frame.
pub fn age_bounds(series: &[AgeSeries]) -> ([f64; 2], [f64; 2]) {
    let all = series.iter().flat_map(|s| s.points.iter());
    let (mut x_min, mut x_max, mut y_max) = (f64::MAX, f64::MIN, 0.0_f64);
    for (x, y) in all {
        x_min = x_min.min(*x);
        x_max = x_max.max(*x);
        y_max = y_max.max(*y);
    }
    if x_min > x_max {
        return ([0.0, 100.0], [0.0, 1.0]);
    }
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
    ([(x_min - 1.0).max(0.0), x_max + 1.0], [0.0, y_top])
}

pub fn age_spend_chart(series: &[AgeSeries]) -> Chart<'_> {
    let (x_bounds, y_bounds) = age_bounds(series);
    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.gender.clone())
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(gender_color(&s.gender)))
                .data(&s.points)
        })
        .collect();

    let x_labels = vec![
        Span::styled(format!("{:.0}", x_bounds[0]), FOOTER_STYLE),
        Span::styled(format!("{:.0}", (x_bounds[0] + x_bounds[1]) / 2.0), FOOTER_STYLE),
        Span::styled(format!("{:.0}", x_bounds[1]), FOOTER_STYLE),
    ];
    let y_labels = vec![
        Span::styled("$0", FOOTER_STYLE),
        Span::styled(whole_money((y_bounds[1] / 2.0) as i64), FOOTER_STYLE),
        Span::styled(whole_money(y_bounds[1] as i64), FOOTER_STYLE),
    ];

    Chart::new(datasets)
        .block(chart_block("Age vs. Spend".to_string()))
        .x_axis(
            Axis::default()
                .title("Age")
                .style(FOOTER_STYLE)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Total")
                .style(FOOTER_STYLE)
                .bounds(y_bounds)
                .labels(y_labels),
        )
}
