use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crossterm::event::KeyCode;
use rusqlite::Connection;

use crate::analytics::{self, month_label, AgePoint, CategoryBreakdown, ItemTotal, Kpis, MonthlyGender, SalesTable};
use crate::cli::{ReportCommands, Session};
use crate::error::Result;
use crate::filter::SalesFilter;
use crate::fmt::{bar, date_dmy, money, number, percent, quantity, whole_money};
use crate::models::SALE_COLUMNS;
use crate::tui::{gender_color, money_span, ReportView, ReportViewAction, FOOTER_STYLE, HEADER_STYLE};

/// Build a report view from a command.
pub(crate) fn build_view(
    conn: &Connection,
    session: &Session,
    cmd: &ReportCommands,
    filter: &SalesFilter,
) -> Result<Box<dyn ReportView>> {
    let subtitle = filter.describe();
    let view = match cmd {
        ReportCommands::Summary { .. } => {
            let data = analytics::get_summary(conn, filter, cmd.category(), session.top_items(cmd.limit()))?;
            build_summary(&data)
        }
        ReportCommands::Kpi { .. } => build_kpis(&analytics::get_kpis(conn, filter)?),
        ReportCommands::Table { .. } => build_table(&analytics::get_sales(conn, filter)?),
        ReportCommands::Categories { .. } => {
            build_categories(&analytics::get_category_breakdown(conn, filter, cmd.category())?)
        }
        ReportCommands::Monthly { .. } => build_monthly(&analytics::get_monthly_gender(conn, filter)?),
        ReportCommands::TopItems { .. } => {
            build_top_items(&analytics::get_top_items(conn, filter, session.top_items(cmd.limit()))?)
        }
        ReportCommands::AgeSpend { .. } => build_age_spend(&analytics::get_age_spend(conn, filter)?),
    };
    Ok(Box::new(view.with_subtitle(subtitle)))
}

// ---------------------------------------------------------------------------
// Table-based report view (shared by all report types)
// ---------------------------------------------------------------------------

const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);
const SECTION_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);
const HEADER_ROW_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);
const BAR_STYLE: Style = Style::new().fg(Color::Rgb(99, 110, 250));
const BAR_WIDTH: usize = 24;

pub(crate) struct TableReportView {
    title: String,
    subtitle: String,
    header: Row<'static>,
    rows: Vec<Row<'static>>,
    widths: Vec<Constraint>,
    offset: usize,
    visible_count: usize,
}

impl TableReportView {
    fn new(
        title: impl Into<String>,
        header: Row<'static>,
        rows: Vec<Row<'static>>,
        widths: Vec<Constraint>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            header,
            rows,
            widths,
            offset: 0,
            visible_count: 20,
        }
    }

    fn with_subtitle(mut self, subtitle: String) -> Self {
        self.subtitle = subtitle;
        self
    }

    fn max_offset(&self) -> usize {
        self.rows.len().saturating_sub(self.visible_count)
    }
}

impl ReportView for TableReportView {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep_area, content_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(area);

        let mut title = vec![Span::styled(format!(" {}", self.title), HEADER_STYLE)];
        if !self.subtitle.is_empty() {
            title.push(Span::styled(format!("  ({})", self.subtitle), FOOTER_STYLE));
        }
        frame.render_widget(Paragraph::new(ratatui::text::Line::from(title)), header_area);

        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );

        // Header row + bottom margin take two lines
        let header_overhead = 2u16;
        let visible = content_area.height.saturating_sub(header_overhead) as usize;
        self.visible_count = visible.max(1);
        self.offset = self.offset.min(self.max_offset());

        let visible_rows: Vec<Row> = self
            .rows
            .iter()
            .skip(self.offset)
            .take(visible)
            .cloned()
            .collect();

        let table = Table::new(visible_rows, self.widths.clone())
            .header(self.header.clone())
            .column_spacing(2);

        frame.render_widget(table, content_area);

        let pos_info = if self.max_offset() > 0 {
            format!("  line {}/{}", self.offset + 1, self.rows.len())
        } else {
            String::new()
        };
        frame.render_widget(
            Paragraph::new(format!(" \u{2191}/\u{2193}=scroll  q/Esc=close{pos_info}"))
                .style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        let page = self.visible_count;
        let max = self.max_offset();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ReportViewAction::Close,
            KeyCode::Up | KeyCode::Char('k') => self.offset = self.offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.offset = (self.offset + 1).min(max),
            KeyCode::PageUp => self.offset = self.offset.saturating_sub(page),
            KeyCode::PageDown => self.offset = (self.offset + page).min(max),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.offset = max,
            _ => {}
        }
        ReportViewAction::Continue
    }
}

// ---------------------------------------------------------------------------
// Helper: create cells with consistent styling
// ---------------------------------------------------------------------------

fn money_cell(amount: f64) -> Cell<'static> {
    Cell::from(money_span(amount))
}

fn text_cell(s: impl Into<String>) -> Cell<'static> {
    Cell::from(s.into())
}

fn bold_cell(s: impl Into<String>) -> Cell<'static> {
    Cell::from(Span::styled(s.into(), BOLD))
}

fn bar_cell(value: f64, max: f64) -> Cell<'static> {
    Cell::from(Span::styled(bar(value, max, BAR_WIDTH), BAR_STYLE))
}

fn section_row(label: &str, num_cols: usize) -> Row<'static> {
    let mut cells: Vec<Cell> = vec![Cell::from(Span::styled(label.to_string(), SECTION_STYLE))];
    for _ in 1..num_cols {
        cells.push(Cell::from(""));
    }
    Row::new(cells)
}

fn blank_row(num_cols: usize) -> Row<'static> {
    Row::new(vec![Cell::from(""); num_cols])
}

fn header_row<const N: usize>(labels: [&'static str; N]) -> Row<'static> {
    Row::new(labels).style(HEADER_ROW_STYLE).bottom_margin(1)
}

// ---------------------------------------------------------------------------
// Row builders (shared by the single reports and the summary)
// ---------------------------------------------------------------------------

fn kpi_rows(kpis: &Kpis) -> Vec<Row<'static>> {
    vec![
        Row::new([text_cell("Total Sales"), bold_cell(whole_money(kpis.total_sales))]),
        Row::new([
            text_cell("Avg Sale"),
            kpis.avg_sale.map(money_cell).unwrap_or_else(|| text_cell("-")),
        ]),
        Row::new([text_cell("Total transactions"), text_cell(number(kpis.transactions))]),
    ]
}

fn category_rows(data: &CategoryBreakdown) -> Vec<Row<'static>> {
    let max = data.slices.iter().map(|s| s.total).fold(0.0, f64::max);
    let mut rows: Vec<Row> = data
        .slices
        .iter()
        .map(|s| {
            Row::new([
                text_cell(s.label.clone()),
                money_cell(s.total),
                text_cell(percent(s.pct)),
                bar_cell(s.total, max),
            ])
        })
        .collect();
    rows.push(Row::new([
        bold_cell("Total"),
        money_cell(data.total),
        text_cell(""),
        text_cell(""),
    ]));
    rows
}

fn monthly_rows(data: &MonthlyGender) -> Vec<Row<'static>> {
    data.months
        .iter()
        .enumerate()
        .map(|(i, month)| {
            let mut cells = vec![text_cell(month_label(*month))];
            for s in &data.series {
                let total = s.totals.get(i).copied().unwrap_or(0.0);
                cells.push(Cell::from(Span::styled(
                    money(total),
                    Style::default().fg(gender_color(&s.gender)),
                )));
            }
            Row::new(cells)
        })
        .collect()
}

fn top_item_rows(items: &[ItemTotal]) -> Vec<Row<'static>> {
    let max = items.iter().map(|i| i.total).fold(0.0, f64::max);
    items
        .iter()
        .rev()
        .map(|item| {
            Row::new([
                text_cell(item.item_name.clone()),
                text_cell(whole_money(item.total as i64)),
                bar_cell(item.total, max),
            ])
        })
        .collect()
}

fn age_rows(points: &[AgePoint]) -> Vec<Row<'static>> {
    points
        .iter()
        .map(|p| {
            Row::new([
                text_cell(p.age.to_string()),
                Cell::from(Span::styled(
                    p.gender.clone(),
                    Style::default().fg(gender_color(&p.gender)),
                )),
                money_cell(p.total),
            ])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Report builders
// ---------------------------------------------------------------------------

pub(crate) fn build_kpis(kpis: &Kpis) -> TableReportView {
    TableReportView::new(
        "Key Figures",
        header_row(["Metric", "Value"]),
        kpi_rows(kpis),
        vec![Constraint::Length(20), Constraint::Length(14)],
    )
}

/// Header, rows and column widths of the sales table, total row included.
pub(crate) fn sales_table_parts(data: &SalesTable) -> (Row<'static>, Vec<Row<'static>>, Vec<Constraint>) {
    let header = Row::new(SALE_COLUMNS.iter().copied())
        .style(HEADER_ROW_STYLE)
        .bottom_margin(1);
    let mut rows: Vec<Row> = data
        .rows
        .iter()
        .map(|r| {
            Row::new([
                text_cell(truncate(&r.full_name, 18)),
                text_cell(r.age.to_string()),
                text_cell(r.gender.clone()),
                text_cell(truncate(&r.item_name, 20)),
                text_cell(r.category.clone()),
                text_cell(r.item_tags.clone()),
                text_cell(r.season.clone()),
                text_cell(r.printing.clone()),
                text_cell(money(r.price)),
                text_cell(quantity(r.amount)),
                text_cell(date_dmy(r.order_date)),
                money_cell(r.total),
            ])
        })
        .collect();
    rows.push(blank_row(SALE_COLUMNS.len()));
    let mut total = vec![bold_cell(format!("{} rows", number(data.count as i64)))];
    total.extend((0..SALE_COLUMNS.len() - 2).map(|_| text_cell("")));
    total.push(money_cell(data.total));
    rows.push(Row::new(total));

    let widths = vec![
        Constraint::Length(18),
        Constraint::Length(4),
        Constraint::Length(7),
        Constraint::Length(20),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(13),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(12),
    ];
    (header, rows, widths)
}

pub(crate) fn build_table(data: &SalesTable) -> TableReportView {
    let (header, rows, widths) = sales_table_parts(data);
    TableReportView::new("Sales", header, rows, widths)
}

pub(crate) fn build_categories(data: &CategoryBreakdown) -> TableReportView {
    let first = if data.selected.is_some() { "Item" } else { "Category" };
    TableReportView::new(
        data.title(),
        header_row([first, "Total", "%", ""]),
        category_rows(data),
        vec![
            Constraint::Length(20),
            Constraint::Length(14),
            Constraint::Length(7),
            Constraint::Fill(1),
        ],
    )
}

pub(crate) fn build_monthly(data: &MonthlyGender) -> TableReportView {
    let mut labels = vec!["Month".to_string()];
    labels.extend(data.series.iter().map(|s| s.gender.clone()));
    let header = Row::new(labels).style(HEADER_ROW_STYLE).bottom_margin(1);
    let mut widths = vec![Constraint::Length(8)];
    widths.extend(data.series.iter().map(|_| Constraint::Length(14)));
    TableReportView::new("Sales by Month and Gender", header, monthly_rows(data), widths)
}

pub(crate) fn build_top_items(items: &[ItemTotal]) -> TableReportView {
    TableReportView::new(
        format!("Top {} Items", items.len()),
        header_row(["Item", "Total", ""]),
        top_item_rows(items),
        vec![Constraint::Length(24), Constraint::Length(12), Constraint::Fill(1)],
    )
}

pub(crate) fn build_age_spend(points: &[AgePoint]) -> TableReportView {
    TableReportView::new(
        "Age vs. Spend",
        header_row(["Age", "Gender", "Total"]),
        age_rows(points),
        vec![Constraint::Length(6), Constraint::Length(10), Constraint::Length(14)],
    )
}

/// Every section stacked into one four-column table.
pub(crate) fn build_summary(data: &analytics::Summary) -> TableReportView {
    const COLS: usize = 4;
    let pad = |row: Vec<Cell<'static>>| {
        let mut cells = row;
        cells.resize(COLS, Cell::from(""));
        Row::new(cells)
    };
    let mut rows = Vec::new();

    rows.push(section_row("KEY FIGURES", COLS));
    rows.extend(kpi_rows(&data.kpis));
    rows.push(blank_row(COLS));

    rows.push(section_row(&data.categories.title().to_uppercase(), COLS));
    rows.extend(category_rows(&data.categories));
    rows.push(blank_row(COLS));

    rows.push(section_row("BY MONTH AND GENDER", COLS));
    let genders: Vec<Cell> = std::iter::once(bold_cell("Month"))
        .chain(data.monthly.series.iter().map(|s| bold_cell(s.gender.clone())))
        .take(COLS)
        .collect();
    rows.push(pad(genders));
    rows.extend(monthly_rows(&data.monthly));
    rows.push(blank_row(COLS));

    rows.push(section_row(&format!("TOP {} ITEMS", data.top_items.len()), COLS));
    rows.extend(top_item_rows(&data.top_items));
    rows.push(blank_row(COLS));

    rows.push(section_row("AGE VS. SPEND", COLS));
    rows.extend(age_rows(&data.age_spend));

    TableReportView::new(
        "Scan & Go Summary",
        header_row(["", "", "", ""]),
        rows,
        vec![
            Constraint::Length(22),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Fill(1),
        ],
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 1).collect();
        format!("{truncated}\u{2026}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{get_sales, get_summary};
    use crate::db::testutil::sample_db;

    #[test]
    fn test_table_view_has_total_row() {
        let conn = sample_db();
        let view = build_table(&get_sales(&conn, &SalesFilter::default()).unwrap());
        // ten sales, a blank separator, the total
        assert_eq!(view.rows.len(), 12);
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let conn = sample_db();
        let mut view = build_table(&get_sales(&conn, &SalesFilter::default()).unwrap());
        view.visible_count = 5;
        view.handle_key(KeyCode::End);
        assert_eq!(view.offset, 7);
        view.handle_key(KeyCode::Down);
        assert_eq!(view.offset, 7);
        view.handle_key(KeyCode::PageUp);
        assert_eq!(view.offset, 2);
        view.handle_key(KeyCode::Home);
        assert_eq!(view.offset, 0);
        assert!(matches!(view.handle_key(KeyCode::Esc), ReportViewAction::Close));
    }

    #[test]
    fn test_summary_sections() {
        let conn = sample_db();
        let data = get_summary(&conn, &SalesFilter::default(), Some("coats"), 3).unwrap();
        let view = build_summary(&data);
        // heading, rows and a blank line per section; months add a gender header
        assert_eq!(view.rows.len(), 5 + 5 + 9 + 5 + 5);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Knit Sweater", 20), "Knit Sweater");
        assert_eq!(truncate("Knit Sweater", 5), "Knit\u{2026}");
    }
}
