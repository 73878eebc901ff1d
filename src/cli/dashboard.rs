use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Table, Tabs},
    Frame,
};
use rusqlite::Connection;

use crate::analytics::{
    self, CategoryBreakdown, Facets, ItemTotal, Kpis, MonthlyGender, SalesTable, ALL_CATEGORIES,
};
use crate::charts::{self, AgeSeries};
use crate::cli::report::view::sales_table_parts;
use crate::cli::Session;
use crate::error::Result;
use crate::fmt::{money, number, whole_money};
use crate::sidebar::Sidebar;
use crate::tui::{
    run_report_view, wrap_text, ReportView, ReportViewAction, BORDER_STYLE, FOCUS_BORDER_STYLE,
    FOOTER_STYLE, HEADER_STYLE,
};

const TITLE: &str = "Scan & Go Dashboard";
const SIDEBAR_WIDTH: u16 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Table,
    Categories,
    Monthly,
    TopItems,
    AgeSpend,
}

const PANES: [(Pane, &str); 5] = [
    (Pane::Table, "1 Table"),
    (Pane::Categories, "2 Categories"),
    (Pane::Monthly, "3 Monthly"),
    (Pane::TopItems, "4 Top items"),
    (Pane::AgeSpend, "5 Age vs. spend"),
];

/// Everything shown for the current sidebar selection.
struct DashboardData {
    kpis: Kpis,
    table: SalesTable,
    category_choices: Vec<String>,
    categories: CategoryBreakdown,
    monthly: MonthlyGender,
    top_items: Vec<ItemTotal>,
    age_series: Vec<AgeSeries>,
}

struct Dashboard {
    conn: Connection,
    sidebar: Sidebar,
    focus: Focus,
    pane: Pane,
    category_idx: usize,
    data: DashboardData,
    table_offset: usize,
    table_visible: usize,
    top_limit: usize,
    export_dir: PathBuf,
    status_message: Option<String>,
}

impl Dashboard {
    fn new(conn: Connection, facets: &Facets, top_limit: usize, export_dir: PathBuf) -> Result<Self> {
        let sidebar = Sidebar::new(facets);
        let data = load_data(&conn, &sidebar, None, top_limit)?;
        Ok(Self {
            conn,
            sidebar,
            focus: Focus::Sidebar,
            pane: Pane::Table,
            category_idx: 0,
            data,
            table_offset: 0,
            table_visible: 20,
            top_limit,
            export_dir,
            status_message: None,
        })
    }

    fn selected_category(&self) -> Option<&str> {
        self.data
            .category_choices
            .get(self.category_idx)
            .map(String::as_str)
            .filter(|c| *c != ALL_CATEGORIES)
    }

    /// Recompute everything after a filter or category change.
    fn refresh(&mut self) -> Result<()> {
        let selected = self.selected_category().map(str::to_string);
        self.data = load_data(&self.conn, &self.sidebar, selected.as_deref(), self.top_limit)?;
        // keep the drill-down only while its category is still in the data
        self.category_idx = selected
            .and_then(|c| self.data.category_choices.iter().position(|x| *x == c))
            .unwrap_or(0);
        self.table_offset = 0;
        Ok(())
    }

    fn cycle_category(&mut self, delta: isize) -> Result<()> {
        let n = self.data.category_choices.len().max(1) as isize;
        self.category_idx = (self.category_idx as isize + delta).rem_euclid(n) as usize;
        let selected = self.selected_category().map(str::to_string);
        self.data.categories =
            analytics::get_category_breakdown(&self.conn, &self.sidebar.filter(), selected.as_deref())?;
        Ok(())
    }

    fn export(&mut self) {
        let filter = self.sidebar.filter();
        let message = super::export::export_to(&self.conn, &filter, None, &self.export_dir).map(|path| {
            format!("Exported {} rows to {}", number(self.data.table.count as i64), path.display())
        });
        self.status_message = Some(match message {
            Ok(msg) => msg,
            Err(e) => format!("Export failed: {e}"),
        });
    }

    fn table_max_offset(&self) -> usize {
        // sales rows + blank + total
        (self.data.table.rows.len() + 2).saturating_sub(self.table_visible)
    }

    fn handle_main_key(&mut self, code: KeyCode) -> Result<()> {
        match (self.pane, code) {
            (Pane::Table, KeyCode::Up) => self.table_offset = self.table_offset.saturating_sub(1),
            (Pane::Table, KeyCode::Down) => {
                self.table_offset = (self.table_offset + 1).min(self.table_max_offset())
            }
            (Pane::Table, KeyCode::PageUp) => {
                self.table_offset = self.table_offset.saturating_sub(self.table_visible)
            }
            (Pane::Table, KeyCode::PageDown) => {
                self.table_offset = (self.table_offset + self.table_visible).min(self.table_max_offset())
            }
            (Pane::Categories, KeyCode::Left) => self.cycle_category(-1)?,
            (Pane::Categories, KeyCode::Right) => self.cycle_category(1)?,
            (_, KeyCode::Left) => self.pane = step_pane(self.pane, -1),
            (_, KeyCode::Right) => self.pane = step_pane(self.pane, 1),
            _ => {}
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw_kpis(&self, frame: &mut Frame, area: Rect) {
        let [total_area, avg_area, count_area] = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(area);
        let kpis = &self.data.kpis;
        let avg = kpis.avg_sale.map(money).unwrap_or_else(|| "-".to_string());
        for (title, value, rect) in [
            ("Total Sales", whole_money(kpis.total_sales), total_area),
            ("Avg Sale", avg, avg_area),
            ("Total transactions", number(kpis.transactions), count_area),
        ] {
            let block = Block::default()
                .title(format!(" {title} "))
                .borders(Borders::ALL)
                .border_style(BORDER_STYLE);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {value}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .block(block),
                rect,
            );
        }
    }

    fn draw_pane(&mut self, frame: &mut Frame, area: Rect) {
        if self.data.table.count == 0 {
            frame.render_widget(
                Paragraph::new(" No sales match the current filters.").style(FOOTER_STYLE),
                area,
            );
            return;
        }
        match self.pane {
            Pane::Table => {
                let (header, rows, widths) = sales_table_parts(&self.data.table);
                self.table_visible = (area.height.saturating_sub(2) as usize).max(1);
                self.table_offset = self.table_offset.min(self.table_max_offset());
                let visible: Vec<_> = rows
                    .into_iter()
                    .skip(self.table_offset)
                    .take(self.table_visible)
                    .collect();
                frame.render_widget(
                    Table::new(visible, widths).header(header).column_spacing(1),
                    area,
                );
            }
            Pane::Categories => {
                let [selector_area, chart_area] =
                    Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(area);
                let choice = self
                    .data
                    .category_choices
                    .get(self.category_idx)
                    .map(String::as_str)
                    .unwrap_or(ALL_CATEGORIES);
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::raw(" Category: "),
                        Span::styled(format!("‹ {choice} ›"), HEADER_STYLE),
                    ])),
                    selector_area,
                );
                frame.render_widget(charts::category_chart(&self.data.categories), chart_area);
            }
            Pane::Monthly => {
                let [legend_area, chart_area] =
                    Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
                let legend = charts::gender_legend(self.data.monthly.series.iter().map(|s| s.gender.as_str()));
                frame.render_widget(Paragraph::new(legend), legend_area);
                frame.render_widget(charts::monthly_chart(&self.data.monthly), chart_area);
            }
            Pane::TopItems => {
                frame.render_widget(charts::top_items_chart(&self.data.top_items), area);
            }
            Pane::AgeSpend => {
                let [legend_area, chart_area] =
                    Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
                let legend = charts::gender_legend(self.data.age_series.iter().map(|s| s.gender.as_str()));
                frame.render_widget(Paragraph::new(legend), legend_area);
                frame.render_widget(charts::age_spend_chart(&self.data.age_series), chart_area);
            }
        }
    }

    fn hints(&self) -> &'static str {
        match (self.focus, self.pane) {
            (Focus::Sidebar, _) => {
                " Tab=charts  \u{2191}/\u{2193}=move  Enter=expand  Space=toggle  \u{2190}/\u{2192}/-/+=change  x=reset  e=export  q=quit"
            }
            (Focus::Main, Pane::Table) => {
                " Tab=filters  1-5=pane  \u{2191}/\u{2193}/PgUp/PgDn=scroll  e=export  q=quit"
            }
            (Focus::Main, Pane::Categories) => {
                " Tab=filters  1-5=pane  \u{2190}/\u{2192}=category  e=export  q=quit"
            }
            (Focus::Main, _) => " Tab=filters  1-5 \u{2190}/\u{2192}=pane  e=export  q=quit",
        }
    }
}

impl ReportView for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let (filter_text, filter_lines) = wrap_text(
            &format!("Filter: {}", self.sidebar.filter().describe()),
            area.width.saturating_sub(2) as usize,
        );
        let [header_area, filter_area, sep_area, body_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(filter_lines),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {TITLE}")).style(HEADER_STYLE),
            header_area,
        );
        let filter_text: Vec<Line> = filter_text.lines().map(|l| Line::from(format!(" {l}"))).collect();
        frame.render_widget(Paragraph::new(filter_text).style(FOOTER_STYLE), filter_area);
        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(BORDER_STYLE),
            sep_area,
        );

        let [sidebar_area, main_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
                .areas(body_area);
        self.sidebar
            .render(frame, sidebar_area, self.focus == Focus::Sidebar);

        let [kpi_area, tabs_area, pane_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(main_area);
        self.draw_kpis(frame, kpi_area);

        let selected = PANES.iter().position(|(p, _)| *p == self.pane).unwrap_or(0);
        let tab_style = if self.focus == Focus::Main {
            FOCUS_BORDER_STYLE.add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        frame.render_widget(
            Tabs::new(PANES.iter().map(|(_, label)| *label))
                .select(selected)
                .style(FOOTER_STYLE)
                .highlight_style(tab_style),
            tabs_area,
        );

        let pane_block = Block::default()
            .borders(Borders::TOP)
            .border_style(BORDER_STYLE);
        let inner = pane_block.inner(pane_area);
        frame.render_widget(pane_block, pane_area);
        self.draw_pane(frame, inner);

        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
                hints_area,
            );
        } else {
            frame.render_widget(Paragraph::new(self.hints()).style(FOOTER_STYLE), hints_area);
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        self.status_message = None;
        let result = match code {
            KeyCode::Char('q') | KeyCode::Esc => return ReportViewAction::Close,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Main,
                    Focus::Main => Focus::Sidebar,
                };
                Ok(())
            }
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.pane = PANES[idx].0;
                self.focus = Focus::Main;
                Ok(())
            }
            KeyCode::Char('e') => {
                self.export();
                Ok(())
            }
            _ => match self.focus {
                Focus::Sidebar => {
                    if self.sidebar.handle_key(code) {
                        self.refresh()
                    } else {
                        Ok(())
                    }
                }
                Focus::Main => self.handle_main_key(code),
            },
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "Dashboard update failed");
            self.status_message = Some(format!("Error: {e}"));
        }
        ReportViewAction::Continue
    }
}

fn step_pane(pane: Pane, delta: isize) -> Pane {
    let idx = PANES.iter().position(|(p, _)| *p == pane).unwrap_or(0) as isize;
    let n = PANES.len() as isize;
    PANES[(idx + delta).rem_euclid(n) as usize].0
}

fn load_data(
    conn: &Connection,
    sidebar: &Sidebar,
    category: Option<&str>,
    top_limit: usize,
) -> Result<DashboardData> {
    let filter = sidebar.filter();
    tracing::debug!(filter = %filter.describe(), "Refreshing dashboard");
    let category_choices = analytics::category_choices(conn, &filter)?;
    let category = category.filter(|c| category_choices.iter().any(|x| x == c));
    Ok(DashboardData {
        kpis: analytics::get_kpis(conn, &filter)?,
        table: analytics::get_sales(conn, &filter)?,
        categories: analytics::get_category_breakdown(conn, &filter, category)?,
        category_choices,
        monthly: analytics::get_monthly_gender(conn, &filter)?,
        top_items: analytics::get_top_items(conn, &filter, top_limit)?,
        age_series: charts::age_series(&analytics::get_age_spend(conn, &filter)?),
    })
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

pub fn run(session: &Session) -> Result<()> {
    let (conn, summary) = session.open()?;
    let facets = analytics::get_facets(&conn)?;
    tracing::info!(rows = summary.joined, "Starting dashboard");
    let mut dashboard = Dashboard::new(conn, &facets, session.top_items(None), session.export_dir())?;
    run_report_view(&mut dashboard)
}
