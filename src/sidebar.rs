use chrono::{Days, Months, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::analytics::Facets;
use crate::filter::{ItemTagChecks, SalesFilter, SeasonChecks};
use crate::fmt::date_dmy;
use crate::tui::{BORDER_STYLE, FOCUS_BORDER_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    Clients,
    Items,
    Printings,
    Categories,
    TagMale,
    TagFemale,
    FallWinter,
    SpringSummer,
    StartDate,
    EndDate,
    MinAge,
    MaxAge,
}

const CONTROLS: [ControlId; 12] = [
    ControlId::Clients,
    ControlId::Items,
    ControlId::Printings,
    ControlId::Categories,
    ControlId::TagMale,
    ControlId::TagFemale,
    ControlId::FallWinter,
    ControlId::SpringSummer,
    ControlId::StartDate,
    ControlId::EndDate,
    ControlId::MinAge,
    ControlId::MaxAge,
];

/// A cursor stop: a control, or one option of an expanded multi-select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Control(ControlId),
    Option(ControlId, usize),
}

#[derive(Debug, Clone)]
pub struct MultiSelect {
    pub label: &'static str,
    pub options: Vec<String>,
    pub selected: Vec<bool>,
    pub expanded: bool,
}

impl MultiSelect {
    fn new(label: &'static str, options: Vec<String>) -> Self {
        let selected = vec![false; options.len()];
        Self {
            label,
            options,
            selected,
            expanded: false,
        }
    }

    pub fn values(&self) -> Vec<String> {
        self.options
            .iter()
            .zip(&self.selected)
            .filter(|(_, on)| **on)
            .map(|(o, _)| o.clone())
            .collect()
    }

    fn toggle(&mut self, idx: usize) {
        if let Some(on) = self.selected.get_mut(idx) {
            *on = !*on;
        }
    }

    fn clear(&mut self) {
        self.selected.iter_mut().for_each(|on| *on = false);
    }

    fn summary(&self) -> String {
        let count = self.selected.iter().filter(|on| **on).count();
        match count {
            0 => "all".to_string(),
            1 => self.values().remove(0),
            n => format!("{n} selected"),
        }
    }
}

/// Filter controls, laid out top to bottom.
pub struct Sidebar {
    pub clients: MultiSelect,
    pub items: MultiSelect,
    pub printings: MultiSelect,
    pub categories: MultiSelect,
    pub item_tags: ItemTagChecks,
    pub seasons: SeasonChecks,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    bounds_dates: Option<(NaiveDate, NaiveDate)>,
    bounds_ages: Option<(u32, u32)>,
    cursor: usize,
}

impl Sidebar {
    pub fn new(facets: &Facets) -> Self {
        let bounds_dates = facets.min_date.zip(facets.max_date);
        let bounds_ages = facets.min_age.zip(facets.max_age);
        Self {
            clients: MultiSelect::new("Client name", facets.clients.clone()),
            items: MultiSelect::new("Specific item", facets.items.clone()),
            printings: MultiSelect::new("Texture", facets.printings.clone()),
            categories: MultiSelect::new("Category", facets.categories.clone()),
            item_tags: ItemTagChecks::default(),
            seasons: SeasonChecks::default(),
            start_date: facets.min_date,
            end_date: facets.max_date,
            min_age: facets.min_age,
            max_age: facets.max_age,
            bounds_dates,
            bounds_ages,
            cursor: 0,
        }
    }

    pub fn filter(&self) -> SalesFilter {
        SalesFilter {
            clients: self.clients.values(),
            items: self.items.values(),
            categories: self.categories.values(),
            printings: self.printings.values(),
            item_tags: self.item_tags,
            seasons: self.seasons,
            start_date: self.start_date,
            end_date: self.end_date,
            min_age: self.min_age,
            max_age: self.max_age,
        }
    }

    fn multi(&self, id: ControlId) -> Option<&MultiSelect> {
        match id {
            ControlId::Clients => Some(&self.clients),
            ControlId::Items => Some(&self.items),
            ControlId::Printings => Some(&self.printings),
            ControlId::Categories => Some(&self.categories),
            _ => None,
        }
    }

    fn multi_mut(&mut self, id: ControlId) -> Option<&mut MultiSelect> {
        match id {
            ControlId::Clients => Some(&mut self.clients),
            ControlId::Items => Some(&mut self.items),
            ControlId::Printings => Some(&mut self.printings),
            ControlId::Categories => Some(&mut self.categories),
            _ => None,
        }
    }

    pub fn entries(&self) -> Vec<Entry> {
        let mut entries = Vec::new();
        for id in CONTROLS {
            entries.push(Entry::Control(id));
            if let Some(m) = self.multi(id).filter(|m| m.expanded) {
                entries.extend((0..m.options.len()).map(|i| Entry::Option(id, i)));
            }
        }
        entries
    }

    pub fn current(&self) -> Entry {
        let entries = self.entries();
        entries
            .get(self.cursor.min(entries.len() - 1))
            .copied()
            .unwrap_or(Entry::Control(ControlId::Clients))
    }

    /// Apply a key. Returns true when the resulting filter changed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let before = self.filter();
        match code {
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => self.cursor = (self.cursor + 1).min(self.entries().len() - 1),
            KeyCode::Enter => self.toggle_expanded(),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Left => self.step(-1, false),
            KeyCode::Right => self.step(1, false),
            KeyCode::Char('-') => self.step(-1, true),
            KeyCode::Char('+') | KeyCode::Char('=') => self.step(1, true),
            KeyCode::Char('x') => self.reset_current(),
            _ => {}
        }
        self.filter() != before
    }

    fn toggle_expanded(&mut self) {
        let id = match self.current() {
            Entry::Control(id) | Entry::Option(id, _) => id,
        };
        let Some(m) = self.multi_mut(id) else {
            return;
        };
        m.expanded = !m.expanded;
        // keep the cursor on the control header
        let header = self
            .entries()
            .iter()
            .position(|e| *e == Entry::Control(id))
            .unwrap_or(0);
        self.cursor = header;
    }

    fn toggle_current(&mut self) {
        match self.current() {
            Entry::Option(id, idx) => {
                if let Some(m) = self.multi_mut(id) {
                    m.toggle(idx);
                }
            }
            Entry::Control(ControlId::TagMale) => self.item_tags.male = !self.item_tags.male,
            Entry::Control(ControlId::TagFemale) => self.item_tags.female = !self.item_tags.female,
            Entry::Control(ControlId::FallWinter) => {
                self.seasons.fall_winter = !self.seasons.fall_winter
            }
            Entry::Control(ControlId::SpringSummer) => {
                self.seasons.spring_summer = !self.seasons.spring_summer
            }
            Entry::Control(id) if self.multi(id).is_some() => self.toggle_expanded(),
            Entry::Control(_) => {}
        }
    }

    fn step(&mut self, direction: i32, coarse: bool) {
        match self.current() {
            Entry::Control(ControlId::StartDate) => {
                if let (Some(d), Some((lo, _))) = (self.start_date, self.bounds_dates) {
                    let hi = self.end_date.unwrap_or(lo);
                    self.start_date = Some(clamp_date(shift_date(d, direction, coarse), lo, hi));
                }
            }
            Entry::Control(ControlId::EndDate) => {
                if let (Some(d), Some((_, hi))) = (self.end_date, self.bounds_dates) {
                    let lo = self.start_date.unwrap_or(hi);
                    self.end_date = Some(clamp_date(shift_date(d, direction, coarse), lo, hi));
                }
            }
            Entry::Control(ControlId::MinAge) => {
                if let (Some(a), Some((lo, _))) = (self.min_age, self.bounds_ages) {
                    let hi = self.max_age.unwrap_or(lo);
                    self.min_age = Some(shift_age(a, direction).clamp(lo, hi));
                }
            }
            Entry::Control(ControlId::MaxAge) => {
                if let (Some(a), Some((_, hi))) = (self.max_age, self.bounds_ages) {
                    let lo = self.min_age.unwrap_or(hi);
                    self.max_age = Some(shift_age(a, direction).clamp(lo, hi));
                }
            }
            _ => {}
        }
    }

    fn reset_current(&mut self) {
        match self.current() {
            Entry::Control(id) | Entry::Option(id, _) => match id {
                ControlId::Clients
                | ControlId::Items
                | ControlId::Printings
                | ControlId::Categories => {
                    if let Some(m) = self.multi_mut(id) {
                        m.clear();
                    }
                }
                ControlId::TagMale => self.item_tags.male = true,
                ControlId::TagFemale => self.item_tags.female = true,
                ControlId::FallWinter => self.seasons.fall_winter = true,
                ControlId::SpringSummer => self.seasons.spring_summer = true,
                ControlId::StartDate => self.start_date = self.bounds_dates.map(|(lo, _)| lo),
                ControlId::EndDate => self.end_date = self.bounds_dates.map(|(_, hi)| hi),
                ControlId::MinAge => self.min_age = self.bounds_ages.map(|(lo, _)| lo),
                ControlId::MaxAge => self.max_age = self.bounds_ages.map(|(_, hi)| hi),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn checkbox_line(label: &str, checked: bool) -> String {
        let mark = if checked { "[x]" } else { "[ ]" };
        format!("  {mark} {label}")
    }

    fn entry_line(&self, entry: Entry) -> Line<'static> {
        match entry {
            Entry::Option(id, idx) => {
                let Some(m) = self.multi(id) else {
                    return Line::from("");
                };
                let mark = if m.selected.get(idx).copied().unwrap_or(false) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let option = m.options.get(idx).cloned().unwrap_or_default();
                Line::from(format!("    {mark} {option}"))
            }
            Entry::Control(id) => match id {
                ControlId::Clients
                | ControlId::Items
                | ControlId::Printings
                | ControlId::Categories => {
                    let Some(m) = self.multi(id) else {
                        return Line::from("");
                    };
                    let arrow = if m.expanded { "▾" } else { "▸" };
                    Line::from(vec![
                        Span::raw(format!(" {arrow} {}: ", m.label)),
                        Span::styled(m.summary(), FOOTER_STYLE),
                    ])
                }
                ControlId::TagMale => Line::from(Self::checkbox_line("Male", self.item_tags.male)),
                ControlId::TagFemale => {
                    Line::from(Self::checkbox_line("Female", self.item_tags.female))
                }
                ControlId::FallWinter => {
                    Line::from(Self::checkbox_line("fall/winter", self.seasons.fall_winter))
                }
                ControlId::SpringSummer => {
                    Line::from(Self::checkbox_line("spring/summer", self.seasons.spring_summer))
                }
                ControlId::StartDate => date_line("Start date", self.start_date),
                ControlId::EndDate => date_line("End date", self.end_date),
                ControlId::MinAge => age_line("Min age", self.min_age),
                ControlId::MaxAge => age_line("Max age", self.max_age),
            },
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let entries = self.entries();
        let cursor = self.cursor.min(entries.len() - 1);
        let mut lines = Vec::new();
        let mut cursor_line = 0;
        for (i, entry) in entries.iter().enumerate() {
            match entry {
                Entry::Control(ControlId::TagMale) => {
                    lines.push(Line::from(Span::styled(" Item tag", HEADER_STYLE)))
                }
                Entry::Control(ControlId::FallWinter) => {
                    lines.push(Line::from(Span::styled(" Season", HEADER_STYLE)))
                }
                Entry::Control(ControlId::StartDate) => {
                    lines.push(Line::from(Span::styled(" Order date", HEADER_STYLE)))
                }
                Entry::Control(ControlId::MinAge) => {
                    lines.push(Line::from(Span::styled(" Age", HEADER_STYLE)))
                }
                _ => {}
            }
            let line = self.entry_line(*entry);
            if i == cursor && focused {
                cursor_line = lines.len();
                lines.push(line.style(SELECTED_STYLE));
            } else {
                if i == cursor {
                    cursor_line = lines.len();
                }
                lines.push(line);
            }
        }

        let inner_height = area.height.saturating_sub(2) as usize;
        let scroll = cursor_line.saturating_sub(inner_height.saturating_sub(1));
        let border = if focused { FOCUS_BORDER_STYLE } else { BORDER_STYLE };
        let block = Block::default()
            .title(" Filters ")
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(border);
        frame.render_widget(
            Paragraph::new(lines).block(block).scroll((scroll as u16, 0)),
            area,
        );
    }
}

fn date_line(label: &str, date: Option<NaiveDate>) -> Line<'static> {
    let value = date.map(date_dmy).unwrap_or_else(|| "-".to_string());
    Line::from(format!("  {label:<11} ‹ {value} ›"))
}

fn age_line(label: &str, age: Option<u32>) -> Line<'static> {
    let value = age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
    Line::from(format!("  {label:<11} ‹ {value} ›"))
}

fn shift_date(date: NaiveDate, direction: i32, by_month: bool) -> NaiveDate {
    let shifted = match (by_month, direction < 0) {
        (true, true) => date.checked_sub_months(Months::new(1)),
        (true, false) => date.checked_add_months(Months::new(1)),
        (false, true) => date.checked_sub_days(Days::new(1)),
        (false, false) => date.checked_add_days(Days::new(1)),
    };
    shifted.unwrap_or(date)
}

fn clamp_date(date: NaiveDate, lo: NaiveDate, hi: NaiveDate) -> NaiveDate {
    if hi < lo {
        return lo;
    }
    date.clamp(lo, hi)
}

fn shift_age(age: u32, direction: i32) -> u32 {
    if direction < 0 {
        age.saturating_sub(1)
    } else {
        age.saturating_add(1)
    }
}
