use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;

use crate::error::Result;
use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const FOCUS_BORDER_STYLE: Style = Style::new().fg(Color::Cyan);
pub const BORDER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const MALE_COLOR: Color = Color::Blue;
pub const FEMALE_COLOR: Color = Color::Red;

/// Slice colors for the category share chart, cycled.
pub const PALETTE: [Color; 6] = [
    Color::Rgb(99, 110, 250),
    Color::Rgb(239, 85, 59),
    Color::Rgb(0, 204, 150),
    Color::Rgb(171, 99, 250),
    Color::Rgb(255, 161, 90),
    Color::Rgb(25, 211, 243),
];

pub fn gender_color(gender: &str) -> Color {
    match gender {
        "male" => MALE_COLOR,
        "female" => FEMALE_COLOR,
        _ => Color::Gray,
    }
}

pub fn money_span(amount: f64) -> Span<'static> {
    Span::styled(money(amount), AMOUNT_STYLE)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

// ---------------------------------------------------------------------------
// Report view infrastructure
// ---------------------------------------------------------------------------

pub enum ReportViewAction {
    Continue,
    Close,
}

pub trait ReportView {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction;
}

/// Run an interactive ratatui report view. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_report_view(view: &mut dyn ReportView) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match view.handle_key(key.code) {
                    ReportViewAction::Close => break Ok(()),
                    ReportViewAction::Continue => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        let (wrapped, lines) = wrap_text("Knit Sweater Floral Dress", 12);
        assert_eq!(lines, 2);
        assert!(wrapped.contains('\n'));
        assert_eq!(wrap_text("abc", 0), ("abc".to_string(), 1));
    }

    #[test]
    fn test_gender_color() {
        assert_eq!(gender_color("male"), MALE_COLOR);
        assert_eq!(gender_color("female"), FEMALE_COLOR);
        assert_eq!(gender_color("other"), Color::Gray);
    }
}
