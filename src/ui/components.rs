//! Pieces shared by every feed region

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};
use std::time::Instant;

use crate::app::App;
use crate::feed::FeedKind;

/// Bordered block for a region, titled with its row count and fetch state
pub fn region_block(app: &App, kind: FeedKind) -> Block<'static> {
    let theme = &app.theme;
    let is_active = app.section == kind;
    let border_color = if is_active { theme.accent } else { theme.inactive };
    let title_style = if is_active {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.inactive)
    };

    let mut title = vec![Span::styled(format!(" {} ", kind.title()), title_style)];
    if app.is_pending(kind) {
        title.push(Span::styled("⟳ ", Style::default().fg(theme.warning)));
    } else if last_error(app, kind).is_some() {
        title.push(Span::styled("✗ ", Style::default().fg(theme.danger)));
    } else if is_loaded(app, kind) {
        title.push(Span::styled(
            format!("({}) ", app.row_count(kind)),
            Style::default().fg(theme.success),
        ));
    }

    Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

/// Placeholder shown while a region has nothing to list
pub fn empty_state(app: &App, kind: FeedKind) -> Option<Line<'static>> {
    let theme = &app.theme;

    if !is_loaded(app, kind) {
        return Some(match (app.is_pending(kind), last_error(app, kind)) {
            (true, _) => Line::styled("  Loading…", Style::default().fg(theme.text_dim)),
            (false, Some(error)) => Line::styled(format!("  {}", error), Style::default().fg(theme.danger)),
            (false, None) => Line::styled("  Not loaded (press r)", Style::default().fg(theme.text_dim)),
        });
    }

    if app.row_count(kind) == 0 {
        let text = match kind {
            FeedKind::People => "  No people",
            FeedKind::Frequencies => "  No frequencies",
            FeedKind::Duplicates => "  No possible duplicates",
        };
        return Some(Line::styled(text, Style::default().fg(theme.text_dim)));
    }

    None
}

/// "updated 12s ago" for the info line
pub fn age(updated_at: Option<Instant>) -> Option<String> {
    let secs = updated_at?.elapsed().as_secs();
    Some(if secs < 60 {
        format!("updated {}s ago", secs)
    } else {
        format!("updated {}m ago", secs / 60)
    })
}

pub fn is_loaded(app: &App, kind: FeedKind) -> bool {
    match kind {
        FeedKind::People => app.people.is_loaded(),
        FeedKind::Frequencies => app.frequencies.is_loaded(),
        FeedKind::Duplicates => app.duplicates.is_loaded(),
    }
}

fn last_error(app: &App, kind: FeedKind) -> Option<&str> {
    match kind {
        FeedKind::People => app.people.last_error(),
        FeedKind::Frequencies => app.frequencies.last_error(),
        FeedKind::Duplicates => app.duplicates.last_error(),
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
