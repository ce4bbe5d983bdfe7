mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::chart::{cells_for, max_width_px};
use crate::feed::schema::describe_duplicate;
use crate::feed::FeedKind;
use components::{age, centered_rect, empty_state, region_block};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Small terminals get fixed minimums instead of an even split
    let (people_height, lower_height) = if area.height < 20 {
        (Constraint::Min(4), Constraint::Min(4))
    } else {
        (Constraint::Ratio(1, 2), Constraint::Ratio(1, 2))
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            people_height,         // People table
            lower_height,          // Chart + duplicates
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    draw_info_line(f, app, chunks[0]);
    draw_people(f, app, chunks[1]);
    draw_frequencies(f, app, lower[0]);
    draw_duplicates(f, app, lower[1]);
    draw_footer(f, app, chunks[3]);

    if app.popup == Popup::Help {
        draw_help_popup(f, app);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    // Priority: status message > last update of the active region > base url
    let line = if let Some(ref status) = app.status_message {
        Line::from(vec![Span::styled(status.as_str(), Style::default().fg(theme.warning))])
    } else {
        let updated_at = match app.section {
            FeedKind::People => app.people.updated_at(),
            FeedKind::Frequencies => app.frequencies.updated_at(),
            FeedKind::Duplicates => app.duplicates.updated_at(),
        };
        let mut spans = vec![Span::styled(app.base_url(), Style::default().fg(theme.text_dim))];
        if let Some(ago) = age(updated_at) {
            spans.push(Span::styled(" │ ", Style::default().fg(theme.inactive)));
            spans.push(Span::styled(ago, Style::default().fg(theme.text_dim)));
        }
        Line::from(spans)
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_people(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = region_block(app, FeedKind::People);

    if let Some(empty) = empty_state(app, FeedKind::People) {
        f.render_widget(Paragraph::new(empty).block(block), area);
        return;
    }

    // Responsive columns based on width
    let show_title = area.width > 70;

    let header_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let mut header = vec![Span::styled("Name", header_style), Span::styled("Email", header_style)];
    if show_title {
        header.push(Span::styled("Title", header_style));
    }

    let rows: Vec<Row> = app
        .people
        .payload()
        .iter()
        .skip(app.scroll_of(FeedKind::People))
        .map(|person| {
            let mut cells = vec![
                Span::styled(person.name(), Style::default().fg(theme.text)),
                Span::styled(person.email(), Style::default().fg(theme.text_dim)),
            ];
            if show_title {
                cells.push(Span::styled(person.title(), Style::default().fg(theme.text_dim)));
            }
            Row::new(cells)
        })
        .collect();

    let widths = if show_title {
        vec![
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ]
    } else {
        vec![Constraint::Percentage(45), Constraint::Percentage(55)]
    };

    let table = Table::new(rows, widths).header(Row::new(header)).block(block);
    f.render_widget(table, area);
}

fn draw_frequencies(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = region_block(app, FeedKind::Frequencies);

    if let Some(empty) = empty_state(app, FeedKind::Frequencies) {
        f.render_widget(Paragraph::new(empty).block(block), area);
        return;
    }

    // Bars are scaled against the widest bar so the longest one fills the row
    let label_width = app.bars.iter().map(|b| b.label().chars().count()).max().unwrap_or(0);
    let inner_width = area.width.saturating_sub(2) as usize;
    let columns = inner_width.saturating_sub(label_width + 2) as u16;
    let max_px = max_width_px(&app.bars);

    let lines: Vec<Line> = app
        .bars
        .iter()
        .skip(app.scroll_of(FeedKind::Frequencies))
        .map(|bar| {
            let cells = cells_for(bar.width_px, max_px, columns) as usize;
            Line::from(vec![
                Span::styled(
                    format!(" {:<width$} ", bar.label(), width = label_width),
                    Style::default().fg(theme.text),
                ),
                Span::styled("█".repeat(cells), Style::default().fg(theme.bar)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_duplicates(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = region_block(app, FeedKind::Duplicates);

    if let Some(empty) = empty_state(app, FeedKind::Duplicates) {
        f.render_widget(Paragraph::new(empty).block(block), area);
        return;
    }

    let lines: Vec<Line> = app
        .duplicates
        .payload()
        .iter()
        .skip(app.scroll_of(FeedKind::Duplicates))
        .map(|candidate| {
            Line::from(vec![
                Span::styled(" • ", Style::default().fg(theme.warning)),
                Span::styled(describe_duplicate(candidate), Style::default().fg(theme.text)),
            ])
        })
        .collect();

    let content = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(content, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let hints: Vec<(&str, &str)> = vec![
        ("↑↓", "Scroll"),
        ("Tab", "Next"),
        ("r", "Refresh"),
        ("R", "All"),
        ("1-3", "Feed"),
        ("h", "Help"),
        ("q", "Quit"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else if area.width < 80 { 5 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(theme.accent);
    let entry = |k: &'static str, what: &'static str| {
        Line::from(vec![Span::styled(k, key), Span::raw(what)])
    };

    let help_text = vec![
        Line::from(Span::styled("═══ Navigation ═══", heading)),
        entry("  Tab       ", "Next region (People → Frequencies → Duplicates)"),
        entry("  Shift-Tab ", "Previous region"),
        entry("  ↑/↓ j/k   ", "Scroll the active region"),
        Line::from(""),
        Line::from(Span::styled("═══ Feeds ═══", heading)),
        entry("  r         ", "Refresh the active region"),
        entry("  R         ", "Refresh every region"),
        entry("  1 2 3     ", "Refresh people, frequencies or duplicates"),
        Line::from(""),
        Line::from(Span::styled("═══ One-shot ═══", heading)),
        entry("  feedboard --print people   ", "Dump a feed as JSON"),
        entry("  feedboard --chart          ", "Print the frequency chart"),
        entry("  feedboard --svg chart.svg  ", "Write the chart as SVG"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(theme.text_dim)),
            Span::styled("h", key),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("?", key),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("Esc", key),
            Span::styled(" to close", Style::default().fg(theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" feedboard Help ", key))
                .borders(Borders::ALL)
                .border_style(key),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
