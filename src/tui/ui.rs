//! Stateless rendering of a session snapshot.

use super::app::{App, CATEGORIES};
use chrono::Datelike;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use strictly_triage::{Case, GameStatus, HistorySection, LogCategory, LogEntry, SessionSnapshot};

/// Spend above which the banner total turns red.
pub const COST_WARNING_THRESHOLD: u32 = 3000;

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, snapshot: &SessionSnapshot, app: &App) {
    let area = frame.area();

    let case = match (snapshot.status(), snapshot.case()) {
        (GameStatus::Loading, _) | (_, None) => {
            draw_loading(frame, area);
            return;
        }
        (_, Some(case)) => case,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Banner
            Constraint::Min(10),   // Body
            Constraint::Length(1), // Key help
        ])
        .split(area);

    draw_banner(frame, chunks[0], case, *snapshot.total_cost());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(36),
            Constraint::Percentage(34),
        ])
        .split(chunks[1]);

    draw_notes(frame, body[0], case, snapshot, app);
    if snapshot.status().is_terminal() {
        draw_outcome(frame, body[1], snapshot);
    } else {
        draw_order_board(frame, body[1], snapshot, app);
    }
    draw_timeline(frame, body[2], snapshot.logs());

    let help = Paragraph::new(key_help(*snapshot.status()))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);
}

/// Formats a spend in pounds, e.g. `£1,234.00`.
pub fn format_cost(cost: u32) -> String {
    let digits = cost.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("£{}.00", grouped)
}

/// Year of birth implied by an age in a given year.
pub fn birth_year(age: u32, current_year: i32) -> i32 {
    current_year - i32::try_from(age).unwrap_or(i32::MAX).min(current_year)
}

/// Greedy word wrap used for timeline entries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

fn draw_loading(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "Admitting Patient...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Generating complex clinical scenario.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, center_rect(area, 50, 3));
}

fn draw_banner(frame: &mut Frame, area: Rect, case: &Case, total_cost: u32) {
    let year = birth_year(*case.age(), chrono::Local::now().year());
    let cost_style = if total_cost > COST_WARNING_THRESHOLD {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let line = Line::from(vec![
        Span::styled(
            case.patient_name().to_uppercase(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   DOB: {} ({}y)   Sex: {}   ",
            year,
            case.age(),
            case.gender()
        )),
        Span::styled("Current Spend ", Style::default().fg(Color::DarkGray)),
        Span::styled(format_cost(total_cost), cost_style),
    ]);

    let banner = Paragraph::new(line).block(
        Block::default()
            .title("Strictly Clinic - Emergency Department")
            .borders(Borders::ALL),
    );
    frame.render_widget(banner, area);
}

fn draw_notes(frame: &mut Frame, area: Rect, case: &Case, snapshot: &SessionSnapshot, app: &App) {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let vitals = case.initial_vitals();

    let mut lines = vec![
        Line::from(Span::styled("Initial Observations", heading)),
        Line::from(format!(
            "HR {}  BP {}  RR {}",
            vitals.hr(),
            vitals.bp(),
            vitals.rr()
        )),
        Line::from(format!(
            "SpO2 {}%  Temp {:.1}°C  GCS {}",
            vitals.o2(),
            vitals.temp(),
            vitals.gcs()
        )),
        Line::from(""),
        Line::from(Span::styled("Presenting Complaint", heading)),
        Line::from(case.presenting_complaint().as_str()),
        Line::from(Span::styled(
            case.history_of_presenting_complaint().as_str(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(Span::styled("Differential Diagnosis", heading)),
    ];

    let selected = snapshot.selected_diagnosis().as_deref();
    let active = *snapshot.status() == GameStatus::Active;
    for (i, differential) in case.differentials().iter().enumerate() {
        let marker = if selected == Some(differential.as_str()) {
            "(•) "
        } else {
            "( ) "
        };
        let style = if active && i == app.differential_cursor() {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", marker, differential),
            style,
        )));
    }

    if active && selected.is_some() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press c to confirm diagnosis",
            Style::default().fg(Color::Yellow),
        )));
    }

    let notes = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Clinical Notes").borders(Borders::ALL));
    frame.render_widget(notes, area);
}

fn draw_order_board(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot, app: &App) {
    let title = if *snapshot.processing() {
        Line::from(vec![
            Span::raw("Order Board "),
            Span::styled(
                "Processing Request...",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from("Order Board")
    };
    let outer = Block::default().title(title).borders(Borders::ALL);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Interview
            Constraint::Length(3), // Tabs
            Constraint::Min(3),    // Tests
        ])
        .split(inner);

    let interview: Vec<Span> = [
        ('p', HistorySection::PastMedical),
        ('d', HistorySection::Drug),
        ('s', HistorySection::Social),
        ('a', HistorySection::Allergies),
    ]
    .into_iter()
    .flat_map(|(key, section)| {
        [
            Span::styled(format!("[{}] ", key), Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}  ", section.key())),
        ]
    })
    .collect();
    let interview = Paragraph::new(Line::from(interview))
        .block(Block::default().title("Interview").borders(Borders::ALL));
    frame.render_widget(interview, chunks[0]);

    let tabs = Tabs::new(CATEGORIES.iter().map(|category| category.label()))
        .select(app.category_index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(tabs, chunks[1]);

    let dimmed = *snapshot.processing();
    let items: Vec<ListItem> = app
        .visible_tests()
        .into_iter()
        .map(|test| {
            let style = if dimmed {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<28}", test.name()), style),
                Span::styled(format_cost(test.cost()), Style::default().fg(Color::Green)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.test_cursor()));
    frame.render_stateful_widget(list, chunks[2], &mut state);
}

fn draw_outcome(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let (title, colour) = match snapshot.status() {
        GameStatus::Solved => ("Patient Discharged", Color::Green),
        _ => ("Critical Incident", Color::Red),
    };
    let message = snapshot
        .logs()
        .iter()
        .rev()
        .find(|entry| *entry.category() == LogCategory::Diagnosis)
        .map(|entry| entry.content().as_str())
        .unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(colour).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(message.split('\n').map(Line::from));
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Total spend: {}",
        format_cost(*snapshot.total_cost())
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press n for the next patient",
        Style::default().fg(Color::Yellow),
    )));

    let outcome = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title("Outcome")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colour)),
        );
    frame.render_widget(outcome, area);
}

fn draw_timeline(frame: &mut Frame, area: Rect, logs: &[LogEntry]) {
    let width = usize::from(area.width.saturating_sub(2));
    let items: Vec<ListItem> = logs
        .iter()
        .map(|entry| timeline_item(entry, width))
        .collect();

    let list = List::new(items).block(Block::default().title("Timeline").borders(Borders::ALL));
    let mut state = ListState::default().with_selected(logs.len().checked_sub(1));
    frame.render_stateful_widget(list, area, &mut state);
}

fn timeline_item(entry: &LogEntry, width: usize) -> ListItem<'static> {
    let colour = category_colour(*entry.category());
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("[{}] ", entry.category()), Style::default().fg(colour)),
            Span::styled(entry.timestamp().clone(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(
            entry.title().clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(wrap_text(entry.content(), width).into_iter().map(Line::from));
    if *entry.cost() > 0 {
        lines.push(Line::from(Span::styled(
            format!("Cost: {}", format_cost(*entry.cost())),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    ListItem::new(Text::from(lines))
}

fn category_colour(category: LogCategory) -> Color {
    match category {
        LogCategory::System => Color::Gray,
        LogCategory::History => Color::Yellow,
        LogCategory::Vitals => Color::Cyan,
        LogCategory::Lab => Color::Red,
        LogCategory::Imaging => Color::Magenta,
        LogCategory::Intervention => Color::Green,
        LogCategory::Diagnosis => Color::Blue,
    }
}

fn key_help(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Loading => "q quit",
        GameStatus::Active => {
            "Tab category  ↑↓ test  Enter order  p/d/s/a history  ←→ differential  Space select  c confirm  q quit"
        }
        GameStatus::Solved | GameStatus::Failed => "n next patient  q quit",
    }
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cost_groups_thousands() {
        assert_eq!(format_cost(0), "£0.00");
        assert_eq!(format_cost(35), "£35.00");
        assert_eq!(format_cost(1234), "£1,234.00");
        assert_eq!(format_cost(1_000_000), "£1,000,000.00");
    }

    #[test]
    fn test_birth_year() {
        assert_eq!(birth_year(45, 2026), 1981);
        assert_eq!(birth_year(0, 2026), 2026);
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        let lines = wrap_text("Sinus tachycardia rate 110\nNo ST changes", 12);
        assert_eq!(
            lines,
            vec!["Sinus", "tachycardia", "rate 110", "No ST", "changes"]
        );
    }
}
