use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::view::RenderState;
use crate::widgets;

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();

    // Main vertical layout: status bar, distribution widget, input
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(3),    // widget
            Constraint::Length(3), // input bar
        ])
        .split(size);

    let state = app.widget.render_state();
    draw_status_bar(f, main_chunks[0], app, &state);
    app.widget.draw(f, main_chunks[1]);
    draw_input(f, main_chunks[2], app);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App, state: &RenderState) {
    let badge = match state {
        RenderState::Loading => Span::styled(
            " loading ",
            Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
        ),
        RenderState::Ready(series) => Span::styled(
            format!(" {} series ", series.len()),
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
        RenderState::Empty => Span::styled(
            " no data ",
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        ),
        RenderState::Failed(_) => Span::styled(
            " error ",
            Style::default().fg(Color::Black).bg(Color::Red).bold(),
        ),
    };

    let features = if app.widget.features().is_empty() {
        "(no features)".to_string()
    } else {
        app.widget.features().join(", ")
    };
    let updated = match app.widget.updated_secs_ago() {
        Some(secs) => format!(" updated {} ", widgets::relative_time(secs)),
        None => String::new(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " FEATURE DIST ",
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        ),
        Span::raw(" "),
        badge,
        Span::styled(format!(" {} ", features), Style::default().fg(Color::White)),
        Span::styled(updated, Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(header, area);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
    let border_color = if app.widget.is_loading() {
        Color::Yellow
    } else {
        Color::Cyan
    };

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(border_color).bold()),
        Span::raw(&app.input),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(Span::styled(
                " features (Enter: apply, Ctrl-R: refresh, Esc: quit) ",
                Style::default().fg(Color::DarkGray),
            )),
    );
    f.render_widget(input, area);

    f.set_cursor_position(Position::new(
        area.x + 3 + app.input[..app.cursor].chars().count() as u16,
        area.y + 1,
    ));
}
