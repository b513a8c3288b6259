use crate::device::Layout as PageLayout;
use crate::session::SessionView;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const QUOTE: &str = "\"Every moment with you is a beautiful memory.\"";

pub fn render(f: &mut Frame, view: &SessionView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Background video
            Constraint::Min(5),    // Photo + quote
            Constraint::Length(3), // Now playing
            Constraint::Length(3), // Key help
        ])
        .split(f.area());

    render_video(f, chunks[0], view);
    render_page(f, chunks[1], view);
    render_status(f, chunks[2], view);
    render_help(f, chunks[3], view);

    if let Some((x, y)) = view.tooltip {
        render_tooltip(f, x, y);
    }
    if view.modal.visible {
        render_modal(f, view);
    }
}

fn render_video(f: &mut Frame, area: Rect, view: &SessionView) {
    let text = if view.video_visible {
        format!("▶ {}", view.video_title)
    } else {
        "(hover or hold the quote to reveal the video)".to_string()
    };
    let widget = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("Video"));
    f.render_widget(widget, area);
}

fn render_page(f: &mut Frame, area: Rect, view: &SessionView) {
    let quote_style = if view.video_visible {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC | Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::ITALIC)
    };
    let mut lines = vec![
        Line::from("[ photo ]"),
        Line::from(""),
        Line::styled(QUOTE, quote_style),
    ];
    if view.pending_clicks > 0 {
        lines.push(Line::from(""));
        lines.push(Line::from("•".repeat(view.pending_clicks as usize)));
    }

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_status(f: &mut Frame, area: Rect, view: &SessionView) {
    let title = format!(
        "Track {}/{}",
        view.playback.current_track_index + 1,
        view.track_count
    );
    let widget = Paragraph::new(view.status.as_str())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}

fn render_help(f: &mut Frame, area: Rect, view: &SessionView) {
    let mut help = String::from("click/space tap · h hold · e/l quote hover · p photo hover · q quit");
    if view.layout == PageLayout::Compact {
        help.push_str(" · i info · x close");
    }
    let widget = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_tooltip(f: &mut Frame, x: i32, y: i32) {
    let screen = f.area();
    // Page pixels back to cells, clamped on screen
    let width = 24.min(screen.width);
    let height = 5.min(screen.height);
    let col = ((x / 8).max(0) as u16).min(screen.width.saturating_sub(width));
    let row = ((y / 16).max(0) as u16).min(screen.height.saturating_sub(height));
    let area = Rect::new(col, row, width, height);

    let widget = Paragraph::new(vec![
        Line::from("1 click  → play / pause"),
        Line::from("2 clicks → next track"),
        Line::from("3 clicks → previous"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(Clear, area);
    f.render_widget(widget, area);
}

fn render_modal(f: &mut Frame, view: &SessionView) {
    let area = centered(f.area(), 44, 9);
    let widget = Paragraph::new(vec![
        Line::from("Tap the photo or quote:"),
        Line::from("  once to play / pause"),
        Line::from("  twice for the next song"),
        Line::from("  three times for the previous one"),
        Line::from("Hold the quote to see the video."),
        Line::from(""),
        Line::from(format!("Closing in {}s", view.modal.countdown_seconds)),
    ])
    .block(Block::default().borders(Borders::ALL).title("Welcome"));
    f.render_widget(Clear, area);
    f.render_widget(widget, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
