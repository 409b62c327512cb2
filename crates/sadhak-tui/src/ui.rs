use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use sadhak_core::{DisplayLine, Origin, ReplyOrder};
use crate::app::App;

fn origin_style(origin: Origin) -> Style {
    let color = match origin {
        Origin::User => Color::Cyan,
        Origin::Ai => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let order_tag = match app.dispatcher.order() {
        ReplyOrder::Arrival => "",
        ReplyOrder::Submission => "[ordered] ",
    };

    let title = Line::from(vec![
        Span::styled(" Sadhak Calculator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.endpoint), Style::default().fg(Color::Gray)),
        Span::styled(order_tag, Style::default().fg(Color::Magenta)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    // Inner size minus borders
    app.chat.set_viewport(area.width.saturating_sub(2), area.height.saturating_sub(2));

    let border_color = if app.chat.is_following() {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Chat ");

    let thinking = app.is_thinking();
    let chat = if app.chat.is_empty() && !thinking {
        Paragraph::new(Span::styled(
            "Ask for a mean, median, sum, or an expression to evaluate...",
            Style::default().fg(Color::DarkGray),
        ))
        .wrap(Wrap { trim: true })
    } else {
        // Rows come pre-wrapped from the log so the scroll offset matches the screen
        let mut lines: Vec<Line> = Vec::new();

        for row in app.chat.display_lines() {
            lines.push(match row {
                DisplayLine::Label(origin) => {
                    Line::from(Span::styled(origin.label(), origin_style(origin)))
                }
                DisplayLine::Text(text) => Line::from(text.into_owned()),
                DisplayLine::Blank => Line::default(),
            });
        }

        if thinking {
            lines.push(Line::from(Span::styled(Origin::Ai.label(), origin_style(Origin::Ai))));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Paragraph::new(Text::from(lines)).scroll((app.chat.scroll(), 0))
    };
    frame.render_widget(chat.block(block), area);

    let total_lines = app.chat.total_lines();
    let visible = area.height.saturating_sub(2) as usize;
    if total_lines > visible {
        let mut state = ScrollbarState::new(total_lines.saturating_sub(visible))
            .position(app.chat.scroll() as usize);
        let track = Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(2),
            ..area
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Ask (Enter to send) ");

    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_col) = app.input.visible(inner_width);

    // Cyan matches the "You:" label
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if inner_width > 0 {
        frame.set_cursor_position((area.x + cursor_col as u16 + 1, area.y + 1));
    }
}

fn render_footer(frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Gray);

    let hints = [
        ("Enter", "send"),
        ("↑↓", "scroll"),
        ("PgUp/PgDn", "page"),
        ("Ctrl-End", "latest"),
        ("Esc", "quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {}  ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use sadhak_core::{ClientError, Generator, Transcript};
    use std::sync::Arc;

    struct Hung;

    #[async_trait]
    impl Generator for Hung {
        async fn generate(&self, _prompt: &str) -> Result<String, ClientError> {
            std::future::pending().await
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for row in buffer.content().chunks(buffer.area.width as usize) {
            for cell in row {
                text.push_str(cell.symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn draws_transcript_and_pending_indicator() {
        let (mut app, _replies) =
            App::new(Arc::new(Hung), "http://127.0.0.1:5001".to_string(), ReplyOrder::Arrival);
        app.chat.render("hi there", Origin::Ai);
        app.input.insert_str("sum of 2 and 3");
        app.submit();

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("Sadhak Calculator"));
        assert!(screen.contains("AI:"));
        assert!(screen.contains("hi there"));
        assert!(screen.contains("You:"));
        assert!(screen.contains("sum of 2 and 3"));
        assert!(screen.contains("Thinking."));
        assert_eq!(app.chat_area, Some(Rect::new(0, 1, 60, 15)));
    }

    #[tokio::test]
    async fn draws_placeholder_when_empty() {
        let (mut app, _replies) =
            App::new(Arc::new(Hung), "http://127.0.0.1:5001".to_string(), ReplyOrder::Arrival);

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(screen_text(&terminal).contains("Ask for a mean"));
    }

    #[tokio::test]
    async fn newest_reply_stays_on_screen_in_narrow_pane() {
        let (mut app, _replies) =
            App::new(Arc::new(Hung), "http://127.0.0.1:5001".to_string(), ReplyOrder::Arrival);
        for _ in 0..4 {
            app.chat.render("word    word    word    word    word    word", Origin::Ai);
        }
        app.chat.render("the answer is 42", Origin::Ai);

        let mut terminal = Terminal::new(TestBackend::new(14, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(app.chat.is_following());
        assert!(screen_text(&terminal).contains("is 42"));
    }

    #[tokio::test]
    async fn header_marks_submission_order() {
        let (mut app, _replies) = App::new(
            Arc::new(Hung),
            "http://127.0.0.1:5001".to_string(),
            ReplyOrder::Submission,
        );

        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(screen_text(&terminal).contains("[ordered]"));
    }
}
