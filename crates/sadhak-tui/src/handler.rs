use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

/// Lines moved per mouse wheel notch
const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply(completion) => app.receive(completion),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(),

        // Transcript scrolling
        KeyCode::Up => app.chat.scroll_up(1),
        KeyCode::Down => app.chat.scroll_down(1),
        KeyCode::PageUp => app.chat.page_up(),
        KeyCode::PageDown => app.chat.page_down(),
        KeyCode::End if ctrl => app.chat.scroll_to_latest(),

        // Line editing
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Char(c) if !ctrl => app.input.insert(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.chat.scroll_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.chat.scroll_up(WHEEL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sadhak_core::{
        ClientError, Completion, Generator, InputField, Message, Origin, ReplyOrder, Transcript,
        FALLBACK_REPLY,
    };
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Echo;

    #[async_trait]
    impl Generator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    fn app() -> (App, UnboundedReceiver<Completion>) {
        App::new(Arc::new(Echo), "http://127.0.0.1:5001".to_string(), ReplyOrder::Arrival)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn enter_submits_and_reply_is_rendered() {
        let (mut app, mut replies) = app();

        type_text(&mut app, "hello");
        handle_event(&mut app, key(KeyCode::Enter));

        assert!(app.input.is_empty());
        assert_eq!(app.chat.messages(), &[Message::new(Origin::User, "hello")]);
        assert!(app.is_thinking());
        assert!(app.chat.is_thinking());

        let completion = replies.recv().await.unwrap();
        handle_event(&mut app, AppEvent::Reply(completion));

        assert_eq!(app.chat.last(), Some(&Message::new(Origin::Ai, "echo: hello")));
        assert!(!app.is_thinking());
        assert!(!app.chat.is_thinking());
    }

    #[tokio::test]
    async fn enter_on_empty_input_does_nothing() {
        let (mut app, _replies) = app();

        handle_event(&mut app, key(KeyCode::Enter));

        assert!(app.chat.is_empty());
        assert!(!app.is_thinking());
    }

    #[tokio::test]
    async fn failed_reply_shows_fallback() {
        let (mut app, _replies) = app();

        // Stand in for a completion that failed on the wire
        let id = app.dispatcher.submit(&mut FixedInput("again"), &mut app.chat).unwrap();
        let completion = Completion {
            id,
            outcome: Err(ClientError::MissingResponse),
        };
        handle_event(&mut app, AppEvent::Reply(completion));

        assert_eq!(app.chat.last(), Some(&Message::new(Origin::Ai, FALLBACK_REPLY)));
    }

    #[tokio::test]
    async fn editing_keys_change_input() {
        let (mut app, _replies) = app();
        type_text(&mut app, "mean of 1, 2");
        handle_event(&mut app, key(KeyCode::Backspace));
        handle_event(&mut app, key(KeyCode::Home));
        handle_event(&mut app, key(KeyCode::Delete));

        assert_eq!(app.input.value(), "ean of 1, ");
    }

    #[tokio::test]
    async fn quit_keys() {
        let (mut app, _replies) = app();
        handle_event(&mut app, key(KeyCode::Esc));
        assert!(app.should_quit);

        let (mut app, _replies) = self::app();
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }

    #[tokio::test]
    async fn wheel_scrolls_only_inside_chat_pane() {
        let (mut app, _replies) = app();
        app.chat.set_viewport(40, 4);
        for i in 0..5 {
            app.chat.render(&format!("line {i}"), Origin::User);
        }
        app.chat_area = Some(Rect::new(0, 1, 42, 6));
        let bottom = app.chat.scroll();

        let wheel = |row| {
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 5,
                row,
                modifiers: KeyModifiers::NONE,
            })
        };

        handle_event(&mut app, wheel(20));
        assert_eq!(app.chat.scroll(), bottom);

        handle_event(&mut app, wheel(3));
        assert_eq!(app.chat.scroll(), bottom - WHEEL_LINES);
        assert!(!app.chat.is_following());
    }

    #[tokio::test]
    async fn page_keys_move_by_half_a_screen() {
        let (mut app, _replies) = app();
        app.chat.set_viewport(40, 4);
        for i in 0..5 {
            app.chat.render(&format!("line {i}"), Origin::User);
        }
        let bottom = app.chat.scroll();

        handle_event(&mut app, key(KeyCode::PageUp));
        assert_eq!(app.chat.scroll(), bottom - 2);
        assert!(!app.chat.is_following());

        handle_event(&mut app, key(KeyCode::PageDown));
        assert_eq!(app.chat.scroll(), bottom);
        assert!(app.chat.is_following());
    }

    #[tokio::test]
    async fn ctrl_end_follows_latest_and_plain_end_moves_cursor() {
        let (mut app, _replies) = app();
        app.chat.set_viewport(40, 4);
        for i in 0..5 {
            app.chat.render(&format!("line {i}"), Origin::User);
        }
        let bottom = app.chat.scroll();

        type_text(&mut app, "sum");
        handle_event(&mut app, key(KeyCode::Home));
        handle_event(&mut app, key(KeyCode::Up));
        handle_event(&mut app, key(KeyCode::Up));
        assert_eq!(app.chat.scroll(), bottom - 2);

        handle_event(&mut app, key(KeyCode::End));
        assert_eq!(app.input.cursor(), 3);
        assert_eq!(app.chat.scroll(), bottom - 2);

        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::End, KeyModifiers::CONTROL)),
        );
        assert_eq!(app.chat.scroll(), bottom);
        assert!(app.chat.is_following());
    }

    struct FixedInput(&'static str);

    impl InputField for FixedInput {
        fn value(&self) -> &str {
            self.0
        }

        fn clear(&mut self) {}
    }
}
