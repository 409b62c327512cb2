use std::sync::Arc;

use ratatui::layout::Rect;
use sadhak_core::{ChatLog, Completion, Dispatcher, Generator, InputLine, ReplyOrder};
use tokio::sync::mpsc;

pub struct App {
    pub should_quit: bool,

    // Chat state
    pub input: InputLine,
    pub chat: ChatLog,
    pub dispatcher: Dispatcher,
    pub endpoint: String,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Chat pane area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
}

impl App {
    /// Build the app around a generator; replies come back on the returned receiver
    pub fn new(
        generator: Arc<dyn Generator>,
        endpoint: String,
        order: ReplyOrder,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let app = Self {
            should_quit: false,
            input: InputLine::new(),
            chat: ChatLog::new(),
            dispatcher: Dispatcher::new(generator, tx, order),
            endpoint,
            animation_frame: 0,
            chat_area: None,
        };

        (app, rx)
    }

    /// Send whatever is in the input line
    pub fn submit(&mut self) {
        if let Some(id) = self.dispatcher.submit(&mut self.input, &mut self.chat) {
            tracing::info!(request = %id, "prompt submitted");
        }
        self.sync_thinking();
    }

    /// Render a finished exchange
    pub fn receive(&mut self, completion: Completion) {
        self.dispatcher.complete(completion, &mut self.chat);
        self.sync_thinking();
    }

    pub fn is_thinking(&self) -> bool {
        self.dispatcher.in_flight() > 0
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_thinking() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn sync_thinking(&mut self) {
        let thinking = self.is_thinking();
        self.chat.set_thinking(thinking);
    }
}
