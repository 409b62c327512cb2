//! The scrolling transcript the dispatcher renders into.

use std::borrow::Cow;

use crate::state::{Message, Origin};

// Fallbacks used before the UI has reported a viewport size
const DEFAULT_WRAP_WIDTH: u16 = 50;
const DEFAULT_VISIBLE_HEIGHT: u16 = 20;

/// Lines taken by the "Thinking..." indicator ("AI:" + "Thinking...")
const THINKING_LINES: usize = 2;

/// Destination for rendered messages.
///
/// Implementations append the entry at the end of their view and make sure
/// the newly added entry is visible. Rendering never fails.
pub trait Transcript {
    fn render(&mut self, content: &str, origin: Origin);
}

/// One screen row of the transcript at the current viewport width.
///
/// Content is already wrapped; drawing code must not wrap it again or the
/// scroll offset stops matching what is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayLine<'a> {
    Label(Origin),
    Text(Cow<'a, str>),
    Blank,
}

/// Append-only chat log with scroll-to-latest behaviour
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: Vec<Message>,
    scroll: u16,
    follow: bool,
    width: u16,
    height: u16,
    thinking: bool,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            scroll: 0,
            follow: true,
            width: 0,
            height: 0,
            thinking: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Whether the view is pinned to the newest entry
    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Record the inner size of the pane the log is drawn in.
    ///
    /// Called on every frame; keeps the tail visible while following.
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        if self.follow {
            self.scroll_to_latest();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
    }

    /// Show or hide the pending-reply indicator below the last entry
    pub fn set_thinking(&mut self, thinking: bool) {
        if self.thinking == thinking {
            return;
        }
        self.thinking = thinking;
        if self.follow {
            self.scroll_to_latest();
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = self.scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
        self.follow = self.scroll >= self.max_scroll();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.visible_height() / 2);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.visible_height() / 2);
    }

    /// Pin the view to the bottom so the newest entry is visible
    pub fn scroll_to_latest(&mut self) {
        self.scroll = self.max_scroll();
        self.follow = true;
    }

    /// Every message wrapped to the viewport width, label first and a blank after
    pub fn display_lines(&self) -> Vec<DisplayLine<'_>> {
        let width = self.wrap_width();
        let mut lines = Vec::new();

        for msg in &self.messages {
            lines.push(DisplayLine::Label(msg.origin));
            for line in msg.content.lines() {
                if line.is_empty() {
                    lines.push(DisplayLine::Text(Cow::Borrowed("")));
                } else {
                    lines.extend(textwrap::wrap(line, width).into_iter().map(DisplayLine::Text));
                }
            }
            lines.push(DisplayLine::Blank);
        }

        lines
    }

    /// Total rows the log occupies at the current width, indicator included
    pub fn total_lines(&self) -> usize {
        let indicator = if self.thinking { THINKING_LINES } else { 0 };
        self.display_lines().len() + indicator
    }

    fn max_scroll(&self) -> u16 {
        let total = u16::try_from(self.total_lines()).unwrap_or(u16::MAX);
        total.saturating_sub(self.visible_height())
    }

    fn wrap_width(&self) -> usize {
        if self.width > 0 {
            self.width as usize
        } else {
            DEFAULT_WRAP_WIDTH as usize
        }
    }

    fn visible_height(&self) -> u16 {
        if self.height > 0 {
            self.height
        } else {
            DEFAULT_VISIBLE_HEIGHT
        }
    }
}

impl Transcript for ChatLog {
    fn render(&mut self, content: &str, origin: Origin) {
        self.messages.push(Message::new(origin, content));
        self.scroll_to_latest();
    }
}
