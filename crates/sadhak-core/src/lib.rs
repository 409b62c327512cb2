pub mod client;
pub mod config;
pub mod dispatcher;
pub mod input;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use client::{ClientError, GenerateClient, Generator};
pub use config::Config;
pub use dispatcher::{reply_text, Completion, Dispatcher, ReplyOrder, RequestId, FALLBACK_REPLY};
pub use input::{InputField, InputLine};
pub use state::{Message, Origin};
pub use transcript::{ChatLog, DisplayLine, Transcript};
