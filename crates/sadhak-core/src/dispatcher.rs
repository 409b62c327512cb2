//! Turns a submitted prompt into a `/generate` exchange and renders the outcome.
//!
//! `submit` runs synchronously: it echoes the prompt into the transcript,
//! clears the input and spawns the network call. The spawned task reports
//! back through an mpsc channel, and the owner of the transcript feeds each
//! [`Completion`] to `complete` from its own event loop. The transcript is
//! therefore only ever touched from one place.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

use crate::client::{ClientError, Generator};
use crate::input::InputField;
use crate::state::Origin;
use crate::transcript::Transcript;

/// Shown in place of a reply whenever an exchange fails, whatever the cause
pub const FALLBACK_REPLY: &str = "Sorry, there was an error processing your request.";

/// Identity of one submission, increasing in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// When replies to overlapping submissions are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyOrder {
    /// As soon as each reply arrives
    #[default]
    Arrival,
    /// Strictly in the order the prompts were submitted
    Submission,
}

impl ReplyOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyOrder::Arrival => "arrival",
            ReplyOrder::Submission => "submission",
        }
    }
}

/// Result of one exchange, posted back by the spawned request task
#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Result<String, ClientError>,
}

/// Map an exchange outcome to the text shown to the user.
///
/// Failures are logged and replaced by [`FALLBACK_REPLY`]; the error detail
/// never reaches the transcript.
pub fn reply_text(outcome: Result<String, ClientError>) -> String {
    match outcome {
        Ok(reply) => reply,
        Err(err) => {
            error!(error = %err, "generate request failed");
            if let ClientError::Status { body, .. } = &err {
                debug!(body = %body, "error response body");
            }
            FALLBACK_REPLY.to_string()
        }
    }
}

pub struct Dispatcher {
    generator: Arc<dyn Generator>,
    completions: UnboundedSender<Completion>,
    order: ReplyOrder,
    next_id: u64,
    next_to_render: u64,
    held: BTreeMap<RequestId, String>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(
        generator: Arc<dyn Generator>,
        completions: UnboundedSender<Completion>,
        order: ReplyOrder,
    ) -> Self {
        Self {
            generator,
            completions,
            order,
            next_id: 0,
            next_to_render: 0,
            held: BTreeMap::new(),
            in_flight: 0,
        }
    }

    pub fn order(&self) -> ReplyOrder {
        self.order
    }

    /// Exchanges submitted but not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Replies received but waiting for an earlier submission
    pub fn held(&self) -> usize {
        self.held.len()
    }

    /// Submit whatever is in `input`.
    ///
    /// Empty input is ignored and leaves everything untouched. Otherwise the
    /// prompt is rendered as a user message and the input cleared before this
    /// returns; the reply arrives later as a [`Completion`]. Overlapping
    /// submissions are allowed.
    pub fn submit<I, T>(&mut self, input: &mut I, transcript: &mut T) -> Option<RequestId>
    where
        I: InputField + ?Sized,
        T: Transcript + ?Sized,
    {
        if input.value().is_empty() {
            return None;
        }

        let prompt = input.value().to_string();
        transcript.render(&prompt, Origin::User);
        input.clear();

        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.in_flight += 1;
        debug!(request = %id, in_flight = self.in_flight, "dispatching prompt");

        let generator = Arc::clone(&self.generator);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = generator.generate(&prompt).await;
            if completions.send(Completion { id, outcome }).is_err() {
                warn!(request = %id, "reply dropped, dispatcher is gone");
            }
        });

        Some(id)
    }

    /// Render the reply (or the fallback) for a finished exchange
    pub fn complete<T>(&mut self, completion: Completion, transcript: &mut T)
    where
        T: Transcript + ?Sized,
    {
        let Completion { id, outcome } = completion;
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!(request = %id, ok = outcome.is_ok(), "exchange finished");

        let text = reply_text(outcome);

        match self.order {
            ReplyOrder::Arrival => transcript.render(&text, Origin::Ai),
            ReplyOrder::Submission => {
                self.held.insert(id, text);
                while let Some(text) = self.held.remove(&RequestId(self.next_to_render)) {
                    transcript.render(&text, Origin::Ai);
                    self.next_to_render += 1;
                }
            }
        }
    }
}
