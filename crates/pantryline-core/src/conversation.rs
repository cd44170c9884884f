//! Conversation state machine — sequences listening, processing, and speaking.
//!
//! One turn: `idle → waiting_for_address → processing → found_pantry | idle`.
//! Transitions are a single `(state, event)` match that returns the side
//! effects to perform as [`Directive`]s, so the mutual-exclusion invariant
//! (never listening and speaking at the same instant) is checkable in tests
//! instead of being scattered across boolean flags.
//!
//! The context carries a monotonically increasing session token. A pipeline
//! result stamped with an old token is discarded, so a reset or restart while
//! a geocode call is still in flight can never corrupt the new session.

use crate::error::AssistantError;
use crate::ranking::RankedPantry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Opening prompt spoken when a conversation starts.
pub const GREETING: &str =
    "Hello! I can help you find the nearest pantry. Please tell me your address.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Idle,
    WaitingForAddress,
    Processing,
    FoundPantry,
}

/// Inputs that drive the state machine.
#[derive(Debug)]
pub enum ConversationEvent {
    /// The caller opened a conversation.
    Start,
    /// Recognition produced a final transcript.
    UtteranceReceived(String),
    /// The resolution pipeline found the nearest pantry; `summary` is the
    /// sentence to speak.
    ResolutionSucceeded {
        result: Box<RankedPantry>,
        summary: String,
    },
    /// The resolution pipeline failed.
    ResolutionFailed(AssistantError),
    /// Cancel everything and return to idle.
    Reset,
}

/// Side effects a transition asks the session runner to perform, in order.
/// `Listen` only ever appears last in a batch: playback must have finished
/// before recognition starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Speak(String),
    Listen,
    StopListening,
    StopSpeaking,
}

/// Session-scoped conversation state. Created at session start; reset returns
/// it to a clean idle.
#[derive(Debug)]
pub struct ConversationContext {
    state: ConversationState,
    transcript: String,
    last_result: Option<RankedPantry>,
    last_error: Option<String>,
    session: u64,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationContext {
    pub fn new() -> Self {
        Self {
            state: ConversationState::Idle,
            transcript: String::new(),
            last_result: None,
            last_error: None,
            session: 0,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn last_result(&self) -> Option<&RankedPantry> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current session token. Stamp in-flight work with this and deliver the
    /// result through [`ConversationContext::apply_if_current`].
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Apply `event` only when `token` still matches the current session;
    /// stale results are dropped without side effects.
    pub fn apply_if_current(&mut self, token: u64, event: ConversationEvent) -> Vec<Directive> {
        if token != self.session {
            debug!(
                target: "pantryline::conversation",
                "discarding stale event from session {} (current {})", token, self.session
            );
            return Vec::new();
        }
        self.apply(event)
    }

    /// The transition table. Illegal `(state, event)` pairs are logged and
    /// ignored rather than panicking.
    pub fn apply(&mut self, event: ConversationEvent) -> Vec<Directive> {
        match (self.state, event) {
            (ConversationState::Idle, ConversationEvent::Start) => {
                info!(target: "pantryline::conversation", "conversation started");
                self.clear();
                self.session += 1;
                self.state = ConversationState::WaitingForAddress;
                vec![Directive::Speak(GREETING.to_string()), Directive::Listen]
            }

            (ConversationState::WaitingForAddress, ConversationEvent::UtteranceReceived(text)) => {
                info!(target: "pantryline::conversation", "utterance received: {:?}", text);
                self.transcript = text;
                self.state = ConversationState::Processing;
                vec![Directive::StopListening]
            }

            (
                ConversationState::Processing,
                ConversationEvent::ResolutionSucceeded { result, summary },
            ) => {
                info!(
                    target: "pantryline::conversation",
                    "nearest pantry: {} ({:.1} km)", result.pantry.name, result.distance_km
                );
                self.last_result = Some(*result);
                self.last_error = None;
                self.state = ConversationState::FoundPantry;
                vec![Directive::Speak(summary)]
            }

            (ConversationState::Processing, ConversationEvent::ResolutionFailed(error)) => {
                warn!(target: "pantryline::conversation", "resolution failed: {}", error);
                let apology = error.apology();
                self.last_error = Some(error.to_string());
                self.state = ConversationState::Idle;
                vec![Directive::Speak(apology)]
            }

            (_, ConversationEvent::Reset) => {
                info!(target: "pantryline::conversation", "conversation reset");
                self.clear();
                self.session += 1;
                self.state = ConversationState::Idle;
                vec![Directive::StopSpeaking, Directive::StopListening]
            }

            (state, event) => {
                warn!(
                    target: "pantryline::conversation",
                    "ignoring {:?} in state {:?}", event, state
                );
                Vec::new()
            }
        }
    }

    fn clear(&mut self) {
        self.transcript.clear();
        self.last_result = None;
        self.last_error = None;
    }
}
