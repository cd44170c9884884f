//! Speech I/O seam — recognition and playback as external collaborators.
//!
//! The engine never touches audio devices or codecs itself; it talks to
//! whatever implements these traits. The placeholder implementations let the
//! full conversation loop run headless in tests and demos, the same way a
//! placeholder STT/TTS backend stands in for the real service.

use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One-shot speech recognition: suspends until a final transcript or error.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    async fn recognize(&self) -> Result<String>;

    /// Abort an in-flight recognition session, if any. Must be safe to call
    /// when nothing is listening.
    fn cancel(&self);
}

/// Speech playback: `speak` suspends until playback completes or fails.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;

    /// Silence and discard any in-flight playback immediately.
    fn stop(&self);

    fn is_speaking(&self) -> bool;
}

/// Scripted recognition backend: pops pre-loaded utterances in order.
#[derive(Debug, Default)]
pub struct ScriptedSpeechInput {
    utterances: Mutex<VecDeque<String>>,
    cancelled: AtomicBool,
}

impl ScriptedSpeechInput {
    pub fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            utterances: Mutex::new(utterances.into_iter().map(Into::into).collect()),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechInput for ScriptedSpeechInput {
    async fn recognize(&self) -> Result<String> {
        let mut utterances = self.utterances.lock().unwrap();
        utterances
            .pop_front()
            .ok_or_else(|| AssistantError::Speech("no utterance available".to_string()))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Playback backend that records spoken lines instead of producing audio.
#[derive(Debug, Default)]
pub struct SilentSpeechOutput {
    spoken: Mutex<Vec<String>>,
    stopped: AtomicBool,
}

impl SilentSpeechOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn was_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechOutput for SilentSpeechOutput {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        false
    }
}
