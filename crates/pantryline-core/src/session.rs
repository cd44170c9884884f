//! Session runner — drives one conversation turn against real speech I/O.
//!
//! Executes the state machine's [`Directive`]s in order: speech finishes
//! before recognition starts, recognition finishes before processing, so the
//! mutual-exclusion invariant holds by construction. Resolution results are
//! stamped with the session token taken when processing began; if the session
//! was reset in the meantime, the result is dropped silently.

use crate::conversation::{ConversationContext, ConversationEvent, Directive};
use crate::error::{AssistantError, Result};
use crate::resolver::PantryResolver;
use crate::speech::{SpeechInput, SpeechOutput};
use tracing::{debug, warn};

/// Run one full turn: greet, listen for an address, resolve it, speak the
/// summary or the apology. Returns the engine error (if any) after the caller
/// has already heard the matching apology.
pub async fn run_conversation(
    resolver: &PantryResolver,
    input: &dyn SpeechInput,
    output: &dyn SpeechOutput,
    ctx: &mut ConversationContext,
) -> Result<()> {
    let directives = ctx.apply(ConversationEvent::Start);
    let transcript = match execute_directives(&directives, input, output).await {
        Ok(transcript) => transcript,
        Err(e) => {
            // Recognition or playback died; put the session back to idle with
            // audible feedback rather than leaving it stuck listening.
            warn!(target: "pantryline::session", "speech I/O failed: {}", e);
            let cleanup = ctx.apply(ConversationEvent::Reset);
            let _ = execute_directives(&cleanup, input, output).await;
            let _ = output.speak(&e.apology()).await;
            return Err(e);
        }
    };

    let Some(transcript) = transcript else {
        // Start always requests Listen; an empty batch means the state
        // machine was driven out from under us.
        return Ok(());
    };

    let directives = ctx.apply(ConversationEvent::UtteranceReceived(transcript.clone()));
    execute_directives(&directives, input, output).await?;

    let token = ctx.session();
    let outcome = resolver.resolve(&transcript).await;
    let event = match outcome {
        Ok(resolution) => ConversationEvent::ResolutionSucceeded {
            summary: PantryResolver::narrate(&resolution),
            result: Box::new(resolution.nearest),
        },
        Err(e) => ConversationEvent::ResolutionFailed(e),
    };

    let directives = ctx.apply_if_current(token, event);
    if directives.is_empty() {
        debug!(target: "pantryline::session", "session moved on; dropping resolution result");
        return Ok(());
    }
    execute_directives(&directives, input, output).await?;
    Ok(())
}

/// Cancel the conversation: stop playback and recognition synchronously and
/// clear the context. In-flight network calls are not cancelled; their
/// results die against the bumped session token.
pub async fn reset_conversation(
    input: &dyn SpeechInput,
    output: &dyn SpeechOutput,
    ctx: &mut ConversationContext,
) {
    let directives = ctx.apply(ConversationEvent::Reset);
    if let Err(e) = execute_directives(&directives, input, output).await {
        warn!(target: "pantryline::session", "reset cleanup failed: {}", e);
    }
}

/// Perform a directive batch in order. Returns the transcript when the batch
/// contained a `Listen`.
async fn execute_directives(
    directives: &[Directive],
    input: &dyn SpeechInput,
    output: &dyn SpeechOutput,
) -> Result<Option<String>> {
    let mut transcript = None;
    for directive in directives {
        match directive {
            Directive::Speak(text) => {
                output
                    .speak(text)
                    .await
                    .map_err(|e| AssistantError::Speech(e.to_string()))?;
            }
            Directive::Listen => {
                transcript = Some(input.recognize().await?);
            }
            Directive::StopListening => input.cancel(),
            Directive::StopSpeaking => output.stop(),
        }
    }
    Ok(transcript)
}
