//! Conversation controller.
//!
//! Each [`turn`](ConversationController::turn) blocks on exactly one capture.
//! In `Idle` the utterance is classified and handled; while an event is being
//! drafted the utterance answers the pending prompt instead. Only an exit
//! command or a closed input ends the loop.

use tracing::{debug, info, warn};

use super::state::ConversationState;
use crate::actions::{self, ActionContext, RECOGNITION_APOLOGY, calendar};
use crate::intent::{Intent, IntentDispatcher};
use crate::speech::{RecognitionError, SpeechInput};

/// Drives turns over a [`SpeechInput`], speaking through the context's
/// speaker.
pub struct ConversationController<I> {
    input: I,
    ctx: ActionContext,
    dispatcher: IntentDispatcher,
    state: ConversationState,
}

impl<I: SpeechInput> ConversationController<I> {
    /// Controller starting in [`ConversationState::Idle`].
    pub fn new(input: I, ctx: ActionContext) -> Self {
        Self {
            input,
            ctx,
            dispatcher: IntentDispatcher::new(),
            state: ConversationState::Idle,
        }
    }

    /// Current dialogue state.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Context shared with the action handlers.
    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }

    /// Greet, then run turns until the session ends.
    pub fn run(&mut self) {
        self.ctx.speaker.say(actions::GREETING);
        while self.turn() {}
        info!("conversation ended");
    }

    /// Capture one utterance and act on it. Returns `false` when the session
    /// should end.
    pub fn turn(&mut self) -> bool {
        match self.input.capture() {
            Ok(text) => {
                info!(text = %text, "user said");
                self.handle_utterance(&text)
            }
            Err(e) => self.handle_capture_error(e),
        }
    }

    /// Act on an already-captured utterance.
    pub fn handle_utterance(&mut self, text: &str) -> bool {
        if self.state.is_collecting() {
            self.answer_prompt(text);
            return true;
        }
        self.dispatch(text)
    }

    fn dispatch(&mut self, text: &str) -> bool {
        self.transition(ConversationState::Dispatching);
        let intent = self.dispatcher.classify(&text.to_lowercase());
        info!(%intent, "classified");

        actions::execute(&self.ctx, &intent).speak(&self.ctx.speaker);

        match intent {
            Intent::Exit => {
                self.transition(ConversationState::Idle);
                false
            }
            Intent::CalendarAdd => {
                self.transition(ConversationState::CollectingTitle);
                true
            }
            _ => {
                self.transition(ConversationState::Idle);
                true
            }
        }
    }

    fn answer_prompt(&mut self, answer: &str) {
        let state = std::mem::take(&mut self.state);
        let (next, completed) = state.advance(answer);
        let prompt = match next {
            ConversationState::CollectingStart { .. } => Some(calendar::START_PROMPT),
            ConversationState::CollectingEnd { .. } => Some(calendar::END_PROMPT),
            _ => None,
        };
        self.transition(next);

        if let Some(prompt) = prompt {
            self.ctx.speaker.say(prompt);
            return;
        }
        if let Some(event) = completed {
            calendar::add_event(&self.ctx, &event).speak(&self.ctx.speaker);
        }
        self.transition(ConversationState::Idle);
    }

    fn handle_capture_error(&mut self, err: RecognitionError) -> bool {
        match err {
            RecognitionError::InputClosed => {
                info!("input closed");
                self.transition(ConversationState::Idle);
                return false;
            }
            RecognitionError::NoSpeechDetected => debug!(state = %self.state, "no speech detected"),
            RecognitionError::Service(e) => {
                warn!("recognition failed: {e}");
                self.ctx.speaker.say(RECOGNITION_APOLOGY);
            }
        }
        // A pending prompt keeps its draft and waits for the next capture.
        true
    }

    fn transition(&mut self, next: ConversationState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "state transition");
        }
        self.state = next;
    }
}
