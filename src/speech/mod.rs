//! Speech capture and rendering collaborators.
//!
//! The conversation loop only sees the [`SpeechInput`] and [`SpeechOutput`]
//! traits. Console implementations read typed lines and print replies;
//! [`CommandVoice`] additionally hands each reply to a TTS program.

pub mod command;
pub mod console;
pub mod speaker;

pub use command::CommandVoice;
pub use console::{ConsoleListener, ConsoleVoice};
pub use speaker::Speaker;

use crate::config::{VoiceConfig, VoiceEngine};

/// Why a capture produced no utterance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// Nothing intelligible was heard.
    #[error("no speech detected")]
    NoSpeechDetected,
    /// The recognition backend failed.
    #[error("recognition service error: {0}")]
    Service(String),
    /// The input source is exhausted; no further captures are possible.
    #[error("input closed")]
    InputClosed,
}

/// Source of user utterances.
pub trait SpeechInput: Send {
    /// Block until the next utterance is available and return its text.
    fn capture(&mut self) -> Result<String, RecognitionError>;
}

/// Sink for assistant replies. Blocks until the text has been rendered.
pub trait SpeechOutput: Send {
    fn speak(&mut self, text: &str) -> std::io::Result<()>;
}

impl<T: SpeechInput + ?Sized> SpeechInput for Box<T> {
    fn capture(&mut self) -> Result<String, RecognitionError> {
        (**self).capture()
    }
}

impl<T: SpeechOutput + ?Sized> SpeechOutput for Box<T> {
    fn speak(&mut self, text: &str) -> std::io::Result<()> {
        (**self).speak(text)
    }
}

/// Build the configured voice.
pub fn voice_from_config(config: &VoiceConfig) -> Box<dyn SpeechOutput> {
    match config.engine {
        VoiceEngine::Console => Box::new(ConsoleVoice::stdout()),
        VoiceEngine::Command => Box::new(CommandVoice::from_config(config)),
    }
}
