//! Serialized, shareable handle over the speech output.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::SpeechOutput;

/// The single TTS sink, shared by the turn loop and scheduler callbacks.
///
/// Clones share the underlying output; the mutex keeps two replies from
/// interleaving. Rendering failures are logged and dropped so a broken voice
/// never stops the assistant.
#[derive(Clone)]
pub struct Speaker {
    output: Arc<Mutex<Box<dyn SpeechOutput>>>,
}

impl std::fmt::Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker").finish_non_exhaustive()
    }
}

impl Speaker {
    pub fn new(output: impl SpeechOutput + 'static) -> Self {
        Self::from_boxed(Box::new(output))
    }

    pub fn from_boxed(output: Box<dyn SpeechOutput>) -> Self {
        Self {
            output: Arc::new(Mutex::new(output)),
        }
    }

    /// Speak `text`, blocking until rendered.
    pub fn say(&self, text: &str) {
        info!(text, "assistant said");
        let mut output = match self.output.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = output.speak(text) {
            warn!("speech output failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::testing::RecordingVoice;

    #[test]
    fn clones_share_one_output() {
        let voice = RecordingVoice::new();
        let speaker = Speaker::new(voice.clone());
        let other = speaker.clone();

        speaker.say("one");
        other.say("two");
        assert_eq!(voice.spoken(), vec!["one", "two"]);
    }

    #[test]
    fn failures_are_swallowed() {
        let voice = RecordingVoice::failing();
        let speaker = Speaker::new(voice.clone());
        speaker.say("still here");
        assert_eq!(voice.spoken(), vec!["still here"]);
    }

    #[test]
    fn concurrent_speech_is_not_lost() {
        let voice = RecordingVoice::new();
        let speaker = Speaker::new(voice.clone());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let speaker = speaker.clone();
                std::thread::spawn(move || speaker.say(&format!("line {i}")))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(voice.spoken().len(), 8);
    }
}
