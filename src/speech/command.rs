//! Text-to-speech through an external program (`espeak`, macOS `say`).

use std::process::Command;

use tracing::debug;

use super::SpeechOutput;
use crate::config::VoiceConfig;

/// Prints each reply, then speaks it with a TTS program and waits for it to
/// finish.
#[derive(Debug, Clone)]
pub struct CommandVoice {
    program: String,
    rate: u32,
    volume: f32,
}

impl CommandVoice {
    pub fn new(program: impl Into<String>, rate: u32, volume: f32) -> Self {
        Self {
            program: program.into(),
            rate,
            volume,
        }
    }

    pub fn from_config(config: &VoiceConfig) -> Self {
        Self::new(config.command.clone(), config.rate, config.volume)
    }

    /// Command-line arguments for speaking `text`.
    ///
    /// `say` takes words per minute via `-r` and has no volume flag; anything
    /// else is treated as espeak-compatible (`-s` rate, `-a` amplitude where
    /// volume 1.0 maps to the default amplitude of 100).
    pub fn args(&self, text: &str) -> Vec<String> {
        if self.is_say() {
            return vec!["-r".to_owned(), self.rate.to_string(), text.to_owned()];
        }
        let amplitude = (self.volume.clamp(0.0, 2.0) * 100.0).round() as u32;
        vec![
            "-s".to_owned(),
            self.rate.to_string(),
            "-a".to_owned(),
            amplitude.to_string(),
            text.to_owned(),
        ]
    }

    fn is_say(&self) -> bool {
        std::path::Path::new(&self.program)
            .file_name()
            .is_some_and(|name| name == "say")
    }
}

impl SpeechOutput for CommandVoice {
    fn speak(&mut self, text: &str) -> std::io::Result<()> {
        println!("Assistant: {text}");
        if text.trim().is_empty() {
            return Ok(());
        }

        debug!("running {} for {} chars", self.program, text.len());
        let status = Command::new(&self.program).args(self.args(text)).status()?;
        if !status.success() {
            return Err(std::io::Error::other(format!(
                "{} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}
