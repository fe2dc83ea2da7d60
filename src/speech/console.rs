//! Line-oriented console speech: typed input, printed replies.

use std::io::{BufRead, Write};

use super::{RecognitionError, SpeechInput, SpeechOutput};

/// Reads one utterance per line.
///
/// A blank line counts as silence and EOF closes the input.
pub struct ConsoleListener<R> {
    reader: R,
    prompt: String,
}

impl ConsoleListener<std::io::BufReader<std::io::Stdin>> {
    /// Listen on stdin, printing `prompt` before each capture.
    pub fn stdin(prompt: impl Into<String>) -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()), prompt)
    }
}

impl<R: BufRead> ConsoleListener<R> {
    /// Listen on any buffered reader. An empty prompt prints nothing.
    pub fn new(reader: R, prompt: impl Into<String>) -> Self {
        Self {
            reader,
            prompt: prompt.into(),
        }
    }
}

impl<R: BufRead + Send> SpeechInput for ConsoleListener<R> {
    fn capture(&mut self) -> Result<String, RecognitionError> {
        if !self.prompt.is_empty() {
            println!("{}", self.prompt);
        }

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| RecognitionError::Service(e.to_string()))?;
        if read == 0 {
            return Err(RecognitionError::InputClosed);
        }

        let text = line.trim();
        if text.is_empty() {
            return Err(RecognitionError::NoSpeechDetected);
        }
        Ok(text.to_owned())
    }
}

/// Prints each reply as `Assistant: <text>`.
pub struct ConsoleVoice<W> {
    out: W,
}

impl ConsoleVoice<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleVoice<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> SpeechOutput for ConsoleVoice<W> {
    fn speak(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "Assistant: {text}")?;
        self.out.flush()
    }
}
