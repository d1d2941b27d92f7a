//! Text-mode voice: orders are typed, answers are printed.

use barkeep_core::{BarError, BarResult, VoiceIo};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// `VoiceIo` over a line reader and a writer. A blank line counts as silence;
/// end of input is reported as silence too, so the attempt budget ends the session.
pub struct ConsoleVoice<R, W> {
    input: R,
    output: W,
    prompt: String,
}

impl ConsoleVoice<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleVoice<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            prompt: "you> ".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

fn io_error(e: io::Error) -> BarError {
    BarError::Voice(format!("console: {}", e))
}

impl<R: BufRead, W: Write> VoiceIo for ConsoleVoice<R, W> {
    fn listen_once(&mut self) -> BarResult<Option<String>> {
        write!(self.output, "{}", self.prompt).map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Ok(None);
        }
        let text = line.trim();
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }

    fn speak(&mut self, text: &str) -> BarResult<()> {
        writeln!(self.output, "bartender> {}", text).map_err(io_error)?;
        self.output.flush().map_err(io_error)
    }
}
