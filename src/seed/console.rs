use anyhow::{Context, Result};
use std::io::{BufRead, Write};

pub const AFFIRMATIVE: &str = "yes";

/// Line-oriented operator interaction over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Show `prompt` and read one trimmed line. End of input reads as an
    /// empty answer.
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("failed to read from the console")?;
        Ok(line.trim().to_string())
    }

    /// True only for the affirmative token, ignoring case.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self.ask(prompt)?.eq_ignore_ascii_case(AFFIRMATIVE))
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
