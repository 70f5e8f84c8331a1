use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::PrintStyledContent,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::{error::TuiError, renderer::RenderFrame};

/// Where painted frames end up.
#[derive(Debug)]
enum Target {
    /// The process terminal, switched to raw mode on the alternate screen.
    Stdout(Stdout),
    /// Plain text of the last frame, for tests and headless runs.
    Buffer(Vec<u8>),
}

/// Thin wrapper around the concrete terminal output target.
#[derive(Debug)]
pub struct Terminal {
    target: Target,
    frames: usize,
}

impl Terminal {
    /// Creates a terminal bound to the process `stdout` handle, enabling raw mode
    /// and entering the alternate screen buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched into raw mode.
    pub fn stdout() -> Result<Self, TuiError> {
        let mut handle = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(handle, EnterAlternateScreen, Hide)?;
        Ok(Self {
            target: Target::Stdout(handle),
            frames: 0,
        })
    }

    /// Creates a buffered terminal useful for tests.
    #[must_use]
    pub const fn buffered() -> Self {
        Self {
            target: Target::Buffer(Vec::new()),
            frames: 0,
        }
    }

    /// Number of frames drawn so far.
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Clears the target and draws `frame` from the top-left corner.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn render(&mut self, frame: &RenderFrame) -> Result<(), TuiError> {
        match &mut self.target {
            Target::Stdout(handle) => {
                queue!(handle, Clear(ClearType::All))?;
                for (row, line) in frame.lines().iter().enumerate() {
                    let row = u16::try_from(row).unwrap_or(u16::MAX);
                    queue!(handle, MoveTo(0, row))?;
                    for segment in line.segments() {
                        queue!(handle, PrintStyledContent(segment.as_styled_content()))?;
                    }
                }
                handle.flush()?;
            }
            Target::Buffer(buffer) => {
                buffer.clear();
                buffer.extend_from_slice(frame.plain_text().as_bytes());
            }
        }
        self.frames += 1;
        Ok(())
    }

    /// Returns the buffered contents when the terminal was created via [`Self::buffered`].
    #[must_use]
    pub fn snapshot(&self) -> Option<&[u8]> {
        match &self.target {
            Target::Buffer(buffer) => Some(buffer.as_slice()),
            Target::Stdout(_) => None,
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Target::Stdout(handle) = &mut self.target {
            let _ = execute!(handle, Show, LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
}
