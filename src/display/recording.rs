//! In-memory sink that records what it was asked to show.

use crate::core::RenderCommand;
use crate::display::{DisplayError, DisplaySink};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Recorded {
    commands: Vec<RenderCommand>,
    flushes: usize,
}

/// Records commands and flush counts. Clones share the same record, so a
/// test can keep a handle after moving the display into a session.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    recorded: Arc<Mutex<Recorded>>,
    fail: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A display whose every operation fails with `Unavailable`.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        self.recorded
            .lock()
            .map(|r| r.commands.clone())
            .unwrap_or_default()
    }

    pub fn flush_count(&self) -> usize {
        self.recorded.lock().map(|r| r.flushes).unwrap_or(0)
    }
}

impl DisplaySink for RecordingDisplay {
    fn draw(&mut self, command: &RenderCommand) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Unavailable);
        }
        self.recorded
            .lock()
            .map_err(|_| DisplayError::Unavailable)?
            .commands
            .push(command.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Unavailable);
        }
        self.recorded
            .lock()
            .map_err(|_| DisplayError::Unavailable)?
            .flushes += 1;
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (21, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_record() {
        let display = RecordingDisplay::new();
        let mut handle = display.clone();

        handle.draw(&RenderCommand::Clear).unwrap();
        handle.flush().unwrap();

        assert_eq!(display.commands(), vec![RenderCommand::Clear]);
        assert_eq!(display.flush_count(), 1);
    }

    #[test]
    fn test_failing_display() {
        let mut display = RecordingDisplay::failing();
        assert!(matches!(
            display.draw(&RenderCommand::Clear),
            Err(DisplayError::Unavailable)
        ));
        assert!(display.flush().is_err());
    }
}
