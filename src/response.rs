/// What the consumer of header lines wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// No more lines are needed; the rest of the response can be dropped.
    Stop,
}

/// Splits a response byte stream into lines as it arrives.
///
/// Lines are cut after each `\n` and handed out with their terminator, so a
/// consumer can tell a proper CRLF from a bare LF.
#[derive(Debug, Default)]
pub struct HeadReader {
    pending: Vec<u8>,
    lines: usize,
}

impl HeadReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|&b| b == b'\n')? + 1;
        self.lines += 1;
        Some(self.pending.drain(..end).collect())
    }

    /// Hands every complete line to `on_line` until it answers [`Flow::Stop`].
    pub fn dispatch(&mut self, on_line: &mut impl FnMut(&[u8]) -> Flow) -> Flow {
        while let Some(line) = self.next_line() {
            if on_line(&line) == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Called at end of stream: hands out a trailing unterminated line.
    pub fn finish(&mut self, on_line: &mut impl FnMut(&[u8]) -> Flow) -> Flow {
        if self.pending.is_empty() {
            return Flow::Continue;
        }
        self.lines += 1;
        let line = std::mem::take(&mut self.pending);
        on_line(&line)
    }

    /// Number of lines handed out so far.
    pub fn lines(&self) -> usize {
        self.lines
    }
}
