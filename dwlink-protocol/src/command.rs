//! Command-line framing for the legacy text protocol.
//!
//! Commands arrive one byte at a time from a terminal or a script:
//! - Plain commands run until `\n` or `\r`
//! - Commands starting with `{` run until the matching `}` (nested braces
//!   are counted)
//!
//! Every accepted byte is echoed back to the originating port. Backspace
//! (`\b` or DEL) removes the last stored byte and echoes an erase sequence.
//! A command that reaches [`MAX_CMD_LENGTH`] without terminating is dropped.

use dwlink_hal::{PortTx, RxSource};
use heapless::Vec;

/// Maximum stored command length, terminator excluded
pub const MAX_CMD_LENGTH: usize = 0x200;

/// Terminator appended to every completed command
pub const COMMAND_TERMINATOR: u8 = b'\n';

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;
const OPEN_BRACE: u8 = b'{';
const CLOSE_BRACE: u8 = b'}';

/// Terminal sequence that visually erases the previous character
const ERASE_SEQUENCE: &[u8] = b"\x08\x20\x08";

/// A complete command, including its trailing [`COMMAND_TERMINATOR`]
pub type Command = Vec<u8, MAX_CMD_LENGTH>;

/// Classification of the command being accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Framing {
    /// Nothing stored yet
    Idle,
    /// Line command, ends at `\n` or `\r`
    Plain,
    /// Brace-delimited command, ends when `depth` returns to zero
    Bracketed { depth: u16 },
}

/// State machine accumulating bytes into commands
#[derive(Debug, Clone)]
pub struct CommandFramer {
    framing: Framing,
    buffer: Vec<u8, MAX_CMD_LENGTH>,
}

impl Default for CommandFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFramer {
    /// Create an idle framer
    pub const fn new() -> Self {
        Self {
            framing: Framing::Idle,
            buffer: Vec::new(),
        }
    }

    /// Current classification
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Bytes accumulated so far
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop any partial command
    pub fn reset(&mut self) {
        self.framing = Framing::Idle;
        self.buffer.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Some(command)` when the byte completes a command. Echo
    /// failures are ignored: the echo is cosmetic and must not stall input.
    pub fn feed<T: PortTx>(&mut self, byte: u8, echo: &mut T) -> Option<Command> {
        if byte == BACKSPACE || byte == DELETE {
            self.erase(echo);
            return None;
        }

        let _ = echo.write_blocking(&[byte]);

        let ready = if byte == b'\n' || byte == b'\r' {
            match self.framing {
                Framing::Plain => self.complete(),
                // Bare line endings, and line breaks inside a brace command,
                // are not stored.
                Framing::Idle | Framing::Bracketed { .. } => None,
            }
        } else {
            self.store(byte)
        };

        if self.buffer.len() >= MAX_CMD_LENGTH {
            warn!("CMD: command exceeds {} bytes, dropped", MAX_CMD_LENGTH);
            self.reset();
        }

        ready
    }

    /// Drain `source` until a command completes or the source is empty
    ///
    /// Bytes after a completed command stay in `source` for the next call.
    pub fn drain<S: RxSource, T: PortTx>(
        &mut self,
        source: &mut S,
        echo: &mut T,
    ) -> Option<Command> {
        while let Some(byte) = source.read_byte() {
            if let Some(command) = self.feed(byte, echo) {
                return Some(command);
            }
        }
        None
    }

    fn store(&mut self, byte: u8) -> Option<Command> {
        // Cannot fail: the overflow guard in `feed` keeps len below capacity.
        let _ = self.buffer.push(byte);

        match self.framing {
            Framing::Idle => {
                self.framing = if byte == OPEN_BRACE {
                    Framing::Bracketed { depth: 1 }
                } else {
                    Framing::Plain
                };
                None
            }
            Framing::Plain => None,
            Framing::Bracketed { depth } => match byte {
                OPEN_BRACE => {
                    self.framing = Framing::Bracketed {
                        depth: depth.saturating_add(1),
                    };
                    None
                }
                CLOSE_BRACE if depth <= 1 => self.complete(),
                CLOSE_BRACE => {
                    self.framing = Framing::Bracketed { depth: depth - 1 };
                    None
                }
                _ => None,
            },
        }
    }

    fn erase<T: PortTx>(&mut self, echo: &mut T) {
        // The terminal sees the erase even when there is nothing to remove.
        let _ = echo.write_blocking(ERASE_SEQUENCE);

        // Erasing a brace does not adjust the depth.
        if self.buffer.pop().is_some() && self.buffer.is_empty() {
            self.framing = Framing::Idle;
        }
    }

    fn complete(&mut self) -> Option<Command> {
        let mut command = core::mem::take(&mut self.buffer);
        self.framing = Framing::Idle;
        // A closing brace can be the last byte that fits.
        if command.push(COMMAND_TERMINATOR).is_err() {
            warn!("CMD: command exceeds {} bytes, dropped", MAX_CMD_LENGTH);
            return None;
        }
        debug!("CMD: command ready ({} bytes)", command.len());
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwlink_hal::source::SliceSource;

    /// Records everything echoed back
    #[derive(Default)]
    struct EchoLog {
        bytes: Vec<u8, 4096>,
    }

    impl PortTx for EchoLog {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.bytes.extend_from_slice(data)
        }
    }

    fn feed_all(framer: &mut CommandFramer, input: &[u8]) -> Vec<Command, 8> {
        let mut echo = EchoLog::default();
        let mut ready = Vec::new();
        for &byte in input {
            if let Some(cmd) = framer.feed(byte, &mut echo) {
                ready.push(cmd).unwrap();
            }
        }
        ready
    }

    #[test]
    fn test_plain_command() {
        let mut framer = CommandFramer::new();
        let ready = feed_all(&mut framer, b"PING\n");

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].as_slice(), b"PING\n");
        assert_eq!(framer.framing(), Framing::Idle);
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn test_carriage_return_terminates() {
        let mut framer = CommandFramer::new();
        let ready = feed_all(&mut framer, b"STOP\r\n");

        // The trailing \n finds an empty buffer and is ignored
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].as_slice(), b"STOP\n");
    }

    #[test]
    fn test_bare_newlines_ignored() {
        let mut framer = CommandFramer::new();
        let ready = feed_all(&mut framer, b"\n\r\n");

        assert!(ready.is_empty());
        assert_eq!(framer.framing(), Framing::Idle);
    }

    #[test]
    fn test_bracketed_nested() {
        let mut framer = CommandFramer::new();
        let input = b"{\"a\":{\"b\":1}}";

        // Everything up to the final brace stays pending
        let ready = feed_all(&mut framer, &input[..input.len() - 1]);
        assert!(ready.is_empty());
        assert_eq!(framer.framing(), Framing::Bracketed { depth: 1 });

        let ready = feed_all(&mut framer, b"}");
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].as_slice(), b"{\"a\":{\"b\":1}}\n");
        assert_eq!(framer.framing(), Framing::Idle);
    }

    #[test]
    fn test_bracketed_ignores_line_breaks() {
        let mut framer = CommandFramer::new();
        let ready = feed_all(&mut framer, b"{\"x\":\n1}");

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].as_slice(), b"{\"x\":1}\n");
    }

    #[test]
    fn test_backspace_removes_last_byte() {
        let mut framer = CommandFramer::new();
        let ready = feed_all(&mut framer, b"AB\x08 C\n");

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].as_slice(), b"A C\n");
    }

    #[test]
    fn test_delete_behaves_like_backspace() {
        let mut framer = CommandFramer::new();
        let ready = feed_all(&mut framer, b"AB\x7FC\n");

        assert_eq!(ready[0].as_slice(), b"AC\n");
    }

    #[test]
    fn test_backspace_to_empty_returns_to_idle() {
        let mut framer = CommandFramer::new();
        feed_all(&mut framer, b"{\x08");
        assert_eq!(framer.framing(), Framing::Idle);

        // Next byte classifies afresh
        let ready = feed_all(&mut framer, b"HELP\n");
        assert_eq!(ready[0].as_slice(), b"HELP\n");
    }

    #[test]
    fn test_backspace_keeps_brace_depth() {
        let mut framer = CommandFramer::new();
        feed_all(&mut framer, b"{{\x08");

        // The erased brace still counts
        assert_eq!(framer.pending(), b"{");
        assert_eq!(framer.framing(), Framing::Bracketed { depth: 2 });
    }

    #[test]
    fn test_backspace_on_empty_still_echoes_erase() {
        let mut framer = CommandFramer::new();
        let mut echo = EchoLog::default();

        assert!(framer.feed(BACKSPACE, &mut echo).is_none());
        assert_eq!(echo.bytes.as_slice(), ERASE_SEQUENCE);
        assert_eq!(framer.framing(), Framing::Idle);
    }

    #[test]
    fn test_echo() {
        let mut framer = CommandFramer::new();
        let mut echo = EchoLog::default();
        for &b in b"AB\x08\n" {
            framer.feed(b, &mut echo);
        }

        assert_eq!(echo.bytes.as_slice(), b"AB\x08\x20\x08\n");
    }

    #[test]
    fn test_overflow_resets_without_emitting() {
        let mut framer = CommandFramer::new();
        let mut echo = EchoLog::default();

        for _ in 0..MAX_CMD_LENGTH {
            assert!(framer.feed(b'x', &mut echo).is_none());
        }
        assert_eq!(framer.framing(), Framing::Idle);
        assert!(framer.pending().is_empty());

        // A newline right after the overflow has nothing to terminate
        assert!(framer.feed(b'\n', &mut echo).is_none());
    }

    #[test]
    fn test_longest_command_fits() {
        let mut framer = CommandFramer::new();
        let mut echo = EchoLog::default();

        for _ in 0..MAX_CMD_LENGTH - 1 {
            framer.feed(b'x', &mut echo);
        }
        let cmd = framer.feed(b'\n', &mut echo).unwrap();
        assert_eq!(cmd.len(), MAX_CMD_LENGTH);
        assert_eq!(cmd.last(), Some(&COMMAND_TERMINATOR));
    }

    #[test]
    fn test_brace_closing_at_capacity_is_dropped() {
        let mut framer = CommandFramer::new();
        let mut echo = EchoLog::default();

        // `}` is the MAX_CMD_LENGTH-th byte: no room left for the terminator
        assert!(framer.feed(OPEN_BRACE, &mut echo).is_none());
        for _ in 0..MAX_CMD_LENGTH - 2 {
            assert!(framer.feed(b'a', &mut echo).is_none());
        }
        assert!(framer.feed(CLOSE_BRACE, &mut echo).is_none());
        assert_eq!(framer.framing(), Framing::Idle);
        assert!(framer.pending().is_empty());

        // The framer is usable straight away
        let cmd = feed_all(&mut framer, b"PING\n");
        assert_eq!(cmd[0].as_slice(), b"PING\n");
    }

    #[test]
    fn test_longest_brace_command_keeps_terminator() {
        let mut framer = CommandFramer::new();
        let mut echo = EchoLog::default();

        framer.feed(OPEN_BRACE, &mut echo);
        for _ in 0..MAX_CMD_LENGTH - 3 {
            framer.feed(b'a', &mut echo);
        }
        let cmd = framer.feed(CLOSE_BRACE, &mut echo).unwrap();
        assert_eq!(cmd.len(), MAX_CMD_LENGTH);
        assert_eq!(cmd[MAX_CMD_LENGTH - 2], CLOSE_BRACE);
        assert_eq!(cmd.last(), Some(&COMMAND_TERMINATOR));
    }

    #[test]
    fn test_drain_stops_after_first_command() {
        let mut framer = CommandFramer::new();
        let mut echo = EchoLog::default();
        let mut src = SliceSource::new(b"ONE\nTWO\n");

        let first = framer.drain(&mut src, &mut echo).unwrap();
        assert_eq!(first.as_slice(), b"ONE\n");
        assert_eq!(src.remaining(), b"TWO\n");

        let second = framer.drain(&mut src, &mut echo).unwrap();
        assert_eq!(second.as_slice(), b"TWO\n");
        assert!(framer.drain(&mut src, &mut echo).is_none());
    }
}
