//! Terminal renderings of the client's front-end seams.
//!
//! Everything chatty goes to stderr; only assistant text goes to stdout.

use std::io::Write;

use parking_lot::Mutex;

use tc_client::{ChatView, Navigator};
use tc_domain::model::{ChatMessage, Sender};
use tc_domain::notice::{Notice, NoticeLevel, Notifier};

const RED: &str = "\x1B[31m";
const GREEN: &str = "\x1B[32m";
const DIM: &str = "\x1B[2m";
const RESET: &str = "\x1B[0m";

#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let color = match notice.level {
            NoticeLevel::Error => RED,
            NoticeLevel::Success => GREEN,
            NoticeLevel::Loading | NoticeLevel::Info => DIM,
        };
        eprintln!("{color}{}{RESET}", notice.text);
    }

    fn alert(&self, text: &str) {
        eprintln!("{RED}! {text}{RESET}");
    }
}

/// Route changes have no bar to update; mention them once.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn replace_route(&self, route: &str) {
        eprintln!("{DIM}({route}){RESET}");
    }
}

/// The part of `text` not yet written, given `printed` bytes already out.
/// Falls back to the whole text if it no longer extends what was printed.
pub fn unprinted(text: &str, printed: usize) -> &str {
    text.get(printed..).unwrap_or(text)
}

/// Streams assistant text to stdout as it grows.
#[derive(Default)]
pub struct TerminalView {
    /// Bytes of the message being streamed that are already on screen.
    printed: Mutex<usize>,
}

impl TerminalView {
    fn write(text: &str) {
        let mut out = std::io::stdout();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl ChatView for TerminalView {
    fn message_appended(&self, message: &ChatMessage) {
        if message.sender == Sender::User {
            return;
        }
        let mut printed = self.printed.lock();
        if *printed > 0 {
            Self::write("\n");
        }
        Self::write(&message.text);
        *printed = message.text.len();
    }

    fn message_updated(&self, message: &ChatMessage) {
        if message.sender == Sender::User {
            return;
        }
        let mut printed = self.printed.lock();
        Self::write(unprinted(&message.text, *printed));
        *printed = message.text.len();
    }
}

/// Print a transcript loaded from the server or cache.
pub fn print_transcript(messages: &[ChatMessage]) {
    for m in messages {
        match m.sender {
            Sender::User => eprintln!("{DIM}[{}] you>{RESET} {}", m.timestamp, m.text),
            Sender::Assistant => println!("{}\n", m.text),
        }
    }
}

pub fn error_line(msg: impl std::fmt::Display) {
    eprintln!("{RED}error: {msg}{RESET}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprinted_suffix() {
        assert_eq!(unprinted("Day 1", 0), "Day 1");
        assert_eq!(unprinted("Day 1: Kyoto", 5), ": Kyoto");
        assert_eq!(unprinted("京都", 3), "都");
        // not a char boundary: reprint everything
        assert_eq!(unprinted("京都", 1), "京都");
    }
}
