/// Terminal presenter: the gateway implementation behind the HUD.
///
/// Holds the round-size input field and the message bar state. The
/// renderer reads both; the session writes messages through `Gateway`.

use log::debug;

use crate::sim::gateway::{Gateway, MessageKey};
use crate::sim::round::{MAX_ITEMS, MIN_ITEMS};
use super::messages;

const INPUT_MAX_LEN: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageStyle {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct TerminalPresenter {
    count_input: String,
    message: Option<(MessageKey, MessageStyle)>,
}

impl TerminalPresenter {
    pub fn new(default_count: usize) -> Self {
        TerminalPresenter { count_input: default_count.to_string(), message: None }
    }

    pub fn count_input(&self) -> &str {
        &self.count_input
    }

    /// Typed character into the count field. Anything printable is kept so
    /// that validation can reject it on Go.
    pub fn push_char(&mut self, c: char) {
        if !c.is_control() && self.count_input.chars().count() < INPUT_MAX_LEN {
            self.count_input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.count_input.pop();
    }

    /// Up/down stepping, always landing on a valid count.
    pub fn step_count(&mut self, delta: i32) {
        let current = parse_round_size(&self.count_input).unwrap_or(MIN_ITEMS) as i32;
        let next = (current + delta).clamp(MIN_ITEMS as i32, MAX_ITEMS as i32);
        self.count_input = next.to_string();
    }

    /// Current message text and style, if any.
    pub fn message(&self) -> Option<(&'static str, MessageStyle)> {
        self.message.map(|(key, style)| (messages::text(key), style))
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

impl Gateway for TerminalPresenter {
    fn show_message(&mut self, key: MessageKey) {
        debug!("message: {}", key.as_str());
        self.message = Some((key, MessageStyle::Info));
    }

    fn show_error(&mut self, key: MessageKey) {
        debug!("error message: {}", key.as_str());
        self.message = Some((key, MessageStyle::Error));
    }

    fn round_size(&mut self) -> Option<usize> {
        match parse_round_size(&self.count_input) {
            Some(n) => {
                self.clear_message();
                Some(n)
            }
            None => {
                self.show_error(MessageKey::InvalidCount);
                None
            }
        }
    }
}

/// Whole number in `MIN_ITEMS..=MAX_ITEMS` after trimming. "5.0" counts as 5.
pub fn parse_round_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let n = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let f = raw.parse::<f64>().ok()?;
            if !f.is_finite() || f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };
    let n = usize::try_from(n).ok()?;
    (MIN_ITEMS..=MAX_ITEMS).contains(&n).then_some(n)
}
